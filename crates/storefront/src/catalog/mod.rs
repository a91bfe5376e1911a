//! Catalog types and the client-side filter pipeline.
//!
//! Views fetch a raw product list once (see [`CatalogClient`]) and then
//! refine it locally as the shopper types, picks categories, drags the
//! price slider, or changes the sort order. The pipeline is pure and
//! recomputed from scratch on every input change; there is no incremental
//! update and no memoization.

mod client;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use naqsh_core::{Price, ProductId};

use crate::models::ProductSnapshot;

pub use client::{CatalogClient, CatalogError, CatalogQuery};

/// A product as returned by the catalog API.
///
/// Only `id`, `name`, `price`, and `created_at` are guaranteed; upstream
/// omits the rest freely, so everything else is tolerated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Opaque store summary attached by the API, carried verbatim.
    #[serde(default)]
    pub store: Option<serde_json::Value>,
    #[serde(with = "api_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "api_datetime::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The denormalized fields the cart and wishlist copy at add time.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            store: self.store.clone(),
        }
    }
}

/// Sort order for a catalog view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic by name, case-insensitive.
    #[default]
    NameAscending,
    /// Cheapest first.
    PriceAscending,
    /// Most expensive first.
    PriceDescending,
    /// Most recently created first.
    NewestFirst,
}

impl SortKey {
    /// Parse from a URL parameter value, falling back to the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-ascending" => Self::PriceAscending,
            "price-descending" => Self::PriceDescending,
            "newest-first" => Self::NewestFirst,
            _ => Self::NameAscending,
        }
    }

    /// Convert to a URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameAscending => "name-ascending",
            Self::PriceAscending => "price-ascending",
            Self::PriceDescending => "price-descending",
            Self::NewestFirst => "newest-first",
        }
    }
}

/// The shopper's current filter and sort choices for a catalog view.
///
/// Ephemeral by design: built for one render and thrown away, never
/// persisted. The default filter matches every product and sorts by name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CatalogFilter {
    /// Case-insensitive substring matched against name and description.
    /// Empty matches everything.
    pub search: String,
    /// Exact category match. `None` or empty matches everything.
    pub category: Option<String>,
    /// Inclusive lower price bound; `None` is unbounded, so the default
    /// filter spans the full observed price range.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound; `None` is unbounded.
    pub max_price: Option<Price>,
    pub sort: SortKey,
}

impl CatalogFilter {
    /// Filter matching everything, sorted by name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_price_range(mut self, min: Price, max: Price) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    #[must_use]
    pub const fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Run the pipeline: text filter, category filter, price filter, then
    /// a stable sort.
    ///
    /// The output is always a subsequence of the input (reordered by the
    /// sort stage); no stage invents or duplicates products. Products
    /// tied under the sort key keep their relative input order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.search.to_lowercase();
        let mut results: Vec<Product> = products
            .iter()
            .filter(|product| self.matches_search(product, &needle))
            .filter(|product| self.matches_category(product))
            .filter(|product| self.matches_price(product))
            .cloned()
            .collect();
        sort_products(&mut results, self.sort);
        results
    }

    fn matches_search(&self, product: &Product, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        if product.name.to_lowercase().contains(needle) {
            return true;
        }
        product
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
    }

    fn matches_category(&self, product: &Product) -> bool {
        match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => product.category.as_deref() == Some(category),
        }
    }

    fn matches_price(&self, product: &Product) -> bool {
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        !self.max_price.is_some_and(|max| product.price > max)
    }
}

/// Stable sort in place by the given key.
fn sort_products(products: &mut [Product], sort: SortKey) {
    match sort {
        SortKey::NameAscending => {
            products.sort_by(|a, b| compare_names(&a.name, &b.name));
        }
        SortKey::PriceAscending => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDescending => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::NewestFirst => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Case-insensitive name comparison. Names equal up to case count as ties
/// so the stable sort keeps their input order.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Distinct categories in first-seen order, for building category pickers.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if let Some(category) = &product.category
            && !seen.contains(category)
        {
            seen.push(category.clone());
        }
    }
    seen
}

/// Observed `(min, max)` price across the list, for seeding a price
/// slider with the full range. `None` when the list is empty.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<(Price, Price)> {
    products.iter().fold(None, |bounds, product| {
        Some(match bounds {
            None => (product.price, product.price),
            Some((min, max)) => (min.min(product.price), max.max(product.price)),
        })
    })
}

/// Serde helpers for the catalog API's timestamps.
///
/// The API emits zone-less `datetime.isoformat()` strings such as
/// `2026-03-14T09:26:53.589793`; treat those as UTC, while still
/// accepting RFC 3339 with an offset.
mod api_datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        raw.parse::<DateTime<Utc>>()
            .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(timestamp) => serializer.serialize_some(&timestamp.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }
    }
}
