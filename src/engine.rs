//! Client-side filter/sort engine.
//!
//! [`apply`] is a pure function over an in-memory product list: substring
//! search first, tier prefix filter second, sort last. It holds no state
//! between calls and never mutates its input, so the interactive path can
//! re-run it on every (debounced) input change.

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::product::Product;

/// Sentinel tier filter meaning "no tier filtering".
pub const ALL_TIERS: &str = "all";

/// Canonical tier ordering for the filter rail, best first.
pub const TIER_ORDER: &[&str] = &[
    "SS", "S", "A++", "A+", "A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D", "E",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum SortKey {
    /// Overall sound score, best first.
    #[default]
    Score,
    /// Price ascending; unknown prices sort last.
    PriceLow,
    /// Price descending; unknown prices sort last.
    PriceHigh,
    /// Name A-Z.
    Name,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Substring to search for across every text column; blank means all.
    pub query: String,
    /// Tier prefix filter; [`ALL_TIERS`] disables it.
    pub tier: String,
    pub sort: SortKey,
}

impl FilterOptions {
    pub fn new(query: impl Into<String>, tier: impl Into<String>, sort: SortKey) -> Self {
        Self {
            query: query.into(),
            tier: tier.into(),
            sort,
        }
    }
}

fn matches_query(product: &Product, query: &str) -> bool {
    product
        .text_fields()
        .any(|field| field.to_lowercase().contains(query))
}

/// Prefix match so filter "A" also covers "A+", "A-", and "A++".
fn matches_tier(product: &Product, tier: &str) -> bool {
    product.tier.to_uppercase().starts_with(tier)
}

fn compare_names(a: &Product, b: &Product) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Filters and sorts the row set. Ties keep the incoming (insertion) order:
/// the sort is stable and the input arrives ordered by `row_order`.
pub fn apply(products: &[Product], options: &FilterOptions) -> Vec<Product> {
    let mut filtered: Vec<Product> = products.to_vec();

    let query = options.query.trim().to_lowercase();
    if !query.is_empty() {
        filtered.retain(|product| matches_query(product, &query));
    }

    if !options.tier.is_empty() && options.tier != ALL_TIERS {
        let tier = options.tier.to_uppercase();
        filtered.retain(|product| matches_tier(product, &tier));
    }

    match options.sort {
        SortKey::Score => filtered.sort_by(|a, b| {
            let left = a.overall_sound_score.unwrap_or(0.0);
            let right = b.overall_sound_score.unwrap_or(0.0);
            right.total_cmp(&left)
        }),
        SortKey::PriceLow => filtered.sort_by(|a, b| {
            let left = a.price_idr.unwrap_or(f64::INFINITY);
            let right = b.price_idr.unwrap_or(f64::INFINITY);
            left.total_cmp(&right)
        }),
        SortKey::PriceHigh => filtered.sort_by(|a, b| {
            let left = a.price_idr.unwrap_or(0.0);
            let right = b.price_idr.unwrap_or(0.0);
            right.total_cmp(&left)
        }),
        SortKey::Name => filtered.sort_by(compare_names),
    }

    filtered
}

/// Distinct tiers present in the row set, in canonical tier order.
pub fn available_tiers(products: &[Product]) -> Vec<String> {
    TIER_ORDER
        .iter()
        .filter(|tier| products.iter().any(|product| product.tier == **tier))
        .map(|tier| tier.to_string())
        .collect()
}
