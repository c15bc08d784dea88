use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::NormalizedCard;
use crate::vocabulary::{MEMBER_ORDER, TYPE_ORDER};

// ---------------------------------------------------------------------------
// PriceStatistics — Outlier-trimmed price summary of one group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub median: i64,
    pub min: i64,
    pub max: i64,
    pub mean: i64,
    /// Size of the trimmed sample.
    pub transaction_count: usize,
    /// Unfloored median; ranks representative candidates.
    pub exact_median: f64,
    /// Retained prices, ascending. Never empty.
    pub trimmed_prices: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Representative — The listing displayed for a group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub card: NormalizedCard,
    /// `true` when confirmed available, or when verification did not run.
    pub verified: bool,
    pub url: String,
}

// ---------------------------------------------------------------------------
// CatalogEntry — One canonical product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub group_key: String,
    pub member: String,
    pub album: String,
    pub types: Vec<String>,
    pub official_name: String,
    pub stats: PriceStatistics,
    pub representative: Representative,
    /// Oldest first, capped to the most recent points.
    pub series: Vec<PricePoint>,
}

impl CatalogEntry {
    pub fn has_media(&self) -> bool {
        self.representative.card.media_url.is_some()
    }
}

// ---------------------------------------------------------------------------
// Catalog — Sorted entries plus run counters
// ---------------------------------------------------------------------------

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogReport {
    pub records: usize,
    pub skipped_records: usize,
    pub groups_formed: usize,
    pub groups_below_min_size: usize,
    pub groups_without_prices: usize,
    pub entries_with_media: usize,
    pub entries_verified: usize,
    pub verification_ran: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Descending by transaction count.
    pub entries: Vec<CatalogEntry>,
    pub report: CatalogReport,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_transactions(&self) -> usize {
        self.entries.iter().map(|e| e.stats.transaction_count).sum()
    }

    /// Floored mean of the entry medians, `None` for an empty catalog.
    pub fn average_median(&self) -> Option<i64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: i128 = self.entries.iter().map(|e| i128::from(e.stats.median)).sum();
        let mean = total.div_euclid(self.entries.len() as i128);
        Some(i64::try_from(mean).unwrap_or(i64::MAX))
    }

    /// Entries bucketed by member in display order. Empty buckets are omitted;
    /// entries keep catalog order inside a bucket.
    pub fn by_member(&self) -> Vec<(&'static str, Vec<&CatalogEntry>)> {
        MEMBER_ORDER
            .iter()
            .map(|&member| {
                let entries: Vec<&CatalogEntry> = self
                    .entries
                    .iter()
                    .filter(|e| e.member == member)
                    .collect();
                (member, entries)
            })
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    /// Type tags occurring anywhere in the catalog, in display order.
    pub fn types_present(&self) -> Vec<&'static str> {
        TYPE_ORDER
            .iter()
            .copied()
            .filter(|t| {
                self.entries
                    .iter()
                    .any(|e| e.types.iter().any(|et| et.as_str() == *t))
            })
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
