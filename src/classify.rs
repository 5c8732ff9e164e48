//! Affordability classification and running totals.
//!
//! Classification is a strict per-item fold: each item's bucket depends only
//! on its availability, its price and the threshold.

use serde::{Deserialize, Serialize};

use crate::models::{money, WishlistItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Available and under the threshold.
    Buy,
    /// Available but at or over the threshold.
    Watch,
    /// Not in stock.
    Out,
}

impl Classification {
    /// Row tag used by the CSV report.
    pub fn csv_tag(self) -> &'static str {
        match self {
            Classification::Buy => "BUY",
            Classification::Watch => "USD",
            Classification::Out => "OUT",
        }
    }
}

/// Aggregate counters for one report run. All amounts are in cents.
///
/// Sums saturate at `u64::MAX` instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Number of available items under the threshold.
    pub affordable_count: u64,
    /// Sum of prices of available items under the threshold.
    pub affordable_total: u64,
    /// Sum of prices of all available items.
    pub available_total: u64,
    /// Affordability cutoff; an item is affordable when `price < threshold`.
    pub threshold: u64,
}

impl Totals {
    pub fn new(threshold: u64) -> Self {
        Self {
            affordable_count: 0,
            affordable_total: 0,
            available_total: 0,
            threshold,
        }
    }

    /// Classify `item` and fold it into the counters.
    pub fn classify(&mut self, item: &WishlistItem) -> Classification {
        if !item.is_available() {
            return Classification::Out;
        }
        self.available_total = self.available_total.saturating_add(item.price);
        if item.price < self.threshold {
            self.affordable_count += 1;
            self.affordable_total = self.affordable_total.saturating_add(item.price);
            Classification::Buy
        } else {
            Classification::Watch
        }
    }

    /// One-line summary, e.g. `# $5.50 for N=1 <= $5.99=M vs. $12.50 total`.
    pub fn summary(&self) -> String {
        format!(
            "# {} for N={} <= {}=M vs. {} total",
            money(self.affordable_total),
            self.affordable_count,
            money(self.threshold),
            money(self.available_total)
        )
    }
}

/// Free-function form of [`Totals::classify`].
///
/// The threshold is fixed when `totals` is created; `threshold` must match it.
pub fn classify(item: &WishlistItem, threshold: u64, totals: &mut Totals) -> Classification {
    debug_assert_eq!(
        threshold, totals.threshold,
        "threshold changed mid-run"
    );
    totals.classify(item)
}
