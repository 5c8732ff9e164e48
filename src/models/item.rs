use serde::{Deserialize, Serialize};

use super::money::money;

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    /// Map a stock-status marker to an availability.
    ///
    /// Only an exact (whitespace-trimmed) match of `in_stock` is available.
    pub fn from_marker(marker: &str, in_stock: &str) -> Self {
        if marker.trim() == in_stock {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }

    /// Single-character status glyph used in the text report.
    pub fn glyph(self) -> char {
        match self {
            Availability::Available => '*',
            Availability::Unavailable => '!',
        }
    }
}

// ---------------------------------------------------------------------------
// WishlistItem — one card row scraped from the wishlist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Absolute product URL (base URL + relative href).
    pub link: String,
    /// Display name.
    pub label: String,
    pub availability: Availability,
    /// Price in cents.
    pub price: u64,
}

impl WishlistItem {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Price formatted as `"$D.DD"`.
    pub fn usd(&self) -> String {
        money(self.price)
    }
}

// ---------------------------------------------------------------------------
// JsonItem — per-item entry of the JSON report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonItem {
    pub href: String,
    pub name: String,
    pub usd: String,
    /// True iff the item was unavailable.
    pub out: bool,
}

impl From<&WishlistItem> for JsonItem {
    fn from(item: &WishlistItem) -> Self {
        Self {
            href: item.link.clone(),
            name: item.label.clone(),
            usd: item.usd(),
            out: !item.is_available(),
        }
    }
}
