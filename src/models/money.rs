//! Integer-cent currency parsing and formatting.
//!
//! Prices never pass through floating point: `"$0.29"` is 29 cents, not
//! `28.999...` truncated to 28.

use crate::error::{Result, WishlistError};

/// Largest accepted price: $10,000,000.00.
pub const MAX_PRICE_CENTS: u64 = 1_000_000_000;

/// Parse a currency string such as `"$5.99"` or `"$1,234.5"` into cents.
///
/// Leading `$`, surrounding whitespace and thousands separators are ignored.
/// Fractional digits beyond the second are truncated. Negative or
/// non-numeric input is rejected, as is anything above [`MAX_PRICE_CENTS`].
pub fn parse_price(raw: &str) -> Result<u64> {
    let invalid = || WishlistError::Parse(format!("invalid price: {:?}", raw));

    let trimmed = raw.trim();
    let digits: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .trim_start()
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits.as_str(), ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let dollars: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let cents: u64 = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(2)
        .collect::<String>()
        .parse()
        .map_err(|_| invalid())?;

    dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .filter(|total| *total <= MAX_PRICE_CENTS)
        .ok_or_else(invalid)
}

/// Format cents as `"$D.DD"`.
pub fn money(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
