//! Amount parsing and formatting.
//!
//! Amounts are `u64` stroops everywhere inside the engine. Decimal strings
//! only exist at the edges (CLI input, human-readable output).

use super::AssetError;
use crate::config::{AMOUNT_DECIMALS, STROOPS_PER_UNIT};

/// Parse a decimal amount (`"100"`, `"0.5"`, `"12.0000001"`) into stroops.
///
/// At most seven fractional digits are accepted; anything finer than a
/// stroop is rejected rather than rounded.
pub fn parse_amount(text: &str) -> Result<u64, AssetError> {
    let invalid = || AssetError::InvalidAmount(text.to_string());
    let text = text.trim();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > AMOUNT_DECIMALS as usize {
        return Err(invalid());
    }

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac_stroops: u64 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = AMOUNT_DECIMALS as usize);
        padded.parse().map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|v| v.checked_add(frac_stroops))
        .ok_or_else(invalid)
}

/// Render stroops with exactly seven fractional digits: `1_000_000_000`
/// becomes `"100.0000000"`.
pub fn format_amount(stroops: u64) -> String {
    format!(
        "{}.{:0>width$}",
        stroops / STROOPS_PER_UNIT,
        stroops % STROOPS_PER_UNIT,
        width = AMOUNT_DECIMALS as usize
    )
}
