//! Data-amount parsing and formatting.
//!
//! The catalog expresses data allowances as strings like `"5GB"`, while the
//! provider API reports raw byte counters. These helpers translate between
//! the two representations; display values always carry two decimal places
//! and a `GB` suffix.

/// Bytes in one gigabyte (1024^3).
pub const BYTES_PER_GB: i64 = 1_073_741_824;

/// Parse a data-amount string like `"5GB"` into a gigabyte count.
///
/// The unit suffix is optional and case-insensitive, surrounding whitespace
/// is ignored. Empty or unparsable input yields `0.0` rather than an error,
/// matching the lenient handling of upstream catalog rows.
#[must_use]
pub fn parse_gb(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let without_unit = trimmed
        .strip_suffix("GB")
        .or_else(|| trimmed.strip_suffix("gb"))
        .or_else(|| trimmed.strip_suffix("Gb"))
        .or_else(|| trimmed.strip_suffix("gB"))
        .unwrap_or(trimmed);
    without_unit.trim().parse().unwrap_or(0.0)
}

/// Format a byte counter as a display amount, e.g. `10737418240` -> `"10.00GB"`.
#[must_use]
pub fn bytes_to_gb(bytes: i64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let gb = bytes as f64 / BYTES_PER_GB as f64;
    format!("{gb:.2}GB")
}

/// Convert a data-amount string like `"5GB"` into a byte counter.
///
/// Unparsable input yields `0`.
#[must_use]
pub fn gb_to_bytes(raw: &str) -> i64 {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    {
        (parse_gb(raw) * BYTES_PER_GB as f64) as i64
    }
}
