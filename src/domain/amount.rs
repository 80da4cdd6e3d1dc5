//! Smallest-unit token quantities.
//!
//! Amounts are plain `u128` values inside the ledger. On the wire they are
//! encoded as decimal strings so JSON consumers never lose precision.

/// Quantity of the pool's unit of account, in smallest units.
pub type Amount = u128;

/// Serde adapter encoding an [`Amount`] as a decimal string.
///
/// Use with `#[serde(with = "crate::domain::amount::as_string")]`.
pub mod as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Amount;

    /// Serializes the amount as a decimal string.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    /// Deserializes an amount from a decimal string.
    ///
    /// # Errors
    ///
    /// Fails when the input is not a non-negative integer that fits `u128`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a decimal string into an [`Amount`], naming the field on failure.
///
/// # Errors
///
/// Returns a human-readable message when `raw` is not a valid amount.
pub fn parse_amount(field: &str, raw: &str) -> Result<Amount, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid {field}: {raw}"))
}
