//! Numeric helpers shared by the factor calculators.

use std::collections::BTreeMap;

use credit_core::types::FactorKind;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{Result, ScoreError};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Lossy conversion used once amounts leave the ledger and enter scoring math.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Map `value` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`, clamping the
/// position to the input range.
pub fn interpolate(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    let span = from_hi - from_lo;
    if span == 0.0 || !value.is_finite() {
        return to_lo;
    }
    let position = ((value - from_lo) / span).clamp(0.0, 1.0);
    to_lo + position * (to_hi - to_lo)
}

/// Reject NaN and infinities before they reach a score.
pub fn ensure_finite(factor: FactorKind, stage: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoreError::NonFinite { factor, stage })
    }
}

/// Whole days between two unix timestamps, never negative.
pub fn days_between(from: i64, to: i64) -> i64 {
    (to.saturating_sub(from) / SECONDS_PER_DAY).max(0)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Build a metrics map, replacing non-finite values with zero.
pub fn metrics<'a>(entries: impl IntoIterator<Item = (&'a str, f64)>) -> BTreeMap<String, f64> {
    entries
        .into_iter()
        .map(|(key, value)| {
            let value = if value.is_finite() { value } else { 0.0 };
            (key.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate(0.5, 0.0, 1.0, 0.0, 10.0), 5.0);
        assert_eq!(interpolate(2.0, 0.0, 1.0, 0.0, 10.0), 10.0);
        assert_eq!(interpolate(-1.0, 0.0, 1.0, 0.0, 10.0), 0.0);
        assert_eq!(interpolate(f64::NAN, 0.0, 1.0, 3.0, 10.0), 3.0);
        assert_eq!(interpolate(1.0, 1.0, 1.0, 7.0, 10.0), 7.0);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(FactorKind::NetFlow, "ratio", 0.5).is_ok());
        assert_eq!(
            ensure_finite(FactorKind::NetFlow, "ratio", f64::NAN),
            Err(ScoreError::NonFinite {
                factor: FactorKind::NetFlow,
                stage: "ratio"
            })
        );
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(0, SECONDS_PER_DAY * 3 + 5), 3);
        assert_eq!(days_between(SECONDS_PER_DAY, 0), 0);
    }

    #[test]
    fn test_metrics_sanitizes() {
        let m = metrics([("a", 1.0), ("b", f64::INFINITY)]);
        assert_eq!(m["a"], 1.0);
        assert_eq!(m["b"], 0.0);
        assert_eq!(round_to(45.04, 1), 45.0);
    }
}
