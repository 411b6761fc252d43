//! Wallet age and longevity.

use std::collections::BTreeSet;

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};

use super::{require_history, timestamped, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{days_between, ensure_finite, metrics};

pub struct WalletAge;

impl WalletAge {
    /// Score from age in days and the percentage of those days with activity.
    pub fn age_score(age_days: f64, active_pct: f64) -> f64 {
        let a = active_pct;
        if age_days >= 365.0 {
            if a > 70.0 {
                90.0 + ((a - 70.0) / 3.0).min(10.0)
            } else if a > 50.0 {
                70.0 + (a - 50.0) / 2.0
            } else if a > 30.0 {
                40.0 + (a - 30.0) / 0.75
            } else {
                30.0 + a / 3.0
            }
        } else if age_days >= 182.0 {
            if a > 50.0 {
                70.0 + ((a - 50.0) / 2.5).min(19.0)
            } else if a > 30.0 {
                40.0 + (a - 30.0) / 1.5
            } else {
                20.0 + a / 3.0
            }
        } else if age_days >= 91.0 {
            if a > 50.0 {
                50.0 + (a - 50.0).min(19.0)
            } else if a > 30.0 {
                40.0 + (a - 30.0) / 2.0
            } else {
                10.0 + a / 3.0
            }
        } else if a > 70.0 {
            35.0 + (age_days / 30.0).min(4.0)
        } else if a > 50.0 {
            25.0 + (age_days / 30.0).min(10.0)
        } else {
            (age_days / 4.0 + a / 5.0).min(24.0)
        }
    }
}

impl FactorCalculator for WalletAge {
    fn kind(&self) -> FactorKind {
        FactorKind::WalletAge
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let Some(first) = timestamped(history).map(|tx| tx.timestamp).min() else {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        };

        let age_days = days_between(first, ctx.as_of) as f64;
        let active_days: BTreeSet<_> = history.iter().filter_map(|tx| tx.date()).collect();
        let active_pct = ensure_finite(
            self.kind(),
            "active day share",
            (active_days.len() as f64 / age_days.max(1.0) * 100.0).min(100.0),
        )?;

        Ok(FactorScore::scored(
            self.kind(),
            Self::age_score(age_days, active_pct),
            metrics([
                ("age_days", age_days),
                ("active_days", active_days.len() as f64),
                ("active_day_pct", active_pct),
                ("first_transaction", first as f64),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::testing::{activity, run, sol};
    use credit_core::types::Band;

    #[test]
    fn test_old_daily_wallet_is_excellent() {
        let history: Vec<_> = (0..400).map(|day| sol(day, 1)).collect();
        let score = run(&WalletAge, &activity(history)).unwrap();

        assert_eq!(score.metric("age_days"), Some(399.0));
        assert_eq!(score.metric("active_day_pct"), Some(100.0));
        assert_eq!(score.value, 100);
        assert_eq!(score.band, Band::Excellent);
    }

    #[test]
    fn test_old_dormant_wallet() {
        // One year old, active on two days
        let score = run(&WalletAge, &activity(vec![sol(400, 1), sol(1, 1)])).unwrap();
        assert_eq!(score.value, 30);
        assert_eq!(score.band, Band::Poor);
    }

    #[test]
    fn test_new_wallet_stays_below_moderate() {
        let history: Vec<_> = (0..20).map(|day| sol(day, 1)).collect();
        let score = run(&WalletAge, &activity(history)).unwrap();
        assert!(score.value < 40, "value {}", score.value);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(WalletAge::age_score(365.0, 100.0), 100.0);
        assert_eq!(WalletAge::age_score(200.0, 60.0), 74.0);
        assert_eq!(WalletAge::age_score(100.0, 40.0), 45.0);
        assert_eq!(WalletAge::age_score(60.0, 80.0), 37.0);
        assert_eq!(WalletAge::age_score(10.0, 10.0), 4.5);
    }

    #[test]
    fn test_no_timestamps_has_no_data() {
        let history = vec![NormalizedTransaction::new(
            -5,
            rust_decimal::Decimal::ONE,
            "SOL",
        )];
        assert!(run(&WalletAge, &activity(history)).is_err());
    }
}
