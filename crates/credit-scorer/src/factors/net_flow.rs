//! Net flow analysis: the balance of value coming in versus going out.

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};
use tracing::debug;

use super::{require_history, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, interpolate, metrics, to_f64};

pub struct NetFlow;

impl NetFlow {
    /// Map a flow ratio in [-1, 1] onto the 0-100 scale.
    pub fn ratio_score(ratio: f64) -> f64 {
        if ratio >= 0.3 {
            interpolate(ratio, 0.3, 1.0, 90.0, 100.0)
        } else if ratio >= 0.0 {
            interpolate(ratio, 0.0, 0.3, 60.0, 89.0)
        } else if ratio >= -0.3 {
            interpolate(ratio, -0.3, 0.0, 30.0, 59.0)
        } else {
            interpolate(ratio, -1.0, -0.3, 0.0, 29.0)
        }
    }
}

impl FactorCalculator for NetFlow {
    fn kind(&self) -> FactorKind {
        FactorKind::NetFlow
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let rate = ctx.rate();
        let mut inflow = 0.0;
        let mut outflow = 0.0;
        let mut unconverted = 0usize;

        for tx in history.iter().filter(|tx| !tx.amount.is_zero()) {
            let amount = to_f64(tx.amount);
            // Amounts in SOL
            let amount = if ctx.registry.is_fee_currency(&tx.currency) {
                amount
            } else if let Some(rate) = rate {
                amount / rate
            } else {
                unconverted += 1;
                continue;
            };

            if amount > 0.0 {
                inflow += amount;
            } else {
                outflow += amount.abs();
            }
        }

        if unconverted > 0 {
            debug!(
                count = unconverted,
                "Skipped non-SOL amounts without a conversion rate"
            );
        }

        let total = inflow + outflow;
        if total <= 0.0 {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }
        let ratio = ensure_finite(self.kind(), "flow ratio", (inflow - outflow) / total)?;

        Ok(FactorScore::scored(
            self.kind(),
            Self::ratio_score(ratio),
            metrics([
                ("inflow", inflow),
                ("outflow", outflow),
                ("net_flow", inflow - outflow),
                ("ratio", ratio),
                ("total_volume", total),
                ("unconverted_count", unconverted as f64),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::testing::{activity, run, sol, token};
    use credit_core::types::Band;
    use rust_decimal::Decimal;

    #[test]
    fn test_all_inflow_is_excellent() {
        let history: Vec<_> = (0..50).map(|i| sol(i, 10)).collect();
        let score = run(&NetFlow, &activity(history)).unwrap();
        assert_eq!(score.metric("ratio"), Some(1.0));
        assert_eq!(score.value, 100);
        assert_eq!(score.band, Band::Excellent);
    }

    #[test]
    fn test_all_outflow_is_poor() {
        let score = run(&NetFlow, &activity(vec![sol(1, -10), sol(2, -5)])).unwrap();
        assert_eq!(score.value, 0);
        assert_eq!(score.band, Band::Poor);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(NetFlow::ratio_score(0.3), 90.0);
        assert_eq!(NetFlow::ratio_score(0.0), 60.0);
        assert_eq!(NetFlow::ratio_score(-0.3), 30.0);
        assert_eq!(NetFlow::ratio_score(-1.0), 0.0);
        assert!((NetFlow::ratio_score(0.15) - 74.5).abs() < 1e-9);
    }

    #[test]
    fn test_increasing_inflow_never_lowers_score() {
        let mut previous = 0;
        for inflow in 0..40 {
            let history = vec![sol(1, -20), sol(2, inflow)];
            let Ok(score) = run(&NetFlow, &activity(history)) else {
                continue;
            };
            assert!(score.value >= previous, "inflow {inflow}");
            previous = score.value;
        }
    }

    #[test]
    fn test_non_sol_amounts_use_rate() {
        // 100 USDC at 100 USD/SOL is one SOL in, against one SOL out
        let history = vec![token(1, 100, "USDC"), sol(2, -10)];
        let with_rate = activity(history.clone()).with_rate(Decimal::from(100));
        let score = run(&NetFlow, &with_rate).unwrap();
        assert_eq!(score.metric("ratio"), Some(0.0));
        assert_eq!(score.value, 60);

        let without_rate = run(&NetFlow, &activity(history)).unwrap();
        assert_eq!(without_rate.metric("unconverted_count"), Some(1.0));
        assert_eq!(without_rate.value, 0);
    }

    #[test]
    fn test_zero_amounts_have_no_data() {
        assert!(run(&NetFlow, &activity(vec![sol(1, 0), sol(2, 0)])).is_err());
    }
}
