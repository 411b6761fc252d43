//! Collateral management: loan-to-value discipline and top-up frequency.
//!
//! Each dimension lands in one of four tiers. The factor band is the weaker
//! of the two tiers, and the position inside that band is the average
//! progress of both dimensions through their ranges.

use credit_core::registry::contains_any;
use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction, TransactionType};
use credit_core::ProtocolRegistry;

use super::{require_history, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, interpolate, metrics, to_f64};

/// Score range for each tier, weakest first.
const BAND_RANGES: [(f64, f64); 4] = [(0.0, 29.0), (30.0, 59.0), (60.0, 89.0), (90.0, 100.0)];

pub struct CollateralManagement;

pub fn is_collateral_tx(tx: &NormalizedTransaction, registry: &ProtocolRegistry) -> bool {
    matches!(tx.tx_type, TransactionType::Collateral | TransactionType::Borrow)
        || registry.mentions_collateral_protocol(&tx.source)
        || contains_any(&tx.description.to_lowercase(), &registry.collateral_keywords)
}

/// LTV tier (3 = best) and progress through that tier's range. Lower LTV is
/// better.
fn ltv_tier(ltv: f64) -> (usize, f64) {
    if ltv < 50.0 {
        (3, interpolate(ltv, 50.0, 0.0, 0.0, 1.0))
    } else if ltv < 70.0 {
        (2, interpolate(ltv, 70.0, 50.0, 0.0, 1.0))
    } else if ltv < 85.0 {
        (1, interpolate(ltv, 85.0, 70.0, 0.0, 1.0))
    } else {
        (0, interpolate(ltv, 100.0, 85.0, 0.0, 1.0))
    }
}

/// Top-up tier (3 = best) and progress through that tier's range.
fn top_up_tier(top_ups: usize) -> (usize, f64) {
    let n = top_ups as f64;
    if top_ups >= 5 {
        (3, interpolate(n, 5.0, 10.0, 0.0, 1.0))
    } else if top_ups >= 3 {
        (2, interpolate(n, 3.0, 5.0, 0.0, 1.0))
    } else if top_ups >= 1 {
        (1, interpolate(n, 1.0, 3.0, 0.0, 1.0))
    } else {
        (0, 0.0)
    }
}

impl CollateralManagement {
    pub fn band_score(average_ltv: f64, top_ups: usize) -> f64 {
        let (ltv_tier, ltv_progress) = ltv_tier(average_ltv);
        let (top_up_tier, top_up_progress) = top_up_tier(top_ups);
        let band = ltv_tier.min(top_up_tier);

        // A dimension already above the band counts as fully through it
        let progress = |tier: usize, within: f64| if tier > band { 1.0 } else { within };
        let position =
            (progress(ltv_tier, ltv_progress) + progress(top_up_tier, top_up_progress)) / 2.0;

        let (lo, hi) = BAND_RANGES[band];
        lo + position * (hi - lo)
    }
}

impl FactorCalculator for CollateralManagement {
    fn kind(&self) -> FactorKind {
        FactorKind::CollateralManagement
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let collateral: Vec<&NormalizedTransaction> = history
            .iter()
            .filter(|tx| is_collateral_tx(tx, ctx.registry))
            .collect();
        if collateral.is_empty() {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }

        let ltvs: Vec<f64> = collateral
            .iter()
            .filter_map(|tx| tx.loan_leg.and_then(|leg| leg.ltv_pct()))
            .map(to_f64)
            .collect();
        let average_ltv = if ltvs.is_empty() {
            0.0
        } else {
            ensure_finite(
                self.kind(),
                "loan-to-value",
                ltvs.iter().sum::<f64>() / ltvs.len() as f64,
            )?
        };
        let top_ups = collateral
            .iter()
            .filter(|tx| tx.tx_type != TransactionType::Borrow)
            .count();

        Ok(FactorScore::scored(
            self.kind(),
            Self::band_score(average_ltv, top_ups),
            metrics([
                ("average_ltv", average_ltv),
                ("top_up_count", top_ups as f64),
                ("collateral_tx_count", collateral.len() as f64),
                ("loan_count", ltvs.len() as f64),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::testing::{activity, run, sol};
    use credit_core::types::Band;
    use rust_decimal::Decimal;

    fn borrow(days: i64, collateral: i64, borrowed: i64) -> NormalizedTransaction {
        sol(days, 10)
            .with_type(TransactionType::Borrow)
            .with_loan_leg(Decimal::from(collateral), Decimal::from(borrowed))
    }

    fn top_up(days: i64) -> NormalizedTransaction {
        sol(days, -10).with_type(TransactionType::Collateral)
    }

    #[test]
    fn test_low_ltv_frequent_top_ups_is_excellent() {
        let mut history = vec![borrow(30, 100, 20)];
        history.extend((1..=6).map(top_up));
        let score = run(&CollateralManagement, &activity(history)).unwrap();

        assert_eq!(score.metric("average_ltv"), Some(20.0));
        assert_eq!(score.metric("top_up_count"), Some(6.0));
        assert_eq!(score.band, Band::Excellent);
    }

    #[test]
    fn test_loan_leg_outside_collateral_activity_is_ignored() {
        let mut history = vec![borrow(30, 100, 20)];
        history.extend((1..=6).map(top_up));
        history.push(
            sol(2, -10)
                .with_type(TransactionType::Swap)
                .with_loan_leg(Decimal::from(10), Decimal::from(51)),
        );
        let score = run(&CollateralManagement, &activity(history)).unwrap();

        assert_eq!(score.metric("average_ltv"), Some(20.0));
        assert_eq!(score.metric("loan_count"), Some(1.0));
        assert_eq!(score.band, Band::Excellent);
    }

    #[test]
    fn test_no_top_ups_caps_at_poor() {
        let score = run(&CollateralManagement, &activity(vec![borrow(5, 100, 10)])).unwrap();
        assert!(score.value <= 29, "value {}", score.value);
        assert_eq!(score.band, Band::Poor);
    }

    #[test]
    fn test_band_is_weaker_dimension() {
        // LTV 60% (tier 2), 6 top-ups (tier 3): band 2, LTV halfway, top-ups full
        assert_eq!(CollateralManagement::band_score(60.0, 6), 60.0 + 0.75 * 29.0);
        // LTV 90% (tier 0) wins over plenty of top-ups
        assert!(CollateralManagement::band_score(90.0, 10) <= 29.0);
    }

    #[test]
    fn test_description_keyword_detection() {
        let registry = ProtocolRegistry::default();
        let tx = sol(1, -5).with_description("Add collateral to vault");
        assert!(is_collateral_tx(&tx, &registry));
        assert!(!is_collateral_tx(&sol(1, -5), &registry));
    }

    #[test]
    fn test_no_collateral_activity_has_no_data() {
        assert!(run(&CollateralManagement, &activity(vec![sol(1, 5)])).is_err());
    }
}
