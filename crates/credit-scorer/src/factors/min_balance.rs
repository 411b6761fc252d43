//! Minimum balance stability.
//!
//! Replays fee-currency transfers newest to oldest from the current balance,
//! recording the lowest balance seen on each calendar day. A wallet whose
//! daily floors stay close to its peak balance scores well; one that is
//! regularly drained scores poorly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};
use rust_decimal::Decimal;

use super::{require_history, timestamped, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, interpolate, metrics, to_f64};

pub struct MinBalanceStability;

impl MinBalanceStability {
    pub fn ratio_score(ratio: f64) -> f64 {
        if ratio >= 0.5 {
            interpolate(ratio, 0.5, 1.0, 90.0, 100.0)
        } else if ratio >= 0.3 {
            interpolate(ratio, 0.3, 0.5, 70.0, 89.0)
        } else if ratio >= 0.1 {
            interpolate(ratio, 0.1, 0.3, 40.0, 69.0)
        } else {
            interpolate(ratio, 0.0, 0.1, 0.0, 39.0)
        }
    }
}

/// Fee-currency transfers with usable timestamps, newest first. Ties are
/// broken by amount so the replay does not depend on input order.
pub(crate) fn replay_order<'a>(
    history: &'a [NormalizedTransaction],
    ctx: &ScoringContext<'_>,
) -> Vec<&'a NormalizedTransaction> {
    let mut txs: Vec<_> = timestamped(history)
        .filter(|tx| ctx.registry.is_fee_currency(&tx.currency))
        .collect();
    txs.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.amount.cmp(&a.amount))
    });
    txs
}

impl FactorCalculator for MinBalanceStability {
    fn kind(&self) -> FactorKind {
        FactorKind::MinBalanceStability
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let txs = replay_order(history, ctx);
        if txs.is_empty() {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }

        let mut daily_min: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        let mut running = ctx.current_balance;
        let mut lowest = running;

        for tx in txs {
            let after = running;
            let before = after.saturating_sub(tx.amount);
            if let Some(day) = tx.date() {
                let floor = after.min(before);
                daily_min
                    .entry(day)
                    .and_modify(|min| *min = (*min).min(floor))
                    .or_insert(floor);
            }
            lowest = lowest.min(before);
            running = before;
        }

        let floors: Vec<f64> = daily_min
            .values()
            .map(|min| to_f64(*min).max(0.0))
            .collect();
        let average_floor = floors.iter().sum::<f64>() / floors.len().max(1) as f64;
        let peak_floor = floors.iter().copied().fold(0.0, f64::max);
        let denominator = ctx.balance().max(peak_floor);

        let ratio = if denominator > 0.0 {
            ensure_finite(self.kind(), "balance ratio", average_floor / denominator)?
                .clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(FactorScore::scored(
            self.kind(),
            Self::ratio_score(ratio),
            metrics([
                ("current_balance", ctx.balance()),
                ("minimum_balance", to_f64(lowest)),
                ("average_daily_minimum", average_floor),
                ("ratio", ratio),
                ("days_tracked", floors.len() as f64),
            ]),
        ))
    }
}
