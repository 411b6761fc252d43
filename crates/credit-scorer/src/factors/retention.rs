//! Retention behavior: how long major tokens are held and how much the
//! wallet's daily activity swings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};
use statrs::statistics::{Data, Distribution};

use super::{require_history, timestamped, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, metrics, round_to, to_f64, SECONDS_PER_DAY};

/// Volatility assumed when fewer than two days of activity exist.
pub const DEFAULT_VOLATILITY_PCT: f64 = 20.0;

/// Hold time that earns the full hold-time sub-score.
const FULL_HOLD_DAYS: f64 = 30.0;

/// Day-over-day change at which the volatility sub-score reaches zero.
const ZERO_SCORE_VOLATILITY_PCT: f64 = 10.0;

pub struct Retention;

impl Retention {
    /// Average days since first activity across the major tokens the wallet
    /// touched; falls back to the earliest transaction of any kind.
    fn hold_time_days(timestamped: &[&NormalizedTransaction], ctx: &ScoringContext<'_>) -> f64 {
        let held: Vec<f64> = ctx
            .registry
            .major_tokens
            .iter()
            .filter_map(|symbol| {
                timestamped
                    .iter()
                    .filter(|tx| tx.is_currency(symbol))
                    .map(|tx| tx.timestamp)
                    .min()
            })
            .map(|first| age_days(first, ctx.as_of))
            .collect();

        if held.is_empty() {
            timestamped
                .iter()
                .map(|tx| tx.timestamp)
                .min()
                .map(|first| age_days(first, ctx.as_of))
                .unwrap_or(0.0)
        } else {
            held.iter().sum::<f64>() / held.len() as f64
        }
    }

    /// Mean absolute day-over-day percentage change of daily net movement.
    fn volatility_pct(timestamped: &[&NormalizedTransaction]) -> f64 {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for tx in timestamped {
            if let Some(day) = tx.date() {
                *daily.entry(day).or_insert(0.0) += to_f64(tx.amount);
            }
        }

        let totals: Vec<f64> = daily.into_values().collect();
        let changes: Vec<f64> = totals
            .windows(2)
            .filter(|pair| pair[0] != 0.0)
            .map(|pair| ((pair[1] - pair[0]) / pair[0]).abs() * 100.0)
            .filter(|change| change.is_finite())
            .collect();

        if changes.is_empty() {
            return DEFAULT_VOLATILITY_PCT;
        }
        Data::new(changes).mean().unwrap_or(DEFAULT_VOLATILITY_PCT)
    }
}

fn age_days(first: i64, as_of: i64) -> f64 {
    (as_of.saturating_sub(first) as f64 / SECONDS_PER_DAY as f64).max(0.0)
}

impl FactorCalculator for Retention {
    fn kind(&self) -> FactorKind {
        FactorKind::Retention
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let txs: Vec<&NormalizedTransaction> = timestamped(history).collect();
        if txs.is_empty() {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }

        let hold_days = ensure_finite(self.kind(), "hold time", Self::hold_time_days(&txs, ctx))?;
        let volatility = ensure_finite(self.kind(), "volatility", Self::volatility_pct(&txs))?;

        let hold_score = (hold_days / FULL_HOLD_DAYS * 50.0).min(50.0).round();
        let volatility_score = (50.0 - volatility / ZERO_SCORE_VOLATILITY_PCT * 50.0)
            .clamp(0.0, 50.0)
            .round();

        Ok(FactorScore::scored(
            self.kind(),
            hold_score + volatility_score,
            metrics([
                ("hold_time_value", round_to(hold_days, 1)),
                ("volatility_value", round_to(volatility, 1)),
                ("hold_time_score", hold_score),
                ("volatility_score", volatility_score),
            ]),
        ))
    }
}
