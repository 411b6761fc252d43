//! Transaction patterns and consistency.
//!
//! Combines weekly cadence over the trailing window with whether the
//! fee-currency balance stayed above a per-wallet safety buffer.

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};
use rust_decimal::Decimal;

use super::min_balance::replay_order;
use super::{require_history, timestamped, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, metrics, to_f64, SECONDS_PER_DAY};

/// Trailing window for cadence.
pub const WINDOW_DAYS: i64 = 90;

/// Fee assumed when no fee was observed (5000 lamports).
pub const DEFAULT_FEE_SOL: f64 = 0.000005;

/// Smallest safety margin kept on top of the average fee.
const MIN_SAFETY_MARGIN_SOL: f64 = 0.1;

/// Additional margin per weekly transaction.
const MARGIN_PER_WEEKLY_TX: f64 = 0.005;

pub struct TransactionPatterns;

impl TransactionPatterns {
    pub fn frequency_points(average_weekly: f64) -> f64 {
        if average_weekly >= 10.0 {
            50.0
        } else if average_weekly >= 5.0 {
            35.0
        } else if average_weekly >= 1.0 {
            20.0
        } else {
            10.0
        }
    }

    pub fn buffer_points(breaches: usize, minimum: f64, buffer: f64) -> f64 {
        if breaches == 0 && minimum >= buffer {
            50.0
        } else if breaches <= 2 && minimum > buffer / 2.0 {
            35.0
        } else if breaches <= 5 {
            20.0
        } else {
            10.0
        }
    }

    fn average_fee(history: &[NormalizedTransaction]) -> f64 {
        let fees: Vec<f64> = history
            .iter()
            .filter(|tx| tx.fee > Decimal::ZERO)
            .map(|tx| to_f64(tx.fee))
            .collect();
        if fees.is_empty() {
            DEFAULT_FEE_SOL
        } else {
            fees.iter().sum::<f64>() / fees.len() as f64
        }
    }
}

impl FactorCalculator for TransactionPatterns {
    fn kind(&self) -> FactorKind {
        FactorKind::TransactionPatterns
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

        let window_secs = ctx
            .as_of
            .saturating_sub(first)
            .clamp(0, WINDOW_DAYS * SECONDS_PER_DAY);
        let window_start = ctx.as_of - window_secs;
        let weeks = (window_secs as f64 / (7 * SECONDS_PER_DAY) as f64).max(1.0);
        let in_window = timestamped(history)
            .filter(|tx| tx.timestamp >= window_start)
            .count();
        let average_weekly =
            ensure_finite(self.kind(), "weekly cadence", in_window as f64 / weeks)?;

        let average_fee = Self::average_fee(history);
        let buffer = average_fee + MIN_SAFETY_MARGIN_SOL.max(MARGIN_PER_WEEKLY_TX * average_weekly);

        // Replay the balance backward, counting points below the buffer
        let mut running = ctx.current_balance;
        let mut minimum = ctx.balance();
        let mut breaches = usize::from(minimum < buffer);
        for tx in replay_order(history, ctx) {
            running = running.saturating_sub(tx.amount);
            let balance = to_f64(running);
            minimum = minimum.min(balance);
            if balance < buffer {
                breaches += 1;
            }
        }

        let frequency_points = Self::frequency_points(average_weekly);
        let buffer_points = Self::buffer_points(breaches, minimum, buffer);

        Ok(FactorScore::scored(
            self.kind(),
            (frequency_points + buffer_points).min(100.0),
            metrics([
                ("average_weekly_transactions", average_weekly),
                ("window_days", (window_secs / SECONDS_PER_DAY) as f64),
                ("average_fee", average_fee),
                ("fee_buffer", buffer),
                ("minimum_balance", minimum),
                ("buffer_breaches", breaches as f64),
                ("frequency_points", frequency_points),
                ("buffer_points", buffer_points),
            ]),
        ))
    }
}
