//! Staking and farming engagement.

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction, StakingRecord};
use credit_core::ProtocolRegistry;
use rust_decimal::Decimal;

use super::FactorCalculator;
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, metrics, to_f64};

pub struct StakingEngagement;

impl StakingEngagement {
    /// Points for value locked, by USD tier. Without a conversion rate only
    /// the presence of locked value can be credited.
    pub fn value_points(locked_sol: f64, locked_usd: Option<f64>) -> f64 {
        match locked_usd {
            Some(usd) if usd >= 5000.0 => 40.0,
            Some(usd) if usd >= 1000.0 => 30.0,
            Some(usd) if usd > 0.0 => 20.0,
            Some(_) => 0.0,
            None if locked_sol > 0.0 => 20.0,
            None => 0.0,
        }
    }

    pub fn duration_points(average_days: f64) -> f64 {
        if average_days >= 30.0 {
            30.0
        } else if average_days >= 14.0 {
            20.0
        } else if average_days > 0.0 {
            10.0
        } else {
            0.0
        }
    }

    pub fn reputation_points(reputable_ratio: f64) -> f64 {
        if reputable_ratio >= 0.8 {
            30.0
        } else if reputable_ratio >= 0.5 {
            20.0
        } else if reputable_ratio > 0.0 {
            10.0
        } else {
            0.0
        }
    }

    fn is_reputable(record: &StakingRecord, registry: &ProtocolRegistry) -> bool {
        record
            .validator_name
            .as_deref()
            .or_else(|| registry.validator_name(&record.validator_address))
            .is_some_and(|name| registry.is_reputable(name))
    }
}

impl FactorCalculator for StakingEngagement {
    fn kind(&self) -> FactorKind {
        FactorKind::StakingEngagement
    }

    fn calculate(
        &self,
        _history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        let records = ctx.staking;
        if records.is_empty() {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }

        let locked: Decimal = records
            .iter()
            .filter(|r| r.is_locked())
            .map(|r| r.amount.abs())
            .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount));
        let locked_sol = to_f64(locked);
        let locked_usd = ctx.rate().map(|rate| locked_sol * rate);

        let average_days = records
            .iter()
            .map(|r| r.duration_days(ctx.as_of) as f64)
            .sum::<f64>()
            / records.len() as f64;
        let reputable = records
            .iter()
            .filter(|r| Self::is_reputable(r, ctx.registry))
            .count();
        let reputable_ratio = ensure_finite(
            self.kind(),
            "reputation ratio",
            reputable as f64 / records.len() as f64,
        )?;

        let value_points = Self::value_points(locked_sol, locked_usd);
        let duration_points = Self::duration_points(average_days);
        let reputation_points = Self::reputation_points(reputable_ratio);
        let total = (value_points + duration_points + reputation_points).min(100.0);

        Ok(FactorScore::scored(
            self.kind(),
            total,
            metrics([
                ("position_count", records.len() as f64),
                ("locked_sol", locked_sol),
                ("locked_usd", locked_usd.unwrap_or(0.0)),
                ("average_duration_days", average_days),
                ("reputable_ratio", reputable_ratio),
                ("value_points", value_points),
                ("duration_points", duration_points),
                ("reputation_points", reputation_points),
            ]),
        ))
    }
}
