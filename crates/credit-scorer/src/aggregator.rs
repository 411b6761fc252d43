//! Weighted aggregation of factor scores.
//!
//! Only factors that produced data take part. Their weights are renormalized
//! so the overall score is always a convex combination of the scores that
//! exist, then mapped onto the 300-850 credit scale.

use credit_core::types::{clamp_score, Band, BandThresholds, FactorKind, FactorScore};
use serde::{Deserialize, Serialize};

/// Lowest credit score.
pub const CREDIT_FLOOR: u16 = 300;

/// Credit points per overall point (300 + 100 * 5.5 = 850).
pub const CREDIT_SPAN_PER_POINT: f64 = 5.5;

/// Per-factor aggregation weights.
///
/// The default table sums to 1.0, but any non-negative table works since
/// weights are renormalized over the factors present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub basic_activity: f64,
    pub net_flow: f64,
    pub min_balance_stability: f64,
    pub retention: f64,
    pub borrowing: f64,
    pub collateral_management: f64,
    pub staking_engagement: f64,
    pub transaction_patterns: f64,
    pub wallet_age: f64,
    pub token_portfolio: f64,
    pub ecosystem_coverage: f64,
}

impl ScoringWeights {
    pub const DEFAULT: Self = Self {
        basic_activity: 0.10,
        net_flow: 0.10,
        min_balance_stability: 0.10,
        retention: 0.15,
        borrowing: 0.10,
        collateral_management: 0.15,
        staking_engagement: 0.05,
        transaction_patterns: 0.10,
        wallet_age: 0.10,
        token_portfolio: 0.10,
        ecosystem_coverage: 0.05,
    };

    pub fn weight(&self, kind: FactorKind) -> f64 {
        let weight = match kind {
            FactorKind::BasicActivity => self.basic_activity,
            FactorKind::NetFlow => self.net_flow,
            FactorKind::MinBalanceStability => self.min_balance_stability,
            FactorKind::Retention => self.retention,
            FactorKind::Borrowing => self.borrowing,
            FactorKind::CollateralManagement => self.collateral_management,
            FactorKind::StakingEngagement => self.staking_engagement,
            FactorKind::TransactionPatterns => self.transaction_patterns,
            FactorKind::WalletAge => self.wallet_age,
            FactorKind::TokenPortfolio => self.token_portfolio,
            FactorKind::EcosystemCoverage => self.ecosystem_coverage,
        };
        if weight.is_finite() {
            weight.max(0.0)
        } else {
            0.0
        }
    }

    pub fn total(&self) -> f64 {
        FactorKind::ALL.iter().map(|k| self.weight(*k)).sum()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The combined score handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedAggregate {
    /// 0-100.
    pub overall_score: u8,
    /// 300-850.
    pub credit_score: u16,
    /// Band of the overall score; NoData when no factor had data.
    pub band: Band,
    /// Display label for `band`.
    pub label: String,
    /// Band of the credit score on its own scale.
    pub credit_band: Band,
    pub factors_used: usize,
}

/// Map a 0-100 overall score onto the 300-850 credit scale.
pub fn credit_score(overall: u8) -> u16 {
    let overall = overall.min(100) as f64;
    CREDIT_FLOOR + (overall * CREDIT_SPAN_PER_POINT).round() as u16
}

/// Combine factor scores into the overall and credit scores.
pub fn aggregate(scores: &[FactorScore], weights: &ScoringWeights) -> WeightedAggregate {
    let present: Vec<&FactorScore> = scores.iter().filter(|s| s.has_data()).collect();

    let weight_sum: f64 = present.iter().map(|s| weights.weight(s.name)).sum();
    let raw = if present.is_empty() {
        0.0
    } else if weight_sum > 0.0 {
        present
            .iter()
            .map(|s| s.value as f64 * weights.weight(s.name))
            .sum::<f64>()
            / weight_sum
    } else {
        // No weighted factor present: plain mean
        present.iter().map(|s| s.value as f64).sum::<f64>() / present.len() as f64
    };

    let overall_score = clamp_score(raw);
    let credit = credit_score(overall_score);
    let (band, credit_band) = if present.is_empty() {
        (Band::NoData, Band::NoData)
    } else {
        (
            BandThresholds::OVERALL.classify(overall_score as f64),
            BandThresholds::CREDIT_SCALE.classify(credit as f64),
        )
    };

    WeightedAggregate {
        overall_score,
        credit_score: credit,
        band,
        label: band.credit_label().to_string(),
        credit_band,
        factors_used: present.len(),
    }
}
