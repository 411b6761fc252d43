//! Improvement plan and share text derived from a finished report.

use std::fmt;

use credit_core::types::{FactorKind, FactorScore};
use serde::{Deserialize, Serialize};

use crate::aggregator::WeightedAggregate;
use crate::engine::CreditReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Factor this addresses; `None` for general advice.
    pub factor: Option<FactorKind>,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub difficulty: Difficulty,
}

impl Recommendation {
    fn new(
        factor: Option<FactorKind>,
        title: &str,
        description: &str,
        impact: Impact,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            factor,
            title: title.to_string(),
            description: description.to_string(),
            impact,
            difficulty,
        }
    }
}

/// Score below which a factor gets a targeted recommendation, and the
/// recommendation itself.
fn targeted(kind: FactorKind) -> (u8, Recommendation) {
    use Difficulty::*;
    use Impact::*;

    let (threshold, title, description, impact, difficulty) = match kind {
        FactorKind::BasicActivity => (
            50,
            "Increase Activity",
            "Use this wallet for everyday transactions so its history builds up.",
            Medium,
            Easy,
        ),
        FactorKind::NetFlow => (
            70,
            "Balance Your Outflows",
            "Keep more SOL in reserve and maintain a balanced outflow-to-inflow ratio.",
            High,
            Moderate,
        ),
        FactorKind::MinBalanceStability => (
            70,
            "Keep a Stable Minimum Balance",
            "Avoid draining the wallet; a steady floor balance shows reliability.",
            High,
            Moderate,
        ),
        FactorKind::Retention => (
            70,
            "Hold Major Tokens Longer",
            "Holding SOL and stablecoins for weeks at a time improves retention.",
            Medium,
            Moderate,
        ),
        FactorKind::Borrowing => (
            80,
            "Repay Loans On Time",
            "Repay every borrow in full and avoid positions that risk liquidation.",
            High,
            Moderate,
        ),
        FactorKind::CollateralManagement => (
            70,
            "Manage Collateral Proactively",
            "Keep loan-to-value below 50% and top up collateral before it is needed.",
            High,
            Moderate,
        ),
        FactorKind::StakingEngagement => (
            60,
            "Stake With Reputable Validators",
            "Stake part of your SOL with a well-known validator and keep it staked.",
            Medium,
            Easy,
        ),
        FactorKind::TransactionPatterns => (
            80,
            "Keep Enough SOL for Fees",
            "Ensure all transactions are successful by maintaining sufficient SOL for gas fees.",
            High,
            Easy,
        ),
        FactorKind::WalletAge => (
            90,
            "Increase Account Age",
            "Continue using this wallet consistently over time. Age is a major factor.",
            Medium,
            Hard,
        ),
        FactorKind::TokenPortfolio => (
            70,
            "Diversify Into Quality Assets",
            "Use your wallet for various transaction types and favor blue-chip tokens and stablecoins.",
            Medium,
            Moderate,
        ),
        FactorKind::EcosystemCoverage => (
            60,
            "Use Strategic Tools",
            "Route trades through aggregators, limit orders or DCA and avoid gambling protocols.",
            Low,
            Moderate,
        ),
    };
    (
        threshold,
        Recommendation::new(Some(kind), title, description, impact, difficulty),
    )
}

fn general() -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            None,
            "Maintain a Safety Buffer",
            "Always keep enough SOL for gas fees to avoid failed transactions.",
            Impact::High,
            Difficulty::Easy,
        ),
        Recommendation::new(
            None,
            "Regular Activity",
            "Consistent, regular wallet activity improves your score over time.",
            Impact::Medium,
            Difficulty::Easy,
        ),
        Recommendation::new(
            None,
            "Monitor Your Score",
            "Track your credit score monthly to see improvements and catch issues.",
            Impact::Low,
            Difficulty::Easy,
        ),
    ]
}

/// The weakest factors of a report and what to do about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementPlan {
    /// Up to two lowest-scoring factors that have data.
    pub weakest: Vec<FactorScore>,
    pub recommendations: Vec<Recommendation>,
}

impl ImprovementPlan {
    pub fn from_report(report: &CreditReport) -> Self {
        let mut scored: Vec<&FactorScore> = report.factors.iter().filter(|f| f.has_data()).collect();
        scored.sort_by_key(|f| f.value);
        let weakest = scored.iter().take(2).map(|f| (*f).clone()).collect();

        let mut recommendations: Vec<Recommendation> = report
            .factors
            .iter()
            .filter(|f| f.has_data())
            .filter_map(|f| {
                let (threshold, recommendation) = targeted(f.name);
                (f.value < threshold).then_some(recommendation)
            })
            .collect();
        recommendations.extend(general());

        Self {
            weakest,
            recommendations,
        }
    }

    pub fn count_by_impact(&self, impact: Impact) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.impact == impact)
            .count()
    }
}

/// One-line summary suitable for sharing.
pub fn share_text(aggregate: &WeightedAggregate) -> String {
    format!(
        "My wallet credit score: {} ({})",
        aggregate.credit_score, aggregate.label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{aggregate, ScoringWeights};
    use std::collections::BTreeMap;

    fn report(values: &[(FactorKind, f64)]) -> CreditReport {
        let factors: Vec<FactorScore> = FactorKind::ALL
            .iter()
            .map(|kind| {
                values
                    .iter()
                    .find(|(k, _)| k == kind)
                    .map(|(k, v)| FactorScore::scored(*k, *v, BTreeMap::new()))
                    .unwrap_or_else(|| FactorScore::no_data(*kind))
            })
            .collect();
        let aggregate = aggregate(&factors, &ScoringWeights::default());
        CreditReport { factors, aggregate }
    }

    #[test]
    fn test_weakest_factors() {
        let plan = ImprovementPlan::from_report(&report(&[
            (FactorKind::NetFlow, 95.0),
            (FactorKind::WalletAge, 35.0),
            (FactorKind::BasicActivity, 20.0),
            (FactorKind::Retention, 80.0),
        ]));

        let weakest: Vec<_> = plan.weakest.iter().map(|f| f.name).collect();
        assert_eq!(weakest, vec![FactorKind::BasicActivity, FactorKind::WalletAge]);
    }

    #[test]
    fn test_recommendations_follow_thresholds() {
        let plan = ImprovementPlan::from_report(&report(&[
            (FactorKind::NetFlow, 95.0),
            (FactorKind::WalletAge, 89.0),
            (FactorKind::TransactionPatterns, 85.0),
        ]));

        let targeted: Vec<_> = plan.recommendations.iter().filter_map(|r| r.factor).collect();
        assert_eq!(targeted, vec![FactorKind::WalletAge]);
        assert_eq!(plan.recommendations.len(), 4);
        assert_eq!(plan.recommendations[1].title, "Maintain a Safety Buffer");
        assert_eq!(plan.count_by_impact(Impact::Low), 1);
    }

    #[test]
    fn test_no_data_factors_get_no_targeted_advice() {
        let plan = ImprovementPlan::from_report(&report(&[]));
        assert!(plan.weakest.is_empty());
        assert_eq!(plan.recommendations.len(), 3);
    }

    #[test]
    fn test_share_text() {
        let report = report(&[(FactorKind::NetFlow, 72.0)]);
        assert_eq!(report.aggregate.credit_score, 696);
        assert_eq!(share_text(&report.aggregate), "My wallet credit score: 696 (Good)");
    }
}
