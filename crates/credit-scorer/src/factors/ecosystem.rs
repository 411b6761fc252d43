//! Strategic tool usage and ecosystem coverage.
//!
//! Rewards wallets that route activity through aggregators, limit orders,
//! DCA, multisig and similar tooling, then subtracts a penalty when a large
//! share of the protocols touched are gambling or derivatives venues.

use std::collections::{BTreeMap, BTreeSet};

use credit_core::registry::{RiskTier, ToolKind};
use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};

use super::{require_history, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::Result;
use crate::util::{ensure_finite, metrics};

pub struct EcosystemCoverage;

impl EcosystemCoverage {
    pub fn base_score(usage_ratio: f64, diversity_ratio: f64) -> f64 {
        (usage_ratio * 50.0 + diversity_ratio * 50.0)
            .round()
            .clamp(20.0, 100.0)
    }

    pub fn risk_penalty(high_risk_share: f64) -> f64 {
        if high_risk_share > 0.5 {
            40.0
        } else if high_risk_share > 0.3 {
            25.0
        } else if high_risk_share > 0.1 {
            10.0
        } else {
            0.0
        }
    }
}

impl FactorCalculator for EcosystemCoverage {
    fn kind(&self) -> FactorKind {
        FactorKind::EcosystemCoverage
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let registry = ctx.registry;
        let mut per_kind: BTreeMap<ToolKind, usize> = BTreeMap::new();
        let mut tool_txs = 0usize;
        for tx in history {
            let mut matched = false;
            for category in registry.tools.iter().filter(|c| c.matches(tx)) {
                *per_kind.entry(category.kind).or_insert(0) += 1;
                matched = true;
            }
            if matched {
                tool_txs += 1;
            }
        }

        let category_count = registry.tools.len().max(1) as f64;
        let usage_ratio = (tool_txs as f64 / history.len() as f64).min(1.0);
        let diversity_ratio = per_kind.len() as f64 / category_count;
        let base = Self::base_score(usage_ratio, diversity_ratio);

        let protocols: BTreeSet<String> = history
            .iter()
            .map(|tx| {
                if tx.protocol.is_empty() {
                    tx.source.to_lowercase()
                } else {
                    tx.protocol.to_lowercase()
                }
            })
            .filter(|label| !label.is_empty())
            .collect();
        let high_risk = protocols
            .iter()
            .filter(|p| registry.classify_risk(p) == RiskTier::High)
            .count();
        let high_risk_share = if protocols.is_empty() {
            0.0
        } else {
            ensure_finite(
                self.kind(),
                "risk share",
                high_risk as f64 / protocols.len() as f64,
            )?
        };
        let penalty = Self::risk_penalty(high_risk_share);

        let mut scores = metrics([
            ("tool_transaction_count", tool_txs as f64),
            ("tool_types_used", per_kind.len() as f64),
            ("usage_ratio", usage_ratio),
            ("diversity_ratio", diversity_ratio),
            ("protocols_seen", protocols.len() as f64),
            ("high_risk_share", high_risk_share),
            ("base_score", base),
            ("risk_penalty", penalty),
        ]);
        for (kind, count) in &per_kind {
            scores.insert(format!("tool_{}", kind.id()), *count as f64);
        }

        Ok(FactorScore::scored(
            self.kind(),
            (base - penalty).clamp(0.0, 100.0),
            scores,
        ))
    }
}
