//! Scoring engine: runs every factor calculator and aggregates the results.

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};
use credit_core::ProtocolRegistry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::aggregator::{aggregate, ScoringWeights, WeightedAggregate};
use crate::context::{ScoringContext, WalletActivity};
use crate::error::ScoreError;
use crate::factors::{all_calculators, FactorCalculator};

/// Output of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReport {
    /// One entry per factor, in [`FactorKind::ALL`] order.
    pub factors: Vec<FactorScore>,
    pub aggregate: WeightedAggregate,
}

impl CreditReport {
    pub fn factor(&self, kind: FactorKind) -> Option<&FactorScore> {
        self.factors.iter().find(|f| f.name == kind)
    }
}

/// Owns the calculators, registry and weights; stateless between passes.
pub struct CreditScorer {
    registry: ProtocolRegistry,
    weights: ScoringWeights,
    calculators: Vec<Box<dyn FactorCalculator>>,
}

impl Default for CreditScorer {
    fn default() -> Self {
        Self::new(ProtocolRegistry::default(), ScoringWeights::default())
    }
}

impl CreditScorer {
    pub fn new(registry: ProtocolRegistry, weights: ScoringWeights) -> Self {
        Self {
            registry,
            weights,
            calculators: all_calculators(),
        }
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a wallet, running calculators one after another.
    pub fn score(&self, activity: &WalletActivity) -> CreditReport {
        let ctx = activity.context(&self.registry);
        let factors = self
            .calculators
            .iter()
            .map(|c| run_calculator(c.as_ref(), &activity.transactions, &ctx))
            .collect();
        self.finish(factors)
    }

    /// Score a wallet with calculators spread over the rayon pool. Produces
    /// exactly the same report as [`CreditScorer::score`].
    pub fn score_parallel(&self, activity: &WalletActivity) -> CreditReport {
        let ctx = activity.context(&self.registry);
        let factors = self
            .calculators
            .par_iter()
            .map(|c| run_calculator(c.as_ref(), &activity.transactions, &ctx))
            .collect();
        self.finish(factors)
    }

    /// Normalize raw indexer records and score them.
    pub fn score_raw(&self, values: &[Value], wallet: Option<&str>, as_of: i64) -> CreditReport {
        self.score(&WalletActivity::from_raw(values, wallet, as_of))
    }

    /// Score a single factor.
    pub fn score_factor(
        &self,
        kind: FactorKind,
        activity: &WalletActivity,
    ) -> Option<FactorScore> {
        let ctx = activity.context(&self.registry);
        self.calculators
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| run_calculator(c.as_ref(), &activity.transactions, &ctx))
    }

    fn finish(&self, factors: Vec<FactorScore>) -> CreditReport {
        let aggregate = aggregate(&factors, &self.weights);
        debug!(
            overall = aggregate.overall_score,
            credit = aggregate.credit_score,
            factors_used = aggregate.factors_used,
            "Scoring pass complete"
        );
        CreditReport { factors, aggregate }
    }
}

/// Run one calculator, turning any failure into that factor's NoData state.
fn run_calculator(
    calculator: &dyn FactorCalculator,
    history: &[NormalizedTransaction],
    ctx: &ScoringContext<'_>,
) -> FactorScore {
    let kind = calculator.kind();
    match calculator.calculate(history, ctx) {
        Ok(score) => score,
        Err(ScoreError::InsufficientData { .. }) => {
            debug!(factor = %kind, "No data for factor");
            FactorScore::no_data(kind)
        }
        Err(e) => {
            warn!(factor = %kind, error = %e, "Factor calculation failed, reporting no data");
            FactorScore::no_data(kind)
        }
    }
}
