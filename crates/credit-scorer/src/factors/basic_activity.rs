//! Basic activity level: a step function on transaction count.

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};

use super::{require_history, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::Result;
use crate::util::metrics;

/// (minimum count, score), highest tier first.
const TIERS: [(usize, f64); 4] = [(1000, 100.0), (500, 80.0), (100, 50.0), (10, 20.0)];

pub struct BasicActivity;

impl BasicActivity {
    pub fn tier_score(count: usize) -> f64 {
        TIERS
            .iter()
            .find(|(min, _)| count >= *min)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    }
}

impl FactorCalculator for BasicActivity {
    fn kind(&self) -> FactorKind {
        FactorKind::BasicActivity
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        _ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let count = history.len();
        Ok(FactorScore::scored(
            self.kind(),
            Self::tier_score(count),
            metrics([("transaction_count", count as f64)]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::testing::{activity, run, sol};
    use credit_core::types::Band;

    fn history(count: usize) -> Vec<NormalizedTransaction> {
        (0..count).map(|i| sol((i % 30) as i64, 1)).collect()
    }

    #[test]
    fn test_tier_boundaries() {
        for (count, expected) in [
            (9, 0),
            (10, 20),
            (99, 20),
            (100, 50),
            (499, 50),
            (500, 80),
            (999, 80),
            (1000, 100),
        ] {
            let score = run(&BasicActivity, &activity(history(count))).unwrap();
            assert_eq!(score.value, expected, "count {count}");
        }
    }

    #[test]
    fn test_empty_history_has_no_data() {
        assert!(run(&BasicActivity, &activity(Vec::new())).is_err());
    }

    #[test]
    fn test_small_history_is_scored_poor() {
        let score = run(&BasicActivity, &activity(history(3))).unwrap();
        assert_eq!(score.value, 0);
        assert_eq!(score.band, Band::Poor);
        assert_eq!(score.metric("transaction_count"), Some(3.0));
    }
}
