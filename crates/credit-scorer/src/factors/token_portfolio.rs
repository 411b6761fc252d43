//! Token portfolio health: share of activity in blue-chip and stable assets.

use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction};

use super::{require_history, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{ensure_finite, metrics, to_f64};

pub struct TokenPortfolio;

impl TokenPortfolio {
    pub fn quality_score(quality_pct: f64) -> f64 {
        let q = quality_pct;
        if q >= 60.0 {
            90.0 + ((q - 60.0) / 4.0).min(10.0)
        } else if q >= 40.0 {
            70.0 + (q - 40.0) * 0.95
        } else if q >= 20.0 {
            40.0 + (q - 20.0) * 1.45
        } else {
            q * 1.95
        }
    }
}

impl FactorCalculator for TokenPortfolio {
    fn kind(&self) -> FactorKind {
        FactorKind::TokenPortfolio
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let registry = ctx.registry;
        let movements: Vec<&NormalizedTransaction> =
            history.iter().filter(|tx| !tx.amount.is_zero()).collect();
        if movements.is_empty() {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }

        let is_quality = |tx: &NormalizedTransaction| {
            registry.is_blue_chip(&tx.currency) || registry.is_stablecoin(&tx.currency)
        };

        // Value-weighted only when every movement can be priced: the fee
        // currency through the rate, stablecoins at par
        let priced: Option<Vec<(f64, bool)>> = ctx.rate().and_then(|rate| {
            movements
                .iter()
                .map(|tx| {
                    let amount = to_f64(tx.amount).abs();
                    let value = if registry.is_fee_currency(&tx.currency) {
                        Some(amount * rate)
                    } else if registry.is_stablecoin(&tx.currency) {
                        Some(amount)
                    } else {
                        None
                    };
                    value.map(|v| (v, is_quality(tx)))
                })
                .collect()
        });
        let (total_value, quality_value) = priced
            .iter()
            .flatten()
            .fold((0.0, 0.0), |(total, quality), &(value, good)| {
                (total + value, if good { quality + value } else { quality })
            });

        let value_weighted = total_value > 0.0;
        let quality_count = movements.iter().filter(|tx| is_quality(tx)).count();
        let quality_pct = if value_weighted {
            quality_value / total_value * 100.0
        } else {
            quality_count as f64 / movements.len() as f64 * 100.0
        };
        let quality_pct = ensure_finite(self.kind(), "quality share", quality_pct)?;

        Ok(FactorScore::scored(
            self.kind(),
            Self::quality_score(quality_pct),
            metrics([
                ("quality_pct", quality_pct),
                ("quality_count", quality_count as f64),
                ("movement_count", movements.len() as f64),
                ("total_value_usd", total_value),
                ("value_weighted", if value_weighted { 1.0 } else { 0.0 }),
            ]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::testing::{activity, run, sol, token};
    use credit_core::types::Band;
    use rust_decimal::Decimal;

    #[test]
    fn test_blue_chip_only_is_excellent() {
        let history = vec![sol(1, 10), token(2, 50, "USDC"), token(3, 1, "ETH")];
        let score = run(&TokenPortfolio, &activity(history)).unwrap();
        assert_eq!(score.metric("quality_pct"), Some(100.0));
        assert_eq!(score.value, 100);
    }

    #[test]
    fn test_count_weighted_without_rate() {
        let history = vec![
            sol(1, 10),
            token(2, 1000, "BONK"),
            token(3, 1000, "WIF"),
            token(4, 1000, "MEME"),
        ];
        let score = run(&TokenPortfolio, &activity(history)).unwrap();
        assert_eq!(score.metric("quality_pct"), Some(25.0));
        assert_eq!(score.metric("value_weighted"), Some(0.0));
        assert_eq!(score.band, Band::Moderate);
    }

    #[test]
    fn test_value_weighted_with_rate() {
        // 10 SOL at 100 USD plus 5 USDC
        let history = vec![sol(1, 100), token(2, 5, "USDC")];
        let score = run(
            &TokenPortfolio,
            &activity(history).with_rate(Decimal::from(100)),
        )
        .unwrap();
        assert_eq!(score.metric("value_weighted"), Some(1.0));
        assert_eq!(score.metric("total_value_usd"), Some(1005.0));
        assert_eq!(score.metric("quality_pct"), Some(100.0));
    }

    #[test]
    fn test_unpriced_tokens_fall_back_to_counts() {
        let history = vec![
            sol(1, 100),
            token(2, 2, "ETH"),
            token(3, 1, "USDC"),
            token(4, 100_000, "BONK"),
        ];
        let without_rate = run(&TokenPortfolio, &activity(history.clone())).unwrap();
        let with_rate = run(
            &TokenPortfolio,
            &activity(history).with_rate(Decimal::from(100)),
        )
        .unwrap();

        assert_eq!(with_rate.metric("value_weighted"), Some(0.0));
        assert_eq!(with_rate.metric("quality_pct"), Some(75.0));
        assert_eq!(with_rate.value, without_rate.value);
        assert_eq!(with_rate.band, Band::Excellent);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(TokenPortfolio::quality_score(60.0), 90.0);
        assert_eq!(TokenPortfolio::quality_score(40.0), 70.0);
        assert_eq!(TokenPortfolio::quality_score(20.0), 40.0);
        assert_eq!(TokenPortfolio::quality_score(0.0), 0.0);
    }
}
