//! Inputs to a scoring pass.

use credit_core::normalizer::normalize_values;
use credit_core::types::{NormalizedTransaction, StakingRecord};
use credit_core::ProtocolRegistry;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::util::to_f64;

/// Everything the engine knows about one wallet.
#[derive(Debug, Clone, Default)]
pub struct WalletActivity {
    pub transactions: Vec<NormalizedTransaction>,
    pub staking: Vec<StakingRecord>,
    /// Current balance in the fee currency (SOL).
    pub current_balance: Decimal,
    /// USD per SOL, when known.
    pub conversion_rate: Option<Decimal>,
    /// Reference time (unix seconds) for every age and window calculation.
    pub as_of: i64,
}

impl WalletActivity {
    pub fn new(transactions: Vec<NormalizedTransaction>, as_of: i64) -> Self {
        Self {
            transactions,
            as_of,
            ..Default::default()
        }
    }

    /// Normalize raw indexer records, signing nested transfers from `wallet`'s
    /// point of view.
    pub fn from_raw(values: &[Value], wallet: Option<&str>, as_of: i64) -> Self {
        Self::new(normalize_values(values, wallet), as_of)
    }

    pub fn with_staking(mut self, staking: Vec<StakingRecord>) -> Self {
        self.staking = staking;
        self
    }

    pub fn with_balance(mut self, current_balance: Decimal) -> Self {
        self.current_balance = current_balance;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.conversion_rate = Some(rate);
        self
    }

    pub fn context<'a>(&'a self, registry: &'a ProtocolRegistry) -> ScoringContext<'a> {
        ScoringContext {
            registry,
            staking: &self.staking,
            current_balance: self.current_balance,
            conversion_rate: self.conversion_rate,
            as_of: self.as_of,
        }
    }
}

/// Read-only view handed to every calculator.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub registry: &'a ProtocolRegistry,
    pub staking: &'a [StakingRecord],
    pub current_balance: Decimal,
    pub conversion_rate: Option<Decimal>,
    pub as_of: i64,
}

impl ScoringContext<'_> {
    /// Conversion rate as f64; non-positive rates count as unknown.
    pub fn rate(&self) -> Option<f64> {
        self.conversion_rate
            .map(to_f64)
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn balance(&self) -> f64 {
        to_f64(self.current_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_view() {
        let registry = ProtocolRegistry::default();
        let activity = WalletActivity::new(Vec::new(), 1_000)
            .with_balance(Decimal::new(25, 1))
            .with_rate(Decimal::ZERO);
        let ctx = activity.context(&registry);

        assert_eq!(ctx.balance(), 2.5);
        assert_eq!(ctx.rate(), None);
        assert_eq!(ctx.as_of, 1_000);
        assert!(ctx.staking.is_empty());
    }

    #[test]
    fn test_from_raw_normalizes() {
        let activity = WalletActivity::from_raw(&[json!({"amount": "3"}), json!(null)], None, 5);
        assert_eq!(activity.transactions.len(), 2);
        assert_eq!(activity.transactions[0].amount, Decimal::from(3));
    }
}
