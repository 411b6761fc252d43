//! Factor calculators.
//!
//! Each calculator reduces the normalized history (plus whatever it needs
//! from the [`ScoringContext`]) to one [`FactorScore`]. Calculators share no
//! state and may run in any order or in parallel.

use credit_core::types::{is_uninformative, FactorKind, FactorScore, NormalizedTransaction};

use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};

pub mod basic_activity;
pub mod borrowing;
pub mod collateral;
pub mod ecosystem;
pub mod min_balance;
pub mod net_flow;
pub mod retention;
pub mod staking;
pub mod token_portfolio;
pub mod tx_patterns;
pub mod wallet_age;

pub use basic_activity::BasicActivity;
pub use borrowing::Borrowing;
pub use collateral::CollateralManagement;
pub use ecosystem::EcosystemCoverage;
pub use min_balance::MinBalanceStability;
pub use net_flow::NetFlow;
pub use retention::Retention;
pub use staking::StakingEngagement;
pub use token_portfolio::TokenPortfolio;
pub use tx_patterns::TransactionPatterns;
pub use wallet_age::WalletAge;

/// One behavioral dimension of the credit score.
pub trait FactorCalculator: Send + Sync {
    fn kind(&self) -> FactorKind;

    /// Score the history. An `Err` means the factor has no usable data.
    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore>;
}

/// All calculators, in [`FactorKind::ALL`] order.
pub fn all_calculators() -> Vec<Box<dyn FactorCalculator>> {
    vec![
        Box::new(BasicActivity),
        Box::new(NetFlow),
        Box::new(MinBalanceStability),
        Box::new(Retention),
        Box::new(Borrowing),
        Box::new(CollateralManagement),
        Box::new(StakingEngagement),
        Box::new(TransactionPatterns),
        Box::new(WalletAge),
        Box::new(TokenPortfolio),
        Box::new(EcosystemCoverage),
    ]
}

/// Empty or all-zero history carries no signal for any factor.
pub(crate) fn require_history(factor: FactorKind, history: &[NormalizedTransaction]) -> Result<()> {
    if is_uninformative(history) {
        return Err(ScoreError::InsufficientData { factor });
    }
    Ok(())
}

/// Records usable for age and ordering calculations.
pub(crate) fn timestamped(
    history: &[NormalizedTransaction],
) -> impl Iterator<Item = &NormalizedTransaction> {
    history.iter().filter(|tx| tx.has_timestamp())
}
