//! Borrowing behavior: repayment discipline on lending protocols.

use credit_core::registry::contains_any;
use credit_core::types::{FactorKind, FactorScore, NormalizedTransaction, TransactionType};
use credit_core::ProtocolRegistry;

use super::{require_history, FactorCalculator};
use crate::context::ScoringContext;
use crate::error::{Result, ScoreError};
use crate::util::{interpolate, metrics};

/// What a lending interaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingAction {
    Borrow,
    Repay,
    Liquidation,
    Other,
}

/// Classify a transaction as a lending interaction, if it is one.
pub fn lending_action(
    tx: &NormalizedTransaction,
    registry: &ProtocolRegistry,
) -> Option<LendingAction> {
    let text = tx.search_text();
    let is_lending = matches!(
        tx.tx_type,
        TransactionType::Borrow | TransactionType::Repay | TransactionType::Liquidation
    ) || contains_any(&text, &registry.lending_keywords)
        || registry.mentions_lending_protocol(&tx.source)
        || registry.mentions_lending_protocol(&tx.protocol);
    if !is_lending {
        return None;
    }

    let action = match tx.tx_type {
        TransactionType::Liquidation => LendingAction::Liquidation,
        TransactionType::Repay => LendingAction::Repay,
        TransactionType::Borrow => LendingAction::Borrow,
        _ if contains_any(&text, &registry.liquidation_keywords) => LendingAction::Liquidation,
        _ if contains_any(&text, &registry.repay_keywords) => LendingAction::Repay,
        _ if contains_any(&text, &registry.borrow_keywords) => LendingAction::Borrow,
        _ => LendingAction::Other,
    };
    Some(action)
}

pub struct Borrowing;

impl Borrowing {
    pub fn band_score(liquidations: usize, repayment_ratio: f64, interactions: usize) -> f64 {
        if liquidations == 0 && repayment_ratio >= 1.0 {
            90.0 + (interactions as f64).min(10.0)
        } else if liquidations == 0 && repayment_ratio >= 0.75 {
            interpolate(repayment_ratio, 0.75, 1.0, 70.0, 89.0)
        } else if liquidations <= 1 && repayment_ratio >= 0.4 {
            interpolate(repayment_ratio, 0.4, 1.0, 40.0, 69.0)
        } else {
            (repayment_ratio * 39.0 - 5.0 * liquidations as f64).max(0.0)
        }
    }
}

impl FactorCalculator for Borrowing {
    fn kind(&self) -> FactorKind {
        FactorKind::Borrowing
    }

    fn calculate(
        &self,
        history: &[NormalizedTransaction],
        ctx: &ScoringContext<'_>,
    ) -> Result<FactorScore> {
        require_history(self.kind(), history)?;

        let actions: Vec<LendingAction> = history
            .iter()
            .filter_map(|tx| lending_action(tx, ctx.registry))
            .collect();
        if actions.is_empty() {
            return Err(ScoreError::InsufficientData {
                factor: self.kind(),
            });
        }

        let count = |action: LendingAction| actions.iter().filter(|a| **a == action).count();
        let borrows = count(LendingAction::Borrow);
        let repays = count(LendingAction::Repay);
        let liquidations = count(LendingAction::Liquidation);

        let repayment_ratio = if borrows == 0 {
            1.0
        } else {
            (repays as f64 / borrows as f64).min(1.0)
        };

        Ok(FactorScore::scored(
            self.kind(),
            Self::band_score(liquidations, repayment_ratio, actions.len()),
            metrics([
                ("borrow_count", borrows as f64),
                ("repay_count", repays as f64),
                ("liquidation_count", liquidations as f64),
                ("interaction_count", actions.len() as f64),
                ("repayment_ratio", repayment_ratio),
            ]),
        ))
    }
}
