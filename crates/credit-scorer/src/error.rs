//! Error types for factor calculation.

use credit_core::types::FactorKind;
use thiserror::Error;

/// A calculation that could not produce a score. The engine turns every
/// variant into the factor's NoData state; it never reaches the aggregator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("{factor}: non-finite value while computing {stage}")]
    NonFinite {
        factor: FactorKind,
        stage: &'static str,
    },

    #[error("{factor}: insufficient data")]
    InsufficientData { factor: FactorKind },
}

impl ScoreError {
    pub fn factor(&self) -> FactorKind {
        match self {
            Self::NonFinite { factor, .. } | Self::InsufficientData { factor } => *factor,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
