//! Core domain types for wallet credit scoring.

pub mod score;
pub mod staking;
pub mod transaction;

pub use score::*;
pub use staking::*;
pub use transaction::*;
