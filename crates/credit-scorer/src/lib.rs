//! Credit Scorer
//!
//! Reduce a wallet's normalized history to eleven bounded factor scores and
//! combine them into an overall score and a 300-850 credit score.

pub mod aggregator;
pub mod context;
pub mod engine;
pub mod error;
pub mod factors;
pub mod insights;
pub mod util;

pub use aggregator::{aggregate, credit_score, ScoringWeights, WeightedAggregate};
pub use context::{ScoringContext, WalletActivity};
pub use engine::{CreditReport, CreditScorer};
pub use error::ScoreError;
pub use factors::FactorCalculator;
pub use insights::{share_text, Difficulty, Impact, ImprovementPlan, Recommendation};
