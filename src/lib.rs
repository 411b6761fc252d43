//! Wallet Credit: behavioral credit scoring for on-chain wallets
//!
//! This is the root crate that provides benchmark access to the internal modules.
//! For actual functionality, use the individual crates directly:
//!
//! - `credit-core`: Core types, transaction normalizer, protocol registry
//! - `credit-scorer`: Factor calculators, aggregation, improvement plans
//! - `credit-cli`: Command-line scoring of exported wallet activity

// Re-export for benchmarks
pub use credit_core as core;
pub use credit_scorer as scorer;
