//! Credit Core Library
//!
//! Shared types, the transaction normalizer, and the versioned protocol
//! registry for the wallet credit scoring system.

pub mod config;
pub mod error;
pub mod normalizer;
pub mod registry;
pub mod types;

pub use error::{Error, Result};
pub use normalizer::{normalize, normalize_values};
pub use registry::ProtocolRegistry;
