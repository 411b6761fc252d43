//! Configuration management for the credit scoring engine.

use std::env;
use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::registry::ProtocolRegistry;
use crate::{Error, Result};

/// Engine configuration resolved from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Optional registry file replacing the built-in protocol lists.
    pub registry_path: Option<PathBuf>,
    /// Wallet whose perspective signs nested transfers during normalization.
    pub wallet_address: Option<String>,
    /// Default SOL to USD conversion rate.
    pub sol_usd_rate: Option<Decimal>,
}

impl EngineConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let sol_usd_rate = match env::var("CREDIT_SOL_USD_RATE") {
            Ok(raw) => Some(raw.trim().parse::<Decimal>().map_err(|_| Error::Config {
                message: format!("CREDIT_SOL_USD_RATE is not a number: {raw}"),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            registry_path: env::var("CREDIT_REGISTRY_PATH").ok().map(PathBuf::from),
            wallet_address: env::var("CREDIT_WALLET_ADDRESS")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            sol_usd_rate,
        })
    }

    /// Resolve the protocol registry this configuration points at.
    pub fn registry(&self) -> Result<ProtocolRegistry> {
        ProtocolRegistry::load_or_default(self.registry_path.as_deref())
    }
}
