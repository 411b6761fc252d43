//! Versioned protocol, token and validator classification data.
//!
//! Every keyword list and program id the calculators match against lives
//! here, so the lists can be updated by shipping a new registry file instead
//! of touching calculator logic. A registry file only needs to carry the
//! fields it overrides; everything else falls back to the built-in version.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::NormalizedTransaction;
use crate::{Error, Result};

/// Built-in registry version.
pub const BUILTIN_VERSION: &str = "2024.1";

/// Category of on-chain tooling recognized by the ecosystem coverage factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Aggregator,
    LimitOrder,
    Dca,
    Multisig,
    Portfolio,
    AdvancedDefi,
}

impl ToolKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Aggregator => "aggregator",
            Self::LimitOrder => "limit_order",
            Self::Dca => "dca",
            Self::Multisig => "multisig",
            Self::Portfolio => "portfolio",
            Self::AdvancedDefi => "advanced_defi",
        }
    }
}

/// Matching rules for one tool category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCategory {
    pub kind: ToolKind,
    #[serde(default)]
    pub program_ids: Vec<String>,
    #[serde(default)]
    pub source_keywords: Vec<String>,
    #[serde(default)]
    pub description_keywords: Vec<String>,
}

impl ToolCategory {
    pub fn matches(&self, tx: &NormalizedTransaction) -> bool {
        if !tx.program_id.is_empty() && self.program_ids.iter().any(|id| id == &tx.program_id) {
            return true;
        }
        let source = tx.source.to_lowercase();
        let description = tx.description.to_lowercase();
        contains_any(&source, &self.source_keywords)
            || contains_any(&description, &self.description_keywords)
    }
}

/// Risk classification of a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Safe,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTiers {
    #[serde(default)]
    pub safe: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub high: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub address: String,
    pub name: String,
}

/// Classification data shared by all calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolRegistry {
    pub version: String,
    /// Currency that pays network fees and that the current balance is in.
    pub fee_currency: String,
    pub major_tokens: Vec<String>,
    pub blue_chip_tokens: Vec<String>,
    pub stablecoins: Vec<String>,
    pub lending_protocols: Vec<String>,
    pub collateral_protocols: Vec<String>,
    pub lending_keywords: Vec<String>,
    pub borrow_keywords: Vec<String>,
    pub repay_keywords: Vec<String>,
    pub liquidation_keywords: Vec<String>,
    pub collateral_keywords: Vec<String>,
    pub tools: Vec<ToolCategory>,
    pub risk_tiers: RiskTiers,
    pub validators: Vec<ValidatorEntry>,
    pub reputable_validators: Vec<String>,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self {
            version: BUILTIN_VERSION.to_string(),
            fee_currency: "SOL".to_string(),
            major_tokens: strings(&["SOL", "USDC", "USDT"]),
            blue_chip_tokens: strings(&["SOL", "USDC", "USDT", "BTC", "ETH"]),
            stablecoins: strings(&["USDC", "USDT", "DAI", "BUSD"]),
            lending_protocols: strings(&[
                "solend", "port", "jet", "aave", "mango", "compound", "francium",
            ]),
            collateral_protocols: strings(&["solend", "port", "mango", "francium"]),
            lending_keywords: strings(&["borrow", "loan", "lend", "repay", "liquidat"]),
            borrow_keywords: strings(&["borrow", "loan"]),
            repay_keywords: strings(&["repay"]),
            liquidation_keywords: strings(&["liquidat"]),
            collateral_keywords: strings(&["collateral"]),
            tools: vec![
                ToolCategory {
                    kind: ToolKind::Aggregator,
                    program_ids: strings(&[
                        "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4",
                        "JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB",
                    ]),
                    source_keywords: strings(&["jupiter"]),
                    description_keywords: strings(&["jupiter"]),
                },
                ToolCategory {
                    kind: ToolKind::LimitOrder,
                    program_ids: strings(&[
                        "srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX",
                        "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
                    ]),
                    source_keywords: strings(&["serum", "openbook"]),
                    description_keywords: strings(&["limit"]),
                },
                ToolCategory {
                    kind: ToolKind::Dca,
                    program_ids: Vec::new(),
                    source_keywords: strings(&["mean.finance"]),
                    description_keywords: strings(&["dca", "dollar cost"]),
                },
                ToolCategory {
                    kind: ToolKind::Multisig,
                    program_ids: strings(&[
                        "SMPLecH534NA9acpos4G6x7uf3LWbCAwZQE9e8ZekMu",
                        "AgoraGovvVuRM6nwXY4CxM3eC1vRBnqEusKGJbakaRHM",
                    ]),
                    source_keywords: strings(&["multisig", "squads"]),
                    description_keywords: strings(&["multisig"]),
                },
                ToolCategory {
                    kind: ToolKind::Portfolio,
                    program_ids: Vec::new(),
                    source_keywords: strings(&["birdeye", "step.finance"]),
                    description_keywords: strings(&["portfolio"]),
                },
                ToolCategory {
                    kind: ToolKind::AdvancedDefi,
                    program_ids: Vec::new(),
                    source_keywords: Vec::new(),
                    description_keywords: strings(&[
                        "lend",
                        "borrow",
                        "short",
                        "derivative",
                        "margin",
                        "leverage",
                    ]),
                },
            ],
            risk_tiers: RiskTiers {
                safe: strings(&[
                    "lending",
                    "staking",
                    "governance",
                    "nft",
                    "savings",
                    "payment",
                    "defi",
                    "storage",
                    "identity",
                    "oracle",
                ]),
                medium: strings(&["dex", "swap", "bridge", "yield", "leverage", "options"]),
                high: strings(&[
                    "gambling",
                    "prediction",
                    "casino",
                    "lottery",
                    "games",
                    "high-risk",
                    "derivatives",
                ]),
            },
            validators: builtin_validators(),
            reputable_validators: strings(&[
                "Everstake",
                "Certus One",
                "Marinade.Finance",
                "Coinbase",
                "Binance Staking",
            ]),
        }
    }
}

impl ProtocolRegistry {
    /// Load a registry file (TOML, JSON or YAML, by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        let registry: Self = settings.try_deserialize()?;
        registry.validate()?;

        info!(
            path = %path.display(),
            version = %registry.version,
            "Loaded protocol registry"
        );
        Ok(registry)
    }

    /// Load from `path` when given, otherwise use the built-in registry.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::InvalidRegistry {
                message: "registry version must not be empty".to_string(),
            });
        }
        if self.fee_currency.trim().is_empty() {
            return Err(Error::InvalidRegistry {
                message: "fee_currency must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_fee_currency(&self, symbol: &str) -> bool {
        self.fee_currency.eq_ignore_ascii_case(symbol)
    }

    pub fn is_major_token(&self, symbol: &str) -> bool {
        contains_symbol(&self.major_tokens, symbol)
    }

    pub fn is_blue_chip(&self, symbol: &str) -> bool {
        contains_symbol(&self.blue_chip_tokens, symbol)
    }

    pub fn is_stablecoin(&self, symbol: &str) -> bool {
        contains_symbol(&self.stablecoins, symbol)
    }

    /// Whether any of the lending protocol names appears in `text` as a
    /// whole word.
    pub fn mentions_lending_protocol(&self, text: &str) -> bool {
        contains_token(text, &self.lending_protocols)
    }

    pub fn mentions_collateral_protocol(&self, text: &str) -> bool {
        contains_token(text, &self.collateral_protocols)
    }

    pub fn validator_name(&self, address: &str) -> Option<&str> {
        self.validators
            .iter()
            .find(|v| v.address == address)
            .map(|v| v.name.as_str())
    }

    /// Whether a validator name belongs to a reputable operator.
    pub fn is_reputable(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        !name.is_empty()
            && self
                .reputable_validators
                .iter()
                .any(|r| name.contains(&r.to_lowercase()))
    }

    /// Risk tier of a protocol label. High-risk keywords win over medium,
    /// medium over safe; unknown protocols count as medium.
    pub fn classify_risk(&self, protocol: &str) -> RiskTier {
        let protocol = protocol.to_lowercase();
        if contains_any(&protocol, &self.risk_tiers.high) {
            RiskTier::High
        } else if contains_any(&protocol, &self.risk_tiers.medium) {
            RiskTier::Medium
        } else if contains_any(&protocol, &self.risk_tiers.safe) {
            RiskTier::Safe
        } else {
            RiskTier::Medium
        }
    }
}

/// Case-insensitive substring match of `haystack` (already lowercase)
/// against any keyword.
pub fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
}

/// Case-insensitive whole-word match: `text` is split on anything that is not
/// alphanumeric, so `SOLEND_PROGRAM` names solend but an address that happens
/// to contain `port` names nothing.
pub fn contains_token(text: &str, keywords: &[String]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| keywords.iter().any(|k| word.eq_ignore_ascii_case(k)))
}

fn contains_symbol(list: &[String], symbol: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(symbol))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_validators() -> Vec<ValidatorEntry> {
    [
        ("JD3bq9hGdy38PuWQ4h2YJpELmHVGPPfFSuFkpzAd9zfu", "Kraken"),
        ("LunaFio31N2XmcwRLmPPFCMEHKpjRikzDYfKk6YkX4m", "Lunanova"),
        ("dv2eQHeP4RFrJZ6UeiZWoc3XTtmtZCUKxxCApCDcRNV", "Staking Facilities"),
        ("7K8DVxtNJGnMtUY1CQJT5jcs8sFGSZTDiG7kowvFpECh", "Certus One"),
        ("CsZWL4XNk7yJR3u1zKXzgLzZx1M5dCJgqo6Ko9GCLF9g", "Blockdaemon"),
        ("3VZLuG8zGJQmCehJzKA8xQQd4J7DTFdGBB9NGjTcGArB", "Chorus One"),
        ("7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2", "Figment"),
        ("wacjWS3DMzYUBK1YZmTzkBcQraXWUmfY3CXqXhmLBN9", "Binance Staking"),
        ("Gr9Fuf9YMtD4bVMPwZkxafjj8wzDCo9WrEZmMJjnQomj", "Coinbase"),
        ("9QU2QSxhb24FUX3Tu2FpPVXELRiMiXfUPuVehganrC5K", "Everstake"),
        ("8gcBW9MQ6HdWo16mYZXNKVt7SqDAFcxRGDcSxRjYDrGX", "P2P.ORG"),
        ("5imfG8C6aVQcTEfGEDaDUCbnht5A9rRNi7mJFpCDfNTG", "Marinade Finance"),
        ("mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So", "Marinade.Finance"),
        ("BNTmegvdXzNVyc3UMTWSMSfJUryjr3fXEVErtdqrZoiT", "BlazeStake"),
    ]
    .iter()
    .map(|(address, name)| ValidatorEntry {
        address: address.to_string(),
        name: name.to_string(),
    })
    .collect()
}
