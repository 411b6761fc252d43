//! Factor score, band and classification types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The behavioral dimensions scored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    BasicActivity,
    NetFlow,
    MinBalanceStability,
    Retention,
    Borrowing,
    CollateralManagement,
    StakingEngagement,
    TransactionPatterns,
    WalletAge,
    TokenPortfolio,
    EcosystemCoverage,
}

impl FactorKind {
    pub const ALL: [FactorKind; 11] = [
        FactorKind::BasicActivity,
        FactorKind::NetFlow,
        FactorKind::MinBalanceStability,
        FactorKind::Retention,
        FactorKind::Borrowing,
        FactorKind::CollateralManagement,
        FactorKind::StakingEngagement,
        FactorKind::TransactionPatterns,
        FactorKind::WalletAge,
        FactorKind::TokenPortfolio,
        FactorKind::EcosystemCoverage,
    ];

    /// Stable identifier used in payloads.
    pub fn id(&self) -> &'static str {
        match self {
            Self::BasicActivity => "basic_activity",
            Self::NetFlow => "net_flow",
            Self::MinBalanceStability => "min_balance_stability",
            Self::Retention => "retention",
            Self::Borrowing => "borrowing",
            Self::CollateralManagement => "collateral_management",
            Self::StakingEngagement => "staking_engagement",
            Self::TransactionPatterns => "transaction_patterns",
            Self::WalletAge => "wallet_age",
            Self::TokenPortfolio => "token_portfolio",
            Self::EcosystemCoverage => "ecosystem_coverage",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicActivity => "Basic Activity Level",
            Self::NetFlow => "Net Flow Analysis",
            Self::MinBalanceStability => "Minimum Balance Stability",
            Self::Retention => "Retention Behavior",
            Self::Borrowing => "Borrowing Behavior",
            Self::CollateralManagement => "Collateral Management",
            Self::StakingEngagement => "Staking & Farming Engagement",
            Self::TransactionPatterns => "Transaction Patterns & Consistency",
            Self::WalletAge => "Wallet Age & Longevity",
            Self::TokenPortfolio => "Token Portfolio Health",
            Self::EcosystemCoverage => "Strategic Tool Usage & Ecosystem Coverage",
        }
    }

    /// Cut points used to band this factor's own score.
    pub fn thresholds(&self) -> BandThresholds {
        match self {
            Self::StakingEngagement | Self::EcosystemCoverage => BandThresholds::LENIENT,
            _ => BandThresholds::FACTOR,
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Qualitative band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    NoData,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl Band {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoData => "No Data",
            Self::Poor => "Poor",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }

    /// Label used for the overall and credit-scale displays.
    pub fn credit_label(&self) -> &'static str {
        match self {
            Self::Moderate => "Fair",
            other => other.label(),
        }
    }

    /// Display tier, 0 (no data) through 4 (excellent).
    pub fn tier(&self) -> u8 {
        match self {
            Self::NoData => 0,
            Self::Poor => 1,
            Self::Moderate => 2,
            Self::Good => 3,
            Self::Excellent => 4,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds (inclusive) for each band on a particular scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub excellent: f64,
    pub good: f64,
    pub moderate: f64,
}

impl BandThresholds {
    /// Default 0-100 factor scale.
    pub const FACTOR: Self = Self {
        excellent: 90.0,
        good: 70.0,
        moderate: 40.0,
    };

    /// Factors whose moderate band starts lower (staking, tool usage).
    pub const LENIENT: Self = Self {
        excellent: 90.0,
        good: 70.0,
        moderate: 30.0,
    };

    /// Overall 0-100 score.
    pub const OVERALL: Self = Self::FACTOR;

    /// 300-850 credit scale, the overall cut points mapped onto the range.
    pub const CREDIT_SCALE: Self = Self {
        excellent: 795.0,
        good: 685.0,
        moderate: 520.0,
    };

    pub fn new(excellent: f64, good: f64, moderate: f64) -> Self {
        Self {
            excellent,
            good,
            moderate,
        }
    }

    /// Band for a score that is known to carry data.
    pub fn classify(&self, score: f64) -> Band {
        if score >= self.excellent {
            Band::Excellent
        } else if score >= self.good {
            Band::Good
        } else if score >= self.moderate {
            Band::Moderate
        } else {
            Band::Poor
        }
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self::FACTOR
    }
}

/// Result of one factor calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub name: FactorKind,
    /// Always within 0..=100.
    pub value: u8,
    pub band: Band,
    pub metrics: BTreeMap<String, f64>,
}

impl FactorScore {
    /// Build a scored result, clamping and banding the raw value.
    pub fn scored(name: FactorKind, raw: f64, metrics: BTreeMap<String, f64>) -> Self {
        let value = clamp_score(raw);
        Self {
            name,
            value,
            band: name.thresholds().classify(value as f64),
            metrics,
        }
    }

    pub fn no_data(name: FactorKind) -> Self {
        Self {
            name,
            value: 0,
            band: Band::NoData,
            metrics: BTreeMap::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.band != Band::NoData
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// Round and clamp a raw score into 0..=100; non-finite input becomes 0.
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
