//! Staking position types.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalizer::{parse_decimal, parse_timestamp};

/// Lifecycle state of a stake account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum StakeStatus {
    Active,
    Delegated,
    Deactivating,
}

impl From<String> for StakeStatus {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "delegated" => Self::Delegated,
            "deactivating" | "deactivated" | "inactive" => Self::Deactivating,
            _ => Self::Active,
        }
    }
}

/// One staking position held by the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingRecord {
    pub validator_address: String,
    #[serde(default)]
    pub validator_name: Option<String>,
    /// Staked amount in SOL.
    #[serde(deserialize_with = "lenient_decimal", default)]
    pub amount: Decimal,
    #[serde(default = "default_status")]
    pub status: StakeStatus,
    /// Unix seconds when the position was opened; zero when unknown.
    #[serde(deserialize_with = "lenient_timestamp", default)]
    pub timestamp: i64,
}

fn default_status() -> StakeStatus {
    StakeStatus::Active
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_decimal(&value).unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_timestamp(&value).unwrap_or_default())
}

impl StakingRecord {
    pub fn new(validator_address: impl Into<String>, amount: Decimal, timestamp: i64) -> Self {
        Self {
            validator_address: validator_address.into(),
            validator_name: None,
            amount,
            status: StakeStatus::Active,
            timestamp,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.validator_name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: StakeStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the stake still counts as locked value.
    pub fn is_locked(&self) -> bool {
        !matches!(self.status, StakeStatus::Deactivating)
    }

    /// Whole days the position has been open at `as_of`.
    pub fn duration_days(&self, as_of: i64) -> i64 {
        if self.timestamp <= 0 {
            return 0;
        }
        (as_of.saturating_sub(self.timestamp) / 86_400).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_deserialization() {
        let record: StakingRecord = serde_json::from_str(
            r#"{"validatorAddress":"abc","amount":"12.5","status":"DEACTIVATING","timestamp":"1700000000"}"#,
        )
        .unwrap();

        assert_eq!(record.amount, Decimal::new(125, 1));
        assert_eq!(record.status, StakeStatus::Deactivating);
        assert_eq!(record.timestamp, 1_700_000_000);
        assert!(!record.is_locked());
    }

    #[test]
    fn test_missing_fields_default() {
        let record: StakingRecord =
            serde_json::from_str(r#"{"validatorAddress":"abc","amount":"n/a"}"#).unwrap();

        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.status, StakeStatus::Active);
        assert_eq!(record.timestamp, 0);
        assert_eq!(record.duration_days(1_700_000_000), 0);
    }

    #[test]
    fn test_duration_days() {
        let record = StakingRecord::new("v", Decimal::ONE, 1_000_000);
        assert_eq!(record.duration_days(1_000_000 + 86_400 * 31), 31);
        // Future-dated positions never report negative duration
        assert_eq!(record.duration_days(0), 0);
    }
}
