//! Raw and normalized transaction shapes.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A transaction record as exported by the indexing service.
///
/// Every field is optional and loosely typed: amounts and timestamps may be
/// strings or numbers, and value movements may live in the nested
/// `tokenTransfers` / `nativeTransfers` / `accountData` arrays instead of the
/// top-level `amount`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    pub signature: Option<String>,
    pub timestamp: Option<Value>,
    pub block_time: Option<Value>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub description: Option<String>,
    pub program_id: Option<String>,
    pub protocol: Option<String>,
    /// Fee in lamports.
    pub fee: Option<Value>,
    pub fee_payer: Option<String>,
    pub token_transfers: Option<Vec<RawTokenTransfer>>,
    pub native_transfers: Option<Vec<RawNativeTransfer>>,
    pub account_data: Option<Vec<RawAccountData>>,
}

impl RawTransaction {
    /// Build a raw record from arbitrary JSON. Never fails: a value that does
    /// not have the expected shape becomes an empty record.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "Unreadable transaction record, using empty record");
                Self::default()
            }
        }
    }

    pub fn token_transfers(&self) -> &[RawTokenTransfer] {
        self.token_transfers.as_deref().unwrap_or_default()
    }

    pub fn native_transfers(&self) -> &[RawNativeTransfer] {
        self.native_transfers.as_deref().unwrap_or_default()
    }

    pub fn account_data(&self) -> &[RawAccountData] {
        self.account_data.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenTransfer {
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub token_amount: Option<Value>,
    pub mint: Option<String>,
    pub token_symbol: Option<String>,
}

/// Native SOL movement; `amount` is in lamports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNativeTransfer {
    pub from_user_account: Option<String>,
    pub to_user_account: Option<String>,
    pub amount: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAccountData {
    pub account: Option<String>,
    /// Native balance change in lamports.
    pub native_balance_change: Option<Value>,
    pub token_balance_changes: Option<Vec<RawTokenBalanceChange>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenBalanceChange {
    pub user_account: Option<String>,
    pub mint: Option<String>,
    pub symbol: Option<String>,
    pub amount: Option<Value>,
    pub raw_token_amount: Option<RawTokenAmount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenAmount {
    pub token_amount: Option<Value>,
    pub decimals: Option<u32>,
}

/// Canonical transaction category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Transfer,
    Swap,
    Borrow,
    Repay,
    Liquidation,
    Collateral,
    Stake,
    Unstake,
    Deposit,
    Withdraw,
    Other(String),
}

impl TransactionType {
    /// Parse an indexer type label. Matching is case-insensitive and accepts
    /// the common `STAKE_DELEGATE` / `REPAY_LOAN` style compound labels.
    pub fn parse(label: &str) -> Self {
        let upper = label.trim().to_ascii_uppercase();
        match upper.as_str() {
            "" | "TRANSFER" => Self::Transfer,
            "SWAP" => Self::Swap,
            "BORROW" | "BORROW_OBLIGATION_LIQUIDITY" => Self::Borrow,
            "REPAY" | "REPAY_LOAN" | "REPAY_OBLIGATION_LIQUIDITY" => Self::Repay,
            "LIQUIDATE" | "LIQUIDATION" | "LIQUIDATE_OBLIGATION" => Self::Liquidation,
            "COLLATERAL" | "DEPOSIT_COLLATERAL" | "ADD_COLLATERAL" => Self::Collateral,
            "STAKE" | "STAKE_DELEGATE" | "STAKE_SOL" => Self::Stake,
            "UNSTAKE" | "STAKE_DEACTIVATE" | "UNSTAKE_SOL" => Self::Unstake,
            "DEPOSIT" => Self::Deposit,
            "WITHDRAW" => Self::Withdraw,
            _ => Self::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Transfer => "TRANSFER",
            Self::Swap => "SWAP",
            Self::Borrow => "BORROW",
            Self::Repay => "REPAY",
            Self::Liquidation => "LIQUIDATION",
            Self::Collateral => "COLLATERAL",
            Self::Stake => "STAKE",
            Self::Unstake => "UNSTAKE",
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for TransactionType {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        kind.as_str().to_string()
    }
}

/// Collateral posted and amount borrowed within one lending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanLeg {
    pub collateral: Decimal,
    pub borrowed: Decimal,
}

impl LoanLeg {
    /// Loan-to-value as a percentage.
    pub fn ltv_pct(&self) -> Option<Decimal> {
        if self.collateral.is_zero() {
            return None;
        }
        self.borrowed
            .checked_div(self.collateral)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}

/// The fully-typed record consumed by every factor calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    pub signature: Option<String>,
    /// Unix seconds; zero or negative means unknown.
    pub timestamp: i64,
    /// Positive = inflow, negative = outflow.
    pub amount: Decimal,
    pub currency: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub source: String,
    pub destination: String,
    pub description: String,
    pub program_id: String,
    pub protocol: String,
    /// Network fee in SOL.
    pub fee: Decimal,
    pub loan_leg: Option<LoanLeg>,
}

impl NormalizedTransaction {
    pub const DEFAULT_CURRENCY: &'static str = "SOL";

    pub fn new(timestamp: i64, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            signature: None,
            timestamp,
            amount,
            currency: currency.into(),
            tx_type: TransactionType::Transfer,
            source: String::new(),
            destination: String::new(),
            description: String::new(),
            program_id: String::new(),
            protocol: String::new(),
            fee: Decimal::ZERO,
            loan_leg: None,
        }
    }

    pub fn with_type(mut self, tx_type: TransactionType) -> Self {
        self.tx_type = tx_type;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.program_id = program_id.into();
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_loan_leg(mut self, collateral: Decimal, borrowed: Decimal) -> Self {
        self.loan_leg = Some(LoanLeg {
            collateral,
            borrowed,
        });
        self
    }

    /// Whether the record can take part in age and ordering calculations.
    pub fn has_timestamp(&self) -> bool {
        self.timestamp > 0
    }

    /// Whether the record carries any usable signal at all.
    pub fn is_informative(&self) -> bool {
        !self.amount.is_zero() || self.has_timestamp()
    }

    pub fn is_inflow(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn is_outflow(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn is_currency(&self, symbol: &str) -> bool {
        self.currency.eq_ignore_ascii_case(symbol)
    }

    /// Calendar day (UTC) of the transaction, if the timestamp is usable.
    pub fn date(&self) -> Option<NaiveDate> {
        if !self.has_timestamp() {
            return None;
        }
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.date_naive())
    }

    /// Lowercased type, description and protocol, used for keyword
    /// classification. Addresses are left out.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.tx_type.as_str(),
            self.description,
            self.protocol
        )
        .to_lowercase()
    }
}

/// True when history holds no record with a usable amount or timestamp.
pub fn is_uninformative(history: &[NormalizedTransaction]) -> bool {
    !history.iter().any(NormalizedTransaction::is_informative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!(TransactionType::parse("transfer"), TransactionType::Transfer);
        assert_eq!(TransactionType::parse(""), TransactionType::Transfer);
        assert_eq!(TransactionType::parse("STAKE_DELEGATE"), TransactionType::Stake);
        assert_eq!(TransactionType::parse("repay_loan"), TransactionType::Repay);
        assert_eq!(
            TransactionType::parse("nft_sale"),
            TransactionType::Other("NFT_SALE".to_string())
        );
    }

    #[test]
    fn test_transaction_type_serde_as_string() {
        let json = serde_json::to_string(&TransactionType::Borrow).unwrap();
        assert_eq!(json, "\"BORROW\"");
        let parsed: TransactionType = serde_json::from_str("\"liquidate\"").unwrap();
        assert_eq!(parsed, TransactionType::Liquidation);
    }

    #[test]
    fn test_raw_from_value_tolerates_garbage() {
        let raw = RawTransaction::from_value(&json!("not an object"));
        assert!(raw.signature.is_none());
        assert!(raw.token_transfers().is_empty());

        let raw = RawTransaction::from_value(&json!({
            "signature": "abc",
            "blockTime": 1_700_000_000,
            "amount": "1.5 SOL",
            "nativeTransfers": null
        }));
        assert_eq!(raw.signature.as_deref(), Some("abc"));
        assert!(raw.native_transfers().is_empty());
    }

    #[test]
    fn test_flow_direction() {
        let inflow = NormalizedTransaction::new(1, Decimal::new(5, 1), "SOL");
        let outflow = NormalizedTransaction::new(1, Decimal::new(-5, 1), "SOL");
        let zero = NormalizedTransaction::new(0, Decimal::ZERO, "SOL");

        assert!(inflow.is_inflow() && !inflow.is_outflow());
        assert!(outflow.is_outflow() && !outflow.is_inflow());
        assert!(!zero.is_inflow() && !zero.is_outflow());
        assert!(!zero.is_informative());
        assert!(is_uninformative(&[zero]));
    }

    #[test]
    fn test_date_requires_positive_timestamp() {
        let tx = NormalizedTransaction::new(0, Decimal::ONE, "SOL");
        assert!(tx.date().is_none());

        let tx = NormalizedTransaction::new(86_400, Decimal::ONE, "SOL");
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(1970, 1, 2));
    }

    #[test]
    fn test_loan_leg_ltv() {
        let leg = LoanLeg {
            collateral: Decimal::new(200, 0),
            borrowed: Decimal::new(50, 0),
        };
        assert_eq!(leg.ltv_pct(), Some(Decimal::new(25, 0)));

        let empty = LoanLeg {
            collateral: Decimal::ZERO,
            borrowed: Decimal::ONE,
        };
        assert!(empty.ltv_pct().is_none());
    }
}
