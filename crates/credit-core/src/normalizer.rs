//! Transaction normalization.
//!
//! All defensive parsing of raw indexer records happens here, once. The
//! functions are total: malformed fields degrade to zero-valued defaults and
//! no record is ever dropped.

use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::types::{LoanLeg, NormalizedTransaction, RawTransaction, TransactionType};

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: i64 = 1_000_000_000;

/// Normalize a batch of raw JSON records.
pub fn normalize_values(values: &[Value], wallet: Option<&str>) -> Vec<NormalizedTransaction> {
    values
        .iter()
        .map(|v| normalize_one(&RawTransaction::from_value(v), wallet))
        .collect()
}

/// Normalize a batch of raw records. The output has one entry per input.
pub fn normalize(raw: &[RawTransaction], wallet: Option<&str>) -> Vec<NormalizedTransaction> {
    raw.iter().map(|r| normalize_one(r, wallet)).collect()
}

/// Normalize a single record. `wallet` is the address whose point of view
/// decides the sign of nested transfers; without it only the top-level
/// `amount` can be used.
pub fn normalize_one(raw: &RawTransaction, wallet: Option<&str>) -> NormalizedTransaction {
    let timestamp = resolve_timestamp(raw);
    if timestamp <= 0 {
        debug!(signature = ?raw.signature, "Transaction has no usable timestamp");
    }

    let tx_type = TransactionType::parse(raw.tx_type.as_deref().unwrap_or_default());
    let (amount, currency) = resolve_amount(raw, &tx_type, wallet);
    let loan_leg = resolve_loan_leg(raw, &tx_type);

    NormalizedTransaction {
        signature: raw.signature.clone(),
        timestamp,
        amount,
        currency,
        tx_type,
        source: raw.source.clone().unwrap_or_default(),
        destination: raw.destination.clone().unwrap_or_default(),
        description: raw.description.clone().unwrap_or_default(),
        program_id: raw.program_id.clone().unwrap_or_default(),
        protocol: raw.protocol.clone().unwrap_or_default(),
        fee: raw
            .fee
            .as_ref()
            .and_then(parse_decimal)
            .map(lamports_to_sol)
            .unwrap_or_default()
            .abs(),
        loan_leg,
    }
}

/// Parse a loosely-typed numeric field. Strings are stripped of everything
/// except digits, `.` and `-` before parsing.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

/// Parse a unix-seconds timestamp from a number or numeric string.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

fn lamports_to_sol(lamports: Decimal) -> Decimal {
    lamports / Decimal::from(LAMPORTS_PER_SOL)
}

fn resolve_timestamp(raw: &RawTransaction) -> i64 {
    raw.timestamp
        .as_ref()
        .and_then(parse_timestamp)
        .or_else(|| raw.block_time.as_ref().and_then(parse_timestamp))
        .unwrap_or(0)
}

fn default_currency(raw: &RawTransaction) -> String {
    raw.currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NormalizedTransaction::DEFAULT_CURRENCY)
        .to_string()
}

fn resolve_amount(
    raw: &RawTransaction,
    tx_type: &TransactionType,
    wallet: Option<&str>,
) -> (Decimal, String) {
    if let Some(value) = &raw.amount {
        match parse_decimal(value) {
            Some(amount) if !amount.is_zero() => return (amount, default_currency(raw)),
            Some(_) => {}
            None => debug!(
                signature = ?raw.signature,
                amount = %value,
                "Unparsable amount, falling back to nested transfers"
            ),
        }
    }

    let Some(wallet) = wallet.filter(|w| !w.is_empty()) else {
        return (Decimal::ZERO, default_currency(raw));
    };

    if *tx_type == TransactionType::Swap {
        if let Some(found) = swap_from_description(raw, wallet) {
            return found;
        }
    }

    let (inflow, outflow) = raw
        .native_transfers()
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(inflow, outflow), t| {
            let amount = t
                .amount
                .as_ref()
                .and_then(parse_decimal)
                .map(lamports_to_sol)
                .unwrap_or_default()
                .abs();
            if t.to_user_account.as_deref() == Some(wallet) {
                (inflow.saturating_add(amount), outflow)
            } else if t.from_user_account.as_deref() == Some(wallet) {
                (inflow, outflow.saturating_add(amount))
            } else {
                (inflow, outflow)
            }
        });
    let net = inflow.saturating_sub(outflow);
    if !net.is_zero() {
        return (net, NormalizedTransaction::DEFAULT_CURRENCY.to_string());
    }

    for transfer in raw.token_transfers() {
        let incoming = transfer.to_user_account.as_deref() == Some(wallet);
        let outgoing = transfer.from_user_account.as_deref() == Some(wallet);
        if !incoming && !outgoing {
            continue;
        }
        let amount = transfer
            .token_amount
            .as_ref()
            .and_then(parse_decimal)
            .unwrap_or_default()
            .abs();
        let currency = transfer
            .token_symbol
            .clone()
            .or_else(|| transfer.mint.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        return (if outgoing { -amount } else { amount }, currency);
    }

    for account in raw.account_data() {
        for change in account.token_balance_changes.as_deref().unwrap_or_default() {
            if change.user_account.as_deref() != Some(wallet) {
                continue;
            }
            let scaled = change.raw_token_amount.as_ref().and_then(|raw_amount| {
                let units = raw_amount.token_amount.as_ref().and_then(parse_decimal)?;
                let decimals = raw_amount.decimals.filter(|d| *d > 0 && *d <= 18)?;
                Some(units / Decimal::from(10u64.pow(decimals)))
            });
            let amount = scaled
                .or_else(|| change.amount.as_ref().and_then(parse_decimal))
                .unwrap_or_default();
            let currency = change
                .symbol
                .clone()
                .or_else(|| change.mint.clone())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return (amount, currency);
        }
        if account.account.as_deref() == Some(wallet) {
            if let Some(change) = account
                .native_balance_change
                .as_ref()
                .and_then(parse_decimal)
                .filter(|c| !c.is_zero())
            {
                return (
                    lamports_to_sol(change),
                    NormalizedTransaction::DEFAULT_CURRENCY.to_string(),
                );
            }
        }
    }

    if raw.fee_payer.as_deref() == Some(wallet) {
        if let Some(fee) = raw
            .fee
            .as_ref()
            .and_then(parse_decimal)
            .filter(|f| !f.is_zero())
        {
            return (
                -lamports_to_sol(fee.abs()),
                NormalizedTransaction::DEFAULT_CURRENCY.to_string(),
            );
        }
    }

    debug!(signature = ?raw.signature, "Could not extract an amount, using zero");
    (Decimal::ZERO, default_currency(raw))
}

/// Parse `"swapped <a> <X> for <b> <Y>"` style descriptions.
fn swap_from_description(raw: &RawTransaction, wallet: &str) -> Option<(Decimal, String)> {
    let description = raw.description.as_deref()?;
    let words: Vec<&str> = description.split_whitespace().collect();
    let start = words
        .iter()
        .position(|w| w.eq_ignore_ascii_case("swapped"))?;
    let rest = words.get(start + 1..start + 6)?;
    if !rest[2].eq_ignore_ascii_case("for") {
        return None;
    }

    let amount_in = Decimal::from_str(rest[0]).ok()?;
    let amount_out = Decimal::from_str(rest[3]).ok()?;
    let is_source = raw
        .source
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case(wallet));

    if is_source {
        Some((-amount_in.abs(), rest[1].to_string()))
    } else {
        Some((amount_out.abs(), rest[4].trim_end_matches('.').to_string()))
    }
}

/// Collateral (token transfers carrying a mint) against the borrowed native
/// amount, when both are present. Only borrow and collateral records carry a
/// loan leg; swaps and transfers move the same shapes of value.
fn resolve_loan_leg(raw: &RawTransaction, tx_type: &TransactionType) -> Option<LoanLeg> {
    if !matches!(tx_type, TransactionType::Borrow | TransactionType::Collateral) {
        return None;
    }
    let collateral: Decimal = raw
        .token_transfers()
        .iter()
        .filter(|t| t.mint.is_some())
        .filter_map(|t| t.token_amount.as_ref().and_then(parse_decimal))
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount));
    let borrowed = raw
        .native_transfers()
        .first()
        .and_then(|t| t.amount.as_ref())
        .and_then(parse_decimal)
        .map(lamports_to_sol)
        .unwrap_or_default();

    if collateral > Decimal::ZERO && borrowed > Decimal::ZERO {
        Some(LoanLeg {
            collateral,
            borrowed,
        })
    } else {
        None
    }
}
