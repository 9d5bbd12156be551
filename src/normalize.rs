use crate::models::{ContractSpec, OptionQuote, OptionType};
use crate::provider::RawRecord;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

// Field spellings seen across providers. Snake case is the Alpha Vantage
// wire format; the camel case variants come from chain-style APIs.
const EXPIRATION_KEYS: &[&str] = &["expiration", "expiryDate", "expiry"];
const STRIKE_KEYS: &[&str] = &["strike", "strikePrice"];
const TYPE_KEYS: &[&str] = &["type", "optionType"];
const LAST_KEYS: &[&str] = &["last", "lastPrice"];
const BID_KEYS: &[&str] = &["bid"];
const ASK_KEYS: &[&str] = &["ask"];
const VOLUME_KEYS: &[&str] = &["volume", "totalTradedVolume"];
const OPEN_INTEREST_KEYS: &[&str] = &["open_interest", "openInterest"];
const IV_KEYS: &[&str] = &["implied_volatility", "impliedVolatility"];

/// Find the raw record matching `spec` in a fetched batch and map it onto
/// the canonical quote shape. A field the provider omitted or returned as
/// non-numeric becomes `0`, never an error. No matching record yields a
/// zero-valued `found = false` quote so the watchlist entry is never
/// dropped.
///
/// The OI delta fields are left at zero here; the orchestrator fills them
/// after consulting the tracker.
pub fn normalize_quote(spec: &ContractSpec, records: &[RawRecord]) -> OptionQuote {
    let Some(raw) = records.iter().find(|r| matches_spec(r, spec)) else {
        return OptionQuote::not_found(spec);
    };

    OptionQuote {
        ticker: spec.key.ticker.clone(),
        expiration: spec.key.expiration,
        strike: spec.key.strike,
        option_type: spec.key.option_type,
        last: field_decimal(raw, LAST_KEYS),
        bid: field_decimal(raw, BID_KEYS),
        ask: field_decimal(raw, ASK_KEYS),
        volume: field_count(raw, VOLUME_KEYS),
        open_interest: field_count(raw, OPEN_INTEREST_KEYS),
        oi_change: 0,
        oi_pct_change: 0.0,
        implied_volatility: field_f64(raw, IV_KEYS),
        found: true,
    }
}

/// A record matches when expiration (normalized to YYYY-MM-DD), strike
/// (numeric equality, string or number encoding) and option-type token
/// (case-insensitive) all agree with the requesting spec.
fn matches_spec(raw: &RawRecord, spec: &ContractSpec) -> bool {
    let expiration_ok = field_string(raw, EXPIRATION_KEYS)
        .and_then(|s| parse_expiration(&s))
        .is_some_and(|d| d == spec.key.expiration);

    let strike_ok =
        field_opt_decimal(raw, STRIKE_KEYS).is_some_and(|s| s == spec.key.strike);

    let type_ok = field_string(raw, TYPE_KEYS)
        .and_then(|t| OptionType::parse(&t))
        .is_some_and(|t| t == spec.key.option_type);

    expiration_ok && strike_ok && type_ok
}

fn parse_expiration(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

// -----------------------------------------------
// TOLERANT FIELD EXTRACTION
// -----------------------------------------------

fn lookup<'a>(raw: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| raw.get(k))
}

fn field_string(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    match lookup(raw, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
    .map(|d| d.normalize())
}

fn field_opt_decimal(raw: &RawRecord, keys: &[&str]) -> Option<Decimal> {
    lookup(raw, keys).and_then(value_decimal)
}

fn field_decimal(raw: &RawRecord, keys: &[&str]) -> Decimal {
    field_opt_decimal(raw, keys).unwrap_or(Decimal::ZERO)
}

fn field_f64(raw: &RawRecord, keys: &[&str]) -> f64 {
    match lookup(raw, keys) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Non-negative integer field. Providers encode counts as strings,
/// integers, or floats; negatives and garbage become zero.
fn field_count(raw: &RawRecord, keys: &[&str]) -> u64 {
    let v = field_f64(raw, keys);
    if v.is_finite() && v > 0.0 { v.trunc() as u64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContractKey;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn spec(strike: Decimal, option_type: OptionType) -> ContractSpec {
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        ContractSpec::new(ContractKey::new("SPY", expiry, strike, option_type))
    }

    #[test]
    fn test_match_tolerates_string_strike_and_short_type() {
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": "150",
            "type": "C",
            "last": "3.25",
            "bid": "3.20",
            "ask": "3.30",
            "volume": "1200",
            "open_interest": "5400",
            "implied_volatility": "0.21"
        })];

        let quote = normalize_quote(&spec(dec!(150.0), OptionType::Call), &records);
        assert!(quote.found);
        assert_eq!(quote.last, dec!(3.25));
        assert_eq!(quote.volume, 1200);
        assert_eq!(quote.open_interest, 5400);
        assert_eq!(quote.implied_volatility, 0.21);
    }

    #[test]
    fn test_match_tolerates_numeric_encoding() {
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": 150.0,
            "type": "call",
            "open_interest": 5400
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Call), &records);
        assert!(quote.found);
        assert_eq!(quote.open_interest, 5400);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": "150",
            "type": "put"
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Put), &records);
        assert!(quote.found);
        assert_eq!(quote.last, Decimal::ZERO);
        assert_eq!(quote.bid, Decimal::ZERO);
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.open_interest, 0);
        assert_eq!(quote.implied_volatility, 0.0);
    }

    #[test]
    fn test_garbage_fields_default_to_zero() {
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": "150",
            "type": "call",
            "volume": "n/a",
            "open_interest": -5,
            "implied_volatility": ""
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Call), &records);
        assert!(quote.found);
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.open_interest, 0);
        assert_eq!(quote.implied_volatility, 0.0);
    }

    #[test]
    fn test_no_match_yields_not_found() {
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": "155",
            "type": "call",
            "open_interest": 5400
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Call), &records);
        assert!(!quote.found);
        assert_eq!(quote.open_interest, 0);
        assert_eq!(quote.strike, dec!(150));
    }

    #[test]
    fn test_wrong_side_does_not_match() {
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": "150",
            "type": "put",
            "open_interest": 5400
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Call), &records);
        assert!(!quote.found);
    }

    #[test]
    fn test_strike_magnitude_must_agree() {
        // 150 vs 1500: string-vs-number tolerance never bridges magnitude.
        let records = vec![json!({
            "expiration": "2025-01-17",
            "strike": "1500",
            "type": "call"
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Call), &records);
        assert!(!quote.found);
    }

    #[test]
    fn test_camel_case_field_names() {
        let records = vec![json!({
            "expiryDate": "2025-01-17",
            "strikePrice": 150,
            "optionType": "CALL",
            "lastPrice": 3.25,
            "openInterest": 7000,
            "impliedVolatility": 0.18
        })];

        let quote = normalize_quote(&spec(dec!(150), OptionType::Call), &records);
        assert!(quote.found);
        assert_eq!(quote.last, dec!(3.25));
        assert_eq!(quote.open_interest, 7000);
        assert_eq!(quote.implied_volatility, 0.18);
    }
}
