use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option side (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Accepts the token spellings providers use: "C"/"call"/"Call" and
    /// "P"/"put"/"Put".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Put => "Put",
        }
    }
}

/// Sole identity for watchlist deduplication and delta tracking.
///
/// The strike is a `Decimal`, not a float, so `"150"`, `150.0` and
/// `150.00` are one strike. Normalized on construction so hashing is
/// scale-independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractKey {
    pub ticker: String,
    pub expiration: NaiveDate,
    pub strike: Decimal,
    #[serde(rename = "optionType")]
    pub option_type: OptionType,
}

impl ContractKey {
    pub fn new(
        ticker: impl Into<String>,
        expiration: NaiveDate,
        strike: Decimal,
        option_type: OptionType,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            expiration,
            strike: strike.normalize(),
            option_type,
        }
    }
}

/// A watchlist entry. Carries nothing beyond its key today; the spec type
/// is what the watchlist owns and hands to providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSpec {
    #[serde(flatten)]
    pub key: ContractKey,
}

impl ContractSpec {
    pub fn new(key: ContractKey) -> Self {
        Self { key }
    }

    pub fn ticker(&self) -> &str {
        &self.key.ticker
    }
}

/// Canonical per-contract quote produced by one refresh cycle.
///
/// `found = false` marks a contract the provider did not return (expired,
/// invalid, no data). It still appears in refresh output with zero-valued
/// numeric fields so the watchlist entry is never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuote {
    pub ticker: String,
    pub expiration: NaiveDate,
    pub strike: Decimal,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub last: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub volume: u64,
    pub open_interest: u64,
    pub oi_change: i64,
    pub oi_pct_change: f64,
    pub implied_volatility: f64,
    pub found: bool,
}

impl OptionQuote {
    /// Zero-valued quote for a contract the provider did not return.
    pub fn not_found(spec: &ContractSpec) -> Self {
        Self {
            ticker: spec.key.ticker.clone(),
            expiration: spec.key.expiration,
            strike: spec.key.strike,
            option_type: spec.key.option_type,
            last: Decimal::ZERO,
            bid: Decimal::ZERO,
            ask: Decimal::ZERO,
            volume: 0,
            open_interest: 0,
            oi_change: 0,
            oi_pct_change: 0.0,
            implied_volatility: 0.0,
            found: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_option_type_tokens() {
        assert_eq!(OptionType::parse("C"), Some(OptionType::Call));
        assert_eq!(OptionType::parse("call"), Some(OptionType::Call));
        assert_eq!(OptionType::parse("Call"), Some(OptionType::Call));
        assert_eq!(OptionType::parse("P"), Some(OptionType::Put));
        assert_eq!(OptionType::parse("put"), Some(OptionType::Put));
        assert_eq!(OptionType::parse("straddle"), None);
    }

    #[test]
    fn test_key_equality_ignores_strike_scale() {
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        let a = ContractKey::new("SPY", expiry, dec!(150), OptionType::Call);
        let b = ContractKey::new("SPY", expiry, dec!(150.00), OptionType::Call);
        assert_eq!(a, b);

        let mut seen = std::collections::HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
    }

    #[test]
    fn test_key_distinguishes_sides() {
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        let call = ContractKey::new("SPY", expiry, dec!(150), OptionType::Call);
        let put = ContractKey::new("SPY", expiry, dec!(150), OptionType::Put);
        assert_ne!(call, put);
    }
}
