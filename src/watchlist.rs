use crate::error::WatchlistError;
use crate::models::ContractSpec;

/// Ordered, deduplicated set of tracked contracts. Pure CRUD; the
/// orchestrator owns the instance and couples `clear` with the OI
/// baseline reset.
#[derive(Debug, Default)]
pub struct Watchlist {
    entries: Vec<ContractSpec>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contract, preserving insertion order. A duplicate key is
    /// rejected without mutating the list.
    pub fn add(&mut self, spec: ContractSpec) -> Result<(), WatchlistError> {
        if self.entries.iter().any(|e| e.key == spec.key) {
            return Err(WatchlistError::Duplicate);
        }
        self.entries.push(spec);
        Ok(())
    }

    /// Remove by position. Out-of-range is an error the caller may simply
    /// ignore.
    pub fn remove(&mut self, index: usize) -> Result<ContractSpec, WatchlistError> {
        if index >= self.entries.len() {
            return Err(WatchlistError::IndexOutOfRange(index));
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in insertion order. This order drives display and refresh
    /// output.
    pub fn list(&self) -> &[ContractSpec] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractKey, OptionType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn spec(ticker: &str, strike: rust_decimal::Decimal) -> ContractSpec {
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 17).unwrap();
        ContractSpec::new(ContractKey::new(ticker, expiry, strike, OptionType::Call))
    }

    #[test]
    fn test_add_preserves_order() {
        let mut wl = Watchlist::new();
        wl.add(spec("SPY", dec!(450))).unwrap();
        wl.add(spec("AAPL", dec!(180))).unwrap();
        wl.add(spec("SPY", dec!(460))).unwrap();

        let tickers: Vec<&str> = wl.list().iter().map(|s| s.ticker()).collect();
        assert_eq!(tickers, vec!["SPY", "AAPL", "SPY"]);
    }

    #[test]
    fn test_duplicate_add_rejected_without_mutation() {
        let mut wl = Watchlist::new();
        wl.add(spec("SPY", dec!(450))).unwrap();

        // Same strike at a different scale is the same contract.
        assert_eq!(
            wl.add(spec("SPY", dec!(450.00))),
            Err(WatchlistError::Duplicate)
        );
        assert_eq!(wl.len(), 1);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut wl = Watchlist::new();
        wl.add(spec("SPY", dec!(450))).unwrap();

        assert_eq!(wl.remove(3), Err(WatchlistError::IndexOutOfRange(3)));
        assert_eq!(wl.len(), 1);

        let removed = wl.remove(0).unwrap();
        assert_eq!(removed.ticker(), "SPY");
        assert!(wl.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut wl = Watchlist::new();
        wl.add(spec("SPY", dec!(450))).unwrap();
        wl.add(spec("AAPL", dec!(180))).unwrap();
        wl.clear();
        assert!(wl.is_empty());
    }
}
