use crate::delta::OiDeltaTracker;
use crate::error::{CycleError, FetchError, WatchlistError};
use crate::models::{ContractKey, ContractSpec, OptionQuote};
use crate::normalize;
use crate::provider::QuoteProvider;
use crate::watchlist::Watchlist;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Owns all tracker state and drives one refresh cycle:
/// watchlist → grouped provider calls → normalization → OI deltas.
///
/// All mutation goes through one instance on one logical thread; the API
/// layer serializes access with a mutex so a second refresh can never
/// start while one is in flight.
pub struct RefreshOrchestrator {
    provider: Arc<dyn QuoteProvider>,
    watchlist: Watchlist,
    history: OiDeltaTracker,
}

impl RefreshOrchestrator {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            watchlist: Watchlist::new(),
            history: OiDeltaTracker::new(),
        }
    }

    pub fn add(&mut self, spec: ContractSpec) -> Result<(), WatchlistError> {
        self.watchlist.add(spec)
    }

    pub fn remove(&mut self, index: usize) -> Result<ContractSpec, WatchlistError> {
        // The baseline for a removed contract is left in place: re-adding
        // the same contract reuses it.
        self.watchlist.remove(index)
    }

    pub fn list(&self) -> &[ContractSpec] {
        self.watchlist.list()
    }

    /// Empties the watchlist and drops all OI baselines together, so a
    /// re-added contract never inherits a delta from its earlier life.
    pub fn clear(&mut self) {
        self.watchlist.clear();
        self.history.clear();
    }

    /// One refresh cycle. Fetches each ticker group sequentially, skipping
    /// groups that fail with transport or request errors; a rate-limit
    /// signal aborts the whole cycle because partial results under
    /// rate-limiting are misleading.
    pub async fn refresh(&mut self) -> Result<Vec<OptionQuote>, CycleError> {
        if self.watchlist.is_empty() {
            return Ok(Vec::new());
        }

        let groups = ticker_groups(self.watchlist.list());
        let mut by_key: HashMap<ContractKey, OptionQuote> = HashMap::new();

        for (ticker, specs) in &groups {
            match self.provider.fetch_quotes(ticker, specs).await {
                Ok(records) => {
                    for spec in specs {
                        let mut quote = normalize::normalize_quote(spec, &records);
                        // A contract the provider no longer returns resets
                        // its baseline to zero.
                        let current_oi = if quote.found { quote.open_interest } else { 0 };
                        let (change, pct) = self.history.update(&spec.key, current_oi);
                        quote.oi_change = change;
                        quote.oi_pct_change = pct;
                        by_key.insert(spec.key.clone(), quote);
                    }
                }
                Err(FetchError::RateLimited(msg)) => {
                    error!(ticker = %ticker, "rate limit hit, aborting refresh cycle");
                    return Err(CycleError::RateLimited(msg));
                }
                Err(err) => {
                    // One underlying failing must not sink the rest of the
                    // cycle. Baselines stay untouched: a transport failure
                    // says nothing about the contract's open interest.
                    warn!(ticker = %ticker, error = %err, "fetch failed, skipping ticker group");
                    for spec in specs {
                        by_key.insert(spec.key.clone(), OptionQuote::not_found(spec));
                    }
                }
            }
        }

        // Output follows watchlist order, not grouping order. Every entry
        // produces exactly one quote.
        let results: Vec<OptionQuote> = self
            .watchlist
            .list()
            .iter()
            .map(|spec| {
                by_key
                    .remove(&spec.key)
                    .unwrap_or_else(|| OptionQuote::not_found(spec))
            })
            .collect();

        info!(
            contracts = results.len(),
            found = results.iter().filter(|q| q.found).count(),
            "refresh cycle complete"
        );
        Ok(results)
    }
}

/// Specs bucketed by ticker, tickers in first-seen watchlist order. One
/// provider call per underlying keeps the call count inside provider rate
/// budgets.
fn ticker_groups(specs: &[ContractSpec]) -> Vec<(String, Vec<ContractSpec>)> {
    let mut groups: Vec<(String, Vec<ContractSpec>)> = Vec::new();
    for spec in specs {
        match groups.iter_mut().find(|(t, _)| t.as_str() == spec.ticker()) {
            Some((_, bucket)) => bucket.push(spec.clone()),
            None => groups.push((spec.ticker().to_string(), vec![spec.clone()])),
        }
    }
    groups
}
