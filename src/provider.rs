use crate::error::FetchError;
use crate::models::ContractSpec;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Untyped per-contract record as returned by a provider. Field names and
/// encodings vary by provider; the normalizer owns all shape handling.
pub type RawRecord = Value;

/// Provider health probe result, surfaced by `/api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub healthy: bool,
    pub detail: String,
}

/// A market-data source for option quotes. The core cares only about this
/// contract; transport, auth, and rate-limit sleeps live behind it.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch raw records for the contracts tracked under `ticker`.
    ///
    /// Returning fewer records than specs is normal; the normalizer emits
    /// not-found quotes for the gaps. Returning more is also normal (a
    /// provider may answer with the whole chain for the symbol).
    async fn fetch_quotes(
        &self,
        ticker: &str,
        specs: &[ContractSpec],
    ) -> Result<Vec<RawRecord>, FetchError>;

    /// Optional health probe. Providers without one report healthy.
    async fn health_check(&self) -> ProviderStatus {
        ProviderStatus {
            healthy: true,
            detail: "ok".to_string(),
        }
    }
}
