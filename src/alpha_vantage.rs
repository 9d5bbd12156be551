use crate::config;
use crate::error::FetchError;
use crate::models::ContractSpec;
use crate::provider::{ProviderStatus, QuoteProvider, RawRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

// -----------------------------------------------
// CLIENT WRAPPER
// -----------------------------------------------
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_key,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(config::api_key_from_env())
    }

    /// Generic retry fetch. Retries transport errors, 429 and 5xx with
    /// exponential backoff; fails fast on other client errors.
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        RetryIf::spawn(
            backoff,
            || async {
                let res = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| FetchError::Network(format!("request send failed: {e}")))?;

                let status = res.status();
                if status.is_success() {
                    res.json::<Value>()
                        .await
                        .map_err(|e| FetchError::Network(format!("unreadable body: {e}")))
                } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    Err(FetchError::Network(format!("retryable status {status}")))
                } else {
                    Err(FetchError::Invalid(format!("client error {status}")))
                }
            },
            // Only transport-class failures are worth retrying.
            |err: &FetchError| matches!(err, FetchError::Network(_)),
        )
        .await
    }
}

/// Alpha Vantage signals quota exhaustion and bad requests in-band with
/// HTTP 200; the body shape tells them apart.
fn classify_payload(body: &Value) -> Result<Vec<RawRecord>, FetchError> {
    if let Some(note) = body.get("Note").or_else(|| body.get("Information")) {
        let msg = note.as_str().unwrap_or("API call limit reached").to_string();
        return Err(FetchError::RateLimited(msg));
    }
    if let Some(msg) = body.get("Error Message") {
        let msg = msg.as_str().unwrap_or("invalid API key or symbol").to_string();
        return Err(FetchError::Invalid(msg));
    }

    // No data section at all is an empty batch, not an error; the
    // normalizer turns the gaps into not-found quotes.
    Ok(body
        .get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    async fn fetch_quotes(
        &self,
        ticker: &str,
        _specs: &[ContractSpec],
    ) -> Result<Vec<RawRecord>, FetchError> {
        // Courtesy pause before every call keeps a multi-ticker refresh
        // under the shared per-minute budget. The requested specs are not
        // part of the request: the endpoint answers with the whole chain
        // for the symbol.
        tokio::time::sleep(Duration::from_millis(config::PROVIDER_CALL_DELAY_MS)).await;

        let url = config::realtime_options_url(ticker, &self.api_key);
        let body = self.fetch_json(&url).await?;
        let records = classify_payload(&body)?;
        debug!(ticker = %ticker, records = records.len(), "fetched option records");
        Ok(records)
    }

    async fn health_check(&self) -> ProviderStatus {
        let url = config::global_quote_url(config::STATUS_PROBE_SYMBOL, &self.api_key);
        match self.fetch_json(&url).await {
            Ok(body) => {
                if body.get("Error Message").is_some() {
                    ProviderStatus {
                        healthy: false,
                        detail: "Invalid API key".to_string(),
                    }
                } else if body.get("Note").is_some() || body.get("Information").is_some() {
                    ProviderStatus {
                        healthy: false,
                        detail: "API limit reached".to_string(),
                    }
                } else {
                    ProviderStatus {
                        healthy: true,
                        detail: "Connected".to_string(),
                    }
                }
            }
            Err(e) => ProviderStatus {
                healthy: false,
                detail: e.to_string(),
            },
        }
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_is_rate_limited() {
        let body = json!({"Note": "Thank you for using Alpha Vantage!"});
        assert!(matches!(
            classify_payload(&body),
            Err(FetchError::RateLimited(_))
        ));
    }

    #[test]
    fn test_information_is_rate_limited() {
        let body = json!({"Information": "premium endpoint"});
        assert!(matches!(
            classify_payload(&body),
            Err(FetchError::RateLimited(_))
        ));
    }

    #[test]
    fn test_error_message_is_invalid() {
        let body = json!({"Error Message": "Invalid API call"});
        assert!(matches!(classify_payload(&body), Err(FetchError::Invalid(_))));
    }

    #[test]
    fn test_data_array_passes_through() {
        let body = json!({"data": [{"strike": "150"}, {"strike": "155"}]});
        let records = classify_payload(&body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_missing_data_is_empty_batch() {
        let body = json!({"endpoint": "Realtime Options"});
        assert!(classify_payload(&body).unwrap().is_empty());
    }
}
