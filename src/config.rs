use std::time::Duration;

// -----------------------------------------------
// ALPHA VANTAGE API ENDPOINTS
// -----------------------------------------------
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

pub fn realtime_options_url(symbol: &str, api_key: &str) -> String {
    format!(
        "{}?function=REALTIME_OPTIONS&symbol={}&apikey={}",
        ALPHA_VANTAGE_BASE_URL,
        urlencoding::encode(symbol),
        urlencoding::encode(api_key)
    )
}

pub fn global_quote_url(symbol: &str, api_key: &str) -> String {
    format!(
        "{}?function=GLOBAL_QUOTE&symbol={}&apikey={}",
        ALPHA_VANTAGE_BASE_URL,
        urlencoding::encode(symbol),
        urlencoding::encode(api_key)
    )
}

// -----------------------------------------------
// API KEY
// -----------------------------------------------
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_KEY";
pub const DEMO_API_KEY: &str = "demo";

pub fn api_key_from_env() -> String {
    std::env::var(API_KEY_ENV).unwrap_or_else(|_| DEMO_API_KEY.to_string())
}

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 3;
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// RATE LIMITING
// -----------------------------------------------
// Free tier allows 5 requests per minute. A courtesy pause between
// per-ticker calls keeps a multi-ticker refresh under the budget.
pub const PROVIDER_CALL_DELAY_MS: u64 = 800;

// -----------------------------------------------
// STATUS PROBE
// -----------------------------------------------
pub const STATUS_PROBE_SYMBOL: &str = "SPY";

// -----------------------------------------------
// EXPIRATION DATES
// -----------------------------------------------
pub const FALLBACK_EXPIRY_MONTHS: usize = 6;
pub const MAX_EXPIRY_DATES: usize = 10;

// -----------------------------------------------
// SERVER CONFIG
// -----------------------------------------------
pub const SERVER_PORT_ENV: &str = "PORT";
pub const DEFAULT_SERVER_PORT: u16 = 5000;

pub fn server_port() -> u16 {
    std::env::var(SERVER_PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_SERVER_PORT)
}
