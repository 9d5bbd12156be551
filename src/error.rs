use thiserror::Error;

/// Watchlist mutation failures. `IndexOutOfRange` is non-fatal by
/// contract; the HTTP layer swallows it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("contract already in watchlist")]
    Duplicate,

    #[error("watchlist index {0} out of range")]
    IndexOutOfRange(usize),
}

/// Provider fetch failures as the core sees them, stripped of transport
/// detail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Bad symbol, bad key, or a request the provider rejected outright.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Quota or per-minute budget exhausted. Cycle-fatal.
    #[error("provider rate limit reached: {0}")]
    RateLimited(String),

    /// Transport problem: connect, timeout, unreadable body.
    #[error("network error: {0}")]
    Network(String),
}

/// A whole refresh cycle failed. Recoverable on the next refresh; never
/// terminates the process.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("refresh aborted, provider rate limit reached: {0}")]
    RateLimited(String),
}
