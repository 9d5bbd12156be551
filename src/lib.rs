pub mod alpha_vantage;
pub mod api_server_axum;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod watchlist;

// Re-exports for convenience
pub use engine::RefreshOrchestrator;
pub use error::{CycleError, FetchError, WatchlistError};
pub use models::{ContractKey, ContractSpec, OptionQuote, OptionType};
pub use provider::{ProviderStatus, QuoteProvider, RawRecord};
pub use watchlist::Watchlist;
