use crate::config;
use crate::engine::RefreshOrchestrator;
use crate::error::WatchlistError;
use crate::expiry;
use crate::models::{ContractKey, ContractSpec, OptionQuote, OptionType};
use crate::provider::QuoteProvider;
use anyhow::Result;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::warn;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

/// Body of a watchlist add. Strike arrives as a number or a string;
/// option type as any accepted token ("Call", "put", "C", ...).
#[derive(Debug, Deserialize)]
pub struct AddContractRequest {
    pub ticker: String,
    pub expiration: String,
    pub strike: Value,
    #[serde(rename = "optionType")]
    pub option_type: String,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub watchlist: Vec<ContractSpec>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionQuote>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub api_working: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct ExpirationsResponse {
    pub dates: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    // One mutex over the whole orchestrator: watchlist mutation and
    // refresh cycles are serialized, so a second refresh can never start
    // while one is in flight.
    tracker: Arc<Mutex<RefreshOrchestrator>>,
    provider: Arc<dyn QuoteProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(RefreshOrchestrator::new(provider.clone()))),
            provider,
        }
    }
}

fn parse_contract(req: &AddContractRequest) -> Result<ContractSpec, String> {
    let expiration = NaiveDate::parse_from_str(req.expiration.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid expiration date: {}", req.expiration))?;

    let strike = match &req.strike {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
    .ok_or("Invalid strike price")?;

    let option_type = OptionType::parse(&req.option_type)
        .ok_or_else(|| format!("Invalid option type: {}", req.option_type))?;

    let ticker = req.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err("Ticker must not be empty".to_string());
    }

    Ok(ContractSpec::new(ContractKey::new(
        ticker,
        expiration,
        strike,
        option_type,
    )))
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/watchlist - Tracked contracts in insertion order
async fn get_watchlist(State(state): State<AppState>) -> Json<WatchlistResponse> {
    let tracker = state.tracker.lock().await;
    Json(WatchlistResponse {
        watchlist: tracker.list().to_vec(),
    })
}

/// POST /api/watchlist/add - Add a contract to the watchlist
async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(req): Json<AddContractRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, Json<ErrorResponse>)> {
    let spec = parse_contract(&req).map_err(|error| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
    })?;

    let mut tracker = state.tracker.lock().await;
    match tracker.add(spec) {
        Ok(()) => Ok(Json(SuccessResponse { success: true })),
        Err(WatchlistError::Duplicate) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Already in watchlist".to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )),
    }
}

/// DELETE /api/watchlist/remove/{index} - Remove by position
async fn remove_from_watchlist(
    Path(index): Path<usize>,
    State(state): State<AppState>,
) -> Json<SuccessResponse> {
    let mut tracker = state.tracker.lock().await;
    // Out-of-range removal is tolerated: the entry is already gone as far
    // as the caller is concerned.
    if let Err(e) = tracker.remove(index) {
        warn!(index, error = %e, "watchlist remove ignored");
    }
    Json(SuccessResponse { success: true })
}

/// DELETE /api/watchlist/clear - Empty the watchlist and OI baselines
async fn clear_watchlist(State(state): State<AppState>) -> Json<SuccessResponse> {
    let mut tracker = state.tracker.lock().await;
    tracker.clear();
    Json(SuccessResponse { success: true })
}

/// GET /api/refresh - Run one refresh cycle over the whole watchlist
async fn refresh_data(State(state): State<AppState>) -> Json<RefreshResponse> {
    let mut tracker = state.tracker.lock().await;
    match tracker.refresh().await {
        Ok(options) => Json(RefreshResponse {
            options: Some(options),
            error: None,
        }),
        Err(e) => Json(RefreshResponse {
            options: None,
            error: Some(e.to_string()),
        }),
    }
}

/// GET /api/status - Provider health probe
async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.provider.health_check().await;
    Json(StatusResponse {
        api_working: status.healthy,
        detail: status.detail,
    })
}

/// GET /api/expirations/{ticker} - Expiration dates for a ticker
async fn get_expirations(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Json<ExpirationsResponse> {
    let ticker = ticker.trim().to_uppercase();

    match state.provider.fetch_quotes(&ticker, &[]).await {
        Ok(records) => {
            let dates = expiry::expirations_from_records(&records, config::MAX_EXPIRY_DATES);
            if dates.is_empty() {
                Json(ExpirationsResponse {
                    dates: fallback_dates(),
                    error: None,
                })
            } else {
                Json(ExpirationsResponse { dates, error: None })
            }
        }
        Err(e) => {
            warn!(ticker = %ticker, error = %e, "expiration fetch failed, using generated dates");
            Json(ExpirationsResponse {
                dates: fallback_dates(),
                error: Some(format!("Using default dates. Error: {e}")),
            })
        }
    }
}

/// Standard monthly expirations starting this month.
fn fallback_dates() -> Vec<String> {
    let today = chrono::Local::now().date_naive();
    expiry::monthly_expirations(today, config::FALLBACK_EXPIRY_MONTHS)
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/watchlist", get(get_watchlist))
        .route("/api/watchlist/add", post(add_to_watchlist))
        .route("/api/watchlist/remove/{index}", delete(remove_from_watchlist))
        .route("/api/watchlist/clear", delete(clear_watchlist))
        .route("/api/refresh", get(refresh_data))
        .route("/api/status", get(api_status))
        .route("/api/expirations/{ticker}", get(get_expirations))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(provider: Arc<dyn QuoteProvider>, port: u16) -> Result<()> {
    let app = router(AppState::new(provider));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("🚀 OI Tracker API running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET    /api/watchlist");
    println!("   POST   /api/watchlist/add");
    println!("   DELETE /api/watchlist/remove/{{index}}");
    println!("   DELETE /api/watchlist/clear");
    println!("   GET    /api/refresh");
    println!("   GET    /api/status");
    println!("   GET    /api/expirations/{{ticker}}");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
