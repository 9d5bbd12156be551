use anyhow::Result;
use colored::Colorize;
use oi_tracker::alpha_vantage::AlphaVantageProvider;
use oi_tracker::{api_server_axum, config, logging};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    println!("{}", "=".repeat(60).blue());
    println!("{}", "Options Open Interest Tracker".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let api_key = config::api_key_from_env();
    if api_key == config::DEMO_API_KEY {
        println!(
            "{} {} not set, using the demo key (heavily rate limited)",
            "⚠".yellow(),
            config::API_KEY_ENV
        );
        println!();
    }

    let provider = Arc::new(AlphaVantageProvider::new(api_key)?);
    api_server_axum::start_server(provider, config::server_port()).await
}
