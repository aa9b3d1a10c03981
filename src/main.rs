// src/main.rs
use crate::config::StrategyConfig;
use crate::connectors::bybit::BybitClient;
use crate::core::engine::TradingEngine;
use anyhow::Context;
use dotenvy::dotenv;
use std::env;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::writer::MakeWriterExt;

mod config;
mod connectors;
mod core;
mod errors;
mod types;
mod utils;

/// Console + non-blocking file log under logs/. The guard must stay alive
/// for the lifetime of the process or buffered lines are lost.
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "trading.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_logging();
    dotenv().ok();

    let api_key = env::var("BYBIT_API_KEY").unwrap_or_default();
    let secret_key = env::var("BYBIT_API_SECRET").unwrap_or_default();

    // Config path may be overridden by the first argument.
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = StrategyConfig::load(&config_path)?;

    println!("========================================");
    println!("      AVG LADDER BOT - v0.1.0");
    println!("========================================");
    println!("Pair:     {}", config.symbol);
    println!("Side:     {:?}", config.side);
    println!("Leverage: x{}", config.leverage);
    println!("========================================");

    let client = BybitClient::new(api_key, secret_key);
    client
        .ping()
        .await
        .context("exchange unreachable or authentication failed")?;
    info!("connected to Bybit demo");

    // Ctrl+C flips the stop channel; the engine observes it at the top of
    // each tick and flattens before exiting.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, requesting shutdown");
            let _ = stop_tx.send(true);
        }
    });

    let mut engine = TradingEngine::new(config, client, stop_rx);
    engine.run().await?;

    info!("bye");
    Ok(())
}
