//! Main entry point for the mint-radar webhook server

use anyhow::{Context, Result};
use clap::Parser;
use mint_radar::radar::{RadarBuilder, ScoreThresholds};
use mint_radar::server::{self, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Solana new-mint radar
#[derive(Parser, Debug)]
#[command(name = "mint-radar")]
#[command(about = "Scores newly minted Solana tokens and alerts on Telegram", long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "RADAR_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the HTTP server to
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Log filter, e.g. "info" or "mint_radar=debug"
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Liquidity (USD) at or above which liquidity counts as healthy
    #[arg(long, env = "RADAR_MIN_LIQUIDITY_USD", default_value_t = 10_000.0)]
    min_liquidity_usd: f64,

    /// 24h volume (USD) at or above which volume counts as healthy
    #[arg(long, env = "RADAR_MIN_VOLUME_24H_USD", default_value_t = 2_000.0)]
    min_volume_24h_usd: f64,

    /// Top-10 holder share (percent) at or below which holders count as spread
    #[arg(long, env = "RADAR_MAX_TOP10_PCT", default_value_t = 50.0)]
    max_top10_pct: f64,

    /// Minimum flip score that triggers an alert
    #[arg(long, env = "RADAR_MIN_FLIP_SCORE", default_value_t = 25, allow_hyphen_values = true)]
    min_flip_score: i32,

    /// Minutes between two alerts for the same mint
    #[arg(long, env = "RADAR_COOLDOWN_MINUTES", default_value_t = 120)]
    cooldown_minutes: u64,

    /// Timeout for every outbound request, in seconds
    #[arg(long, env = "RADAR_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,

    /// Requests per second allowed against each data provider
    #[arg(long, env = "RADAR_PROVIDER_RPS", default_value_t = 5)]
    provider_rps: u32,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Telegram chat id
    #[arg(long, env = "TELEGRAM_CHAT_ID", hide_env_values = true)]
    telegram_chat_id: Option<String>,

    /// Expected Authorization header value on the webhook
    #[arg(long, env = "WEBHOOK_AUTH_HEADER", default_value = "", hide_env_values = true, hide_default_value = true)]
    webhook_auth_header: String,
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Starting mint-radar v{}", env!("CARGO_PKG_VERSION"));

    let radar = RadarBuilder::new()
        .with_thresholds(ScoreThresholds {
            min_liquidity_usd: args.min_liquidity_usd,
            min_volume_24h_usd: args.min_volume_24h_usd,
            max_top10_pct: args.max_top10_pct,
        })
        .with_min_flip_score(args.min_flip_score)
        .with_cooldown_minutes(args.cooldown_minutes)
        .with_request_timeout(args.request_timeout_secs)
        .with_provider_rate_limit(args.provider_rps)
        .with_telegram(args.telegram_token, args.telegram_chat_id)
        .with_webhook_secret(args.webhook_auth_header)
        .build()
        .context("failed to build mint radar")?;

    info!("Configuration: {:?}", radar.config());
    if radar.config().webhook_secret.trim().is_empty() {
        warn!("WEBHOOK_AUTH_HEADER is not set; every webhook call will be rejected");
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    server::serve(listener, AppState::new(Arc::new(radar))).await
}
