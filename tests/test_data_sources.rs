//! HTTP data sources and snapshot building against a local fake provider.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use mint_radar::radar::{
    HttpDataSources, MintAuthority, Provider, ProviderError, ProviderRateLimiter, RadarMetrics,
    SnapshotBuilder, TokenDataSources,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const GOOD_MINT: &str = "GoodMint1111";

async fn token_meta(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("tokenAddress").map(String::as_str) {
        Some(GOOD_MINT) => (
            StatusCode::OK,
            Json(json!({
                "name": "Good Token",
                "symbol": "GOOD",
                "supply": "1000000",
                "mintAuthority": null
            })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))),
    }
}

async fn token_holders(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    assert_eq!(params.get("limit").map(String::as_str), Some("20"));
    let holders: Vec<_> = (0..12)
        .map(|i| json!({ "owner": format!("Owner{}", i), "amount": 25_000 }))
        .collect();
    Json(json!({ "data": holders }))
}

async fn token_pairs(Path(mint): Path<String>) -> impl IntoResponse {
    if mint != GOOD_MINT {
        return Json(json!({ "pairs": null }));
    }
    Json(json!({
        "pairs": [
            {
                "url": "https://dexscreener.com/solana/small",
                "liquidity": { "usd": 900 },
                "volume": { "h24": 50 },
                "baseToken": { "name": "Good Token", "symbol": "GOOD" }
            },
            {
                "url": "https://dexscreener.com/solana/deep",
                "liquidity": { "usd": "42000.5" },
                "volume": { "h24": 7300 },
                "baseToken": { "name": "Good Token", "symbol": "GOOD" }
            }
        ]
    }))
}

async fn spawn_fake_provider() -> String {
    let app = Router::new()
        .route("/solscan/token/meta", get(token_meta))
        .route("/solscan/token/holders", get(token_holders))
        .route("/dex/latest/dex/tokens/:mint", get(token_pairs));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sources(base: &str) -> HttpDataSources {
    HttpDataSources::new(
        reqwest::Client::new(),
        format!("{}/solscan", base),
        format!("{}/dex/", base),
        Duration::from_secs(2),
        Arc::new(ProviderRateLimiter::new(100)),
    )
}

#[tokio::test]
async fn test_fetchers_against_fake_provider() {
    let base = spawn_fake_provider().await;
    let sources = sources(&base);

    let meta = sources.fetch_token_meta(GOOD_MINT).await.unwrap();
    assert_eq!(meta.name.as_deref(), Some("Good Token"));
    assert_eq!(meta.symbol.as_deref(), Some("GOOD"));
    assert_eq!(meta.supply, Some(1_000_000.0));
    assert_eq!(meta.mint_authority, MintAuthority::Revoked);

    let holders = sources.fetch_holders(GOOD_MINT, 20).await.unwrap();
    assert_eq!(holders.len(), 12);
    assert_eq!(holders[0].owner.as_deref(), Some("Owner0"));

    let pairs = sources.fetch_pairs(GOOD_MINT).await.unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].liquidity_usd, 42_000.5);
}

#[tokio::test]
async fn test_status_error_is_reported() {
    let base = spawn_fake_provider().await;
    let sources = sources(&base);

    let err = sources.fetch_token_meta("MissingMint").await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { .. }));
    assert_eq!(err.provider(), Provider::SolscanMeta);

    // `pairs: null` is an empty result, not an error
    assert!(sources.fetch_pairs("MissingMint").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_snapshot_from_fake_provider() {
    let base = spawn_fake_provider().await;
    let metrics = Arc::new(RadarMetrics::new());
    let builder = SnapshotBuilder::new(Arc::new(sources(&base)), 20, Arc::clone(&metrics));

    let snapshot = builder.build(GOOD_MINT).await;

    assert_eq!(snapshot.name, "Good Token");
    assert_eq!(snapshot.symbol, "GOOD");
    assert!(snapshot.metadata_complete);
    assert_eq!(snapshot.liquidity_usd, 42_000.5);
    assert_eq!(snapshot.volume_24h_usd, 7_300.0);
    assert_eq!(snapshot.pair_url.as_deref(), Some("https://dexscreener.com/solana/deep"));
    // ten of twelve holders at 25,000 each over a supply of 1,000,000
    assert_eq!(snapshot.top10_holder_pct, Some(25.0));
    assert_eq!(snapshot.mint_authority, MintAuthority::Revoked);
    assert_eq!(metrics.snapshot().provider_errors, 0);
}

#[tokio::test]
async fn test_snapshot_with_all_providers_down() {
    // Nothing listens on port 1 of the loopback interface.
    let metrics = Arc::new(RadarMetrics::new());
    let builder = SnapshotBuilder::new(
        Arc::new(sources("http://127.0.0.1:1")),
        20,
        Arc::clone(&metrics),
    );

    let snapshot = builder.build("AnyMint").await;

    assert_eq!(snapshot.mint, "AnyMint");
    assert_eq!(snapshot.name, "Unknown");
    assert_eq!(snapshot.symbol, "?");
    assert!(!snapshot.metadata_complete);
    assert_eq!(snapshot.liquidity_usd, 0.0);
    assert_eq!(snapshot.volume_24h_usd, 0.0);
    assert_eq!(snapshot.top10_holder_pct, None);
    assert_eq!(snapshot.mint_authority, MintAuthority::Unknown);
    assert_eq!(snapshot.pair_url, None);
    assert_eq!(metrics.snapshot().provider_errors, 3);
}
