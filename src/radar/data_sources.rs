//! Data sources for fetching token information from external providers.
//!
//! Three read-only providers are queried: Solscan token metadata, Solscan
//! holder distribution and DexScreener trading pairs. Each call returns an
//! explicit [`ProviderError`]; deciding what to do about a failure is left to
//! the snapshot builder.

use crate::radar::rate_limit::ProviderRateLimiter;
use crate::radar::types::{HolderEntry, MarketPair, MintAuthority, TokenMeta};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// External data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    SolscanMeta,
    SolscanHolders,
    DexScreener,
}

impl Provider {
    pub fn all() -> [Provider; 3] {
        [Provider::SolscanMeta, Provider::SolscanHolders, Provider::DexScreener]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::SolscanMeta => "solscan-meta",
            Provider::SolscanHolders => "solscan-holders",
            Provider::DexScreener => "dexscreener",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned status {status}")]
    Status { provider: Provider, status: StatusCode },
    #[error("{provider} returned an unreadable body: {reason}")]
    Decode { provider: Provider, reason: String },
}

impl ProviderError {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::Transport { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Decode { provider, .. } => *provider,
        }
    }
}

/// Read-only access to the three token data providers.
#[async_trait]
pub trait TokenDataSources: Send + Sync {
    /// Name, symbol, supply and mint authority of a token.
    async fn fetch_token_meta(&self, mint: &str) -> Result<TokenMeta, ProviderError>;

    /// Largest holders, biggest first, at most `limit` entries.
    async fn fetch_holders(&self, mint: &str, limit: usize)
        -> Result<Vec<HolderEntry>, ProviderError>;

    /// All trading pairs that have the token as one side.
    async fn fetch_pairs(&self, mint: &str) -> Result<Vec<MarketPair>, ProviderError>;
}

/// HTTP implementation of [`TokenDataSources`].
pub struct HttpDataSources {
    http_client: Client,
    solscan_base_url: String,
    dexscreener_base_url: String,
    timeout: Duration,
    rate_limiter: Arc<ProviderRateLimiter>,
}

impl HttpDataSources {
    /// Create a new data sources manager.
    pub fn new(
        http_client: Client,
        solscan_base_url: impl Into<String>,
        dexscreener_base_url: impl Into<String>,
        timeout: Duration,
        rate_limiter: Arc<ProviderRateLimiter>,
    ) -> Self {
        Self {
            http_client,
            solscan_base_url: trim_base(solscan_base_url.into()),
            dexscreener_base_url: trim_base(dexscreener_base_url.into()),
            timeout,
            rate_limiter,
        }
    }

    /// Send a GET request and decode the body as JSON.
    async fn get_json(&self, provider: Provider, request: RequestBuilder) -> Result<Value, ProviderError> {
        self.rate_limiter.acquire(provider).await;

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| ProviderError::Transport { provider, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status { provider, status });
        }

        response.json::<Value>().await.map_err(|e| ProviderError::Decode {
            provider,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl TokenDataSources for HttpDataSources {
    #[instrument(skip(self), fields(provider = "solscan-meta"))]
    async fn fetch_token_meta(&self, mint: &str) -> Result<TokenMeta, ProviderError> {
        let url = format!("{}/token/meta", self.solscan_base_url);
        let request = self.http_client.get(url).query(&[("tokenAddress", mint)]);

        let body = self.get_json(Provider::SolscanMeta, request).await?;
        let meta = parse_token_meta(&body);

        debug!("Fetched metadata: name={:?} symbol={:?}", meta.name, meta.symbol);
        Ok(meta)
    }

    #[instrument(skip(self), fields(provider = "solscan-holders"))]
    async fn fetch_holders(
        &self,
        mint: &str,
        limit: usize,
    ) -> Result<Vec<HolderEntry>, ProviderError> {
        let url = format!("{}/token/holders", self.solscan_base_url);
        let limit = limit.to_string();
        let request = self
            .http_client
            .get(url)
            .query(&[("tokenAddress", mint), ("limit", limit.as_str())]);

        let body = self.get_json(Provider::SolscanHolders, request).await?;
        let holders = parse_holders(&body);

        debug!("Fetched {} holders", holders.len());
        Ok(holders)
    }

    #[instrument(skip(self), fields(provider = "dexscreener"))]
    async fn fetch_pairs(&self, mint: &str) -> Result<Vec<MarketPair>, ProviderError> {
        let url = format!("{}/latest/dex/tokens/{}", self.dexscreener_base_url, mint);
        let request = self.http_client.get(url);

        let body = self.get_json(Provider::DexScreener, request).await?;
        let pairs = parse_pairs(&body);

        debug!("Fetched {} trading pairs", pairs.len());
        Ok(pairs)
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Read a number that may be encoded as a JSON number or a numeric string.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn non_empty_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Parse a Solscan token meta response. Anything that is not an object
/// yields an empty record.
pub fn parse_token_meta(body: &Value) -> TokenMeta {
    let Some(object) = body.as_object() else {
        return TokenMeta::default();
    };

    TokenMeta {
        name: non_empty_str(object, "name"),
        symbol: non_empty_str(object, "symbol"),
        supply: object.get("supply").and_then(lenient_f64),
        mint_authority: parse_mint_authority(object),
    }
}

/// Null, empty, zero and `false` all mean the authority was revoked.
fn parse_mint_authority(object: &Map<String, Value>) -> MintAuthority {
    match object.get("mintAuthority") {
        None => MintAuthority::Unknown,
        Some(Value::Null) | Some(Value::Bool(false)) => MintAuthority::Revoked,
        Some(Value::String(s)) if s.trim().is_empty() => MintAuthority::Revoked,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => MintAuthority::Revoked,
        Some(_) => MintAuthority::Active,
    }
}

/// Parse a Solscan holders response, either a bare array or `{"data": [...]}`.
pub fn parse_holders(body: &Value) -> Vec<HolderEntry> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(entries)) => entries,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|holder| HolderEntry {
            owner: non_empty_str(holder, "owner").or_else(|| non_empty_str(holder, "address")),
            amount: holder.get("amount").and_then(lenient_f64).unwrap_or(0.0).max(0.0),
        })
        .collect()
}

/// Parse a DexScreener `/latest/dex/tokens` response.
pub fn parse_pairs(body: &Value) -> Vec<MarketPair> {
    let Some(entries) = body.get("pairs").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|pair| {
            let base = pair.get("baseToken").and_then(Value::as_object);
            MarketPair {
                url: non_empty_str(pair, "url"),
                liquidity_usd: pair
                    .get("liquidity")
                    .and_then(|l| l.get("usd"))
                    .and_then(lenient_f64)
                    .unwrap_or(0.0)
                    .max(0.0),
                volume_24h_usd: pair
                    .get("volume")
                    .and_then(|v| v.get("h24"))
                    .and_then(lenient_f64)
                    .unwrap_or(0.0)
                    .max(0.0),
                base_name: base.and_then(|b| non_empty_str(b, "name")),
                base_symbol: base.and_then(|b| non_empty_str(b, "symbol")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64(&json!(12.5)), Some(12.5));
        assert_eq!(lenient_f64(&json!(" 1000000 ")), Some(1_000_000.0));
        assert_eq!(lenient_f64(&json!("n/a")), None);
        assert_eq!(lenient_f64(&json!("NaN")), None);
        assert_eq!(lenient_f64(&json!(null)), None);
        assert_eq!(lenient_f64(&json!(true)), None);
    }

    #[test]
    fn test_parse_token_meta() {
        let meta = parse_token_meta(&json!({
            "name": "Bonk",
            "symbol": "BONK",
            "supply": "100000000000",
            "mintAuthority": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
        }));

        assert_eq!(
            meta,
            TokenMeta {
                name: Some("Bonk".to_string()),
                symbol: Some("BONK".to_string()),
                supply: Some(100_000_000_000.0),
                mint_authority: MintAuthority::Active,
            }
        );
    }

    #[test]
    fn test_parse_token_meta_blank_fields() {
        let meta = parse_token_meta(&json!({"name": "", "symbol": "  ", "supply": "abc"}));

        assert_eq!(meta.name, None);
        assert_eq!(meta.symbol, None);
        assert_eq!(meta.supply, None);
        assert_eq!(meta.mint_authority, MintAuthority::Unknown);
    }

    #[test]
    fn test_parse_token_meta_not_an_object() {
        assert_eq!(parse_token_meta(&json!([1, 2, 3])), TokenMeta::default());
    }

    #[test]
    fn test_mint_authority_states() {
        let authority = |value: Value| parse_token_meta(&json!({ "mintAuthority": value })).mint_authority;

        assert_eq!(authority(json!(null)), MintAuthority::Revoked);
        assert_eq!(authority(json!("")), MintAuthority::Revoked);
        assert_eq!(authority(json!(0)), MintAuthority::Revoked);
        assert_eq!(authority(json!(0.0)), MintAuthority::Revoked);
        assert_eq!(authority(json!(false)), MintAuthority::Revoked);
        assert_eq!(authority(json!("SomeAuthority111")), MintAuthority::Active);
        assert_eq!(authority(json!(1)), MintAuthority::Active);
        assert_eq!(parse_token_meta(&json!({})).mint_authority, MintAuthority::Unknown);
    }

    #[test]
    fn test_parse_holders_shapes() {
        let bare = parse_holders(&json!([
            {"owner": "A", "amount": 500},
            {"owner": "B", "amount": "250.5"},
            {"owner": "C", "amount": "oops"},
            {"owner": "D", "amount": -900},
            {"owner": "E", "amount": "-12.5"},
            "not-an-object",
        ]));
        assert_eq!(bare.len(), 5);
        assert_eq!(bare[0].amount, 500.0);
        assert_eq!(bare[1].amount, 250.5);
        assert_eq!(bare[2].amount, 0.0);
        assert_eq!(bare[3].amount, 0.0);
        assert_eq!(bare[4].amount, 0.0);

        let wrapped = parse_holders(&json!({"data": [{"address": "X", "amount": 7}], "total": 1}));
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].owner.as_deref(), Some("X"));

        assert!(parse_holders(&json!({"error": "rate limited"})).is_empty());
        assert!(parse_holders(&json!(null)).is_empty());
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs(&json!({
            "schemaVersion": "1.0.0",
            "pairs": [
                {
                    "url": "https://dexscreener.com/solana/pair1",
                    "liquidity": {"usd": 12345.67},
                    "volume": {"h24": "2500"},
                    "baseToken": {"name": "Dog", "symbol": "DOG"}
                },
                {
                    "url": "https://dexscreener.com/solana/pair2",
                    "volume": {"h24": null}
                }
            ]
        }));

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].liquidity_usd, 12345.67);
        assert_eq!(pairs[0].volume_24h_usd, 2500.0);
        assert_eq!(pairs[0].base_symbol.as_deref(), Some("DOG"));
        assert_eq!(pairs[1].liquidity_usd, 0.0);
        assert_eq!(pairs[1].volume_24h_usd, 0.0);
        assert_eq!(pairs[1].base_name, None);
    }

    #[test]
    fn test_parse_pairs_null() {
        assert!(parse_pairs(&json!({"schemaVersion": "1.0.0", "pairs": null})).is_empty());
    }

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("http://localhost:8080//".to_string()), "http://localhost:8080");
    }
}
