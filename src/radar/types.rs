//! Core types and data structures for the radar pipeline.

use crate::types::Mint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the on-chain mint authority as far as the metadata provider knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintAuthority {
    /// Authority permanently removed; supply can no longer grow
    Revoked,
    /// Authority still set; more tokens can be minted
    Active,
    /// Provider did not report the field
    #[default]
    Unknown,
}

impl MintAuthority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MintAuthority::Revoked => "revoked",
            MintAuthority::Active => "present",
            MintAuthority::Unknown => "unknown",
        }
    }
}

/// Token metadata as reported by the metadata provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenMeta {
    pub name: Option<String>,
    pub symbol: Option<String>,
    /// Total supply in raw token units
    pub supply: Option<f64>,
    pub mint_authority: MintAuthority,
}

/// One entry of the holder distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct HolderEntry {
    pub owner: Option<String>,
    /// Holding in raw token units
    pub amount: f64,
}

/// A trading pair reported by the market-data provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketPair {
    pub url: Option<String>,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    pub base_name: Option<String>,
    pub base_symbol: Option<String>,
}

/// Normalized view of one mint, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub mint: Mint,
    pub name: String,
    pub symbol: String,
    /// Whether the metadata provider itself reported both name and symbol
    pub metadata_complete: bool,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    /// Share of supply held by the ten largest holders, in percent
    pub top10_holder_pct: Option<f64>,
    pub mint_authority: MintAuthority,
    /// Link to the most liquid trading pair
    pub pair_url: Option<String>,
}

/// Outcome of scoring one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Risk (0-100)
    pub risk: u8,
    /// Reward (0-100)
    pub reward: u8,
    /// reward - risk (-100..=100)
    pub flip_score: i32,
    pub positive_signals: Vec<String>,
    pub negative_signals: Vec<String>,
}

impl ScoreResult {
    pub fn verdict(&self, min_flip_score: i32) -> Verdict {
        if self.flip_score >= min_flip_score {
            Verdict::Alert
        } else {
            Verdict::Pass
        }
    }
}

/// Alert-worthiness label attached to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Alert,
    Pass,
}

impl Verdict {
    /// Label used in outgoing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Alert => "GREEN ALERT",
            Verdict::Pass => "PASS",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scoring rules. Each rule contributes exactly one signal per snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Liquidity of the best trading pair
    Liquidity,
    /// 24h trading volume of the best pair
    Volume,
    /// Name and symbol reported by the metadata provider
    Metadata,
    /// Top-10 holder concentration
    HolderConcentration,
    /// Mint authority state
    MintAuthority,
}

impl Rule {
    /// Returns all rules in evaluation order.
    pub fn all() -> [Rule; 5] {
        [
            Rule::Liquidity,
            Rule::Volume,
            Rule::Metadata,
            Rule::HolderConcentration,
            Rule::MintAuthority,
        ]
    }
}

/// Additive change applied to the running risk and reward totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub risk: i32,
    pub reward: i32,
}

impl Adjustment {
    pub const NONE: Adjustment = Adjustment { risk: 0, reward: 0 };

    pub const fn risk(points: i32) -> Self {
        Self { risk: points, reward: 0 }
    }

    pub const fn reward(points: i32) -> Self {
        Self { risk: 0, reward: points }
    }
}

/// Pass/fail thresholds for the scoring rules. Passing is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub min_liquidity_usd: f64,
    pub min_volume_24h_usd: f64,
    pub max_top10_pct: f64,
}

/// Adjustment applied for every possible rule outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub liquidity_ok: Adjustment,
    pub liquidity_low: Adjustment,
    pub volume_ok: Adjustment,
    pub volume_low: Adjustment,
    pub metadata_ok: Adjustment,
    pub metadata_missing: Adjustment,
    pub holders_unknown: Adjustment,
    pub holders_spread: Adjustment,
    pub holders_concentrated: Adjustment,
    pub mint_revoked: Adjustment,
    pub mint_active: Adjustment,
    pub mint_unknown: Adjustment,
}

/// Radar configuration.
#[derive(Clone)]
pub struct RadarConfig {
    /// Scoring thresholds
    pub thresholds: ScoreThresholds,
    /// Scoring weights
    pub weights: ScoreWeights,
    /// Minimum flip score that triggers an alert
    pub min_flip_score: i32,
    /// Minimum time between two alerts for the same mint
    pub cooldown_minutes: u64,
    /// Upper bound on mints remembered by the alert gate
    pub max_tracked_mints: u64,
    /// Holders requested from the holder provider
    pub holder_limit: usize,
    /// Per-call timeout for every outbound request
    pub request_timeout_seconds: u64,
    /// Client-side request pacing per provider
    pub provider_requests_per_second: u32,
    pub solscan_base_url: String,
    pub dexscreener_base_url: String,
    pub telegram_api_base: String,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// Expected `Authorization` header value on the webhook
    pub webhook_secret: String,
}

impl fmt::Debug for RadarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadarConfig")
            .field("thresholds", &self.thresholds)
            .field("min_flip_score", &self.min_flip_score)
            .field("cooldown_minutes", &self.cooldown_minutes)
            .field("max_tracked_mints", &self.max_tracked_mints)
            .field("holder_limit", &self.holder_limit)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("provider_requests_per_second", &self.provider_requests_per_second)
            .field("solscan_base_url", &self.solscan_base_url)
            .field("dexscreener_base_url", &self.dexscreener_base_url)
            .field("telegram_configured", &self.telegram_token.is_some())
            .field("webhook_secret_set", &!self.webhook_secret.trim().is_empty())
            .finish()
    }
}

// Default implementations
impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            min_liquidity_usd: 10_000.0,
            min_volume_24h_usd: 2_000.0,
            max_top10_pct: 50.0,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            liquidity_ok: Adjustment::reward(15),
            liquidity_low: Adjustment::risk(25),
            volume_ok: Adjustment::reward(10),
            volume_low: Adjustment::risk(10),
            metadata_ok: Adjustment::reward(5),
            metadata_missing: Adjustment::risk(10),
            holders_unknown: Adjustment::risk(10),
            holders_spread: Adjustment::reward(10),
            holders_concentrated: Adjustment::risk(20),
            mint_revoked: Adjustment::reward(10),
            mint_active: Adjustment::risk(15),
            mint_unknown: Adjustment::NONE,
        }
    }
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            thresholds: ScoreThresholds::default(),
            weights: ScoreWeights::default(),
            min_flip_score: 25,
            cooldown_minutes: 120,
            max_tracked_mints: 100_000,
            holder_limit: 20,
            request_timeout_seconds: 10,
            provider_requests_per_second: 5,
            solscan_base_url: "https://public-api.solscan.io".to_string(),
            dexscreener_base_url: "https://api.dexscreener.com".to_string(),
            telegram_api_base: "https://api.telegram.org".to_string(),
            telegram_token: None,
            telegram_chat_id: None,
            webhook_secret: String::new(),
        }
    }
}
