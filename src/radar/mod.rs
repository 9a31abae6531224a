//! Radar module - token scoring and alerting pipeline.
//!
//! Data flows leaves-first: data sources feed the snapshot builder, the scorer
//! turns a snapshot into a score, the alert gate decides whether the score is
//! worth an alert and the notifier delivers it.

pub mod types;
pub mod data_sources;
pub mod snapshot;
pub mod scorer;
pub mod alert_gate;
pub mod notifier;
pub mod metrics;
pub mod rate_limit;
pub mod pipeline;

// Re-export main public types and the pipeline
pub use pipeline::{ManualScan, MintOutcome, MintRadar, MintReport};
pub use types::{
    Adjustment, HolderEntry, MarketPair, MintAuthority, RadarConfig, Rule, ScoreResult,
    ScoreThresholds, ScoreWeights, TokenMeta, TokenSnapshot, Verdict,
};

// Re-export components for callers that wire their own pipeline
pub use alert_gate::{AlertGate, GateDecision};
pub use data_sources::{HttpDataSources, Provider, ProviderError, TokenDataSources};
pub use notifier::{format_alert_message, AlertChannel, DeliveryReport, TelegramNotifier};
pub use rate_limit::ProviderRateLimiter;
pub use metrics::{MetricsSnapshot, RadarMetrics};
pub use scorer::RadarScorer;
pub use snapshot::SnapshotBuilder;

use std::sync::Arc;

/// Radar builder for convenient construction with sensible defaults.
pub struct RadarBuilder {
    config: RadarConfig,
    sources: Option<Arc<dyn TokenDataSources>>,
    channel: Option<Arc<dyn AlertChannel>>,
}

impl RadarBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: RadarConfig::default(),
            sources: None,
            channel: None,
        }
    }

    /// Set score thresholds.
    pub fn with_thresholds(mut self, thresholds: ScoreThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Set score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.config.weights = weights;
        self
    }

    /// Set the minimum flip score that triggers an alert.
    pub fn with_min_flip_score(mut self, min_flip_score: i32) -> Self {
        self.config.min_flip_score = min_flip_score;
        self
    }

    /// Set the per-mint alert cooldown.
    pub fn with_cooldown_minutes(mut self, minutes: u64) -> Self {
        self.config.cooldown_minutes = minutes;
        self
    }

    /// Bound the number of mints the alert gate remembers.
    pub fn with_max_tracked_mints(mut self, max_mints: u64) -> Self {
        self.config.max_tracked_mints = max_mints;
        self
    }

    /// Set the per-call timeout for outbound requests.
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.config.request_timeout_seconds = seconds;
        self
    }

    /// Set provider request pacing.
    pub fn with_provider_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.config.provider_requests_per_second = requests_per_second;
        self
    }

    /// Point the provider clients at different base URLs.
    pub fn with_provider_urls(
        mut self,
        solscan_base_url: impl Into<String>,
        dexscreener_base_url: impl Into<String>,
    ) -> Self {
        self.config.solscan_base_url = solscan_base_url.into();
        self.config.dexscreener_base_url = dexscreener_base_url.into();
        self
    }

    /// Set Telegram credentials.
    pub fn with_telegram(mut self, bot_token: Option<String>, chat_id: Option<String>) -> Self {
        self.config.telegram_token = bot_token;
        self.config.telegram_chat_id = chat_id;
        self
    }

    /// Set the shared secret expected on the webhook.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.webhook_secret = secret.into();
        self
    }

    /// Use custom data sources instead of the HTTP providers.
    pub fn with_data_sources(mut self, sources: Arc<dyn TokenDataSources>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Use a custom alert channel instead of Telegram.
    pub fn with_channel(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Build the radar configuration.
    pub fn build_config(self) -> RadarConfig {
        self.config
    }

    /// Build the radar. Components not supplied are created from the config.
    pub fn build(self) -> anyhow::Result<MintRadar> {
        let (sources, channel) = match (self.sources, self.channel) {
            (Some(sources), Some(channel)) => (sources, channel),
            (sources, channel) => {
                let (http_sources, http_channel) = MintRadar::http_components(&self.config)?;
                (sources.unwrap_or(http_sources), channel.unwrap_or(http_channel))
            }
        };
        Ok(MintRadar::with_components(self.config, sources, channel))
    }
}

impl Default for RadarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radar_builder() {
        let config = RadarBuilder::new()
            .with_min_flip_score(40)
            .with_cooldown_minutes(30)
            .with_provider_rate_limit(2)
            .with_webhook_secret("s3cret")
            .build_config();

        assert_eq!(config.min_flip_score, 40);
        assert_eq!(config.cooldown_minutes, 30);
        assert_eq!(config.provider_requests_per_second, 2);
        assert_eq!(config.webhook_secret, "s3cret");
    }

    #[test]
    fn test_radar_builder_defaults() {
        let config = RadarBuilder::new().build_config();

        assert_eq!(config.min_flip_score, 25);
        assert_eq!(config.cooldown_minutes, 120);
        assert_eq!(config.holder_limit, 20);
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.thresholds.min_liquidity_usd, 10_000.0);
        assert_eq!(config.thresholds.min_volume_24h_usd, 2_000.0);
        assert_eq!(config.thresholds.max_top10_pct, 50.0);
    }

    #[tokio::test]
    async fn test_radar_builder_builds_http_radar() {
        let radar = RadarBuilder::new()
            .with_min_flip_score(30)
            .build()
            .expect("radar should build");

        assert_eq!(radar.config().min_flip_score, 30);
        assert_eq!(radar.alert_gate().min_flip_score(), 30);
    }
}
