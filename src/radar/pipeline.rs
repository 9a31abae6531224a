//! Radar pipeline - snapshot, score, gate and notify.
//!
//! [`MintRadar`] owns every component of the pipeline and exposes the two
//! flows the HTTP surface needs: the gated webhook flow and the ungated manual
//! scan.

use crate::radar::alert_gate::AlertGate;
use crate::radar::data_sources::{HttpDataSources, TokenDataSources};
use crate::radar::metrics::{MetricsSnapshot, RadarMetrics};
use crate::radar::notifier::{format_alert_message, AlertChannel, DeliveryReport, TelegramNotifier};
use crate::radar::rate_limit::ProviderRateLimiter;
use crate::radar::scorer::RadarScorer;
use crate::radar::snapshot::SnapshotBuilder;
use crate::radar::types::{RadarConfig, ScoreResult, TokenSnapshot, Verdict};
use crate::types::Mint;
use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

const TEST_MESSAGE: &str = "✅ Test alert: Your Solana Radar bot is working!";

/// Per-mint outcome of the gated flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MintOutcome {
    /// Gate fired and the channel accepted the alert
    Delivered,
    /// Gate held the alert back
    Suppressed { reason: String },
    /// Gate fired but delivery failed
    Error { detail: String },
}

/// Report for one mint of a webhook trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintReport {
    pub mint: Mint,
    pub flip_score: i32,
    pub verdict: Verdict,
    #[serde(flatten)]
    pub outcome: MintOutcome,
}

/// Result of a manual, ungated scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualScan {
    pub snapshot: TokenSnapshot,
    pub score: ScoreResult,
    pub delivery: DeliveryReport,
}

/// The mint radar.
pub struct MintRadar {
    config: RadarConfig,
    snapshot_builder: SnapshotBuilder,
    scorer: RadarScorer,
    alert_gate: AlertGate,
    channel: Arc<dyn AlertChannel>,
    metrics: Arc<RadarMetrics>,
}

impl MintRadar {
    /// Create a radar talking to the real providers and Telegram.
    pub fn new(config: RadarConfig) -> Result<Self> {
        let (sources, channel) = Self::http_components(&config)?;
        Ok(Self::with_components(config, sources, channel))
    }

    /// HTTP data sources and Telegram channel described by `config`.
    pub fn http_components(
        config: &RadarConfig,
    ) -> Result<(Arc<dyn TokenDataSources>, Arc<dyn AlertChannel>)> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let http_client = Client::builder().timeout(timeout).build()?;

        let rate_limiter = Arc::new(ProviderRateLimiter::new(config.provider_requests_per_second));
        let sources: Arc<dyn TokenDataSources> = Arc::new(HttpDataSources::new(
            http_client.clone(),
            config.solscan_base_url.clone(),
            config.dexscreener_base_url.clone(),
            timeout,
            rate_limiter,
        ));
        let notifier = TelegramNotifier::new(
            http_client,
            config.telegram_api_base.clone(),
            config.telegram_token.clone(),
            config.telegram_chat_id.clone(),
            timeout,
        );
        if !notifier.is_configured() {
            warn!("Telegram credentials missing; alerts will be reported as failed deliveries");
        }
        let channel: Arc<dyn AlertChannel> = Arc::new(notifier);

        Ok((sources, channel))
    }

    /// Create a radar from explicit data sources and channel.
    pub fn with_components(
        config: RadarConfig,
        sources: Arc<dyn TokenDataSources>,
        channel: Arc<dyn AlertChannel>,
    ) -> Self {
        let metrics = Arc::new(RadarMetrics::new());
        let snapshot_builder = SnapshotBuilder::new(sources, config.holder_limit, Arc::clone(&metrics));
        let scorer = RadarScorer::new(config.thresholds.clone(), config.weights.clone());
        let alert_gate = AlertGate::new(
            config.cooldown_minutes,
            config.min_flip_score,
            config.max_tracked_mints,
        );

        info!(
            "Created mint radar: min flip score {}, cooldown {} min",
            config.min_flip_score, config.cooldown_minutes
        );

        Self {
            config,
            snapshot_builder,
            scorer,
            alert_gate,
            channel,
            metrics,
        }
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn alert_gate(&self) -> &AlertGate {
        &self.alert_gate
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Build and score a snapshot without gating or notifying.
    #[instrument(skip(self))]
    pub async fn analyze(&self, mint: &str) -> (TokenSnapshot, ScoreResult) {
        self.metrics.record_scan();
        let snapshot = self.snapshot_builder.build(mint).await;
        let score = self.scorer.score(&snapshot);
        (snapshot, score)
    }

    /// Gated flow used by the webhook: alert only when the gate fires.
    ///
    /// The gate records the alert before delivery, so a failed delivery still
    /// starts the cooldown.
    #[instrument(skip(self))]
    pub async fn process_mint(&self, mint: &str) -> MintReport {
        let (snapshot, score) = self.analyze(mint).await;
        let verdict = score.verdict(self.config.min_flip_score);
        let decision = self.alert_gate.evaluate(mint, score.flip_score).await;

        let outcome = match decision.suppression_reason() {
            Some(reason) => {
                self.metrics.record_suppressed();
                info!("Alert for {} suppressed: {}", mint, reason);
                MintOutcome::Suppressed { reason }
            }
            None => {
                let delivery = self.notify(&snapshot, &score).await;
                if delivery.ok {
                    info!("Alert delivered for {} (flip score {})", mint, score.flip_score);
                    MintOutcome::Delivered
                } else {
                    MintOutcome::Error {
                        detail: delivery.response,
                    }
                }
            }
        };

        MintReport {
            mint: mint.to_string(),
            flip_score: score.flip_score,
            verdict,
            outcome,
        }
    }

    /// Ungated flow: always score and always attempt delivery.
    #[instrument(skip(self))]
    pub async fn scan_and_notify(&self, mint: &str) -> ManualScan {
        let (snapshot, score) = self.analyze(mint).await;
        let delivery = self.notify(&snapshot, &score).await;
        ManualScan {
            snapshot,
            score,
            delivery,
        }
    }

    /// Send the fixed connectivity message.
    pub async fn send_test_message(&self) -> DeliveryReport {
        self.deliver(TEST_MESSAGE).await
    }

    async fn notify(&self, snapshot: &TokenSnapshot, score: &ScoreResult) -> DeliveryReport {
        let message = format_alert_message(snapshot, score, self.config.min_flip_score);
        self.deliver(&message).await
    }

    async fn deliver(&self, text: &str) -> DeliveryReport {
        let report = self.channel.deliver(text).await;
        if report.ok {
            self.metrics.record_delivered();
        } else {
            self.metrics.record_delivery_failure();
            warn!("Delivery failed: {}", report.response);
        }
        report
    }
}
