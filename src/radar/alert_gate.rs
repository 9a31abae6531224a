//! Alert gate - per-mint cooldown and flip-score threshold.
//!
//! The last alert time of every mint lives in a bounded moka cache. Entries
//! expire once the cooldown has passed, since an expired entry and a missing
//! entry lead to the same decision. When the capacity is exhausted the least
//! recently used mint is forgotten, which can let that mint alert early.
//!
//! The check-and-record step is a single atomic compute on the mint's cache
//! entry, so concurrent triggers for the same mint admit at most one alert per
//! cooldown window.

use chrono::{DateTime, TimeDelta, Utc};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use std::time::Duration;
use tracing::{debug, instrument};

/// Longest supported cooldown (ten years).
const MAX_COOLDOWN_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Result of asking the gate whether to alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Alert now; the mint's last-alert time was updated
    Fire,
    /// The mint alerted less than a cooldown ago
    CoolingDown { remaining: TimeDelta },
    /// Flip score below the alert minimum
    BelowThreshold { flip_score: i32, min_flip_score: i32 },
}

impl GateDecision {
    pub fn fired(&self) -> bool {
        matches!(self, GateDecision::Fire)
    }

    /// Human-readable suppression reason. `None` when the gate fired.
    pub fn suppression_reason(&self) -> Option<String> {
        match self {
            GateDecision::Fire => None,
            GateDecision::CoolingDown { remaining } => Some(format!(
                "cooldown active, {} min remaining",
                (remaining.num_seconds() + 59) / 60
            )),
            GateDecision::BelowThreshold {
                flip_score,
                min_flip_score,
            } => Some(format!("flip score {} below {}", flip_score, min_flip_score)),
        }
    }
}

/// Stateful alert gate.
pub struct AlertGate {
    last_alert: Cache<String, DateTime<Utc>>,
    cooldown: TimeDelta,
    min_flip_score: i32,
}

impl AlertGate {
    /// Create a gate remembering at most `max_tracked_mints` mints.
    pub fn new(cooldown_minutes: u64, min_flip_score: i32, max_tracked_mints: u64) -> Self {
        let cooldown_secs = cooldown_minutes.saturating_mul(60).min(MAX_COOLDOWN_SECS);
        let last_alert = Cache::builder()
            .max_capacity(max_tracked_mints)
            .time_to_live(Duration::from_secs(cooldown_secs.max(1)))
            .build();

        Self {
            last_alert,
            cooldown: TimeDelta::seconds(cooldown_secs as i64),
            min_flip_score,
        }
    }

    pub fn cooldown(&self) -> TimeDelta {
        self.cooldown
    }

    pub fn min_flip_score(&self) -> i32 {
        self.min_flip_score
    }

    /// Decide whether `mint` should alert now.
    pub async fn evaluate(&self, mint: &str, flip_score: i32) -> GateDecision {
        self.evaluate_at(mint, flip_score, Utc::now()).await
    }

    /// Decide whether `mint` should alert at `now`, recording `now` when it does.
    #[instrument(skip(self))]
    pub async fn evaluate_at(&self, mint: &str, flip_score: i32, now: DateTime<Utc>) -> GateDecision {
        let cooldown = self.cooldown;
        let min_flip_score = self.min_flip_score;

        let result = self
            .last_alert
            .entry(mint.to_string())
            .and_compute_with(|existing| {
                let cooling = existing
                    .map(|entry| now.signed_duration_since(*entry.value()) < cooldown)
                    .unwrap_or(false);
                let op = if cooling || flip_score < min_flip_score {
                    Op::Nop
                } else {
                    Op::Put(now)
                };
                std::future::ready(op)
            })
            .await;

        let decision = match result {
            CompResult::Inserted(_) | CompResult::ReplacedWith(_) => GateDecision::Fire,
            CompResult::Unchanged(entry) => {
                let elapsed = now.signed_duration_since(*entry.value());
                if elapsed < cooldown {
                    GateDecision::CoolingDown {
                        remaining: cooldown - elapsed,
                    }
                } else {
                    GateDecision::BelowThreshold {
                        flip_score,
                        min_flip_score,
                    }
                }
            }
            CompResult::StillNone(_) | CompResult::Removed(_) => GateDecision::BelowThreshold {
                flip_score,
                min_flip_score,
            },
        };

        debug!("Gate decision for {}: {:?}", mint, decision);
        decision
    }

    /// When `mint` last alerted, if still remembered.
    pub async fn last_alert(&self, mint: &str) -> Option<DateTime<Utc>> {
        self.last_alert.get(mint).await
    }
}
