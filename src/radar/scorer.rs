//! Radar scorer - maps a token snapshot to risk, reward and flip score.
//!
//! Scoring is table driven: [`Rule::all`] fixes which aspects are looked at,
//! [`ScoreThresholds`] decides which outcome each rule lands on and
//! [`ScoreWeights`] holds the adjustment for every outcome. Both totals start
//! from a neutral baseline and are clamped to 0..=100 at the end.

use crate::radar::types::{
    Adjustment, MintAuthority, Rule, ScoreResult, ScoreThresholds, ScoreWeights, TokenSnapshot,
};
use tracing::{debug, instrument};

const BASELINE: i32 = 50;
const SCORE_MIN: i32 = 0;
const SCORE_MAX: i32 = 100;

/// Rationale attached to a rule outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Positive(String),
    Negative(String),
}

/// What a single rule contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub adjustment: Adjustment,
    pub signal: Signal,
}

impl RuleOutcome {
    fn positive(adjustment: Adjustment, message: impl Into<String>) -> Self {
        Self {
            adjustment,
            signal: Signal::Positive(message.into()),
        }
    }

    fn negative(adjustment: Adjustment, message: impl Into<String>) -> Self {
        Self {
            adjustment,
            signal: Signal::Negative(message.into()),
        }
    }
}

/// Deterministic heuristic scorer.
#[derive(Debug, Clone, Default)]
pub struct RadarScorer {
    thresholds: ScoreThresholds,
    weights: ScoreWeights,
}

impl RadarScorer {
    pub fn new(thresholds: ScoreThresholds, weights: ScoreWeights) -> Self {
        Self { thresholds, weights }
    }

    pub fn thresholds(&self) -> &ScoreThresholds {
        &self.thresholds
    }

    /// Score a snapshot.
    #[instrument(skip(self, snapshot), fields(mint = %snapshot.mint))]
    pub fn score(&self, snapshot: &TokenSnapshot) -> ScoreResult {
        let mut risk = BASELINE;
        let mut reward = BASELINE;
        let mut positive_signals = Vec::new();
        let mut negative_signals = Vec::new();

        for rule in Rule::all() {
            let outcome = self.evaluate(rule, snapshot);
            risk = risk.saturating_add(outcome.adjustment.risk);
            reward = reward.saturating_add(outcome.adjustment.reward);

            match outcome.signal {
                Signal::Positive(message) => positive_signals.push(message),
                Signal::Negative(message) => negative_signals.push(message),
            }
        }

        let risk = risk.clamp(SCORE_MIN, SCORE_MAX);
        let reward = reward.clamp(SCORE_MIN, SCORE_MAX);
        let flip_score = reward - risk;

        debug!("Scored {}: risk={} reward={} flip={}", snapshot.mint, risk, reward, flip_score);

        ScoreResult {
            // Clamped above, the casts cannot truncate.
            risk: risk as u8,
            reward: reward as u8,
            flip_score,
            positive_signals,
            negative_signals,
        }
    }

    /// Evaluate one rule against a snapshot.
    pub fn evaluate(&self, rule: Rule, snapshot: &TokenSnapshot) -> RuleOutcome {
        let t = &self.thresholds;
        let w = &self.weights;

        match rule {
            Rule::Liquidity => {
                if snapshot.liquidity_usd >= t.min_liquidity_usd {
                    RuleOutcome::positive(
                        w.liquidity_ok,
                        format!("Liquidity OK (${})", group_thousands(snapshot.liquidity_usd)),
                    )
                } else {
                    RuleOutcome::negative(w.liquidity_low, "Low liquidity")
                }
            }
            Rule::Volume => {
                if snapshot.volume_24h_usd >= t.min_volume_24h_usd {
                    RuleOutcome::positive(
                        w.volume_ok,
                        format!("24h Vol OK (${})", group_thousands(snapshot.volume_24h_usd)),
                    )
                } else {
                    RuleOutcome::negative(w.volume_low, "Low 24h volume")
                }
            }
            Rule::Metadata => {
                if snapshot.metadata_complete {
                    RuleOutcome::positive(w.metadata_ok, "Metadata exists")
                } else {
                    RuleOutcome::negative(w.metadata_missing, "No/weak metadata")
                }
            }
            Rule::HolderConcentration => match snapshot.top10_holder_pct {
                None => RuleOutcome::negative(w.holders_unknown, "No holder data"),
                Some(pct) if pct <= t.max_top10_pct => {
                    RuleOutcome::positive(w.holders_spread, format!("Top10 holders {:.1}%", pct))
                }
                Some(pct) => RuleOutcome::negative(
                    w.holders_concentrated,
                    format!("High holder concentration ({:.1}%)", pct),
                ),
            },
            Rule::MintAuthority => match snapshot.mint_authority {
                MintAuthority::Revoked => RuleOutcome::positive(w.mint_revoked, "Mint authority revoked"),
                MintAuthority::Active => RuleOutcome::negative(w.mint_active, "Mint authority present"),
                MintAuthority::Unknown => RuleOutcome::negative(w.mint_unknown, "Mint authority unknown"),
            },
        }
    }
}

/// Whole-dollar amount with thousands separators, e.g. `12,345`.
pub fn group_thousands(amount: f64) -> String {
    let whole = amount.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
