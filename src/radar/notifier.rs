//! Alert formatting and delivery.
//!
//! Delivery never fails loudly: transport errors and non-success responses
//! come back as a [`DeliveryReport`] with `ok == false` and diagnostic text.

use crate::radar::scorer::group_thousands;
use crate::radar::types::{ScoreResult, TokenSnapshot};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub ok: bool,
    /// Raw channel response, or the error text when the call failed
    pub response: String,
}

impl DeliveryReport {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            response: reason.into(),
        }
    }
}

/// Destination for formatted alert messages.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn deliver(&self, text: &str) -> DeliveryReport;
}

/// Telegram Bot API channel.
pub struct TelegramNotifier {
    http_client: Client,
    api_base: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(
        http_client: Client,
        api_base: impl Into<String>,
        bot_token: Option<String>,
        chat_id: Option<String>,
        timeout: Duration,
    ) -> Self {
        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }

        Self {
            http_client,
            api_base,
            bot_token: bot_token.filter(|t| !t.trim().is_empty()),
            chat_id: chat_id.filter(|c| !c.trim().is_empty()),
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[async_trait]
impl AlertChannel for TelegramNotifier {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn deliver(&self, text: &str) -> DeliveryReport {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            warn!("Telegram delivery skipped: bot token or chat id not configured");
            return DeliveryReport::failed("telegram bot token or chat id not configured");
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let params = [
            ("chat_id", chat_id.as_str()),
            ("text", text),
            ("parse_mode", "Markdown"),
        ];

        let response = match self
            .http_client
            .post(&url)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors carry the URL, which contains the bot token.
                let reason = e.without_url().to_string();
                warn!("Telegram delivery failed: {}", reason);
                return DeliveryReport::failed(reason);
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            debug!("Telegram accepted message ({})", status);
            DeliveryReport { ok: true, response: body }
        } else {
            warn!("Telegram API returned non-success status: {}", status);
            let response = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body
            };
            DeliveryReport::failed(response)
        }
    }
}

/// Render the alert message for a scored snapshot (Telegram Markdown).
pub fn format_alert_message(
    snapshot: &TokenSnapshot,
    score: &ScoreResult,
    min_flip_score: i32,
) -> String {
    let positives = bullet_list("✅", &score.positive_signals);
    let negatives = bullet_list("⚠️", &score.negative_signals);
    let top10 = snapshot
        .top10_holder_pct
        .map(|pct| format!("{:.1}%", pct))
        .unwrap_or_else(|| "unknown".to_string());
    let pair = snapshot.pair_url.as_deref().unwrap_or("N/A");

    format!(
        "🚨 *New Token Scan*\n\
         *Name:* {name} ({symbol})\n\
         *Mint:* `{mint}`\n\n\
         {positives}\n{negatives}\n\n\
         *Liquidity:* ${liquidity} | *24h Vol:* ${volume}\n\
         *Top10 Holders:* {top10}\n\
         *Mint authority:* {authority}\n\
         [View on DexScreener]({pair})\n\n\
         *Risk:* {risk}/100 | *Reward:* {reward}/100 | *FlipScore:* *{flip}* → {verdict}",
        name = escape_markdown(&snapshot.name),
        symbol = escape_markdown(&snapshot.symbol),
        mint = snapshot.mint,
        liquidity = group_thousands(snapshot.liquidity_usd),
        volume = group_thousands(snapshot.volume_24h_usd),
        authority = snapshot.mint_authority.as_str(),
        risk = score.risk,
        reward = score.reward,
        flip = score.flip_score,
        verdict = score.verdict(min_flip_score),
    )
}

/// Escape the entity characters of Telegram's legacy Markdown so provider
/// supplied text cannot break message parsing.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn bullet_list(marker: &str, items: &[String]) -> String {
    if items.is_empty() {
        return "—".to_string();
    }
    items
        .iter()
        .map(|item| format!("{} {}", marker, item))
        .collect::<Vec<_>>()
        .join("\n")
}
