//! mint-radar - Solana new-mint scoring and alert bot
//!
//! Receives newly detected mint addresses over a webhook, builds a snapshot of
//! each token from public market data providers, scores it and sends a
//! Telegram alert for promising tokens, at most once per mint per cooldown.

pub mod types;
pub mod radar;
pub mod server;

// Re-export main types for convenience
pub use radar::{MintRadar, RadarBuilder, RadarConfig};
pub use types::{Mint, MintTrigger};
