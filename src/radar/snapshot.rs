//! Snapshot builder - merges provider data into one normalized record.
//!
//! All three providers are queried concurrently. A failed provider is logged
//! and replaced by its empty value, so building a snapshot never fails.

use crate::radar::data_sources::{ProviderError, TokenDataSources};
use crate::radar::metrics::RadarMetrics;
use crate::radar::types::{HolderEntry, MarketPair, TokenMeta, TokenSnapshot};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_SYMBOL: &str = "?";
const TOP_HOLDERS: usize = 10;

pub struct SnapshotBuilder {
    sources: Arc<dyn TokenDataSources>,
    holder_limit: usize,
    metrics: Arc<RadarMetrics>,
}

impl SnapshotBuilder {
    pub fn new(
        sources: Arc<dyn TokenDataSources>,
        holder_limit: usize,
        metrics: Arc<RadarMetrics>,
    ) -> Self {
        Self {
            sources,
            holder_limit,
            metrics,
        }
    }

    /// Fetch provider data for `mint` and normalize it.
    #[instrument(skip(self))]
    pub async fn build(&self, mint: &str) -> TokenSnapshot {
        let (meta, holders, pairs) = tokio::join!(
            self.sources.fetch_token_meta(mint),
            self.sources.fetch_holders(mint, self.holder_limit),
            self.sources.fetch_pairs(mint),
        );

        let meta = self.or_empty(meta);
        let holders = self.or_empty(holders);
        let pairs = self.or_empty(pairs);

        let snapshot = assemble_snapshot(mint, &meta, &holders, &pairs);
        debug!(
            "Built snapshot for {}: liquidity=${:.0} volume=${:.0} top10={:?} authority={}",
            mint,
            snapshot.liquidity_usd,
            snapshot.volume_24h_usd,
            snapshot.top10_holder_pct,
            snapshot.mint_authority.as_str()
        );
        snapshot
    }

    /// Fail-open: a provider error degrades to the empty value.
    fn or_empty<T: Default>(&self, result: Result<T, ProviderError>) -> T {
        result.unwrap_or_else(|e| {
            self.metrics.record_provider_error();
            warn!("Provider {} unavailable, continuing without it: {}", e.provider(), e);
            T::default()
        })
    }
}

/// Combine provider records into a snapshot.
pub fn assemble_snapshot(
    mint: &str,
    meta: &TokenMeta,
    holders: &[HolderEntry],
    pairs: &[MarketPair],
) -> TokenSnapshot {
    let best = best_pair(pairs);
    let first = pairs.first();

    let name = meta
        .name
        .clone()
        .or_else(|| first.and_then(|p| p.base_name.clone()))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let symbol = meta
        .symbol
        .clone()
        .or_else(|| first.and_then(|p| p.base_symbol.clone()))
        .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string());

    TokenSnapshot {
        mint: mint.to_string(),
        name,
        symbol,
        metadata_complete: meta.name.is_some() && meta.symbol.is_some(),
        liquidity_usd: best.map_or(0.0, |p| p.liquidity_usd),
        volume_24h_usd: best.map_or(0.0, |p| p.volume_24h_usd),
        top10_holder_pct: top10_concentration(holders, meta.supply),
        mint_authority: meta.mint_authority,
        pair_url: best.and_then(|p| p.url.clone()),
    }
}

/// Most liquid pair; the earliest one wins a tie.
pub fn best_pair(pairs: &[MarketPair]) -> Option<&MarketPair> {
    pairs.iter().fold(None, |best: Option<&MarketPair>, pair| match best {
        Some(current) if current.liquidity_usd >= pair.liquidity_usd => Some(current),
        _ => Some(pair),
    })
}

/// Percentage of supply held by the ten largest holders. `None` unless the
/// holder list is non-empty and supply is a positive number.
pub fn top10_concentration(holders: &[HolderEntry], supply: Option<f64>) -> Option<f64> {
    let supply = supply.filter(|s| *s > 0.0)?;
    if holders.is_empty() {
        return None;
    }

    let held: f64 = holders.iter().take(TOP_HOLDERS).map(|h| h.amount).sum();
    Some(held / supply * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::types::MintAuthority;

    fn holder(amount: f64) -> HolderEntry {
        HolderEntry { owner: None, amount }
    }

    fn pair(liquidity: f64, url: &str) -> MarketPair {
        MarketPair {
            url: Some(url.to_string()),
            liquidity_usd: liquidity,
            volume_24h_usd: liquidity / 10.0,
            ..MarketPair::default()
        }
    }

    #[test]
    fn test_top10_only_counts_ten_holders() {
        let holders: Vec<HolderEntry> = (0..20).map(|_| holder(10.0)).collect();
        assert_eq!(top10_concentration(&holders, Some(1000.0)), Some(10.0));
    }

    #[test]
    fn test_top10_absent_without_positive_supply() {
        let holders = vec![holder(100.0)];
        assert_eq!(top10_concentration(&holders, Some(0.0)), None);
        assert_eq!(top10_concentration(&holders, Some(-5.0)), None);
        assert_eq!(top10_concentration(&holders, None), None);
        assert_eq!(top10_concentration(&[], Some(1000.0)), None);
    }

    #[test]
    fn test_best_pair_by_liquidity() {
        let pairs = vec![pair(100.0, "a"), pair(900.0, "b"), pair(900.0, "c"), pair(50.0, "d")];
        let best = best_pair(&pairs).unwrap();
        assert_eq!(best.url.as_deref(), Some("b"));
        assert!(best_pair(&[]).is_none());
    }

    #[test]
    fn test_name_resolution_order() {
        let pairs = vec![
            MarketPair {
                base_name: Some("FirstPair".to_string()),
                base_symbol: Some("FP".to_string()),
                ..MarketPair::default()
            },
            MarketPair {
                liquidity_usd: 5000.0,
                base_name: Some("BestPair".to_string()),
                base_symbol: Some("BP".to_string()),
                ..MarketPair::default()
            },
        ];
        let meta = TokenMeta {
            name: Some("MetaName".to_string()),
            ..TokenMeta::default()
        };

        let snapshot = assemble_snapshot("Mint1", &meta, &[], &pairs);
        assert_eq!(snapshot.name, "MetaName");
        assert_eq!(snapshot.symbol, "FP");
        assert!(!snapshot.metadata_complete);
        assert_eq!(snapshot.liquidity_usd, 5000.0);
    }

    #[test]
    fn test_empty_inputs_fall_back() {
        let snapshot = assemble_snapshot("Mint1", &TokenMeta::default(), &[], &[]);

        assert_eq!(snapshot.name, "Unknown");
        assert_eq!(snapshot.symbol, "?");
        assert_eq!(snapshot.liquidity_usd, 0.0);
        assert_eq!(snapshot.volume_24h_usd, 0.0);
        assert_eq!(snapshot.top10_holder_pct, None);
        assert_eq!(snapshot.mint_authority, MintAuthority::Unknown);
        assert_eq!(snapshot.pair_url, None);
    }
}
