//! Core types shared by the radar pipeline and the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A token mint address. Kept as an opaque string; no format validation is done.
pub type Mint = String;

/// Inbound webhook body carrying newly detected mints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MintTrigger {
    /// Mint addresses to analyze, in delivery order
    #[serde(default)]
    pub mints: Vec<Mint>,
}

impl MintTrigger {
    /// Parse a raw request body leniently.
    ///
    /// Bodies that are not JSON, lack a `mints` array, or carry non-string
    /// entries still parse: unusable entries are dropped and an empty trigger
    /// is returned when nothing is left.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };

        let mints = value
            .get("mints")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|mint| !mint.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Self { mints }
    }
}
