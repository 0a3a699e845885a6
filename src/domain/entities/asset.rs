//! Remote asset records and resolved asset descriptors.

use serde::{Deserialize, Serialize};

/// A mirrored asset record synchronized alongside a board item.
///
/// Read-only snapshot per sync cycle; matched to raw file references by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAssetRecord {
    /// Upstream asset id. Arrives as a string or a number.
    #[serde(with = "crate::domain::serde_utils::string_or_number")]
    pub id: String,
    /// Remote (authenticated) URL of the asset.
    #[serde(default)]
    pub url: Option<String>,
    /// Public URL, present when the asset can be served without credentials.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Relative path of the locally mirrored original, when synchronized.
    #[serde(default)]
    pub local_url: Option<String>,
    /// Relative path of the locally optimized rendition, when generated.
    #[serde(default)]
    pub optimized_url: Option<String>,
    /// Display rotation in degrees recorded by the optimization pipeline.
    #[serde(default)]
    pub rotation: Option<i32>,
    /// Size statistics recorded by the optimization pipeline.
    #[serde(default)]
    pub stats: Option<AssetStats>,
}

/// Size statistics for a mirrored asset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AssetStats {
    /// Byte size of the mirrored original.
    #[serde(default)]
    pub original_size: Option<u64>,
    /// Byte size of the optimized rendition.
    #[serde(default)]
    pub optimized_size: Option<u64>,
}

/// Compares two upstream ids, tolerating the string/number inconsistency.
///
/// Ids match when their raw string forms are equal, or when both parse as
/// integers and the integers are equal (`"007"` matches `7`).
#[must_use]
pub fn ids_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// A normalized asset descriptor, created fresh per resolution pass.
///
/// `is_local` is true iff `proxy_url` points at a same-origin mirrored path
/// rather than the proxy gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// File name from the raw reference.
    pub name: String,
    /// URL to fetch or render, when one could be derived.
    pub proxy_url: Option<String>,
    /// Upstream URL the asset originates from.
    pub original_url: Option<String>,
    /// True when the asset is publicly served and must bypass the gateway.
    pub use_public: bool,
    /// True when `proxy_url` is a same-origin mirrored path.
    pub is_local: bool,
    /// Best-known byte size (record stats, else the raw file's own size).
    pub size: u64,
    /// Display rotation in degrees.
    pub rotation: i32,
    /// Owning item id.
    pub item_id: String,
    /// Column the file was attached under.
    pub column_id: String,
}

impl ResolvedAsset {
    /// Returns true when there is nothing renderable for this asset.
    #[must_use]
    pub fn is_resolution_gap(&self) -> bool {
        self.proxy_url.is_none() && self.original_url.is_none()
    }
}
