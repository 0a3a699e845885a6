//! Multi-source precedence resolution for item attachments.
//!
//! For every attached file the resolver picks the best available
//! representation: the locally mirrored/optimized copy when one exists,
//! the public URL when the upstream serves the asset without credentials,
//! or a gateway proxy URL as the authenticated fallback.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::domain::entities::{
    BoardItem, RawFileReference, RemoteAssetRecord, ResolvedAsset, ids_match, parse_file_list,
};

/// File-name extensions treated as renderable images.
static IMAGE_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").expect("static regex"));

/// Storage path segment that must never be fetched raw; such paths are
/// routed through the file-serving endpoint instead.
const STORAGE_MARKER: &str = "assets/monday_files/";

/// Same-origin endpoint that serves mirrored files.
const FILES_ENDPOINT: &str = "/api/v1/tools/files/";

/// Configuration for [`AssetResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// API base URL, e.g. `https://backend.example.com/api/v1`.
    pub api_base_url: String,
    /// Integration provider segment of the gateway path.
    pub provider: String,
    /// Width parameter appended to optimized gateway fetches.
    pub thumb_width: u32,
}

impl ResolverConfig {
    /// Creates a config, trimming any trailing slash off the base URL.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            provider: provider.into(),
            thumb_width: 400,
        }
    }

    /// Overrides the optimized-fetch width.
    #[must_use]
    pub const fn with_thumb_width(mut self, width: u32) -> Self {
        self.thumb_width = width;
        self
    }

    /// Scheme + authority of the API base URL.
    #[must_use]
    pub fn origin(&self) -> String {
        Url::parse(&self.api_base_url).map_or_else(
            |_| self.api_base_url.clone(),
            |u| u.origin().ascii_serialization(),
        )
    }
}

/// Resolves raw attached-file references into [`ResolvedAsset`] descriptors.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    config: ResolverConfig,
}

impl AssetResolver {
    /// Creates a resolver.
    #[must_use]
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolves every candidate file attached to `item`.
    ///
    /// When `target_column` is given, only files attached under that column
    /// contribute (inline table cells versus whole-item galleries).
    /// Malformed column payloads count as zero files by policy. Duplicate
    /// asset ids across columns each produce an independent descriptor.
    #[must_use]
    pub fn resolve(
        &self,
        item: &BoardItem,
        optimize: bool,
        target_column: Option<&str>,
    ) -> Vec<ResolvedAsset> {
        let mut resolved = Vec::new();

        for column in &item.column_values {
            if let Some(target) = target_column {
                if column.id != target {
                    continue;
                }
            }
            let Some(raw) = column.value.as_deref() else {
                continue;
            };

            let list = match parse_file_list(raw) {
                Ok(list) => list,
                Err(e) => {
                    // Policy: a broken payload is "no files", never an error.
                    debug!(column = %column.id, error = %e, "Skipping unparsable file column");
                    continue;
                }
            };

            for file in &list.files {
                if !is_candidate(file) {
                    continue;
                }
                resolved.push(self.resolve_file(item, file, &column.id, optimize));
            }
        }

        resolved
    }

    /// Resolves the first image asset of an item, for thumbnail cells.
    #[must_use]
    pub fn first_thumbnail(&self, item: &BoardItem, optimize: bool) -> Option<ResolvedAsset> {
        self.resolve(item, optimize, None).into_iter().next()
    }

    fn resolve_file(
        &self,
        item: &BoardItem,
        file: &RawFileReference,
        column_id: &str,
        optimize: bool,
    ) -> ResolvedAsset {
        let mut original_url = file.url.clone().or_else(|| file.public_url.clone());
        let mut use_public = false;
        let mut local_url = None;
        let mut size = file.raw_size();
        let mut rotation = 0;

        let record = file
            .asset_id
            .as_deref()
            .and_then(|asset_id| find_record(&item.assets, asset_id));

        if let Some(record) = record {
            original_url = record.public_url.clone().or_else(|| record.url.clone());
            use_public = record.public_url.is_some();
            local_url = self.local_candidate(record, optimize);

            if let Some(stats) = record.stats {
                let preferred = if optimize { stats.optimized_size } else { None };
                size = preferred.or(stats.original_size).unwrap_or(size);
            }
            if let Some(r) = record.rotation {
                rotation = r;
            }
        }

        let is_local = local_url.is_some();
        let proxy_url = match (local_url, &original_url) {
            (Some(local), _) => Some(local),
            // Public assets are never streamed through the authenticated
            // gateway; without optimization they are rendered directly.
            (None, Some(original)) if use_public && !optimize => Some(original.clone()),
            (None, Some(original)) => Some(self.gateway_url(original, use_public, optimize)),
            (None, None) => None,
        };

        ResolvedAsset {
            name: file.name.clone(),
            proxy_url,
            original_url,
            use_public,
            is_local,
            size,
            rotation,
            item_id: item.id.clone(),
            column_id: column_id.to_string(),
        }
    }

    /// Derives the same-origin local candidate from a record's mirrored
    /// paths: the optimized rendition when requested and present, else the
    /// mirrored original.
    fn local_candidate(&self, record: &RemoteAssetRecord, optimize: bool) -> Option<String> {
        let origin = self.config.origin();
        let optimized = record
            .optimized_url
            .as_deref()
            .map(|p| absolute_local_url(&origin, p));
        let original = record
            .local_url
            .as_deref()
            .map(|p| absolute_local_url(&origin, p));

        if optimize {
            optimized.or(original)
        } else {
            original
        }
    }

    fn gateway_url(&self, original_url: &str, use_public: bool, optimize: bool) -> String {
        let endpoint = format!(
            "{}/integrations/{}/proxy",
            self.config.api_base_url, self.config.provider
        );

        let mut url = match Url::parse(&endpoint) {
            Ok(url) => url,
            // A relative base URL; fall back to manual encoding.
            Err(_) => return self.gateway_url_relative(&endpoint, original_url, use_public, optimize),
        };

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("url", original_url);
            if use_public {
                pairs.append_pair("skip_auth", "true");
            }
            if optimize {
                pairs.append_pair("optimize", "true");
                pairs.append_pair("width", &self.config.thumb_width.to_string());
            }
        }
        url.to_string()
    }

    fn gateway_url_relative(
        &self,
        endpoint: &str,
        original_url: &str,
        use_public: bool,
        optimize: bool,
    ) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(original_url.as_bytes()).collect();
        let mut out = format!("{endpoint}?url={encoded}");
        if use_public {
            out.push_str("&skip_auth=true");
        }
        if optimize {
            out.push_str("&optimize=true");
            out.push_str(&format!("&width={}", self.config.thumb_width));
        }
        out
    }
}

/// Converts a mirrored relative path into an absolute same-origin URL.
///
/// Path separators are normalized and paths under the storage segment are
/// rewritten through the file-serving endpoint; raw storage paths are not
/// directly fetchable.
#[must_use]
pub fn absolute_local_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let normalized = path.replace('\\', "/");
    let clean = normalized.trim_start_matches('/');
    let origin = origin.trim_end_matches('/');

    if let Some(idx) = clean.find(STORAGE_MARKER) {
        let rel = clean[idx + STORAGE_MARKER.len()..].trim_start_matches('/');
        return format!("{origin}{FILES_ENDPOINT}{rel}");
    }
    format!("{origin}/{clean}")
}

/// Formats a byte count as a human-readable size.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let exponent = (bytes as f64).log(1024.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    format!("{value:.2} {}", UNITS[exponent])
}

fn is_candidate(file: &RawFileReference) -> bool {
    IMAGE_EXT.is_match(&file.name) || file.file_type.as_deref() == Some("ASSET")
}

fn find_record<'a>(
    records: &'a [RemoteAssetRecord],
    asset_id: &str,
) -> Option<&'a RemoteAssetRecord> {
    records.iter().find(|r| ids_match(&r.id, asset_id))
}
