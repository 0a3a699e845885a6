//! Per-thumbnail blob cache state machine.
//!
//! Each displayed asset owns exactly one `BlobCache`. The cache performs
//! the proxied fetch, owns the resulting buffer handle, and guards against
//! a stale in-flight fetch clobbering a newer one with a per-entry request
//! generation captured at fetch start.
//!
//! Framework-free: the presentation layer is a thin adapter that calls
//! [`BlobCache::attach`] when inputs change, runs the returned fetch, and
//! feeds the result back through [`BlobCache::complete_fetch`].

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::domain::entities::{AssetOrigin, HandleTracker, RenderableSource, ResolvedAsset};
use crate::domain::errors::BlobError;
use crate::domain::ports::BlobFetchPort;

use super::asset_resolver::absolute_local_url;

/// Configuration injected into every cache instance.
#[derive(Debug, Clone)]
pub struct BlobCacheConfig {
    /// API origin used to normalize mirrored relative paths.
    pub api_origin: String,
    /// Exposes the local/remote origin indicator on Ready/Error entries.
    /// Diagnostic only; never affects caching behavior.
    pub debug_overlay: bool,
}

impl BlobCacheConfig {
    /// Creates a config for the given API origin.
    #[must_use]
    pub fn new(api_origin: impl Into<String>) -> Self {
        Self {
            api_origin: api_origin.into(),
            debug_overlay: false,
        }
    }

    /// Enables the debug origin indicator.
    #[must_use]
    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }
}

/// Externally visible entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing to load, or loading gated off. Placeholder glyph.
    Idle,
    /// A proxied fetch is in flight.
    Fetching,
    /// A renderable source is installed.
    Ready,
    /// The fetch failed or the payload was undecodable. Never retried.
    Error,
}

/// A fetch the adapter must run on behalf of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Generation captured at fetch start; only this generation may commit.
    pub generation: u64,
    /// URL to fetch.
    pub url: String,
    /// True when the request must not carry credentials.
    pub skip_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttachKey {
    proxy_url: Option<String>,
    original_url: Option<String>,
    use_public: bool,
    is_local: bool,
    should_load: bool,
}

#[derive(Debug)]
enum EntryState {
    Idle,
    Fetching { generation: u64, progress: Option<u8> },
    Ready { source: RenderableSource, decoded: bool },
    Error,
}

/// Resource manager for one displayed asset.
pub struct BlobCache {
    config: BlobCacheConfig,
    fetcher: Arc<dyn BlobFetchPort>,
    tracker: HandleTracker,
    state: EntryState,
    key: Option<AttachKey>,
    generation: u64,
}

impl std::fmt::Debug for BlobCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobCache")
            .field("status", &self.status())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl BlobCache {
    /// Creates an idle cache.
    #[must_use]
    pub fn new(config: BlobCacheConfig, fetcher: Arc<dyn BlobFetchPort>) -> Self {
        Self {
            config,
            fetcher,
            tracker: HandleTracker::new(),
            state: EntryState::Idle,
            key: None,
            generation: 0,
        }
    }

    /// Handle allocation/release accounting for this cache.
    #[must_use]
    pub fn tracker(&self) -> &HandleTracker {
        &self.tracker
    }

    /// Recomputes the entry for `asset`.
    ///
    /// A no-op when the `(proxy_url, use_public, is_local, should_load)`
    /// identity is unchanged. Otherwise any in-flight fetch is abandoned
    /// and any installed handle is released before the new attempt starts,
    /// then either a renderable source is installed directly (public or
    /// local assets) or the fetch to run is returned.
    pub fn attach(&mut self, asset: &ResolvedAsset, should_load: bool) -> Option<FetchRequest> {
        let key = AttachKey {
            proxy_url: asset.proxy_url.clone(),
            original_url: asset.original_url.clone(),
            use_public: asset.use_public,
            is_local: asset.is_local,
            should_load,
        };
        if self.key.as_ref() == Some(&key) {
            return None;
        }

        // Abandon any in-flight fetch and release the previous handle
        // before the new attempt; a slow stale fetch must never clobber a
        // newer one.
        self.generation += 1;
        self.state = EntryState::Idle;
        self.key = Some(key);

        if !should_load {
            return None;
        }

        if asset.use_public {
            // Public assets are never streamed through the gateway.
            if let Some(original) = &asset.original_url {
                self.state = EntryState::Ready {
                    source: RenderableSource::Direct(original.clone()),
                    decoded: false,
                };
            }
            return None;
        }

        if asset.is_local {
            if let Some(proxy) = &asset.proxy_url {
                let absolute = absolute_local_url(&self.config.api_origin, proxy);
                self.state = EntryState::Ready {
                    source: RenderableSource::Direct(absolute),
                    decoded: false,
                };
            }
            return None;
        }

        match &asset.proxy_url {
            Some(url) => {
                self.state = EntryState::Fetching {
                    generation: self.generation,
                    progress: None,
                };
                Some(FetchRequest {
                    generation: self.generation,
                    url: url.clone(),
                    skip_auth: asset.use_public,
                })
            }
            // Resolution gap: placeholder glyph, not an error.
            None => None,
        }
    }

    /// Commits a finished fetch.
    ///
    /// Results from superseded generations are discarded; only the most
    /// recently initiated fetch may ever install.
    pub fn complete_fetch(&mut self, generation: u64, result: Result<Bytes, BlobError>) {
        let active = matches!(
            self.state,
            EntryState::Fetching { generation: g, .. } if g == generation
        ) && generation == self.generation;

        if !active {
            debug!(generation, current = self.generation, "Discarding superseded fetch result");
            return;
        }

        match result {
            Ok(bytes) => {
                let handle = self.tracker.allocate(bytes);
                debug!(uri = %handle.uri(), len = handle.len(), "Blob fetch committed");
                self.state = EntryState::Ready {
                    source: RenderableSource::Buffer(handle),
                    decoded: false,
                };
            }
            Err(e) => {
                warn!(error = %e, "Blob fetch failed");
                self.state = EntryState::Error;
            }
        }
    }

    /// Records download progress for the active fetch.
    pub fn set_progress(&mut self, generation: u64, percent: u8) {
        if let EntryState::Fetching { generation: g, progress } = &mut self.state {
            if *g == generation {
                *progress = Some(percent.min(100));
            }
        }
    }

    /// Progress of the in-flight fetch, when known.
    #[must_use]
    pub fn progress(&self) -> Option<u8> {
        match &self.state {
            EntryState::Fetching { progress, .. } => *progress,
            _ => None,
        }
    }

    /// Releases all resources. Safe to call from any state.
    pub fn detach(&mut self) {
        self.generation += 1;
        self.state = EntryState::Idle;
        self.key = None;
    }

    /// Current entry status.
    #[must_use]
    pub fn status(&self) -> CacheStatus {
        match &self.state {
            EntryState::Idle => CacheStatus::Idle,
            EntryState::Fetching { .. } => CacheStatus::Fetching,
            EntryState::Ready { .. } => CacheStatus::Ready,
            EntryState::Error => CacheStatus::Error,
        }
    }

    /// The source to render, once Ready.
    #[must_use]
    pub fn renderable(&self) -> Option<&RenderableSource> {
        match &self.state {
            EntryState::Ready { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Marks the presentation-layer decode as finished (event path).
    pub fn mark_decoded(&mut self) {
        if let EntryState::Ready { decoded, .. } = &mut self.state {
            *decoded = true;
        }
    }

    /// Actively checks decode status instead of waiting for an event;
    /// decode-complete events are unreliable for already-cached resources.
    ///
    /// Buffered payloads are sniffed for a known image format; an
    /// undecodable payload transitions the entry to Error. Direct sources
    /// carry no bytes and still rely on [`Self::mark_decoded`].
    pub fn verify_decoded(&mut self) -> bool {
        match &mut self.state {
            EntryState::Ready {
                source: RenderableSource::Buffer(handle),
                decoded,
            } => {
                if *decoded {
                    return true;
                }
                match image::guess_format(handle.bytes()) {
                    Ok(_) => {
                        *decoded = true;
                        return true;
                    }
                    Err(e) => {
                        warn!(error = %e, "Buffered payload is not a decodable image");
                    }
                }
            }
            EntryState::Ready { decoded, .. } => return *decoded,
            _ => return false,
        }
        // Undecodable payload; the handle is released with the state.
        self.state = EntryState::Error;
        false
    }

    /// True while a spinner should cover the entry: fetching, or ready but
    /// not yet decoded.
    #[must_use]
    pub fn shows_spinner(&self) -> bool {
        match &self.state {
            EntryState::Fetching { .. } => true,
            EntryState::Ready { decoded, .. } => !decoded,
            _ => false,
        }
    }

    /// Local/remote indicator for operational diagnosis.
    ///
    /// Only exposed when the debug overlay is enabled and the entry is
    /// Ready or Error.
    #[must_use]
    pub fn origin_indicator(&self) -> Option<AssetOrigin> {
        if !self.config.debug_overlay {
            return None;
        }
        match self.state {
            EntryState::Ready { .. } | EntryState::Error => {
                let is_local = self.key.as_ref().is_some_and(|k| k.is_local);
                Some(if is_local {
                    AssetOrigin::Local
                } else {
                    AssetOrigin::Remote
                })
            }
            _ => None,
        }
    }

    /// Attaches and drives the resulting fetch to completion.
    ///
    /// Sequential convenience for callers without their own task plumbing;
    /// concurrent supersede handling requires the explicit
    /// attach/complete_fetch pair.
    pub async fn load(&mut self, asset: &ResolvedAsset, should_load: bool) {
        if let Some(request) = self.attach(asset, should_load) {
            let fetcher = Arc::clone(&self.fetcher);
            let result = fetcher.fetch(&request.url, request.skip_auth, None).await;
            self.complete_fetch(request.generation, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockBlobFetcher;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn cache() -> BlobCache {
        BlobCache::new(
            BlobCacheConfig::new("https://backend.example.com"),
            Arc::new(MockBlobFetcher::new()),
        )
    }

    fn remote_asset(url: &str) -> ResolvedAsset {
        ResolvedAsset {
            name: "a.jpg".to_string(),
            proxy_url: Some(url.to_string()),
            original_url: Some("https://up/a.jpg".to_string()),
            use_public: false,
            is_local: false,
            size: 0,
            rotation: 0,
            item_id: "101".to_string(),
            column_id: "files__1".to_string(),
        }
    }

    fn public_asset() -> ResolvedAsset {
        ResolvedAsset {
            use_public: true,
            proxy_url: Some("https://cdn/x.jpg".to_string()),
            original_url: Some("https://cdn/x.jpg".to_string()),
            ..remote_asset("unused")
        }
    }

    fn local_asset(path: &str) -> ResolvedAsset {
        ResolvedAsset {
            is_local: true,
            proxy_url: Some(path.to_string()),
            ..remote_asset("unused")
        }
    }

    #[test]
    fn test_idle_without_should_load() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), false);
        assert!(request.is_none());
        assert_eq!(cache.status(), CacheStatus::Idle);

        // Flipping the gate starts the fetch.
        let request = cache.attach(&remote_asset("https://p/a"), true);
        assert!(request.is_some());
        assert_eq!(cache.status(), CacheStatus::Fetching);
    }

    #[test]
    fn test_public_asset_bypasses_fetch() {
        let mut cache = cache();
        let request = cache.attach(&public_asset(), true);
        assert!(request.is_none());
        assert_eq!(cache.status(), CacheStatus::Ready);
        assert_eq!(cache.renderable().unwrap().uri(), "https://cdn/x.jpg");
        assert_eq!(cache.tracker().allocated(), 0);
    }

    #[test]
    fn test_local_asset_bypasses_fetch_and_normalizes() {
        let mut cache = cache();
        let request = cache.attach(&local_asset("/assets/monday_files/x.jpg"), true);
        assert!(request.is_none());
        assert_eq!(
            cache.renderable().unwrap().uri(),
            "https://backend.example.com/api/v1/tools/files/x.jpg"
        );
    }

    #[test]
    fn test_resolution_gap_stays_idle() {
        let mut cache = cache();
        let asset = ResolvedAsset {
            proxy_url: None,
            original_url: None,
            ..remote_asset("unused")
        };
        assert!(cache.attach(&asset, true).is_none());
        assert_eq!(cache.status(), CacheStatus::Idle);
    }

    #[test]
    fn test_fetch_success_installs_single_handle() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();

        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        assert_eq!(cache.status(), CacheStatus::Ready);
        assert!(cache.renderable().unwrap().uri().starts_with("mem://"));
        assert_eq!(cache.tracker().live(), 1);
    }

    #[test]
    fn test_fetch_failure_transitions_to_error() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();

        cache.complete_fetch(request.generation, Err(BlobError::status(502)));
        assert_eq!(cache.status(), CacheStatus::Error);
        assert_eq!(cache.tracker().allocated(), 0);
    }

    #[test]
    fn test_superseded_fetch_never_overwrites() {
        let mut cache = cache();
        let request_a = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        let request_b = cache.attach(&remote_asset("https://p/b"), true).unwrap();
        assert_ne!(request_a.generation, request_b.generation);

        cache.complete_fetch(request_b.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        let committed = cache.renderable().unwrap().uri().to_string();

        // A resolves late; its result must be discarded.
        cache.complete_fetch(request_a.generation, Ok(Bytes::from_static(b"stale bytes")));
        assert_eq!(cache.renderable().unwrap().uri(), committed);
        assert_eq!(cache.tracker().live(), 1);
    }

    #[test]
    fn test_stale_result_after_detach_is_discarded() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        cache.detach();

        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        assert_eq!(cache.status(), CacheStatus::Idle);
        assert_eq!(cache.tracker().allocated(), 0);
    }

    #[test]
    fn test_url_change_releases_previous_handle_first() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        assert_eq!(cache.tracker().live(), 1);

        let _request_b = cache.attach(&remote_asset("https://p/b"), true).unwrap();
        // Old handle released before the new fetch installs anything.
        assert_eq!(cache.tracker().live(), 0);
        assert_eq!(cache.status(), CacheStatus::Fetching);
    }

    #[test]
    fn test_reattach_same_identity_is_noop() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));

        assert!(cache.attach(&remote_asset("https://p/a"), true).is_none());
        assert_eq!(cache.status(), CacheStatus::Ready);
        assert_eq!(cache.tracker().live(), 1);
    }

    #[test]
    fn test_attach_detach_cycle_handle_invariant() {
        let mut cache = cache();
        for _ in 0..5 {
            let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
            assert!(cache.tracker().live() <= 1);
            cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
            assert_eq!(cache.tracker().live(), 1);
            cache.detach();
            assert_eq!(cache.tracker().live(), 0);
        }
        assert_eq!(cache.tracker().allocated(), cache.tracker().released());
    }

    #[test]
    fn test_detach_from_any_state_releases_once() {
        let mut cache = cache();
        cache.detach(); // Idle: nothing to release.
        assert_eq!(cache.tracker().released(), 0);

        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        cache.detach();
        cache.detach(); // Second detach must not double-release.
        assert_eq!(cache.tracker().allocated(), 1);
        assert_eq!(cache.tracker().released(), 1);
    }

    #[test]
    fn test_spinner_until_decode_verified() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        assert!(cache.shows_spinner());

        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        assert!(cache.shows_spinner());

        assert!(cache.verify_decoded());
        assert!(!cache.shows_spinner());
    }

    #[test]
    fn test_undecodable_payload_becomes_error() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        cache.complete_fetch(request.generation, Ok(Bytes::from_static(b"<html>nope</html>")));

        assert!(!cache.verify_decoded());
        assert_eq!(cache.status(), CacheStatus::Error);
        assert_eq!(cache.tracker().live(), 0);
    }

    #[test]
    fn test_mark_decoded_event_path() {
        let mut cache = cache();
        cache.attach(&public_asset(), true);
        assert!(cache.shows_spinner());
        cache.mark_decoded();
        assert!(!cache.shows_spinner());
    }

    #[test]
    fn test_progress_tracking() {
        let mut cache = cache();
        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        assert_eq!(cache.progress(), None);

        cache.set_progress(request.generation, 40);
        assert_eq!(cache.progress(), Some(40));

        // Stale generation progress is ignored.
        cache.set_progress(request.generation + 1, 90);
        assert_eq!(cache.progress(), Some(40));

        cache.complete_fetch(request.generation, Ok(Bytes::from_static(PNG_MAGIC)));
        assert_eq!(cache.progress(), None);
    }

    #[test]
    fn test_debug_overlay_indicator() {
        let fetcher: Arc<dyn BlobFetchPort> = Arc::new(MockBlobFetcher::new());
        let mut cache = BlobCache::new(
            BlobCacheConfig::new("https://backend.example.com").with_debug_overlay(true),
            Arc::clone(&fetcher),
        );

        assert_eq!(cache.origin_indicator(), None);

        cache.attach(&local_asset("/assets/monday_files/x.jpg"), true);
        assert_eq!(cache.origin_indicator(), Some(AssetOrigin::Local));

        let request = cache.attach(&remote_asset("https://p/a"), true).unwrap();
        assert_eq!(cache.origin_indicator(), None); // still fetching
        cache.complete_fetch(request.generation, Err(BlobError::status(500)));
        assert_eq!(cache.origin_indicator(), Some(AssetOrigin::Remote));

        // Disabled overlay exposes nothing but behaves identically.
        let mut plain = BlobCache::new(
            BlobCacheConfig::new("https://backend.example.com"),
            fetcher,
        );
        plain.attach(&local_asset("/assets/monday_files/x.jpg"), true);
        assert_eq!(plain.origin_indicator(), None);
        assert_eq!(plain.status(), CacheStatus::Ready);
    }

    #[tokio::test]
    async fn test_load_convenience() {
        let fetcher = Arc::new(MockBlobFetcher::new());
        fetcher
            .serve("https://p/a", Bytes::from_static(PNG_MAGIC))
            .await;
        let mut cache = BlobCache::new(
            BlobCacheConfig::new("https://backend.example.com"),
            Arc::clone(&fetcher) as Arc<dyn BlobFetchPort>,
        );

        cache.load(&remote_asset("https://p/a"), true).await;
        assert_eq!(cache.status(), CacheStatus::Ready);
        assert_eq!(fetcher.fetch_calls(), 1);

        // Same identity: no second fetch.
        cache.load(&remote_asset("https://p/a"), true).await;
        assert_eq!(fetcher.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_load_error_is_contained() {
        let fetcher = Arc::new(MockBlobFetcher::new());
        let mut cache = BlobCache::new(
            BlobCacheConfig::new("https://backend.example.com"),
            Arc::clone(&fetcher) as Arc<dyn BlobFetchPort>,
        );

        cache.load(&remote_asset("https://p/missing"), true).await;
        assert_eq!(cache.status(), CacheStatus::Error);

        // Errors are never retried automatically.
        cache.load(&remote_asset("https://p/missing"), true).await;
        assert_eq!(fetcher.fetch_calls(), 1);
    }
}
