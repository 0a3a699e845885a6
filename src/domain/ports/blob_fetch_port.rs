//! Binary fetch port definition.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::BlobError;

/// Callback receiving download progress as a 0..=100 percentage.
pub type ProgressSink = Arc<dyn Fn(u8) + Send + Sync>;

/// Port for streaming binary asset bytes.
///
/// `skip_auth` requests must not carry a bearer credential; they target
/// public assets that never go through the authenticated gateway path.
#[async_trait]
pub trait BlobFetchPort: Send + Sync {
    /// Fetches the full payload at `url`, reporting progress when a sink is
    /// provided and the payload length is known.
    async fn fetch(
        &self,
        url: &str,
        skip_auth: bool,
        progress: Option<ProgressSink>,
    ) -> Result<Bytes, BlobError>;
}
