mod asset_resolver;
mod blob_cache;
mod job_poller;

pub use asset_resolver::{
    AssetResolver, ResolverConfig, absolute_local_url, format_file_size,
};
pub use blob_cache::{BlobCache, BlobCacheConfig, CacheStatus, FetchRequest};
pub use job_poller::{JobPoller, JobPollerHandle, PollCommand, PollerConfig};
