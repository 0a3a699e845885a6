//! Domain entity definitions.

mod asset;
mod blob;
mod item;
mod job;

pub use asset::{AssetStats, RemoteAssetRecord, ResolvedAsset, ids_match};
pub use blob::{AssetOrigin, BufferHandle, HandleTracker, RenderableSource};
pub use item::{BoardItem, ColumnValue, FileList, RawFileReference, parse_file_list};
pub use job::{JobSnapshot, JobStatus, SyncJob};
