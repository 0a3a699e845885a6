//! Error types.

mod api_error;
mod blob_error;

pub use api_error::ApiError;
pub use blob_error::{BlobError, FileListParseError};
