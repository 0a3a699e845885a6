mod blob_fetch_port;
mod confirm_port;
mod credential_port;
mod sync_api_port;

pub use blob_fetch_port::{BlobFetchPort, ProgressSink};
pub use confirm_port::ConfirmationPort;
pub use credential_port::{CredentialProviderPort, StaticCredentialProvider};
pub use sync_api_port::SyncApiPort;
