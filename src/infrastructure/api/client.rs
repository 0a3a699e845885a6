//! Backend API HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, ItemsResponse};
use crate::domain::entities::{BoardItem, SyncJob};
use crate::domain::errors::{ApiError, BlobError};
use crate::domain::ports::{BlobFetchPort, CredentialProviderPort, ProgressSink, SyncApiPort};

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// HTTP client for the board-sync backend.
///
/// Serves the sync-job endpoints, the board items endpoint and proxied
/// binary fetches. Requests carry the bearer credential from the provider
/// unless the caller asks to skip it.
pub struct BoardApiClient {
    client: Client,
    base_url: String,
    provider: String,
    credentials: Arc<dyn CredentialProviderPort>,
}

impl BoardApiClient {
    /// Creates a client for the given API base URL and provider segment.
    ///
    /// # Errors
    /// Returns an error if HTTP client creation fails.
    pub fn new(
        base_url: impl Into<String>,
        provider: impl Into<String>,
        credentials: Arc<dyn CredentialProviderPort>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider: provider.into(),
            credentials,
        })
    }

    fn integration_url(&self, path: &str) -> String {
        format!("{}/integrations/{}/{path}", self.base_url, self.provider)
    }

    /// Fetches the synchronized items of a board.
    ///
    /// # Errors
    /// Returns [`ApiError`] on network failures or non-success statuses.
    pub async fn fetch_items(&self, board_id: &str) -> Result<Vec<BoardItem>, ApiError> {
        let url = self.integration_url(&format!("boards/{board_id}/items"));
        debug!(%board_id, "Fetching board items");

        let response = self
            .authorize(self.client.get(&url), false)
            .await
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        let items: ItemsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::parse(e.to_string()))?;
        Ok(items.items)
    }

    async fn authorize(&self, request: RequestBuilder, skip_auth: bool) -> RequestBuilder {
        if skip_auth {
            return request;
        }
        match self.credentials.bearer_token().await {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> ApiError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.text().unwrap_or_else(|| format!("HTTP {status}")),
            Err(_) => format!("HTTP {status}"),
        };

        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        ApiError::status(status.as_u16(), message)
    }
}

fn map_request_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_connect() {
        ApiError::network("failed to connect to backend")
    } else {
        ApiError::network(e.to_string())
    }
}

#[async_trait]
impl SyncApiPort for BoardApiClient {
    async fn list_jobs(&self, limit: u32) -> Result<Vec<SyncJob>, ApiError> {
        let url = self.integration_url("sync/jobs");

        let response = self
            .authorize(self.client.get(&url).query(&[("limit", limit)]), false)
            .await
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse job list");
            ApiError::parse(e.to_string())
        })
    }

    async fn reset_queue(&self) -> Result<(), ApiError> {
        let url = self.integration_url("sync/jobs/reset");

        let response = self
            .authorize(self.client.post(&url), false)
            .await
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl BlobFetchPort for BoardApiClient {
    async fn fetch(
        &self,
        url: &str,
        skip_auth: bool,
        progress: Option<ProgressSink>,
    ) -> Result<Bytes, BlobError> {
        let response = self
            .authorize(self.client.get(url), skip_auth)
            .await
            .send()
            .await
            .map_err(|e| BlobError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BlobError::status(status.as_u16()));
        }

        let total = response.content_length();
        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BlobError::network(e.to_string()))?;
            buffer.extend_from_slice(&chunk);
            if let (Some(sink), Some(total)) = (&progress, total) {
                if total > 0 {
                    #[allow(clippy::cast_possible_truncation)]
                    let percent = ((buffer.len() as u64).min(total) * 100 / total) as u8;
                    sink(percent);
                }
            }
        }

        debug!(%url, len = buffer.len(), "Blob fetch complete");
        Ok(buffer.freeze())
    }
}
