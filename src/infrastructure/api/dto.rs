//! Backend API wire types.

use serde::Deserialize;

use crate::domain::entities::BoardItem;

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// FastAPI-style error detail.
    #[serde(default)]
    pub detail: Option<String>,
    /// Alternative message field used by some deployments.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// The most specific error text available.
    #[must_use]
    pub fn text(self) -> Option<String> {
        self.detail.or(self.message)
    }
}

/// Response of the board items endpoint.
#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    /// Synchronized items with their column values and asset records.
    #[serde(default)]
    pub items: Vec<BoardItem>,
}
