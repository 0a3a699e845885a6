//! Board items and file-column payloads.

use serde::{Deserialize, Serialize};

use crate::domain::errors::FileListParseError;

use super::asset::RemoteAssetRecord;

/// A synchronized board item with its column values and sibling asset records.
///
/// Items are owned by the item-loading collaborator; this crate only reads
/// them during asset resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardItem {
    /// Upstream item id.
    #[serde(with = "crate::domain::serde_utils::string_or_number")]
    pub id: String,
    /// Item display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Raw column values as synchronized from the board.
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
    /// Sibling asset records mirrored for this item, looked up by asset id.
    #[serde(default)]
    pub assets: Vec<RemoteAssetRecord>,
}

/// A single column value on a board item.
///
/// File columns carry a JSON-encoded payload in `value`; other column kinds
/// are ignored by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnValue {
    /// Column id (e.g. `files__1`).
    pub id: String,
    /// Column title, when the backend includes it.
    #[serde(default)]
    pub title: Option<String>,
    /// Column type tag.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Raw JSON-encoded payload. `None` for empty columns.
    #[serde(default)]
    pub value: Option<String>,
}

/// The decoded payload of a file column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileList {
    /// Attached file references, in upstream order.
    #[serde(default)]
    pub files: Vec<RawFileReference>,
}

/// A raw attached-file reference exactly as it appears in a file column.
/// Never mutated; resolution produces fresh [`super::ResolvedAsset`]s instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFileReference {
    /// File name, used for the image-extension filter.
    pub name: String,
    /// Direct URL, when the upstream attached one.
    #[serde(default)]
    pub url: Option<String>,
    /// Public (unauthenticated) URL, when the upstream attached one.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Upstream asset id linking to a sibling [`RemoteAssetRecord`].
    /// Arrives as a string or a number depending on the payload.
    #[serde(
        default,
        rename = "assetId",
        with = "crate::domain::serde_utils::string_or_number::option"
    )]
    pub asset_id: Option<String>,
    /// Upstream file type tag (`ASSET` marks binary assets).
    #[serde(default, rename = "fileType")]
    pub file_type: Option<String>,
    /// File size in bytes, when the upstream reports it.
    #[serde(default)]
    pub size: Option<u64>,
    /// Alternative size field used by some payload versions.
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl RawFileReference {
    /// Returns the raw file's own size, trying both upstream field names.
    #[must_use]
    pub fn raw_size(&self) -> u64 {
        self.size.or(self.file_size).unwrap_or(0)
    }
}

/// Decodes a file-column payload.
///
/// Malformed payloads are returned as [`FileListParseError`]; the resolver
/// treats that as "zero files" by policy rather than surfacing an error.
///
/// # Errors
///
/// Returns [`FileListParseError`] when the payload is not valid JSON or does
/// not carry a `files` array.
pub fn parse_file_list(raw: &str) -> Result<FileList, FileListParseError> {
    serde_json::from_str(raw).map_err(|e| FileListParseError::new(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_list() {
        let raw = r#"{"files":[{"name":"a.jpg","assetId":"7"}]}"#;
        let list = parse_file_list(raw).unwrap();
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].name, "a.jpg");
        assert_eq!(list.files[0].asset_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_parse_file_list_numeric_asset_id() {
        let raw = r#"{"files":[{"name":"a.jpg","assetId":7}]}"#;
        let list = parse_file_list(raw).unwrap();
        assert_eq!(list.files[0].asset_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_parse_file_list_malformed() {
        assert!(parse_file_list("not json").is_err());
        assert!(parse_file_list(r#"{"files": "nope"}"#).is_err());
    }

    #[test]
    fn test_raw_size_fallback() {
        let reference: RawFileReference =
            serde_json::from_str(r#"{"name":"a.jpg","file_size":42}"#).unwrap();
        assert_eq!(reference.raw_size(), 42);

        let reference: RawFileReference = serde_json::from_str(r#"{"name":"a.jpg"}"#).unwrap();
        assert_eq!(reference.raw_size(), 0);
    }

    #[test]
    fn test_item_deserialization() {
        let raw = r#"{
            "id": 101,
            "name": "Widget",
            "column_values": [
                {"id": "files__1", "type": "file", "value": "{\"files\":[]}"}
            ],
            "assets": [
                {"id": "7", "url": "https://files.example.com/7.jpg"}
            ]
        }"#;
        let item: BoardItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.id, "101");
        assert_eq!(item.column_values.len(), 1);
        assert_eq!(item.assets.len(), 1);
    }
}
