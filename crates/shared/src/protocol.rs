//! HTTP contract with the remote PDF service.

use serde::{Deserialize, Serialize};

use crate::domain::OperationKind;

/// Repeated multipart field carrying every file of a merge, in selection order.
pub const MERGE_FILES_FIELD: &str = "files";
/// Multipart field carrying the single watermark input.
pub const WATERMARK_FILE_FIELD: &str = "file";
/// Multipart text field carrying the watermark string.
pub const WATERMARK_TEXT_FIELD: &str = "text";

pub const MERGED_FILENAME: &str = "merged.pdf";
pub const WATERMARKED_PREFIX: &str = "watermarked";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Merge,
    Watermark,
    Health,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Merge => "/merge",
            Endpoint::Watermark => "/watermark",
            Endpoint::Health => "/",
        }
    }

    pub fn for_operation(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Merge => Endpoint::Merge,
            OperationKind::Watermark => Endpoint::Watermark,
        }
    }
}

/// Body of `GET /` on the PDF service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub files_in_temp: u64,
}
