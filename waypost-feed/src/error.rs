//! Error types for the feed core.

use thiserror::Error;

/// Why a package's changes document yielded no entries.
///
/// This never escapes the public producer/reader surface: a document
/// error is logged once per package id and degrades to "zero entries
/// from that package".
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to open document: {0}")]
    Open(#[source] anyhow::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the document root")]
    RootNotObject,

    #[error("expected an array in the `entries` field")]
    EntriesNotArray,
}
