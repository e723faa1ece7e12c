// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Storywerk.
//
// Editing operations never fail: stale indices and unknown ids are absorbed as
// no-ops by the store. Errors only surface at the serialization boundary
// (`DecodeError`) and at I/O or export boundaries (`StorywerkError`).

use thiserror::Error;

/// Top-level error type for all Storywerk operations.
#[derive(Debug, Error)]
pub enum StorywerkError {
    // -- Codec --
    #[error("document decode failed: {0}")]
    Decode(#[from] DecodeError),

    // -- Rendering / export --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("ink payload invalid: {0}")]
    InkError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("font could not be loaded: {0}")]
    Font(String),

    #[error("page index {0} is out of range")]
    PageOutOfRange(usize),

    // -- Async --
    #[error("background task failed: {0}")]
    Task(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Typed failure when a persisted document or layer record cannot be decoded.
///
/// Decoding is all-or-nothing: any of these aborts the whole document. The one
/// deliberate exception is an unrecognised font-weight name, which degrades to
/// `regular` instead of landing here.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON syntax error, missing required field, or wrong value type.
    #[error("malformed record: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    /// The `type` tag names a variant whose payload record is absent.
    #[error("content type '{0}' has no matching payload")]
    MissingContent(String),

    #[error("invalid layer id '{0}'")]
    InvalidLayerId(String),

    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("document has {0} pages, at most 8 are allowed")]
    TooManyPages(usize),

    #[error("page {page} contains layer id {id} more than once")]
    DuplicateLayerId { page: usize, id: String },

    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StorywerkError>;
