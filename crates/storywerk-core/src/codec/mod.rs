// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document codec — encodes documents and single layers to the versioned JSON
// interchange record and back.

mod base64_serde;
pub mod record;

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::document::Document;
use crate::error::{DecodeError, Result};
use crate::layer::Layer;

pub use record::{DocumentRecord, FORMAT_VERSION, LayerRecord};

/// Encode a whole document.
#[instrument(skip_all, fields(layers = document.layer_count()))]
pub fn encode(document: &Document) -> Result<Vec<u8>> {
    let bytes = serde_json::to_vec(&DocumentRecord::from(document))?;
    debug!(bytes = bytes.len(), "document encoded");
    Ok(bytes)
}

/// Decode a whole document. Any malformed layer fails the entire document.
#[instrument(skip(bytes), fields(bytes_len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> std::result::Result<Document, DecodeError> {
    let record: DocumentRecord = serde_json::from_slice(bytes).map_err(DecodeError::Malformed)?;
    let document = Document::try_from(record)?;
    debug!(layers = document.layer_count(), "document decoded");
    Ok(document)
}

/// Encode a single layer, e.g. for a clipboard payload.
pub fn encode_layer(layer: &Layer) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&LayerRecord::from(layer))?)
}

pub fn decode_layer(bytes: &[u8]) -> std::result::Result<Layer, DecodeError> {
    let record: LayerRecord = serde_json::from_slice(bytes).map_err(DecodeError::Malformed)?;
    Layer::try_from(record)
}

/// Encode `document` and write it to `path`.
pub fn save(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let bytes = encode(document)?;
    std::fs::write(path.as_ref(), &bytes)?;
    info!(path = %path.as_ref().display(), bytes = bytes.len(), "document saved");
    Ok(())
}

/// Read and decode the document stored at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = std::fs::read(path.as_ref())?;
    let document = decode(&bytes)?;
    info!(path = %path.as_ref().display(), "document loaded");
    Ok(document)
}
