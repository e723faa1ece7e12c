// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ingestion router — turns dropped or pasted payloads into at most one layer.
//
// Resolution is async and never touches the store; the caller applies the
// single result through the normal mutation path so it gets an undo point.

use std::path::PathBuf;

use storywerk_core::layer::{Blob, LayerId, Point};
use storywerk_document::ImageProcessor;
use tracing::{debug, instrument, warn};

use crate::store::DocumentStore;

/// One externally supplied payload.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Bytes declared to be an encoded raster.
    Image(Vec<u8>),
    /// Plain text.
    Text(String),
    /// Untyped bytes: probed as an image, then as UTF-8 text.
    Data(Vec<u8>),
    /// A file on disk, read and then probed like `Data`.
    File(PathBuf),
}

/// The interpretation that won.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Image(Blob),
    Text(String),
}

/// Examine payloads in order and return the first usable interpretation.
///
/// For each payload an image reading is tried before a text reading. `None`
/// when nothing matches, which callers treat as a silent no-op.
#[instrument(skip_all, fields(payloads = payloads.len()))]
pub async fn resolve(payloads: Vec<Payload>) -> Option<Resolved> {
    for (index, payload) in payloads.into_iter().enumerate() {
        let resolved = match payload {
            Payload::Image(bytes) => probe_image(bytes).await,
            Payload::Text(text) => as_text(text),
            Payload::Data(bytes) => probe_bytes(bytes).await,
            Payload::File(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => probe_bytes(bytes).await,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Dropped file unreadable, skipping"
                    );
                    None
                }
            },
        };
        if let Some(resolved) = resolved {
            debug!(index, kind = resolved.kind(), "Payload resolved");
            return Some(resolved);
        }
    }
    debug!("No payload matched a known interpretation");
    None
}

impl Resolved {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Text(_) => "text",
        }
    }

    /// Add the layer to the store's active page at `drop_point`.
    pub fn apply(self, store: &mut DocumentStore, drop_point: Point) -> LayerId {
        match self {
            Self::Image(data) => store.add_image(data, Some(drop_point)),
            Self::Text(text) => store.add_text_at(text, drop_point),
        }
    }
}

async fn probe_bytes(bytes: Vec<u8>) -> Option<Resolved> {
    if let Some(image) = probe_image(bytes.clone()).await {
        return Some(image);
    }
    String::from_utf8(bytes).ok().and_then(as_text)
}

/// Full decode on the blocking pool; only a successful decode counts.
async fn probe_image(bytes: Vec<u8>) -> Option<Resolved> {
    let probe = tokio::task::spawn_blocking(move || {
        let decodes = ImageProcessor::from_bytes(&bytes).is_ok();
        (decodes, bytes)
    })
    .await;

    match probe {
        Ok((true, bytes)) => Some(Resolved::Image(Blob::from(bytes))),
        Ok((false, _)) => None,
        Err(err) => {
            warn!(error = %err, "Image probe task failed");
            None
        }
    }
}

fn as_text(text: String) -> Option<Resolved> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Resolved::Text(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png() -> Vec<u8> {
        ImageProcessor::from_rgba(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])))
            .to_png_bytes()
            .expect("png")
    }

    #[tokio::test]
    async fn image_wins_over_text() {
        let resolved = resolve(vec![Payload::Image(png()), Payload::Text("caption".into())]).await;
        assert!(matches!(resolved, Some(Resolved::Image(_))));
    }

    #[tokio::test]
    async fn first_usable_payload_wins() {
        let resolved = resolve(vec![
            Payload::Image(b"not an image".to_vec()),
            Payload::Text("   ".into()),
            Payload::Text(" caption ".into()),
            Payload::Image(png()),
        ])
        .await;
        assert_eq!(resolved, Some(Resolved::Text("caption".into())));
    }

    #[tokio::test]
    async fn untyped_data_is_probed_image_first() {
        let resolved = resolve(vec![Payload::Data(png())]).await;
        assert!(matches!(resolved, Some(Resolved::Image(_))));

        let resolved = resolve(vec![Payload::Data(b"hello".to_vec())]).await;
        assert_eq!(resolved, Some(Resolved::Text("hello".into())));

        let resolved = resolve(vec![Payload::Data(vec![0xff, 0xfe, 0x00])]).await;
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn files_are_read_then_probed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png()).expect("write");

        let resolved = resolve(vec![
            Payload::File(dir.path().join("missing.png")),
            Payload::File(path),
        ])
        .await;
        assert!(matches!(resolved, Some(Resolved::Image(_))));
    }

    #[tokio::test]
    async fn nothing_usable_resolves_to_none() {
        assert_eq!(resolve(Vec::new()).await, None);
        assert_eq!(resolve(vec![Payload::Text(String::new())]).await, None);
    }
}
