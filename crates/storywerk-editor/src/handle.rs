// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared editor handle — the async-friendly face of the document store.
//
// The store is single-writer, so it sits behind one `Arc<Mutex<>>`. Every
// edit holds the lock for the whole mutation. Slow work (payload decoding,
// compositing, file I/O) runs with the lock released and only touches the
// store to read a snapshot or apply a single result.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use image::RgbaImage;
use storywerk_core::codec;
use storywerk_core::error::{Result, StorywerkError};
use storywerk_core::layer::{LayerId, Point};
use storywerk_core::{EditorConfig, IngestPolicy};
use storywerk_document::{ExportFormat, ExportOutput, Exporter};
use tracing::{info, instrument};

use crate::ingest::{self, Payload, Resolved};
use crate::store::DocumentStore;

/// Cheaply cloneable handle to one document store.
#[derive(Clone, Default)]
pub struct EditorHandle {
    store: Arc<Mutex<DocumentStore>>,
}

impl EditorHandle {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn from_config(config: EditorConfig) -> Self {
        Self::new(DocumentStore::new(config))
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// A panic inside an earlier edit leaves the store in its last consistent
    /// state, so a poisoned lock is recovered rather than propagated.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut DocumentStore) -> R) -> R {
        let mut guard = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    // -- Ingestion -----------------------------------------------------------

    /// Resolve `payloads` and add at most one layer at `drop_point`.
    ///
    /// The store is unlocked while payloads are decoded. What happens if the
    /// user changes page meanwhile is governed by the configured
    /// `IngestPolicy`.
    #[instrument(skip(self, payloads), fields(payloads = payloads.len()))]
    pub async fn ingest(&self, payloads: Vec<Payload>, drop_point: Point) -> Option<LayerId> {
        let drop_page = self.with_store(|store| store.active_page());
        let resolved = ingest::resolve(payloads).await?;
        self.apply_ingested(drop_page, resolved, drop_point)
    }

    /// Apply a payload that was dropped while `drop_page` was active.
    fn apply_ingested(
        &self,
        drop_page: usize,
        resolved: Resolved,
        drop_point: Point,
    ) -> Option<LayerId> {
        self.with_store(|store| {
            let policy = store.config().ingest_policy;
            if policy == IngestPolicy::DiscardIfPageChanged && store.active_page() != drop_page {
                info!(
                    drop_page,
                    active_page = store.active_page(),
                    "Page changed during ingestion, discarding result"
                );
                return None;
            }
            let kind = resolved.kind();
            let id = resolved.apply(store, drop_point);
            info!(page = store.active_page(), layer = %id, kind, "Ingested payload");
            Some(id)
        })
    }

    // -- Export --------------------------------------------------------------

    /// Composite the active page from a point-in-time snapshot.
    pub async fn export_current_page(&self, exporter: &Exporter) -> Result<RgbaImage> {
        let (canvas_size, layers) = self.with_store(|store| {
            (store.document().canvas_size, store.layers().to_vec())
        });
        let exporter = exporter.clone();
        tokio::task::spawn_blocking(move || exporter.export_layers(canvas_size, &layers))
            .await
            .map_err(|err| StorywerkError::Task(err.to_string()))
    }

    /// Composite all eight pages from one consistent snapshot.
    pub async fn export_all_pages(&self, exporter: &Exporter) -> Result<Vec<RgbaImage>> {
        let document = self.with_store(|store| store.document().clone());
        let exporter = exporter.clone();
        tokio::task::spawn_blocking(move || exporter.export_all_pages(&document))
            .await
            .map_err(|err| StorywerkError::Task(err.to_string()))
    }

    /// Whole-document export as PNGs or a PDF.
    pub async fn export(&self, exporter: &Exporter, format: ExportFormat) -> Result<ExportOutput> {
        let document = self.with_store(|store| store.document().clone());
        let exporter = exporter.clone();
        tokio::task::spawn_blocking(move || exporter.export(&document, format))
            .await
            .map_err(|err| StorywerkError::Task(err.to_string()))?
    }

    // -- Persistence ---------------------------------------------------------

    /// Encode the current document and write it to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.with_store(|store| codec::encode(store.document()))?;
        tokio::fs::write(path.as_ref(), &bytes).await?;
        info!(path = %path.as_ref().display(), bytes = bytes.len(), "Document saved");
        Ok(())
    }

    /// Read, decode, and load the document at `path`. On failure the current
    /// document is left untouched.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let document = codec::decode(&bytes)?;
        self.with_store(|store| store.load_document(document));
        info!(path = %path.as_ref().display(), "Document opened");
        Ok(())
    }
}
