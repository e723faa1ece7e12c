// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// storywerk-document — Rendering and export for Storywerk documents.
//
// Provides layer content rendering (raster images, vector ink, text), the
// page compositor, PNG encoding, and paginated PDF assembly.

pub mod compose;
pub mod export;
pub mod image;
pub mod pdf;
pub mod render;

// Re-export the primary structs so callers can use `storywerk_document::Compositor` etc.
pub use compose::{Compositor, ExportOptions};
pub use export::{ExportFormat, ExportOutput, Exporter, encode_png};
pub use crate::image::processor::ImageProcessor;
pub use pdf::writer::PdfWriter;
pub use render::{FontBook, FontProvider, InkDrawing, InkStroke};
