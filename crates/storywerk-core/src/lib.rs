// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storywerk — layer model, document codec, configuration, and error
// definitions shared across all crates.

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod layer;

pub use config::{EditorConfig, ExportResolution, HISTORY_DEPTH, IngestPolicy};
pub use document::{DEFAULT_CANVAS_SIZE, Document, PAGE_COUNT, Page};
pub use error::{DecodeError, StorywerkError};
pub use layer::*;
