// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// storywerk-editor — Editing engine for Storywerk.
//
// Owns the live document: the page-scoped layer operations, per-page bounded
// undo/redo, change events, and async ingestion of dropped payloads.

pub mod events;
pub mod handle;
pub mod history;
pub mod ingest;
pub mod store;

pub use events::{EditEvent, Listener};
pub use handle::EditorHandle;
pub use history::History;
pub use ingest::{Payload, Resolved};
pub use store::{DocumentStore, visual_to_z_index};
