// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Change notifications emitted by the document store.

use std::sync::Arc;

use storywerk_core::layer::LayerId;

/// Something observable happened to the document or the editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    LayerAdded { page: usize, id: LayerId },
    LayerRemoved { page: usize, id: LayerId },
    /// Transform or content of a layer changed.
    LayerUpdated { page: usize, id: LayerId },
    LayersReordered { page: usize },
    VisibilityChanged { page: usize, id: LayerId, hidden: bool },
    SelectionChanged { selection: Option<LayerId> },
    PageChanged { from: usize, to: usize },
    Undone { page: usize },
    Redone { page: usize },
    DocumentReplaced,
}

impl EditEvent {
    /// Events that warrant user feedback (e.g. a haptic tap).
    pub fn is_notable(&self) -> bool {
        matches!(
            self,
            Self::LayerAdded { .. }
                | Self::LayerRemoved { .. }
                | Self::LayersReordered { .. }
                | Self::VisibilityChanged { .. }
                | Self::Undone { .. }
                | Self::Redone { .. }
        )
    }
}

/// Observer callback. Runs synchronously on the editing thread, with the store
/// locked, so it must not call back into the store.
pub type Listener = Arc<dyn Fn(&EditEvent) + Send + Sync>;
