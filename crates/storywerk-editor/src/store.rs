// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document store — owns the eight pages, the active page, the selection, and
// one bounded undo history per page.
//
// Every operation is scoped to the active page. Stale ids and out-of-range
// indices are absorbed as no-ops; mutators return whether anything changed,
// and only changes register an undo point.

use std::sync::Arc;

use storywerk_core::document::{Document, PAGE_COUNT, Page};
use storywerk_core::EditorConfig;
use storywerk_core::layer::{
    Angle, Blob, Layer, LayerContent, LayerId, Point, Size, TextContent, Transform,
};
use tracing::{debug, info, warn};

use crate::events::{EditEvent, Listener};
use crate::history::History;

/// Translate an index in the top-to-bottom layer list shown to the user into
/// a z-order index (0 = bottom). `None` when `visual` is out of range.
pub fn visual_to_z_index(len: usize, visual: usize) -> Option<usize> {
    (visual < len).then(|| len - 1 - visual)
}

/// Single-writer owner of the document and its editing state.
pub struct DocumentStore {
    document: Document,
    active_page: usize,
    /// Always a visible layer on the active page, or `None`.
    selection: Option<LayerId>,
    histories: [History<Vec<Layer>>; PAGE_COUNT],
    config: EditorConfig,
    listeners: Vec<Listener>,
    feedback: Option<Listener>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("active_page", &self.active_page)
            .field("selection", &self.selection)
            .field("layers", &self.document.layer_count())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Empty eight-page document on the configured canvas.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::new(config.canvas_size), config)
    }

    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            active_page: 0,
            selection: None,
            histories: std::array::from_fn(|_| History::default()),
            config,
            listeners: Vec::new(),
            feedback: None,
        }
    }

    // -- Observers ------------------------------------------------------------

    /// Register an observer for every edit event.
    pub fn subscribe(&mut self, listener: impl Fn(&EditEvent) + Send + Sync + 'static) {
        self.listeners.push(Arc::new(listener));
    }

    /// Install the feedback hook, invoked only for notable events.
    pub fn with_feedback(mut self, callback: impl Fn(&EditEvent) + Send + Sync + 'static) -> Self {
        self.feedback = Some(Arc::new(callback));
        self
    }

    fn emit(&self, event: EditEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
        if event.is_notable() {
            if let Some(feedback) = &self.feedback {
                feedback(&event);
            }
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn selection(&self) -> Option<LayerId> {
        self.selection
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selection.and_then(|id| self.page().get(id))
    }

    /// Layers of the active page, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.page().layers
    }

    pub fn page_layers(&self, index: usize) -> Option<&[Layer]> {
        self.document.page(index).map(|page| page.layers.as_slice())
    }

    /// Point-in-time copy of a page's layers. Payload bytes are shared, not
    /// copied.
    pub fn page_snapshot(&self, index: usize) -> Option<Vec<Layer>> {
        self.page_layers(index).map(<[Layer]>::to_vec)
    }

    pub fn can_undo(&self) -> bool {
        self.histories[self.active_page].can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.histories[self.active_page].can_redo()
    }

    fn page(&self) -> &Page {
        &self.document.pages[self.active_page]
    }

    fn page_mut(&mut self) -> &mut Page {
        &mut self.document.pages[self.active_page]
    }

    /// Snapshot the active page before a mutation.
    fn register_undo_point(&mut self) {
        let snapshot = self.page().layers.clone();
        self.histories[self.active_page].register(snapshot);
    }

    fn set_selection(&mut self, selection: Option<LayerId>) {
        if self.selection != selection {
            self.selection = selection;
            self.emit(EditEvent::SelectionChanged { selection });
        }
    }

    // -- Creation -------------------------------------------------------------

    fn add_layer(&mut self, layer: Layer) -> LayerId {
        self.register_undo_point();
        let id = layer.id;
        let kind = layer.content.kind();
        self.page_mut().layers.push(layer);
        debug!(page = self.active_page, layer = %id, kind, "Layer added");
        self.emit(EditEvent::LayerAdded {
            page: self.active_page,
            id,
        });
        self.set_selection(Some(id));
        id
    }

    fn default_text(&self, text: String) -> TextContent {
        TextContent::new(text, self.config.default_font_size, self.config.default_text_color)
    }

    /// Placeholder text layer at the canvas centre.
    pub fn add_text(&mut self) -> LayerId {
        let centre = self.document.canvas_size.center();
        self.add_text_at(self.config.default_text.clone(), centre)
    }

    pub fn add_text_at(&mut self, text: impl Into<String>, position: Point) -> LayerId {
        let content = self.default_text(text.into());
        self.add_layer(Layer::text(content, position))
    }

    /// Image layer from encoded bytes, at `position` or the canvas centre.
    pub fn add_image(&mut self, data: impl Into<Blob>, position: Option<Point>) -> LayerId {
        let position = position.unwrap_or_else(|| self.document.canvas_size.center());
        self.add_layer(Layer::image(data, position))
    }

    /// Empty drawing authored against `base_size`, centred on the canvas.
    pub fn add_drawing(&mut self, base_size: Size) -> LayerId {
        let centre = self.document.canvas_size.center();
        self.add_layer(Layer::drawing(Blob::from(Vec::new()), base_size, centre))
    }

    // -- Deletion and selection -----------------------------------------------

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        let Some(index) = self.page().index_of(id) else {
            self.set_selection(None);
            return false;
        };

        self.register_undo_point();
        self.page_mut().layers.remove(index);
        debug!(page = self.active_page, layer = %id, "Layer deleted");
        self.emit(EditEvent::LayerRemoved {
            page: self.active_page,
            id,
        });
        self.set_selection(None);
        true
    }

    /// Select a visible layer of the active page. Anything else is ignored.
    pub fn select(&mut self, id: LayerId) -> bool {
        match self.page().get(id) {
            Some(layer) if !layer.is_hidden => {
                self.set_selection(Some(id));
                true
            }
            _ => {
                debug!(layer = %id, "Ignoring selection of absent or hidden layer");
                false
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    // -- Z-order --------------------------------------------------------------

    fn swap_layers(&mut self, a: usize, b: usize) {
        self.register_undo_point();
        self.page_mut().layers.swap(a, b);
        self.emit(EditEvent::LayersReordered {
            page: self.active_page,
        });
    }

    /// Move the layer at `index` one step up. No-op on the top layer.
    pub fn bring_forward(&mut self, index: usize) -> bool {
        if index >= self.page().len().saturating_sub(1) {
            return false;
        }
        self.swap_layers(index, index + 1);
        true
    }

    /// Move the layer at `index` one step down. No-op on the bottom layer.
    pub fn send_backward(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.page().len() {
            return false;
        }
        self.swap_layers(index - 1, index);
        true
    }

    /// Remove the layer at z-index `from` and reinsert it so it ends up at
    /// z-index `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.page().len();
        if from >= len || to >= len || from == to {
            return false;
        }
        self.register_undo_point();
        let layers = &mut self.page_mut().layers;
        let layer = layers.remove(from);
        layers.insert(to, layer);
        debug!(page = self.active_page, from, to, "Layers reordered");
        self.emit(EditEvent::LayersReordered {
            page: self.active_page,
        });
        true
    }

    /// `reorder` with indices from the top-to-bottom list shown to the user.
    pub fn reorder_visual(&mut self, from: usize, to: usize) -> bool {
        let len = self.page().len();
        match (visual_to_z_index(len, from), visual_to_z_index(len, to)) {
            (Some(from), Some(to)) => self.reorder(from, to),
            _ => false,
        }
    }

    // -- Pages ----------------------------------------------------------------

    /// Switch the active page. Clears the selection.
    pub fn set_page(&mut self, index: usize) -> bool {
        if index >= PAGE_COUNT {
            warn!(index, "Page index out of range, ignoring");
            return false;
        }
        if index == self.active_page {
            return false;
        }
        let from = self.active_page;
        self.active_page = index;
        self.set_selection(None);
        info!(from, to = index, "Active page changed");
        self.emit(EditEvent::PageChanged { from, to: index });
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page((self.active_page + 1).min(PAGE_COUNT - 1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.active_page.saturating_sub(1))
    }

    // -- Layer edits ----------------------------------------------------------

    pub fn toggle_visibility(&mut self, id: LayerId) -> bool {
        if !self.page().contains(id) {
            return false;
        }
        self.register_undo_point();
        let page = self.active_page;
        let Some(layer) = self.page_mut().get_mut(id) else {
            return false;
        };
        layer.is_hidden = !layer.is_hidden;
        let hidden = layer.is_hidden;
        debug!(page, layer = %id, hidden, "Visibility toggled");
        self.emit(EditEvent::VisibilityChanged { page, id, hidden });
        if hidden && self.selection == Some(id) {
            self.set_selection(None);
        }
        true
    }

    /// Apply `edit` to a copy of the layer; commit (with an undo point) only
    /// if the copy differs. The id is never changed.
    ///
    /// A non-finite transform is rejected. A changed scale is held at the
    /// configured floor.
    fn update_layer(&mut self, id: LayerId, edit: impl FnOnce(&mut Layer)) -> bool {
        let min_scale = self.config.min_scale;
        let edited = {
            let Some(current) = self.page().get(id) else {
                return false;
            };
            let mut edited = current.clone();
            edit(&mut edited);
            edited.id = current.id;
            if !edited.transform.is_finite() {
                warn!(layer = %id, transform = ?edited.transform, "Rejecting non-finite transform");
                return false;
            }
            if edited.transform.scale != current.transform.scale {
                edited.transform.scale = edited.transform.scale.max(min_scale);
            }
            if edited.same_value(current) {
                return false;
            }
            edited
        };

        self.register_undo_point();
        if let Some(slot) = self.page_mut().get_mut(id) {
            *slot = edited;
        }
        self.emit(EditEvent::LayerUpdated {
            page: self.active_page,
            id,
        });
        true
    }

    pub fn set_transform(&mut self, id: LayerId, transform: Transform) -> bool {
        self.update_layer(id, |layer| layer.transform = transform)
    }

    /// Multiply the layer's scale by `factor`, clamped to the configured floor.
    pub fn scale_layer(&mut self, id: LayerId, factor: f32) -> bool {
        let min_scale = self.config.min_scale;
        self.update_layer(id, |layer| {
            layer.transform = layer.transform.scaled_by(factor, min_scale);
        })
    }

    pub fn move_layer(&mut self, id: LayerId, position: Point) -> bool {
        self.update_layer(id, |layer| layer.transform.position = position)
    }

    /// Rotate by `delta` on top of the current rotation.
    pub fn rotate_layer(&mut self, id: LayerId, delta: Angle) -> bool {
        self.update_layer(id, |layer| {
            let degrees = layer.transform.rotation.degrees() + delta.degrees();
            layer.transform.rotation = Angle::from_degrees(degrees);
        })
    }

    /// Edit the content or style of a text layer. Ignored for other kinds. A
    /// non-positive font size is rejected and the previous size kept.
    pub fn edit_text(&mut self, id: LayerId, edit: impl FnOnce(&mut TextContent)) -> bool {
        self.update_layer(id, |layer| {
            if let LayerContent::Text(text) = &mut layer.content {
                let previous_size = text.font_size;
                edit(text);
                if !(text.font_size.is_finite() && text.font_size > 0.0) {
                    warn!(font_size = text.font_size, "Rejecting invalid font size");
                    text.font_size = previous_size;
                }
            }
        })
    }

    /// Commit a new ink payload to a drawing layer.
    pub fn set_drawing_data(&mut self, id: LayerId, data: impl Into<Blob>) -> bool {
        let data = data.into();
        self.update_layer(id, |layer| {
            if let LayerContent::Drawing { data: current, .. } = &mut layer.content {
                *current = data;
            }
        })
    }

    // -- History --------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let page = self.active_page;
        if !self.histories[page].undo(&mut self.document.pages[page].layers) {
            return false;
        }
        debug!(page, "Undo");
        self.set_selection(None);
        self.emit(EditEvent::Undone { page });
        true
    }

    pub fn redo(&mut self) -> bool {
        let page = self.active_page;
        if !self.histories[page].redo(&mut self.document.pages[page].layers) {
            return false;
        }
        debug!(page, "Redo");
        self.set_selection(None);
        self.emit(EditEvent::Redone { page });
        true
    }

    // -- Whole document -------------------------------------------------------

    /// Replace the document. Histories are reset and page 0 becomes active.
    pub fn load_document(&mut self, document: Document) {
        self.document = document;
        for history in &mut self.histories {
            history.clear();
        }
        self.active_page = 0;
        self.set_selection(None);
        info!(layers = self.document.layer_count(), "Document loaded into store");
        self.emit(EditEvent::DocumentReplaced);
    }
}
