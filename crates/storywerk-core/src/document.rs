// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — a fixed array of pages, each an ordered stack of layers.

use crate::layer::{Layer, LayerId, Size};

/// Number of pages in every document. Fixed by product decision.
pub const PAGE_COUNT: usize = 8;

/// Logical authoring canvas used when a document does not say otherwise.
pub const DEFAULT_CANVAS_SIZE: Size = Size::new(1080.0, 1920.0);

/// An ordered list of layers. Index 0 is the bottom of the z-order.
///
/// Layer ids are unique within a page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub layers: Vec<Layer>,
}

impl Page {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in paint order with hidden ones filtered out.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| !l.is_hidden)
    }
}

/// A whole multi-page document.
#[derive(Debug, Clone)]
pub struct Document {
    pub pages: [Page; PAGE_COUNT],
    /// Logical coordinate space layer positions are expressed in.
    pub canvas_size: Size,
}

impl Document {
    pub fn new(canvas_size: Size) -> Self {
        Self {
            pages: Default::default(),
            canvas_size,
        }
    }

    /// Page at `index`, or `None` when out of range.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn layer_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Full value comparison of every page and layer.
    pub fn same_value(&self, other: &Document) -> bool {
        self.canvas_size == other.canvas_size
            && self.pages.iter().zip(other.pages.iter()).all(|(a, b)| {
                a.len() == b.len()
                    && a.layers
                        .iter()
                        .zip(b.layers.iter())
                        .all(|(x, y)| x.same_value(y))
            })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE)
    }
}
