// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded undo/redo history over snapshot values.

use std::collections::VecDeque;

use storywerk_core::HISTORY_DEPTH;

/// Two bounded stacks of snapshots. The oldest entry is dropped once a stack
/// would exceed its depth.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    depth: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    pub fn new(depth: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(depth + 1),
            future: VecDeque::with_capacity(depth + 1),
            depth,
        }
    }

    /// Record the pre-mutation state. Discards the redo branch.
    pub fn register(&mut self, before: T) {
        self.future.clear();
        push_bounded(&mut self.past, before, self.depth);
    }

    /// Swap `current` for the most recent snapshot. `false`, with `current`
    /// untouched, when there is nothing to undo.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        push_bounded(&mut self.future, replaced, self.depth);
        true
    }

    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.future.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        push_bounded(&mut self.past, replaced, self.depth);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

fn push_bounded<T>(stack: &mut VecDeque<T>, value: T, depth: usize) {
    stack.push_back(value);
    while stack.len() > depth {
        stack.pop_front();
    }
}
