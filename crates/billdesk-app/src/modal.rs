// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ModalKind;

/// Open overlays in the order they were opened; the last one is on top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalStack {
    open: Vec<ModalKind>,
}

impl ModalStack {
    /// Returns false when the modal was already open.
    pub fn open(&mut self, kind: ModalKind) -> bool {
        if self.is_open(kind) {
            return false;
        }
        self.open.push(kind);
        true
    }

    /// Returns false when the modal was not open.
    pub fn close(&mut self, kind: ModalKind) -> bool {
        let Some(index) = self.open.iter().position(|open| *open == kind) else {
            return false;
        };
        self.open.remove(index);
        true
    }

    pub fn dismiss_top(&mut self) -> Option<ModalKind> {
        self.open.pop()
    }

    /// Closes everything, topmost first.
    pub fn close_all(&mut self) -> Vec<ModalKind> {
        let mut closed = std::mem::take(&mut self.open);
        closed.reverse();
        closed
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.open.contains(&kind)
    }

    pub fn top(&self) -> Option<ModalKind> {
        self.open.last().copied()
    }

    pub fn open_modals(&self) -> &[ModalKind] {
        &self.open
    }

    /// Page scrolling is suppressed while any overlay is open.
    pub fn scroll_locked(&self) -> bool {
        !self.open.is_empty()
    }
}
