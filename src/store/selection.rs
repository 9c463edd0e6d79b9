//! Multi-select controller
//!
//! Tracks selected block ids plus the anchor (last explicitly clicked id)
//! used for shift-click range selection. Purely id/index bookkeeping: ranges
//! are resolved against the live document order at click time, so selection
//! stays correct across reorders.

use crate::models::Block;

#[derive(Clone, Debug, Default)]
pub struct MultiSelect {
    selected: Vec<String>,
    anchor: Option<String>,
}

impl MultiSelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain click: selection becomes exactly this block, anchor moves here.
    pub fn click(&mut self, id: &str) {
        self.selected = vec![id.to_string()];
        self.anchor = Some(id.to_string());
    }

    /// Ctrl/Cmd-click: toggle membership, anchor moves here.
    pub fn ctrl_click(&mut self, id: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.to_string());
        }
        self.anchor = Some(id.to_string());
    }

    /// Shift-click: selection becomes the contiguous range between the
    /// anchor and the clicked block in current document order, inclusive and
    /// independent of which end was clicked first. The anchor is unchanged.
    /// Without an anchor this degrades to a plain click.
    pub fn shift_click(&mut self, blocks: &[Block], id: &str) {
        let Some(anchor) = self.anchor.clone() else {
            self.click(id);
            return;
        };
        let anchor_index = blocks.iter().position(|b| b.id == anchor);
        let clicked_index = blocks.iter().position(|b| b.id == id);
        let (Some(a), Some(c)) = (anchor_index, clicked_index) else {
            self.click(id);
            return;
        };
        let (lo, hi) = (a.min(c), a.max(c));
        self.selected = blocks[lo..=hi].iter().map(|b| b.id.clone()).collect();
    }

    pub fn select_all(&mut self, blocks: &[Block]) {
        self.selected = blocks.iter().map(|b| b.id.clone()).collect();
        self.anchor = blocks.last().map(|b| b.id.clone());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop ids that no longer exist in the document, e.g. after undo.
    pub fn retain_existing(&mut self, blocks: &[Block]) {
        self.selected
            .retain(|id| blocks.iter().any(|b| &b.id == id));
        if let Some(anchor) = &self.anchor {
            if !blocks.iter().any(|b| &b.id == anchor) {
                self.anchor = None;
            }
        }
    }
}
