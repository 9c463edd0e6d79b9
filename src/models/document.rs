//! Page document: an ordered block sequence plus title and id
//!
//! All sequence transforms renumber `order` so that `blocks[i].order == i`
//! holds after every mutation, with no gaps and no duplicates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::block::Block;

/// The full ordered block sequence for one editable page.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PageDocument {
    /// `None` until the page has been persisted for the first time.
    pub id: Option<String>,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl PageDocument {
    /// Create an empty untitled document.
    pub fn new() -> Self {
        Self {
            id: None,
            title: "Untitled Page".to_string(),
            blocks: Vec::new(),
        }
    }

    /// Create a document from an existing snapshot, renumbering defensively.
    pub fn with_blocks(id: Option<String>, title: String, mut blocks: Vec<Block>) -> Self {
        renumber(&mut blocks);
        Self { id, title, blocks }
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Insert a block of the given kind at `index` (default: end). Returns
    /// the id of the new block.
    pub fn insert(
        &mut self,
        kind: &str,
        content: Map<String, Value>,
        index: Option<usize>,
    ) -> String {
        let at = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
        let block = Block::new(kind, content, at);
        let id = block.id.clone();
        self.blocks.insert(at, block);
        renumber(&mut self.blocks);
        id
    }

    /// Insert an already-built block at `index` (default: end).
    pub fn insert_block(&mut self, block: Block, index: Option<usize>) {
        let at = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
        self.blocks.insert(at, block);
        renumber(&mut self.blocks);
    }

    /// Remove the block with the given id. Returns the removed block.
    pub fn remove(&mut self, id: &str) -> Option<Block> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        renumber(&mut self.blocks);
        Some(removed)
    }

    /// Clone the block (fresh id) and insert the copy immediately after the
    /// source. Returns the id of the copy.
    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        let index = self.index_of(id)?;
        let copy = self.blocks[index].clone_with_new_id();
        let new_id = copy.id.clone();
        self.blocks.insert(index + 1, copy);
        renumber(&mut self.blocks);
        Some(new_id)
    }

    /// Relocate one block from `from` to `to`, renumbering all. Out-of-range
    /// indices are a no-op.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        if from >= self.blocks.len() || to >= self.blocks.len() {
            return false;
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        renumber(&mut self.blocks);
        true
    }

    /// Replace the whole block sequence, renumbering.
    pub fn set_blocks(&mut self, mut blocks: Vec<Block>) {
        renumber(&mut blocks);
        self.blocks = blocks;
    }
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite every block's `order` to its index in document order.
pub fn renumber(blocks: &mut [Block]) {
    for (index, block) in blocks.iter_mut().enumerate() {
        block.order = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(kinds: &[&str]) -> PageDocument {
        let mut doc = PageDocument::new();
        for kind in kinds {
            doc.insert(kind, Map::new(), None);
        }
        doc
    }

    fn assert_order_invariant(doc: &PageDocument) {
        for (i, block) in doc.blocks.iter().enumerate() {
            assert_eq!(block.order, i, "order invariant broken at index {}", i);
        }
    }

    #[test]
    fn test_insert_at_end_and_middle() {
        let mut doc = doc_with(&["hero", "text"]);
        doc.insert("image", Map::new(), Some(1));
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[1].kind, "image");
        assert_order_invariant(&doc);
    }

    #[test]
    fn test_remove_renumbers() {
        let mut doc = doc_with(&["hero", "text", "image"]);
        let id = doc.blocks[1].id.clone();
        let removed = doc.remove(&id).unwrap();
        assert_eq!(removed.kind, "text");
        assert_eq!(doc.blocks.len(), 2);
        assert_order_invariant(&doc);
    }

    #[test]
    fn test_remove_unknown_id_is_none() {
        let mut doc = doc_with(&["hero"]);
        assert!(doc.remove("missing").is_none());
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_duplicate_inserts_after_source() {
        let mut doc = doc_with(&["hero", "text"]);
        let source_id = doc.blocks[0].id.clone();
        let copy_id = doc.duplicate(&source_id).unwrap();
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[1].id, copy_id);
        assert_eq!(doc.blocks[1].kind, "hero");
        assert_ne!(doc.blocks[0].id, doc.blocks[1].id);
        assert_order_invariant(&doc);
    }

    #[test]
    fn test_move_block_swaps_contents() {
        let mut doc = doc_with(&["hero", "text"]);
        let first = doc.blocks[0].id.clone();
        assert!(doc.move_block(1, 0));
        assert_eq!(doc.blocks[1].id, first);
        assert_order_invariant(&doc);
    }

    #[test]
    fn test_move_block_out_of_range() {
        let mut doc = doc_with(&["hero"]);
        assert!(!doc.move_block(0, 5));
        assert!(!doc.move_block(5, 0));
    }

    #[test]
    fn test_order_invariant_across_mutation_sequence() {
        let mut doc = PageDocument::new();
        for kind in ["hero", "text", "image", "quote", "video"] {
            doc.insert(kind, Map::new(), None);
            assert_order_invariant(&doc);
        }
        let id = doc.blocks[2].id.clone();
        doc.duplicate(&id);
        assert_order_invariant(&doc);
        doc.remove(&id);
        assert_order_invariant(&doc);
        doc.move_block(0, 3);
        assert_order_invariant(&doc);
        doc.move_block(3, 1);
        assert_order_invariant(&doc);
    }

    #[test]
    fn test_with_blocks_repairs_orders() {
        let mut a = Block::new("hero", Map::new(), 9);
        a.order = 9;
        let b = Block::new("text", Map::new(), 9);
        let doc = PageDocument::with_blocks(None, "p".into(), vec![a, b]);
        assert_order_invariant(&doc);
    }
}
