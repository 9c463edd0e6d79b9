//! Document store and its subsystems
//!
//! [`PageStore`] is the orchestrating state container for one editing
//! session: it owns the block document, delegates to the history, clipboard,
//! multi-select, auto-save and reorder subsystems, and exposes the mutation
//! API used by the UI shell. Every mutation is synchronous; the host drives
//! time-dependent behavior through [`PageStore::tick`].

pub mod autosave;
pub mod clipboard;
pub mod history;
pub mod reorder;
pub mod selection;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::keyboard::EditorCommand;
use crate::models::{Block, BlockSettings, PageDocument, WireBlock};
use crate::storage::KeyValueStore;

pub use autosave::{AutoSave, AutoSaveData, Clock, ManualClock, SystemClock};
pub use clipboard::Clipboard;
pub use history::{History, HistoryError};
pub use reorder::{NullOrderSync, OrderSync, OrderUpdate, ReorderBridge, SyncError};
pub use selection::MultiSelect;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("block not found: {0}")]
    BlockNotFound(String),
    #[error("move out of range: {from} -> {to} with {len} blocks")]
    MoveOutOfRange { from: usize, to: usize, len: usize },
}

/// Error surfaced by the explicit-save collaborator.
#[derive(Error, Debug)]
#[error("save failed: {0}")]
pub struct PersistError(pub String);

/// What an explicit save sends to the persistence collaborator.
#[derive(Clone, Debug)]
pub struct SaveRequest {
    pub page_id: Option<String>,
    pub title: String,
    pub slug: String,
    pub show_in_nav: bool,
    pub published: bool,
    pub blocks: Vec<WireBlock>,
}

/// Per-save options supplied by the UI.
#[derive(Clone, Debug, Default)]
pub struct SaveOptions {
    pub slug: String,
    pub show_in_nav: bool,
    pub published: bool,
}

/// External collaborator that durably persists a finished page. Invoked only
/// on explicit user save.
pub trait PagePersistence {
    fn save_page(&mut self, request: &SaveRequest) -> Result<(), PersistError>;
}

/// The orchestrating state container for one editing session.
pub struct PageStore {
    document: PageDocument,
    /// Single selection driving the settings panel; independent of the
    /// multi-select set.
    selected_block_id: Option<String>,
    dirty: bool,
    history: History,
    selection: MultiSelect,
    clipboard: Clipboard,
    autosave: AutoSave,
    reorder: ReorderBridge,
    order_sync: Box<dyn OrderSync>,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl PageStore {
    /// Store for a fresh, empty page.
    pub fn new(storage: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let clipboard = Clipboard::load(&*storage);
        Self {
            document: PageDocument::new(),
            selected_block_id: None,
            dirty: false,
            history: History::new(),
            selection: MultiSelect::new(),
            clipboard,
            autosave: AutoSave::new(),
            reorder: ReorderBridge::new(),
            order_sync: Box::new(NullOrderSync),
            storage,
            clock,
        }
    }

    /// Store for an existing page snapshot. The initial state becomes the
    /// first history entry.
    pub fn with_document(
        document: PageDocument,
        storage: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut store = Self::new(storage, clock);
        store.document = document;
        crate::models::renumber(&mut store.document.blocks);
        store.history.commit(&store.document.blocks);
        store
    }

    /// Wire the reorder collaborator. Without one, order updates are
    /// dropped with a debug log line.
    pub fn set_order_sync(&mut self, sync: Box<dyn OrderSync>) {
        self.order_sync = sync;
    }

    // --- accessors -------------------------------------------------------

    pub fn document(&self) -> &PageDocument {
        &self.document
    }

    pub fn blocks(&self) -> &[Block] {
        &self.document.blocks
    }

    pub fn title(&self) -> &str {
        &self.document.title
    }

    pub fn page_id(&self) -> Option<&str> {
        self.document.id.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected_block_id.as_deref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected_block_id
            .as_deref()
            .and_then(|id| self.document.block(id))
    }

    pub fn multi_selection(&self) -> &MultiSelect {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn autosave(&self) -> &AutoSave {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut AutoSave {
        &mut self.autosave
    }

    pub fn pending_reorder_batches(&self) -> usize {
        self.reorder.pending_batches()
    }

    // --- committed mutations ---------------------------------------------

    /// Insert a new block of `kind` at `index` (default: end) and select it.
    /// Returns the new block's id.
    pub fn add_block(
        &mut self,
        kind: &str,
        content: Map<String, Value>,
        index: Option<usize>,
    ) -> String {
        let id = self.document.insert(kind, content, index);
        self.selected_block_id = Some(id.clone());
        self.commit();
        id
    }

    /// Merge `patch` into a block's content map.
    pub fn update_block(
        &mut self,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let block = self
            .document
            .block_mut(id)
            .ok_or_else(|| StoreError::BlockNotFound(id.to_string()))?;
        for (key, value) in patch {
            block.content.insert(key, value);
        }
        self.commit();
        Ok(())
    }

    /// Replace a block's style settings.
    pub fn update_block_settings(
        &mut self,
        id: &str,
        settings: BlockSettings,
    ) -> Result<(), StoreError> {
        let block = self
            .document
            .block_mut(id)
            .ok_or_else(|| StoreError::BlockNotFound(id.to_string()))?;
        block.settings = Some(settings);
        self.commit();
        Ok(())
    }

    pub fn delete_block(&mut self, id: &str) -> Result<(), StoreError> {
        self.document
            .remove(id)
            .ok_or_else(|| StoreError::BlockNotFound(id.to_string()))?;
        if self.selected_block_id.as_deref() == Some(id) {
            self.selected_block_id = None;
        }
        self.selection.retain_existing(&self.document.blocks);
        self.commit();
        Ok(())
    }

    /// Clone a block under a fresh id, inserted directly after the source.
    /// The copy becomes the selected block.
    pub fn duplicate_block(&mut self, id: &str) -> Result<String, StoreError> {
        let new_id = self
            .document
            .duplicate(id)
            .ok_or_else(|| StoreError::BlockNotFound(id.to_string()))?;
        self.selected_block_id = Some(new_id.clone());
        self.commit();
        Ok(new_id)
    }

    /// Relocate a block and sync the new order of persisted blocks to the
    /// reorder collaborator, best-effort.
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        if !self.document.move_block(from, to) {
            return Err(StoreError::MoveOutOfRange {
                from,
                to,
                len: self.document.blocks.len(),
            });
        }
        self.commit();
        if let Some(page_id) = self.document.id.clone() {
            self.reorder.enqueue(&page_id, &self.document.blocks);
            self.reorder.flush(&mut *self.order_sync);
        }
        Ok(())
    }

    /// Replace the whole block sequence.
    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        self.document.set_blocks(blocks);
        self.selection.retain_existing(&self.document.blocks);
        self.commit();
    }

    pub fn set_title(&mut self, title: &str) {
        self.document.title = title.to_string();
        self.commit();
    }

    /// Record that the server assigned an id to this page.
    pub fn set_page_id(&mut self, id: Option<String>) {
        self.document.id = id;
    }

    fn commit(&mut self) {
        self.history.commit(&self.document.blocks);
        self.dirty = true;
        self.autosave.schedule();
    }

    // --- history ---------------------------------------------------------

    /// Replace the live blocks wholesale with the previous snapshot.
    pub fn undo(&mut self) -> Result<(), StoreError> {
        let snapshot = self.history.undo()?;
        self.document.set_blocks(snapshot);
        self.selection.retain_existing(&self.document.blocks);
        self.dirty = true;
        self.autosave.schedule();
        Ok(())
    }

    /// Replace the live blocks wholesale with the next snapshot.
    pub fn redo(&mut self) -> Result<(), StoreError> {
        let snapshot = self.history.redo()?;
        self.document.set_blocks(snapshot);
        self.selection.retain_existing(&self.document.blocks);
        self.dirty = true;
        self.autosave.schedule();
        Ok(())
    }

    // --- selection -------------------------------------------------------

    /// Single selection for the settings panel.
    pub fn select_block(&mut self, id: Option<&str>) {
        self.selected_block_id = id.map(String::from);
    }

    pub fn click_block(&mut self, id: &str) {
        self.selection.click(id);
        self.selected_block_id = Some(id.to_string());
    }

    pub fn ctrl_click_block(&mut self, id: &str) {
        self.selection.ctrl_click(id);
        self.selected_block_id = Some(id.to_string());
    }

    pub fn shift_click_block(&mut self, id: &str) {
        self.selection.shift_click(&self.document.blocks, id);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.document.blocks);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.selected_block_id = None;
    }

    /// Ids that clipboard and bulk operations act on: the multi-select set
    /// when non-empty, else the single selected block.
    fn effective_selection(&self) -> Vec<String> {
        if !self.selection.is_empty() {
            return self.selection.selected_ids().to_vec();
        }
        self.selected_block_id.iter().cloned().collect()
    }

    fn selected_blocks_in_order(&self) -> Vec<&Block> {
        let ids = self.effective_selection();
        self.document
            .blocks
            .iter()
            .filter(|b| ids.contains(&b.id))
            .collect()
    }

    // --- clipboard -------------------------------------------------------

    /// Copy the selected blocks. Returns how many were captured.
    pub fn copy_selection(&mut self) -> usize {
        let now = self.clock.now();
        let ids = self.effective_selection();
        let blocks: Vec<&Block> = self
            .document
            .blocks
            .iter()
            .filter(|b| ids.contains(&b.id))
            .collect();
        if blocks.is_empty() {
            return 0;
        }
        let count = blocks.len();
        self.clipboard.copy(&blocks, now, &mut *self.storage);
        count
    }

    /// Cut the selected blocks: capture to the clipboard and remove them
    /// from the document immediately, as one committed mutation.
    pub fn cut_selection(&mut self) -> usize {
        let now = self.clock.now();
        let ids = self.effective_selection();
        let blocks: Vec<&Block> = self
            .document
            .blocks
            .iter()
            .filter(|b| ids.contains(&b.id))
            .collect();
        if blocks.is_empty() {
            return 0;
        }
        let ids: Vec<String> = blocks.iter().map(|b| b.id.clone()).collect();
        self.clipboard.cut(&blocks, now, &mut *self.storage);
        for id in &ids {
            self.document.remove(id);
        }
        self.selected_block_id = None;
        self.selection.clear();
        self.commit();
        ids.len()
    }

    /// Insert fresh copies of every clipboard payload starting at `index`
    /// (default: directly after the selection, else end). The clipboard is
    /// left intact so paste can repeat. Returns how many blocks landed.
    pub fn paste_at(&mut self, index: Option<usize>) -> usize {
        let pasted = self.clipboard.paste_blocks();
        if pasted.is_empty() {
            return 0;
        }
        let start = index
            .unwrap_or_else(|| self.default_paste_index())
            .min(self.document.blocks.len());
        let count = pasted.len();
        let mut last_id = None;
        for (offset, block) in pasted.into_iter().enumerate() {
            last_id = Some(block.id.clone());
            self.document.insert_block(block, Some(start + offset));
        }
        self.selected_block_id = last_id;
        self.commit();
        count
    }

    fn default_paste_index(&self) -> usize {
        self.selected_blocks_in_order()
            .last()
            .and_then(|b| self.document.index_of(&b.id))
            .map(|i| i + 1)
            .unwrap_or(self.document.blocks.len())
    }

    /// Duplicate the whole selection in place: copies land directly after
    /// the last selected block, as one committed mutation.
    pub fn duplicate_selection(&mut self) -> usize {
        let sources: Vec<Block> = self
            .selected_blocks_in_order()
            .into_iter()
            .cloned()
            .collect();
        if sources.is_empty() {
            return 0;
        }
        let insert_at = sources
            .last()
            .and_then(|b| self.document.index_of(&b.id))
            .map(|i| i + 1)
            .unwrap_or(self.document.blocks.len());
        let count = sources.len();
        for (offset, source) in sources.iter().enumerate() {
            let copy = source.clone_with_new_id();
            self.document.insert_block(copy, Some(insert_at + offset));
        }
        self.commit();
        count
    }

    // --- keyboard --------------------------------------------------------

    /// Dispatch a resolved keyboard command.
    pub fn apply_command(&mut self, command: EditorCommand) -> Result<(), StoreError> {
        match command {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::Copy => {
                self.copy_selection();
                Ok(())
            }
            EditorCommand::Cut => {
                self.cut_selection();
                Ok(())
            }
            EditorCommand::Paste => {
                self.paste_at(None);
                Ok(())
            }
            EditorCommand::Duplicate => {
                self.duplicate_selection();
                Ok(())
            }
            EditorCommand::SelectAll => {
                self.select_all();
                Ok(())
            }
            EditorCommand::ClearSelection => {
                self.clear_selection();
                Ok(())
            }
        }
    }

    // --- auto-save and persistence ---------------------------------------

    fn snapshot_data(&self) -> AutoSaveData {
        AutoSaveData {
            document_id: self.document.id.clone(),
            title: self.document.title.clone(),
            blocks: self.document.blocks.clone(),
            timestamp: self.clock.now().timestamp_millis(),
        }
    }

    /// Drive the auto-save scheduler and retry pending reorder batches. The
    /// host calls this from its timer loop. Returns whether a snapshot was
    /// written.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let data = self.snapshot_data();
        let wrote = self
            .autosave
            .tick(&mut *self.storage, &data, self.dirty, now);
        self.reorder.flush(&mut *self.order_sync);
        wrote
    }

    /// Look up a recoverable auto-save snapshot for this document. Call once
    /// at editor mount; a `Some` result should be surfaced to the user as a
    /// recover/discard choice.
    pub fn check_recovery(&mut self) -> Option<AutoSaveData> {
        AutoSave::load_recovery(
            &mut *self.storage,
            self.document.id.as_deref(),
            self.clock.now(),
        )
    }

    /// Replace the live document with a recovered snapshot. History restarts
    /// here; there is no undo past the recovery point.
    pub fn recover(&mut self, data: AutoSaveData) {
        self.document =
            PageDocument::with_blocks(data.document_id, data.title, data.blocks);
        self.selected_block_id = None;
        self.selection.clear();
        self.history.clear();
        self.history.commit(&self.document.blocks);
        self.dirty = true;
        self.autosave.schedule();
    }

    /// Throw away the recoverable snapshot without applying it.
    pub fn discard_recovery(&mut self) {
        AutoSave::clear(&mut *self.storage, self.document.id.as_deref());
    }

    /// Explicit user save through the persistence collaborator. On success
    /// the dirty flag clears and the auto-save snapshot is deleted; on
    /// failure both are left untouched and the error is surfaced.
    pub fn save(
        &mut self,
        persistence: &mut dyn PagePersistence,
        options: SaveOptions,
    ) -> Result<(), PersistError> {
        let request = SaveRequest {
            page_id: self.document.id.clone(),
            title: self.document.title.clone(),
            slug: options.slug,
            show_in_nav: options.show_in_nav,
            published: options.published,
            blocks: self.document.blocks.iter().map(Block::to_wire).collect(),
        };
        persistence.save_page(&request)?;
        self.mark_saved();
        Ok(())
    }

    /// The document is durably saved: clear the dirty flag and delete the
    /// auto-save snapshot it supersedes.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        AutoSave::clear(&mut *self.storage, self.document.id.as_deref());
    }

    /// Host is about to navigate away: flush one last snapshot and report
    /// whether the user should be warned about unsaved changes.
    pub fn exit_guard(&mut self) -> bool {
        let now = self.clock.now();
        let data = self.snapshot_data();
        self.autosave
            .flush_for_exit(&mut *self.storage, &data, self.dirty, now)
    }

    /// Reset for switching to a different page. The clipboard deliberately
    /// survives so blocks can be pasted across documents.
    pub fn reset_for_new_page(&mut self) {
        self.document = PageDocument::new();
        self.selected_block_id = None;
        self.selection.clear();
        self.history.clear();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::DateTime;
    use std::rc::Rc;

    fn manual_clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(
            DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        ))
    }

    fn empty_store() -> PageStore {
        PageStore::new(Box::new(MemoryStore::new()), Box::new(manual_clock()))
    }

    #[test]
    fn test_add_block_scenario() {
        // Empty document, one committed addition.
        let mut store = empty_store();
        let id = store.add_block("hero", Map::new(), None);

        assert_eq!(store.blocks().len(), 1);
        assert_eq!(store.blocks()[0].order, 0);
        assert_eq!(store.blocks()[0].kind, "hero");
        assert_eq!(store.history_len(), 1);
        assert!(store.has_unsaved_changes());
        assert_eq!(store.selected_block_id(), Some(id.as_str()));
    }

    #[test]
    fn test_update_block_merges_content() {
        let mut store = empty_store();
        let id = store.add_block("hero", Map::new(), None);
        let mut patch = Map::new();
        patch.insert("headline".into(), "Hi".into());
        store.update_block(&id, patch).unwrap();
        assert_eq!(
            store.blocks()[0].content.get("headline"),
            Some(&"Hi".into())
        );
        assert!(matches!(
            store.update_block("missing", Map::new()),
            Err(StoreError::BlockNotFound(_))
        ));
    }

    #[test]
    fn test_delete_clears_selection_of_deleted() {
        let mut store = empty_store();
        let id = store.add_block("hero", Map::new(), None);
        store.click_block(&id);
        store.delete_block(&id).unwrap();
        assert!(store.selected_block_id().is_none());
        assert!(store.multi_selection().is_empty());
        assert!(store.blocks().is_empty());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut store = empty_store();
        store.add_block("hero", Map::new(), None);
        store.add_block("text", Map::new(), None);
        let after = store.blocks().to_vec();

        store.undo().unwrap();
        assert_eq!(store.blocks().len(), 1);
        store.redo().unwrap();
        assert_eq!(store.blocks(), after.as_slice());
    }

    #[test]
    fn test_undo_at_boundary_reports_error() {
        let mut store = empty_store();
        assert!(matches!(
            store.undo(),
            Err(StoreError::History(HistoryError::NothingToUndo))
        ));
    }

    #[test]
    fn test_undo_does_not_clobber_redo_branch() {
        let mut store = empty_store();
        store.add_block("a", Map::new(), None);
        store.add_block("b", Map::new(), None);
        store.undo().unwrap();
        // Undo itself must not commit; redo is still available.
        assert!(store.can_redo());
        store.redo().unwrap();
        assert_eq!(store.blocks().len(), 2);
    }

    #[test]
    fn test_move_block_emits_reorder_for_persisted_ids() {
        use std::cell::RefCell;

        #[derive(Default)]
        struct SharedSync(Rc<RefCell<Vec<(String, Vec<OrderUpdate>)>>>);
        impl OrderSync for SharedSync {
            fn sync_order(
                &mut self,
                page_id: &str,
                updates: &[OrderUpdate],
            ) -> Result<(), SyncError> {
                self.0
                    .borrow_mut()
                    .push((page_id.to_string(), updates.to_vec()));
                Ok(())
            }
        }

        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut document = PageDocument::new();
        document.id = Some("9".to_string());
        let mut store = PageStore::with_document(
            document,
            Box::new(MemoryStore::new()),
            Box::new(manual_clock()),
        );
        store.set_order_sync(Box::new(SharedSync(calls.clone())));

        store.add_block("hero", Map::new(), None);
        store.add_block("text", Map::new(), None);
        // Simulate both blocks having been persisted.
        store.document.blocks[0].id = "101".to_string();
        store.document.blocks[1].id = "102".to_string();

        store.move_block(1, 0).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "9");
        assert_eq!(calls[0].1.len(), 2);
        assert_eq!(calls[0].1[0], OrderUpdate { id: "102".into(), order: 0 });
        assert_eq!(calls[0].1[1], OrderUpdate { id: "101".into(), order: 1 });
        // Contents swapped, orders renumbered.
        assert_eq!(store.blocks()[0].id, "102");
        assert_eq!(store.blocks()[0].order, 0);
        assert_eq!(store.blocks()[1].order, 1);
    }

    #[test]
    fn test_copy_paste_count_law() {
        let mut store = empty_store();
        let a = store.add_block("hero", Map::new(), None);
        store.add_block("text", Map::new(), None);

        store.click_block(&a);
        assert_eq!(store.copy_selection(), 1);
        let before = store.blocks().len();
        assert_eq!(store.paste_at(None), 1);
        assert_eq!(store.blocks().len(), before + 1);
        assert_eq!(store.clipboard().count(), 1);
        assert!(!store.clipboard().is_cut());
    }

    #[test]
    fn test_cut_paste_restores_count() {
        let mut store = empty_store();
        let a = store.add_block("hero", Map::new(), None);
        store.add_block("text", Map::new(), None);
        let before = store.blocks().len();

        store.click_block(&a);
        store.cut_selection();
        assert_eq!(store.blocks().len(), before - 1);
        store.paste_at(Some(0));
        assert_eq!(store.blocks().len(), before);
        // Fresh id on the pasted copy.
        assert_ne!(store.blocks()[0].id, a);
        assert_eq!(store.blocks()[0].kind, "hero");
    }

    #[test]
    fn test_paste_lands_after_selected_block() {
        // Copy A, select B, paste: the clone of A appears directly after B.
        let mut store = empty_store();
        let a = store.add_block("hero", Map::new(), None);
        let b = store.add_block("text", Map::new(), None);
        store.add_block("image", Map::new(), None);

        store.click_block(&a);
        store.copy_selection();
        store.click_block(&b);
        store.paste_at(None);

        assert_eq!(store.blocks().len(), 4);
        assert_eq!(store.blocks()[2].kind, "hero");
        assert_ne!(store.blocks()[2].id, a);
    }

    #[test]
    fn test_duplicate_selection_single_commit() {
        let mut store = empty_store();
        let a = store.add_block("hero", Map::new(), None);
        let b = store.add_block("text", Map::new(), None);
        let history_before = store.history_len();

        store.click_block(&a);
        store.ctrl_click_block(&b);
        assert_eq!(store.duplicate_selection(), 2);

        assert_eq!(store.blocks().len(), 4);
        assert_eq!(store.blocks()[2].kind, "hero");
        assert_eq!(store.blocks()[3].kind, "text");
        assert_eq!(store.history_len(), history_before + 1);
    }

    #[test]
    fn test_title_edit_is_committed_and_dirties() {
        let mut store = empty_store();
        store.add_block("hero", Map::new(), None);
        store.mark_saved();
        assert!(!store.has_unsaved_changes());
        store.set_title("Landing");
        assert!(store.has_unsaved_changes());
        assert_eq!(store.title(), "Landing");
    }

    #[test]
    fn test_save_success_clears_dirty_and_autosave() {
        struct OkPersistence {
            last: Option<SaveRequest>,
        }
        impl PagePersistence for OkPersistence {
            fn save_page(&mut self, request: &SaveRequest) -> Result<(), PersistError> {
                self.last = Some(request.clone());
                Ok(())
            }
        }

        let clock = manual_clock();
        let mut store = PageStore::new(Box::new(MemoryStore::new()), Box::new(clock.clone()));
        store.add_block("hero", Map::new(), None);
        store.tick();

        let mut persistence = OkPersistence { last: None };
        store
            .save(
                &mut persistence,
                SaveOptions {
                    slug: "landing".into(),
                    show_in_nav: true,
                    published: false,
                },
            )
            .unwrap();

        assert!(!store.has_unsaved_changes());
        let request = persistence.last.unwrap();
        assert_eq!(request.slug, "landing");
        assert_eq!(request.blocks.len(), 1);
        // Auto-save snapshot superseded by the durable save.
        assert!(store.check_recovery().is_none());
    }

    #[test]
    fn test_save_failure_leaves_dirty() {
        struct FailingPersistence;
        impl PagePersistence for FailingPersistence {
            fn save_page(&mut self, _request: &SaveRequest) -> Result<(), PersistError> {
                Err(PersistError("503".to_string()))
            }
        }

        let mut store = empty_store();
        store.add_block("hero", Map::new(), None);
        let result = store.save(&mut FailingPersistence, SaveOptions::default());
        assert!(result.is_err());
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_reset_for_new_page_keeps_clipboard() {
        let mut store = empty_store();
        let a = store.add_block("hero", Map::new(), None);
        store.click_block(&a);
        store.copy_selection();

        store.reset_for_new_page();
        assert!(store.blocks().is_empty());
        assert!(!store.has_unsaved_changes());
        assert_eq!(store.history_len(), 0);
        assert_eq!(store.clipboard().count(), 1);
    }

    #[test]
    fn test_apply_command_routes() {
        let mut store = empty_store();
        let a = store.add_block("hero", Map::new(), None);
        store.click_block(&a);
        store.apply_command(EditorCommand::Copy).unwrap();
        store.apply_command(EditorCommand::Paste).unwrap();
        assert_eq!(store.blocks().len(), 2);
        store.apply_command(EditorCommand::SelectAll).unwrap();
        assert_eq!(store.multi_selection().len(), 2);
        store.apply_command(EditorCommand::ClearSelection).unwrap();
        assert!(store.multi_selection().is_empty());
    }
}
