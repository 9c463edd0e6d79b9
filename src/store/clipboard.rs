//! Clipboard manager
//!
//! Holds detached block payloads (kind/variant/content/settings, never
//! id/order) for paste. The clipboard is persisted through the key-value
//! capability under its own key, independent of any one document, so a copy
//! in one page can be pasted into another, and it survives restarts. Paste
//! never clears the clipboard; repeated paste is supported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{generate_block_id, Block, BlockSettings};
use crate::storage::KeyValueStore;

pub const CLIPBOARD_KEY: &str = "page-builder-clipboard";

/// One detached block payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClipboardPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BlockSettings>,
}

impl ClipboardPayload {
    fn from_block(block: &Block) -> Self {
        Self {
            kind: block.kind.clone(),
            variant: block.variant.clone(),
            content: block.content.clone(),
            settings: block.settings.clone(),
        }
    }

    /// Materialize a fresh block (new transient id) from this payload.
    fn to_block(&self) -> Block {
        Block {
            id: generate_block_id(),
            kind: self.kind.clone(),
            variant: self.variant.clone(),
            content: self.content.clone(),
            order: 0,
            settings: self.settings.clone(),
            animation: None,
            visibility: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
struct ClipboardState {
    entries: Vec<ClipboardPayload>,
    cut: bool,
    copied_at: Option<DateTime<Utc>>,
}

/// Process-wide clipboard with storage-backed persistence.
#[derive(Debug, Default)]
pub struct Clipboard {
    state: ClipboardState,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the clipboard persisted by a previous session, if any.
    /// Malformed stored data is discarded.
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        let state = storage
            .get(CLIPBOARD_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(state) => Some(state),
                Err(err) => {
                    log::warn!("discarding malformed persisted clipboard: {}", err);
                    None
                }
            })
            .unwrap_or_default();
        Self { state }
    }

    /// Capture payloads for a copy. No-op on an empty slice.
    pub fn copy(
        &mut self,
        blocks: &[&Block],
        now: DateTime<Utc>,
        storage: &mut dyn KeyValueStore,
    ) {
        self.capture(blocks, false, now, storage);
    }

    /// Capture payloads for a cut. The caller is responsible for removing
    /// the blocks from the document immediately.
    pub fn cut(
        &mut self,
        blocks: &[&Block],
        now: DateTime<Utc>,
        storage: &mut dyn KeyValueStore,
    ) {
        self.capture(blocks, true, now, storage);
    }

    fn capture(
        &mut self,
        blocks: &[&Block],
        cut: bool,
        now: DateTime<Utc>,
        storage: &mut dyn KeyValueStore,
    ) {
        if blocks.is_empty() {
            return;
        }
        self.state = ClipboardState {
            entries: blocks
                .iter()
                .map(|b| ClipboardPayload::from_block(b))
                .collect(),
            cut,
            copied_at: Some(now),
        };
        self.persist(storage);
    }

    /// Fresh blocks (new ids, order unset) for every clipboard payload.
    /// The clipboard itself is left intact.
    pub fn paste_blocks(&self) -> Vec<Block> {
        self.state.entries.iter().map(|p| p.to_block()).collect()
    }

    pub fn clear(&mut self, storage: &mut dyn KeyValueStore) {
        self.state = ClipboardState::default();
        storage.remove(CLIPBOARD_KEY);
    }

    pub fn count(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    pub fn is_cut(&self) -> bool {
        self.state.cut
    }

    pub fn copied_at(&self) -> Option<DateTime<Utc>> {
        self.state.copied_at
    }

    fn persist(&self, storage: &mut dyn KeyValueStore) {
        match serde_json::to_string(&self.state) {
            Ok(raw) => {
                if let Err(err) = storage.set(CLIPBOARD_KEY, &raw) {
                    log::warn!("failed to persist clipboard: {}", err);
                }
            }
            Err(err) => log::warn!("failed to serialize clipboard: {}", err),
        }
    }
}
