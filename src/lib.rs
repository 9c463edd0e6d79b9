//! Page Builder Document Engine
//!
//! Core engine for block-based page editing: an ordered block document with
//! bounded undo/redo history, multi-select, a persistent clipboard, debounced
//! auto-save with crash recovery, and render-time dispatch with visibility
//! gating and entrance animations. Host-agnostic: storage, time and
//! persistence are injected capabilities.

pub mod keyboard;
pub mod models;
pub mod render;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use models::{Block, BlockContent, BlockSettings, PageDocument, WireBlock};
pub use storage::{DirStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{
    AutoSaveData, Clock, ManualClock, PagePersistence, PageStore, PersistError, SaveOptions,
    SaveRequest, StoreError, SystemClock,
};
