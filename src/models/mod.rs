//! Data models for the page builder engine
//!
//! This module contains the block and document structures and the typed
//! content schemas used by the render dispatcher.

pub mod block;
pub mod content;
pub mod document;

// Re-export commonly used types
pub use block::{
    generate_block_id, normalize_content, AnimationConfig, AnimationKind,
    AnimationTrigger, Block, BlockSettings, DeviceClass, Schedule, VisibilityRule,
    WireBlock, TRANSIENT_ID_PREFIX,
};
pub use content::BlockContent;
pub use document::{renumber, PageDocument};
