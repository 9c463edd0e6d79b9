//! Render-time evaluation for stored blocks
//!
//! Turns a stored block into a concrete renderable: dispatch to a typed
//! content schema, device/schedule visibility gating, and entrance-animation
//! state.

pub mod animation;
pub mod dispatch;
pub mod visibility;

// Re-export commonly used types
pub use animation::{AnimationEngine, AnimationStyle, SCROLL_REVEAL_THRESHOLD};
pub use dispatch::{resolve_block, resolve_document, RenderKind, RenderedBlock};
pub use visibility::should_show;
