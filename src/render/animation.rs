//! Animation engine
//!
//! Maps a block's declarative animation config to a two-state style
//! descriptor and tracks the per-block reveal flag that decides which state
//! applies. The presentation layer animates between the states; the engine
//! only says what each state looks like and when the flip occurs.
//!
//! Reveal semantics per trigger:
//! - on-load: revealed from the start.
//! - on-scroll: revealed the first time the block intersects the viewport by
//!   at least 10%; one-shot, never un-revealed.
//! - on-hover: tracks pointer-over state directly, reversible.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{AnimationConfig, AnimationKind, AnimationTrigger, Block};

/// Intersection ratio at which an on-scroll animation fires.
pub const SCROLL_REVEAL_THRESHOLD: f32 = 0.1;

/// One visual state the presentation layer can apply.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AnimationStyle {
    pub opacity: f32,
    /// Pixels.
    pub translate_x: f32,
    /// Pixels.
    pub translate_y: f32,
    pub scale: f32,
    /// CSS-style transition shorthand carrying duration, easing and delay.
    pub transition: String,
}

impl AnimationStyle {
    fn finished(config: &AnimationConfig) -> Self {
        Self {
            opacity: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            transition: transition_of(config),
        }
    }

    fn hidden(config: &AnimationConfig) -> Self {
        let mut style = Self::finished(config);
        match config.kind {
            AnimationKind::None => {}
            AnimationKind::FadeIn => style.opacity = 0.0,
            AnimationKind::SlideUp => {
                style.opacity = 0.0;
                style.translate_y = 30.0;
            }
            AnimationKind::SlideDown => {
                style.opacity = 0.0;
                style.translate_y = -30.0;
            }
            AnimationKind::SlideLeft => {
                style.opacity = 0.0;
                style.translate_x = 30.0;
            }
            AnimationKind::SlideRight => {
                style.opacity = 0.0;
                style.translate_x = -30.0;
            }
            AnimationKind::ZoomIn => {
                style.opacity = 0.0;
                style.scale = 0.9;
            }
        }
        style
    }
}

fn transition_of(config: &AnimationConfig) -> String {
    format!(
        "all {}ms {} {}ms",
        config.duration, config.easing, config.delay
    )
}

/// Per-block reveal flag tracker plus style resolution.
#[derive(Debug, Default)]
pub struct AnimationEngine {
    revealed: HashMap<String, bool>,
    hovered: HashSet<String>,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block instance entering the view tree. Seeds the reveal
    /// flag according to its trigger.
    pub fn block_mounted(&mut self, block: &Block) {
        let Some(config) = active_config(block) else {
            return;
        };
        let initial = matches!(config.trigger, AnimationTrigger::OnLoad);
        self.revealed.insert(block.id.clone(), initial);
    }

    /// Viewport intersection callback for on-scroll triggers. One-shot: once
    /// revealed, scrolling back out never hides the block again.
    pub fn intersection(&mut self, block_id: &str, ratio: f32) {
        if ratio >= SCROLL_REVEAL_THRESHOLD {
            self.revealed.insert(block_id.to_string(), true);
        }
    }

    /// Pointer-over state for on-hover triggers. Reversible.
    pub fn set_hover(&mut self, block_id: &str, hovered: bool) {
        if hovered {
            self.hovered.insert(block_id.to_string());
        } else {
            self.hovered.remove(block_id);
        }
    }

    /// Forget per-instance state, e.g. when a document is unloaded.
    pub fn reset(&mut self) {
        self.revealed.clear();
        self.hovered.clear();
    }

    /// Current style for a block, or `None` when the block renders in its
    /// final state with no transform (animation disabled or type "none").
    pub fn style_for(&self, block: &Block) -> Option<AnimationStyle> {
        let config = active_config(block)?;
        let revealed = match config.trigger {
            AnimationTrigger::OnLoad => {
                self.revealed.get(&block.id).copied().unwrap_or(true)
            }
            AnimationTrigger::OnScroll => {
                self.revealed.get(&block.id).copied().unwrap_or(false)
            }
            AnimationTrigger::OnHover => self.hovered.contains(&block.id),
        };
        Some(if revealed {
            AnimationStyle::finished(config)
        } else {
            AnimationStyle::hidden(config)
        })
    }
}

fn active_config(block: &Block) -> Option<&AnimationConfig> {
    let config = block.animation.as_ref()?;
    if !config.enabled || config.kind == AnimationKind::None {
        return None;
    }
    Some(config)
}
