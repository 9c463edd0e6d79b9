//! Render dispatcher
//!
//! Resolves a stored block to a concrete renderable description: normalizes
//! content, picks the effective kind (template variant over container kind),
//! decodes the typed content schema, and falls back to a generic text
//! renderer or an explicit "unknown block kind" placeholder. Never fails and
//! never skips a block silently.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::content::ParagraphContent;
use crate::models::{Block, BlockContent, BlockSettings};

/// What a block should render as.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub enum RenderKind {
    /// A recognized kind with decoded content.
    Known(String),
    /// Unrecognized kind that carried textual content; rendered by the
    /// generic text template.
    GenericText,
    /// Unrecognized kind with no usable content; rendered as a diagnostic
    /// placeholder so the document keeps rendering.
    UnknownPlaceholder { kind: String },
}

/// Fully resolved block ready for a presentation template.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RenderedBlock {
    pub id: String,
    pub kind: RenderKind,
    pub content: BlockContent,
    pub settings: BlockSettings,
}

/// Resolve one stored block.
pub fn resolve_block(block: &Block) -> RenderedBlock {
    let effective = block.effective_kind().to_string();
    let content = BlockContent::decode(&effective, &block.content);
    let kind = match &content {
        BlockContent::Opaque(_) => match content.opaque_text() {
            Some(_) => RenderKind::GenericText,
            None => {
                log::warn!("no renderer for block kind '{}', using placeholder", effective);
                RenderKind::UnknownPlaceholder {
                    kind: effective.clone(),
                }
            }
        },
        _ => RenderKind::Known(effective.clone()),
    };
    let content = match (&kind, content) {
        (RenderKind::GenericText, opaque) => {
            BlockContent::Paragraph(ParagraphContent {
                text: opaque.opaque_text().unwrap_or_default().to_string(),
                html: None,
            })
        }
        (_, content) => content,
    };
    RenderedBlock {
        id: block.id.clone(),
        kind,
        content,
        settings: block.settings.clone().unwrap_or_default(),
    }
}

/// Resolve a whole document in order. Blocks are never skipped here;
/// visibility gating is a separate, viewport-dependent decision.
pub fn resolve_document(blocks: &[Block]) -> Vec<RenderedBlock> {
    blocks.iter().map(resolve_block).collect()
}

/// Resolve a raw wire value the way a preview endpoint receives it: content
/// may be a JSON-encoded string and malformed input must not take the page
/// down.
pub fn resolve_raw_content(kind: &str, raw_content: &Value) -> BlockContent {
    let map: Map<String, Value> = crate::models::normalize_content(raw_content);
    BlockContent::decode(kind, &map)
}
