//! Core block data structures for the page builder engine
//!
//! A page document is an ordered sequence of typed blocks. Each block carries
//! an opaque content map whose shape depends on the block kind, plus optional
//! style settings, an animation config and a visibility rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Prefix used for locally generated block ids. Anything carrying this
/// prefix has never been saved; ids issued by the persistence collaborator
/// never do.
pub const TRANSIENT_ID_PREFIX: &str = "block_";

/// One content unit in a page document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Block {
    /// Unique within a document, stable across reorders.
    pub id: String,

    /// Container kind: how the block is wrapped and stored.
    #[serde(rename = "type")]
    pub kind: String,

    /// Template variant: which renderer draws it. Lifted out of the legacy
    /// `_originalType` content key on ingestion; `None` means the container
    /// kind is also the render kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Open string-keyed content map; shape is determined by the effective
    /// kind. Always an object after normalization.
    #[serde(default)]
    pub content: Map<String, Value>,

    /// Index of this block in document order. `blocks[i].order == i` holds
    /// after every mutation.
    pub order: usize,

    /// Style overrides, orthogonal to content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BlockSettings>,

    /// Entrance animation config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationConfig>,

    /// Device/schedule gate deciding whether the block renders at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityRule>,
}

impl Block {
    /// Create a new transient block of the given kind.
    pub fn new(kind: &str, content: Map<String, Value>, order: usize) -> Self {
        Self {
            id: generate_block_id(),
            kind: kind.to_string(),
            variant: None,
            content,
            order,
            settings: None,
            animation: None,
            visibility: None,
        }
    }

    /// The kind used for renderer lookup: the template variant when present,
    /// else the container kind.
    pub fn effective_kind(&self) -> &str {
        self.variant.as_deref().unwrap_or(&self.kind)
    }

    /// Whether this block's id was issued by the persistence collaborator.
    /// Only locally generated ids carry the transient prefix, so the check
    /// makes no assumption about the backend's key scheme.
    pub fn is_persisted(&self) -> bool {
        !self.id.starts_with(TRANSIENT_ID_PREFIX)
    }

    /// Clone this block under a fresh transient id.
    pub fn clone_with_new_id(&self) -> Self {
        let mut copy = self.clone();
        copy.id = generate_block_id();
        copy
    }

    /// Build a block from its wire shape, normalizing content defensively and
    /// lifting the legacy `_originalType` key into `variant`.
    pub fn from_wire(wire: WireBlock) -> Self {
        let mut content = normalize_content(&wire.content);
        let variant = match content.remove("_originalType") {
            Some(Value::String(s)) if !s.is_empty() && s != wire.kind => Some(s),
            _ => None,
        };
        Self {
            id: wire.id,
            kind: wire.kind,
            variant,
            content,
            order: wire.order,
            settings: wire.settings,
            animation: wire.animation,
            visibility: wire.visibility,
        }
    }

    /// Produce the wire shape consumed by the persistence collaborator,
    /// re-embedding the variant as `_originalType` so legacy readers keep
    /// resolving the right template.
    pub fn to_wire(&self) -> WireBlock {
        let mut content = self.content.clone();
        if let Some(variant) = &self.variant {
            content.insert(
                "_originalType".to_string(),
                Value::String(variant.clone()),
            );
        }
        WireBlock {
            id: self.id.clone(),
            kind: self.kind.clone(),
            content: Value::Object(content),
            order: self.order,
            settings: self.settings.clone(),
            animation: self.animation.clone(),
            visibility: self.visibility.clone(),
        }
    }
}

/// Block as exchanged with the persistence collaborator. Content may arrive
/// as a JSON-encoded string and is normalized on ingestion.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WireBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BlockSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityRule>,
}

/// Generate a fresh transient block id.
pub fn generate_block_id() -> String {
    format!("{}{}", TRANSIENT_ID_PREFIX, Uuid::new_v4().simple())
}

/// Normalize a stored content value into an object map.
///
/// Content may be stored as a JSON-encoded string; malformed input becomes
/// the empty map. This never fails.
pub fn normalize_content(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                log::warn!("malformed block content, substituting empty map");
                Map::new()
            }
        },
        Value::Null => Map::new(),
        _ => {
            log::warn!("non-object block content, substituting empty map");
            Map::new()
        }
    }
}

/// Style overrides for a block: alignment, color, spacing. Unrecognized keys
/// round-trip through `extra`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declarative entrance animation config.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    #[serde(rename = "type", default)]
    pub kind: AnimationKind,
    #[serde(default)]
    pub trigger: AnimationTrigger,
    /// Milliseconds.
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Milliseconds.
    #[serde(default)]
    pub delay: u32,
    #[serde(default = "default_easing")]
    pub easing: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            kind: AnimationKind::None,
            trigger: AnimationTrigger::OnScroll,
            duration: default_duration(),
            delay: 0,
            easing: default_easing(),
            enabled: true,
        }
    }
}

fn default_duration() -> u32 {
    600
}

fn default_easing() -> String {
    "ease-out".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    #[default]
    None,
    FadeIn,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ZoomIn,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationTrigger {
    OnLoad,
    #[default]
    OnScroll,
    OnHover,
}

/// Viewport class derived from width: mobile below 768px, tablet below
/// 1024px, desktop at or above.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    /// Classify a viewport width into exactly one device class.
    pub fn classify(viewport_width: u32) -> Self {
        if viewport_width < 768 {
            DeviceClass::Mobile
        } else if viewport_width < 1024 {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Device/schedule gate. Both constraints are AND'ed when both present.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct VisibilityRule {
    /// Empty means no device restriction.
    #[serde(default)]
    pub devices: Vec<DeviceClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

/// Time window during which a block is shown. Either bound may be open.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_kind_prefers_variant() {
        let mut block = Block::new("text", Map::new(), 0);
        assert_eq!(block.effective_kind(), "text");
        block.variant = Some("hero".to_string());
        assert_eq!(block.effective_kind(), "hero");
    }

    #[test]
    fn test_persisted_id_detection() {
        let mut block = Block::new("hero", Map::new(), 0);
        assert!(!block.is_persisted());
        block.id = "42".to_string();
        assert!(block.is_persisted());
        // Non-integer backend keys still count as persisted.
        block.id = "9b2f1c04-7d4e-4a7a-9a1e-3f6d2c8b5e10".to_string();
        assert!(block.is_persisted());
    }

    #[test]
    fn test_normalize_content_parses_json_string() {
        let value = json!("{\"headline\":\"Hi\"}");
        let map = normalize_content(&value);
        assert_eq!(map.get("headline"), Some(&json!("Hi")));
    }

    #[test]
    fn test_normalize_content_malformed_yields_empty() {
        assert!(normalize_content(&json!("not json {{")).is_empty());
        assert!(normalize_content(&json!(42)).is_empty());
        assert!(normalize_content(&Value::Null).is_empty());
    }

    #[test]
    fn test_from_wire_lifts_original_type() {
        let wire = WireBlock {
            id: "7".to_string(),
            kind: "custom".to_string(),
            content: json!({"_originalType": "hero", "headline": "Hi"}),
            order: 0,
            settings: None,
            animation: None,
            visibility: None,
        };
        let block = Block::from_wire(wire);
        assert_eq!(block.variant.as_deref(), Some("hero"));
        assert_eq!(block.effective_kind(), "hero");
        assert!(!block.content.contains_key("_originalType"));

        let round = block.to_wire();
        assert_eq!(
            round.content.get("_originalType"),
            Some(&json!("hero"))
        );
    }

    #[test]
    fn test_from_wire_string_content() {
        let wire = WireBlock {
            id: "7".to_string(),
            kind: "text".to_string(),
            content: json!("{\"text\":\"hello\"}"),
            order: 3,
            settings: None,
            animation: None,
            visibility: None,
        };
        let block = Block::from_wire(wire);
        assert_eq!(block.content.get("text"), Some(&json!("hello")));
    }

    #[test]
    fn test_animation_config_defaults() {
        let config: AnimationConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.kind, AnimationKind::None);
        assert_eq!(config.trigger, AnimationTrigger::OnScroll);
        assert_eq!(config.duration, 600);
        assert_eq!(config.delay, 0);
        assert_eq!(config.easing, "ease-out");
        assert!(config.enabled);
    }

    #[test]
    fn test_device_classification_breakpoints() {
        assert_eq!(DeviceClass::classify(320), DeviceClass::Mobile);
        assert_eq!(DeviceClass::classify(767), DeviceClass::Mobile);
        assert_eq!(DeviceClass::classify(768), DeviceClass::Tablet);
        assert_eq!(DeviceClass::classify(1023), DeviceClass::Tablet);
        assert_eq!(DeviceClass::classify(1024), DeviceClass::Desktop);
    }
}
