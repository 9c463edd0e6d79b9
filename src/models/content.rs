//! Typed content schemas for the built-in block kinds
//!
//! Stored content is an open map; at render time it is decoded into one arm
//! of [`BlockContent`] keyed by the block's effective kind. Kinds the engine
//! does not know about are preserved verbatim in the `Opaque` arm so they
//! round-trip safely.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sum type over the content schemas the engine understands.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum BlockContent {
    Hero(HeroContent),
    Heading(HeadingContent),
    Paragraph(ParagraphContent),
    Image(ImageContent),
    Gallery(GalleryContent),
    Video(VideoContent),
    Button(ButtonContent),
    Quote(QuoteContent),
    Spacer(SpacerContent),
    Divider,
    ContactForm(ContactFormContent),
    FeatureGrid(FeatureGridContent),
    /// Unrecognized payload, preserved verbatim.
    Opaque(Map<String, Value>),
}

impl BlockContent {
    /// Decode a content map for the given effective kind. Unknown kinds and
    /// known kinds with shapes that do not decode both land in `Opaque`;
    /// this never fails.
    pub fn decode(effective_kind: &str, content: &Map<String, Value>) -> Self {
        let value = Value::Object(content.clone());
        let decoded = match effective_kind {
            "hero" => serde_json::from_value(value).map(BlockContent::Hero),
            "heading" => serde_json::from_value(value).map(BlockContent::Heading),
            "paragraph" | "text" => {
                serde_json::from_value(value).map(BlockContent::Paragraph)
            }
            "image" => serde_json::from_value(value).map(BlockContent::Image),
            "gallery" => serde_json::from_value(value).map(BlockContent::Gallery),
            "video" => serde_json::from_value(value).map(BlockContent::Video),
            "button" | "cta" => serde_json::from_value(value).map(BlockContent::Button),
            "quote" => serde_json::from_value(value).map(BlockContent::Quote),
            "spacer" => serde_json::from_value(value).map(BlockContent::Spacer),
            "divider" => Ok(BlockContent::Divider),
            "contact-form" => {
                serde_json::from_value(value).map(BlockContent::ContactForm)
            }
            "feature-grid" => {
                serde_json::from_value(value).map(BlockContent::FeatureGrid)
            }
            _ => return BlockContent::Opaque(content.clone()),
        };
        match decoded {
            Ok(content) => content,
            Err(err) => {
                log::warn!(
                    "content for kind '{}' failed to decode ({}), treating as opaque",
                    effective_kind,
                    err
                );
                BlockContent::Opaque(content.clone())
            }
        }
    }

    /// First textual field of an opaque payload, if any. Used by the render
    /// dispatcher to fall back to a generic text renderer.
    pub fn opaque_text(&self) -> Option<&str> {
        let BlockContent::Opaque(map) = self else {
            return None;
        };
        for key in ["text", "html", "content", "headline", "title"] {
            if let Some(Value::String(s)) = map.get(key) {
                if !s.is_empty() {
                    return Some(s);
                }
            }
        }
        None
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub headline: String,
    pub subheadline: Option<String>,
    pub background_image: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub overlay: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingContent {
    pub text: String,
    pub level: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphContent {
    pub text: String,
    pub html: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageContent {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryContent {
    pub images: Vec<GalleryImage>,
    pub columns: Option<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryImage {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoContent {
    pub src: String,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub looped: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonContent {
    pub text: String,
    pub link: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteContent {
    pub text: String,
    pub attribution: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerContent {
    pub height: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFormContent {
    pub heading: Option<String>,
    pub submit_label: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureGridContent {
    pub heading: Option<String>,
    pub columns: Option<u8>,
    pub features: Vec<Feature>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Feature {
    pub icon: Option<String>,
    pub title: String,
    pub description: Option<String>,
}
