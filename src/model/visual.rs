//! Visual elements reported by the figure, image, table and formula
//! extractors.

use super::{BBox, CaptionType};
use serde::{Deserialize, Serialize};

/// Kind of visual element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Vector or composite figure
    Figure,
    /// Embedded raster image
    Image,
    /// Table region
    Table,
    /// Display formula
    Formula,
}

impl ElementType {
    /// Every element type, in collection order.
    pub const ALL: [ElementType; 4] = [
        ElementType::Figure,
        ElementType::Image,
        ElementType::Table,
        ElementType::Formula,
    ];

    /// Snake-case name, as used in match types.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Figure => "figure",
            ElementType::Image => "image",
            ElementType::Table => "table",
            ElementType::Formula => "formula",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Back-reference from a visual element to the caption that describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionRef {
    /// Caption text
    pub text: String,
    /// Page of the caption
    pub page: usize,
    /// Caption bounding box
    pub bbox: BBox,
    /// Detected caption type
    pub caption_type: CaptionType,
    /// Caption number, if one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

/// A figure, image, table or formula region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualElement {
    /// Kind of element
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Region bounding box
    pub bbox: BBox,
    /// 0-based page index
    #[serde(default)]
    pub page: usize,
    /// Extractor-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Caption matched to this element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<CaptionRef>,
}

impl VisualElement {
    /// Create a new uncaptioned element.
    pub fn new(element_type: ElementType, bbox: BBox, page: usize) -> Self {
        Self {
            element_type,
            bbox,
            page,
            id: None,
            caption: None,
        }
    }

    /// Set the extractor identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether a caption has been matched to this element.
    pub fn has_caption(&self) -> bool {
        self.caption.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_element_from_json() {
        let el: VisualElement =
            serde_json::from_str(r#"{"type": "table", "bbox": [10, 20, 30, 40], "id": "t1"}"#)
                .unwrap();
        assert_eq!(el.element_type, ElementType::Table);
        assert_eq!(el.id.as_deref(), Some("t1"));
        assert!(!el.has_caption());
    }

    #[test]
    fn test_element_type_display() {
        assert_eq!(ElementType::Formula.to_string(), "formula");
    }
}
