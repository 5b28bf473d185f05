//! Raw inputs from the upstream extractors: text spans, OCR words and layout
//! regions.

use super::BBox;
use serde::{Deserialize, Serialize};

/// Font flag bit for italic text.
pub const FLAG_ITALIC: u32 = 1 << 1;

/// Font flag bit for bold text.
pub const FLAG_BOLD: u32 = 1 << 4;

/// A run of text with a single font, as reported by the text extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Bounding box on the page
    pub bbox: BBox,
    /// 0-based page index
    #[serde(default)]
    pub page: usize,
    /// Font size in points
    #[serde(default)]
    pub font_size: f32,
    /// Extractor font flags (bit 1 italic, bit 4 bold)
    #[serde(default)]
    pub font_flags: u32,
    /// Font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_name: String,
}

impl Span {
    /// Create a new span with no flags and an empty font name.
    pub fn new(text: impl Into<String>, bbox: BBox, page: usize, font_size: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
            font_size,
            font_flags: 0,
            font_name: String::new(),
        }
    }

    /// Set the font name.
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Set the font flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.font_flags = flags;
        self
    }

    /// Whether the span is set in a bold weight.
    ///
    /// True if the bold flag is set or the font name names a heavy weight.
    pub fn is_bold(&self) -> bool {
        if self.font_flags & FLAG_BOLD != 0 {
            return true;
        }
        let name = self.font_name.to_lowercase();
        name.contains("bold") || name.contains("black") || name.contains("heavy")
    }

    /// Whether the span is italic.
    pub fn is_italic(&self) -> bool {
        if self.font_flags & FLAG_ITALIC != 0 {
            return true;
        }
        let name = self.font_name.to_lowercase();
        name.contains("italic") || name.contains("oblique")
    }
}

/// A word recognised by an OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    /// Recognised text
    pub text: String,
    /// Word bounding box
    pub bbox: BBox,
    /// 0-based page index
    #[serde(default)]
    pub page: usize,
    /// Recognition confidence, 0-100
    #[serde(default)]
    pub confidence: f32,
    /// Engine that produced the word
    #[serde(default)]
    pub engine: String,
}

impl OcrWord {
    /// Create a new OCR word.
    pub fn new(text: impl Into<String>, bbox: BBox, page: usize, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
            confidence,
            engine: String::new(),
        }
    }
}

/// A typed region reported by the layout detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRegion {
    /// Free-form label such as "Title", "Text" or "Figure-caption"
    #[serde(rename = "type")]
    pub region_type: String,
    /// Detector confidence, 0-1
    #[serde(default)]
    pub confidence: f32,
    /// Region bounding box
    pub bbox: BBox,
    /// 0-based page index
    #[serde(default)]
    pub page: usize,
}

impl LayoutRegion {
    /// Create a new layout region.
    pub fn new(region_type: impl Into<String>, confidence: f32, bbox: BBox, page: usize) -> Self {
        Self {
            region_type: region_type.into(),
            confidence,
            bbox,
            page,
        }
    }

    /// Lowercased label, used as the classifier hint.
    pub fn hint(&self) -> String {
        self.region_type.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BBox {
        BBox::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_span_bold_detection() {
        let span = Span::new("Test", bbox(), 0, 12.0).with_font_name("Helvetica-Bold");
        assert!(span.is_bold());
        assert!(!span.is_italic());

        let span = Span::new("Test", bbox(), 0, 12.0).with_font_name("Helvetica-Oblique");
        assert!(!span.is_bold());
        assert!(span.is_italic());

        let span = Span::new("Test", bbox(), 0, 12.0).with_flags(FLAG_BOLD);
        assert!(span.is_bold());

        let span = Span::new("Test", bbox(), 0, 12.0).with_flags(FLAG_ITALIC);
        assert!(span.is_italic());
        assert!(!span.is_bold());
    }

    #[test]
    fn test_span_deserialize_defaults() {
        let span: Span = serde_json::from_str(r#"{"text": "a", "bbox": [0, 0, 5, 5]}"#).unwrap();
        assert_eq!(span.page, 0);
        assert_eq!(span.font_flags, 0);
        assert!(span.font_name.is_empty());
    }

    #[test]
    fn test_layout_region_type_field() {
        let region: LayoutRegion = serde_json::from_str(
            r#"{"type": "Figure-Caption", "confidence": 0.9, "bbox": [0, 0, 5, 5]}"#,
        )
        .unwrap();
        assert_eq!(region.region_type, "Figure-Caption");
        assert_eq!(region.hint(), "figure-caption");
    }
}
