//! Classified text blocks.

use super::{BBox, CaptionInfo, Span};
use serde::{Deserialize, Serialize};

/// Structural category of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Running body text
    Body,
    /// Section and document titles
    Title,
    /// Page header band
    Header,
    /// Page footer band
    Footer,
    /// Printed page numbers
    PageNumber,
    /// Footnotes and bottom-of-page references
    Footnote,
    /// List items
    List,
    /// Figure, table, equation and algorithm captions
    Caption,
}

impl Category {
    /// Every category, in collection order.
    pub const ALL: [Category; 8] = [
        Category::Body,
        Category::Title,
        Category::Header,
        Category::Footer,
        Category::PageNumber,
        Category::Footnote,
        Category::List,
        Category::Caption,
    ];

    /// Snake-case name, as used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Body => "body",
            Category::Title => "title",
            Category::Header => "header",
            Category::Footer => "footer",
            Category::PageNumber => "page_number",
            Category::Footnote => "footnote",
            Category::List => "list",
            Category::Caption => "caption",
        }
    }

    /// Position of the category in [`Category::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a block's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Embedded text layer
    #[default]
    Native,
    /// OCR fallback
    Ocr,
}

/// Aggregated font information for a line or block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    /// Mean of the valid font sizes
    pub avg_size: f32,
    /// Every font size observed, in span order
    pub sizes: Vec<f32>,
    /// Whether any span is bold
    pub bold: bool,
    /// Whether any span is italic
    pub italic: bool,
    /// Distinct font names, in first-seen order
    pub font_names: Vec<String>,
}

impl FontInfo {
    /// Aggregate font information over a set of spans.
    pub fn from_spans(spans: &[Span]) -> Self {
        let mut info = FontInfo::default();
        for span in spans {
            info.sizes.push(span.font_size);
            info.bold |= span.is_bold();
            info.italic |= span.is_italic();
            if !span.font_name.is_empty() && !info.font_names.contains(&span.font_name) {
                info.font_names.push(span.font_name.clone());
            }
        }
        info.avg_size = mean_valid(&info.sizes);
        info
    }

    /// Fold another block's font information into this one.
    pub fn combine(&mut self, other: &FontInfo) {
        self.sizes.extend_from_slice(&other.sizes);
        self.bold |= other.bold;
        self.italic |= other.italic;
        for name in &other.font_names {
            if !self.font_names.contains(name) {
                self.font_names.push(name.clone());
            }
        }
        self.avg_size = mean_valid(&self.sizes);
    }
}

fn mean_valid(sizes: &[f32]) -> f32 {
    let valid: Vec<f32> = sizes
        .iter()
        .copied()
        .filter(|s| s.is_finite() && *s > 0.0)
        .collect();
    if valid.is_empty() {
        0.0
    } else {
        valid.iter().sum::<f32>() / valid.len() as f32
    }
}

/// A word and its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text
    pub text: String,
    /// Word bounding box
    pub bbox: BBox,
}

impl Word {
    /// Create a new word.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// A line or merged group of lines with its structural category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBlock {
    /// Joined text
    pub text: String,
    /// Union bounding box
    pub bbox: BBox,
    /// 0-based page index
    pub page: usize,
    /// Assigned category
    pub category: Category,
    /// Aggregated font information
    pub font_info: FontInfo,
    /// Label of the layout region containing the block, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<String>,
    /// Per-word boxes
    pub words: Vec<Word>,
    /// Number of source lines merged into this block
    pub merged_from: usize,
    /// Document-global reading position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_order: Option<usize>,
    /// Native text layer or OCR
    pub source: TextSource,
    /// Mean OCR confidence (0-100) for OCR blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Caption metadata, for caption blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<CaptionInfo>,
}

impl ClassifiedBlock {
    /// Create a new unmerged native block.
    pub fn new(text: impl Into<String>, bbox: BBox, page: usize, category: Category) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
            category,
            font_info: FontInfo::default(),
            layout_type: None,
            words: Vec::new(),
            merged_from: 1,
            reading_order: None,
            source: TextSource::Native,
            confidence: None,
            caption: None,
        }
    }

    /// Number of whitespace-separated words in the text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether this caption block has been matched to a visual element.
    pub fn is_matched(&self) -> bool {
        self.caption
            .as_ref()
            .is_some_and(|c| c.matched_element.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(Category::PageNumber.as_str(), "page_number");
        assert_eq!(Category::Caption.to_string(), "caption");
        let json = serde_json::to_string(&Category::PageNumber).unwrap();
        assert_eq!(json, "\"page_number\"");
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_font_info_from_spans() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        let spans = vec![
            Span::new("a", b, 0, 10.0).with_font_name("Times"),
            Span::new("b", b, 0, 14.0).with_font_name("Times-Bold"),
            Span::new("c", b, 0, 0.0).with_font_name("Times"),
        ];
        let info = FontInfo::from_spans(&spans);
        assert_eq!(info.avg_size, 12.0);
        assert_eq!(info.sizes.len(), 3);
        assert!(info.bold);
        assert!(!info.italic);
        assert_eq!(info.font_names, vec!["Times", "Times-Bold"]);
    }

    #[test]
    fn test_font_info_combine() {
        let mut a = FontInfo {
            avg_size: 10.0,
            sizes: vec![10.0],
            ..Default::default()
        };
        let b = FontInfo {
            avg_size: 20.0,
            sizes: vec![20.0],
            italic: true,
            font_names: vec!["Serif".to_string()],
            ..Default::default()
        };
        a.combine(&b);
        assert_eq!(a.avg_size, 15.0);
        assert!(a.italic);
        assert_eq!(a.font_names, vec!["Serif"]);
    }
}
