//! Page-level input: what the upstream extractors report for each page.

use super::{LayoutRegion, OcrWord, Span, VisualElement};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the extractors reported for a single page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContent {
    /// 0-based page index
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text spans from the native text layer
    pub spans: Vec<Span>,
    /// Layout detector regions
    pub layout_regions: Vec<LayoutRegion>,
    /// Figures, images, tables and formulas
    pub visual_elements: Vec<VisualElement>,
    /// OCR words, used when the native text layer is too thin
    pub ocr_words: Vec<OcrWord>,
    /// Set when the extractor failed on this page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageContent {
    /// Create an empty page with the given dimensions.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            ..Default::default()
        }
    }

    /// Create an empty US Letter page (8.5 x 11 inches).
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Number of characters in the native text layer.
    pub fn text_char_count(&self) -> usize {
        self.spans.iter().map(|s| s.text.trim().chars().count()).sum()
    }

    /// Geometry summary of the page.
    pub fn info(&self) -> PageInfo {
        PageInfo {
            index: self.index,
            width: self.width,
            height: self.height,
        }
    }

    /// Stamp the page index on every item the page carries.
    pub(crate) fn assign_index(&mut self, index: usize) {
        self.index = index;
        self.spans.iter_mut().for_each(|s| s.page = index);
        self.layout_regions.iter_mut().for_each(|r| r.page = index);
        self.visual_elements.iter_mut().for_each(|e| e.page = index);
        self.ocr_words.iter_mut().for_each(|w| w.page = index);
    }
}

/// Page geometry kept on the analysed document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 0-based page index
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
}

/// Source of page content for the analysis pipeline.
///
/// Implementations must be shareable across threads; pages are loaded in
/// parallel when the pipeline runs with `parallel = true`.
pub trait PageSource: Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Load one page. An error marks the page as skipped.
    fn load_page(&self, index: usize) -> Result<PageContent>;

    /// Document title, if the source knows one.
    fn title(&self) -> Option<String> {
        None
    }

    /// Path or URL of the original document, if the source knows one.
    fn source(&self) -> Option<String> {
        None
    }
}

/// A whole document's extractor output, as decoded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInput {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Path or URL of the original document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Pages in document order
    pub pages: Vec<PageContent>,
}

impl DocumentInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode extractor output from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode extractor output from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let mut input = Self::from_json(&data)?;
        if input.source.is_none() {
            input.source = Some(path.as_ref().display().to_string());
        }
        Ok(input)
    }

    /// Append a page.
    pub fn add_page(&mut self, page: PageContent) {
        self.pages.push(page);
    }
}

impl PageSource for DocumentInput {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<PageContent> {
        let page = self
            .pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))?;

        if let Some(ref reason) = page.error {
            return Err(Error::PageExtraction {
                page: index,
                reason: reason.clone(),
            });
        }

        let mut page = page.clone();
        page.assign_index(index);
        Ok(page)
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn source(&self) -> Option<String> {
        self.source.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_load_page_stamps_index() {
        let mut page = PageContent::letter(7);
        page.spans
            .push(Span::new("hello", BBox::new(0.0, 0.0, 10.0, 10.0), 9, 12.0));
        let mut input = DocumentInput::new();
        input.add_page(PageContent::letter(0));
        input.add_page(page);

        let loaded = input.load_page(1).unwrap();
        assert_eq!(loaded.index, 1);
        assert_eq!(loaded.spans[0].page, 1);
    }

    #[test]
    fn test_load_page_errors() {
        let mut broken = PageContent::letter(0);
        broken.error = Some("bad xref".to_string());
        let mut input = DocumentInput::new();
        input.add_page(broken);

        assert!(matches!(
            input.load_page(0),
            Err(Error::PageExtraction { page: 0, .. })
        ));
        assert!(matches!(
            input.load_page(3),
            Err(Error::PageOutOfRange(3, 1))
        ));
    }

    #[test]
    fn test_from_json_defaults() {
        let input = DocumentInput::from_json(
            r#"{"pages": [{"width": 600, "height": 800, "spans": [
                {"text": "Hi", "bbox": [10, 10, 30, 22], "font_size": 12}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(input.page_count(), 1);
        assert_eq!(input.pages[0].text_char_count(), 2);
        assert!(input.pages[0].visual_elements.is_empty());
    }
}
