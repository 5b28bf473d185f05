//! Text layer detection and OCR fallback decision.

use crate::model::PageContent;

/// A page needs more than this many span characters to count as having text.
pub const MIN_PAGE_CHARS: usize = 50;

/// Text layer assessment over the leading pages of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayer {
    /// Number of pages sampled
    pub sampled_pages: usize,
    /// Sampled pages with a usable text layer
    pub pages_with_text: usize,
    /// Sampled pages that carry OCR words
    pub pages_with_ocr: usize,
    /// Fraction of sampled pages with a usable text layer
    pub coverage: f32,
}

impl TextLayer {
    /// Whether OCR words should replace the native text layer.
    ///
    /// True when coverage falls below `threshold` and some sampled page
    /// has OCR words to fall back on.
    pub fn should_use_ocr(&self, threshold: f32) -> bool {
        self.coverage < threshold && self.pages_with_ocr > 0
    }
}

impl std::fmt::Display for TextLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} pages with text ({:.0}%)",
            self.pages_with_text,
            self.sampled_pages,
            self.coverage * 100.0
        )
    }
}

/// Assess the text layer of the first `sample` pages.
///
/// Pages are taken in the order given. No pages yields zero coverage.
///
/// # Example
/// ```
/// use pagestruct::detect::assess_text_layer;
/// use pagestruct::model::PageContent;
///
/// let pages = vec![PageContent::letter(0), PageContent::letter(1)];
/// let layer = assess_text_layer(&pages, 10);
/// assert_eq!(layer.sampled_pages, 2);
/// assert_eq!(layer.coverage, 0.0);
/// ```
pub fn assess_text_layer(pages: &[PageContent], sample: usize) -> TextLayer {
    let sampled = &pages[..pages.len().min(sample)];
    let pages_with_text = sampled
        .iter()
        .filter(|p| p.text_char_count() > MIN_PAGE_CHARS)
        .count();
    let pages_with_ocr = sampled.iter().filter(|p| !p.ocr_words.is_empty()).count();

    let coverage = if sampled.is_empty() {
        0.0
    } else {
        pages_with_text as f32 / sampled.len() as f32
    };

    TextLayer {
        sampled_pages: sampled.len(),
        pages_with_text,
        pages_with_ocr,
        coverage,
    }
}

/// Fraction of the first `sample` pages with a usable text layer.
pub fn text_coverage(pages: &[PageContent], sample: usize) -> f32 {
    assess_text_layer(pages, sample).coverage
}
