//! Document-level types.

use super::{
    Category, Chunk, ClassifiedBlock, ElementRef, ElementType, Match, PageInfo, TextSource,
    VisualElement,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The analysed structure of a document.
///
/// Built once by the analysis pipeline and read-only afterwards. Every block
/// collection is ordered by reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub(crate) metadata: Metadata,
    pub(crate) pages: Vec<PageInfo>,

    pub(crate) body: Vec<ClassifiedBlock>,
    pub(crate) titles: Vec<ClassifiedBlock>,
    pub(crate) headers: Vec<ClassifiedBlock>,
    pub(crate) footers: Vec<ClassifiedBlock>,
    pub(crate) page_numbers: Vec<ClassifiedBlock>,
    pub(crate) footnotes: Vec<ClassifiedBlock>,
    pub(crate) lists: Vec<ClassifiedBlock>,
    pub(crate) captions: Vec<ClassifiedBlock>,

    pub(crate) figures: Vec<VisualElement>,
    pub(crate) images: Vec<VisualElement>,
    pub(crate) tables: Vec<VisualElement>,
    pub(crate) formulas: Vec<VisualElement>,

    pub(crate) matches: Vec<Match>,
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) report: QualityReport,
}

impl Document {
    /// Create an empty document.
    pub(crate) fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            pages: Vec::new(),
            body: Vec::new(),
            titles: Vec::new(),
            headers: Vec::new(),
            footers: Vec::new(),
            page_numbers: Vec::new(),
            footnotes: Vec::new(),
            lists: Vec::new(),
            captions: Vec::new(),
            figures: Vec::new(),
            images: Vec::new(),
            tables: Vec::new(),
            formulas: Vec::new(),
            matches: Vec::new(),
            chunks: Vec::new(),
            report: QualityReport::default(),
        }
    }

    /// Document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Geometry of every analysed page, in page order.
    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    /// Number of pages in the source document.
    pub fn page_count(&self) -> usize {
        self.metadata.page_count
    }

    /// Geometry of one page.
    pub fn page(&self, index: usize) -> Option<&PageInfo> {
        self.pages.iter().find(|p| p.index == index)
    }

    /// Body text blocks.
    pub fn body(&self) -> &[ClassifiedBlock] {
        &self.body
    }

    /// Title blocks.
    pub fn titles(&self) -> &[ClassifiedBlock] {
        &self.titles
    }

    /// Running header blocks.
    pub fn headers(&self) -> &[ClassifiedBlock] {
        &self.headers
    }

    /// Running footer blocks.
    pub fn footers(&self) -> &[ClassifiedBlock] {
        &self.footers
    }

    /// Page number blocks.
    pub fn page_numbers(&self) -> &[ClassifiedBlock] {
        &self.page_numbers
    }

    /// Footnote blocks.
    pub fn footnotes(&self) -> &[ClassifiedBlock] {
        &self.footnotes
    }

    /// List item blocks.
    pub fn lists(&self) -> &[ClassifiedBlock] {
        &self.lists
    }

    /// Caption blocks, including captions recovered from body text.
    pub fn captions(&self) -> &[ClassifiedBlock] {
        &self.captions
    }

    /// Blocks of one category.
    pub fn blocks(&self, category: Category) -> &[ClassifiedBlock] {
        match category {
            Category::Body => &self.body,
            Category::Title => &self.titles,
            Category::Header => &self.headers,
            Category::Footer => &self.footers,
            Category::PageNumber => &self.page_numbers,
            Category::Footnote => &self.footnotes,
            Category::List => &self.lists,
            Category::Caption => &self.captions,
        }
    }

    pub(crate) fn blocks_mut(&mut self, category: Category) -> &mut Vec<ClassifiedBlock> {
        match category {
            Category::Body => &mut self.body,
            Category::Title => &mut self.titles,
            Category::Header => &mut self.headers,
            Category::Footer => &mut self.footers,
            Category::PageNumber => &mut self.page_numbers,
            Category::Footnote => &mut self.footnotes,
            Category::List => &mut self.lists,
            Category::Caption => &mut self.captions,
        }
    }

    /// Every block of every category, in reading order.
    pub fn blocks_in_order(&self) -> Vec<&ClassifiedBlock> {
        let mut all: Vec<&ClassifiedBlock> = Category::ALL
            .iter()
            .flat_map(|c| self.blocks(*c).iter())
            .collect();
        all.sort_by_key(|b| (b.reading_order.unwrap_or(usize::MAX), b.page));
        all
    }

    /// Total number of blocks across categories.
    pub fn block_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.blocks(*c).len()).sum()
    }

    /// Figure elements.
    pub fn figures(&self) -> &[VisualElement] {
        &self.figures
    }

    /// Image elements.
    pub fn images(&self) -> &[VisualElement] {
        &self.images
    }

    /// Table elements.
    pub fn tables(&self) -> &[VisualElement] {
        &self.tables
    }

    /// Formula elements.
    pub fn formulas(&self) -> &[VisualElement] {
        &self.formulas
    }

    /// Elements of one type.
    pub fn elements(&self, element_type: ElementType) -> &[VisualElement] {
        match element_type {
            ElementType::Figure => &self.figures,
            ElementType::Image => &self.images,
            ElementType::Table => &self.tables,
            ElementType::Formula => &self.formulas,
        }
    }

    pub(crate) fn elements_mut(&mut self, element_type: ElementType) -> &mut Vec<VisualElement> {
        match element_type {
            ElementType::Figure => &mut self.figures,
            ElementType::Image => &mut self.images,
            ElementType::Table => &mut self.tables,
            ElementType::Formula => &mut self.formulas,
        }
    }

    /// Resolve an element reference.
    pub fn element(&self, element_ref: ElementRef) -> Option<&VisualElement> {
        self.elements(element_ref.element_type)
            .get(element_ref.index)
    }

    /// Total number of visual elements.
    pub fn element_count(&self) -> usize {
        ElementType::ALL
            .iter()
            .map(|t| self.elements(*t).len())
            .sum()
    }

    /// Caption-to-element matches.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Caption block matched to an element, if any.
    pub fn caption_for(&self, element_ref: ElementRef) -> Option<&ClassifiedBlock> {
        self.matches
            .iter()
            .find(|m| m.element == element_ref)
            .and_then(|m| self.captions.get(m.caption))
    }

    /// Caption blocks with no matched element.
    pub fn orphan_captions(&self) -> Vec<&ClassifiedBlock> {
        self.captions.iter().filter(|c| !c.is_matched()).collect()
    }

    /// Elements with no matched caption.
    pub fn orphan_elements(&self) -> Vec<&VisualElement> {
        ElementType::ALL
            .iter()
            .flat_map(|t| self.elements(*t).iter())
            .filter(|e| !e.has_caption())
            .collect()
    }

    /// Text chunks, ordered by `order_idx`.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Quality report.
    pub fn report(&self) -> &QualityReport {
        &self.report
    }

    /// Check if the document has no text blocks and no elements.
    pub fn is_empty(&self) -> bool {
        self.block_count() == 0 && self.element_count() == 0
    }
}

/// Document metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title, as supplied by the source
    pub title: Option<String>,

    /// Path or URL of the source document
    pub source: Option<String>,

    /// Total number of pages in the source
    pub page_count: usize,

    /// Whether text came from the native layer or OCR
    pub text_source: TextSource,

    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,

    /// Library version that produced the analysis
    pub generator: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: None,
            source: None,
            page_count: 0,
            text_source: TextSource::Native,
            analyzed_at: Utc::now(),
            generator: format!("pagestruct {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// What went wrong, or nearly wrong, during analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    /// Pages whose extraction failed
    pub skipped_pages: Vec<usize>,

    /// Lines skipped for empty text or a degenerate box
    pub skipped_lines: usize,

    /// Fraction of sampled pages with a usable text layer
    pub text_coverage: f32,

    /// Whether OCR words replaced the native text layer
    pub ocr_used: bool,

    /// Estimated OCR quality in [0, 1], when OCR was used
    pub ocr_quality: Option<f32>,

    /// Layout regions dropped below the confidence threshold
    pub dropped_layout_regions: usize,

    /// OCR lines whose mean word confidence is below 60
    pub low_confidence_lines: usize,

    /// Body blocks moved to headers or footers by repetition
    pub repaired_blocks: usize,

    /// Captions recovered from body text and matched
    pub recovered_captions: usize,
}

impl QualityReport {
    /// Whether analysis finished without skipping anything.
    pub fn is_clean(&self) -> bool {
        self.skipped_pages.is_empty() && self.skipped_lines == 0
    }
}
