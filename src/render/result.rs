//! Analysis summary with metadata, statistics and quality metrics.

use crate::model::{Category, Document, ElementType, Metadata, QualityReport, TextSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of an analysed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Document metadata (copied from the document)
    pub metadata: Metadata,

    /// Counts and text statistics
    pub stats: AnalysisStats,

    /// Quality report (copied from the document)
    pub report: QualityReport,
}

impl AnalysisSummary {
    /// Summarise a document.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            metadata: doc.metadata().clone(),
            stats: AnalysisStats::from_document(doc),
            report: doc.report().clone(),
        }
    }
}

/// Statistics collected over an analysed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Pages analysed
    pub page_count: usize,

    /// Blocks per category
    pub blocks: BTreeMap<Category, usize>,

    /// Visual elements per type
    pub elements: BTreeMap<ElementType, usize>,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: usize,

    /// Character count (excluding whitespace)
    pub char_count: usize,

    /// Mean words per body block
    pub avg_words_per_body_block: f32,

    /// Share of blocks whose text came from OCR
    pub ocr_ratio: f32,

    /// Mean OCR confidence (0-100) over OCR blocks
    pub avg_ocr_confidence: Option<f32>,

    /// Number of caption/element matches
    pub match_count: usize,

    /// Matches per match type ("figure_image", ...)
    pub matches_by_type: BTreeMap<String, usize>,

    /// Captions with no element
    pub orphan_captions: usize,

    /// Elements with no caption
    pub orphan_elements: usize,

    /// Pages skipped on extraction errors
    pub skipped_pages: usize,

    /// Lines skipped for empty text or a degenerate box
    pub skipped_lines: usize,

    /// Number of chunks
    pub chunk_count: usize,
}

impl AnalysisStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics from a document.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self {
            page_count: doc.pages().len(),
            match_count: doc.matches().len(),
            orphan_captions: doc.orphan_captions().len(),
            orphan_elements: doc.orphan_elements().len(),
            skipped_pages: doc.report().skipped_pages.len(),
            skipped_lines: doc.report().skipped_lines,
            chunk_count: doc.chunks().len(),
            ..Default::default()
        };

        let mut ocr_blocks = 0;
        let mut confidences = Vec::new();
        for category in Category::ALL {
            let blocks = doc.blocks(category);
            stats.blocks.insert(category, blocks.len());
            for block in blocks {
                stats.count_text(&block.text);
                if block.source == TextSource::Ocr {
                    ocr_blocks += 1;
                    confidences.extend(block.confidence);
                }
            }
        }
        for element_type in ElementType::ALL {
            stats
                .elements
                .insert(element_type, doc.elements(element_type).len());
        }
        for m in doc.matches() {
            *stats.matches_by_type.entry(m.match_type.clone()).or_insert(0) += 1;
        }

        let body = doc.body();
        if !body.is_empty() {
            let words: usize = body.iter().map(|b| b.word_count()).sum();
            stats.avg_words_per_body_block = words as f32 / body.len() as f32;
        }

        let total = doc.block_count();
        if total > 0 {
            stats.ocr_ratio = ocr_blocks as f32 / total as f32;
        }
        if !confidences.is_empty() {
            stats.avg_ocr_confidence =
                Some(confidences.iter().sum::<f32>() / confidences.len() as f32);
        }

        stats
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        // Word count: whitespace-separated tokens
        self.word_count += text.split_whitespace().count();

        // Character count: non-whitespace characters
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count();
    }

    /// Number of blocks in one category.
    pub fn block_count(&self, category: Category) -> usize {
        self.blocks.get(&category).copied().unwrap_or(0)
    }

    /// Number of elements of one type.
    pub fn element_count(&self, element_type: ElementType) -> usize {
        self.elements.get(&element_type).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, ClassifiedBlock, ElementRef, Match, VisualElement};

    #[test]
    fn test_count_text() {
        let mut stats = AnalysisStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_stats_from_document() {
        let mut doc = Document::new(Metadata::default());
        let bbox = BBox::new(0.0, 0.0, 10.0, 10.0);
        doc.body.push(ClassifiedBlock::new("one two three", bbox, 0, Category::Body));
        doc.body.push(ClassifiedBlock::new("four", bbox, 0, Category::Body));
        let mut ocr = ClassifiedBlock::new("Scanned Title", bbox, 0, Category::Title);
        ocr.source = TextSource::Ocr;
        ocr.confidence = Some(80.0);
        doc.titles.push(ocr);
        doc.captions.push(ClassifiedBlock::new("Figure 1: A", bbox, 0, Category::Caption));
        doc.images.push(VisualElement::new(ElementType::Image, bbox, 0));
        doc.tables.push(VisualElement::new(ElementType::Table, bbox, 0));
        doc.matches.push(Match {
            caption: 0,
            element: ElementRef::new(ElementType::Image, 0),
            score: 0.9,
            match_type: "figure_image".to_string(),
        });

        let stats = AnalysisStats::from_document(&doc);
        assert_eq!(stats.block_count(Category::Body), 2);
        assert_eq!(stats.block_count(Category::Footnote), 0);
        assert_eq!(stats.element_count(ElementType::Table), 1);
        assert_eq!(stats.avg_words_per_body_block, 2.0);
        assert_eq!(stats.word_count, 9);
        assert_eq!(stats.ocr_ratio, 0.25);
        assert_eq!(stats.avg_ocr_confidence, Some(80.0));
        assert_eq!(stats.matches_by_type.get("figure_image"), Some(&1));
        assert_eq!(stats.orphan_elements, 2);
    }

    #[test]
    fn test_summary_copies_report() {
        let mut doc = Document::new(Metadata::default());
        doc.report.skipped_pages.push(4);
        let summary = AnalysisSummary::from_document(&doc);
        assert_eq!(summary.report.skipped_pages, vec![4]);
        assert_eq!(summary.stats.skipped_pages, 1);
    }
}
