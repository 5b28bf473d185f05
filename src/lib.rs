//! # pagestruct
//!
//! Structural analysis of paginated documents.
//!
//! This library takes what upstream extractors report for each page (text
//! spans, layout regions, OCR words and visual element boxes) and turns it
//! into a typed structural model: body text, titles, headers, footers,
//! footnotes, page numbers, list items and captions, each in reading order,
//! with captions matched to the figures, images, tables and formulas they
//! describe, and the text compacted into bounded chunks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagestruct::{analyze_file, render};
//!
//! fn main() -> pagestruct::Result<()> {
//!     // Analyze extractor output
//!     let doc = analyze_file("extracted.json")?;
//!
//!     // Main text in reading order
//!     println!("{}", render::to_text(&doc));
//!
//!     for chunk in doc.chunks() {
//!         println!("[{}] {}", chunk.section, chunk.text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rule-based classification**: ordered, inspectable rule list
//! - **Caption matching**: recovery from body text, 1:1 best-score matching
//! - **Reading order**: multi-column pages, document-global order
//! - **Chunking**: sentence-based, bounded, single-category chunks
//! - **OCR fallback**: OCR words replace a missing text layer
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod analysis;
pub mod detect;
pub mod error;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use analysis::{AnalysisOptions, ChunkOptions, FontScope, StructureAnalyzer};
pub use detect::{assess_text_layer, TextLayer};
pub use error::{Error, Result};
pub use model::{
    BBox, CaptionInfo, CaptionType, Category, Chunk, ClassifiedBlock, Document, DocumentInput,
    ElementRef, ElementType, Match, Metadata, PageContent, PageSource, QualityReport, Sentence,
    Span, VisualElement,
};
pub use render::{AnalysisStats, AnalysisSummary, JsonFormat};

use std::path::Path;

/// Analyze a page source with default options.
///
/// # Example
///
/// ```
/// use pagestruct::{analyze, DocumentInput};
///
/// let doc = analyze(&DocumentInput::new()).unwrap();
/// assert!(doc.is_empty());
/// ```
pub fn analyze<S: PageSource + ?Sized>(source: &S) -> Result<Document> {
    analyze_with_options(source, AnalysisOptions::default())
}

/// Analyze a page source with custom options.
///
/// # Example
///
/// ```no_run
/// use pagestruct::{analyze_with_options, AnalysisOptions, DocumentInput};
///
/// let input = DocumentInput::from_file("extracted.json").unwrap();
/// let options = AnalysisOptions::new().sequential().with_column_gap(40.0);
/// let doc = analyze_with_options(&input, options).unwrap();
/// ```
pub fn analyze_with_options<S: PageSource + ?Sized>(
    source: &S,
    options: AnalysisOptions,
) -> Result<Document> {
    StructureAnalyzer::new(options)?.analyze(source)
}

/// Read extractor output from a JSON file and analyze it.
///
/// # Example
///
/// ```no_run
/// use pagestruct::analyze_file;
///
/// let doc = analyze_file("extracted.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let input = DocumentInput::from_file(path)?;
    analyze(&input)
}

/// Decode extractor output from a JSON string and analyze it.
pub fn analyze_json(json: &str) -> Result<Document> {
    let input = DocumentInput::from_json(json)?;
    analyze(&input)
}

/// Convert extractor output to analysed JSON.
///
/// # Example
///
/// ```no_run
/// use pagestruct::{to_json, JsonFormat};
///
/// let json = to_json("extracted.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("analysis.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = analyze_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for analysing documents.
///
/// # Example
///
/// ```no_run
/// use pagestruct::{FontScope, Pagestruct};
///
/// let text = Pagestruct::new()
///     .sequential()
///     .with_font_scope(FontScope::Page)
///     .analyze_file("extracted.json")?
///     .to_text();
/// # Ok::<(), pagestruct::Error>(())
/// ```
pub struct Pagestruct {
    options: AnalysisOptions,
}

impl Pagestruct {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: AnalysisOptions::default(),
        }
    }

    /// Use the given options.
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the font statistics scope.
    pub fn with_font_scope(mut self, scope: FontScope) -> Self {
        self.options = self.options.with_font_scope(scope);
        self
    }

    /// Set chunking bounds.
    pub fn with_chunk_options(mut self, chunk: ChunkOptions) -> Self {
        self.options = self.options.with_chunk_options(chunk);
        self
    }

    /// Replace the caption keyword list.
    pub fn with_caption_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = self.options.with_caption_keywords(keywords);
        self
    }

    /// Analyze a page source and return a result wrapper.
    pub fn analyze<S: PageSource + ?Sized>(self, source: &S) -> Result<PagestructResult> {
        let document = analyze_with_options(source, self.options)?;
        Ok(PagestructResult { document })
    }

    /// Read extractor output from a JSON file and analyze it.
    pub fn analyze_file<P: AsRef<Path>>(self, path: P) -> Result<PagestructResult> {
        let input = DocumentInput::from_file(path)?;
        self.analyze(&input)
    }
}

impl Default for Pagestruct {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of analysing a document.
pub struct PagestructResult {
    /// The analysed document
    pub document: Document,
}

impl PagestructResult {
    /// Main text in reading order.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Convert the chunks to JSON.
    pub fn chunks_json(&self, format: JsonFormat) -> Result<String> {
        render::chunks_to_json(self.document.chunks(), format)
    }

    /// Metadata, statistics and quality report.
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary::from_document(&self.document)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let builder = Pagestruct::new()
            .sequential()
            .with_font_scope(FontScope::Page)
            .with_caption_keywords(["plate"]);

        assert!(!builder.options.parallel);
        assert_eq!(builder.options.font_scope, FontScope::Page);
        assert_eq!(builder.options.caption_keywords, vec!["plate"]);
    }

    #[test]
    fn test_builder_default() {
        let builder = Pagestruct::default();
        assert_eq!(builder.options, AnalysisOptions::default());
    }

    #[test]
    fn test_analyze_json_invalid() {
        let result = analyze_json("not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_analyze_json_empty_document() {
        let doc = analyze_json(r#"{"pages": []}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.chunks().is_empty());
    }

    #[test]
    fn test_analyze_file_missing() {
        let result = analyze_file("/nonexistent/extracted.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_analyze_file_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted.json");
        std::fs::write(&path, r#"{"title": "On disk", "pages": []}"#).unwrap();

        let doc = analyze_file(&path).unwrap();
        assert_eq!(
            doc.metadata().source.as_deref(),
            Some(path.display().to_string().as_str())
        );
        assert_eq!(doc.metadata().title.as_deref(), Some("On disk"));

        // An explicit source in the input wins over the path
        std::fs::write(&path, r#"{"source": "paper.pdf", "pages": []}"#).unwrap();
        let doc = analyze_file(&path).unwrap();
        assert_eq!(doc.metadata().source.as_deref(), Some("paper.pdf"));
    }

    #[test]
    fn test_result_wrapper() {
        let json = r#"{
            "title": "Sample",
            "pages": [{
                "index": 0, "width": 612, "height": 792,
                "spans": [{"text": "Just one sentence.", "bbox": [72, 300, 200, 312], "font_size": 12}]
            }]
        }"#;
        let input = DocumentInput::from_json(json).unwrap();
        let result = Pagestruct::new().sequential().analyze(&input).unwrap();

        assert_eq!(result.to_text(), "=== Page 1 ===\n\nJust one sentence.");
        assert_eq!(result.document().metadata().title.as_deref(), Some("Sample"));
        assert!(result.chunks_json(JsonFormat::Compact).unwrap().contains("Just one sentence."));
        assert_eq!(result.summary().stats.block_count(Category::Body), 1);
    }
}
