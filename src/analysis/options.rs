//! Analysis options and configuration.

use crate::error::{Error, Result};
use crate::model::{Category, ElementType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for structural analysis.
///
/// Every component receives the same immutable options at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Lines whose top lies above this fraction of the page height are headers
    pub header_threshold: f32,

    /// Lines whose top lies below this fraction of the page height are footers
    pub footer_threshold: f32,

    /// Font size ratio over the median that marks a title
    pub title_size_ratio: f32,

    /// Font size ratio under the median allowed for footnotes
    pub footnote_size_ratio: f32,

    /// Keywords that open a caption ("figure", "tab", ...)
    pub caption_keywords: Vec<String>,

    /// Edge distance (points) at which caption proximity scores 0
    pub caption_proximity_threshold: f32,

    /// Minimum score for a caption/element match
    pub caption_min_score: f32,

    /// Largest vertical gap (points) between lines merged into one block
    pub text_merge_threshold: f32,

    /// Largest left-edge difference (points) between lines merged into one block
    pub merge_x_tolerance: f32,

    /// Categories that take part in adjacency merging
    pub merge_categories: Vec<Category>,

    /// Horizontal gap (points) between x0 values that separates columns
    pub column_gap_threshold: f32,

    /// Layout regions below this confidence are ignored
    pub layout_confidence_threshold: f32,

    /// Text coverage below which OCR words replace the native text layer
    pub ocr_fallback_threshold: f32,

    /// Number of leading pages sampled for text coverage
    pub ocr_sample_pages: usize,

    /// Scope of the median font size
    pub font_scope: FontScope,

    /// Whether to load and classify pages in parallel
    pub parallel: bool,

    /// Whether to resolve reading order
    pub preserve_reading_order: bool,

    /// Chunking bounds
    pub chunk: ChunkOptions,
}

impl AnalysisOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header band threshold.
    pub fn with_header_threshold(mut self, ratio: f32) -> Self {
        self.header_threshold = ratio;
        self
    }

    /// Set the footer band threshold.
    pub fn with_footer_threshold(mut self, ratio: f32) -> Self {
        self.footer_threshold = ratio;
        self
    }

    /// Set the title font size ratio.
    pub fn with_title_size_ratio(mut self, ratio: f32) -> Self {
        self.title_size_ratio = ratio;
        self
    }

    /// Replace the caption keyword list.
    pub fn with_caption_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.caption_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the caption proximity threshold.
    pub fn with_caption_proximity(mut self, points: f32) -> Self {
        self.caption_proximity_threshold = points;
        self
    }

    /// Set the vertical merge threshold.
    pub fn with_merge_threshold(mut self, points: f32) -> Self {
        self.text_merge_threshold = points;
        self
    }

    /// Restrict adjacency merging to the given categories.
    pub fn with_merge_categories(mut self, categories: Vec<Category>) -> Self {
        self.merge_categories = categories;
        self
    }

    /// Set the column gap threshold.
    pub fn with_column_gap(mut self, points: f32) -> Self {
        self.column_gap_threshold = points;
        self
    }

    /// Set the font statistics scope.
    pub fn with_font_scope(mut self, scope: FontScope) -> Self {
        self.font_scope = scope;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set chunking bounds.
    pub fn with_chunk_options(mut self, chunk: ChunkOptions) -> Self {
        self.chunk = chunk;
        self
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("header_threshold", self.header_threshold),
            ("footer_threshold", self.footer_threshold),
            ("caption_min_score", self.caption_min_score),
            ("layout_confidence_threshold", self.layout_confidence_threshold),
            ("ocr_fallback_threshold", self.ocr_fallback_threshold),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.header_threshold >= self.footer_threshold {
            return Err(Error::InvalidConfig(format!(
                "header_threshold ({}) must be below footer_threshold ({})",
                self.header_threshold, self.footer_threshold
            )));
        }

        let distances = [
            ("title_size_ratio", self.title_size_ratio),
            ("footnote_size_ratio", self.footnote_size_ratio),
            ("caption_proximity_threshold", self.caption_proximity_threshold),
            ("text_merge_threshold", self.text_merge_threshold),
            ("merge_x_tolerance", self.merge_x_tolerance),
            ("column_gap_threshold", self.column_gap_threshold),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.caption_proximity_threshold == 0.0 {
            return Err(Error::InvalidConfig(
                "caption_proximity_threshold must be positive".to_string(),
            ));
        }

        if self.caption_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "caption_keywords must not contain empty entries".to_string(),
            ));
        }

        self.chunk.validate()
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let options: AnalysisOptions = serde_json::from_str(&data)?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            header_threshold: 0.10,
            footer_threshold: 0.90,
            title_size_ratio: 1.3,
            footnote_size_ratio: 0.9,
            caption_keywords: ["figure", "fig", "table", "tab", "equation", "eq", "algorithm", "alg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            caption_proximity_threshold: 100.0,
            caption_min_score: 0.3,
            text_merge_threshold: 5.0,
            merge_x_tolerance: 20.0,
            merge_categories: Category::ALL.to_vec(),
            column_gap_threshold: 50.0,
            layout_confidence_threshold: 0.7,
            ocr_fallback_threshold: 0.1,
            ocr_sample_pages: 10,
            font_scope: FontScope::Document,
            parallel: true,
            preserve_reading_order: true,
            chunk: ChunkOptions::default(),
        }
    }
}

/// Scope of the median font size used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontScope {
    /// One median over every page
    #[default]
    Document,
    /// One median per page
    Page,
}

/// Bounds for sentence building and chunk assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOptions {
    /// Most sentences per chunk
    pub max_sentences: usize,

    /// Most characters per chunk, excluding joining spaces
    pub max_chars: usize,

    /// Sentences are force-split at this length
    pub max_sentence_chars: usize,

    /// Categories left out of sentences and chunks
    pub exclude: Vec<Category>,

    /// Words lying inside elements of these types are left out of
    /// sentences and chunks (table cells, text baked into images, formulas)
    pub exclude_elements: Vec<ElementType>,
}

impl ChunkOptions {
    /// Check that every bound is positive.
    pub fn validate(&self) -> Result<()> {
        if self.max_sentences == 0 || self.max_chars == 0 || self.max_sentence_chars == 0 {
            return Err(Error::InvalidConfig(
                "chunk bounds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_sentences: 3,
            max_chars: 400,
            max_sentence_chars: 1000,
            exclude: Vec::new(),
            exclude_elements: vec![ElementType::Image, ElementType::Table, ElementType::Formula],
        }
    }
}
