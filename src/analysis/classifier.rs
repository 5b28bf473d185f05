//! Spatial classification of text lines.
//!
//! Each line is tested against an ordered list of rules; the first rule that
//! matches decides the category. The list is fixed at construction and can be
//! inspected with [`SpatialClassifier::rules`].

use super::{AnalysisOptions, FontContext, TextLine};
use crate::error::Result;
use crate::model::{BBox, Category, ClassifiedBlock};
use regex::{Regex, RegexBuilder};

/// Words that mark section headings wherever they appear in a line.
const TITLE_KEYWORDS: &[&str] = &[
    "abstract",
    "introduction",
    "conclusion",
    "discussion",
    "methodology",
    "results",
    "references",
    "bibliography",
    "acknowledgments",
    "appendix",
    "chapter",
    "section",
];

/// Upper size bound (as a median ratio) for footnotes that sit above the
/// bottom 15% of the page.
const FOOTNOTE_UPPER_BAND_RATIO: f32 = 0.85;

/// Top of the footnote band, as a fraction of the page height.
const FOOTNOTE_BAND_START: f32 = 0.70;

/// Footnotes without a marker or citation must be shorter than this.
const FOOTNOTE_MAX_PLAIN_LEN: usize = 120;

/// Predicate over a line's features.
pub type RulePredicate = fn(&SpatialClassifier, &LineFeatures<'_>) -> bool;

/// A named classification rule.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Rule name, as reported by [`SpatialClassifier::explain`]
    pub name: &'static str,
    /// Category assigned when the rule matches
    pub category: Category,
    predicate: RulePredicate,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

/// Everything the rules look at for one line.
#[derive(Debug, Clone)]
pub struct LineFeatures<'a> {
    /// Trimmed line text
    pub text: &'a str,
    /// Line bounding box
    pub bbox: BBox,
    /// Height of the line's page
    pub page_height: f32,
    /// Mean font size of the line
    pub avg_size: f32,
    /// Median font size the line is compared against
    pub median_size: f32,
    /// Whether any span is bold
    pub bold: bool,
    /// Layout region label containing the line centre
    pub hint: Option<&'a str>,
}

impl<'a> LineFeatures<'a> {
    /// Features of a plain line: body-sized, not bold, no hint.
    pub fn new(text: &'a str, bbox: BBox, page_height: f32) -> Self {
        Self {
            text: text.trim(),
            bbox,
            page_height,
            avg_size: 12.0,
            median_size: 12.0,
            bold: false,
            hint: None,
        }
    }

    /// Set the line's mean font size and the median it is compared to.
    pub fn with_sizes(mut self, avg_size: f32, median_size: f32) -> Self {
        self.avg_size = avg_size;
        self.median_size = median_size;
        self
    }

    /// Mark the line as containing a bold span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the layout hint.
    pub fn with_hint(mut self, hint: Option<&'a str>) -> Self {
        self.hint = hint;
        self
    }

    /// Top edge as a fraction of page height.
    ///
    /// `None` when the page height is missing, zero or not finite; the
    /// position rules never fire on such a page.
    pub fn top_ratio(&self) -> Option<f32> {
        ratio(self.bbox.y0, self.page_height)
    }

    /// Bottom edge as a fraction of page height, `None` like [`Self::top_ratio`].
    pub fn bottom_ratio(&self) -> Option<f32> {
        ratio(self.bbox.y1, self.page_height)
    }
}

fn ratio(value: f32, total: f32) -> Option<f32> {
    (total > 0.0 && total.is_finite()).then(|| value / total)
}

/// Fixed-priority line classifier.
#[derive(Debug, Clone)]
pub struct SpatialClassifier {
    header_threshold: f32,
    footer_threshold: f32,
    title_size_ratio: f32,
    footnote_size_ratio: f32,
    page_number_pattern: Regex,
    footnote_marker_pattern: Regex,
    citation_pattern: Regex,
    caption_pattern: Option<Regex>,
    list_patterns: Vec<Regex>,
    rules: Vec<Rule>,
}

impl SpatialClassifier {
    /// Build a classifier from analysis options.
    pub fn new(options: &AnalysisOptions) -> Result<Self> {
        let caption_pattern = if options.caption_keywords.is_empty() {
            None
        } else {
            let alternation = options
                .caption_keywords
                .iter()
                .map(|k| regex::escape(k.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"^\s*(?:{})\s*[:\d.]", alternation))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            header_threshold: options.header_threshold,
            footer_threshold: options.footer_threshold,
            title_size_ratio: options.title_size_ratio,
            footnote_size_ratio: options.footnote_size_ratio,
            page_number_pattern: RegexBuilder::new(r"^\s*(?:page\s*)?(\d+|[ivxlcdm]+)\s*$")
                .case_insensitive(true)
                .build()?,
            footnote_marker_pattern: Regex::new(r"^\s*[\d*†‡§¶#]+\s*[.:\-\s]")?,
            citation_pattern: RegexBuilder::new(
                r"\[\d+\]|\(\d{4}\)|et\s+al\.|ibid\.|op\.\s*cit\.",
            )
            .case_insensitive(true)
            .build()?,
            caption_pattern,
            list_patterns: vec![
                Regex::new(r"^\s*\d+\.\s+")?,
                Regex::new(r"^\s*[a-z]\)\s+")?,
                Regex::new(r"^\s*[•·‣▪▫▸▹◦‧⁃]\s+")?,
                Regex::new(r"^\s*[-*+]\s+")?,
            ],
            rules: default_rules(),
        })
    }

    /// The ordered rule list.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule matching the features, if any.
    pub fn first_match(&self, features: &LineFeatures<'_>) -> Option<&Rule> {
        self.rules.iter().find(|rule| (rule.predicate)(self, features))
    }

    /// Category for the features; body when no rule matches.
    pub fn categorize(&self, features: &LineFeatures<'_>) -> Category {
        self.first_match(features)
            .map(|rule| rule.category)
            .unwrap_or(Category::Body)
    }

    /// Name of the rule that decides the line's category.
    pub fn explain(&self, features: &LineFeatures<'_>) -> &'static str {
        self.first_match(features)
            .map(|rule| rule.name)
            .unwrap_or("body")
    }

    /// Classify a line into a block.
    ///
    /// Returns `None` for lines with empty text or a zero-area box; the caller
    /// counts those as skipped.
    pub fn classify_line(
        &self,
        line: &TextLine,
        page_height: f32,
        fonts: &FontContext,
        hint: Option<&str>,
    ) -> Option<ClassifiedBlock> {
        let (text, words) = line.layout_text();
        if text.is_empty() || line.bbox.is_degenerate() {
            return None;
        }

        let font_info = line.font_info();
        let features = LineFeatures::new(&text, line.bbox, page_height)
            .with_sizes(font_info.avg_size, fonts.median_for(line.page))
            .with_bold(font_info.bold)
            .with_hint(hint);
        let category = self.categorize(&features);

        let mut block = ClassifiedBlock::new(text.clone(), line.bbox, line.page, category);
        block.font_info = font_info;
        block.layout_type = hint.map(str::to_string);
        block.words = words;
        block.source = line.source;
        block.confidence = line.confidence;
        Some(block)
    }

    fn is_page_number(&self, f: &LineFeatures<'_>) -> bool {
        if f.text.chars().count() > 10 || !self.page_number_pattern.is_match(f.text) {
            return false;
        }
        f.top_ratio()
            .is_some_and(|top| top < self.header_threshold || top > self.footer_threshold)
    }

    fn is_header(&self, f: &LineFeatures<'_>) -> bool {
        f.top_ratio().is_some_and(|top| top < self.header_threshold)
    }

    fn is_footer(&self, f: &LineFeatures<'_>) -> bool {
        f.top_ratio().is_some_and(|top| top > self.footer_threshold)
    }

    fn is_footnote(&self, f: &LineFeatures<'_>) -> bool {
        let Some(bottom) = f.bottom_ratio() else {
            return false;
        };
        if bottom < FOOTNOTE_BAND_START {
            return false;
        }

        let limit = if bottom >= FOOTNOTE_UPPER_BAND_RATIO {
            self.footnote_size_ratio
        } else {
            self.footnote_size_ratio.min(FOOTNOTE_UPPER_BAND_RATIO)
        };
        if f.avg_size > f.median_size * limit {
            return false;
        }

        self.footnote_marker_pattern.is_match(f.text)
            || self.citation_pattern.is_match(f.text)
            || f.text.chars().count() < FOOTNOTE_MAX_PLAIN_LEN
    }

    fn is_caption(&self, f: &LineFeatures<'_>) -> bool {
        if f.hint
            .is_some_and(|h| h.to_lowercase().contains("caption"))
        {
            return true;
        }
        self.caption_pattern
            .as_ref()
            .is_some_and(|p| p.is_match(f.text))
    }

    fn is_list_item(&self, f: &LineFeatures<'_>) -> bool {
        self.list_patterns.iter().any(|p| p.is_match(f.text))
    }

    fn is_title(&self, f: &LineFeatures<'_>) -> bool {
        if f.hint.is_some_and(|h| h.eq_ignore_ascii_case("title")) {
            return true;
        }

        if f.avg_size >= f.median_size * self.title_size_ratio {
            return true;
        }

        let lower = f.text.to_lowercase();
        if TITLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return true;
        }

        if f.bold {
            return true;
        }

        f.text.chars().count() < 100 && is_all_caps(f.text) && f.text.split_whitespace().count() <= 10
    }
}

/// At least one cased character, and every cased character uppercase.
fn is_all_caps(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "page_number",
            category: Category::PageNumber,
            predicate: SpatialClassifier::is_page_number,
        },
        Rule {
            name: "header",
            category: Category::Header,
            predicate: SpatialClassifier::is_header,
        },
        Rule {
            name: "footer",
            category: Category::Footer,
            predicate: SpatialClassifier::is_footer,
        },
        Rule {
            name: "footnote",
            category: Category::Footnote,
            predicate: SpatialClassifier::is_footnote,
        },
        Rule {
            name: "caption",
            category: Category::Caption,
            predicate: SpatialClassifier::is_caption,
        },
        Rule {
            name: "list",
            category: Category::List,
            predicate: SpatialClassifier::is_list_item,
        },
        Rule {
            name: "title",
            category: Category::Title,
            predicate: SpatialClassifier::is_title,
        },
    ]
}
