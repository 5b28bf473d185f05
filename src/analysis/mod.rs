//! Structural analysis: classification, merging, caption matching, reading
//! order and chunking.

mod caption;
mod chunker;
mod classifier;
mod font_stats;
mod layout;
mod merger;
mod ocr;
mod options;
mod pipeline;
mod reading_order;
mod sentence;

pub use caption::{CaptionMatcher, CaptionPatterns, DetectedCaption, MatchSummary, Pairing};
pub use chunker::ChunkAssembler;
pub use classifier::{LineFeatures, Rule, RulePredicate, SpatialClassifier};
pub use font_stats::{FontContext, FontStatsCollector, DEFAULT_BODY_SIZE};
pub use layout::{group_spans_into_lines, layout_hint, prepare_layout_regions, TextLine};
pub use merger::RegionMerger;
pub use ocr::{estimate_ocr_quality, group_ocr_words, LOW_CONFIDENCE};
pub use options::{AnalysisOptions, ChunkOptions, FontScope};
pub use pipeline::StructureAnalyzer;
pub use reading_order::ReadingOrderResolver;
pub use sentence::SentenceBuilder;
