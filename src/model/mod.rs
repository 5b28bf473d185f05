//! Data model for structural analysis.
//!
//! Inputs (spans, OCR words, layout regions, visual elements) come from the
//! upstream extractors; outputs (classified blocks, matches, chunks) make up
//! the analysed [`Document`]. All types serialize with serde.

mod block;
mod caption;
mod chunk;
mod document;
mod geometry;
mod page;
mod span;
mod visual;

pub use block::{Category, ClassifiedBlock, FontInfo, TextSource, Word};
pub use caption::{
    CandidateOrigin, CaptionCandidate, CaptionInfo, CaptionSource, CaptionType, ElementRef, Match,
};
pub use chunk::{Chunk, Sentence};
pub use document::{Document, Metadata, QualityReport};
pub use geometry::BBox;
pub use page::{DocumentInput, PageContent, PageInfo, PageSource};
pub use span::{LayoutRegion, OcrWord, Span, FLAG_BOLD, FLAG_ITALIC};
pub use visual::{CaptionRef, ElementType, VisualElement};
