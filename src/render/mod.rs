//! Rendering module for exporting analysed documents.

mod json;
mod result;
mod text;

pub use json::{chunks_to_json, to_json, JsonFormat};
pub use result::{AnalysisStats, AnalysisSummary};
pub use text::to_text;
