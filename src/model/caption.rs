//! Caption metadata and caption-to-element matches.

use super::{BBox, ElementType};
use serde::{Deserialize, Serialize};

/// Kind of object a caption describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionType {
    /// "Figure 3", "Fig. 2"
    Figure,
    /// "Table 1"
    Table,
    /// "Equation 4", "Eq. (2)"
    Equation,
    /// "Algorithm 1", "Listing 2"
    Algorithm,
    /// Caption with no recognised keyword
    Generic,
}

impl CaptionType {
    /// Snake-case name, as used in match types.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionType::Figure => "figure",
            CaptionType::Table => "table",
            CaptionType::Equation => "equation",
            CaptionType::Algorithm => "algorithm",
            CaptionType::Generic => "generic",
        }
    }

    /// Element types this caption type describes directly.
    pub fn compatible_elements(&self) -> &'static [ElementType] {
        match self {
            CaptionType::Figure | CaptionType::Algorithm => {
                &[ElementType::Figure, ElementType::Image]
            }
            CaptionType::Table => &[ElementType::Table],
            CaptionType::Equation => &[ElementType::Formula],
            CaptionType::Generic => &[],
        }
    }
}

impl std::fmt::Display for CaptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a caption was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionSource {
    /// Classified as a caption directly
    #[default]
    Classifier,
    /// Recovered from body text by pattern
    BodyText,
}

/// Reference to a visual element: its type and its index in that type's
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Collection the element lives in
    pub element_type: ElementType,
    /// Index within the collection
    pub index: usize,
}

impl ElementRef {
    /// Create a new element reference.
    pub fn new(element_type: ElementType, index: usize) -> Self {
        Self {
            element_type,
            index,
        }
    }
}

/// Caption metadata carried on a caption block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionInfo {
    /// Detected caption type
    pub caption_type: CaptionType,
    /// Caption number ("3", "2.1", "IV")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Keyword as written ("Fig", "Table")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// How the caption was found
    pub source: CaptionSource,
    /// Matched element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_element: Option<ElementRef>,
    /// Match score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f32>,
    /// "{caption_type}_{element_type}"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
}

impl CaptionInfo {
    /// Create unmatched caption metadata.
    pub fn new(caption_type: CaptionType, source: CaptionSource) -> Self {
        Self {
            caption_type,
            number: None,
            keyword: None,
            source,
            matched_element: None,
            match_score: None,
            match_type: None,
        }
    }
}

/// Where a caption candidate lives before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateOrigin {
    /// Index into the caption collection
    Caption(usize),
    /// Index into the body collection
    Body(usize),
}

/// A caption block, or a body block that looks like one, awaiting matching.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCandidate {
    /// Handle to the underlying block
    pub origin: CandidateOrigin,
    /// Page of the block
    pub page: usize,
    /// Box of the block
    pub bbox: BBox,
    /// Detected caption type
    pub caption_type: CaptionType,
    /// Caption number
    pub number: Option<String>,
    /// Keyword as written
    pub keyword: Option<String>,
}

impl CaptionCandidate {
    /// Caption metadata for this candidate.
    pub fn info(&self) -> CaptionInfo {
        let source = match self.origin {
            CandidateOrigin::Caption(_) => CaptionSource::Classifier,
            CandidateOrigin::Body(_) => CaptionSource::BodyText,
        };
        CaptionInfo {
            number: self.number.clone(),
            keyword: self.keyword.clone(),
            ..CaptionInfo::new(self.caption_type, source)
        }
    }
}

/// A 1:1 association between a caption and a visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Index into the document's caption collection
    pub caption: usize,
    /// Matched element
    pub element: ElementRef,
    /// Combined score in [0, 1]
    pub score: f32,
    /// "{caption_type}_{element_type}"
    pub match_type: String,
}

impl Match {
    /// Build the match type label for a caption/element pair.
    pub fn type_label(caption_type: CaptionType, element_type: ElementType) -> String {
        format!("{}_{}", caption_type, element_type)
    }
}
