//! Sentences and chunks.

use super::{BBox, Category};
use serde::{Deserialize, Serialize};

/// A sentence with its dominant category and word boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// 0-based page index
    pub page: usize,
    /// Space-joined words
    pub text: String,
    /// Majority category of the sentence's words
    pub category: Category,
    /// Box of every word
    pub word_boxes: Vec<BBox>,
}

impl Sentence {
    /// Create a new sentence.
    pub fn new(page: usize, text: impl Into<String>, category: Category) -> Self {
        Self {
            page,
            text: text.into(),
            category,
            word_boxes: Vec::new(),
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A bounded run of same-category sentences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in the document
    pub order_idx: usize,
    /// Page of the first sentence
    pub page: usize,
    /// Category shared by every sentence
    pub section: Category,
    /// Sentences joined by a single space
    pub text: String,
    /// Word boxes of every sentence
    pub boxes: Vec<BBox>,
    /// Number of sentences
    pub sentence_count: usize,
}
