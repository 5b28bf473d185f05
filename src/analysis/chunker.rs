//! Chunk assembly.

use super::ChunkOptions;
use crate::model::{BBox, Category, Chunk, Sentence};

/// Packs ordered sentences into bounded, single-category chunks.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    max_sentences: usize,
    max_chars: usize,
}

/// The chunk being filled.
struct Running<'a> {
    page: usize,
    section: Category,
    texts: Vec<&'a str>,
    boxes: Vec<BBox>,
    chars: usize,
}

impl<'a> Running<'a> {
    fn start(sentence: &'a Sentence) -> Self {
        Self {
            page: sentence.page,
            section: sentence.category,
            texts: vec![sentence.text.as_str()],
            boxes: sentence.word_boxes.clone(),
            chars: sentence.char_len(),
        }
    }

    fn add(&mut self, sentence: &'a Sentence) {
        self.texts.push(sentence.text.as_str());
        self.boxes.extend_from_slice(&sentence.word_boxes);
        self.chars += sentence.char_len();
    }

    fn finish(self, order_idx: usize) -> Chunk {
        Chunk {
            order_idx,
            page: self.page,
            section: self.section,
            text: self.texts.join(" "),
            sentence_count: self.texts.len(),
            boxes: self.boxes,
        }
    }
}

impl ChunkAssembler {
    /// Create an assembler from chunk options.
    pub fn new(options: &ChunkOptions) -> Self {
        Self {
            max_sentences: options.max_sentences,
            max_chars: options.max_chars,
        }
    }

    /// Assemble chunks from sentences in reading order.
    ///
    /// A new chunk starts when the category changes, the running chunk is
    /// full, or the next sentence would push it past `max_chars` (joining
    /// spaces not counted). A sentence longer than `max_chars` is a chunk of
    /// its own.
    pub fn assemble(&self, sentences: &[Sentence]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut running: Option<Running<'_>> = None;

        for sentence in sentences {
            running = match running.take() {
                Some(mut current) if !self.breaks_before(&current, sentence) => {
                    current.add(sentence);
                    Some(current)
                }
                Some(current) => {
                    chunks.push(current.finish(chunks.len()));
                    Some(Running::start(sentence))
                }
                None => Some(Running::start(sentence)),
            };
        }
        if let Some(current) = running {
            chunks.push(current.finish(chunks.len()));
        }

        log::debug!("Assembled {} chunks from {} sentences", chunks.len(), sentences.len());
        chunks
    }

    fn breaks_before(&self, current: &Running<'_>, next: &Sentence) -> bool {
        next.category != current.section
            || current.texts.len() >= self.max_sentences
            || current.chars + next.char_len() > self.max_chars
    }
}
