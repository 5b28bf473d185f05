//! Sentence building from ordered blocks.

use super::AnalysisOptions;
use crate::model::{BBox, Category, ClassifiedBlock, Document, ElementType, Sentence};
use unicode_normalization::UnicodeNormalization;

/// Slack (points) when testing whether a word lies inside an element.
const ELEMENT_TOLERANCE: f32 = 2.0;

/// Closing characters allowed after sentence-ending punctuation.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

/// Splits block words into sentences, page by page, in reading order.
#[derive(Debug, Clone)]
pub struct SentenceBuilder {
    max_sentence_chars: usize,
    exclude: Vec<Category>,
    exclude_elements: Vec<ElementType>,
}

/// Words of the sentence being built.
#[derive(Default)]
struct Pending {
    page: usize,
    words: Vec<String>,
    boxes: Vec<BBox>,
    categories: Vec<(Category, usize)>,
    chars: usize,
}

impl Pending {
    fn push(&mut self, page: usize, text: String, bbox: BBox, category: Category) {
        if self.words.is_empty() {
            self.page = page;
        } else {
            self.chars += 1;
        }
        self.chars += text.chars().count();
        self.words.push(text);
        self.boxes.push(bbox);

        match self.categories.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => self.categories.push((category, 1)),
        }
    }

    fn take(&mut self) -> Option<Sentence> {
        if self.words.is_empty() {
            return None;
        }
        let pending = std::mem::take(self);

        // Majority vote; the first category seen wins ties.
        let mut category = Category::Body;
        let mut best = 0;
        for (c, count) in pending.categories {
            if count > best {
                category = c;
                best = count;
            }
        }

        Some(Sentence {
            page: pending.page,
            text: pending.words.join(" "),
            category,
            word_boxes: pending.boxes,
        })
    }
}

impl SentenceBuilder {
    /// Create a builder from analysis options.
    pub fn new(options: &AnalysisOptions) -> Self {
        Self {
            max_sentence_chars: options.chunk.max_sentence_chars,
            exclude: options.chunk.exclude.clone(),
            exclude_elements: options.chunk.exclude_elements.clone(),
        }
    }

    /// Sentences of a whole document, following block reading order.
    ///
    /// Words inside an element of an excluded type are dropped first.
    pub fn build(&self, doc: &Document) -> Vec<Sentence> {
        let regions: Vec<(usize, BBox)> = self
            .exclude_elements
            .iter()
            .flat_map(|t| doc.elements(*t))
            .map(|e| (e.page, e.bbox))
            .collect();
        self.split(doc.blocks_in_order(), &regions)
    }

    /// Sentences from blocks already in reading order.
    ///
    /// A sentence never crosses a page. It ends after a word closing with
    /// `.`, `?` or `!`, or before a word that would take it past the
    /// configured length.
    pub fn build_from_blocks<'a, I>(&self, blocks: I) -> Vec<Sentence>
    where
        I: IntoIterator<Item = &'a ClassifiedBlock>,
    {
        self.split(blocks, &[])
    }

    fn split<'a, I>(&self, blocks: I, regions: &[(usize, BBox)]) -> Vec<Sentence>
    where
        I: IntoIterator<Item = &'a ClassifiedBlock>,
    {
        let mut sentences = Vec::new();
        let mut pending = Pending::default();
        let mut dropped = 0;

        for block in blocks {
            if self.exclude.contains(&block.category) {
                continue;
            }
            if !pending.words.is_empty() && pending.page != block.page {
                sentences.extend(pending.take());
            }

            for (text, bbox) in block_words(block) {
                let inside = regions
                    .iter()
                    .any(|(page, r)| *page == block.page && r.contains(&bbox, ELEMENT_TOLERANCE));
                if inside {
                    dropped += 1;
                    continue;
                }
                let len = text.chars().count();
                if !pending.words.is_empty() && pending.chars + 1 + len > self.max_sentence_chars {
                    sentences.extend(pending.take());
                }
                let ends = ends_sentence(&text);
                pending.push(block.page, text, bbox, block.category);
                if ends {
                    sentences.extend(pending.take());
                }
            }
        }
        sentences.extend(pending.take());

        log::debug!(
            "Built {} sentences ({} words inside excluded elements)",
            sentences.len(),
            dropped
        );
        sentences
    }
}

/// Normalised words of a block. Blocks without word boxes fall back to
/// whitespace splitting with the block box.
fn block_words(block: &ClassifiedBlock) -> Vec<(String, BBox)> {
    if block.words.is_empty() {
        return block
            .text
            .split_whitespace()
            .map(|w| (w.nfc().collect(), block.bbox))
            .collect();
    }
    block
        .words
        .iter()
        .filter(|w| !w.text.trim().is_empty())
        .map(|w| (w.text.trim().nfc().collect(), w.bbox))
        .collect()
}

fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(CLOSERS)
        .ends_with(['.', '?', '!'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ChunkOptions;
    use crate::model::Word;

    fn block(text: &str, page: usize, category: Category) -> ClassifiedBlock {
        let mut block = ClassifiedBlock::new(text, BBox::new(72.0, 100.0, 500.0, 112.0), page, category);
        let mut x = 72.0;
        for w in text.split_whitespace() {
            let width = w.chars().count() as f32 * 5.0;
            block.words.push(Word::new(w, BBox::new(x, 100.0, x + width, 112.0)));
            x += width + 3.0;
        }
        block
    }

    fn builder() -> SentenceBuilder {
        SentenceBuilder::new(&AnalysisOptions::default())
    }

    #[test]
    fn test_split_on_terminal_punctuation() {
        let blocks = vec![block("One two. Three four? Five (six).\" Seven", 0, Category::Body)];
        let sentences = builder().build_from_blocks(&blocks);

        let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["One two.", "Three four?", "Five (six).\"", "Seven"]);
        assert_eq!(sentences[0].word_boxes.len(), 2);
        assert!(sentences.iter().all(|s| s.category == Category::Body));
    }

    #[test]
    fn test_sentences_span_blocks_but_not_pages() {
        let blocks = vec![
            block("A sentence that", 0, Category::Body),
            block("continues here.", 0, Category::Body),
            block("Dangling", 0, Category::Body),
            block("next page.", 1, Category::Body),
        ];
        let sentences = builder().build_from_blocks(&blocks);

        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text, "A sentence that continues here.");
        assert_eq!(sentences[1].text, "Dangling");
        assert_eq!(sentences[1].page, 0);
        assert_eq!(sentences[2].page, 1);
    }

    #[test]
    fn test_majority_category_and_tie() {
        let blocks = vec![
            block("Results", 0, Category::Title),
            block("were good overall.", 0, Category::Body),
            block("Short", 0, Category::Title),
            block("end.", 0, Category::Body),
        ];
        let sentences = builder().build_from_blocks(&blocks);

        assert_eq!(sentences[0].category, Category::Body);
        // One word each: the first seen wins
        assert_eq!(sentences[1].category, Category::Title);
    }

    #[test]
    fn test_excluded_categories_are_removed() {
        let options = AnalysisOptions::default().with_chunk_options(ChunkOptions {
            exclude: vec![Category::Footnote],
            ..Default::default()
        });
        let blocks = vec![
            block("Body starts", 0, Category::Body),
            block("1 A footnote.", 0, Category::Footnote),
            block("and ends.", 0, Category::Body),
        ];
        let sentences = SentenceBuilder::new(&options).build_from_blocks(&blocks);

        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "Body starts and ends.");
    }

    #[test]
    fn test_force_split_at_length() {
        let options = AnalysisOptions::default().with_chunk_options(ChunkOptions {
            max_sentence_chars: 10,
            ..Default::default()
        });
        let blocks = vec![block("aaaa bbbb cccc dd", 0, Category::Body)];
        let sentences = SentenceBuilder::new(&options).build_from_blocks(&blocks);

        let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["aaaa bbbb", "cccc dd"]);
    }

    #[test]
    fn test_text_fallback_and_normalization() {
        let block = ClassifiedBlock::new(
            "Cafe\u{0301} au lait.",
            BBox::new(0.0, 0.0, 100.0, 10.0),
            2,
            Category::Body,
        );
        let sentences = builder().build_from_blocks([&block]);

        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "Caf\u{00E9} au lait.");
        assert_eq!(sentences[0].word_boxes, vec![block.bbox; 3]);
        assert_eq!(sentences[0].page, 2);
    }

    #[test]
    fn test_words_inside_excluded_elements_are_dropped() {
        use crate::model::{Metadata, VisualElement};

        let mut doc = Document::new(Metadata::default());
        let mut before = block("The table below lists results.", 0, Category::Body);
        before.reading_order = Some(0);
        let mut cells = block("Alpha 12 Beta 34", 0, Category::Body);
        for word in &mut cells.words {
            word.bbox = BBox::new(word.bbox.x0, 250.0, word.bbox.x1, 262.0);
        }
        cells.reading_order = Some(1);
        // Same position on the next page, outside any table there
        let mut after = block("Text after the table.", 1, Category::Body);
        for word in &mut after.words {
            word.bbox = BBox::new(word.bbox.x0, 250.0, word.bbox.x1, 262.0);
        }
        after.reading_order = Some(2);
        doc.body = vec![before, cells, after];
        doc.tables.push(VisualElement::new(
            ElementType::Table,
            BBox::new(60.0, 240.0, 520.0, 300.0),
            0,
        ));

        let texts: Vec<String> = builder().build(&doc).into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["The table below lists results.", "Text after the table."]);

        let keep_tables = AnalysisOptions::default().with_chunk_options(ChunkOptions {
            exclude_elements: Vec::new(),
            ..Default::default()
        });
        let texts: Vec<String> = SentenceBuilder::new(&keep_tables)
            .build(&doc)
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(
            texts,
            vec!["The table below lists results.", "Alpha 12 Beta 34", "Text after the table."]
        );
    }
}
