//! OCR word grouping and quality estimation.

use super::layout::TextLine;
use crate::model::{BBox, OcrWord, Span};
use std::cmp::Ordering;

/// Words further apart vertically than this start a new line.
const MAX_VERTICAL_GAP: f32 = 20.0;

/// Words further apart horizontally than this start a new line.
const MAX_HORIZONTAL_GAP: f32 = 50.0;

/// Most words collected into one line.
const MAX_LINE_WORDS: usize = 100;

/// Words of at most this many characters count as likely misreads.
const SHORT_WORD_LEN: usize = 2;

/// Mean line confidence (0-100) below which a line is low confidence.
pub const LOW_CONFIDENCE: f32 = 60.0;

/// Group a page's OCR words into text lines.
///
/// Words are read top to bottom, left to right. A word joins the running
/// line when its centre lies within the line's vertical extent (or within
/// 20pt of it) and it starts no more than 50pt right of the line. Span font
/// sizes are estimated from the line height.
pub fn group_ocr_words(words: &[OcrWord]) -> Vec<TextLine> {
    let mut sorted: Vec<&OcrWord> = words.iter().filter(|w| !w.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .y0
            .partial_cmp(&b.bbox.y0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });

    let mut groups: Vec<Vec<&OcrWord>> = Vec::new();
    let mut current: Vec<&OcrWord> = Vec::new();
    let mut extent: Option<BBox> = None;

    for word in sorted {
        let joins = match extent {
            Some(line) => joins_line(word, &line, current.len()),
            None => false,
        };
        if !joins && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            extent = None;
        }
        extent = Some(match extent {
            Some(line) => line.union(&word.bbox),
            None => word.bbox,
        });
        current.push(word);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups.into_iter().map(line_from_words).collect()
}

fn joins_line(word: &OcrWord, line: &BBox, count: usize) -> bool {
    let (_, cy) = word.bbox.center();
    if cy < line.y0 || cy > line.y1 {
        let vertical = (word.bbox.y0 - line.y1)
            .abs()
            .min((word.bbox.y1 - line.y0).abs());
        if vertical > MAX_VERTICAL_GAP {
            return false;
        }
    }

    let horizontal = (word.bbox.x0 - line.x1).max(0.0);
    horizontal <= MAX_HORIZONTAL_GAP && count <= MAX_LINE_WORDS
}

fn line_from_words(words: Vec<&OcrWord>) -> TextLine {
    let height = BBox::union_all(words.iter().map(|w| &w.bbox))
        .map(|b| b.height())
        .unwrap_or(0.0);
    let confidence = words.iter().map(|w| w.confidence).sum::<f32>() / words.len().max(1) as f32;

    let spans = words
        .iter()
        .map(|w| Span::new(w.text.trim(), w.bbox, w.page, height))
        .collect();

    TextLine::from_spans(spans).with_ocr_confidence(confidence)
}

/// Overall OCR quality in [0, 1].
///
/// Mean confidence scaled to [0, 1], reduced by half the share of words of
/// one or two characters. No words yields 0.
pub fn estimate_ocr_quality(words: &[OcrWord]) -> f32 {
    if words.is_empty() {
        return 0.0;
    }

    let total = words.len() as f32;
    let mean = words.iter().map(|w| w.confidence).sum::<f32>() / total;
    let short = words
        .iter()
        .filter(|w| w.text.trim().chars().count() <= SHORT_WORD_LEN)
        .count() as f32;

    ((mean / 100.0) * (1.0 - (short / total) * 0.5)).clamp(0.0, 1.0)
}
