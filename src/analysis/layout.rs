//! Line assembly and layout region handling.
//!
//! Extractors report flat spans. This module groups them into visual lines,
//! joins their text with gap-aware spacing, and interpolates a box for every
//! word. Layout detector regions are filtered, de-duplicated and used as
//! classification hints.

use crate::model::{BBox, FontInfo, LayoutRegion, Span, TextSource, Word};
use std::cmp::Ordering;

/// IoU above which two layout regions are treated as the same region.
const REGION_MERGE_IOU: f32 = 0.5;

/// A visual line: spans sharing a baseline, sorted left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// The spans in this line, sorted by x0
    pub spans: Vec<Span>,
    /// 0-based page index
    pub page: usize,
    /// Union of the span boxes
    pub bbox: BBox,
    /// Native text layer or OCR
    pub source: TextSource,
    /// Mean OCR confidence for OCR lines
    pub confidence: Option<f32>,
}

impl TextLine {
    /// Create a new line from spans.
    pub fn from_spans(mut spans: Vec<Span>) -> Self {
        spans.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));

        let bbox = BBox::union_all(spans.iter().map(|s| &s.bbox)).unwrap_or_default();
        let page = spans.first().map(|s| s.page).unwrap_or(0);

        Self {
            spans,
            page,
            bbox,
            source: TextSource::Native,
            confidence: None,
        }
    }

    /// Mark the line as OCR output with the given mean confidence.
    pub fn with_ocr_confidence(mut self, confidence: f32) -> Self {
        self.source = TextSource::Ocr;
        self.confidence = Some(confidence);
        self
    }

    /// Get the combined text of all spans with appropriate spacing.
    ///
    /// Inserts spaces between spans based on their horizontal gaps. No space
    /// is inserted between adjacent CJK characters.
    pub fn text(&self) -> String {
        self.layout_text().0
    }

    /// Word boxes, interpolated from the span geometry.
    pub fn words(&self) -> Vec<Word> {
        self.layout_text().1
    }

    /// Joined text together with its words.
    pub fn layout_text(&self) -> (String, Vec<Word>) {
        let mut text = String::new();
        // One entry per char of `text`; inserted spaces carry no box.
        let mut char_boxes: Vec<Option<BBox>> = Vec::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 && self.needs_space(&self.spans[i - 1], span) {
                text.push(' ');
                char_boxes.push(None);
            }

            let count = span.text.chars().count();
            let step = if count > 0 {
                span.bbox.width() / count as f32
            } else {
                0.0
            };
            for (k, c) in span.text.chars().enumerate() {
                text.push(c);
                let x0 = span.bbox.x0 + step * k as f32;
                char_boxes.push(Some(BBox::new(x0, span.bbox.y0, x0 + step, span.bbox.y1)));
            }
        }

        let mut words = Vec::new();
        let mut current = String::new();
        let mut current_box: Option<BBox> = None;
        for (c, b) in text.chars().zip(char_boxes.iter()) {
            if c.is_whitespace() {
                flush_word(&mut words, &mut current, &mut current_box);
                continue;
            }
            current.push(c);
            if let Some(b) = b {
                current_box = Some(match current_box {
                    Some(acc) => acc.union(b),
                    None => *b,
                });
            }
        }
        flush_word(&mut words, &mut current, &mut current_box);

        (text.trim().to_string(), words)
    }

    fn needs_space(&self, prev: &Span, span: &Span) -> bool {
        let gap = span.bbox.x0 - prev.bbox.x1;

        // Estimate average character width from current span
        let char_count = span.text.chars().count();
        let avg_char_width = if char_count > 0 && span.bbox.width() > 0.0 {
            span.bbox.width() / char_count as f32
        } else {
            span.font_size * 0.5
        };

        if gap <= avg_char_width * 0.2 {
            return false;
        }

        let prev_ends_with_space =
            prev.text.ends_with(' ') || prev.text.ends_with('\u{00A0}');
        let curr_starts_with_space =
            span.text.starts_with(' ') || span.text.starts_with('\u{00A0}');
        if prev_ends_with_space || curr_starts_with_space {
            return false;
        }

        let prev_is_cjk = prev
            .text
            .chars()
            .last()
            .map(is_spaceless_script_char)
            .unwrap_or(false);
        let curr_is_cjk = span
            .text
            .chars()
            .next()
            .map(is_spaceless_script_char)
            .unwrap_or(false);

        !(prev_is_cjk && curr_is_cjk)
    }

    /// Aggregated font information.
    pub fn font_info(&self) -> FontInfo {
        FontInfo::from_spans(&self.spans)
    }
}

fn flush_word(words: &mut Vec<Word>, current: &mut String, current_box: &mut Option<BBox>) {
    if current.is_empty() {
        return;
    }
    words.push(Word::new(
        std::mem::take(current),
        current_box.take().unwrap_or_default(),
    ));
}

/// Group a page's spans into lines.
///
/// Spans whose vertical centres lie within 30% of the font size join the same
/// line; a line is split wherever the horizontal gap between neighbours
/// exceeds `column_gap`, so aligned rows of adjacent columns stay apart.
pub fn group_spans_into_lines(spans: Vec<Span>, column_gap: f32) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    let mut spans = spans;
    spans.sort_by(|a, b| {
        let y_cmp = a
            .bbox
            .center()
            .1
            .partial_cmp(&b.bbox.center().1)
            .unwrap_or(Ordering::Equal);
        if y_cmp == Ordering::Equal {
            a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut rows: Vec<Vec<Span>> = Vec::new();
    let mut current_row: Vec<Span> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let size = if span.font_size > 0.0 {
            span.font_size
        } else {
            span.bbox.height()
        };
        let y_tolerance = size * 0.3;
        let y = span.bbox.center().1;

        match current_y {
            Some(row_y) if (y - row_y).abs() <= y_tolerance => current_row.push(span),
            _ => {
                if !current_row.is_empty() {
                    rows.push(std::mem::take(&mut current_row));
                }
                current_y = Some(y);
                current_row.push(span);
            }
        }
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    let mut lines = Vec::new();
    for mut row in rows {
        row.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));

        let mut segment: Vec<Span> = Vec::new();
        for span in row {
            if let Some(last) = segment.last() {
                if span.bbox.x0 - last.bbox.x1 > column_gap {
                    lines.push(TextLine::from_spans(std::mem::take(&mut segment)));
                }
            }
            segment.push(span);
        }
        if !segment.is_empty() {
            lines.push(TextLine::from_spans(segment));
        }
    }

    lines
}

/// Drop low-confidence regions and merge regions that overlap heavily.
///
/// Returns the surviving regions and the number dropped for low confidence.
/// Merged regions take the label of their largest member, the union box,
/// and the mean confidence.
pub fn prepare_layout_regions(
    regions: &[LayoutRegion],
    confidence_threshold: f32,
) -> (Vec<LayoutRegion>, usize) {
    let kept: Vec<&LayoutRegion> = regions
        .iter()
        .filter(|r| r.confidence >= confidence_threshold)
        .collect();
    let dropped = regions.len() - kept.len();

    let mut used = vec![false; kept.len()];
    let mut merged = Vec::new();

    for i in 0..kept.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut group = vec![kept[i]];

        for j in (i + 1)..kept.len() {
            if !used[j]
                && kept[i].page == kept[j].page
                && kept[i].bbox.overlap_ratio(&kept[j].bbox) > REGION_MERGE_IOU
            {
                used[j] = true;
                group.push(kept[j]);
            }
        }

        if group.len() == 1 {
            merged.push(kept[i].clone());
            continue;
        }

        let largest = group
            .iter()
            .max_by(|a, b| {
                a.bbox
                    .area()
                    .partial_cmp(&b.bbox.area())
                    .unwrap_or(Ordering::Equal)
            })
            .copied()
            .unwrap_or(kept[i]);
        let bbox = BBox::union_all(group.iter().map(|r| &r.bbox)).unwrap_or(largest.bbox);
        let confidence = group.iter().map(|r| r.confidence).sum::<f32>() / group.len() as f32;

        merged.push(LayoutRegion::new(
            largest.region_type.clone(),
            confidence,
            bbox,
            largest.page,
        ));
    }

    if dropped > 0 || merged.len() + dropped < regions.len() {
        log::debug!(
            "Layout regions: {} in, {} below confidence, {} after merging",
            regions.len(),
            dropped,
            merged.len()
        );
    }

    (merged, dropped)
}

/// Label of the first region containing the centre of `bbox`.
pub fn layout_hint(bbox: &BBox, regions: &[LayoutRegion]) -> Option<String> {
    let (cx, cy) = bbox.center();
    regions
        .iter()
        .find(|r| r.bbox.contains_point(cx, cy))
        .map(LayoutRegion::hint)
}

/// Check if a character belongs to a script written without word spaces.
///
/// Hangul is excluded: Korean uses word spaces like English.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Span {
        Span::new(text, BBox::new(x0, y0, x1, y1), 0, 10.0)
    }

    #[test]
    fn test_text_inserts_space_on_gap() {
        let line = TextLine::from_spans(vec![
            span("world", 60.0, 0.0, 90.0, 10.0),
            span("Hello", 10.0, 0.0, 40.0, 10.0),
        ]);
        assert_eq!(line.text(), "Hello world");
    }

    #[test]
    fn test_text_no_space_when_touching() {
        let line = TextLine::from_spans(vec![
            span("Fig", 10.0, 0.0, 28.0, 10.0),
            span("ure", 28.0, 0.0, 46.0, 10.0),
        ]);
        assert_eq!(line.text(), "Figure");
        let words = line.words();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].bbox.x0, 10.0);
        assert_eq!(words[0].bbox.x1, 46.0);
    }

    #[test]
    fn test_text_no_space_between_cjk() {
        let line = TextLine::from_spans(vec![
            span("日本", 10.0, 0.0, 30.0, 10.0),
            span("語", 40.0, 0.0, 50.0, 10.0),
        ]);
        assert_eq!(line.text(), "日本語");
    }

    #[test]
    fn test_words_are_interpolated() {
        let line = TextLine::from_spans(vec![span("ab cd", 0.0, 0.0, 50.0, 10.0)]);
        let words = line.words();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "ab");
        assert_eq!(words[0].bbox, BBox::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(words[1].text, "cd");
        assert_eq!(words[1].bbox, BBox::new(30.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn test_group_spans_into_lines() {
        let spans = vec![
            span("second", 10.0, 30.0, 50.0, 40.0),
            span("first", 10.0, 10.0, 40.0, 20.0),
            span("line", 45.0, 11.0, 70.0, 21.0),
        ];
        let lines = group_spans_into_lines(spans, 50.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "first line");
        assert_eq!(lines[1].text(), "second");
        assert_eq!(lines[0].bbox, BBox::new(10.0, 10.0, 70.0, 21.0));
    }

    #[test]
    fn test_group_splits_columns() {
        let spans = vec![
            span("left", 50.0, 100.0, 250.0, 110.0),
            span("right", 320.0, 100.0, 520.0, 110.0),
        ];
        let lines = group_spans_into_lines(spans, 50.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "left");
        assert_eq!(lines[1].text(), "right");
    }

    #[test]
    fn test_prepare_layout_regions() {
        let regions = vec![
            LayoutRegion::new("Text", 0.9, BBox::new(0.0, 0.0, 100.0, 100.0), 0),
            LayoutRegion::new("Title", 0.8, BBox::new(0.0, 0.0, 90.0, 90.0), 0),
            LayoutRegion::new("Figure", 0.5, BBox::new(200.0, 200.0, 300.0, 300.0), 0),
        ];
        let (merged, dropped) = prepare_layout_regions(&regions, 0.7);
        assert_eq!(dropped, 1);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].region_type, "Text");
        assert!((merged[0].confidence - 0.85).abs() < 1e-6);
        assert_eq!(merged[0].bbox, BBox::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_layout_hint_by_centre() {
        let regions = vec![LayoutRegion::new(
            "Figure-Caption",
            0.9,
            BBox::new(0.0, 100.0, 300.0, 130.0),
            0,
        )];
        assert_eq!(
            layout_hint(&BBox::new(10.0, 105.0, 200.0, 120.0), &regions).as_deref(),
            Some("figure-caption")
        );
        assert_eq!(layout_hint(&BBox::new(10.0, 10.0, 200.0, 20.0), &regions), None);
    }
}
