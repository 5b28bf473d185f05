//! Caption detection and caption-to-element matching.
//!
//! Candidates are the caption blocks plus body blocks that open with a
//! caption keyword. Each candidate, in (page, y0) order, takes the best
//! scoring unconsumed element above the minimum score. Consumed candidates
//! and elements are tracked by index.

use super::AnalysisOptions;
use crate::error::Result;
use crate::model::{
    BBox, CandidateOrigin, CaptionCandidate, CaptionInfo, CaptionRef, CaptionType, Category,
    Document, ElementRef, ElementType, Match, VisualElement,
};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Body text longer than this is never treated as a caption.
const MAX_RECOVERED_LEN: usize = 500;

const PAGE_WEIGHT: f32 = 0.3;
const SPATIAL_WEIGHT: f32 = 0.4;
const TYPE_WEIGHT: f32 = 0.3;

const NUMBER: &str = r"(\d+[\w.]*)";

/// A caption detected in a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCaption {
    /// Caption type implied by the keyword
    pub caption_type: CaptionType,
    /// Number following the keyword
    pub number: Option<String>,
    /// Keyword as written
    pub keyword: Option<String>,
}

/// Anchored caption patterns.
///
/// Only text that opens with a caption keyword is recognised; a keyword in
/// the middle of a sentence is a cross-reference, not a caption.
#[derive(Debug, Clone)]
pub struct CaptionPatterns {
    typed: Vec<(CaptionType, Regex)>,
    configured: Option<Regex>,
}

impl CaptionPatterns {
    /// Compile the built-in patterns plus the configured keywords.
    pub fn new(keywords: &[String]) -> Result<Self> {
        let families: [(CaptionType, &str, bool); 5] = [
            (CaptionType::Figure, "fig|figure", true),
            (CaptionType::Table, "tab|table", true),
            (CaptionType::Equation, "eq|equation", true),
            (CaptionType::Algorithm, "alg|algorithm", true),
            (CaptionType::Algorithm, "listing", false),
        ];

        let mut typed = Vec::new();
        for (caption_type, keywords, allow_bare) in families {
            typed.push((
                caption_type,
                build_ci(&format!(r"^\s*({})\s+{}", keywords, NUMBER))?,
            ));
            if allow_bare {
                typed.push((
                    caption_type,
                    build_ci(&format!(r"^\s*({})\s*[:.\s]\s*{}?", keywords, NUMBER))?,
                ));
            }
        }

        let configured = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(build_ci(&format!(r"^\s*({})\s+{}", alternation, NUMBER))?)
        };

        Ok(Self { typed, configured })
    }

    /// Detect a caption at the start of `text`.
    pub fn detect(&self, text: &str) -> Option<DetectedCaption> {
        let text = text.trim();

        for (caption_type, pattern) in &self.typed {
            if let Some(caps) = pattern.captures(text) {
                return Some(DetectedCaption {
                    caption_type: *caption_type,
                    number: caps.get(2).map(|m| m.as_str().trim_end_matches('.').to_string()),
                    keyword: caps.get(1).map(|m| m.as_str().to_string()),
                });
            }
        }

        let caps = self.configured.as_ref()?.captures(text)?;
        let keyword = caps.get(1).map(|m| m.as_str().to_string());
        Some(DetectedCaption {
            caption_type: keyword
                .as_deref()
                .map(caption_type_for_keyword)
                .unwrap_or(CaptionType::Generic),
            number: caps.get(2).map(|m| m.as_str().trim_end_matches('.').to_string()),
            keyword,
        })
    }

    /// Detect a caption in body text, refusing text too long to be one.
    pub fn detect_in_body(&self, text: &str) -> Option<DetectedCaption> {
        if text.trim().chars().count() > MAX_RECOVERED_LEN {
            return None;
        }
        self.detect(text)
    }
}

fn build_ci(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

fn caption_type_for_keyword(keyword: &str) -> CaptionType {
    match keyword.to_lowercase().as_str() {
        "figure" | "fig" => CaptionType::Figure,
        "table" | "tab" => CaptionType::Table,
        "equation" | "eq" => CaptionType::Equation,
        "algorithm" | "alg" | "listing" => CaptionType::Algorithm,
        _ => CaptionType::Generic,
    }
}

/// A candidate/element pairing chosen by the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pairing {
    /// Index into the candidate slice
    pub candidate: usize,
    /// Index into the element slice
    pub element: usize,
    /// Combined score
    pub score: f32,
}

/// Outcome of a matching run over a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSummary {
    /// Number of candidates considered
    pub candidates: usize,
    /// Number of matches made
    pub matched: usize,
    /// Matched candidates recovered from body text
    pub recovered: usize,
}

/// Greedy best-score caption matcher.
#[derive(Debug, Clone)]
pub struct CaptionMatcher {
    patterns: CaptionPatterns,
    proximity_threshold: f32,
    min_score: f32,
}

impl CaptionMatcher {
    /// Build a matcher from analysis options.
    pub fn new(options: &AnalysisOptions) -> Result<Self> {
        Ok(Self {
            patterns: CaptionPatterns::new(&options.caption_keywords)?,
            proximity_threshold: options.caption_proximity_threshold,
            min_score: options.caption_min_score,
        })
    }

    /// The caption patterns in use.
    pub fn patterns(&self) -> &CaptionPatterns {
        &self.patterns
    }

    /// Score a candidate against an element.
    ///
    /// `0.3 * page + 0.4 * spatial + 0.3 * type`; elements more than one page
    /// away score 0.
    pub fn score(&self, candidate: &CaptionCandidate, element: &VisualElement) -> f32 {
        let page_score = match candidate.page.abs_diff(element.page) {
            0 => 1.0,
            1 => 0.5,
            _ => return 0.0,
        };

        let distance = candidate.bbox.edge_distance(&element.bbox);
        let spatial_score = if self.proximity_threshold > 0.0 {
            (1.0 - distance / self.proximity_threshold).max(0.0)
        } else {
            0.0
        };

        let type_score = type_score(
            candidate.caption_type,
            candidate.keyword.as_deref(),
            element.element_type,
        );

        (PAGE_WEIGHT * page_score + SPATIAL_WEIGHT * spatial_score + TYPE_WEIGHT * type_score)
            .clamp(0.0, 1.0)
    }

    /// Pair candidates with elements.
    ///
    /// Both slices are expected in (page, y0) order. Each candidate takes the
    /// highest scoring unconsumed element whose score exceeds the minimum;
    /// on a tie the earlier element wins.
    pub fn pair(&self, candidates: &[CaptionCandidate], elements: &[VisualElement]) -> Vec<Pairing> {
        let mut used: BTreeSet<usize> = BTreeSet::new();
        let mut pairings = Vec::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let mut best: Option<(usize, f32)> = None;
            for (j, element) in elements.iter().enumerate() {
                if used.contains(&j) {
                    continue;
                }
                let score = self.score(candidate, element);
                let best_score = best.map(|(_, s)| s).unwrap_or(0.0);
                if score > best_score && score > self.min_score {
                    best = Some((j, score));
                }
            }

            if let Some((j, score)) = best {
                used.insert(j);
                pairings.push(Pairing {
                    candidate: i,
                    element: j,
                    score,
                });
            }
        }

        pairings
    }

    /// Collect candidates from the document's caption and body collections,
    /// sorted by (page, y0).
    pub fn candidates(&self, doc: &Document) -> Vec<CaptionCandidate> {
        let mut candidates = Vec::new();

        for (i, block) in doc.captions.iter().enumerate() {
            let detected = self.patterns.detect(&block.text);
            let (caption_type, number, keyword) = match (detected, &block.caption) {
                (Some(d), _) => (d.caption_type, d.number, d.keyword),
                (None, Some(info)) => (info.caption_type, info.number.clone(), info.keyword.clone()),
                (None, None) => (CaptionType::Generic, None, None),
            };
            candidates.push(CaptionCandidate {
                origin: CandidateOrigin::Caption(i),
                page: block.page,
                bbox: block.bbox,
                caption_type,
                number,
                keyword,
            });
        }

        for (i, block) in doc.body.iter().enumerate() {
            if let Some(d) = self.patterns.detect_in_body(&block.text) {
                candidates.push(CaptionCandidate {
                    origin: CandidateOrigin::Body(i),
                    page: block.page,
                    bbox: block.bbox,
                    caption_type: d.caption_type,
                    number: d.number,
                    keyword: d.keyword,
                });
            }
        }

        candidates.sort_by(|a, b| page_y_order(a.page, &a.bbox, b.page, &b.bbox));
        candidates
    }

    /// Match captions to elements across the document.
    ///
    /// Element collections are stably sorted by (page, y0) in place. Matched
    /// body candidates move to the caption collection; every caption block
    /// gets caption metadata; matched elements get a caption back-reference.
    pub fn run(&self, doc: &mut Document) -> MatchSummary {
        for element_type in ElementType::ALL {
            doc.elements_mut(element_type)
                .sort_by(|a, b| page_y_order(a.page, &a.bbox, b.page, &b.bbox));
        }

        let mut elements: Vec<(ElementRef, VisualElement)> = Vec::new();
        for element_type in ElementType::ALL {
            for (index, element) in doc.elements(element_type).iter().enumerate() {
                elements.push((ElementRef::new(element_type, index), element.clone()));
            }
        }
        elements.sort_by(|(_, a), (_, b)| page_y_order(a.page, &a.bbox, b.page, &b.bbox));

        let candidates = self.candidates(doc);
        let element_views: Vec<VisualElement> = elements.iter().map(|(_, e)| e.clone()).collect();
        let pairings = self.pair(&candidates, &element_views);

        // Metadata for every caption block, matched or not
        for candidate in &candidates {
            if let CandidateOrigin::Caption(i) = candidate.origin {
                doc.captions[i].caption = Some(candidate.info());
            }
        }

        let caption_base = doc.captions.len();
        let mut recovered: Vec<usize> = Vec::new();
        let mut recovered_slot: HashMap<usize, usize> = HashMap::new();
        for pairing in &pairings {
            if let CandidateOrigin::Body(i) = candidates[pairing.candidate].origin {
                recovered_slot.insert(i, caption_base + recovered.len());
                recovered.push(i);
            }
        }

        let mut matches = Vec::with_capacity(pairings.len());
        for pairing in &pairings {
            let candidate = &candidates[pairing.candidate];
            let (element_ref, element) = &elements[pairing.element];
            let match_type = Match::type_label(candidate.caption_type, element_ref.element_type);

            let mut info = candidate.info();
            info.matched_element = Some(*element_ref);
            info.match_score = Some(pairing.score);
            info.match_type = Some(match_type.clone());

            let (caption_index, text) = match candidate.origin {
                CandidateOrigin::Caption(i) => {
                    doc.captions[i].caption = Some(info);
                    (i, doc.captions[i].text.clone())
                }
                CandidateOrigin::Body(i) => {
                    doc.body[i].caption = Some(info);
                    doc.body[i].category = Category::Caption;
                    (recovered_slot[&i], doc.body[i].text.clone())
                }
            };

            if let Some(target) = doc
                .elements_mut(element_ref.element_type)
                .get_mut(element_ref.index)
            {
                target.caption = Some(CaptionRef {
                    text,
                    page: candidate.page,
                    bbox: candidate.bbox,
                    caption_type: candidate.caption_type,
                    number: candidate.number.clone(),
                });
            }

            log::debug!(
                "Caption on page {} matched {} on page {} (score {:.2})",
                candidate.page,
                element_ref.element_type,
                element.page,
                pairing.score
            );

            matches.push(Match {
                caption: caption_index,
                element: *element_ref,
                score: pairing.score,
                match_type,
            });
        }

        if !recovered.is_empty() {
            let mut moved: Vec<Option<_>> = Vec::new();
            let body = std::mem::take(&mut doc.body);
            let mut slots: HashMap<usize, usize> = HashMap::new();
            for (i, block) in body.into_iter().enumerate() {
                if recovered_slot.contains_key(&i) {
                    slots.insert(i, moved.len());
                    moved.push(Some(block));
                } else {
                    doc.body.push(block);
                }
            }
            // Append in pairing order so indices match `recovered_slot`
            for i in &recovered {
                if let Some(block) = slots.get(i).and_then(|s| moved[*s].take()) {
                    doc.captions.push(block);
                }
            }
        }

        let summary = MatchSummary {
            candidates: candidates.len(),
            matched: matches.len(),
            recovered: recovered.len(),
        };
        doc.matches = matches;
        doc.report.recovered_captions = summary.recovered;

        log::debug!(
            "Caption matching: {} candidates, {} matches ({} recovered from body text)",
            summary.candidates,
            summary.matched,
            summary.recovered
        );
        summary
    }
}

/// Type agreement between a caption and an element.
fn type_score(caption_type: CaptionType, keyword: Option<&str>, element_type: ElementType) -> f32 {
    if caption_type.compatible_elements().contains(&element_type) {
        return 1.0;
    }

    if let Some(keyword) = keyword {
        let keyword = keyword.to_lowercase();
        let partial = (keyword.contains("fig")
            && matches!(element_type, ElementType::Figure | ElementType::Image))
            || (keyword.contains("tab") && element_type == ElementType::Table)
            || (keyword.contains("eq") && element_type == ElementType::Formula);
        if partial {
            return 0.8;
        }
    }

    0.1
}

fn page_y_order(page_a: usize, a: &BBox, page_b: usize, b: &BBox) -> Ordering {
    page_a
        .cmp(&page_b)
        .then_with(|| a.y0.partial_cmp(&b.y0).unwrap_or(Ordering::Equal))
}
