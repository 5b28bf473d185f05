//! Font size statistics.
//!
//! Samples are collected while pages load; the result is frozen into a
//! [`FontContext`] before any line is classified.

use super::FontScope;
use std::collections::BTreeMap;

/// Median used when no valid sample was seen.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Accumulates font size samples.
#[derive(Debug, Clone, Default)]
pub struct FontStatsCollector {
    samples: Vec<f32>,
}

impl FontStatsCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font size observation. Zero, negative and non-finite sizes are
    /// ignored.
    pub fn add_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            self.samples.push(size);
        }
    }

    /// Add several observations.
    pub fn extend<I: IntoIterator<Item = f32>>(&mut self, sizes: I) {
        for size in sizes {
            self.add_size(size);
        }
    }

    /// Fold another collector's samples into this one.
    pub fn merge(&mut self, other: &FontStatsCollector) {
        self.samples.extend_from_slice(&other.samples);
    }

    /// Number of valid samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no valid sample was seen.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Median of the samples, or [`DEFAULT_BODY_SIZE`] with none.
    pub fn median(&self) -> f32 {
        if self.samples.is_empty() {
            return DEFAULT_BODY_SIZE;
        }

        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }
}

/// Frozen font statistics handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FontContext {
    document_median: f32,
    page_medians: BTreeMap<usize, f32>,
    scope: FontScope,
}

impl FontContext {
    /// Freeze per-page collectors into a context for the given scope.
    pub fn freeze(pages: &BTreeMap<usize, FontStatsCollector>, scope: FontScope) -> Self {
        let mut all = FontStatsCollector::new();
        for collector in pages.values() {
            all.merge(collector);
        }

        let page_medians = match scope {
            FontScope::Document => BTreeMap::new(),
            FontScope::Page => pages
                .iter()
                .map(|(index, collector)| (*index, collector.median()))
                .collect(),
        };

        let context = Self {
            document_median: all.median(),
            page_medians,
            scope,
        };
        log::debug!(
            "Font context: median={:.1}pt over {} samples ({:?} scope)",
            context.document_median,
            all.len(),
            scope
        );
        context
    }

    /// Context with a fixed median, for callers that classify lines directly.
    pub fn uniform(median: f32) -> Self {
        Self {
            document_median: median,
            page_medians: BTreeMap::new(),
            scope: FontScope::Document,
        }
    }

    /// Median font size to compare lines on `page` against.
    pub fn median_for(&self, page: usize) -> f32 {
        match self.scope {
            FontScope::Document => self.document_median,
            FontScope::Page => self
                .page_medians
                .get(&page)
                .copied()
                .unwrap_or(self.document_median),
        }
    }

    /// Median over the whole document.
    pub fn document_median(&self) -> f32 {
        self.document_median
    }
}

impl Default for FontContext {
    fn default() -> Self {
        Self::uniform(DEFAULT_BODY_SIZE)
    }
}
