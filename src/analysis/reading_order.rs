//! Reading order across columns and pages.

use super::AnalysisOptions;
use crate::model::{BBox, Category, Document};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Assigns a document-global reading position to every block.
#[derive(Debug, Clone)]
pub struct ReadingOrderResolver {
    column_gap: f32,
    detect_columns: bool,
}

impl ReadingOrderResolver {
    /// Create a resolver from analysis options.
    ///
    /// With `preserve_reading_order` off, pages are read top to bottom
    /// without column detection.
    pub fn new(options: &AnalysisOptions) -> Self {
        Self {
            column_gap: options.column_gap_threshold,
            detect_columns: options.preserve_reading_order,
        }
    }

    /// Column boundaries for a set of left edges.
    ///
    /// Every gap wider than the column gap between consecutive sorted x0
    /// values starts a new column; the returned values are the x0 at which
    /// each new column starts.
    pub fn column_starts(&self, x0s: &[f32]) -> Vec<f32> {
        let mut sorted: Vec<f32> = x0s.iter().copied().filter(|x| x.is_finite()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        sorted
            .windows(2)
            .filter(|w| w[1] - w[0] > self.column_gap)
            .map(|w| w[1])
            .collect()
    }

    /// Reading order for the boxes of one page, as indices into `boxes`.
    pub fn order_page(&self, boxes: &[BBox]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..boxes.len()).collect();
        let by_position = |a: &usize, b: &usize| {
            let (a, b) = (&boxes[*a], &boxes[*b]);
            a.y0.partial_cmp(&b.y0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal))
        };

        let starts = if self.detect_columns {
            let x0s: Vec<f32> = boxes.iter().map(|b| b.x0).collect();
            self.column_starts(&x0s)
        } else {
            Vec::new()
        };

        if starts.is_empty() {
            indices.sort_by(by_position);
            return indices;
        }

        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); starts.len() + 1];
        for i in indices {
            let column = starts.iter().filter(|s| boxes[i].x0 >= **s).count();
            columns[column].push(i);
        }

        let non_empty = columns.iter().filter(|c| !c.is_empty()).count();
        if non_empty < 2 {
            let mut all: Vec<usize> = columns.into_iter().flatten().collect();
            all.sort_by(by_position);
            return all;
        }

        log::debug!("Detected {} columns on page", non_empty);
        columns
            .into_iter()
            .flat_map(|mut column| {
                column.sort_by(by_position);
                column
            })
            .collect()
    }

    /// Assign `reading_order` to every block and sort every collection by it.
    ///
    /// Caption indices held by matches are remapped to the new positions.
    /// Returns the number of blocks ordered.
    pub fn run(&self, doc: &mut Document) -> usize {
        let mut pages: BTreeMap<usize, Vec<(Category, usize)>> = BTreeMap::new();
        for category in Category::ALL {
            for (i, block) in doc.blocks(category).iter().enumerate() {
                pages.entry(block.page).or_default().push((category, i));
            }
        }

        let mut next = 0;
        for handles in pages.values() {
            let boxes: Vec<BBox> = handles
                .iter()
                .map(|(c, i)| doc.blocks(*c)[*i].bbox)
                .collect();
            for position in self.order_page(&boxes) {
                let (category, i) = handles[position];
                doc.blocks_mut(category)[i].reading_order = Some(next);
                next += 1;
            }
        }

        for category in Category::ALL {
            let blocks = doc.blocks_mut(category);
            let mut keyed: Vec<(usize, usize)> = blocks
                .iter()
                .enumerate()
                .map(|(i, b)| (b.reading_order.unwrap_or(usize::MAX), i))
                .collect();
            keyed.sort();

            let old = std::mem::take(blocks);
            let mut slots: Vec<Option<_>> = old.into_iter().map(Some).collect();
            let mut remap: HashMap<usize, usize> = HashMap::new();
            for (new_index, (_, old_index)) in keyed.iter().enumerate() {
                if let Some(block) = slots[*old_index].take() {
                    blocks.push(block);
                }
                remap.insert(*old_index, new_index);
            }

            if category == Category::Caption {
                for m in doc.matches.iter_mut() {
                    if let Some(new_index) = remap.get(&m.caption) {
                        m.caption = *new_index;
                    }
                }
            }
        }

        log::debug!("Reading order assigned to {} blocks", next);
        next
    }
}
