//! Adjacency merging and header/footer repair.

use super::AnalysisOptions;
use crate::model::{Category, ClassifiedBlock, Document};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Repeated body text must be at least this long to count as a running
/// header or footer.
const MIN_REPEATED_LEN: usize = 5;

/// Repeated body text must appear on at least this many pages.
const MIN_REPEATED_PAGES: usize = 3;

/// Whole-document pass that compacts adjacent lines into blocks.
#[derive(Debug, Clone)]
pub struct RegionMerger {
    merge_threshold: f32,
    x_tolerance: f32,
    categories: Vec<Category>,
    header_threshold: f32,
    footer_threshold: f32,
}

impl RegionMerger {
    /// Create a merger from analysis options.
    pub fn new(options: &AnalysisOptions) -> Self {
        Self {
            merge_threshold: options.text_merge_threshold,
            x_tolerance: options.merge_x_tolerance,
            categories: options.merge_categories.clone(),
            header_threshold: options.header_threshold,
            footer_threshold: options.footer_threshold,
        }
    }

    /// Merge every configured category of the document, then repair
    /// misclassified running headers and footers.
    pub fn run(&self, doc: &mut Document) {
        for category in &self.categories {
            let blocks = std::mem::take(doc.blocks_mut(*category));
            let before = blocks.len();
            let merged = self.merge_adjacent(blocks);
            if merged.len() != before {
                log::debug!("Merged {} {} lines into {} blocks", before, category, merged.len());
            }
            *doc.blocks_mut(*category) = merged;
        }

        let repaired = self.repair_headers_footers(doc);
        doc.report.repaired_blocks += repaired;
    }

    /// Merge vertically adjacent, left-aligned blocks of one collection.
    ///
    /// Blocks are sorted by (page, y0); a running group is extended while
    /// the next block is on the same page, starts within `merge_threshold`
    /// of the group's last block, and its left edge is within `x_tolerance`.
    pub fn merge_adjacent(&self, mut blocks: Vec<ClassifiedBlock>) -> Vec<ClassifiedBlock> {
        if blocks.len() <= 1 {
            return blocks;
        }

        blocks.sort_by(|a, b| {
            a.page.cmp(&b.page).then_with(|| {
                a.bbox
                    .y0
                    .partial_cmp(&b.bbox.y0)
                    .unwrap_or(Ordering::Equal)
            })
        });

        let mut merged: Vec<ClassifiedBlock> = Vec::with_capacity(blocks.len());
        let mut group: Vec<ClassifiedBlock> = Vec::new();

        for block in blocks {
            if let Some(last) = group.last() {
                let adjacent = block.page == last.page
                    && block.bbox.y0 - last.bbox.y1 <= self.merge_threshold
                    && (block.bbox.x0 - last.bbox.x0).abs() <= self.x_tolerance;
                if !adjacent {
                    merged.extend(merge_group(std::mem::take(&mut group)));
                }
            }
            group.push(block);
        }
        merged.extend(merge_group(group));

        merged
    }

    /// Move body text that repeats in the page margins to headers or footers.
    ///
    /// Returns the number of blocks moved.
    pub fn repair_headers_footers(&self, doc: &mut Document) -> usize {
        let heights: HashMap<usize, f32> = doc.pages.iter().map(|p| (p.index, p.height)).collect();

        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, block) in doc.body.iter().enumerate() {
            let key = block.text.trim();
            if key.chars().count() >= MIN_REPEATED_LEN {
                groups.entry(key.to_string()).or_default().push(i);
            }
        }

        let mut moves: Vec<(usize, Category)> = Vec::new();
        for indices in groups.values() {
            let pages: BTreeSet<usize> = indices.iter().map(|i| doc.body[*i].page).collect();
            if pages.len() < MIN_REPEATED_PAGES {
                continue;
            }

            let mut ratios = Vec::with_capacity(indices.len());
            let mut all_in_band = true;
            for i in indices {
                let block = &doc.body[*i];
                let height = heights.get(&block.page).copied().unwrap_or(0.0);
                if height <= 0.0 {
                    all_in_band = false;
                    break;
                }
                let in_band = block.bbox.y0 < self.header_threshold * height
                    || block.bbox.y1 > self.footer_threshold * height;
                if !in_band {
                    all_in_band = false;
                    break;
                }
                ratios.push(block.bbox.y0 / height);
            }
            if !all_in_band {
                continue;
            }

            let mean = ratios.iter().sum::<f32>() / ratios.len() as f32;
            let target = if mean < 0.5 {
                Category::Header
            } else {
                Category::Footer
            };
            moves.extend(indices.iter().map(|i| (*i, target)));
        }

        if moves.is_empty() {
            return 0;
        }

        let targets: HashMap<usize, Category> = moves.into_iter().collect();
        let body = std::mem::take(&mut doc.body);
        let mut moved = 0;
        for (i, mut block) in body.into_iter().enumerate() {
            match targets.get(&i) {
                Some(category) => {
                    block.category = *category;
                    doc.blocks_mut(*category).push(block);
                    moved += 1;
                }
                None => doc.body.push(block),
            }
        }

        for category in [Category::Header, Category::Footer] {
            doc.blocks_mut(category).sort_by(|a, b| {
                a.page.cmp(&b.page).then_with(|| {
                    a.bbox
                        .y0
                        .partial_cmp(&b.bbox.y0)
                        .unwrap_or(Ordering::Equal)
                })
            });
        }

        log::debug!("Moved {} repeated margin blocks out of body text", moved);
        moved
    }
}

fn merge_group(group: Vec<ClassifiedBlock>) -> Option<ClassifiedBlock> {
    group.into_iter().reduce(|mut merged, block| {
        merged.bbox = merged.bbox.union(&block.bbox);
        merged.text.push(' ');
        merged.text.push_str(&block.text);
        merged.words.extend(block.words);
        merged.font_info.combine(&block.font_info);
        merged.merged_from += block.merged_from;
        if merged.layout_type.is_none() {
            merged.layout_type = block.layout_type;
        }
        merged.confidence = match (merged.confidence, block.confidence) {
            (Some(a), Some(b)) => Some((a + b) / 2.0),
            (a, b) => a.or(b),
        };
        merged
    })
}
