//! The analysis pipeline.
//!
//! Pages are loaded and classified in parallel, then funnelled through a
//! channel into one document. Merging, caption matching, reading order and
//! chunking run on the whole document afterwards.

use super::caption::CaptionMatcher;
use super::chunker::ChunkAssembler;
use super::classifier::SpatialClassifier;
use super::font_stats::{FontContext, FontStatsCollector};
use super::layout::{group_spans_into_lines, layout_hint, prepare_layout_regions, TextLine};
use super::merger::RegionMerger;
use super::ocr::{estimate_ocr_quality, group_ocr_words, LOW_CONFIDENCE};
use super::reading_order::ReadingOrderResolver;
use super::sentence::SentenceBuilder;
use super::AnalysisOptions;
use crate::detect::assess_text_layer;
use crate::error::Result;
use crate::model::{
    ClassifiedBlock, Document, Metadata, OcrWord, PageContent, PageInfo, PageSource, Sentence,
    TextSource, VisualElement,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A loaded page with its lines assembled.
struct PreparedPage {
    info: PageInfo,
    lines: Vec<TextLine>,
    content: PageContent,
}

/// Classifier output for one page.
struct ClassifiedPage {
    index: usize,
    blocks: Vec<ClassifiedBlock>,
    elements: Vec<VisualElement>,
    skipped_lines: usize,
    dropped_regions: usize,
    low_confidence_lines: usize,
}

/// Runs every analysis stage over a page source.
///
/// # Example
///
/// ```
/// use pagestruct::analysis::{AnalysisOptions, StructureAnalyzer};
/// use pagestruct::model::{BBox, DocumentInput, PageContent, Span};
///
/// let mut page = PageContent::letter(0);
/// page.spans.push(Span::new("Hello world.", BBox::new(72.0, 300.0, 150.0, 312.0), 0, 12.0));
/// let mut input = DocumentInput::new();
/// input.add_page(page);
///
/// let analyzer = StructureAnalyzer::new(AnalysisOptions::default())?;
/// let doc = analyzer.analyze(&input)?;
/// assert_eq!(doc.body().len(), 1);
/// assert_eq!(doc.chunks().len(), 1);
/// # Ok::<(), pagestruct::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StructureAnalyzer {
    options: AnalysisOptions,
    classifier: SpatialClassifier,
    merger: RegionMerger,
    matcher: CaptionMatcher,
    resolver: ReadingOrderResolver,
    sentences: SentenceBuilder,
    chunker: ChunkAssembler,
}

impl StructureAnalyzer {
    /// Create an analyzer. Fails when the options are invalid or a caption
    /// keyword does not compile.
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            classifier: SpatialClassifier::new(&options)?,
            merger: RegionMerger::new(&options),
            matcher: CaptionMatcher::new(&options)?,
            resolver: ReadingOrderResolver::new(&options),
            sentences: SentenceBuilder::new(&options),
            chunker: ChunkAssembler::new(&options.chunk),
            options,
        })
    }

    /// The options this analyzer was built with.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// The line classifier.
    pub fn classifier(&self) -> &SpatialClassifier {
        &self.classifier
    }

    /// Analyze every page of a source into a document.
    ///
    /// Pages that fail to load are skipped and listed in the report.
    pub fn analyze<S: PageSource + ?Sized>(&self, source: &S) -> Result<Document> {
        let page_count = source.page_count();
        log::info!("Analyzing {} pages", page_count);

        let mut metadata = Metadata {
            title: source.title(),
            source: source.source(),
            page_count,
            ..Default::default()
        };

        let (pages, skipped_pages) = self.load_pages(source, page_count);

        let layer = assess_text_layer(&pages, self.options.ocr_sample_pages);
        let use_ocr = layer.should_use_ocr(self.options.ocr_fallback_threshold);
        log::debug!("Text layer: {}", layer);
        if use_ocr {
            log::info!("Text layer too thin, using OCR words");
            metadata.text_source = TextSource::Ocr;
        }

        let ocr_quality = use_ocr.then(|| {
            let words: Vec<OcrWord> = pages.iter().flat_map(|p| p.ocr_words.iter().cloned()).collect();
            estimate_ocr_quality(&words)
        });

        let prepared = self.prepare_pages(pages, use_ocr);
        let fonts = self.font_context(&prepared);
        let classified = self.classify_pages(prepared, &fonts);

        let mut doc = Document::new(metadata);
        doc.report.skipped_pages = skipped_pages;
        doc.report.text_coverage = layer.coverage;
        doc.report.ocr_used = use_ocr;
        doc.report.ocr_quality = ocr_quality;

        for (info, page) in classified {
            doc.pages.push(info);
            doc.report.skipped_lines += page.skipped_lines;
            doc.report.dropped_layout_regions += page.dropped_regions;
            doc.report.low_confidence_lines += page.low_confidence_lines;
            for block in page.blocks {
                doc.blocks_mut(block.category).push(block);
            }
            for element in page.elements {
                doc.elements_mut(element.element_type).push(element);
            }
        }
        if doc.report.skipped_lines > 0 {
            log::warn!("Skipped {} empty or degenerate lines", doc.report.skipped_lines);
        }

        self.merger.run(&mut doc);
        self.matcher.run(&mut doc);
        self.resolver.run(&mut doc);

        let sentences = self.sentences.build(&doc);
        doc.chunks = self.chunker.assemble(&sentences);

        log::info!(
            "Analysis complete: {} blocks, {} elements, {} matches, {} chunks",
            doc.block_count(),
            doc.element_count(),
            doc.matches.len(),
            doc.chunks.len()
        );
        Ok(doc)
    }

    /// Sentences of an analyzed document, as fed to chunk assembly.
    pub fn sentences(&self, doc: &Document) -> Vec<Sentence> {
        self.sentences.build(doc)
    }

    fn load_pages<S: PageSource + ?Sized>(
        &self,
        source: &S,
        page_count: usize,
    ) -> (Vec<PageContent>, Vec<usize>) {
        let results: Vec<(usize, Result<PageContent>)> = if self.options.parallel {
            (0..page_count)
                .into_par_iter()
                .map(|i| (i, source.load_page(i)))
                .collect()
        } else {
            (0..page_count).map(|i| (i, source.load_page(i))).collect()
        };

        let mut pages = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (index, result) in results {
            match result {
                Ok(page) => pages.push(page),
                Err(e) => {
                    log::warn!("Skipping page {}: {}", index, e);
                    skipped.push(index);
                }
            }
        }
        (pages, skipped)
    }

    fn prepare_pages(&self, pages: Vec<PageContent>, use_ocr: bool) -> Vec<PreparedPage> {
        let column_gap = self.options.column_gap_threshold;
        let prepare = |mut content: PageContent| {
            let lines = if use_ocr {
                group_ocr_words(&content.ocr_words)
            } else {
                group_spans_into_lines(std::mem::take(&mut content.spans), column_gap)
            };
            PreparedPage {
                info: content.info(),
                lines,
                content,
            }
        };

        if self.options.parallel {
            pages.into_par_iter().map(prepare).collect()
        } else {
            pages.into_iter().map(prepare).collect()
        }
    }

    fn font_context(&self, pages: &[PreparedPage]) -> FontContext {
        let mut stats: BTreeMap<usize, FontStatsCollector> = BTreeMap::new();
        for page in pages {
            let collector = stats.entry(page.info.index).or_default();
            for line in &page.lines {
                collector.extend(line.spans.iter().map(|s| s.font_size));
            }
        }
        let fonts = FontContext::freeze(&stats, self.options.font_scope);
        log::debug!("Median font size: {:.1}", fonts.document_median());
        fonts
    }

    fn classify_pages(
        &self,
        pages: Vec<PreparedPage>,
        fonts: &FontContext,
    ) -> Vec<(PageInfo, ClassifiedPage)> {
        let (tx, rx) = crossbeam_channel::unbounded::<(PageInfo, ClassifiedPage)>();

        if self.options.parallel {
            pages.into_par_iter().for_each_with(tx, |tx, page| {
                let info = page.info;
                if tx.send((info, self.classify_page(page, fonts))).is_err() {
                    log::warn!("Dropped classified page {}", info.index);
                }
            });
        } else {
            for page in pages {
                let info = page.info;
                if tx.send((info, self.classify_page(page, fonts))).is_err() {
                    log::warn!("Dropped classified page {}", info.index);
                }
            }
            drop(tx);
        }

        let mut classified: Vec<(PageInfo, ClassifiedPage)> = rx.iter().collect();
        classified.sort_by_key(|(_, page)| page.index);
        classified
    }

    fn classify_page(&self, page: PreparedPage, fonts: &FontContext) -> ClassifiedPage {
        let (regions, dropped_regions) = prepare_layout_regions(
            &page.content.layout_regions,
            self.options.layout_confidence_threshold,
        );

        let mut blocks = Vec::with_capacity(page.lines.len());
        let mut skipped_lines = 0;
        let mut low_confidence_lines = 0;
        for line in &page.lines {
            let hint = layout_hint(&line.bbox, &regions);
            match self
                .classifier
                .classify_line(line, page.info.height, fonts, hint.as_deref())
            {
                Some(block) => {
                    if block.confidence.is_some_and(|c| c < LOW_CONFIDENCE) {
                        low_confidence_lines += 1;
                    }
                    blocks.push(block);
                }
                None => skipped_lines += 1,
            }
        }

        ClassifiedPage {
            index: page.info.index,
            blocks,
            elements: page.content.visual_elements,
            skipped_lines,
            dropped_regions,
            low_confidence_lines,
        }
    }
}
