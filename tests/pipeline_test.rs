//! Integration tests for the full analysis pipeline.

use pagestruct::analysis::{AnalysisOptions, ChunkOptions, StructureAnalyzer};
use pagestruct::model::{
    BBox, CaptionSource, CaptionType, Category, DocumentInput, ElementRef, ElementType,
    PageContent, Span, VisualElement,
};
use pagestruct::{render, Document, JsonFormat};

/// A 12pt span whose width follows its length.
fn span(text: &str, x0: f32, y0: f32) -> Span {
    let width = text.chars().count() as f32 * 6.0;
    Span::new(text, BBox::new(x0, y0, x0 + width, y0 + 12.0), 0, 12.0)
}

fn filler_page(index: usize) -> PageContent {
    let mut page = PageContent::letter(index);
    page.spans.push(span(
        &format!("Plain paragraph text on page number {} of the report.", index + 1),
        72.0,
        300.0,
    ));
    page
}

/// Three pages; the last holds a figure, its caption, a body line and a
/// page number.
fn figure_document() -> DocumentInput {
    let mut input = DocumentInput::new();
    input.add_page(filler_page(0));
    input.add_page(filler_page(1));

    let mut page = PageContent::letter(2);
    page.spans.push(span("The network is trained end to end.", 72.0, 100.0));
    page.spans.push(span("Figure 3: Model architecture", 150.0, 510.0));
    page.spans.push(span("3", 300.0, 740.0));
    page.visual_elements.push(VisualElement::new(
        ElementType::Image,
        BBox::new(150.0, 300.0, 460.0, 500.0),
        2,
    ));
    input.add_page(page);
    input
}

fn analyze(input: &DocumentInput) -> Document {
    StructureAnalyzer::new(AnalysisOptions::default())
        .unwrap()
        .analyze(input)
        .unwrap()
}

#[test]
fn test_figure_page_classification_and_match() {
    let doc = analyze(&figure_document());

    let on_page = |blocks: &[pagestruct::ClassifiedBlock]| -> Vec<String> {
        blocks
            .iter()
            .filter(|b| b.page == 2)
            .map(|b| b.text.clone())
            .collect()
    };
    assert_eq!(on_page(doc.captions()), vec!["Figure 3: Model architecture"]);
    assert_eq!(on_page(doc.body()), vec!["The network is trained end to end."]);
    assert_eq!(on_page(doc.page_numbers()), vec!["3"]);

    assert_eq!(doc.matches().len(), 1);
    let m = &doc.matches()[0];
    assert_eq!(m.match_type, "figure_image");
    assert!(m.score > 0.3);
    assert_eq!(m.element, ElementRef::new(ElementType::Image, 0));

    let caption = &doc.captions()[m.caption];
    assert_eq!(caption.text, "Figure 3: Model architecture");
    let info = caption.caption.as_ref().unwrap();
    assert_eq!(info.caption_type, CaptionType::Figure);
    assert_eq!(info.number.as_deref(), Some("3"));
    assert_eq!(info.matched_element, Some(m.element));

    let image = &doc.images()[0];
    let back = image.caption.as_ref().unwrap();
    assert_eq!(back.text, "Figure 3: Model architecture");
    assert_eq!(back.page, 2);

    assert!(doc.orphan_captions().is_empty());
    assert!(doc.orphan_elements().is_empty());
    assert_eq!(
        doc.caption_for(ElementRef::new(ElementType::Image, 0)).map(|b| b.text.as_str()),
        Some("Figure 3: Model architecture")
    );
}

#[test]
fn test_adjacent_lines_merge_and_distant_line_stays() {
    let mut input = DocumentInput::new();
    let mut page = PageContent::letter(0);
    page.spans.push(span("First line of a paragraph", 72.0, 100.0));
    page.spans.push(span("second line of a paragraph", 72.0, 114.0));
    page.spans.push(span("A separate paragraph", 72.0, 166.0));
    input.add_page(page);

    let doc = analyze(&input);

    assert_eq!(doc.body().len(), 2);
    assert_eq!(
        doc.body()[0].text,
        "First line of a paragraph second line of a paragraph"
    );
    assert_eq!(doc.body()[0].merged_from, 2);
    assert_eq!(doc.body()[0].category, Category::Body);
    assert_eq!(doc.body()[1].text, "A separate paragraph");
    assert_eq!(doc.body()[1].merged_from, 1);
}

#[test]
fn test_two_columns_read_left_then_right() {
    let mut input = DocumentInput::new();
    let mut page = PageContent::letter(0);
    for (i, y) in [100.0, 130.0, 160.0].iter().enumerate() {
        page.spans.push(span(&format!("left column line {}", i + 1), 72.0, *y));
        page.spans.push(span(&format!("right column line {}", i + 1), 320.0, *y));
    }
    input.add_page(page);

    let doc = analyze(&input);
    let order: Vec<&str> = doc.blocks_in_order().iter().map(|b| b.text.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "left column line 1",
            "left column line 2",
            "left column line 3",
            "right column line 1",
            "right column line 2",
            "right column line 3",
        ]
    );
}

#[test]
fn test_reading_order_strictly_increasing_across_pages() {
    let doc = analyze(&figure_document());
    let blocks = doc.blocks_in_order();

    assert_eq!(blocks.len(), doc.block_count());
    for pair in blocks.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.reading_order.unwrap() < b.reading_order.unwrap());
        assert!(a.page <= b.page);
    }
    for category in Category::ALL {
        let orders: Vec<usize> = doc
            .blocks(category)
            .iter()
            .map(|b| b.reading_order.unwrap())
            .collect();
        assert!(orders.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_body_caption_recovered_and_matched() {
    let mut input = DocumentInput::new();
    let mut page = PageContent::letter(0);
    page.spans.push(span("Listing 2 shows the main loop", 100.0, 420.0));
    page.visual_elements.push(VisualElement::new(
        ElementType::Figure,
        BBox::new(100.0, 200.0, 500.0, 410.0),
        0,
    ));
    input.add_page(page);

    let doc = analyze(&input);

    assert!(doc.body().is_empty());
    assert_eq!(doc.captions().len(), 1);
    let caption = &doc.captions()[0];
    assert_eq!(caption.category, Category::Caption);
    let info = caption.caption.as_ref().unwrap();
    assert_eq!(info.source, CaptionSource::BodyText);
    assert_eq!(info.caption_type, CaptionType::Algorithm);
    assert_eq!(doc.matches()[0].match_type, "algorithm_figure");
    assert_eq!(doc.report().recovered_captions, 1);
}

#[test]
fn test_numeric_body_text_is_not_harvested() {
    let mut input = DocumentInput::new();
    let mut page = PageContent::letter(0);
    page.spans.push(span("12 samples were excluded from the figure above", 100.0, 420.0));
    page.spans.push(span("See Figure 1: it shows the samples", 100.0, 460.0));
    page.visual_elements.push(VisualElement::new(
        ElementType::Figure,
        BBox::new(100.0, 200.0, 500.0, 410.0),
        0,
    ));
    input.add_page(page);

    let doc = analyze(&input);

    assert!(doc.matches().is_empty());
    assert!(doc.captions().is_empty());
    assert_eq!(doc.body().len(), 2);
    assert_eq!(doc.orphan_elements().len(), 1);
}

#[test]
fn test_chunks_partition_sentences() {
    let mut input = figure_document();
    input.pages[0].spans.push(span("Short one. Another short one. Third.", 72.0, 400.0));
    input.pages[0].spans.push(span("Fourth here. Fifth.", 72.0, 440.0));

    let options = AnalysisOptions::default().with_chunk_options(ChunkOptions {
        max_chars: 40,
        ..ChunkOptions::default()
    });
    let analyzer = StructureAnalyzer::new(options).unwrap();
    let doc = analyzer.analyze(&input).unwrap();
    let sentences = analyzer.sentences(&doc);

    let total: usize = doc.chunks().iter().map(|c| c.sentence_count).sum();
    assert_eq!(total, sentences.len());

    let bounds = &analyzer.options().chunk;
    let mut offset = 0;
    for (i, chunk) in doc.chunks().iter().enumerate() {
        assert_eq!(chunk.order_idx, i);
        assert!(chunk.sentence_count >= 1);
        assert!(chunk.sentence_count <= bounds.max_sentences);
        assert!(!chunk.text.is_empty());

        let members = &sentences[offset..offset + chunk.sentence_count];
        offset += chunk.sentence_count;

        let chars: usize = members.iter().map(|s| s.char_len()).sum();
        assert!(
            chars <= bounds.max_chars || members.len() == 1,
            "chunk {} holds {} chars in {} sentences",
            i,
            chars,
            members.len()
        );
        assert!(members.iter().all(|s| s.category == chunk.section));
        assert_eq!(chunk.page, members[0].page);
    }
    assert!(doc.chunks().iter().any(|c| c.sentence_count > 1));
}

#[test]
fn test_running_footer_repaired_on_every_page() {
    let json = r#"{
        "pages": [
            {"width": 612, "height": 792, "spans": [
                {"text": "Opening remarks on the first page.", "bbox": [72, 300, 276, 312], "font_size": 12},
                {"text": "Confidential draft, internal use", "bbox": [72, 705, 264, 717], "font_size": 12}
            ]},
            {"width": 612, "height": 792, "spans": [
                {"text": "Further notes follow here.", "bbox": [72, 300, 264, 312], "font_size": 12},
                {"text": "Confidential draft, internal use", "bbox": [72, 705, 264, 717], "font_size": 12}
            ]},
            {"width": 612, "height": 792, "spans": [
                {"text": "Closing words of the document.", "bbox": [72, 300, 252, 312], "font_size": 12},
                {"text": "Confidential draft, internal use", "bbox": [72, 705, 264, 717], "font_size": 12}
            ]}
        ]
    }"#;
    let doc = pagestruct::analyze_json(json).unwrap();

    let footers: Vec<(usize, &str)> = doc
        .footers()
        .iter()
        .map(|b| (b.page, b.text.as_str()))
        .collect();
    assert_eq!(
        footers,
        vec![
            (0, "Confidential draft, internal use"),
            (1, "Confidential draft, internal use"),
            (2, "Confidential draft, internal use"),
        ]
    );
    assert!(doc.footers().iter().all(|b| b.category == Category::Footer));
    assert_eq!(doc.body().len(), 3);
    assert!(doc.body().iter().all(|b| !b.text.starts_with("Confidential")));
    assert_eq!(doc.report().repaired_blocks, 3);
    assert!(doc.chunks().iter().all(|c| c.section != Category::Body || !c.text.contains("Confidential")));
}

#[test]
fn test_missing_page_height_keeps_lines_in_body() {
    let json = r#"{
        "pages": [{
            "spans": [
                {"text": "An ordinary sentence in the middle of the page.", "bbox": [72, 300, 354, 312], "font_size": 12},
                {"text": "Another plain sentence lower down.", "bbox": [72, 340, 276, 352], "font_size": 12}
            ]
        }]
    }"#;
    let doc = pagestruct::analyze_json(json).unwrap();

    assert_eq!(doc.headers().len(), 0);
    assert_eq!(doc.footers().len(), 0);
    assert_eq!(doc.footnotes().len(), 0);
    assert_eq!(doc.page_numbers().len(), 0);
    assert_eq!(doc.body().len(), 2);
    assert_eq!(doc.pages()[0].height, 0.0);
}

#[test]
fn test_table_cell_text_left_out_of_chunks() {
    let mut input = DocumentInput::new();
    let mut page = PageContent::letter(0);
    page.spans.push(span("Measurements are summarised below.", 72.0, 150.0));
    page.spans.push(span("Alpha 12", 120.0, 220.0));
    page.spans.push(span("Beta 34", 320.0, 220.0));
    page.visual_elements.push(VisualElement::new(
        ElementType::Table,
        BBox::new(100.0, 200.0, 500.0, 300.0),
        0,
    ));
    input.add_page(page);

    let doc = analyze(&input);

    // Cells are still classified, just not narrated
    let body: Vec<&str> = doc.body().iter().map(|b| b.text.as_str()).collect();
    assert!(body.contains(&"Alpha 12"));
    assert!(body.contains(&"Beta 34"));

    let text: Vec<&str> = doc.chunks().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(text, vec!["Measurements are summarised below."]);

    // Opting out keeps the cell text
    let options = AnalysisOptions::default().with_chunk_options(ChunkOptions {
        exclude_elements: Vec::new(),
        ..ChunkOptions::default()
    });
    let doc = StructureAnalyzer::new(options).unwrap().analyze(&input).unwrap();
    assert!(doc.chunks().iter().any(|c| c.text.contains("Alpha 12")));
}

#[test]
fn test_classification_is_deterministic() {
    let input = figure_document();
    let first = analyze(&input);
    let second = analyze(&input);

    for category in Category::ALL {
        assert_eq!(first.blocks(category), second.blocks(category));
    }
    assert_eq!(first.matches(), second.matches());
    assert_eq!(first.chunks(), second.chunks());
}

#[test]
fn test_json_input_round_trip_through_pipeline() {
    let json = r#"{
        "title": "From JSON",
        "pages": [
            {
                "index": 0,
                "width": 612,
                "height": 792,
                "spans": [
                    {"text": "Table 1: Results", "bbox": [100, 180, 196, 192], "font_size": 12},
                    {"text": "Some plain body text.", "bbox": [72, 400, 198, 412], "font_size": 12}
                ],
                "layout_regions": [
                    {"type": "Text", "confidence": 0.9, "bbox": [60, 390, 540, 420]}
                ],
                "visual_elements": [
                    {"type": "table", "bbox": [100, 200, 500, 380]}
                ]
            },
            {"index": 1, "width": 612, "height": 792, "error": "render failure"}
        ]
    }"#;
    let doc = pagestruct::analyze_json(json).unwrap();

    assert_eq!(doc.metadata().title.as_deref(), Some("From JSON"));
    assert_eq!(doc.report().skipped_pages, vec![1]);
    assert_eq!(doc.matches().len(), 1);
    assert_eq!(doc.matches()[0].match_type, "table_table");
    assert_eq!(doc.body()[0].layout_type.as_deref(), Some("text"));

    let out = render::to_json(&doc, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["tables"][0]["caption"]["text"], "Table 1: Results");
    assert_eq!(value["report"]["skipped_pages"][0], 1);
}
