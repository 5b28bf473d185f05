//! Main-text rendering: body and titles in reading order.

use crate::model::{Category, Document};

/// Render the main text of a document.
///
/// Body blocks and titles are written in reading order with a separator
/// line at every page change. Titles are prefixed with `## `.
pub fn to_text(doc: &Document) -> String {
    let mut output = String::new();
    let mut current_page: Option<usize> = None;

    for block in doc.blocks_in_order() {
        let prefix = match block.category {
            Category::Title => "## ",
            Category::Body => "",
            _ => continue,
        };

        if current_page != Some(block.page) {
            if current_page.is_some() {
                output.push('\n');
            }
            output.push_str(&format!("=== Page {} ===\n\n", block.page + 1));
            current_page = Some(block.page);
        }

        output.push_str(prefix);
        output.push_str(block.text.trim());
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}
