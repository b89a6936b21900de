use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// The right-hand layout cell that holds the song metadata and lyrics.
static CONTENT_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[width="100%"][valign="top"]"#).unwrap());

pub fn find_content_block(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&CONTENT_CELL).next()
}

/// Text-only rendering of an element: every text node trimmed, blanks
/// dropped, joined by a single space.
pub fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
