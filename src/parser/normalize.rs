use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

/// Collapse runs of 3+ newlines (whitespace-only lines included) to a single
/// blank line, then trim.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text.trim(), "\n\n").trim().to_string()
}

/// Keep the first occurrence of each whitespace-separated word, in order.
/// The page repeats the song title inside the metadata block.
pub fn dedup_words(text: &str) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    text.split_whitespace()
        .filter(|word| seen.insert(*word))
        .collect::<Vec<_>>()
        .join(" ")
}
