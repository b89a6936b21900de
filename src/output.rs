use std::fmt::Write;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::parser::SongPage;

const RULE: &str = "===========================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Extraction result as JSON
    Json,
    /// JSON array importable as a lyrics app backup
    Backup,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    fetched_at: DateTime<Utc>,
    #[serde(flatten)]
    page: &'a SongPage,
}

/// One song in the lyrics app's backup format.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupEntry<'a> {
    title: &'a str,
    composer: &'a str,
    deity: Option<&'a str>,
    category: &'a str,
    lyrics: &'a str,
    youtube_link: Option<&'a str>,
}

pub fn render_text(page: &SongPage) -> String {
    let m = &page.metadata;
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n--- SCRAPING RESULTS ---\n{}", RULE, RULE);
    let _ = writeln!(out, "Title: {}", m.title);
    let _ = writeln!(out, "Raga: {}", m.raga);
    let _ = writeln!(out, "Tala: {}", m.tala);
    let _ = writeln!(out, "Composer: {}", m.composer);
    let _ = writeln!(out, "\n--- Lyrics ---\n");
    if page.lyrics.is_empty() {
        let _ = writeln!(out, "ERROR: Lyrics parsing resulted in empty content.");
    } else {
        let _ = writeln!(out, "{}", page.lyrics);
    }

    if !page.warnings.is_empty() {
        let _ = writeln!(out, "\n--- Warnings ---");
        for w in &page.warnings {
            let _ = writeln!(out, "  {}", w);
        }
    }
    let _ = writeln!(out, "\n--- END OF RESULTS ---");
    out
}

pub fn render_json(page: &SongPage, source: &str, fetched_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        source,
        fetched_at,
        page,
    })
}

pub fn render_backup(page: &SongPage, category: &str) -> serde_json::Result<String> {
    let entry = BackupEntry {
        title: &page.metadata.title,
        composer: &page.metadata.composer,
        deity: None,
        category,
        lyrics: &page.lyrics,
        youtube_link: None,
    };
    serde_json::to_string_pretty(&[entry])
}
