pub mod locator;
pub mod lyrics;
pub mod metadata;
pub mod normalize;

use std::fmt;

use scraper::Html;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use lyrics::Stop;
use metadata::{Field, SongMetadata};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("main content block not found")]
    ContentBlockNotFound,
}

/// Soft failures: extraction still returns a result, with defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum Warning {
    FieldMissing(Field),
    AnchorMissing,
    BoundaryMissing,
    EmptyLyrics,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::FieldMissing(field) => write!(f, "could not find {} on the page", field),
            Warning::AnchorMissing => f.write_str("no \"Language:\" label before the lyrics"),
            Warning::BoundaryMissing => f.write_str("no <hr> after the \"Language:\" label"),
            Warning::EmptyLyrics => f.write_str("lyrics parsing resulted in empty content"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SongPage {
    #[serde(flatten)]
    pub metadata: SongMetadata,
    pub lyrics: String,
    pub warnings: Vec<Warning>,
}

pub fn extract_song_from_str(html: &str) -> Result<SongPage, ExtractError> {
    let document = Html::parse_document(html);
    extract_song(&document)
}

/// Locate the content cell, then run metadata extraction and lyric
/// segmentation over it.
pub fn extract_song(document: &Html) -> Result<SongPage, ExtractError> {
    let cell = locator::find_content_block(document).ok_or(ExtractError::ContentBlockNotFound)?;

    let text = locator::flatten_text(cell);
    let (metadata, missing) = metadata::extract(&text);
    let mut warnings: Vec<Warning> = missing.into_iter().map(Warning::FieldMissing).collect();

    let (segments, stop) = lyrics::segment(document, cell);
    let lyrics = normalize::collapse_blank_lines(&segments.joined());
    match stop {
        Stop::AnchorMissing => warnings.push(Warning::AnchorMissing),
        Stop::BoundaryMissing => warnings.push(Warning::BoundaryMissing),
        Stop::Meaning | Stop::Exhausted if segments.is_empty() => {
            warnings.push(Warning::EmptyLyrics)
        }
        Stop::Meaning | Stop::Exhausted => {}
    }

    for w in &warnings {
        warn!("{}", w);
    }
    info!(
        title = %metadata.title,
        segments = segments.segments.len(),
        warnings = warnings.len(),
        "Extracted song"
    );

    Ok(SongPage {
        metadata,
        lyrics,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn end_to_end_minimal() {
        let html = r#"<table><tr><td width="100%" valign="top">
            <p>Song: Test Song</p><p>raagam: Kalyani</p><p>Aa: S R2 G3 M2 P D2 N3 S</p>
            <p>taaLam: Adi</p><p>Composer: Thyagaraja</p><p>Language: Telugu</p>
            <hr><p>Pallavi</p><p>line1<br>line2</p>
            <hr><p><b>Meaning</b></p><p>not lyrics</p>
        </td></tr></table>"#;
        let doc = Html::parse_document(html);
        let page = extract_song(&doc).unwrap();
        assert_eq!(page.metadata.title, "Test Song");
        assert_eq!(page.metadata.raga, "Kalyani");
        assert_eq!(page.metadata.tala, "Adi");
        assert_eq!(page.metadata.composer, "Thyagaraja");
        assert_eq!(page.lyrics, "[Pallavi]\nline1\nline2");
        assert!(page.warnings.is_empty());

        let cell = locator::find_content_block(&doc).unwrap();
        let (segments, _) = lyrics::segment(&doc, cell);
        assert_eq!(segments.joined(), "\n[Pallavi]\nline1\nline2");
    }

    #[test]
    fn song_fixture() {
        let page = extract_song_from_str(&fixture("nannu_palimpa")).unwrap();
        assert_eq!(page.metadata.title, "nannu pAlimpa");
        assert_eq!(page.metadata.raga, "mOhanam 28 harikAmbhOji janya");
        assert_eq!(page.metadata.tala, "Adi");
        assert_eq!(page.metadata.composer, "Tyaagaraaja");
        assert!(page.warnings.is_empty(), "{:?}", page.warnings);

        let expected = "[Pallavi]\n\
                        nannu pAlimpa naDaci vaccitivO\n\
                        nA prANanAtha\n\
                        \n\
                        [Anupallavi]\n\
                        vanaja nayana mOmunu jUcuTe\n\
                        jIvanamani nenaruna manasu marmamu delisi\n\
                        \n\
                        [Caranam]\n\
                        sura bhUpa nannu pAlimpa\n\
                        tyAgarAja nuta";
        assert_eq!(page.lyrics, expected);
        assert!(!page.lyrics.contains("You came walking"));
    }

    #[test]
    fn missing_content_block_is_fatal() {
        let err = extract_song_from_str(&fixture("no_content_block")).unwrap_err();
        assert!(matches!(err, ExtractError::ContentBlockNotFound));
        assert_eq!(err.to_string(), "main content block not found");
    }

    #[test]
    fn empty_lyrics_warns() {
        let page = extract_song_from_str(&fixture("empty_lyrics")).unwrap();
        assert_eq!(page.lyrics, "");
        assert_eq!(page.warnings, vec![Warning::EmptyLyrics]);
        assert_eq!(page.metadata.raga, "tODi");
    }

    #[test]
    fn missing_anchor_is_soft() {
        let html = r#"<table><tr><td width="100%" valign="top">
            <p>Song: x</p><hr><p>pallavi</p><p>line</p></td></tr></table>"#;
        let page = extract_song_from_str(html).unwrap();
        assert_eq!(page.lyrics, "");
        assert!(page.warnings.contains(&Warning::AnchorMissing));
        assert!(!page.warnings.contains(&Warning::EmptyLyrics));
        assert!(page.warnings.contains(&Warning::FieldMissing(Field::Composer)));
        assert_eq!(page.metadata.composer, metadata::UNKNOWN);
    }

    #[test]
    fn missing_boundary_is_soft() {
        let html = r#"<table><tr><td width="100%" valign="top">
            <p>Language: Tamil</p><p>pallavi</p></td></tr></table>"#;
        let page = extract_song_from_str(html).unwrap();
        assert!(page.warnings.contains(&Warning::BoundaryMissing));
    }

    #[test]
    fn repeated_headers_kept() {
        let html = r#"<table><tr><td width="100%" valign="top">
            <p>Language: Tamil</p><hr>
            <p>pallavi</p><p>pallavi</p><p>x</p></td></tr></table>"#;
        let page = extract_song_from_str(html).unwrap();
        assert_eq!(page.lyrics, "[Pallavi]\n\n[Pallavi]\nx");
    }

    #[test]
    fn warnings_serialize_tagged() {
        let json = serde_json::to_value(Warning::FieldMissing(Field::Tala)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "field_missing", "field": "tala" }));
        let json = serde_json::to_value(Warning::EmptyLyrics).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "empty_lyrics" }));
    }
}
