use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::normalize::dedup_words;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Raga,
    Tala,
    Composer,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Raga => "raga",
            Field::Tala => "tala",
            Field::Composer => "composer",
        })
    }
}

/// A field's value is whatever sits between its label and the first of its
/// terminator labels.
struct FieldPattern {
    field: Field,
    start: &'static str,
    ends: &'static [&'static str],
}

const FIELD_PATTERNS: &[FieldPattern] = &[
    FieldPattern { field: Field::Title, start: "Song:", ends: &["raagam:", "Aa:"] },
    FieldPattern { field: Field::Raga, start: "raagam:", ends: &["Aa:", "taaLam:"] },
    FieldPattern { field: Field::Tala, start: "taaLam:", ends: &["Composer:"] },
    FieldPattern { field: Field::Composer, start: "Composer:", ends: &["Language:"] },
];

impl FieldPattern {
    fn compile(&self) -> Regex {
        let ends = self
            .ends
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?is){}\s*(.*?)\s*(?:{})", regex::escape(self.start), ends);
        Regex::new(&pattern).unwrap()
    }
}

static FIELD_RES: LazyLock<Vec<(Field, Regex)>> =
    LazyLock::new(|| FIELD_PATTERNS.iter().map(|p| (p.field, p.compile())).collect());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongMetadata {
    pub title: String,
    pub raga: String,
    pub tala: String,
    pub composer: String,
}

/// Pull all four fields from the flattened content text. Fields that fail
/// to match are set to [`UNKNOWN`] and reported in the returned list.
pub fn extract(text: &str) -> (SongMetadata, Vec<Field>) {
    let mut missing = Vec::new();
    let mut value = |field: Field| match capture(field, text) {
        Some(v) => v,
        None => {
            missing.push(field);
            UNKNOWN.to_string()
        }
    };

    let metadata = SongMetadata {
        title: value(Field::Title),
        raga: value(Field::Raga),
        tala: value(Field::Tala),
        composer: value(Field::Composer),
    };
    (metadata, missing)
}

/// Text between the field's label and terminator, trimmed. Empty values
/// count as no match.
pub fn capture(field: Field, text: &str) -> Option<String> {
    let (_, re) = FIELD_RES.iter().find(|(f, _)| *f == field)?;
    let raw = re.captures(text)?.get(1)?.as_str().trim();
    let value = match field {
        Field::Title => dedup_words(raw),
        _ => raw.to_string(),
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
