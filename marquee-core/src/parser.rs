use marquee_model::{MovieRecord, NOT_RATED, RawFragment, UNKNOWN_CATEGORY};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{CatalogError, Result};

/// Separator between the `category`, `rating` and `length` parts of the info text.
pub const SEGMENT_SEPARATOR: &str = " - ";

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\s*min").expect("duration regex should compile")
});
static DIGIT_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("digit run regex should compile"));
static COLLAPSE_WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Turns raw listing fragments into [`MovieRecord`]s.
///
/// Field assignment is purely positional on the `" - "` split:
///
/// | segments | category | rating | length |
/// |---|---|---|---|
/// | 0 | `Unknown` | `Not Rated` | absent |
/// | 1 | P0 | `Not Rated` | absent |
/// | 2 | P0 | P1, or `Not Rated` when P1 looks like `"<n> min"` | P1 when it looks like a duration |
/// | 3+ | P0 | P1 | P2 (extra segments ignored) |
///
/// Rating text is never checked against a list of known labels, so an odd
/// label in the rating position is kept as-is rather than shifted into the
/// category.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldParser;

/// Records produced from a batch plus the number of fragments that had to be
/// dropped for lack of a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Vec<MovieRecord>,
    pub dropped: usize,
}

impl FieldParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one fragment. Only a missing or blank title is an error; every
    /// other gap falls back to the placeholder values.
    pub fn parse(&self, fragment: &RawFragment) -> Result<MovieRecord> {
        let name = fragment
            .title
            .as_deref()
            .map(clean_title)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| {
                CatalogError::MalformedFragment(format!(
                    "listing has no title (info: {:?})",
                    fragment.info.as_deref().unwrap_or_default()
                ))
            })?;

        let fields = self.parse_info(fragment.info.as_deref().unwrap_or_default());

        Ok(MovieRecord {
            name,
            category: fields.category,
            rating: fields.rating,
            length_minutes: fields.length_minutes,
        })
    }

    /// Parse a batch, skipping fragments without a title.
    pub fn parse_all<'a, I>(&self, fragments: I) -> ParseOutcome
    where
        I: IntoIterator<Item = &'a RawFragment>,
    {
        let mut outcome = ParseOutcome::default();
        for fragment in fragments {
            match self.parse(fragment) {
                Ok(record) => outcome.records.push(record),
                Err(err) => {
                    debug!(error = %err, "dropping listing fragment");
                    outcome.dropped += 1;
                }
            }
        }
        outcome
    }

    /// Split the info text into category, rating and length.
    pub fn parse_info(&self, info: &str) -> InfoFields {
        if info.trim().is_empty() {
            return InfoFields::fallback();
        }

        // Split first; each segment is cleaned on its own so an empty
        // leading segment keeps its position.

        let parts: Vec<&str> = info.split(SEGMENT_SEPARATOR).collect();
        let category = or_fallback(parts[0], UNKNOWN_CATEGORY);

        match parts.len() {
            1 => InfoFields {
                category,
                ..InfoFields::fallback()
            },
            2 if looks_like_duration(parts[1]) => InfoFields {
                category,
                rating: NOT_RATED.to_string(),
                length_minutes: extract_length(parts[1]),
            },
            2 => InfoFields {
                category,
                rating: or_fallback(parts[1], NOT_RATED),
                length_minutes: None,
            },
            _ => InfoFields {
                category,
                rating: or_fallback(parts[1], NOT_RATED),
                length_minutes: extract_length(parts[2]),
            },
        }
    }
}

/// Category, rating and length as read from one info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFields {
    pub category: String,
    pub rating: String,
    pub length_minutes: Option<u32>,
}

impl InfoFields {
    fn fallback() -> Self {
        Self {
            category: UNKNOWN_CATEGORY.to_string(),
            rating: NOT_RATED.to_string(),
            length_minutes: None,
        }
    }
}

/// Minutes from the first contiguous run of digits, ignoring any unit text.
///
/// This is the one decoding rule for length text, used both on freshly parsed
/// listings and on the `length` column of stored snapshots.
pub fn extract_length(text: &str) -> Option<u32> {
    DIGIT_RUN_PATTERN
        .find(text)
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
}

pub fn looks_like_duration(text: &str) -> bool {
    DURATION_PATTERN.is_match(text)
}

/// Trim whitespace and leftover separator hyphens from a segment.
pub fn clean_segment(raw: &str) -> String {
    let collapsed = COLLAPSE_WHITESPACE_REGEX.replace_all(raw, " ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || c == '-')
        .to_string()
}

fn clean_title(raw: &str) -> String {
    COLLAPSE_WHITESPACE_REGEX
        .replace_all(raw.trim(), " ")
        .to_string()
}

fn or_fallback(raw: &str, fallback: &str) -> String {
    let cleaned = clean_segment(raw);
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}
