use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use marquee_model::{MovieRecord, NOT_RATED, UNKNOWN_CATEGORY};
use tracing::warn;

use crate::csv::{parse_rows, write_row};
use crate::error::{CatalogError, Result};
use crate::parser::{clean_segment, extract_length};

/// Canonical column order written to snapshot files.
pub const CSV_COLUMNS: [&str; 4] = ["name", "category", "rating", "length"];

/// Options applied when a collection run is turned into a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeOptions {
    /// Keep only the first `limit` records in discovery order.
    pub limit: Option<usize>,
    /// Drop records identical to one seen earlier in the run.
    pub dedupe: bool,
}

/// In-memory, ordered collection of records for one run or one loaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<MovieRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without any dedup or ordering.
    pub fn add(&mut self, record: MovieRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<MovieRecord> {
        self.records
    }

    /// Cap, dedupe, then sort by name (case-insensitive, stable) into a
    /// snapshot for `date`.
    ///
    /// The cap is applied first so the snapshot holds the first N listings
    /// encountered, alphabetized.
    pub fn finalize(self, date: NaiveDate, options: &FinalizeOptions) -> Snapshot {
        let mut records = self.records;

        if let Some(limit) = options.limit {
            records.truncate(limit);
        }

        if options.dedupe {
            let mut seen = HashSet::with_capacity(records.len());
            records.retain(|record| seen.insert(record.clone()));
        }

        records.sort_by_cached_key(MovieRecord::sort_key);

        Snapshot { date, records }
    }

    /// Encode as CSV with the canonical header.
    pub fn to_csv(&self) -> Vec<u8> {
        encode_records(&self.records)
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        Self::from_csv_at(bytes, Path::new("<memory>"))
    }

    /// Decode CSV produced by [`RecordStore::to_csv`] or a compatible writer.
    ///
    /// Columns are matched by header name in any order. Only the `name`
    /// column is required; missing optional columns or cells fall back the
    /// same way the field parser does. `origin` is used in error messages.
    pub fn from_csv_at(bytes: &[u8], origin: &Path) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|err| {
            CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {err}", origin.display()),
            ))
        })?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut rows = parse_rows(text)
            .map_err(|err| {
                CatalogError::Io(std::io::Error::new(
                    err.kind(),
                    format!("{}: {err}", origin.display()),
                ))
            })?
            .into_iter();
        let header = rows
            .next()
            .ok_or_else(|| CatalogError::malformed(origin, "missing header row"))?;
        let columns = ColumnIndex::from_header(&header);
        let name_col = columns
            .name
            .ok_or_else(|| CatalogError::malformed(origin, "missing required `name` column"))?;

        let mut store = RecordStore::new();
        for (line, row) in rows.enumerate() {
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str);

            if row.len() > header.len() {
                warn!(
                    file = %origin.display(),
                    line = line + 2,
                    "snapshot row has more cells than the header; extras ignored"
                );
            }

            store.add(MovieRecord {
                name: cell(Some(name_col)).unwrap_or_default().trim().to_string(),
                category: fallback_cell(cell(columns.category), UNKNOWN_CATEGORY),
                rating: fallback_cell(cell(columns.rating), NOT_RATED),
                length_minutes: cell(columns.length).and_then(extract_length),
            });
        }

        Ok(store)
    }
}

impl From<Vec<MovieRecord>> for RecordStore {
    fn from(records: Vec<MovieRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<MovieRecord> for RecordStore {
    fn from_iter<T: IntoIterator<Item = MovieRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<MovieRecord> for RecordStore {
    fn extend<T: IntoIterator<Item = MovieRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// One dated, name-ordered set of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    date: NaiveDate,
    records: Vec<MovieRecord>,
}

impl Snapshot {
    /// Wrap records exactly as stored on disk; no reordering happens here.
    pub fn from_stored(date: NaiveDate, store: RecordStore) -> Self {
        Self {
            date,
            records: store.into_records(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<MovieRecord> {
        self.records
    }

    pub fn to_csv(&self) -> Vec<u8> {
        encode_records(&self.records)
    }
}

#[derive(Debug, Default)]
struct ColumnIndex {
    name: Option<usize>,
    category: Option<usize>,
    rating: Option<usize>,
    length: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Self {
        let positions: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .rev() // first occurrence wins
            .map(|(idx, label)| (label.trim().to_lowercase(), idx))
            .collect();

        Self {
            name: positions.get("name").copied(),
            category: positions.get("category").copied(),
            rating: positions.get("rating").copied(),
            length: positions.get("length").copied(),
        }
    }
}

fn fallback_cell(cell: Option<&str>, fallback: &str) -> String {
    let cleaned = cell.map(clean_segment).unwrap_or_default();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

fn encode_records(records: &[MovieRecord]) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_row(&mut buf, &CSV_COLUMNS);
    for record in records {
        let length = record
            .length_minutes
            .map(|minutes| format!("{minutes} min"))
            .unwrap_or_default();
        let _ = write_row(
            &mut buf,
            &[
                record.name.as_str(),
                record.category.as_str(),
                record.rating.as_str(),
                length.as_str(),
            ],
        );
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 18).unwrap()
    }

    fn record(name: &str, rating: &str, length: Option<u32>) -> MovieRecord {
        MovieRecord::new(name, "Drama", rating, length)
    }

    fn names(records: &[MovieRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn finalize_sorts_case_insensitively_and_stably() {
        let store: RecordStore = vec![
            record("beta", "R", Some(1)),
            record("Alpha", "PG", Some(2)),
            record("BETA", "G", Some(3)),
            record("alpha", "R", Some(4)),
        ]
        .into_iter()
        .collect();

        let snapshot = store.finalize(date(), &FinalizeOptions::default());
        assert_eq!(names(snapshot.records()), ["Alpha", "alpha", "beta", "BETA"]);
        assert_eq!(snapshot.date(), date());
    }

    #[test]
    fn finalize_caps_before_sorting() {
        let store: RecordStore = ["Zed", "Yak", "Ant", "Bee"]
            .into_iter()
            .map(|n| record(n, "R", None))
            .collect();

        let options = FinalizeOptions {
            limit: Some(2),
            dedupe: false,
        };
        let snapshot = store.finalize(date(), &options);
        assert_eq!(names(snapshot.records()), ["Yak", "Zed"]);
    }

    #[test]
    fn finalize_dedupes_only_when_asked() {
        let dupes = vec![
            record("Heat", "R", Some(170)),
            record("Heat", "R", Some(170)),
            record("Heat", "R", Some(171)),
        ];

        let kept = RecordStore::from(dupes.clone()).finalize(date(), &FinalizeOptions::default());
        assert_eq!(kept.len(), 3);

        let options = FinalizeOptions {
            limit: None,
            dedupe: true,
        };
        let deduped = RecordStore::from(dupes).finalize(date(), &options);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn csv_has_canonical_header_and_length_text() {
        let store = RecordStore::from(vec![
            MovieRecord::new("Crouching Tiger, Hidden Dragon", "Action, Drama", "PG-13", Some(120)),
            MovieRecord::new("Unknown Length", "Drama", "R", None),
        ]);
        let text = String::from_utf8(store.to_csv()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,category,rating,length");
        assert_eq!(
            lines[1],
            "\"Crouching Tiger, Hidden Dragon\",\"Action, Drama\",PG-13,120 min"
        );
        assert_eq!(lines[2], "Unknown Length,Drama,R,");
    }

    #[test]
    fn csv_round_trip_preserves_records_and_order() {
        let store = RecordStore::from(vec![
            MovieRecord::new("Zulu", "War", "PG", Some(138)),
            MovieRecord::new("\"Quoted\" Title", "Comedy", "Not Rated", Some(0)),
            MovieRecord::new("Alien", "Horror, Sci-Fi", "R", Some(117)),
        ]);
        let decoded = RecordStore::from_csv(&store.to_csv()).unwrap();
        assert_eq!(decoded, store);
    }

    #[test]
    fn from_csv_tolerates_reordered_and_missing_columns() {
        let text = "length,Rating,name\n\"134 min\",PG-13,\"Movie Title\"\n,,Bare\n";
        let store = RecordStore::from_csv(text.as_bytes()).unwrap();
        assert_eq!(
            store.records(),
            [
                MovieRecord::new("Movie Title", UNKNOWN_CATEGORY, "PG-13", Some(134)),
                MovieRecord::new("Bare", UNKNOWN_CATEGORY, NOT_RATED, None),
            ]
        );
    }

    #[test]
    fn from_csv_handles_short_rows_and_bom() {
        let text = "\u{feff}name,category,rating,length\nShort Row,Drama\n";
        let store = RecordStore::from_csv(text.as_bytes()).unwrap();
        assert_eq!(
            store.records(),
            [MovieRecord::new("Short Row", "Drama", NOT_RATED, None)]
        );
    }

    #[test]
    fn from_csv_requires_name_column() {
        let err = RecordStore::from_csv(b"title,rating,length\nHeat,R,170 min\n").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedSnapshot { .. }));

        let err = RecordStore::from_csv(b"").unwrap_err();
        assert!(matches!(err, CatalogError::MalformedSnapshot { .. }));
    }

    #[test]
    fn from_csv_rejects_unterminated_quote_as_io() {
        let err = RecordStore::from_csv(b"name,rating\n\"Heat,R\n").unwrap_err();
        match err {
            CatalogError::Io(io) => assert_eq!(io.kind(), std::io::ErrorKind::InvalidData),
            other => panic!("expected Io(InvalidData), got {other:?}"),
        }
    }

    #[test]
    fn from_csv_rejects_invalid_utf8_as_io() {
        let err = RecordStore::from_csv(&[b'n', b'a', 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
