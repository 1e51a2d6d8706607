//! Extraction run: fragments -> records -> dated snapshot on disk.

use std::path::PathBuf;

use chrono::NaiveDate;
use marquee_model::RawFragment;
use tracing::{info, warn};

use crate::error::Result;
use crate::parser::FieldParser;
use crate::snapshot::SnapshotRepository;
use crate::store::{FinalizeOptions, RecordStore};

/// What one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub date: NaiveDate,
    pub path: PathBuf,
    /// Fragments that parsed into records.
    pub accepted: usize,
    /// Fragments dropped for lack of a title.
    pub dropped: usize,
    /// Records written after capping and dedupe.
    pub stored: usize,
}

/// Parse `fragments`, finalize them for `date` and save the snapshot,
/// replacing any snapshot already written for that day.
pub fn ingest<'a, I>(
    repository: &SnapshotRepository,
    fragments: I,
    date: NaiveDate,
    options: &FinalizeOptions,
) -> Result<IngestReport>
where
    I: IntoIterator<Item = &'a RawFragment>,
{
    let outcome = FieldParser::new().parse_all(fragments);
    let accepted = outcome.records.len();
    if outcome.dropped > 0 {
        warn!(dropped = outcome.dropped, "listing fragments without a title were skipped");
    }

    let snapshot = RecordStore::from(outcome.records).finalize(date, options);
    let stored = snapshot.len();
    let path = repository.save(&snapshot)?;

    info!(%date, accepted, stored, "ingest finished");
    Ok(IngestReport {
        date,
        path,
        accepted,
        dropped: outcome.dropped,
        stored,
    })
}

/// Extract fragments from a listing page and ingest them.
///
/// The cap in `options` is applied while collecting, so only the first
/// listings on the page are considered.
#[cfg(feature = "scrape")]
pub fn ingest_html(
    repository: &SnapshotRepository,
    html: &str,
    date: NaiveDate,
    options: &FinalizeOptions,
) -> Result<IngestReport> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let fragments = crate::listing::extract_fragments(html, limit)?;
    ingest(repository, &fragments, date, options)
}
