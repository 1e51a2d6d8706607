//! Dated snapshot files on disk.
//!
//! Each calendar day owns exactly one `movie_output_<YYYY-MM-DD>.csv`. A new
//! run on the same day replaces that file; nothing is appended or versioned
//! beyond the date. Readers pick the lexicographically greatest matching
//! file name, which for zero-padded ISO dates is the most recent day.
//!
//! Writes go to a temp file in the same directory that is fsynced and then
//! renamed over the target, so a concurrent reader sees either the old file
//! or the new one, never a truncated one. At most one writer per date is
//! assumed; that is up to the caller's scheduling.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::store::{RecordStore, Snapshot};

pub const SNAPSHOT_PREFIX: &str = "movie_output_";
pub const SNAPSHOT_SUFFIX: &str = ".csv";
pub const PAGE_PREFIX: &str = "sample_response_";
pub const PAGE_SUFFIX: &str = ".html";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TEMP_PREFIX: &str = ".marquee-";
const TEMP_SUFFIX: &str = ".tmp";
#[cfg(unix)]
const SNAPSHOT_MODE: u32 = 0o644;

/// `movie_output_<YYYY-MM-DD>.csv` for `date`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    dated_name(SNAPSHOT_PREFIX, date, SNAPSHOT_SUFFIX)
}

pub fn page_file_name(date: NaiveDate) -> String {
    dated_name(PAGE_PREFIX, date, PAGE_SUFFIX)
}

/// Date encoded in a snapshot file name, if the name follows the pattern
/// with a real, zero-padded calendar date.
pub fn parse_snapshot_date(file_name: &str) -> Option<NaiveDate> {
    parse_dated_name(file_name, SNAPSHOT_PREFIX, SNAPSHOT_SUFFIX)
}

/// Pick the newest snapshot among `names` by lexicographic maximum.
///
/// Names that do not match the dated pattern are ignored.
pub fn select_latest<'a, I>(names: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| parse_snapshot_date(name).is_some())
        .max()
}

/// A dated file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// Raw listing page kept next to the snapshots so a run can be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedPage {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    dir: PathBuf,
}

impl SnapshotRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(snapshot_file_name(date))
    }

    /// All dated snapshots, oldest first. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<SnapshotEntry>> {
        let mut entries: Vec<SnapshotEntry> = self
            .file_names()?
            .into_iter()
            .filter_map(|name| {
                let date = parse_snapshot_date(&name)?;
                Some(SnapshotEntry {
                    date,
                    path: self.dir.join(name),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Newest snapshot file, without reading it.
    pub fn latest_entry(&self) -> Result<SnapshotEntry> {
        let names = self.file_names()?;
        let latest = select_latest(names.iter().map(String::as_str))
            .ok_or_else(|| CatalogError::NoSnapshotFound {
                dir: self.dir.clone(),
            })?;

        let date = parse_snapshot_date(latest).ok_or_else(|| {
            CatalogError::malformed(self.dir.join(latest), "file name lost its date")
        })?;
        Ok(SnapshotEntry {
            date,
            path: self.dir.join(latest),
        })
    }

    /// Load the newest snapshot, reading the file fresh on every call.
    pub fn latest(&self) -> Result<Snapshot> {
        let entry = self.latest_entry()?;
        debug!(path = %entry.path.display(), "loading latest snapshot");
        read_snapshot(&entry)
    }

    /// Load the snapshot written for a specific day.
    pub fn load(&self, date: NaiveDate) -> Result<Snapshot> {
        let entry = SnapshotEntry {
            date,
            path: self.path_for(date),
        };
        match read_snapshot(&entry) {
            Err(CatalogError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(CatalogError::NoSnapshotFound {
                    dir: self.dir.clone(),
                })
            }
            other => other,
        }
    }

    /// Persist `snapshot` under its own date, replacing any file already
    /// written for that day.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let path = self.path_for(snapshot.date());
        atomic_write(&path, &snapshot.to_csv())?;
        info!(
            path = %path.display(),
            records = snapshot.len(),
            "snapshot written"
        );
        Ok(path)
    }

    /// Keep the raw listing page for `date`, replacing an older copy.
    pub fn archive_page(&self, date: NaiveDate, html: &str) -> Result<PathBuf> {
        let path = self.dir.join(page_file_name(date));
        atomic_write(&path, html.as_bytes())?;
        debug!(path = %path.display(), bytes = html.len(), "listing page archived");
        Ok(path)
    }

    /// Newest archived listing page, if any.
    pub fn latest_page(&self) -> Result<Option<ArchivedPage>> {
        let latest = self
            .file_names()?
            .into_iter()
            .filter_map(|name| {
                parse_dated_name(&name, PAGE_PREFIX, PAGE_SUFFIX).map(|date| (name, date))
            })
            .max_by(|a, b| a.0.cmp(&b.0));

        let Some((name, date)) = latest else {
            return Ok(None);
        };
        let path = self.dir.join(name);
        let html = fs::read_to_string(&path)?;
        Ok(Some(ArchivedPage { date, path, html }))
    }

    fn file_names(&self) -> Result<Vec<String>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            // A writer's temp file may vanish between readdir and stat.
            if !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with(SNAPSHOT_PREFIX)
                && name.ends_with(SNAPSHOT_SUFFIX)
                && parse_snapshot_date(&name).is_none()
            {
                warn!(file = %name, "ignoring snapshot-like file without a valid date");
            }
            names.push(name);
        }
        Ok(names)
    }
}

fn read_snapshot(entry: &SnapshotEntry) -> Result<Snapshot> {
    let bytes = fs::read(&entry.path)?;
    let store = RecordStore::from_csv_at(&bytes, &entry.path)?;
    Ok(Snapshot::from_stored(entry.date, store))
}

fn dated_name(prefix: &str, date: NaiveDate, suffix: &str) -> String {
    format!("{prefix}{}{suffix}", date.format(DATE_FORMAT))
}

fn parse_dated_name(file_name: &str, prefix: &str, suffix: &str) -> Option<NaiveDate> {
    let middle = file_name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    let date = NaiveDate::parse_from_str(middle, DATE_FORMAT).ok()?;
    // Reject unpadded forms so name order keeps matching date order.
    (date.format(DATE_FORMAT).to_string() == middle).then_some(date)
}

/// Atomically replace `path` with `bytes`.
///
/// Strategy:
/// - Write to a uniquely named temp file in the target directory
/// - fsync the temp file
/// - Rename it over the destination (atomic on POSIX filesystems)
/// - Best-effort fsync the parent directory to persist the rename
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(parent)?;
    // tempfile creates 0600 files; readers may run as another user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(SNAPSHOT_MODE))?;
    }
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    // On failure the temp file is dropped and removed.
    tmp.persist(path).map_err(|err| err.error)?;

    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}
