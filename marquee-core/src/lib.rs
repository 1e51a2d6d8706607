//! # Marquee Core
//!
//! Extraction, normalization and aggregation for movie showtime listings.
//!
//! ## Overview
//!
//! - **Field parsing**: turn a listing's `"Adventure, Drama - PG-13 - 201 min"`
//!   info text into category, rating and runtime with fixed fallbacks
//! - **Record store**: ordered collection with cap/dedupe/sort and a CSV codec
//! - **Snapshots**: one `movie_output_<YYYY-MM-DD>.csv` per day, written
//!   atomically, newest file wins on read
//! - **Statistics**: mean runtime and the modal rating set (ties kept)
//! - **Queries**: stateless reads over the newest snapshot
//!
//! ## Feature Flags
//!
//! - `scrape` (default): listing page fetch and HTML-to-fragment extraction
//!
//! ## Examples
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use marquee_core::{
//!     pipeline, FinalizeOptions, QueryService, RawFragment, SnapshotRepository,
//! };
//!
//! fn run() -> marquee_core::Result<()> {
//!     let repo = SnapshotRepository::new("data");
//!     let fragments = vec![RawFragment::new("Heat", "Crime - R - 170 min")];
//!     let date = NaiveDate::from_ymd_opt(2025, 7, 18).unwrap();
//!     pipeline::ingest(&repo, &fragments, date, &FinalizeOptions::default())?;
//!
//!     let summary = QueryService::new(repo).summary()?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// CSV reading and writing helpers used by the snapshot codec
pub mod csv;

/// Error types for parsing, persistence and lookup
pub mod error;

/// Info-string parser producing normalized records
pub mod parser;

/// Ingest runs from fragments or listing pages to a saved snapshot
pub mod pipeline;

/// Read API over the newest snapshot
pub mod query;

/// Dated snapshot files and atomic replacement
pub mod snapshot;

/// Runtime average and modal rating computation
pub mod stats;

/// Record collection, snapshot finalization and CSV codec
pub mod store;

/// Listing page download
#[cfg(feature = "scrape")]
#[cfg_attr(docsrs, doc(cfg(feature = "scrape")))]
pub mod fetch;

/// HTML listing extraction into raw fragments
#[cfg(feature = "scrape")]
#[cfg_attr(docsrs, doc(cfg(feature = "scrape")))]
pub mod listing;

pub use error::{CatalogError, Result};
pub use marquee_model::{MovieRecord, RawFragment, Summary};
pub use parser::FieldParser;
pub use query::QueryService;
pub use snapshot::{SnapshotEntry, SnapshotRepository};
pub use stats::StatisticsEngine;
pub use store::{FinalizeOptions, RecordStore, Snapshot};
