//! Core data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod fragment;
pub mod movie;
pub mod summary;

// Intentionally curated re-exports for downstream consumers.
pub use fragment::RawFragment;
pub use movie::{
    MovieRecord, NO_RATING, NOT_RATED, UNKNOWN_CATEGORY, UNKNOWN_RATING,
};
pub use summary::Summary;
