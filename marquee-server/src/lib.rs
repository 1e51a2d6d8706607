//! # Marquee Server
//!
//! Read API over the newest movie listing snapshot, plus the command-line
//! ingest that produces those snapshots.
//!
//! ## Routes
//!
//! - `GET /movies/all`: every record in the newest snapshot
//! - `GET /movies?rating=<r>`: records whose rating matches, case-insensitively
//! - `GET /movies/ratings`: distinct ratings, sorted
//! - `GET /movies/stats`: average runtime and modal ratings
//! - `GET /ping`, `GET /health`: liveness
//!
//! A missing snapshot answers 404; any other failure answers 500.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use errors::{AppError, AppResult};
pub use infra::{app_state::AppState, config::Config};
pub use routes::create_app;
