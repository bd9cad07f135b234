//! Sportmonks Football Sync Library
//!
//! This library provides the core functionality for syncing football data
//! from the Sportmonks v3 API into Postgres: a paginated API client, typed
//! per-entity extractors, and the merge-upsert load strategies.
//!
//! # Modules
//!
//! - `client`: Paginated Sportmonks API client.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `extract`: Per-entity extractors and normalization.
//! - `models`: Typed entity records.
//! - `pipeline`: Full-load and current-season load strategies.
//! - `storage`: Merge-upsert sink.

pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod storage;
