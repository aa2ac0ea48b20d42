//! Contracts and pure transformations for the CSV-to-Parquet ingestion
//! pipeline.
//!
//! This crate owns the pieces that need no cloud connectivity: parsing the
//! nested queue notification envelope, deriving destination object keys,
//! inferring column types from row-delimited text, re-encoding tables as
//! columnar Parquet buffers, and verifying upload credentials. Runtime
//! integration (queue, object store, metadata table, Lambda wiring) lives in
//! `crates/ingest_pipeline_lambda`.

pub mod auth;
pub mod columnar;
pub mod contract;
pub mod storage_keys;
pub mod tabular;
