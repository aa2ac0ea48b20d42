//! AWS-oriented adapters and handlers for the CSV-to-Parquet ingestion
//! pipeline.
//!
//! This crate owns runtime integration details (the queue-draining poller,
//! the upload Lambda handler, and storage adapters) and keeps the handlers
//! pure behind the adapter traits so they stay testable without cloud
//! connectivity. Contracts and transformations live in
//! `crates/ingest_pipeline_core`.

pub mod adapters;
pub mod handlers;
