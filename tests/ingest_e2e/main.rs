//! Ingestion E2E test suite.
//!
//! Runs the step against report fixtures on disk and a mock tracking service,
//! and the result store and HTTP API against a throwaway SQLite database.
//!
//! Run with: cargo test --test ingest_e2e

mod test_helpers;

mod test_store;
