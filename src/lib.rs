//! Build test-result ingestion library.
//!
//! Shared by the reporting server (`btr-server`) and the worker step
//! (`parse-junit`): report discovery and parsing, aggregation, verdict,
//! result storage and reporting to the tracking service.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
