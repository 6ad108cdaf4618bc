//! Integration tests for the scan pipeline
//!
//! These tests exercise the crate's public surface end-to-end: the
//! robots.txt gate against a live mock HTTP server, and the record/export
//! path from a crawl outcome through the database to CSV.

mod pipeline_tests;
mod robots_tests;
