//! Edu-Supply: capital ledger and decision scoring for educational institutions.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod report;
pub mod session;
pub mod storage;
pub mod sync;
pub mod types;
