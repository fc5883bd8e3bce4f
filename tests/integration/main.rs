//! Integration tests: engine scenarios, persistence flows, remote sync
//! through an in-memory sink, and property checks over random operation
//! sequences.

mod memory_sink;
mod persistence;
mod properties;
mod scenarios;
