//! Unit-level integration tests against the public library surface.

#[path = "../common/mod.rs"]
mod common;
mod config_tests;
mod graph_tests;
mod pipeline_tests;
