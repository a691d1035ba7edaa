//! End-to-end workflows: a running controller against real sources.

#[path = "../common/mod.rs"]
mod common;

mod live_workflow;
mod watch_command;
