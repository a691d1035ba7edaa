//! Property tests over the catalog pipeline.

mod determinism_tests;
mod graph_tests;
mod selection_tests;
