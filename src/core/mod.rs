//! Skill catalog pipeline: normalize, group, graph, select.

pub mod graph;
pub mod group;
pub mod normalize;
pub mod selection;
pub mod skill;

pub use graph::{
    DanglingPrerequisite, DependencyGraph, GraphBuilder, GraphEdge, GraphNode, Layering,
    NodeKind, ROOT_NODE_ID, build_graph, parse_prerequisites,
};
pub use group::{ArchetypeGroups, group_by_archetype};
pub use normalize::{normalize, normalize_with_sentinel};
pub use selection::{Selection, SelectionKeyMissing};
pub use skill::{COLUMNS, FieldValue, IDENTITY_COLUMNS, NO_PREREQUISITE, RawRow, Skill};

use crate::error::Result;

/// Normalizer followed by grouper.
pub fn ingest(rows: Vec<RawRow>, sentinel: &str) -> Result<ArchetypeGroups> {
    let skills = normalize_with_sentinel(rows, sentinel)?;
    Ok(group_by_archetype(skills))
}
