//! Prerequisite graph for one archetype.
//!
//! Nodes are the archetype's skills plus one synthetic root that anchors
//! prerequisite-free skills for layout. Edges run prerequisite -> dependent,
//! one per name listed in the dependent's prerequisite text. The root is
//! only ever a `parent`, never an edge endpoint.
//!
//! A prerequisite naming no node still produces its edge (flagged dangling)
//! and a [`DanglingPrerequisite`] warning. Cycles are not rejected here;
//! [`DependencyGraph::layers`] reports them for whoever lays the graph out.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::skill::{NO_PREREQUISITE, Skill};

/// Identity of the synthetic root node.
pub const ROOT_NODE_ID: &str = "prerequisite-root";

/// Separator between names in a multi-prerequisite list.
pub const PREREQUISITE_DELIMITER: char = ',';

/// Renderer class attached to every skill node.
pub const SKILL_NODE_CLASS: &str = "switch";

pub const NODE_HINTS: NodeHints = NodeHints {
    call_count: 10,
    delay_ms: 100,
};

pub const EDGE_HINTS: EdgeHints = EdgeHints {
    call_count: 10,
    delay_ms: 100,
    speed: 100,
    bandwidth: 50,
};

/// Layout weights for a node. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHints {
    #[serde(rename = "callCount")]
    pub call_count: u32,
    #[serde(rename = "delayMS")]
    pub delay_ms: u32,
}

/// Layout weights for an edge. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeHints {
    #[serde(rename = "callCount")]
    pub call_count: u32,
    #[serde(rename = "delayMS")]
    pub delay_ms: u32,
    pub speed: u32,
    #[serde(rename = "bw")]
    pub bandwidth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Skill,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub parent: Option<String>,
    pub hints: Option<NodeHints>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    /// Source names no node in this graph.
    pub dangling: bool,
    pub hints: EdgeHints,
}

/// A prerequisite name with no matching skill in the archetype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DanglingPrerequisite {
    pub prerequisite: String,
    pub skill: String,
}

impl std::fmt::Display for DanglingPrerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} requires {:?}, which is not a skill in this archetype",
            self.skill, self.prerequisite
        )
    }
}

/// Topological layering of the skill nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Layering {
    /// `layers[d]` holds the skills whose longest prerequisite chain has length `d`.
    pub layers: Vec<Vec<String>>,
    /// Skills on or behind a cycle; they never reach zero in-degree.
    pub cyclic: Vec<String>,
}

/// Immutable graph snapshot handed to the visualization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    archetype: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    warnings: Vec<DanglingPrerequisite>,
}

impl DependencyGraph {
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    #[must_use]
    pub fn warnings(&self) -> &[DanglingPrerequisite] {
        &self.warnings
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
    }

    /// Skill nodes only, in archetype order.
    pub fn skill_nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes.iter().filter(|node| node.kind == NodeKind::Skill)
    }

    /// Longest-path layering over resolved edges (dangling edges are ignored).
    #[must_use]
    pub fn layers(&self) -> Layering {
        let order: Vec<&str> = self.skill_nodes().map(|node| node.id.as_str()).collect();
        let mut indegree: HashMap<&str, usize> = order.iter().map(|id| (*id, 0)).collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for edge in self.edges.iter().filter(|edge| !edge.dangling) {
            *indegree.entry(edge.target.as_str()).or_default() += 1;
            dependents
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        let mut layering = Layering::default();
        let mut frontier: Vec<&str> = order
            .iter()
            .copied()
            .filter(|id| indegree.get(id).copied() == Some(0))
            .collect();
        let mut placed: HashSet<&str> = HashSet::new();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in &frontier {
                placed.insert(*id);
                for dependent in dependents.get(id).map(Vec::as_slice).unwrap_or_default() {
                    if let Some(count) = indegree.get_mut(dependent) {
                        *count = count.saturating_sub(1);
                        if *count == 0 {
                            next.push(*dependent);
                        }
                    }
                }
            }
            next.sort_by_key(|id| order.iter().position(|o| o == id));
            next.dedup();
            layering
                .layers
                .push(frontier.iter().map(|id| (*id).to_string()).collect());
            frontier = next;
        }

        layering.cyclic = order
            .iter()
            .filter(|id| !placed.contains(*id))
            .map(|id| (*id).to_string())
            .collect();
        layering
    }

    /// Element list in the shape the graph renderer consumes.
    #[must_use]
    pub fn to_elements(&self) -> Value {
        let nodes: Vec<Value> = self
            .nodes
            .iter()
            .map(|node| match (node.kind, node.hints) {
                (NodeKind::Skill, Some(hints)) => json!({
                    "data": {
                        "id": node.id,
                        "label": node.label,
                        "parent": node.parent,
                        "callCount": hints.call_count,
                        "delayMS": hints.delay_ms,
                    },
                    "classes": SKILL_NODE_CLASS,
                }),
                _ => json!({ "data": { "id": node.id } }),
            })
            .collect();

        let edges: Vec<Value> = self
            .edges
            .iter()
            .map(|edge| {
                json!({
                    "data": {
                        "source": edge.source,
                        "target": edge.target,
                        "callCount": edge.hints.call_count,
                        "delayMS": edge.hints.delay_ms,
                        "speed": edge.hints.speed,
                        "bw": edge.hints.bandwidth,
                    }
                })
            })
            .collect();

        json!({ "nodes": nodes, "edges": edges })
    }

    /// Graphviz rendering; skills sit in a cluster standing in for the root.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {} {{", dot_quote(&self.archetype));
        let _ = writeln!(out, "  rankdir=TB;");
        let _ = writeln!(out, "  subgraph \"cluster_{ROOT_NODE_ID}\" {{");
        let _ = writeln!(out, "    label={};", dot_quote(&self.archetype));
        for node in self.skill_nodes() {
            let _ = writeln!(
                out,
                "    {} [label={}];",
                dot_quote(&node.id),
                dot_quote(&node.label)
            );
        }
        let _ = writeln!(out, "  }}");
        for edge in &self.edges {
            let style = if edge.dangling { " [style=dashed]" } else { "" };
            let _ = writeln!(
                out,
                "  {} -> {}{style};",
                dot_quote(&edge.source),
                dot_quote(&edge.target)
            );
        }
        out.push_str("}\n");
        out
    }

    /// Mermaid flowchart rendering.
    #[must_use]
    pub fn to_mermaid(&self) -> String {
        let mut ids: HashMap<&str, String> = HashMap::new();
        let names = self
            .skill_nodes()
            .map(|node| node.id.as_str())
            .chain(self.edges.iter().map(|edge| edge.source.as_str()));
        for name in names {
            let next = format!("n{}", ids.len());
            ids.entry(name).or_insert(next);
        }

        let mut out = String::from("flowchart TD\n");
        let _ = writeln!(
            out,
            "  subgraph root[\"{}\"]",
            mermaid_escape(&self.archetype)
        );
        for node in self.skill_nodes() {
            let _ = writeln!(
                out,
                "    {}[\"{}\"]",
                ids[node.id.as_str()],
                mermaid_escape(&node.label)
            );
        }
        out.push_str("  end\n");

        let dangling_sources = self
            .edges
            .iter()
            .filter(|edge| edge.dangling)
            .map(|edge| edge.source.as_str())
            .unique();
        for source in dangling_sources {
            let _ = writeln!(out, "  {}[\"{}\"]", ids[source], mermaid_escape(source));
        }

        for edge in &self.edges {
            let arrow = if edge.dangling { "-.->" } else { "-->" };
            let _ = writeln!(
                out,
                "  {} {arrow} {}",
                ids[edge.source.as_str()],
                ids[edge.target.as_str()]
            );
        }
        out
    }
}

fn dot_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn mermaid_escape(value: &str) -> String {
    value.replace('"', "#quot;")
}

/// Split prerequisite text into names, dropping blanks and the sentinel.
#[must_use]
pub fn parse_prerequisites<'a>(raw: &'a str, sentinel: &str) -> Vec<&'a str> {
    raw.split(PREREQUISITE_DELIMITER)
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != sentinel)
        .collect()
}

/// Builds [`DependencyGraph`]s for a fixed "no prerequisite" sentinel.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    sentinel: String,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(NO_PREREQUISITE)
    }
}

impl GraphBuilder {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    #[must_use]
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    #[must_use]
    pub fn build(&self, archetype: &str, skills: &[Skill]) -> DependencyGraph {
        let mut nodes = Vec::with_capacity(skills.len() + 1);
        nodes.push(GraphNode {
            id: ROOT_NODE_ID.to_string(),
            label: self.sentinel.clone(),
            kind: NodeKind::Root,
            parent: None,
            hints: None,
        });

        let known: HashSet<&str> = skills.iter().map(|skill| skill.name.as_str()).collect();
        let mut edges = Vec::new();
        let mut warnings = Vec::new();

        for skill in skills {
            nodes.push(GraphNode {
                id: skill.name.clone(),
                label: skill.name.clone(),
                kind: NodeKind::Skill,
                parent: Some(ROOT_NODE_ID.to_string()),
                hints: Some(NODE_HINTS),
            });

            if !skill.has_prerequisite(&self.sentinel) {
                continue;
            }

            for prerequisite in parse_prerequisites(&skill.prerequisite, &self.sentinel) {
                let dangling = !known.contains(prerequisite);
                if dangling {
                    warn!(
                        target: "sb::graph",
                        archetype,
                        prerequisite,
                        skill = %skill.name,
                        "dangling prerequisite"
                    );
                    warnings.push(DanglingPrerequisite {
                        prerequisite: prerequisite.to_string(),
                        skill: skill.name.clone(),
                    });
                }
                edges.push(GraphEdge {
                    source: prerequisite.to_string(),
                    target: skill.name.clone(),
                    dangling,
                    hints: EDGE_HINTS,
                });
            }
        }

        debug!(
            target: "sb::graph",
            archetype,
            nodes = nodes.len(),
            edges = edges.len(),
            dangling = warnings.len(),
            "graph built"
        );

        DependencyGraph {
            archetype: archetype.to_string(),
            nodes,
            edges,
            warnings,
        }
    }
}

/// Build with the default sentinel.
#[must_use]
pub fn build_graph(archetype: &str, skills: &[Skill]) -> DependencyGraph {
    GraphBuilder::default().build(archetype, skills)
}
