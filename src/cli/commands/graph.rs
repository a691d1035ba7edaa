//! sb graph - prerequisite graph of one archetype.

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_robot, robot_ok};
use crate::config::GRAPH_FORMATS;
use crate::core::{DependencyGraph, GraphBuilder};
use crate::error::{Result, SbError};

#[derive(Args, Debug, Default)]
pub struct GraphArgs {
    /// Archetype to graph (default: the selected one)
    pub archetype: Option<String>,

    /// Output format: elements, json, dot, mermaid (default from config)
    #[arg(long)]
    pub format: Option<String>,

    /// Print the topological layers instead of the graph
    #[arg(long)]
    pub layers: bool,
}

pub async fn run(ctx: &AppContext, args: &GraphArgs) -> Result<()> {
    let format = args
        .format
        .clone()
        .unwrap_or_else(|| ctx.config.graph.default_format.clone());
    if !GRAPH_FORMATS.contains(&format.as_str()) {
        return Err(SbError::Config(format!(
            "unknown graph format {format:?} (expected one of: {})",
            GRAPH_FORMATS.join(", ")
        )));
    }

    let snapshot = ctx.load_catalog().await?;
    let (selection, _) = ctx.current_selection(&snapshot.keys())?;
    let archetype = args
        .archetype
        .clone()
        .or_else(|| selection.key().map(str::to_string))
        .ok_or_else(|| SbError::NotFound("catalog has no archetypes".to_string()))?;
    let skills = snapshot
        .groups
        .get(&archetype)
        .ok_or_else(|| SbError::NotFound(format!("archetype {archetype:?}")))?;

    let graph = GraphBuilder::new(ctx.config.graph.sentinel.clone()).build(&archetype, skills);
    debug!(
        target: "sb::graph",
        archetype = %archetype,
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        "graph built"
    );

    if args.layers {
        return emit_layers(ctx, &graph);
    }

    let warnings: Vec<String> = graph.warnings().iter().map(ToString::to_string).collect();
    if ctx.output_format == OutputFormat::Json {
        let rendered = match format.as_str() {
            "elements" => graph.to_elements(),
            "json" => serde_json::to_value(&graph)?,
            "dot" => serde_json::Value::String(graph.to_dot()),
            _ => serde_json::Value::String(graph.to_mermaid()),
        };
        let response = robot_ok(serde_json::json!({
            "archetype": archetype,
            "format": format,
            "graph": rendered,
        }))
        .with_warnings(warnings);
        return emit_robot(&response);
    }

    match format.as_str() {
        "elements" => println!("{}", serde_json::to_string_pretty(&graph.to_elements())?),
        "json" => println!("{}", serde_json::to_string_pretty(&graph)?),
        "dot" => print!("{}", graph.to_dot()),
        _ => print!("{}", graph.to_mermaid()),
    }
    Ok(())
}

fn emit_layers(ctx: &AppContext, graph: &DependencyGraph) -> Result<()> {
    let layering = graph.layers();
    if ctx.output_format == OutputFormat::Json {
        return emit_robot(&robot_ok(serde_json::json!({
            "archetype": graph.archetype(),
            "layering": layering,
        })));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("{} prerequisite layers", graph.archetype()));
    for (depth, layer) in layering.layers.iter().enumerate() {
        layout.kv(&format!("Layer {depth}"), &layer.join(", "));
    }
    if !layering.cyclic.is_empty() {
        layout.warning(&format!("cycle among: {}", layering.cyclic.join(", ")));
    }
    emit_human(layout);
    Ok(())
}
