//! sb archetypes - list archetype keys.

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_robot, robot_ok};
use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct ArchetypesArgs {}

#[derive(Serialize)]
struct ArchetypeEntry<'a> {
    name: &'a str,
    skills: usize,
    selected: bool,
}

pub async fn run(ctx: &AppContext, _args: &ArchetypesArgs) -> Result<()> {
    let snapshot = ctx.load_catalog().await?;
    let (selection, warning) = ctx.current_selection(&snapshot.keys())?;

    let entries: Vec<ArchetypeEntry<'_>> = snapshot
        .groups
        .iter()
        .map(|(name, skills)| ArchetypeEntry {
            name,
            skills: skills.len(),
            selected: selection.key() == Some(name),
        })
        .collect();

    if ctx.output_format == OutputFormat::Json {
        let response = robot_ok(serde_json::json!({
            "archetypes": entries,
            "selected": selection.key(),
            "skill_count": snapshot.skill_count(),
        }))
        .with_warnings(warning);
        return emit_robot(&response);
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!(
        "Archetypes ({} skills in {} archetypes)",
        snapshot.skill_count(),
        entries.len()
    ));
    for entry in &entries {
        let marker = if entry.selected { "*" } else { " " };
        layout.push_line(format!("{marker} {} ({})", entry.name, entry.skills));
    }
    if let Some(warning) = warning {
        layout.blank().warning(&warning.to_string());
    }
    emit_human(layout);
    Ok(())
}
