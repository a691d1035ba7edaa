//! sb show - skills of one archetype.

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_robot, robot_ok};
use crate::error::{Result, SbError};
use crate::prefs::Preferences;

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Archetype to show (default: the selected one)
    pub archetype: Option<String>,

    /// Include descriptions (default: the stored preference)
    #[arg(long, conflicts_with = "no_descriptions")]
    pub descriptions: bool,

    /// Leave descriptions out
    #[arg(long)]
    pub no_descriptions: bool,
}

pub async fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let snapshot = ctx.load_catalog().await?;
    let (selection, warning) = ctx.current_selection(&snapshot.keys())?;

    let archetype = match (&args.archetype, selection.key()) {
        (Some(requested), _) => requested.clone(),
        (None, Some(selected)) => selected.to_string(),
        (None, None) => return Err(SbError::NotFound("catalog has no archetypes".to_string())),
    };
    let skills = snapshot
        .groups
        .get(&archetype)
        .ok_or_else(|| SbError::NotFound(format!("archetype {archetype:?}")))?;

    let show_descriptions = if args.descriptions {
        true
    } else if args.no_descriptions {
        false
    } else {
        Preferences::load(&ctx.prefs).show_descriptions
    };

    if ctx.output_format == OutputFormat::Json {
        let mut entries = Vec::with_capacity(skills.len());
        for skill in skills {
            let mut entry = serde_json::to_value(skill)?;
            if !show_descriptions {
                if let Some(fields) = entry.as_object_mut() {
                    fields.remove("description");
                }
            }
            entries.push(entry);
        }
        let response = robot_ok(serde_json::json!({
            "archetype": archetype,
            "descriptions": show_descriptions,
            "skills": entries,
        }))
        .with_warnings(warning);
        return emit_robot(&response);
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("{archetype} ({} skills)", skills.len()));
    for skill in skills {
        layout.section(&skill.name);
        if skill.has_prerequisite(&ctx.config.graph.sentinel) {
            layout.kv("Prerequisite", &skill.prerequisite);
        }
        for (label, value) in [
            ("Casting time", &skill.casting_time),
            ("Range", &skill.range),
            ("Duration", &skill.duration),
            ("Uses", &skill.uses),
            ("Active", &skill.has_active),
            ("Passive", &skill.has_passive),
        ] {
            if !value.is_null() {
                layout.kv(label, &value.to_string());
            }
        }
        if show_descriptions {
            if let Some(description) = skill.description.as_text() {
                layout.push_line(description);
            }
        }
        layout.blank();
    }
    if let Some(warning) = warning {
        layout.warning(&warning.to_string());
    }
    emit_human(layout);
    Ok(())
}
