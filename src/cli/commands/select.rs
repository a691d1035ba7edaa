//! sb select - drive the selected-archetype state machine.

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::prefs::Preferences;

#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(subcommand)]
    pub command: SelectCommand,
}

#[derive(Subcommand, Debug)]
pub enum SelectCommand {
    /// Select the next archetype, wrapping at the end
    Next,
    /// Select the previous archetype, wrapping at the start
    Prev,
    /// Select an archetype by name
    Set(SetArgs),
    /// Print the current selection
    Show,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub archetype: String,
}

pub async fn run(ctx: &AppContext, args: &SelectArgs) -> Result<()> {
    let snapshot = ctx.load_catalog().await?;
    let keys = snapshot.keys();
    let (mut selection, reconciled) = ctx.current_selection(&keys)?;
    let before = selection.clone();

    let mut warnings: Vec<String> = reconciled.iter().map(ToString::to_string).collect();
    match &args.command {
        SelectCommand::Next => selection.cycle_forward(&keys),
        SelectCommand::Prev => selection.cycle_backward(&keys),
        SelectCommand::Set(set) => {
            if let Some(missing) = selection.set_explicit(&set.archetype, &keys) {
                warnings.push(missing.to_string());
            }
        }
        SelectCommand::Show => {}
    }

    if selection != before {
        Preferences::save_selection(&ctx.prefs, &selection)?;
    }

    let position = selection
        .key()
        .and_then(|key| keys.iter().position(|k| k == key));

    if ctx.output_format == OutputFormat::Json {
        let response = robot_ok(serde_json::json!({
            "selected": selection.key(),
            "previous": before.key(),
            "index": position,
            "count": keys.len(),
        }))
        .with_warnings(warnings);
        return emit_robot(&response);
    }

    let mut layout = HumanLayout::new();
    match (selection.key(), position) {
        (Some(key), Some(index)) => {
            layout.kv("Selected", &format!("{key} ({}/{})", index + 1, keys.len()));
        }
        _ => {
            layout.kv("Selected", "(none)");
        }
    }
    for warning in &warnings {
        layout.warning(warning);
    }
    emit_human(layout);
    Ok(())
}
