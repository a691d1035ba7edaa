//! sb prefs - stored display preferences.

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::prefs::{ColorScheme, Preferences, cycle_color_scheme};

#[derive(Args, Debug)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Print every stored preference
    Show,
    /// Set the color scheme
    Color(ColorArgs),
    /// Step through color schemes
    CycleColor(CycleColorArgs),
    /// Turn skill descriptions on or off
    Descriptions(DescriptionsArgs),
}

#[derive(Args, Debug)]
pub struct ColorArgs {
    /// One of: melon, dark-mode, earth-tones, bubblegum, honey, mint, the-bay
    pub scheme: String,
}

#[derive(Args, Debug)]
pub struct CycleColorArgs {
    /// Step backwards
    #[arg(long)]
    pub back: bool,
}

#[derive(Args, Debug)]
pub struct DescriptionsArgs {
    /// on|off, true|false, yes|no
    #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
    pub show: bool,
}

pub fn run(ctx: &AppContext, args: &PrefsArgs) -> Result<()> {
    match &args.command {
        PrefsCommand::Show => {}
        PrefsCommand::Color(color) => {
            let scheme: ColorScheme = color.scheme.parse()?;
            Preferences::save_color_scheme(&ctx.prefs, scheme)?;
        }
        PrefsCommand::CycleColor(cycle) => {
            let current = Preferences::load(&ctx.prefs).color_scheme;
            Preferences::save_color_scheme(&ctx.prefs, cycle_color_scheme(current, !cycle.back))?;
        }
        PrefsCommand::Descriptions(descriptions) => {
            Preferences::save_show_descriptions(&ctx.prefs, descriptions.show)?;
        }
    }

    let prefs = Preferences::load(&ctx.prefs);
    if ctx.output_format == OutputFormat::Json {
        return emit_robot(&robot_ok(serde_json::json!({
            "path": ctx.prefs.path(),
            "preferences": prefs,
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Preferences")
        .kv("Selected", prefs.selection.key().unwrap_or("(none)"))
        .kv("Descriptions", if prefs.show_descriptions { "on" } else { "off" })
        .kv("Color scheme", prefs.color_scheme.as_str())
        .kv(
            "Last version",
            prefs.last_seen_version.as_deref().unwrap_or("(never)"),
        )
        .kv("File", &ctx.prefs.path().display().to_string());
    emit_human(layout);
    Ok(())
}
