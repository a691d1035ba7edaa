//! sb export - write the catalog as a feed.

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_robot, robot_ok};
use crate::error::{Result, SbError};
use crate::feed::{export_feed, write_feed};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Export only this archetype
    #[arg(long)]
    pub archetype: Option<String>,
}

pub async fn run(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let snapshot = ctx.load_catalog().await?;
    let skills = match &args.archetype {
        Some(archetype) => snapshot
            .groups
            .get(archetype)
            .ok_or_else(|| SbError::NotFound(format!("archetype {archetype:?}")))?
            .to_vec(),
        None => snapshot.groups.skills(),
    };

    match &args.output {
        Some(path) => {
            write_feed(path, &skills)?;
            if ctx.output_format == OutputFormat::Json {
                return emit_robot(&robot_ok(serde_json::json!({
                    "path": path,
                    "skills": skills.len(),
                })));
            }
            eprintln!("Exported {} skills to {}", skills.len(), path.display());
        }
        None => {
            let text = export_feed(&skills)?;
            if ctx.output_format == OutputFormat::Json {
                return emit_robot(&robot_ok(serde_json::json!({
                    "skills": skills.len(),
                    "feed": text,
                })));
            }
            print!("{text}");
        }
    }
    Ok(())
}
