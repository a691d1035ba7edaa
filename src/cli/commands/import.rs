//! sb import - load a feed file into the live database.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_robot, robot_ok};
use crate::core::{group_by_archetype, normalize_with_sentinel};
use crate::error::Result;
use crate::feed::read_feed;
use crate::source::SqliteSource;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Feed file to import (default: the configured feed path)
    pub feed: Option<PathBuf>,

    /// Validate without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let feed_path = args
        .feed
        .clone()
        .unwrap_or_else(|| ctx.config.source.resolved_feed_path(&ctx.sb_root));
    let database_path = ctx.config.source.resolved_database_path(&ctx.sb_root);

    let skills = normalize_with_sentinel(read_feed(&feed_path)?, &ctx.config.graph.sentinel)?;
    let archetypes = group_by_archetype(skills.clone()).len();

    let written = if args.dry_run {
        0
    } else {
        let source = SqliteSource::open(&database_path, ctx.config.source.poll_interval())?;
        source.replace_all(skills.clone()).await?
    };
    info!(
        target: "sb::import",
        feed = %feed_path.display(),
        skills = skills.len(),
        written,
        dry_run = args.dry_run,
        "feed imported"
    );

    if ctx.output_format == OutputFormat::Json {
        return emit_robot(&robot_ok(serde_json::json!({
            "feed": feed_path,
            "database": database_path,
            "skills": skills.len(),
            "archetypes": archetypes,
            "written": written,
            "dry_run": args.dry_run,
        })));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(if args.dry_run { "Import (dry run)" } else { "Import" })
        .kv("Feed", &feed_path.display().to_string())
        .kv("Database", &database_path.display().to_string())
        .kv("Skills", &skills.len().to_string())
        .kv("Archetypes", &archetypes.to_string())
        .kv("Written", &written.to_string());
    emit_human(layout);
    Ok(())
}
