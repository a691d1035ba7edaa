//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod archetypes;
pub mod export;
pub mod graph;
pub mod import;
pub mod prefs;
pub mod select;
pub mod show;
pub mod watch;

use crate::app::AppContext;
use crate::error::Result;

pub async fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Archetypes(args) => archetypes::run(ctx, args).await,
        Commands::Show(args) => show::run(ctx, args).await,
        Commands::Graph(args) => graph::run(ctx, args).await,
        Commands::Select(args) => select::run(ctx, args).await,
        Commands::Prefs(args) => prefs::run(ctx, args),
        Commands::Import(args) => import::run(ctx, args).await,
        Commands::Export(args) => export::run(ctx, args).await,
        Commands::Watch(args) => watch::run(ctx, args).await,
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List archetypes in catalog order
    Archetypes(archetypes::ArchetypesArgs),

    /// Show the skills of one archetype
    Show(show::ShowArgs),

    /// Build and export an archetype's prerequisite graph
    Graph(graph::GraphArgs),

    /// Move or set the selected archetype
    Select(select::SelectArgs),

    /// Inspect and change stored preferences
    Prefs(prefs::PrefsArgs),

    /// Load a feed file into the live database
    Import(import::ImportArgs),

    /// Write the catalog as a feed
    Export(export::ExportArgs),

    /// Follow the source and report every catalog change
    Watch(watch::WatchArgs),
}
