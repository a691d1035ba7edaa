//! sb watch - run the live controller and report each new catalog.

use std::sync::Arc;

use clap::Args;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json_line};
use crate::core::Selection;
use crate::error::Result;
use crate::live::{CatalogSnapshot, Reconciler};
use crate::prefs::Preferences;

#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Stop after this many catalog updates (baseline excluded)
    #[arg(long)]
    pub max_updates: Option<u64>,
}

pub async fn run(ctx: &AppContext, args: &WatchArgs) -> Result<()> {
    let source = Arc::new(ctx.build_source()?);
    let reconciler = Arc::new(Reconciler::with_sentinel(
        source,
        ctx.config.graph.sentinel.clone(),
    ));
    let snapshots = reconciler.snapshots();
    let handle = reconciler.start().await?;

    let mut selection = Preferences::load(&ctx.prefs).selection;
    let followed = follow(snapshots, args.max_updates, |snapshot| {
        report(ctx, snapshot, &mut selection)
    })
    .await;

    let stats = handle.close().await;
    followed?;
    if ctx.output_format == OutputFormat::Json {
        emit_json_line(&serde_json::json!({ "event": "stopped", "stats": stats }))?;
    } else {
        eprintln!(
            "stopped after {} reloads ({} notices, {} coalesced, {} failed)",
            stats.runs, stats.notifications, stats.coalesced, stats.failures
        );
    }
    Ok(())
}

/// Hand the current snapshot, then every later one, to `on_snapshot` until
/// `max_updates` later snapshots were seen, the controller goes away or the
/// user interrupts. Returns how many updates were seen.
async fn follow<F>(
    mut snapshots: watch::Receiver<Arc<CatalogSnapshot>>,
    max_updates: Option<u64>,
    mut on_snapshot: F,
) -> Result<u64>
where
    F: FnMut(&CatalogSnapshot) -> Result<()>,
{
    // Reading and marking seen in one step, so nothing published in
    // between goes unreported.
    let baseline = Arc::clone(&snapshots.borrow_and_update());
    on_snapshot(&baseline)?;

    let mut updates = 0u64;
    loop {
        if max_updates.is_some_and(|max| updates >= max) {
            break;
        }
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = Arc::clone(&snapshots.borrow_and_update());
                updates += 1;
                on_snapshot(&snapshot)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!(target: "sb::live", "interrupted");
                break;
            }
        }
    }
    Ok(updates)
}

fn report(ctx: &AppContext, snapshot: &CatalogSnapshot, selection: &mut Selection) -> Result<()> {
    let before = selection.clone();
    let missing = selection.reconcile(&snapshot.keys());
    if *selection != before {
        Preferences::save_selection(&ctx.prefs, selection)?;
    }
    if let Some(missing) = &missing {
        warn!(target: "sb::selection", "{missing}");
    }

    if ctx.output_format == OutputFormat::Json {
        let event = serde_json::json!({
            "event": "snapshot",
            "generation": snapshot.generation,
            "loaded": snapshot.loaded,
            "archetypes": snapshot.keys(),
            "skills": snapshot.skill_count(),
            "selected": selection.key(),
            "selection_fallback": missing,
        });
        return emit_json_line(&event);
    }

    if !snapshot.loaded {
        println!("[waiting] no catalog loaded yet");
        return Ok(());
    }
    println!(
        "[gen {}] {} skills in {} archetypes, selected: {}",
        snapshot.generation,
        snapshot.skill_count(),
        snapshot.groups.len(),
        selection.key().unwrap_or("(none)")
    );
    Ok(())
}
