//! Live reconciliation controller.
//!
//! Loads the full catalog once, then reloads it from scratch whenever the
//! source reports a change. Each completed reload replaces the published
//! [`CatalogSnapshot`] in one step; readers never observe a half-built
//! catalog. Notifications that pile up while a reload is running collapse
//! into a single follow-up reload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::{ArchetypeGroups, NO_PREREQUISITE, ingest};
use crate::error::Result;
use crate::source::{SkillSource, Subscription};

/// One published state of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    /// Bumped on every publish; 0 is the empty placeholder.
    pub generation: u64,
    pub groups: ArchetypeGroups,
    /// False until the first successful load.
    pub loaded: bool,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            generation: 0,
            groups: ArchetypeGroups::new(),
            loaded: false,
            loaded_at: None,
        }
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.groups.key_list()
    }

    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.groups.skill_count()
    }
}

/// Counters reported when a running controller is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Reloads published after the baseline.
    pub runs: u64,
    /// Notices received, coalesced ones included.
    pub notifications: u64,
    /// Notices absorbed into a reload that was already due.
    pub coalesced: u64,
    pub failures: u64,
    /// Reloads that finished after close and were thrown away.
    pub discarded: u64,
}

pub struct Reconciler<S: SkillSource> {
    source: Arc<S>,
    sentinel: String,
    snapshot: watch::Sender<Arc<CatalogSnapshot>>,
    run_gate: AsyncMutex<()>,
}

impl<S: SkillSource> Reconciler<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_sentinel(source, NO_PREREQUISITE)
    }

    pub fn with_sentinel(source: Arc<S>, sentinel: impl Into<String>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(CatalogSnapshot::empty()));
        Self {
            source,
            sentinel: sentinel.into(),
            snapshot,
            run_gate: AsyncMutex::new(()),
        }
    }

    /// Receiver that observes every published snapshot.
    pub fn snapshots(&self) -> watch::Receiver<Arc<CatalogSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn current(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn compute(&self) -> Result<ArchetypeGroups> {
        let rows = self.source.fetch_all().await?;
        ingest(rows, &self.sentinel)
    }

    fn publish(&self, groups: ArchetypeGroups) -> Arc<CatalogSnapshot> {
        let generation = self.snapshot.borrow().generation + 1;
        let next = Arc::new(CatalogSnapshot {
            generation,
            groups,
            loaded: true,
            loaded_at: Some(Utc::now()),
        });
        self.snapshot.send_replace(Arc::clone(&next));
        debug!(
            target: "sb::live",
            generation,
            archetypes = next.groups.len(),
            skills = next.skill_count(),
            "published snapshot"
        );
        next
    }

    /// Fetch, rebuild and publish once. On failure the previous snapshot
    /// stays published and the error is returned.
    pub async fn reconcile(&self) -> Result<Arc<CatalogSnapshot>> {
        let _gate = self.run_gate.lock().await;
        match self.compute().await {
            Ok(groups) => Ok(self.publish(groups)),
            Err(err) => {
                warn!(
                    target: "sb::live",
                    source = %self.source.describe(),
                    error = %err,
                    "reload failed, keeping previous catalog"
                );
                Err(err)
            }
        }
    }

    /// Subscribe, load the baseline, then keep reloading on change until
    /// the returned handle is closed or dropped.
    pub async fn start(self: &Arc<Self>) -> Result<ReconcileHandle> {
        let subscription = self.source.subscribe().await?;
        if let Err(err) = self.reconcile().await {
            warn!(target: "sb::live", error = %err, "baseline load failed, waiting for changes");
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.run_loop(subscription, shutdown_rx).await });
        info!(target: "sb::live", source = %self.source.describe(), "live reconciliation started");

        Ok(ReconcileHandle {
            shutdown,
            task: Some(task),
        })
    }

    async fn run_loop(
        &self,
        mut subscription: Subscription,
        mut shutdown: watch::Receiver<bool>,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                notice = subscription.recv() => {
                    let Some(notice) = notice else {
                        debug!(target: "sb::live", "change feed ended");
                        break;
                    };
                    let extra = subscription.drain() as u64;
                    stats.notifications += 1 + extra;
                    stats.coalesced += extra;
                    debug!(target: "sb::live", sequence = notice.sequence, coalesced = extra, "change notice");

                    let gate = self.run_gate.lock().await;
                    let computed = self.compute().await;
                    if *shutdown.borrow() {
                        stats.discarded += 1;
                        drop(gate);
                        break;
                    }
                    match computed {
                        Ok(groups) => {
                            self.publish(groups);
                            stats.runs += 1;
                        }
                        Err(err) => {
                            stats.failures += 1;
                            warn!(
                                target: "sb::live",
                                error = %err,
                                "reload failed, keeping previous catalog"
                            );
                        }
                    }
                    drop(gate);
                }
            }
        }

        subscription.close();
        info!(
            target: "sb::live",
            runs = stats.runs,
            notifications = stats.notifications,
            coalesced = stats.coalesced,
            failures = stats.failures,
            "live reconciliation stopped"
        );
        stats
    }
}

/// Handle to a running controller. Closing (or dropping) it stops the
/// loop; a reload that finishes afterwards is never published.
pub struct ReconcileHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<ReconcileStats>>,
}

impl ReconcileHandle {
    pub async fn close(mut self) -> ReconcileStats {
        self.shutdown.send_replace(true);
        match self.task.take() {
            Some(task) => task.await.unwrap_or_else(|err| {
                warn!(target: "sb::live", error = %err, "reconcile task did not finish cleanly");
                ReconcileStats::default()
            }),
            None => ReconcileStats::default(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ReconcileHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}
