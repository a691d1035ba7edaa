//! Offline source over a feed file.
//!
//! Subscriptions poll the file's modification time.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::debug;

use super::{ChangeNotifier, SkillSource, Subscription, WatcherSlot, spawn_change_watcher};
use crate::core::RawRow;
use crate::error::{Result, SbError};
use crate::feed::parse_feed;

pub struct CsvSource {
    path: PathBuf,
    poll_interval: Duration,
    notifier: ChangeNotifier,
    watcher: WatcherSlot,
}

impl CsvSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            path: path.into(),
            poll_interval,
            notifier: ChangeNotifier::new(),
            watcher: WatcherSlot::default(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

async fn modified_at(path: &Path) -> Result<Option<SystemTime>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.modified().ok()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

impl SkillSource for CsvSource {
    fn describe(&self) -> String {
        format!("feed:{}", self.path.display())
    }

    async fn fetch_all(&self) -> Result<Vec<RawRow>> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            SbError::NotFound(format!("read feed {}: {err}", self.path.display()))
        })?;
        parse_feed(&text)
    }

    async fn subscribe(&self) -> Result<Subscription> {
        let subscription = self.notifier.subscribe();
        if !self.watcher.is_running() {
            let baseline = modified_at(&self.path)
                .await
                .map_err(|err| SbError::Subscription(format!("stat feed: {err}")))?;
            let path = self.path.clone();
            let handle = spawn_change_watcher(
                self.describe(),
                self.notifier.clone(),
                self.poll_interval,
                baseline,
                move || {
                    let path = path.clone();
                    async move { modified_at(&path).await }
                },
            );
            self.watcher.install(handle);
            debug!(target: "sb::source", path = %self.path.display(), "feed watcher started");
        }
        Ok(subscription)
    }
}
