//! Live source over the SQLite skill table.
//!
//! Changes committed by any other connection (another `sb import`, an
//! external writer) are detected through `PRAGMA data_version`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, info};

use super::{ChangeNotifier, SkillSource, Subscription, WatcherSlot, spawn_change_watcher};
use crate::core::{RawRow, Skill};
use crate::error::{Result, SbError};
use crate::storage::{Database, data_version};

pub struct SqliteSource {
    db: Arc<Mutex<Database>>,
    path: PathBuf,
    poll_interval: Duration,
    notifier: ChangeNotifier,
    watcher: WatcherSlot,
}

impl SqliteSource {
    pub fn open(path: impl AsRef<Path>, poll_interval: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::open(&path)?;
        info!(target: "sb::source", path = %path.display(), "opened live source");
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path,
            poll_interval,
            notifier: ChangeNotifier::new(),
            watcher: WatcherSlot::default(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Notifier shared by this source's subscriptions. Writers in the same
    /// process may poke it to skip the polling delay.
    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Insert or update one skill and notify subscribers.
    pub async fn upsert(&self, skill: Skill) -> Result<()> {
        self.write(move |db| db.upsert_skill(&skill)).await
    }

    /// Delete one skill. Subscribers are notified only when a row went away.
    pub async fn delete(&self, archetype: &str, name: &str) -> Result<bool> {
        let (archetype, name) = (archetype.to_string(), name.to_string());
        let db = Arc::clone(&self.db);
        let removed = tokio::task::spawn_blocking(move || db.lock().delete_skill(&archetype, &name))
            .await
            .map_err(|err| SbError::Io(std::io::Error::other(err)))??;
        if removed {
            self.notifier.notify();
        }
        Ok(removed)
    }

    /// Replace the whole table and notify subscribers once.
    pub async fn replace_all(&self, skills: Vec<Skill>) -> Result<usize> {
        let db = Arc::clone(&self.db);
        let written = tokio::task::spawn_blocking(move || db.lock().replace_all(&skills))
            .await
            .map_err(|err| SbError::Io(std::io::Error::other(err)))??;
        self.notifier.notify();
        Ok(written)
    }

    async fn write<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Database) -> Result<()> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&mut db.lock()))
            .await
            .map_err(|err| SbError::Io(std::io::Error::other(err)))??;
        self.notifier.notify();
        Ok(())
    }

    fn ensure_watcher(&self) -> Result<()> {
        if self.watcher.is_running() {
            return Ok(());
        }

        let poll_conn = Connection::open(&self.path)
            .map_err(|err| SbError::Subscription(format!("open change poller: {err}")))?;
        let baseline = data_version(&poll_conn)
            .map_err(|err| SbError::Subscription(format!("read data_version: {err}")))?;
        let poll_conn = Arc::new(Mutex::new(poll_conn));

        let handle = spawn_change_watcher(
            self.describe(),
            self.notifier.clone(),
            self.poll_interval,
            baseline,
            move || {
                let conn = Arc::clone(&poll_conn);
                async move {
                    tokio::task::spawn_blocking(move || data_version(&conn.lock()))
                        .await
                        .map_err(|err| SbError::Io(std::io::Error::other(err)))?
                }
            },
        );
        self.watcher.install(handle);
        debug!(target: "sb::source", path = %self.path.display(), "data_version watcher started");
        Ok(())
    }
}

impl SkillSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    async fn fetch_all(&self) -> Result<Vec<RawRow>> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || db.lock().fetch_rows())
            .await
            .map_err(|err| SbError::Io(std::io::Error::other(err)))?
    }

    async fn subscribe(&self) -> Result<Subscription> {
        let subscription = self.notifier.subscribe();
        self.ensure_watcher()?;
        Ok(subscription)
    }
}
