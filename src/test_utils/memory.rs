//! In-memory source for exercising the live controller.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::RawRow;
use crate::error::{Result, SbError};
use crate::source::{ChangeNotifier, SkillSource, Subscription};

/// Rows held in memory. Every [`MemorySource::set_rows`] fires a change
/// notice, like a write to the real store would.
pub struct MemorySource {
    rows: Mutex<Vec<RawRow>>,
    notifier: ChangeNotifier,
    fetch_delay: Mutex<Option<Duration>>,
    fail_subscribe: AtomicBool,
    fetches: AtomicUsize,
}

impl MemorySource {
    #[must_use]
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            notifier: ChangeNotifier::new(),
            fetch_delay: Mutex::new(None),
            fail_subscribe: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_rows(&self, rows: Vec<RawRow>) {
        *self.rows.lock() = rows;
        self.notifier.notify();
    }

    /// Make every later fetch take at least `delay`.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock() = Some(delay);
    }

    pub fn fail_subscriptions(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}

impl SkillSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn fetch_all(&self) -> Result<Vec<RawRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.rows.lock().clone())
    }

    async fn subscribe(&self) -> Result<Subscription> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(SbError::Subscription("injected subscribe failure".to_string()));
        }
        Ok(self.notifier.subscribe())
    }
}
