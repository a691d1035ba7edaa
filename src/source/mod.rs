//! Data sources and their change subscriptions.
//!
//! A source answers two questions: "what are all the rows right now" and
//! "tell me when anything changed". Change notices carry no payload; every
//! notice means the full set must be fetched again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::core::RawRow;
use crate::error::Result;

pub mod offline;
pub mod sqlite;

pub use offline::CsvSource;
pub use sqlite::SqliteSource;

/// Queue depth per subscriber. Overflow is dropped: one queued notice
/// already forces a full refetch.
const NOTICE_QUEUE: usize = 64;

/// Something the catalog can be loaded from and watched through.
pub trait SkillSource: Send + Sync + 'static {
    /// Human readable origin, for logs.
    fn describe(&self) -> String;

    /// All rows, in the source's canonical order.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<RawRow>>> + Send;

    /// Open a change subscription.
    fn subscribe(&self) -> impl Future<Output = Result<Subscription>> + Send;
}

/// "The record set changed" token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    pub sequence: u64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Default)]
struct NotifierState {
    next_id: u64,
    sequence: u64,
    subscribers: Vec<(u64, mpsc::Sender<ChangeNotice>)>,
}

/// Fan-out of change notices to every open [`Subscription`].
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    state: Arc<Mutex<NotifierState>>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(NOTICE_QUEUE);
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, tx));
        debug!(target: "sb::source", subscription = id, "subscription opened");
        Subscription {
            id,
            rx,
            notifier: Some(self.clone()),
            closed: false,
        }
    }

    /// Send a notice to every live subscriber. Returns how many were reached.
    pub fn notify(&self) -> usize {
        let mut state = self.state.lock();
        state.sequence += 1;
        let notice = ChangeNotice {
            sequence: state.sequence,
            observed_at: Utc::now(),
        };
        let mut delivered = 0;
        state.subscribers.retain(|(_, tx)| match tx.try_send(notice) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Closed(_)) => false,
        });
        delivered
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(|(_, tx)| !tx.is_closed());
        state.subscribers.len()
    }

    fn unregister(&self, id: u64) {
        self.state.lock().subscribers.retain(|(sid, _)| *sid != id);
    }
}

/// Receiving end of a change feed. Must be closed (or dropped) on teardown.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<ChangeNotice>,
    notifier: Option<ChangeNotifier>,
    closed: bool,
}

impl Subscription {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next notice. `None` once closed or the source is gone.
    pub async fn recv(&mut self) -> Option<ChangeNotice> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    /// Discard every queued notice, returning how many there were.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rx.close();
        if let Some(notifier) = self.notifier.take() {
            notifier.unregister(self.id);
        }
        debug!(target: "sb::source", subscription = self.id, "subscription closed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Background task comparing a cheap fingerprint of the source on an
/// interval, notifying when it moves. Exits once nobody is subscribed.
pub(crate) fn spawn_change_watcher<F, Fut, T>(
    label: String,
    notifier: ChangeNotifier,
    interval: Duration,
    baseline: T,
    mut check: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send,
    T: PartialEq + std::fmt::Debug + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        let mut last = baseline;

        loop {
            ticker.tick().await;
            if notifier.subscriber_count() == 0 {
                debug!(target: "sb::source", source = %label, "no subscribers left, watcher stopping");
                break;
            }
            match check().await {
                Ok(current) if current != last => {
                    debug!(target: "sb::source", source = %label, from = ?last, to = ?current, "change observed");
                    last = current;
                    notifier.notify();
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(target: "sb::source", source = %label, error = %err, "change check failed");
                }
            }
        }
    })
}

/// Shared slot for a source's watcher task.
#[derive(Default)]
pub(crate) struct WatcherSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WatcherSlot {
    pub(crate) fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn install(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.handle.lock().replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for WatcherSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

/// Either concrete source, chosen by configuration.
pub enum AnySource {
    Live(SqliteSource),
    Offline(CsvSource),
}

impl SkillSource for AnySource {
    fn describe(&self) -> String {
        match self {
            Self::Live(source) => source.describe(),
            Self::Offline(source) => source.describe(),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<RawRow>> {
        match self {
            Self::Live(source) => source.fetch_all().await,
            Self::Offline(source) => source.fetch_all().await,
        }
    }

    async fn subscribe(&self) -> Result<Subscription> {
        match self {
            Self::Live(source) => source.subscribe().await,
            Self::Offline(source) => source.subscribe().await,
        }
    }
}
