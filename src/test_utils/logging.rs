//! Structured log capture for asserting on emitted warnings.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Storage for captured log entries.
#[derive(Default)]
pub struct LogStorage {
    entries: VecDeque<LogEntry>,
    max_entries: usize,
}

impl LogStorage {
    #[must_use]
    pub const fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    #[must_use]
    pub const fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    #[must_use]
    pub fn contains_message(&self, message: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(message))
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|e| e.level == Level::WARN)
    }
}

/// A captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Captured logs from one [`capture_logs`] call.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    pub entries: Vec<LogEntry>,
}

impl CapturedLogs {
    #[must_use]
    pub fn warnings(&self) -> Vec<&LogEntry> {
        self.at_level(Level::WARN)
    }

    #[must_use]
    pub fn at_level(&self, level: Level) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.level == level).collect()
    }

    #[must_use]
    pub fn with_target(&self, target: &str) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.target == target).collect()
    }

    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(message))
    }
}

/// Layer that records every event it sees into shared storage.
pub struct TestLogLayer {
    storage: Arc<Mutex<LogStorage>>,
}

impl TestLogLayer {
    pub const fn new(storage: Arc<Mutex<LogStorage>>) -> Self {
        Self { storage }
    }
}

struct EntryVisitor<'a> {
    message: &'a mut String,
    fields: &'a mut Vec<(String, String)>,
}

impl tracing::field::Visit for EntryVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value_str = format!("{value:?}");
        if field.name() == "message" {
            *self.message = value_str;
        } else {
            self.fields.push((field.name().to_string(), value_str));
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for TestLogLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut EntryVisitor {
            message: &mut message,
            fields: &mut fields,
        });

        self.storage.lock().push(LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
            fields,
        });
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
///
/// Scoped to the calling thread, so parallel tests do not see each
/// other's events.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let storage = Arc::new(Mutex::new(LogStorage::new(1000)));
    let subscriber = tracing_subscriber::registry().with(TestLogLayer::new(Arc::clone(&storage)));
    let result = tracing::subscriber::with_default(subscriber, f);
    let entries = storage.lock().entries().iter().cloned().collect();
    (result, CapturedLogs { entries })
}

/// Like [`capture_logs`], behind an `EnvFilter` built from `directives`.
pub fn capture_logs_filtered<R>(directives: &str, f: impl FnOnce() -> R) -> (R, CapturedLogs) {
    let storage = Arc::new(Mutex::new(LogStorage::new(1000)));
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(TestLogLayer::new(Arc::clone(&storage)));
    let result = tracing::subscriber::with_default(subscriber, f);
    let entries = storage.lock().entries().iter().cloned().collect();
    (result, CapturedLogs { entries })
}
