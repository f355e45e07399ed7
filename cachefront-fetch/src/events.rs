//! Cache event logging.
//!
//! Every hit emits a [`EventKind::Read`] event and every store population a
//! [`EventKind::Write`] event. Loggers return nothing, so whatever they do
//! cannot change the outcome of a lookup.

use std::fmt;

use colored::Colorize;
use parking_lot::Mutex;
use tracing::info;

/// Kind of cache event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A lookup was answered from the store
    Read,
    /// A fetched value was written to the store
    Write,
}

impl EventKind {
    /// Upper-case label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Read => "READ",
            EventKind::Write => "WRITE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sink for cache events.
pub trait EventLogger: Send + Sync {
    /// Records one event. Best-effort; must not panic.
    fn log(&self, kind: EventKind, message: &str);
}

/// Emits events through `tracing` at `INFO`.
///
/// Lines read `Cached Resource READ  widget/42 for [42]`. With colors on, the
/// label is bold grey for reads and bold yellow for writes.
#[derive(Clone, Debug, Default)]
pub struct TracingEventLogger {
    colorize: bool,
}

impl TracingEventLogger {
    /// Plain labels.
    pub fn new() -> Self {
        Self { colorize: false }
    }

    /// ANSI-colored labels, for terminal output.
    pub fn colored() -> Self {
        Self { colorize: true }
    }

    fn label(&self, kind: EventKind) -> String {
        let label = format!("Cached Resource {}", kind.label());
        if !self.colorize {
            return label;
        }
        match kind {
            EventKind::Read => label.bright_black().bold().to_string(),
            EventKind::Write => label.yellow().bold().to_string(),
        }
    }
}

impl EventLogger for TracingEventLogger {
    fn log(&self, kind: EventKind, message: &str) {
        info!(target: "cachefront::events", event = %kind, "{}  {}", self.label(kind), message);
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventLogger;

impl EventLogger for NoopEventLogger {
    fn log(&self, _kind: EventKind, _message: &str) {}
}

/// Keeps events in memory. Handy for assertions and for the CLI summary.
#[derive(Debug, Default)]
pub struct RecordingEventLogger {
    events: Mutex<Vec<(EventKind, String)>>,
}

impl RecordingEventLogger {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, oldest first.
    pub fn events(&self) -> Vec<(EventKind, String)> {
        self.events.lock().clone()
    }

    /// Number of events of the given kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Forgets all events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventLogger for RecordingEventLogger {
    fn log(&self, kind: EventKind, message: &str) {
        self.events.lock().push((kind, message.to_string()));
    }
}
