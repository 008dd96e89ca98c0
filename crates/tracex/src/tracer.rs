//! Tracing hooks for exception registration and boundary translation.
//!
//! The [`ExceptionTracer`] trait defines hook points at the events worth
//! observing when exceptions cross into an embedding runtime. Every hook has a
//! no-op default, so implementations override only what they need.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Does nothing (the default) |
//! | [`StderrTracer`] | Human-readable event log on stderr |
//! | [`RecordingTracer`] | Keeps every event for inspection in tests |
//!
//! One tracer is installed per process with [`set_tracer`]:
//!
//! ```
//! use std::sync::Arc;
//! use tracex::tracer::{self, RecordingTracer};
//!
//! let recording = Arc::new(RecordingTracer::new());
//! tracer::set_tracer(recording.clone());
//! // ... translate some exceptions ...
//! tracer::reset_tracer();
//! ```

use std::{
    fmt,
    sync::{
        Arc, LazyLock, Mutex, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Event observed by a tracer.
///
/// Collected by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A class was made available to the embedding runtime.
    Declare {
        /// Canonical name of the class.
        name: String,
        /// Canonical name of the base it was declared under.
        base: String,
    },
    /// An exception was translated into the class registered for `target`.
    Translate { name: String, target: String },
    /// Translation failed and the generic runtime error was raised instead.
    Fallback { name: String, reason: String },
    /// An exception raised in the embedding runtime was recovered as native.
    Extract { name: String },
    /// A second class registered an already-taken canonical name and was ignored.
    DuplicateType { name: String },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declare { name, base } => write!(f, "declare {name} (base {base})"),
            Self::Translate { name, target } => write!(f, "translate {name} -> {target}"),
            Self::Fallback { name, reason } => write!(f, "fallback {name}: {reason}"),
            Self::Extract { name } => write!(f, "extract {name}"),
            Self::DuplicateType { name } => write!(f, "duplicate type {name} ignored"),
        }
    }
}

/// Hooks called at exception registration and translation events.
///
/// Hooks take `&self` because the tracer is shared process-wide; stateful
/// tracers use interior mutability.
pub trait ExceptionTracer: fmt::Debug + Send + Sync {
    /// Called when a class is declared to the embedding runtime.
    fn on_declare(&self, _name: &str, _base: &str) {}

    /// Called when an exception is translated.
    ///
    /// `target` is the canonical name of the class used, which is an ancestor of
    /// `name` when `name` itself was never declared.
    fn on_translate(&self, _name: &str, _target: &str) {}

    /// Called when translation fails and falls back to a generic runtime error.
    fn on_fallback(&self, _name: &str, _reason: &str) {}

    /// Called when an exception is recovered from the embedding runtime.
    fn on_extract(&self, _name: &str) {}

    /// Called when a canonical name is registered twice.
    fn on_duplicate_type(&self, _name: &str) {}
}

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ExceptionTracer for NoopTracer {}

/// Tracer that prints one line per event to stderr.
///
/// Output format:
/// ```text
/// [tracex] declare InvalidParameterError (base LogicError)
/// [tracex] translate mount::MountError -> RuntimeError
/// ```
#[derive(Debug)]
pub struct StderrTracer {
    /// Maximum number of lines to print (0 = unlimited).
    limit: usize,
    printed: AtomicUsize,
}

impl StderrTracer {
    /// Creates a tracer that prints every event.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(0)
    }

    /// Creates a tracer that stops printing after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            printed: AtomicUsize::new(0),
        }
    }

    fn emit(&self, event: &TraceEvent) {
        let printed = self.printed.fetch_add(1, Ordering::Relaxed);
        if self.limit == 0 || printed < self.limit {
            eprintln!("[tracex] {event}");
        }
    }
}

impl Default for StderrTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExceptionTracer for StderrTracer {
    fn on_declare(&self, name: &str, base: &str) {
        self.emit(&TraceEvent::Declare {
            name: name.to_owned(),
            base: base.to_owned(),
        });
    }

    fn on_translate(&self, name: &str, target: &str) {
        self.emit(&TraceEvent::Translate {
            name: name.to_owned(),
            target: target.to_owned(),
        });
    }

    fn on_fallback(&self, name: &str, reason: &str) {
        self.emit(&TraceEvent::Fallback {
            name: name.to_owned(),
            reason: reason.to_owned(),
        });
    }

    fn on_extract(&self, name: &str) {
        self.emit(&TraceEvent::Extract { name: name.to_owned() });
    }

    fn on_duplicate_type(&self, name: &str) {
        self.emit(&TraceEvent::DuplicateType { name: name.to_owned() });
    }
}

/// Tracer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn record(&self, event: TraceEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

impl ExceptionTracer for RecordingTracer {
    fn on_declare(&self, name: &str, base: &str) {
        self.record(TraceEvent::Declare {
            name: name.to_owned(),
            base: base.to_owned(),
        });
    }

    fn on_translate(&self, name: &str, target: &str) {
        self.record(TraceEvent::Translate {
            name: name.to_owned(),
            target: target.to_owned(),
        });
    }

    fn on_fallback(&self, name: &str, reason: &str) {
        self.record(TraceEvent::Fallback {
            name: name.to_owned(),
            reason: reason.to_owned(),
        });
    }

    fn on_extract(&self, name: &str) {
        self.record(TraceEvent::Extract { name: name.to_owned() });
    }

    fn on_duplicate_type(&self, name: &str) {
        self.record(TraceEvent::DuplicateType { name: name.to_owned() });
    }
}

static TRACER: LazyLock<RwLock<Arc<dyn ExceptionTracer>>> =
    LazyLock::new(|| RwLock::new(Arc::new(NoopTracer) as Arc<dyn ExceptionTracer>));

/// Installs `tracer` for the whole process, replacing the previous one.
pub fn set_tracer(tracer: Arc<dyn ExceptionTracer>) {
    *TRACER.write().unwrap_or_else(PoisonError::into_inner) = tracer;
}

/// Restores the [`NoopTracer`].
pub fn reset_tracer() {
    set_tracer(Arc::new(NoopTracer));
}

/// The installed tracer.
#[must_use]
pub fn tracer() -> Arc<dyn ExceptionTracer> {
    TRACER.read().unwrap_or_else(PoisonError::into_inner).clone()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn recording_keeps_order() {
        let tracer = RecordingTracer::new();
        tracer.on_declare("LogicError", "Exception");
        tracer.on_translate("LengthError", "LengthError");
        tracer.on_extract("LengthError");
        assert_eq!(
            tracer.events(),
            vec![
                TraceEvent::Declare {
                    name: "LogicError".to_owned(),
                    base: "Exception".to_owned(),
                },
                TraceEvent::Translate {
                    name: "LengthError".to_owned(),
                    target: "LengthError".to_owned(),
                },
                TraceEvent::Extract {
                    name: "LengthError".to_owned(),
                },
            ]
        );
        tracer.clear();
        assert!(tracer.events().is_empty());
    }

    #[test]
    fn event_lines() {
        let event = TraceEvent::Fallback {
            name: "x::Y".to_owned(),
            reason: "no class registered".to_owned(),
        };
        assert_eq!(event.to_string(), "fallback x::Y: no class registered");
    }
}
