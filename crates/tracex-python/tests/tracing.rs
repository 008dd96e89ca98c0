//! Tracer events emitted by the boundary.
//!
//! The tracer is process-wide, so this binary holds a single test.

use std::{fmt, sync::Arc};

use _tracex::{declare, exc_native_to_py, exc_py_to_native, register_module};
use pretty_assertions::assert_eq;
use pyo3::{exceptions::PyRuntimeError, prelude::*};
use tracex::{
    AnyException, ExcClass, ExcType, Exception, LengthError, RuntimeError, Throwable, declare_exception, raise,
    tracer::{self, RecordingTracer, TraceEvent},
};

declare_exception! {
    pub TracedError: RuntimeError, "test::TracedError"
}

declare_exception! {
    /// Never declared to Python.
    pub TruncatedError: LengthError, "test::TruncatedError"
}

#[derive(Debug, Clone)]
struct OrphanError(Exception);

static ORPHAN: ExcType = ExcType::root("test::OrphanError");

impl ExcClass for OrphanError {
    fn class() -> &'static ExcType {
        &ORPHAN
    }
}

impl Throwable for OrphanError {
    fn exc_type(&self) -> &'static ExcType {
        &ORPHAN
    }

    fn exception(&self) -> &Exception {
        &self.0
    }

    fn exception_mut(&mut self) -> &mut Exception {
        &mut self.0
    }

    fn clone_boxed(&self) -> Box<dyn Throwable> {
        Box::new(self.clone())
    }
}

impl fmt::Display for OrphanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.what())
    }
}

fn declared(name: &str, base: &str) -> TraceEvent {
    TraceEvent::Declare {
        name: name.to_owned(),
        base: base.to_owned(),
    }
}

#[test]
fn boundary_events_reach_the_tracer() {
    let recording = Arc::new(RecordingTracer::new());
    tracer::set_tracer(recording.clone());

    Python::attach(|py| {
        let module = PyModule::new(py, "tracex_traced").unwrap();
        register_module(&module).unwrap();
        declare::<TracedError>(&module, "TracedError").unwrap();

        let events = recording.events();
        assert!(events.contains(&declared("LogicError", "Exception")));
        assert!(events.contains(&declared("LengthError", "LogicError")));
        assert_eq!(events.last(), Some(&declared("test::TracedError", "RuntimeError")));
        recording.clear();

        // already declared, so nothing new happens
        declare::<TracedError>(&module, "TracedError").unwrap();
        assert!(recording.events().is_empty());

        let err = exc_native_to_py(py, &AnyException::from(raise!(LengthError, "too long")));
        let native = exc_py_to_native(py, &err).unwrap();
        assert!(native.is_exactly::<LengthError>());

        let truncated = exc_native_to_py(py, &AnyException::from(raise!(TruncatedError, "cut")));
        assert!(truncated.is_instance(py, &module.getattr("LengthError").unwrap()));

        let orphan = AnyException::from(OrphanError(Exception::with_message("lost")));
        let fallback = exc_native_to_py(py, &orphan);
        assert!(fallback.is_instance_of::<PyRuntimeError>(py));

        assert_eq!(
            recording.events(),
            vec![
                TraceEvent::Translate {
                    name: "LengthError".to_owned(),
                    target: "LengthError".to_owned(),
                },
                TraceEvent::Extract {
                    name: "LengthError".to_owned(),
                },
                TraceEvent::Translate {
                    name: "test::TruncatedError".to_owned(),
                    target: "LengthError".to_owned(),
                },
                TraceEvent::Fallback {
                    name: "test::OrphanError".to_owned(),
                    reason: "no class declared".to_owned(),
                },
            ]
        );
    });

    tracer::reset_tracer();
}
