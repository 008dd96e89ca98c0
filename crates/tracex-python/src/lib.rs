//! Python bindings for tracex exceptions.
//!
//! Native exceptions escaping into Python are raised as instances of Python
//! classes mirroring the native hierarchy, and come back out as the same
//! concrete native class. Downstream extension modules declare their own
//! classes with [`declare`] or [`declare_exception`] and convert errors with
//! [`NativeError`].

mod native;
mod translate;
mod wrappers;

use std::{env, sync::Arc};

pub use native::{PyNativeException, PyTracepoint};
use pyo3::prelude::*;
pub use translate::{NativeError, declare, declare_exception, exc_native_to_py, exc_py_to_native, extract_native};
use tracex::tracer::{StderrTracer, set_tracer};

/// Environment variable selecting a tracer when the module is initialised.
pub const TRACE_ENV: &str = "TRACEX_TRACE";

/// Adds the exception machinery to `module`: the native handle classes, the
/// root `Exception` class and the classes for every built-in kind.
///
/// Safe to call for several modules; classes are created once per process and
/// shared.
pub fn register_module(module: &Bound<'_, PyModule>) -> PyResult<()> {
    if env::var(TRACE_ENV).is_ok_and(|value| value.eq_ignore_ascii_case("stderr")) {
        set_tracer(Arc::new(StderrTracer::new()));
    }
    module.add_class::<PyNativeException>()?;
    module.add_class::<PyTracepoint>()?;
    module.add("Exception", wrappers::root_class(module.py())?)?;
    translate::declare_builtins(module)
}

/// tracex - exceptions with tracebacks across the native/Python boundary.
#[pymodule]
mod _tracex {
    use pyo3::prelude::*;

    use super::register_module;

    #[pymodule_init]
    fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add("__version__", env!("CARGO_PKG_VERSION"))?;
        register_module(m)
    }
}
