//! Translation of exceptions between native code and Python.
//!
//! Native exceptions reach Python as instances of the Python class declared for
//! their kind (or for the nearest declared ancestor), with the native exception
//! attached. Python exceptions of those classes can be turned back into the
//! native exception they carry.

use std::{ffi::CStr, fmt};

use pyo3::{
    exceptions::{
        PyArithmeticError, PyLookupError, PyOSError, PyOverflowError, PyRuntimeError, PyTypeError, PyWarning,
    },
    intern,
    prelude::*,
    types::{PyTuple, PyType},
};
use tracex::{
    AnyException, ExcClass, ExcType, IoError, NotFoundError, OverflowError, RuntimeError, TypeError, UnderflowError,
    tracer::tracer,
};

use crate::{
    native::PyNativeException,
    wrappers::{class_registry, root_class, wrappers_module},
};

/// Why a native exception could not be raised as its declared Python class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranslateFailure {
    /// The wrapper module could not be created or has no registry.
    Wrappers,
    /// Neither the class nor any ancestor has been declared.
    NoClass,
    /// The declared class could not be instantiated.
    Construction,
}

impl TranslateFailure {
    fn warning(self) -> &'static CStr {
        match self {
            Self::Wrappers => c"Could not load the tracex exception classes for native exception",
            Self::NoClass => c"Could not find appropriate Python type for native exception",
            Self::Construction => c"Could not construct the Python type for native exception",
        }
    }
}

impl fmt::Display for TranslateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Wrappers => "wrapper module unavailable",
            Self::NoClass => "no class declared",
            Self::Construction => "class construction failed",
        };
        f.write_str(reason)
    }
}

/// Converts a native exception into the Python exception to raise.
///
/// A copy of `exc` is raised as the declared Python class. If that is not
/// possible a `Warning` is issued and a builtin `RuntimeError` carrying
/// `exc.what()` is returned instead; this never fails.
pub fn exc_native_to_py(py: Python<'_>, exc: &AnyException) -> PyErr {
    let name = exc.exc_type().name();
    match raise_declared(py, exc) {
        Ok((err, target)) => {
            tracer().on_translate(name, target);
            err
        }
        Err(failure) => {
            // warnings configured as errors must not replace the fallback
            let _ = PyErr::warn(py, py.get_type::<PyWarning>().as_any(), failure.warning(), 1);
            tracer().on_fallback(name, &failure.to_string());
            PyRuntimeError::new_err(exc.what())
        }
    }
}

fn raise_declared(py: Python<'_>, exc: &AnyException) -> Result<(PyErr, &'static str), TranslateFailure> {
    let registry = class_registry(py).map_err(|_| TranslateFailure::Wrappers)?;
    for exc_type in exc.exc_type().lineage() {
        let class = registry
            .call_method1(intern!(py, "get"), (exc_type.name(),))
            .map_err(|_| TranslateFailure::Wrappers)?;
        if class.is_none() {
            continue;
        }
        let native = Bound::new(py, PyNativeException::new(exc.clone())).map_err(|_| TranslateFailure::Construction)?;
        let instance = class.call1((native,)).map_err(|_| TranslateFailure::Construction)?;
        return Ok((PyErr::from_value(instance), exc_type.name()));
    }
    Err(TranslateFailure::NoClass)
}

/// The native exception carried by `obj`, if any.
///
/// Accepts a `NativeException` or an instance of a `tracex.Exception` class.
/// The result is a copy, so it keeps the concrete native class.
pub fn extract_native(obj: &Bound<'_, PyAny>) -> Option<AnyException> {
    let native = match obj.extract::<PyRef<'_, PyNativeException>>() {
        Ok(native) => native.inner().clone(),
        Err(_) => obj
            .getattr(intern!(obj.py(), "native"))
            .ok()?
            .extract::<PyRef<'_, PyNativeException>>()
            .ok()?
            .inner()
            .clone(),
    };
    tracer().on_extract(native.exc_type().name());
    Some(native)
}

/// The native exception behind a Python error, if it came from one.
pub fn exc_py_to_native(py: Python<'_>, py_err: &PyErr) -> Option<AnyException> {
    extract_native(py_err.value(py).as_any())
}

/// A native exception on its way into Python.
///
/// Lets `#[pyfunction]`s return native errors with `?` on `ExcResult`s:
///
/// ```ignore
/// #[pyfunction]
/// fn load(size: usize) -> Result<usize, NativeError> {
///     Ok(checked_load(size)?)
/// }
/// ```
///
/// A concrete class converts through [`AnyException`] first:
/// `AnyException::from(raise!(LengthError, "..")).into()`.
#[derive(Debug, Clone)]
pub struct NativeError(pub AnyException);

impl From<AnyException> for NativeError {
    fn from(exc: AnyException) -> Self {
        Self(exc)
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for NativeError {}

impl From<NativeError> for PyErr {
    fn from(err: NativeError) -> Self {
        Python::attach(|py| exc_native_to_py(py, &err.0))
    }
}

/// Declares a Python class for the native class `exc_type`, deriving from `base`.
///
/// The class is set as `name` on `module`. Declaring an already declared kind
/// sets the existing class on `module` and returns it.
pub fn declare_exception<'py>(
    module: &Bound<'py, PyModule>,
    name: &str,
    base: &Bound<'py, PyAny>,
    exc_type: &'static ExcType,
) -> PyResult<Bound<'py, PyAny>> {
    declare_class(module, name, base, exc_type, Vec::new())
}

/// Declares the Python class for `K` under the class of its nearest declared ancestor.
pub fn declare<'py, K: ExcClass>(module: &Bound<'py, PyModule>, name: &str) -> PyResult<Bound<'py, PyAny>> {
    let py = module.py();
    let exc_type = K::class();
    let base = declared_base(py, exc_type)?;
    declare_class(module, name, &base, exc_type, builtin_bases(py, exc_type))
}

/// Declares every built-in class on `module`, bases first.
pub(crate) fn declare_builtins(module: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = module.py();
    for class in tracex::BUILTIN_CLASSES {
        let exc_type = class();
        if exc_type.base().is_none() {
            continue;
        }
        let base = declared_base(py, exc_type)?;
        declare_class(module, exc_type.short_name(), &base, exc_type, builtin_bases(py, exc_type))?;
    }
    Ok(())
}

fn declare_class<'py>(
    module: &Bound<'py, PyModule>,
    name: &str,
    base: &Bound<'py, PyAny>,
    exc_type: &'static ExcType,
    extra_bases: Vec<Bound<'py, PyType>>,
) -> PyResult<Bound<'py, PyAny>> {
    let py = module.py();
    if let Some(existing) = declared_class(py, exc_type)? {
        module.setattr(name, &existing)?;
        return Ok(existing);
    }
    let extra_bases = PyTuple::new(py, extra_bases)?;
    let class = wrappers_module(py)?
        .bind(py)
        .getattr(intern!(py, "declare"))?
        .call1((module, name, base, exc_type.name(), extra_bases))?;
    let base_kind: String = base.getattr(intern!(py, "native_kind"))?.extract()?;
    tracer().on_declare(exc_type.name(), &base_kind);
    Ok(class)
}

/// The Python class declared for exactly `exc_type`.
fn declared_class<'py>(py: Python<'py>, exc_type: &ExcType) -> PyResult<Option<Bound<'py, PyAny>>> {
    let class = class_registry(py)?.call_method1(intern!(py, "get"), (exc_type.name(),))?;
    Ok((!class.is_none()).then_some(class))
}

/// The Python class of the nearest declared strict ancestor of `exc_type`.
fn declared_base<'py>(py: Python<'py>, exc_type: &'static ExcType) -> PyResult<Bound<'py, PyAny>> {
    for ancestor in exc_type.lineage().skip(1) {
        if let Some(class) = declared_class(py, ancestor)? {
            return Ok(class);
        }
    }
    root_class(py)
}

/// Python builtins that the class for a built-in kind also derives from.
fn builtin_bases<'py>(py: Python<'py>, exc_type: &ExcType) -> Vec<Bound<'py, PyType>> {
    let builtin = if exc_type == RuntimeError::class() {
        py.get_type::<PyRuntimeError>()
    } else if exc_type == OverflowError::class() {
        py.get_type::<PyOverflowError>()
    } else if exc_type == UnderflowError::class() {
        py.get_type::<PyArithmeticError>()
    } else if exc_type == NotFoundError::class() {
        py.get_type::<PyLookupError>()
    } else if exc_type == IoError::class() {
        py.get_type::<PyOSError>()
    } else if exc_type == TypeError::class() {
        py.get_type::<PyTypeError>()
    } else {
        return Vec::new();
    };
    vec![builtin]
}
