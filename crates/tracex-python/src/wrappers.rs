//! The Python side of the exception classes.
//!
//! Python exception classes must derive from `BaseException`, and the classes
//! mirroring built-in kinds also derive from builtins such as `OSError` whose
//! instance layout a `#[pyclass]` cannot share. The classes are therefore plain
//! Python classes, defined in the module below. Each instance carries the native
//! exception as a `NativeException` in its `native` attribute.

use pyo3::{prelude::*, sync::PyOnceLock};

use crate::native::PyNativeException;

const SOURCE: &std::ffi::CStr = cr#"
import builtins

registry = {}


def register(cls):
    registry[cls.native_kind] = cls
    return cls


@register
class Exception(builtins.Exception):
    """Base class of the Python classes mirroring native exceptions."""

    native_kind = "Exception"

    def __init__(self, arg="", *args):
        if isinstance(arg, NativeException):
            native = arg
        else:
            native = NativeException.create(type(self).native_kind, str(arg))
        super().__init__(native.what(), *args)
        self.native = native

    def __getattr__(self, name):
        if name == "native":
            raise AttributeError(name)
        return getattr(self.native, name)

    def __repr__(self):
        return f"{type(self).__name__}('{self.native.what()}')"

    def __str__(self):
        return self.native.what()


Exception.__module__ = "tracex"


def declare(module, name, base, native_kind, extra_bases=()):
    cls = registry.get(native_kind)
    if cls is None:
        namespace = {
            "native_kind": native_kind,
            "__module__": getattr(module, "__name__", "tracex"),
        }
        cls = register(type(name, (base, *extra_bases), namespace))
    setattr(module, name, cls)
    return cls
"#;

/// The wrapper module, created on first use.
pub(crate) fn wrappers_module(py: Python<'_>) -> PyResult<&Py<PyModule>> {
    static WRAPPERS: PyOnceLock<Py<PyModule>> = PyOnceLock::new();

    WRAPPERS.get_or_try_init(py, || {
        let module = PyModule::from_code(py, SOURCE, c"tracex/wrappers.py", c"tracex.wrappers")?;
        module.setattr("NativeException", py.get_type::<PyNativeException>())?;
        Ok(module.unbind())
    })
}

/// The class registry, keyed by canonical native name.
pub(crate) fn class_registry(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    wrappers_module(py)?.bind(py).getattr("registry")
}

/// The root `tracex.Exception` class.
pub(crate) fn root_class(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    wrappers_module(py)?.bind(py).getattr("Exception")
}
