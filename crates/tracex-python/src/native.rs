//! Python handles on native exceptions.

use std::str::FromStr;

use pyo3::{exceptions::PyValueError, prelude::*};
use tracex::{AnyException, DisplayFormat, Exception, SourceLoc, Tracepoint, registry};

/// A native exception held by Python.
///
/// Every instance of a `tracex.Exception` class keeps one of these in its
/// `native` attribute; attribute lookups the Python class does not answer
/// itself are forwarded here.
#[pyclass(name = "NativeException", module = "tracex")]
#[derive(Debug, Clone)]
pub struct PyNativeException {
    inner: AnyException,
}

impl PyNativeException {
    #[must_use]
    pub fn new(inner: AnyException) -> Self {
        Self { inner }
    }

    /// The wrapped exception.
    #[must_use]
    pub fn inner(&self) -> &AnyException {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> AnyException {
        self.inner
    }
}

#[pymethods]
impl PyNativeException {
    /// Creates a native exception of the class registered as `kind`, without a location.
    #[staticmethod]
    fn create(kind: &str, message: &str) -> PyResult<Self> {
        registry::construct(kind, Exception::with_message(message))
            .map(Self::new)
            .map_err(|err| PyValueError::new_err(err.to_string()))
    }

    /// Canonical name of the native class.
    #[getter]
    fn kind(&self) -> &'static str {
        self.inner.exc_type().name()
    }

    fn what(&self) -> String {
        self.inner.what()
    }

    fn get_type(&self) -> String {
        self.inner.get_type()
    }

    fn traceback(&self) -> Vec<PyTracepoint> {
        self.inner.traceback().iter().map(PyTracepoint::from).collect()
    }

    /// Records a rethrow at the given location.
    #[pyo3(signature = (file, line, function, message = ""))]
    fn add_message(&mut self, file: String, line: u32, function: String, message: &str) {
        self.inner.add_message(SourceLoc::new(file, line, function), message);
    }

    /// The full rendering, traceback included.
    fn as_string(&self) -> PyResult<String> {
        self.display("traceback")
    }

    /// Returns formatted exception string.
    ///
    /// Args:
    ///     format: 'traceback' - the full rendering
    ///             'type-msg' - 'ExceptionType: message' format
    ///             'msg' - just the message
    #[pyo3(signature = (format = "traceback"))]
    fn display(&self, format: &str) -> PyResult<String> {
        let format = DisplayFormat::from_str(format).map_err(|_| {
            PyValueError::new_err(format!(
                "Invalid display format: '{format}'. Expected 'traceback', 'type-msg', or 'msg'"
            ))
        })?;
        // a failing render degrades to the display name, as `what()` does
        Ok(self.inner.display(format).unwrap_or_else(|_| self.inner.display_name()))
    }

    #[pyo3(name = "clone")]
    fn py_clone(&self) -> Self {
        self.clone()
    }

    fn __str__(&self) -> String {
        self.inner.what()
    }

    fn __repr__(&self) -> String {
        format!("NativeException({}: {})", self.inner.display_name(), self.inner.what())
    }
}

/// One entry of a native traceback.
#[pyclass(name = "Tracepoint", module = "tracex", frozen)]
#[derive(Debug, Clone)]
pub struct PyTracepoint {
    #[pyo3(get)]
    pub file: String,
    #[pyo3(get)]
    pub line: u32,
    #[pyo3(get)]
    pub function: String,
    #[pyo3(get)]
    pub message: String,
}

#[pymethods]
impl PyTracepoint {
    fn __repr__(&self) -> String {
        format!(
            "Tracepoint(file='{}', line={}, function='{}', message='{}')",
            self.file, self.line, self.function, self.message
        )
    }
}

impl From<&Tracepoint> for PyTracepoint {
    fn from(tracepoint: &Tracepoint) -> Self {
        Self {
            file: tracepoint.file().to_owned(),
            line: tracepoint.line(),
            function: tracepoint.function().to_owned(),
            message: tracepoint.message().to_owned(),
        }
    }
}
