use std::{
    any::Any,
    error::Error,
    fmt,
    ops::{Deref, DerefMut},
    panic::{self, AssertUnwindSafe},
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    exc_type::ExcType,
    tracepoint::{SourceLoc, Tracepoint},
};

/// Output formats accepted by [`Throwable::display`].
///
/// Parsed from `"traceback"`, `"type-msg"` and `"msg"` so the embedding layer can
/// pass the user's choice through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum DisplayFormat {
    /// The full rendering produced by [`Throwable::add_to_stream`].
    Traceback,
    /// `<type name>: <message>`.
    TypeMsg,
    /// Just the composed message.
    Msg,
}

/// The root exception class and the state every exception carries.
///
/// An exception owns its traceback, the ordered tracepoints recorded at the raise
/// site and at every rethrow, and a composed display message derived from the
/// tracepoint messages. [`Exception::add_message`] is the only way either changes,
/// and it always updates both.
///
/// Derived classes wrap their base (see [`declare_exception!`](crate::declare_exception))
/// so this struct is, ultimately, the state inside every exception.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exception {
    traceback: Vec<Tracepoint>,
    message: String,
}

impl Exception {
    /// Raises at `loc`: the traceback starts with a single tracepoint and the
    /// composed message is `message` verbatim.
    #[must_use]
    pub fn new(loc: SourceLoc, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            traceback: vec![Tracepoint::at(loc, message.clone())],
            message,
        }
    }

    /// Creates an exception without a location.
    ///
    /// The traceback stays empty, and later messages are only appended to the
    /// composed message. Used when the location is unknown or recorded elsewhere,
    /// e.g. when Python code instantiates an exception class directly.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            traceback: Vec::new(),
            message: message.into(),
        }
    }

    /// Identity conversion so generated classes can chain `from_exception` down to the root.
    #[must_use]
    pub fn from_exception(exception: Self) -> Self {
        exception
    }

    /// The composed message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn traceback(&self) -> &[Tracepoint] {
        &self.traceback
    }

    /// Records a rethrow at `loc`.
    ///
    /// The first rethrow retroactively numbers the original message `{0}`; every
    /// message added afterwards carries the index of its tracepoint. Without a
    /// traceback (message-only construction) the message is appended and no
    /// tracepoint is recorded.
    pub fn add_message(&mut self, loc: SourceLoc, message: &str) {
        let index = self.traceback.len();
        match index {
            0 => {
                self.message.push_str("; ");
                self.message.push_str(message);
                return;
            }
            1 => self.message.push_str(" {0}"),
            _ => {}
        }
        self.message.push_str(&format!("; {message} {{{index}}}"));
        self.traceback.push(Tracepoint::at(loc, message));
    }

    /// Writes the traceback, reporting the exception as `type_name`.
    pub fn write_traceback(&self, out: &mut dyn fmt::Write, type_name: &str) -> fmt::Result {
        if self.traceback.is_empty() {
            return out.write_str(&self.message);
        }
        out.write_char('\n')?;
        for (index, tracepoint) in self.traceback.iter().enumerate() {
            tracepoint.write_frame(out, index)?;
        }
        writeln!(out, "{type_name}: '{}'", self.message)
    }
}

/// Capabilities shared by every exception class.
///
/// This is the object-safe face of an exception: code holding an
/// [`AnyException`] sees the concrete class only through these methods, so
/// overriding one (usually [`render`](Throwable::render)) changes behaviour
/// everywhere the exception travels, including across the Python boundary.
///
/// Implementations must make [`clone_boxed`](Throwable::clone_boxed) return the
/// most-derived type; otherwise class identity is lost when the exception is
/// copied for translation.
pub trait Throwable: Any + fmt::Debug + Send + Sync {
    /// The class of this exception.
    fn exc_type(&self) -> &'static ExcType;

    /// The exception state.
    fn exception(&self) -> &Exception;

    fn exception_mut(&mut self) -> &mut Exception;

    /// Deep copy preserving the concrete type.
    fn clone_boxed(&self) -> Box<dyn Throwable>;

    /// Renders the exception as `type_name`.
    ///
    /// Derived classes forward to their base with the name they were given, which
    /// lets a class decorate the output while subclasses keep reporting their own
    /// name.
    fn render(&self, out: &mut dyn fmt::Write, type_name: &str) -> fmt::Result {
        self.exception().write_traceback(out, type_name)
    }

    /// Renders the exception under its own display name.
    fn add_to_stream(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let type_name = self.display_name();
        self.render(out, &type_name)
    }

    /// Records a rethrow at `loc`; see [`Exception::add_message`].
    fn add_message(&mut self, loc: SourceLoc, message: &str) {
        self.exception_mut().add_message(loc, message);
    }

    fn traceback(&self) -> &[Tracepoint] {
        self.exception().traceback()
    }

    /// The canonical class name followed by `" *"`.
    fn get_type(&self) -> String {
        self.exc_type().type_string()
    }

    /// [`get_type`](Throwable::get_type) without the pointer suffix.
    fn display_name(&self) -> String {
        let type_string = self.get_type();
        match type_string.strip_suffix(ExcType::POINTER_SUFFIX) {
            Some(name) => name.to_owned(),
            None => type_string,
        }
    }

    /// The composed message.
    ///
    /// Never fails. If rendering this exception fails or panics, the display name
    /// is returned instead of the message.
    ///
    /// A panic is caught but the installed panic hook still runs first, so the
    /// default hook prints it to stderr. Callers that need silence install their
    /// own hook with [`std::panic::set_hook`].
    fn what(&self) -> String {
        let mut scratch = String::new();
        let rendered = panic::catch_unwind(AssertUnwindSafe(|| self.add_to_stream(&mut scratch)));
        match rendered {
            Ok(Ok(())) => self.exception().message().to_owned(),
            Ok(Err(_)) | Err(_) => self.display_name(),
        }
    }

    /// Formats the exception in one of the [`DisplayFormat`]s.
    fn display(&self, format: DisplayFormat) -> Result<String, fmt::Error> {
        match format {
            DisplayFormat::Traceback => {
                let mut out = String::new();
                self.add_to_stream(&mut out)?;
                Ok(out)
            }
            DisplayFormat::TypeMsg => Ok(format!("{}: {}", self.display_name(), self.what())),
            DisplayFormat::Msg => Ok(self.what()),
        }
    }
}

/// Exception classes with a static type tag.
///
/// Implemented by every nameable class, which allows matching by ancestor with
/// [`AnyException::is`] and registering the class with the
/// [`registry`](crate::registry).
pub trait ExcClass: Throwable + Clone {
    /// The type tag shared by all instances of this class.
    fn class() -> &'static ExcType;
}

static EXCEPTION: ExcType = ExcType::root("Exception");

impl ExcClass for Exception {
    fn class() -> &'static ExcType {
        &EXCEPTION
    }
}

impl Throwable for Exception {
    fn exc_type(&self) -> &'static ExcType {
        &EXCEPTION
    }

    fn exception(&self) -> &Exception {
        self
    }

    fn exception_mut(&mut self) -> &mut Exception {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Throwable> {
        Box::new(self.clone())
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.what())
    }
}

impl Error for Exception {}

register_exception!(Exception, Exception::from_exception);

/// Displays the full rendering of an exception, traceback included.
pub struct Report<'a>(&'a dyn Throwable);

impl<'a> Report<'a> {
    #[must_use]
    pub fn new(exc: &'a dyn Throwable) -> Self {
        Self(exc)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.add_to_stream(f)
    }
}

/// An exception whose concrete class is only known at runtime.
///
/// This is the error type threaded through `?`: any [`Throwable`] converts into
/// it, and it dereferences to `dyn Throwable` so the full capability set stays
/// available. Cloning goes through [`Throwable::clone_boxed`], so the copy keeps
/// the concrete class.
pub struct AnyException(Box<dyn Throwable>);

impl AnyException {
    pub fn new(exc: impl Throwable) -> Self {
        Self(Box::new(exc))
    }

    /// True if this exception would be caught by a handler for `K`, that is, if
    /// its class is `K` or derives from it.
    #[must_use]
    pub fn is<K: ExcClass>(&self) -> bool {
        self.0.exc_type().is_subclass_of(K::class())
    }

    /// True if the concrete type is exactly `K`.
    #[must_use]
    pub fn is_exactly<K: Throwable>(&self) -> bool {
        (&*self.0 as &dyn Any).is::<K>()
    }

    #[must_use]
    pub fn downcast_ref<K: Throwable>(&self) -> Option<&K> {
        (&*self.0 as &dyn Any).downcast_ref()
    }

    /// Recovers the concrete value, or gives the exception back unchanged.
    pub fn downcast<K: Throwable>(self) -> Result<K, Self> {
        if !self.is_exactly::<K>() {
            return Err(self);
        }
        let any: Box<dyn Any> = self.0;
        match any.downcast::<K>() {
            Ok(exc) => Ok(*exc),
            Err(_) => unreachable!("concrete type checked above"),
        }
    }

    #[must_use]
    pub fn report(&self) -> Report<'_> {
        Report(&*self.0)
    }
}

impl<E: Throwable> From<E> for AnyException {
    fn from(exc: E) -> Self {
        Self(Box::new(exc))
    }
}

impl Clone for AnyException {
    fn clone(&self) -> Self {
        Self(self.0.clone_boxed())
    }
}

impl Deref for AnyException {
    type Target = dyn Throwable;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl DerefMut for AnyException {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

impl fmt::Debug for AnyException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for AnyException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.what())
    }
}

impl Error for AnyException {}
