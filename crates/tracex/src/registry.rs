//! Load-time registry of exception classes, keyed by canonical name.
//!
//! Every class declared with [`declare_exception!`](crate::declare_exception) or
//! [`register_exception!`](crate::register_exception) is collected here before
//! `main` runs, wherever in the dependency graph it was declared. The registry
//! is what lets an exception be rebuilt as its concrete class from just a name,
//! which both deserialization and the Python boundary rely on.

use std::{error::Error, fmt, ptr, sync::LazyLock};

use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    exc_type::ExcType,
    exception::{AnyException, Exception},
    tracer::tracer,
};

/// One registered exception class.
#[derive(Debug)]
pub struct Registration {
    class: fn() -> &'static ExcType,
    construct: Option<fn(Exception) -> AnyException>,
}

impl Registration {
    #[doc(hidden)]
    #[must_use]
    pub const fn new(class: fn() -> &'static ExcType, construct: Option<fn(Exception) -> AnyException>) -> Self {
        Self { class, construct }
    }

    #[must_use]
    pub fn exc_type(&self) -> &'static ExcType {
        (self.class)()
    }

    /// Whether instances can be rebuilt from exception state alone.
    #[must_use]
    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    /// Wraps `exception` in this class, if the class has a constructor.
    #[must_use]
    pub fn construct(&self, exception: Exception) -> Option<AnyException> {
        self.construct.map(|construct| construct(exception))
    }
}

inventory::collect!(Registration);

struct Registry {
    by_name: AHashMap<&'static str, &'static Registration>,
    duplicates: Vec<&'static str>,
}

/// The registered classes, built on first use.
///
/// The installed tracer is told about duplicate names while this is built, so
/// a tracer meant to see them must be set before the first lookup.
static REGISTRY: LazyLock<Registry> = LazyLock::new(collect);

fn collect() -> Registry {
    let mut registry = Registry {
        by_name: AHashMap::new(),
        duplicates: Vec::new(),
    };
    for registration in inventory::iter::<Registration> {
        let name = registration.exc_type().name();
        if registry.by_name.contains_key(name) {
            tracer().on_duplicate_type(name);
            registry.duplicates.push(name);
        } else {
            registry.by_name.insert(name, registration);
        }
    }
    registry
}

/// Finds the registration for a canonical class name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Registration> {
    REGISTRY.by_name.get(name).copied()
}

/// Canonical names that were registered more than once.
///
/// Only the first registration of each is kept; which one is first depends on
/// link order.
#[must_use]
pub fn duplicates() -> &'static [&'static str] {
    &REGISTRY.duplicates
}

/// All registered classes, bases before their subclasses.
#[must_use]
pub fn kinds() -> Vec<&'static ExcType> {
    let mut kinds: Vec<_> = REGISTRY.by_name.values().map(|registration| registration.exc_type()).collect();
    kinds.sort_by_key(|exc_type| (exc_type.depth(), exc_type.name()));
    kinds
}

/// Rebuilds an exception of the class named `name` around `exception`.
///
/// A class registered without a constructor is replaced by its nearest
/// registered ancestor that has one, so the result is still caught by every
/// handler for that ancestor.
pub fn construct(name: &str, exception: Exception) -> Result<AnyException, UnknownExcTypeError> {
    let Some(registration) = lookup(name) else {
        return Err(UnknownExcTypeError::unregistered(name));
    };
    for exc_type in registration.exc_type().lineage() {
        if let Some(ancestor) = lookup(exc_type.name())
            && ptr::eq(ancestor.exc_type(), exc_type)
            && let Some(construct) = ancestor.construct
        {
            return Ok(construct(exception));
        }
    }
    Err(UnknownExcTypeError::not_constructible(name))
}

/// A class name that [`construct`] cannot build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExcTypeError {
    name: String,
    registered: bool,
}

impl UnknownExcTypeError {
    fn unregistered(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            registered: false,
        }
    }

    fn not_constructible(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            registered: true,
        }
    }

    /// The name that was looked up.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for UnknownExcTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.registered {
            write!(f, "exception type '{}' has no constructible ancestor", self.name)
        } else {
            write!(f, "unknown exception type '{}'", self.name)
        }
    }
}

impl Error for UnknownExcTypeError {}

#[derive(Serialize)]
struct SerializedRef<'a> {
    #[serde(rename = "type")]
    exc_type: &'a str,
    exception: &'a Exception,
}

#[derive(Deserialize)]
struct SerializedOwned {
    #[serde(rename = "type")]
    exc_type: String,
    exception: Exception,
}

impl Serialize for AnyException {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SerializedRef {
            exc_type: self.exc_type().name(),
            exception: self.exception(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnyException {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let serialized = SerializedOwned::deserialize(deserializer)?;
        construct(&serialized.exc_type, serialized.exception).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ExcClass, InvalidParameterError, LogicError, RuntimeError};

    #[test]
    fn builtins_are_registered() {
        let registration = lookup("InvalidParameterError").unwrap();
        assert_eq!(registration.exc_type(), InvalidParameterError::class());
        assert!(registration.is_constructible());
        assert!(lookup("NoSuchError").is_none());
        assert!(duplicates().is_empty());
    }

    #[test]
    fn kinds_are_base_first() {
        let kinds = kinds();
        assert_eq!(kinds[0].name(), "Exception");
        let logic = kinds.iter().position(|k| *k == LogicError::class()).unwrap();
        let invalid = kinds.iter().position(|k| *k == InvalidParameterError::class()).unwrap();
        assert!(logic < invalid);
    }

    #[test]
    fn construct_by_name() {
        let exc = construct("RuntimeError", Exception::with_message("late")).unwrap();
        assert!(exc.is_exactly::<RuntimeError>());
        assert_eq!(exc.exception().message(), "late");
    }

    #[test]
    fn unknown_name() {
        let err = construct("NoSuchError", Exception::default()).unwrap_err();
        assert_eq!(err.name(), "NoSuchError");
        assert_eq!(err.to_string(), "unknown exception type 'NoSuchError'");
    }
}
