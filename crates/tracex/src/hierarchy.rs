//! The built-in exception classes.
//!
//! Two families hang off [`Exception`]: [`LogicError`] for mistakes the caller
//! could have prevented by checking first, and [`RuntimeError`] for conditions
//! only detectable while running. [`NotFoundError`] stands on its own under the
//! root.

use crate::{exc_type::ExcType, exception::Exception, ExcClass};

declare_exception! {
    /// A precondition or invariant was violated.
    pub LogicError: Exception, "LogicError"
}

declare_exception! {
    /// An argument lies outside the domain of the operation.
    pub DomainError: LogicError, "DomainError"
}

declare_exception! {
    /// An argument is invalid for reasons other than its domain or length.
    pub InvalidParameterError: LogicError, "InvalidParameterError"
}

declare_exception! {
    /// A size or length does not match what was required.
    pub LengthError: LogicError, "LengthError"
}

declare_exception! {
    /// An index or key lies outside the valid range.
    pub OutOfRangeError: LogicError, "OutOfRangeError"
}

declare_exception! {
    /// A condition that could only be detected while running.
    pub RuntimeError: Exception, "RuntimeError"
}

declare_exception! {
    /// A computed result cannot be represented by the destination type.
    pub RangeError: RuntimeError, "RangeError"
}

declare_exception! {
    /// Arithmetic overflow.
    pub OverflowError: RuntimeError, "OverflowError"
}

declare_exception! {
    /// Arithmetic underflow.
    pub UnderflowError: RuntimeError, "UnderflowError"
}

declare_exception! {
    /// An I/O operation failed.
    pub IoError: RuntimeError, "IoError"
}

#[cfg(not(feature = "type-error-runtime"))]
declare_exception! {
    /// A value has the wrong type.
    pub TypeError: LogicError, "TypeError"
}

#[cfg(feature = "type-error-runtime")]
declare_exception! {
    /// A value has the wrong type.
    pub TypeError: RuntimeError, "TypeError"
}

declare_exception! {
    /// A lookup found nothing.
    pub NotFoundError: Exception, "NotFoundError"
}

/// Every built-in class, each listed after its base.
pub static BUILTIN_CLASSES: [fn() -> &'static ExcType; 13] = [
    Exception::class,
    LogicError::class,
    DomainError::class,
    InvalidParameterError::class,
    LengthError::class,
    OutOfRangeError::class,
    RuntimeError::class,
    RangeError::class,
    OverflowError::class,
    UnderflowError::class,
    IoError::class,
    TypeError::class,
    NotFoundError::class,
];
