#![doc = include_str!("../../../README.md")]

#[macro_use]
mod macros;

mod exc_type;
mod exception;
mod hierarchy;
pub mod registry;
mod result;
mod tracepoint;
pub mod tracer;

#[doc(hidden)]
pub use inventory;

pub use crate::{
    exc_type::ExcType,
    exception::{AnyException, DisplayFormat, ExcClass, Exception, Report, Throwable},
    hierarchy::{
        BUILTIN_CLASSES, DomainError, InvalidParameterError, IoError, LengthError, LogicError, NotFoundError,
        OutOfRangeError, OverflowError, RangeError, RuntimeError, TypeError, UnderflowError,
    },
    registry::UnknownExcTypeError,
    result::{ExcResult, ResultExt},
    tracepoint::{SourceLoc, Tracepoint},
};
