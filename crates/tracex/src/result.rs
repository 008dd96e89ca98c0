use crate::{exception::AnyException, tracepoint::SourceLoc, Throwable};

/// Shorthand for results carrying any exception.
pub type ExcResult<T> = Result<T, AnyException>;

/// Adds rethrow context to the error of a `Result`.
///
/// ```
/// use tracex::{here, raise, LengthError, ResultExt, Throwable};
///
/// fn inner() -> Result<(), LengthError> {
///     Err(raise!(LengthError, "x"))
/// }
///
/// let err = inner().add_message(here!(), "y").unwrap_err();
/// assert_eq!(err.what(), "x {0}; y {1}");
/// ```
pub trait ResultExt {
    /// Records a rethrow at `loc` if this is an `Err`.
    #[must_use]
    fn add_message(self, loc: SourceLoc, message: &str) -> Self;
}

impl<T, E: Throwable> ResultExt for Result<T, E> {
    fn add_message(self, loc: SourceLoc, message: &str) -> Self {
        self.map_err(|mut exc| {
            exc.add_message(loc, message);
            exc
        })
    }
}

impl<T> ResultExt for Result<T, AnyException> {
    fn add_message(self, loc: SourceLoc, message: &str) -> Self {
        self.map_err(|mut exc| {
            exc.add_message(loc, message);
            exc
        })
    }
}
