//! Macros for raising, rethrowing and declaring exceptions.
//!
//! Every macro captures the call site with [`here!`], so tracebacks point at the
//! code that invoked the macro rather than at this crate.

/// Expands to the path of the enclosing function, e.g. `my_crate::parse::read_header`.
///
/// Closure frames are stripped so a raise inside a closure reports the function
/// the closure is defined in.
#[doc(hidden)]
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __marker() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = type_name_of(__marker);
        let mut name = name.strip_suffix("::__marker").unwrap_or(name);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name
    }};
}

/// Captures the current file, line and function as a [`SourceLoc`](crate::SourceLoc).
#[macro_export]
macro_rules! here {
    () => {
        $crate::SourceLoc::new(::core::file!(), ::core::line!(), $crate::function_name!())
    };
}

/// Creates an exception of the given class at the current location.
///
/// ```
/// use tracex::{raise, InvalidParameterError, Throwable};
///
/// let exc = raise!(InvalidParameterError, "bad size {}", 3);
/// assert_eq!(exc.what(), "bad size 3");
/// ```
#[macro_export]
macro_rules! raise {
    ($class:ty, $($arg:tt)+) => {
        <$class>::new($crate::here!(), ::std::format!($($arg)+))
    };
}

/// Returns early with an exception of the given class raised at the current location.
///
/// The exception is converted with `Into`, so the enclosing function can return
/// either the concrete class or [`AnyException`](crate::AnyException).
#[macro_export]
macro_rules! throw {
    ($class:ty, $($arg:tt)+) => {
        return ::core::result::Result::Err($crate::raise!($class, $($arg)+).into())
    };
}

/// Records a rethrow of `exc` at the current location with a formatted message.
#[macro_export]
macro_rules! add_message {
    ($exc:expr, $($arg:tt)+) => {{
        use $crate::Throwable as _;
        $exc.add_message($crate::here!(), &::std::format!($($arg)+))
    }};
}

/// Records a rethrow of `exc` at the current location without a message.
#[macro_export]
macro_rules! add_here {
    ($exc:expr) => {{
        use $crate::Throwable as _;
        $exc.add_message($crate::here!(), "")
    }};
}

/// Returns early with `class` if the two values differ.
///
/// The message is formatted with the left then the right value:
///
/// ```
/// use tracex::{throw_if_ne, AnyException, LengthError, Throwable};
///
/// fn check(a: usize, b: usize) -> Result<(), AnyException> {
///     throw_if_ne!(a, b, LengthError, "Size of a ({}) does not match size of b ({})");
///     Ok(())
/// }
///
/// let err = check(3, 4).unwrap_err();
/// assert_eq!(err.what(), "Size of a (3) does not match size of b (4)");
/// assert!(check(4, 4).is_ok());
/// ```
#[macro_export]
macro_rules! throw_if_ne {
    ($lhs:expr, $rhs:expr, $class:ty, $fmt:literal) => {
        match (&$lhs, &$rhs) {
            (lhs, rhs) => {
                if *lhs != *rhs {
                    $crate::throw!($class, $fmt, lhs, rhs);
                }
            }
        }
    };
}

/// Declares an exception class deriving from `Base`.
///
/// The generated struct wraps its base, reports the given canonical name and is
/// registered at load time so it can be rebuilt by name (see
/// [`registry::construct`](crate::registry::construct)). The base must provide
/// `new`, `with_message` and `from_exception`, as every class declared with this
/// macro does.
///
/// ```
/// use tracex::{declare_exception, raise, AnyException, RuntimeError, Throwable};
///
/// declare_exception! {
///     /// The telescope refused to move.
///     pub MountError: RuntimeError, "mount::MountError"
/// }
///
/// let err: AnyException = raise!(MountError, "slew aborted").into();
/// assert!(err.is::<RuntimeError>());
/// assert_eq!(err.get_type(), "mount::MountError *");
/// ```
#[macro_export]
macro_rules! declare_exception {
    ($(#[$meta:meta])* $vis:vis $name:ident : $base:ty, $canonical:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name($base);

        impl $name {
            /// Raises at `loc` with `message`.
            #[must_use]
            pub fn new(
                loc: $crate::SourceLoc,
                message: impl ::core::convert::Into<::std::string::String>,
            ) -> Self {
                Self(<$base>::new(loc, message))
            }

            /// Creates an instance without a location.
            #[must_use]
            pub fn with_message(message: impl ::core::convert::Into<::std::string::String>) -> Self {
                Self(<$base>::with_message(message))
            }

            /// Wraps existing exception state in this class.
            #[must_use]
            pub fn from_exception(exception: $crate::Exception) -> Self {
                Self(<$base>::from_exception(exception))
            }
        }

        impl $crate::ExcClass for $name {
            fn class() -> &'static $crate::ExcType {
                static CLASS: $crate::ExcType =
                    $crate::ExcType::derived($canonical, <$base as $crate::ExcClass>::class);
                &CLASS
            }
        }

        impl $crate::Throwable for $name {
            fn exc_type(&self) -> &'static $crate::ExcType {
                <Self as $crate::ExcClass>::class()
            }

            fn exception(&self) -> &$crate::Exception {
                $crate::Throwable::exception(&self.0)
            }

            fn exception_mut(&mut self) -> &mut $crate::Exception {
                $crate::Throwable::exception_mut(&mut self.0)
            }

            fn clone_boxed(&self) -> ::std::boxed::Box<dyn $crate::Throwable> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }

            fn render(&self, out: &mut dyn ::core::fmt::Write, type_name: &str) -> ::core::fmt::Result {
                $crate::Throwable::render(&self.0, out, type_name)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&$crate::Throwable::what(self))
            }
        }

        impl ::std::error::Error for $name {}

        $crate::register_exception!($name, $name::from_exception);
    };
}

/// Registers a hand-written exception class with the [`registry`](crate::registry).
///
/// With a constructor (`fn(Exception) -> Class`) the class can be rebuilt by
/// name; without one, lookups by name fall back to the nearest registered
/// ancestor that has a constructor.
#[macro_export]
macro_rules! register_exception {
    ($class:ty) => {
        $crate::inventory::submit! {
            $crate::registry::Registration::new(
                <$class as $crate::ExcClass>::class,
                ::core::option::Option::None,
            )
        }
    };
    ($class:ty, $construct:expr) => {
        $crate::inventory::submit! {
            $crate::registry::Registration::new(
                <$class as $crate::ExcClass>::class,
                ::core::option::Option::Some(|exception| $crate::AnyException::new($construct(exception))),
            )
        }
    };
}
