//! Traceback rendering and message composition.
//!
//! The fixtures below build exceptions with explicit locations so the rendered
//! text is stable; the macro tests further down use real call sites.

use pretty_assertions::assert_eq;
use tracex::{
    AnyException, Exception, InvalidParameterError, LengthError, Report, ResultExt, RuntimeError, SourceLoc,
    Throwable, add_here, add_message, declare_exception, here, raise, throw, throw_if_ne,
};

declare_exception! {
    pub HeaderError: RuntimeError, "HeaderError"
}

const FILE: &str = "src/catalog.rs";

fn open_catalog() -> Exception {
    Exception::new(SourceLoc::new(FILE, 42, "catalog::open_catalog"), "cannot open catalog")
}

fn read_header() -> HeaderError {
    HeaderError::new(SourceLoc::new(FILE, 44, "catalog::read_header"), format!("bad header version {}", 2008))
}

fn reopen_catalog() -> Exception {
    let mut exc = open_catalog();
    exc.add_message(SourceLoc::new(FILE, 50, "catalog::reopen_catalog"), "retrying open");
    exc
}

fn load_header() -> HeaderError {
    let mut exc = read_header();
    exc.add_message(SourceLoc::new(FILE, 68, "catalog::load_header"), "loading header");
    exc
}

fn load_catalog() -> HeaderError {
    let mut exc = load_header();
    exc.add_message(SourceLoc::new(FILE, 77, "catalog::load_catalog"), "loading catalog");
    exc
}

// Rendering

#[test]
fn single_frame() {
    assert_eq!(
        Report::new(&open_catalog()).to_string(),
        "\n  File \"src/catalog.rs\", line 42, in catalog::open_catalog\n    cannot open catalog {0}\nException: 'cannot open catalog'\n"
    );
}

#[test]
fn subclass_seen_through_base_keeps_its_name() {
    let exc = AnyException::from(read_header());
    assert!(exc.is::<Exception>());
    assert_eq!(
        exc.report().to_string(),
        "\n  File \"src/catalog.rs\", line 44, in catalog::read_header\n    bad header version 2008 {0}\nHeaderError: 'bad header version 2008'\n"
    );
}

#[test]
fn rethrow_appends_a_frame() {
    assert_eq!(
        Report::new(&reopen_catalog()).to_string(),
        concat!(
            "\n",
            "  File \"src/catalog.rs\", line 42, in catalog::open_catalog\n",
            "    cannot open catalog {0}\n",
            "  File \"src/catalog.rs\", line 50, in catalog::reopen_catalog\n",
            "    retrying open {1}\n",
            "Exception: 'cannot open catalog {0}; retrying open {1}'\n",
        )
    );
}

#[test]
fn subclass_rethrow_through_base_handle() {
    let exc = AnyException::from(load_header());
    assert_eq!(
        exc.report().to_string(),
        concat!(
            "\n",
            "  File \"src/catalog.rs\", line 44, in catalog::read_header\n",
            "    bad header version 2008 {0}\n",
            "  File \"src/catalog.rs\", line 68, in catalog::load_header\n",
            "    loading header {1}\n",
            "HeaderError: 'bad header version 2008 {0}; loading header {1}'\n",
        )
    );
}

#[test]
fn rethrow_twice() {
    let exc = load_catalog();
    assert_eq!(exc.traceback().len(), 3);
    assert_eq!(exc.what(), "bad header version 2008 {0}; loading header {1}; loading catalog {2}");
    assert_eq!(
        Report::new(&exc).to_string(),
        concat!(
            "\n",
            "  File \"src/catalog.rs\", line 44, in catalog::read_header\n",
            "    bad header version 2008 {0}\n",
            "  File \"src/catalog.rs\", line 68, in catalog::load_header\n",
            "    loading header {1}\n",
            "  File \"src/catalog.rs\", line 77, in catalog::load_catalog\n",
            "    loading catalog {2}\n",
            "HeaderError: 'bad header version 2008 {0}; loading header {1}; loading catalog {2}'\n",
        )
    );
}

#[test]
fn no_location_renders_message_only() {
    let mut exc = HeaderError::with_message("constructed without location");
    add_message!(exc, "new message");
    assert!(exc.traceback().is_empty());
    assert_eq!(Report::new(&exc).to_string(), "constructed without location; new message");
}

#[test]
fn invalid_parameter_render() {
    let exc = InvalidParameterError::new(SourceLoc::new("src/io.rs", 12, "io::resize"), "bad size");
    assert_eq!(exc.what(), "bad size");
    assert_eq!(
        Report::new(&exc).to_string(),
        "\n  File \"src/io.rs\", line 12, in io::resize\n    bad size {0}\nInvalidParameterError: 'bad size'\n"
    );
}

// Macros

#[test]
fn here_captures_the_call_site() {
    let (exc, line) = (raise!(LengthError, "size {}", 3), line!());
    let tracepoint = &exc.traceback()[0];
    assert_eq!(tracepoint.file(), file!());
    assert_eq!(tracepoint.line(), line);
    assert_eq!(tracepoint.function(), "traceback::here_captures_the_call_site");
    assert_eq!(tracepoint.message(), "size 3");
}

#[test]
fn closures_report_the_enclosing_function() {
    let capture = || here!();
    assert_eq!(capture().function, "traceback::closures_report_the_enclosing_function");
}

fn load(size: usize) -> Result<usize, AnyException> {
    if size > 4 {
        throw!(InvalidParameterError, "bad size {size}");
    }
    Ok(size)
}

fn load_all(sizes: &[usize]) -> Result<usize, AnyException> {
    let mut total = 0;
    for size in sizes {
        match load(*size) {
            Ok(size) => total += size,
            Err(mut err) => {
                add_message!(err, "while loading item {total}");
                return Err(err);
            }
        }
    }
    Ok(total)
}

#[test]
fn macros_compose_like_manual_calls() {
    assert_eq!(load_all(&[1, 2]).unwrap(), 3);

    let mut err = load_all(&[1, 9]).unwrap_err();
    assert!(err.is::<InvalidParameterError>());
    assert_eq!(err.what(), "bad size 9 {0}; while loading item 1 {1}");
    assert_eq!(err.traceback()[0].function(), "traceback::load");
    assert_eq!(err.traceback()[1].function(), "traceback::load_all");

    add_here!(err);
    assert_eq!(err.what(), "bad size 9 {0}; while loading item 1 {1};  {2}");
    assert_eq!(err.traceback()[2].message(), "");
}

#[test]
fn result_ext_adds_context() {
    let err = load(7).add_message(here!(), "outer").unwrap_err();
    assert_eq!(err.what(), "bad size 7 {0}; outer {1}");
    assert_eq!(load(2).add_message(here!(), "outer").unwrap(), 2);
}

fn check_sizes(a: &[u8], b: &[u8]) -> Result<(), AnyException> {
    throw_if_ne!(a.len(), b.len(), LengthError, "Size of a ({}) does not match size of b ({})");
    Ok(())
}

#[test]
fn throw_if_ne_formats_both_values() {
    assert!(check_sizes(&[1, 2], &[3, 4]).is_ok());
    let err = check_sizes(&[1, 2, 3], &[4]).unwrap_err();
    assert!(err.is_exactly::<LengthError>());
    assert_eq!(err.what(), "Size of a (3) does not match size of b (1)");
}
