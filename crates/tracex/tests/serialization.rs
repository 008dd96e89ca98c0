//! Serde round trips that keep the concrete class.

use pretty_assertions::assert_eq;
use tracex::{AnyException, LengthError, NotFoundError, SourceLoc, Throwable, declare_exception, raise};

declare_exception! {
    pub CatalogError: NotFoundError, "catalog::CatalogError"
}

fn rethrown() -> AnyException {
    let mut err = AnyException::from(LengthError::new(SourceLoc::new("a.rs", 1, "a::f"), "x"));
    err.add_message(SourceLoc::new("b.rs", 2, "b::g"), "y");
    err
}

#[test]
fn json_shape() {
    let json = serde_json::to_value(rethrown()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "LengthError",
            "exception": {
                "traceback": [
                    {"file": "a.rs", "line": 1, "function": "a::f", "message": "x"},
                    {"file": "b.rs", "line": 2, "function": "b::g", "message": "y"},
                ],
                "message": "x {0}; y {1}",
            },
        })
    );
}

#[test]
fn json_round_trip_keeps_class() {
    let err = rethrown();
    let text = serde_json::to_string(&err).unwrap();
    let back: AnyException = serde_json::from_str(&text).unwrap();
    assert!(back.is_exactly::<LengthError>());
    assert_eq!(back.report().to_string(), err.report().to_string());
}

#[test]
fn postcard_round_trip_downstream_class() {
    let err = AnyException::from(raise!(CatalogError, "no row {}", 17));
    let bytes = postcard::to_allocvec(&err).unwrap();
    let back: AnyException = postcard::from_bytes(&bytes).unwrap();
    assert!(back.is_exactly::<CatalogError>());
    assert!(back.is::<NotFoundError>());
    assert_eq!(back.traceback(), err.traceback());
}

#[test]
fn unknown_type_is_rejected() {
    let json = r#"{"type": "nope::Missing", "exception": {"traceback": [], "message": "m"}}"#;
    let err = serde_json::from_str::<AnyException>(json).unwrap_err();
    assert!(err.to_string().contains("unknown exception type 'nope::Missing'"));
}
