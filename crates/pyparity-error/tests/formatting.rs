use std::error::Error as _;
use std::io;

use pyparity_error::{ParityError, ParseError, format_parse_error};

#[test]
fn parse_formatting_without_location() {
    let err = ParseError::new("expected an integer");
    let rendered = format_parse_error(&err, "known_failures.txt");
    assert_eq!(rendered, "error: expected an integer\n");
}

#[test]
fn parse_formatting_with_location_and_line_text() {
    let source = "12\n3x\n";
    let err = ParseError::new("expected an integer").at(source, 2, 2);

    let rendered = format_parse_error(&err, "known_failures.txt");
    assert_eq!(
        rendered,
        "error: expected an integer\n--> known_failures.txt:2:2\n |\n   2 | 3x\n |  ^\n"
    );
}

#[test]
fn location_past_end_has_no_line_text() {
    let err = ParseError::new("unexpected end of input").at("1\n", 7, 1);
    assert!(err.line_text.is_none());
    assert_eq!(
        err.to_string(),
        "unexpected end of input (line 7, column 1)"
    );
}

#[test]
fn parity_error_parse_display_uses_origin() {
    let err = ParityError::parse(
        "baselines/math.log",
        ParseError::new("missing header").at("title\n", 1, 1),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("error: missing header\n--> baselines/math.log:1:1"));
    assert!(!rendered.ends_with('\n'));
}

#[test]
fn spawn_error_exposes_source() {
    let err = ParityError::Spawn {
        program: "/no/such/python".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    };
    assert_eq!(err.to_string(), "failed to start /no/such/python: not found");
    assert!(err.source().is_some());
}
