use crate::{flatten, pad_buffer, Error, MAX_DEPTH};

fn flatten_err(json: &str) -> Error {
    let buf = pad_buffer(json.as_bytes());
    flatten(&buf, json.len()).expect_err(json)
}

#[test]
fn empty_input() {
    assert_eq!(flatten_err("").code(), 6);
}

#[test]
fn whitespace_only() {
    assert_eq!(flatten_err("   \t\n  ").code(), 6);
}

#[test]
fn truncated_documents() {
    for doc in [
        "{",
        "[",
        r#"{"a": [1, 2"#,
        r#"{"name": "hel"#,
        r#"{"a":"#,
        "[1,",
        "\"unterminated",
    ] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
}

#[test]
fn structural_garbage() {
    for doc in [
        "not json at all!!!",
        "{z}",
        "[1 2]",
        r#"{"a" 1}"#,
        r#"{"a":1,}"#,
        "[1,]",
        "]",
        "}",
        ",",
        ":",
    ] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
}

#[test]
fn trailing_content_is_rejected() {
    for doc in ["1 2", "{} []", "null x", "truex"] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
}

#[test]
fn misspelled_literals() {
    for doc in ["nool", "tru", "falsy", "nil"] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
}

#[test]
fn bad_numbers() {
    for doc in ["01", "1.", ".5", "-", "1e", "1e+", "+1", "0x10", "1e999"] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
}

#[test]
fn bad_strings() {
    // Unescaped control character.
    let ctl = b"\"a\x01b\"";
    assert!(flatten(&pad_buffer(ctl), ctl.len()).is_err());
    // Bad escape letter and truncated unicode escape.
    for doc in ["\"\\q\"", "\"\\u12\"", "\"\\u12zz\""] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
    // Lone surrogates cannot form a scalar value.
    for doc in ["\"\\uD800\"", "\"\\uDC00\"", "\"\\uD800x\""] {
        assert!(flatten(&pad_buffer(doc.as_bytes()), doc.len()).is_err(), "{doc}");
    }
}

#[test]
fn invalid_utf8_in_string() {
    let json = b"{\"a\": \"b\xFFc\"}";
    let buf = pad_buffer(json);
    assert!(flatten(&buf, json.len()).is_err());
}

#[test]
fn depth_limit_arrays() {
    let mut json = Vec::new();
    json.extend(std::iter::repeat(b'[').take(1100));
    json.push(b'1');
    json.extend(std::iter::repeat(b']').take(1100));
    let buf = pad_buffer(&json);
    let err = flatten(&buf, json.len()).expect_err("1100 levels");
    assert_eq!(err.code(), 5);
}

#[test]
fn depth_limit_objects() {
    let mut json = Vec::new();
    for i in 0..1100 {
        json.extend_from_slice(format!("{{\"k{i}\":").as_bytes());
    }
    json.extend_from_slice(b"null");
    json.extend(std::iter::repeat(b'}').take(1100));
    let buf = pad_buffer(&json);
    assert!(flatten(&buf, json.len()).is_err());
}

#[test]
fn depth_at_the_limit_is_accepted() {
    let mut json = Vec::new();
    json.extend(std::iter::repeat(b'[').take(MAX_DEPTH));
    json.push(b'1');
    json.extend(std::iter::repeat(b']').take(MAX_DEPTH));
    let buf = pad_buffer(&json);
    assert!(flatten(&buf, json.len()).is_ok());
}

#[test]
fn depth_error_returns_no_partial_output() {
    let mut json = Vec::new();
    json.extend(std::iter::repeat(b'[').take(MAX_DEPTH + 2));
    json.push(b'1');
    json.extend(std::iter::repeat(b']').take(MAX_DEPTH + 2));
    let buf = pad_buffer(&json);
    match flatten(&buf, json.len()) {
        Err(Error::DepthLimit) => {}
        other => panic!("expected depth error, got {other:?}"),
    }
}
