use crate::{pad_buffer, Parser, Token, TokenReader};

/// Flatten `json` through the handle and decode the stream into tokens.
pub(crate) fn tokens(json: &str) -> Vec<OwnedToken> {
    let buf = pad_buffer(json.as_bytes());
    let mut parser = Parser::new();
    let stream = parser.flatten(&buf, json.len()).expect("flatten");
    decode(&stream)
}

pub(crate) fn decode(stream: &[u8]) -> Vec<OwnedToken> {
    TokenReader::new(stream)
        .map(|t| OwnedToken::from(t.expect("decode")))
        .collect()
}

/// `Token` with owned strings, so expectations outlive the stream buffer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OwnedToken {
    Null,
    Bool(bool),
    Int(i64),
    Double { value: f64, raw: String },
    String(String),
    ArrayStart(u32),
    ArrayEnd,
    ObjectStart(u32),
    ObjectEnd,
}

impl From<Token<'_>> for OwnedToken {
    fn from(t: Token<'_>) -> Self {
        match t {
            Token::Null => OwnedToken::Null,
            Token::Bool(v) => OwnedToken::Bool(v),
            Token::Int(v) => OwnedToken::Int(v),
            Token::Double { value, raw } => OwnedToken::Double {
                value,
                raw: raw.to_string(),
            },
            Token::String(s) => OwnedToken::String(s.to_string()),
            Token::ArrayStart(n) => OwnedToken::ArrayStart(n),
            Token::ArrayEnd => OwnedToken::ArrayEnd,
            Token::ObjectStart(n) => OwnedToken::ObjectStart(n),
            Token::ObjectEnd => OwnedToken::ObjectEnd,
        }
    }
}

/// Check that a token stream is well balanced and that every container's
/// child count matches the records that follow it.
pub(crate) fn assert_balanced(stream: &[u8]) {
    #[derive(Debug)]
    enum Frame {
        Array { expected: u32, seen: u32 },
        Object { expected: u32, seen: u32, want_key: bool },
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut roots = 0u32;

    let bump = |stack: &mut Vec<Frame>, roots: &mut u32, is_string: bool| {
        match stack.last_mut() {
            Some(Frame::Array { seen, .. }) => *seen += 1,
            Some(Frame::Object { seen, want_key, .. }) => {
                if *want_key {
                    assert!(is_string, "object key must be a String record");
                    *want_key = false;
                } else {
                    *seen += 1;
                    *want_key = true;
                }
            }
            None => *roots += 1,
        }
    };

    for token in TokenReader::new(stream) {
        match token.expect("decode") {
            Token::ArrayStart(n) => {
                bump(&mut stack, &mut roots, false);
                stack.push(Frame::Array {
                    expected: n,
                    seen: 0,
                });
            }
            Token::ArrayEnd => match stack.pop() {
                Some(Frame::Array { expected, seen }) => {
                    assert_eq!(expected, seen, "array child count");
                }
                other => panic!("unbalanced ArrayEnd over {other:?}"),
            },
            Token::ObjectStart(n) => {
                bump(&mut stack, &mut roots, false);
                stack.push(Frame::Object {
                    expected: n,
                    seen: 0,
                    want_key: true,
                });
            }
            Token::ObjectEnd => match stack.pop() {
                Some(Frame::Object {
                    expected,
                    seen,
                    want_key,
                }) => {
                    assert!(want_key, "object ended mid-pair");
                    assert_eq!(expected, seen, "object pair count");
                }
                other => panic!("unbalanced ObjectEnd over {other:?}"),
            },
            Token::String(_) => bump(&mut stack, &mut roots, true),
            Token::Null | Token::Bool(_) | Token::Int(_) | Token::Double { .. } => {
                bump(&mut stack, &mut roots, false);
            }
        }
    }

    assert!(stack.is_empty(), "unclosed containers: {stack:?}");
    assert_eq!(roots, 1, "exactly one root value");
}

/// Rebuild a `serde_json::Value` from a token stream, preferring raw number
/// text where it is present.
pub(crate) fn reconstruct(stream: &[u8]) -> serde_json::Value {
    fn value(reader: &mut TokenReader<'_>) -> serde_json::Value {
        match reader.next_token().expect("decode") {
            Token::Null => serde_json::Value::Null,
            Token::Bool(v) => serde_json::Value::Bool(v),
            Token::Int(v) => serde_json::Value::from(v),
            Token::Double { value: v, raw } => {
                let v = if raw.is_empty() {
                    v
                } else {
                    raw.parse().expect("raw number text")
                };
                serde_json::Value::from(v)
            }
            Token::String(s) => serde_json::Value::from(s),
            Token::ArrayStart(n) => {
                let mut arr = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    arr.push(value(reader));
                }
                assert!(matches!(reader.next_token(), Ok(Token::ArrayEnd)));
                serde_json::Value::Array(arr)
            }
            Token::ObjectStart(n) => {
                let mut map = serde_json::Map::with_capacity(n as usize);
                for _ in 0..n {
                    let key = match reader.next_token().expect("decode") {
                        Token::String(s) => s.to_string(),
                        other => panic!("expected key, got {other:?}"),
                    };
                    map.insert(key, value(reader));
                }
                assert!(matches!(reader.next_token(), Ok(Token::ObjectEnd)));
                serde_json::Value::Object(map)
            }
            other => panic!("unexpected token {other:?}"),
        }
    }

    let mut reader = TokenReader::new(stream);
    let v = value(&mut reader);
    assert!(reader.at_end(), "trailing records in stream");
    v
}
