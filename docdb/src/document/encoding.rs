// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Order-preserving value codec
//!
//! Every encoded value starts with a one-byte type tag, so values of
//! different types sort by type first:
//! null < bool < integer < double < text < blob < array < document.
//! Within a type, byte order matches value order. Encodings are
//! self-delimiting, which lets composite keys be concatenated.
//!
//! [`encode_canonical`] is the form stored in indexes: integers are widened
//! to doubles so the whole numeric family shares one ordering.

use super::{Document, Value, ValueType};
use thiserror::Error;

const TAG_NULL: u8 = 0x05;
const TAG_BOOL: u8 = 0x10;
const TAG_INTEGER: u8 = 0x20;
const TAG_DOUBLE: u8 = 0x21;
const TAG_TEXT: u8 = 0x30;
const TAG_BLOB: u8 = 0x40;
const TAG_ARRAY: u8 = 0x50;
const TAG_DOCUMENT: u8 = 0x60;

const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0xFF;
const SIGN_BIT: u64 = 0x8000_0000_0000_0000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("unexpected end of encoded value")]
    UnexpectedEof,

    #[error("unknown type tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("invalid utf-8 in encoded text")]
    InvalidUtf8,

    #[error("{0} trailing bytes after encoded value")]
    TrailingBytes(usize),
}

/// Encode a value preserving its exact type
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    encode_into(value, false, &mut out);
    out
}

/// Encode a value in index form: numbers are encoded as doubles.
///
/// Integers beyond 2^53 in magnitude lose precision when widened, so
/// neighbouring large integers can share one canonical encoding and collide
/// in a unique index.
pub fn encode_canonical(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    encode_into(value, true, &mut out);
    out
}

/// Leading tag byte shared by every canonical encoding of `ty`
pub fn canonical_type_tag(ty: ValueType) -> u8 {
    match ty {
        ValueType::Null => TAG_NULL,
        ValueType::Bool => TAG_BOOL,
        ValueType::Integer | ValueType::Double => TAG_DOUBLE,
        ValueType::Text => TAG_TEXT,
        ValueType::Blob => TAG_BLOB,
        ValueType::Array => TAG_ARRAY,
        ValueType::Document => TAG_DOCUMENT,
    }
}

fn encode_into(value: &Value, canonical: bool, out: &mut Vec<u8>) {
    match value {
        Value::Null => out.push(TAG_NULL),
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
        Value::Integer(i) if canonical => encode_double(*i as f64, out),
        Value::Integer(i) => {
            out.push(TAG_INTEGER);
            out.extend_from_slice(&((*i as u64) ^ SIGN_BIT).to_be_bytes());
        }
        Value::Double(f) => encode_double(*f, out),
        Value::Text(s) => {
            out.push(TAG_TEXT);
            append_escaped(s.as_bytes(), out);
        }
        Value::Blob(b) => {
            out.push(TAG_BLOB);
            append_escaped(b, out);
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            for item in items {
                encode_into(item, canonical, out);
            }
            out.push(TERMINATOR);
        }
        Value::Document(doc) => {
            out.push(TAG_DOCUMENT);
            for (name, item) in doc.fields() {
                append_escaped(name.as_bytes(), out);
                encode_into(item, canonical, out);
            }
            out.push(TERMINATOR);
        }
    }
}

fn encode_double(f: f64, out: &mut Vec<u8>) {
    out.push(TAG_DOUBLE);
    // -0.0 and 0.0 must share an encoding
    let f = if f == 0.0 { 0.0 } else { f };
    let bits = f.to_bits();
    let mapped = if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT
    };
    out.extend_from_slice(&mapped.to_be_bytes());
}

// Interior zero bytes are escaped so the terminator stays unambiguous.
fn append_escaped(bytes: &[u8], out: &mut Vec<u8>) {
    for byte in bytes {
        if *byte == TERMINATOR {
            out.extend_from_slice(&[TERMINATOR, ESCAPE]);
        } else {
            out.push(*byte);
        }
    }
    out.push(TERMINATOR);
}

/// Decode a complete encoded value
pub fn decode(bytes: &[u8]) -> Result<Value, EncodingError> {
    let mut decoder = Decoder { bytes, pos: 0 };
    let value = decoder.value()?;
    let rest = bytes.len() - decoder.pos;
    if rest != 0 {
        return Err(EncodingError::TrailingBytes(rest));
    }
    Ok(value)
}

/// Decode the first value of `bytes`, returning it with its encoded length
pub fn decode_prefix(bytes: &[u8]) -> Result<(Value, usize), EncodingError> {
    let mut decoder = Decoder { bytes, pos: 0 };
    let value = decoder.value()?;
    Ok((value, decoder.pos))
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn byte(&mut self) -> Result<u8, EncodingError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or(EncodingError::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    fn peek(&self) -> Result<u8, EncodingError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(EncodingError::UnexpectedEof)
    }

    fn u64(&mut self) -> Result<u64, EncodingError> {
        let end = self.pos + 8;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(EncodingError::UnexpectedEof)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        self.pos = end;
        Ok(u64::from_be_bytes(buf))
    }

    fn escaped(&mut self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::new();
        loop {
            let b = self.byte()?;
            if b != TERMINATOR {
                out.push(b);
                continue;
            }
            match self.bytes.get(self.pos) {
                Some(&ESCAPE) => {
                    self.pos += 1;
                    out.push(TERMINATOR);
                }
                _ => return Ok(out),
            }
        }
    }

    fn text(&mut self) -> Result<String, EncodingError> {
        String::from_utf8(self.escaped()?).map_err(|_| EncodingError::InvalidUtf8)
    }

    fn value(&mut self) -> Result<Value, EncodingError> {
        let tag = self.byte()?;
        let value = match tag {
            TAG_NULL => Value::Null,
            TAG_BOOL => Value::Bool(self.byte()? != 0),
            TAG_INTEGER => Value::Integer((self.u64()? ^ SIGN_BIT) as i64),
            TAG_DOUBLE => {
                let mapped = self.u64()?;
                let bits = if mapped & SIGN_BIT != 0 {
                    mapped ^ SIGN_BIT
                } else {
                    !mapped
                };
                Value::Double(f64::from_bits(bits))
            }
            TAG_TEXT => Value::Text(self.text()?),
            TAG_BLOB => Value::Blob(self.escaped()?),
            TAG_ARRAY => {
                let mut items = Vec::new();
                while self.peek()? != TERMINATOR {
                    items.push(self.value()?);
                }
                self.pos += 1;
                Value::Array(items)
            }
            TAG_DOCUMENT => {
                let mut doc = Document::new();
                while self.peek()? != TERMINATOR {
                    let name = self.text()?;
                    let item = self.value()?;
                    doc.set(name, item);
                }
                self.pos += 1;
                Value::Document(doc)
            }
            other => return Err(EncodingError::UnknownTag(other)),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ordered(values: &[Value], canonical: bool) {
        let enc = |v: &Value| {
            if canonical {
                encode_canonical(v)
            } else {
                encode(v)
            }
        };
        for pair in values.windows(2) {
            assert!(
                enc(&pair[0]) < enc(&pair[1]),
                "expected {} < {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_integer_order_is_preserved() {
        assert_ordered(
            &[
                Value::Integer(i64::MIN),
                Value::Integer(-1),
                Value::Integer(0),
                Value::Integer(1),
                Value::Integer(i64::MAX),
            ],
            false,
        );
    }

    #[test]
    fn test_double_order_is_preserved() {
        assert_ordered(
            &[
                Value::Double(f64::NEG_INFINITY),
                Value::Double(-2.5),
                Value::Double(-0.1),
                Value::Double(0.0),
                Value::Double(0.1),
                Value::Double(7.0),
                Value::Double(f64::INFINITY),
            ],
            false,
        );
        assert_eq!(encode(&Value::Double(-0.0)), encode(&Value::Double(0.0)));
    }

    #[test]
    fn test_canonical_mixes_numeric_family() {
        assert_eq!(
            encode_canonical(&Value::Integer(3)),
            encode(&Value::Double(3.0))
        );
        assert_ordered(
            &[
                Value::Double(-1.5),
                Value::Integer(-1),
                Value::Double(0.5),
                Value::Integer(1),
                Value::Double(1.5),
            ],
            true,
        );
    }

    #[test]
    fn test_canonical_loses_precision_above_2_pow_53() {
        let big = 1i64 << 53;
        assert_ne!(
            encode(&Value::Integer(big)),
            encode(&Value::Integer(big + 1))
        );
        assert_eq!(
            encode_canonical(&Value::Integer(big)),
            encode_canonical(&Value::Integer(big + 1))
        );
        assert_ne!(
            encode_canonical(&Value::Integer(big)),
            encode_canonical(&Value::Integer(big + 2))
        );
    }

    #[test]
    fn test_text_with_interior_nul_keeps_order() {
        assert_ordered(
            &[
                Value::from(""),
                Value::from("a"),
                Value::from("a\0"),
                Value::from("a\0b"),
                Value::from("ab"),
                Value::from("b"),
            ],
            false,
        );
    }

    #[test]
    fn test_type_order() {
        assert_ordered(
            &[
                Value::Null,
                Value::Bool(true),
                Value::Integer(100),
                Value::Double(-100.0),
                Value::from("text"),
                Value::Blob(vec![0]),
                Value::Array(vec![]),
                Value::Document(Document::new()),
            ],
            false,
        );
    }

    #[test]
    fn test_decode_composite() {
        let value = Value::Document(
            Document::new()
                .add("name", "a\0b")
                .add("tags", Value::Array(vec![Value::Integer(-4), Value::Null]))
                .add("blob", Value::Blob(vec![0, 1, 0xFF])),
        );
        assert_eq!(decode(&encode(&value)).unwrap(), value);

        let mut bytes = encode(&Value::from("key"));
        let len = bytes.len();
        bytes.extend_from_slice(&encode(&Value::Integer(9)));
        let (first, used) = decode_prefix(&bytes).unwrap();
        assert_eq!(first, Value::from("key"));
        assert_eq!(used, len);
        assert!(matches!(decode(&bytes), Err(EncodingError::TrailingBytes(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode(&[0x99]), Err(EncodingError::UnknownTag(0x99)));
        assert_eq!(decode(&[TAG_INTEGER, 1, 2]), Err(EncodingError::UnexpectedEof));
    }
}
