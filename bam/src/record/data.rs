//! Auxiliary tag entry codec: the wire-level `(tag, type code, payload)`
//! triples that make up the tag region of an `AlignmentRecord`, plus the
//! `Value` the tag registry exchanges with callers.
//!
//! Array-typed (`B`) tags are out of scope — no schema evolution of
//! auxiliary tags beyond the fixed type-code alphabet below.

use bam_common::primitive;

use crate::error::{Error, Result};
use crate::tag::ValueType;

/// A decoded auxiliary tag value. `Int` is the canonical representation for
/// every integer-typed tag regardless of the narrow wire width (`c`/`C`/`s`/
/// `S`/`i`/`I`) it was stored in.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Char(char),
    Int(i64),
    Float(f32),
    String(String),
    Hex(String),
}

fn read_cstr(region: &[u8], offset: usize) -> Result<(String, usize)> {
    let nul = region[offset..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::MalformedRecord("unterminated string tag value".to_string()))?;

    let s = String::from_utf8_lossy(&region[offset..offset + nul]).into_owned();
    Ok((s, offset + nul + 1))
}

/// Decodes one `(tag, value)` pair starting at `offset`, returning the value
/// and the offset of the next entry.
pub fn decode_entry(region: &[u8], offset: usize) -> Result<([u8; 2], Value, usize)> {
    let tag = [region[offset], region[offset + 1]];
    let type_code = region[offset + 2];
    let payload = offset + 3;

    let (value, next) = match type_code {
        b'A' => (Value::Char(region[payload] as char), payload + 1),
        b'c' => (Value::Int(primitive::read_i8(region, payload) as i64), payload + 1),
        b'C' => (Value::Int(primitive::read_u8(region, payload) as i64), payload + 1),
        b's' => (Value::Int(primitive::read_i16(region, payload) as i64), payload + 2),
        b'S' => (Value::Int(primitive::read_u16(region, payload) as i64), payload + 2),
        b'i' => (Value::Int(primitive::read_i32(region, payload) as i64), payload + 4),
        b'I' => (Value::Int(primitive::read_u32(region, payload) as i64), payload + 4),
        b'f' => (Value::Float(primitive::read_f32(region, payload)), payload + 4),
        b'Z' => {
            let (s, next) = read_cstr(region, payload)?;
            (Value::String(s), next)
        }
        b'H' => {
            let (s, next) = read_cstr(region, payload)?;
            (Value::Hex(s), next)
        }
        other => {
            return Err(Error::MalformedRecord(format!(
                "unrecognized tag type code {:?}",
                other as char
            )))
        }
    };

    Ok((tag, value, next))
}

/// Decodes every tag entry in `region` in order.
pub fn decode_entries(region: &[u8]) -> Result<Vec<([u8; 2], Value)>> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < region.len() {
        let (tag, value, next) = decode_entry(region, offset)?;
        entries.push((tag, value));
        offset = next;
    }

    Ok(entries)
}

/// Encodes `value`'s type code and payload (not the tag key, which the
/// caller already wrote) into `out`, narrowing integers to the smallest
/// wire width that holds them: the narrowest of `c C s S i I` that
/// represents the value exactly.
pub fn encode_value(value_type: ValueType, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (value_type, value) {
        (ValueType::Char, Value::Char(c)) => {
            out.push(b'A');
            out.push(*c as u8);
        }
        (ValueType::Float, Value::Float(f)) => {
            out.push(b'f');
            let mut bytes = [0u8; 4];
            primitive::write_f32(&mut bytes, 0, *f);
            out.extend_from_slice(&bytes);
        }
        (ValueType::String, Value::String(s)) => {
            out.push(b'Z');
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        (ValueType::Hex, Value::Hex(s)) => {
            out.push(b'H');
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        (ValueType::Int32, Value::Int(n)) => encode_narrowest_int(*n, out),
        (expected, found) => {
            return Err(Error::InvalidArgument(format!(
                "value {found:?} does not match declared type {expected:?}"
            )))
        }
    }

    Ok(())
}

fn encode_narrowest_int(n: i64, out: &mut Vec<u8>) {
    if n >= 0 {
        if let Ok(v) = u8::try_from(n) {
            out.push(b'C');
            out.push(v);
        } else if let Ok(v) = u16::try_from(n) {
            out.push(b'S');
            let mut bytes = [0u8; 2];
            primitive::write_u16(&mut bytes, 0, v);
            out.extend_from_slice(&bytes);
        } else {
            let v = n as u32;
            out.push(b'I');
            let mut bytes = [0u8; 4];
            primitive::write_u32(&mut bytes, 0, v);
            out.extend_from_slice(&bytes);
        }
    } else if let Ok(v) = i8::try_from(n) {
        out.push(b'c');
        out.push(v as u8);
    } else if let Ok(v) = i16::try_from(n) {
        out.push(b's');
        let mut bytes = [0u8; 2];
        primitive::write_i16(&mut bytes, 0, v);
        out.extend_from_slice(&bytes);
    } else {
        let v = n as i32;
        out.push(b'i');
        let mut bytes = [0u8; 4];
        primitive::write_i32(&mut bytes, 0, v);
        out.extend_from_slice(&bytes);
    }
}
