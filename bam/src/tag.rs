//! The tag registry: a process-wide table mapping each recognized
//! two-letter tag to its semantic value type and documentation.
//!
//! Populated once via `once_cell::sync::Lazy` the startup-time way; reads
//! are lock-free after that (`Lazy` only synchronizes the one-time init),
//! satisfying "entries are thread-safe to read; writes happen only during
//! initialization." Runtime deregistration is an explicit non-goal.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::record::data::Value;

/// The semantic value type a registered tag decodes to, independent of the
/// narrowest wire-level integer width chosen at encode time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueType {
    Char,
    String,
    Hex,
    Int32,
    Float,
}

struct Entry {
    value_type: ValueType,
    doc: &'static str,
}

macro_rules! registry {
    ($($tag:expr => ($ty:expr, $doc:expr)),* $(,)?) => {
        static REGISTRY: Lazy<HashMap<[u8; 2], Entry>> = Lazy::new(|| {
            let mut m = HashMap::new();
            $(
                m.insert(*$tag, Entry { value_type: $ty, doc: $doc });
            )*
            m
        });
    };
}

registry! {
    b"RG" => (ValueType::String, "Read group"),
    b"LB" => (ValueType::String, "Library"),
    b"PU" => (ValueType::String, "Platform unit"),
    b"PG" => (ValueType::String, "Program that generated this record"),
    b"AS" => (ValueType::Int32, "Alignment score"),
    b"SQ" => (ValueType::String, "Alternative sequence"),
    b"MQ" => (ValueType::Int32, "Mapping quality of the mate/next segment"),
    b"NM" => (ValueType::Int32, "Edit distance to the reference"),
    b"H0" => (ValueType::Int32, "Number of perfect hits"),
    b"H1" => (ValueType::Int32, "Number of 1-difference hits"),
    b"H2" => (ValueType::Int32, "Number of 2-difference hits"),
    b"UQ" => (ValueType::Int32, "Phred likelihood of the segment given best alignment"),
    b"PQ" => (ValueType::Int32, "Phred likelihood of the read pair"),
    b"NH" => (ValueType::Int32, "Number of reported alignments for the query"),
    b"IH" => (ValueType::Int32, "Number of stored alignments in the BAM file"),
    b"HI" => (ValueType::Int32, "Query hit index"),
    b"MD" => (ValueType::String, "Mismatching positions/bases"),
    b"CS" => (ValueType::String, "Color read sequence"),
    b"CQ" => (ValueType::String, "Color read quality"),
    b"CM" => (ValueType::Int32, "Number of color differences"),
    b"GS" => (ValueType::String, "Generic string field"),
    b"GQ" => (ValueType::String, "Generic quality string"),
    b"GC" => (ValueType::String, "Generic character"),
    b"R2" => (ValueType::String, "Sequence of the next segment"),
    b"Q2" => (ValueType::String, "Quality of the next segment"),
    b"S2" => (ValueType::String, "Generic sequence field"),
    b"CC" => (ValueType::String, "Reference name of the next hit"),
    b"CP" => (ValueType::Int32, "Leftmost position of the next hit"),
    b"SM" => (ValueType::Int32, "Template-independent mapping quality"),
    b"AM" => (ValueType::Int32, "Smaller single-end mapping quality"),
    b"MF" => (ValueType::Int32, "Obsolete mate flag"),
    b"X0" => (ValueType::Int32, "Number of best hits"),
    b"X1" => (ValueType::Int32, "Number of suboptimal hits found by BWA"),
    b"XG" => (ValueType::Int32, "Number of gap extensions"),
    b"XM" => (ValueType::Int32, "Number of mismatches in the alignment"),
    b"XO" => (ValueType::Int32, "Number of gap opens"),
    b"XT" => (ValueType::Char, "Type: Unique/Repeat/N/Mate-sw"),
}

fn lookup(key: [u8; 2]) -> Result<ValueType> {
    REGISTRY
        .get(&key)
        .map(|entry| entry.value_type)
        .ok_or(Error::UnknownTag { tag: key })
}

/// Returns the human-readable documentation for a registered tag, or `None`
/// if it is not registered.
pub fn tag_documentation(key: [u8; 2]) -> Option<&'static str> {
    REGISTRY.get(&key).map(|entry| entry.doc)
}

/// Encodes `value` for `key` into `out`, dispatching on the tag's declared
/// semantic type rather than on the runtime shape of `value`. An unknown
/// `key` is a hard error.
pub fn encode_tag(key: [u8; 2], value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let value_type = lookup(key)?;
    out.extend_from_slice(&key);
    crate::record::data::encode_value(value_type, value, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fixed_tag_has_documentation() {
        for tag in [
            "RG", "LB", "PU", "PG", "AS", "SQ", "MQ", "NM", "H0", "H1", "H2", "UQ", "PQ", "NH",
            "IH", "HI", "MD", "CS", "CQ", "CM", "GS", "GQ", "GC", "R2", "Q2", "S2", "CC", "CP",
            "SM", "AM", "MF", "X0", "X1", "XG", "XM", "XO", "XT",
        ] {
            let key = [tag.as_bytes()[0], tag.as_bytes()[1]];
            assert!(tag_documentation(key).is_some(), "missing doc for {tag}");
        }
    }

    #[test]
    fn test_unregistered_tag_has_no_documentation() {
        assert_eq!(tag_documentation(*b"ZZ"), None);
    }

    #[test]
    fn test_unknown_tag_encode_is_hard_error() {
        let mut out = Vec::new();
        assert!(encode_tag(*b"ZZ", &Value::Int(1), &mut out).is_err());
    }

    #[test]
    fn test_narrowest_integer_encoding() {
        let mut out = Vec::new();
        encode_tag(*b"X0", &Value::Int(200), &mut out).unwrap();
        assert_eq!(&out[..3], b"X0C");
        assert_eq!(out.len(), 4);

        out.clear();
        encode_tag(*b"X0", &Value::Int(-1), &mut out).unwrap();
        assert_eq!(&out[..3], b"X0c");
        assert_eq!(out.len(), 4);

        out.clear();
        encode_tag(*b"X0", &Value::Int(70_000), &mut out).unwrap();
        assert_eq!(&out[..3], b"X0I");
        assert_eq!(out.len(), 7);
    }
}
