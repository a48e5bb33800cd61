//! Decoded element values.

use std::fmt;

/// Literal shown for a missing value.
pub const NULL_STR: &str = "Null";

/// Literal shown for a value that could not be decoded.
pub const ERROR_STR: &str = "*ERROR*";

/// One decoded element read out of a [`DataBuffer`](super::DataBuffer).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    /// Signed integer of any width.
    Int(i128),
    /// Unsigned integer of any width (promoted from signed storage when needed).
    UInt(u128),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
    /// Text.
    Text(String),
    /// Raw bytes of a bitfield or opaque element.
    Bytes(Vec<u8>),
    /// Elements of an array or variable-length sequence.
    List(Vec<Value>),
    /// Members of a compound element.
    Record(Vec<Value>),
    /// The element could not be decoded.
    Error,
}

impl Value {
    /// Check if this is the error sentinel.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }

    /// Integer payload of this value, if it has one.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Int(v) => Some(v),
            Value::UInt(v) => i128::try_from(v).ok(),
            _ => None,
        }
    }
}

/// Uppercase hex digits of each byte, joined by `sep`.
pub(crate) fn join_hex_bytes(bytes: &[u8], sep: &str) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(sep)
}

/// Bit mask covering an integer of `size` bytes.
pub(crate) fn width_mask(size: usize) -> u128 {
    if size >= 16 {
        u128::MAX
    } else {
        (1u128 << (size * 8)) - 1
    }
}

/// Non-empty trimmed tokens of `text` split on any of `delimiters`.
pub(crate) fn split_tokens<'a>(text: &'a str, delimiters: &str) -> Vec<&'a str> {
    text.split(|c| delimiters.contains(c))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn join_values(f: &mut fmt::Formatter<'_>, values: &[Value], open: &str, close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", v)?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(NULL_STR),
            Value::Error => f.write_str(ERROR_STR),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{:?}", v),
            Value::Float64(v) => write!(f, "{:?}", v),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&join_hex_bytes(b, ":")),
            Value::List(items) => join_values(f, items, "[", "]"),
            Value::Record(items) => join_values(f, items, "{", "}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Null.to_string(), "Null");
        assert_eq!(Value::Error.to_string(), "*ERROR*");
        assert_eq!(Value::Float32(1.0).to_string(), "1.0");
        assert_eq!(Value::Bytes(vec![0x0a, 0xff]).to_string(), "0A:FF");
        let nested = Value::Record(vec![Value::Int(-3), Value::List(vec![Value::UInt(1), Value::UInt(2)])]);
        assert_eq!(nested.to_string(), "{-3, [1, 2]}");
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens("[1, 2,3 ]", ",[]"), vec!["1", "2", "3"]);
        assert_eq!(split_tokens("4 5\t6", " \t"), vec!["4", "5", "6"]);
        assert!(split_tokens("[]", ",[]").is_empty());
    }
}
