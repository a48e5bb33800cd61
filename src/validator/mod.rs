//! Edit validators.
//!
//! A validator decides whether text typed into a cell can be stored in the
//! element type behind that cell. Validation never touches the buffer.

use std::num::IntErrorKind;

use crate::data::split_tokens;
use crate::datatype::{Datatype, StringPadding, TypeClass};
use crate::error::{Result, TableError};
use crate::index_map::IndexMaps;

const TOKEN_DELIMITERS: &str = " \t\n\r\x0c,[]";

/// Validator for one datatype, owning the validators of its base or member
/// types.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Accepts anything.
    Passthrough,
    /// Integer or float of `size` bytes.
    Numeric {
        size: usize,
        unsigned: bool,
        float: bool,
    },
    /// Fixed-width (`Some(width)`) or variable-length string.
    String {
        size: Option<usize>,
        padding: StringPadding,
    },
    /// Single character, checked as a one byte integer.
    Char { unsigned: bool },
    /// Enumeration, checked as its base integer.
    Enum { base: Box<Validator> },
    /// Bitfield, opaque or reference data, which are not edited as text.
    Opaque,
    /// Array or variable-length sequence, checked token by token.
    Sequence { base: Box<Validator> },
    /// Compound, one validator per top-level member.
    Compound {
        members: Vec<Validator>,
        maps: IndexMaps,
    },
}

type Check = std::result::Result<(), String>;

fn input_error(text: &str) -> String {
    format!("For input string: \"{}\"", text)
}

fn out_of_range(text: &str) -> String {
    format!("Value out of range. Value:\"{}\"", text)
}

fn negative_unsigned() -> String {
    "Invalid negative value for unsigned datatype".to_string()
}

/// Parse a signed integer of the narrowest type able to hold the width.
fn check_signed<T>(text: &str) -> Check
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    text.parse::<T>().map(|_| ()).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(text),
        _ => input_error(text),
    })
}

/// Parse an unsigned value as a wider signed type, then check its range.
fn check_unsigned<T>(text: &str, max: T) -> Check
where
    T: std::str::FromStr<Err = std::num::ParseIntError> + PartialOrd + Default,
{
    let value = text.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => out_of_range(text),
        IntErrorKind::NegOverflow => negative_unsigned(),
        _ => input_error(text),
    })?;
    if value < T::default() {
        return Err(negative_unsigned());
    }
    if value > max {
        return Err(out_of_range(text));
    }
    Ok(())
}

fn check_float<T: std::str::FromStr>(text: &str) -> Check {
    text.parse::<T>().map(|_| ()).map_err(|_| input_error(text))
}

fn check_u128(text: &str) -> Check {
    if let Some(digits) = text.strip_prefix('-') {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(input_error(text));
        }
        if digits.bytes().all(|b| b == b'0') {
            return Ok(());
        }
        return Err(negative_unsigned());
    }
    text.parse::<u128>().map(|_| ()).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => out_of_range(text),
        _ => input_error(text),
    })
}

fn check_number(text: &str, size: usize, unsigned: bool, float: bool) -> Check {
    match (size, float, unsigned) {
        (1, false, true) => check_unsigned::<i16>(text, 255),
        (1, false, false) => check_signed::<i8>(text),
        (2, false, true) => check_unsigned::<i32>(text, 65_535),
        (2, false, false) => check_signed::<i16>(text),
        (4, false, true) => check_unsigned::<i64>(text, 4_294_967_295),
        (4, false, false) => check_signed::<i32>(text),
        (8, false, true) => check_unsigned::<i128>(text, i128::from(u64::MAX)),
        (8, false, false) => check_signed::<i64>(text),
        (16, false, true) => check_u128(text),
        (16, false, false) => check_signed::<i128>(text),
        (2 | 4, true, _) => check_float::<f32>(text),
        (8 | 16, true, _) => check_float::<f64>(text),
        _ => Err(format!("No validation logic for numerical data of size {}", size)),
    }
}

impl Validator {
    /// Build the validator for `dtype`, or a pass-through validator when the
    /// datatype cannot be handled.
    pub fn for_datatype(dtype: &Datatype) -> Self {
        Self::try_for_datatype(dtype).unwrap_or_else(|e| {
            tracing::debug!(datatype = %dtype, error = %e, "validator falls back to pass-through");
            Validator::Passthrough
        })
    }

    fn try_for_datatype(dtype: &Datatype) -> Result<Self> {
        Ok(match TypeClass::of(dtype) {
            TypeClass::Compound => {
                let members = dtype
                    .members()
                    .ok_or_else(|| TableError::type_mismatch("compound validator", "compound"))?;
                Validator::Compound {
                    maps: IndexMaps::build(members)?,
                    members: members
                        .iter()
                        .map(|m| Self::for_datatype(&m.datatype))
                        .collect(),
                }
            },
            TypeClass::Array => {
                let base = match dtype.array_of_compound() {
                    Some((members, _)) => Datatype::Compound {
                        members: members.to_vec(),
                    },
                    None => dtype
                        .base()
                        .cloned()
                        .ok_or_else(|| TableError::type_mismatch("array validator", "array"))?,
                };
                Validator::Sequence {
                    base: Box::new(Self::for_datatype(&base)),
                }
            },
            TypeClass::VarLen => {
                let base = dtype
                    .base()
                    .ok_or_else(|| TableError::type_mismatch("vlen validator", "variable-length"))?;
                Validator::Sequence {
                    base: Box::new(Self::for_datatype(base)),
                }
            },
            TypeClass::String => match dtype {
                Datatype::String { size, padding } => Validator::String {
                    size: Some(*size),
                    padding: *padding,
                },
                _ => Validator::String {
                    size: None,
                    padding: StringPadding::NullTerminate,
                },
            },
            TypeClass::Char => Validator::Char {
                unsigned: dtype.is_unsigned(),
            },
            TypeClass::Numeric => Validator::Numeric {
                size: dtype.size(),
                unsigned: dtype.is_unsigned(),
                float: dtype.is_float(),
            },
            TypeClass::Enum => {
                let base = dtype
                    .base()
                    .filter(|b| b.is_integer())
                    .ok_or_else(|| TableError::type_mismatch("enum validator", "integer based"))?;
                Validator::Enum {
                    base: Box::new(Self::try_for_datatype(base)?),
                }
            },
            TypeClass::Bitfield | TypeClass::Reference => Validator::Opaque,
        })
    }

    /// Check `text` proposed for (`row`, `col`).
    ///
    /// `None` stands for a value that is not text and is always rejected.
    pub fn validate(&self, col: usize, row: usize, text: Option<&str>) -> Result<()> {
        let Some(text) = text else {
            return Err(TableError::validation(row, col, "null", "value is not text"));
        };
        self.check(col, text).map_err(|reason| {
            tracing::debug!(row, col, text, reason = %reason, "edit rejected");
            TableError::validation(row, col, text, reason)
        })
    }

    fn check(&self, col: usize, text: &str) -> Check {
        match self {
            Validator::Passthrough | Validator::Opaque => Ok(()),
            Validator::Numeric { size, unsigned, float } => check_number(text, *size, *unsigned, *float),
            Validator::Char { unsigned } => check_number(text, 1, *unsigned, false),
            Validator::Enum { base } => base.check(col, text),
            Validator::String { size: None, .. } => Ok(()),
            Validator::String {
                size: Some(size),
                padding,
            } => {
                let len = text.len();
                if len > *size {
                    let over = len - size;
                    return Err(format!(
                        "string size larger than datatype size by {} byte{}.",
                        over,
                        if over == 1 { "" } else { "s" }
                    ));
                }
                if len == *size {
                    tracing::debug!(?padding, "edit fills the whole string and replaces its pad character");
                }
                Ok(())
            },
            Validator::Sequence { base } => {
                for token in split_tokens(text, TOKEN_DELIMITERS) {
                    base.check(col, token)?;
                }
                Ok(())
            },
            Validator::Compound { members, maps } => {
                let col = col % maps.len();
                let index = maps.base_index(col).map_err(|e| e.to_string())?;
                let start = maps.group_start(col).map_err(|e| e.to_string())?;
                match members.get(index) {
                    Some(member) => member.check(col - start, text),
                    None => Err(TableError::UnmappedColumn(col).to_string()),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(expr: &str) -> Validator {
        Validator::for_datatype(&expr.parse().unwrap())
    }

    fn reason(v: &Validator, col: usize, text: &str) -> String {
        v.validate(col, 0, Some(text)).unwrap_err().reason()
    }

    #[test]
    fn test_u8_boundaries() {
        let v = validator("u8");
        assert!(v.validate(0, 0, Some("0")).is_ok());
        assert!(v.validate(0, 0, Some("255")).is_ok());
        assert_eq!(reason(&v, 0, "256"), "Value out of range. Value:\"256\"");
        assert_eq!(reason(&v, 0, "-1"), "Invalid negative value for unsigned datatype");
        assert_eq!(reason(&v, 0, "x"), "For input string: \"x\"");
    }

    #[test]
    fn test_signed_and_wide_widths() {
        let v = validator("i8");
        assert!(v.validate(0, 0, Some("-128")).is_ok());
        assert_eq!(reason(&v, 0, "128"), "Value out of range. Value:\"128\"");
        assert!(validator("u16").validate(0, 0, Some("65536")).is_err());
        assert!(validator("u32").validate(0, 0, Some("4294967295")).is_ok());
        assert!(validator("u64").validate(0, 0, Some("18446744073709551615")).is_ok());
        assert!(validator("u64").validate(0, 0, Some("18446744073709551616")).is_err());
        assert!(validator("i64").validate(0, 0, Some("-9223372036854775809")).is_err());
        assert_eq!(reason(&validator("u128"), 0, "-5"), "Invalid negative value for unsigned datatype");
        assert!(validator("f32").validate(0, 0, Some("1.5e3")).is_ok());
        assert!(validator("f64").validate(0, 0, Some("one")).is_err());
    }

    #[test]
    fn test_unknown_width_is_rejected() {
        let v = Validator::Numeric {
            size: 3,
            unsigned: false,
            float: false,
        };
        assert_eq!(reason(&v, 0, "1"), "No validation logic for numerical data of size 3");
    }

    #[test]
    fn test_null_input_rejected() {
        let err = validator("i32").validate(2, 1, None).unwrap_err();
        assert_eq!(err.to_string(), "Failed to update value at (1, 2) to 'null': value is not text");
    }

    #[test]
    fn test_fixed_strings() {
        let v = validator("str[4]");
        assert!(v.validate(0, 0, Some("abcd")).is_ok());
        assert_eq!(reason(&v, 0, "abcde"), "string size larger than datatype size by 1 byte.");
        assert_eq!(reason(&v, 0, "abcdef"), "string size larger than datatype size by 2 bytes.");
        assert!(validator("vstr").validate(0, 0, Some("any length at all")).is_ok());
    }

    #[test]
    fn test_sequences_check_every_token() {
        let v = validator("array<u8>[3]");
        assert!(v.validate(0, 0, Some("[1, 2, 3]")).is_ok());
        assert_eq!(reason(&v, 0, "[1, 300, 3]"), "Value out of range. Value:\"300\"");
        assert!(validator("vlen<i8>").validate(0, 0, Some("1 2\t-3")).is_ok());
    }

    #[test]
    fn test_compound_and_enum_delegate() {
        let v = validator("compound{a:u8,b:compound{x:i8,e:enum<u8>{A=1}},s:str[2]}");
        assert!(v.validate(0, 0, Some("200")).is_ok());
        assert!(v.validate(1, 0, Some("200")).is_err());
        assert!(v.validate(2, 0, Some("200")).is_ok());
        assert!(v.validate(2, 0, Some("A")).is_err());
        assert!(v.validate(3, 0, Some("abc")).is_err());
        assert!(v.validate(4, 0, Some("-1")).is_err());
    }

    #[test]
    fn test_opaque_classes_accept() {
        assert!(validator("bitfield[1]").validate(0, 0, Some("zz")).is_ok());
        assert!(validator("ref:obj").validate(0, 0, Some("anything")).is_ok());
    }
}
