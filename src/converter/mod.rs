//! Display converters.
//!
//! A converter turns the [`Value`] a provider read into the text shown in a
//! cell. The converter tree mirrors the provider tree, and every node carries
//! the same [`ConversionSettings`].

mod number_format;
mod presentation;

pub use number_format::NumberPattern;
pub use presentation::{NumberMode, Presentation};

use half::f16;

use crate::data::{join_hex_bytes, width_mask, Value, ERROR_STR, NULL_STR};
use crate::datatype::{Datatype, EnumMember, TypeClass};
use crate::error::{Result, TableError};
use crate::index_map::IndexMaps;

/// Rendering options shared by a whole converter tree.
#[derive(Debug, Clone, Default)]
pub struct ConversionSettings {
    /// Show numbers as hex at their byte width.
    pub hex: bool,
    /// Show numbers as binary at their byte width.
    pub binary: bool,
    /// Decimal or scientific pattern for numbers.
    pub pattern: Option<NumberPattern>,
    /// Show enum values by name.
    pub convert_enum: bool,
}

/// Table position of the cell being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellPosition {
    /// Table row.
    pub row: usize,
    /// Flattened column, relative to the converter receiving it.
    pub col: usize,
}

impl CellPosition {
    /// Create a new position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone)]
enum ConverterKind {
    Passthrough,
    Numeric { size: usize },
    Text,
    Char,
    Enum { members: Vec<EnumMember> },
    Bitfield { opaque: bool },
    Reference,
    Array { base: Box<DisplayConverter> },
    VarLen { base: Box<DisplayConverter> },
    Compound {
        members: Vec<DisplayConverter>,
        maps: IndexMaps,
    },
}

/// Converter for one datatype, owning the converters of its base or member
/// types.
#[derive(Debug, Clone)]
pub struct DisplayConverter {
    settings: ConversionSettings,
    kind: ConverterKind,
}

impl DisplayConverter {
    /// Build the converter for `dtype`, or a pass-through converter when
    /// the datatype cannot be handled.
    pub fn for_datatype(dtype: &Datatype) -> Self {
        let kind = Self::kind_for(dtype).unwrap_or_else(|e| {
            tracing::debug!(datatype = %dtype, error = %e, "converter falls back to pass-through");
            ConverterKind::Passthrough
        });
        Self {
            settings: ConversionSettings::default(),
            kind,
        }
    }

    fn kind_for(dtype: &Datatype) -> Result<ConverterKind> {
        Ok(match TypeClass::of(dtype) {
            TypeClass::Compound => {
                let members = dtype
                    .members()
                    .ok_or_else(|| TableError::type_mismatch("compound converter", "compound"))?;
                ConverterKind::Compound {
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
                        .ok_or_else(|| TableError::type_mismatch("array converter", "array"))?,
                };
                ConverterKind::Array {
                    base: Box::new(Self::for_datatype(&base)),
                }
            },
            TypeClass::VarLen => {
                let base = dtype
                    .base()
                    .ok_or_else(|| TableError::type_mismatch("vlen converter", "variable-length"))?;
                ConverterKind::VarLen {
                    base: Box::new(Self::for_datatype(base)),
                }
            },
            TypeClass::String => ConverterKind::Text,
            TypeClass::Char => ConverterKind::Char,
            TypeClass::Numeric => ConverterKind::Numeric { size: dtype.size() },
            TypeClass::Enum => match dtype {
                Datatype::Enum { base, members } if base.is_integer() => ConverterKind::Enum {
                    members: members.clone(),
                },
                _ => return Err(TableError::type_mismatch("enum converter", "integer based enum")),
            },
            TypeClass::Bitfield => ConverterKind::Bitfield {
                opaque: dtype.is_opaque(),
            },
            TypeClass::Reference => ConverterKind::Reference,
        })
    }

    /// Apply `settings` to this converter and every nested converter.
    pub fn apply(&mut self, settings: &ConversionSettings) {
        self.settings = settings.clone();
        match &mut self.kind {
            ConverterKind::Array { base } | ConverterKind::VarLen { base } => base.apply(settings),
            ConverterKind::Compound { members, .. } => {
                for member in members {
                    member.apply(settings);
                }
            },
            _ => {},
        }
    }

    /// Settings currently applied.
    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Check if this converter renders compound values.
    pub fn is_compound(&self) -> bool {
        matches!(self.kind, ConverterKind::Compound { .. })
    }

    fn is_reference(&self) -> bool {
        matches!(self.kind, ConverterKind::Reference)
    }

    /// Text shown for `value` at `pos`.
    ///
    /// Missing values read `Null` and values that cannot be rendered read
    /// `*ERROR*`; text is shown as it is.
    pub fn decode(&self, value: &Value, pos: CellPosition) -> String {
        match value {
            Value::Null => NULL_STR.to_string(),
            Value::Error => ERROR_STR.to_string(),
            Value::Text(text) => text.clone(),
            other => self.try_decode(other, pos).unwrap_or_else(|e| {
                tracing::debug!(row = pos.row, col = pos.col, error = %e, "cell conversion failed");
                ERROR_STR.to_string()
            }),
        }
    }

    fn try_decode(&self, value: &Value, pos: CellPosition) -> Result<String> {
        match &self.kind {
            ConverterKind::Passthrough | ConverterKind::Text | ConverterKind::Char => Ok(value.to_string()),
            ConverterKind::Numeric { size } => self.decode_number(value, *size),
            ConverterKind::Enum { members } => {
                if !self.settings.convert_enum {
                    return Ok(value.to_string());
                }
                let name = value
                    .as_i128()
                    .and_then(|v| members.iter().find(|m| m.value == v))
                    .map_or(NULL_STR, |m| m.name.as_str());
                Ok(name.to_string())
            },
            ConverterKind::Bitfield { opaque } => Ok(match value {
                Value::Bytes(bytes) => join_hex_bytes(bytes, if *opaque { " " } else { ":" }),
                other => other.to_string(),
            }),
            ConverterKind::Reference => Ok(match value {
                Value::List(items) => self.join(items, pos),
                other => other.to_string(),
            }),
            ConverterKind::Array { base } | ConverterKind::VarLen { base } => match value {
                Value::List(items) => {
                    let joined = base.join(items, pos);
                    if base.is_compound() || base.is_reference() {
                        Ok(joined)
                    } else {
                        Ok(format!("[{}]", joined))
                    }
                },
                other if base.is_compound() => Ok(base.decode(other, pos)),
                other => Err(TableError::buffer_shape("element list", value_kind(other))),
            },
            ConverterKind::Compound { members, maps } => match value {
                Value::Record(items) => {
                    let parts: Vec<String> = members
                        .iter()
                        .zip(items)
                        .map(|(member, item)| member.decode(item, pos))
                        .collect();
                    Ok(format!("{{{}}}", parts.join(", ")))
                },
                other => {
                    let col = pos.col % maps.len();
                    let member = members
                        .get(maps.base_index(col)?)
                        .ok_or(TableError::UnmappedColumn(col))?;
                    let inner = CellPosition::new(pos.row, col - maps.group_start(col)?);
                    Ok(member.decode(other, inner))
                },
            },
        }
    }

    fn join(&self, items: &[Value], pos: CellPosition) -> String {
        items
            .iter()
            .map(|item| self.decode(item, pos))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn decode_number(&self, value: &Value, size: usize) -> Result<String> {
        if self.settings.hex || self.settings.binary {
            let (bits, width) = raw_bits(value, size)?;
            return Ok(if self.settings.hex {
                format!("{:0width$X}", bits, width = width * 2)
            } else {
                (0..width)
                    .rev()
                    .map(|i| format!("{:08b}", (bits >> (i * 8)) & 0xff))
                    .collect::<Vec<_>>()
                    .join(" ")
            });
        }
        if let (Some(pattern), Some(x)) = (&self.settings.pattern, as_f64(value)) {
            return Ok(pattern.format(x));
        }
        Ok(value.to_string())
    }

    /// Text to hand to validation and storage for `text` typed at `pos`.
    ///
    /// A character column turns a typed character into its numeric code;
    /// every other column keeps the text.
    pub fn encode(&self, text: &str, pos: CellPosition) -> String {
        match &self.kind {
            ConverterKind::Char => {
                let trimmed = text.trim();
                if trimmed.parse::<i64>().is_ok() {
                    return trimmed.to_string();
                }
                trimmed
                    .chars()
                    .next()
                    .map_or_else(String::new, |c| (c as u32).to_string())
            },
            ConverterKind::Compound { members, maps } => {
                let col = pos.col % maps.len();
                match (maps.base_index(col), maps.group_start(col)) {
                    (Ok(index), Ok(start)) => members.get(index).map_or_else(
                        || text.to_string(),
                        |m| m.encode(text, CellPosition::new(pos.row, col - start)),
                    ),
                    _ => text.to_string(),
                }
            },
            _ => text.to_string(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Int(_) | Value::UInt(_) => "integer",
        Value::Float32(_) | Value::Float64(_) => "float",
        Value::Text(_) => "text",
        Value::Bytes(_) => "bytes",
        Value::List(_) => "list",
        Value::Record(_) => "record",
        Value::Error => "error",
    }
}

/// Bit pattern of a number and the byte width to render it at.
///
/// Floats use their IEEE representation at the datatype width. A 16-byte
/// float is held as f64 and renders those 8 bytes.
fn raw_bits(value: &Value, size: usize) -> Result<(u128, usize)> {
    Ok(match *value {
        Value::Int(v) => (v as u128 & width_mask(size), size),
        Value::UInt(v) => (v & width_mask(size), size),
        Value::Float32(v) if size == 2 => (u128::from(f16::from_f32(v).to_bits()), 2),
        Value::Float64(v) if size == 2 => (u128::from(f16::from_f64(v).to_bits()), 2),
        Value::Float64(v) if size == 4 => (u128::from((v as f32).to_bits()), 4),
        Value::Float32(v) => (u128::from(v.to_bits()), 4),
        Value::Float64(v) => (u128::from(v.to_bits()), 8),
        ref other => return Err(TableError::buffer_shape("numeric value", value_kind(other))),
    })
}

fn as_f64(value: &Value) -> Option<f64> {
    match *value {
        Value::Int(v) => Some(v as f64),
        Value::UInt(v) => Some(v as f64),
        Value::Float32(v) => Some(f64::from(v)),
        Value::Float64(v) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: CellPosition = CellPosition { row: 0, col: 0 };

    fn converter(expr: &str) -> DisplayConverter {
        DisplayConverter::for_datatype(&expr.parse().unwrap())
    }

    fn with(expr: &str, settings: ConversionSettings) -> DisplayConverter {
        let mut c = converter(expr);
        c.apply(&settings);
        c
    }

    fn hex() -> ConversionSettings {
        ConversionSettings {
            hex: true,
            ..ConversionSettings::default()
        }
    }

    #[test]
    fn test_sentinels_and_text() {
        let c = converter("i32");
        assert_eq!(c.decode(&Value::Null, AT), "Null");
        assert_eq!(c.decode(&Value::Error, AT), "*ERROR*");
        assert_eq!(c.decode(&Value::Text("as is".into()), AT), "as is");
        assert_eq!(with("i32", hex()).decode(&Value::Bytes(vec![1]), AT), "*ERROR*");
    }

    #[test]
    fn test_hex_and_binary_at_type_width() {
        assert_eq!(with("i8", hex()).decode(&Value::Int(-1), AT), "FF");
        assert_eq!(with("u16", hex()).decode(&Value::UInt(255), AT), "00FF");
        assert_eq!(
            with("u64", hex()).decode(&Value::UInt(u64::MAX as u128), AT),
            "FFFFFFFFFFFFFFFF"
        );
        assert_eq!(with("f32", hex()).decode(&Value::Float32(1.0), AT), "3F800000");
        assert_eq!(with("f16", hex()).decode(&Value::Float32(1.0), AT), "3C00");
        assert_eq!(with("f16", hex()).decode(&Value::Float32(-2.0), AT), "C000");
        assert_eq!(with("f128", hex()).decode(&Value::Float64(1.0), AT), "3FF0000000000000");
        let binary = ConversionSettings {
            binary: true,
            ..ConversionSettings::default()
        };
        assert_eq!(with("u16", binary).decode(&Value::UInt(258), AT), "00000001 00000010");
        assert_eq!(with("i32", hex()).decode(&Value::Text("x".into()), AT), "x");
    }

    #[test]
    fn test_number_pattern() {
        let settings = ConversionSettings {
            pattern: Some("###.##".parse().unwrap()),
            ..ConversionSettings::default()
        };
        assert_eq!(with("f64", settings).decode(&Value::Float64(3.14159), AT), "3.14");
        assert_eq!(converter("f64").decode(&Value::Float64(3.5), AT), "3.5");
    }

    #[test]
    fn test_enum_names() {
        let on = ConversionSettings {
            convert_enum: true,
            ..ConversionSettings::default()
        };
        let c = with("enum<u8>{RED=0,GREEN=1}", on);
        assert_eq!(c.decode(&Value::UInt(1), AT), "GREEN");
        assert_eq!(c.decode(&Value::UInt(7), AT), "Null");
        assert_eq!(converter("enum<u8>{RED=0}").decode(&Value::UInt(0), AT), "0");
    }

    #[test]
    fn test_bitfield_and_opaque() {
        let bytes = Value::Bytes(vec![0x0a, 0xbc]);
        assert_eq!(converter("bitfield[2]").decode(&bytes, AT), "0A:BC");
        assert_eq!(converter("opaque[2]").decode(&bytes, AT), "0A BC");
    }

    #[test]
    fn test_containers() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(converter("array<i8>[2]").decode(&list, AT), "[1, 2]");
        assert_eq!(converter("vlen<i8>").decode(&list, AT), "[1, 2]");

        let refs = Value::List(vec![Value::Text("obj 0x01".into()), Value::Text("NULL".into())]);
        assert_eq!(converter("vlen<ref:obj>").decode(&refs, AT), "obj 0x01, NULL");

        let records = Value::List(vec![
            Value::Record(vec![Value::Int(1), Value::Int(2)]),
            Value::Record(vec![Value::Int(3), Value::Int(4)]),
        ]);
        assert_eq!(
            converter("vlen<compound{p:i8,q:i8}>").decode(&records, AT),
            "{1, 2}, {3, 4}"
        );
    }

    #[test]
    fn test_compound_routes_by_column() {
        let on = ConversionSettings {
            convert_enum: true,
            ..ConversionSettings::default()
        };
        let c = with("compound{e:enum<i8>{A=1},b:compound{x:i8,y:f32}}", on);
        assert_eq!(c.decode(&Value::Int(1), CellPosition::new(0, 0)), "A");
        assert_eq!(c.decode(&Value::Int(1), CellPosition::new(0, 1)), "1");
        assert_eq!(c.decode(&Value::Int(1), CellPosition::new(0, 3)), "A");
    }

    #[test]
    fn test_settings_reach_nested_converters() {
        let mut c = converter("compound{a:u8,arr:array<compound{p:u16}>[2]}");
        c.apply(&hex());
        assert_eq!(c.decode(&Value::UInt(10), CellPosition::new(0, 2)), "000A");
        c.apply(&ConversionSettings::default());
        assert_eq!(c.decode(&Value::UInt(10), CellPosition::new(0, 2)), "10");
    }

    #[test]
    fn test_char_encode() {
        let c = converter("char");
        assert_eq!(c.encode("A", AT), "65");
        assert_eq!(c.encode("66", AT), "66");
        assert_eq!(converter("i32").encode("A", AT), "A");
        let nested = converter("compound{id:i32,c:uchar}");
        assert_eq!(nested.encode("a", CellPosition::new(0, 1)), "97");
    }
}
