//! Raw element buffers backing a table.

use super::Value;
use crate::datatype::Datatype;
use crate::error::{Result, TableError};

/// Flat store of one dataset frame.
///
/// Non-compound types use a flat primitive vector. Compound types are
/// columnar: one buffer per top-level member, each with one entry per row
/// (array-of-compound members hold `rows * n` entries per inner member).
/// Variable-length types keep one separately allocated buffer per row.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBuffer {
    /// 8-bit signed storage (also holds 8-bit unsigned bit patterns).
    Int8(Vec<i8>),
    /// 16-bit signed storage.
    Int16(Vec<i16>),
    /// 32-bit signed storage.
    Int32(Vec<i32>),
    /// 64-bit signed storage.
    Int64(Vec<i64>),
    /// 128-bit signed storage.
    Int128(Vec<i128>),
    /// 8-bit unsigned storage.
    UInt8(Vec<u8>),
    /// 16-bit unsigned storage.
    UInt16(Vec<u16>),
    /// 32-bit unsigned storage.
    UInt32(Vec<u32>),
    /// 64-bit unsigned storage.
    UInt64(Vec<u64>),
    /// 128-bit unsigned storage.
    UInt128(Vec<u128>),
    /// Single precision floats.
    Float32(Vec<f32>),
    /// Double precision floats.
    Float64(Vec<f64>),
    /// Fixed-width byte runs (strings, bitfields, opaque, references).
    Bytes(Vec<u8>),
    /// One string per element.
    Strings(Vec<String>),
    /// Whole dataset already decoded to one string.
    Text(String),
    /// One byte payload per element.
    ByteRows(Vec<Vec<u8>>),
    /// One buffer per compound member.
    Compound(Vec<DataBuffer>),
    /// One sequence per row of a variable-length type.
    Sequences(Vec<DataBuffer>),
}

macro_rules! read_slot {
    ($vec:expr, $index:expr, $variant:ident, $conv:ty) => {
        $vec.get($index)
            .map(|&v| Value::$variant(v as $conv))
            .ok_or(TableError::OutOfRange {
                index: $index,
                len: $vec.len(),
            })
    };
}

macro_rules! store_int {
    ($vec:expr, $index:expr, $value:expr, $signed:ty, $unsigned:ty) => {{
        let len = $vec.len();
        let converted = match *$value {
            Value::Int(v) => <$signed>::try_from(v)
                .map(|x| x as $signed)
                .map_err(|_| TableError::parse(v.to_string(), stringify!($signed)))?,
            Value::UInt(v) => <$unsigned>::try_from(v)
                .map(|x| x as $signed)
                .map_err(|_| TableError::parse(v.to_string(), stringify!($unsigned)))?,
            _ => return Err(TableError::buffer_shape("integer value", "non-integer value")),
        };
        let slot = $vec
            .get_mut($index)
            .ok_or(TableError::OutOfRange { index: $index, len })?;
        *slot = converted;
        Ok(())
    }};
}

macro_rules! store_float {
    ($vec:expr, $index:expr, $value:expr, $ty:ty) => {{
        let len = $vec.len();
        let converted = match *$value {
            Value::Float32(v) => v as $ty,
            Value::Float64(v) => v as $ty,
            Value::Int(v) => v as $ty,
            Value::UInt(v) => v as $ty,
            _ => return Err(TableError::buffer_shape("numeric value", "non-numeric value")),
        };
        let slot = $vec
            .get_mut($index)
            .ok_or(TableError::OutOfRange { index: $index, len })?;
        *slot = converted;
        Ok(())
    }};
}

impl DataBuffer {
    /// Create an empty buffer shaped for `dtype`.
    pub fn empty_for(dtype: &Datatype) -> DataBuffer {
        DataBuffer::filled_for(dtype, 0)
    }

    /// Create a buffer of `len` default elements shaped for `dtype`.
    pub fn filled_for(dtype: &Datatype, len: usize) -> DataBuffer {
        match dtype {
            Datatype::Integer { size, signed } => match (size, signed) {
                (1, true) => DataBuffer::Int8(vec![0; len]),
                (2, true) => DataBuffer::Int16(vec![0; len]),
                (4, true) => DataBuffer::Int32(vec![0; len]),
                (8, true) => DataBuffer::Int64(vec![0; len]),
                (1, false) => DataBuffer::UInt8(vec![0; len]),
                (2, false) => DataBuffer::UInt16(vec![0; len]),
                (4, false) => DataBuffer::UInt32(vec![0; len]),
                (8, false) => DataBuffer::UInt64(vec![0; len]),
                (_, true) => DataBuffer::Int128(vec![0; len]),
                (_, false) => DataBuffer::UInt128(vec![0; len]),
            },
            Datatype::Float { size } if *size <= 4 => DataBuffer::Float32(vec![0.0; len]),
            Datatype::Float { .. } => DataBuffer::Float64(vec![0.0; len]),
            Datatype::Char { signed: true } => DataBuffer::Int8(vec![0; len]),
            Datatype::Char { signed: false } => DataBuffer::UInt8(vec![0; len]),
            Datatype::Enum { base, .. } => DataBuffer::filled_for(base, len),
            Datatype::String { size, .. }
            | Datatype::Bitfield { size }
            | Datatype::Opaque { size } => DataBuffer::Bytes(vec![0; len * size]),
            Datatype::Reference { kind } => DataBuffer::Bytes(vec![0; len * kind.size()]),
            Datatype::VarString => DataBuffer::Strings(vec![String::new(); len]),
            Datatype::Array { base, dims } => {
                DataBuffer::filled_for(base, len * dims.iter().product::<usize>())
            },
            Datatype::VarLen { base } => {
                DataBuffer::Sequences(vec![DataBuffer::empty_for(base); len])
            },
            Datatype::Compound { members } => DataBuffer::Compound(
                members
                    .iter()
                    .map(|m| DataBuffer::filled_for(&m.datatype, len))
                    .collect(),
            ),
        }
    }

    /// Short name of the storage layout.
    pub fn kind(&self) -> &'static str {
        match self {
            DataBuffer::Int8(_) => "i8 buffer",
            DataBuffer::Int16(_) => "i16 buffer",
            DataBuffer::Int32(_) => "i32 buffer",
            DataBuffer::Int64(_) => "i64 buffer",
            DataBuffer::Int128(_) => "i128 buffer",
            DataBuffer::UInt8(_) => "u8 buffer",
            DataBuffer::UInt16(_) => "u16 buffer",
            DataBuffer::UInt32(_) => "u32 buffer",
            DataBuffer::UInt64(_) => "u64 buffer",
            DataBuffer::UInt128(_) => "u128 buffer",
            DataBuffer::Float32(_) => "f32 buffer",
            DataBuffer::Float64(_) => "f64 buffer",
            DataBuffer::Bytes(_) => "byte buffer",
            DataBuffer::Strings(_) => "string buffer",
            DataBuffer::Text(_) => "text",
            DataBuffer::ByteRows(_) => "byte rows",
            DataBuffer::Compound(_) => "compound buffer",
            DataBuffer::Sequences(_) => "sequence buffer",
        }
    }

    /// Number of stored entries (raw bytes for a byte buffer).
    pub fn len(&self) -> usize {
        match self {
            DataBuffer::Int8(v) => v.len(),
            DataBuffer::Int16(v) => v.len(),
            DataBuffer::Int32(v) => v.len(),
            DataBuffer::Int64(v) => v.len(),
            DataBuffer::Int128(v) => v.len(),
            DataBuffer::UInt8(v) => v.len(),
            DataBuffer::UInt16(v) => v.len(),
            DataBuffer::UInt32(v) => v.len(),
            DataBuffer::UInt64(v) => v.len(),
            DataBuffer::UInt128(v) => v.len(),
            DataBuffer::Float32(v) => v.len(),
            DataBuffer::Float64(v) => v.len(),
            DataBuffer::Bytes(v) => v.len(),
            DataBuffer::Strings(v) => v.len(),
            DataBuffer::Text(_) => 1,
            DataBuffer::ByteRows(v) => v.len(),
            DataBuffer::Compound(members) => members.first().map_or(0, DataBuffer::len),
            DataBuffer::Sequences(v) => v.len(),
        }
    }

    /// Check if the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the primitive entry at `index`.
    pub fn value_at(&self, index: usize) -> Result<Value> {
        match self {
            DataBuffer::Int8(v) => read_slot!(v, index, Int, i128),
            DataBuffer::Int16(v) => read_slot!(v, index, Int, i128),
            DataBuffer::Int32(v) => read_slot!(v, index, Int, i128),
            DataBuffer::Int64(v) => read_slot!(v, index, Int, i128),
            DataBuffer::Int128(v) => read_slot!(v, index, Int, i128),
            DataBuffer::UInt8(v) => read_slot!(v, index, UInt, u128),
            DataBuffer::UInt16(v) => read_slot!(v, index, UInt, u128),
            DataBuffer::UInt32(v) => read_slot!(v, index, UInt, u128),
            DataBuffer::UInt64(v) => read_slot!(v, index, UInt, u128),
            DataBuffer::UInt128(v) => read_slot!(v, index, UInt, u128),
            DataBuffer::Float32(v) => read_slot!(v, index, Float32, f32),
            DataBuffer::Float64(v) => read_slot!(v, index, Float64, f64),
            DataBuffer::Strings(v) => v
                .get(index)
                .map(|s| Value::Text(s.clone()))
                .ok_or(TableError::OutOfRange {
                    index,
                    len: v.len(),
                }),
            DataBuffer::ByteRows(v) => v
                .get(index)
                .map(|b| Value::Bytes(b.clone()))
                .ok_or(TableError::OutOfRange {
                    index,
                    len: v.len(),
                }),
            other => Err(TableError::buffer_shape("primitive buffer", other.kind())),
        }
    }

    /// Store a primitive value at `index`, converting it to the buffer's
    /// element type.
    ///
    /// Unsigned values written into signed storage keep their bit pattern.
    pub fn set_value(&mut self, index: usize, value: &Value) -> Result<()> {
        match self {
            DataBuffer::Int8(v) => store_int!(v, index, value, i8, u8),
            DataBuffer::Int16(v) => store_int!(v, index, value, i16, u16),
            DataBuffer::Int32(v) => store_int!(v, index, value, i32, u32),
            DataBuffer::Int64(v) => store_int!(v, index, value, i64, u64),
            DataBuffer::Int128(v) => store_int!(v, index, value, i128, u128),
            DataBuffer::UInt8(v) => store_int!(v, index, value, u8, u8),
            DataBuffer::UInt16(v) => store_int!(v, index, value, u16, u16),
            DataBuffer::UInt32(v) => store_int!(v, index, value, u32, u32),
            DataBuffer::UInt64(v) => store_int!(v, index, value, u64, u64),
            DataBuffer::UInt128(v) => store_int!(v, index, value, u128, u128),
            DataBuffer::Float32(v) => store_float!(v, index, value, f32),
            DataBuffer::Float64(v) => store_float!(v, index, value, f64),
            DataBuffer::Strings(v) => {
                let len = v.len();
                let slot = v.get_mut(index).ok_or(TableError::OutOfRange { index, len })?;
                *slot = match value {
                    Value::Text(s) => s.clone(),
                    other => other.to_string(),
                };
                Ok(())
            },
            other => Err(TableError::buffer_shape("primitive buffer", other.kind())),
        }
    }

    /// Parse `text` as the buffer's own element type and store it at `index`.
    pub fn parse_into(&mut self, index: usize, text: &str) -> Result<()> {
        let value = match self {
            DataBuffer::Int8(_)
            | DataBuffer::Int16(_)
            | DataBuffer::Int32(_)
            | DataBuffer::Int64(_)
            | DataBuffer::Int128(_) => {
                Value::Int(text.parse().map_err(|_| TableError::parse(text, "integer"))?)
            },
            DataBuffer::UInt8(_)
            | DataBuffer::UInt16(_)
            | DataBuffer::UInt32(_)
            | DataBuffer::UInt64(_)
            | DataBuffer::UInt128(_) => {
                Value::UInt(text.parse().map_err(|_| TableError::parse(text, "unsigned integer"))?)
            },
            DataBuffer::Float32(_) | DataBuffer::Float64(_) => {
                Value::Float64(text.parse().map_err(|_| TableError::parse(text, "float"))?)
            },
            DataBuffer::Strings(_) => Value::Text(text.to_string()),
            other => return Err(TableError::buffer_shape("primitive buffer", other.kind())),
        };
        self.set_value(index, &value)
    }

    /// Copy `width` bytes starting at element `index` of a byte buffer.
    pub fn byte_run(&self, index: usize, width: usize) -> Result<&[u8]> {
        match self {
            DataBuffer::Bytes(bytes) => {
                let start = index * width;
                bytes
                    .get(start..start + width)
                    .ok_or(TableError::OutOfRange {
                        index: start + width,
                        len: bytes.len(),
                    })
            },
            DataBuffer::ByteRows(rows) => rows
                .get(index)
                .map(Vec::as_slice)
                .ok_or(TableError::OutOfRange {
                    index,
                    len: rows.len(),
                }),
            other => Err(TableError::buffer_shape("byte buffer", other.kind())),
        }
    }

    /// Mutable view of the `width` bytes of element `index`.
    pub fn byte_run_mut(&mut self, index: usize, width: usize) -> Result<&mut [u8]> {
        match self {
            DataBuffer::Bytes(bytes) => {
                let start = index * width;
                let len = bytes.len();
                bytes
                    .get_mut(start..start + width)
                    .ok_or(TableError::OutOfRange {
                        index: start + width,
                        len,
                    })
            },
            DataBuffer::ByteRows(rows) => {
                let len = rows.len();
                rows.get_mut(index)
                    .map(Vec::as_mut_slice)
                    .ok_or(TableError::OutOfRange { index, len })
            },
            other => Err(TableError::buffer_shape("byte buffer", other.kind())),
        }
    }

    /// Buffer of compound member `index`.
    pub fn member(&self, index: usize) -> Result<&DataBuffer> {
        match self {
            DataBuffer::Compound(members) => members.get(index).ok_or(TableError::OutOfRange {
                index,
                len: members.len(),
            }),
            other => Err(TableError::buffer_shape("compound buffer", other.kind())),
        }
    }

    /// Mutable buffer of compound member `index`.
    pub fn member_mut(&mut self, index: usize) -> Result<&mut DataBuffer> {
        match self {
            DataBuffer::Compound(members) => {
                let len = members.len();
                members
                    .get_mut(index)
                    .ok_or(TableError::OutOfRange { index, len })
            },
            other => Err(TableError::buffer_shape("compound buffer", other.kind())),
        }
    }

    /// Sequence stored for row `index` of a variable-length buffer.
    pub fn sequence(&self, index: usize) -> Result<&DataBuffer> {
        match self {
            DataBuffer::Sequences(rows) => rows.get(index).ok_or(TableError::OutOfRange {
                index,
                len: rows.len(),
            }),
            other => Err(TableError::buffer_shape("sequence buffer", other.kind())),
        }
    }

    /// Replace the sequence stored for row `index`.
    pub fn replace_sequence(&mut self, index: usize, sequence: DataBuffer) -> Result<()> {
        match self {
            DataBuffer::Sequences(rows) => {
                let len = rows.len();
                let slot = rows.get_mut(index).ok_or(TableError::OutOfRange { index, len })?;
                *slot = sequence;
                Ok(())
            },
            other => Err(TableError::buffer_shape("sequence buffer", other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_value_keeps_bit_pattern_in_signed_storage() {
        let mut buf = DataBuffer::Int8(vec![0; 2]);
        buf.set_value(1, &Value::UInt(255)).unwrap();
        assert_eq!(buf, DataBuffer::Int8(vec![0, -1]));
        assert!(buf.set_value(0, &Value::UInt(256)).is_err());
        assert!(buf.set_value(0, &Value::Int(-129)).is_err());
    }

    #[test]
    fn test_out_of_range_read() {
        let buf = DataBuffer::Float64(vec![1.5]);
        assert_eq!(buf.value_at(0).unwrap(), Value::Float64(1.5));
        assert!(matches!(
            buf.value_at(3),
            Err(TableError::OutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_parse_into_native_type() {
        let mut buf = DataBuffer::UInt16(vec![0; 2]);
        buf.parse_into(1, "65535").unwrap();
        assert_eq!(buf, DataBuffer::UInt16(vec![0, 65535]));
        assert!(buf.parse_into(0, "-1").is_err());
        assert!(DataBuffer::Bytes(vec![0]).parse_into(0, "1").is_err());
    }

    #[test]
    fn test_byte_runs() {
        let mut buf = DataBuffer::Bytes(b"abcdef".to_vec());
        assert_eq!(buf.byte_run(1, 3).unwrap(), b"def");
        buf.byte_run_mut(0, 3).unwrap().copy_from_slice(b"xyz");
        assert_eq!(buf.byte_run(0, 3).unwrap(), b"xyz");
        assert!(buf.byte_run(2, 3).is_err());
    }

    #[test]
    fn test_empty_for_compound() {
        let dt: Datatype = "compound{a:u8,b:vlen<i32>,c:str[4]}".parse().unwrap();
        match DataBuffer::empty_for(&dt) {
            DataBuffer::Compound(members) => {
                assert_eq!(members[0], DataBuffer::UInt8(Vec::new()));
                assert_eq!(members[1], DataBuffer::Sequences(Vec::new()));
                assert_eq!(members[2], DataBuffer::Bytes(Vec::new()));
            },
            other => panic!("unexpected {:?}", other),
        }
    }
}
