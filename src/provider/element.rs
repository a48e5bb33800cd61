//! Element providers, one per datatype class.

use std::rc::Rc;

use super::Layout;
use crate::data::{
    is_null_reference, split_tokens, width_mask, DataBuffer, ReferenceDetail, ReferenceResolver, Value,
};
use crate::datatype::{Datatype, ReferenceKind, TypeClass};
use crate::error::{Result, TableError};
use crate::index_map::IndexMaps;

const ARRAY_DELIMITERS: &str = ",[]";

/// Reads and writes the elements of one datatype class inside a raw buffer.
///
/// Container variants own the providers of their base or member types.
#[derive(Debug, Clone)]
pub enum ElementProvider {
    /// Returns and stores buffer entries without interpretation.
    Passthrough,
    /// Integer or float of `size` bytes.
    Numeric {
        size: usize,
        unsigned: bool,
        float: bool,
    },
    /// Fixed-width string (`Some(width)`) or variable-length string.
    String { size: Option<usize> },
    /// Single character stored as a one byte integer.
    Char { unsigned: bool },
    /// Enumeration, stored as its base integer.
    Enum { size: usize, unsigned: bool },
    /// Bitfield or opaque run of `size` bytes.
    Bitfield { size: usize },
    /// Object, region or standard reference.
    Reference {
        kind: ReferenceKind,
        resolver: Rc<dyn ReferenceResolver>,
    },
    /// Fixed-size array of `len` base elements.
    Array {
        base: Box<ElementProvider>,
        len: usize,
    },
    /// Variable-length sequence, one buffer per row.
    VarLen {
        base: Box<ElementProvider>,
        base_type: Datatype,
    },
    /// Compound, one provider per top-level member.
    Compound {
        members: Vec<ElementProvider>,
        maps: IndexMaps,
    },
}

fn read_number(buf: &DataBuffer, index: usize, size: usize, unsigned: bool) -> Result<Value> {
    Ok(match buf.value_at(index)? {
        Value::Int(v) if unsigned => Value::UInt(v as u128 & width_mask(size)),
        other => other,
    })
}

fn parse_number(text: &str, size: usize, unsigned: bool, float: bool) -> Result<Value> {
    if float {
        return if size <= 4 {
            text.parse::<f32>()
                .map(Value::Float32)
                .map_err(|_| TableError::parse(text, "f32"))
        } else {
            text.parse::<f64>()
                .map(Value::Float64)
                .map_err(|_| TableError::parse(text, "f64"))
        };
    }
    if unsigned {
        let v: u128 = text
            .parse()
            .map_err(|_| TableError::parse(text, "unsigned integer"))?;
        if v > width_mask(size) {
            return Err(TableError::parse(text, "unsigned integer of the element width"));
        }
        return Ok(Value::UInt(v));
    }
    let v: i128 = text.parse().map_err(|_| TableError::parse(text, "integer"))?;
    if size < 16 {
        let max = (1i128 << (size * 8 - 1)) - 1;
        if v > max || v < -max - 1 {
            return Err(TableError::parse(text, "integer of the element width"));
        }
    }
    Ok(Value::Int(v))
}

fn decode_fixed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

fn parse_hex_bytes(text: &str, size: usize) -> Result<Vec<u8>> {
    let bytes = split_tokens(text, ": \t")
        .into_iter()
        .map(|t| u8::from_str_radix(t, 16).map_err(|_| TableError::parse(t, "hex byte")))
        .collect::<Result<Vec<u8>>>()?;
    if bytes.len() != size {
        return Err(TableError::parse(text, "hex bytes of the element width"));
    }
    Ok(bytes)
}

fn byte_elements(buf: &DataBuffer, size: usize) -> usize {
    match buf {
        DataBuffer::Bytes(bytes) => bytes.len() / size.max(1),
        other => other.len(),
    }
}

impl ElementProvider {
    /// Build the provider for `dtype`.
    ///
    /// A datatype the matching provider cannot handle degrades to
    /// [`ElementProvider::Passthrough`].
    pub fn for_datatype(dtype: &Datatype, resolver: &Rc<dyn ReferenceResolver>) -> Self {
        Self::try_for_datatype(dtype, resolver).unwrap_or_else(|e| {
            tracing::debug!(datatype = %dtype, error = %e, "provider falls back to pass-through");
            ElementProvider::Passthrough
        })
    }

    fn try_for_datatype(dtype: &Datatype, resolver: &Rc<dyn ReferenceResolver>) -> Result<Self> {
        let provider = match TypeClass::of(dtype) {
            TypeClass::Compound => {
                let members = dtype
                    .members()
                    .ok_or_else(|| TableError::type_mismatch("compound provider", "compound"))?;
                let maps = IndexMaps::build(members)?;
                ElementProvider::Compound {
                    members: members
                        .iter()
                        .map(|m| Self::for_datatype(&m.datatype, resolver))
                        .collect(),
                    maps,
                }
            },
            TypeClass::Array => {
                if let Some((members, count)) = dtype.array_of_compound() {
                    if count == 0 {
                        return Err(TableError::unsupported("array of zero elements"));
                    }
                    let compound = Datatype::Compound {
                        members: members.to_vec(),
                    };
                    ElementProvider::Array {
                        base: Box::new(Self::try_for_datatype(&compound, resolver)?),
                        len: count,
                    }
                } else {
                    let base = dtype
                        .base()
                        .ok_or_else(|| TableError::type_mismatch("array provider", "array"))?;
                    let len = dtype.array_len();
                    if len == 0 {
                        return Err(TableError::unsupported("array of zero elements"));
                    }
                    ElementProvider::Array {
                        base: Box::new(Self::for_datatype(base, resolver)),
                        len,
                    }
                }
            },
            TypeClass::VarLen => {
                let base = dtype
                    .base()
                    .ok_or_else(|| TableError::type_mismatch("vlen provider", "variable-length"))?;
                ElementProvider::VarLen {
                    base: Box::new(Self::for_datatype(base, resolver)),
                    base_type: base.clone(),
                }
            },
            TypeClass::String => match dtype {
                Datatype::String { size, .. } => ElementProvider::String { size: Some(*size) },
                _ => ElementProvider::String { size: None },
            },
            TypeClass::Char => ElementProvider::Char {
                unsigned: dtype.is_unsigned(),
            },
            TypeClass::Numeric => {
                let size = dtype.size();
                let float = dtype.is_float();
                let supported = if float {
                    matches!(size, 2 | 4 | 8 | 16)
                } else {
                    matches!(size, 1 | 2 | 4 | 8 | 16)
                };
                if !supported {
                    return Err(TableError::unsupported(format!("numeric element of {} bytes", size)));
                }
                ElementProvider::Numeric {
                    size,
                    unsigned: dtype.is_unsigned(),
                    float,
                }
            },
            TypeClass::Enum => {
                let base = dtype
                    .base()
                    .filter(|b| b.is_integer())
                    .ok_or_else(|| TableError::type_mismatch("enum provider", "integer based"))?;
                if !matches!(base.size(), 1 | 2 | 4 | 8 | 16) {
                    return Err(TableError::unsupported(format!("enum base of {} bytes", base.size())));
                }
                ElementProvider::Enum {
                    size: base.size(),
                    unsigned: base.is_unsigned(),
                }
            },
            TypeClass::Bitfield => ElementProvider::Bitfield { size: dtype.size() },
            TypeClass::Reference => match dtype {
                Datatype::Reference { kind } => ElementProvider::Reference {
                    kind: *kind,
                    resolver: Rc::clone(resolver),
                },
                _ => return Err(TableError::type_mismatch("reference provider", "reference")),
            },
        };
        Ok(provider)
    }

    /// Check if this provider handles a single element without delegation.
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            ElementProvider::Array { .. } | ElementProvider::VarLen { .. } | ElementProvider::Compound { .. }
        )
    }

    /// Check if this is a compound provider.
    pub fn is_compound(&self) -> bool {
        matches!(self, ElementProvider::Compound { .. })
    }

    /// Flattened columns covered by one element.
    pub fn column_span(&self) -> usize {
        match self {
            ElementProvider::Compound { maps, .. } => maps.len(),
            ElementProvider::Array { base, len } if base.is_compound() => base.column_span() * len,
            _ => 1,
        }
    }

    /// Number of elements of this type held in `buf`.
    pub fn element_count(&self, buf: &DataBuffer) -> usize {
        match self {
            ElementProvider::String { size: Some(size) } | ElementProvider::Bitfield { size } => {
                byte_elements(buf, *size)
            },
            ElementProvider::Reference { kind, .. } => byte_elements(buf, kind.size()),
            ElementProvider::Array { base, len } => base.element_count(buf) / len,
            ElementProvider::Compound { members, .. } => match (members.first(), buf.member(0)) {
                (Some(member), Ok(first)) => member.element_count(first),
                _ => 0,
            },
            _ => buf.len(),
        }
    }

    /// Read the leaf element at buffer `index`.
    ///
    /// Containers need a column to resolve a member and are rejected.
    pub fn get_at(&self, buf: &DataBuffer, index: usize) -> Result<Value> {
        match self {
            ElementProvider::Passthrough => buf.value_at(index),
            ElementProvider::Numeric { size, unsigned, .. } | ElementProvider::Enum { size, unsigned } => {
                read_number(buf, index, *size, *unsigned)
            },
            ElementProvider::Char { unsigned } => read_number(buf, index, 1, *unsigned),
            ElementProvider::String { size: Some(size) } => match buf {
                DataBuffer::Strings(_) => buf.value_at(index),
                _ => Ok(Value::Text(decode_fixed_string(buf.byte_run(index, *size)?))),
            },
            ElementProvider::String { size: None } => buf.value_at(index),
            ElementProvider::Bitfield { size } => Ok(Value::Bytes(buf.byte_run(index, *size)?.to_vec())),
            ElementProvider::Reference { kind, resolver } => {
                let payload = buf.byte_run(index, kind.size())?;
                if is_null_reference(payload) {
                    return Ok(Value::Text("NULL".to_string()));
                }
                let detail = match kind {
                    ReferenceKind::Object => ReferenceDetail::Identifier,
                    ReferenceKind::Region | ReferenceKind::Standard => ReferenceDetail::Full,
                };
                resolver
                    .describe(*kind, payload, detail)
                    .map(Value::Text)
                    .map_err(|e| TableError::Reference(e.to_string()))
            },
            ElementProvider::Array { .. } | ElementProvider::VarLen { .. } | ElementProvider::Compound { .. } => {
                Err(TableError::unsupported(
                    "container elements cannot be read by a single buffer index",
                ))
            },
        }
    }

    /// Read the complete element at element `index`: arrays and sequences
    /// as lists, compounds as records.
    pub fn get_whole(&self, buf: &DataBuffer, index: usize) -> Result<Value> {
        match self {
            ElementProvider::Array { base, len } => (0..*len)
                .map(|i| base.get_whole(buf, index * len + i))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            ElementProvider::VarLen { base, .. } => {
                let sequence = buf.sequence(index)?;
                (0..base.element_count(sequence))
                    .map(|i| base.get_whole(sequence, i))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List)
            },
            ElementProvider::Compound { members, .. } => members
                .iter()
                .enumerate()
                .map(|(i, member)| member.get_whole(buf.member(i)?, index))
                .collect::<Result<Vec<_>>>()
                .map(Value::Record),
            leaf => leaf.get_at(buf, index),
        }
    }

    /// Read element `row` as seen from flattened column `col` of this type.
    pub fn get_in(&self, buf: &DataBuffer, col: usize, row: usize) -> Result<Value> {
        match self {
            ElementProvider::Compound { .. } => self.get_field(buf, col, row),
            ElementProvider::Array { base, len } if base.is_compound() => {
                let inner = base.column_span();
                base.get_field(buf, col % inner, row * len + col / inner)
            },
            _ => self.get_whole(buf, row),
        }
    }

    fn get_field(&self, buf: &DataBuffer, field: usize, row: usize) -> Result<Value> {
        let ElementProvider::Compound { members, maps } = self else {
            return Err(TableError::type_mismatch("field access", "compound"));
        };
        let index = maps.base_index(field)?;
        let member = members.get(index).ok_or(TableError::UnmappedColumn(field))?;
        let member_buf = buf.member(index)?;
        match member {
            ElementProvider::Compound { .. } => member.get_field(member_buf, field - maps.group_start(field)?, row),
            ElementProvider::Array { .. } | ElementProvider::VarLen { .. } => {
                member.get_in(member_buf, field - maps.member_start(field)?, row)
            },
            leaf => leaf.get_at(member_buf, row),
        }
    }

    /// Read the value shown at table position (`row`, `col`).
    pub fn get_cell(&self, layout: &Layout, buf: &DataBuffer, row: usize, col: usize) -> Result<Value> {
        if let (ElementProvider::Char { .. }, DataBuffer::Text(text)) = (self, buf) {
            return Ok(Value::Text(text.clone()));
        }
        match self {
            ElementProvider::Compound { maps, .. } => {
                let n = maps.len();
                self.get_field(buf, col % n, row * layout.cols + col / n)
            },
            ElementProvider::Array { base, len } if base.is_compound() => {
                let inner = base.column_span();
                base.get_field(buf, col % inner, row * len * layout.cols + col / inner)
            },
            _ => self.get_whole(buf, layout.buffer_index(row, col)),
        }
    }

    /// Parse `text` into the value a leaf stores.
    pub fn encode(&self, text: &str) -> Result<Value> {
        match self {
            ElementProvider::Passthrough | ElementProvider::String { .. } => Ok(Value::Text(text.to_string())),
            ElementProvider::Numeric { size, unsigned, float } => parse_number(text, *size, *unsigned, *float),
            ElementProvider::Enum { size, unsigned } => parse_number(text, *size, *unsigned, false),
            ElementProvider::Char { unsigned } => parse_number(text, 1, *unsigned, false),
            ElementProvider::Bitfield { size } => parse_hex_bytes(text, *size).map(Value::Bytes),
            ElementProvider::Reference { .. } => Err(TableError::unsupported("references are not editable")),
            _ => Err(TableError::unsupported("container elements are encoded per leaf")),
        }
    }

    /// Store an encoded leaf value at buffer `index`.
    pub fn store(&self, buf: &mut DataBuffer, index: usize, value: &Value) -> Result<()> {
        match (self, value) {
            (ElementProvider::Passthrough, Value::Text(text)) => buf.parse_into(index, text),
            (ElementProvider::String { size: Some(size) }, Value::Text(text))
                if !matches!(buf, DataBuffer::Strings(_)) =>
            {
                let slot = buf.byte_run_mut(index, *size)?;
                let bytes = text.as_bytes();
                let n = bytes.len().min(slot.len());
                slot[..n].copy_from_slice(&bytes[..n]);
                slot[n..].fill(b' ');
                Ok(())
            },
            (ElementProvider::Bitfield { size }, Value::Bytes(bytes)) => {
                let slot = buf.byte_run_mut(index, *size)?;
                if slot.len() != bytes.len() {
                    return Err(TableError::buffer_shape("byte run of the element width", "byte row"));
                }
                slot.copy_from_slice(bytes);
                Ok(())
            },
            (leaf, value) if leaf.is_leaf() => buf.set_value(index, value),
            _ => Err(TableError::unsupported("container elements are stored per leaf")),
        }
    }

    /// Innermost provider of a chain of arrays and its element count per row.
    fn leaf_run(&self) -> (&ElementProvider, usize) {
        match self {
            ElementProvider::Array { base, len } => {
                let (leaf, inner) = base.leaf_run();
                (leaf, len * inner)
            },
            other => (other, 1),
        }
    }

    /// Write the leaf element at buffer `index` from `text`.
    pub fn set_at(&self, buf: &mut DataBuffer, index: usize, text: &str) -> Result<()> {
        let value = self.encode(text)?;
        self.store(buf, index, &value)
    }

    /// Replace element `row` from `text`, as seen from flattened column
    /// `col` of this type.
    ///
    /// Arrays take one token per element, separated by commas or brackets,
    /// and sequences are rebuilt from however many tokens are given. Every
    /// token is encoded before the buffer is touched.
    pub fn set_in(&self, buf: &mut DataBuffer, col: usize, row: usize, text: &str) -> Result<()> {
        match self {
            ElementProvider::Compound { .. } => self.set_field(buf, col, row, text),
            ElementProvider::Array { base, len } if base.is_compound() => {
                let inner = base.column_span();
                base.set_field(buf, col % inner, row * len + col / inner, text)
            },
            ElementProvider::Array { .. } => {
                let (leaf, total) = self.leaf_run();
                if !leaf.is_leaf() {
                    return Err(TableError::unsupported("arrays of sequences are not editable"));
                }
                let tokens = split_tokens(text, ARRAY_DELIMITERS);
                if tokens.len() < total {
                    return Err(TableError::parse(text, "array with one token per element"));
                }
                let values = tokens[..total]
                    .iter()
                    .map(|t| leaf.encode(t))
                    .collect::<Result<Vec<_>>>()?;
                let first = row * total;
                let available = leaf.element_count(buf);
                if first + total > available {
                    return Err(TableError::OutOfRange {
                        index: first + total,
                        len: available,
                    });
                }
                for (i, value) in values.iter().enumerate() {
                    leaf.store(buf, first + i, value)?;
                }
                Ok(())
            },
            ElementProvider::VarLen { base, base_type } => {
                if !base.is_leaf() {
                    return Err(TableError::unsupported(
                        "sequences of compound or array elements are not editable",
                    ));
                }
                let values = split_tokens(text, ARRAY_DELIMITERS)
                    .into_iter()
                    .map(|t| base.encode(t))
                    .collect::<Result<Vec<_>>>()?;
                let mut sequence = DataBuffer::filled_for(base_type, values.len());
                for (i, value) in values.iter().enumerate() {
                    base.store(&mut sequence, i, value)?;
                }
                buf.replace_sequence(row, sequence)
            },
            leaf => leaf.set_at(buf, row, text),
        }
    }

    fn set_field(&self, buf: &mut DataBuffer, field: usize, row: usize, text: &str) -> Result<()> {
        let ElementProvider::Compound { members, maps } = self else {
            return Err(TableError::type_mismatch("field access", "compound"));
        };
        let index = maps.base_index(field)?;
        let member = members.get(index).ok_or(TableError::UnmappedColumn(field))?;
        let member_buf = buf.member_mut(index)?;
        match member {
            ElementProvider::Compound { .. } => {
                member.set_field(member_buf, field - maps.group_start(field)?, row, text)
            },
            ElementProvider::Array { .. } | ElementProvider::VarLen { .. } => {
                member.set_in(member_buf, field - maps.member_start(field)?, row, text)
            },
            leaf => leaf.set_at(member_buf, row, text),
        }
    }

    /// Write the value shown at table position (`row`, `col`) from `text`.
    pub fn set_cell(&self, layout: &Layout, buf: &mut DataBuffer, row: usize, col: usize, text: &str) -> Result<()> {
        match self {
            ElementProvider::Compound { maps, .. } => {
                let n = maps.len();
                self.set_field(buf, col % n, row * layout.cols + col / n, text)
            },
            ElementProvider::Array { base, len } if base.is_compound() => {
                let inner = base.column_span();
                base.set_field(buf, col % inner, row * len * layout.cols + col / inner, text)
            },
            _ => self.set_in(buf, col, layout.buffer_index(row, col), text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawReferenceResolver;

    fn build(expr: &str) -> ElementProvider {
        let resolver: Rc<dyn ReferenceResolver> = Rc::new(RawReferenceResolver);
        ElementProvider::for_datatype(&expr.parse().unwrap(), &resolver)
    }

    #[test]
    fn test_factory_dispatch() {
        assert!(matches!(build("u64"), ElementProvider::Numeric { size: 8, unsigned: true, float: false }));
        assert!(matches!(build("vstr"), ElementProvider::String { size: None }));
        assert!(matches!(build("vlen<i8>"), ElementProvider::VarLen { .. }));
        assert!(matches!(build("opaque[3]"), ElementProvider::Bitfield { size: 3 }));
        assert!(matches!(build("array<array<compound{p:i8}>[2]>[3]"), ElementProvider::Array { len: 6, .. }));
        match build("array<vlen<compound{p:i8,q:i8}>>[2]") {
            ElementProvider::Array { base, len: 2 } => assert!(matches!(*base, ElementProvider::VarLen { .. })),
            other => panic!("unexpected provider {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_width_degrades_to_passthrough() {
        let resolver: Rc<dyn ReferenceResolver> = Rc::new(RawReferenceResolver);
        let odd = Datatype::integer(3, true);
        assert!(matches!(ElementProvider::for_datatype(&odd, &resolver), ElementProvider::Passthrough));
        for size in [0, 3] {
            let odd_enum = Datatype::enumeration(Datatype::integer(size, false), [("A", 0)]);
            assert!(matches!(ElementProvider::for_datatype(&odd_enum, &resolver), ElementProvider::Passthrough));
        }
        let nested_empty = Datatype::compound([("c", Datatype::Compound { members: Vec::new() })]);
        assert!(matches!(
            ElementProvider::for_datatype(&nested_empty, &resolver),
            ElementProvider::Passthrough
        ));
    }

    #[test]
    fn test_unsigned_promotion_from_signed_storage() {
        let p = build("u64");
        let buf = DataBuffer::Int64(vec![-1]);
        assert_eq!(p.get_at(&buf, 0).unwrap(), Value::UInt(u64::MAX as u128));
        let p = build("u8");
        assert_eq!(p.get_at(&DataBuffer::Int8(vec![-2]), 0).unwrap(), Value::UInt(254));
    }

    #[test]
    fn test_fixed_string_decode_and_pad() {
        let p = build("str[4]");
        let mut buf = DataBuffer::Bytes(b"ab\0\0cd  ".to_vec());
        assert_eq!(p.get_at(&buf, 0).unwrap(), Value::Text("ab".into()));
        assert_eq!(p.get_at(&buf, 1).unwrap(), Value::Text("cd".into()));
        p.set_at(&mut buf, 0, "xyz").unwrap();
        assert_eq!(buf.byte_run(0, 4).unwrap(), b"xyz ");
        p.set_at(&mut buf, 1, "toolong").unwrap();
        assert_eq!(buf.byte_run(1, 4).unwrap(), b"tool");
    }

    #[test]
    fn test_array_reads_and_token_writes() {
        let p = build("array<i16>[3]");
        let mut buf = DataBuffer::Int16(vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(p.get_whole(&buf, 1).unwrap().to_string(), "[4, 5, 6]");
        p.set_in(&mut buf, 0, 0, "[7, 8, 9]").unwrap();
        assert_eq!(buf, DataBuffer::Int16(vec![7, 8, 9, 4, 5, 6]));
        assert!(p.set_in(&mut buf, 0, 1, "1,2").is_err());
        assert!(p.set_in(&mut buf, 0, 1, "1,x,3").is_err());
        assert_eq!(buf, DataBuffer::Int16(vec![7, 8, 9, 4, 5, 6]));
    }

    #[test]
    fn test_vlen_write_replaces_row() {
        let p = build("vlen<u8>");
        let mut buf = DataBuffer::Sequences(vec![DataBuffer::UInt8(vec![1]), DataBuffer::UInt8(vec![2, 3])]);
        p.set_in(&mut buf, 0, 0, "[4, 5, 6]").unwrap();
        assert_eq!(buf.sequence(0).unwrap(), &DataBuffer::UInt8(vec![4, 5, 6]));
        assert_eq!(p.get_whole(&buf, 1).unwrap().to_string(), "[2, 3]");
    }

    #[test]
    fn test_nested_compound_field_access() {
        let p = build("compound{a:i32,b:compound{x:i32,y:f32},c:i32}");
        let mut buf = DataBuffer::Compound(vec![
            DataBuffer::Int32(vec![1]),
            DataBuffer::Compound(vec![DataBuffer::Int32(vec![2]), DataBuffer::Float32(vec![0.5])]),
            DataBuffer::Int32(vec![3]),
        ]);
        let layout = Layout::new(&crate::data::Selection::full(&[1]), false);
        let row: Vec<String> = (0..4)
            .map(|c| p.get_cell(&layout, &buf, 0, c).unwrap().to_string())
            .collect();
        assert_eq!(row, ["1", "2", "0.5", "3"]);
        p.set_cell(&layout, &mut buf, 0, 2, "2.25").unwrap();
        assert_eq!(p.get_cell(&layout, &buf, 0, 2).unwrap(), Value::Float32(2.25));
        assert!(p.get_at(&buf, 0).is_err());
    }

    #[test]
    fn test_array_of_compound_member() {
        let p = build("compound{id:u8,arr:array<compound{p:i32,q:i32}>[2]}");
        let buf = DataBuffer::Compound(vec![
            DataBuffer::UInt8(vec![9]),
            DataBuffer::Compound(vec![DataBuffer::Int32(vec![10, 11]), DataBuffer::Int32(vec![20, 21])]),
        ]);
        let layout = Layout::new(&crate::data::Selection::full(&[1]), false);
        let row: Vec<String> = (0..5)
            .map(|c| p.get_cell(&layout, &buf, 0, c).unwrap().to_string())
            .collect();
        assert_eq!(row, ["9", "10", "20", "11", "21"]);
    }

    #[test]
    fn test_references() {
        let p = build("ref:obj");
        let buf = DataBuffer::Bytes(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x2a]);
        assert_eq!(p.get_at(&buf, 0).unwrap(), Value::Text("NULL".into()));
        assert_eq!(p.get_at(&buf, 1).unwrap(), Value::Text("obj 0x000000000000002A".into()));
    }

    #[test]
    fn test_bitfield_hex_write() {
        let p = build("bitfield[2]");
        let mut buf = DataBuffer::Bytes(vec![0; 2]);
        p.set_at(&mut buf, 0, "0A:ff").unwrap();
        assert_eq!(p.get_at(&buf, 0).unwrap(), Value::Bytes(vec![0x0a, 0xff]));
        assert!(p.set_at(&mut buf, 0, "01").is_err());
    }
}
