//! Datatype descriptors.

use std::collections::HashSet;

/// String padding used by fixed-length strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringPadding {
    /// Null terminated.
    #[default]
    NullTerminate,
    /// Null padded.
    NullPad,
    /// Space padded.
    SpacePad,
}

/// Kind of reference stored in a reference datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Object reference.
    Object,
    /// Dataset region reference.
    Region,
    /// Standard (opaque, self-describing) reference.
    Standard,
}

impl ReferenceKind {
    /// Payload width in bytes.
    pub fn size(self) -> usize {
        match self {
            ReferenceKind::Object => 8,
            ReferenceKind::Region => 12,
            ReferenceKind::Standard => 64,
        }
    }

    /// Short name used in datatype expressions.
    pub fn name(self) -> &'static str {
        match self {
            ReferenceKind::Object => "obj",
            ReferenceKind::Region => "region",
            ReferenceKind::Standard => "std",
        }
    }
}

/// A named member of a compound datatype.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundMember {
    /// Member name.
    pub name: String,
    /// Member datatype.
    pub datatype: Datatype,
}

impl CompoundMember {
    /// Create a new compound member.
    pub fn new(name: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

/// A name/value pair of an enumerated datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Symbolic name.
    pub name: String,
    /// Integer value.
    pub value: i128,
}

/// Descriptor of one element's shape and class.
///
/// Built once from the backing file's schema and immutable for the life of a
/// view. Array and variable-length descriptors always own their base.
#[derive(Debug, Clone, PartialEq)]
pub enum Datatype {
    /// Fixed-point integer of 1, 2, 4, 8 or 16 bytes.
    Integer { size: usize, signed: bool },
    /// Floating-point number.
    Float { size: usize },
    /// Single 8-bit character.
    Char { signed: bool },
    /// Fixed-length string.
    String { size: usize, padding: StringPadding },
    /// Variable-length string.
    VarString,
    /// Enumerated integer with a name table.
    Enum {
        base: Box<Datatype>,
        members: Vec<EnumMember>,
    },
    /// Bitfield of `size` bytes.
    Bitfield { size: usize },
    /// Opaque blob of `size` bytes.
    Opaque { size: usize },
    /// Object, region or standard reference.
    Reference { kind: ReferenceKind },
    /// Fixed-size array of `base`.
    Array { base: Box<Datatype>, dims: Vec<usize> },
    /// Variable-length sequence of `base`.
    VarLen { base: Box<Datatype> },
    /// Record of named members.
    Compound { members: Vec<CompoundMember> },
}

impl Datatype {
    /// Create an integer type.
    pub fn integer(size: usize, signed: bool) -> Self {
        Self::Integer { size, signed }
    }

    /// Create a floating-point type.
    pub fn float(size: usize) -> Self {
        Self::Float { size }
    }

    /// Create a null-terminated fixed-length string type.
    pub fn string(size: usize) -> Self {
        Self::String {
            size,
            padding: StringPadding::NullTerminate,
        }
    }

    /// Create a fixed-size array type.
    pub fn array(base: Datatype, dims: Vec<usize>) -> Self {
        Self::Array {
            base: Box::new(base),
            dims,
        }
    }

    /// Create a variable-length sequence type.
    pub fn vlen(base: Datatype) -> Self {
        Self::VarLen {
            base: Box::new(base),
        }
    }

    /// Create a compound type from `(name, type)` pairs.
    pub fn compound<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = (S, Datatype)>,
        S: Into<String>,
    {
        Self::Compound {
            members: members
                .into_iter()
                .map(|(name, dt)| CompoundMember::new(name, dt))
                .collect(),
        }
    }

    /// Create an enum type over an integer base.
    pub fn enumeration<I, S>(base: Datatype, members: I) -> Self
    where
        I: IntoIterator<Item = (S, i128)>,
        S: Into<String>,
    {
        Self::Enum {
            base: Box::new(base),
            members: members
                .into_iter()
                .map(|(name, value)| EnumMember {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            Datatype::Integer { size, .. }
            | Datatype::Float { size }
            | Datatype::String { size, .. }
            | Datatype::Bitfield { size }
            | Datatype::Opaque { size } => *size,
            Datatype::Char { .. } => 1,
            Datatype::VarString | Datatype::VarLen { .. } => 16,
            Datatype::Enum { base, .. } => base.size(),
            Datatype::Reference { kind } => kind.size(),
            Datatype::Array { base, dims } => base.size() * dims.iter().product::<usize>(),
            Datatype::Compound { members } => members.iter().map(|m| m.datatype.size()).sum(),
        }
    }

    /// Base descriptor of an array, variable-length or enum type.
    pub fn base(&self) -> Option<&Datatype> {
        match self {
            Datatype::Array { base, .. } | Datatype::VarLen { base } | Datatype::Enum { base, .. } => {
                Some(base)
            },
            _ => None,
        }
    }

    /// Compound members, if this is a compound type.
    pub fn members(&self) -> Option<&[CompoundMember]> {
        match self {
            Datatype::Compound { members } => Some(members),
            _ => None,
        }
    }

    /// Total element count of an array type, 1 for anything else.
    pub fn array_len(&self) -> usize {
        match self {
            Datatype::Array { dims, .. } => dims.iter().product(),
            _ => 1,
        }
    }

    /// Check if this is a compound type.
    pub fn is_compound(&self) -> bool {
        matches!(self, Datatype::Compound { .. })
    }

    /// Check if this is a fixed-size array type.
    pub fn is_array(&self) -> bool {
        matches!(self, Datatype::Array { .. })
    }

    /// Check if this is a variable-length type (strings included).
    pub fn is_vlen(&self) -> bool {
        matches!(self, Datatype::VarLen { .. } | Datatype::VarString)
    }

    /// Check if this is a variable-length string.
    pub fn is_var_str(&self) -> bool {
        matches!(self, Datatype::VarString)
    }

    /// Check if this is a string type (fixed or variable length).
    pub fn is_string(&self) -> bool {
        matches!(self, Datatype::String { .. } | Datatype::VarString)
    }

    /// Check if this is a single character type.
    pub fn is_char(&self) -> bool {
        matches!(self, Datatype::Char { .. })
    }

    /// Check if this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, Datatype::Integer { .. })
    }

    /// Check if this is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Datatype::Float { .. })
    }

    /// Check if this is an enumerated type.
    pub fn is_enum(&self) -> bool {
        matches!(self, Datatype::Enum { .. })
    }

    /// Check if this is a bitfield type.
    pub fn is_bitfield(&self) -> bool {
        matches!(self, Datatype::Bitfield { .. })
    }

    /// Check if this is an opaque type.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Datatype::Opaque { .. })
    }

    /// Check if this is a reference type.
    pub fn is_reference(&self) -> bool {
        matches!(self, Datatype::Reference { .. })
    }

    /// Check if values of this type are unsigned.
    pub fn is_unsigned(&self) -> bool {
        match self {
            Datatype::Integer { signed, .. } | Datatype::Char { signed } => !signed,
            Datatype::Enum { base, .. } => base.is_unsigned(),
            _ => false,
        }
    }

    /// Look up the symbolic name of an enum value.
    pub fn enum_name(&self, value: i128) -> Option<&str> {
        match self {
            Datatype::Enum { members, .. } => members
                .iter()
                .find(|m| m.value == value)
                .map(|m| m.name.as_str()),
            _ => None,
        }
    }

    /// The compound reached through this type's array chain, if any.
    ///
    /// `array<array<compound{..}>[2]>[3]` yields the compound and the total
    /// repetition count 6. Any other base in the chain, such as a
    /// variable-length sequence, ends the search.
    pub fn array_of_compound(&self) -> Option<(&[CompoundMember], usize)> {
        if !self.is_array() {
            return None;
        }
        let mut count = self.array_len();
        let mut base = self.base();
        while let Some(dt) = base {
            match dt {
                Datatype::Compound { members } => return Some((members, count)),
                Datatype::Array { .. } => count *= dt.array_len(),
                _ => return None,
            }
            base = dt.base();
        }
        None
    }

    /// Remove compound leaf members whose dotted path is not in `selected`.
    ///
    /// Nested compounds are always kept and filtered recursively; members of
    /// a compound wrapped in arrays are addressed through the array member's
    /// name (`arr.p`).
    pub fn select_members(&self, selected: &HashSet<String>) -> Datatype {
        self.select_under("", selected)
    }

    fn select_under(&self, prefix: &str, selected: &HashSet<String>) -> Datatype {
        match self {
            Datatype::Compound { members } => Datatype::Compound {
                members: members
                    .iter()
                    .filter_map(|m| {
                        let path = join_path(prefix, &m.name);
                        if m.datatype.is_compound() || m.datatype.array_of_compound().is_some() {
                            Some(CompoundMember::new(
                                m.name.clone(),
                                m.datatype.select_under(&path, selected),
                            ))
                        } else if selected.contains(&path) {
                            Some(m.clone())
                        } else {
                            None
                        }
                    })
                    .collect(),
            },
            Datatype::Array { base, dims } => Datatype::Array {
                base: Box::new(base.select_under(prefix, selected)),
                dims: dims.clone(),
            },
            other => other.clone(),
        }
    }

    /// One header per flattened table column.
    ///
    /// Compound members expand into `outer.inner`, arrays of compound repeat
    /// their members as `arr[i].member`. Non-compound types have a single
    /// unnamed column.
    pub fn column_names(&self) -> Vec<String> {
        self.columns().into_iter().map(|(name, _)| name).collect()
    }

    /// Header and leaf datatype of every flattened table column.
    pub fn columns(&self) -> Vec<(String, &Datatype)> {
        let mut columns = Vec::new();
        match self {
            Datatype::Compound { members } => push_member_columns(&mut columns, "", members),
            other => match other.array_of_compound() {
                Some((members, count)) => {
                    for i in 0..count {
                        push_member_columns(&mut columns, &format!("[{}]", i), members);
                    }
                },
                None => columns.push((String::new(), other)),
            },
        }
        columns
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn push_member_columns<'a>(
    columns: &mut Vec<(String, &'a Datatype)>,
    prefix: &str,
    members: &'a [CompoundMember],
) {
    for member in members {
        let path = join_path(prefix, &member.name);
        match &member.datatype {
            Datatype::Compound { members: inner } => push_member_columns(columns, &path, inner),
            dt => match dt.array_of_compound() {
                Some((inner, count)) => {
                    for i in 0..count {
                        push_member_columns(columns, &format!("{}[{}]", path, i), inner);
                    }
                },
                None => columns.push((path, dt)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Datatype {
        Datatype::compound([
            ("a", Datatype::integer(4, true)),
            (
                "b",
                Datatype::compound([("x", Datatype::integer(4, true)), ("y", Datatype::float(4))]),
            ),
            ("c", Datatype::integer(4, true)),
        ])
    }

    #[test]
    fn test_sizes() {
        assert_eq!(nested().size(), 16);
        assert_eq!(Datatype::array(Datatype::integer(2, false), vec![2, 3]).size(), 12);
        assert_eq!(Datatype::Reference { kind: ReferenceKind::Object }.size(), 8);
    }

    #[test]
    fn test_column_names_nested() {
        assert_eq!(nested().column_names(), vec!["a", "b.x", "b.y", "c"]);
        let dt = nested();
        let columns = dt.columns();
        assert_eq!(columns[2].1, &Datatype::float(4));
    }

    #[test]
    fn test_column_names_array_of_compound() {
        let pq = Datatype::compound([("p", Datatype::integer(4, true)), ("q", Datatype::integer(4, true))]);
        let dt = Datatype::compound([("id", Datatype::integer(1, false)), ("arr", Datatype::array(pq, vec![2]))]);
        assert_eq!(
            dt.column_names(),
            vec!["id", "arr[0].p", "arr[0].q", "arr[1].p", "arr[1].q"]
        );
    }

    #[test]
    fn test_select_members_keeps_nested_compounds() {
        let selected: HashSet<String> = ["a", "b.y"].iter().map(|s| s.to_string()).collect();
        let filtered = nested().select_members(&selected);
        assert_eq!(filtered.column_names(), vec!["a", "b.y"]);
    }

    #[test]
    fn test_array_of_compound_through_nested_arrays() {
        let inner = Datatype::compound([("p", Datatype::integer(4, true))]);
        let dt = Datatype::array(Datatype::array(inner, vec![2]), vec![3]);
        let (members, count) = dt.array_of_compound().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(count, 6);
    }

    #[test]
    fn test_enum_name_lookup() {
        let dt = Datatype::enumeration(Datatype::integer(1, false), [("RED", 0), ("GREEN", 1)]);
        assert_eq!(dt.enum_name(1), Some("GREEN"));
        assert_eq!(dt.enum_name(7), None);
        assert!(dt.is_unsigned());
    }
}
