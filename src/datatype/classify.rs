//! Strategy classification shared by the provider, converter and validator
//! factories.

use super::Datatype;

/// Strategy class selected for a datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    /// Record of named members.
    Compound,
    /// Fixed-size array.
    Array,
    /// Variable-length sequence (not a variable-length string).
    VarLen,
    /// Fixed or variable-length string.
    String,
    /// Single character.
    Char,
    /// Integer or floating-point number.
    Numeric,
    /// Enumerated integer.
    Enum,
    /// Bitfield or opaque blob.
    Bitfield,
    /// Object, region or standard reference.
    Reference,
}

impl TypeClass {
    /// Classify a datatype. The first matching test wins.
    pub fn of(dtype: &Datatype) -> Self {
        if dtype.is_compound() {
            TypeClass::Compound
        } else if dtype.is_array() {
            TypeClass::Array
        } else if dtype.is_vlen() && !dtype.is_var_str() {
            TypeClass::VarLen
        } else if dtype.is_string() {
            TypeClass::String
        } else if dtype.is_char() {
            TypeClass::Char
        } else if dtype.is_integer() || dtype.is_float() {
            TypeClass::Numeric
        } else if dtype.is_enum() {
            TypeClass::Enum
        } else if dtype.is_bitfield() || dtype.is_opaque() {
            TypeClass::Bitfield
        } else {
            TypeClass::Reference
        }
    }

    /// Get display name.
    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Compound => "compound",
            TypeClass::Array => "array",
            TypeClass::VarLen => "vlen",
            TypeClass::String => "string",
            TypeClass::Char => "char",
            TypeClass::Numeric => "numeric",
            TypeClass::Enum => "enum",
            TypeClass::Bitfield => "bitfield",
            TypeClass::Reference => "reference",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_string_is_a_string_not_a_sequence() {
        assert_eq!(TypeClass::of(&Datatype::VarString), TypeClass::String);
        assert_eq!(
            TypeClass::of(&Datatype::vlen(Datatype::integer(4, true))),
            TypeClass::VarLen
        );
    }

    #[test]
    fn test_opaque_shares_bitfield_class() {
        assert_eq!(TypeClass::of(&Datatype::Opaque { size: 4 }), TypeClass::Bitfield);
        assert_eq!(TypeClass::of(&Datatype::float(8)), TypeClass::Numeric);
    }
}
