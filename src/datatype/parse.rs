//! Compact text syntax for datatypes.
//!
//! ```text
//! i8 i16 i32 i64 i128 u8 .. u128 f16 f32 f64 f128 char uchar
//! str[8] str[8,nullpad] str[8,spacepad] vstr
//! enum<u8>{RED=0,GREEN=1} bitfield[2] opaque[4] ref:obj ref:region ref:std
//! array<T>[2,3] vlen<T> compound{name:T,...}
//! ```

use std::fmt;
use std::str::FromStr;

use super::{CompoundMember, Datatype, EnumMember, ReferenceKind, StringPadding};
use crate::error::{Result, TableError};

impl FromStr for Datatype {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser { src: s, pos: 0 };
        let dtype = parser.datatype()?;
        parser.skip_ws();
        if parser.pos < s.len() {
            return Err(TableError::type_expr(parser.pos, "trailing input"));
        }
        Ok(dtype)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(TableError::type_expr(self.pos, format!("expected '{}'", c)))
        }
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(TableError::type_expr(self.pos, "expected identifier"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn integer(&mut self) -> Result<i128> {
        self.skip_ws();
        let start = self.pos;
        let rest = self.rest();
        let sign = usize::from(rest.starts_with('-'));
        let digits = rest[sign..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len() - sign);
        let text = &rest[..sign + digits];
        self.pos += text.len();
        text.parse()
            .map_err(|_| TableError::type_expr(start, "expected integer"))
    }

    fn count(&mut self) -> Result<usize> {
        let start = self.pos;
        let value = self.integer()?;
        usize::try_from(value)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| TableError::type_expr(start, "expected positive size"))
    }

    fn bracketed_size(&mut self) -> Result<usize> {
        self.expect('[')?;
        let size = self.count()?;
        self.expect(']')?;
        Ok(size)
    }

    fn angled(&mut self) -> Result<Datatype> {
        self.expect('<')?;
        let inner = self.datatype()?;
        self.expect('>')?;
        Ok(inner)
    }

    fn datatype(&mut self) -> Result<Datatype> {
        let start = self.pos;
        let name = self.ident()?;
        let dtype = match name {
            "i8" | "i16" | "i32" | "i64" | "i128" => Datatype::integer(width(&name[1..]), true),
            "u8" | "u16" | "u32" | "u64" | "u128" => Datatype::integer(width(&name[1..]), false),
            "f16" | "f32" | "f64" | "f128" => Datatype::float(width(&name[1..])),
            "char" => Datatype::Char { signed: true },
            "uchar" => Datatype::Char { signed: false },
            "vstr" => Datatype::VarString,
            "str" => {
                self.expect('[')?;
                let size = self.count()?;
                let padding = if self.eat(',') {
                    match self.ident()? {
                        "nullterm" => StringPadding::NullTerminate,
                        "nullpad" => StringPadding::NullPad,
                        "spacepad" => StringPadding::SpacePad,
                        other => {
                            return Err(TableError::type_expr(
                                self.pos,
                                format!("unknown padding '{}'", other),
                            ))
                        },
                    }
                } else {
                    StringPadding::NullTerminate
                };
                self.expect(']')?;
                Datatype::String { size, padding }
            },
            "bitfield" => Datatype::Bitfield {
                size: self.bracketed_size()?,
            },
            "opaque" => Datatype::Opaque {
                size: self.bracketed_size()?,
            },
            "ref" => {
                self.expect(':')?;
                let kind = match self.ident()? {
                    "obj" => ReferenceKind::Object,
                    "region" => ReferenceKind::Region,
                    "std" => ReferenceKind::Standard,
                    other => {
                        return Err(TableError::type_expr(
                            self.pos,
                            format!("unknown reference kind '{}'", other),
                        ))
                    },
                };
                Datatype::Reference { kind }
            },
            "enum" => {
                let base = self.angled()?;
                if !base.is_integer() {
                    return Err(TableError::type_expr(start, "enum base must be an integer"));
                }
                self.expect('{')?;
                let mut members = Vec::new();
                loop {
                    let name = self.ident()?.to_string();
                    self.expect('=')?;
                    let value = self.integer()?;
                    members.push(EnumMember { name, value });
                    if !self.eat(',') {
                        break;
                    }
                }
                self.expect('}')?;
                Datatype::Enum {
                    base: Box::new(base),
                    members,
                }
            },
            "array" => {
                let base = self.angled()?;
                self.expect('[')?;
                let mut dims = vec![self.count()?];
                while self.eat(',') {
                    dims.push(self.count()?);
                }
                self.expect(']')?;
                Datatype::array(base, dims)
            },
            "vlen" => Datatype::vlen(self.angled()?),
            "compound" => {
                self.expect('{')?;
                let mut members = Vec::new();
                loop {
                    let name = self.ident()?.to_string();
                    self.expect(':')?;
                    members.push(CompoundMember::new(name, self.datatype()?));
                    if !self.eat(',') {
                        break;
                    }
                }
                self.expect('}')?;
                Datatype::Compound { members }
            },
            other => {
                return Err(TableError::type_expr(
                    start,
                    format!("unknown datatype '{}'", other),
                ))
            },
        };
        Ok(dtype)
    }
}

fn width(bits: &str) -> usize {
    bits.parse::<usize>().map(|b| b / 8).unwrap_or(0)
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::Integer { size, signed } => {
                write!(f, "{}{}", if *signed { 'i' } else { 'u' }, size * 8)
            },
            Datatype::Float { size } => write!(f, "f{}", size * 8),
            Datatype::Char { signed: true } => write!(f, "char"),
            Datatype::Char { signed: false } => write!(f, "uchar"),
            Datatype::String { size, padding } => match padding {
                StringPadding::NullTerminate => write!(f, "str[{}]", size),
                StringPadding::NullPad => write!(f, "str[{},nullpad]", size),
                StringPadding::SpacePad => write!(f, "str[{},spacepad]", size),
            },
            Datatype::VarString => write!(f, "vstr"),
            Datatype::Enum { base, members } => {
                write!(f, "enum<{}>{{", base)?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}={}", m.name, m.value)?;
                }
                write!(f, "}}")
            },
            Datatype::Bitfield { size } => write!(f, "bitfield[{}]", size),
            Datatype::Opaque { size } => write!(f, "opaque[{}]", size),
            Datatype::Reference { kind } => write!(f, "ref:{}", kind.name()),
            Datatype::Array { base, dims } => {
                let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "array<{}>[{}]", base, dims.join(","))
            },
            Datatype::VarLen { base } => write!(f, "vlen<{}>", base),
            Datatype::Compound { members } => {
                write!(f, "compound{{")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", m.name, m.datatype)?;
                }
                write!(f, "}}")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_expression() {
        let dt: Datatype = "compound{a:i32, b:compound{x:i32,y:f32}, c:array<u8>[2,3]}"
            .parse()
            .unwrap();
        let members = dt.members().unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(members[1].datatype.members().unwrap()[1].datatype, Datatype::float(4));
        assert_eq!(members[2].datatype.array_len(), 6);
    }

    #[test]
    fn test_display_is_parseable() {
        let text = "compound{id:u64,tag:enum<u8>{RED=0,GREEN=1},name:str[8,spacepad],r:vlen<ref:obj>}";
        let dt: Datatype = text.parse().unwrap();
        assert_eq!(dt.to_string(), text);
    }

    #[test]
    fn test_parse_errors_report_offset() {
        let err = "array<i32>[0]".parse::<Datatype>().unwrap_err();
        assert!(matches!(err, TableError::TypeExpr { offset: 11, .. }));

        let err = "enum<f32>{A=1}".parse::<Datatype>().unwrap_err();
        assert!(matches!(err, TableError::TypeExpr { offset: 0, .. }));

        assert!("i32 i32".parse::<Datatype>().is_err());
        assert!("ref:file".parse::<Datatype>().is_err());
    }
}
