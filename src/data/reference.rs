//! Resolution of object, region and standard references.

use super::value::join_hex_bytes;
use crate::datatype::ReferenceKind;
use crate::error::Result;

/// How much of a reference target to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceDetail {
    /// Only the identifier of the target object.
    Identifier,
    /// The target plus any selected region.
    Full,
}

/// Turns a reference payload into a description of its target.
///
/// Implemented by the file layer that owns the referenced objects.
pub trait ReferenceResolver: std::fmt::Debug {
    /// Describe the target of `payload`.
    fn describe(&self, kind: ReferenceKind, payload: &[u8], detail: ReferenceDetail) -> Result<String>;
}

/// Resolver that shows the payload itself, for sessions without a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawReferenceResolver;

impl ReferenceResolver for RawReferenceResolver {
    fn describe(&self, kind: ReferenceKind, payload: &[u8], detail: ReferenceDetail) -> Result<String> {
        let hex = join_hex_bytes(payload, "");
        Ok(match detail {
            ReferenceDetail::Identifier => format!("{} 0x{}", kind.name(), hex),
            ReferenceDetail::Full => format!("{} 0x{} ({} bytes)", kind.name(), hex, payload.len()),
        })
    }
}

/// Check if a reference payload is all zero bytes.
pub fn is_null_reference(payload: &[u8]) -> bool {
    payload.iter().all(|&b| b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_resolver() {
        let text = RawReferenceResolver
            .describe(ReferenceKind::Object, &[0, 0, 4, 0xd2], ReferenceDetail::Identifier)
            .unwrap();
        assert_eq!(text, "obj 0x000004D2");
        assert!(is_null_reference(&[0; 8]));
        assert!(!is_null_reference(&[0, 1]));
    }
}
