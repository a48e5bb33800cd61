//! Datatype descriptors and strategy classification.

mod classify;
mod descriptor;
mod parse;

pub use classify::TypeClass;
pub use descriptor::{CompoundMember, Datatype, EnumMember, ReferenceKind, StringPadding};
