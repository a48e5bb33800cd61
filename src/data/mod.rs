//! Data representation.
//!
//! This module holds decoded values, the raw buffers a table reads and
//! writes, dataset selections and the collaborators that supply frames and
//! resolve references.

mod buffer;
mod reference;
mod selection;
mod source;
mod value;

pub use buffer::DataBuffer;
pub use reference::{is_null_reference, RawReferenceResolver, ReferenceDetail, ReferenceResolver};
pub use selection::Selection;
pub use source::{DataSource, Element, FrameDataset, MemoryDataset, PersistenceSink};
pub use value::{Value, ERROR_STR, NULL_STR};
pub(crate) use value::{join_hex_bytes, split_tokens, width_mask};
