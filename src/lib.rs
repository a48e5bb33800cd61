//! hdftable - typed cell access for scientific datasets shown as tables.
//!
//! hdftable turns the raw buffer of one dataset frame into table cells and
//! back. Every datatype class (integers, floats, strings, characters,
//! enumerations, bitfields, references, arrays, variable-length sequences
//! and nested compounds) gets its own provider, converter and validator.
//!
//! # Features
//!
//! - Compound members flattened into one column per leaf
//! - Hex, binary, scientific and custom number display
//! - Validation of edits against the element width and signedness
//! - Frame navigation for datasets of rank > 2
//! - A compact datatype expression language
//!
//! # Example
//!
//! ```
//! use hdftable::{DataBuffer, Datatype, FrameDataset, SessionOptions, TablePreferences, TableSession};
//!
//! let dtype: Datatype = "compound{id:u8,pos:compound{x:f32,y:f32}}".parse()?;
//! let buffer = DataBuffer::Compound(vec![
//!     DataBuffer::UInt8(vec![7]),
//!     DataBuffer::Compound(vec![DataBuffer::Float32(vec![1.5]), DataBuffer::Float32(vec![-2.0])]),
//! ]);
//! let ds = FrameDataset::new(dtype, &[1], buffer);
//! let table = TableSession::open(&ds, TablePreferences::default(), SessionOptions::default())?;
//! assert_eq!(table.column_names(), ["id", "pos.x", "pos.y"]);
//! assert_eq!(table.display_cell(0, 2), "-2.0");
//! # Ok::<(), hdftable::TableError>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod converter;
pub mod data;
pub mod datatype;
pub mod error;
pub mod index_map;
pub mod provider;
pub mod table;
pub mod validator;

pub use config::{IndexBase, TablePreferences};
pub use converter::{CellPosition, ConversionSettings, DisplayConverter, NumberMode, NumberPattern, Presentation};
pub use data::{
    DataBuffer, DataSource, FrameDataset, MemoryDataset, PersistenceSink, RawReferenceResolver, ReferenceDetail,
    ReferenceResolver, Selection, Value,
};
pub use datatype::{Datatype, TypeClass};
pub use error::{Result, TableError};
pub use index_map::IndexMaps;
pub use provider::{EditOutcome, ElementProvider, Layout, ValueProvider};
pub use table::{SessionOptions, TableSession};
pub use validator::Validator;
