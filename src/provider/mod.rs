//! Value providers.
//!
//! A provider translates a table position into the element it shows inside
//! the raw buffer of the current frame, and writes edited text back into
//! that buffer.

mod element;
mod layout;

pub use element::ElementProvider;
pub use layout::Layout;

use std::rc::Rc;

use crate::data::{DataBuffer, ReferenceResolver, Selection, Value};
use crate::datatype::Datatype;
use crate::error::Result;
use crate::index_map::IndexMaps;

/// Result of writing one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The buffer was updated.
    Applied,
    /// The text matched the current value and nothing was written.
    Unchanged,
    /// The text could not be stored; the buffer is untouched.
    Discarded,
}

/// Owns the frame buffer of a table and the provider tree reading it.
#[derive(Debug)]
pub struct ValueProvider {
    root: ElementProvider,
    buffer: DataBuffer,
    layout: Layout,
    column_span: usize,
    changed: bool,
}

impl ValueProvider {
    /// Create a new provider over `buffer`.
    ///
    /// Fails when a compound column space maps to no columns.
    pub fn new(
        datatype: &Datatype,
        buffer: DataBuffer,
        selection: &Selection,
        transposed: bool,
        resolver: &Rc<dyn ReferenceResolver>,
    ) -> Result<Self> {
        let maps = IndexMaps::for_datatype(datatype)?;
        let root = ElementProvider::for_datatype(datatype, resolver);
        tracing::debug!(datatype = %datatype, columns = maps.len(), "value provider created");
        Ok(Self {
            root,
            buffer,
            layout: Layout::new(selection, transposed),
            column_span: maps.len(),
            changed: false,
        })
    }

    /// Value at (`row`, `col`), or [`Value::Error`] when it cannot be read.
    pub fn get(&self, row: usize, col: usize) -> Value {
        match self.root.get_cell(&self.layout, &self.buffer, row, col) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(row, col, error = %e, "cell read failed");
                Value::Error
            },
        }
    }

    /// Write `text` into (`row`, `col`).
    ///
    /// Text equal to the current value is not written. A write that fails
    /// leaves the buffer and the changed flag as they were.
    pub fn set(&mut self, row: usize, col: usize, text: &str) -> EditOutcome {
        let text = text.trim();
        if self.get(row, col).to_string() == text {
            tracing::trace!(row, col, "edit matches current value");
            return EditOutcome::Unchanged;
        }
        match self.root.set_cell(&self.layout, &mut self.buffer, row, col, text) {
            Ok(()) => {
                self.changed = true;
                EditOutcome::Applied
            },
            Err(e) => {
                tracing::debug!(row, col, text, error = %e, "cell write discarded");
                EditOutcome::Discarded
            },
        }
    }

    /// Replace the frame buffer, for a new frame or selection window.
    pub fn update_buffer(&mut self, buffer: DataBuffer, selection: &Selection) {
        self.buffer = buffer;
        self.layout = Layout::new(selection, self.layout.transposed);
    }

    /// Switch between row-major and transposed display.
    pub fn set_transposed(&mut self, transposed: bool) {
        self.layout.transposed = transposed;
    }

    /// Number of table rows.
    pub fn row_count(&self) -> usize {
        self.layout.rows
    }

    /// Number of flattened table columns.
    pub fn column_count(&self) -> usize {
        self.column_span * self.layout.cols
    }

    /// Check if any write succeeded since the flag was last cleared.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Set or clear the changed flag.
    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    /// The current frame buffer.
    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// The current frame layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Root of the provider tree.
    pub fn root(&self) -> &ElementProvider {
        &self.root
    }
}
