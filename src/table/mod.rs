//! Table sessions.
//!
//! A [`TableSession`] is one open table over one dataset. It wires the value
//! provider, display converter and validator built for the dataset's
//! datatype to the presentation mode, the changed flag and frame navigation.
//!
//! # Example
//!
//! ```
//! use hdftable::{Datatype, MemoryDataset, SessionOptions, TablePreferences, TableSession};
//!
//! let ds = MemoryDataset::from_shape_vec(Datatype::integer(1, false), &[2, 2], vec![1u8, 2, 3, 4])?;
//! let mut table = TableSession::open(&ds, TablePreferences::default(), SessionOptions::default())?;
//! assert_eq!(table.display_cell(1, 0), "3");
//! assert!(table.edit_cell(1, 0, "256").is_err());
//! table.edit_cell(1, 0, "255")?;
//! assert!(table.should_persist());
//! # Ok::<(), hdftable::TableError>(())
//! ```

use std::rc::Rc;

use crate::config::TablePreferences;
use crate::converter::{CellPosition, DisplayConverter, NumberMode, NumberPattern, Presentation};
use crate::data::{DataBuffer, DataSource, RawReferenceResolver, ReferenceResolver, Selection, Value};
use crate::datatype::Datatype;
use crate::error::{Result, TableError};
use crate::provider::{EditOutcome, ValueProvider};
use crate::validator::Validator;

/// Options chosen by the caller when a table opens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Reject every edit.
    pub read_only: bool,
    /// Show the frame transposed.
    pub transposed: bool,
}

/// One open table over one dataset.
#[derive(Debug)]
pub struct TableSession {
    datatype: Datatype,
    selection: Selection,
    provider: ValueProvider,
    converter: DisplayConverter,
    validator: Validator,
    presentation: Presentation,
    preferences: TablePreferences,
    read_only: bool,
    column_names: Vec<String>,
}

impl TableSession {
    /// Open a table over the current frame of `source`, showing references
    /// by their raw payload.
    pub fn open(source: &dyn DataSource, preferences: TablePreferences, options: SessionOptions) -> Result<Self> {
        let resolver: Rc<dyn ReferenceResolver> = Rc::new(RawReferenceResolver);
        Self::open_with_resolver(source, preferences, options, resolver)
    }

    /// Open a table whose reference cells are described by `resolver`.
    ///
    /// Fails when the datatype's column space is empty or the frame cannot
    /// be read.
    pub fn open_with_resolver(
        source: &dyn DataSource,
        preferences: TablePreferences,
        options: SessionOptions,
        resolver: Rc<dyn ReferenceResolver>,
    ) -> Result<Self> {
        let datatype = source.datatype().clone();
        let selection = source.selection().clone();
        let buffer = source.read()?;
        let provider = ValueProvider::new(&datatype, buffer, &selection, options.transposed, &resolver)?;

        let presentation = Presentation::for_datatype(&datatype, &preferences);
        let mut converter = DisplayConverter::for_datatype(&datatype);
        converter.apply(&presentation.settings()?);
        let validator = Validator::for_datatype(&datatype);

        tracing::info!(
            datatype = %datatype,
            rows = provider.row_count(),
            columns = provider.column_count(),
            "table opened"
        );
        Ok(Self {
            column_names: datatype.column_names(),
            datatype,
            selection,
            provider,
            converter,
            validator,
            presentation,
            preferences,
            read_only: options.read_only,
        })
    }

    /// Element datatype shown by the table.
    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    /// Selection of the current frame.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Number of table rows.
    pub fn row_count(&self) -> usize {
        self.provider.row_count()
    }

    /// Number of flattened table columns.
    pub fn column_count(&self) -> usize {
        self.provider.column_count()
    }

    /// Headers of the flattened member columns of one element.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Current presentation state.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Preferences the table was opened with.
    pub fn preferences(&self) -> &TablePreferences {
        &self.preferences
    }

    /// Raw value at (`row`, `col`).
    pub fn read_cell(&self, row: usize, col: usize) -> Value {
        self.provider.get(row, col)
    }

    /// Text shown at (`row`, `col`).
    pub fn display_cell(&self, row: usize, col: usize) -> String {
        let value = self.provider.get(row, col);
        self.converter.decode(&value, CellPosition::new(row, col))
    }

    /// Check `text` as an edit of (`row`, `col`) without applying it.
    pub fn validate_edit(&self, row: usize, col: usize, text: &str) -> Result<()> {
        let text = self.converter.encode(text.trim(), CellPosition::new(row, col));
        self.validator.validate(col, row, Some(&text))
    }

    /// Validate and apply `text` as the new value of (`row`, `col`).
    ///
    /// A rejected edit returns the validation error and leaves the buffer
    /// untouched. An accepted edit that cannot be stored reports
    /// [`EditOutcome::Discarded`].
    pub fn edit_cell(&mut self, row: usize, col: usize, text: &str) -> Result<EditOutcome> {
        if self.read_only {
            return Err(TableError::unsupported("table is read-only"));
        }
        let text = self.converter.encode(text.trim(), CellPosition::new(row, col));
        self.validator.validate(col, row, Some(&text))?;
        Ok(self.provider.set(row, col, &text))
    }

    fn update_presentation(&mut self, change: impl FnOnce(&mut Presentation)) -> Result<()> {
        let mut next = self.presentation.clone();
        change(&mut next);
        let settings = next.settings()?;
        self.converter.apply(&settings);
        tracing::debug!(mode = next.mode().name(), convert_enum = next.convert_enum(), "presentation changed");
        self.presentation = next;
        Ok(())
    }

    /// Switch the number mode. The other modes and enum names turn off.
    pub fn set_number_mode(&mut self, mode: NumberMode) -> Result<()> {
        self.update_presentation(|p| p.set_mode(mode))
    }

    /// Turn `mode` on, or back to decimal if it is already on.
    pub fn toggle_number_mode(&mut self, mode: NumberMode) -> Result<()> {
        self.update_presentation(|p| p.toggle(mode))
    }

    /// Show enum values by name or as integers.
    pub fn set_convert_enum(&mut self, on: bool) -> Result<()> {
        self.update_presentation(|p| p.set_convert_enum(on))
    }

    /// Show numbers with a custom decimal pattern.
    pub fn set_custom_pattern(&mut self, pattern: &str) -> Result<()> {
        pattern.parse::<NumberPattern>()?;
        self.update_presentation(|p| {
            p.set_custom_pattern(pattern);
            p.set_mode(NumberMode::Custom);
        })
    }

    /// Show the frame transposed or row-major.
    pub fn set_transposed(&mut self, transposed: bool) {
        self.provider.set_transposed(transposed);
    }

    /// Number of frames along the frame dimension.
    pub fn frame_count(&self) -> usize {
        self.selection.frame_count()
    }

    /// Index of the frame on display.
    pub fn current_frame(&self) -> usize {
        self.selection.current_frame()
    }

    /// Load frame `frame` of `source` in place of the current buffer.
    ///
    /// Edits that would be persisted must be written out first. Edits made
    /// while they could not be persisted are dropped with the old frame.
    pub fn goto_frame(&mut self, source: &mut dyn DataSource, frame: usize) -> Result<()> {
        if self.should_persist() {
            return Err(TableError::unsupported(
                "persist the edited frame before changing frames",
            ));
        }
        source.selection_mut().set_frame(frame)?;
        let buffer = source.read()?;
        self.selection = source.selection().clone();
        self.provider.update_buffer(buffer, &self.selection);
        self.provider.set_changed(false);
        tracing::debug!(frame, rows = self.row_count(), "frame loaded");
        Ok(())
    }

    /// Label of table row `row`.
    pub fn row_label(&self, row: usize) -> u64 {
        self.selection.row_position(row) as u64 + self.preferences.index_base.offset()
    }

    /// Label of table column `col`: the member header for compound data,
    /// the dataset index otherwise.
    pub fn column_label(&self, col: usize) -> String {
        if self.datatype.is_compound() || self.datatype.array_of_compound().is_some() {
            let names = &self.column_names;
            return names.get(col % names.len().max(1)).cloned().unwrap_or_default();
        }
        (self.selection.column_position(col) as u64 + self.preferences.index_base.offset()).to_string()
    }

    /// Check if the table rejects edits.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Allow or reject edits.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Check if any edit was applied since the last persist.
    pub fn is_changed(&self) -> bool {
        self.provider.is_changed()
    }

    /// Check if the buffer should be handed to the persistence sink: the
    /// table is writable, an edit was applied, and values are not shown as
    /// raw hex or binary.
    pub fn should_persist(&self) -> bool {
        !self.read_only
            && self.provider.is_changed()
            && !self.presentation.is_hex()
            && !self.presentation.is_binary()
    }

    /// Record that the buffer has been written out.
    pub fn mark_persisted(&mut self) {
        self.provider.set_changed(false);
    }

    /// Buffer of the current frame.
    pub fn buffer(&self) -> &DataBuffer {
        self.provider.buffer()
    }
}
