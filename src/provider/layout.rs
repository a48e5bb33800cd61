//! Mapping of table positions onto buffer offsets.

use crate::data::Selection;

/// Shape of the frame a provider reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Rank of the dataset.
    pub rank: usize,
    /// Table rows in a frame.
    pub rows: usize,
    /// Table columns in a frame, before compound flattening.
    pub cols: usize,
    /// Row dimension precedes the column dimension in storage.
    pub natural_order: bool,
    /// Frame is shown transposed.
    pub transposed: bool,
}

impl Layout {
    /// Create a layout for the current frame of `selection`.
    pub fn new(selection: &Selection, transposed: bool) -> Self {
        let rank = selection.rank();
        let cols = if rank > 1 { selection.width() } else { 1 };
        Self {
            rank,
            rows: selection.height(),
            cols,
            natural_order: selection.is_natural_order(),
            transposed,
        }
    }

    /// Buffer offset of the element shown at (`row`, `col`).
    ///
    /// A transposed frame is column-major whatever the storage order of the
    /// selected dimensions. An untransposed frame is row-major, reshaped the
    /// same way when the dimensions are swapped.
    pub fn buffer_index(&self, row: usize, col: usize) -> usize {
        if self.rank <= 1 {
            return row;
        }
        match (self.transposed, self.natural_order) {
            (true, _) => col * self.rows + row,
            (false, false) => row * self.cols + col,
            (false, true) => row * self.cols + col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three(natural_order: bool, transposed: bool) -> Layout {
        Layout {
            rank: 2,
            rows: 2,
            cols: 3,
            natural_order,
            transposed,
        }
    }

    #[test]
    fn test_offset_for_every_order_combination() {
        assert_eq!(two_by_three(true, false).buffer_index(1, 2), 5);
        assert_eq!(two_by_three(false, false).buffer_index(1, 2), 5);
        assert_eq!(two_by_three(true, true).buffer_index(1, 2), 5);
        assert_eq!(two_by_three(false, true).buffer_index(1, 2), 5);

        assert_eq!(two_by_three(true, false).buffer_index(0, 1), 1);
        assert_eq!(two_by_three(false, false).buffer_index(0, 1), 1);
        assert_eq!(two_by_three(true, true).buffer_index(0, 1), 2);
        assert_eq!(two_by_three(false, true).buffer_index(0, 1), 2);
    }

    #[test]
    fn test_rank_one_ignores_column() {
        let layout = Layout::new(&Selection::full(&[7]), true);
        assert_eq!(layout.cols, 1);
        assert_eq!(layout.rows, 7);
        assert_eq!(layout.buffer_index(4, 0), 4);
    }

    #[test]
    fn test_from_swapped_selection() {
        let mut sel = Selection::full(&[3, 2]);
        sel.selected_index = [1, 0, 0];
        let layout = Layout::new(&sel, false);
        assert_eq!((layout.rows, layout.cols), (2, 3));
        assert!(!layout.natural_order);
    }
}
