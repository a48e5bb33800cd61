//! Hyperslab selection of a dataset shown as a 2-D table.

use crate::error::{Result, TableError};

/// Which part of an N-D dataset is materialised as the current frame.
///
/// `selected_index` names the dimensions shown as rows, columns and frames,
/// in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Full extent of every dimension.
    pub dims: Vec<usize>,
    /// First selected index per dimension.
    pub start: Vec<usize>,
    /// Step between selected indices per dimension.
    pub stride: Vec<usize>,
    /// Number of selected indices per dimension.
    pub count: Vec<usize>,
    /// Row, column and frame dimensions.
    pub selected_index: [usize; 3],
}

impl Selection {
    /// Select the whole dataset, rows along the second to last dimension and
    /// columns along the last one.
    pub fn full(dims: &[usize]) -> Self {
        let rank = dims.len();
        let selected_index = match rank {
            0 | 1 => [0, 0, 0],
            2 => [0, 1, 0],
            _ => [rank - 2, rank - 1, 0],
        };
        let mut count = dims.to_vec();
        if rank > 2 {
            for (d, c) in count.iter_mut().enumerate() {
                if d != selected_index[0] && d != selected_index[1] {
                    *c = 1;
                }
            }
        }
        Self {
            dims: dims.to_vec(),
            start: vec![0; rank],
            stride: vec![1; rank],
            count,
            selected_index,
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of table rows in a frame.
    pub fn height(&self) -> usize {
        match self.rank() {
            0 => 1,
            1 => self.count[0],
            _ => self.count[self.selected_index[0]],
        }
    }

    /// Number of table columns in a frame (before compound flattening).
    pub fn width(&self) -> usize {
        match self.rank() {
            0 | 1 => 1,
            _ => self.count[self.selected_index[1]],
        }
    }

    /// Whether the row dimension precedes the column dimension in storage.
    pub fn is_natural_order(&self) -> bool {
        self.rank() <= 1 || self.selected_index[0] < self.selected_index[1]
    }

    /// Number of frames along the frame dimension.
    pub fn frame_count(&self) -> usize {
        if self.rank() > 2 {
            self.dims[self.selected_index[2]]
        } else {
            1
        }
    }

    /// Index of the frame currently selected.
    pub fn current_frame(&self) -> usize {
        if self.rank() > 2 {
            self.start[self.selected_index[2]]
        } else {
            0
        }
    }

    /// Move the frame dimension to `frame`.
    pub fn set_frame(&mut self, frame: usize) -> Result<()> {
        if self.rank() <= 2 {
            return Err(TableError::unsupported(
                "frame navigation needs a dataset of rank > 2",
            ));
        }
        let dim = self.selected_index[2];
        if frame >= self.dims[dim] {
            return Err(TableError::OutOfRange {
                index: frame,
                len: self.dims[dim],
            });
        }
        self.start[dim] = frame;
        self.count[dim] = 1;
        Ok(())
    }

    /// Dataset index along the row dimension of table row `row`.
    pub fn row_position(&self, row: usize) -> usize {
        if self.rank() == 0 {
            return row;
        }
        let dim = self.selected_index[0];
        self.start[dim] + row * self.stride[dim]
    }

    /// Dataset index along the column dimension of table column `col`.
    pub fn column_position(&self, col: usize) -> usize {
        if self.rank() < 2 {
            return col;
        }
        let dim = self.selected_index[1];
        self.start[dim] + col * self.stride[dim]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_selection_of_cube() {
        let sel = Selection::full(&[4, 2, 3]);
        assert_eq!(sel.selected_index, [1, 2, 0]);
        assert_eq!(sel.height(), 2);
        assert_eq!(sel.width(), 3);
        assert_eq!(sel.frame_count(), 4);
        assert!(sel.is_natural_order());
    }

    #[test]
    fn test_positions_follow_start_and_stride() {
        let mut sel = Selection::full(&[10, 10]);
        sel.start = vec![2, 1];
        sel.stride = vec![3, 2];
        assert_eq!(sel.row_position(2), 8);
        assert_eq!(sel.column_position(3), 7);
        assert_eq!(Selection::full(&[5]).column_position(0), 0);
    }

    #[test]
    fn test_set_frame_bounds() {
        let mut sel = Selection::full(&[4, 2, 3]);
        sel.set_frame(3).unwrap();
        assert_eq!(sel.current_frame(), 3);
        assert!(sel.set_frame(4).is_err());
        assert!(Selection::full(&[2, 3]).set_frame(0).is_err());
    }

    #[test]
    fn test_swapped_dimensions_are_not_natural() {
        let mut sel = Selection::full(&[2, 3]);
        sel.selected_index = [1, 0, 0];
        assert!(!sel.is_natural_order());
        assert_eq!(sel.height(), 3);
        assert_eq!(sel.width(), 2);
    }
}
