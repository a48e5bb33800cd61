//! Dataset accessors feeding frames into a table session.

use std::collections::HashSet;

use ndarray::{ArrayD, IxDyn};

use super::{DataBuffer, Selection};
use crate::datatype::Datatype;
use crate::error::{Result, TableError};

/// Supplies the datatype, selection and frame buffers of one dataset.
pub trait DataSource {
    /// Element datatype of the dataset.
    fn datatype(&self) -> &Datatype;

    /// Current selection.
    fn selection(&self) -> &Selection;

    /// Mutable access to the selection, used to move between frames.
    fn selection_mut(&mut self) -> &mut Selection;

    /// Materialise the currently selected frame.
    fn read(&self) -> Result<DataBuffer>;
}

/// Writes an edited frame back to its dataset.
pub trait PersistenceSink {
    /// Store `buffer` as the frame described by `selection`.
    fn write(&mut self, selection: &Selection, buffer: &DataBuffer) -> Result<()>;
}

/// Primitive element types that can back a [`MemoryDataset`].
pub trait Element: Clone + std::fmt::Debug {
    /// Wrap frame values into a buffer.
    fn into_buffer(values: Vec<Self>) -> DataBuffer;

    /// Borrow frame values out of a buffer of the matching layout.
    fn from_buffer(buffer: &DataBuffer) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                fn into_buffer(values: Vec<Self>) -> DataBuffer {
                    DataBuffer::$variant(values)
                }

                fn from_buffer(buffer: &DataBuffer) -> Option<&[Self]> {
                    match buffer {
                        DataBuffer::$variant(values) => Some(values),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    i128 => Int128,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u128 => UInt128,
    f32 => Float32,
    f64 => Float64,
    String => Strings,
);

/// An N-dimensional dataset held in memory.
#[derive(Debug, Clone)]
pub struct MemoryDataset<T> {
    datatype: Datatype,
    data: ArrayD<T>,
    selection: Selection,
}

impl<T: Element> MemoryDataset<T> {
    /// Create a new dataset selecting the whole array.
    pub fn new(datatype: Datatype, data: ArrayD<T>) -> Self {
        let selection = Selection::full(data.shape());
        Self {
            datatype,
            data,
            selection,
        }
    }

    /// Create a dataset from row-major values.
    pub fn from_shape_vec(datatype: Datatype, shape: &[usize], values: Vec<T>) -> Result<Self> {
        let data = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|e| TableError::Source(e.to_string()))?;
        Ok(Self::new(datatype, data))
    }

    /// Underlying array.
    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Value at the given multi-dimensional indices.
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.data.get(IxDyn(indices))
    }

    /// Dataset indices of every element of the current frame, in table order.
    fn frame_indices(&self) -> Vec<Vec<usize>> {
        let sel = &self.selection;
        let rank = sel.rank();
        if rank == 0 {
            return vec![Vec::new()];
        }
        if rank == 1 {
            return (0..sel.count[0])
                .map(|i| vec![sel.start[0] + i * sel.stride[0]])
                .collect();
        }

        let (dim_y, dim_x) = (sel.selected_index[0], sel.selected_index[1]);
        let mut result = Vec::with_capacity(sel.height() * sel.width());
        for y in 0..sel.height() {
            for x in 0..sel.width() {
                let mut idx = sel.start.clone();
                idx[dim_y] = sel.start[dim_y] + y * sel.stride[dim_y];
                idx[dim_x] = sel.start[dim_x] + x * sel.stride[dim_x];
                result.push(idx);
            }
        }
        result
    }
}

impl<T: Element> DataSource for MemoryDataset<T> {
    fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    fn read(&self) -> Result<DataBuffer> {
        let values = self
            .frame_indices()
            .into_iter()
            .map(|idx| {
                self.data
                    .get(IxDyn(&idx))
                    .cloned()
                    .ok_or_else(|| TableError::Source(format!("index {:?} outside dataset", idx)))
            })
            .collect::<Result<Vec<T>>>()?;
        tracing::trace!(len = values.len(), "read frame");
        Ok(T::into_buffer(values))
    }
}

impl<T: Element> PersistenceSink for MemoryDataset<T> {
    fn write(&mut self, selection: &Selection, buffer: &DataBuffer) -> Result<()> {
        let values = T::from_buffer(buffer)
            .ok_or_else(|| TableError::buffer_shape("buffer matching dataset element", buffer.kind()))?;
        self.selection = selection.clone();
        let indices = self.frame_indices();
        if indices.len() != values.len() {
            return Err(TableError::Source(format!(
                "frame holds {} elements, buffer has {}",
                indices.len(),
                values.len()
            )));
        }
        for (idx, value) in indices.iter().zip(values) {
            if let Some(slot) = self.data.get_mut(IxDyn(idx)) {
                *slot = value.clone();
            }
        }
        tracing::debug!(len = values.len(), "frame written back");
        Ok(())
    }
}

/// A dataset whose frame is already materialised as a raw buffer.
///
/// Serves compound and variable-length data, which have no ndarray element
/// type.
#[derive(Debug, Clone)]
pub struct FrameDataset {
    datatype: Datatype,
    buffer: DataBuffer,
    selection: Selection,
}

impl FrameDataset {
    /// Create a new dataset of extent `dims` backed by `buffer`.
    pub fn new(datatype: Datatype, dims: &[usize], buffer: DataBuffer) -> Self {
        Self {
            datatype,
            buffer,
            selection: Selection::full(dims),
        }
    }

    /// Stored buffer.
    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// Keep only the compound leaf members whose dotted path is in
    /// `selected`, in both the datatype and the buffer.
    pub fn select_members(&mut self, selected: &HashSet<String>) -> Result<()> {
        self.buffer = prune_members(&self.datatype, self.buffer.clone(), "", selected)?;
        self.datatype = self.datatype.select_members(selected);
        tracing::debug!(columns = self.datatype.column_names().len(), "members selected");
        Ok(())
    }
}

fn prune_members(
    dtype: &Datatype,
    buffer: DataBuffer,
    prefix: &str,
    selected: &HashSet<String>,
) -> Result<DataBuffer> {
    if let Some((members, _)) = dtype.array_of_compound() {
        let inner = Datatype::Compound {
            members: members.to_vec(),
        };
        return prune_members(&inner, buffer, prefix, selected);
    }
    let Some(members) = dtype.members() else {
        return Ok(buffer);
    };
    let parts = match buffer {
        DataBuffer::Compound(parts) if parts.len() == members.len() => parts,
        DataBuffer::Compound(_) => {
            return Err(TableError::buffer_shape(
                "one buffer per compound member",
                "mismatched member count",
            ))
        },
        other => return Ok(other),
    };
    let mut kept = Vec::with_capacity(parts.len());
    for (member, part) in members.iter().zip(parts) {
        let path = if prefix.is_empty() {
            member.name.clone()
        } else {
            format!("{}.{}", prefix, member.name)
        };
        if member.datatype.is_compound() || member.datatype.array_of_compound().is_some() {
            kept.push(prune_members(&member.datatype, part, &path, selected)?);
        } else if selected.contains(&path) {
            kept.push(part);
        }
    }
    Ok(DataBuffer::Compound(kept))
}

impl DataSource for FrameDataset {
    fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    fn read(&self) -> Result<DataBuffer> {
        Ok(self.buffer.clone())
    }
}

impl PersistenceSink for FrameDataset {
    fn write(&mut self, selection: &Selection, buffer: &DataBuffer) -> Result<()> {
        self.selection = selection.clone();
        self.buffer = buffer.clone();
        tracing::debug!(kind = buffer.kind(), "frame written back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> MemoryDataset<i32> {
        MemoryDataset::from_shape_vec(Datatype::integer(4, true), &[2, 2, 3], (0..12).collect()).unwrap()
    }

    #[test]
    fn test_read_first_frame() {
        let ds = cube();
        assert_eq!(ds.read().unwrap(), DataBuffer::Int32(vec![0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_read_after_frame_change() {
        let mut ds = cube();
        ds.selection_mut().set_frame(1).unwrap();
        assert_eq!(ds.read().unwrap(), DataBuffer::Int32(vec![6, 7, 8, 9, 10, 11]));
    }

    #[test]
    fn test_write_back_frame() {
        let mut ds = cube();
        let sel = ds.selection().clone();
        ds.write(&sel, &DataBuffer::Int32(vec![9; 6])).unwrap();
        assert_eq!(ds.get(&[0, 1, 2]), Some(&9));
        assert_eq!(ds.get(&[1, 0, 0]), Some(&6));
        assert!(ds.write(&sel, &DataBuffer::Float32(vec![0.0; 6])).is_err());
    }

    #[test]
    fn test_frame_dataset_member_selection() {
        let dt: Datatype = "compound{a:i8,b:compound{x:i8,y:f32},c:u16}".parse().unwrap();
        let buffer = DataBuffer::Compound(vec![
            DataBuffer::Int8(vec![1]),
            DataBuffer::Compound(vec![DataBuffer::Int8(vec![2]), DataBuffer::Float32(vec![3.0])]),
            DataBuffer::UInt16(vec![4]),
        ]);
        let mut ds = FrameDataset::new(dt, &[1], buffer);
        let selected: HashSet<String> = ["b.y", "c"].iter().map(|s| s.to_string()).collect();
        ds.select_members(&selected).unwrap();
        assert_eq!(ds.datatype().column_names(), vec!["b.y", "c"]);
        assert_eq!(
            ds.read().unwrap(),
            DataBuffer::Compound(vec![
                DataBuffer::Compound(vec![DataBuffer::Float32(vec![3.0])]),
                DataBuffer::UInt16(vec![4]),
            ])
        );
    }

    #[test]
    fn test_member_selection_keeps_frame_on_shape_error() {
        let dt: Datatype = "compound{a:u8,b:u8}".parse().unwrap();
        let original = DataBuffer::Compound(vec![DataBuffer::UInt8(vec![1])]);
        let mut ds = FrameDataset::new(dt.clone(), &[1], original.clone());
        let selected: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(ds.select_members(&selected).is_err());
        assert_eq!(ds.buffer(), &original);
        assert_eq!(ds.datatype(), &dt);
    }
}
