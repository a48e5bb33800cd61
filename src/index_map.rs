//! Column index maps for compound datatypes.
//!
//! A compound table flattens nested members into one column space. For the
//! type `{a:int, b:{x:int, y:float}, c:int}` the columns are `a, b.x, b.y, c`:
//!
//! ```text
//! column       0  1  2  3
//! base index   0  1  1  2    top-level member owning the column
//! group start  0  1  1  3    first column of the enclosing nested group
//! ```
//!
//! Members that are arrays of compounds repeat the inner compound's columns
//! once per array element.

use crate::datatype::{CompoundMember, Datatype};
use crate::error::{Result, TableError};

/// Column to member mappings of one compound level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMaps {
    col_to_base: Vec<usize>,
    col_to_group_start: Vec<usize>,
    col_to_member_start: Vec<usize>,
}

impl IndexMaps {
    /// Build the maps for the members of one compound type.
    pub fn build(members: &[CompoundMember]) -> Result<Self> {
        let mut maps = Self::empty();
        let mut provider = 0;
        let mut group_start = 0;
        maps.walk(members, 0, &mut provider, &mut group_start, 0);
        maps.finish()
    }

    /// Build the maps for the column space of a whole datatype.
    ///
    /// A compound uses [`IndexMaps::build`]. An array of compounds replays the
    /// inner compound's maps once per element, each replay starting from base
    /// index 0. Any other type occupies a single column.
    pub fn for_datatype(dtype: &Datatype) -> Result<Self> {
        if let Some(members) = dtype.members() {
            return Self::build(members);
        }
        if let Some((members, count)) = dtype.array_of_compound() {
            let mut maps = Self::empty();
            for _ in 0..count {
                let mut provider = 0;
                let mut group_start = maps.len();
                maps.walk(members, 0, &mut provider, &mut group_start, 0);
            }
            return maps.finish();
        }
        Ok(Self {
            col_to_base: vec![0],
            col_to_group_start: vec![0],
            col_to_member_start: vec![0],
        })
    }

    fn empty() -> Self {
        Self {
            col_to_base: Vec::new(),
            col_to_group_start: Vec::new(),
            col_to_member_start: Vec::new(),
        }
    }

    fn finish(self) -> Result<Self> {
        if self.col_to_base.is_empty() {
            tracing::debug!("base index mapping is invalid - size 0");
            return Err(TableError::EmptyIndexMap { map: "base index" });
        }
        if self.col_to_group_start.is_empty() {
            return Err(TableError::EmptyIndexMap { map: "group start" });
        }
        tracing::trace!(base = ?self.col_to_base, group = ?self.col_to_group_start, "index maps built");
        Ok(self)
    }

    fn walk(
        &mut self,
        members: &[CompoundMember],
        depth: usize,
        provider: &mut usize,
        group_start: &mut usize,
        member_start: usize,
    ) {
        for member in members {
            let owner_start = if depth == 0 { self.len() } else { member_start };
            let dtype = &member.datatype;

            if let Some((inner, count)) = dtype.array_of_compound() {
                for _ in 0..count {
                    if depth == 0 {
                        *group_start = self.len();
                    }
                    self.walk(inner, depth + 1, provider, group_start, owner_start);
                }
            } else if let Some(inner) = dtype.members() {
                if depth == 0 {
                    *group_start = self.len();
                }
                self.walk(inner, depth + 1, provider, group_start, owner_start);
            } else {
                let col = self.len();
                self.col_to_base.push(*provider);
                self.col_to_group_start
                    .push(if depth == 0 { col } else { *group_start });
                self.col_to_member_start.push(owner_start);
            }

            if depth == 0 {
                *provider += 1;
            }
        }
    }

    /// Number of flattened columns.
    pub fn len(&self) -> usize {
        self.col_to_base.len()
    }

    /// Check if no column is mapped.
    pub fn is_empty(&self) -> bool {
        self.col_to_base.is_empty()
    }

    /// Index of the member strategy owning `col`.
    pub fn base_index(&self, col: usize) -> Result<usize> {
        self.col_to_base
            .get(col)
            .copied()
            .ok_or(TableError::UnmappedColumn(col))
    }

    /// First column of the nested group containing `col`.
    pub fn group_start(&self, col: usize) -> Result<usize> {
        self.col_to_group_start
            .get(col)
            .copied()
            .ok_or(TableError::UnmappedColumn(col))
    }

    /// First column of the top-level member containing `col`.
    pub fn member_start(&self, col: usize) -> Result<usize> {
        self.col_to_member_start
            .get(col)
            .copied()
            .ok_or(TableError::UnmappedColumn(col))
    }

    /// Column to base index map.
    pub fn base_map(&self) -> &[usize] {
        &self.col_to_base
    }

    /// Column to group start map.
    pub fn group_start_map(&self) -> &[usize] {
        &self.col_to_group_start
    }
}
