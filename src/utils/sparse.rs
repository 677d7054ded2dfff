//! Set operations over sorted sparse index lists.
//!
//! Cell, column and input-bit sets are carried as sorted, duplicate-free
//! `Vec<u32>`. The helpers here do the two-pointer merges that the learning
//! and tiebreak rules are written in terms of.

use crate::error::{Result, TiebreakError};
use crate::types::{CellIdx, ColumnIdx, ElemSparse};

use std::cmp::Ordering;

/// Validates that every index lies in `[0, size)` and returns the indices
/// sorted with duplicates removed.
///
/// `name` identifies the offending input in the returned error.
pub fn normalize(indices: &[ElemSparse], size: usize, name: &'static str) -> Result<Vec<ElemSparse>> {
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= size) {
        return Err(TiebreakError::IndexOutOfBounds {
            name,
            index: bad as usize,
            size,
        });
    }

    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    Ok(sorted)
}

/// Sorts and deduplicates in place, returning the vector.
pub fn sorted_unique(mut values: Vec<u32>) -> Vec<u32> {
    values.sort_unstable();
    values.dedup();
    values
}

/// Returns true if `value` is present in the sorted slice.
#[inline]
pub fn contains(sorted: &[u32], value: u32) -> bool {
    sorted.binary_search(&value).is_ok()
}

/// Intersection of two sorted, duplicate-free slices.
pub fn intersection(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let mut i = 0;
    let mut j = 0;

    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }

    result
}

/// Elements of sorted `a` that are not in sorted `b`.
pub fn difference(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len());
    let mut j = 0;

    for &value in a {
        while j < b.len() && b[j] < value {
            j += 1;
        }
        if j >= b.len() || b[j] != value {
            result.push(value);
        }
    }

    result
}

/// The minicolumn a cell belongs to.
#[inline]
pub fn column_for_cell(cell: CellIdx, cells_per_column: usize) -> ColumnIdx {
    (cell as usize / cells_per_column) as ColumnIdx
}

/// All cells of the given columns, in column order.
pub fn cells_for_columns(columns: &[ColumnIdx], cells_per_column: usize) -> Vec<CellIdx> {
    columns
        .iter()
        .flat_map(|&column| {
            let start = column as usize * cells_per_column;
            (start..start + cells_per_column).map(|c| c as CellIdx)
        })
        .collect()
}

/// Splits cells by whether their column appears in `columns`.
///
/// Returns `(cells whose column is in columns, columns with no such cell)`.
/// Both inputs must be sorted; both outputs are sorted.
pub fn set_compare_by_column(
    cells: &[CellIdx],
    columns: &[ColumnIdx],
    cells_per_column: usize,
) -> (Vec<CellIdx>, Vec<ColumnIdx>) {
    let in_columns: Vec<CellIdx> = cells
        .iter()
        .copied()
        .filter(|&c| contains(columns, column_for_cell(c, cells_per_column)))
        .collect();

    let covered = sorted_unique(
        in_columns
            .iter()
            .map(|&c| column_for_cell(c, cells_per_column))
            .collect(),
    );
    let uncovered = difference(columns, &covered);

    (in_columns, uncovered)
}
