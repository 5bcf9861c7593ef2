//! Building index arrays from `ndarray` arrays.
use ndarray::{ArrayD, ArrayViewD};

use crate::{Index, IndexArray};

impl From<ArrayViewD<'_, Index>> for IndexArray {
    /// Copies the elements in logical (row-major) order, whatever the view's memory layout.
    fn from(value: ArrayViewD<'_, Index>) -> Self {
        let data: Vec<Index> = value.iter().copied().collect();
        IndexArray::new_unchecked(data, value.shape())
    }
}

impl From<&ArrayD<Index>> for IndexArray {
    fn from(value: &ArrayD<Index>) -> Self {
        value.view().into()
    }
}
