//! Shared, immutable index arrays used by gather-style output maps.
use std::sync::Arc;

use smallvec::ToSmallVec;

use crate::{Index, IndexInterval, ShortVec, TransformError};

/// Size in bytes of one element of an index array.
pub const INDEX_SIZE: isize = std::mem::size_of::<Index>() as isize;

/// An immutable, reference-counted, C-ordered buffer of indices.
///
/// Cloning shares the buffer. Nothing in this crate writes through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArray {
    data: Arc<[Index]>,
    shape: ShortVec<usize>,
}

impl IndexArray {
    #[track_caller]
    pub fn try_new(data: Vec<Index>, shape: &[usize]) -> Result<Self, TransformError> {
        let n_elements = shape
            .iter()
            .try_fold(1usize, |acc, s| acc.checked_mul(*s));
        if n_elements != Some(data.len()) {
            return Err(TransformError::invalid_argument(format!(
                "Index array of {} elements does not match shape {shape:?}",
                data.len()
            )));
        }
        Ok(Self {
            data: data.into(),
            shape: shape.to_smallvec(),
        })
    }

    /// The caller guarantees that `data` holds exactly as many elements as `shape` describes.
    #[cfg(feature = "ndarray")]
    pub(crate) fn new_unchecked(data: Vec<Index>, shape: &[usize]) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self {
            data: data.into(),
            shape: shape.to_smallvec(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Index] {
        &self.data
    }

    /// Whether both arrays are views of the same buffer.
    pub fn shares_buffer_with(&self, other: &IndexArray) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Row-major strides, in bytes.
    pub fn c_byte_strides(&self) -> ShortVec<isize> {
        let mut strides: ShortVec<isize> = smallvec::smallvec![0; self.shape.len()];
        let mut acc = INDEX_SIZE;
        for (stride, extent) in strides.iter_mut().zip(self.shape.iter()).rev() {
            *stride = acc;
            acc = acc.saturating_mul(*extent as isize);
        }
        strides
    }

    pub(crate) fn get_at_byte_offset(&self, byte_offset: isize) -> Option<Index> {
        if byte_offset < 0 || byte_offset % INDEX_SIZE != 0 {
            return None;
        }
        self.data.get((byte_offset / INDEX_SIZE) as usize).copied()
    }
}

/// Addressing data of an index-array output map.
///
/// The element read for an input vector `x` lives at
/// `base_byte_offset + sum(byte_strides[d] * x[d])` bytes into the array.
/// A zero byte stride means input dimension `d` does not take part in addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArrayData {
    array: IndexArray,
    base_byte_offset: isize,
    byte_strides: ShortVec<isize>,
    index_range: IndexInterval,
}

impl IndexArrayData {
    pub(crate) fn new(
        array: IndexArray,
        base_byte_offset: isize,
        byte_strides: ShortVec<isize>,
        index_range: IndexInterval,
    ) -> Self {
        Self {
            array,
            base_byte_offset,
            byte_strides,
            index_range,
        }
    }

    pub fn array(&self) -> &IndexArray {
        &self.array
    }

    pub fn base_byte_offset(&self) -> isize {
        self.base_byte_offset
    }

    pub fn byte_strides(&self) -> &[isize] {
        &self.byte_strides
    }

    /// Values read from the array must lie in this interval.
    pub fn index_range(&self) -> IndexInterval {
        self.index_range
    }

    /// Whether the given input dimension takes part in addressing the array.
    pub fn depends_on(&self, input_dim: usize) -> bool {
        self.byte_strides.get(input_dim).is_some_and(|s| *s != 0)
    }

    /// Input dimensions taking part in addressing the array.
    pub fn dependent_dims(&self) -> impl Iterator<Item = usize> + '_ {
        self.byte_strides
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| (*s != 0).then_some(idx))
    }

    /// Read the index addressed by input vector `input`,
    /// checked against [IndexArrayData::index_range].
    #[track_caller]
    pub fn get(&self, input: &[Index]) -> Result<Index, TransformError> {
        if input.len() != self.byte_strides.len() {
            return Err(TransformError::invalid_argument(format!(
                "Input vector of length {} does not match index array input rank {}",
                input.len(),
                self.byte_strides.len()
            )));
        }
        let mut byte_offset = self.base_byte_offset as i128;
        for (stride, x) in self.byte_strides.iter().zip(input.iter()) {
            byte_offset += *stride as i128 * *x as i128;
        }
        let value = isize::try_from(byte_offset)
            .ok()
            .and_then(|offset| self.array.get_at_byte_offset(offset));
        let Some(value) = value else {
            return Err(TransformError::out_of_range(format!(
                "Input {input:?} addresses byte offset {byte_offset} outside index array of shape {:?}",
                self.array.shape()
            )));
        };
        if !self.index_range.contains(value) {
            return Err(TransformError::out_of_range(format!(
                "Index {value} is outside valid range {}",
                self.index_range
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn make_array() -> IndexArray {
        IndexArray::try_new(vec![10, 11, 12, 20, 21, 22], &[2, 3]).unwrap()
    }

    #[test]
    fn test_shape_mismatch() {
        let err = IndexArray::try_new(vec![1, 2, 3], &[2, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_c_byte_strides() {
        let arr = make_array();
        assert_eq!(arr.c_byte_strides().as_slice(), &[3 * INDEX_SIZE, INDEX_SIZE]);
    }

    #[test]
    fn test_shared_buffer() {
        let arr = make_array();
        let other = arr.clone();
        assert!(arr.shares_buffer_with(&other));
        assert!(!arr.shares_buffer_with(&make_array()));
        assert_eq!(arr, make_array());
    }

    #[test]
    fn test_get() {
        let arr = make_array();
        let data = IndexArrayData::new(
            arr.clone(),
            0,
            arr.c_byte_strides(),
            IndexInterval::infinite(),
        );
        assert_eq!(data.get(&[1, 2]).unwrap(), 22);
        assert_eq!(data.get(&[0, 1]).unwrap(), 11);
        assert_eq!(data.dependent_dims().collect::<Vec<_>>(), vec![0, 1]);

        let err = data.get(&[2, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        let err = data.get(&[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_broadcast_and_range() {
        let arr = IndexArray::try_new(vec![1, 5, 9], &[1, 3]).unwrap();
        let data = IndexArrayData::new(
            arr,
            0,
            smallvec::smallvec![0, INDEX_SIZE],
            IndexInterval::try_new(0, 6).unwrap(),
        );
        assert!(!data.depends_on(0));
        assert!(data.depends_on(1));
        assert_eq!(data.get(&[100, 1]).unwrap(), 5);
        assert_eq!(data.get(&[-7, 1]).unwrap(), 5);
        let err = data.get(&[0, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }
}
