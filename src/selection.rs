use smallvec::ToSmallVec;

use crate::{Domain, ShortVec, TransformError};

/// An ordered list of distinct input dimension indices, valid for one input rank.
///
/// Range and duplicate checks happen here, once;
/// operators only check that the rank matches the transform's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DimensionSelection {
    dims: ShortVec<usize>,
    input_rank: usize,
}

impl DimensionSelection {
    /// Fails if any index is not below `input_rank` or appears twice.
    #[track_caller]
    pub fn try_new(dims: &[usize], input_rank: usize) -> Result<Self, TransformError> {
        for (idx, dim) in dims.iter().enumerate() {
            if *dim >= input_rank {
                return Err(TransformError::out_of_range(format!(
                    "Dimension index {dim} is outside valid range [0, {input_rank})"
                )));
            }
            if dims[..idx].contains(dim) {
                return Err(TransformError::invalid_argument(format!(
                    "Input dimension {dim} specified more than once"
                )));
            }
        }
        Ok(Self {
            dims: dims.to_smallvec(),
            input_rank,
        })
    }

    /// Resolve dimension labels against a domain, keeping their order.
    #[track_caller]
    pub fn from_labels(labels: &[&str], domain: &Domain) -> Result<Self, TransformError> {
        let mut dims: ShortVec<usize> = ShortVec::with_capacity(labels.len());
        for label in labels.iter() {
            let Some(dim) = domain.find_label(label) else {
                let known: Vec<_> = domain.iter().filter_map(|d| d.label()).collect();
                return Err(TransformError::invalid_argument(format!(
                    "Label {label:?} does not match one of {known:?}"
                )));
            };
            if dims.contains(&dim) {
                return Err(TransformError::invalid_argument(format!(
                    "Input dimension {dim} specified more than once"
                )));
            }
            dims.push(dim);
        }
        Ok(Self {
            dims,
            input_rank: domain.rank(),
        })
    }

    /// Every dimension `0..input_rank`, in order.
    pub fn all(input_rank: usize) -> Self {
        Self {
            dims: (0..input_rank).collect(),
            input_rank,
        }
    }

    /// The input rank the selection was checked against.
    pub fn input_rank(&self) -> usize {
        self.input_rank
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dims.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn contains(&self, dim: usize) -> bool {
        self.dims.contains(&dim)
    }
}
