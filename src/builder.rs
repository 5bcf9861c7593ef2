use std::{collections::HashSet, sync::Arc};

use smallvec::smallvec;

use crate::{
    Dimension, Domain, INFINITE_INDEX, Index, IndexArray, IndexArrayData, IndexInterval,
    IndexTransform, OutputIndexMap, ShortVec, TransformError, TransformRep,
    index::{is_valid_lower_bound, is_valid_upper_bound},
    invariants::debug_check_invariants,
};

#[derive(Debug, Clone)]
enum PendingMap {
    Constant {
        offset: Index,
    },
    SingleInputDimension {
        input_dim: usize,
        offset: Index,
        stride: Index,
    },
    Array {
        offset: Index,
        stride: Index,
        array: IndexArray,
        index_range: IndexInterval,
    },
}

/// Validated construction of an [IndexTransform].
///
/// Bounds default to `(-inf, +inf)`.
/// Implicit flags default to `true` for infinite bounds and `false` for finite ones.
/// Output maps default to the constant 0.
#[derive(Debug, Clone)]
pub struct IndexTransformBuilder {
    input_rank: usize,
    lower_bounds: ShortVec<Index>,
    upper_bounds: ShortVec<Index>,
    implicit_lower_bounds: Option<ShortVec<bool>>,
    implicit_upper_bounds: Option<ShortVec<bool>>,
    labels: Vec<Option<String>>,
    output_maps: Vec<PendingMap>,
}

impl IndexTransformBuilder {
    pub fn new(input_rank: usize, output_rank: usize) -> Self {
        Self {
            input_rank,
            lower_bounds: smallvec![-INFINITE_INDEX; input_rank],
            upper_bounds: smallvec![INFINITE_INDEX; input_rank],
            implicit_lower_bounds: None,
            implicit_upper_bounds: None,
            labels: vec![None; input_rank],
            output_maps: vec![PendingMap::Constant { offset: 0 }; output_rank],
        }
    }

    fn check_len(&self, what: &str, len: usize) -> Result<(), TransformError> {
        if len != self.input_rank {
            return Err(TransformError::invalid_argument(format!(
                "{len} {what} given for input rank {}",
                self.input_rank
            )));
        }
        Ok(())
    }

    fn check_output_dim(&self, output_dim: usize) -> Result<(), TransformError> {
        if output_dim >= self.output_maps.len() {
            return Err(TransformError::out_of_range(format!(
                "Output dimension {output_dim} is outside valid range [0, {})",
                self.output_maps.len()
            )));
        }
        Ok(())
    }

    /// Inclusive lower bounds.
    pub fn lower_bounds(&mut self, bounds: &[Index]) -> Result<&mut Self, TransformError> {
        self.check_len("lower bounds", bounds.len())?;
        self.lower_bounds.copy_from_slice(bounds);
        Ok(self)
    }

    /// Exclusive upper bounds.
    pub fn upper_bounds(&mut self, bounds: &[Index]) -> Result<&mut Self, TransformError> {
        self.check_len("upper bounds", bounds.len())?;
        self.upper_bounds.copy_from_slice(bounds);
        Ok(self)
    }

    /// Upper bounds as `lower_bound + size`; set the lower bounds first.
    pub fn shape(&mut self, shape: &[Index]) -> Result<&mut Self, TransformError> {
        self.check_len("extents", shape.len())?;
        for (idx, (upper, (lower, size))) in self
            .upper_bounds
            .iter_mut()
            .zip(self.lower_bounds.iter().zip(shape.iter()))
            .enumerate()
        {
            *upper = IndexInterval::sized(*lower, *size)
                .map_err(|e| e.context(format_args!("Input dimension {idx}")))?
                .upper();
        }
        Ok(self)
    }

    pub fn implicit_lower_bounds(&mut self, implicit: &[bool]) -> Result<&mut Self, TransformError> {
        self.check_len("implicit lower bound flags", implicit.len())?;
        self.implicit_lower_bounds = Some(implicit.iter().copied().collect());
        Ok(self)
    }

    pub fn implicit_upper_bounds(&mut self, implicit: &[bool]) -> Result<&mut Self, TransformError> {
        self.check_len("implicit upper bound flags", implicit.len())?;
        self.implicit_upper_bounds = Some(implicit.iter().copied().collect());
        Ok(self)
    }

    /// Empty labels leave the dimension unlabelled.
    pub fn labels(&mut self, labels: &[&str]) -> Result<&mut Self, TransformError> {
        self.check_len("labels", labels.len())?;
        self.labels = labels
            .iter()
            .map(|l| (!l.is_empty()).then(|| l.to_string()))
            .collect();
        Ok(self)
    }

    /// `out[output_dim] = offset`
    pub fn output_constant(
        &mut self,
        output_dim: usize,
        offset: Index,
    ) -> Result<&mut Self, TransformError> {
        self.check_output_dim(output_dim)?;
        self.output_maps[output_dim] = PendingMap::Constant { offset };
        Ok(self)
    }

    /// `out[output_dim] = offset + stride * in[input_dim]`
    pub fn output_single_input_dimension(
        &mut self,
        output_dim: usize,
        offset: Index,
        stride: Index,
        input_dim: usize,
    ) -> Result<&mut Self, TransformError> {
        self.check_output_dim(output_dim)?;
        if input_dim >= self.input_rank {
            return Err(TransformError::out_of_range(format!(
                "Input dimension {input_dim} specified for output dimension {output_dim} \
                 is outside valid range [0, {})",
                self.input_rank
            )));
        }
        self.output_maps[output_dim] = PendingMap::SingleInputDimension {
            input_dim,
            offset,
            stride,
        };
        Ok(self)
    }

    /// `out[output_dim] = offset + stride * array[in - lower_bounds]`
    ///
    /// The array has one dimension per input dimension.
    /// Its extent in each dimension is either 1, meaning that input dimension
    /// does not take part in addressing, or the size of the input dimension,
    /// which must then have finite, explicit bounds.
    /// Values read from the array are checked against `index_range`.
    /// Shapes are checked by [IndexTransformBuilder::build].
    pub fn output_index_array(
        &mut self,
        output_dim: usize,
        offset: Index,
        stride: Index,
        array: IndexArray,
        index_range: IndexInterval,
    ) -> Result<&mut Self, TransformError> {
        self.check_output_dim(output_dim)?;
        self.output_maps[output_dim] = PendingMap::Array {
            offset,
            stride,
            array,
            index_range,
        };
        Ok(self)
    }

    fn build_domain(&self) -> Result<Domain, TransformError> {
        let implicit = |flags: &Option<ShortVec<bool>>, idx: usize, bound: Index| match flags {
            Some(f) => f[idx],
            None => !crate::is_finite(bound),
        };
        let mut seen_labels = HashSet::with_capacity(self.input_rank);
        let mut dims = Vec::with_capacity(self.input_rank);
        for idx in 0..self.input_rank {
            let lower = self.lower_bounds[idx];
            let upper = self.upper_bounds[idx];
            let mut dim = Dimension::new(lower, upper).with_implicit(
                implicit(&self.implicit_lower_bounds, idx, lower),
                implicit(&self.implicit_upper_bounds, idx, upper),
            );
            if let Some(label) = &self.labels[idx] {
                if !seen_labels.insert(label.as_str()) {
                    return Err(TransformError::invalid_argument(format!(
                        "Dimension label {label:?} is not unique"
                    )));
                }
                dim = dim.with_label(label.clone());
            }
            dims.push(dim);
        }
        let domain = Domain::new(dims);
        validate_domain(&domain)?;
        Ok(domain)
    }

    fn build_array_data(
        domain: &Domain,
        output_dim: usize,
        array: &IndexArray,
        index_range: IndexInterval,
    ) -> Result<IndexArrayData, TransformError> {
        if array.ndim() != domain.rank() {
            return Err(TransformError::invalid_argument(format!(
                "Index array for output dimension {output_dim} has rank {} \
                 but input rank is {}",
                array.ndim(),
                domain.rank()
            )));
        }
        let mut byte_strides = array.c_byte_strides();
        let mut base_byte_offset: isize = 0;
        for (input_dim, ((stride, extent), dim)) in byte_strides
            .iter_mut()
            .zip(array.shape().iter())
            .zip(domain.iter())
            .enumerate()
        {
            if *extent == 1 {
                *stride = 0;
                continue;
            }
            if dim.implicit_lower_bound() || dim.implicit_upper_bound() {
                return Err(TransformError::invalid_argument(format!(
                    "Input dimension {input_dim} indexes the index array map \
                     for output dimension {output_dim} and must have explicit bounds"
                )));
            }
            let size = dim.upper_bound().checked_sub(dim.lower_bound());
            if !crate::is_finite(dim.lower_bound())
                || !crate::is_finite(dim.upper_bound())
                || size != Some(*extent as Index)
            {
                return Err(TransformError::invalid_argument(format!(
                    "Index array for output dimension {output_dim} has extent {extent} \
                     in dimension {input_dim}, but the input domain is {dim}"
                )));
            }
            let Some(offset) = (*stride as i128)
                .checked_mul(dim.lower_bound() as i128)
                .and_then(|o| isize::try_from(o).ok())
                .and_then(|o| base_byte_offset.checked_sub(o))
            else {
                return Err(TransformError::out_of_range(format!(
                    "Overflow computing index array offset for output dimension {output_dim}"
                )));
            };
            base_byte_offset = offset;
        }
        Ok(IndexArrayData::new(
            array.clone(),
            base_byte_offset,
            byte_strides,
            index_range,
        ))
    }

    pub fn build(self) -> Result<IndexTransform, TransformError> {
        let domain = self.build_domain()?;
        let mut output_maps = Vec::with_capacity(self.output_maps.len());
        for (output_dim, pending) in self.output_maps.into_iter().enumerate() {
            let map = match pending {
                PendingMap::Constant { offset } => OutputIndexMap::Constant { offset },
                PendingMap::SingleInputDimension {
                    input_dim,
                    offset,
                    stride,
                } => OutputIndexMap::SingleInputDimension {
                    input_dim,
                    offset,
                    stride,
                },
                PendingMap::Array {
                    offset,
                    stride,
                    array,
                    index_range,
                } => OutputIndexMap::Array {
                    offset,
                    stride,
                    data: Self::build_array_data(&domain, output_dim, &array, index_range)?,
                },
            };
            output_maps.push(map);
        }
        let t = IndexTransform::from_rep(Arc::new(TransformRep::new(domain, output_maps)));
        debug_check_invariants(&t);
        Ok(t)
    }
}

/// Check that every bound is a valid bound for its side.
#[track_caller]
pub(crate) fn validate_domain(domain: &Domain) -> Result<(), TransformError> {
    for (idx, dim) in domain.iter().enumerate() {
        if !is_valid_lower_bound(dim.lower_bound()) {
            return Err(TransformError::invalid_argument(format!(
                "Lower bound {} for input dimension {idx} is invalid",
                dim.lower_bound()
            )));
        }
        if !is_valid_upper_bound(dim.upper_bound()) {
            return Err(TransformError::invalid_argument(format!(
                "Upper bound {} for input dimension {idx} is invalid",
                dim.upper_bound()
            )));
        }
    }
    Ok(())
}
