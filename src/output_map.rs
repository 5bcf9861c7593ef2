use std::fmt;

use crate::{Index, IndexArrayData, TransformError};

/// Discriminant of an [OutputIndexMap].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputIndexMethod {
    Constant,
    SingleInputDimension,
    Array,
}

/// How one output coordinate is derived from the input coordinate vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputIndexMap {
    /// `output = offset`
    Constant { offset: Index },
    /// `output = offset + stride * input[input_dim]`
    SingleInputDimension {
        input_dim: usize,
        offset: Index,
        stride: Index,
    },
    /// `output = offset + stride * array[position(input)]`
    Array {
        offset: Index,
        stride: Index,
        data: IndexArrayData,
    },
}

impl OutputIndexMap {
    pub fn method(&self) -> OutputIndexMethod {
        match self {
            OutputIndexMap::Constant { .. } => OutputIndexMethod::Constant,
            OutputIndexMap::SingleInputDimension { .. } => OutputIndexMethod::SingleInputDimension,
            OutputIndexMap::Array { .. } => OutputIndexMethod::Array,
        }
    }

    pub fn offset(&self) -> Index {
        match self {
            OutputIndexMap::Constant { offset }
            | OutputIndexMap::SingleInputDimension { offset, .. }
            | OutputIndexMap::Array { offset, .. } => *offset,
        }
    }

    /// Zero for constant maps.
    pub fn stride(&self) -> Index {
        match self {
            OutputIndexMap::Constant { .. } => 0,
            OutputIndexMap::SingleInputDimension { stride, .. }
            | OutputIndexMap::Array { stride, .. } => *stride,
        }
    }

    pub fn index_array_data(&self) -> Option<&IndexArrayData> {
        match self {
            OutputIndexMap::Array { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Whether the output depends on the given input dimension.
    pub fn depends_on(&self, input_dim: usize) -> bool {
        match self {
            OutputIndexMap::Constant { .. } => false,
            OutputIndexMap::SingleInputDimension {
                input_dim: d,
                stride,
                ..
            } => *d == input_dim && *stride != 0,
            OutputIndexMap::Array { stride, data, .. } => *stride != 0 && data.depends_on(input_dim),
        }
    }

    /// Compute the output coordinate for the given input coordinate vector.
    ///
    /// Does not check the input against the domain; see [crate::IndexTransform::transform_indices].
    #[track_caller]
    pub fn evaluate(&self, input: &[Index]) -> Result<Index, TransformError> {
        let (offset, stride, value) = match self {
            OutputIndexMap::Constant { offset } => return Ok(*offset),
            OutputIndexMap::SingleInputDimension {
                input_dim,
                offset,
                stride,
            } => {
                let Some(value) = input.get(*input_dim) else {
                    return Err(TransformError::invalid_argument(format!(
                        "Input dimension {input_dim} is outside input vector of length {}",
                        input.len()
                    )));
                };
                (*offset, *stride, *value)
            }
            OutputIndexMap::Array {
                offset,
                stride,
                data,
            } => (*offset, *stride, data.get(input)?),
        };
        let result = stride
            .checked_mul(value)
            .and_then(|v| v.checked_add(offset))
            .filter(|v| crate::is_finite(*v));
        let Some(result) = result else {
            return Err(TransformError::out_of_range(format!(
                "Integer overflow computing {offset} + {stride} * {value}"
            )));
        };
        Ok(result)
    }
}

impl fmt::Display for OutputIndexMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputIndexMap::Constant { offset } => write!(f, "{offset}"),
            OutputIndexMap::SingleInputDimension {
                input_dim,
                offset,
                stride,
            } => write!(f, "{offset} + {stride} * in[{input_dim}]"),
            OutputIndexMap::Array {
                offset,
                stride,
                data,
            } => write!(
                f,
                "{offset} + {stride} * bounded({}, array(in))",
                data.index_range()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, INDEX_SIZE, IndexArray, IndexInterval, MAX_FINITE_INDEX};

    fn array_map() -> OutputIndexMap {
        let array = IndexArray::try_new(vec![4, 7, 9], &[1, 3]).unwrap();
        OutputIndexMap::Array {
            offset: 1,
            stride: 10,
            data: IndexArrayData::new(
                array,
                0,
                smallvec::smallvec![0, INDEX_SIZE],
                IndexInterval::infinite(),
            ),
        }
    }

    #[test]
    fn test_constant() {
        let map = OutputIndexMap::Constant { offset: 5 };
        assert_eq!(map.evaluate(&[1, 2, 3]).unwrap(), 5);
        assert_eq!(map.method(), OutputIndexMethod::Constant);
        assert!(!map.depends_on(0));
    }

    #[test]
    fn test_single_input_dimension() {
        let map = OutputIndexMap::SingleInputDimension {
            input_dim: 1,
            offset: 3,
            stride: -2,
        };
        assert_eq!(map.evaluate(&[100, 4]).unwrap(), -5);
        assert!(map.depends_on(1));
        assert!(!map.depends_on(0));

        let err = map.evaluate(&[100]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_array() {
        let map = array_map();
        assert_eq!(map.evaluate(&[0, 2]).unwrap(), 91);
        // dimension 0 has a zero byte stride, so it cannot change the result
        assert_eq!(map.evaluate(&[1234, 2]).unwrap(), 91);
        assert!(!map.depends_on(0));
        assert!(map.depends_on(1));
        assert!(map.index_array_data().is_some());
    }

    #[test]
    fn test_array_input_length() {
        let map = array_map();
        let err = map.evaluate(&[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = map.evaluate(&[0, 1, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_overflow() {
        let map = OutputIndexMap::SingleInputDimension {
            input_dim: 0,
            offset: 1,
            stride: 2,
        };
        let err = map.evaluate(&[MAX_FINITE_INDEX]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_display() {
        let map = OutputIndexMap::SingleInputDimension {
            input_dim: 1,
            offset: 3,
            stride: 2,
        };
        assert_eq!(map.to_string(), "3 + 2 * in[1]");
        assert_eq!(
            array_map().to_string(),
            "1 + 10 * bounded([-inf, +inf), array(in))"
        );
    }
}
