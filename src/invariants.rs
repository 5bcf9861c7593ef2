//! Structural self-consistency of a [TransformRep].
//!
//! A violation is a bug in this crate, not bad caller input:
//! everything reachable from the public API validates its input first.
use crate::{
    Index, IndexTransform, OutputIndexMap, TransformRep,
    index::{is_valid_lower_bound, is_valid_upper_bound},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("domain has {actual} dimensions but input rank is {expected}")]
    DomainRank { expected: usize, actual: usize },

    #[error("{actual} output index maps for output rank {expected}")]
    OutputMapCount { expected: usize, actual: usize },

    #[error(
        "output dimension {output_dim} references input dimension {input_dim} \
         of a rank {input_rank} domain"
    )]
    InputDimOutOfRange {
        output_dim: usize,
        input_dim: usize,
        input_rank: usize,
    },

    #[error(
        "index array map for output dimension {output_dim} has {actual} byte strides \
         for input rank {expected}"
    )]
    ByteStridesLength {
        output_dim: usize,
        expected: usize,
        actual: usize,
    },

    #[error("input dimension {input_dim} has invalid lower bound {bound}")]
    InvalidLowerBound { input_dim: usize, bound: Index },

    #[error("input dimension {input_dim} has invalid upper bound {bound}")]
    InvalidUpperBound { input_dim: usize, bound: Index },
}

impl TransformRep {
    /// Check structural consistency, reporting the first violation found.
    ///
    /// Inverted explicit bounds are legal: they make the domain explicitly empty.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let input_rank = self.input_rank();
        if self.domain().rank() != input_rank {
            return Err(InvariantViolation::DomainRank {
                expected: input_rank,
                actual: self.domain().rank(),
            });
        }
        if self.output_maps().len() != self.output_rank() {
            return Err(InvariantViolation::OutputMapCount {
                expected: self.output_rank(),
                actual: self.output_maps().len(),
            });
        }
        for (input_dim, dim) in self.domain().iter().enumerate() {
            if !is_valid_lower_bound(dim.lower_bound()) {
                return Err(InvariantViolation::InvalidLowerBound {
                    input_dim,
                    bound: dim.lower_bound(),
                });
            }
            if !is_valid_upper_bound(dim.upper_bound()) {
                return Err(InvariantViolation::InvalidUpperBound {
                    input_dim,
                    bound: dim.upper_bound(),
                });
            }
        }
        for (output_dim, map) in self.output_maps().iter().enumerate() {
            match map {
                OutputIndexMap::Constant { .. } => {}
                OutputIndexMap::SingleInputDimension { input_dim, .. } => {
                    if *input_dim >= input_rank {
                        return Err(InvariantViolation::InputDimOutOfRange {
                            output_dim,
                            input_dim: *input_dim,
                            input_rank,
                        });
                    }
                }
                OutputIndexMap::Array { data, .. } => {
                    // with the length right, every nonzero stride addresses a valid dimension
                    if data.byte_strides().len() != input_rank {
                        return Err(InvariantViolation::ByteStridesLength {
                            output_dim,
                            expected: input_rank,
                            actual: data.byte_strides().len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl IndexTransform {
    /// Abort if the representation is inconsistent.
    ///
    /// # Panics
    ///
    /// On any [InvariantViolation].
    pub fn assert_invariants(&self) {
        if let Err(violation) = self.rep().check_invariants() {
            panic!("index transform invariant violated: {violation}\n{self}");
        }
    }
}

/// [IndexTransform::assert_invariants] in debug builds,
/// or with the `invariant-checks` feature; otherwise nothing.
#[inline]
pub(crate) fn debug_check_invariants(transform: &IndexTransform) {
    if cfg!(any(debug_assertions, feature = "invariant-checks")) {
        transform.assert_invariants();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests::array_transform;
    use crate::{Dimension, Domain, INFINITE_INDEX, IndexInterval};

    fn corrupt(
        input_rank: usize,
        output_rank: usize,
        domain: Domain,
        output_maps: Vec<OutputIndexMap>,
    ) -> IndexTransform {
        IndexTransform::from_rep(Arc::new(TransformRep::from_raw_parts(
            input_rank,
            output_rank,
            domain,
            output_maps,
        )))
    }

    fn single(input_dim: usize) -> OutputIndexMap {
        OutputIndexMap::SingleInputDimension {
            input_dim,
            offset: 0,
            stride: 1,
        }
    }

    #[test]
    fn test_valid() {
        assert_eq!(array_transform().rep().check_invariants(), Ok(()));
        assert_eq!(IndexTransform::identity(4).rep().check_invariants(), Ok(()));
        array_transform().assert_invariants();
    }

    #[test]
    fn test_domain_rank() {
        let t = corrupt(2, 0, Domain::unbounded(1), vec![]);
        assert_eq!(
            t.rep().check_invariants(),
            Err(InvariantViolation::DomainRank {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_output_map_count() {
        let t = corrupt(1, 2, Domain::unbounded(1), vec![single(0)]);
        assert!(matches!(
            t.rep().check_invariants(),
            Err(InvariantViolation::OutputMapCount { .. })
        ));
    }

    #[test]
    fn test_input_dim_out_of_range() {
        let t = corrupt(1, 1, Domain::unbounded(1), vec![single(1)]);
        assert_eq!(
            t.rep().check_invariants(),
            Err(InvariantViolation::InputDimOutOfRange {
                output_dim: 0,
                input_dim: 1,
                input_rank: 1
            })
        );
    }

    #[test]
    fn test_byte_strides_length() {
        let good = array_transform();
        let domain = Domain::unbounded(3);
        let t = corrupt(3, 1, domain, good.output_maps().to_vec());
        assert!(matches!(
            t.rep().check_invariants(),
            Err(InvariantViolation::ByteStridesLength {
                output_dim: 0,
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_bound_sentinels() {
        let domain = Domain::new(vec![Dimension::new(INFINITE_INDEX, INFINITE_INDEX)]);
        let t = corrupt(1, 0, domain, vec![]);
        assert!(matches!(
            t.rep().check_invariants(),
            Err(InvariantViolation::InvalidLowerBound { input_dim: 0, .. })
        ));

        let domain = Domain::new(vec![Dimension::new(0, -INFINITE_INDEX)]);
        let t = corrupt(1, 0, domain, vec![]);
        assert!(matches!(
            t.rep().check_invariants(),
            Err(InvariantViolation::InvalidUpperBound { input_dim: 0, .. })
        ));
    }

    #[test]
    fn test_inverted_bounds_are_consistent() {
        let domain = Domain::new(vec![Dimension::new(5, 3)]);
        let t = corrupt(1, 1, domain, vec![OutputIndexMap::Constant { offset: 0 }]);
        assert_eq!(t.rep().check_invariants(), Ok(()));
        // sanity check that the interval type itself would reject these bounds
        assert!(IndexInterval::try_new(5, 3).is_err());
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn test_assert_panics() {
        let t = corrupt(1, 1, Domain::unbounded(1), vec![single(3)]);
        t.assert_invariants();
    }
}
