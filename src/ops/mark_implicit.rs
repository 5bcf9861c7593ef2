use crate::{
    DimensionSelection, IndexTransform, OutputIndexMap, Rejected, TransformError, TransformRep,
};

use super::{DimensionOperation, apply_operation};

/// Mark the lower and/or upper bounds of the selected dimensions as implicit or explicit.
///
/// A dimension which indexes an index-array output map cannot have its bounds made
/// implicit: the array's addressing domain would no longer be fixed.
/// Making bounds explicit may leave the domain explicitly empty,
/// in which case every index-array map becomes a constant map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkImplicit {
    pub implicit: bool,
    pub lower: bool,
    pub upper: bool,
    pub domain_only: bool,
}

impl MarkImplicit {
    pub fn new(implicit: bool, lower: bool, upper: bool) -> Self {
        Self {
            implicit,
            lower,
            upper,
            domain_only: false,
        }
    }

    pub fn with_domain_only(mut self, domain_only: bool) -> Self {
        self.domain_only = domain_only;
        self
    }
}

impl DimensionOperation for MarkImplicit {
    fn is_noop(&self) -> bool {
        !self.lower && !self.upper
    }

    fn domain_only(&self) -> bool {
        self.domain_only
    }

    fn validate(&self, rep: &TransformRep, dims: &DimensionSelection) -> Result<(), TransformError> {
        if !self.implicit {
            return Ok(());
        }
        for (output_dim, map) in rep.output_maps().iter().enumerate() {
            let OutputIndexMap::Array { data, .. } = map else {
                continue;
            };
            if let Some(input_dim) = dims.iter().find(|d| data.depends_on(*d)) {
                return Err(TransformError::invalid_argument(format!(
                    "Cannot mark input dimension {input_dim} as having implicit bounds \
                     because it indexes the index array map for output dimension {output_dim}"
                )));
            }
        }
        Ok(())
    }

    fn apply(&self, rep: &mut TransformRep, dims: &DimensionSelection) {
        let domain = rep.domain_mut();
        for input_dim in dims.iter() {
            let dim = &mut domain[input_dim];
            if self.lower {
                dim.set_implicit_lower_bound(self.implicit);
            }
            if self.upper {
                dim.set_implicit_upper_bound(self.implicit);
            }
        }
        if !self.implicit && rep.is_domain_explicitly_empty() {
            let n_replaced = rep.replace_all_index_array_maps_with_constant_maps();
            if n_replaced > 0 {
                log::debug!(
                    "Domain is explicitly empty; replaced {n_replaced} index array maps with constants"
                );
            }
        }
    }
}

/// Set the implicit state of the selected bounds.
///
/// With neither `lower` nor `upper`, returns `transform` itself without copying.
pub fn change_implicit_state(
    transform: IndexTransform,
    dims: &DimensionSelection,
    implicit: bool,
    lower: bool,
    upper: bool,
    domain_only: bool,
) -> Result<IndexTransform, Rejected> {
    let op = MarkImplicit::new(implicit, lower, upper).with_domain_only(domain_only);
    apply_operation(transform, dims, &op)
}

impl IndexTransform {
    /// Mark the selected lower and/or upper bounds as implicit.
    ///
    /// Fails if a selected dimension indexes an index-array output map.
    pub fn mark_bounds_implicit(
        self,
        dims: &DimensionSelection,
        lower: bool,
        upper: bool,
    ) -> Result<Self, Rejected> {
        change_implicit_state(self, dims, true, lower, upper, false)
    }

    /// Mark the selected lower and/or upper bounds as explicit.
    ///
    /// Never fails; the result is a [Result] for symmetry with
    /// [IndexTransform::mark_bounds_implicit].
    pub fn mark_bounds_explicit(
        self,
        dims: &DimensionSelection,
        lower: bool,
        upper: bool,
    ) -> Result<Self, Rejected> {
        change_implicit_state(self, dims, false, lower, upper, false)
    }
}
