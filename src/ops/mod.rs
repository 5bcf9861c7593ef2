//! Operators which change the dimensions of a transform.
//!
//! Every operator follows the same protocol, enforced by [apply_operation]:
//!
//! 1. validate against the current, possibly shared, representation;
//! 2. only then obtain a private copy and write to it;
//! 3. re-check invariants before handing the result back.
//!
//! A failed operator hands back the caller's transform untouched, inside a [Rejected].
use std::fmt;

use crate::{
    DimensionSelection, IndexTransform, Rejected, TransformError, TransformRep,
    invariants::debug_check_invariants, rep::make_mutable,
};

mod mark_implicit;
pub use mark_implicit::{MarkImplicit, change_implicit_state};

/// A dimension-altering operator.
///
/// All fallible work belongs in [DimensionOperation::validate];
/// [DimensionOperation::apply] cannot fail, so a transform is never left half-changed.
pub trait DimensionOperation: fmt::Debug {
    /// Whether applying the operator would change nothing,
    /// in which case the input transform is returned as-is.
    fn is_noop(&self) -> bool {
        false
    }

    /// Whether only the domain is changed, so that output maps may stay shared.
    fn domain_only(&self) -> bool {
        false
    }

    /// Check preconditions against the pre-mutation state.
    fn validate(&self, rep: &TransformRep, dims: &DimensionSelection)
    -> Result<(), TransformError>;

    /// Mutate a private representation which has passed [DimensionOperation::validate].
    ///
    /// Must not change the output rank.
    fn apply(&self, rep: &mut TransformRep, dims: &DimensionSelection);
}

/// Run `op` on the selected input dimensions of `transform`.
///
/// Fails if `dims` was built for a different input rank.
pub fn apply_operation<O: DimensionOperation + ?Sized>(
    transform: IndexTransform,
    dims: &DimensionSelection,
    op: &O,
) -> Result<IndexTransform, Rejected> {
    if dims.input_rank() != transform.input_rank() {
        let error = TransformError::invalid_argument(format!(
            "Dimension selection {:?} for input rank {} does not apply to input rank {}",
            dims.as_slice(),
            dims.input_rank(),
            transform.input_rank()
        ));
        log::debug!("Rejected {op:?}: {error}");
        return Err(Rejected { transform, error });
    }
    if op.is_noop() {
        log::trace!("{op:?} is a no-op");
        return Ok(transform);
    }
    if let Err(error) = op.validate(transform.rep(), dims) {
        log::debug!("Rejected {op:?} on dimensions {:?}: {error}", dims.as_slice());
        return Err(Rejected { transform, error });
    }

    let mut rep = transform.into_rep();
    let output_rank = rep.output_rank();
    let private = make_mutable(&mut rep, op.domain_only());
    op.apply(private, dims);
    debug_assert_eq!(private.output_rank(), output_rank);

    let transform = IndexTransform::from_rep(rep);
    debug_check_invariants(&transform);
    Ok(transform)
}
