use std::{fmt, sync::Arc};

use smallvec::SmallVec;

use crate::{
    Dimension, Domain, Index, IndexTransformBuilder, OutputIndexMap, ShortVec, TransformError,
    TransformRep, invariants::debug_check_invariants,
};

/// A shared, copy-on-write handle to an index transform.
///
/// Cloning is cheap: handles share one representation via an atomic reference count.
/// Operators take the handle by value and only copy the representation if it is shared,
/// so no operation ever changes what another handle observes.
/// Equality compares contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTransform {
    rep: Arc<TransformRep>,
}

impl IndexTransform {
    pub(crate) fn from_rep(rep: Arc<TransformRep>) -> Self {
        Self { rep }
    }

    pub(crate) fn into_rep(self) -> Arc<TransformRep> {
        self.rep
    }

    pub fn builder(input_rank: usize, output_rank: usize) -> IndexTransformBuilder {
        IndexTransformBuilder::new(input_rank, output_rank)
    }

    /// Identity over an unbounded domain of the given rank.
    pub fn identity(rank: usize) -> Self {
        Self::identity_over(Domain::unbounded(rank))
    }

    /// Identity over the given domain.
    ///
    /// Fails if any bound is not a valid bound for its side.
    #[track_caller]
    pub fn from_domain(domain: Domain) -> Result<Self, TransformError> {
        crate::builder::validate_domain(&domain)?;
        Ok(Self::identity_over(domain))
    }

    fn identity_over(domain: Domain) -> Self {
        let output_maps = (0..domain.rank())
            .map(|input_dim| OutputIndexMap::SingleInputDimension {
                input_dim,
                offset: 0,
                stride: 1,
            })
            .collect();
        let t = Self::from_rep(Arc::new(TransformRep::new(domain, output_maps)));
        debug_check_invariants(&t);
        t
    }

    pub fn input_rank(&self) -> usize {
        self.rep.input_rank()
    }

    pub fn output_rank(&self) -> usize {
        self.rep.output_rank()
    }

    pub fn domain(&self) -> &Domain {
        self.rep.domain()
    }

    pub fn output_maps(&self) -> &[OutputIndexMap] {
        self.rep.output_maps()
    }

    pub fn rep(&self) -> &TransformRep {
        &self.rep
    }

    /// Whether both handles reference the same representation object.
    pub fn shares_rep_with(&self, other: &IndexTransform) -> bool {
        Arc::ptr_eq(&self.rep, &other.rep)
    }

    /// Number of handles currently sharing this representation.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.rep)
    }

    /// Map an input coordinate vector to the output coordinate vector.
    ///
    /// Fails if the input has the wrong length or lies outside the domain
    /// (implicit bounds are still the current bounds),
    /// or if any output map fails to evaluate.
    #[track_caller]
    pub fn transform_indices(&self, input: &[Index]) -> Result<ShortVec<Index>, TransformError> {
        if input.len() != self.input_rank() {
            return Err(TransformError::invalid_argument(format!(
                "Input vector of length {} does not match input rank {}",
                input.len(),
                self.input_rank()
            )));
        }
        for (idx, (x, dim)) in input.iter().zip(self.domain().iter()).enumerate() {
            if !dim.contains(*x) {
                return Err(TransformError::out_of_range(format!(
                    "Index {x} is not contained in the domain {} for input dimension {idx}",
                    DimensionBounds(dim)
                )));
            }
        }
        let mut out = SmallVec::with_capacity(self.output_rank());
        for (output_dim, map) in self.output_maps().iter().enumerate() {
            match map.evaluate(input) {
                Ok(v) => out.push(v),
                Err(e) => return Err(e.context(format_args!("Output dimension {output_dim}"))),
            }
        }
        Ok(out)
    }
}

/// Bounds of a dimension, without its label.
struct DimensionBounds<'a>(&'a Dimension);

impl fmt::Display for DimensionBounds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = self.0;
        if dim.label().is_none() {
            return write!(f, "{dim}");
        }
        let unlabelled = Dimension::new(dim.lower_bound(), dim.upper_bound())
            .with_implicit(dim.implicit_lower_bound(), dim.implicit_upper_bound());
        write!(f, "{unlabelled}")
    }
}

impl fmt::Display for IndexTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Rank {} -> {} index space transform:",
            self.input_rank(),
            self.output_rank()
        )?;
        writeln!(f, "  Input domain:")?;
        for (idx, dim) in self.domain().iter().enumerate() {
            writeln!(f, "    {idx}: {dim}")?;
        }
        writeln!(f, "  Output index maps:")?;
        for (idx, map) in self.output_maps().iter().enumerate() {
            writeln!(f, "    out[{idx}] = {map}")?;
        }
        Ok(())
    }
}
