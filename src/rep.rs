//! The shared representation behind an [crate::IndexTransform], and copy-on-write access to it.
use std::sync::Arc;

use crate::{Domain, OutputIndexMap};

/// Input domain plus one output index map per output dimension.
///
/// The domain and the output maps are separately reference-counted,
/// so that an operator which only changes bounds can leave the maps shared.
/// Equality compares contents, not identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRep {
    input_rank: usize,
    output_rank: usize,
    domain: Arc<Domain>,
    output_maps: Arc<Vec<OutputIndexMap>>,
}

impl TransformRep {
    pub(crate) fn new(domain: Domain, output_maps: Vec<OutputIndexMap>) -> Self {
        Self {
            input_rank: domain.rank(),
            output_rank: output_maps.len(),
            domain: Arc::new(domain),
            output_maps: Arc::new(output_maps),
        }
    }

    /// Assemble a representation without any consistency checks,
    /// for exercising the invariant checker.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(
        input_rank: usize,
        output_rank: usize,
        domain: Domain,
        output_maps: Vec<OutputIndexMap>,
    ) -> Self {
        Self {
            input_rank,
            output_rank,
            domain: Arc::new(domain),
            output_maps: Arc::new(output_maps),
        }
    }

    pub fn input_rank(&self) -> usize {
        self.input_rank
    }

    pub fn output_rank(&self) -> usize {
        self.output_rank
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn output_maps(&self) -> &[OutputIndexMap] {
        &self.output_maps
    }

    /// Private access to the domain, cloning it first if it is shared.
    pub(crate) fn domain_mut(&mut self) -> &mut Domain {
        if Arc::get_mut(&mut self.domain).is_none() {
            log::trace!("Cloning shared domain of rank {}", self.input_rank);
        }
        Arc::make_mut(&mut self.domain)
    }

    /// Private access to the output maps, cloning them first if they are shared.
    ///
    /// The slice cannot change length, so the output rank is preserved.
    pub(crate) fn output_maps_mut(&mut self) -> &mut [OutputIndexMap] {
        if Arc::get_mut(&mut self.output_maps).is_none() {
            log::trace!("Cloning {} shared output index maps", self.output_rank);
        }
        Arc::make_mut(&mut self.output_maps).as_mut_slice()
    }

    /// Whether this and `other` hold the same domain object.
    pub fn shares_domain_with(&self, other: &TransformRep) -> bool {
        Arc::ptr_eq(&self.domain, &other.domain)
    }

    /// Whether this and `other` hold the same output map sequence.
    pub fn shares_output_maps_with(&self, other: &TransformRep) -> bool {
        Arc::ptr_eq(&self.output_maps, &other.output_maps)
    }

    pub fn is_domain_explicitly_empty(&self) -> bool {
        self.domain.is_explicitly_empty()
    }

    /// Replace every index-array map with a constant map,
    /// dropping this representation's references to the index-array buffers.
    ///
    /// The replacement offset is 0;
    /// it is only meaningful for a domain which can never be addressed.
    /// Returns the number of maps replaced.
    /// The output maps are only made private if there is something to replace.
    pub(crate) fn replace_all_index_array_maps_with_constant_maps(&mut self) -> usize {
        let n_array_maps = self
            .output_maps
            .iter()
            .filter(|m| matches!(m, OutputIndexMap::Array { .. }))
            .count();
        if n_array_maps == 0 {
            return 0;
        }
        for map in self.output_maps_mut().iter_mut() {
            if let OutputIndexMap::Array { .. } = map {
                *map = OutputIndexMap::Constant { offset: 0 };
            }
        }
        n_array_maps
    }
}

/// Obtain a uniquely owned representation which can be mutated
/// without any effect observable through other handles.
///
/// The representation is cloned only if it is shared;
/// the clone is shallow, copying the reference-counted domain and map pointers.
/// The domain is then made private, and so are the output maps unless `domain_only`.
/// Maps left shared are still copied on write by [TransformRep::output_maps_mut].
pub(crate) fn make_mutable(rep: &mut Arc<TransformRep>, domain_only: bool) -> &mut TransformRep {
    if Arc::get_mut(rep).is_none() {
        log::trace!(
            "Cloning shared rank {} -> {} transform representation",
            rep.input_rank,
            rep.output_rank
        );
    }
    let rep = Arc::make_mut(rep);
    rep.domain_mut();
    if !domain_only {
        rep.output_maps_mut();
    }
    rep
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests::{array_transform, init_logger};

    #[test]
    fn test_make_mutable_unique_does_not_clone() {
        init_logger();
        let mut rep = Arc::new(array_transform().rep().clone());
        let before = Arc::as_ptr(&rep);
        let domain_before = Arc::as_ptr(&rep.domain);
        let maps_before = Arc::as_ptr(&rep.output_maps);

        make_mutable(&mut rep, false);

        assert_eq!(Arc::as_ptr(&rep), before);
        assert_eq!(Arc::as_ptr(&rep.domain), domain_before);
        assert_eq!(Arc::as_ptr(&rep.output_maps), maps_before);
    }

    #[test]
    fn test_make_mutable_shared_clones() {
        init_logger();
        let original = Arc::new(array_transform().rep().clone());
        let mut rep = original.clone();

        make_mutable(&mut rep, false);

        assert!(!Arc::ptr_eq(&rep, &original));
        assert!(!rep.shares_domain_with(&original));
        assert!(!rep.shares_output_maps_with(&original));
        assert_eq!(*rep, *original);
    }

    #[test]
    fn test_make_mutable_domain_only() {
        init_logger();
        let original = Arc::new(array_transform().rep().clone());
        let mut rep = original.clone();

        let private = make_mutable(&mut rep, true);
        private.domain_mut().get_mut(0).unwrap().set_implicit_lower_bound(true);

        assert!(!rep.shares_domain_with(&original));
        assert!(rep.shares_output_maps_with(&original));
        assert!(!original.domain()[0].implicit_lower_bound());
        assert!(rep.domain()[0].implicit_lower_bound());
    }

    #[test]
    fn test_maps_left_shared_still_copy_on_write() {
        init_logger();
        let original = Arc::new(array_transform().rep().clone());
        let mut rep = original.clone();

        let private = make_mutable(&mut rep, true);
        assert_eq!(private.replace_all_index_array_maps_with_constant_maps(), 1);

        assert!(!rep.shares_output_maps_with(&original));
        assert!(matches!(rep.output_maps()[0], OutputIndexMap::Constant { offset: 0 }));
        assert!(matches!(original.output_maps()[0], OutputIndexMap::Array { .. }));
    }

    #[test]
    fn test_replace_without_array_maps_keeps_sharing() {
        init_logger();
        let original = Arc::new(crate::IndexTransform::identity(2).rep().clone());
        let mut rep = original.clone();

        let private = make_mutable(&mut rep, true);
        assert_eq!(private.replace_all_index_array_maps_with_constant_maps(), 0);
        assert!(rep.shares_output_maps_with(&original));
    }
}
