use std::{
    fmt,
    ops::{Index as IndexOp, IndexMut},
};

use crate::index::{INFINITE_INDEX, Index, fmt_bound};

/// Bounds of one input dimension, `[lower_bound, upper_bound)`.
///
/// An implicit bound is one the user did not fix,
/// which later operations may infer or adjust.
/// Bounds may be inverted (`lower_bound > upper_bound`);
/// such a dimension, like any with `lower_bound >= upper_bound`, is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    lower_bound: Index,
    upper_bound: Index,
    implicit_lower_bound: bool,
    implicit_upper_bound: bool,
    label: Option<String>,
}

impl Default for Dimension {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Dimension {
    /// A dimension with explicit bounds `[lower_bound, upper_bound)`.
    pub fn new(lower_bound: Index, upper_bound: Index) -> Self {
        Self {
            lower_bound,
            upper_bound,
            implicit_lower_bound: false,
            implicit_upper_bound: false,
            label: None,
        }
    }

    /// `(-inf, +inf)` with both bounds implicit.
    pub fn unbounded() -> Self {
        Self::new(-INFINITE_INDEX, INFINITE_INDEX).with_implicit(true, true)
    }

    pub fn with_implicit(mut self, lower: bool, upper: bool) -> Self {
        self.implicit_lower_bound = lower;
        self.implicit_upper_bound = upper;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn lower_bound(&self) -> Index {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> Index {
        self.upper_bound
    }

    pub fn implicit_lower_bound(&self) -> bool {
        self.implicit_lower_bound
    }

    pub fn implicit_upper_bound(&self) -> bool {
        self.implicit_upper_bound
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn set_implicit_lower_bound(&mut self, implicit: bool) {
        self.implicit_lower_bound = implicit;
    }

    pub(crate) fn set_implicit_upper_bound(&mut self, implicit: bool) {
        self.implicit_upper_bound = implicit;
    }

    pub fn is_empty(&self) -> bool {
        self.lower_bound >= self.upper_bound
    }

    /// Empty, and both bounds are explicit, so no later operation may widen it.
    pub fn is_explicitly_empty(&self) -> bool {
        self.is_empty() && !self.implicit_lower_bound && !self.implicit_upper_bound
    }

    pub fn contains(&self, idx: Index) -> bool {
        crate::is_finite(idx) && self.lower_bound <= idx && idx < self.upper_bound
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = |implicit: bool| if implicit { "*" } else { "" };
        f.write_str("[")?;
        fmt_bound(self.lower_bound, f)?;
        write!(f, "{}, ", star(self.implicit_lower_bound))?;
        fmt_bound(self.upper_bound, f)?;
        write!(f, "{})", star(self.implicit_upper_bound))?;
        if let Some(label) = &self.label {
            write!(f, " {label:?}")?;
        }
        Ok(())
    }
}

/// The ordered input dimensions of a transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Domain(Vec<Dimension>);

impl Domain {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self(dimensions)
    }

    /// `rank` unbounded dimensions.
    pub fn unbounded(rank: usize) -> Self {
        Self(vec![Dimension::unbounded(); rank])
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.0.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Dimension> {
        self.0.get(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Dimension> {
        self.0.get_mut(idx)
    }

    /// Some dimension is empty with both of its bounds explicit,
    /// so the whole domain can never be addressed.
    pub fn is_explicitly_empty(&self) -> bool {
        self.0.iter().any(|d| d.is_explicitly_empty())
    }

    /// Index of the dimension with the given label.
    pub fn find_label(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|d| d.label() == Some(label))
    }
}

impl IndexOp<usize> for Domain {
    type Output = Dimension;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Domain {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Dimension> for Domain {
    fn from_iter<T: IntoIterator<Item = Dimension>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
