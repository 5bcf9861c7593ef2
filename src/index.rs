use std::fmt;

use crate::TransformError;

/// Scalar type of all coordinates, bounds, offsets and strides.
pub type Index = i64;

/// Sentinel for an unbounded upper bound; its negation is the unbounded lower bound.
pub const INFINITE_INDEX: Index = (1 << 62) - 1;

pub const MAX_FINITE_INDEX: Index = INFINITE_INDEX - 1;

pub const MIN_FINITE_INDEX: Index = -MAX_FINITE_INDEX;

/// Whether the index lies in the finite index range, i.e. is not an infinity sentinel
/// (or beyond).
pub fn is_finite(idx: Index) -> bool {
    (MIN_FINITE_INDEX..=MAX_FINITE_INDEX).contains(&idx)
}

/// Whether `idx` may be used as a lower bound: `-inf` or finite.
pub(crate) fn is_valid_lower_bound(idx: Index) -> bool {
    idx == -INFINITE_INDEX || is_finite(idx)
}

/// Whether `idx` may be used as an upper bound: finite or `+inf`.
pub(crate) fn is_valid_upper_bound(idx: Index) -> bool {
    idx == INFINITE_INDEX || is_finite(idx)
}

/// Writes a bound, spelling the sentinels as `-inf`/`+inf`.
pub(crate) fn fmt_bound(idx: Index, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match idx {
        INFINITE_INDEX => f.write_str("+inf"),
        i if i == -INFINITE_INDEX => f.write_str("-inf"),
        i => write!(f, "{i}"),
    }
}

/// Half-open interval `[lower, upper)` with `lower <= upper`.
///
/// Either end may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexInterval {
    lower: Index,
    upper: Index,
}

impl Default for IndexInterval {
    fn default() -> Self {
        Self::infinite()
    }
}

impl IndexInterval {
    /// `(-inf, +inf)`
    pub const fn infinite() -> Self {
        Self {
            lower: -INFINITE_INDEX,
            upper: INFINITE_INDEX,
        }
    }

    #[track_caller]
    pub fn try_new(lower: Index, upper: Index) -> Result<Self, TransformError> {
        if !is_valid_lower_bound(lower) || !is_valid_upper_bound(upper) || lower > upper {
            return Err(TransformError::invalid_argument(format!(
                "({lower}, {upper}) do not specify a valid half-open index interval"
            )));
        }
        Ok(Self { lower, upper })
    }

    /// `[lower, lower + size)`
    #[track_caller]
    pub fn sized(lower: Index, size: Index) -> Result<Self, TransformError> {
        let Some(upper) = lower.checked_add(size).filter(|_| size >= 0) else {
            return Err(TransformError::invalid_argument(format!(
                "({lower}, {size}) do not specify a valid sized index interval"
            )));
        };
        Self::try_new(lower, upper)
    }

    pub fn lower(&self) -> Index {
        self.lower
    }

    pub fn upper(&self) -> Index {
        self.upper
    }

    /// Number of elements, or `None` if either end is infinite.
    pub fn size(&self) -> Option<Index> {
        (is_finite(self.lower) && is_finite(self.upper)).then(|| self.upper - self.lower)
    }

    pub fn is_empty(&self) -> bool {
        self.lower == self.upper
    }

    pub fn contains(&self, idx: Index) -> bool {
        is_finite(idx) && self.lower <= idx && idx < self.upper
    }
}

impl fmt::Display for IndexInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        fmt_bound(self.lower, f)?;
        f.write_str(", ")?;
        fmt_bound(self.upper, f)?;
        f.write_str(")")
    }
}
