//! Index transforms: the addressing algebra of a multidimensional array store.
//!
//! An [IndexTransform] maps input (logical) coordinates to output (storage) coordinates
//! through one [OutputIndexMap] per output dimension.
//! Transforms are cheap to clone and share; operators which change them
//! copy the underlying representation only when it is shared.
//!
//! ```
//! use index_transform::{DimensionSelection, IndexTransform};
//!
//! let mut builder = IndexTransform::builder(2, 1);
//! builder
//!     .lower_bounds(&[0, 0])
//!     .unwrap()
//!     .upper_bounds(&[10, 5])
//!     .unwrap()
//!     .output_single_input_dimension(0, 3, 2, 1)
//!     .unwrap();
//! let transform = builder.build().unwrap();
//!
//! let dims = DimensionSelection::try_new(&[0], transform.input_rank()).unwrap();
//! let marked = transform.mark_bounds_implicit(&dims, true, false).unwrap();
//! assert!(marked.domain()[0].implicit_lower_bound());
//! assert_eq!(marked.transform_indices(&[2, 4]).unwrap().as_slice(), &[11]);
//! ```
use smallvec::SmallVec;

mod index;
pub use index::{INFINITE_INDEX, Index, IndexInterval, MAX_FINITE_INDEX, MIN_FINITE_INDEX, is_finite};

mod error;
pub use error::{ErrorKind, Rejected, TransformError};

mod dimension;
pub use dimension::{Dimension, Domain};

mod index_array;
pub use index_array::{INDEX_SIZE, IndexArray, IndexArrayData};

mod output_map;
pub use output_map::{OutputIndexMap, OutputIndexMethod};

mod rep;
pub use rep::TransformRep;

mod transform;
pub use transform::IndexTransform;

mod builder;
pub use builder::IndexTransformBuilder;

mod invariants;
pub use invariants::InvariantViolation;

mod selection;
pub use selection::DimensionSelection;

pub mod ops;

#[cfg(feature = "ndarray")]
mod ndarr;

pub const COORD_SIZE: usize = 6;

/// A short vector type alias for convenience;
/// most index transforms have only a handful of dimensions.
pub type ShortVec<T> = SmallVec<[T; COORD_SIZE]>;
