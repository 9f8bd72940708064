use std::fmt;

use smallvec::SmallVec;

use crate::Dimension;

type Dims = SmallVec<[Dimension; 4]>;

/// Shape of a tensor whose rank and dimension sizes may not be fully known
/// during validation.
///
/// A partial shape either has an unknown rank, or a known rank where each
/// dimension is independently [fixed or unknown](Dimension).
///
/// ```
/// use rten_shape_inference::{Dimension, PartialShape};
///
/// let shape = PartialShape::from([Dimension::Fixed(2), Dimension::Unknown]);
/// assert_eq!(shape.rank(), Some(2));
/// assert!(!shape.is_static());
/// assert!(shape.compatible(&PartialShape::fixed(&[2, 5])));
/// assert_eq!(shape.to_string(), "[2,?]");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialShape {
    /// Dimensions of the shape, or `None` if the rank is unknown.
    dims: Option<Dims>,
}

impl PartialShape {
    /// Create a shape with unknown rank.
    pub fn dynamic() -> Self {
        PartialShape { dims: None }
    }

    /// Create a shape with known rank and the given dimensions.
    pub fn from_dims<I: IntoIterator<Item = Dimension>>(dims: I) -> Self {
        PartialShape {
            dims: Some(dims.into_iter().collect()),
        }
    }

    /// Create a static shape with the given sizes.
    pub fn fixed(shape: &[usize]) -> Self {
        Self::from_dims(shape.iter().copied().map(Dimension::Fixed))
    }

    /// Create a shape of known rank where every dimension is unknown.
    pub fn unknown_dims(rank: usize) -> Self {
        Self::from_dims(std::iter::repeat_n(Dimension::Unknown, rank))
    }

    /// Create the shape of a scalar (rank 0).
    pub fn scalar() -> Self {
        Self::from_dims([])
    }

    /// Return the number of dimensions, if known.
    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(|dims| dims.len())
    }

    /// Return the dimensions, if the rank is known.
    pub fn dims(&self) -> Option<&[Dimension]> {
        self.dims.as_deref()
    }

    /// Return the size of the `index`th dimension.
    ///
    /// # Panics
    ///
    /// Panics if the rank is unknown or `index` is out of bounds.
    pub fn dim(&self, index: usize) -> Dimension {
        let Some(dims) = self.dims.as_ref() else {
            panic!("cannot index dimension {} of a shape with unknown rank", index);
        };
        assert!(
            index < dims.len(),
            "dimension index {} is out of bounds for rank {}",
            index,
            dims.len()
        );
        dims[index]
    }

    /// Return true if the rank and all dimension sizes are known.
    pub fn is_static(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|dims| dims.iter().all(|d| d.is_fixed()))
    }

    /// Return true if the rank or any dimension size is unknown.
    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// Return true if the rank is known to be zero.
    pub fn is_scalar(&self) -> bool {
        self.rank() == Some(0)
    }

    /// Convert to a list of sizes, if the shape is static.
    pub fn to_shape(&self) -> Option<Vec<usize>> {
        self.dims.as_ref()?.iter().map(|d| d.get()).collect()
    }

    /// Return true if a tensor could have both this shape and `other`.
    ///
    /// This is true if either rank is unknown, or the ranks are equal and
    /// every pair of fixed dimensions has the same size.
    pub fn compatible(&self, other: &PartialShape) -> bool {
        match (&self.dims, &other.dims) {
            (Some(a), Some(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.compatible(*b))
            }
            _ => true,
        }
    }

    /// Combine two compatible shapes into the most specific shape that
    /// satisfies both, or return `None` if they are incompatible.
    pub fn merge(&self, other: &PartialShape) -> Option<PartialShape> {
        match (&self.dims, &other.dims) {
            (Some(a), Some(b)) => {
                if a.len() != b.len() {
                    return None;
                }
                let dims = a
                    .iter()
                    .zip(b.iter())
                    .map(|(a, b)| a.merge(*b))
                    .collect::<Option<Dims>>()?;
                Some(PartialShape { dims: Some(dims) })
            }
            (Some(_), None) => Some(self.clone()),
            (None, _) => Some(other.clone()),
        }
    }
}

impl<const N: usize> From<[Dimension; N]> for PartialShape {
    fn from(dims: [Dimension; N]) -> Self {
        Self::from_dims(dims)
    }
}

impl<const N: usize> From<[usize; N]> for PartialShape {
    fn from(shape: [usize; N]) -> Self {
        Self::fixed(&shape)
    }
}

impl From<Vec<Dimension>> for PartialShape {
    fn from(dims: Vec<Dimension>) -> Self {
        Self::from_dims(dims)
    }
}

impl From<&[usize]> for PartialShape {
    fn from(shape: &[usize]) -> Self {
        Self::fixed(shape)
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dims) = &self.dims else {
            return write!(f, "[...]");
        };
        write!(f, "[")?;
        for (i, dim) in dims.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}
