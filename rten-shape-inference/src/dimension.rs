use std::fmt;

/// Size of a single dimension in a [`PartialShape`](crate::PartialShape).
///
/// A dimension is either a fixed size known during validation, or unknown
/// until the graph is executed.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimension {
    Fixed(usize),
    #[default]
    Unknown,
}

impl Dimension {
    /// Return true if this dimension has a known size.
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Return the size of this dimension, if known.
    pub fn get(self) -> Option<usize> {
        match self {
            Self::Fixed(size) => Some(size),
            Self::Unknown => None,
        }
    }

    /// Return true if this dimension could have the same runtime size as
    /// `other`.
    ///
    /// Unknown dimensions are compatible with everything.
    pub fn compatible(self, other: Dimension) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            _ => true,
        }
    }

    /// Combine two compatible dimensions into the most specific dimension
    /// that satisfies both, or return `None` if they are incompatible.
    pub fn merge(self, other: Dimension) -> Option<Dimension> {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) if a != b => None,
            (Self::Fixed(a), _) | (_, Self::Fixed(a)) => Some(Self::Fixed(a)),
            (Self::Unknown, Self::Unknown) => Some(Self::Unknown),
        }
    }
}

impl From<usize> for Dimension {
    fn from(size: usize) -> Self {
        Dimension::Fixed(size)
    }
}

impl From<Option<usize>> for Dimension {
    fn from(size: Option<usize>) -> Self {
        size.map(Dimension::Fixed).unwrap_or(Dimension::Unknown)
    }
}

impl PartialEq<usize> for Dimension {
    fn eq(&self, other: &usize) -> bool {
        *self == Dimension::Fixed(*other)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => write!(f, "{}", size),
            Self::Unknown => write!(f, "?"),
        }
    }
}
