//! Traits and types for validating operator inputs and inferring the shapes
//! and element types of operator outputs.

use std::error::Error;
use std::fmt;

use rten_shape_inference::{ElementType, PartialShape};
use smallvec::SmallVec;

/// Shape and element type of an operator input or output.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct TensorType {
    pub shape: PartialShape,
    pub element_type: ElementType,
}

impl TensorType {
    pub fn new(shape: impl Into<PartialShape>, element_type: ElementType) -> Self {
        TensorType {
            shape: shape.into(),
            element_type,
        }
    }

    /// Return a type with unknown rank and dynamic element type.
    ///
    /// This is the type of all outputs of a node which has not been validated.
    pub fn dynamic() -> Self {
        Self::default()
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.element_type, self.shape)
    }
}

/// Types of the outputs of an operator.
///
/// This avoids allocations in the common case where an operator produces
/// exactly one output.
pub type OutputTypes = SmallVec<[TensorType; 1]>;

/// Types of the inputs bound to an operator.
///
/// Entries are `None` for optional inputs which are not bound.
#[derive(Clone, Debug, Default)]
pub struct InputTypes<'a> {
    inputs: SmallVec<[Option<&'a TensorType>; 5]>,
}

impl<'a> InputTypes<'a> {
    pub fn new<I: IntoIterator<Item = Option<&'a TensorType>>>(inputs: I) -> Self {
        InputTypes {
            inputs: inputs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Get an optional input.
    pub fn get(&self, index: usize) -> Option<&'a TensorType> {
        self.inputs.get(index).copied().flatten()
    }

    /// Get a required input.
    pub fn require(&self, index: usize) -> Result<&'a TensorType, InferTypesError> {
        self.get(index).ok_or(InferTypesError::MissingInput { index })
    }
}

impl<'a> FromIterator<&'a TensorType> for InputTypes<'a> {
    fn from_iter<I: IntoIterator<Item = &'a TensorType>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Some))
    }
}

/// Rank that an operator requires for an input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ExpectedRank {
    Exact(usize),
    AtLeast(usize),
}

/// Reasons why an operator's inputs fail validation.
#[derive(Clone, Debug, PartialEq)]
pub enum InferTypesError {
    /// Too many or too few inputs were bound to the operator.
    IncorrectInputCount {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// A required input was not bound.
    MissingInput { index: usize },

    /// An input's rank does not match the rank required by the operator.
    IncorrectRank {
        /// Name of the input, as used in the operator's documentation.
        input: &'static str,
        expected: ExpectedRank,
        actual: PartialShape,
    },

    /// Input shapes are not compatible with each other.
    IncompatibleShapes(String),

    /// An input or attribute has an invalid value.
    InvalidValue(String),
}

impl fmt::Display for InferTypesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncorrectInputCount { min, max, actual } if min == max => {
                write!(f, "Expected {} inputs. Got: {}", min, actual)
            }
            Self::IncorrectInputCount { min, max, actual } => {
                write!(
                    f,
                    "Expected between {} and {} inputs. Got: {}",
                    min, max, actual
                )
            }
            Self::MissingInput { index } => write!(f, "Required input {} is missing", index),
            Self::IncorrectRank {
                input,
                expected: ExpectedRank::Exact(0),
                actual,
            } => write!(
                f,
                "Expected a scalar for the '{}' input. Got: {}",
                input, actual
            ),
            Self::IncorrectRank {
                input,
                expected: ExpectedRank::Exact(rank),
                actual,
            } => write!(
                f,
                "Expected a {}D tensor for the '{}' input. Got: {}",
                rank, input, actual
            ),
            Self::IncorrectRank {
                input,
                expected: ExpectedRank::AtLeast(rank),
                actual,
            } => {
                write!(
                    f,
                    "Expected a tensor of rank >= {} for the '{}' input. Got: {}",
                    rank, input, actual
                )?;
                if let Some(actual_rank) = actual.rank() {
                    write!(f, " (rank {})", actual_rank)?;
                }
                Ok(())
            }
            Self::IncompatibleShapes(details) => write!(f, "{}", details),
            Self::InvalidValue(details) => write!(f, "{}", details),
        }
    }
}

impl Error for InferTypesError {}

/// Validate an operator's inputs and infer the types of its outputs.
pub trait InferTypes {
    /// Check the shapes and element types of `inputs` against the operator's
    /// rules and return the types of its outputs.
    ///
    /// Checks are applied in a fixed order and the first violation is
    /// returned.
    fn infer_types(&self, inputs: &InputTypes) -> Result<OutputTypes, InferTypesError>;
}
