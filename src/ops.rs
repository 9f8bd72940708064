//! Built-in operators.
//!
//! Operators are named after the corresponding operators in the IR's operator
//! set. Where an operator has several versions with different semantics, later
//! versions have a `V{version}` suffix.

mod non_max_suppression;
mod non_zero;
mod parameter;

pub use non_max_suppression::{BoxOrder, NonMaxSuppression, NonMaxSuppressionV3};
pub use non_zero::NonZero;
pub use parameter::Parameter;
