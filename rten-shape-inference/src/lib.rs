//! Shape and element type algebra for RTen IR validation.
//!
//! Before a graph can be executed, each operator node checks the shapes and
//! element types of its inputs and computes those of its outputs. Much of
//! this information is only partially known while the graph is being built.
//! A model may accept images of any height and width, or an operator such as
//! `NonZero` may produce an output whose size depends on the values of its
//! input.
//!
//! This crate provides the types used to describe that partial knowledge:
//!
//! - [`Dimension`] is a single dimension size which is either fixed or
//!   unknown.
//! - [`PartialShape`] is a shape with either unknown rank, or a known rank
//!   and a mix of fixed and unknown dimensions.
//! - [`ElementType`] is a tensor's element type, which may be `Dynamic` if
//!   it has not been resolved yet.
//!
//! All operations on these types are pure. The rules which operators apply
//! to them live in the `rten-ir` crate.

mod dimension;
mod element_type;
mod partial_shape;

pub use dimension::Dimension;
pub use element_type::{ElementType, ParseElementTypeError};
pub use partial_shape::PartialShape;
