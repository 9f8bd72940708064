//! rten-ir defines the nodes of a static dataflow graph for tensor
//! computations, and the rules for validating them.
//!
//! # Nodes and validation
//!
//! Each [`Node`] applies an operator ([`Op`]) to a list of inputs. Inputs
//! are [`Port`]s which refer to the outputs of other nodes. Graph inputs are
//! supplied by [`Parameter`](ops::Parameter) nodes, which have a declared
//! shape and element type.
//!
//! Before a graph can be executed or compiled, each node must be validated
//! using [`Node::validate_and_infer_types`]. This checks the ranks, shapes and
//! element types of the node's inputs against the operator's rules, and
//! computes the shapes and element types of its outputs. Nodes must be
//! validated in topological order, since a node's inputs are the outputs of
//! its producers.
//!
//! ```
//! use rten_ir::ops::NonZero;
//! use rten_ir::{Dimension, ElementType, Node, PartialShape};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = Node::parameter(ElementType::F32, PartialShape::fixed(&[3, 4]));
//! let mut non_zero = Node::new(NonZero::default(), [Some(data.output(0))])?;
//! non_zero.validate_and_infer_types()?;
//!
//! let shape = non_zero.output_shape(0);
//! assert_eq!(shape.dims(), Some([Dimension::Fixed(2), Dimension::Unknown].as_slice()));
//! assert_eq!(non_zero.output_element_type(0), ElementType::I64);
//! # Ok(()) }
//! ```
//!
//! # Shapes and element types
//!
//! Shapes may be partially known. A [`PartialShape`] either has an unknown
//! rank, or a list of [`Dimension`]s each of which is either a fixed size or
//! unknown. Element types may similarly be [`ElementType::Dynamic`].
//!
//! # Operators
//!
//! Operators are identified by an [`OpType`], consisting of a name and
//! version. The [`OpRegistry`] creates operators from their type and a list
//! of attributes, which can be obtained from an existing node using
//! [`Node::visit_attributes`].
//!
//! # Logging
//!
//! Validation emits [`tracing`](https://docs.rs/tracing) events at `debug`
//! level. If [`ValidateOptions::verbose`] is set, or the `RTEN_IR_VERBOSE`
//! environment variable is set to a truthy value (eg. `1`), the inferred
//! output types of each validated node are logged at `info` level.

mod env;
mod infer_types;
mod node;
mod op_registry;
mod operator;
mod validation;

pub mod attrs;
pub mod ops;

pub use infer_types::{
    ExpectedRank, InferTypes, InferTypesError, InputTypes, OutputTypes, TensorType,
};
pub use node::{Node, Port};
pub use op_registry::{OpRegistry, ReadOp, ReadOpError};
pub use operator::{Op, OpType, Operator};
pub use rten_shape_inference::{Dimension, ElementType, ParseElementTypeError, PartialShape};
pub use validation::{ValidateOptions, ValidationFailure, ValidationState};
