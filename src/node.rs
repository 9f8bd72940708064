//! Graph nodes and the ports which connect them.

use std::fmt;

use rten_shape_inference::{ElementType, PartialShape};

use crate::attrs::AttributeVisitor;
use crate::infer_types::{InferTypes, InferTypesError, InputTypes, TensorType};
use crate::operator::{Op, OpType};
use crate::ops::Parameter;
use crate::validation::{ValidateOptions, ValidationFailure, ValidationState};

/// Reference to an output of a node.
///
/// A port borrows its producer, so the producer outlives every node bound to
/// it and cannot be modified while consumers exist.
#[derive(Copy, Clone)]
pub struct Port<'a> {
    node: &'a Node<'a>,
    index: usize,
}

impl<'a> Port<'a> {
    /// Return the node which produces this output.
    pub fn node(&self) -> &'a Node<'a> {
        self.node
    }

    /// Return the index of this output in the producer's outputs.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the current type of the output.
    pub fn tensor_type(&self) -> &'a TensorType {
        &self.node.outputs[self.index]
    }

    pub fn shape(&self) -> &'a PartialShape {
        &self.tensor_type().shape
    }

    pub fn element_type(&self) -> ElementType {
        self.tensor_type().element_type
    }
}

impl PartialEq for Port<'_> {
    /// Ports are equal if they refer to the same output of the same node.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.node, other.node) && self.index == other.index
    }
}

impl fmt::Debug for Port<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("node", &self.node.label())
            .field("index", &self.index)
            .finish()
    }
}

/// An operator instance in a graph.
///
/// A node binds an operator to input ports and holds the inferred types of
/// the operator's outputs. Output types are [`TensorType::dynamic`] until the
/// node is first validated with
/// [`validate_and_infer_types`](Node::validate_and_infer_types).
#[derive(Debug)]
pub struct Node<'a> {
    name: Option<String>,
    op: Op,
    inputs: Vec<Option<Port<'a>>>,
    outputs: Vec<TensorType>,
    state: ValidationState,
}

impl<'a> Node<'a> {
    /// Create a node which applies `op` to `inputs`.
    ///
    /// `inputs` has one entry per bound input, where `None` marks an
    /// optional input that is not bound. Fails if the number of inputs is
    /// not accepted by the operator or a required input is missing.
    pub fn new<I: IntoIterator<Item = Option<Port<'a>>>>(
        op: impl Into<Op>,
        inputs: I,
    ) -> Result<Self, ValidationFailure> {
        let op = op.into();
        let inputs: Vec<_> = inputs.into_iter().collect();
        op.check_arity(&inputs)
            .map_err(|err| ValidationFailure::new(op.op_type(), None, err))?;

        let outputs = vec![TensorType::dynamic(); op.num_outputs()];
        Ok(Node {
            name: None,
            op,
            inputs,
            outputs,
            state: ValidationState::Unvalidated,
        })
    }

    /// Set the debug name of this node.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Return the debug name of this node.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn op_type(&self) -> OpType {
        self.op.op_type()
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn inputs(&self) -> &[Option<Port<'a>>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorType] {
        &self.outputs
    }

    /// Return a port referring to output `index` of this node.
    ///
    /// Panics if `index` is not a valid output index.
    pub fn output(&self, index: usize) -> Port<'_> {
        assert!(
            index < self.outputs.len(),
            "output index {} is out of bounds for {} with {} outputs",
            index,
            self.op_type(),
            self.outputs.len()
        );
        Port { node: self, index }
    }

    /// Return the shape of output `index`.
    ///
    /// Panics if `index` is not a valid output index.
    pub fn output_shape(&self, index: usize) -> &PartialShape {
        &self.outputs[index].shape
    }

    /// Return the element type of output `index`.
    ///
    /// Panics if `index` is not a valid output index.
    pub fn output_element_type(&self, index: usize) -> ElementType {
        self.outputs[index].element_type
    }

    /// Bind input `index` to `port`, or unbind it if `port` is `None`.
    ///
    /// The node returns to the [`Unvalidated`](ValidationState::Unvalidated)
    /// state. Output types keep their previous values until the next
    /// validation.
    pub fn set_input(
        &mut self,
        index: usize,
        port: Option<Port<'a>>,
    ) -> Result<(), ValidationFailure> {
        let mut inputs = self.inputs.clone();
        if index >= inputs.len() {
            inputs.resize(index + 1, None);
        }
        inputs[index] = port;
        self.op
            .check_arity(&inputs)
            .map_err(|err| self.failure(err))?;

        self.inputs = inputs;
        self.state = ValidationState::Unvalidated;
        Ok(())
    }

    /// Check the types of this node's inputs and update the types of its
    /// outputs.
    ///
    /// On failure the output types are left unchanged and the node enters
    /// the [`Failed`](ValidationState::Failed) state.
    pub fn validate_and_infer_types(&mut self) -> Result<(), ValidationFailure> {
        self.validate_and_infer_types_with(&ValidateOptions::default())
    }

    /// Variant of [`validate_and_infer_types`](Self::validate_and_infer_types)
    /// which accepts options to control logging.
    pub fn validate_and_infer_types_with(
        &mut self,
        opts: &ValidateOptions,
    ) -> Result<(), ValidationFailure> {
        let input_types = InputTypes::new(
            self.inputs
                .iter()
                .map(|input| input.map(|port| port.tensor_type())),
        );

        let outputs = match self.op.infer_types(&input_types) {
            Ok(outputs) => outputs,
            Err(err) => {
                tracing::debug!(
                    op = %self.op_type(),
                    node = self.name(),
                    error = %err,
                    "node validation failed"
                );
                self.state = ValidationState::Failed;
                return Err(self.failure(err));
            }
        };
        debug_assert_eq!(outputs.len(), self.outputs.len());

        self.outputs.clear();
        self.outputs.extend(outputs);
        self.state = ValidationState::Valid;

        tracing::debug!(op = %self.op_type(), node = self.name(), "validated node");
        if opts.verbose() {
            tracing::info!(
                "{} outputs: {}",
                self.label(),
                self.outputs
                    .iter()
                    .map(|output| output.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(())
    }

    /// Pass each of the operator's attributes to `visitor`, in declaration
    /// order.
    ///
    /// Returns `false` if the visitor stopped the visit early.
    pub fn visit_attributes(&self, visitor: &mut dyn AttributeVisitor) -> bool {
        self.op
            .attributes()
            .iter()
            .all(|(name, value)| visitor.on_attribute(name, value))
    }

    /// Create a copy of this node which is bound to different inputs.
    ///
    /// The copy has the same operator, attributes and name, and has not been
    /// validated.
    pub fn clone_with_new_inputs<'b, I: IntoIterator<Item = Option<Port<'b>>>>(
        &self,
        inputs: I,
    ) -> Result<Node<'b>, ValidationFailure> {
        let node = Node::new(self.op.clone(), inputs).map_err(|failure| {
            ValidationFailure::new(failure.op_type(), self.name(), failure.error().clone())
        })?;
        Ok(Node {
            name: self.name.clone(),
            ..node
        })
    }

    fn failure(&self, error: InferTypesError) -> ValidationFailure {
        ValidationFailure::new(self.op_type(), self.name(), error)
    }

    /// Return a short description of the node for logs and debug output.
    fn label(&self) -> String {
        match self.name() {
            Some(name) => format!("{} \"{}\"", self.op_type(), name),
            None => self.op_type().to_string(),
        }
    }
}

impl Node<'static> {
    /// Create a `Parameter` node which supplies a graph input with the given
    /// type.
    ///
    /// Parameters have no inputs, so the node is valid as soon as it is
    /// created.
    pub fn parameter(element_type: ElementType, shape: impl Into<PartialShape>) -> Self {
        let param = Parameter::new(element_type, shape.into());
        let outputs = vec![param.tensor_type()];
        Node {
            name: None,
            op: param.into(),
            inputs: Vec::new(),
            outputs,
            state: ValidationState::Valid,
        }
    }
}
