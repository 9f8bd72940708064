//! Validation state, options and failure reporting for IR nodes.

use std::error::Error;
use std::fmt;

use crate::env::env_flag;
use crate::infer_types::InferTypesError;
use crate::operator::OpType;

/// Validation status of a [`Node`](crate::Node).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ValidationState {
    /// The node has not been validated since it was created or its inputs
    /// last changed.
    #[default]
    Unvalidated,

    /// The last validation succeeded and the node's outputs are up to date.
    Valid,

    /// The last validation failed. The node's outputs are unchanged from
    /// before the attempt.
    Failed,
}

/// Options that control logging when validating a [`Node`](crate::Node).
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// Whether to log the inferred output types of each validated node at
    /// `info` level.
    ///
    /// This can also be enabled by setting the `RTEN_IR_VERBOSE` environment
    /// variable, which takes precedence over this field.
    pub verbose: bool,
}

impl ValidateOptions {
    /// Return whether verbose logging is enabled, taking the `RTEN_IR_VERBOSE`
    /// environment variable into account.
    pub(crate) fn verbose(&self) -> bool {
        env_flag("RTEN_IR_VERBOSE", self.verbose)
    }
}

/// Error returned when a node's inputs violate its operator's rules.
///
/// The failure identifies the node by its operator type and, if set, its
/// name. The underlying reason is available via [`error`](Self::error).
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationFailure {
    op_type: OpType,
    node_name: Option<String>,
    error: InferTypesError,
}

impl ValidationFailure {
    pub fn new(op_type: OpType, node_name: Option<&str>, error: InferTypesError) -> Self {
        ValidationFailure {
            op_type,
            node_name: node_name.map(|s| s.to_string()),
            error,
        }
    }

    /// Return the type of the operator which failed validation.
    pub fn op_type(&self) -> OpType {
        self.op_type
    }

    /// Return the name of the node which failed validation, if it has one.
    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }

    /// Return the rule violation which caused this failure.
    pub fn error(&self) -> &InferTypesError {
        &self.error
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op_type)?;
        if let Some(name) = &self.node_name {
            write!(f, " (node \"{}\")", name)?;
        }
        write!(f, ": {}", self.error)
    }
}

impl Error for ValidationFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}
