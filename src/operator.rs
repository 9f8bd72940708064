//! The [`Operator`] trait for defining operators and the [`Op`] enum which
//! holds any built-in operator.

use std::fmt;
use std::fmt::Debug;

use crate::attrs::Attributes;
use crate::infer_types::{InferTypes, InferTypesError, InputTypes, OutputTypes};
use crate::ops::{NonMaxSuppression, NonMaxSuppressionV3, NonZero, Parameter};

/// Identity of an operator.
///
/// Operators are identified by a name and version. Different versions of an
/// operator with the same name may have incompatible semantics, so operators
/// are always looked up by both.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct OpType {
    pub name: &'static str,
    pub version: u32,
}

impl OpType {
    pub const fn new(name: &'static str, version: u32) -> Self {
        OpType { name, version }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// An operator in the IR.
///
/// Operators take a fixed list of inputs, some of which may be optional, plus
/// a set of attributes. Given the types of their inputs they produce a fixed
/// number of outputs, whose types are determined by [`InferTypes`].
pub trait Operator: InferTypes + Clone + Debug + Into<Op> {
    /// Name and version of this operator.
    const OP_TYPE: OpType;

    /// Names of the inputs, in order.
    const INPUTS: &'static [&'static str];

    /// Number of leading inputs which are required. The remaining inputs are
    /// optional.
    const REQUIRED_INPUTS: usize = Self::INPUTS.len();

    /// Number of outputs this operator produces.
    const NUM_OUTPUTS: usize = 1;

    /// Return the operator's attributes as `(name, value)` pairs.
    fn attributes(&self) -> Attributes {
        Attributes::new()
    }
}

/// A built-in operator.
///
/// Each variant wraps the concrete operator type, which implements the
/// validation rules for that operator. Methods on `Op` dispatch to the
/// variant.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Parameter(Parameter),
    NonZero(NonZero),
    NonMaxSuppression(NonMaxSuppression),
    NonMaxSuppressionV3(NonMaxSuppressionV3),
}

/// Evaluate `$expr` with `$op` bound to the concrete operator in `$self`,
/// and `$ty` to its type.
macro_rules! dispatch {
    ($self:expr, |$op:ident: $ty:ident| $expr:expr) => {
        match $self {
            Op::Parameter($op) => {
                #[allow(dead_code)]
                type $ty = Parameter;
                $expr
            }
            Op::NonZero($op) => {
                #[allow(dead_code)]
                type $ty = NonZero;
                $expr
            }
            Op::NonMaxSuppression($op) => {
                #[allow(dead_code)]
                type $ty = NonMaxSuppression;
                $expr
            }
            Op::NonMaxSuppressionV3($op) => {
                #[allow(dead_code)]
                type $ty = NonMaxSuppressionV3;
                $expr
            }
        }
    };
}

impl Op {
    pub fn op_type(&self) -> OpType {
        dispatch!(self, |_op: T| T::OP_TYPE)
    }

    /// Return the names of the operator's inputs.
    pub fn input_names(&self) -> &'static [&'static str] {
        dispatch!(self, |_op: T| T::INPUTS)
    }

    /// Return the minimum number of inputs that must be bound.
    pub fn min_inputs(&self) -> usize {
        dispatch!(self, |_op: T| T::REQUIRED_INPUTS)
    }

    /// Return the maximum number of inputs that can be bound.
    pub fn max_inputs(&self) -> usize {
        self.input_names().len()
    }

    pub fn num_outputs(&self) -> usize {
        dispatch!(self, |_op: T| T::NUM_OUTPUTS)
    }

    pub fn attributes(&self) -> Attributes {
        dispatch!(self, |op: T| op.attributes())
    }

    /// Check that a list of inputs, where `None` entries are unbound optional
    /// inputs, satisfies the operator's arity.
    pub(crate) fn check_arity<T>(&self, inputs: &[Option<T>]) -> Result<(), InferTypesError> {
        let (min, max) = (self.min_inputs(), self.max_inputs());
        if inputs.len() < min || inputs.len() > max {
            return Err(InferTypesError::IncorrectInputCount {
                min,
                max,
                actual: inputs.len(),
            });
        }
        if let Some(index) = inputs[..min].iter().position(|input| input.is_none()) {
            return Err(InferTypesError::MissingInput { index });
        }
        Ok(())
    }
}

impl InferTypes for Op {
    fn infer_types(&self, inputs: &InputTypes) -> Result<OutputTypes, InferTypesError> {
        dispatch!(self, |op: T| op.infer_types(inputs))
    }
}

macro_rules! impl_into_op {
    ($op:ident) => {
        impl From<$op> for Op {
            fn from(op: $op) -> Op {
                Op::$op(op)
            }
        }
    };
}

impl_into_op!(Parameter);
impl_into_op!(NonZero);
impl_into_op!(NonMaxSuppression);
impl_into_op!(NonMaxSuppressionV3);

#[cfg(test)]
mod tests {
    use rten_testing::TestCases;

    use super::{Op, OpType};
    use crate::infer_types::InferTypesError;
    use crate::ops::{NonMaxSuppression, NonMaxSuppressionV3, NonZero};

    #[test]
    fn test_op_type() {
        assert_eq!(Op::from(NonZero::default()).op_type(), OpType::new("NonZero", 3));

        let v1: Op = NonMaxSuppression::default().into();
        let v3: Op = NonMaxSuppressionV3::default().into();
        assert_eq!(v1.op_type().name, v3.op_type().name);
        assert_ne!(v1.op_type(), v3.op_type());
        assert_eq!(v3.op_type().to_string(), "NonMaxSuppression v3");
    }

    #[test]
    fn test_check_arity() {
        #[derive(Debug)]
        struct Case {
            op: Op,
            inputs: Vec<Option<()>>,
            expected: Result<(), InferTypesError>,
        }

        let nms: Op = NonMaxSuppression::default().into();
        let cases = [
            Case {
                op: NonZero::default().into(),
                inputs: vec![Some(())],
                expected: Ok(()),
            },
            Case {
                op: NonZero::default().into(),
                inputs: vec![],
                expected: Err(InferTypesError::IncorrectInputCount {
                    min: 1,
                    max: 1,
                    actual: 0,
                }),
            },
            Case {
                op: nms.clone(),
                inputs: vec![Some(()), Some(()), None, None, Some(())],
                expected: Ok(()),
            },
            Case {
                op: nms.clone(),
                inputs: vec![Some(()), None],
                expected: Err(InferTypesError::MissingInput { index: 1 }),
            },
            Case {
                op: nms.clone(),
                inputs: vec![Some(()); 6],
                expected: Err(InferTypesError::IncorrectInputCount {
                    min: 2,
                    max: 5,
                    actual: 6,
                }),
            },
        ];

        cases.test_each(|case| {
            assert_eq!(case.op.check_arity(&case.inputs), case.expected);
        })
    }
}
