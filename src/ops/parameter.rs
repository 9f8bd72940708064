use rten_shape_inference::{ElementType, PartialShape};

use crate::attrs::{AttrValue, Attributes};
use crate::infer_types::{InferTypes, InferTypesError, InputTypes, OutputTypes, TensorType};
use crate::operator::{OpType, Operator};

/// Graph input with a declared shape and element type.
///
/// Parameters have no inputs. Their single output has the declared type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameter {
    pub element_type: ElementType,
    pub shape: PartialShape,
}

impl Parameter {
    pub fn new(element_type: ElementType, shape: impl Into<PartialShape>) -> Self {
        Parameter {
            element_type,
            shape: shape.into(),
        }
    }

    /// Return the declared type of the parameter's output.
    pub fn tensor_type(&self) -> TensorType {
        TensorType::new(self.shape.clone(), self.element_type)
    }
}

impl Operator for Parameter {
    const OP_TYPE: OpType = OpType::new("Parameter", 0);
    const INPUTS: &'static [&'static str] = &[];

    fn attributes(&self) -> Attributes {
        [
            ("element_type", AttrValue::ElementType(self.element_type)),
            ("shape", AttrValue::Shape(self.shape.clone())),
        ]
        .into_iter()
        .collect()
    }
}

impl InferTypes for Parameter {
    fn infer_types(&self, _inputs: &InputTypes) -> Result<OutputTypes, InferTypesError> {
        Ok([self.tensor_type()].into())
    }
}

#[cfg(test)]
mod tests {
    use rten_shape_inference::{Dimension, ElementType, PartialShape};

    use super::Parameter;
    use crate::infer_types::{InferTypes, InputTypes};

    #[test]
    fn test_parameter() {
        let shape = PartialShape::from([Dimension::Unknown, Dimension::Fixed(3)]);
        let param = Parameter::new(ElementType::F32, shape.clone());
        let outputs = param.infer_types(&InputTypes::default()).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].shape, shape);
        assert_eq!(outputs[0].element_type, ElementType::F32);
    }
}
