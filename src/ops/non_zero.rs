use rten_shape_inference::{Dimension, ElementType, PartialShape};

use crate::attrs::{AttrValue, Attributes};
use crate::infer_types::{
    ExpectedRank, InferTypes, InferTypesError, InputTypes, OutputTypes, TensorType,
};
use crate::operator::{OpType, Operator};

/// Return the indices of the non-zero elements of a tensor.
///
/// The output is a matrix of shape `[input_rank, num_nonzero]` where each
/// column holds the coordinates of one non-zero element. The number of
/// non-zero elements depends on the input's values, so it is always unknown
/// during validation.
#[derive(Clone, Debug, PartialEq)]
pub struct NonZero {
    /// Element type of the output indices. Must be `i32` or `i64`.
    pub output_type: ElementType,
}

impl Default for NonZero {
    fn default() -> Self {
        NonZero {
            output_type: ElementType::I64,
        }
    }
}

impl Operator for NonZero {
    const OP_TYPE: OpType = OpType::new("NonZero", 3);
    const INPUTS: &'static [&'static str] = &["data"];

    fn attributes(&self) -> Attributes {
        [("output_type", AttrValue::ElementType(self.output_type))]
            .into_iter()
            .collect()
    }
}

impl InferTypes for NonZero {
    fn infer_types(&self, inputs: &InputTypes) -> Result<OutputTypes, InferTypesError> {
        let data = inputs.require(0)?;
        let rank = data.shape.rank();

        // Coordinates require at least one axis.
        if rank == Some(0) {
            return Err(InferTypesError::IncorrectRank {
                input: "data",
                expected: ExpectedRank::AtLeast(1),
                actual: data.shape.clone(),
            });
        }

        check_index_type(self.output_type)?;

        let shape = PartialShape::from([Dimension::from(rank), Dimension::Unknown]);
        Ok([TensorType::new(shape, self.output_type)].into())
    }
}

/// Check that an `output_type` attribute is a supported index type.
pub(crate) fn check_index_type(output_type: ElementType) -> Result<(), InferTypesError> {
    match output_type {
        ElementType::I32 | ElementType::I64 => Ok(()),
        other => Err(InferTypesError::InvalidValue(format!(
            "Output type must be i32 or i64. Got: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rten_shape_inference::{Dimension, ElementType, PartialShape};
    use rten_testing::{assert_err_contains, TestCases};

    use super::NonZero;
    use crate::infer_types::{InferTypes, InputTypes, TensorType};

    #[test]
    fn test_non_zero() {
        #[derive(Debug)]
        struct Case {
            input: TensorType,
            expected_shape: PartialShape,
        }

        let cases = [
            Case {
                input: TensorType::new(PartialShape::fixed(&[5]), ElementType::F32),
                expected_shape: PartialShape::from([Dimension::Fixed(1), Dimension::Unknown]),
            },
            Case {
                input: TensorType::new(PartialShape::fixed(&[3, 4, 5]), ElementType::Boolean),
                expected_shape: PartialShape::from([Dimension::Fixed(3), Dimension::Unknown]),
            },
            // Unknown dims don't affect the output since only the rank is used.
            Case {
                input: TensorType::new(
                    PartialShape::from([Dimension::Unknown, Dimension::Unknown]),
                    ElementType::I32,
                ),
                expected_shape: PartialShape::from([Dimension::Fixed(2), Dimension::Unknown]),
            },
            // Unknown rank
            Case {
                input: TensorType::new(PartialShape::dynamic(), ElementType::Dynamic),
                expected_shape: PartialShape::unknown_dims(2),
            },
        ];

        cases.test_each(|case| {
            let outputs = NonZero::default()
                .infer_types(&[&case.input].into_iter().collect())
                .unwrap();
            assert_eq!(outputs.len(), 1);
            assert_eq!(outputs[0].shape, case.expected_shape);
            assert_eq!(outputs[0].element_type, ElementType::I64);
        })
    }

    #[test]
    fn test_non_zero_output_type() {
        let input = TensorType::new(PartialShape::fixed(&[2, 2]), ElementType::F32);
        let inputs: InputTypes = [&input].into_iter().collect();

        let op = NonZero {
            output_type: ElementType::I32,
        };
        let outputs = op.infer_types(&inputs).unwrap();
        assert_eq!(outputs[0].element_type, ElementType::I32);

        let op = NonZero {
            output_type: ElementType::F32,
        };
        assert_err_contains(
            op.infer_types(&inputs),
            "Output type must be i32 or i64. Got: f32",
        );
    }

    #[test]
    fn test_non_zero_scalar_input() {
        let input = TensorType::new(PartialShape::scalar(), ElementType::F32);
        let result = NonZero::default().infer_types(&[&input].into_iter().collect());
        assert_err_contains(result, "rank >= 1 for the 'data' input. Got: [] (rank 0)");
    }

    #[test]
    fn test_non_zero_missing_input() {
        let result = NonZero::default().infer_types(&InputTypes::default());
        assert_err_contains(result, "Required input 0 is missing");
    }
}
