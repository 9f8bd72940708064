use rten_shape_inference::{Dimension, ElementType, PartialShape};

use crate::attrs::{AttrValue, Attributes};
use crate::infer_types::{
    ExpectedRank, InferTypes, InferTypesError, InputTypes, OutputTypes, TensorType,
};
use crate::operator::{OpType, Operator};
use crate::ops::non_zero::check_index_type;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BoxOrder {
    /// Box coordinates are [y1, x1, y2, x2]
    #[default]
    TopLeftBottomRight,

    /// Box coordinates are [center_x, center_y, width, height]
    CenterWidthHeight,
}

impl BoxOrder {
    /// Return the value of the `box_encoding` attribute for this order.
    pub fn encoding(self) -> &'static str {
        match self {
            Self::TopLeftBottomRight => "corner",
            Self::CenterWidthHeight => "center",
        }
    }

    /// Parse a `box_encoding` attribute value.
    pub fn from_encoding(encoding: &str) -> Option<Self> {
        match encoding {
            "corner" => Some(Self::TopLeftBottomRight),
            "center" => Some(Self::CenterWidthHeight),
            _ => None,
        }
    }
}

const INPUTS: &[&str] = &[
    "boxes",
    "scores",
    "max_output_boxes_per_class",
    "iou_threshold",
    "score_threshold",
];

/// Indices and names of the optional inputs, which must be scalars.
const SCALAR_INPUTS: [(usize, &str); 3] = [
    (2, "max_output_boxes_per_class"),
    (3, "iou_threshold"),
    (4, "score_threshold"),
];

/// Check the inputs of a NonMaxSuppression operator.
///
/// Checks are applied in order and the first failure is returned. Checks
/// that depend on a rank or dimension size that is unknown are skipped.
fn check_inputs(inputs: &InputTypes) -> Result<(), InferTypesError> {
    let boxes = &inputs.require(0)?.shape;
    let scores = &inputs.require(1)?.shape;

    for (name, shape) in [("boxes", boxes), ("scores", scores)] {
        if shape.rank().is_some_and(|rank| rank != 3) {
            return Err(InferTypesError::IncorrectRank {
                input: name,
                expected: ExpectedRank::Exact(3),
                actual: shape.clone(),
            });
        }
    }

    // `boxes` has shape [num_batches, num_boxes, 4] and `scores` has shape
    // [num_batches, num_classes, num_boxes].
    if let (Some(boxes_dims), Some(scores_dims)) = (boxes.dims(), scores.dims()) {
        let (boxes_batch, scores_batch) = (boxes_dims[0], scores_dims[0]);
        if !boxes_batch.compatible(scores_batch) {
            return Err(InferTypesError::IncompatibleShapes(format!(
                "The first dimension of both 'boxes' and 'scores' must match. Boxes: {}; Scores: {}",
                boxes_batch, scores_batch
            )));
        }

        let (boxes_len, scores_len) = (boxes_dims[1], scores_dims[2]);
        if !boxes_len.compatible(scores_len) {
            return Err(InferTypesError::IncompatibleShapes(format!(
                "'boxes' and 'scores' input shapes must match at the second and third dimension respectively. Boxes: {}; Scores: {}",
                boxes_len, scores_len
            )));
        }
    }

    for (index, name) in SCALAR_INPUTS {
        let Some(input) = inputs.get(index) else {
            continue;
        };
        if input.shape.rank().is_some_and(|rank| rank != 0) {
            return Err(InferTypesError::IncorrectRank {
                input: name,
                expected: ExpectedRank::Exact(0),
                actual: input.shape.clone(),
            });
        }
    }

    if let Some(&Dimension::Fixed(n_coords)) = boxes.dims().and_then(|dims| dims.get(2)) {
        if n_coords != 4 {
            return Err(InferTypesError::InvalidValue(format!(
                "The last dimension of the 'boxes' input must be equal to 4. Got: {}",
                n_coords
            )));
        }
    }

    Ok(())
}

/// Return the type of the selected indices output.
///
/// Each row of the output is a `(batch_index, class_index, box_index)` triple.
/// The number of rows depends on the input values.
fn selected_indices_type(output_type: ElementType) -> TensorType {
    TensorType::new(
        PartialShape::from([Dimension::Unknown, Dimension::Fixed(3)]),
        output_type,
    )
}

/// Select boxes with high scores, removing boxes which overlap higher scoring
/// boxes of the same class.
///
/// Inputs are `boxes` (`[num_batches, num_boxes, 4]`), `scores`
/// (`[num_batches, num_classes, num_boxes]`) and optional scalar
/// `max_output_boxes_per_class`, `iou_threshold` and `score_threshold` inputs.
/// The output has shape `[num_selected, 3]` and `i64` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct NonMaxSuppression {
    pub box_order: BoxOrder,
    pub sort_result_descending: bool,
}

impl Default for NonMaxSuppression {
    fn default() -> Self {
        NonMaxSuppression {
            box_order: BoxOrder::default(),
            sort_result_descending: true,
        }
    }
}

impl Operator for NonMaxSuppression {
    const OP_TYPE: OpType = OpType::new("NonMaxSuppression", 1);
    const INPUTS: &'static [&'static str] = INPUTS;
    const REQUIRED_INPUTS: usize = 2;

    fn attributes(&self) -> Attributes {
        [
            (
                "box_encoding",
                AttrValue::String(self.box_order.encoding().to_string()),
            ),
            (
                "sort_result_descending",
                AttrValue::Bool(self.sort_result_descending),
            ),
        ]
        .into_iter()
        .collect()
    }
}

impl InferTypes for NonMaxSuppression {
    fn infer_types(&self, inputs: &InputTypes) -> Result<OutputTypes, InferTypesError> {
        check_inputs(inputs)?;
        Ok([selected_indices_type(ElementType::I64)].into())
    }
}

/// Version of [`NonMaxSuppression`] which allows choosing the element type
/// of the output.
#[derive(Clone, Debug, PartialEq)]
pub struct NonMaxSuppressionV3 {
    pub box_order: BoxOrder,
    pub sort_result_descending: bool,

    /// Element type of the selected indices. Must be `i32` or `i64`.
    pub output_type: ElementType,
}

impl Default for NonMaxSuppressionV3 {
    fn default() -> Self {
        NonMaxSuppressionV3 {
            box_order: BoxOrder::default(),
            sort_result_descending: true,
            output_type: ElementType::I64,
        }
    }
}

impl Operator for NonMaxSuppressionV3 {
    const OP_TYPE: OpType = OpType::new("NonMaxSuppression", 3);
    const INPUTS: &'static [&'static str] = INPUTS;
    const REQUIRED_INPUTS: usize = 2;

    fn attributes(&self) -> Attributes {
        [
            (
                "box_encoding",
                AttrValue::String(self.box_order.encoding().to_string()),
            ),
            (
                "sort_result_descending",
                AttrValue::Bool(self.sort_result_descending),
            ),
            ("output_type", AttrValue::ElementType(self.output_type)),
        ]
        .into_iter()
        .collect()
    }
}

impl InferTypes for NonMaxSuppressionV3 {
    fn infer_types(&self, inputs: &InputTypes) -> Result<OutputTypes, InferTypesError> {
        check_inputs(inputs)?;
        check_index_type(self.output_type)?;
        Ok([selected_indices_type(self.output_type)].into())
    }
}

#[cfg(test)]
mod tests {
    use rten_shape_inference::{Dimension, ElementType, PartialShape};
    use rten_testing::{assert_err_contains, TestCases};

    use super::{BoxOrder, NonMaxSuppression, NonMaxSuppressionV3};
    use crate::infer_types::{InferTypes, InputTypes, OutputTypes, TensorType};

    fn f32_input(shape: PartialShape) -> Option<TensorType> {
        Some(TensorType::new(shape, ElementType::F32))
    }

    fn run_nms(inputs: &[Option<TensorType>]) -> Result<OutputTypes, String> {
        let inputs = InputTypes::new(inputs.iter().map(|input| input.as_ref()));
        NonMaxSuppression::default()
            .infer_types(&inputs)
            .map_err(|err| err.to_string())
    }

    #[test]
    fn test_nms_output_type() {
        #[derive(Debug)]
        struct Case {
            boxes: PartialShape,
            scores: PartialShape,
        }

        let cases = [
            Case {
                boxes: PartialShape::fixed(&[1, 2, 4]),
                scores: PartialShape::fixed(&[1, 2, 2]),
            },
            Case {
                boxes: PartialShape::fixed(&[4, 100, 4]),
                scores: PartialShape::fixed(&[4, 80, 100]),
            },
            // Unknown dims are compatible with any size.
            Case {
                boxes: PartialShape::from([
                    Dimension::Unknown,
                    Dimension::Fixed(10),
                    Dimension::Unknown,
                ]),
                scores: PartialShape::from([
                    Dimension::Fixed(2),
                    Dimension::Fixed(3),
                    Dimension::Unknown,
                ]),
            },
            // Unknown ranks skip all shape checks.
            Case {
                boxes: PartialShape::dynamic(),
                scores: PartialShape::dynamic(),
            },
        ];

        cases.test_each(|case| {
            let outputs =
                run_nms(&[f32_input(case.boxes.clone()), f32_input(case.scores.clone())]).unwrap();
            assert_eq!(outputs.len(), 1);
            let output = &outputs[0];
            assert_eq!(output.shape.rank(), Some(2));
            assert_eq!(output.shape.dim(0), Dimension::Unknown);
            assert_eq!(output.shape.dim(1), Dimension::Fixed(3));
            assert_eq!(output.element_type, ElementType::I64);
        })
    }

    #[test]
    fn test_nms_invalid_shapes() {
        #[derive(Debug)]
        struct Case {
            boxes: PartialShape,
            scores: PartialShape,
            expected: &'static str,
        }

        let cases = [
            Case {
                boxes: PartialShape::fixed(&[1, 2, 3, 4]),
                scores: PartialShape::fixed(&[1, 2, 3]),
                expected: "Expected a 3D tensor for the 'boxes' input",
            },
            Case {
                boxes: PartialShape::fixed(&[1, 2, 3]),
                scores: PartialShape::fixed(&[1, 2]),
                expected: "Expected a 3D tensor for the 'scores' input",
            },
            Case {
                boxes: PartialShape::fixed(&[1, 2, 3]),
                scores: PartialShape::fixed(&[2, 2, 3]),
                expected: "The first dimension of both 'boxes' and 'scores' must match. Boxes: 1; Scores: 2",
            },
            Case {
                boxes: PartialShape::fixed(&[1, 2, 3]),
                scores: PartialShape::fixed(&[1, 2, 3]),
                expected: "'boxes' and 'scores' input shapes must match at the second and third dimension respectively. Boxes: 2; Scores: 3",
            },
            Case {
                boxes: PartialShape::fixed(&[1, 2, 5]),
                scores: PartialShape::fixed(&[1, 2, 2]),
                expected: "The last dimension of the 'boxes' input must be equal to 4. Got: 5",
            },
            // Rank is checked before dimension agreement.
            Case {
                boxes: PartialShape::fixed(&[2, 2]),
                scores: PartialShape::fixed(&[1, 2, 3]),
                expected: "Expected a 3D tensor for the 'boxes' input. Got: [2,2]",
            },
        ];

        cases.test_each(|case| {
            let result = run_nms(&[f32_input(case.boxes.clone()), f32_input(case.scores.clone())]);
            assert_err_contains(result, case.expected);
        })
    }

    #[test]
    fn test_nms_scalar_inputs() {
        #[derive(Debug)]
        struct Case {
            non_scalar_index: usize,
            expected: &'static str,
        }

        let cases = [
            Case {
                non_scalar_index: 2,
                expected: "Expected a scalar for the 'max_output_boxes_per_class' input",
            },
            Case {
                non_scalar_index: 3,
                expected: "Expected a scalar for the 'iou_threshold' input",
            },
            Case {
                non_scalar_index: 4,
                expected: "Expected a scalar for the 'score_threshold' input",
            },
        ];

        cases.test_each(|case| {
            let mut inputs = vec![
                f32_input(PartialShape::fixed(&[1, 2, 4])),
                f32_input(PartialShape::fixed(&[1, 2, 2])),
                f32_input(PartialShape::scalar()),
                f32_input(PartialShape::scalar()),
                f32_input(PartialShape::scalar()),
            ];
            inputs[case.non_scalar_index] = f32_input(PartialShape::fixed(&[1]));
            assert_err_contains(run_nms(&inputs), case.expected);

            // Optional inputs can be omitted individually.
            inputs[2] = None;
            if case.non_scalar_index != 2 {
                assert_err_contains(run_nms(&inputs), case.expected);
            } else {
                assert!(run_nms(&inputs).is_ok());
            }
        })
    }

    #[test]
    fn test_nms_dimension_checks_precede_scalar_checks() {
        let inputs = [
            f32_input(PartialShape::fixed(&[1, 2, 4])),
            f32_input(PartialShape::fixed(&[2, 2, 2])),
            f32_input(PartialShape::fixed(&[1])),
        ];
        assert_err_contains(run_nms(&inputs), "The first dimension of both");
    }

    #[test]
    fn test_nms_v3_output_type() {
        let boxes = TensorType::new(PartialShape::fixed(&[1, 2, 4]), ElementType::F32);
        let scores = TensorType::new(PartialShape::fixed(&[1, 2, 2]), ElementType::F32);
        let inputs: InputTypes = [&boxes, &scores].into_iter().collect();

        let op = NonMaxSuppressionV3 {
            output_type: ElementType::I32,
            ..Default::default()
        };
        let outputs = op.infer_types(&inputs).unwrap();
        assert_eq!(outputs[0].element_type, ElementType::I32);
        assert_eq!(
            outputs[0].shape,
            PartialShape::from([Dimension::Unknown, Dimension::Fixed(3)])
        );

        let op = NonMaxSuppressionV3 {
            output_type: ElementType::F16,
            ..Default::default()
        };
        assert_err_contains(op.infer_types(&inputs), "Output type must be i32 or i64");
    }

    #[test]
    fn test_box_encoding() {
        for order in [BoxOrder::TopLeftBottomRight, BoxOrder::CenterWidthHeight] {
            assert_eq!(BoxOrder::from_encoding(order.encoding()), Some(order));
        }
        assert_eq!(BoxOrder::from_encoding("corners"), None);
    }
}
