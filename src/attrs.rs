//! Operator attributes and the visitor interface used to expose them.

use std::fmt;

use rten_shape_inference::{ElementType, PartialShape};
use smallvec::SmallVec;

/// Value of an operator attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    String(String),
    ElementType(ElementType),
    Shape(PartialShape),
}

impl AttrValue {
    /// Return a short name for the type of this value, for use in errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::ElementType(_) => "element type",
            Self::Shape(_) => "shape",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(val) => write!(f, "{}", val),
            Self::Int(val) => write!(f, "{}", val),
            Self::Float(val) => write!(f, "{}", val),
            Self::String(val) => write!(f, "\"{}\"", val),
            Self::ElementType(val) => write!(f, "{}", val),
            Self::Shape(val) => write!(f, "{}", val),
        }
    }
}

macro_rules! impl_attr_conversions {
    ($type:ty, $variant:ident) => {
        impl From<$type> for AttrValue {
            fn from(val: $type) -> Self {
                AttrValue::$variant(val)
            }
        }

        impl TryFrom<&AttrValue> for $type {
            type Error = &'static str;

            fn try_from(val: &AttrValue) -> Result<Self, Self::Error> {
                match val {
                    AttrValue::$variant(val) => Ok(val.clone()),
                    other => Err(other.type_name()),
                }
            }
        }
    };
}

impl_attr_conversions!(bool, Bool);
impl_attr_conversions!(i64, Int);
impl_attr_conversions!(f32, Float);
impl_attr_conversions!(String, String);
impl_attr_conversions!(ElementType, ElementType);
impl_attr_conversions!(PartialShape, Shape);

impl From<&str> for AttrValue {
    fn from(val: &str) -> Self {
        AttrValue::String(val.to_string())
    }
}

/// An operator's attributes as `(name, value)` pairs, in declaration order.
pub type Attributes = SmallVec<[(&'static str, AttrValue); 4]>;

/// Visitor which receives the attributes of an operator.
///
/// This is used by serializers and by code which needs to copy an operator's
/// configuration. See [`Node::visit_attributes`](crate::Node::visit_attributes).
pub trait AttributeVisitor {
    /// Receive an attribute. Return `false` to stop visiting further
    /// attributes.
    fn on_attribute(&mut self, name: &str, value: &AttrValue) -> bool;
}

/// List of named attribute values.
///
/// This is both an [`AttributeVisitor`] which collects an operator's
/// attributes, and the input from which the [`OpRegistry`](crate::OpRegistry)
/// creates operators.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttrList {
    attrs: Vec<(String, AttrValue)>,
}

impl AttrList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, replacing any existing attribute with the same name.
    pub fn push(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        if let Some(entry) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl AttributeVisitor for AttrList {
    fn on_attribute(&mut self, name: &str, value: &AttrValue) -> bool {
        self.push(name, value.clone());
        true
    }
}
