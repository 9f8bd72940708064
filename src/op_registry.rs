use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use rten_shape_inference::{ElementType, PartialShape};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::attrs::{AttrList, AttrValue};
use crate::operator::{Op, OpType, Operator};
use crate::ops;
use crate::ops::BoxOrder;

/// Registry used to create operators from their type and attributes.
///
/// Operators are identified by name and version. Different versions of an
/// operator with the same name are registered separately.
///
/// New registries have no operators registered by default. To create a
/// registry with all built-in operators pre-registered, use
/// [`OpRegistry::with_all_ops`], or use the shared instance returned by
/// [`OpRegistry::global`].
#[derive(Default)]
pub struct OpRegistry {
    /// Map from operator name to the factories for each registered version.
    ops: FxHashMap<&'static str, SmallVec<[(u32, Box<ReadOpFunction>); 2]>>,
}

impl OpRegistry {
    /// Create a new empty registry.
    pub fn new() -> OpRegistry {
        OpRegistry {
            ops: FxHashMap::default(),
        }
    }

    /// Register the built-in implementation of an operator.
    ///
    /// This replaces any existing registration with the same name and version.
    pub fn register_op<T: ReadOp + 'static>(&mut self) {
        let OpType { name, version } = T::OP_TYPE;
        let versions = self.ops.entry(name).or_default();
        versions.retain(|(v, _)| *v != version);
        let read_fn: Box<ReadOpFunction> =
            Box::new(|attrs: &AttrList| T::read(attrs).map(Into::into));
        versions.push((version, read_fn));
    }

    /// Create a new registry with all built-in operators registered.
    pub fn with_all_ops() -> OpRegistry {
        let mut reg = OpRegistry::new();

        macro_rules! register_op {
            ($op:ident) => {
                reg.register_op::<ops::$op>()
            };
        }

        register_op!(NonMaxSuppression);
        register_op!(NonMaxSuppressionV3);
        register_op!(NonZero);
        register_op!(Parameter);

        reg
    }

    /// Return the shared registry of built-in operators.
    ///
    /// The registry is created on first use and is not modified afterwards.
    pub fn global() -> &'static OpRegistry {
        static REGISTRY: OnceLock<OpRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let reg = OpRegistry::with_all_ops();
            tracing::trace!(ops = reg.op_types().count(), "created global op registry");
            reg
        })
    }

    /// Return true if an operator with a given name and version is registered.
    pub fn contains(&self, name: &str, version: u32) -> bool {
        self.find(name, version).is_some()
    }

    /// Return the types of all registered operators.
    pub fn op_types(&self) -> impl Iterator<Item = OpType> + '_ {
        self.ops.iter().flat_map(|(name, versions)| {
            versions
                .iter()
                .map(|(version, _)| OpType::new(*name, *version))
        })
    }

    /// Create an operator from its type and attributes.
    ///
    /// Attributes which are not present take their default values. All
    /// attributes in `attrs` must be recognized by the operator.
    pub fn read_op(&self, name: &str, version: u32, attrs: &AttrList) -> Result<Op, ReadOpError> {
        let read_fn = self
            .find(name, version)
            .ok_or_else(|| ReadOpError::OperatorUnavailable {
                name: name.to_string(),
                version,
            })?;
        read_fn(attrs)
    }

    fn find(&self, name: &str, version: u32) -> Option<&ReadOpFunction> {
        self.ops.get(name).and_then(|versions| {
            versions
                .iter()
                .find_map(|(v, read_fn)| (*v == version).then_some(&**read_fn))
        })
    }
}

/// Error type for errors that occur when creating an operator from its
/// attributes.
#[derive(Clone, Debug, PartialEq)]
pub enum ReadOpError {
    /// An attribute is missing, has the wrong type or an unsupported value.
    AttrError {
        /// Name of the attribute.
        attr: String,
        /// Description of the attribute error.
        error: String,
    },
    /// No operator with this name and version is registered.
    OperatorUnavailable { name: String, version: u32 },
    /// An attribute was supplied which the operator does not have.
    UnusedAttribute(String),
}

impl ReadOpError {
    fn attr_error(attr: impl AsRef<str>, error: impl AsRef<str>) -> Self {
        Self::AttrError {
            attr: attr.as_ref().to_string(),
            error: error.as_ref().to_string(),
        }
    }
}

impl Display for ReadOpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadOpError::AttrError { attr, error } => {
                write!(f, "error in attribute \"{}\": {}", attr, error)
            }
            ReadOpError::OperatorUnavailable { name, version } => {
                write!(f, "operator {} v{} is not registered", name, version)
            }
            ReadOpError::UnusedAttribute(attr) => {
                write!(f, "unsupported attribute \"{}\"", attr)
            }
        }
    }
}

impl Error for ReadOpError {}

type ReadOpFunction = dyn Fn(&AttrList) -> Result<Op, ReadOpError> + Send + Sync;

/// Trait for operators which can be created from a list of attributes.
pub trait ReadOp: Operator + Sized {
    /// Create an operator from the attributes produced by visiting an
    /// operator of this type.
    fn read(attrs: &AttrList) -> Result<Self, ReadOpError>;
}

/// Wrapper around an operator's attribute list.
///
/// This provides methods to find attributes by name and convert them to a
/// target type. It also records which attributes have been read, to enable
/// detecting unsupported attributes.
struct Attrs<'a> {
    attrs: &'a AttrList,
    used_attrs: RefCell<SmallVec<[&'static str; 4]>>,
}

impl<'a> Attrs<'a> {
    fn new(attrs: &'a AttrList) -> Self {
        Self {
            attrs,
            used_attrs: RefCell::new(Default::default()),
        }
    }

    /// Get an optional attribute.
    fn get(&self, name: &'static str) -> Option<&'a AttrValue> {
        self.used_attrs.borrow_mut().push(name);
        self.attrs.get(name)
    }

    /// Get an optional attribute and convert it to a given type.
    fn get_as<T>(&self, name: &'static str) -> Result<Option<T>, ReadOpError>
    where
        T: TryFrom<&'a AttrValue, Error = &'static str>,
    {
        self.get(name)
            .map(|value| {
                T::try_from(value).map_err(|actual| {
                    ReadOpError::attr_error(name, format!("unexpected value of type {}", actual))
                })
            })
            .transpose()
    }

    /// Get a required attribute and convert it to a given type.
    fn require_as<T>(&self, name: &'static str) -> Result<T, ReadOpError>
    where
        T: TryFrom<&'a AttrValue, Error = &'static str>,
    {
        self.get_as(name)?
            .ok_or_else(|| ReadOpError::attr_error(name, "required attribute missing"))
    }

    /// Return an error if any attribute has not been read.
    fn check_unused(&self) -> Result<(), ReadOpError> {
        let used_attrs = self.used_attrs.borrow();
        match self
            .attrs
            .iter()
            .find(|(name, _)| !used_attrs.iter().any(|used| used == name))
        {
            Some((name, _)) => Err(ReadOpError::UnusedAttribute(name.to_string())),
            None => Ok(()),
        }
    }
}

macro_rules! impl_read_op {
    ($op:ident, $read:expr) => {
        impl ReadOp for ops::$op {
            fn read(attrs: &AttrList) -> Result<Self, ReadOpError> {
                let attrs = Attrs::new(attrs);
                let read: fn(&Attrs) -> Result<Self, ReadOpError> = $read;
                let op = read(&attrs)?;
                attrs.check_unused()?;
                Ok(op)
            }
        }
    };
}

fn read_box_order(attrs: &Attrs) -> Result<BoxOrder, ReadOpError> {
    let Some(encoding) = attrs.get_as::<String>("box_encoding")? else {
        return Ok(BoxOrder::default());
    };
    BoxOrder::from_encoding(&encoding).ok_or_else(|| {
        ReadOpError::attr_error("box_encoding", format!("unsupported value \"{}\"", encoding))
    })
}

impl_read_op!(NonMaxSuppression, |attrs: &Attrs| {
    let box_order = read_box_order(attrs)?;
    let sort_result_descending = attrs.get_as("sort_result_descending")?.unwrap_or(true);
    Ok(ops::NonMaxSuppression {
        box_order,
        sort_result_descending,
    })
});

impl_read_op!(NonMaxSuppressionV3, |attrs: &Attrs| {
    let box_order = read_box_order(attrs)?;
    let sort_result_descending = attrs.get_as("sort_result_descending")?.unwrap_or(true);
    let output_type = attrs.get_as("output_type")?.unwrap_or(ElementType::I64);
    Ok(ops::NonMaxSuppressionV3 {
        box_order,
        sort_result_descending,
        output_type,
    })
});

impl_read_op!(NonZero, |attrs: &Attrs| {
    let output_type = attrs.get_as("output_type")?.unwrap_or(ElementType::I64);
    Ok(ops::NonZero { output_type })
});

impl_read_op!(Parameter, |attrs: &Attrs| {
    let element_type: ElementType = attrs.require_as("element_type")?;
    let shape: PartialShape = attrs.require_as("shape")?;
    Ok(ops::Parameter::new(element_type, shape))
});
