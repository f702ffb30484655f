//! The weaver's own model of GraphQL types.
//!
//! Silks describe types with these descriptors; the weaver lowers them into
//! the engine's native definitions at weave time. Named types are shared by
//! reference, so two silks mentioning the same object compare identical.

use std::sync::Arc;

use indexmap::IndexMap;

/// A GraphQL type as seen by the weaver.
#[derive(Clone, Debug)]
pub enum MetaType {
    Scalar(ScalarType),
    Object(Arc<ObjectType>),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    Enum(Arc<EnumType>),
    InputObject(Arc<InputObjectType>),
    List(Box<MetaType>),
    NonNull(Box<MetaType>),
}

impl MetaType {
    pub fn string() -> Self {
        Self::Scalar(ScalarType::new("String"))
    }

    pub fn int() -> Self {
        Self::Scalar(ScalarType::new("Int"))
    }

    pub fn float() -> Self {
        Self::Scalar(ScalarType::new("Float"))
    }

    pub fn boolean() -> Self {
        Self::Scalar(ScalarType::new("Boolean"))
    }

    pub fn id() -> Self {
        Self::Scalar(ScalarType::new("ID"))
    }

    pub fn list(inner: MetaType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn non_null(inner: MetaType) -> Self {
        Self::NonNull(Box::new(inner))
    }

    /// The underlying named type, with list and non-null wrappers removed.
    pub fn named_type(&self) -> &MetaType {
        match self {
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
            other => other,
        }
    }

    /// Name of this type, `None` for list and non-null wrappers.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Scalar(scalar) => Some(&scalar.name),
            Self::Object(object) => Some(&object.name),
            Self::Interface(interface) => Some(&interface.name),
            Self::Union(union) => Some(&union.name),
            Self::Enum(r#enum) => Some(&r#enum.name),
            Self::InputObject(input) => Some(&input.name),
            Self::List(_) | Self::NonNull(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Object(_) => "object",
            Self::Interface(_) => "interface",
            Self::Union(_) => "union",
            Self::Enum(_) => "enum",
            Self::InputObject(_) => "input object",
            Self::List(_) => "list",
            Self::NonNull(_) => "non-null",
        }
    }

    /// Interfaces and unions need a concrete type decided at runtime.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Whether both sides denote the same definition. Named types compare
    /// by identity, wrappers recurse.
    pub(crate) fn definition_eq(&self, other: &MetaType) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Interface(a), Self::Interface(b)) => Arc::ptr_eq(a, b),
            (Self::Union(a), Self::Union(b)) => Arc::ptr_eq(a, b),
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::InputObject(a), Self::InputObject(b)) => Arc::ptr_eq(a, b),
            (Self::List(a), Self::List(b)) | (Self::NonNull(a), Self::NonNull(b)) => {
                a.definition_eq(b)
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarType {
    pub name: String,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A plain data field on an object, interface or input object type.
#[derive(Clone, Debug)]
pub struct MetaField {
    pub ty: MetaType,
    pub description: Option<String>,
}

impl MetaField {
    pub fn new(ty: MetaType) -> Self {
        Self { ty, description: None }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<MetaType> for MetaField {
    fn from(ty: MetaType) -> Self {
        Self::new(ty)
    }
}

#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, MetaField>,
    pub interfaces: Vec<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            interfaces: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl Into<MetaField>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    #[must_use]
    pub fn implement(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }
}

#[derive(Debug)]
pub struct InterfaceType {
    pub name: String,
    pub fields: IndexMap<String, MetaField>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl Into<MetaField>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }
}

#[derive(Debug)]
pub struct UnionType {
    pub name: String,
    pub possible_types: Vec<String>,
}

impl UnionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            possible_types: Vec::new(),
        }
    }

    #[must_use]
    pub fn possible_type(mut self, name: impl Into<String>) -> Self {
        self.possible_types.push(name.into());
        self
    }
}

#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }
}

#[derive(Debug)]
pub struct InputObjectType {
    pub name: String,
    pub fields: IndexMap<String, MetaField>,
}
