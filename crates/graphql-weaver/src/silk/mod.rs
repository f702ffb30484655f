//! Data descriptors pairing a GraphQL type with transcoding capability.

mod types;

pub use types::{
    EnumType, InputObjectType, InterfaceType, MetaField, MetaType, ObjectType, ScalarType,
    UnionType,
};

use std::sync::Arc;

use async_graphql::Value;

/// Validation/transcoding hook attached to a silk. Receives the raw value
/// and returns the decoded (or encoded) one, or a failure reason.
pub type TranscodeFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// A typed data descriptor: a GraphQL type plus optional parse (input
/// decoding/validation) and serialize (output encoding) capability.
///
/// Silks are cheap to clone; named types inside them are shared by
/// reference, so clones still denote the same schema type.
#[derive(Clone)]
pub struct Silk {
    ty: MetaType,
    parse: Option<TranscodeFn>,
    serialize: Option<TranscodeFn>,
}

impl Silk {
    pub fn new(ty: MetaType) -> Self {
        Self {
            ty,
            parse: None,
            serialize: None,
        }
    }

    pub fn string() -> Self {
        Self::new(MetaType::string())
    }

    pub fn int() -> Self {
        Self::new(MetaType::int())
    }

    pub fn float() -> Self {
        Self::new(MetaType::float())
    }

    pub fn boolean() -> Self {
        Self::new(MetaType::boolean())
    }

    pub fn id() -> Self {
        Self::new(MetaType::id())
    }

    pub fn object(object: ObjectType) -> Self {
        Self::new(MetaType::Object(Arc::new(object)))
    }

    pub fn interface(interface: InterfaceType) -> Self {
        Self::new(MetaType::Interface(Arc::new(interface)))
    }

    pub fn union(union: UnionType) -> Self {
        Self::new(MetaType::Union(Arc::new(union)))
    }

    pub fn enum_type(r#enum: EnumType) -> Self {
        Self::new(MetaType::Enum(Arc::new(r#enum)))
    }

    /// Wraps the silk's type in a list.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.ty = MetaType::list(self.ty);
        self
    }

    /// Wraps the silk's type in a non-null.
    #[must_use]
    pub fn non_null(mut self) -> Self {
        self.ty = MetaType::non_null(self.ty);
        self
    }

    /// Attaches an input decoding/validation function, run on raw argument
    /// values before they reach the resolve function.
    #[must_use]
    pub fn with_parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.parse = Some(Arc::new(parse));
        self
    }

    /// Attaches an output encoding function, run on resolved values before
    /// they are handed back to the engine.
    #[must_use]
    pub fn with_serialize<F>(mut self, serialize: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.serialize = Some(Arc::new(serialize));
        self
    }

    pub fn ty(&self) -> &MetaType {
        &self.ty
    }

    pub(crate) fn decode(&self, value: Value) -> Result<Value, String> {
        match &self.parse {
            Some(parse) => parse(value),
            None => Ok(value),
        }
    }

    pub(crate) fn encode(&self, value: Value) -> Result<Value, String> {
        match &self.serialize {
            Some(serialize) => serialize(value),
            None => Ok(value),
        }
    }
}

impl std::fmt::Debug for Silk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Silk").field("ty", &self.ty).finish_non_exhaustive()
    }
}
