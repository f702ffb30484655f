use thiserror::Error;

/// Fatal schema-construction errors, raised while weaving.
///
/// Weaving aborts on the first of these; no partial schema is ever
/// returned.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// An interface or union can never stand in input position.
    #[error("Cannot convert {kind} type {name} to input type")]
    AbstractInput { kind: &'static str, name: String },

    /// A single-silk input must resolve to an object type.
    #[error("Cannot convert {0} to input type")]
    InvalidInput(String),

    /// Two distinct object types under the same name were converted to
    /// input form within one weave.
    #[error("Input Type {0} already exists")]
    InputTypeExists(String),

    /// The same type name maps to two different definitions.
    #[error("Type {0} is registered twice with different definitions")]
    TypeConflict(String),

    /// A field name appears more than once on the same parent type.
    #[error("Field {parent}.{field} is defined more than once")]
    DuplicateField { parent: String, field: String },

    /// A field was declared on a type, but its resolver unit has no parent.
    #[error("Field {0} is bound to a type but its resolver has no parent")]
    OrphanField(String),

    /// Resolver units can only be bound to object or interface types.
    #[error("Resolver parent must be an object or interface type, got {0}")]
    InvalidParent(String),

    /// A non-subscription field was declared without a resolve function.
    #[error("Field {parent}.{field} has no resolve function")]
    MissingResolve { parent: String, field: String },

    /// A subscription field was declared without a subscribe function.
    #[error("Subscription field {0} has no subscribe function")]
    MissingSubscribe(String),

    #[error("invalid weaver config: {0}")]
    Config(#[from] serde_json::Error),

    /// The engine rejected the assembled schema.
    #[error("schema build failed: {0}")]
    Build(String),
}

/// Per-request resolution errors.
///
/// These are scoped to a single field and surface to the engine as field
/// errors; sibling fields keep resolving independently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A raw argument failed its silk's validation.
    #[error("invalid value for argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// A whole-object input failed its silk's validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Any other error raised by resolver or middleware code.
    #[error("{0}")]
    Message(String),
}

impl ResolveError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for ResolveError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ResolveError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}
