//! Schema-first GraphQL composition over typed data descriptors.
//!
//! Silks pair a GraphQL type with optional parse and serialize hooks;
//! resolvers bind fields to silks; the [`SchemaWeaver`] lowers everything
//! into an executable schema. During resolution the full
//! [`ResolverPayload`] is available ambiently, and middleware chains wrap
//! every resolver-backed field from global to field scope.

pub mod errors;
pub mod resolver;
pub mod schema;
pub mod silk;

mod utils;

pub use errors::{ResolveError, WeaveError};
pub use resolver::{
    middleware::{from_fn, Middleware, MiddlewareChain, Next, ResolveResult},
    payload::{current_context, current_payload, with_payload, AppContext, ResolveInfo, ResolverPayload},
    Field, FieldBuilder, InputSpec, OperationKind, ResolveRequest, Resolver,
};
pub use schema::{SchemaWeaver, WeaverConfig};
pub use silk::{
    EnumType, InputObjectType, InterfaceType, MetaField, MetaType, ObjectType, ScalarType, Silk,
    UnionType,
};
