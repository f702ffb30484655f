//! Field descriptors and resolver units.
//!
//! A [`Field`] binds an output silk, an optional input shape and a resolve
//! function; a [`Resolver`] groups fields into one unit, optionally bound
//! to a parent object type, with resolver-scoped middleware. Descriptors
//! are immutable once built; the weaver consumes them at weave time.

pub mod middleware;
pub mod payload;

use std::{future::Future, sync::Arc};

use async_graphql::{Name, Value};
use futures_util::{
    future::BoxFuture,
    stream::{BoxStream, Stream, StreamExt},
};
use indexmap::IndexMap;

use crate::{errors::ResolveError, silk::Silk};

use self::middleware::{Middleware, MiddlewareChain, ResolveResult};

/// Which schema position a field occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
    /// A field resolved on an object type declared with [`Resolver::of`].
    Field,
}

/// Declared input shape of a field.
#[derive(Clone, Debug, Default)]
pub enum InputSpec {
    /// No arguments.
    #[default]
    None,
    /// Named arguments, each with its own silk.
    Record(IndexMap<String, Silk>),
    /// A single object-shaped silk whose fields become the arguments.
    Object(Silk),
}

/// Input to a resolve function: the parent value and the decoded
/// arguments. The full [`payload::ResolverPayload`] is available ambiently
/// through [`payload::current_payload`].
#[derive(Clone, Debug)]
pub struct ResolveRequest {
    pub parent: Value,
    pub args: IndexMap<Name, Value>,
}

impl ResolveRequest {
    /// Decoded argument by name, `Value::Null` when absent.
    pub fn arg(&self, name: &str) -> Value {
        self.args.get(name).cloned().unwrap_or(Value::Null)
    }
}

pub type ResolveFn = Arc<dyn Fn(ResolveRequest) -> BoxFuture<'static, ResolveResult> + Send + Sync>;

pub type SubscribeFn = Arc<
    dyn Fn(
            ResolveRequest,
        )
            -> BoxFuture<'static, Result<BoxStream<'static, ResolveResult>, ResolveError>>
        + Send
        + Sync,
>;

/// Maps a field error before it reaches the engine; attached per resolver
/// unit.
pub type ErrorHook = Arc<dyn Fn(ResolveError) -> ResolveError + Send + Sync>;

/// One resolvable field, immutable once its resolver unit is built.
pub struct Field {
    pub(crate) output: Silk,
    pub(crate) input: InputSpec,
    pub(crate) operation: OperationKind,
    pub(crate) resolve: Option<ResolveFn>,
    pub(crate) subscribe: Option<SubscribeFn>,
    pub(crate) middlewares: MiddlewareChain,
    /// Owning type's silk for fields-on-type; lookup only, set once at
    /// resolver construction.
    pub(crate) parent: Option<Silk>,
    pub(crate) description: Option<String>,
}

impl Field {
    pub fn query(output: Silk) -> FieldBuilder {
        FieldBuilder::new(OperationKind::Query, output)
    }

    pub fn mutation(output: Silk) -> FieldBuilder {
        FieldBuilder::new(OperationKind::Mutation, output)
    }

    pub fn subscription(output: Silk) -> FieldBuilder {
        FieldBuilder::new(OperationKind::Subscription, output)
    }

    /// A field resolved on the object type of a [`Resolver::of`] unit.
    pub fn on_type(output: Silk) -> FieldBuilder {
        FieldBuilder::new(OperationKind::Field, output)
    }

    pub fn output(&self) -> &Silk {
        &self.output
    }

    pub fn input(&self) -> &InputSpec {
        &self.input
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn parent(&self) -> Option<&Silk> {
        self.parent.as_ref()
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("operation", &self.operation)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Field`]; finalized when added to a [`Resolver`].
pub struct FieldBuilder {
    output: Silk,
    input: InputSpec,
    operation: OperationKind,
    resolve: Option<ResolveFn>,
    subscribe: Option<SubscribeFn>,
    middlewares: MiddlewareChain,
    description: Option<String>,
}

impl FieldBuilder {
    fn new(operation: OperationKind, output: Silk) -> Self {
        Self {
            output,
            input: InputSpec::None,
            operation,
            resolve: None,
            subscribe: None,
            middlewares: MiddlewareChain::default(),
            description: None,
        }
    }

    /// Declares a named argument. Replaces a previously declared
    /// single-object input.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, silk: Silk) -> Self {
        match &mut self.input {
            InputSpec::Record(map) => {
                map.insert(name.into(), silk);
            }
            _ => {
                let mut map = IndexMap::new();
                map.insert(name.into(), silk);
                self.input = InputSpec::Record(map);
            }
        }
        self
    }

    /// Declares the whole argument set from one object-shaped silk.
    /// Replaces previously declared named arguments.
    #[must_use]
    pub fn input(mut self, silk: Silk) -> Self {
        self.input = InputSpec::Object(silk);
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn resolve<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ResolveRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolveResult> + Send + 'static,
    {
        self.resolve = Some(Arc::new(move |request| -> BoxFuture<'static, ResolveResult> {
            Box::pin(f(request))
        }));
        self
    }

    /// Sets the source stream of a subscription field. Each emitted value
    /// is passed through the middleware chain and, when present, the
    /// resolve function.
    #[must_use]
    pub fn subscribe<F, Fut, S>(mut self, f: F) -> Self
    where
        F: Fn(ResolveRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S, ResolveError>> + Send + 'static,
        S: Stream<Item = ResolveResult> + Send + 'static,
    {
        self.subscribe = Some(Arc::new(
            move |request| -> BoxFuture<'static, Result<BoxStream<'static, ResolveResult>, ResolveError>> {
                let source = f(request);
                Box::pin(async move { Ok(source.await?.boxed()) })
            },
        ));
        self
    }

    pub(crate) fn build(self, parent: Option<Silk>) -> Arc<Field> {
        Arc::new(Field {
            output: self.output,
            input: self.input,
            operation: self.operation,
            resolve: self.resolve,
            subscribe: self.subscribe,
            middlewares: self.middlewares,
            parent,
            description: self.description,
        })
    }
}

/// A unit of field descriptors woven into a schema together, carrying
/// resolver-scoped middleware and an optional error hook.
#[derive(Clone, Default)]
pub struct Resolver {
    pub(crate) parent: Option<Silk>,
    pub(crate) fields: Vec<(String, Arc<Field>)>,
    pub(crate) middlewares: MiddlewareChain,
    pub(crate) on_error: Option<ErrorHook>,
}

impl Resolver {
    /// A unit of root-level fields: queries, mutations, subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// A unit of fields resolved on `parent`'s type. Every contained field
    /// gets its parent bound to `parent`, so resolution receives the
    /// correctly typed parent value and abstract parent types populate the
    /// payload's `is_abstract_type`.
    pub fn of(parent: Silk) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FieldBuilder) -> Self {
        let built = field.build(self.parent.clone());
        self.fields.push((name.into(), built));
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Maps errors raised by this unit's fields before they reach the
    /// engine.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(ResolveError) -> ResolveError + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Field descriptor by name.
    pub fn field_named(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }

    pub fn parent(&self) -> Option<&Silk> {
        self.parent.as_ref()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("parent", &self.parent)
            .field("fields", &self.fields.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
