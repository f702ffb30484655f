//! The ambient resolver payload.
//!
//! The payload carries the application context, parent value, decoded
//! arguments, the executing field descriptor and execution metadata.
//! During one field resolution it is available to resolver code,
//! middlewares and anything they call, without being threaded through
//! parameters. Scoping is per logical
//! task: the payload is installed only while the field's own future is
//! polled, so sibling resolutions interleaved by the executor never observe
//! each other's payload, and nested resolutions form a stack.

use std::{any::Any, future::Future, sync::Arc};

use async_graphql::{Name, Value};
use indexmap::IndexMap;

use crate::{resolver::Field, silk::Silk};

tokio::task_local! {
    static PAYLOAD: ResolverPayload;
}

/// Request-scoped application value shared by every resolver of one
/// operation. Opaque to the weaver.
#[derive(Clone)]
pub struct AppContext(Arc<dyn Any + Send + Sync>);

impl AppContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Whether both handles share the same underlying value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

/// Execution metadata supplied by the engine for the current field.
#[derive(Clone, Debug)]
pub struct ResolveInfo {
    pub field_name: String,
    pub parent_type: String,
    pub return_type: String,
    /// Response path from the operation root down to this field.
    pub path: Vec<String>,
}

/// The contextual record available during one field resolution.
#[derive(Clone)]
pub struct ResolverPayload {
    /// Application-supplied request context, if any was attached.
    pub context: Option<AppContext>,
    /// Parent value the current field is resolved against.
    pub root: Value,
    /// Decoded and validated arguments.
    pub args: IndexMap<Name, Value>,
    /// The field descriptor currently executing.
    pub field: Arc<Field>,
    pub info: ResolveInfo,
    /// The silk that led to the output type, when that type is abstract.
    pub is_abstract_type: Option<Silk>,
}

/// Runs `fut` with `payload` installed as the ambient payload for its whole
/// dynamic extent, nested extents included.
///
/// The payload is restored on exit even when `fut` fails. Work handed to
/// `tokio::spawn` runs outside the extent; pass the payload explicitly
/// there.
pub async fn with_payload<F: Future>(payload: ResolverPayload, fut: F) -> F::Output {
    PAYLOAD.scope(payload, fut).await
}

/// The ambient payload of the innermost enclosing [`with_payload`] extent,
/// or `None` when called outside any field resolution.
pub fn current_payload() -> Option<ResolverPayload> {
    PAYLOAD.try_with(Clone::clone).ok()
}

/// Shorthand for the application context of the current resolution.
pub fn current_context() -> Option<AppContext> {
    PAYLOAD.try_with(|payload| payload.context.clone()).ok().flatten()
}

#[cfg(test)]
mod tests {
    use futures_util::future::join;

    use super::*;
    use crate::{
        errors::ResolveError,
        resolver::{middleware::MiddlewareChain, InputSpec, OperationKind, ResolveFn},
    };

    fn payload(tag: &str) -> ResolverPayload {
        let resolve: ResolveFn = Arc::new(|_| Box::pin(async { Ok(Value::Null) }));
        ResolverPayload {
            context: Some(AppContext::new(tag.to_string())),
            root: Value::Null,
            args: IndexMap::new(),
            field: Arc::new(Field {
                output: Silk::string(),
                input: InputSpec::None,
                operation: OperationKind::Query,
                resolve: Some(resolve),
                subscribe: None,
                middlewares: MiddlewareChain::default(),
                parent: None,
                description: None,
            }),
            info: ResolveInfo {
                field_name: tag.to_string(),
                parent_type: "Query".to_string(),
                return_type: "String".to_string(),
                path: vec![tag.to_string()],
            },
            is_abstract_type: None,
        }
    }

    fn tag() -> Option<String> {
        current_context()?.downcast_ref::<String>().cloned()
    }

    #[tokio::test]
    async fn none_outside_any_extent() {
        assert!(current_payload().is_none());
        assert!(current_context().is_none());
    }

    #[tokio::test]
    async fn nested_extents_stack() {
        with_payload(payload("outer"), async {
            assert_eq!(tag().as_deref(), Some("outer"));
            with_payload(payload("inner"), async {
                assert_eq!(tag().as_deref(), Some("inner"));
            })
            .await;
            assert_eq!(tag().as_deref(), Some("outer"));
        })
        .await;
        assert!(current_payload().is_none());
    }

    #[tokio::test]
    async fn interleaved_siblings_are_isolated() {
        let left = with_payload(payload("left"), async {
            for _ in 0..16 {
                assert_eq!(tag().as_deref(), Some("left"));
                tokio::task::yield_now().await;
            }
        });
        let right = with_payload(payload("right"), async {
            for _ in 0..16 {
                assert_eq!(tag().as_deref(), Some("right"));
                tokio::task::yield_now().await;
            }
        });
        join(left, right).await;
        assert!(current_payload().is_none());
    }

    #[tokio::test]
    async fn cleared_when_the_extent_fails() {
        let result: Result<Value, ResolveError> = with_payload(payload("failing"), async {
            Err(ResolveError::message("boom"))
        })
        .await;
        assert!(result.is_err());
        assert!(current_payload().is_none());
    }
}
