//! Middleware chain composition.
//!
//! A field's execution is the resolve function wrapped in every applicable
//! middleware: global middlewares outermost, then resolver-level, then
//! field-level, each pool in registration order. Composition is an explicit
//! right fold over the ordered list, not closures over mutable state.

use std::sync::Arc;

use async_graphql::Value;
use futures_util::future::BoxFuture;

use crate::errors::ResolveError;

/// Outcome of running a resolve function or a middleware chain.
pub type ResolveResult = Result<Value, ResolveError>;

/// A middleware wraps the remainder of a field's resolution chain.
///
/// `next` runs the inner middlewares and finally the resolve function. A
/// middleware may call it once and pass the result through, transform the
/// result or the error, call it several times, or not at all to
/// short-circuit (authorization denial, caching).
///
/// Middleware code runs inside the ambient payload of the field it wraps;
/// [`crate::resolver::payload::current_payload`] observes that field's
/// payload, nested resolvers included.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, next: Next) -> BoxFuture<'static, ResolveResult>;
}

/// Adapts an async closure into a [`Middleware`].
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Next) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ResolveResult> + Send + 'static,
{
    FromFn(f)
}

pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Next) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ResolveResult> + Send + 'static,
{
    fn call(&self, next: Next) -> BoxFuture<'static, ResolveResult> {
        Box::pin((self.0)(next))
    }
}

/// Continuation handed to a middleware: runs the rest of the chain and
/// produces the eventual resolved value. Cloneable, so a middleware may
/// invoke it more than once.
#[derive(Clone)]
pub struct Next(Arc<dyn Fn() -> BoxFuture<'static, ResolveResult> + Send + Sync>);

impl Next {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ResolveResult> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs the remainder of the chain.
    pub async fn run(self) -> ResolveResult {
        (self.0)().await
    }
}

/// Ordered middleware list. The first middleware pushed ends up outermost
/// once composed.
#[derive(Clone, Default)]
pub struct MiddlewareChain(Vec<Arc<dyn Middleware>>);

impl MiddlewareChain {
    pub fn push(&mut self, middleware: impl Middleware) {
        self.0.push(Arc::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn append(&mut self, other: &MiddlewareChain) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Right-folds the chain around `base` so the first middleware wraps
    /// everything after it.
    pub(crate) fn compose(&self, base: Next) -> Next {
        let mut next = base;
        for middleware in self.0.iter().rev() {
            let middleware = Arc::clone(middleware);
            let inner = next;
            next = Next::new(move || middleware.call(inner.clone()));
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recording(log: Log, label: &'static str) -> impl Middleware {
        from_fn(move |next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(label);
                next.run().await
            }
        })
    }

    fn base(log: Log) -> Next {
        Next::new(move || -> BoxFuture<'static, ResolveResult> {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push("resolve");
                Ok(Value::from("done"))
            })
        })
    }

    #[tokio::test]
    async fn composes_outermost_first() {
        let log = Log::default();
        let mut chain = MiddlewareChain::default();
        chain.push(recording(Arc::clone(&log), "first"));
        chain.push(recording(Arc::clone(&log), "second"));
        chain.push(recording(Arc::clone(&log), "third"));

        let out = chain.compose(base(Arc::clone(&log))).run().await.unwrap();

        assert_eq!(out, Value::from("done"));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third", "resolve"]);
    }

    #[tokio::test]
    async fn short_circuits_when_next_is_skipped() {
        let log = Log::default();
        let mut chain = MiddlewareChain::default();
        chain.push(from_fn(|_next: Next| async { Ok(Value::from("denied")) }));
        chain.push(recording(Arc::clone(&log), "inner"));

        let out = chain.compose(base(Arc::clone(&log))).run().await.unwrap();

        assert_eq!(out, Value::from("denied"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transforms_errors_from_inner_layers() {
        let mut chain = MiddlewareChain::default();
        chain.push(from_fn(|next: Next| async move {
            match next.run().await {
                Err(err) => Ok(Value::from(format!("recovered: {err}"))),
                ok => ok,
            }
        }));

        let failing = Next::new(|| -> BoxFuture<'static, ResolveResult> {
            Box::pin(async { Err(ResolveError::message("boom")) })
        });
        let out = chain.compose(failing).run().await.unwrap();

        assert_eq!(out, Value::from("recovered: boom"));
    }

    #[tokio::test]
    async fn next_may_run_more_than_once() {
        let log = Log::default();
        let mut chain = MiddlewareChain::default();
        chain.push(from_fn(|next: Next| async move {
            next.clone().run().await?;
            next.run().await
        }));

        chain.compose(base(Arc::clone(&log))).run().await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["resolve", "resolve"]);
    }
}
