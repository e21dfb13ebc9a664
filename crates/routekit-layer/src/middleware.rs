//! Middleware handlers and the continuation that drives a layer's stack.

use std::fmt;
use std::sync::Arc;

use futures::future::{self, FutureExt};

use crate::context::Context;
use crate::error::Result;

/// A boxed future for async middleware operations.
pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;

type HandlerFn =
    dyn for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<()>> + Send + Sync;

/// A handler in a layer's stack.
///
/// A middleware receives the request context and a [`Next`] continuation.
/// Awaiting `next.run(ctx)` runs the rest of the stack; returning without
/// calling it stops the stack there.
///
/// # Example
///
/// ```
/// use futures::FutureExt;
/// use routekit_layer::Middleware;
///
/// let timing = Middleware::new(|ctx, next| {
///     async move {
///         ctx.set_state("seen", true);
///         next.run(ctx).await
///     }
///     .boxed()
/// });
/// assert_eq!(timing.param(), None);
/// ```
#[derive(Clone)]
pub struct Middleware {
    handler: Arc<HandlerFn>,
    /// Parameter validated by this handler, if it was registered with `Layer::param`.
    param: Option<String>,
}

impl Middleware {
    /// Wraps a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Arc::new(handler),
            param: None,
        }
    }

    /// Wraps a parameter validator. The validator is called with the current
    /// value of `param` from the context's parsed parameters.
    pub(crate) fn for_param<F>(param: &str, validator: F) -> Self
    where
        F: for<'a> Fn(Option<String>, &'a mut Context, Next<'a>) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        let name = param.to_string();
        Self {
            param: Some(param.to_string()),
            ..Self::new(move |ctx, next| {
                let value = ctx.params.get(&name).map(str::to_string);
                validator(value, ctx, next)
            })
        }
    }

    /// Returns the parameter this handler validates, if any.
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// Invokes the handler.
    pub fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        (self.handler)(ctx, next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

/// The remainder of a stack, handed to each middleware.
#[derive(Debug, Clone, Copy)]
pub struct Next<'a> {
    rest: &'a [Middleware],
}

impl<'a> Next<'a> {
    /// Creates a continuation over the given handlers.
    pub fn new(stack: &'a [Middleware]) -> Self {
        Self { rest: stack }
    }

    /// Runs the next handler, which in turn decides whether to continue.
    pub fn run<'c>(self, ctx: &'c mut Context) -> BoxFuture<'c, Result<()>>
    where
        'a: 'c,
    {
        match self.rest.split_first() {
            Some((head, rest)) => head.call(ctx, Next { rest }),
            None => future::ready(Ok(())).boxed(),
        }
    }

    /// Number of handlers left to run.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}
