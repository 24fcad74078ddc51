use std::any::{type_name, Any};
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::ContextError;

type Carried = Arc<dyn Any + Send + Sync>;

tokio::task_local! {
    /// The one process-wide carrier. A `static`, so every caller in the
    /// process shares it and it is initialized once per bound extent.
    static REQUEST_CONTEXT: Carried;
}

/// A function bound to a request context, ready to be invoked once.
///
/// Created by [`bind_request_context`]. Invoking it runs the function with the
/// context installed for its whole dynamic extent; when the function returns
/// (or its future completes) the previous binding, if any, is visible again.
#[must_use = "a bound request does nothing until it is called"]
pub struct BoundRequest<F> {
    context: Carried,
    f: F,
}

/// Bind `context` to `f`. Nothing runs until the returned value is called.
pub fn bind_request_context<C, F>(context: C, f: F) -> BoundRequest<F>
where
    C: Any + Send + Sync,
{
    BoundRequest {
        context: Arc::new(context),
        f,
    }
}

impl<F> BoundRequest<F> {
    /// Run an async function with the context installed for every poll of its
    /// future, including after each `.await`.
    pub async fn call<Fut>(self) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let BoundRequest { context, f } = self;
        // Build the future inside the scope so synchronous work done by `f`
        // before its first await also sees the context.
        REQUEST_CONTEXT.scope(context, async move { f().await }).await
    }

    /// Run a synchronous function with the context installed.
    pub fn call_sync<R>(self) -> R
    where
        F: FnOnce() -> R,
    {
        REQUEST_CONTEXT.sync_scope(self.context, self.f)
    }
}

/// The context installed by the innermost active binding.
///
/// Calling this outside any binding is a programming error and returns
/// `MissingRequestContext`; do not swallow it.
pub fn get_request_context<C>() -> Result<Arc<C>, ContextError>
where
    C: Any + Send + Sync,
{
    let carried = REQUEST_CONTEXT
        .try_with(Arc::clone)
        .map_err(|_| ContextError::MissingRequestContext)?;
    carried
        .downcast::<C>()
        .map_err(|_| ContextError::UnexpectedContextType {
            expected: type_name::<C>(),
        })
}

/// Like [`get_request_context`], for code that legitimately runs both inside
/// and outside requests.
pub fn try_get_request_context<C>() -> Option<Arc<C>>
where
    C: Any + Send + Sync,
{
    get_request_context().ok()
}

pub fn has_request_context() -> bool {
    REQUEST_CONTEXT.try_with(|_| ()).is_ok()
}

/// Capture the current context now and install it around `fut`.
///
/// For futures handed to something that polls them outside the current task
/// (another executor, a join set). Without an active binding `fut` is
/// returned unchanged in behavior.
pub fn with_request_context<F>(fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let captured = REQUEST_CONTEXT.try_with(Arc::clone).ok();
    async move {
        match captured {
            Some(context) => REQUEST_CONTEXT.scope(context, fut).await,
            None => fut.await,
        }
    }
}

/// `tokio::spawn` that carries the caller's request context into the new task.
///
/// The context is captured at spawn time, not when the child first reads it.
pub fn spawn_with_request_context<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    if !has_request_context() {
        tracing::trace!("spawning without a request context");
    }
    tokio::spawn(with_request_context(fut))
}
