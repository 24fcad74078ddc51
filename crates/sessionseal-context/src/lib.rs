//! Request-scoped ambient context.
//!
//! Middleware binds a context object once per inbound request; anything that
//! runs inside that request (including across `.await` points) can read it
//! back without threading it through every signature.
//!
//! Storage is a single `tokio::task_local!` carrier. Concurrent requests on
//! the same thread never observe each other's context because the value is
//! attached to the future being polled, not to the thread. Spawned tasks do
//! not inherit task-locals; use [`spawn_with_request_context`] so the child
//! captures the parent's context at spawn time.

pub mod error;
mod scope;

pub use error::ContextError;
pub use scope::{
    bind_request_context, get_request_context, has_request_context, spawn_with_request_context,
    try_get_request_context, with_request_context, BoundRequest,
};
