use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("No request context is bound; call get_request_context only inside bind_request_context")]
    MissingRequestContext,

    #[error("Request context is not of the expected type {expected}")]
    UnexpectedContextType { expected: &'static str },
}
