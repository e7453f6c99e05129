//! Error types for the gateway bridge.
//!
//! # Design
//! Each stage of an invocation has its own error enum so callers can tell a
//! bad inbound event (`TranslationError`) apart from a handler that left the
//! response unusable (`RenderError`). `AdapterError` wraps both, plus the JSON
//! layer, and is what the runtime boundary sees. None of these are retried:
//! every variant ends the current invocation.
//!
//! A handler that answers 404 or 500 is not an error here. Those are ordinary
//! responses and render successfully.

use thiserror::Error;

/// Failures while turning an inbound event into a canonical request.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// `isBase64Encoded` was set but the body is not valid standard base64.
    #[error("failed to decode base64 body: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The method, URI or a header could not form a valid HTTP request.
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] http::Error),
}

/// Failures while rendering captured response state.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The handler never touched the response headers.
    #[error("no headers generated for response")]
    NoHeaders,

    /// The handler set a status outside `100..=999`.
    #[error("invalid status code {0}")]
    InvalidStatus(u16),
}

/// Everything that can end an adapter invocation.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The gateway payload was not a valid event, or the response failed to
    /// serialize.
    #[error("event json: {0}")]
    Json(#[from] serde_json::Error),
}
