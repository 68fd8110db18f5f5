//! Closed error taxonomy for the routing pipeline.
//!
//! Every failure the router can produce maps to exactly one HTTP status.
//! `RouteNotFound` and `DisabledRoute` are resumable: a produces or language
//! link catches them to keep iterating over content negotiation candidates.
//! Everything else is terminal and surfaces immediately.

use http::Method;
use thiserror::Error;

/// Error raised while routing or handling an exchange.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// No route matched the request.
    #[error("route not found")]
    RouteNotFound,

    /// A route matched but is currently disabled.
    #[error("route is disabled")]
    DisabledRoute,

    /// Raised by handlers for missing targets (e.g. an absent resource).
    #[error("not found: {0}")]
    NotFound(String),

    /// The path matched but not with the request method.
    #[error("method not allowed")]
    MethodNotAllowed(Vec<Method>),

    /// The request body content type matches no consuming route.
    #[error("unsupported media type")]
    UnsupportedMediaType,

    /// No produced content type satisfies the Accept header.
    #[error("not acceptable")]
    NotAcceptable(Vec<String>),

    /// Malformed request input (URI, header syntax).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Handler or response assembly failure.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl HttpError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            HttpError::RouteNotFound | HttpError::DisabledRoute | HttpError::NotFound(_) => 404,
            HttpError::MethodNotAllowed(_) => 405,
            HttpError::NotAcceptable(_) => 406,
            HttpError::UnsupportedMediaType => 415,
            HttpError::BadRequest(_) => 400,
            HttpError::Internal(_) => 500,
        }
    }

    /// Canonical reason phrase for the mapped status.
    pub fn reason(&self) -> &'static str {
        match self.status() {
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            415 => "Unsupported Media Type",
            _ => "Internal Server Error",
        }
    }

    /// Whether an ancestor negotiation link may catch this error and keep
    /// iterating over its remaining candidates.
    pub fn is_resumable(&self) -> bool {
        matches!(self, HttpError::RouteNotFound | HttpError::DisabledRoute)
    }

    /// Headers the transport must add to the failure response, such as
    /// `Allow` for 405.
    pub fn extra_headers(&self) -> Vec<(&'static str, String)> {
        match self {
            HttpError::MethodNotAllowed(methods) => {
                let allow = methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                vec![("allow", allow)]
            }
            _ => Vec::new(),
        }
    }
}
