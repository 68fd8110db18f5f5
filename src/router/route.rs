use crate::error::HttpError;
use crate::exchange::Exchange;
use crate::headers::{ContentType, LanguageRange, MediaRange};
use crate::uri::PathPattern;
use http::Method;
use std::fmt;
use std::sync::Arc;

/// A request handler invoked by the terminal routing link.
///
/// Handlers run on the transport's coroutine; they may hand the response a
/// stream and return immediately, deferring completion to the stream.
pub trait ExchangeHandler: Send + Sync {
    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError>;
}

impl<F> ExchangeHandler for F
where
    F: Fn(&mut Exchange) -> Result<(), HttpError> + Send + Sync,
{
    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        self(exchange)
    }
}

/// Shared handler reference; routes are read-only once registered so the
/// pipeline and extracted routes share one allocation.
pub type HandlerRef = Arc<dyn ExchangeHandler>;

/// Path criterion of a route: a literal path or a compiled template, never
/// both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePath {
    Literal {
        /// Normalized literal path.
        path: String,
        /// Whether `path` and `path/` both match.
        trailing_slash: bool,
    },
    Pattern(PathPattern),
}

/// A declarative route: one optional criterion per routing dimension plus
/// the handler.
#[derive(Clone)]
pub struct Route {
    pub path: Option<RoutePath>,
    pub method: Option<Method>,
    pub consume: Option<MediaRange>,
    pub produce: Option<ContentType>,
    pub language: Option<LanguageRange>,
    pub disabled: bool,
    pub(crate) handler: Option<HandlerRef>,
}

impl Route {
    pub(crate) fn new() -> Self {
        Route {
            path: None,
            method: None,
            consume: None,
            produce: None,
            language: None,
            disabled: false,
            handler: None,
        }
    }

    pub fn handler(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }

    /// Whether both routes carry the same criterion tuple, regardless of
    /// handler or disabled state.
    pub fn same_criteria(&self, other: &Route) -> bool {
        self.path == other.path
            && self.method == other.method
            && self.consume == other.consume
            && self.produce == other.produce
            && self.language == other.language
    }

    /// Human-readable summary used in logs.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str(self.method.as_ref().map(Method::as_str).unwrap_or("*"));
        out.push(' ');
        match &self.path {
            Some(RoutePath::Literal { path, .. }) => out.push_str(path),
            Some(RoutePath::Pattern(pattern)) => out.push_str(pattern.template()),
            None => out.push('*'),
        }
        if let Some(consume) = &self.consume {
            out.push_str(&format!(" consumes={consume}"));
        }
        if let Some(produce) = &self.produce {
            out.push_str(&format!(" produces={produce}"));
        }
        if let Some(language) = &self.language {
            out.push_str(&format!(" language={language}"));
        }
        out
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("consume", &self.consume)
            .field("produce", &self.produce)
            .field("language", &self.language)
            .field("disabled", &self.disabled)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
