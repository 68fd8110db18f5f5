//! Route extraction: the dual of registration.
//!
//! Walks the pipeline depth first, staging the criterion of every traversed
//! link and emitting a concrete [`Route`] at each terminal handler link.

use super::route::{HandlerRef, Route, RoutePath};
use crate::headers::{ContentType, LanguageRange, MediaRange};
use http::Method;

#[derive(Default)]
pub(crate) struct RouteExtractor {
    path: Option<RoutePath>,
    method: Option<Method>,
    consume: Option<MediaRange>,
    produce: Option<ContentType>,
    language: Option<LanguageRange>,
    routes: Vec<Route>,
}

impl RouteExtractor {
    pub(crate) fn new() -> Self {
        RouteExtractor::default()
    }

    pub(crate) fn set_path(&mut self, path: RoutePath) {
        self.path = Some(path);
    }

    pub(crate) fn clear_path(&mut self) {
        self.path = None;
    }

    pub(crate) fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    pub(crate) fn clear_method(&mut self) {
        self.method = None;
    }

    pub(crate) fn set_consume(&mut self, consume: MediaRange) {
        self.consume = Some(consume);
    }

    pub(crate) fn clear_consume(&mut self) {
        self.consume = None;
    }

    pub(crate) fn set_produce(&mut self, produce: ContentType) {
        self.produce = Some(produce);
    }

    pub(crate) fn clear_produce(&mut self) {
        self.produce = None;
    }

    pub(crate) fn set_language(&mut self, language: LanguageRange) {
        self.language = Some(language);
    }

    pub(crate) fn clear_language(&mut self) {
        self.language = None;
    }

    /// Record a concrete route for the currently staged criteria.
    pub(crate) fn emit(&mut self, handler: HandlerRef, disabled: bool) {
        let mut route = Route::new();
        route.path = self.path.clone();
        route.method = self.method.clone();
        route.consume = self.consume.clone();
        route.produce = self.produce.clone();
        route.language = self.language.clone();
        route.disabled = disabled;
        route.handler = Some(handler);
        self.routes.push(route);
    }

    pub(crate) fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}
