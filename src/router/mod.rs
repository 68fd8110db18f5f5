//! Router facade over the routing link pipeline.
//!
//! Registration threads a route through the links; dispatch walks them with
//! the exchange. The live pipeline sits behind a read-copy-update swap:
//! mutations clone the tree, modify the clone and publish it, so a dispatch
//! in flight keeps the snapshot it started with.

mod extractor;
mod link;
mod manager;
mod route;

#[cfg(test)]
mod tests;

pub use manager::RouteManager;
pub use route::{ExchangeHandler, HandlerRef, Route, RoutePath};

use crate::error::HttpError;
use crate::exchange::Exchange;
use extractor::RouteExtractor;
use link::Link;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

/// The router: a pipeline of routing links dispatching each exchange to the
/// handler of the best matching route.
pub struct Router {
    root: RwLock<Arc<Link>>,
}

impl Router {
    /// An empty router; every dispatch reports route not found until routes
    /// are registered.
    pub fn new() -> Self {
        Router {
            root: RwLock::new(Arc::new(Link::head())),
        }
    }

    /// A router with a root handler covering every request no more specific
    /// route matches.
    pub fn with_root_handler(handler: impl ExchangeHandler + 'static) -> Self {
        let router = Router::new();
        let mut route = Route::new();
        route.handler = Some(Arc::new(handler));
        router.set_route(route);
        router
    }

    /// Start describing a route to register, find, enable, disable or
    /// remove.
    pub fn route(&self) -> RouteManager<'_> {
        RouteManager::new(self)
    }

    /// Every registered route, including disabled ones.
    pub fn routes(&self) -> Vec<Route> {
        let snapshot = self.snapshot();
        let mut extractor = RouteExtractor::new();
        snapshot.extract(&mut extractor);
        extractor.into_routes()
    }

    /// Dispatch an exchange through the pipeline.
    pub fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        let snapshot = self.snapshot();
        debug!(
            correlation_id = %exchange.request.correlation_id,
            method = %exchange.request.method,
            path = %exchange.request.path,
            "route match attempt"
        );
        let started = Instant::now();
        let result = snapshot.handle(exchange);
        let duration_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(()) => info!(
                correlation_id = %exchange.request.correlation_id,
                method = %exchange.request.method,
                path = %exchange.request.path,
                duration_us,
                "route matched"
            ),
            Err(error) => warn!(
                correlation_id = %exchange.request.correlation_id,
                method = %exchange.request.method,
                path = %exchange.request.path,
                status = error.status(),
                duration_us,
                %error,
                "no route matched"
            ),
        }
        result
    }

    fn snapshot(&self) -> Arc<Link> {
        self.root.read().unwrap().clone()
    }

    fn mutate(&self, operation: impl FnOnce(&mut Link)) {
        let mut guard = self.root.write().unwrap();
        let mut tree = (**guard).clone();
        operation(&mut tree);
        *guard = Arc::new(tree);
    }

    pub(crate) fn set_route(&self, route: Route) {
        info!(route = %route.describe(), "route registered");
        self.mutate(|tree| tree.set_route(&route));
    }

    pub(crate) fn enable_route(&self, route: &Route) {
        info!(route = %route.describe(), "route enabled");
        self.mutate(|tree| tree.enable_route(route));
    }

    pub(crate) fn disable_route(&self, route: &Route) {
        info!(route = %route.describe(), "route disabled");
        self.mutate(|tree| tree.disable_route(route));
    }

    pub(crate) fn remove_route(&self, route: &Route) {
        info!(route = %route.describe(), "route removed");
        self.mutate(|tree| tree.remove_route(route));
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}
