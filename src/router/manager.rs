//! Fluent route registration and administration.

use super::route::{ExchangeHandler, HandlerRef, Route, RoutePath};
use super::Router;
use crate::error::HttpError;
use crate::headers::{ContentType, LanguageRange, MediaRange};
use crate::uri::{normalize_path, PathPattern};
use http::Method;
use std::sync::Arc;

/// Builder for registering, finding, enabling, disabling and removing
/// routes.
///
/// Each dimension accepts several values; terminal operations apply to the
/// cartesian product of everything specified. Registering a route whose
/// criterion tuple already exists replaces the handler in place.
///
/// ```no_run
/// use http::Method;
/// use switchyard::router::Router;
///
/// let router = Router::new();
/// router
///     .route()
///     .path("/items/{id}")
///     .method(Method::GET)
///     .produces("application/json")
///     .handler(|exchange: &mut switchyard::Exchange| {
///         let id = exchange.request.path_param("id").unwrap_or("").to_string();
///         exchange.response.body().raw(format!("{{\"id\":\"{id}\"}}"))
///     })
///     .unwrap();
/// ```
pub struct RouteManager<'a> {
    router: &'a Router,
    paths: Vec<(String, bool)>,
    methods: Vec<Method>,
    consumes: Vec<String>,
    produces: Vec<String>,
    languages: Vec<String>,
}

impl<'a> RouteManager<'a> {
    pub(crate) fn new(router: &'a Router) -> Self {
        RouteManager {
            router,
            paths: Vec::new(),
            methods: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            languages: Vec::new(),
        }
    }

    /// Match the given path, strictly. A path containing `{` captures
    /// compiles to a pattern, anything else is a literal compared byte-exact
    /// after normalization.
    pub fn path(mut self, path: &str) -> Self {
        self.paths.push((path.to_string(), false));
        self
    }

    /// Like [`path`](Self::path), additionally matching the form with or
    /// without a trailing slash.
    pub fn path_matching_trailing_slash(mut self, path: &str) -> Self {
        self.paths.push((path.to_string(), true));
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Match requests whose `Content-Type` falls within the media range.
    pub fn consumes(mut self, media_range: &str) -> Self {
        self.consumes.push(media_range.to_string());
        self
    }

    /// Produce the given content type, negotiated against `Accept`.
    pub fn produces(mut self, content_type: &str) -> Self {
        self.produces.push(content_type.to_string());
        self
    }

    /// Produce the given language, negotiated against `Accept-Language`.
    pub fn language(mut self, tag: &str) -> Self {
        self.languages.push(tag.to_string());
        self
    }

    /// Register the handler for every combination of the specified criteria;
    /// with no criteria this sets the root (default) handler.
    pub fn handler(self, handler: impl ExchangeHandler + 'static) -> Result<(), HttpError> {
        let handler: HandlerRef = Arc::new(handler);
        for route in self.build_routes(Some(handler))? {
            self.router.set_route(route);
        }
        Ok(())
    }

    /// Enable every registered route matching the specified criteria.
    pub fn enable(self) -> Result<(), HttpError> {
        for route in self.find_routes()? {
            self.router.enable_route(&route);
        }
        Ok(())
    }

    /// Disable every registered route matching the specified criteria;
    /// disabled routes stay registered but dispatch reports them disabled.
    pub fn disable(self) -> Result<(), HttpError> {
        for route in self.find_routes()? {
            self.router.disable_route(&route);
        }
        Ok(())
    }

    /// Remove every registered route matching the specified criteria.
    pub fn remove(self) -> Result<(), HttpError> {
        for route in self.find_routes()? {
            self.router.remove_route(&route);
        }
        Ok(())
    }

    /// Registered routes matching every specified criterion; unspecified
    /// dimensions match anything.
    pub fn find_routes(&self) -> Result<Vec<Route>, HttpError> {
        let paths = self.parsed_paths()?;
        let consumes = parse_all(&self.consumes, |v| MediaRange::parse(v))?;
        let produces = parse_all(&self.produces, |v| ContentType::parse(v))?;
        let languages = parse_all(&self.languages, |v| LanguageRange::parse(v))?;

        Ok(self
            .router
            .routes()
            .into_iter()
            .filter(|route| {
                (paths.is_empty() || contains_path(&paths, route))
                    && (self.methods.is_empty()
                        || route
                            .method
                            .as_ref()
                            .map(|m| self.methods.contains(m))
                            .unwrap_or(false))
                    && (consumes.is_empty()
                        || route
                            .consume
                            .as_ref()
                            .map(|c| consumes.contains(c))
                            .unwrap_or(false))
                    && (produces.is_empty()
                        || route
                            .produce
                            .as_ref()
                            .map(|p| produces.contains(p))
                            .unwrap_or(false))
                    && (languages.is_empty()
                        || route
                            .language
                            .as_ref()
                            .map(|l| languages.contains(l))
                            .unwrap_or(false))
            })
            .collect())
    }

    fn parsed_paths(&self) -> Result<Vec<RoutePath>, HttpError> {
        self.paths
            .iter()
            .map(|(path, trailing_slash)| parse_route_path(path, *trailing_slash))
            .collect()
    }

    fn build_routes(&self, handler: Option<HandlerRef>) -> Result<Vec<Route>, HttpError> {
        let paths = optional(self.parsed_paths()?);
        let methods = optional(self.methods.clone());
        let consumes = optional(parse_all(&self.consumes, |v| MediaRange::parse(v))?);
        let produces = optional(parse_all(&self.produces, |v| ContentType::parse(v))?);
        let languages = optional(parse_all(&self.languages, |v| LanguageRange::parse(v))?);

        let mut routes = Vec::new();
        for path in &paths {
            for method in &methods {
                for consume in &consumes {
                    for produce in &produces {
                        for language in &languages {
                            let mut route = Route::new();
                            route.path = path.clone();
                            route.method = method.clone();
                            route.consume = consume.clone();
                            route.produce = produce.clone();
                            route.language = language.clone();
                            route.handler = handler.clone();
                            routes.push(route);
                        }
                    }
                }
            }
        }
        Ok(routes)
    }
}

/// A literal xor pattern path criterion from its raw form.
fn parse_route_path(path: &str, trailing_slash: bool) -> Result<RoutePath, HttpError> {
    if path.contains('{') {
        Ok(RoutePath::Pattern(PathPattern::compile_with_options(
            path,
            trailing_slash,
        )?))
    } else {
        Ok(RoutePath::Literal {
            path: normalize_path(path)?,
            trailing_slash,
        })
    }
}

fn contains_path(paths: &[RoutePath], route: &Route) -> bool {
    route
        .path
        .as_ref()
        .map(|route_path| {
            paths.iter().any(|candidate| match (candidate, route_path) {
                (
                    RoutePath::Literal { path: a, .. },
                    RoutePath::Literal { path: b, .. },
                ) => a == b,
                (RoutePath::Pattern(a), RoutePath::Pattern(b)) => {
                    a.template() == b.template()
                }
                _ => false,
            })
        })
        .unwrap_or(false)
}

fn parse_all<T>(
    values: &[String],
    parse: impl Fn(&str) -> Result<T, HttpError>,
) -> Result<Vec<T>, HttpError> {
    values.iter().map(|value| parse(value)).collect()
}

/// An empty criterion list means "unspecified": one `None` slot so the
/// cartesian product still emits a route.
fn optional<T>(values: Vec<T>) -> Vec<Option<T>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.into_iter().map(Some).collect()
    }
}
