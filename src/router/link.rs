//! The routing pipeline.
//!
//! A fixed chain of links, leaf-first, each owning one matching dimension:
//!
//! ```text
//! Path → PathPattern → Method → Consumes → Produces → Language → Handler
//! ```
//!
//! Every link stores criterion→child entries, where each child is the head
//! of a sub-pipeline starting at the following dimension, plus a default
//! `next` link for routes that leave this dimension unspecified. Dispatch
//! either selects a child or delegates to `next`; the terminal handler link
//! invokes the registered handler.
//!
//! Links are plain owned data and `Clone`; the router clones the tree on
//! mutation and swaps it in atomically, so a dispatch in flight keeps a
//! consistent snapshot.

use super::extractor::RouteExtractor;
use super::route::{HandlerRef, Route, RoutePath};
use crate::error::HttpError;
use crate::exchange::Exchange;
use crate::headers::{Accept, AcceptLanguage, ContentType, LanguageRange, MediaRange};
use crate::uri::PathPattern;
use http::Method;
use std::collections::{BTreeSet, HashMap};

/// Position of a link in the pipeline; determines what kind of sub-pipeline
/// a link creates for its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Path,
    Pattern,
    Method,
    Consumes,
    Produces,
    Language,
    Handler,
}

/// One link of the pipeline.
#[derive(Clone)]
pub(crate) enum Link {
    Path(PathLink),
    Pattern(PatternLink),
    Method(MethodLink),
    Consumes(ConsumesLink),
    Produces(ProducesLink),
    Language(LanguageLink),
    Handler(HandlerLink),
}

impl Link {
    /// Head of a fresh, empty pipeline.
    pub(crate) fn head() -> Link {
        Link::new_at(Level::Path)
    }

    fn new_at(level: Level) -> Link {
        match level {
            Level::Path => Link::Path(PathLink::new()),
            Level::Pattern => Link::Pattern(PatternLink::new()),
            Level::Method => Link::Method(MethodLink::new()),
            Level::Consumes => Link::Consumes(ConsumesLink::new()),
            Level::Produces => Link::Produces(ProducesLink::new()),
            Level::Language => Link::Language(LanguageLink::new()),
            Level::Handler => Link::Handler(HandlerLink::new()),
        }
    }

    pub(crate) fn set_route(&mut self, route: &Route) {
        match self {
            Link::Path(link) => link.set_route(route),
            Link::Pattern(link) => link.set_route(route),
            Link::Method(link) => link.set_route(route),
            Link::Consumes(link) => link.set_route(route),
            Link::Produces(link) => link.set_route(route),
            Link::Language(link) => link.set_route(route),
            Link::Handler(link) => link.set_route(route),
        }
    }

    pub(crate) fn enable_route(&mut self, route: &Route) {
        match self {
            Link::Path(link) => link.apply(route, &mut |l| l.enable_route(route)),
            Link::Pattern(link) => link.apply(route, &mut |l| l.enable_route(route)),
            Link::Method(link) => link.apply(route, &mut |l| l.enable_route(route)),
            Link::Consumes(link) => link.apply(route, &mut |l| l.enable_route(route)),
            Link::Produces(link) => link.apply(route, &mut |l| l.enable_route(route)),
            Link::Language(link) => link.apply(route, &mut |l| l.enable_route(route)),
            Link::Handler(link) => link.enable(),
        }
    }

    pub(crate) fn disable_route(&mut self, route: &Route) {
        match self {
            Link::Path(link) => link.apply(route, &mut |l| l.disable_route(route)),
            Link::Pattern(link) => link.apply(route, &mut |l| l.disable_route(route)),
            Link::Method(link) => link.apply(route, &mut |l| l.disable_route(route)),
            Link::Consumes(link) => link.apply(route, &mut |l| l.disable_route(route)),
            Link::Produces(link) => link.apply(route, &mut |l| l.disable_route(route)),
            Link::Language(link) => link.apply(route, &mut |l| l.disable_route(route)),
            Link::Handler(link) => link.disable(),
        }
    }

    pub(crate) fn remove_route(&mut self, route: &Route) {
        match self {
            Link::Path(link) => link.remove_route(route),
            Link::Pattern(link) => link.remove_route(route),
            Link::Method(link) => link.remove_route(route),
            Link::Consumes(link) => link.remove_route(route),
            Link::Produces(link) => link.remove_route(route),
            Link::Language(link) => link.remove_route(route),
            Link::Handler(link) => link.remove(),
        }
    }

    pub(crate) fn has_route(&self) -> bool {
        match self {
            Link::Path(link) => !link.children.is_empty() || link.next.has_route(),
            Link::Pattern(link) => !link.children.is_empty() || link.next.has_route(),
            Link::Method(link) => !link.children.is_empty() || link.next.has_route(),
            Link::Consumes(link) => !link.children.is_empty() || link.next.has_route(),
            Link::Produces(link) => !link.children.is_empty() || link.next.has_route(),
            Link::Language(link) => !link.children.is_empty() || link.next.has_route(),
            Link::Handler(link) => link.handler.is_some(),
        }
    }

    pub(crate) fn is_disabled(&self) -> bool {
        match self {
            Link::Path(link) => {
                link.children.values().all(|c| c.link.is_disabled()) && link.next.is_disabled()
            }
            Link::Pattern(link) => {
                link.children.iter().all(|(_, l)| l.is_disabled()) && link.next.is_disabled()
            }
            Link::Method(link) => {
                link.children.values().all(Link::is_disabled) && link.next.is_disabled()
            }
            Link::Consumes(link) => {
                link.children.iter().all(|(_, l)| l.is_disabled()) && link.next.is_disabled()
            }
            Link::Produces(link) => {
                link.children.iter().all(|(_, l)| l.is_disabled()) && link.next.is_disabled()
            }
            Link::Language(link) => {
                link.children.iter().all(|(_, l)| l.is_disabled()) && link.next.is_disabled()
            }
            Link::Handler(link) => link.disabled,
        }
    }

    pub(crate) fn extract(&self, extractor: &mut RouteExtractor) {
        match self {
            Link::Path(link) => link.extract(extractor),
            Link::Pattern(link) => link.extract(extractor),
            Link::Method(link) => link.extract(extractor),
            Link::Consumes(link) => link.extract(extractor),
            Link::Produces(link) => link.extract(extractor),
            Link::Language(link) => link.extract(extractor),
            Link::Handler(link) => link.extract(extractor),
        }
    }

    pub(crate) fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        match self {
            Link::Path(link) => link.handle(exchange),
            Link::Pattern(link) => link.handle(exchange),
            Link::Method(link) => link.handle(exchange),
            Link::Consumes(link) => link.handle(exchange),
            Link::Produces(link) => link.handle(exchange),
            Link::Language(link) => link.handle(exchange),
            Link::Handler(link) => link.handle(exchange),
        }
    }
}

/// Literal path dimension. Lookup is a byte-exact map probe on the
/// normalized path.
#[derive(Clone)]
pub(crate) struct PathLink {
    children: HashMap<String, PathChild>,
    next: Box<Link>,
}

#[derive(Clone)]
struct PathChild {
    link: Link,
    /// Secondary trailing-slash form of another entry; skipped on
    /// extraction so a tolerant route is reported once.
    alias: bool,
    trailing_slash: bool,
}

/// The other trailing-slash form of a literal path, `None` for the root.
fn alternate_form(path: &str) -> Option<String> {
    if path == "/" {
        None
    } else if let Some(stripped) = path.strip_suffix('/') {
        Some(stripped.to_string())
    } else {
        Some(format!("{path}/"))
    }
}

impl PathLink {
    fn new() -> Self {
        PathLink {
            children: HashMap::new(),
            next: Box::new(Link::new_at(Level::Pattern)),
        }
    }

    fn set_route(&mut self, route: &Route) {
        match &route.path {
            Some(RoutePath::Literal {
                path,
                trailing_slash,
            }) => {
                self.child_entry(path, false, *trailing_slash).set_route(route);
                if *trailing_slash {
                    if let Some(alternate) = alternate_form(path) {
                        self.child_entry(&alternate, true, true).set_route(route);
                    }
                }
            }
            _ => self.next.set_route(route),
        }
    }

    fn child_entry(&mut self, path: &str, alias: bool, trailing_slash: bool) -> &mut Link {
        let child = self
            .children
            .entry(path.to_string())
            .or_insert_with(|| PathChild {
                link: Link::new_at(Level::Pattern),
                alias,
                trailing_slash,
            });
        if !alias {
            child.alias = false;
        }
        if trailing_slash {
            child.trailing_slash = true;
        }
        &mut child.link
    }

    fn apply(&mut self, route: &Route, operation: &mut dyn FnMut(&mut Link)) {
        match &route.path {
            Some(RoutePath::Literal {
                path,
                trailing_slash,
            }) => {
                if let Some(child) = self.children.get_mut(path) {
                    operation(&mut child.link);
                }
                if *trailing_slash {
                    if let Some(alternate) = alternate_form(path) {
                        if let Some(child) = self.children.get_mut(&alternate) {
                            operation(&mut child.link);
                        }
                    }
                }
            }
            _ => operation(&mut self.next),
        }
    }

    fn remove_route(&mut self, route: &Route) {
        match &route.path {
            Some(RoutePath::Literal {
                path,
                trailing_slash,
            }) => {
                let mut keys = vec![path.clone()];
                if *trailing_slash {
                    keys.extend(alternate_form(path));
                }
                for key in keys {
                    let mut emptied = false;
                    if let Some(child) = self.children.get_mut(&key) {
                        child.link.remove_route(route);
                        emptied = !child.link.has_route();
                    }
                    if emptied {
                        self.children.remove(&key);
                    }
                }
            }
            _ => self.next.remove_route(route),
        }
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        for (path, child) in &self.children {
            if child.alias {
                continue;
            }
            extractor.set_path(RoutePath::Literal {
                path: path.clone(),
                trailing_slash: child.trailing_slash,
            });
            child.link.extract(extractor);
            extractor.clear_path();
        }
        self.next.extract(extractor);
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        match self.children.get(&exchange.request.path) {
            Some(child) => child.link.handle(exchange),
            None => self.next.handle(exchange),
        }
    }
}

/// Path template dimension. Every pattern is evaluated against the
/// normalized path; children are kept sorted most specific first so the
/// first hit is the strict winner, registration order breaking exact ties.
#[derive(Clone)]
pub(crate) struct PatternLink {
    children: Vec<(PathPattern, Link)>,
    next: Box<Link>,
}

impl PatternLink {
    fn new() -> Self {
        PatternLink {
            children: Vec::new(),
            next: Box::new(Link::new_at(Level::Method)),
        }
    }

    fn set_route(&mut self, route: &Route) {
        match &route.path {
            Some(RoutePath::Pattern(pattern)) => {
                match self.children.iter().position(|(p, _)| p == pattern) {
                    Some(index) => self.children[index].1.set_route(route),
                    None => {
                        let mut child = Link::new_at(Level::Method);
                        child.set_route(route);
                        self.children.push((pattern.clone(), child));
                        self.children
                            .sort_by(|(a, _), (b, _)| a.compare_specificity(b));
                    }
                }
            }
            _ => self.next.set_route(route),
        }
    }

    fn apply(&mut self, route: &Route, operation: &mut dyn FnMut(&mut Link)) {
        match &route.path {
            Some(RoutePath::Pattern(pattern)) => {
                if let Some((_, child)) = self.children.iter_mut().find(|(p, _)| p == pattern) {
                    operation(child);
                }
            }
            _ => operation(&mut self.next),
        }
    }

    fn remove_route(&mut self, route: &Route) {
        match &route.path {
            Some(RoutePath::Pattern(pattern)) => {
                if let Some(index) = self.children.iter().position(|(p, _)| p == pattern) {
                    self.children[index].1.remove_route(route);
                    if !self.children[index].1.has_route() {
                        self.children.remove(index);
                    }
                }
            }
            _ => self.next.remove_route(route),
        }
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        for (pattern, child) in &self.children {
            extractor.set_path(RoutePath::Pattern(pattern.clone()));
            child.extract(extractor);
            extractor.clear_path();
        }
        self.next.extract(extractor);
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        for (pattern, child) in &self.children {
            if let Some(bindings) = pattern.match_path(&exchange.request.path) {
                exchange.request.path_params = bindings.into_iter().collect();
                return child.handle(exchange);
            }
        }
        self.next.handle(exchange)
    }
}

/// Method dimension. A miss with typed children present is a 405 carrying
/// the allowed set, unless a method-less route on the default chain covers
/// the request.
#[derive(Clone)]
pub(crate) struct MethodLink {
    children: HashMap<Method, Link>,
    next: Box<Link>,
}

impl MethodLink {
    fn new() -> Self {
        MethodLink {
            children: HashMap::new(),
            next: Box::new(Link::new_at(Level::Consumes)),
        }
    }

    fn set_route(&mut self, route: &Route) {
        match &route.method {
            Some(method) => self
                .children
                .entry(method.clone())
                .or_insert_with(|| Link::new_at(Level::Consumes))
                .set_route(route),
            None => self.next.set_route(route),
        }
    }

    fn apply(&mut self, route: &Route, operation: &mut dyn FnMut(&mut Link)) {
        match &route.method {
            Some(method) => {
                if let Some(child) = self.children.get_mut(method) {
                    operation(child);
                }
            }
            None => operation(&mut self.next),
        }
    }

    fn remove_route(&mut self, route: &Route) {
        match &route.method {
            Some(method) => {
                let mut emptied = false;
                if let Some(child) = self.children.get_mut(method) {
                    child.remove_route(route);
                    emptied = !child.has_route();
                }
                if emptied {
                    self.children.remove(method);
                }
            }
            None => self.next.remove_route(route),
        }
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        for (method, child) in &self.children {
            extractor.set_method(method.clone());
            child.extract(extractor);
            extractor.clear_method();
        }
        self.next.extract(extractor);
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        if let Some(child) = self.children.get(&exchange.request.method) {
            return child.handle(exchange);
        }
        if self.children.is_empty() {
            return self.next.handle(exchange);
        }
        match self.next.handle(exchange) {
            Err(error) if error.is_resumable() => {
                let mut allowed: Vec<Method> = self.children.keys().cloned().collect();
                allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                Err(HttpError::MethodNotAllowed(allowed))
            }
            result => result,
        }
    }
}

/// Consumed content type dimension, matching the request `Content-Type`
/// against media ranges sorted most specific first.
#[derive(Clone)]
pub(crate) struct ConsumesLink {
    children: Vec<(MediaRange, Link)>,
    next: Box<Link>,
}

impl ConsumesLink {
    fn new() -> Self {
        ConsumesLink {
            children: Vec::new(),
            next: Box::new(Link::new_at(Level::Produces)),
        }
    }

    fn set_route(&mut self, route: &Route) {
        match &route.consume {
            Some(range) => match self.children.iter().position(|(r, _)| r == range) {
                Some(index) => self.children[index].1.set_route(route),
                None => {
                    let mut child = Link::new_at(Level::Produces);
                    child.set_route(route);
                    self.children.push((range.clone(), child));
                    self.children
                        .sort_by(|(a, _), (b, _)| b.score().cmp(&a.score()));
                }
            },
            None => self.next.set_route(route),
        }
    }

    fn apply(&mut self, route: &Route, operation: &mut dyn FnMut(&mut Link)) {
        match &route.consume {
            Some(range) => {
                if let Some((_, child)) = self.children.iter_mut().find(|(r, _)| r == range) {
                    operation(child);
                }
            }
            None => operation(&mut self.next),
        }
    }

    fn remove_route(&mut self, route: &Route) {
        match &route.consume {
            Some(range) => {
                if let Some(index) = self.children.iter().position(|(r, _)| r == range) {
                    self.children[index].1.remove_route(route);
                    if !self.children[index].1.has_route() {
                        self.children.remove(index);
                    }
                }
            }
            None => self.next.remove_route(route),
        }
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        for (range, child) in &self.children {
            extractor.set_consume(range.clone());
            child.extract(extractor);
            extractor.clear_consume();
        }
        self.next.extract(extractor);
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        let enabled: Vec<&(MediaRange, Link)> = self
            .children
            .iter()
            .filter(|(_, child)| !child.is_disabled())
            .collect();
        if enabled.is_empty() {
            return self.next.handle(exchange);
        }
        let Some(header) = exchange.request.header("content-type") else {
            return self.next.handle(exchange);
        };
        let content_type = ContentType::parse(header)?;
        for (range, child) in enabled {
            if range.matches(&content_type) {
                return child.handle(exchange);
            }
        }
        Err(HttpError::UnsupportedMediaType)
    }
}

/// Produced content type dimension: RFC 7231 proactive negotiation over the
/// merged `Accept` header.
#[derive(Clone)]
pub(crate) struct ProducesLink {
    children: Vec<(ContentType, Link)>,
    next: Box<Link>,
}

impl ProducesLink {
    fn new() -> Self {
        ProducesLink {
            children: Vec::new(),
            next: Box::new(Link::new_at(Level::Language)),
        }
    }

    fn set_route(&mut self, route: &Route) {
        match &route.produce {
            Some(content_type) => {
                match self.children.iter().position(|(c, _)| c == content_type) {
                    Some(index) => self.children[index].1.set_route(route),
                    None => {
                        let mut child = Link::new_at(Level::Language);
                        child.set_route(route);
                        self.children.push((content_type.clone(), child));
                        self.children.sort_by(|(a, _), (b, _)| {
                            b.to_media_range().score().cmp(&a.to_media_range().score())
                        });
                    }
                }
            }
            None => self.next.set_route(route),
        }
    }

    fn apply(&mut self, route: &Route, operation: &mut dyn FnMut(&mut Link)) {
        match &route.produce {
            Some(content_type) => {
                if let Some((_, child)) =
                    self.children.iter_mut().find(|(c, _)| c == content_type)
                {
                    operation(child);
                }
            }
            None => operation(&mut self.next),
        }
    }

    fn remove_route(&mut self, route: &Route) {
        match &route.produce {
            Some(content_type) => {
                if let Some(index) = self.children.iter().position(|(c, _)| c == content_type) {
                    self.children[index].1.remove_route(route);
                    if !self.children[index].1.has_route() {
                        self.children.remove(index);
                    }
                }
            }
            None => self.next.remove_route(route),
        }
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        for (content_type, child) in &self.children {
            extractor.set_produce(content_type.clone());
            child.extract(extractor);
            extractor.clear_produce();
        }
        self.next.extract(extractor);
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        let enabled: Vec<usize> = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, (_, child))| !child.is_disabled())
            .map(|(index, _)| index)
            .collect();
        if enabled.is_empty() {
            return self.next.handle(exchange);
        }

        let accept = match exchange.request.header("accept") {
            Some(value) => Accept::merge(std::iter::once(value))?.unwrap_or_else(Accept::any),
            None => Accept::any(),
        };
        let candidates: Vec<ContentType> = enabled
            .iter()
            .map(|&index| self.children[index].0.clone())
            .collect();

        let mut next_link_invoked = false;
        for accept_match in accept.find_all_match(&candidates) {
            let range = &accept.ranges()[accept_match.range];
            let (content_type, child) = &self.children[enabled[accept_match.item]];
            if !next_link_invoked && range.is_any() {
                // the bare */* range prefers the default chain; only when
                // that has no route does the best typed child get its turn
                next_link_invoked = true;
                match self.next.handle(exchange) {
                    Err(error) if error.is_resumable() => {}
                    result => return result,
                }
            }
            exchange
                .response
                .set_header("content-type", &content_type.header_value());
            match child.handle(exchange) {
                Err(error) if error.is_resumable() => {
                    exchange.response.remove_header("content-type");
                }
                result => return result,
            }
        }
        let offered: BTreeSet<String> = self
            .children
            .iter()
            .map(|(content_type, _)| content_type.media_type())
            .collect();
        Err(HttpError::NotAcceptable(offered.into_iter().collect()))
    }
}

/// Language dimension over `Accept-Language`. Exhaustion falls through to
/// the default chain so upstream links report their own errors first.
#[derive(Clone)]
pub(crate) struct LanguageLink {
    children: Vec<(LanguageRange, Link)>,
    next: Box<Link>,
}

impl LanguageLink {
    fn new() -> Self {
        LanguageLink {
            children: Vec::new(),
            next: Box::new(Link::new_at(Level::Handler)),
        }
    }

    fn set_route(&mut self, route: &Route) {
        match &route.language {
            Some(range) if !range.is_any() => {
                match self.children.iter().position(|(r, _)| r == range) {
                    Some(index) => self.children[index].1.set_route(route),
                    None => {
                        let mut child = Link::new_at(Level::Handler);
                        child.set_route(route);
                        self.children.push((range.clone(), child));
                        self.children
                            .sort_by(|(a, _), (b, _)| b.score().cmp(&a.score()));
                    }
                }
            }
            _ => self.next.set_route(route),
        }
    }

    fn apply(&mut self, route: &Route, operation: &mut dyn FnMut(&mut Link)) {
        match &route.language {
            Some(range) if !range.is_any() => {
                if let Some((_, child)) = self.children.iter_mut().find(|(r, _)| r == range) {
                    operation(child);
                }
            }
            _ => operation(&mut self.next),
        }
    }

    fn remove_route(&mut self, route: &Route) {
        match &route.language {
            Some(range) if !range.is_any() => {
                if let Some(index) = self.children.iter().position(|(r, _)| r == range) {
                    self.children[index].1.remove_route(route);
                    if !self.children[index].1.has_route() {
                        self.children.remove(index);
                    }
                }
            }
            _ => self.next.remove_route(route),
        }
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        for (range, child) in &self.children {
            extractor.set_language(range.clone());
            child.extract(extractor);
            extractor.clear_language();
        }
        self.next.extract(extractor);
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        let enabled: Vec<usize> = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, (_, child))| !child.is_disabled())
            .map(|(index, _)| index)
            .collect();
        if enabled.is_empty() {
            return self.next.handle(exchange);
        }

        let accept_language = match exchange.request.header("accept-language") {
            Some(value) => {
                AcceptLanguage::merge(std::iter::once(value))?.unwrap_or_else(AcceptLanguage::any)
            }
            None => AcceptLanguage::any(),
        };
        let candidates: Vec<LanguageRange> = enabled
            .iter()
            .map(|&index| self.children[index].0.clone())
            .collect();

        for language_match in accept_language.find_all_match(&candidates) {
            let range = &accept_language.ranges()[language_match.range];
            let (_, child) = &self.children[enabled[language_match.item]];
            if range.is_any() {
                // the default chain wins over any language-tagged child
                match self.next.handle(exchange) {
                    Err(error) if error.is_resumable() => {}
                    result => return result,
                }
            }
            match child.handle(exchange) {
                Err(error) if error.is_resumable() => continue,
                result => return result,
            }
        }
        // no matching language; the default chain reports route not found
        // unless an unspecified route covers the request
        self.next.handle(exchange)
    }
}

/// Terminal link: the registered handler plus its disabled flag.
#[derive(Clone, Default)]
pub(crate) struct HandlerLink {
    handler: Option<HandlerRef>,
    disabled: bool,
}

impl HandlerLink {
    fn new() -> Self {
        HandlerLink::default()
    }

    fn set_route(&mut self, route: &Route) {
        // last writer wins; the disabled flag survives handler replacement
        if let Some(handler) = &route.handler {
            self.handler = Some(handler.clone());
        }
    }

    fn enable(&mut self) {
        self.disabled = false;
    }

    fn disable(&mut self) {
        self.disabled = true;
    }

    fn remove(&mut self) {
        self.handler = None;
        self.disabled = false;
    }

    fn extract(&self, extractor: &mut RouteExtractor) {
        if let Some(handler) = &self.handler {
            extractor.emit(handler.clone(), self.disabled);
        }
    }

    fn handle(&self, exchange: &mut Exchange) -> Result<(), HttpError> {
        match &self.handler {
            None => Err(HttpError::RouteNotFound),
            Some(_) if self.disabled => Err(HttpError::DisabledRoute),
            Some(handler) => handler.handle(exchange),
        }
    }
}
