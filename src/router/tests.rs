use super::Router;
use crate::error::HttpError;
use crate::exchange::Exchange;
use http::Method;

fn exchange(method: Method, path: &str) -> Exchange {
    Exchange::new(method, path).unwrap()
}

/// Handler that tags the response so tests can tell which route won.
fn tag(name: &'static str) -> impl Fn(&mut Exchange) -> Result<(), HttpError> + Send + Sync {
    move |exchange: &mut Exchange| {
        exchange.response.set_header("x-handler", name);
        Ok(())
    }
}

fn handled_by(exchange: &Exchange) -> &str {
    exchange.response.header("x-handler").unwrap_or("")
}

#[test]
fn test_literal_path_routing() {
    let router = Router::new();
    router.route().path("/hello").handler(tag("hello")).unwrap();

    let mut ex = exchange(Method::GET, "/hello");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "hello");

    let mut ex = exchange(Method::GET, "/other");
    let err = router.handle(&mut ex).unwrap_err();
    assert!(matches!(err, HttpError::RouteNotFound));
}

#[test]
fn test_literal_path_is_normalized_on_dispatch() {
    let router = Router::new();
    router.route().path("/a/b").handler(tag("ab")).unwrap();

    let mut ex = exchange(Method::GET, "/a/./c/../b");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "ab");
}

#[test]
fn test_pattern_binds_parameters() {
    let router = Router::new();
    router
        .route()
        .path("/users/{user_id}/posts/{post_id}")
        .handler(tag("post"))
        .unwrap();

    let mut ex = exchange(Method::GET, "/users/7/posts/42");
    router.handle(&mut ex).unwrap();
    assert_eq!(ex.request.path_param("user_id"), Some("7"));
    assert_eq!(ex.request.path_param("post_id"), Some("42"));
}

#[test]
fn test_pattern_specificity_prefers_mixed_segment() {
    let router = Router::new();
    router.route().path("/a/{p1}_{p2}").handler(tag("pair")).unwrap();
    router.route().path("/a/{p}").handler(tag("single")).unwrap();

    let mut ex = exchange(Method::GET, "/a/x_y");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "pair");
    assert_eq!(ex.request.path_param("p1"), Some("x"));
    assert_eq!(ex.request.path_param("p2"), Some("y"));

    let mut ex = exchange(Method::GET, "/a/z");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "single");
    assert_eq!(ex.request.path_param("p"), Some("z"));
}

#[test]
fn test_literal_beats_pattern() {
    let router = Router::new();
    router.route().path("/a/{p}").handler(tag("pattern")).unwrap();
    router.route().path("/a/b").handler(tag("literal")).unwrap();

    let mut ex = exchange(Method::GET, "/a/b");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "literal");
}

#[test]
fn test_method_not_allowed_lists_methods() {
    let router = Router::new();
    router
        .route()
        .path("/items")
        .method(Method::GET)
        .handler(tag("get"))
        .unwrap();
    router
        .route()
        .path("/items")
        .method(Method::PUT)
        .handler(tag("put"))
        .unwrap();

    let mut ex = exchange(Method::POST, "/items");
    let err = router.handle(&mut ex).unwrap_err();
    match err {
        HttpError::MethodNotAllowed(methods) => {
            assert_eq!(methods, vec![Method::GET, Method::PUT]);
        }
        other => panic!("expected 405, got {other:?}"),
    }
}

#[test]
fn test_methodless_route_covers_other_methods() {
    let router = Router::new();
    router
        .route()
        .path("/items")
        .method(Method::GET)
        .handler(tag("get"))
        .unwrap();
    router.route().path("/items").handler(tag("any")).unwrap();

    let mut ex = exchange(Method::DELETE, "/items");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "any");

    let mut ex = exchange(Method::GET, "/items");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "get");
}

#[test]
fn test_consumes_selects_most_specific() {
    let router = Router::new();
    router
        .route()
        .path("/in")
        .consumes("application/*")
        .handler(tag("any-app"))
        .unwrap();
    router
        .route()
        .path("/in")
        .consumes("application/json")
        .handler(tag("json"))
        .unwrap();

    let mut ex = exchange(Method::POST, "/in");
    ex.request.insert_header("content-type", "application/json");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "json");

    let mut ex = exchange(Method::POST, "/in");
    ex.request.insert_header("content-type", "application/xml");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "any-app");
}

#[test]
fn test_consumes_unsupported_media_type() {
    let router = Router::new();
    router
        .route()
        .path("/in")
        .consumes("application/json")
        .handler(tag("json"))
        .unwrap();

    let mut ex = exchange(Method::POST, "/in");
    ex.request.insert_header("content-type", "text/plain");
    let err = router.handle(&mut ex).unwrap_err();
    assert!(matches!(err, HttpError::UnsupportedMediaType));
}

#[test]
fn test_consumes_without_content_type_takes_default() {
    let router = Router::new();
    router
        .route()
        .path("/in")
        .consumes("application/json")
        .handler(tag("json"))
        .unwrap();
    router.route().path("/in").handler(tag("default")).unwrap();

    let mut ex = exchange(Method::POST, "/in");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "default");
}

#[test]
fn test_produces_exact_parameter_match() {
    let router = Router::new();
    router
        .route()
        .path("/out")
        .produces("application/json;version=1")
        .handler(tag("v1"))
        .unwrap();
    router
        .route()
        .path("/out")
        .produces("application/json;version=2")
        .handler(tag("v2"))
        .unwrap();

    let mut ex = exchange(Method::GET, "/out");
    ex.request
        .insert_header("accept", "application/json;version=2");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "v2");
    assert_eq!(
        ex.response.header("content-type"),
        Some("application/json;version=2")
    );
}

#[test]
fn test_produces_prefers_most_parameters() {
    let router = Router::new();
    router
        .route()
        .path("/out")
        .produces("application/json;version=1")
        .handler(tag("v1"))
        .unwrap();
    router
        .route()
        .path("/out")
        .produces("application/json;version=2")
        .handler(tag("v2"))
        .unwrap();
    router
        .route()
        .path("/out")
        .produces("application/json;version=2;p=1")
        .handler(tag("v2p1"))
        .unwrap();

    let mut ex = exchange(Method::GET, "/out");
    ex.request.insert_header("accept", "application/json");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "v2p1");
}

#[test]
fn test_produces_not_acceptable() {
    let router = Router::new();
    router
        .route()
        .path("/out")
        .produces("application/json;version=1")
        .handler(tag("v1"))
        .unwrap();
    router
        .route()
        .path("/out")
        .produces("application/json;version=2")
        .handler(tag("v2"))
        .unwrap();

    let mut ex = exchange(Method::GET, "/out");
    ex.request.insert_header("accept", "application/json;p=1");
    let err = router.handle(&mut ex).unwrap_err();
    match err {
        HttpError::NotAcceptable(offered) => {
            // media types are reported once, parameter variants collapse
            assert_eq!(offered, vec!["application/json"]);
        }
        other => panic!("expected 406, got {other:?}"),
    }
}

#[test]
fn test_produces_any_range_prefers_default() {
    let router = Router::new();
    router
        .route()
        .path("/out")
        .produces("application/json")
        .handler(tag("json"))
        .unwrap();
    router.route().path("/out").handler(tag("default")).unwrap();

    let mut ex = exchange(Method::GET, "/out");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "default");

    // without a default the best typed child serves */*
    let router = Router::new();
    router
        .route()
        .path("/out")
        .produces("application/json")
        .handler(tag("json"))
        .unwrap();
    let mut ex = exchange(Method::GET, "/out");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "json");
    assert_eq!(ex.response.header("content-type"), Some("application/json"));
}

#[test]
fn test_produces_disabled_children_fall_through_to_default() {
    let router = Router::new();
    router
        .route()
        .path("/out")
        .produces("application/json")
        .handler(tag("json"))
        .unwrap();
    router.route().path("/out").handler(tag("default")).unwrap();
    router
        .route()
        .path("/out")
        .produces("application/json")
        .disable()
        .unwrap();

    let mut ex = exchange(Method::GET, "/out");
    ex.request.insert_header("accept", "application/json");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "default");
}

#[test]
fn test_language_negotiation() {
    let router = Router::new();
    router
        .route()
        .path("/greet")
        .language("fr")
        .handler(tag("fr"))
        .unwrap();
    router
        .route()
        .path("/greet")
        .language("en")
        .handler(tag("en"))
        .unwrap();

    let mut ex = exchange(Method::GET, "/greet");
    ex.request
        .insert_header("accept-language", "fr;q=0.9, en;q=0.1");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "fr");

    // no header behaves as *, some candidate serves the request
    let mut ex = exchange(Method::GET, "/greet");
    router.handle(&mut ex).unwrap();
    assert!(!handled_by(&ex).is_empty());
}

#[test]
fn test_language_any_prefers_default() {
    let router = Router::new();
    router
        .route()
        .path("/greet")
        .language("fr")
        .handler(tag("fr"))
        .unwrap();
    router.route().path("/greet").handler(tag("default")).unwrap();

    let mut ex = exchange(Method::GET, "/greet");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "default");
}

#[test]
fn test_language_exhaustion_is_not_found() {
    let router = Router::new();
    router
        .route()
        .path("/greet")
        .language("fr")
        .handler(tag("fr"))
        .unwrap();

    let mut ex = exchange(Method::GET, "/greet");
    ex.request.insert_header("accept-language", "de");
    let err = router.handle(&mut ex).unwrap_err();
    assert!(matches!(err, HttpError::RouteNotFound));
}

#[test]
fn test_disable_enable_route() {
    let router = Router::new();
    router.route().path("/hello").handler(tag("hello")).unwrap();

    router.route().path("/hello").disable().unwrap();
    let mut ex = exchange(Method::GET, "/hello");
    let err = router.handle(&mut ex).unwrap_err();
    assert!(matches!(err, HttpError::DisabledRoute));

    // still listed, flagged disabled
    let routes = router.routes();
    assert_eq!(routes.len(), 1);
    assert!(routes[0].disabled);

    router.route().path("/hello").enable().unwrap();
    let mut ex = exchange(Method::GET, "/hello");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "hello");
}

#[test]
fn test_remove_route() {
    let router = Router::new();
    router.route().path("/hello").handler(tag("hello")).unwrap();
    assert_eq!(router.routes().len(), 1);

    router.route().path("/hello").remove().unwrap();
    assert!(router.routes().is_empty());

    let mut ex = exchange(Method::GET, "/hello");
    assert!(matches!(
        router.handle(&mut ex).unwrap_err(),
        HttpError::RouteNotFound
    ));
}

#[test]
fn test_reregistration_replaces_handler_in_place() {
    let router = Router::new();
    router.route().path("/hello").handler(tag("first")).unwrap();
    router.route().path("/hello").handler(tag("second")).unwrap();

    assert_eq!(router.routes().len(), 1);
    let mut ex = exchange(Method::GET, "/hello");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "second");
}

#[test]
fn test_trailing_slash_tolerance() {
    let router = Router::new();
    router
        .route()
        .path_matching_trailing_slash("/hello")
        .handler(tag("tolerant"))
        .unwrap();
    router.route().path("/strict").handler(tag("strict")).unwrap();

    for path in ["/hello", "/hello/"] {
        let mut ex = exchange(Method::GET, path);
        router.handle(&mut ex).unwrap();
        assert_eq!(handled_by(&ex), "tolerant");
    }
    // tolerant routes are reported once
    assert_eq!(router.routes().len(), 2);

    let mut ex = exchange(Method::GET, "/strict/");
    assert!(router.handle(&mut ex).is_err());
}

#[test]
fn test_root_handler_catches_everything() {
    let router = Router::with_root_handler(tag("root"));
    for path in ["/", "/anything", "/deeply/nested"] {
        let mut ex = exchange(Method::GET, path);
        router.handle(&mut ex).unwrap();
        assert_eq!(handled_by(&ex), "root");
    }
}

#[test]
fn test_find_routes_filters_by_criteria() {
    let router = Router::new();
    router
        .route()
        .path("/a")
        .method(Method::GET)
        .handler(tag("a-get"))
        .unwrap();
    router
        .route()
        .path("/a")
        .method(Method::POST)
        .handler(tag("a-post"))
        .unwrap();
    router
        .route()
        .path("/b")
        .method(Method::GET)
        .handler(tag("b-get"))
        .unwrap();

    let found = router.route().path("/a").find_routes().unwrap();
    assert_eq!(found.len(), 2);
    let found = router.route().method(Method::GET).find_routes().unwrap();
    assert_eq!(found.len(), 2);
    let found = router
        .route()
        .path("/a")
        .method(Method::POST)
        .find_routes()
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_registration_cartesian_product() {
    let router = Router::new();
    router
        .route()
        .path("/multi")
        .method(Method::GET)
        .method(Method::PUT)
        .produces("application/json")
        .produces("text/plain")
        .handler(tag("multi"))
        .unwrap();
    assert_eq!(router.routes().len(), 4);
}

#[test]
fn test_mutations_do_not_disturb_other_routes() {
    let router = Router::new();
    router.route().path("/a").handler(tag("a")).unwrap();
    router.route().path("/b").handler(tag("b")).unwrap();

    router.route().path("/a").remove().unwrap();
    let mut ex = exchange(Method::GET, "/b");
    router.handle(&mut ex).unwrap();
    assert_eq!(handled_by(&ex), "b");
    let mut ex = exchange(Method::GET, "/a");
    assert!(router.handle(&mut ex).is_err());
}
