use http::Method;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;
use switchyard::body::sse::SseEvent;
use switchyard::error::HttpError;
use switchyard::server::{serve, RouterService, ServerConfig, ServerHandle};
use switchyard::stream::Stream;
use switchyard::{Exchange, Router};

fn build_router() -> Arc<Router> {
    let router = Arc::new(Router::new());
    router
        .route()
        .path("/hello")
        .method(Method::GET)
        .produces("application/json")
        .handler(|exchange: &mut Exchange| {
            exchange.response.body().raw(r#"{"greeting":"hello"}"#)
        })
        .unwrap();
    router
        .route()
        .path("/items/{id}")
        .method(Method::GET)
        .handler(|exchange: &mut Exchange| {
            let id = exchange.request.path_param("id").unwrap_or("").to_string();
            exchange.response.body().raw(id)
        })
        .unwrap();
    router
        .route()
        .path("/events")
        .method(Method::GET)
        .handler(|exchange: &mut Exchange| {
            let events = Stream::from_iter(
                (0..3).map(|i| SseEvent::new().data(format!("tick {i}"))),
            );
            exchange.response.body().sse(events)
        })
        .unwrap();
    router
        .route()
        .path("/boom")
        .handler(|_: &mut Exchange| Err(HttpError::Internal("boom".into())))
        .unwrap();
    router
}

fn start_server() -> (ServerHandle, SocketAddr) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();

    let mut config = ServerConfig::from_env();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    config.host = addr.ip().to_string();
    config.port = addr.port();

    let service = RouterService::new(build_router());
    let handle = serve(service, &config).unwrap();
    handle.wait_ready().unwrap();
    (handle, addr)
}

fn send_request(addr: &SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(500)))
        .unwrap();
    let mut buf = Vec::new();
    loop {
        let mut tmp = [0u8; 1024];
        match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                break
            }
            Err(e) => panic!("read error: {e:?}"),
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn parse_parts(response: &str) -> (u16, Vec<(String, String)>, String) {
    let (head, body) = response.split_once("\r\n\r\n").unwrap_or((response, ""));
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    (status, headers, body.to_string())
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_server_end_to_end() {
    let (handle, addr) = start_server();

    // negotiated JSON route; a valid inbound correlation id is echoed
    let resp = send_request(
        &addr,
        "GET /hello HTTP/1.1\r\nHost: localhost\r\nAccept: application/json\r\nX-Request-Id: 01ARZ3NDEKTSV4RRFFQ69G5FAV\r\n\r\n",
    );
    let (status, headers, body) = parse_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("application/json"));
    assert_eq!(
        header(&headers, "x-request-id"),
        Some("01ARZ3NDEKTSV4RRFFQ69G5FAV")
    );
    assert_eq!(body, r#"{"greeting":"hello"}"#);

    // path parameter binding
    let resp = send_request(&addr, "GET /items/42 HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, _, body) = parse_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(body, "42");

    // unknown path is a white-label 404 with a minted correlation id
    let resp = send_request(&addr, "GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, body) = parse_parts(&resp);
    assert_eq!(status, 404);
    assert_eq!(header(&headers, "content-type"), Some("application/json"));
    assert!(header(&headers, "x-request-id").is_some());
    assert!(body.contains("\"status\":404"));

    // wrong method carries Allow
    let resp = send_request(&addr, "POST /hello HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\n\r\n");
    let (status, headers, _) = parse_parts(&resp);
    assert_eq!(status, 405);
    assert_eq!(header(&headers, "allow"), Some("GET"));

    // handler failure surfaces as 500
    let resp = send_request(&addr, "GET /boom HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, _, _) = parse_parts(&resp);
    assert_eq!(status, 500);

    // SSE framing on the wire
    let resp = send_request(&addr, "GET /events HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (status, headers, body) = parse_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(
        header(&headers, "content-type"),
        Some("text/event-stream;charset=utf-8")
    );
    assert!(body.starts_with("data:tick 0\r\n\r\ndata:tick 1"));

    handle.stop();
}
