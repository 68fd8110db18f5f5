//! Per-request exchange: the request half handed to the routing pipeline and
//! the mutable response half handlers write into.

use crate::body::ResponseBody;
use crate::error::HttpError;
use crate::stream::Stream;
use crate::uri::normalize_path;
use bytes::Bytes;
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Inline storage for path parameters; routes rarely carry more than a
/// handful.
pub type ParamVec = SmallVec<[(String, String); 8]>;

/// Header carrying the client-supplied correlation id.
pub const CORRELATION_HEADER: &str = "x-request-id";

/// Correlation id of one exchange, backed by ULID.
///
/// Every request mints one; [`Request::correlate`] swaps it for a valid id
/// the client sent in `x-request-id`. The transport echoes it on the
/// response and every dispatch log line carries it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(ulid::Ulid);

impl CorrelationId {
    fn mint() -> Self {
        CorrelationId(ulid::Ulid::new())
    }

    /// Parse a client-supplied id; anything but a well-formed ULID is
    /// discarded.
    pub fn parse(value: &str) -> Option<Self> {
        ulid::Ulid::from_string(value.trim()).ok().map(CorrelationId)
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CorrelationId({})", self.0)
    }
}

/// The request half of an exchange.
///
/// The path is normalized before routing; the raw path as received from the
/// transport stays available for handler inspection.
pub struct Request {
    pub method: Method,
    /// Normalized path used for routing.
    pub path: String,
    /// Path exactly as received, including the query string.
    pub raw_path: String,
    /// Header values keyed by lowercased name; repeated headers are joined
    /// with `", "`.
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// Parameters bound by the matched path pattern.
    pub path_params: ParamVec,
    /// Free-form per-request attributes for handler use.
    pub attributes: HashMap<String, serde_json::Value>,
    /// Correlation id for this exchange.
    pub correlation_id: CorrelationId,
    body: Option<Stream<Bytes>>,
}

impl Request {
    /// Build a request, normalizing the path. Fails with 400 on a malformed
    /// path.
    pub fn new(method: Method, raw_path: &str) -> Result<Self, HttpError> {
        let without_query = raw_path.split('?').next().unwrap_or("/");
        let path = normalize_path(without_query)?;
        Ok(Request {
            method,
            path,
            raw_path: raw_path.to_string(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            path_params: ParamVec::new(),
            attributes: HashMap::new(),
            correlation_id: CorrelationId::mint(),
            body: None,
        })
    }

    /// Adopt the client's correlation id once the headers are populated; an
    /// absent or malformed `x-request-id` keeps the minted one.
    pub fn correlate(&mut self) {
        if let Some(id) = self.header(CORRELATION_HEADER).and_then(CorrelationId::parse) {
            self.correlation_id = id;
        }
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Add a header value, joining repeated names with `", "`.
    pub fn insert_header(&mut self, name: &str, value: &str) {
        use std::collections::hash_map::Entry;
        match self.headers.entry(name.to_ascii_lowercase()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.to_string());
            }
        }
    }

    /// Look up a path parameter. With duplicate names the last binding wins.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attach the request body stream. The transport sets this once before
    /// dispatch.
    pub fn set_body(&mut self, body: Stream<Bytes>) {
        self.body = Some(body);
    }

    /// Take the body stream; subsequent calls return an empty stream.
    pub fn take_body(&mut self) -> Stream<Bytes> {
        self.body.take().unwrap_or_else(Stream::empty)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("raw_path", &self.raw_path)
            .field("path_params", &self.path_params)
            .field("correlation_id", &self.correlation_id)
            .finish_non_exhaustive()
    }
}

/// The response half of an exchange. Headers stay writable until the
/// transport emits the first body byte.
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: ResponseBody,
}

impl Response {
    pub fn new() -> Self {
        Response {
            status: 200,
            headers: HashMap::new(),
            body: ResponseBody::default(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(&name.to_ascii_lowercase());
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// The response body builder.
    pub fn body(&mut self) -> &mut ResponseBody {
        &mut self.body
    }

    /// Declared `Content-Length`, when a handler set one explicitly.
    pub fn declared_content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// Detach the body for assembly once the handler has returned.
    pub fn take_body(&mut self) -> ResponseBody {
        std::mem::take(&mut self.body)
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A single HTTP exchange: request in, response out.
#[derive(Debug)]
pub struct Exchange {
    pub request: Request,
    pub response: Response,
}

impl Exchange {
    /// Build an exchange for the given method and raw path. Fails with 400
    /// on a malformed path.
    pub fn new(method: Method, raw_path: &str) -> Result<Self, HttpError> {
        Ok(Exchange {
            request: Request::new(method, raw_path)?,
            response: Response::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_normalizes_path() {
        let request = Request::new(Method::GET, "/a/./b?x=1").unwrap();
        assert_eq!(request.path, "/a/b");
        assert_eq!(request.raw_path, "/a/./b?x=1");
    }

    #[test]
    fn test_request_rejects_bad_path() {
        assert!(Request::new(Method::GET, "/../x").is_err());
    }

    #[test]
    fn test_repeated_headers_join() {
        let mut request = Request::new(Method::GET, "/").unwrap();
        request.insert_header("Accept", "text/html");
        request.insert_header("accept", "application/json");
        assert_eq!(request.header("ACCEPT"), Some("text/html, application/json"));
    }

    #[test]
    fn test_path_param_last_binding_wins() {
        let mut request = Request::new(Method::GET, "/").unwrap();
        request.path_params.push(("id".to_string(), "org".to_string()));
        request.path_params.push(("id".to_string(), "user".to_string()));
        assert_eq!(request.path_param("id"), Some("user"));
    }

    #[test]
    fn test_correlate_adopts_valid_inbound_id() {
        let mut request = Request::new(Method::GET, "/").unwrap();
        request.insert_header(CORRELATION_HEADER, "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        request.correlate();
        assert_eq!(
            request.correlation_id.to_string(),
            "01ARZ3NDEKTSV4RRFFQ69G5FAV"
        );
    }

    #[test]
    fn test_correlate_keeps_minted_id_on_garbage() {
        let mut request = Request::new(Method::GET, "/").unwrap();
        let minted = request.correlation_id;
        request.insert_header(CORRELATION_HEADER, "not-a-ulid");
        request.correlate();
        assert_eq!(request.correlation_id, minted);
    }

    #[test]
    fn test_take_body_is_single_use() {
        let mut request = Request::new(Method::POST, "/").unwrap();
        request.set_body(Stream::once(Bytes::from_static(b"payload")));
        let first: Vec<Bytes> = request.take_body().collect();
        assert_eq!(first, vec![Bytes::from_static(b"payload")]);
        let second: Vec<Bytes> = request.take_body().collect();
        assert!(second.is_empty());
    }
}
