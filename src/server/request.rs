use crate::error::HttpError;
use crate::exchange::Request;
use crate::stream::Stream;
use bytes::Bytes;
use http::Method;
use std::collections::HashMap;
use std::io::Read;

/// Extract an exchange request from a `may_minihttp` request: method, raw
/// and normalized path, lowercased headers (repeats joined), decoded query
/// parameters and the buffered body.
pub fn parse_request(req: may_minihttp::Request) -> Result<Request, HttpError> {
    let method: Method = req
        .method()
        .parse()
        .map_err(|_| HttpError::BadRequest(format!("invalid method: {}", req.method())))?;
    let raw_path = req.path().to_string();

    let mut request = Request::new(method, &raw_path)?;

    for header in req.headers() {
        let value = String::from_utf8_lossy(header.value);
        request.insert_header(header.name, &value);
    }
    request.correlate();
    request.query_params = parse_query_params(&raw_path);

    let mut body = Vec::new();
    if req.body().read_to_end(&mut body).unwrap_or(0) > 0 {
        request.set_body(Stream::once(Bytes::from(body)));
    }
    Ok(request)
}

/// Decode the query string into a parameter map; with repeated names the
/// last value wins.
pub fn parse_query_params(raw_path: &str) -> HashMap<String, String> {
    match raw_path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}
