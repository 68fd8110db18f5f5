use crate::body::{CollectedBody, Framing};
use may_minihttp::Response;
use serde_json::Value;
use std::collections::HashMap;

pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        415 => "Unsupported Media Type",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write status, headers and the collected body. Body headers stamp only
/// where the handler did not set the name itself. The wire codec owns the
/// `Content-Length` line, so that header is never written here; the framing
/// contract was already enforced when the body was collected.
pub fn write_response(
    res: &mut Response,
    status: u16,
    headers: &HashMap<String, String>,
    body: CollectedBody,
    suppress_body: bool,
) {
    res.status_code(status as usize, status_reason(status));
    for (name, value) in headers {
        if name == "content-length" {
            continue;
        }
        push_header(res, name, value);
    }
    for (name, value) in &body.headers {
        if !headers.contains_key(*name) {
            push_header(res, name, value);
        }
    }
    debug_assert!(!matches!(body.framing, Framing::ContentLength(n) if n != body.payload.len() as u64));
    if !suppress_body {
        res.body_vec(body.payload.to_vec());
    }
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    push_header(res, "content-type", "application/json");
    res.body_vec(body.to_string().into_bytes());
}

/// The response header API wants `&'static str`; dynamic header lines are
/// leaked for the lifetime of the write.
fn push_header(res: &mut Response, name: &str, value: &str) {
    res.header(Box::leak(format!("{name}: {value}").into_boxed_str()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(406), "Not Acceptable");
        assert_eq!(status_reason(415), "Unsupported Media Type");
        assert_eq!(status_reason(418), "OK");
    }
}
