use crate::error::HttpError;

/// Normalize a request path before routing: percent-decode unreserved
/// characters, drop `.` segments, resolve `..` segments, collapse empty
/// segments. A single trailing slash is preserved so strict trailing-slash
/// matching stays possible.
///
/// Normalization is idempotent: reserved percent-escapes (`%2F` and friends)
/// are left encoded so a second pass is a no-op.
///
/// Fails with a 400 when the path does not start with `/`, carries an
/// invalid percent escape, or a `..` segment escapes the root.
pub fn normalize_path(raw: &str) -> Result<String, HttpError> {
    if !raw.starts_with('/') {
        return Err(HttpError::BadRequest(format!("invalid path: {raw}")));
    }
    let decoded = decode_unreserved(raw)?;

    let mut segments: Vec<&str> = Vec::new();
    let mut trailing_slash = decoded.ends_with('/');
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(HttpError::BadRequest(format!(
                        "path escapes root: {raw}"
                    )));
                }
            }
            other => segments.push(other),
        }
    }
    // "/a/." and "/a/.." resolve to a directory
    if let Some(last) = decoded.rsplit('/').next() {
        if last == "." || last == ".." {
            trailing_slash = true;
        }
    }

    if segments.is_empty() {
        return Ok("/".to_string());
    }
    let mut path = String::with_capacity(decoded.len());
    for segment in &segments {
        path.push('/');
        path.push_str(segment);
    }
    if trailing_slash {
        path.push('/');
    }
    Ok(path)
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Decode only the percent escapes whose decoded byte is unreserved per RFC
/// 3986 section 2.3; reserved escapes such as `%2F` keep their encoded form
/// so segment boundaries cannot be forged.
fn decode_unreserved(path: &str) -> Result<String, HttpError> {
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = path
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    HttpError::BadRequest(format!("invalid percent escape in path: {path}"))
                })?;
            if is_unreserved(hex) {
                out.push(hex as char);
            } else {
                out.push_str(&path[i..i + 3]);
            }
            i += 3;
        } else {
            let ch = path[i..].chars().next().unwrap_or('/');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    Ok(out)
}
