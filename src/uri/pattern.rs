use crate::error::HttpError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// Segment ranks, most specific first.
const RANK_LITERAL: u8 = 0;
const RANK_CONSTRAINED: u8 = 1;
const RANK_UNCONSTRAINED: u8 = 2;
const RANK_CATCH_ALL: u8 = 3;

/// Specificity fingerprint of one template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SegmentRank {
    rank: u8,
    literal_chars: usize,
    captures: usize,
}

/// A compiled path template.
///
/// Templates use `{name}` for a single-segment capture, `{name:regex}` for a
/// constrained capture, `{name:.*}` for a greedy catch-all and `{}` for a
/// capture that matches without binding a parameter. Literal characters are
/// regex-quoted.
///
/// ```
/// use switchyard::uri::PathPattern;
///
/// let pattern = PathPattern::compile("/users/{id}/posts/{post:[0-9]+}").unwrap();
/// let bindings = pattern.match_path("/users/jk/posts/42").unwrap();
/// assert_eq!(bindings[0], ("id".to_string(), "jk".to_string()));
/// assert_eq!(bindings[1], ("post".to_string(), "42".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    trailing_slash: bool,
    regex: Regex,
    /// One slot per capturing group; `None` for unnamed `{}` captures.
    capture_names: Vec<Option<String>>,
    segments: Vec<SegmentRank>,
    literal_len: usize,
}

impl PathPattern {
    /// Compile a template with strict trailing-slash matching.
    pub fn compile(template: &str) -> Result<Self, HttpError> {
        Self::compile_with_options(template, false)
    }

    /// Compile a template; with `trailing_slash` the compiled pattern also
    /// accepts the path with a single trailing slash appended.
    pub fn compile_with_options(template: &str, trailing_slash: bool) -> Result<Self, HttpError> {
        if !template.starts_with('/') {
            return Err(HttpError::BadRequest(format!(
                "path template must start with '/': {template}"
            )));
        }

        let mut regex_src = String::with_capacity(template.len() + 8);
        regex_src.push('^');
        let mut capture_names = Vec::new();
        let mut segments = Vec::new();
        let mut literal_len = 0usize;

        for segment in template[1..].split('/') {
            regex_src.push('/');
            let rank = compile_segment(segment, &mut regex_src, &mut capture_names)?;
            literal_len += rank.literal_chars;
            segments.push(rank);
        }
        if trailing_slash && !template.ends_with('/') {
            regex_src.push_str("/?");
        }
        regex_src.push('$');

        let regex = Regex::new(&regex_src).map_err(|e| {
            HttpError::BadRequest(format!("invalid path template {template}: {e}"))
        })?;
        Ok(PathPattern {
            template: template.to_string(),
            trailing_slash,
            regex,
            capture_names,
            segments,
            literal_len,
        })
    }

    /// The original template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether the pattern tolerates a trailing slash.
    pub fn matches_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Names bound by the pattern's capturing groups, `None` for unnamed
    /// captures.
    pub fn capture_names(&self) -> &[Option<String>] {
        &self.capture_names
    }

    /// Match a normalized path, returning the named parameter bindings in
    /// template order. Unnamed captures match but bind nothing.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let captures = self.regex.captures(path)?;
        let mut bindings = Vec::with_capacity(self.capture_names.len());
        for (index, name) in self.capture_names.iter().enumerate() {
            if let (Some(name), Some(value)) = (name, captures.get(index + 1)) {
                bindings.push((name.clone(), value.as_str().to_string()));
            }
        }
        Some(bindings)
    }

    /// Total order on patterns favoring concreteness: `Ordering::Less` means
    /// `self` is the more specific pattern.
    ///
    /// Compared segment by segment: a literal outranks any capture, more
    /// literal characters outrank fewer, a constrained capture outranks an
    /// unconstrained one which outranks a catch-all, and fewer captures
    /// outrank more. Past the common prefix, more segments win, then the
    /// longer overall literal portion.
    pub fn compare_specificity(&self, other: &PathPattern) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            let ordering = a
                .rank
                .cmp(&b.rank)
                .then(b.literal_chars.cmp(&a.literal_chars))
                .then(a.captures.cmp(&b.captures));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        other
            .segments
            .len()
            .cmp(&self.segments.len())
            .then(other.literal_len.cmp(&self.literal_len))
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template && self.trailing_slash == other.trailing_slash
    }
}

impl Eq for PathPattern {}

impl Hash for PathPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.template.hash(state);
        self.trailing_slash.hash(state);
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Compile one template segment into `regex_src`, returning its rank.
fn compile_segment(
    segment: &str,
    regex_src: &mut String,
    capture_names: &mut Vec<Option<String>>,
) -> Result<SegmentRank, HttpError> {
    let mut rank = RANK_LITERAL;
    let mut literal_chars = 0usize;
    let mut captures = 0usize;

    let mut chars = segment.char_indices();
    let mut literal_start = 0usize;
    while let Some((index, ch)) = chars.next() {
        if ch == '}' {
            return Err(HttpError::BadRequest(format!(
                "unmatched '}}' in path segment: {segment}"
            )));
        }
        if ch != '{' {
            continue;
        }
        // flush the literal run before the capture
        let literal = &segment[literal_start..index];
        literal_chars += literal.chars().count();
        regex_src.push_str(&regex::escape(literal));

        let mut depth = 1usize;
        let mut end = None;
        for (inner_index, inner_ch) in chars.by_ref() {
            match inner_ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(inner_index);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| {
            HttpError::BadRequest(format!("unterminated capture in path segment: {segment}"))
        })?;
        literal_start = end + 1;

        let body = &segment[index + 1..end];
        let (name, spec) = match body.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (body, None),
        };
        let capture_rank = match spec {
            None => {
                regex_src.push_str("([^/]+)");
                RANK_UNCONSTRAINED
            }
            Some(".*") => {
                regex_src.push_str("(.*)");
                RANK_CATCH_ALL
            }
            Some(custom) => {
                regex_src.push('(');
                regex_src.push_str(custom);
                regex_src.push(')');
                RANK_CONSTRAINED
            }
        };
        capture_names.push(if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        });
        captures += 1;
        rank = rank.max(capture_rank);
    }
    let literal = &segment[literal_start..];
    literal_chars += literal.chars().count();
    regex_src.push_str(&regex::escape(literal));

    Ok(SegmentRank {
        rank,
        literal_chars,
        captures,
    })
}
