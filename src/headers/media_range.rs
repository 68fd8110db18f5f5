use crate::error::HttpError;
use std::collections::BTreeMap;
use std::fmt;

/// Media type parameters, ordered by name so equality is insertion-order
/// independent. A parameter without a value (`;foo`) holds `None`.
pub type MediaParameters = BTreeMap<String, Option<String>>;

/// A media range from an `Accept` header as defined by RFC 7231 section
/// 5.3.2: a possibly wildcarded media type with parameters and a quality
/// weight.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub r#type: String,
    pub sub_type: String,
    pub quality: f32,
    pub parameters: MediaParameters,
}

impl MediaRange {
    /// Parse a single media range, e.g. `text/*;q=0.8` or
    /// `application/json;version=1`.
    pub fn parse(value: &str) -> Result<Self, HttpError> {
        let mut tokens = value.split(';');
        let media_type = tokens.next().unwrap_or("").trim();
        let (r#type, sub_type) = split_media_type(media_type)?;

        let mut quality = 1.0f32;
        let mut parameters = MediaParameters::new();
        for token in tokens {
            let (name, param_value) = split_parameter(token)?;
            if name == "q" {
                quality = parse_quality(param_value.as_deref())?;
            } else {
                parameters.insert(name, param_value);
            }
        }
        Ok(MediaRange {
            r#type,
            sub_type,
            quality,
            parameters,
        })
    }

    /// The `type/subtype` form without parameters.
    pub fn media_type(&self) -> String {
        format!("{}/{}", self.r#type, self.sub_type)
    }

    /// Whether this is a bare `*/*` range with no parameters, i.e. the range
    /// that prefers the default (untyped) routing chain.
    pub fn is_any(&self) -> bool {
        self.r#type == "*" && self.sub_type == "*" && self.parameters.is_empty()
    }

    /// Specificity score used to order ranges from most to least preferred:
    /// 1000 times the quality, plus a wildcard tier (`*/*` 0, `*/x` 10,
    /// `x/*` 20, `x/x` 30), plus 1 per valueless and 2 per valued parameter.
    pub fn score(&self) -> i32 {
        let mut score = (self.quality * 1000.0) as i32;
        score += match (self.r#type.as_str(), self.sub_type.as_str()) {
            ("*", "*") => 0,
            ("*", _) => 10,
            (_, "*") => 20,
            _ => 30,
        };
        for value in self.parameters.values() {
            score += if value.is_some() { 2 } else { 1 };
        }
        score
    }

    /// Whether the given content type falls within this range.
    ///
    /// Wildcards are honored on either side; when the range carries
    /// parameters they must match the content type's parameters exactly,
    /// a parameterless range matches any parameters.
    pub fn matches(&self, content_type: &ContentType) -> bool {
        let ct_type = content_type.r#type.as_str();
        let ct_sub = content_type.sub_type.as_str();
        let ct_params = &content_type.parameters;

        let params_ok = self.parameters.is_empty() || self.parameters == *ct_params;
        if ct_type == "*" {
            if ct_sub == "*" {
                params_ok
            } else {
                (self.sub_type == "*" || self.sub_type == ct_sub) && params_ok
            }
        } else if ct_sub == "*" {
            (self.r#type == "*" || self.r#type == ct_type) && params_ok
        } else {
            (self.r#type == "*" || self.r#type == ct_type)
                && (self.sub_type == "*" || self.sub_type == ct_sub)
                && params_ok
        }
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.r#type, self.sub_type)?;
        for (name, value) in &self.parameters {
            match value {
                Some(v) => write!(f, ";{name}={v}")?,
                None => write!(f, ";{name}")?,
            }
        }
        if self.quality != 1.0 {
            write!(f, ";q={}", self.quality)?;
        }
        Ok(())
    }
}

/// A concrete `Content-Type` header value: media type plus parameters,
/// without a quality weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub r#type: String,
    pub sub_type: String,
    pub parameters: MediaParameters,
}

impl ContentType {
    /// Parse a content type, e.g. `application/json;charset=utf-8`.
    pub fn parse(value: &str) -> Result<Self, HttpError> {
        let mut tokens = value.split(';');
        let media_type = tokens.next().unwrap_or("").trim();
        let (r#type, sub_type) = split_media_type(media_type)?;

        let mut parameters = MediaParameters::new();
        for token in tokens {
            let (name, param_value) = split_parameter(token)?;
            parameters.insert(name, param_value);
        }
        Ok(ContentType {
            r#type,
            sub_type,
            parameters,
        })
    }

    pub fn media_type(&self) -> String {
        format!("{}/{}", self.r#type, self.sub_type)
    }

    /// View this content type as a media range of quality 1, used to rank
    /// produced types by specificity.
    pub fn to_media_range(&self) -> MediaRange {
        MediaRange {
            r#type: self.r#type.clone(),
            sub_type: self.sub_type.clone(),
            quality: 1.0,
            parameters: self.parameters.clone(),
        }
    }

    /// Header value form, e.g. `application/json;version=1`.
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.r#type, self.sub_type)?;
        for (name, value) in &self.parameters {
            match value {
                Some(v) => write!(f, ";{name}={v}")?,
                None => write!(f, ";{name}")?,
            }
        }
        Ok(())
    }
}

/// A pairing of a request media range with the index of the matched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptMatch {
    /// Index of the matched item in the candidate slice.
    pub item: usize,
    /// Index of the matching range in the accept header.
    pub range: usize,
}

/// A merged `Accept` header: media ranges ordered from most to least
/// preferred.
#[derive(Debug, Clone)]
pub struct Accept {
    ranges: Vec<MediaRange>,
}

impl Accept {
    /// Parse a single `Accept` header value (comma separated ranges).
    pub fn parse(value: &str) -> Result<Self, HttpError> {
        Self::merge(std::iter::once(value))
            .and_then(|merged| merged.ok_or_else(|| HttpError::BadRequest("empty accept header".into())))
    }

    /// Merge any number of `Accept` header values into one, dropping
    /// duplicate ranges and ordering by descending score.
    ///
    /// Returns `None` when no header value contains a range.
    pub fn merge<'a>(values: impl IntoIterator<Item = &'a str>) -> Result<Option<Self>, HttpError> {
        let mut ranges: Vec<MediaRange> = Vec::new();
        for value in values {
            for token in value.split(',') {
                if token.trim().is_empty() {
                    continue;
                }
                let range = MediaRange::parse(token)?;
                if !ranges.contains(&range) {
                    ranges.push(range);
                }
            }
        }
        if ranges.is_empty() {
            return Ok(None);
        }
        ranges.sort_by(|a, b| b.score().cmp(&a.score()));
        Ok(Some(Accept { ranges }))
    }

    /// The catch-all accept header: `*/*`.
    pub fn any() -> Self {
        Accept {
            ranges: vec![MediaRange {
                r#type: "*".to_string(),
                sub_type: "*".to_string(),
                quality: 1.0,
                parameters: MediaParameters::new(),
            }],
        }
    }

    pub fn ranges(&self) -> &[MediaRange] {
        &self.ranges
    }

    /// All matches between this header and the candidate content types,
    /// ordered best first: ranges are iterated by descending preference and
    /// candidates in slice order, so with candidates pre-sorted by
    /// specificity the first match for a range is its best one.
    pub fn find_all_match(&self, candidates: &[ContentType]) -> Vec<AcceptMatch> {
        let mut matches = Vec::new();
        for (range_index, range) in self.ranges.iter().enumerate() {
            for (item_index, candidate) in candidates.iter().enumerate() {
                if range.matches(candidate) {
                    matches.push(AcceptMatch {
                        item: item_index,
                        range: range_index,
                    });
                }
            }
        }
        matches
    }
}

fn split_media_type(media_type: &str) -> Result<(String, String), HttpError> {
    if media_type == "*" {
        return Ok(("*".to_string(), "*".to_string()));
    }
    let mut parts = media_type.splitn(2, '/');
    let r#type = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let sub_type = parts
        .next()
        .ok_or_else(|| HttpError::BadRequest(format!("invalid media type: {media_type}")))?
        .trim()
        .to_ascii_lowercase();
    if r#type.is_empty() || sub_type.is_empty() {
        return Err(HttpError::BadRequest(format!(
            "invalid media type: {media_type}"
        )));
    }
    Ok((r#type, sub_type))
}

fn split_parameter(token: &str) -> Result<(String, Option<String>), HttpError> {
    let mut parts = token.splitn(2, '=');
    let name = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(HttpError::BadRequest(format!(
            "invalid media type parameter: {token}"
        )));
    }
    let value = parts
        .next()
        .map(|v| v.trim().trim_matches('"').to_string());
    Ok((name, value))
}

fn parse_quality(value: Option<&str>) -> Result<f32, HttpError> {
    let raw = value.ok_or_else(|| HttpError::BadRequest("missing q value".into()))?;
    let q: f32 = raw
        .parse()
        .map_err(|_| HttpError::BadRequest(format!("invalid q value: {raw}")))?;
    if !(0.0..=1.0).contains(&q) {
        return Err(HttpError::BadRequest(format!("invalid q value: {raw}")));
    }
    Ok(q)
}
