use crate::error::HttpError;
use std::fmt;

/// A language range from an `Accept-Language` header as defined by RFC 7231
/// section 5.3.5, e.g. `fr-FR;q=0.7` or `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    /// Primary sub-tag, lowercased; `*` for the catch-all range.
    pub primary: String,
    /// Secondary sub-tag, lowercased.
    pub secondary: Option<String>,
    pub quality: f32,
}

impl LanguageRange {
    /// Parse a single language range.
    pub fn parse(value: &str) -> Result<Self, HttpError> {
        let mut tokens = value.split(';');
        let tag = tokens.next().unwrap_or("").trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Err(HttpError::BadRequest("empty language tag".into()));
        }

        let mut quality = 1.0f32;
        for token in tokens {
            let mut parts = token.splitn(2, '=');
            let name = parts.next().unwrap_or("").trim().to_ascii_lowercase();
            if name == "q" {
                let raw = parts
                    .next()
                    .ok_or_else(|| HttpError::BadRequest("missing q value".into()))?
                    .trim();
                quality = raw
                    .parse()
                    .map_err(|_| HttpError::BadRequest(format!("invalid q value: {raw}")))?;
                if !(0.0..=1.0).contains(&quality) {
                    return Err(HttpError::BadRequest(format!("invalid q value: {raw}")));
                }
            }
        }

        let mut sub_tags = tag.splitn(2, '-');
        let primary = sub_tags.next().unwrap_or("").to_string();
        let secondary = sub_tags.next().map(str::to_string);
        if primary.is_empty() || secondary.as_deref() == Some("") {
            return Err(HttpError::BadRequest(format!("invalid language tag: {tag}")));
        }
        if primary == "*" && secondary.is_some() {
            return Err(HttpError::BadRequest(format!("invalid language tag: {tag}")));
        }
        Ok(LanguageRange {
            primary,
            secondary,
            quality,
        })
    }

    /// The full language tag, e.g. `fr-fr` or `*`.
    pub fn tag(&self) -> String {
        match &self.secondary {
            Some(secondary) => format!("{}-{}", self.primary, secondary),
            None => self.primary.clone(),
        }
    }

    /// Whether this is the catch-all `*` range.
    pub fn is_any(&self) -> bool {
        self.primary == "*"
    }

    /// Specificity score: 1000 times the quality plus a tier for the tag
    /// shape (`*` 0, `xx` 10, `xx-xx` 20).
    pub fn score(&self) -> i32 {
        let mut score = (self.quality * 1000.0) as i32;
        if self.primary != "*" {
            score += if self.secondary.is_some() { 20 } else { 10 };
        }
        score
    }

    /// Whether the given range is reachable through this one: `*` matches
    /// everything, a primary tag matches itself with any secondary, a full
    /// tag requires the same primary and a compatible secondary.
    pub fn matches(&self, other: &LanguageRange) -> bool {
        if other.primary == "*" {
            return true;
        }
        let primary_ok = self.primary == "*" || self.primary == other.primary;
        match &other.secondary {
            None => primary_ok,
            Some(secondary) => {
                primary_ok
                    && self
                        .secondary
                        .as_ref()
                        .map(|s| s == secondary)
                        .unwrap_or(true)
            }
        }
    }
}

impl fmt::Display for LanguageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())?;
        if self.quality != 1.0 {
            write!(f, ";q={}", self.quality)?;
        }
        Ok(())
    }
}

/// A pairing of a request language range with the index of the matched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageMatch {
    pub item: usize,
    pub range: usize,
}

/// A merged `Accept-Language` header.
#[derive(Debug, Clone)]
pub struct AcceptLanguage {
    ranges: Vec<LanguageRange>,
}

impl AcceptLanguage {
    pub fn parse(value: &str) -> Result<Self, HttpError> {
        Self::merge(std::iter::once(value)).and_then(|merged| {
            merged.ok_or_else(|| HttpError::BadRequest("empty accept-language header".into()))
        })
    }

    /// Merge any number of `Accept-Language` header values, dropping
    /// duplicates and ordering by descending score.
    pub fn merge<'a>(values: impl IntoIterator<Item = &'a str>) -> Result<Option<Self>, HttpError> {
        let mut ranges: Vec<LanguageRange> = Vec::new();
        for value in values {
            for token in value.split(',') {
                if token.trim().is_empty() {
                    continue;
                }
                let range = LanguageRange::parse(token)?;
                if !ranges.contains(&range) {
                    ranges.push(range);
                }
            }
        }
        if ranges.is_empty() {
            return Ok(None);
        }
        ranges.sort_by(|a, b| b.score().cmp(&a.score()));
        Ok(Some(AcceptLanguage { ranges }))
    }

    /// The catch-all header: `*`.
    pub fn any() -> Self {
        AcceptLanguage {
            ranges: vec![LanguageRange {
                primary: "*".to_string(),
                secondary: None,
                quality: 1.0,
            }],
        }
    }

    pub fn ranges(&self) -> &[LanguageRange] {
        &self.ranges
    }

    /// All matches against the candidate ranges ordered best first. An exact
    /// tag match outranks a wildcard-mediated one, then the candidate's own
    /// specificity decides.
    pub fn find_all_match(&self, candidates: &[LanguageRange]) -> Vec<LanguageMatch> {
        let mut scored: Vec<(i32, LanguageMatch)> = Vec::new();
        for (range_index, range) in self.ranges.iter().enumerate() {
            for (item_index, candidate) in candidates.iter().enumerate() {
                if range.matches(candidate) {
                    let score = if range.tag() == candidate.tag() {
                        100_000 + candidate.score()
                    } else {
                        10_000 + candidate.score()
                    };
                    scored.push((
                        score,
                        LanguageMatch {
                            item: item_index,
                            range: range_index,
                        },
                    ));
                }
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, m)| m).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let range = LanguageRange::parse("fr-FR;q=0.7").unwrap();
        assert_eq!(range.primary, "fr");
        assert_eq!(range.secondary.as_deref(), Some("fr"));
        assert_eq!(range.quality, 0.7);
        assert_eq!(range.tag(), "fr-fr");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(LanguageRange::parse("").is_err());
        assert!(LanguageRange::parse("fr-").is_err());
        assert!(LanguageRange::parse("*-FR").is_err());
        assert!(LanguageRange::parse("en;q=3").is_err());
    }

    #[test]
    fn test_matches() {
        let any = LanguageRange::parse("*").unwrap();
        let fr = LanguageRange::parse("fr").unwrap();
        let fr_fr = LanguageRange::parse("fr-FR").unwrap();
        let en = LanguageRange::parse("en").unwrap();
        assert!(any.matches(&fr));
        assert!(fr.matches(&fr_fr));
        assert!(fr_fr.matches(&fr));
        assert!(!en.matches(&fr_fr));
    }

    #[test]
    fn test_score_ordering() {
        assert!(
            LanguageRange::parse("fr-FR").unwrap().score()
                > LanguageRange::parse("fr").unwrap().score()
        );
        assert!(
            LanguageRange::parse("fr").unwrap().score() > LanguageRange::parse("*").unwrap().score()
        );
    }

    #[test]
    fn test_find_all_match_prefers_exact() {
        let accept = AcceptLanguage::parse("fr-FR, en;q=0.5").unwrap();
        let candidates = vec![
            LanguageRange::parse("en").unwrap(),
            LanguageRange::parse("fr-FR").unwrap(),
            LanguageRange::parse("fr").unwrap(),
        ];
        let matches = accept.find_all_match(&candidates);
        assert_eq!(matches[0].item, 1);
        // fr-FR covers plain fr with a wildcard-mediated score, en is exact
        assert_eq!(matches[1].item, 0);
        assert_eq!(matches[2].item, 2);
    }

    #[test]
    fn test_merge_empty() {
        assert!(AcceptLanguage::merge([]).unwrap().is_none());
    }
}
