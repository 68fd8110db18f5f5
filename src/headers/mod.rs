//! Header codecs for the negotiated routing dimensions.
//!
//! Covers `Content-Type`, `Accept` and `Accept-Language` as defined by RFC
//! 7231: parsing, merging multiple header instances, specificity scoring and
//! range matching. The scores drive both the ordering of link children
//! (most specific first) and the preference order of request ranges.

mod language_range;
mod media_range;

pub use language_range::{AcceptLanguage, LanguageMatch, LanguageRange};
pub use media_range::{Accept, AcceptMatch, ContentType, MediaParameters, MediaRange};
