// src/models/post.rs

//! Post draft and rich-text facets.

use serde::{Deserialize, Serialize};

/// What a facet does when the reader taps it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    /// Navigates to `uri`
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },

    /// Searches for `tag` (without the leading `#`)
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

/// A byte range of the post text annotated with a feature.
///
/// Offsets are into the UTF-8 encoding of the final text; `byte_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub byte_start: usize,
    pub byte_end: usize,
    pub feature: FacetFeature,
}

impl Facet {
    pub fn link(range: std::ops::Range<usize>, uri: impl Into<String>) -> Self {
        Self {
            byte_start: range.start,
            byte_end: range.end,
            feature: FacetFeature::Link { uri: uri.into() },
        }
    }

    pub fn tag(range: std::ops::Range<usize>, tag: impl Into<String>) -> Self {
        Self {
            byte_start: range.start,
            byte_end: range.end,
            feature: FacetFeature::Tag { tag: tag.into() },
        }
    }

    /// Slice of `text` this facet covers, if the range is valid for it.
    pub fn anchor<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.byte_start..self.byte_end)
    }
}

/// A composed post ready for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub facets: Vec<Facet>,
}

impl PostDraft {
    /// Length of the body as the posting service counts it.
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_serializes_with_lexicon_type() {
        let link = serde_json::to_value(FacetFeature::Link {
            uri: "https://example.com".into(),
        })
        .unwrap();
        assert_eq!(link["$type"], "app.bsky.richtext.facet#link");
        assert_eq!(link["uri"], "https://example.com");

        let tag = serde_json::to_value(FacetFeature::Tag { tag: "MassGov".into() }).unwrap();
        assert_eq!(tag["$type"], "app.bsky.richtext.facet#tag");
        assert_eq!(tag["tag"], "MassGov");
    }

    #[test]
    fn test_anchor_rejects_split_code_point() {
        let text = "é!";
        assert_eq!(Facet::tag(0..2, "x").anchor(text), Some("é"));
        assert_eq!(Facet::tag(0..1, "x").anchor(text), None);
    }
}
