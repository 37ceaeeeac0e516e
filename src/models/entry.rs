// src/models/entry.rs

//! Sitemap entries and the per-day match set.

use chrono::NaiveDate;
use serde::Serialize;

/// A single `<url>` record taken from a child sitemap.
///
/// Serializes as one row of the daily CSV record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Page address from `<loc>`
    #[serde(rename = "URL")]
    pub url: String,

    /// Raw `<lastmod>` text, e.g. `2026-10-17` or `2026-10-17T08:15:00-04:00`
    #[serde(rename = "Last Modified")]
    pub last_modified: String,
}

impl SitemapEntry {
    pub fn new(url: impl Into<String>, last_modified: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            last_modified: last_modified.into(),
        }
    }

    /// Calendar date the page was last modified, if `<lastmod>` is readable.
    pub fn modified_on(&self) -> Option<NaiveDate> {
        parse_lastmod_date(&self.last_modified)
    }
}

/// Extract the date part of a W3C datetime.
///
/// Time of day and timezone offset are ignored, so `2026-10-17` and
/// `2026-10-17T23:59:59+09:00` both yield 2026-10-17. Reduced precision
/// forms (`2026`, `2026-10`) carry no day and yield `None`.
pub fn parse_lastmod_date(lastmod: &str) -> Option<NaiveDate> {
    let date_part = lastmod.trim().split(['T', 't', ' ']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Entries modified on one target date, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    target_date: NaiveDate,
    entries: Vec<SitemapEntry>,
}

impl MatchSet {
    /// Create an empty match set for the given date.
    pub fn new(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            entries: Vec::new(),
        }
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    /// Append an entry if it has a URL and was modified on the target date.
    ///
    /// Returns `false` and drops the entry otherwise.
    pub fn push(&mut self, entry: SitemapEntry) -> bool {
        if entry.url.trim().is_empty() || entry.modified_on() != Some(self.target_date) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry featured in the post headline: whichever was discovered first.
    pub fn first(&self) -> Option<&SitemapEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SitemapEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a SitemapEntry;
    type IntoIter = std::slice::Iter<'a, SitemapEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_lastmod_date_only() {
        assert_eq!(parse_lastmod_date("2026-10-17"), Some(date("2026-10-17")));
    }

    #[test]
    fn test_parse_lastmod_full_timestamp() {
        assert_eq!(
            parse_lastmod_date("2026-10-17T14:03:22-04:00"),
            Some(date("2026-10-17"))
        );
        assert_eq!(
            parse_lastmod_date("2026-10-17T23:59:59Z"),
            Some(date("2026-10-17"))
        );
        assert_eq!(
            parse_lastmod_date("  2026-10-17 08:00:00 "),
            Some(date("2026-10-17"))
        );
    }

    #[test]
    fn test_parse_lastmod_rejects_partial_dates() {
        assert_eq!(parse_lastmod_date("2026-10"), None);
        assert_eq!(parse_lastmod_date("2026"), None);
        assert_eq!(parse_lastmod_date("yesterday"), None);
        assert_eq!(parse_lastmod_date(""), None);
    }

    #[test]
    fn test_match_set_only_accepts_target_date() {
        let mut matches = MatchSet::new(date("2026-10-17"));

        assert!(matches.push(SitemapEntry::new("https://a.example/1", "2026-10-17")));
        assert!(!matches.push(SitemapEntry::new("https://a.example/2", "2026-10-16T23:59:59")));
        assert!(!matches.push(SitemapEntry::new("https://a.example/3", "not a date")));
        assert!(matches.push(SitemapEntry::new(
            "https://a.example/4",
            "2026-10-17T00:00:01+00:00"
        )));

        let urls: Vec<&str> = matches.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/1", "https://a.example/4"]);
        assert_eq!(matches.first().map(|e| e.url.as_str()), Some("https://a.example/1"));
    }

    #[test]
    fn test_match_set_rejects_empty_url() {
        let mut matches = MatchSet::new(date("2026-10-17"));

        assert!(!matches.push(SitemapEntry::new("", "2026-10-17")));
        assert!(!matches.push(SitemapEntry::new("  ", "2026-10-17")));
        assert!(matches.is_empty());
        assert!(matches.first().is_none());
    }
}
