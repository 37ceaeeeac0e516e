// src/services/collector.rs

//! Sitemap collector service.
//!
//! Walks a sitemap index and gathers the pages modified on one date.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::MatchSet;
use crate::services::sitemap::{parse_sitemap_index, parse_urlset};
use crate::utils::http::Fetcher;
use crate::utils::resolve;

/// Counters for one collection pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectStats {
    pub sitemap_total: usize,
    pub sitemap_failures: usize,
    pub urls_scanned: usize,
    pub unreadable_lastmod: usize,
}

/// Service that collects sitemap entries modified on a target date.
pub struct SitemapCollector<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> SitemapCollector<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Collect every entry whose `<lastmod>` date equals `target_date`.
    ///
    /// Fails only when the index itself cannot be fetched or parsed. A child
    /// sitemap that fails is logged and skipped. Children are visited in index
    /// order, one at a time.
    pub async fn collect(&self, index_url: &str, target_date: NaiveDate) -> Result<MatchSet> {
        let (matches, stats) = self.collect_with_stats(index_url, target_date).await?;
        log::info!(
            "Crawl complete: {} matches from {} URLs in {} sitemaps ({} failed)",
            matches.len(),
            stats.urls_scanned,
            stats.sitemap_total,
            stats.sitemap_failures
        );
        Ok(matches)
    }

    /// Like [`collect`](Self::collect), also returning the pass counters.
    pub async fn collect_with_stats(
        &self,
        index_url: &str,
        target_date: NaiveDate,
    ) -> Result<(MatchSet, CollectStats)> {
        let index = self.fetcher.fetch(index_url).await?;
        let children: Vec<String> = parse_sitemap_index(&index)?
            .iter()
            .map(|loc| resolve(index_url, loc))
            .collect();

        log::info!("Found {} individual sitemaps to crawl", children.len());

        let mut stats = CollectStats {
            sitemap_total: children.len(),
            ..CollectStats::default()
        };
        let mut matches = MatchSet::new(target_date);

        for child in &children {
            let entries = match self.fetch_child(child).await {
                Ok(entries) => entries,
                Err(error) => {
                    stats.sitemap_failures += 1;
                    if error.is_parse_error() {
                        log::warn!("Skipping sitemap {}: unparsable XML: {}", child, error);
                    } else {
                        log::warn!("Skipping sitemap {}: could not fetch: {}", child, error);
                    }
                    continue;
                }
            };

            stats.urls_scanned += entries.len();
            for entry in entries {
                match entry.modified_on() {
                    Some(date) if date == target_date => {
                        log::info!("Match found: {}", entry.url);
                        matches.push(entry);
                    }
                    Some(_) => {}
                    None => {
                        stats.unreadable_lastmod += 1;
                        log::debug!(
                            "Unreadable lastmod {:?} for {}",
                            entry.last_modified,
                            entry.url
                        );
                    }
                }
            }
        }

        Ok((matches, stats))
    }

    async fn fetch_child(&self, url: &str) -> Result<Vec<crate::models::SitemapEntry>> {
        let body = self.fetcher.fetch(url).await?;
        parse_urlset(&body)
    }
}
