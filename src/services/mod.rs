//! Service layer for the digest application.
//!
//! This module contains the business logic for:
//! - Sitemap parsing (`sitemap`)
//! - Date-filtered collection across a sitemap index (`SitemapCollector`)
//! - Post text and facet composition (`compose`)
//! - Posting to Bluesky (`BlueskyPublisher`)

mod bluesky;
mod collector;
pub mod composer;
pub mod sitemap;

pub use bluesky::{BlueskyPublisher, PublishReceipt, Publisher};
pub use collector::{CollectStats, SitemapCollector};
pub use composer::compose;
