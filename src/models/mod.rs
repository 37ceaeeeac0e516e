// src/models/mod.rs

//! Domain models for the digest application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entry;
mod post;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, LoggingConfig, OutputConfig, PublishConfig, PublishSettings,
    RunConfig, SitemapConfig, default_target_date,
};
pub use entry::{MatchSet, SitemapEntry, parse_lastmod_date};
pub use post::{Facet, FacetFeature, PostDraft};
