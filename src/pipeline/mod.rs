//! Pipeline entry points.
//!
//! - `run_daily`: collect yesterday's sitemap changes, save them, post a digest

pub mod daily;

pub use daily::{PublishStatus, RunOptions, RunOutcome, run_daily};
