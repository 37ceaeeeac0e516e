// src/pipeline/daily.rs

//! Daily digest pipeline: collect, persist, publish.
//!
//! This is the only place that decides what a failure means for the run:
//!
//! | Failure                          | Effect                         |
//! |----------------------------------|--------------------------------|
//! | index fetch/parse, record write  | `Err`, run aborts              |
//! | child sitemap fetch/parse        | logged inside the collector    |
//! | no matches                       | `Ok(NoMatches)`                |
//! | publish settings missing         | `Ok(..)` with `Skipped`        |
//! | compose or publish error         | `Ok(..)` with `Failed`         |

use crate::error::Result;
use crate::models::{PostDraft, RunConfig};
use crate::services::{Publisher, PublishReceipt, SitemapCollector, compose};
use crate::storage::{ResultSink, WriteMetadata};
use crate::utils::http::Fetcher;

/// Switches that alter the publish step.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after persisting
    pub skip_publish: bool,
    /// Compose and log the post without sending it
    pub dry_run: bool,
}

/// What happened to the post.
#[derive(Debug, Clone)]
pub enum PublishStatus {
    Published(PublishReceipt),
    Skipped(String),
    Failed(String),
    DryRun(PostDraft),
}

/// What a run did.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing changed on the target date; nothing written
    NoMatches,
    Persisted {
        metadata: WriteMetadata,
        publish: PublishStatus,
    },
}

/// Run the daily pipeline once.
pub async fn run_daily(
    config: &RunConfig,
    fetcher: &dyn Fetcher,
    sink: &dyn ResultSink,
    publisher: Option<&dyn Publisher>,
    options: RunOptions,
) -> Result<RunOutcome> {
    let date = config.target_date.format("%Y-%m-%d");

    log::info!("[STEP 1/3] Crawling {}", config.index_url);
    log::info!("Looking for pages modified on {}", date);
    let matches = SitemapCollector::new(fetcher)
        .collect(&config.index_url, config.target_date)
        .await
        .inspect_err(|e| log::error!("Could not read the sitemap index: {}", e))?;

    if matches.is_empty() {
        log::info!("No pages found updated on {}", date);
        return Ok(RunOutcome::NoMatches);
    }

    log::info!("[STEP 2/3] Saving {} matching entries", matches.len());
    let metadata = sink.write_matches(&matches).await?;

    log::info!("[STEP 3/3] Posting summary");
    let publish = match (&config.publish, options.skip_publish) {
        (_, true) => PublishStatus::Skipped("publishing disabled".into()),
        (None, false) => PublishStatus::Skipped(format!(
            "missing {}",
            config.missing_publish_keys.join(", ")
        )),
        (Some(settings), false) => {
            let link = settings.results_link(&metadata.location);
            match compose(&matches, &link, &settings.hashtag) {
                Err(e) => PublishStatus::Failed(e.to_string()),
                Ok(draft) if options.dry_run => PublishStatus::DryRun(draft),
                Ok(draft) => match publisher {
                    None => PublishStatus::Skipped("no publisher available".into()),
                    Some(publisher) => match publisher.publish(&draft).await {
                        Ok(receipt) => PublishStatus::Published(receipt),
                        Err(e) => PublishStatus::Failed(e.to_string()),
                    },
                },
            }
        }
    };

    match &publish {
        PublishStatus::Published(receipt) => log::info!("Posted to Bluesky: {}", receipt.uri),
        PublishStatus::Skipped(reason) => log::warn!("Skipping Bluesky post: {}", reason),
        PublishStatus::Failed(reason) => log::error!("Failed to post to Bluesky: {}", reason),
        PublishStatus::DryRun(draft) => {
            log::info!("Dry run, not posting ({} bytes):\n{}", draft.byte_len(), draft.text)
        }
    }

    Ok(RunOutcome::Persisted { metadata, publish })
}
