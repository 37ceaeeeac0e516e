//! Sitemap Digest CLI
//!
//! Batch entry point, meant to run once a day (e.g. from a scheduled CI job).

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use sitemap_digest::{
    error::Result,
    models::{Config, RunConfig, default_target_date},
    pipeline::{self, PublishStatus, RunOptions, RunOutcome},
    services::{BlueskyPublisher, Publisher},
    storage::LocalStorage,
    utils::http::{self, HttpFetcher},
};

/// Sitemap Digest - daily sitemap changes, recorded and posted
#[derive(Parser, Debug)]
#[command(
    name = "sitemap-digest",
    version,
    about = "Finds pages updated on a given day in a sitemap index and posts a digest"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bluesky handle used to log in
    #[arg(long, env = "BLUESKY_HANDLE", global = true)]
    handle: Option<String>,

    /// Bluesky app password
    #[arg(long, env = "BLUESKY_APP_PASSWORD", hide_env_values = true, global = true)]
    app_password: Option<String>,

    /// GitHub repository (`owner/name`) holding the daily records
    #[arg(long, env = "GITHUB_REPOSITORY", global = true)]
    repository: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect, save, and post the digest for one day
    Run {
        /// Target date as YYYY-MM-DD (default: yesterday)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Override the sitemap index URL
        #[arg(long)]
        index_url: Option<String>,

        /// Override the output directory
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Save results but do not post
        #[arg(long)]
        no_publish: bool,

        /// Compose the post and print it instead of sending
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging with the given default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, defaulted) = Config::load_or_default(&cli.config)?;
    init_logging(config.log_filter(cli.verbose));
    if defaulted {
        log::warn!("Config file {:?} not found. Using defaults.", cli.config);
    }

    // Credentials from the environment take precedence over the file.
    if let Some(handle) = cli.handle {
        config.publish.handle = Some(handle);
    }
    if let Some(app_password) = cli.app_password {
        config.publish.app_password = Some(app_password);
    }
    if let Some(repository) = cli.repository {
        config.publish.repository = Some(repository);
    }

    match cli.command {
        Command::Run {
            date,
            index_url,
            output_dir,
            no_publish,
            dry_run,
        } => {
            if let Some(url) = index_url {
                config.sitemap.index_url = url;
            }
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            config.validate()?;

            let target_date =
                date.unwrap_or_else(|| default_target_date(Local::now().date_naive()));
            let run_config = RunConfig::new(&config, target_date);
            run_config.validate()?;

            let client = http::create_async_client(&run_config.crawler)?;
            let fetcher = HttpFetcher::new(client.clone());
            let storage = LocalStorage::new(&run_config.output_dir);
            let publisher = run_config
                .publish
                .as_ref()
                .map(|settings| BlueskyPublisher::new(client, settings));

            let options = RunOptions {
                skip_publish: no_publish,
                dry_run,
            };
            let outcome = pipeline::run_daily(
                &run_config,
                &fetcher,
                &storage,
                publisher.as_ref().map(|p| p as &dyn Publisher),
                options,
            )
            .await?;

            match outcome {
                RunOutcome::NoMatches => log::info!("Nothing to record for {}", target_date),
                RunOutcome::Persisted { metadata, publish } => {
                    log::info!("Record: {} ({} rows)", metadata.location, metadata.row_count);
                    if let PublishStatus::DryRun(draft) = publish {
                        println!("{}", draft.text);
                    }
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            config.validate()?;
            let target_date = default_target_date(Local::now().date_naive());
            let run_config = RunConfig::new(&config, target_date);
            run_config.validate()?;
            log::info!("✓ Config OK (index: {})", run_config.index_url);

            if run_config.publish.is_none() {
                log::warn!(
                    "Publishing disabled, missing: {}",
                    run_config.missing_publish_keys.join(", ")
                );
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
