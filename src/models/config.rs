//! Application configuration structures.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::services::composer;
use crate::storage::LocalStorage;

/// Root application configuration, as read from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Which sitemap index to walk
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// HTTP client settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Where daily CSV records are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Bluesky posting settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or defaults when the file does not exist.
    ///
    /// The second value is `true` when defaults were used. A file that exists
    /// but cannot be read or parsed is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<(Self, bool)> {
        match Self::load(&path) {
            Ok(config) => Ok((config, false)),
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                Ok((Self::default(), true))
            }
            Err(e) => Err(AppError::config(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            ))),
        }
    }

    /// Default log filter: `debug` when verbose, else `[logging] level`.
    pub fn log_filter(&self, verbose: bool) -> &str {
        if verbose { "debug" } else { &self.logging.level }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let index = Url::parse(&self.sitemap.index_url)?;
        if !matches!(index.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "sitemap.index_url must be http(s), got {}",
                index.scheme()
            )));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.output.dir.trim().is_empty() {
            return Err(AppError::validation("output.dir is empty"));
        }
        Url::parse(&self.publish.service)?;
        if self.publish.branch.trim().is_empty() {
            return Err(AppError::validation("publish.branch is empty"));
        }
        validate_hashtag(&self.publish.hashtag)?;
        if let Some(repo) = self.publish.repository.as_deref().filter(|r| !r.is_empty()) {
            validate_repository(repo)?;
        }
        Ok(())
    }
}

fn validate_hashtag(hashtag: &str) -> Result<()> {
    let name = hashtag.strip_prefix('#').ok_or_else(|| {
        AppError::validation(format!("publish.hashtag must start with '#': {hashtag:?}"))
    })?;
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(AppError::validation(format!(
            "publish.hashtag must be a single non-empty word: {hashtag:?}"
        )));
    }
    Ok(())
}

fn validate_repository(repo: &str) -> Result<()> {
    let mut parts = repo.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(()),
        _ => Err(AppError::validation(format!(
            "repository must look like owner/name: {repo:?}"
        ))),
    }
}

/// Sitemap source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// URL of the sitemap index document
    #[serde(default = "defaults::index_url")]
    pub index_url: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            index_url: defaults::index_url(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Output location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for `YYYY-MM-DD.csv` records, relative to the repository root
    #[serde(default = "defaults::output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

/// Bluesky posting settings.
///
/// Credentials usually come from the environment and are merged in by the binary.
#[derive(Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// PDS base URL
    #[serde(default = "defaults::service")]
    pub service: String,

    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default, skip_serializing)]
    pub app_password: Option<String>,

    /// GitHub `owner/name` hosting the CSV records
    #[serde(default)]
    pub repository: Option<String>,

    /// Branch used in the results link
    #[serde(default = "defaults::branch")]
    pub branch: String,

    #[serde(default = "defaults::hashtag")]
    pub hashtag: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            service: defaults::service(),
            handle: None,
            app_password: None,
            repository: None,
            branch: defaults::branch(),
            hashtag: defaults::hashtag(),
        }
    }
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("service", &self.service)
            .field("handle", &self.handle)
            .field("app_password", &self.app_password.as_ref().map(|_| "<redacted>"))
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("hashtag", &self.hashtag)
            .finish()
    }
}

impl PublishConfig {
    /// Resolve into complete settings, or list the missing keys.
    ///
    /// Keys are reported by their environment variable names.
    pub fn resolve(&self) -> std::result::Result<PublishSettings, Vec<&'static str>> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from)
        }

        let handle = present(&self.handle);
        let app_password = present(&self.app_password);
        let repository = present(&self.repository);

        match (handle, app_password, repository) {
            (Some(handle), Some(app_password), Some(repository)) => Ok(PublishSettings {
                service: self.service.trim_end_matches('/').to_string(),
                handle,
                app_password,
                repository,
                branch: self.branch.clone(),
                hashtag: self.hashtag.clone(),
            }),
            (handle, app_password, repository) => {
                let mut missing = Vec::new();
                if handle.is_none() {
                    missing.push("BLUESKY_HANDLE");
                }
                if app_password.is_none() {
                    missing.push("BLUESKY_APP_PASSWORD");
                }
                if repository.is_none() {
                    missing.push("GITHUB_REPOSITORY");
                }
                Err(missing)
            }
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Complete publish settings for one run.
#[derive(Clone)]
pub struct PublishSettings {
    pub service: String,
    pub handle: String,
    pub app_password: String,
    pub repository: String,
    pub branch: String,
    pub hashtag: String,
}

impl PublishSettings {
    /// Browser link to a stored record inside the GitHub repository.
    pub fn results_link(&self, location: &str) -> String {
        format!(
            "https://github.com/{}/blob/{}/{}",
            self.repository,
            self.branch,
            location.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for PublishSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishSettings")
            .field("service", &self.service)
            .field("handle", &self.handle)
            .field("app_password", &"<redacted>")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("hashtag", &self.hashtag)
            .finish()
    }
}

/// Everything a single run needs, fixed at process start.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target_date: NaiveDate,
    pub index_url: String,
    pub output_dir: PathBuf,
    pub crawler: CrawlerConfig,
    /// `None` when credentials or repository are missing
    pub publish: Option<PublishSettings>,
    /// Keys that prevented `publish` from resolving
    pub missing_publish_keys: Vec<&'static str>,
}

impl RunConfig {
    /// Build the run configuration for `target_date`.
    pub fn new(config: &Config, target_date: NaiveDate) -> Self {
        let (publish, missing_publish_keys) = match config.publish.resolve() {
            Ok(settings) => (Some(settings), Vec::new()),
            Err(missing) => (None, missing),
        };

        Self {
            target_date,
            index_url: config.sitemap.index_url.clone(),
            output_dir: PathBuf::from(&config.output.dir),
            crawler: config.crawler.clone(),
            publish,
            missing_publish_keys,
        }
    }

    /// Repository-relative location of this run's CSV record.
    pub fn record_location(&self) -> String {
        LocalStorage::new(&self.output_dir).record_location(self.target_date)
    }

    /// Check that the post template leaves room for a headline URL.
    ///
    /// Uses a six-digit match count and the longest month name as the worst case.
    pub fn validate(&self) -> Result<()> {
        let Some(publish) = &self.publish else {
            return Ok(());
        };
        let link = publish.results_link(&self.record_location());
        let worst_date = NaiveDate::from_ymd_opt(2000, 9, 30)
            .ok_or_else(|| AppError::config("invalid reference date"))?;
        let overhead = composer::overhead_bytes(999_999, worst_date, &link, &publish.hashtag);
        if overhead + composer::ELLIPSIS.len() > composer::POST_BYTE_LIMIT {
            return Err(AppError::validation(format!(
                "post template needs {overhead} bytes, leaving no room for a URL in {} bytes",
                composer::POST_BYTE_LIMIT
            )));
        }
        Ok(())
    }
}

/// The day before `today`, the default collection date.
pub fn default_target_date(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

mod defaults {
    pub fn index_url() -> String {
        "https://www.mass.gov/sitemap.xml".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; sitemap-digest/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn output_dir() -> String {
        "daily_updates".into()
    }
    pub fn service() -> String {
        "https://bsky.social".into()
    }
    pub fn branch() -> String {
        "main".into()
    }
    pub fn hashtag() -> String {
        "#MassGov".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
