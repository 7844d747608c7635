//! Configuration management for the Algolia client.
//!
//! Supports configuration via CLI arguments, environment variables,
//! and JSON configuration files with sensible defaults.

use crate::error::{AlgoliaError, Result};
use crate::host::Accept;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments for the `algolia` binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "algolia",
    author = "Yiğit Konur <yigit@wope.com>",
    version,
    about = "Command-line client for the Algolia Search and Analytics APIs",
    long_about = "Talks to Algolia over its REST APIs with automatic host failover.\n\n\
                  Records are imported in batches, exported through the browse cursor,\n\
                  and indexing tasks can be awaited until they are published.",
    after_help = "EXAMPLES:\n    \
        algolia search products \"running shoes\"\n    \
        algolia import products --input records.jsonl --wait\n    \
        algolia export products --output dump.jsonl\n    \
        algolia top-searches products --region de --limit 20"
)]
pub struct Args {
    /// Algolia application ID
    #[arg(long, env = "ALGOLIA_APP_ID")]
    pub app_id: Option<String>,

    /// Algolia API key
    #[arg(long, env = "ALGOLIA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to a client configuration file (JSON)
    #[arg(short, long, env = "ALGOLIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read timeout in seconds
    #[arg(short, long, env = "ALGOLIA_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, env = "ALGOLIA_VERBOSE")]
    pub verbose: bool,

    /// Output logs as JSON
    #[arg(long, env = "ALGOLIA_JSON_LOGS")]
    pub json_logs: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `algolia` binary.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a search query against an index
    Search {
        /// Index name
        index: String,
        /// Query string
        query: String,
        /// Number of hits per page
        #[arg(long, default_value = "20")]
        hits_per_page: u32,
    },

    /// Import records from a JSONL file
    Import {
        /// Index name
        index: String,
        /// Path to the JSONL file containing records
        #[arg(short, long)]
        input: PathBuf,
        /// Records per batch (overrides the configured batch size)
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Let the engine generate objectIDs for records that have none
        #[arg(long)]
        auto_generate_object_ids: bool,
        /// Attribute to copy into objectID, for records keyed by another field
        #[arg(long, value_name = "ATTRIBUTE")]
        object_id_key: Option<String>,
        /// Atomically replace every record of the index
        #[arg(long)]
        replace: bool,
        /// Wait for the indexing tasks to be published
        #[arg(long)]
        wait: bool,
        /// Disable progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Export every record of an index into a JSONL file
    Export {
        /// Index name
        index: String,
        /// Path of the JSONL file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the settings of an index
    Settings {
        /// Index name
        index: String,
    },

    /// Wait until an indexing task is published
    WaitTask {
        /// Index name
        index: String,
        /// Task identifier returned by a write operation
        task_id: i64,
    },

    /// Show the most frequent searches of an index
    TopSearches {
        /// Index name
        index: String,
        /// Analytics region
        #[arg(long, value_enum)]
        region: Option<Region>,
        /// Number of searches to return
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

impl Args {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Data-center region of the Analytics, Insights and Personalization APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// United States.
    Us,
    /// Germany.
    De,
    /// Europe.
    Eu,
}

impl Region {
    /// Host fragment for this region.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::De => "de",
            Self::Eu => "eu",
        }
    }

    /// Fail unless this region is one of `allowed`.
    pub fn ensure_allowed(self, allowed: &[Region]) -> Result<Self> {
        if allowed.contains(&self) {
            Ok(self)
        } else {
            let names: Vec<_> = allowed.iter().map(|r| r.as_str()).collect();
            Err(AlgoliaError::InvalidConfig(format!(
                "region '{self}' is not supported, expected one of: {}",
                names.join(", ")
            )))
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single API host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host name, without scheme.
    pub url: String,

    /// URL scheme.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Port, when not the scheme default.
    #[serde(default)]
    pub port: Option<u16>,

    /// Which kinds of calls this host serves.
    #[serde(default)]
    pub accept: Accept,
}

fn default_scheme() -> String {
    "https".to_string()
}

impl HostConfig {
    /// An HTTPS host serving reads and writes.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scheme: default_scheme(),
            port: None,
            accept: Accept::ReadWrite,
        }
    }

    /// Restrict the call types this host serves.
    #[must_use]
    pub fn with_accept(mut self, accept: Accept) -> Self {
        self.accept = accept;
        self
    }

    /// Build a host from a full base URL such as `http://127.0.0.1:8080`.
    pub fn from_base_url(base: &str) -> Result<Self> {
        let parsed = reqwest::Url::parse(base)
            .map_err(|e| AlgoliaError::InvalidConfig(format!("invalid host URL '{base}': {e}")))?;
        let host = parsed.host_str().ok_or_else(|| {
            AlgoliaError::InvalidConfig(format!("host URL '{base}' has no host"))
        })?;

        Ok(Self {
            url: host.to_string(),
            scheme: parsed.scheme().to_string(),
            port: parsed.port(),
            accept: Accept::ReadWrite,
        })
    }

    /// Base URL, e.g. `https://APPID-dsn.algolia.net`.
    #[must_use]
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.url, port),
            None => format!("{}://{}", self.scheme, self.url),
        }
    }
}

/// Full client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Algolia application ID.
    pub app_id: String,

    /// Algolia API key.
    pub api_key: String,

    /// Explicit hosts; when empty the API's default cluster is used.
    #[serde(default)]
    pub hosts: Vec<HostConfig>,

    /// Region for the regional APIs.
    #[serde(default)]
    pub region: Option<Region>,

    /// Timeout settings.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// How long a failed host stays deprioritized.
    #[serde(with = "humantime_serde", default = "default_host_cooldown")]
    pub host_cooldown: Duration,

    /// Maximum number of operations per batch request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Task polling settings.
    #[serde(default)]
    pub wait: WaitConfig,

    /// Headers sent with every request.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,

    /// Client-side request rate limit, in requests per second.
    #[serde(default)]
    pub rate_limit: Option<u32>,

    /// Default `forwardToReplicas` for settings, synonyms and rules writes.
    #[serde(default)]
    pub default_forward_to_replicas: Option<bool>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// TCP connect timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect: Duration,

    /// Base timeout of read calls.
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read: Duration,

    /// Base timeout of write calls.
    #[serde(with = "humantime_serde", default = "default_write_timeout")]
    pub write: Duration,

    /// Upper bound for one logical request across every host.
    #[serde(with = "humantime_serde::option", default)]
    pub total: Option<Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: default_connect_timeout(),
            read: default_read_timeout(),
            write: default_write_timeout(),
            total: None,
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_write_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_host_cooldown() -> Duration {
    Duration::from_secs(300)
}

fn default_batch_size() -> usize {
    1000
}

/// Task polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Base delay between polls; poll `n` waits `n / 10` of it.
    #[serde(with = "humantime_serde", default = "default_time_before_retry")]
    pub time_before_retry: Duration,

    /// Ceiling for the delay between polls.
    #[serde(with = "humantime_serde", default = "default_max_delay")]
    pub max_delay: Duration,

    /// Give up after this many polls; `None` polls until published.
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            time_before_retry: default_time_before_retry(),
            max_delay: default_max_delay(),
            max_retries: None,
        }
    }
}

fn default_time_before_retry() -> Duration {
    Duration::from_millis(100)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(5)
}

impl WaitConfig {
    /// Delay before poll number `retry` (the first poll is immediate).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = self.time_before_retry * retry / 10;
        delay.min(self.max_delay)
    }
}

impl ClientConfig {
    /// Create a configuration with default settings.
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            hosts: vec![],
            region: None,
            timeouts: TimeoutConfig::default(),
            host_cooldown: default_host_cooldown(),
            batch_size: default_batch_size(),
            wait: WaitConfig::default(),
            default_headers: HashMap::new(),
            rate_limit: None,
            default_forward_to_replicas: None,
        }
    }

    /// Replace the default cluster with explicit hosts.
    #[must_use]
    pub fn with_hosts(mut self, hosts: Vec<HostConfig>) -> Self {
        self.hosts = hosts;
        self
    }

    /// Set the region used by the regional APIs.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Load configuration from a file.
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AlgoliaError::InputFileRead {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| AlgoliaError::JsonParse { line: 0, source: e })
    }

    /// Build configuration from `ALGOLIA_APP_ID` and `ALGOLIA_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let app_id = std::env::var("ALGOLIA_APP_ID")
            .map_err(|_| AlgoliaError::InvalidConfig("ALGOLIA_APP_ID is not set".to_string()))?;
        let api_key = std::env::var("ALGOLIA_API_KEY")
            .map_err(|_| AlgoliaError::InvalidConfig("ALGOLIA_API_KEY is not set".to_string()))?;

        let config = Self::new(app_id, api_key);
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config {
            Self::from_file(config_path)?
        } else {
            Self::new(String::new(), String::new())
        };

        // Override with CLI args
        if let Some(app_id) = &args.app_id {
            config.app_id.clone_from(app_id);
        }
        if let Some(api_key) = &args.api_key {
            config.api_key.clone_from(api_key);
        }
        if let Some(timeout) = args.timeout {
            config.timeouts.read = Duration::from_secs(timeout);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(AlgoliaError::InvalidConfig(
                "application ID cannot be empty".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(AlgoliaError::InvalidConfig(
                "API key cannot be empty".to_string(),
            ));
        }

        for host in &self.hosts {
            if host.url.is_empty() {
                return Err(AlgoliaError::InvalidConfig(
                    "host URL cannot be empty".to_string(),
                ));
            }
        }

        if self.batch_size == 0 {
            return Err(AlgoliaError::InvalidConfig(
                "batch size must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit == Some(0) {
            return Err(AlgoliaError::InvalidConfig(
                "rate limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the rate limit as a `NonZeroU32`, if one is configured.
    #[must_use]
    pub fn rate_limit_nonzero(&self) -> Option<NonZeroU32> {
        self.rate_limit.and_then(NonZeroU32::new)
    }
}

/// Custom serde module for humantime Duration parsing.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    /// Parse "30s", "100ms", or just seconds as number.
    fn parse(s: &str) -> Result<Duration, std::num::ParseIntError> {
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>().map(Duration::from_millis)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>().map(Duration::from_secs)
        } else {
            s.parse::<u64>().map(Duration::from_secs)
        }
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
