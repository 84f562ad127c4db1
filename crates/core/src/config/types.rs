use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 1_500;
pub const DEFAULT_MAX_HIGHLIGHTS: usize = 100;
pub const DEFAULT_WRITER_MEMORY_BYTES: usize = 50_000_000;
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1_000_000;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub index: IndexSection,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// `[index]` as written in the config file.
#[derive(Debug, Deserialize, Default)]
pub struct IndexSection {
    /// Index directory; defaults to the user cache directory.
    pub dir: Option<String>,
    pub queue_capacity: Option<usize>,
    pub ready_timeout_ms: Option<u64>,
    pub max_highlights: Option<usize>,
    pub writer_memory_bytes: Option<usize>,
    pub regex_size_limit: Option<usize>,
}

/// One `[[sources]]` entry: a directory tree indexed as one content type.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub content_type: String,
    pub root: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Engine settings with every default applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexConfig {
    pub dir: PathBuf,
    /// Bound of the event queue; producers block when it is full.
    pub queue_capacity: usize,
    /// How long a request waits for bootstrap before failing as not ready.
    pub ready_timeout_ms: u64,
    pub max_highlights: usize,
    pub writer_memory_bytes: usize,
    /// Compiled size ceiling for regex queries, in bytes.
    pub regex_size_limit: usize,
}

impl IndexConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            max_highlights: DEFAULT_MAX_HIGHLIGHTS,
            writer_memory_bytes: DEFAULT_WRITER_MEMORY_BYTES,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub content_type: String,
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub index: IndexConfig,
    pub logging: LoggingConfig,
    pub sources: Vec<ResolvedSource>,
}
