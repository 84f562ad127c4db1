use crate::config::types::{
    ConfigFile, IndexConfig, IndexSection, LoggingConfig, ResolvedConfig, ResolvedSource,
    SourceConfig,
};
use shellexpand::full;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::{cache_dir, home_dir};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("home directory not available to expand '~'")]
    NoHome,

    #[error("source type '{0}' is configured more than once")]
    DuplicateSource(String),

    #[error("invalid value for {0}: must be greater than zero")]
    ZeroValue(&'static str),
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        Self::parse(&s, &path.display().to_string())
    }

    /// Parse and resolve config text; `origin` names it in errors.
    pub fn parse(contents: &str, origin: &str) -> Result<ResolvedConfig, ConfigError> {
        let cf: ConfigFile = toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(origin.to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }

        Ok(ResolvedConfig {
            index: Self::resolve_index(&cf.index)?,
            logging: Self::resolve_logging(&cf.logging)?,
            sources: Self::resolve_sources(&cf.sources)?,
        })
    }

    fn resolve_index(section: &IndexSection) -> Result<IndexConfig, ConfigError> {
        let dir = match &section.dir {
            Some(dir) => expand_path(dir)?,
            None => default_index_dir(),
        };

        let mut index = IndexConfig::new(dir);
        if let Some(v) = section.queue_capacity {
            index.queue_capacity = positive("index.queue_capacity", v)?;
        }
        if let Some(v) = section.ready_timeout_ms {
            index.ready_timeout_ms = v;
        }
        if let Some(v) = section.max_highlights {
            index.max_highlights = positive("index.max_highlights", v)?;
        }
        if let Some(v) = section.writer_memory_bytes {
            index.writer_memory_bytes = positive("index.writer_memory_bytes", v)?;
        }
        if let Some(v) = section.regex_size_limit {
            index.regex_size_limit = positive("index.regex_size_limit", v)?;
        }
        Ok(index)
    }

    fn resolve_logging(log_cfg: &LoggingConfig) -> Result<LoggingConfig, ConfigError> {
        // Resolve log file path if present
        let logging = if let Some(ref file) = log_cfg.file {
            LoggingConfig {
                level: log_cfg.level.clone(),
                file_level: log_cfg.file_level.clone(),
                file: Some(expand_path(&file.to_string_lossy())?),
            }
        } else {
            log_cfg.clone()
        };
        Ok(logging)
    }

    fn resolve_sources(sources: &[SourceConfig]) -> Result<Vec<ResolvedSource>, ConfigError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(sources.len());
        for source in sources {
            if !seen.insert(source.content_type.as_str()) {
                return Err(ConfigError::DuplicateSource(source.content_type.clone()));
            }
            resolved.push(ResolvedSource {
                content_type: source.content_type.clone(),
                root: expand_path(&source.root)?,
                extensions: source.extensions.clone(),
                tags: source.tags.clone(),
            });
        }
        Ok(resolved)
    }
}

fn positive(key: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 { Err(ConfigError::ZeroValue(key)) } else { Ok(value) }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("docfind").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("docfind").join("config.toml")
}

/// Default index location: `~/.cache/docfind/index` or the platform cache dir.
pub fn default_index_dir() -> PathBuf {
    let base = cache_dir()
        .or_else(|| home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(env::temp_dir);
    base.join("docfind").join("index")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DEFAULT_QUEUE_CAPACITY;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = ConfigLoader::parse("version = 1\n", "inline").unwrap();
        assert_eq!(cfg.index.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(cfg.index.ready_timeout_ms, 1_500);
        assert_eq!(cfg.index.max_highlights, 100);
        assert!(cfg.index.dir.ends_with("docfind/index"));
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.sources.is_empty());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = ConfigLoader::parse("version = 1\n[index]\nqueue_capacity = 0\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroValue("index.queue_capacity")));
    }

    #[test]
    fn test_duplicate_source_type_rejected() {
        let toml = r#"
version = 1
[[sources]]
type = "script"
root = "/a"
[[sources]]
type = "script"
root = "/b"
"#;
        let err = ConfigLoader::parse(toml, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSource(t) if t == "script"));
    }
}
