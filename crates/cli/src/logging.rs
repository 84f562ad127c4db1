use docfind_core::config::LoggingConfig;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Install the stderr layer and, when `cfg.file` is set, a file layer with
/// its own level. `RUST_LOG` directives override both defaults.
pub fn init(cfg: &LoggingConfig) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_filter(env_filter(&cfg.level, LevelFilter::INFO));
    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some(path) = cfg.file.as_deref() else {
        registry.init();
        return;
    };

    let file_level = cfg.file_level.as_deref().unwrap_or(&cfg.level);
    let (writer, guard) = tracing_appender::non_blocking(open_log_file(path));
    if let Ok(mut slot) = LOG_GUARD.lock() {
        *slot = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter(file_level, LevelFilter::DEBUG));
    registry.with(file_layer).init();
}

/// Flush buffered file output before the process exits.
pub fn finish() {
    if let Ok(mut slot) = LOG_GUARD.lock() {
        slot.take();
    }
}

fn env_filter(level: &str, fallback: LevelFilter) -> EnvFilter {
    let level = parse_level(level).unwrap_or(fallback);
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}

/// Logging is not up yet, so failures go straight to stderr.
fn open_log_file(path: &Path) -> File {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {}", parent.display(), e);
        }
    }
    File::create(path).unwrap_or_else(|e| {
        eprintln!("Failed to create log file {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    s.trim().parse().ok()
}
