//! Subcommand implementations and the setup they share.

pub mod doctor;
pub mod find;
pub mod highlights;
pub mod output;
pub mod reindex;
pub mod status;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use docfind_core::ContentIndexEngine;
use docfind_core::config::{ConfigLoader, ResolvedConfig};
use docfind_core::content::{DirectoryProvider, ProviderRegistry};

use crate::logging;

/// Load configuration and start logging, exiting on failure.
pub fn load_config(config: Option<&Path>) -> ResolvedConfig {
    let rc = match ConfigLoader::load(config) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&rc.logging);
    rc
}

/// One directory provider per configured source.
pub fn build_providers(rc: &ResolvedConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for source in &rc.sources {
        match DirectoryProvider::new(
            &source.content_type,
            &source.root,
            source.extensions.clone(),
            source.tags.clone(),
        ) {
            Ok(provider) => registry.register(Arc::new(provider)),
            Err(e) => {
                eprintln!("Error opening source '{}': {}", source.content_type, e);
                exit(1);
            }
        }
    }
    registry
}

/// Build the engine and wait up to `wait_secs` for its index.
pub fn open_engine(rc: &ResolvedConfig, wait_secs: u64) -> ContentIndexEngine {
    if rc.sources.is_empty() {
        tracing::warn!("No sources configured; the index will be empty");
    }

    let engine = ContentIndexEngine::new(rc.index.clone(), build_providers(rc));
    if let Err(e) = engine.await_ready(Duration::from_secs(wait_secs)) {
        eprintln!("Error building index: {}", e);
        engine.shutdown();
        exit(1);
    }
    engine
}

/// Exit after flushing any file logger.
pub fn exit(code: i32) -> ! {
    logging::finish();
    std::process::exit(code)
}
