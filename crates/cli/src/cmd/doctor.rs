use docfind_core::config::{ConfigLoader, default_config_path};
use std::path::Path;

use crate::logging;

pub fn run(config: Option<&Path>) {
    match ConfigLoader::load(config) {
        Ok(rc) => {
            logging::init(&rc.logging);
            tracing::debug!("Loaded config with {} source(s)", rc.sources.len());

            println!("OK   dfind doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("index.dir: {}", rc.index.dir.display());
            println!("index.queue_capacity: {}", rc.index.queue_capacity);
            println!("index.ready_timeout_ms: {}", rc.index.ready_timeout_ms);
            println!("index.max_highlights: {}", rc.index.max_highlights);
            println!("logging.level: {}", rc.logging.level);

            let mut missing = 0;
            for source in &rc.sources {
                let state = if source.root.is_dir() {
                    "ok"
                } else {
                    missing += 1;
                    "missing"
                };
                println!(
                    "source {}: {} ({})",
                    source.content_type,
                    source.root.display(),
                    state
                );
            }

            if missing > 0 {
                println!("{} source root(s) missing", missing);
                super::exit(1);
            }
        }
        Err(e) => {
            println!("FAIL dfind doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
