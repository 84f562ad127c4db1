//! Reindex command implementation.

use std::path::Path;

pub fn run(config: Option<&Path>, wait_secs: u64) {
    let rc = super::load_config(config);
    let engine = super::open_engine(&rc, wait_secs);

    println!("Reindexing {} source(s)", rc.sources.len());

    match engine.reindex_all() {
        Ok(Some(stats)) => {
            println!();
            println!("Indexing complete:");
            println!("  Items:          {}", stats.events);
            println!("  Docs indexed:   {}", stats.documents_added);
            if stats.documents_skipped > 0 {
                println!("  Items skipped:  {}", stats.documents_skipped);
            }
            println!("  Duration:       {}ms", stats.duration_ms);
            println!();
            println!("Index stored at: {}", rc.index.dir.display());
        }
        Ok(None) => {
            eprintln!("Error: index is not ready for a rebuild");
            engine.shutdown();
            super::exit(1);
        }
        Err(e) => {
            eprintln!("\nError during indexing: {}", e);
            engine.shutdown();
            super::exit(1);
        }
    }
}
