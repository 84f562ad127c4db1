//! Status command implementation.

use std::path::Path;

pub fn run(config: Option<&Path>, wait_secs: u64) {
    let rc = super::load_config(config);
    let engine = super::open_engine(&rc, wait_secs);
    let status = engine.status();

    println!("state:     {}", status.state);
    println!("progress:  {}%", status.percent_complete);
    println!("documents: {}", status.document_count);
    println!("index:     {}", rc.index.dir.display());
    for content_type in engine.providers().content_types() {
        println!("source:    {}", content_type);
    }
}
