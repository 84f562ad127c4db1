//! Highlights command implementation.

use std::path::Path;

use docfind_core::content::{AllowAll, ContentRef};
use docfind_core::engine::FetchHighlightsRequest;
use docfind_core::matching::MatchSpec;

use super::output::{print_highlights, print_json};
use crate::HighlightsArgs;

pub fn run(config: Option<&Path>, wait_secs: u64, args: HighlightsArgs) {
    let rc = super::load_config(config);
    let engine = super::open_engine(&rc, wait_secs);

    let request = FetchHighlightsRequest {
        content: ContentRef::new(args.content_type, args.uuid),
        extension: args.extension,
        filter: MatchSpec::new(args.matching.match_type, args.matching.pattern)
            .case_sensitive(args.matching.case_sensitive),
    };

    match engine.fetch_highlights(&request, &AllowAll) {
        Ok(Some(highlights)) if args.json => print_json(&highlights),
        Ok(Some(highlights)) => print_highlights(&highlights),
        Ok(None) => {
            eprintln!("No indexed document for {} [{}]", request.content, request.extension);
            engine.shutdown();
            super::exit(1);
        }
        Err(e) => {
            eprintln!("Error fetching highlights: {}", e);
            engine.shutdown();
            super::exit(1);
        }
    }
}
