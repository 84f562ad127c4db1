//! Find command implementation.

use std::path::Path;

use docfind_core::content::AllowAll;
use docfind_core::engine::FindInContentRequest;
use docfind_core::matching::MatchSpec;

use super::output::{print_json, print_matches_quiet, print_matches_table};
use crate::{FindArgs, OutputFormat};

pub fn run(config: Option<&Path>, wait_secs: u64, args: FindArgs) {
    let rc = super::load_config(config);
    let engine = super::open_engine(&rc, wait_secs);

    let spec = MatchSpec::new(args.matching.match_type, args.matching.pattern)
        .case_sensitive(args.matching.case_sensitive);
    let request = FindInContentRequest::new(spec)
        .with_tags(args.tags)
        .with_page(args.offset, args.length);

    let page = match engine.find_in_content(&request, &AllowAll) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error searching: {}", e);
            engine.shutdown();
            super::exit(1);
        }
    };

    match resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Table => print_matches_table(&page),
        OutputFormat::Json => print_json(&page),
        OutputFormat::Quiet => print_matches_quiet(&page),
    }
}

fn resolve_format(output: OutputFormat, json: bool, quiet: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else if quiet {
        OutputFormat::Quiet
    } else {
        output
    }
}
