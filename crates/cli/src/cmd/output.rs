//! Shared output formatting for query commands.

use docfind_core::engine::{ContentHighlights, ContentMatch, ResultPage};
use serde::Serialize;

/// Print search matches as a table.
pub fn print_matches_table(page: &ResultPage<ContentMatch>) {
    let matches = &page.values;
    if matches.is_empty() {
        println!("(no matches found)");
        return;
    }

    let item_width = matches.iter().map(|m| item_label(m).len()).max().unwrap_or(4).clamp(4, 40);
    let ext_width = matches.iter().map(|m| m.extension.len()).max().unwrap_or(3).clamp(3, 10);
    let at_width = 10;

    println!(
        "{:<item_width$}  {:<ext_width$}  {:<at_width$}  SAMPLE",
        "ITEM",
        "EXT",
        "AT",
        item_width = item_width,
        ext_width = ext_width,
        at_width = at_width,
    );
    println!(
        "{:-<item_width$}  {:-<ext_width$}  {:-<at_width$}  {:-<20}",
        "",
        "",
        "",
        "",
        item_width = item_width,
        ext_width = ext_width,
        at_width = at_width,
    );

    for m in matches {
        let at = format!("{}+{}", m.location.offset, m.location.length);
        println!(
            "{:<item_width$}  {:<ext_width$}  {:<at_width$}  {}",
            truncate(&item_label(m), item_width),
            m.extension,
            at,
            single_line(&m.sample),
            item_width = item_width,
            ext_width = ext_width,
            at_width = at_width,
        );
    }

    println!();
    let shown = page.page.offset + matches.len();
    if page.page.exact {
        println!("-- {} of {} matches --", shown, page.page.total);
    } else {
        println!("-- {} of {} matches (more with --offset {}) --", shown, page.page.total, shown);
    }
}

/// Print search matches as JSON.
pub fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print one `type/uuid.extension` line per match.
pub fn print_matches_quiet(page: &ResultPage<ContentMatch>) {
    for m in &page.values {
        println!("{}/{}.{}", m.content.content_type, m.content.uuid, m.extension);
    }
}

/// Print every highlight span with the text it covers.
pub fn print_highlights(highlights: &ContentHighlights) {
    println!("{} [{}]", highlights.content, highlights.extension);
    if highlights.highlights.is_empty() {
        println!("(no highlights)");
        return;
    }
    for location in &highlights.highlights {
        let text = location.slice(&highlights.text).unwrap_or_default();
        println!("{:>8}+{:<5}  {}", location.offset, location.length, single_line(text));
    }
    println!();
    println!("-- {} highlights --", highlights.highlights.len());
}

fn item_label(m: &ContentMatch) -> String {
    match &m.content.name {
        Some(name) => format!("{}/{}", m.content.content_type, name),
        None => format!("{}/{}", m.content.content_type, m.content.uuid),
    }
}

fn single_line(s: &str) -> String {
    s.replace('\n', "\\n").replace('\r', "\\r").replace('\t', " ")
}

/// Truncate string with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_len).collect()
    }
}
