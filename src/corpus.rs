//! Corpus crawling: HTML files in one directory to a link graph
//!
//! Every `*.html` file directly inside the directory is a page, keyed by its
//! file name. Links are the `href` targets of `<a>` tags; only links naming
//! another file of the same corpus survive graph construction.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::graph::{LinkGraph, LinkGraphBuilder};

fn anchor_href() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<a\s+(?:[^>]*?)href="([^"]*)""#).expect("Invalid regex")
    })
}

/// Extract the `href` target of every `<a ...>` tag, in document order.
pub fn parse_links(html: &str) -> Vec<String> {
    anchor_href()
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Read a directory of HTML pages into a link graph.
///
/// Subdirectories, non-HTML files and files whose names are not valid UTF-8
/// are skipped. Self links and links outside the corpus are dropped.
pub fn crawl(dir: impl AsRef<Path>) -> Result<LinkGraph<String>> {
    let dir = dir.as_ref();
    trace_stage!("crawl", dir = %dir.display());

    let mut builder = LinkGraphBuilder::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            trace_event!(warn, path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if !name.ends_with(".html") {
            continue;
        }

        let contents = std::fs::read_to_string(entry.path())?;
        let links = parse_links(&contents);
        trace_event!(debug, page = %name, links = links.len(), "parsed page");
        builder.add_page(name, links)?;
    }

    let graph = builder.build()?;
    trace_event!(
        info,
        pages = graph.num_nodes(),
        links = graph.num_edges(),
        "corpus loaded"
    );
    Ok(graph)
}
