//! Breadth-first crawl discovery
//!
//! Starts from the homepage at depth 0 and follows same-origin anchors with
//! a FIFO frontier. A URL is enqueued at most once, at the minimum depth it
//! was seen. This is the only strategy that finds pages no sitemap or API
//! lists.

use crate::fetch::PoliteClient;
use crate::page::parse_page;
use crate::url::{normalize_url, TargetOrigin};
use crate::Result;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Link targets that are downloads rather than pages.
const SKIP_EXTENSIONS: [&str; 22] = [
    ".pdf", ".zip", ".gz", ".rar", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".jpg",
    ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".mp3", ".mp4", ".webm", ".avi", ".json",
];

/// Crawls the origin breadth-first up to `max_depth` links from the
/// homepage, collecting at most `max_pages` unique page URLs in discovery
/// order. Individual fetch failures are skipped, not fatal.
pub async fn discover_via_crawl(
    client: &PoliteClient,
    origin: &TargetOrigin,
    max_depth: u32,
    max_pages: usize,
) -> Result<Vec<(Url, u32)>> {
    let homepage = normalize_url(origin.homepage().as_str())?;

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(homepage.as_str().to_string());

    let mut discovered: Vec<(Url, u32)> = vec![(homepage.clone(), 0)];
    let mut frontier: VecDeque<(Url, u32)> = VecDeque::new();
    frontier.push_back((homepage, 0));

    while let Some((url, depth)) = frontier.pop_front() {
        if discovered.len() >= max_pages {
            break;
        }
        // Links found at max depth would land beyond it.
        if depth >= max_depth {
            continue;
        }

        let body = match client.get_html(&url).await {
            Ok(body) => body,
            Err(error) => {
                tracing::debug!("Crawl fetch failed for {}: {}", url, error);
                continue;
            }
        };

        let parsed = parse_page(&body.text(), &body.final_url);
        for anchor in parsed.anchors {
            if discovered.len() >= max_pages {
                break;
            }
            if !origin.contains(&anchor.resolved) {
                continue;
            }
            if has_skipped_extension(&anchor.resolved) {
                continue;
            }
            let Ok(normalized) = normalize_url(anchor.resolved.as_str()) else {
                continue;
            };
            if seen.insert(normalized.as_str().to_string()) {
                discovered.push((normalized.clone(), depth + 1));
                frontier.push_back((normalized, depth + 1));
            }
        }
    }

    tracing::info!("Crawl discovered {} page URL(s)", discovered.len());
    Ok(discovered)
}

fn has_skipped_extension(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
