//! URL discovery
//!
//! Resolves the target origin's universe of candidate page URLs. Four
//! strategies exist: sitemap traversal, the WordPress REST API, a bounded
//! breadth-first crawl, and an operator-supplied custom list. The clone mode
//! picks the strategy; a failed sitemap or API strategy falls back to the
//! next one in priority order (sitemap, then API, then crawl) rather than
//! aborting the run.

mod api;
mod crawl;
mod custom;
mod sitemap;

pub use api::discover_via_api;
pub use crawl::discover_via_crawl;
pub use custom::parse_custom_urls;
pub use sitemap::discover_via_sitemap;

use crate::config::{CloneMode, RunConfig};
use crate::fetch::PoliteClient;
use crate::url::{normalize_url, TargetOrigin};
use crate::Result;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use url::Url;

/// How a candidate URL was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Sitemap,
    Api,
    Crawl,
    Custom,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UrlSource::Sitemap => "sitemap",
            UrlSource::Api => "api",
            UrlSource::Crawl => "crawl",
            UrlSource::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// A normalized candidate URL with its discovery source and depth.
///
/// Depth is 0 for everything except crawl-discovered URLs, where it is the
/// minimum link distance from the homepage.
#[derive(Debug, Clone)]
pub struct CandidateUrl {
    pub url: Url,
    pub source: UrlSource,
    pub depth: u32,
}

/// Discovers candidate URLs for a run according to the configured mode.
///
/// The returned sequence is de-duplicated on normalized form, preserving
/// first-discovery order. An empty result is a reportable outcome, not an
/// error.
pub async fn discover(
    client: &PoliteClient,
    origin: &TargetOrigin,
    config: &RunConfig,
    output_dir: &Path,
) -> Result<Vec<CandidateUrl>> {
    let mut set = CandidateSet::new();

    match config.mode {
        CloneMode::RecentPosts => {
            match discover_via_api(client, origin, config.max_pages, true).await {
                Ok(urls) if !urls.is_empty() => set.extend(urls, UrlSource::Api),
                Ok(_) | Err(_) => {
                    tracing::warn!("API discovery produced nothing, falling back to crawl");
                    crawl_into(&mut set, client, origin, config).await?;
                }
            }
        }

        CloneMode::KeyPages => {
            crawl_into(&mut set, client, origin, config).await?;
        }

        CloneMode::RandomSample => {
            // Crawl wider than the page budget, then take an evenly spaced
            // sample so the result spans the whole discovered set.
            let wide_cap = config.max_pages.saturating_mul(3);
            let found =
                discover_via_crawl(client, origin, config.max_depth, wide_cap).await?;
            for (url, depth) in sample_evenly(found, config.max_pages) {
                set.push(url, UrlSource::Crawl, depth);
            }
        }

        CloneMode::FullCrawl => {
            match discover_via_sitemap(client, origin, output_dir).await {
                Ok(urls) if !urls.is_empty() => set.extend(urls, UrlSource::Sitemap),
                Ok(_) => tracing::info!("No sitemap found"),
                Err(error) => tracing::warn!("Sitemap discovery failed: {}", error),
            }

            match discover_via_api(client, origin, usize::MAX, false).await {
                Ok(urls) => set.extend(urls, UrlSource::Api),
                Err(error) => tracing::warn!("API discovery failed: {}", error),
            }

            if set.is_empty() {
                tracing::warn!("Sitemap and API produced nothing, falling back to crawl");
                crawl_into(&mut set, client, origin, config).await?;
            }
        }

        CloneMode::CustomUrls => {
            for url in parse_custom_urls(origin, &config.custom_urls)? {
                set.push(url, UrlSource::Custom, 0);
            }
        }
    }

    let candidates = set.into_vec();
    tracing::info!("Discovered {} candidate URL(s)", candidates.len());
    Ok(candidates)
}

async fn crawl_into(
    set: &mut CandidateSet,
    client: &PoliteClient,
    origin: &TargetOrigin,
    config: &RunConfig,
) -> Result<()> {
    let found =
        discover_via_crawl(client, origin, config.max_depth, config.max_pages).await?;
    for (url, depth) in found {
        set.push(url, UrlSource::Crawl, depth);
    }
    Ok(())
}

/// Takes up to `count` items spread evenly across the input, always keeping
/// the first item. Deterministic, so repeated runs sample the same pages and
/// the skip-if-exists behavior stays meaningful.
fn sample_evenly(items: Vec<(Url, u32)>, count: usize) -> Vec<(Url, u32)> {
    if count == 0 || items.len() <= count {
        return items;
    }
    let step = items.len() as f64 / count as f64;
    let mut sampled = Vec::with_capacity(count);
    for i in 0..count {
        let index = (i as f64 * step) as usize;
        sampled.push(items[index].clone());
    }
    sampled
}

/// Order-preserving de-duplicated candidate accumulator. Uniqueness is
/// enforced on the normalized URL string.
struct CandidateSet {
    seen: HashSet<String>,
    candidates: Vec<CandidateUrl>,
}

impl CandidateSet {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            candidates: Vec::new(),
        }
    }

    fn push(&mut self, url: Url, source: UrlSource, depth: u32) {
        let Ok(normalized) = normalize_url(url.as_str()) else {
            return;
        };
        if self.seen.insert(normalized.as_str().to_string()) {
            self.candidates.push(CandidateUrl {
                url: normalized,
                source,
                depth,
            });
        }
    }

    fn extend(&mut self, urls: Vec<Url>, source: UrlSource) {
        for url in urls {
            self.push(url, source, 0);
        }
    }

    fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn into_vec(self) -> Vec<CandidateUrl> {
        self.candidates
    }
}
