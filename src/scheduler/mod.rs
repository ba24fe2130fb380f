//! Run orchestration
//!
//! A clone run moves through a fixed sequence of phases:
//! Idle -> Discovering -> Filtering -> Processing -> Completed.
//! Discovery produces candidates, filtering drops the ones already on disk
//! and applies the page cap, processing materializes the rest one at a time,
//! and completion re-scans the output directory for the final page count.
//! Per-page failures are recorded and never abort the run; only an invalid
//! configuration stops it before any network activity.

use crate::assets::AssetCache;
use crate::config::{validate, RunConfig};
use crate::discovery::{discover, CandidateUrl, UrlSource};
use crate::fetch::PoliteClient;
use crate::index::ExistingIndex;
use crate::page::materialize_page;
use crate::url::{normalize_url, TargetOrigin};
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Phase of a clone run, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Discovering,
    Filtering,
    Processing,
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Idle => "idle",
            RunPhase::Discovering => "discovering",
            RunPhase::Filtering => "filtering",
            RunPhase::Processing => "processing",
            RunPhase::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// One URL that could not be materialized.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub url: String,
    pub message: String,
}

/// Statistics accumulated over a clone run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub output_dir: PathBuf,
    /// Candidates produced by discovery, after de-duplication.
    pub discovered: usize,
    /// Pages fetched and written this run.
    pub pages_downloaded: usize,
    /// Pages skipped because their file already existed.
    pub pages_skipped: usize,
    /// Assets written this run.
    pub assets_downloaded: usize,
    /// Asset URLs that could not be fetched.
    pub assets_failed: usize,
    /// Per-page failures recorded during processing.
    pub failures: Vec<FailureRecord>,
    /// Pages present in the output directory after the run, from a re-scan.
    pub total_pages_on_disk: usize,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl RunStats {
    fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            discovered: 0,
            pages_downloaded: 0,
            pages_skipped: 0,
            assets_downloaded: 0,
            assets_failed: 0,
            failures: Vec::new(),
            total_pages_on_disk: 0,
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }
}

/// Executes a full clone run and returns its statistics.
///
/// The run always completes with statistics, even if every page failed.
/// Zero discovered URLs is an informational outcome.
pub async fn run_clone(config: &RunConfig) -> Result<RunStats> {
    validate(config)?;

    let origin = TargetOrigin::parse(&config.target_url)?;
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(origin.default_output_dir()));
    std::fs::create_dir_all(&output_dir)?;

    let client = PoliteClient::build(&config.user_agent, config.request_delay_ms)?;

    let started = Instant::now();
    let mut stats = RunStats::new(output_dir.clone());
    let mut phase = RunPhase::Idle;

    transition(&mut phase, RunPhase::Discovering);
    let candidates = discover(&client, &origin, config, &output_dir).await?;
    stats.discovered = candidates.len();
    if candidates.is_empty() {
        tracing::info!("No URLs discovered for {}", origin);
    }

    transition(&mut phase, RunPhase::Filtering);
    let index = ExistingIndex::scan(&output_dir)?;
    let (to_download, skipped) = filter_candidates(&origin, candidates, &index, config.max_pages);
    stats.pages_skipped = skipped;
    tracing::info!(
        "{} page(s) to download, {} already present",
        to_download.len(),
        stats.pages_skipped
    );

    transition(&mut phase, RunPhase::Processing);
    let mut index = index;
    let mut cache = AssetCache::new(&output_dir);
    for candidate in &to_download {
        tracing::debug!(
            "Processing {} (source: {}, depth {})",
            candidate.url,
            candidate.source,
            candidate.depth
        );

        // A page written earlier this run can claim the same filename.
        if index.contains_url(&candidate.url) {
            stats.pages_skipped += 1;
            continue;
        }

        match materialize_page(&client, &origin, &candidate.url, &output_dir, &mut cache).await {
            Ok(page) => {
                tracing::info!(
                    "Saved {} -> {} (\"{}\", {} asset ref(s))",
                    page.url,
                    page.filename,
                    page.title.as_deref().unwrap_or("untitled"),
                    page.local_assets.len()
                );
                tracing::debug!("{} fetched at {}", page.filename, page.fetched_at.to_rfc3339());
                index.insert(page.filename);
                stats.pages_downloaded += 1;
            }
            Err(error) => {
                tracing::warn!("Failed to clone {}: {}", candidate.url, error);
                stats.failures.push(FailureRecord {
                    url: candidate.url.to_string(),
                    message: error.to_string(),
                });
            }
        }
    }

    transition(&mut phase, RunPhase::Completed);
    stats.assets_downloaded = cache.downloaded();
    stats.assets_failed = cache.failed();
    stats.total_pages_on_disk = ExistingIndex::scan(&output_dir)?.len();
    stats.duration = started.elapsed();

    Ok(stats)
}

fn transition(phase: &mut RunPhase, next: RunPhase) {
    tracing::debug!("Phase {} -> {}", phase, next);
    *phase = next;
}

/// Partitions candidates into the to-download list and a skip count.
///
/// The homepage is prepended when discovery did not produce it, and because
/// it sits first it always survives the `max_pages` cap. Candidates whose
/// derived file already exists are counted as skipped, and the cap applies
/// to the remainder.
fn filter_candidates(
    origin: &TargetOrigin,
    candidates: Vec<CandidateUrl>,
    index: &ExistingIndex,
    max_pages: usize,
) -> (Vec<CandidateUrl>, usize) {
    let mut ordered = candidates;

    if let Ok(homepage) = normalize_url(origin.homepage().as_str()) {
        let present = ordered
            .iter()
            .any(|c| c.url.as_str() == homepage.as_str());
        if !present {
            ordered.insert(
                0,
                CandidateUrl {
                    url: homepage,
                    source: UrlSource::Custom,
                    depth: 0,
                },
            );
        } else if let Some(pos) = ordered
            .iter()
            .position(|c| c.url.as_str() == homepage.as_str())
        {
            let homepage_candidate = ordered.remove(pos);
            ordered.insert(0, homepage_candidate);
        }
    }

    let mut to_download = Vec::new();
    let mut skipped = 0;
    for candidate in ordered {
        if index.contains_url(&candidate.url) {
            skipped += 1;
        } else if to_download.len() < max_pages {
            to_download.push(candidate);
        }
    }

    (to_download, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn candidate(path: &str) -> CandidateUrl {
        CandidateUrl {
            url: Url::parse(&format!("https://example.com{}", path)).unwrap(),
            source: UrlSource::Sitemap,
            depth: 0,
        }
    }

    fn origin() -> TargetOrigin {
        TargetOrigin::parse("https://example.com").unwrap()
    }

    #[test]
    fn test_homepage_is_prepended_and_kept_under_cap() {
        let candidates: Vec<_> = (1..=50).map(|i| candidate(&format!("/p{}", i))).collect();
        let index = ExistingIndex::default();

        let (to_download, skipped) = filter_candidates(&origin(), candidates, &index, 10);
        assert_eq!(to_download.len(), 10);
        assert_eq!(skipped, 0);
        assert_eq!(to_download[0].url.as_str(), "https://example.com/");
        // Nine of the fifty make it in alongside the homepage.
        assert_eq!(to_download[1].url.path(), "/p1");
    }

    #[test]
    fn test_existing_pages_are_skipped_not_capped() {
        let mut index = ExistingIndex::default();
        index.insert("p1.html".to_string());
        index.insert("p2.html".to_string());
        index.insert("p3.html".to_string());
        index.insert("p4.html".to_string());

        let candidates: Vec<_> = (1..=10).map(|i| candidate(&format!("/p{}", i))).collect();
        let (to_download, skipped) = filter_candidates(&origin(), candidates, &index, 100);

        assert_eq!(skipped, 4);
        // Six new pages plus the prepended homepage.
        assert_eq!(to_download.len(), 7);
    }

    #[test]
    fn test_homepage_moved_to_front_when_discovered_late() {
        let candidates = vec![candidate("/a"), candidate("/"), candidate("/b")];
        let index = ExistingIndex::default();

        let (to_download, _) = filter_candidates(&origin(), candidates, &index, 10);
        assert_eq!(to_download[0].url.as_str(), "https://example.com/");
        assert_eq!(to_download.len(), 3);
    }
}
