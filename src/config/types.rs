use serde::Deserialize;
use std::path::PathBuf;

/// Content-selection mode for a clone run.
///
/// Each variant maps to exactly one discovery strategy; adding a mode means
/// adding a variant here and one arm in `discovery::discover`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CloneMode {
    /// Newest posts via the REST API (quick test runs).
    RecentPosts,
    /// Homepage plus pages reachable by a bounded crawl.
    KeyPages,
    /// An evenly spread sample of crawl-discovered pages.
    RandomSample,
    /// Everything the sitemap and API can enumerate.
    FullCrawl,
    /// An operator-supplied URL list (homepage always included).
    CustomUrls,
}

impl Default for CloneMode {
    fn default() -> Self {
        Self::FullCrawl
    }
}

impl std::fmt::Display for CloneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RecentPosts => "recent-posts",
            Self::KeyPages => "key-pages",
            Self::RandomSample => "random-sample",
            Self::FullCrawl => "full-crawl",
            Self::CustomUrls => "custom-urls",
        };
        write!(f, "{}", name)
    }
}

/// Immutable configuration for a single clone run.
///
/// Constructed once (from CLI flags, optionally seeded by a TOML file)
/// before any core component runs; the core never reads global state.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// The site to clone. Scheme may be omitted; HTTPS is assumed.
    #[serde(rename = "target-url")]
    pub target_url: String,

    /// Content-selection mode.
    #[serde(default)]
    pub mode: CloneMode,

    /// Maximum number of pages materialized in this run.
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum crawl depth from the homepage (bounded 1-10).
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Minimum wall-clock delay between successive network requests.
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Output directory; defaults to `cloned_<sanitized-host>`.
    #[serde(rename = "output-dir", default)]
    pub output_dir: Option<PathBuf>,

    /// Operator URL list for `custom-urls` mode (absolute or origin-relative,
    /// comma- or newline-separated entries are accepted on the CLI).
    #[serde(rename = "custom-urls", default)]
    pub custom_urls: Vec<String>,

    /// User-Agent header sent with every request.
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

pub(crate) fn default_max_pages() -> usize {
    50
}

pub(crate) fn default_max_depth() -> u32 {
    2
}

pub(crate) fn default_request_delay_ms() -> u64 {
    1000
}

pub(crate) fn default_user_agent() -> String {
    format!("site-mirror/{}", env!("CARGO_PKG_VERSION"))
}

impl RunConfig {
    /// A config with defaults for everything except the target URL.
    pub fn for_target(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            mode: CloneMode::default(),
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            request_delay_ms: default_request_delay_ms(),
            output_dir: None,
            custom_urls: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}
