//! REST-API-based discovery
//!
//! WordPress exposes posts and pages at `/wp-json/wp/v2/{posts,pages}` as
//! JSON arrays with a `link` field per item. Pagination runs until a short
//! page arrives or a hard cap of requests per endpoint is hit.

use crate::fetch::PoliteClient;
use crate::url::TargetOrigin;
use crate::{MirrorError, Result};
use url::Url;

const PER_PAGE: usize = 100;
/// Upper bound of paginated requests per endpoint, capping a single
/// endpoint's contribution at 500 items.
const MAX_API_REQUESTS: usize = 5;

const ENDPOINTS: [&str; 2] = ["wp-json/wp/v2/posts", "wp-json/wp/v2/pages"];

/// Discovers page URLs via the WordPress REST API.
///
/// `newest_first` orders results by publication date descending, which is
/// what a recent-posts run wants. Endpoint failures are logged and skipped;
/// an empty result tells the caller to fall back.
pub async fn discover_via_api(
    client: &PoliteClient,
    origin: &TargetOrigin,
    limit: usize,
    newest_first: bool,
) -> Result<Vec<Url>> {
    let homepage = origin.homepage();
    let mut urls: Vec<Url> = Vec::new();

    'endpoints: for endpoint in ENDPOINTS {
        for page in 1..=MAX_API_REQUESTS {
            if urls.len() >= limit {
                break 'endpoints;
            }

            let mut query = format!("{}?per_page={}&page={}", endpoint, PER_PAGE, page);
            if newest_first {
                query.push_str("&orderby=date&order=desc");
            }
            let request_url = homepage.join(&query)?;

            let body = match client.get(&request_url).await {
                Ok(body) => body,
                // WordPress answers a past-the-end page with 400.
                Err(MirrorError::HttpStatus { status: 400, .. }) if page > 1 => break,
                Err(error) => {
                    tracing::debug!("API endpoint {} failed: {}", request_url, error);
                    break;
                }
            };

            let items: Vec<serde_json::Value> = match serde_json::from_slice(&body.bytes) {
                Ok(items) => items,
                Err(error) => {
                    tracing::debug!("API endpoint {} returned non-JSON: {}", request_url, error);
                    break;
                }
            };

            let received = items.len();
            for url in extract_links(&items, origin) {
                urls.push(url);
                if urls.len() >= limit {
                    break 'endpoints;
                }
            }

            if received < PER_PAGE {
                break;
            }
        }
    }

    Ok(urls)
}

/// Pulls the `link` field out of each API item, keeping only in-origin URLs.
fn extract_links(items: &[serde_json::Value], origin: &TargetOrigin) -> Vec<Url> {
    let mut urls = Vec::new();
    for item in items {
        let Some(link) = item.get("link").and_then(|v| v.as_str()) else {
            continue;
        };
        let Ok(url) = Url::parse(link) else {
            continue;
        };
        if origin.contains(&url) {
            urls.push(url);
        }
    }
    urls
}
