use crate::UrlError;
use url::Url;

/// Normalizes a URL for candidate deduplication.
///
/// # Normalization steps
///
/// 1. Parse the URL; reject if malformed or non-HTTP(S)
/// 2. Lowercase the host
/// 3. Remove the fragment (everything after `#`)
/// 4. Collapse empty and dot path segments
/// 5. Remove the trailing slash (except for the root `/`)
///
/// The query string is preserved: WordPress sites routinely serve distinct
/// content behind `?p=` and `?page_id=` style URLs. Trailing-slash handling
/// must stay consistent with [`crate::url::derive_filename`], which trims
/// slashes before deriving a local name, so `/about` and `/about/` map to the
/// same candidate and the same artifact.
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host {
            url.set_host(Some(&lowered))
                .map_err(|e| UrlError::Parse(format!("failed to set host: {}", e)))?;
        }
    } else {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    // An empty query string carries no information; drop the dangling `?`.
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Collapses dot segments and removes the trailing slash (root excepted).
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}
