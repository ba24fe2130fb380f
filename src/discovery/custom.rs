//! Operator-supplied URL list discovery

use crate::url::TargetOrigin;
use crate::Result;
use url::Url;

/// Parses an operator-supplied list of absolute URLs or origin-relative
/// paths. Entries may be separated by commas or newlines; order is kept and
/// the homepage is always first. Entries outside the target origin are
/// skipped with a warning.
pub fn parse_custom_urls(origin: &TargetOrigin, entries: &[String]) -> Result<Vec<Url>> {
    let mut urls = vec![origin.homepage()];

    for entry in entries {
        for piece in entry.split(|c| c == ',' || c == '\n') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            match origin.resolve(piece) {
                Ok(url) => urls.push(url),
                Err(error) => {
                    tracing::warn!("Skipping custom URL {:?}: {}", piece, error);
                }
            }
        }
    }

    Ok(urls)
}
