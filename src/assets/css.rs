//! CSS reference extraction
//!
//! Stylesheets pull in fonts and images through `url(...)` tokens. The regex
//! here captures the token payload so those resources can be downloaded and
//! the stylesheet rewritten to point at the local copies.

use regex::Regex;
use std::sync::OnceLock;

fn css_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).unwrap())
}

/// Extracts the raw reference strings from every `url(...)` token in a
/// stylesheet. Data URIs and fragment-only references are skipped; duplicates
/// are kept in document order only once.
pub fn extract_css_urls(css: &str) -> Vec<String> {
    let mut seen = Vec::new();

    for capture in css_url_pattern().captures_iter(css) {
        let raw = capture[1].trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let lowered = raw.to_lowercase();
        if lowered.starts_with("data:") {
            continue;
        }
        if !seen.iter().any(|s| s == raw) {
            seen.push(raw.to_string());
        }
    }

    seen
}

/// Replaces raw references in a stylesheet body with their local
/// counterparts. Longer references are substituted first so that one raw
/// value being a prefix of another never corrupts the longer one.
pub fn rewrite_css(css: &str, replacements: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> = replacements.iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut result = css.to_string();
    for (raw, local) in ordered {
        result = result.replace(raw.as_str(), local.as_str());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_and_quoted() {
        let css = r#"
            body { background: url(/img/bg.png); }
            .a { background: url('fonts/a.woff2'); }
            .b { background: url("https://cdn.example.net/b.jpg"); }
        "#;
        let urls = extract_css_urls(css);
        assert_eq!(
            urls,
            vec!["/img/bg.png", "fonts/a.woff2", "https://cdn.example.net/b.jpg"]
        );
    }

    #[test]
    fn test_skip_data_uris_and_fragments() {
        let css = r#"
            .icon { background: url(data:image/png;base64,iVBOR); }
            .grad { fill: url(#gradient); }
        "#;
        assert!(extract_css_urls(css).is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let css = ".a { background: url(/bg.png); } .b { background: url(/bg.png); }";
        assert_eq!(extract_css_urls(css), vec!["/bg.png"]);
    }

    #[test]
    fn test_rewrite_replaces_all_occurrences() {
        let css = ".a { background: url(/bg.png); } .b { background: url(/bg.png); }";
        let rewritten = rewrite_css(
            css,
            &[("/bg.png".to_string(), "../images/bg-12ab34cd.png".to_string())],
        );
        assert!(!rewritten.contains("url(/bg.png)"));
        assert_eq!(rewritten.matches("../images/bg-12ab34cd.png").count(), 2);
    }

    #[test]
    fn test_rewrite_prefix_safety() {
        let css = "url(/bg.png) url(/bg.png.webp)";
        let rewritten = rewrite_css(
            css,
            &[
                ("/bg.png".to_string(), "LOCAL_A".to_string()),
                ("/bg.png.webp".to_string(), "LOCAL_B".to_string()),
            ],
        );
        assert!(rewritten.contains("url(LOCAL_A)"));
        assert!(rewritten.contains("url(LOCAL_B)"));
    }
}
