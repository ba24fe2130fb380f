//! Fetch, rewrite, and persist a single page.

use crate::assets::{extract_css_urls, kind_from_url, rewrite_css, AssetCache, AssetKind};
use crate::fetch::PoliteClient;
use crate::fsio::atomic_write;
use crate::page::parse::{parse_page, resolve_href};
use crate::url::{derive_filename, TargetOrigin};
use crate::Result;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// A page that has been written to disk.
#[derive(Debug, Clone)]
pub struct MaterializedPage {
    /// The URL the page was fetched from.
    pub url: Url,
    /// Local filename under the output directory.
    pub filename: String,
    /// Document title, when present.
    pub title: Option<String>,
    /// Local relative paths of assets this page now references.
    pub local_assets: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches a page, downloads its assets, rewrites references to local paths,
/// and writes the result under `output_dir`.
///
/// A failed asset download keeps the original absolute reference in place;
/// only a failed page fetch or write makes the whole page fail.
pub async fn materialize_page(
    client: &PoliteClient,
    origin: &TargetOrigin,
    url: &Url,
    output_dir: &Path,
    cache: &mut AssetCache,
) -> Result<MaterializedPage> {
    let filename = derive_filename(url);

    let body = client.get_html(url).await?;
    let html = body.text();
    let parsed = parse_page(&html, &body.final_url);

    let mut local_assets = Vec::new();

    // Raw attribute value -> replacement. A HashMap collapses repeated
    // references so each raw string is rewritten once.
    let mut attr_rewrites: HashMap<String, String> = HashMap::new();

    for asset in &parsed.assets {
        if attr_rewrites.contains_key(&asset.raw) {
            continue;
        }
        if let Some(rel) = cache.resolve(client, &asset.resolved, asset.kind).await {
            local_assets.push(rel.clone());
            attr_rewrites.insert(asset.raw.clone(), rel);
        }
    }

    // url(...) tokens inside <style> blocks are rewritten in place; pages sit
    // at the output root, so the cached relative path works directly.
    let mut css_rewrites: Vec<(String, String)> = Vec::new();
    for raw in extract_inline_style_urls(&html) {
        if attr_rewrites.contains_key(&raw) {
            continue;
        }
        let Some(resolved) = resolve_href(&raw, &body.final_url) else {
            continue;
        };
        let kind = kind_from_url(&resolved);
        if kind == AssetKind::Css {
            continue;
        }
        if let Some(rel) = cache.resolve(client, &resolved, kind).await {
            local_assets.push(rel.clone());
            css_rewrites.push((raw, rel));
        }
    }

    for anchor in &parsed.anchors {
        if attr_rewrites.contains_key(&anchor.raw) {
            continue;
        }
        if !origin.contains(&anchor.resolved) {
            continue;
        }
        let mut local = derive_filename(&anchor.resolved);
        if let Some(fragment) = anchor.resolved.fragment() {
            local.push('#');
            local.push_str(fragment);
        }
        attr_rewrites.insert(anchor.raw.clone(), local);
    }

    let mut rewritten = apply_attribute_rewrites(&html, &attr_rewrites);
    if !css_rewrites.is_empty() {
        rewritten = rewrite_css(&rewritten, &css_rewrites);
    }

    atomic_write(&output_dir.join(&filename), rewritten.as_bytes())?;

    Ok(MaterializedPage {
        url: url.clone(),
        filename,
        title: parsed.title,
        local_assets,
        fetched_at: Utc::now(),
    })
}

/// Collects `url(...)` references from every `<style>` element in the
/// document.
fn extract_inline_style_urls(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("style") else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    for element in document.select(&selector) {
        let text: String = element.text().collect();
        for raw in extract_css_urls(&text) {
            if !refs.contains(&raw) {
                refs.push(raw);
            }
        }
    }
    refs
}

/// Replaces quoted attribute values in the serialized document.
///
/// The raw values come straight out of parsed attributes, and the match is
/// anchored on the `="..."` / `='...'` form an attribute takes in markup.
/// That keeps the substitution away from visible text, script string
/// literals, and JSON-LD values that happen to contain the same string
/// (those use `: "..."` or spaced assignments, which never match). Longer
/// values are substituted first so a raw value that prefixes another never
/// clobbers it.
fn apply_attribute_rewrites(html: &str, rewrites: &HashMap<String, String>) -> String {
    let mut ordered: Vec<(&String, &String)> = rewrites.iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = html.to_string();
    for (raw, local) in ordered {
        let double_quoted = format!("=\"{}\"", raw);
        if out.contains(&double_quoted) {
            out = out.replace(&double_quoted, &format!("=\"{}\"", local));
        }
        let single_quoted = format!("='{}'", raw);
        if out.contains(&single_quoted) {
            out = out.replace(&single_quoted, &format!("='{}'", local));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrites(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_rewrite_double_quoted_attribute() {
        let html = r#"<a href="/about/">About</a>"#;
        let out = apply_attribute_rewrites(html, &rewrites(&[("/about/", "about.html")]));
        assert_eq!(out, r#"<a href="about.html">About</a>"#);
    }

    #[test]
    fn test_rewrite_single_quoted_attribute() {
        let html = r#"<img src='/logo.png'>"#;
        let out = apply_attribute_rewrites(
            html,
            &rewrites(&[("/logo.png", "assets/images/logo-12ab34cd.png")]),
        );
        assert_eq!(out, r#"<img src='assets/images/logo-12ab34cd.png'>"#);
    }

    #[test]
    fn test_visible_text_is_untouched() {
        let html = r#"<a href="/about/">Visit /about/ for details</a>"#;
        let out = apply_attribute_rewrites(html, &rewrites(&[("/about/", "about.html")]));
        assert!(out.contains("Visit /about/ for details"));
        assert!(out.contains(r#"href="about.html""#));
    }

    #[test]
    fn test_script_and_json_ld_literals_are_untouched() {
        let html = concat!(
            r#"<a href="/about/">x</a>"#,
            r#"<script>var path = "/about/";</script>"#,
            r#"<script type="application/ld+json">{"url": "/about/"}</script>"#,
        );
        let out = apply_attribute_rewrites(html, &rewrites(&[("/about/", "about.html")]));
        assert!(out.contains(r#"href="about.html""#));
        assert!(out.contains(r#"var path = "/about/";"#));
        assert!(out.contains(r#"{"url": "/about/"}"#));
    }

    #[test]
    fn test_prefix_values_do_not_clobber() {
        let html = r#"<a href="/blog">x</a><a href="/blog/post">y</a>"#;
        let out = apply_attribute_rewrites(
            html,
            &rewrites(&[("/blog", "blog.html"), ("/blog/post", "blog_post.html")]),
        );
        assert!(out.contains(r#"href="blog.html""#));
        assert!(out.contains(r#"href="blog_post.html""#));
    }

    #[test]
    fn test_extract_inline_style_urls() {
        let html = r#"<html><head><style>
            body { background: url(/bg.png); }
        </style></head><body><style>.x{background:url('/bg.png')}</style></body></html>"#;
        assert_eq!(extract_inline_style_urls(html), vec!["/bg.png"]);
    }
}
