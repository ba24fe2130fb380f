//! HTML parsing for pages: anchor and asset reference extraction
//!
//! The raw attribute values are kept alongside the resolved absolute URLs so
//! the rewriter can later replace exactly what appeared in the source
//! document.

use crate::assets::AssetKind;
use scraper::{Html, Selector};
use url::Url;

/// An anchor (`<a href>`) found on a page.
#[derive(Debug, Clone)]
pub struct AnchorRef {
    /// The attribute value exactly as written in the document.
    pub raw: String,
    /// The resolved absolute URL.
    pub resolved: Url,
}

/// An asset reference (`<link rel=stylesheet>`, `<script src>`, `<img src>`).
#[derive(Debug, Clone)]
pub struct AssetRef {
    /// The attribute value exactly as written in the document.
    pub raw: String,
    /// The resolved absolute URL.
    pub resolved: Url,
    pub kind: AssetKind,
}

/// Everything the materializer needs from a parsed page.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub anchors: Vec<AnchorRef>,
    pub assets: Vec<AssetRef>,
}

/// Parses an HTML document and extracts its title, anchors, and asset
/// references. Relative references are resolved against `base_url`.
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        anchors: extract_anchors(&document, base_url),
        assets: extract_assets(&document, base_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_anchors(document: &Html, base_url: &Url) -> Vec<AnchorRef> {
    let mut anchors = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return anchors;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(resolved) = resolve_href(href, base_url) {
            anchors.push(AnchorRef {
                raw: href.to_string(),
                resolved,
            });
        }
    }

    anchors
}

fn extract_assets(document: &Html, base_url: &Url) -> Vec<AssetRef> {
    let mut assets = Vec::new();

    let queries: [(&str, &str, AssetKind); 3] = [
        ("link[rel='stylesheet'][href]", "href", AssetKind::Css),
        ("script[src]", "src", AssetKind::Js),
        ("img[src]", "src", AssetKind::Image),
    ];

    for (query, attr, kind) in queries {
        let Ok(selector) = Selector::parse(query) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(value) = element.value().attr(attr) else {
                continue;
            };
            if let Some(resolved) = resolve_href(value, base_url) {
                assets.push(AssetRef {
                    raw: value.to_string(),
                    resolved,
                    kind,
                });
            }
        }
    }

    assets
}

/// Resolves an href/src to an absolute HTTP(S) URL.
///
/// Returns None for references that never lead to fetchable content:
/// fragment-only anchors, `javascript:`, `mailto:`, `tel:`, and data URIs.
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved)
    } else {
        None
    }
}
