//! Sitemap-based discovery
//!
//! Tries the usual WordPress sitemap locations, follows a sitemap index down
//! into its sub-sitemaps, and collects every `<url><loc>` entry that belongs
//! to the target origin. The collected URL lists are also written out as
//! plain-text audit files in the output directory.

use crate::fetch::PoliteClient;
use crate::fsio::atomic_write;
use crate::url::{sanitize, TargetOrigin};
use crate::{MirrorError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use url::Url;

/// Well-known sitemap locations, tried in order. `wp-sitemap.xml` is the
/// WordPress-core default since 5.5; the other two cover common SEO plugins.
const SITEMAP_CANDIDATES: [&str; 3] = ["sitemap_index.xml", "sitemap.xml", "wp-sitemap.xml"];

/// Discovers page URLs via the site's sitemap.
///
/// Returns an empty vector when no sitemap candidate responds; the caller
/// treats that as a signal to fall back to another strategy.
pub async fn discover_via_sitemap(
    client: &PoliteClient,
    origin: &TargetOrigin,
    output_dir: &Path,
) -> Result<Vec<Url>> {
    let homepage = origin.homepage();

    let mut root_doc = None;
    for candidate in SITEMAP_CANDIDATES {
        let url = homepage.join(candidate)?;
        match client.get(&url).await {
            Ok(body) => match parse_sitemap(&body.text()) {
                Ok(doc) if !doc.is_empty() => {
                    tracing::info!("Using sitemap at {}", url);
                    root_doc = Some(doc);
                    break;
                }
                Ok(_) => tracing::debug!("Sitemap at {} is empty", url),
                Err(error) => tracing::debug!("Sitemap at {} unparseable: {}", url, error),
            },
            Err(error) => tracing::debug!("No sitemap at {}: {}", url, error),
        }
    }

    let Some(root) = root_doc else {
        return Ok(Vec::new());
    };

    let mut pages: Vec<Url> = Vec::new();

    // A document can mix root-level <url> entries with <sitemap> references;
    // the root entries count either way.
    for loc in &root.pages {
        keep_in_origin(origin, loc, &mut pages);
    }

    for sub_loc in &root.sub_sitemaps {
        let Ok(sub_url) = Url::parse(sub_loc) else {
            continue;
        };
        let sub_body = match client.get(&sub_url).await {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!("Sub-sitemap {} failed: {}", sub_url, error);
                continue;
            }
        };
        let sub_doc = match parse_sitemap(&sub_body.text()) {
            Ok(doc) => doc,
            Err(error) => {
                tracing::warn!("Sub-sitemap {} unparseable: {}", sub_url, error);
                continue;
            }
        };

        let mut sub_pages = Vec::new();
        for loc in &sub_doc.pages {
            keep_in_origin(origin, loc, &mut sub_pages);
        }

        tracing::info!(
            "Sub-sitemap {} ({}): {} URL(s)",
            sub_url,
            categorize(sub_url.path()),
            sub_pages.len()
        );
        write_url_list(output_dir, &sub_sitemap_list_name(&sub_url), &sub_pages)?;

        pages.extend(sub_pages);
    }

    if !pages.is_empty() {
        write_url_list(output_dir, "all_sitemap_urls.txt", &pages)?;
    }

    Ok(pages)
}

fn keep_in_origin(origin: &TargetOrigin, loc: &str, out: &mut Vec<Url>) {
    if let Ok(url) = Url::parse(loc) {
        if origin.contains(&url) {
            out.push(url);
        }
    }
}

/// Content category of a sub-sitemap, guessed from its filename. Reporting
/// only.
fn categorize(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or("").to_lowercase();
    if name.contains("post") {
        "posts"
    } else if name.contains("page") {
        "pages"
    } else if name.contains("categor") {
        "categories"
    } else if name.contains("tag") {
        "tags"
    } else {
        "other"
    }
}

fn sub_sitemap_list_name(sub_url: &Url) -> String {
    let stem = sub_url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("sitemap");
    let stem = stem.strip_suffix(".xml").unwrap_or(stem);
    format!("{}_urls.txt", sanitize(stem))
}

fn write_url_list(output_dir: &Path, name: &str, urls: &[Url]) -> Result<()> {
    let mut text = String::new();
    for url in urls {
        text.push_str(url.as_str());
        text.push('\n');
    }
    atomic_write(&output_dir.join(name), text.as_bytes())
}

/// A parsed sitemap document: either an index (`sub_sitemaps`) or a URL set
/// (`pages`), occasionally both.
#[derive(Debug, Default)]
struct SitemapDoc {
    sub_sitemaps: Vec<String>,
    pages: Vec<String>,
}

impl SitemapDoc {
    fn is_empty(&self) -> bool {
        self.sub_sitemaps.is_empty() && self.pages.is_empty()
    }
}

/// Parses sitemap XML, distinguishing `<sitemap><loc>` entries from
/// `<url><loc>` entries.
fn parse_sitemap(xml: &str) -> Result<SitemapDoc> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut doc = SitemapDoc::default();
    let mut in_sitemap = false;
    let mut in_url = false;
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sitemap" => in_sitemap = true,
                b"url" => in_url = true,
                b"loc" => in_loc = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"sitemap" => in_sitemap = false,
                b"url" => in_url = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(text)) if in_loc => {
                let loc = text
                    .unescape()
                    .map_err(|error| {
                        MirrorError::Discovery(format!("bad sitemap text: {}", error))
                    })?
                    .trim()
                    .to_string();
                if loc.is_empty() {
                    continue;
                }
                if in_sitemap {
                    doc.sub_sitemaps.push(loc);
                } else if in_url {
                    doc.pages.push(loc);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(error) => {
                return Err(MirrorError::Discovery(format!(
                    "malformed sitemap XML: {}",
                    error
                )));
            }
        }
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_set() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://example.com/</loc><lastmod>2024-01-01</lastmod></url>
              <url><loc>https://example.com/about/</loc></url>
            </urlset>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert!(doc.sub_sitemaps.is_empty());
        assert_eq!(
            doc.pages,
            vec!["https://example.com/", "https://example.com/about/"]
        );
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<?xml version="1.0"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sitemap><loc>https://example.com/post-sitemap.xml</loc></sitemap>
              <sitemap><loc>https://example.com/page-sitemap.xml</loc></sitemap>
            </sitemapindex>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.sub_sitemaps.len(), 2);
        assert!(doc.pages.is_empty());
    }

    #[test]
    fn test_parse_mixed_document_keeps_both() {
        let xml = r#"<sitemapindex>
              <sitemap><loc>https://example.com/post-sitemap.xml</loc></sitemap>
              <url><loc>https://example.com/hello/</loc></url>
            </sitemapindex>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.sub_sitemaps, vec!["https://example.com/post-sitemap.xml"]);
        assert_eq!(doc.pages, vec!["https://example.com/hello/"]);
    }

    #[test]
    fn test_parse_escaped_loc() {
        let xml = r#"<urlset><url><loc>https://example.com/?a=1&amp;b=2</loc></url></urlset>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.pages, vec!["https://example.com/?a=1&b=2"]);
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        assert!(parse_sitemap("<urlset><url><loc>x</url>").is_err());
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("/post-sitemap.xml"), "posts");
        assert_eq!(categorize("/page-sitemap.xml"), "pages");
        assert_eq!(categorize("/category-sitemap.xml"), "categories");
        assert_eq!(categorize("/post_tag-sitemap.xml"), "posts");
        assert_eq!(categorize("/tag-sitemap.xml"), "tags");
        assert_eq!(categorize("/author-sitemap.xml"), "other");
    }

    #[test]
    fn test_sub_sitemap_list_name() {
        let url = Url::parse("https://example.com/post-sitemap.xml").unwrap();
        assert_eq!(sub_sitemap_list_name(&url), "post-sitemap_urls.txt");
    }
}
