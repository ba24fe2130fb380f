//! Asset downloading and local naming
//!
//! Assets referenced by cloned pages (stylesheets, scripts, images, and the
//! resources stylesheets pull in through `url(...)`) are downloaded once per
//! unique absolute URL and stored under `assets/<bucket>/` in the output
//! directory. Local names are deterministic: the sanitized original file stem
//! plus a short hash of the absolute URL, so two distinct `style.css` files
//! from different paths never collide.

mod css;

pub use css::{extract_css_urls, rewrite_css};

use crate::fetch::PoliteClient;
use crate::fsio::atomic_write;
use crate::page::resolve_href;
use crate::url::sanitize;
use crate::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// The bucket an asset is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Css,
    Js,
    Image,
    Other,
}

impl AssetKind {
    /// Subdirectory under `assets/` for this kind.
    pub fn bucket(&self) -> &'static str {
        match self {
            AssetKind::Css => "css",
            AssetKind::Js => "js",
            AssetKind::Image => "images",
            AssetKind::Other => "other",
        }
    }
}

/// Classifies a URL by its path extension. Used for references found inside
/// stylesheets, where no HTML tag tells us what the resource is.
pub fn kind_from_url(url: &Url) -> AssetKind {
    let path = url.path().to_lowercase();
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "css" => AssetKind::Css,
        "js" | "mjs" => AssetKind::Js,
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "ico" | "avif" | "bmp" => {
            AssetKind::Image
        }
        _ => AssetKind::Other,
    }
}

/// Derives the local path (relative to the output directory) for an asset
/// URL: `assets/<bucket>/<stem>-<hash8><ext>`.
///
/// The hash covers the full absolute URL including the query string, so
/// `style.css?ver=6.4` and `style.css?ver=6.5` get separate files.
pub fn local_asset_path(url: &Url, kind: AssetKind) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("asset");

    let (stem, ext) = match segment.rfind('.') {
        Some(pos) if pos > 0 => (&segment[..pos], &segment[pos..]),
        _ => (segment, ""),
    };

    let digest = Sha256::digest(url.as_str().as_bytes());
    let hash = &hex::encode(digest)[..8];

    format!(
        "assets/{}/{}-{}{}",
        kind.bucket(),
        sanitize(stem),
        hash,
        ext
    )
}

/// Downloads each unique asset URL at most once per run and remembers the
/// outcome, including failures, so a broken reference is not retried on every
/// page that mentions it.
pub struct AssetCache {
    output_dir: PathBuf,
    resolved: HashMap<String, Option<String>>,
    downloaded: usize,
    failed: usize,
}

impl AssetCache {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            resolved: HashMap::new(),
            downloaded: 0,
            failed: 0,
        }
    }

    /// Number of assets written to disk this run.
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Number of asset URLs that could not be fetched.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Ensures the asset is on disk and returns its path relative to the
    /// output directory, or `None` if the download failed.
    pub async fn resolve(
        &mut self,
        client: &PoliteClient,
        url: &Url,
        kind: AssetKind,
    ) -> Option<String> {
        let key = url.as_str().to_string();
        if let Some(cached) = self.resolved.get(&key) {
            return cached.clone();
        }

        let outcome = if kind == AssetKind::Css {
            self.download_stylesheet(client, url).await
        } else {
            self.download_plain(client, url, kind).await
        };

        let rel = match outcome {
            Ok(rel) => {
                self.downloaded += 1;
                Some(rel)
            }
            Err(error) => {
                tracing::warn!("Asset download failed for {}: {}", url, error);
                self.failed += 1;
                None
            }
        };

        self.resolved.insert(key, rel.clone());
        rel
    }

    async fn download_plain(
        &mut self,
        client: &PoliteClient,
        url: &Url,
        kind: AssetKind,
    ) -> Result<String> {
        let body = client.get(url).await?;
        let rel = local_asset_path(url, kind);
        atomic_write(&self.output_dir.join(&rel), &body.bytes)?;
        Ok(rel)
    }

    /// Downloads a stylesheet, then downloads the resources its `url(...)`
    /// tokens reference and rewrites those tokens to point at the local
    /// copies. Nested stylesheet imports are left as-is.
    async fn download_stylesheet(&mut self, client: &PoliteClient, url: &Url) -> Result<String> {
        let body = client.get(url).await?;
        let mut text = body.text();

        let mut replacements = Vec::new();
        for raw in extract_css_urls(&text) {
            let Some(resolved) = resolve_href(&raw, url) else {
                continue;
            };
            let kind = kind_from_url(&resolved);
            if kind == AssetKind::Css {
                continue;
            }
            if let Some(rel) = self.resolve_cached_plain(client, &resolved, kind).await {
                // Stylesheets live in assets/css/, so sibling buckets are
                // reachable one level up.
                if let Some(from_assets) = rel.strip_prefix("assets/") {
                    replacements.push((raw, format!("../{}", from_assets)));
                }
            }
        }

        if !replacements.is_empty() {
            text = rewrite_css(&text, &replacements);
        }

        let rel = local_asset_path(url, AssetKind::Css);
        atomic_write(&self.output_dir.join(&rel), text.as_bytes())?;
        Ok(rel)
    }

    async fn resolve_cached_plain(
        &mut self,
        client: &PoliteClient,
        url: &Url,
        kind: AssetKind,
    ) -> Option<String> {
        let key = url.as_str().to_string();
        if let Some(cached) = self.resolved.get(&key) {
            return cached.clone();
        }

        let rel = match self.download_plain(client, url, kind).await {
            Ok(rel) => {
                self.downloaded += 1;
                Some(rel)
            }
            Err(error) => {
                tracing::warn!("Asset download failed for {}: {}", url, error);
                self.failed += 1;
                None
            }
        };

        self.resolved.insert(key, rel.clone());
        rel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_url() {
        let cases = [
            ("https://example.com/style.css", AssetKind::Css),
            ("https://example.com/app.js", AssetKind::Js),
            ("https://example.com/pic.PNG", AssetKind::Image),
            ("https://example.com/font.woff2", AssetKind::Other),
            ("https://example.com/no-extension", AssetKind::Other),
        ];
        for (input, expected) in cases {
            assert_eq!(kind_from_url(&Url::parse(input).unwrap()), expected);
        }
    }

    #[test]
    fn test_local_asset_path_shape() {
        let url = Url::parse("https://example.com/wp-content/themes/x/style.css").unwrap();
        let rel = local_asset_path(&url, AssetKind::Css);
        assert!(rel.starts_with("assets/css/style-"));
        assert!(rel.ends_with(".css"));
    }

    #[test]
    fn test_local_asset_path_is_deterministic() {
        let url = Url::parse("https://example.com/logo.png").unwrap();
        assert_eq!(
            local_asset_path(&url, AssetKind::Image),
            local_asset_path(&url, AssetKind::Image)
        );
    }

    #[test]
    fn test_same_name_different_path_differ() {
        let a = Url::parse("https://example.com/theme-a/style.css").unwrap();
        let b = Url::parse("https://example.com/theme-b/style.css").unwrap();
        assert_ne!(
            local_asset_path(&a, AssetKind::Css),
            local_asset_path(&b, AssetKind::Css)
        );
    }

    #[test]
    fn test_query_string_affects_name() {
        let a = Url::parse("https://example.com/style.css?ver=6.4").unwrap();
        let b = Url::parse("https://example.com/style.css?ver=6.5").unwrap();
        assert_ne!(
            local_asset_path(&a, AssetKind::Css),
            local_asset_path(&b, AssetKind::Css)
        );
    }

    #[test]
    fn test_root_url_gets_placeholder_stem() {
        let url = Url::parse("https://example.com/").unwrap();
        let rel = local_asset_path(&url, AssetKind::Other);
        assert!(rel.starts_with("assets/other/asset-"));
    }
}
