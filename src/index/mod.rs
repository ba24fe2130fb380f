//! Existing-output index
//!
//! Incremental behavior rests on a scan of the output directory: every
//! `.html` file already present counts as a completed page. Because the
//! filename derivation is the same pure function the materializer uses, a URL
//! is skipped exactly when a previous run finished writing its page.

use crate::url::derive_filename;
use crate::Result;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// The set of page filenames already present in the output directory.
#[derive(Debug, Default)]
pub struct ExistingIndex {
    filenames: HashSet<String>,
}

impl ExistingIndex {
    /// Scans the top level of the output directory for `.html` files.
    ///
    /// A missing directory is a fresh run and yields an empty index.
    pub fn scan(output_dir: &Path) -> Result<Self> {
        let mut filenames = HashSet::new();

        if output_dir.is_dir() {
            for entry in std::fs::read_dir(output_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if name.to_lowercase().ends_with(".html") {
                        filenames.insert(name.to_string());
                    }
                }
            }
        }

        tracing::debug!(
            "Found {} existing page(s) in {}",
            filenames.len(),
            output_dir.display()
        );

        Ok(Self { filenames })
    }

    /// Whether a page for this URL has already been materialized.
    pub fn contains_url(&self, url: &Url) -> bool {
        self.filenames.contains(&derive_filename(url))
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.filenames.contains(filename)
    }

    /// Records a freshly written page so later URLs mapping to the same
    /// filename are treated as already present.
    pub fn insert(&mut self, filename: String) {
        self.filenames.insert(filename);
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = ExistingIndex::scan(&dir.path().join("nope")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_scan_picks_up_html_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "x").unwrap();
        std::fs::write(dir.path().join("about.html"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();

        let index = ExistingIndex::scan(dir.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains("index.html"));
        assert!(!index.contains("notes.txt"));
    }

    #[test]
    fn test_subdirectories_are_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets").join("stray.html"), "x").unwrap();

        let index = ExistingIndex::scan(dir.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_contains_url_uses_filename_derivation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about.html"), "x").unwrap();

        let index = ExistingIndex::scan(dir.path()).unwrap();
        let url = Url::parse("https://example.com/about/").unwrap();
        assert!(index.contains_url(&url));

        let other = Url::parse("https://example.com/contact/").unwrap();
        assert!(!index.contains_url(&other));
    }

    #[test]
    fn test_insert_marks_future_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = ExistingIndex::scan(dir.path()).unwrap();
        index.insert("about.html".to_string());
        assert!(index.contains_url(&Url::parse("https://example.com/about").unwrap()));
    }
}
