//! Filesystem helpers shared by the page materializer and the asset cache.

use crate::{MirrorError, Result};
use std::path::Path;

/// Writes a file atomically: content goes to a temp file in the same
/// directory, which is then renamed over the destination.
///
/// An interrupted run therefore never leaves a truncated artifact that a
/// later existing-output scan would mistake for a completed download.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let wrap = |source: std::io::Error| MirrorError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact");
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&tmp_path, bytes).map_err(wrap)?;
    std::fs::rename(&tmp_path, path).map_err(wrap)?;

    Ok(())
}
