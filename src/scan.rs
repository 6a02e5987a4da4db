//! Input discovery for batch runs.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

const SUPPORTED_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Return `true` if `path` has an extension the decoder is built for.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTS.iter().any(|e| *e == ext)
        })
}

/// Expand `paths` into a sorted list of image files.
///
/// Files are taken as given (even with an unknown extension, so the decoder
/// reports the problem); directories are walked recursively, skipping hidden
/// subdirectories.
///
/// # Errors
/// Returns [`Error::MissingInput`] naming every path that does not exist.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let missing: Vec<_> = paths
        .iter()
        .filter(|p| !p.exists())
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingInput(missing.join(", ")));
    }

    let mut out = Vec::new();
    for root in paths {
        if root.is_file() {
            out.push(root.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !should_skip_dir(e))
            .flatten()
            .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
            .map(DirEntry::into_path)
            .collect();
        found.sort();
        out.append(&mut found);
    }
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}
