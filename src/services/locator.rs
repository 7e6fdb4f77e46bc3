//! Report file discovery from a glob pattern.

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{AppError, AppResult};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Expand a glob pattern into the matching report files.
///
/// `*` and `?` stay within one path component; `**` crosses directories.
/// Paths are returned in directory-walk order with entries sorted by file
/// name. Directories never match. No match is not an error.
pub fn locate_reports(pattern: &str) -> AppResult<Vec<PathBuf>> {
    // Walked paths never carry `/./` or `//`, so neither may the matcher
    let normalized: PathBuf = Path::new(pattern).components().collect();
    let normalized = normalized.to_string_lossy();

    let matcher = GlobBuilder::new(&normalized)
        .literal_separator(true)
        .build()
        .map_err(|e| AppError::InvalidPattern(format!("{}: {}", pattern, e)))?
        .compile_matcher();

    let (base, rest) = split_literal_prefix(&normalized);

    // Plain path without metacharacters
    if rest.is_empty() {
        let path = PathBuf::from(&*normalized);
        return Ok(if path.is_file() || path.is_symlink() {
            vec![path]
        } else {
            Vec::new()
        });
    }

    let root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };

    if !root.is_dir() {
        debug!("Report directory {} does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(&root).min_depth(1).sort_by_file_name();
    // Only bounds the walk; shallower files still go through the matcher
    if !rest.iter().any(|c| c.contains("**")) {
        walker = walker.max_depth(rest.len());
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry while locating reports: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        // Candidates are matched relative to the pattern's own prefix
        let candidate = if base.as_os_str().is_empty() {
            entry.path().strip_prefix(&root).unwrap_or(entry.path())
        } else {
            entry.path()
        };

        if matcher.is_match(candidate) {
            files.push(candidate.to_path_buf());
        }
    }

    debug!("Pattern {} matched {} file(s)", pattern, files.len());

    Ok(files)
}

/// Split a pattern into its literal directory prefix and the remaining
/// components, the first of which holds a glob metacharacter.
fn split_literal_prefix(pattern: &str) -> (PathBuf, Vec<String>) {
    let mut base = PathBuf::new();
    let mut rest = Vec::new();

    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if rest.is_empty() && !text.contains(GLOB_META) {
            base.push(component.as_os_str());
        } else {
            rest.push(text.into_owned());
        }
    }

    (base, rest)
}
