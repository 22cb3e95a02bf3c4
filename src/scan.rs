//! Directory listing and counting
//!
//! The scanner lists one directory level at a time, splitting the
//! children into subdirectories and audio files and sorting both with
//! the configured [`SortOrder`]. It also counts audio files across a
//! whole subtree, which fixes the width of the numeric prefixes.

use crate::classify::{Classifier, PathKind, strip_extension};
use crate::error::{Error, Result};
use crate::natural::natural_compare;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Comparator used when sorting directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Compare the integers embedded in names
    #[default]
    Natural,
    /// Plain string comparison
    Lexicographic,
}

impl SortOrder {
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SortOrder::Natural => natural_compare(a, b),
            SortOrder::Lexicographic => a.cmp(b),
        }
    }
}

/// Children of one directory, split and sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Lists and counts source directories
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    classifier: Classifier,
    order: SortOrder,
}

impl Scanner {
    pub fn new(classifier: Classifier, order: SortOrder) -> Self {
        Self { classifier, order }
    }

    /// List the immediate children of `dir`
    ///
    /// Directories are sorted by their full path without extension, files
    /// by their base name without extension. Ignored entries are dropped.
    pub fn list(&self, dir: &Path) -> Result<DirectoryListing> {
        let entries = fs::read_dir(dir).map_err(|e| Error::unreadable(dir, e))?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::unreadable(dir, e))?.path();
            match self.classifier.classify(&path) {
                PathKind::Directory => {
                    let key = strip_extension(&path)
                        .to_string_lossy()
                        .into_owned();
                    dirs.push((key, path));
                }
                PathKind::Audio => {
                    let key = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    files.push((key, path));
                }
                PathKind::Ignored => trace!(?path, "Ignoring entry"),
            }
        }

        let dirs = self.sort_keyed(dirs);
        let files = self.sort_keyed(files);

        debug!(
            ?dir,
            dirs = dirs.len(),
            files = files.len(),
            "Listed directory"
        );

        Ok(DirectoryListing {
            dirs: dirs.into_iter().map(|(_, p)| p).collect(),
            files: files.into_iter().map(|(_, p)| p).collect(),
        })
    }

    /// Sort by key with the active comparator; exact key order breaks ties
    /// so listings never depend on the order the OS returned them in
    fn sort_keyed(&self, entries: Vec<(String, PathBuf)>) -> Vec<(String, PathBuf)> {
        merge_sort_by(entries, &mut |(a, pa): &(String, PathBuf), (b, pb): &(String, PathBuf)| {
            self.order
                .compare(a, b)
                .then_with(|| a.cmp(b))
                .then_with(|| pa.cmp(pb))
        })
    }

    /// Count audio files in the whole subtree rooted at `dir`
    pub fn count_qualifying(&self, dir: &Path) -> Result<usize> {
        let mut count = 0usize;
        for entry in WalkDir::new(dir).follow_links(true) {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_dir() && self.classifier.is_audio(entry.path()) {
                        count += 1;
                    }
                }
                Err(err) => {
                    // A dangling symlink is listed as a file, count it the same way
                    if err.depth() > 0
                        && let Some(path) = err.path()
                        && path.is_symlink()
                        && !path.exists()
                    {
                        if self.classifier.is_audio(path) {
                            count += 1;
                        }
                        continue;
                    }
                    return Err(walk_error(dir, err));
                }
            }
        }
        debug!(?dir, count, "Counted audio files");
        Ok(count)
    }
}

/// Stable merge sort that tolerates comparators which are not a total order
///
/// Natural ordering mixes numeric and plain comparison, so it can be
/// intransitive (`a9 < b < c1 < a9`). The std sorts may panic on such
/// input; this one always terminates with every element kept.
fn merge_sort_by<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    if err.loop_ancestor().is_some() {
        return Error::WalkDir(err);
    }
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(io) => Error::SourceUnreadable { path, source: io },
        None => Error::InvalidPath { path },
    }
}

/// Number of decimal digits needed to print `n`, at least 1
pub fn digit_width(n: usize) -> usize {
    n.to_string().len()
}
