//! Transfer planning
//!
//! Walks the source album depth-first and yields, lazily, one
//! [`CopyEntry`] per audio file: where it comes from and the decorated
//! name it gets at the destination.
//!
//! Three layouts are supported:
//! - [`Layout::FlatForward`]: one flat directory, numbered 1..N. Each
//!   directory's subdirectories are walked before its own files.
//! - [`Layout::FlatReverse`]: one flat directory, numbered N..1. Each
//!   directory's files (in reverse order) come before its subdirectories.
//! - [`Layout::Tree`]: the source structure is mirrored with `NNN-` prefixed
//!   directories, files are numbered from 0 within each directory.
//!
//! In tree mode destination directories are created while the plan is
//! consumed, right before the first entry that needs them. A plan is
//! single pass; build a new one to start over.

use crate::error::{Error, Result};
use crate::naming::{decorate_dir_name, decorate_file_name};
use crate::scan::{DirectoryListing, Scanner, digit_width};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Destination layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    FlatForward,
    FlatReverse,
    Tree,
}

/// One file to copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Numeric prefix the destination name carries
    pub index: usize,
}

/// Builds transfer plans for a source tree
#[derive(Debug, Clone)]
pub struct Planner {
    scanner: Scanner,
    layout: Layout,
    unified_name: Option<String>,
}

impl Planner {
    pub fn new(scanner: Scanner, layout: Layout) -> Self {
        Self {
            scanner,
            layout,
            unified_name: None,
        }
    }

    /// Replace every destination file stem with `name`
    pub fn with_unified_name(mut self, name: Option<String>) -> Self {
        self.unified_name = name;
        self
    }

    /// Start planning the copy of `source` into `dest`
    ///
    /// Counts the audio files up front, so an unreadable source fails here
    /// before any entry is produced. Returns [`Error::EmptyAlbum`] when there
    /// is nothing to copy. With `materialize` off, tree mode only computes
    /// directory names and creates nothing.
    pub fn plan(&self, source: &Path, dest: &Path, materialize: bool) -> Result<Plan> {
        let total = self.scanner.count_qualifying(source)?;
        if total == 0 {
            return Err(Error::EmptyAlbum {
                path: source.to_path_buf(),
            });
        }

        let width = digit_width(total);
        let cursor = match self.layout {
            Layout::FlatReverse => Cursor::descending(total),
            Layout::FlatForward | Layout::Tree => Cursor::ascending(1),
        };

        info!(
            ?source,
            ?dest,
            layout = ?self.layout,
            total,
            width,
            "Planning transfer"
        );

        Ok(Plan {
            scanner: self.scanner.clone(),
            layout: self.layout,
            unified_name: self.unified_name.clone(),
            total,
            width,
            cursor,
            materialize,
            stack: vec![Work::Enter {
                source: source.to_path_buf(),
                dest: dest.to_path_buf(),
                create: false,
            }],
        })
    }
}

/// Running file number for flat layouts
#[derive(Debug, Clone, Copy)]
struct Cursor {
    next: usize,
    descending: bool,
}

impl Cursor {
    fn ascending(start: usize) -> Self {
        Self {
            next: start,
            descending: false,
        }
    }

    fn descending(start: usize) -> Self {
        Self {
            next: start,
            descending: true,
        }
    }

    fn advance(&mut self) -> usize {
        let current = self.next;
        self.next = if self.descending {
            current.saturating_sub(1)
        } else {
            current + 1
        };
        current
    }
}

#[derive(Debug)]
enum Work {
    /// List a source directory, creating its destination first if asked
    Enter {
        source: PathBuf,
        dest: PathBuf,
        create: bool,
    },
    /// Emit the remaining files of one directory
    Files {
        dest: PathBuf,
        files: std::vec::IntoIter<PathBuf>,
        local: usize,
    },
}

/// Lazy, single-pass sequence of copy entries
#[derive(Debug)]
pub struct Plan {
    scanner: Scanner,
    layout: Layout,
    unified_name: Option<String>,
    total: usize,
    width: usize,
    cursor: Cursor,
    materialize: bool,
    stack: Vec<Work>,
}

impl Plan {
    /// Number of audio files the plan will yield
    pub fn total(&self) -> usize {
        self.total
    }

    /// Digit width of every file prefix in this plan
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn enter(&mut self, source: &Path, dest: PathBuf, create: bool) -> Result<()> {
        if create && self.materialize {
            fs::create_dir_all(&dest)?;
            debug!(?dest, "Created destination directory");
        }

        let DirectoryListing { dirs, mut files } = self.scanner.list(source)?;
        trace!(?source, dirs = dirs.len(), files = files.len(), "Entering directory");

        // The stack is LIFO: push what must come last first
        let subdirs: Vec<Work> = dirs
            .into_iter()
            .enumerate()
            .map(|(i, dir)| {
                let dir_dest = match self.layout {
                    Layout::Tree => {
                        let name = dir
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        dest.join(decorate_dir_name(i, &name))
                    }
                    Layout::FlatForward | Layout::FlatReverse => dest.clone(),
                };
                Work::Enter {
                    source: dir,
                    dest: dir_dest,
                    create: self.layout == Layout::Tree,
                }
            })
            .collect();

        match self.layout {
            Layout::FlatForward | Layout::Tree => {
                self.stack.push(Work::Files {
                    dest,
                    files: files.into_iter(),
                    local: 0,
                });
                self.stack.extend(subdirs.into_iter().rev());
            }
            Layout::FlatReverse => {
                files.reverse();
                self.stack.extend(subdirs.into_iter().rev());
                self.stack.push(Work::Files {
                    dest,
                    files: files.into_iter(),
                    local: 0,
                });
            }
        }
        Ok(())
    }

    fn entry(&mut self, source: PathBuf, dest: &Path, local: usize) -> CopyEntry {
        let index = match self.layout {
            Layout::Tree => local,
            Layout::FlatForward | Layout::FlatReverse => self.cursor.advance(),
        };
        let original = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = decorate_file_name(self.width, index, &original, self.unified_name.as_deref());
        let destination = dest.join(name);
        trace!(?source, ?destination, index, "Planned file");

        CopyEntry {
            source,
            destination,
            index,
        }
    }
}

impl Iterator for Plan {
    type Item = Result<CopyEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Work::Enter {
                    source,
                    dest,
                    create,
                } => {
                    if let Err(e) = self.enter(&source, dest, create) {
                        // Fatal: nothing more comes out of this plan
                        self.stack.clear();
                        return Some(Err(e));
                    }
                }
                Work::Files {
                    dest,
                    mut files,
                    local,
                } => {
                    if let Some(source) = files.next() {
                        let entry = self.entry(source, &dest, local);
                        self.stack.push(Work::Files {
                            dest,
                            files,
                            local: local + 1,
                        });
                        return Some(Ok(entry));
                    }
                }
            }
        }
    }
}
