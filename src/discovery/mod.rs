//! Candidate file discovery.
//!
//! [`Discovery`] walks a root path lazily with an explicit stack of pending
//! directories. Each directory is listed in one go: its eligible files are
//! yielded first, in listing order, then its subdirectories are walked
//! depth-first in listing order. A directory that cannot be listed yields
//! one [`DiscoveryError`] and the walk carries on.
//!
//! Symbolic links to files are candidates. Symbolic links to directories
//! are never descended into, so the walk cannot cycle. Sockets, FIFOs and
//! device nodes are skipped.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::error::{Classify, FailureKind};

pub mod filter;

pub use filter::{is_eligible, BINARY_EXTENSIONS};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to access {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to list directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DiscoveryError {
    pub fn path(&self) -> &Path {
        match self {
            DiscoveryError::Access { path, .. } | DiscoveryError::ReadDir { path, .. } => path,
        }
    }

    pub fn io_error(&self) -> &io::Error {
        match self {
            DiscoveryError::Access { source, .. } | DiscoveryError::ReadDir { source, .. } => {
                source
            }
        }
    }
}

impl Classify for DiscoveryError {
    fn failure_kind(&self) -> Option<FailureKind> {
        Some(FailureKind::from_io(self.io_error()))
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Keep `.exe`, `.dll` and `.msi` files only.
    pub binaries_only: bool,
}

impl DiscoveryOptions {
    pub fn walk(self, root: impl Into<PathBuf>) -> Discovery {
        Discovery::new(root, self)
    }
}

/// Lazy, depth-first iterator over the candidate files under a root.
#[derive(Debug)]
pub struct Discovery {
    root: PathBuf,
    options: DiscoveryOptions,
    /// The root has not been examined yet.
    started: bool,
    /// Directories still to be listed; the next one is on top.
    stack: Vec<PathBuf>,
    /// Results of the last listing not yet handed out.
    ready: VecDeque<Result<PathBuf>>,
}

impl Discovery {
    pub fn new(root: impl Into<PathBuf>, options: DiscoveryOptions) -> Self {
        Self {
            root: root.into(),
            options,
            started: false,
            stack: Vec::new(),
            ready: VecDeque::new(),
        }
    }

    /// Start over from the root.
    pub fn reset(&mut self) {
        self.started = false;
        self.stack.clear();
        self.ready.clear();
    }

    /// The root path is followed even when it is a symbolic link.
    fn start(&mut self) {
        self.started = true;
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => self.stack.push(self.root.clone()),
            Ok(meta) if meta.is_file() => {
                if is_eligible(&self.root, self.options.binaries_only) {
                    self.ready.push_back(Ok(self.root.clone()));
                }
            }
            Ok(_) => trace!(path = %self.root.display(), "Root is not a file or directory"),
            Err(source) => self.ready.push_back(Err(DiscoveryError::Access {
                path: self.root.clone(),
                source,
            })),
        }
    }

    fn list(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                debug!(path = %dir.display(), error = %source, "Cannot list directory");
                self.ready.push_back(Err(DiscoveryError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                }));
                return;
            }
        };
        trace!(path = %dir.display(), "Listing directory");

        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    self.ready.push_back(Err(DiscoveryError::ReadDir {
                        path: dir.to_path_buf(),
                        source,
                    }));
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => {
                    self.ready
                        .push_back(Err(DiscoveryError::Access { path, source }));
                    continue;
                }
            };

            if file_type.is_dir() {
                if self.options.recursive {
                    subdirs.push(path);
                }
            } else if file_type.is_file() || (file_type.is_symlink() && points_to_file(&path)) {
                if is_eligible(&path, self.options.binaries_only) {
                    self.ready.push_back(Ok(path));
                }
            } else {
                trace!(path = %path.display(), "Skipping entry");
            }
        }

        // Reversed so the first listed subdirectory is walked first.
        self.stack.extend(subdirs.into_iter().rev());
    }
}

fn points_to_file(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}

impl Iterator for Discovery {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.start();
        }
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(item);
            }
            let dir = self.stack.pop()?;
            self.list(&dir);
        }
    }
}

/// Walk `root` with the given options.
pub fn discover(root: impl Into<PathBuf>, recursive: bool, binaries_only: bool) -> Discovery {
    DiscoveryOptions {
        recursive,
        binaries_only,
    }
    .walk(root)
}
