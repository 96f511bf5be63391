//! Bounded reads over a memory-mapped container file.
//!
//! Signature extraction only needs the DOS/PE headers and the certificate
//! table, which sit at offsets taken from the file itself. [`SafeReader`]
//! maps the file once and charges every copy against a read budget, so a
//! header pointing at a huge table fails with [`IoError::ReadLimitExceeded`]
//! instead of allocating.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IOLimits {
    /// Largest file that will be mapped at all.
    pub max_file_size: u64,
    /// Total bytes one reader may copy out over its lifetime.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            // PE offsets are 32-bit.
            max_file_size: u32::MAX as u64 + 1,
            max_read_bytes: 64 * 1024 * 1024,
        }
    }
}

pub struct SafeReader {
    path: PathBuf,
    // Empty files cannot be mapped.
    mmap: Option<Mmap>,
    limits: IOLimits,
    bytes_read: u64,
    file_size: u64,
}

impl SafeReader {
    /// Map `path` read-only, refusing files above `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "Refusing to map oversized file"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = match file_size {
            0 => None,
            // Safety: read-only map of a file we hold open. Concurrent
            // truncation by another process is outside our control.
            _ => Some(unsafe { Mmap::map(&file)? }),
        };
        debug!(path = %path.display(), size = file_size, "Mapped container");

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            bytes_read: 0,
            file_size,
        })
    }

    pub fn size(&self) -> u64 {
        self.file_size
    }

    #[cfg(test)]
    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Copy up to `len` bytes starting at `offset`. Reads that cross the end
    /// of the file are cut short; reads starting past it are empty.
    pub fn read_at(&mut self, offset: u64, len: u64) -> Result<Bytes> {
        self.check_budget(len)?;

        let range = self.clamp(offset, len);
        let out = match (&self.mmap, range) {
            (Some(map), Some(range)) => Bytes::copy_from_slice(&map[range]),
            _ => Bytes::new(),
        };
        self.bytes_read += out.len() as u64;

        trace!(
            path = %self.path.display(),
            offset,
            len = out.len(),
            total_read = self.bytes_read,
            "Read from container"
        );
        Ok(out)
    }

    /// Like [`read_at`](Self::read_at), but a truncated result is
    /// [`IoError::ShortRead`].
    pub fn read_exact_at(&mut self, offset: u64, len: u64) -> Result<Bytes> {
        let data = self.read_at(offset, len)?;
        let got = data.len() as u64;
        if got < len {
            return Err(IoError::ShortRead {
                offset,
                wanted: len,
                got,
            });
        }
        Ok(data)
    }

    pub fn read_prefix(&mut self, len: u64) -> Result<Bytes> {
        self.read_at(0, len)
    }

    fn check_budget(&self, len: u64) -> Result<()> {
        if self.bytes_read.saturating_add(len) <= self.limits.max_read_bytes {
            return Ok(());
        }
        warn!(
            path = %self.path.display(),
            requested = len,
            already_read = self.bytes_read,
            limit = self.limits.max_read_bytes,
            "Read budget exhausted"
        );
        Err(IoError::ReadLimitExceeded {
            limit: self.limits.max_read_bytes,
            current: self.bytes_read,
        })
    }

    /// The in-bounds part of `offset..offset + len`, if any.
    fn clamp(&self, offset: u64, len: u64) -> Option<Range<usize>> {
        if offset >= self.file_size {
            return None;
        }
        let end = offset.saturating_add(len).min(self.file_size);
        Some(usize::try_from(offset).ok()?..usize::try_from(end).ok()?)
    }
}
