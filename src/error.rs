//! Error types for siginspect.
//!
//! Each layer owns a `thiserror` enum (`IoError`, `PeError`, `MsiError`,
//! `CertificateError`, `DiscoveryError`, `ConfigError`). This module holds the
//! run-level error that ends a run, and the four-member failure taxonomy that
//! recoverable per-file and per-directory faults are classified into.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors that stop a run.
#[derive(Debug, Error)]
pub enum SigInspectError {
    /// The root path does not resolve to a file or directory.
    #[error("\"{}\" is not a file nor directory.", .0.display())]
    PathNotFound(PathBuf),

    /// Configuration file could not be read or is malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The report destination could not be opened or written.
    #[error("Failed to write report to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Console I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SigInspectError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SigInspectError::PathNotFound(_) => 2,
            SigInspectError::Config(_) => 3,
            SigInspectError::Output { .. } | SigInspectError::Io(_) => 4,
        }
    }
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, SigInspectError>;

/// Classification of a recovered per-file or per-directory fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    AccessDenied,
    IoFailure,
    LoadFailure,
    Unknown,
}

impl FailureKind {
    /// Map an I/O error into the taxonomy.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => FailureKind::AccessDenied,
            _ => FailureKind::IoFailure,
        }
    }

    /// Single classification point for any fault raised while discovering
    /// or inspecting a path.
    ///
    /// Walks the `source()` chain looking for an `io::Error`; when none is
    /// found, the fault's own classification hook decides.
    pub fn classify<E>(err: &E) -> Self
    where
        E: Classify + std::error::Error + 'static,
    {
        if let Some(kind) = err.failure_kind() {
            return kind;
        }
        let mut source: Option<&(dyn std::error::Error + 'static)> = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                return Self::from_io(io_err);
            }
            source = cause.source();
        }
        FailureKind::Unknown
    }

    /// User-facing message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::AccessDenied => "Access to file was denied.",
            FailureKind::IoFailure => "Failed to access the file.",
            FailureKind::LoadFailure => "Failed to load certificate.",
            FailureKind::Unknown => "Something went wrong.",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::AccessDenied => write!(f, "AccessDenied"),
            FailureKind::IoFailure => write!(f, "IoFailure"),
            FailureKind::LoadFailure => write!(f, "LoadFailure"),
            FailureKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Hook implemented by layer errors that know their own failure kind.
///
/// Returning `None` defers to the `io::Error` search in
/// [`FailureKind::classify`].
pub trait Classify {
    fn failure_kind(&self) -> Option<FailureKind>;
}

impl Classify for io::Error {
    fn failure_kind(&self) -> Option<FailureKind> {
        Some(FailureKind::from_io(self))
    }
}
