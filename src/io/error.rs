//! Custom error types for the I/O module.

use thiserror::Error;

use crate::error::{Classify, FailureKind};

#[derive(Error, Debug)]
pub enum IoError {
    #[error("File size of {found} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge { limit: u64, found: u64 },

    #[error(
        "A read operation would exceed the total read limit of {limit} bytes. (already read: {current})"
    )]
    ReadLimitExceeded { limit: u64, current: u64 },

    #[error("Expected {wanted} bytes at offset {offset:#x}, file ends after {got}.")]
    ShortRead { offset: u64, wanted: u64, got: u64 },

    #[error("An underlying I/O error occurred: {0}")]
    StdIo(#[from] std::io::Error),
}

impl Classify for IoError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            IoError::StdIo(e) => Some(FailureKind::from_io(e)),
            IoError::FileTooLarge { .. } | IoError::ReadLimitExceeded { .. } => {
                Some(FailureKind::IoFailure)
            }
            // The file was readable but does not hold what its headers promise.
            IoError::ShortRead { .. } => Some(FailureKind::LoadFailure),
        }
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
