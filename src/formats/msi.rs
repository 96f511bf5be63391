//! MSI package signature extraction
//!
//! Windows Installer packages are OLE compound files. A signed package keeps
//! its PKCS#7 `ContentInfo` in the root stream `\x05DigitalSignature`.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

use bytes::Bytes;
use cfb::CompoundFile;
use thiserror::Error;
use tracing::debug;

use crate::error::{Classify, FailureKind};
use crate::formats::{trim_to_element, SignatureBlob};

/// Stream holding the Authenticode signature.
pub const DIGITAL_SIGNATURE_STREAM: &str = "\u{5}DigitalSignature";

/// Upper bound on the signature stream we are willing to buffer.
pub const MAX_SIGNATURE_STREAM_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MsiError {
    /// The file could not be opened or is not a compound file.
    #[error("Failed to open compound file: {0}")]
    Open(#[source] io::Error),

    #[error("Package has no digital signature stream")]
    NotSigned,

    #[error("Signature stream of {size} bytes exceeds the limit of {limit} bytes")]
    StreamTooLarge { size: u64, limit: u64 },

    #[error("Failed to read signature stream: {0}")]
    Read(#[source] io::Error),
}

impl Classify for MsiError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            // cfb reports a bad header or broken sector chain as InvalidData.
            MsiError::Open(e) | MsiError::Read(e) if e.kind() == io::ErrorKind::InvalidData => {
                Some(FailureKind::LoadFailure)
            }
            MsiError::Open(e) | MsiError::Read(e) => Some(FailureKind::from_io(e)),
            MsiError::NotSigned => Some(FailureKind::LoadFailure),
            MsiError::StreamTooLarge { .. } => Some(FailureKind::IoFailure),
        }
    }
}

pub type Result<T> = std::result::Result<T, MsiError>;

/// An MSI package opened for signature extraction
pub struct MsiPackage<F> {
    cfb: CompoundFile<F>,
}

impl MsiPackage<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(MsiError::Open)?;
        Self::from_reader(file)
    }
}

impl<F: Read + Seek> MsiPackage<F> {
    pub fn from_reader(inner: F) -> Result<Self> {
        let cfb = CompoundFile::open(inner).map_err(MsiError::Open)?;
        Ok(Self { cfb })
    }

    pub fn is_signed(&self) -> bool {
        self.cfb.is_stream(DIGITAL_SIGNATURE_STREAM)
    }

    /// The contents of the `\x05DigitalSignature` stream.
    pub fn signature(&mut self) -> Result<SignatureBlob> {
        if !self.is_signed() {
            return Err(MsiError::NotSigned);
        }

        let size = self
            .cfb
            .entry(DIGITAL_SIGNATURE_STREAM)
            .map_err(MsiError::Read)?
            .len();
        if size > MAX_SIGNATURE_STREAM_SIZE {
            return Err(MsiError::StreamTooLarge {
                size,
                limit: MAX_SIGNATURE_STREAM_SIZE,
            });
        }

        let mut stream = self
            .cfb
            .open_stream(DIGITAL_SIGNATURE_STREAM)
            .map_err(MsiError::Read)?;
        let mut der = Vec::with_capacity(size as usize);
        stream.read_to_end(&mut der).map_err(MsiError::Read)?;

        let stream_len = der.len();
        let der = trim_to_element(&Bytes::from(der));
        debug!(
            size = stream_len,
            der_len = der.len(),
            "Read MSI signature stream"
        );
        Ok(SignatureBlob { offset: 0, der })
    }
}
