//! PE reader that locates the Authenticode signature of an image
//!
//! Headers are read through a bounded [`SafeReader`]; only the DOS header,
//! the NT headers and the attribute certificate table are ever touched.

use std::path::Path;

use tracing::{debug, warn};

pub mod certificates;
pub mod headers;
pub mod types;
pub mod utils;

use certificates::*;
use headers::*;
pub use types::*;

use crate::formats::SignatureBlob;
use crate::io::error::IoError;
use crate::io::{IOLimits, SafeReader};

/// A PE image opened for signature extraction
pub struct PeImage {
    reader: SafeReader,
    nt_headers: NtHeaders,
}

impl PeImage {
    /// Open a file on disk with default I/O limits
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_limits(path, IOLimits::default())
    }

    /// Open a file on disk with custom I/O limits
    pub fn open_with_limits<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let reader = SafeReader::open(path, limits)?;
        Self::from_reader(reader)
    }

    /// Parse headers from an already opened reader
    pub fn from_reader(mut reader: SafeReader) -> Result<Self> {
        let size = reader.size();
        let dos = reader.read_prefix(DOS_HEADER_SIZE as u64)?;
        let dos_header = parse_dos_header(&dos)?;

        let nt_offset = dos_header.e_lfanew as u64;
        if nt_offset >= size {
            return Err(PeError::InvalidOffset { offset: nt_offset });
        }

        let coff_len = (PE_SIGNATURE.len() + COFF_HEADER_SIZE) as u64;
        let coff_data = reader
            .read_exact_at(nt_offset, coff_len)
            .map_err(|e| truncated(e, size))?;
        let file_header = parse_coff_header(&coff_data)?;

        let opt_offset = nt_offset + coff_len;
        let opt_len = file_header.size_of_optional_header as u64;
        let opt_data = reader
            .read_exact_at(opt_offset, opt_len)
            .map_err(|e| truncated(e, size))?;
        let (kind, data_directories) = parse_optional_header(&opt_data)?;

        debug!(
            e_lfanew = dos_header.e_lfanew,
            machine = file_header.machine,
            kind = ?kind,
            "Parsed PE headers"
        );

        Ok(Self {
            reader,
            nt_headers: NtHeaders {
                file_header,
                kind,
                data_directories,
            },
        })
    }

    /// Get NT headers
    pub fn nt_headers(&self) -> &NtHeaders {
        &self.nt_headers
    }

    /// Whether the security directory is populated
    pub fn is_signed(&self) -> bool {
        !self.nt_headers.security_directory().is_empty()
    }

    /// Read and split the attribute certificate table.
    pub fn certificate_table(&mut self) -> Result<Vec<WinCertificate>> {
        let dir = self.nt_headers.security_directory();
        if dir.is_empty() {
            return Err(PeError::NotSigned);
        }
        if dir.size > MAX_CERTIFICATE_TABLE_SIZE {
            warn!(
                size = dir.size,
                limit = MAX_CERTIFICATE_TABLE_SIZE,
                "Certificate table too large"
            );
            return Err(PeError::LimitExceeded("certificate table size"));
        }

        let offset = dir.virtual_address as u64;
        let end = offset + dir.size as u64;
        if end > self.reader.size() {
            return Err(PeError::InvalidOffset { offset });
        }

        let table = self.reader.read_exact_at(offset, dir.size as u64)?;
        parse_certificate_table(&table, offset)
    }

    /// The PKCS#7 `ContentInfo` of the first Authenticode signature.
    pub fn signature(&mut self) -> Result<SignatureBlob> {
        let entries = self.certificate_table()?;
        let entry = first_signed_data(&entries).ok_or(PeError::NoSignedData)?;
        Ok(SignatureBlob {
            offset: entry.data_offset(),
            der: signed_data_blob(entry),
        })
    }
}

fn truncated(err: IoError, file_size: u64) -> PeError {
    match err {
        IoError::ShortRead { offset, wanted, .. } => PeError::TruncatedHeader {
            expected: (offset + wanted) as usize,
            actual: file_size as usize,
        },
        other => PeError::Io(other),
    }
}
