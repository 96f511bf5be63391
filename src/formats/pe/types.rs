//! Core PE data types for locating Authenticode signatures

use std::fmt;

use bytes::Bytes;

use crate::error::{Classify, FailureKind};
use crate::io::error::IoError;

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

pub const DOS_HEADER_SIZE: usize = 64;
pub const COFF_HEADER_SIZE: usize = 20;

// Data directory indices
pub const IMAGE_DIRECTORY_ENTRY_SECURITY: usize = 4;
pub const IMAGE_NUMBEROF_DIRECTORY_ENTRIES: usize = 16;

// WIN_CERTIFICATE
pub const WIN_CERTIFICATE_HEADER_SIZE: usize = 8;
pub const WIN_CERT_REVISION_1_0: u16 = 0x0100;
pub const WIN_CERT_REVISION_2_0: u16 = 0x0200;
pub const WIN_CERT_TYPE_X509: u16 = 0x0001;
pub const WIN_CERT_TYPE_PKCS_SIGNED_DATA: u16 = 0x0002;
pub const WIN_CERT_TYPE_TS_STACK_SIGNED: u16 = 0x0004;

/// Upper bound on the attribute certificate table we are willing to read.
pub const MAX_CERTIFICATE_TABLE_SIZE: u32 = 16 * 1024 * 1024;

/// PE parsing error types
#[derive(Debug)]
pub enum PeError {
    InvalidDosSignature,
    InvalidPeSignature,
    InvalidMagic(u16),
    TruncatedHeader { expected: usize, actual: usize },
    InvalidOffset { offset: u64 },
    NotSigned,
    MalformedCertificateTable(&'static str),
    NoSignedData,
    LimitExceeded(&'static str),
    Io(IoError),
}

impl fmt::Display for PeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDosSignature => write!(f, "Invalid DOS signature"),
            Self::InvalidPeSignature => write!(f, "Invalid PE signature"),
            Self::InvalidMagic(m) => write!(f, "Invalid optional header magic: 0x{:04x}", m),
            Self::TruncatedHeader { expected, actual } => {
                write!(
                    f,
                    "Truncated header: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidOffset { offset } => write!(f, "Invalid file offset: 0x{:x}", offset),
            Self::NotSigned => write!(f, "Image has no security directory"),
            Self::MalformedCertificateTable(why) => {
                write!(f, "Malformed certificate table: {}", why)
            }
            Self::NoSignedData => write!(f, "Certificate table holds no PKCS#7 signed data"),
            Self::LimitExceeded(what) => write!(f, "Limit exceeded: {}", what),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IoError> for PeError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl Classify for PeError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Io(e) => e.failure_kind(),
            Self::LimitExceeded(_) => Some(FailureKind::IoFailure),
            _ => Some(FailureKind::LoadFailure),
        }
    }
}

pub type Result<T> = std::result::Result<T, PeError>;

/// Optional header flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeKind {
    Pe32,
    Pe32Plus,
}

impl PeKind {
    /// Offset of `NumberOfRvaAndSizes` within the optional header.
    pub fn rva_count_offset(self) -> usize {
        match self {
            Self::Pe32 => 92,
            Self::Pe32Plus => 108,
        }
    }

    /// Offset of the first data directory within the optional header.
    pub fn data_directory_offset(self) -> usize {
        self.rva_count_offset() + 4
    }
}

/// DOS header fields we need
#[derive(Debug, Clone, Copy)]
pub struct DosHeader {
    pub e_magic: u16,  // Magic number (MZ)
    pub e_lfanew: u32, // File address of PE header
}

/// COFF header (20 bytes)
#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// Data directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

impl DataDirectory {
    pub fn is_empty(&self) -> bool {
        self.virtual_address == 0 || self.size == 0
    }
}

/// Everything between `e_lfanew` and the section table that we care about.
#[derive(Debug, Clone)]
pub struct NtHeaders {
    pub file_header: CoffHeader,
    pub kind: PeKind,
    pub data_directories: Vec<DataDirectory>,
}

impl NtHeaders {
    /// The security directory. Unlike every other directory, its address is a
    /// file offset rather than an RVA.
    pub fn security_directory(&self) -> DataDirectory {
        self.data_directories
            .get(IMAGE_DIRECTORY_ENTRY_SECURITY)
            .copied()
            .unwrap_or_default()
    }
}

/// One entry of the attribute certificate table
#[derive(Debug, Clone)]
pub struct WinCertificate {
    /// File offset of the entry header.
    pub offset: u64,
    pub length: u32,
    pub revision: u16,
    pub certificate_type: u16,
    /// `bCertificate`, without the 8-byte header.
    pub data: Bytes,
}

impl WinCertificate {
    pub fn is_signed_data(&self) -> bool {
        self.certificate_type == WIN_CERT_TYPE_PKCS_SIGNED_DATA
    }

    /// File offset of `bCertificate`.
    pub fn data_offset(&self) -> u64 {
        self.offset + WIN_CERTIFICATE_HEADER_SIZE as u64
    }
}
