//! Signature container formats
//!
//! A container is any file layout that can carry an Authenticode PKCS#7
//! blob: PE images keep it in the attribute certificate table, MSI packages
//! in a dedicated compound file stream.

use std::path::Path;

use bytes::Bytes;

use crate::io::{error::Result, IOLimits, SafeReader};

pub mod msi;
pub mod pe;

/// OLE compound file header signature.
pub const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Raw PKCS#7 `ContentInfo` pulled out of a container.
#[derive(Debug, Clone)]
pub struct SignatureBlob {
    /// Byte offset of `der` within its container. MSI streams report 0.
    pub offset: u64,
    pub der: Bytes,
}

/// Container format, as told by the leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Pe,
    Msi,
    Unknown,
}

impl ContainerKind {
    pub fn detect(prefix: &[u8]) -> Self {
        if prefix.starts_with(b"MZ") {
            Self::Pe
        } else if prefix.starts_with(&CFB_MAGIC) {
            Self::Msi
        } else {
            Self::Unknown
        }
    }

    /// Read the first bytes of `path` and detect its container kind.
    pub fn sniff<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let mut reader = SafeReader::open(path, limits)?;
        let prefix = reader.read_prefix(CFB_MAGIC.len() as u64)?;
        Ok(Self::detect(&prefix))
    }
}

/// Length of the DER/BER element starting at `data[0]`, header included.
///
/// Returns `None` for indefinite lengths, lengths that do not fit in `usize`
/// and elements that run past the end of `data`.
pub fn der_element_len(data: &[u8]) -> Option<usize> {
    let first = *data.get(1)?;
    let (content_len, header_len) = if first & 0x80 == 0 {
        (first as usize, 2usize)
    } else {
        let count = (first & 0x7f) as usize;
        // 0x80 is the indefinite form
        if count == 0 || count > std::mem::size_of::<usize>() {
            return None;
        }
        let bytes = data.get(2..2 + count)?;
        let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
        (len, 2 + count)
    };
    let total = header_len.checked_add(content_len)?;
    (total <= data.len()).then_some(total)
}


/// `data` cut to its leading DER element, dropping container padding.
///
/// A blob whose outer length cannot be determined (BER indefinite form) is
/// returned whole and left for the decoder to judge.
pub fn trim_to_element(data: &Bytes) -> Bytes {
    match der_element_len(data) {
        Some(len) => data.slice(..len),
        None => data.clone(),
    }
}
