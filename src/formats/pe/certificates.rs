//! Attribute certificate table parsing
//!
//! The table is a sequence of `WIN_CERTIFICATE` entries, each an 8-byte
//! header (`dwLength`, `wRevision`, `wCertificateType`) followed by
//! `bCertificate`, with every entry starting on an 8-byte boundary.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{align_up, u16_at, u32_at};
use crate::formats::trim_to_element;

/// Split the certificate table into its entries.
///
/// `base` is the file offset of `table`. Trailing bytes too short to hold an
/// entry header are treated as padding.
pub fn parse_certificate_table(table: &Bytes, base: u64) -> Result<Vec<WinCertificate>> {
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos + WIN_CERTIFICATE_HEADER_SIZE <= table.len() {
        let length = u32_at(table, pos)?;
        let revision = u16_at(table, pos + 4)?;
        let certificate_type = u16_at(table, pos + 6)?;

        if (length as usize) < WIN_CERTIFICATE_HEADER_SIZE {
            // An all-zero tail is padding, anything else is corrupt.
            if length == 0 && table[pos..].iter().all(|&b| b == 0) {
                break;
            }
            return Err(PeError::MalformedCertificateTable(
                "entry shorter than its header",
            ));
        }
        let end = pos
            .checked_add(length as usize)
            .filter(|&end| end <= table.len())
            .ok_or(PeError::MalformedCertificateTable("entry overruns the table"))?;

        trace!(
            offset = base + pos as u64,
            length,
            revision,
            certificate_type,
            "WIN_CERTIFICATE entry"
        );

        entries.push(WinCertificate {
            offset: base + pos as u64,
            length,
            revision,
            certificate_type,
            data: table.slice(pos + WIN_CERTIFICATE_HEADER_SIZE..end),
        });

        pos = align_up(end as u64, 8) as usize;
    }

    debug!(count = entries.len(), "Parsed certificate table");
    Ok(entries)
}

/// The first Authenticode entry: PKCS#7 signed data with a known revision.
pub fn first_signed_data(entries: &[WinCertificate]) -> Option<&WinCertificate> {
    entries.iter().find(|e| {
        e.is_signed_data()
            && matches!(e.revision, WIN_CERT_REVISION_1_0 | WIN_CERT_REVISION_2_0)
    })
}

/// The DER `ContentInfo` inside an entry, without alignment padding.
///
/// Signers pad `bCertificate` with zeros to the next 8-byte boundary.
pub fn signed_data_blob(entry: &WinCertificate) -> Bytes {
    trim_to_element(&entry.data)
}
