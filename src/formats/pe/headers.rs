//! PE header parsing
//!
//! Only the headers on the path to the security data directory are decoded:
//! DOS header, PE signature, COFF header and the optional header up to its
//! data directory array.

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{u16_at, u32_at, ReadExt};

/// Parse DOS header from data
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    if data.len() < DOS_HEADER_SIZE {
        return Err(PeError::TruncatedHeader {
            expected: DOS_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let e_magic = u16_at(data, 0)?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    Ok(DosHeader {
        e_magic,
        e_lfanew: u32_at(data, 60)?,
    })
}

/// Parse PE signature and COFF header; `data` starts at `e_lfanew`.
pub fn parse_coff_header(data: &[u8]) -> Result<CoffHeader> {
    let signature = data.read_slice_at(0, 4).ok_or(PeError::TruncatedHeader {
        expected: 4,
        actual: data.len(),
    })?;
    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    let offset = PE_SIGNATURE.len();
    if data.len() < offset + COFF_HEADER_SIZE {
        return Err(PeError::TruncatedHeader {
            expected: offset + COFF_HEADER_SIZE,
            actual: data.len(),
        });
    }

    Ok(CoffHeader {
        machine: u16_at(data, offset)?,
        number_of_sections: u16_at(data, offset + 2)?,
        time_date_stamp: u32_at(data, offset + 4)?,
        size_of_optional_header: u16_at(data, offset + 16)?,
        characteristics: u16_at(data, offset + 18)?,
    })
}

/// Parse the optional header magic and its data directories.
///
/// `data` is exactly the optional header (`size_of_optional_header` bytes).
pub fn parse_optional_header(data: &[u8]) -> Result<(PeKind, Vec<DataDirectory>)> {
    let magic = u16_at(data, 0)?;
    let kind = match magic {
        PE32_MAGIC => PeKind::Pe32,
        PE32PLUS_MAGIC => PeKind::Pe32Plus,
        _ => return Err(PeError::InvalidMagic(magic)),
    };

    let count = u32_at(data, kind.rva_count_offset())?;
    let directories = parse_data_directories(data, kind.data_directory_offset(), count);
    Ok((kind, directories))
}

/// Parse up to 16 data directories, padding missing entries with empties.
pub fn parse_data_directories(data: &[u8], offset: usize, count: u32) -> Vec<DataDirectory> {
    let count = (count as usize).min(IMAGE_NUMBEROF_DIRECTORY_ENTRIES);
    let mut directories = Vec::with_capacity(IMAGE_NUMBEROF_DIRECTORY_ENTRIES);

    for i in 0..count {
        let dir_offset = offset + i * 8;
        let (Some(virtual_address), Some(size)) = (
            data.read_u32_le_at(dir_offset),
            data.read_u32_le_at(dir_offset + 4),
        ) else {
            break;
        };
        directories.push(DataDirectory {
            virtual_address,
            size,
        });
    }

    directories.resize(IMAGE_NUMBEROF_DIRECTORY_ENTRIES, DataDirectory::default());
    directories
}
