//! Utility functions for PE parsing

use crate::formats::pe::types::{PeError, Result};

/// Extension trait for reading primitive types from byte slices
pub trait ReadExt {
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.get(offset..offset.checked_add(2)?)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline(always)]
    fn read_slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.get(offset..offset.checked_add(len)?)
    }
}

/// Read a little-endian `u16`, reporting truncation against `data`.
pub fn u16_at(data: &[u8], offset: usize) -> Result<u16> {
    data.read_u16_le_at(offset)
        .ok_or(PeError::TruncatedHeader {
            expected: offset + 2,
            actual: data.len(),
        })
}

/// Read a little-endian `u32`, reporting truncation against `data`.
pub fn u32_at(data: &[u8], offset: usize) -> Result<u32> {
    data.read_u32_le_at(offset)
        .ok_or(PeError::TruncatedHeader {
            expected: offset + 4,
            actual: data.len(),
        })
}

/// Align a value up to the specified alignment
#[inline(always)]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        value
    } else {
        value.div_ceil(alignment) * alignment
    }
}
