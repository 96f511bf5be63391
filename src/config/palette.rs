//! Console colors for styled reports.

use std::fmt;

/// One of the sixteen classic console colors, by its numeric code.
///
/// Codes 0 to 7 are the dark variants (black, blue, green, cyan, red,
/// magenta, yellow, gray), 8 to 15 the bright ones (dark gray, blue, green,
/// cyan, red, magenta, yellow, white).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const MAX: u8 = 15;

    pub const fn new(code: u8) -> Option<Self> {
        if code <= Self::MAX {
            Some(Self(code))
        } else {
            None
        }
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Parse a decimal code such as `" 11 "`.
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<u8>().ok().and_then(Self::new)
    }
}

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Colors for each styled element of a report, in `[Styling]` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub border: ColorCode,
    pub path: ColorCode,
    pub issuer: ColorCode,
    pub validity: ColorCode,
    pub details: ColorCode,
    pub archived: ColorCode,
    pub valid: ColorCode,
    pub invalid: ColorCode,
}

impl Palette {
    pub const SLOTS: usize = 8;

    /// Replace the entry at `slot` (0-based, `[Styling]` order).
    pub fn set(&mut self, slot: usize, color: ColorCode) -> bool {
        let target = match slot {
            0 => &mut self.border,
            1 => &mut self.path,
            2 => &mut self.issuer,
            3 => &mut self.validity,
            4 => &mut self.details,
            5 => &mut self.archived,
            6 => &mut self.valid,
            7 => &mut self.invalid,
            _ => return false,
        };
        *target = color;
        true
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            border: ColorCode(8),
            path: ColorCode(15),
            issuer: ColorCode(11),
            validity: ColorCode(14),
            details: ColorCode(7),
            archived: ColorCode(7),
            valid: ColorCode(10),
            invalid: ColorCode(12),
        }
    }
}
