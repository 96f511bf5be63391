//! Palette lookups for styled console output.

use colored::{Color, ColoredString, Colorize};

use crate::config::{ColorCode, Palette};
use crate::report::format::Element;

/// Console color for a palette code, in classic console order.
pub fn console_color(code: ColorCode) -> Color {
    match code.code() {
        0 => Color::Black,
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Cyan,
        4 => Color::Red,
        5 => Color::Magenta,
        6 => Color::Yellow,
        7 => Color::White,
        8 => Color::BrightBlack,
        9 => Color::BrightBlue,
        10 => Color::BrightGreen,
        11 => Color::BrightCyan,
        12 => Color::BrightRed,
        13 => Color::BrightMagenta,
        14 => Color::BrightYellow,
        _ => Color::BrightWhite,
    }
}

/// Palette entry for a report element; blank lines have none.
pub fn element_color(palette: &Palette, element: Element) -> Option<ColorCode> {
    let code = match element {
        Element::Border => palette.border,
        Element::Path => palette.path,
        Element::Issuer => palette.issuer,
        Element::Validity => palette.validity,
        Element::Details => palette.details,
        Element::Archived => palette.archived,
        Element::Valid => palette.valid,
        Element::Invalid => palette.invalid,
        Element::Blank => return None,
    };
    Some(code)
}

pub fn paint(text: &str, palette: &Palette, element: Element) -> ColoredString {
    match element_color(palette, element) {
        Some(code) => text.color(console_color(code)),
        None => text.normal(),
    }
}
