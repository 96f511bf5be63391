//! Text layout of a certificate report.
//!
//! A report is three blocks of lines:
//!
//! ```text
//! O-------------------O          (styled only)
//! Path: C:\tools\setup.exe
//! Issuer: CN=Example CA, O=Example, C=US
//! Active from: 2020-01-01 00:00:00 UTC
//! Active until: 2049-12-31 00:00:00 UTC
//! Subject: CN=Example Signer, C=US       (verbose only)
//! Serial number: 5A17C0DE                (verbose only)
//! Thumbprint: F1F71E19...                (verbose only)
//! Handle: 336                            (verbose only)
//! Version: 3                             (verbose only)
//! Certificate is not archived
//! Certificate is valid
//! O-------------------O          (styled only)
//! ```
//!
//! followed by one blank line.

use chrono::{DateTime, Utc};

use crate::authenticode::CertificateRecord;
use crate::inspect::Failure;

pub const BORDER: &str = "O-------------------O";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// What a line shows, which decides its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Border,
    Path,
    Issuer,
    Validity,
    Details,
    Archived,
    Valid,
    Invalid,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub element: Element,
    pub text: String,
}

impl Line {
    fn new(element: Element, text: impl Into<String>) -> Self {
        Self {
            element,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(Element::Blank, "")
    }
}

/// A formatted report, line by line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<Line>,
}

impl Report {
    /// Every line followed by a newline, without styling.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn header_block(record: &CertificateRecord, bordered: bool) -> Vec<Line> {
    let mut lines = Vec::with_capacity(5);
    if bordered {
        lines.push(Line::new(Element::Border, BORDER));
    }
    lines.push(Line::new(
        Element::Path,
        format!("Path: {}", record.path.display()),
    ));
    lines.push(Line::new(Element::Issuer, format!("Issuer: {}", record.issuer)));
    lines.push(Line::new(
        Element::Validity,
        format!("Active from: {}", format_date(&record.not_before)),
    ));
    lines.push(Line::new(
        Element::Validity,
        format!("Active until: {}", format_date(&record.not_after)),
    ));
    lines
}

pub fn detail_block(record: &CertificateRecord) -> Vec<Line> {
    [
        format!("Subject: {}", record.subject),
        format!("Serial number: {}", record.serial_number),
        format!("Thumbprint: {}", record.thumbprint),
        format!("Handle: {}", record.handle),
        format!("Version: {}", record.version),
    ]
    .into_iter()
    .map(|text| Line::new(Element::Details, text))
    .collect()
}

pub fn status_block(record: &CertificateRecord, bordered: bool) -> Vec<Line> {
    let mut lines = Vec::with_capacity(3);
    lines.push(if record.archived {
        Line::new(Element::Archived, "Certificate is archived")
    } else {
        Line::new(Element::Archived, "Certificate is not archived")
    });
    lines.push(if record.valid {
        Line::new(Element::Valid, "Certificate is valid")
    } else {
        Line::new(Element::Invalid, "Certificate is invalid")
    });
    if bordered {
        lines.push(Line::new(Element::Border, BORDER));
    }
    lines
}

/// Lay out the report for one record.
pub fn format_record(record: &CertificateRecord, verbose: bool, bordered: bool) -> Report {
    let mut lines = header_block(record, bordered);
    if verbose {
        lines.extend(detail_block(record));
    }
    lines.extend(status_block(record, bordered));
    lines.push(Line::blank());
    Report { lines }
}

/// `path: message`, then `kind: detail` when verbose, then a blank line.
pub fn format_failure(failure: &Failure, verbose: bool) -> String {
    let mut out = format!("{}: {}\n", failure.path.display(), failure.kind.message());
    if verbose {
        out.push_str(&format!("{}: {}\n", failure.kind, failure.detail));
    }
    out.push('\n');
    out
}

pub fn format_count(count: u64) -> String {
    format!("Certificates found: {count}")
}
