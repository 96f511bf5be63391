//! Reader for the small `.ini` dialect used by `sigins.ini`.
//!
//! `[Name]` opens a section, `name = value` adds an entry to it, and lines
//! starting with `;` or `#` are comments. Lines before the first section
//! header are ignored.

use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected `name = value`")]
    MissingEquals { line: usize },

    #[error("line {line}: unterminated section header")]
    UnterminatedHeader { line: usize },
}

/// One `name = value` line. Both sides are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number in the source text.
    pub line: usize,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// First section called `name`, ignoring ASCII case.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with(';') || line.starts_with('#')
}

pub fn parse(text: &str) -> Result<Document, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut document = Document::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::UnterminatedHeader { line })?;
            document.sections.push(Section {
                name: name.trim().to_string(),
                entries: Vec::new(),
            });
            continue;
        }

        let Some(section) = document.sections.last_mut() else {
            trace!(line, "Skipping line outside any section");
            continue;
        };

        let (key, value) = trimmed
            .split_once('=')
            .ok_or(ParseError::MissingEquals { line })?;
        section.entries.push(Entry {
            line,
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        });
    }

    Ok(document)
}
