//! Run configuration.
//!
//! A run is driven either by explicit command-line flags or, when none are
//! given, by the `[Flags]` section of `sigins.ini`. The `[Styling]` palette
//! is read whenever styling is on. Once resolved, [`Config`] is immutable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub mod ini;
pub mod palette;

pub use palette::{ColorCode, Palette};

pub const CONFIG_FILE_NAME: &str = "sigins.ini";

/// Report file used when output is on but no path was given.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "o.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed config file {}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    #[error("{}: line {line}: `{key}` must be TRUE or FALSE, found `{value}`", path.display())]
    InvalidFlag {
        path: PathBuf,
        line: usize,
        key: String,
        value: String,
    },

    #[error(
        "{}: line {line}: `{key}` must be a color code from 0 to 15, found `{value}`",
        path.display()
    )]
    InvalidColor {
        path: PathBuf,
        line: usize,
        key: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// The six switches, in `[Flags]` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub recursive: bool,
    pub binaries_only: bool,
    pub output: bool,
    pub verbose: bool,
    pub show_exceptions: bool,
    pub style: bool,
}

impl Flags {
    pub const SLOTS: usize = 6;

    pub fn any(&self) -> bool {
        self.recursive
            || self.binaries_only
            || self.output
            || self.verbose
            || self.show_exceptions
            || self.style
    }

    fn set(&mut self, slot: usize, value: bool) -> bool {
        let target = match slot {
            0 => &mut self.recursive,
            1 => &mut self.binaries_only,
            2 => &mut self.output,
            3 => &mut self.verbose,
            4 => &mut self.show_exceptions,
            5 => &mut self.style,
            _ => return false,
        };
        *target = value;
        true
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A parsed `sigins.ini`.
///
/// Entries are positional: the n-th entry of `[Flags]` sets the n-th flag
/// whatever its name, and likewise for `[Styling]`. Sections are only
/// validated when they are asked for.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    path: PathBuf,
    document: ini::Document,
}

impl ConfigFile {
    /// Read `path`; a missing file reads as an empty one.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self {
                    path: path.to_path_buf(),
                    document: ini::Document::default(),
                })
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let document = ini::parse(text).map_err(|source| ConfigError::Syntax {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flags(&self) -> Result<Flags> {
        let mut flags = Flags::default();
        let Some(section) = self.document.section("Flags") else {
            return Ok(flags);
        };

        for (slot, entry) in section.entries.iter().enumerate() {
            let value = parse_bool(&entry.value).ok_or_else(|| ConfigError::InvalidFlag {
                path: self.path.clone(),
                line: entry.line,
                key: entry.key.clone(),
                value: entry.value.clone(),
            })?;
            if !flags.set(slot, value) {
                debug!(line = entry.line, key = %entry.key, "Ignoring extra [Flags] entry");
            }
        }
        Ok(flags)
    }

    pub fn palette(&self) -> Result<Palette> {
        let mut palette = Palette::default();
        let Some(section) = self.document.section("Styling") else {
            return Ok(palette);
        };

        for (slot, entry) in section.entries.iter().enumerate() {
            let color = ColorCode::parse(&entry.value).ok_or_else(|| ConfigError::InvalidColor {
                path: self.path.clone(),
                line: entry.line,
                key: entry.key.clone(),
                value: entry.value.clone(),
            })?;
            if !palette.set(slot, color) {
                debug!(line = entry.line, key = %entry.key, "Ignoring extra [Styling] entry");
            }
        }
        Ok(palette)
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub flags: Flags,
    /// Report file given with `--output`, if any.
    pub output_path: Option<PathBuf>,
}

/// Resolved configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub recursive: bool,
    pub binaries_only: bool,
    /// Report file; reports go to stdout when `None`.
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub show_exceptions: bool,
    /// Palette for borders and coloring; plain output when `None`.
    pub style: Option<Palette>,
}

impl Config {
    /// Combine command-line `overrides` with the config file at
    /// `config_path`.
    ///
    /// The file is read when no flag was given on the command line, or
    /// when styling is requested (for its palette).
    pub fn resolve(overrides: &Overrides, config_path: &Path) -> Result<Self> {
        let explicit = overrides.flags.any();
        let file = if !explicit || overrides.flags.style {
            Some(ConfigFile::load(config_path)?)
        } else {
            None
        };

        let flags = match &file {
            Some(file) if !explicit => file.flags()?,
            _ => overrides.flags,
        };

        let output = flags.output.then(|| {
            overrides
                .output_path
                .clone()
                .unwrap_or_else(|| default_output_path(config_path))
        });

        let style = if flags.style {
            let palette = file.as_ref().map(ConfigFile::palette).transpose()?;
            Some(palette.unwrap_or_default())
        } else {
            None
        };

        let config = Self {
            recursive: flags.recursive,
            binaries_only: flags.binaries_only,
            output,
            verbose: flags.verbose,
            show_exceptions: flags.show_exceptions,
            style,
        };
        debug!(?config, explicit, "Resolved configuration");
        Ok(config)
    }
}

/// `sigins.ini` next to the running executable.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// `o.txt` in the config file's directory.
pub fn default_output_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join(DEFAULT_OUTPUT_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE_NAME))
}
