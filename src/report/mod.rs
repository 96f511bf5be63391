//! Report output.
//!
//! A [`Reporter`] owns the run's single report destination: the console,
//! or a report file created (and truncated) when the run starts. Failure
//! diagnostics and the final count always go to the console. Styled
//! console output is colored from the palette; files are never colored.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::authenticode::CertificateRecord;
use crate::config::{Config, Palette};
use crate::inspect::{Failure, InspectionOutcome, OutcomeSink, Stage};

pub mod format;
pub mod style;

pub use format::{format_count, format_failure, format_record, Element, Line, Report};

struct ReportFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

pub struct Reporter<C: Write> {
    console: C,
    file: Option<ReportFile>,
    verbose: bool,
    show_exceptions: bool,
    palette: Option<Palette>,
}

impl<C: Write> Reporter<C> {
    /// Open the destination `config` asks for.
    ///
    /// Fails only when the report file cannot be created.
    pub fn new(config: &Config, console: C) -> io::Result<Self> {
        let file = match &config.output {
            Some(path) => {
                let file = File::create(path)?;
                debug!(path = %path.display(), "Writing reports to file");
                Some(ReportFile {
                    path: path.clone(),
                    writer: BufWriter::new(file),
                })
            }
            None => None,
        };

        Ok(Self {
            console,
            file,
            verbose: config.verbose,
            show_exceptions: config.show_exceptions,
            palette: config.style,
        })
    }

    /// The report file, when reports do not go to the console.
    pub fn output_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path.as_path())
    }

    pub fn emit(&mut self, record: &CertificateRecord) -> io::Result<()> {
        let report = format_record(record, self.verbose, self.palette.is_some());
        match (&mut self.file, &self.palette) {
            (Some(file), _) => file.writer.write_all(report.to_plain().as_bytes()),
            (None, Some(palette)) => {
                for line in &report.lines {
                    writeln!(self.console, "{}", style::paint(&line.text, palette, line.element))?;
                }
                Ok(())
            }
            (None, None) => self.console.write_all(report.to_plain().as_bytes()),
        }
    }

    /// Discovery failures are always shown; certificate failures only when
    /// exceptions are on.
    pub fn diagnostic(&mut self, failure: &Failure) -> io::Result<()> {
        if failure.stage == Stage::Certificate && !self.show_exceptions {
            return Ok(());
        }
        self.console
            .write_all(format_failure(failure, self.verbose).as_bytes())
    }

    /// Flush and close the report file.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.writer.flush()?;
            debug!(path = %file.path.display(), "Report file closed");
        }
        Ok(())
    }

    /// Print the final count on the console.
    pub fn finish(&mut self, count: u64) -> io::Result<()> {
        writeln!(self.console, "{}", format_count(count))?;
        self.console.flush()
    }

    pub fn into_console(mut self) -> C {
        if let Err(err) = self.close() {
            warn!(error = %err, "Failed to flush report file");
        }
        self.console
    }
}

impl<C: Write> OutcomeSink for Reporter<C> {
    fn accept(&mut self, outcome: &InspectionOutcome) -> io::Result<()> {
        match outcome {
            InspectionOutcome::Success(record) => self.emit(record),
            InspectionOutcome::Failure(failure) => self.diagnostic(failure),
        }
    }
}
