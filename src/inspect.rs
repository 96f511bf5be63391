//! The inspection pipeline.
//!
//! Paths arrive from discovery in order. Each one goes through the
//! certificate service; successes are counted and handed to the sink
//! together, failures are classified into a [`FailureKind`] and handed to
//! the sink uncounted. Nothing a single path does can stop the run, only
//! the sink failing to write can.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::authenticode::{CertificateRecord, CertificateService};
use crate::discovery::DiscoveryError;
use crate::error::FailureKind;

/// Where a failure was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A path or directory could not be examined.
    Discovery,
    /// A file was found but its certificate could not be read.
    Certificate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub stage: Stage,
    pub kind: FailureKind,
    /// Underlying error message.
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionOutcome {
    Success(CertificateRecord),
    Failure(Failure),
}

impl InspectionOutcome {
    pub fn path(&self) -> &Path {
        match self {
            InspectionOutcome::Success(record) => &record.path,
            InspectionOutcome::Failure(failure) => &failure.path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InspectionOutcome::Success(_))
    }
}

impl From<DiscoveryError> for InspectionOutcome {
    fn from(err: DiscoveryError) -> Self {
        InspectionOutcome::Failure(Failure {
            path: err.path().to_path_buf(),
            stage: Stage::Discovery,
            kind: FailureKind::classify(&err),
            detail: err.io_error().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Certificates successfully read.
    pub count: u64,
    pub discovery_failures: u64,
    pub certificate_failures: u64,
}

/// Receives every outcome of a run, in order.
pub trait OutcomeSink {
    fn accept(&mut self, outcome: &InspectionOutcome) -> io::Result<()>;
}

impl<F> OutcomeSink for F
where
    F: FnMut(&InspectionOutcome) -> io::Result<()>,
{
    fn accept(&mut self, outcome: &InspectionOutcome) -> io::Result<()> {
        self(outcome)
    }
}

/// The sink failed; the summary covers everything up to that point.
#[derive(Debug, Error)]
#[error("Inspection stopped after {} certificates: {source}", summary.count)]
pub struct Interrupted {
    pub summary: RunSummary,
    #[source]
    pub source: io::Error,
}

pub struct Inspector<S> {
    service: S,
}

impl<S: CertificateService> Inspector<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Run the service over one path and classify the result.
    pub fn inspect_path(&self, path: &Path) -> InspectionOutcome {
        match self.service.inspect(path) {
            Ok(record) => {
                trace!(path = %path.display(), valid = record.valid, "Certificate read");
                InspectionOutcome::Success(record)
            }
            Err(err) => {
                let kind = FailureKind::classify(&err);
                debug!(path = %path.display(), %kind, error = %err, "Certificate not read");
                InspectionOutcome::Failure(Failure {
                    path: path.to_path_buf(),
                    stage: Stage::Certificate,
                    kind,
                    detail: err.to_string(),
                })
            }
        }
    }

    /// Inspect every discovered path, in order.
    pub fn run<I, K>(&self, paths: I, sink: &mut K) -> Result<RunSummary, Interrupted>
    where
        I: IntoIterator<Item = Result<PathBuf, DiscoveryError>>,
        K: OutcomeSink + ?Sized,
    {
        let mut summary = RunSummary::default();

        for item in paths {
            let outcome = match item {
                Ok(path) => self.inspect_path(&path),
                Err(err) => InspectionOutcome::from(err),
            };

            // Only outcomes the sink took are tallied.
            if let Err(source) = sink.accept(&outcome) {
                return Err(Interrupted { summary, source });
            }

            match &outcome {
                InspectionOutcome::Success(_) => summary.count += 1,
                InspectionOutcome::Failure(failure) => match failure.stage {
                    Stage::Discovery => summary.discovery_failures += 1,
                    Stage::Certificate => summary.certificate_failures += 1,
                },
            }
        }

        debug!(
            count = summary.count,
            discovery_failures = summary.discovery_failures,
            certificate_failures = summary.certificate_failures,
            "Inspection finished"
        );
        Ok(summary)
    }
}
