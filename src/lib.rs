//! siginspect: audit the certificates embedded in signed files.
//!
//! The pipeline is [`discovery`] (which paths to look at), the
//! [`authenticode`] certificate service (what signed each one), [`inspect`]
//! (classification and counting) and [`report`] (what gets printed).
//! [`app`] wires them together for the binary.

pub mod app;
pub mod authenticode;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod io;
pub mod logging;
pub mod report;

pub use authenticode::{AuthenticodeService, CertificateRecord, CertificateService};
pub use config::Config;
pub use discovery::{discover, is_eligible, Discovery, DiscoveryOptions};
pub use error::{FailureKind, SigInspectError};
pub use inspect::{InspectionOutcome, Inspector, RunSummary};
