//! Errors raised while extracting and evaluating an embedded certificate.

use std::convert::Infallible;

use bcder::decode::DecodeError;
use thiserror::Error;
use x509_certificate::X509CertificateError;

use crate::error::{Classify, FailureKind};
use crate::formats::msi::MsiError;
use crate::formats::pe::PeError;
use crate::io::error::IoError;

#[derive(Debug, Error)]
pub enum CertificateError {
    /// Neither a PE image nor an OLE compound file.
    #[error("File is not a PE image or MSI package")]
    UnsupportedContainer,

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Pe(#[from] PeError),

    #[error(transparent)]
    Msi(#[from] MsiError),

    #[error("Malformed PKCS#7 signed data: {0}")]
    SignedData(#[source] DecodeError<Infallible>),

    #[error("Signature carries no signer information")]
    NoSigner,

    #[error("Signature carries no certificate for its signer")]
    NoCertificate,

    #[error("Malformed certificate: {0}")]
    X509(#[from] X509CertificateError),

    #[error("Unreadable distinguished name: {0}")]
    Name(#[source] DecodeError<Infallible>),
}

impl Classify for CertificateError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CertificateError::Io(e) => e.failure_kind(),
            CertificateError::Pe(e) => e.failure_kind(),
            CertificateError::Msi(e) => e.failure_kind(),
            CertificateError::UnsupportedContainer
            | CertificateError::SignedData(_)
            | CertificateError::NoSigner
            | CertificateError::NoCertificate
            | CertificateError::X509(_)
            | CertificateError::Name(_) => Some(FailureKind::LoadFailure),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertificateError>;
