use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use x509_certificate::{CapturedX509Certificate, DigestAlgorithm};

use crate::authenticode::error::{CertificateError, Result};

/// Everything reported about the certificate that signed one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub path: PathBuf,
    pub issuer: String,
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// Uppercase hex of the serial number's content octets.
    pub serial_number: String,
    /// Uppercase hex SHA-1 of the certificate DER.
    pub thumbprint: String,
    /// Byte offset of the signature blob inside its container.
    pub handle: u64,
    /// X.509 version, 1 through 3.
    pub version: u8,
    pub archived: bool,
    pub valid: bool,
}

impl CertificateRecord {
    pub fn from_certificate(
        path: &Path,
        cert: &CapturedX509Certificate,
        handle: u64,
        valid: bool,
    ) -> Result<Self> {
        let issuer = cert
            .issuer_name()
            .user_friendly_str()
            .map_err(CertificateError::Name)?;
        let subject = cert
            .subject_name()
            .user_friendly_str()
            .map_err(CertificateError::Name)?;

        Ok(Self {
            path: path.to_path_buf(),
            issuer,
            subject,
            not_before: cert.validity_not_before(),
            not_after: cert.validity_not_after(),
            serial_number: hex::encode_upper(cert.serial_number_asn1().as_slice()),
            thumbprint: thumbprint(cert),
            handle,
            version: x509_version(cert),
            // Certificates read out of a file never come from a store.
            archived: false,
            valid,
        })
    }
}

/// SHA-1 over the certificate exactly as it was embedded.
pub fn thumbprint(cert: &CapturedX509Certificate) -> String {
    hex::encode_upper(DigestAlgorithm::Sha1.digest_data(cert.constructed_data()))
}

/// The absent version field means v1.
pub fn x509_version(cert: &CapturedX509Certificate) -> u8 {
    cert.tbs_certificate()
        .version
        .map(|v| u8::from(v) + 1)
        .unwrap_or(1)
}
