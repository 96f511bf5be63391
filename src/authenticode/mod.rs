//! Certificate verification service.
//!
//! Given a path, [`AuthenticodeService`] finds the embedded Authenticode
//! signature (PE certificate table or MSI signature stream), decodes its
//! PKCS#7 envelope, picks the signer certificate and evaluates it.
//! [`CertificateService`] is the seam the inspection pipeline is driven
//! through.

use std::path::Path;

use bcder::decode::Constructed;
use bcder::{ConstOid, Mode, OctetString, Oid};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use x509_certificate::CapturedX509Certificate;

pub mod error;
pub mod record;
pub mod signed_data;
pub mod validation;

pub use error::{CertificateError, Result};
pub use record::CertificateRecord;

use crate::formats::msi::MsiPackage;
use crate::formats::pe::PeImage;
use crate::formats::{ContainerKind, SignatureBlob};
use crate::io::IOLimits;
use signed_data::{SignedData, SignerIdentifier};

/// Produces a certificate record for one file, or fails.
pub trait CertificateService {
    fn inspect(&self, path: &Path) -> Result<CertificateRecord>;
}

impl<S: CertificateService + ?Sized> CertificateService for &S {
    fn inspect(&self, path: &Path) -> Result<CertificateRecord> {
        (**self).inspect(path)
    }
}

/// Reads Authenticode signatures straight from PE images and MSI packages.
#[derive(Debug, Clone, Default)]
pub struct AuthenticodeService {
    limits: IOLimits,
    /// Evaluation time; the wall clock when unset.
    at: Option<DateTime<Utc>>,
}

impl AuthenticodeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: IOLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Evaluate validity windows at a fixed time instead of now.
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }

    /// Locate the raw signature blob for `path`.
    pub fn extract(&self, path: &Path) -> Result<SignatureBlob> {
        match ContainerKind::sniff(path, self.limits.clone())? {
            ContainerKind::Pe => {
                let mut pe = PeImage::open_with_limits(path, self.limits.clone())?;
                Ok(pe.signature()?)
            }
            ContainerKind::Msi => {
                let mut msi = MsiPackage::open(path)?;
                Ok(msi.signature()?)
            }
            ContainerKind::Unknown => Err(CertificateError::UnsupportedContainer),
        }
    }
}

impl CertificateService for AuthenticodeService {
    fn inspect(&self, path: &Path) -> Result<CertificateRecord> {
        let blob = self.extract(path)?;
        trace!(path = %path.display(), offset = blob.offset, len = blob.der.len(), "Found signature blob");

        let signed = SignedData::decode_ber(&blob.der).map_err(CertificateError::SignedData)?;
        let certificates = signed
            .certificates
            .iter()
            .map(|der| CapturedX509Certificate::from_der(der.to_vec()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let info = signed
            .signer_infos
            .first()
            .ok_or(CertificateError::NoSigner)?;
        let signer =
            find_signer(&certificates, &info.sid).ok_or(CertificateError::NoCertificate)?;

        let at = self.at.unwrap_or_else(Utc::now);
        let valid = match validation::evaluate(signer, info, &certificates, at) {
            Ok(()) => true,
            Err(reason) => {
                debug!(path = %path.display(), %reason, "Certificate is invalid");
                false
            }
        };

        CertificateRecord::from_certificate(path, signer, blob.offset, valid)
    }
}

/// 2.5.29.14
const OID_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);

/// Match the signer by issuer and serial or by subject key identifier,
/// falling back to the first embedded certificate.
pub fn find_signer<'a>(
    certificates: &'a [CapturedX509Certificate],
    sid: &SignerIdentifier,
) -> Option<&'a CapturedX509Certificate> {
    let matched = match sid {
        SignerIdentifier::IssuerAndSerialNumber {
            issuer,
            serial_number,
        } => certificates
            .iter()
            .find(|c| c.issuer_name() == issuer && c.serial_number_asn1() == serial_number),
        SignerIdentifier::SubjectKeyIdentifier(key_id) => certificates
            .iter()
            .find(|c| subject_key_identifier(c).as_deref() == Some(&key_id[..])),
    };
    matched.or_else(|| certificates.first())
}

/// The `KeyIdentifier` in a certificate's subjectKeyIdentifier extension.
pub fn subject_key_identifier(cert: &CapturedX509Certificate) -> Option<Bytes> {
    let extension = cert
        .iter_extensions()
        .find(|e| e.id == OID_SUBJECT_KEY_IDENTIFIER)?;
    let value = extension.value.to_bytes();
    Constructed::decode(value.as_ref(), Mode::Der, |cons| OctetString::take_from(cons))
        .ok()
        .map(OctetString::into_bytes)
}
