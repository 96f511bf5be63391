//! Validity evaluation of a signer certificate.
//!
//! A signature is valid when the signer certificate is inside its validity
//! window, the signer info's signature over the signed attributes verifies
//! with that certificate's key, and every issuer link that can be resolved
//! from the embedded certificates verifies. A chain that stops short of a
//! self-signed root is accepted since no trust store is consulted.

use chrono::{DateTime, Utc};
use thiserror::Error;
use x509_certificate::{
    CapturedX509Certificate, DigestAlgorithm, SignatureAlgorithm, X509CertificateError,
};

use crate::authenticode::signed_data::SignerInfo;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Certificate is not valid at {at} (valid {not_before} to {not_after})")]
    OutsideValidity {
        at: DateTime<Utc>,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
    },

    #[error("Signer info has no signed attributes to verify")]
    MissingSignedAttributes,

    #[error("Signer signature does not verify: {0}")]
    Signature(#[source] X509CertificateError),

    #[error("Certificate {depth} in the chain is not signed by its issuer: {source}")]
    Chain {
        depth: usize,
        #[source]
        source: X509CertificateError,
    },
}

/// Run every check, stopping at the first failure.
pub fn evaluate(
    signer: &CapturedX509Certificate,
    info: &SignerInfo,
    certificates: &[CapturedX509Certificate],
    at: DateTime<Utc>,
) -> Result<(), ValidationError> {
    check_time(signer, at)?;
    verify_signer_info(signer, info)?;
    verify_chain(signer, certificates)
}

pub fn check_time(cert: &CapturedX509Certificate, at: DateTime<Utc>) -> Result<(), ValidationError> {
    if cert.time_constraints_valid(Some(at)) {
        Ok(())
    } else {
        Err(ValidationError::OutsideValidity {
            at,
            not_before: cert.validity_not_before(),
            not_after: cert.validity_not_after(),
        })
    }
}

/// Verify the signer info's signature over its DER signed attributes.
pub fn verify_signer_info(
    signer: &CapturedX509Certificate,
    info: &SignerInfo,
) -> Result<(), ValidationError> {
    let signed_content = info
        .signed_attributes_digested_content()
        .ok_or(ValidationError::MissingSignedAttributes)?;

    let digest =
        DigestAlgorithm::try_from(&info.digest_algorithm).map_err(ValidationError::Signature)?;
    let algorithm = SignatureAlgorithm::from_oid_and_digest_algorithm(
        &info.signature_algorithm.algorithm,
        digest,
    )
    .map_err(ValidationError::Signature)?;
    let key_algorithm = signer.key_algorithm().ok_or_else(|| {
        ValidationError::Signature(X509CertificateError::UnknownKeyAlgorithm(
            signer.key_algorithm_oid().to_string(),
        ))
    })?;
    let verify = algorithm
        .resolve_verification_algorithm(key_algorithm)
        .map_err(ValidationError::Signature)?;

    signer
        .verify_signed_data_with_algorithm(signed_content, &info.signature, verify)
        .map_err(ValidationError::Signature)
}

/// Walk issuer links among the embedded certificates.
pub fn verify_chain(
    signer: &CapturedX509Certificate,
    certificates: &[CapturedX509Certificate],
) -> Result<(), ValidationError> {
    let mut current = signer;
    // Each certificate can appear at most once in a chain.
    for depth in 0..=certificates.len() {
        let Some(issuer) = certificates
            .iter()
            .find(|c| c.subject_name() == current.issuer_name())
        else {
            return Ok(());
        };

        current
            .verify_signed_by_certificate(issuer)
            .map_err(|source| ValidationError::Chain { depth, source })?;

        if issuer == current {
            return Ok(());
        }
        current = issuer;
    }
    Ok(())
}
