//! Minimal PKCS#7 / CMS `SignedData` decoding.
//!
//! Only what signature inspection needs is kept: the embedded certificates
//! (raw DER, parsed later) and the signer infos. Digest algorithm sets,
//! encapsulated content and CRLs are skipped.
//!
//! ```ASN.1
//! ContentInfo ::= SEQUENCE {
//!   contentType ContentType,
//!   content [0] EXPLICIT ANY DEFINED BY contentType }
//!
//! SignedData ::= SEQUENCE {
//!   version CMSVersion,
//!   digestAlgorithms DigestAlgorithmIdentifiers,
//!   encapContentInfo EncapsulatedContentInfo,
//!   certificates [0] IMPLICIT CertificateSet OPTIONAL,
//!   crls [1] IMPLICIT RevocationInfoChoices OPTIONAL,
//!   signerInfos SignerInfos }
//! ```

use std::convert::Infallible;

use bcder::decode::{Constructed, DecodeError, Pos, Source};
use bcder::{ConstOid, Integer, Mode, OctetString, Oid, Tag};
use bytes::Bytes;
use x509_certificate::rfc3280::Name;
use x509_certificate::rfc5280::AlgorithmIdentifier;

/// 1.2.840.113549.1.7.2
pub const OID_ID_SIGNED_DATA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 2]);

/// DER tag of `SET OF`, used in place of the `[0] IMPLICIT` tag when
/// digesting signed attributes.
const SET_OF_TAG: u8 = 0x31;

/// DER tag of a universal `SEQUENCE`.
const SEQUENCE_TAG: u8 = 0x30;

#[derive(Clone, Debug)]
pub struct SignedData {
    pub version: u8,
    /// DER of each `Certificate` choice in the `certificates` set.
    pub certificates: Vec<Bytes>,
    pub signer_infos: Vec<SignerInfo>,
}

impl SignedData {
    /// Decode a BER encoded `ContentInfo` wrapping signed data.
    ///
    /// `data` must hold exactly one `ContentInfo`; containers strip their
    /// padding before handing the blob over.
    pub fn decode_ber(data: &[u8]) -> Result<Self, DecodeError<Infallible>> {
        let content_info = Constructed::decode(data, Mode::Ber, |cons| cons.capture_one())?;
        let used = content_info.as_slice().len();
        if used != data.len() {
            return Err(DecodeError::content(
                "trailing data after content info",
                Pos::from(used),
            ));
        }
        content_info.decode(|cons| Self::decode(cons))
    }

    pub fn decode<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let oid = Oid::take_from(cons)?;

            if oid != OID_ID_SIGNED_DATA {
                return Err(cons.content_err("content type is not signed data"));
            }

            cons.take_constructed_if(Tag::CTX_0, Self::take_from)
        })
    }

    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let version = cons.take_u8()?;
            // digestAlgorithms
            cons.take_set(|cons| cons.skip_all())?;
            // encapContentInfo
            cons.take_sequence(|cons| cons.skip_all())?;
            let certificates = cons
                .take_opt_constructed_if(Tag::CTX_0, take_certificate_set)?
                .unwrap_or_default();
            // crls
            cons.take_opt_constructed_if(Tag::CTX_1, |cons| cons.skip_all())?;
            let signer_infos = cons.take_set(|cons| {
                let mut infos = Vec::new();
                while let Some(info) = SignerInfo::take_opt_from(cons)? {
                    infos.push(info);
                }
                Ok(infos)
            })?;

            Ok(Self {
                version,
                certificates,
                signer_infos,
            })
        })
    }
}

/// Capture each `CertificateChoices` value, keeping plain certificates only.
fn take_certificate_set<S: Source>(
    cons: &mut Constructed<S>,
) -> Result<Vec<Bytes>, DecodeError<S::Error>> {
    let mut certificates = Vec::new();
    loop {
        let mut present = false;
        let captured = cons.capture(|cons| {
            present = cons.skip_one()?.is_some();
            Ok(())
        })?;
        if !present {
            break;
        }
        // Attribute and other certificate formats use context tags.
        let der = captured.into_bytes();
        if der.first() == Some(&SEQUENCE_TAG) {
            certificates.push(der);
        }
    }
    Ok(certificates)
}

/// Identifies the signer's certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignerIdentifier {
    IssuerAndSerialNumber { issuer: Name, serial_number: Integer },
    SubjectKeyIdentifier(Bytes),
}

impl SignerIdentifier {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        if let Some(identifier) = cons.take_opt_primitive_if(Tag::CTX_0, |prim| prim.take_all())? {
            Ok(Self::SubjectKeyIdentifier(identifier))
        } else {
            cons.take_sequence(|cons| {
                let issuer = Name::take_from(cons)?;
                let serial_number = Integer::take_from(cons)?;

                Ok(Self::IssuerAndSerialNumber {
                    issuer,
                    serial_number,
                })
            })
        }
    }
}

/// ```ASN.1
/// SignerInfo ::= SEQUENCE {
///   version CMSVersion,
///   sid SignerIdentifier,
///   digestAlgorithm DigestAlgorithmIdentifier,
///   signedAttrs [0] IMPLICIT SignedAttributes OPTIONAL,
///   signatureAlgorithm SignatureAlgorithmIdentifier,
///   signature SignatureValue,
///   unsignedAttrs [1] IMPLICIT UnsignedAttributes OPTIONAL }
/// ```
#[derive(Clone, Debug)]
pub struct SignerInfo {
    pub version: u8,
    pub sid: SignerIdentifier,
    pub digest_algorithm: AlgorithmIdentifier,
    /// Content octets of `signedAttrs`, exactly as encoded.
    pub signed_attributes: Option<Bytes>,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: Bytes,
}

impl SignerInfo {
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| Self::from_sequence(cons))
    }

    pub fn from_sequence<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        let version = cons.take_u8()?;
        let sid = SignerIdentifier::take_from(cons)?;
        let digest_algorithm = AlgorithmIdentifier::take_from(cons)?;
        // Signed attributes are digested as encoded, so keep the raw bytes
        // rather than a decoded form that might not re-encode identically.
        let signed_attributes = cons
            .take_opt_constructed_if(Tag::CTX_0, |cons| cons.capture_all())?
            .map(|captured| captured.into_bytes());
        let signature_algorithm = AlgorithmIdentifier::take_from(cons)?;
        let signature = OctetString::take_from(cons)?.into_bytes();
        // unsignedAttrs (countersignatures, nested signatures)
        cons.take_opt_constructed_if(Tag::CTX_1, |cons| cons.skip_all())?;

        Ok(Self {
            version,
            sid,
            digest_algorithm,
            signed_attributes,
            signature_algorithm,
            signature,
        })
    }

    /// The bytes the signature was computed over when signed attributes are
    /// present: their encoding with an explicit `SET OF` tag in place of the
    /// implicit `[0]`.
    pub fn signed_attributes_digested_content(&self) -> Option<Vec<u8>> {
        let content = self.signed_attributes.as_ref()?;
        let mut buffer = Vec::with_capacity(content.len() + 8);
        buffer.push(SET_OF_TAG);
        write_der_length(&mut buffer, content.len());
        buffer.extend_from_slice(content);
        Some(buffer)
    }
}

fn write_der_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}
