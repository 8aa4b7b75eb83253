//! Certificate path validation.
//!
//! # Security
//!
//! - Each certificate is limited to 16KB before parsing to prevent DoS
//! - The x509_parser library handles ASN.1 parsing safely
//! - Signature checks use the library's `verify` backend; no signature is
//!   ever assumed from name linkage alone

use thiserror::Error;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;
use x509_parser::time::ASN1Time;

/// Maximum size of a single certificate (16KB is generous for one cert).
pub const MAX_CERT_SIZE: usize = 16 * 1024;

/// Errors that can occur during certificate chain validation.
///
/// These are for diagnostics only; the pipeline collapses all of them
/// into the same authentication failure before anything leaves the
/// process.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainValidationError {
    #[error("certificate chain is empty")]
    EmptyChain,

    #[error("no trust anchors to validate against")]
    NoTrustAnchors,

    #[error("certificate too large: {0} bytes (max {MAX_CERT_SIZE})")]
    TooLarge(usize),

    #[error("failed to parse X.509 certificate: {0}")]
    ParseError(String),

    #[error("certificate outside its validity period")]
    Expired,

    #[error("issuer of certificate {0} does not match subject of certificate {1}")]
    BrokenLink(usize, usize),

    #[error("certificate {0} is not a CA certificate")]
    NotACa(usize),

    #[error("signature verification failed for certificate {0}")]
    BadSignature(usize),

    #[error("chain does not terminate at a configured trust anchor")]
    NotTrusted,
}

/// A CA certificate a tenant trusts, held as DER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    der: Vec<u8>,
}

impl TrustAnchor {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self { der: der.into() }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// What path validation learned about the leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLeaf {
    /// The leaf's subject DN, rendered as comma-separated attributes.
    pub subject_dn: String,
}

/// Validates a leaf-first DER certificate chain against trust anchors.
///
/// A trait so the tenant-aware layer (and tests) can swap the mechanics;
/// implementations must be pure functions of the chain, the anchors and
/// the clock.
pub trait CertificateChainValidator: Send + Sync {
    /// Validate `chain` (leaf first, each element one DER certificate)
    /// against `anchors`.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, leaf-to-root.
    fn validate(
        &self,
        chain: &[Vec<u8>],
        anchors: &[TrustAnchor],
    ) -> Result<ValidatedLeaf, ChainValidationError>;
}

/// The standard validator: no revocation checks, no fetching of missing
/// intermediates.
///
/// Every certificate must parse, be inside its validity period, and be
/// signed by its successor; every intermediate must carry the CA basic
/// constraint. The last certificate must either be one of the anchors or
/// be signed by one.
#[derive(Debug, Default, Clone, Copy)]
pub struct X509CertificateChainValidator;

impl CertificateChainValidator for X509CertificateChainValidator {
    fn validate(
        &self,
        chain: &[Vec<u8>],
        anchors: &[TrustAnchor],
    ) -> Result<ValidatedLeaf, ChainValidationError> {
        if chain.is_empty() {
            return Err(ChainValidationError::EmptyChain);
        }
        if anchors.is_empty() {
            return Err(ChainValidationError::NoTrustAnchors);
        }

        for der in chain {
            if der.len() > MAX_CERT_SIZE {
                return Err(ChainValidationError::TooLarge(der.len()));
            }
        }

        let certs = chain
            .iter()
            .map(|der| {
                X509Certificate::from_der(der)
                    .map(|(_, cert)| cert)
                    .map_err(|e| ChainValidationError::ParseError(format!("{:?}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let now = ASN1Time::now();
        for cert in &certs {
            if !cert.validity().is_valid_at(now) {
                return Err(ChainValidationError::Expired);
            }
        }

        for i in 0..certs.len() - 1 {
            let cert = &certs[i];
            let issuer = &certs[i + 1];
            if cert.issuer().as_raw() != issuer.subject().as_raw() {
                return Err(ChainValidationError::BrokenLink(i, i + 1));
            }
            if !is_ca(issuer) {
                return Err(ChainValidationError::NotACa(i + 1));
            }
            cert.verify_signature(Some(issuer.public_key()))
                .map_err(|_| ChainValidationError::BadSignature(i))?;
        }

        let top_index = certs.len() - 1;
        let top = &certs[top_index];
        let top_der = &chain[top_index];
        let mut trusted = false;
        for anchor in anchors {
            if anchor.der() == top_der.as_slice() {
                trusted = true;
                break;
            }
            let Ok((_, anchor_cert)) = X509Certificate::from_der(anchor.der()) else {
                tracing::warn!("skipping unparseable trust anchor");
                continue;
            };
            if top.issuer().as_raw() == anchor_cert.subject().as_raw()
                && top.verify_signature(Some(anchor_cert.public_key())).is_ok()
            {
                trusted = true;
                break;
            }
        }
        if !trusted {
            return Err(ChainValidationError::NotTrusted);
        }

        Ok(ValidatedLeaf {
            subject_dn: certs[0].subject().to_string(),
        })
    }
}

fn is_ca(cert: &X509Certificate<'_>) -> bool {
    cert.basic_constraints()
        .ok()
        .flatten()
        .map(|bc| bc.value.ca)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair, PKCS_ED25519};

    fn ca() -> (rcgen::Certificate, KeyPair) {
        let key = KeyPair::generate_for(&PKCS_ED25519).unwrap();
        let mut params = CertificateParams::new(vec![]).unwrap();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "test-ca");
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let cert = params.self_signed(&key).unwrap();
        (cert, key)
    }

    fn leaf(name: &str, ca_cert: &rcgen::Certificate, ca_key: &KeyPair) -> Vec<u8> {
        let key = KeyPair::generate_for(&PKCS_ED25519).unwrap();
        let mut params = CertificateParams::new(vec![]).unwrap();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, name);
        let cert = params.signed_by(&key, ca_cert, ca_key).unwrap();
        cert.der().to_vec()
    }

    #[test]
    fn leaf_signed_by_anchor_validates() {
        let (ca_cert, ca_key) = ca();
        let leaf_der = leaf("device-1", &ca_cert, &ca_key);
        let anchors = vec![TrustAnchor::from_der(ca_cert.der().to_vec())];

        let validated = X509CertificateChainValidator
            .validate(&[leaf_der], &anchors)
            .unwrap();
        assert!(validated.subject_dn.contains("CN=device-1"));
    }

    #[test]
    fn chain_including_the_anchor_validates() {
        let (ca_cert, ca_key) = ca();
        let leaf_der = leaf("device-1", &ca_cert, &ca_key);
        let anchors = vec![TrustAnchor::from_der(ca_cert.der().to_vec())];

        let chain = vec![leaf_der, ca_cert.der().to_vec()];
        assert!(X509CertificateChainValidator
            .validate(&chain, &anchors)
            .is_ok());
    }

    #[test]
    fn leaf_from_unrelated_ca_is_rejected() {
        let (trusted_ca, _) = ca();
        let (other_ca, other_key) = ca();
        let leaf_der = leaf("device-1", &other_ca, &other_key);
        let anchors = vec![TrustAnchor::from_der(trusted_ca.der().to_vec())];

        let err = X509CertificateChainValidator
            .validate(&[leaf_der], &anchors)
            .unwrap_err();
        assert!(matches!(err, ChainValidationError::NotTrusted));
    }

    #[test]
    fn non_ca_certificate_cannot_issue() {
        let (ca_cert, ca_key) = ca();
        let middle_key = KeyPair::generate_for(&PKCS_ED25519).unwrap();
        let mut middle_params = CertificateParams::new(vec![]).unwrap();
        middle_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "not-a-ca");
        let middle = middle_params.signed_by(&middle_key, &ca_cert, &ca_key).unwrap();

        let leaf_key = KeyPair::generate_for(&PKCS_ED25519).unwrap();
        let mut leaf_params = CertificateParams::new(vec![]).unwrap();
        leaf_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "device-1");
        let leaf_cert = leaf_params.signed_by(&leaf_key, &middle, &middle_key).unwrap();

        let chain = vec![leaf_cert.der().to_vec(), middle.der().to_vec()];
        let anchors = vec![TrustAnchor::from_der(ca_cert.der().to_vec())];
        let err = X509CertificateChainValidator
            .validate(&chain, &anchors)
            .unwrap_err();
        assert!(matches!(err, ChainValidationError::NotACa(1)));
    }

    #[test]
    fn empty_chain_is_rejected() {
        let (ca_cert, _) = ca();
        let anchors = vec![TrustAnchor::from_der(ca_cert.der().to_vec())];
        let err = X509CertificateChainValidator
            .validate(&[], &anchors)
            .unwrap_err();
        assert!(matches!(err, ChainValidationError::EmptyChain));
    }

    #[test]
    fn no_anchors_is_rejected() {
        let (ca_cert, ca_key) = ca();
        let leaf_der = leaf("device-1", &ca_cert, &ca_key);
        let err = X509CertificateChainValidator
            .validate(&[leaf_der], &[])
            .unwrap_err();
        assert!(matches!(err, ChainValidationError::NoTrustAnchors));
    }

    #[test]
    fn oversized_certificate_is_rejected_before_parsing() {
        let (ca_cert, _) = ca();
        let anchors = vec![TrustAnchor::from_der(ca_cert.der().to_vec())];
        let blob = vec![0u8; MAX_CERT_SIZE + 1];
        let err = X509CertificateChainValidator
            .validate(&[blob], &anchors)
            .unwrap_err();
        assert!(matches!(err, ChainValidationError::TooLarge(_)));
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let (ca_cert, _) = ca();
        let anchors = vec![TrustAnchor::from_der(ca_cert.der().to_vec())];
        let err = X509CertificateChainValidator
            .validate(&[b"not a certificate".to_vec()], &anchors)
            .unwrap_err();
        assert!(matches!(err, ChainValidationError::ParseError(_)));
    }
}
