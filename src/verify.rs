// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Signature verification port.
//!
//! The engine carries no signature arithmetic of its own. Callers supply a
//! [`SignatureVerifier`]; the engine resolves certificate and CRL/OCSP
//! signature algorithm OIDs to the closed [`SignatureAlgorithm`] set and
//! dispatches through the trait. An OID outside the set is
//! [`CryptoError::UnsupportedAlgorithm`], which is distinct from a
//! signature that fails to verify (`Ok(false)`).

use crate::cert::Certificate;
use const_oid::ObjectIdentifier;
use thiserror::Error;

/// Result type used by verifier APIs.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Error type used by verifier APIs.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported signature algorithm: {oid}")]
    UnsupportedAlgorithm { oid: String },
    #[error("verifier backend failure: {details}")]
    Backend { details: String },
}

const OID_RSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const OID_RSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const OID_RSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const OID_RSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");
const OID_ECDSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");
const OID_ECDSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
const OID_ECDSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
const OID_ECDSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// The signature algorithms the engine dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    RsaSha1,
    RsaSha256,
    RsaSha384,
    RsaSha512,
    EcdsaSha1,
    EcdsaSha256,
    EcdsaSha384,
    EcdsaSha512,
}

impl SignatureAlgorithm {
    /// Resolves an AlgorithmIdentifier OID; `None` for anything outside
    /// the supported set.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        if *oid == OID_RSA_SHA1 {
            Some(Self::RsaSha1)
        } else if *oid == OID_RSA_SHA256 {
            Some(Self::RsaSha256)
        } else if *oid == OID_RSA_SHA384 {
            Some(Self::RsaSha384)
        } else if *oid == OID_RSA_SHA512 {
            Some(Self::RsaSha512)
        } else if *oid == OID_ECDSA_SHA1 {
            Some(Self::EcdsaSha1)
        } else if *oid == OID_ECDSA_SHA256 {
            Some(Self::EcdsaSha256)
        } else if *oid == OID_ECDSA_SHA384 {
            Some(Self::EcdsaSha384)
        } else if *oid == OID_ECDSA_SHA512 {
            Some(Self::EcdsaSha512)
        } else {
            None
        }
    }

    /// The AlgorithmIdentifier OID of this algorithm.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::RsaSha1 => OID_RSA_SHA1,
            Self::RsaSha256 => OID_RSA_SHA256,
            Self::RsaSha384 => OID_RSA_SHA384,
            Self::RsaSha512 => OID_RSA_SHA512,
            Self::EcdsaSha1 => OID_ECDSA_SHA1,
            Self::EcdsaSha256 => OID_ECDSA_SHA256,
            Self::EcdsaSha384 => OID_ECDSA_SHA384,
            Self::EcdsaSha512 => OID_ECDSA_SHA512,
        }
    }
}

/// A subject public key as carried by a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyInfo {
    /// SPKI algorithm OID.
    pub algorithm: ObjectIdentifier,
    /// Raw subjectPublicKey BIT STRING contents.
    pub subject_public_key: Vec<u8>,
    /// Full SubjectPublicKeyInfo DER.
    pub spki_der: Vec<u8>,
}

/// Verifies signatures over TBS byte strings.
///
/// `Ok(true)` means the signature verifies, `Ok(false)` means it does not;
/// backend failures and disabled algorithms are errors.
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        tbs: &[u8],
        signature: &[u8],
        key: &PublicKeyInfo,
        algorithm: SignatureAlgorithm,
    ) -> Result<bool>;
}

/// Resolves `oid` and dispatches to the verifier.
pub fn verify_with_oid(
    verifier: &dyn SignatureVerifier,
    tbs: &[u8],
    signature: &[u8],
    key: &PublicKeyInfo,
    oid: &ObjectIdentifier,
) -> Result<bool> {
    let algorithm =
        SignatureAlgorithm::from_oid(oid).ok_or_else(|| CryptoError::UnsupportedAlgorithm {
            oid: oid.to_string(),
        })?;
    verifier.verify(tbs, signature, key, algorithm)
}

/// True when the certificate is self-signed in the strong sense: issuer DN
/// equals subject DN *and* the signature verifies under the certificate's
/// own public key. DN equality alone is trivially forgeable.
pub fn is_self_signed(cert: &Certificate, verifier: &dyn SignatureVerifier) -> bool {
    cert.is_self_issued()
        && verify_with_oid(
            verifier,
            &cert.tbs_der,
            &cert.signature,
            &cert.public_key,
            &cert.signature_algorithm,
        )
        .unwrap_or(false)
}
