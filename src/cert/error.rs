// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::error::Error as StdError;
use thiserror::Error;

/// Result type used by decoding APIs.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Error type used by decoding APIs.
///
/// The decoding contract is total: malformed input fails with one of
/// these variants and never yields a partial record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("PEM block is not a {expected}")]
    InvalidPemLabel { expected: &'static str },
    #[error("PEM decoding error: {details}")]
    Pem { details: String },
    #[error("X.509 parse error: {details}")]
    X509Parse { details: String },
    #[error("CRL parse error: {details}")]
    CrlParse { details: String },
    #[error("OCSP parse error: {details}")]
    OcspParse { details: String },
    #[error("trailing data after DER structure")]
    TrailingDerData,
    #[error("invalid certificate validity window: notBefore must be <= notAfter")]
    InvalidValidityWindow,
    #[error("CA certificate subject DN must not be empty")]
    EmptySubjectDn,
    #[error("basicConstraints invalid: pathLenConstraint requires ca=true")]
    PathLenRequiresCa,
    #[error("invalid serial number: {details}")]
    InvalidSerial { details: &'static str },
    #[error("duplicate extension: {oid}")]
    DuplicateExtension { oid: String },
    #[error("non-canonical BIT STRING: {details}")]
    NonCanonicalBitString { details: &'static str },
    #[error("signature algorithm differs between certificate and TBSCertificate")]
    SignatureAlgorithmMismatch,
    #[error("failed to parse {extension} extension: {details}")]
    ExtensionParse {
        extension: &'static str,
        details: String,
    },
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    Oid(#[from] const_oid::Error),
    #[error(transparent)]
    External(#[from] Box<dyn StdError>),
}
