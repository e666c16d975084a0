// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

// Pull in the README as the package doc
#![doc = include_str!("../README.md")]

pub mod cert;
pub mod chain;
mod context;
pub mod fetch;
pub mod pem;
pub mod rand;
mod result;
pub mod revocation;
pub mod verify;

#[cfg(test)]
pub(crate) mod testutil;

pub use cert::{
    AltName, BasicConstraints, CertExtensions, Certificate, DecodeError, DistinguishedName,
    NameAttribute, NameValue, PolicyInfo, PolicyMapping, decode_cert_der, decode_cert_pem,
    decode_cert_pem_chain,
};
pub use chain::{ChainError, MAX_CHAIN_LENGTH, build_chain};
pub use context::{ValidationContext, ValidationOptions, ValidityCheck};
pub use fetch::{FetchError, RevocationFetcher};
pub use result::ValidationResult;
pub use revocation::{
    CheckStatus, Crl, CrlCache, CrlUpdater, MethodStatus, OcspClient, OcspClientConfig,
    OcspHashAlgorithm, RevocationChecker, RevocationError, RevocationMethod, RevocationPolicy,
    RevocationReason, RevocationVerdict, RevokedEntry,
};
pub use revocation::ocsp::{
    build_request as build_ocsp_request, encode_get_url as encode_ocsp_get_url,
    parse_response as parse_ocsp_response,
};
pub use verify::{
    CryptoError, PublicKeyInfo, SignatureAlgorithm, SignatureVerifier, is_self_signed,
};

/// Decodes a CRL from DER bytes.
pub fn decode_crl_der(der: &[u8]) -> Result<Crl, DecodeError> {
    Crl::from_der(der)
}

/// Decodes a CRL from a strict PEM `X509 CRL` block.
pub fn decode_crl_pem(pem_data: &[u8]) -> Result<Crl, DecodeError> {
    Crl::from_pem(pem_data)
}
