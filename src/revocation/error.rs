// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::cert::DecodeError;
use crate::fetch::FetchError;
use crate::verify::CryptoError;
use thiserror::Error;

/// Result type used by revocation APIs.
pub type Result<T> = std::result::Result<T, RevocationError>;

/// Error type used by revocation APIs.
#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("no CRL available for issuer {issuer}")]
    NoCrlAvailable { issuer: String },
    #[error("certificate {subject} carries no CRL distribution points")]
    NoDistributionPoints { subject: String },
    #[error("CRL issuer does not match expected issuer {expected}")]
    IssuerMismatch { expected: String },
    #[error("issuer certificate carries no DER-encoded subject name")]
    MissingIssuerDer,
    #[error("certificate carries no OCSP responder URL")]
    NoOcspUrl,
    #[error("OCSP responder returned status {status}")]
    ResponderStatus { status: &'static str },
    #[error("OCSP response nonce does not match request nonce")]
    NonceMismatch,
    #[error("revocation checking is not configured (no fetcher supplied)")]
    NotConfigured,
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
