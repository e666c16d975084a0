// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Transport port for remote revocation artifacts.
//!
//! The engine never opens sockets. All CRL and OCSP retrieval goes through
//! [`RevocationFetcher`], supplied by the host; tests inject scripted
//! fakes, production hosts wrap their HTTP (or LDAP) client of choice.

use thiserror::Error;

/// Error type for fetcher implementations.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch timed out: {url}")]
    Timeout { url: String },
    #[error("name resolution failed for {url}: {details}")]
    Dns { url: String, details: String },
    #[error("HTTP status {status} from {url}")]
    Http { url: String, status: u16 },
    #[error("fetch cancelled")]
    Cancelled,
    #[error("transport error: {details}")]
    Transport { details: String },
}

/// Retrieves remote revocation artifacts (CRLs, OCSP responses).
///
/// Implementations own connect/read timeouts according to the caller's
/// policy and MUST honor cancellation of the enclosing task by returning
/// [`FetchError::Cancelled`].
pub trait RevocationFetcher: Send + Sync {
    /// Retrieves the resource at `url` (CRL distribution points, OCSP GET).
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Posts `body` to `url` with the given content type (OCSP POST,
    /// `application/ocsp-request`).
    fn post(&self, url: &str, content_type: &str, body: &[u8]) -> Result<Vec<u8>, FetchError>;
}
