// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! OCSP client: request building, response validation, caching.
//!
//! https://datatracker.ietf.org/doc/html/rfc6960

pub(crate) mod asn1;

use self::asn1::{
    BasicOcspResponseDer, CertIdDer, CertStatusDer, OID_OCSP_BASIC, OID_OCSP_NONCE, OcspRequestDer,
    OcspResponseDer, RequestDer, ResponseDataDer, ResponderIdDer, TbsRequestDer, gt_from_unix,
    gt_to_unix,
};
use super::crl::{RevocationReason, format_date};
use super::error::{Result, RevocationError};
use super::RevocationVerdict;
use crate::cert::{Certificate, DecodeError, decode_cert_der, normalize_serial};
use crate::fetch::RevocationFetcher;
use crate::rand;
use crate::result::ValidationResult;
use crate::verify::{SignatureVerifier, verify_with_oid};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5280::ID_KP_OCSP_SIGNING;
use der::asn1::OctetString;
use der::{Any, Decode, Encode, Tag};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use spki::AlgorithmIdentifierOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::CrlReason;

pub use self::asn1::OcspResponseStatus;

const CONTENT_TYPE_REQUEST: &str = "application/ocsp-request";

const OID_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
const OID_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");

/// Hash used for CertID issuer name/key hashes.
///
/// SHA-1 is the default on purpose: RFC 6960 responders key their databases
/// on SHA-1 CertIDs and many never learned anything else. Upgrading this
/// silently breaks interoperability, so it is an explicit choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OcspHashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl OcspHashAlgorithm {
    /// The hash AlgorithmIdentifier OID.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::Sha1 => OID_SHA1,
            Self::Sha256 => OID_SHA256,
        }
    }

    /// Digests `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// Certificate status carried by a successful OCSP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OcspCertStatus {
    Good,
    Revoked {
        revoked_at: i64,
        reason: Option<RevocationReason>,
    },
    Unknown,
}

/// A built OCSP request and the fields its response must bind to.
#[derive(Clone, Debug)]
pub struct OcspRequestData {
    /// Serial of the certificate in question.
    pub serial: Vec<u8>,
    /// Hash of the issuer's DER subject name.
    pub issuer_name_hash: Vec<u8>,
    /// Hash of the issuer's subjectPublicKey bytes.
    pub issuer_key_hash: Vec<u8>,
    /// CertID hash algorithm.
    pub hash_algorithm: OcspHashAlgorithm,
    /// Request nonce, when enabled.
    pub nonce: Option<Vec<u8>>,
    /// DER-encoded OCSPRequest.
    pub der: Vec<u8>,
}

/// Decoded OCSP response.
#[derive(Clone, Debug)]
pub struct OcspResponseData {
    /// Responder status.
    pub response_status: OcspResponseStatus,
    /// Body of a successful response.
    pub body: Option<OcspResponseBody>,
}

/// The single-certificate body of a successful response.
#[derive(Clone, Debug)]
pub struct OcspResponseBody {
    pub cert_status: OcspCertStatus,
    pub produced_at: i64,
    pub this_update: i64,
    pub next_update: Option<i64>,
    pub issuer_name_hash: Vec<u8>,
    pub issuer_key_hash: Vec<u8>,
    pub serial: Vec<u8>,
    pub nonce: Option<Vec<u8>>,
    pub signature_algorithm: ObjectIdentifier,
    pub signature: Vec<u8>,
    /// Raw ResponseData DER (the signed bytes).
    pub tbs_der: Vec<u8>,
    /// Certificates embedded for delegated response signing.
    pub responder_certs: Vec<Certificate>,
}

/// Builds an OCSP request for `cert` against `issuer`.
///
/// The issuer record must carry its DER subject name; a record without it
/// fails loudly instead of hashing a placeholder.
pub fn build_request(
    cert: &Certificate,
    issuer: &Certificate,
    use_nonce: bool,
    hash_algorithm: OcspHashAlgorithm,
) -> Result<OcspRequestData> {
    if issuer.subject_der.is_empty() {
        return Err(RevocationError::MissingIssuerDer);
    }

    let issuer_name_hash = hash_algorithm.digest(&issuer.subject_der);
    let issuer_key_hash = hash_algorithm.digest(&issuer.public_key.subject_public_key);
    let nonce = use_nonce.then(rand::nonce);

    let cert_id = CertIdDer {
        hash_algorithm: AlgorithmIdentifierOwned {
            oid: hash_algorithm.oid(),
            parameters: Some(null_any()?),
        },
        issuer_name_hash: OctetString::new(issuer_name_hash.clone()).map_err(DecodeError::Der)?,
        issuer_key_hash: OctetString::new(issuer_key_hash.clone()).map_err(DecodeError::Der)?,
        serial_number: der::asn1::Uint::new(normalize_serial(&cert.serial))
            .map_err(DecodeError::Der)?,
    };

    let request_extensions = match &nonce {
        Some(nonce) => Some(vec![nonce_extension(nonce)?]),
        None => None,
    };

    let der = OcspRequestDer {
        tbs_request: TbsRequestDer {
            version: None,
            request_list: vec![RequestDer { req_cert: cert_id }],
            request_extensions,
        },
    }
    .to_der()
    .map_err(DecodeError::Der)?;

    Ok(OcspRequestData {
        serial: cert.serial.clone(),
        issuer_name_hash,
        issuer_key_hash,
        hash_algorithm,
        nonce,
        der,
    })
}

/// Decodes and shapes an OCSP response.
pub fn parse_response(bytes: &[u8]) -> std::result::Result<OcspResponseData, DecodeError> {
    let response = OcspResponseDer::from_der(bytes).map_err(|e| DecodeError::OcspParse {
        details: e.to_string(),
    })?;

    if response.response_status != OcspResponseStatus::Successful {
        return Ok(OcspResponseData {
            response_status: response.response_status,
            body: None,
        });
    }

    let response_bytes = response.response_bytes.ok_or(DecodeError::OcspParse {
        details: "successful response without responseBytes".to_string(),
    })?;
    if response_bytes.response_type != OID_OCSP_BASIC {
        return Err(DecodeError::OcspParse {
            details: format!("unsupported response type {}", response_bytes.response_type),
        });
    }

    let basic =
        BasicOcspResponseDer::from_der(response_bytes.response.as_bytes()).map_err(|e| {
            DecodeError::OcspParse {
                details: e.to_string(),
            }
        })?;

    // DER is canonical, so re-encoding ResponseData reproduces the bytes
    // the responder signed.
    let tbs_der = basic
        .tbs_response_data
        .to_der()
        .map_err(DecodeError::Der)?;

    let data: &ResponseDataDer = &basic.tbs_response_data;
    let single = data.responses.first().ok_or(DecodeError::OcspParse {
        details: "response carries no SingleResponse".to_string(),
    })?;

    let cert_status = match &single.cert_status {
        CertStatusDer::Good(_) => OcspCertStatus::Good,
        CertStatusDer::Revoked(info) => OcspCertStatus::Revoked {
            revoked_at: gt_to_unix(&info.revocation_time),
            reason: info.revocation_reason.and_then(map_reason),
        },
        CertStatusDer::Unknown(_) => OcspCertStatus::Unknown,
    };

    let nonce = extract_nonce(data.response_extensions.as_deref())?;

    let mut responder_certs = Vec::new();
    for any in basic.certs.iter().flatten() {
        let der = any.to_der().map_err(DecodeError::Der)?;
        responder_certs.push(decode_cert_der(&der)?);
    }

    let signature = basic
        .signature
        .as_bytes()
        .ok_or(DecodeError::OcspParse {
            details: "signature BIT STRING has unused bits".to_string(),
        })?
        .to_vec();

    Ok(OcspResponseData {
        response_status: response.response_status,
        body: Some(OcspResponseBody {
            cert_status,
            produced_at: gt_to_unix(&data.produced_at),
            this_update: gt_to_unix(&single.this_update),
            next_update: single.next_update.as_ref().map(gt_to_unix),
            issuer_name_hash: single.cert_id.issuer_name_hash.as_bytes().to_vec(),
            issuer_key_hash: single.cert_id.issuer_key_hash.as_bytes().to_vec(),
            serial: single.cert_id.serial_number.as_bytes().to_vec(),
            nonce,
            signature_algorithm: basic.signature_algorithm.oid,
            signature,
            tbs_der,
            responder_certs,
        }),
    })
}

/// Encodes the GET alternative: request base64'd into the URL path
/// (RFC 6960 appendix A.1).
pub fn encode_get_url(responder_url: &str, request_der: &[u8]) -> String {
    let b64 = STANDARD.encode(request_der);
    let mut encoded = String::with_capacity(b64.len());
    for c in b64.chars() {
        match c {
            '+' => encoded.push_str("%2B"),
            '/' => encoded.push_str("%2F"),
            '=' => encoded.push_str("%3D"),
            _ => encoded.push(c),
        }
    }
    format!("{}/{}", responder_url.trim_end_matches('/'), encoded)
}

fn null_any() -> Result<Any> {
    Ok(Any::new(Tag::Null, Vec::<u8>::new()).map_err(DecodeError::Der)?)
}

fn nonce_extension(nonce: &[u8]) -> Result<Extension> {
    let inner = OctetString::new(nonce)
        .and_then(|os| os.to_der())
        .map_err(DecodeError::Der)?;
    Ok(Extension {
        extn_id: OID_OCSP_NONCE,
        critical: false,
        extn_value: OctetString::new(inner).map_err(DecodeError::Der)?,
    })
}

fn extract_nonce(
    extensions: Option<&[Extension]>,
) -> std::result::Result<Option<Vec<u8>>, DecodeError> {
    for ext in extensions.into_iter().flatten() {
        if ext.extn_id == OID_OCSP_NONCE {
            let raw = ext.extn_value.as_bytes();
            // The nonce payload is an OCTET STRING; tolerate responders
            // that put the bytes in directly.
            let value = match OctetString::from_der(raw) {
                Ok(inner) => inner.as_bytes().to_vec(),
                Err(_) => raw.to_vec(),
            };
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn map_reason(reason: CrlReason) -> Option<RevocationReason> {
    let code = match reason {
        CrlReason::Unspecified => 0,
        CrlReason::KeyCompromise => 1,
        CrlReason::CaCompromise => 2,
        CrlReason::AffiliationChanged => 3,
        CrlReason::Superseded => 4,
        CrlReason::CessationOfOperation => 5,
        CrlReason::CertificateHold => 6,
        CrlReason::RemoveFromCRL => 8,
        CrlReason::PrivilegeWithdrawn => 9,
        CrlReason::AaCompromise => 10,
    };
    RevocationReason::from_u8(code)
}

/// OCSP client configuration.
#[derive(Clone, Debug)]
pub struct OcspClientConfig {
    /// Connect timeout handed to the fetcher policy.
    pub connect_timeout: Duration,
    /// Response timeout handed to the fetcher policy.
    pub response_timeout: Duration,
    /// Attach a random nonce to requests and require it echoed.
    pub use_nonce: bool,
    /// CertID hash algorithm.
    pub hash_algorithm: OcspHashAlgorithm,
    /// Cache lifetime for responses without nextUpdate.
    pub fallback_cache_ttl_secs: i64,
}

impl Default for OcspClientConfig {
    fn default() -> Self {
        OcspClientConfig {
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(10),
            use_nonce: true,
            hash_algorithm: OcspHashAlgorithm::Sha1,
            fallback_cache_ttl_secs: 3600,
        }
    }
}

struct CachedStatus {
    status: OcspCertStatus,
    expires_at: i64,
}

/// OCSP client with a per-instance response cache.
pub struct OcspClient {
    config: OcspClientConfig,
    fetcher: Arc<dyn RevocationFetcher>,
    verifier: Arc<dyn SignatureVerifier>,
    cache: Mutex<HashMap<[u8; 32], CachedStatus>>,
}

impl OcspClient {
    /// Creates a client over the given transport and verifier.
    pub fn new(
        config: OcspClientConfig,
        fetcher: Arc<dyn RevocationFetcher>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        OcspClient {
            config,
            fetcher,
            verifier,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached responses.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Checks `cert` against its issuer's OCSP responder.
    ///
    /// Uses `url` when given, else the certificate's first AIA OCSP URL.
    /// Messages land in `result`; the verdict reports conclusiveness to
    /// the policy layer.
    pub fn check(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        url: Option<&str>,
        now: i64,
        result: &mut ValidationResult,
    ) -> RevocationVerdict {
        let key = cache_key(cert, issuer);
        if let Some(status) = self.cache_probe(&key, now) {
            result.info(format!(
                "using cached OCSP response for {}",
                cert.serial_hex()
            ));
            return self.report_status(cert, &status, result);
        }

        let url = match url.or_else(|| cert.extensions.ocsp_urls.first().map(String::as_str)) {
            Some(url) => url.to_string(),
            None => {
                result.warning(format!(
                    "no OCSP responder URL for {}; skipping OCSP",
                    cert.subject
                ));
                return RevocationVerdict::Unknown;
            }
        };

        let request = match build_request(cert, issuer, self.config.use_nonce, self.config.hash_algorithm)
        {
            Ok(request) => request,
            Err(e) => {
                result.error(format!("failed to build OCSP request: {e}"));
                return RevocationVerdict::Unknown;
            }
        };

        debug!(%url, serial = %cert.serial_hex(), "querying OCSP responder");
        let reply = match self.fetcher.post(&url, CONTENT_TYPE_REQUEST, &request.der) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%url, error = %e, "OCSP fetch failed");
                result.error(format!("OCSP responder unreachable at {url}: {e}"));
                return RevocationVerdict::Unknown;
            }
        };

        let response = match parse_response(&reply) {
            Ok(response) => response,
            Err(e) => {
                result.error(format!("malformed OCSP response from {url}: {e}"));
                return RevocationVerdict::Unknown;
            }
        };

        self.validate_response(cert, issuer, &request, &response, &key, now, result)
    }

    /// Response validation in protocol order: responder status, nonce,
    /// CertID binding, freshness, signature, certificate status.
    fn validate_response(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        request: &OcspRequestData,
        response: &OcspResponseData,
        cache_key: &[u8; 32],
        now: i64,
        result: &mut ValidationResult,
    ) -> RevocationVerdict {
        if response.response_status != OcspResponseStatus::Successful {
            result.error(format!(
                "OCSP responder returned {}",
                response.response_status.as_str()
            ));
            return RevocationVerdict::Unknown;
        }
        let Some(body) = &response.body else {
            result.error("OCSP response is successful but carries no body".to_string());
            return RevocationVerdict::Unknown;
        };

        // Nonce first: a replayed response must not produce any verdict.
        if let Some(expected) = &request.nonce
            && body.nonce.as_ref() != Some(expected)
        {
            result.error("OCSP response nonce does not match request nonce".to_string());
            return RevocationVerdict::Unknown;
        }

        if body.issuer_name_hash != request.issuer_name_hash
            || body.issuer_key_hash != request.issuer_key_hash
            || normalize_serial(&body.serial) != normalize_serial(&request.serial)
        {
            result.error("OCSP response CertID does not match request".to_string());
            return RevocationVerdict::Unknown;
        }

        if body.this_update > now {
            result.error(format!(
                "OCSP response is not yet valid: thisUpdate {}",
                format_date(body.this_update)
            ));
            return RevocationVerdict::Unknown;
        }
        if let Some(next) = body.next_update
            && next < now
        {
            // Unlike a stale CRL this is an error; see the CRL validator
            // for the warning-side of the asymmetry.
            result.error(format!(
                "OCSP response has expired: nextUpdate {}",
                format_date(next)
            ));
            return RevocationVerdict::Unknown;
        }

        if !self.verify_signature(body, issuer, result) {
            return RevocationVerdict::Unknown;
        }

        let status = body.cert_status.clone();
        let expires_at = body
            .next_update
            .unwrap_or(now + self.config.fallback_cache_ttl_secs);
        self.cache.lock().unwrap().insert(
            *cache_key,
            CachedStatus {
                status: status.clone(),
                expires_at,
            },
        );

        self.report_status(cert, &status, result)
    }

    fn verify_signature(
        &self,
        body: &OcspResponseBody,
        issuer: &Certificate,
        result: &mut ValidationResult,
    ) -> bool {
        if body.signature.is_empty() {
            result.error("unsigned OCSP response rejected".to_string());
            return false;
        }

        // Issuer-signed responses first.
        if verify_with_oid(
            self.verifier.as_ref(),
            &body.tbs_der,
            &body.signature,
            &issuer.public_key,
            &body.signature_algorithm,
        )
        .unwrap_or(false)
        {
            result.success("OCSP response signed by issuer".to_string());
            return true;
        }

        // Delegated responder: embedded certificate must chain to the
        // issuer and carry id-kp-OCSPSigning.
        for responder in &body.responder_certs {
            if responder.issuer != issuer.subject {
                continue;
            }
            if !responder
                .extensions
                .extended_key_usage
                .contains(&ID_KP_OCSP_SIGNING)
            {
                continue;
            }
            let chains = verify_with_oid(
                self.verifier.as_ref(),
                &responder.tbs_der,
                &responder.signature,
                &issuer.public_key,
                &responder.signature_algorithm,
            )
            .unwrap_or(false);
            let signs = verify_with_oid(
                self.verifier.as_ref(),
                &body.tbs_der,
                &body.signature,
                &responder.public_key,
                &body.signature_algorithm,
            )
            .unwrap_or(false);
            if chains && signs {
                result.success(format!(
                    "OCSP response signed by delegated responder {}",
                    responder.subject
                ));
                return true;
            }
        }

        result.error("OCSP response signature verification failed".to_string());
        false
    }

    fn report_status(
        &self,
        cert: &Certificate,
        status: &OcspCertStatus,
        result: &mut ValidationResult,
    ) -> RevocationVerdict {
        match status {
            OcspCertStatus::Good => {
                result.success(format!("certificate {} status good", cert.serial_hex()));
                RevocationVerdict::Good
            }
            OcspCertStatus::Revoked { revoked_at, reason } => {
                let reason_text = reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "Unspecified".to_string());
                result.error(format!(
                    "certificate {} revoked: reason {}, date {}",
                    cert.serial_hex(),
                    reason_text,
                    format_date(*revoked_at)
                ));
                RevocationVerdict::Revoked {
                    revoked_at: *revoked_at,
                    reason: *reason,
                }
            }
            OcspCertStatus::Unknown => {
                result.warning(format!(
                    "OCSP responder does not know certificate {}",
                    cert.serial_hex()
                ));
                RevocationVerdict::Unknown
            }
        }
    }

    fn cache_probe(&self, key: &[u8; 32], now: i64) -> Option<OcspCertStatus> {
        let mut cache = self.cache.lock().unwrap();
        match cache.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.status.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }
}

/// Response cache key: `sha256(cert.serial || issuer.serial)`.
fn cache_key(cert: &Certificate, issuer: &Certificate) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(&cert.serial);
    hasher.update(&issuer.serial);
    hasher.finalize().into()
}
