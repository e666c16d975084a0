// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RFC 6960 wire structures, modeled on the `der` stack.

use const_oid::ObjectIdentifier;
use der::asn1::{BitString, GeneralizedTime, Null, OctetString};
use der::{Any, Choice, Enumerated, Sequence};
use spki::AlgorithmIdentifierOwned;
use std::time::Duration;
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::CrlReason;

/// id-pkix-ocsp-basic (1.3.6.1.5.5.7.48.1.1).
pub(crate) const OID_OCSP_BASIC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1.1");

/// id-pkix-ocsp-nonce (1.3.6.1.5.5.7.48.1.2).
pub(crate) const OID_OCSP_NONCE: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1.2");

/// CertID (RFC 6960 §4.1.1).
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub(crate) struct CertIdDer {
    pub hash_algorithm: AlgorithmIdentifierOwned,
    pub issuer_name_hash: OctetString,
    pub issuer_key_hash: OctetString,
    pub serial_number: der::asn1::Uint,
}

/// Request (RFC 6960 §4.1.1); singleRequestExtensions are not produced.
#[derive(Clone, Debug, Sequence)]
pub(crate) struct RequestDer {
    pub req_cert: CertIdDer,
}

/// TBSRequest (RFC 6960 §4.1.1); requestorName is not produced.
#[derive(Clone, Debug, Sequence)]
pub(crate) struct TbsRequestDer {
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT")]
    pub version: Option<u8>,
    pub request_list: Vec<RequestDer>,
    #[asn1(context_specific = "2", optional = "true", tag_mode = "EXPLICIT", constructed = "true")]
    pub request_extensions: Option<Vec<Extension>>,
}

/// OCSPRequest (RFC 6960 §4.1.1); requests are sent unsigned.
#[derive(Clone, Debug, Sequence)]
pub(crate) struct OcspRequestDer {
    pub tbs_request: TbsRequestDer,
}

/// OCSPResponseStatus (RFC 6960 §4.2.1).
#[derive(Clone, Copy, Debug, Enumerated, Eq, PartialEq)]
#[asn1(type = "ENUMERATED")]
#[repr(u32)]
pub enum OcspResponseStatus {
    Successful = 0,
    MalformedRequest = 1,
    InternalError = 2,
    TryLater = 3,
    SigRequired = 5,
    Unauthorized = 6,
}

impl OcspResponseStatus {
    /// Responder status text used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::MalformedRequest => "malformed request",
            Self::InternalError => "internal error",
            Self::TryLater => "try later",
            Self::SigRequired => "signature required",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// ResponseBytes (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct ResponseBytesDer {
    pub response_type: ObjectIdentifier,
    pub response: OctetString,
}

/// OCSPResponse (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct OcspResponseDer {
    pub response_status: OcspResponseStatus,
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT", constructed = "true")]
    pub response_bytes: Option<ResponseBytesDer>,
}

/// ResponderID (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Choice)]
pub(crate) enum ResponderIdDer {
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", constructed = "true")]
    ByName(Any),
    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", constructed = "true")]
    ByKey(OctetString),
}

/// RevokedInfo (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct RevokedInfoDer {
    pub revocation_time: GeneralizedTime,
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT")]
    pub revocation_reason: Option<CrlReason>,
}

/// CertStatus (RFC 6960 §4.2.1), IMPLICIT tagging per the module.
#[derive(Clone, Debug, Choice)]
pub(crate) enum CertStatusDer {
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT")]
    Good(Null),
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", constructed = "true")]
    Revoked(RevokedInfoDer),
    #[asn1(context_specific = "2", tag_mode = "IMPLICIT")]
    Unknown(Null),
}

/// SingleResponse (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct SingleResponseDer {
    pub cert_id: CertIdDer,
    pub cert_status: CertStatusDer,
    pub this_update: GeneralizedTime,
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT")]
    pub next_update: Option<GeneralizedTime>,
    #[asn1(context_specific = "1", optional = "true", tag_mode = "EXPLICIT", constructed = "true")]
    pub single_extensions: Option<Vec<Extension>>,
}

/// ResponseData (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct ResponseDataDer {
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT")]
    pub version: Option<u8>,
    pub responder_id: ResponderIdDer,
    pub produced_at: GeneralizedTime,
    pub responses: Vec<SingleResponseDer>,
    #[asn1(context_specific = "1", optional = "true", tag_mode = "EXPLICIT", constructed = "true")]
    pub response_extensions: Option<Vec<Extension>>,
}

/// BasicOCSPResponse (RFC 6960 §4.2.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct BasicOcspResponseDer {
    pub tbs_response_data: ResponseDataDer,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    pub signature: BitString,
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT", constructed = "true")]
    pub certs: Option<Vec<Any>>,
}

/// Encodes a UNIX timestamp as GeneralizedTime.
pub(crate) fn gt_from_unix(ts: i64) -> der::Result<GeneralizedTime> {
    GeneralizedTime::from_unix_duration(Duration::from_secs(ts.max(0) as u64))
}

/// Decodes a GeneralizedTime into a UNIX timestamp.
pub(crate) fn gt_to_unix(time: &GeneralizedTime) -> i64 {
    time.to_unix_duration().as_secs() as i64
}
