// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Shared test fixtures: record builders, DER builders and the injected
//! fakes that stand in for the verifier and fetcher ports.
//!
//! The fake signature rule is `sig = SHA-256(signer_public_key || tbs)`,
//! so "signed by" relationships hold exactly when fixture keys line up.

use crate::cert::{
    BasicConstraints, CertExtensions, Certificate, DistinguishedName,
};
use crate::fetch::{FetchError, RevocationFetcher};
use crate::revocation::crl::{Crl, RevocationReason, RevokedEntry};
use crate::verify::{CryptoError, PublicKeyInfo, SignatureAlgorithm, SignatureVerifier};
use const_oid::ObjectIdentifier;
use der::Encode;
use der::asn1::{BitString, OctetString, UtcTime};
use sha2::{Digest, Sha256};
use spki::AlgorithmIdentifierOwned;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use x509_cert::ext::Extension;
use x509_cert::time::Time;

pub(crate) const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Builds a single-CN distinguished name.
pub(crate) fn dn(cn: &str) -> DistinguishedName {
    DistinguishedName::new().cn(cn.trim_start_matches("CN="))
}

/// Deterministic fixture public key for a subject name.
pub(crate) fn key_for(name: &str) -> Vec<u8> {
    format!("key:{}", name.trim_start_matches("CN=")).into_bytes()
}

/// Fake signature rule shared with [`FakeVerifier`].
pub(crate) fn fake_sig(signer_public_key: &[u8], tbs: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(signer_public_key);
    hasher.update(tbs);
    hasher.finalize().to_vec()
}

/// Verifier accepting exactly the fake signature rule.
pub(crate) struct FakeVerifier;

impl FakeVerifier {
    pub(crate) fn new() -> Self {
        FakeVerifier
    }
}

impl SignatureVerifier for FakeVerifier {
    fn verify(
        &self,
        tbs: &[u8],
        signature: &[u8],
        key: &PublicKeyInfo,
        _algorithm: SignatureAlgorithm,
    ) -> Result<bool, CryptoError> {
        Ok(signature == fake_sig(&key.subject_public_key, tbs).as_slice())
    }
}

/// Builds an unsigned record-level certificate fixture.
pub(crate) fn cert(subject: &str, issuer: &str, serial: &[u8], nb: i64, na: i64) -> Certificate {
    let subject_dn = dn(subject);
    let issuer_dn = dn(issuer);
    let tbs_der = format!(
        "tbs:{}:{}:{}:{}:{}",
        subject,
        issuer,
        crate::cert::hex_prefixed(serial),
        nb,
        na
    )
    .into_bytes();
    Certificate {
        raw: Vec::new(),
        serial: serial.to_vec(),
        subject_der: subject_dn.to_der().unwrap(),
        issuer_der: issuer_dn.to_der().unwrap(),
        subject: subject_dn,
        issuer: issuer_dn,
        not_before: nb,
        not_after: na,
        public_key: PublicKeyInfo {
            algorithm: OID_RSA_ENCRYPTION,
            subject_public_key: key_for(subject),
            spki_der: format!("spki:{subject}").into_bytes(),
        },
        signature_algorithm: SignatureAlgorithm::RsaSha256.oid(),
        signature: Vec::new(),
        tbs_der,
        extensions: CertExtensions::default(),
    }
}

/// Signs a fixture certificate under the named issuer's fixture key.
pub(crate) fn sign(c: &mut Certificate, issuer: &str) {
    c.signature = fake_sig(&key_for(issuer), &c.tbs_der);
}

/// Certificate fixture signed by `issuer`.
pub(crate) fn signed_cert(
    subject: &str,
    issuer: &str,
    serial: &[u8],
    nb: i64,
    na: i64,
) -> Certificate {
    let mut c = cert(subject, issuer, serial, nb, na);
    sign(&mut c, issuer);
    c
}

/// Self-signed fixture certificate.
pub(crate) fn self_signed(subject: &str, serial: &[u8], nb: i64, na: i64) -> Certificate {
    signed_cert(subject, subject, serial, nb, na)
}

/// Marks a fixture certificate as a CA with keyCertSign|cRLSign.
pub(crate) fn make_ca(c: &mut Certificate, path_len: Option<u32>) {
    use x509_cert::ext::pkix::{KeyUsage, KeyUsages};
    c.extensions.basic_constraints = Some(BasicConstraints {
        is_ca: true,
        path_len,
    });
    c.extensions.key_usage = Some(KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign));
}

/// Leaf fixture used by simple record tests: `CN=example.com` issued by
/// `CN=Int CA`, valid over 2024 (as UNIX seconds).
pub(crate) fn leaf_cert() -> Certificate {
    signed_cert("example.com", "Int CA", &[0x01], TS_2024_01_01, TS_2025_01_01)
}

// A few calendar instants the end-to-end scenarios use.
pub(crate) const TS_2024_01_01: i64 = 1_704_067_200;
pub(crate) const TS_2024_04_15: i64 = 1_713_139_200;
pub(crate) const TS_2024_05_01: i64 = 1_714_521_600;
pub(crate) const TS_2024_06_01: i64 = 1_717_200_000;
pub(crate) const TS_2024_07_01: i64 = 1_719_792_000;
pub(crate) const TS_2025_01_01: i64 = 1_735_689_600;

/// Builds a record-level CRL fixture signed by the named issuer.
pub(crate) fn crl(
    issuer: &str,
    this_update: i64,
    next_update: Option<i64>,
    number: Option<u64>,
    entries: Vec<RevokedEntry>,
) -> Crl {
    let issuer_dn = dn(issuer);
    let tbs_der = format!("crl-tbs:{}:{}:{:?}:{:?}", issuer, this_update, next_update, number)
        .into_bytes();
    let signature = fake_sig(&key_for(issuer), &tbs_der);
    let mut map = HashMap::new();
    for entry in entries {
        map.insert(
            crate::cert::normalize_serial(&entry.serial).to_vec(),
            entry,
        );
    }
    Crl {
        raw: Vec::new(),
        issuer_der: issuer_dn.to_der().unwrap(),
        issuer: issuer_dn,
        this_update,
        next_update,
        crl_number: number.map(u64_be),
        signature_algorithm: SignatureAlgorithm::RsaSha256.oid(),
        signature,
        tbs_der,
        entries: map,
    }
}

/// One revoked-serial CRL entry.
pub(crate) fn revoked_entry(
    serial: &[u8],
    revocation_date: i64,
    reason: Option<RevocationReason>,
) -> RevokedEntry {
    RevokedEntry {
        serial: serial.to_vec(),
        revocation_date,
        reason,
        invalidity_date: None,
    }
}

/// Big-endian bytes of a u64 without leading zeros.
pub(crate) fn u64_be(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

// ---------------------------------------------------------------------------
// DER builders (x509-cert assembly, the issuance-side stack)
// ---------------------------------------------------------------------------

#[derive(der::Sequence)]
struct TbsCertListDer {
    #[asn1(optional = "true")]
    version: Option<u8>,
    signature: AlgorithmIdentifierOwned,
    issuer: x509_cert::name::Name,
    this_update: Time,
    #[asn1(optional = "true")]
    next_update: Option<Time>,
    #[asn1(optional = "true")]
    revoked_certificates: Option<Vec<RevokedCertDer>>,
    #[asn1(context_specific = "0", optional = "true", tag_mode = "EXPLICIT", constructed = "true")]
    crl_extensions: Option<Vec<Extension>>,
}

#[derive(der::Sequence)]
struct RevokedCertDer {
    user_certificate: der::asn1::Uint,
    revocation_date: Time,
    #[asn1(optional = "true")]
    crl_entry_extensions: Option<Vec<Extension>>,
}

#[derive(der::Sequence)]
struct CertListDer {
    tbs_cert_list: TbsCertListDer,
    signature_algorithm: AlgorithmIdentifierOwned,
    signature: BitString,
}

fn utc(ts: i64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(ts as u64)).unwrap())
}

const OID_CRL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.20");
const OID_CRL_REASON: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.21");

/// Builds a wire-level CRL signed under the fake rule by `issuer`.
///
/// Entries are `(serial, revocation_date, reason_code)` triples.
pub(crate) fn crl_der(
    issuer: &str,
    this_update: i64,
    next_update: Option<i64>,
    number: Option<u64>,
    entries: &[(&[u8], i64, Option<u8>)],
) -> Vec<u8> {
    let sig_alg = AlgorithmIdentifierOwned {
        oid: SignatureAlgorithm::RsaSha256.oid(),
        parameters: None,
    };

    let revoked: Vec<RevokedCertDer> = entries
        .iter()
        .map(|(serial, date, reason)| RevokedCertDer {
            user_certificate: der::asn1::Uint::new(serial).unwrap(),
            revocation_date: utc(*date),
            crl_entry_extensions: reason.map(|code| {
                vec![Extension {
                    extn_id: OID_CRL_REASON,
                    critical: false,
                    extn_value: OctetString::new(vec![0x0A, 0x01, code]).unwrap(),
                }]
            }),
        })
        .collect();

    let crl_extensions = number.map(|n| {
        vec![Extension {
            extn_id: OID_CRL_NUMBER,
            critical: false,
            extn_value: OctetString::new(
                der::asn1::Uint::new(&u64_be(n)).unwrap().to_der().unwrap(),
            )
            .unwrap(),
        }]
    });

    let tbs = TbsCertListDer {
        version: Some(1),
        signature: sig_alg.clone(),
        issuer: dn(issuer).to_x509_name().unwrap(),
        this_update: utc(this_update),
        next_update: next_update.map(utc),
        revoked_certificates: if revoked.is_empty() {
            None
        } else {
            Some(revoked)
        },
        crl_extensions,
    };

    let tbs_der = tbs.to_der().unwrap();
    let signature = fake_sig(&key_for(issuer), &tbs_der);

    CertListDer {
        tbs_cert_list: tbs,
        signature_algorithm: sig_alg,
        signature: BitString::from_bytes(&signature).unwrap(),
    }
    .to_der()
    .unwrap()
}

/// Builds a wire-level certificate with the given extensions.
///
/// The signature is structural filler; wire fixtures exercise the
/// decoder, not the verifier.
pub(crate) fn cert_der(
    subject: &str,
    issuer: &str,
    serial: &[u8],
    nb: i64,
    na: i64,
    extensions: Option<Vec<Extension>>,
) -> Vec<u8> {
    use x509_cert::certificate::{CertificateInner, TbsCertificateInner, Version};
    use x509_cert::serial_number::SerialNumber;
    use x509_cert::spki::SubjectPublicKeyInfoOwned;
    use x509_cert::time::Validity;

    let sig_alg = AlgorithmIdentifierOwned {
        oid: SignatureAlgorithm::RsaSha256.oid(),
        parameters: None,
    };

    let tbs: TbsCertificateInner = TbsCertificateInner {
        version: Version::V3,
        serial_number: SerialNumber::new(serial).unwrap(),
        signature: sig_alg.clone(),
        issuer: dn(issuer).to_x509_name().unwrap(),
        validity: Validity {
            not_before: utc(nb),
            not_after: utc(na),
        },
        subject: dn(subject).to_x509_name().unwrap(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: OID_RSA_ENCRYPTION,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&key_for(subject)).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions,
    };

    let cert: CertificateInner = CertificateInner {
        tbs_certificate: tbs,
        signature_algorithm: sig_alg,
        signature: BitString::from_bytes(&[0xC0, 0xFF, 0xEE]).unwrap(),
    };

    cert.to_der().unwrap()
}

/// Builds a wire-level certificate whose signature satisfies the fake
/// rule under `issuer`'s fixture key (usable end to end, not just for
/// decoding).
pub(crate) fn signed_cert_der(
    subject: &str,
    issuer: &str,
    serial: &[u8],
    nb: i64,
    na: i64,
    extensions: Option<Vec<Extension>>,
) -> Vec<u8> {
    use x509_cert::certificate::{CertificateInner, TbsCertificateInner, Version};
    use x509_cert::serial_number::SerialNumber;
    use x509_cert::spki::SubjectPublicKeyInfoOwned;
    use x509_cert::time::Validity;

    let sig_alg = AlgorithmIdentifierOwned {
        oid: SignatureAlgorithm::RsaSha256.oid(),
        parameters: None,
    };

    let tbs: TbsCertificateInner = TbsCertificateInner {
        version: Version::V3,
        serial_number: SerialNumber::new(serial).unwrap(),
        signature: sig_alg.clone(),
        issuer: dn(issuer).to_x509_name().unwrap(),
        validity: Validity {
            not_before: utc(nb),
            not_after: utc(na),
        },
        subject: dn(subject).to_x509_name().unwrap(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: OID_RSA_ENCRYPTION,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&key_for(subject)).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions,
    };

    let tbs_der = tbs.to_der().unwrap();
    let signature = fake_sig(&key_for(issuer), &tbs_der);

    let cert: CertificateInner = CertificateInner {
        tbs_certificate: tbs,
        signature_algorithm: sig_alg,
        signature: BitString::from_bytes(&signature).unwrap(),
    };

    cert.to_der().unwrap()
}

/// Wire-level delegated OCSP responder certificate (EKU OCSPSigning).
pub(crate) fn ocsp_responder_cert_der(
    subject: &str,
    issuer: &str,
    serial: &[u8],
    nb: i64,
    na: i64,
) -> Vec<u8> {
    use const_oid::db::rfc5280::ID_KP_OCSP_SIGNING;
    let eku = x509_cert::ext::pkix::ExtendedKeyUsage(vec![ID_KP_OCSP_SIGNING])
        .to_der()
        .unwrap();
    signed_cert_der(
        subject,
        issuer,
        serial,
        nb,
        na,
        Some(vec![Extension {
            extn_id: ObjectIdentifier::new_unwrap("2.5.29.37"),
            critical: false,
            extn_value: OctetString::new(eku).unwrap(),
        }]),
    )
}

// ---------------------------------------------------------------------------
// OCSP response builders
// ---------------------------------------------------------------------------

/// Certificate status to encode into a test response.
pub(crate) enum OcspStatusSpec {
    Good,
    Revoked {
        revoked_at: i64,
        reason: Option<u8>,
    },
    Unknown,
}

/// Blueprint for a synthetic OCSP response.
pub(crate) struct OcspResponseSpec<'a> {
    pub cert: &'a Certificate,
    pub issuer: &'a Certificate,
    pub status: OcspStatusSpec,
    pub produced_at: i64,
    pub this_update: i64,
    pub next_update: Option<i64>,
    pub nonce: Option<Vec<u8>>,
    /// CN whose fixture key signs the response.
    pub signer: &'a str,
    /// DER certificates to embed for delegated signing.
    pub responder_certs: Vec<Vec<u8>>,
}

fn crl_reason_from_u8(code: u8) -> x509_cert::ext::pkix::CrlReason {
    use x509_cert::ext::pkix::CrlReason;
    match code {
        1 => CrlReason::KeyCompromise,
        2 => CrlReason::CaCompromise,
        3 => CrlReason::AffiliationChanged,
        4 => CrlReason::Superseded,
        5 => CrlReason::CessationOfOperation,
        6 => CrlReason::CertificateHold,
        8 => CrlReason::RemoveFromCRL,
        9 => CrlReason::PrivilegeWithdrawn,
        10 => CrlReason::AaCompromise,
        _ => CrlReason::Unspecified,
    }
}

/// Encodes a successful BasicOCSPResponse per the blueprint, signed under
/// the fake rule.
pub(crate) fn ocsp_response_der(spec: &OcspResponseSpec<'_>) -> Vec<u8> {
    use crate::revocation::ocsp::OcspHashAlgorithm;
    use crate::revocation::ocsp::asn1::{
        BasicOcspResponseDer, CertIdDer, CertStatusDer, OID_OCSP_BASIC, OID_OCSP_NONCE,
        OcspResponseDer, OcspResponseStatus, ResponderIdDer, ResponseBytesDer, ResponseDataDer,
        RevokedInfoDer, SingleResponseDer, gt_from_unix,
    };
    use der::asn1::Null;
    use der::{Any, Tag};

    let hash = OcspHashAlgorithm::Sha1;
    let cert_id = CertIdDer {
        hash_algorithm: AlgorithmIdentifierOwned {
            oid: hash.oid(),
            parameters: Some(Any::new(Tag::Null, Vec::<u8>::new()).unwrap()),
        },
        issuer_name_hash: OctetString::new(hash.digest(&spec.issuer.subject_der)).unwrap(),
        issuer_key_hash: OctetString::new(
            hash.digest(&spec.issuer.public_key.subject_public_key),
        )
        .unwrap(),
        serial_number: der::asn1::Uint::new(crate::cert::normalize_serial(&spec.cert.serial))
            .unwrap(),
    };

    let cert_status = match &spec.status {
        OcspStatusSpec::Good => CertStatusDer::Good(Null),
        OcspStatusSpec::Revoked { revoked_at, reason } => CertStatusDer::Revoked(RevokedInfoDer {
            revocation_time: gt_from_unix(*revoked_at).unwrap(),
            revocation_reason: reason.map(crl_reason_from_u8),
        }),
        OcspStatusSpec::Unknown => CertStatusDer::Unknown(Null),
    };

    let single = SingleResponseDer {
        cert_id,
        cert_status,
        this_update: gt_from_unix(spec.this_update).unwrap(),
        next_update: spec.next_update.map(|t| gt_from_unix(t).unwrap()),
        single_extensions: None,
    };

    let response_extensions = spec.nonce.as_ref().map(|nonce| {
        vec![Extension {
            extn_id: OID_OCSP_NONCE,
            critical: false,
            extn_value: OctetString::new(
                OctetString::new(nonce.clone()).unwrap().to_der().unwrap(),
            )
            .unwrap(),
        }]
    });

    let data = ResponseDataDer {
        version: None,
        responder_id: ResponderIdDer::ByKey(
            OctetString::new(hash.digest(&key_for(spec.signer))).unwrap(),
        ),
        produced_at: gt_from_unix(spec.produced_at).unwrap(),
        responses: vec![single],
        response_extensions,
    };

    let tbs_der = data.to_der().unwrap();
    let signature = fake_sig(&key_for(spec.signer), &tbs_der);

    let certs = if spec.responder_certs.is_empty() {
        None
    } else {
        Some(
            spec.responder_certs
                .iter()
                .map(|der| der::Decode::from_der(der).unwrap())
                .collect::<Vec<Any>>(),
        )
    };

    let basic = BasicOcspResponseDer {
        tbs_response_data: data,
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: SignatureAlgorithm::RsaSha256.oid(),
            parameters: None,
        },
        signature: BitString::from_bytes(&signature).unwrap(),
        certs,
    };

    OcspResponseDer {
        response_status: OcspResponseStatus::Successful,
        response_bytes: Some(ResponseBytesDer {
            response_type: OID_OCSP_BASIC,
            response: OctetString::new(basic.to_der().unwrap()).unwrap(),
        }),
    }
    .to_der()
    .unwrap()
}

/// Encodes a non-successful responder status.
pub(crate) fn ocsp_error_response_der(
    status: crate::revocation::ocsp::OcspResponseStatus,
) -> Vec<u8> {
    use crate::revocation::ocsp::asn1::OcspResponseDer;
    OcspResponseDer {
        response_status: status,
        response_bytes: None,
    }
    .to_der()
    .unwrap()
}

// ---------------------------------------------------------------------------
// Scripted fetcher
// ---------------------------------------------------------------------------

/// One scripted transport outcome.
pub(crate) enum Scripted {
    Ok(Vec<u8>),
    Timeout,
    Http(u16),
}

/// Fetcher replaying scripted responses per URL and recording calls.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(&self, url: &str, outcome: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn take(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let outcome = self
            .responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front());
        match outcome {
            Some(Scripted::Ok(bytes)) => Ok(bytes),
            Some(Scripted::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            Some(Scripted::Http(status)) => Err(FetchError::Http {
                url: url.to_string(),
                status,
            }),
            None => Err(FetchError::Transport {
                details: format!("no scripted response for {url}"),
            }),
        }
    }
}

impl RevocationFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.take(url)
    }

    fn post(&self, url: &str, _content_type: &str, _body: &[u8]) -> Result<Vec<u8>, FetchError> {
        self.take(url)
    }
}
