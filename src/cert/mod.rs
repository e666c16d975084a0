// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decoded X.509 certificate records.
//!
//! https://datatracker.ietf.org/doc/html/rfc5280

use crate::verify::PublicKeyInfo;
use const_oid::ObjectIdentifier;
use x509_cert::ext::pkix::KeyUsage;

pub(crate) mod decode;
mod error;
mod name;

pub use decode::{decode_cert_der, decode_cert_pem, decode_cert_pem_chain};
pub use error::{DecodeError, Result};
pub use name::{DistinguishedName, NameAttribute, NameValue};

/// The anyPolicy OID (2.5.29.32.0), which matches every expected policy.
pub const ANY_POLICY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.32.0");

/// The anyExtendedKeyUsage OID (2.5.29.37.0).
pub const ANY_EKU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37.0");

/// Decoded basicConstraints extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicConstraints {
    /// Whether the subject is a CA.
    pub is_ca: bool,
    /// Maximum number of non-self-issued certificates that may follow.
    pub path_len: Option<u32>,
}

/// A certificatePolicies entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyInfo {
    /// Policy OID.
    pub oid: ObjectIdentifier,
    /// Qualifier OIDs attached to the policy (CPS pointers, user notices).
    pub qualifiers: Vec<String>,
}

/// A policyMappings entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyMapping {
    /// Policy OID in the issuer's domain.
    pub issuer_domain: ObjectIdentifier,
    /// Equivalent policy OID in the subject's domain.
    pub subject_domain: ObjectIdentifier,
}

/// A subjectAltName entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AltName {
    Dns(String),
    Ip(Vec<u8>),
    Email(String),
    Uri(String),
}

/// Decoded extensions the engine acts on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertExtensions {
    /// basicConstraints, when present.
    pub basic_constraints: Option<BasicConstraints>,
    /// keyUsage bit set, when present.
    pub key_usage: Option<KeyUsage>,
    /// extendedKeyUsage OIDs.
    pub extended_key_usage: Vec<ObjectIdentifier>,
    /// subjectAltName entries.
    pub subject_alt_names: Vec<AltName>,
    /// CRL distribution point URLs, in certificate order.
    pub crl_distribution_points: Vec<String>,
    /// OCSP responder URLs from authorityInfoAccess, in certificate order.
    pub ocsp_urls: Vec<String>,
    /// certificatePolicies entries.
    pub policies: Vec<PolicyInfo>,
    /// policyMappings entries.
    pub policy_mappings: Vec<PolicyMapping>,
    /// Whether a nameConstraints extension is present.
    pub has_name_constraints: bool,
    /// OIDs of critical extensions outside the recognized set; their
    /// presence fails chain validation.
    pub unknown_critical: Vec<ObjectIdentifier>,
}

/// Immutable decoded view of an X.509 certificate.
///
/// Built by the decoder (or assembled field-wise for trust anchors loaded
/// from non-DER stores); read-only after construction.
#[derive(Clone, Debug)]
pub struct Certificate {
    /// Full certificate DER.
    pub raw: Vec<u8>,
    /// Raw serial number INTEGER bytes, big-endian.
    pub serial: Vec<u8>,
    /// Subject distinguished name.
    pub subject: DistinguishedName,
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// Raw DER of the subject `Name` (hashed for OCSP CertIDs).
    pub subject_der: Vec<u8>,
    /// Raw DER of the issuer `Name`.
    pub issuer_der: Vec<u8>,
    /// NotBefore as a UNIX timestamp (seconds).
    pub not_before: i64,
    /// NotAfter as a UNIX timestamp (seconds).
    pub not_after: i64,
    /// Subject public key.
    pub public_key: PublicKeyInfo,
    /// Signature algorithm OID.
    pub signature_algorithm: ObjectIdentifier,
    /// Signature bytes over `tbs_der`.
    pub signature: Vec<u8>,
    /// Raw TBSCertificate DER (the signed bytes).
    pub tbs_der: Vec<u8>,
    /// Decoded extensions.
    pub extensions: CertExtensions,
}

impl Certificate {
    /// Issuer DN equals subject DN. This is the weak predicate; "is this a
    /// root" additionally requires the self-signature to verify, see
    /// [`crate::verify::is_self_signed`].
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    /// True when basicConstraints marks the subject as a CA.
    pub fn is_ca(&self) -> bool {
        self.extensions
            .basic_constraints
            .map(|bc| bc.is_ca)
            .unwrap_or(false)
    }

    /// pathLenConstraint, when present.
    pub fn path_len_constraint(&self) -> Option<u32> {
        self.extensions.basic_constraints.and_then(|bc| bc.path_len)
    }

    /// Identity comparison by `(subject_dn, serial)`, the pair used for
    /// cycle detection and anchor matching. Serial comparison ignores
    /// leading zero octets.
    pub fn same_identity(&self, other: &Certificate) -> bool {
        self.subject == other.subject
            && normalize_serial(&self.serial) == normalize_serial(&other.serial)
    }

    /// Serial formatted for messages, e.g. `0x01`.
    pub fn serial_hex(&self) -> String {
        hex_prefixed(normalize_serial(&self.serial))
    }

    /// Remaining validity at `now`, clamped at zero.
    pub fn remaining_validity(&self, now: i64) -> i64 {
        (self.not_after - now).max(0)
    }
}

/// Strips leading zero octets; an all-zero serial normalizes to one octet.
pub(crate) fn normalize_serial(serial: &[u8]) -> &[u8] {
    let start = serial
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(serial.len().saturating_sub(1));
    &serial[start..]
}

/// Formats bytes as `0x…` lowercase hex.
pub(crate) fn hex_prefixed(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    if bytes.is_empty() {
        out.push('0');
    }
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
