// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decoded certificate revocation lists (RFC 5280 §5).

use crate::cert::{DecodeError, DistinguishedName, normalize_serial};
use crate::pem;
use const_oid::ObjectIdentifier;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use x509_parser::prelude::*;

/// CRL revocation reason codes (RFC 5280 §5.3.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RevocationReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    // 7 is not used
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
}

impl RevocationReason {
    /// Parses a reason code; `None` for unassigned values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unspecified),
            1 => Some(Self::KeyCompromise),
            2 => Some(Self::CaCompromise),
            3 => Some(Self::AffiliationChanged),
            4 => Some(Self::Superseded),
            5 => Some(Self::CessationOfOperation),
            6 => Some(Self::CertificateHold),
            8 => Some(Self::RemoveFromCrl),
            9 => Some(Self::PrivilegeWithdrawn),
            10 => Some(Self::AaCompromise),
            _ => None,
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "Unspecified",
            Self::KeyCompromise => "KeyCompromise",
            Self::CaCompromise => "CaCompromise",
            Self::AffiliationChanged => "AffiliationChanged",
            Self::Superseded => "Superseded",
            Self::CessationOfOperation => "CessationOfOperation",
            Self::CertificateHold => "CertificateHold",
            Self::RemoveFromCrl => "RemoveFromCRL",
            Self::PrivilegeWithdrawn => "PrivilegeWithdrawn",
            Self::AaCompromise => "AaCompromise",
        };
        f.write_str(name)
    }
}

/// A revoked certificate entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevokedEntry {
    /// Certificate serial number, big-endian.
    pub serial: Vec<u8>,
    /// Revocation date (UNIX seconds).
    pub revocation_date: i64,
    /// Reason code from the CRLReason entry extension.
    pub reason: Option<RevocationReason>,
    /// Invalidity date from the InvalidityDate entry extension.
    pub invalidity_date: Option<i64>,
}

/// Decoded certificate revocation list.
#[derive(Clone, Debug)]
pub struct Crl {
    /// Full CRL DER.
    pub raw: Vec<u8>,
    /// Issuer distinguished name (the cache key).
    pub issuer: DistinguishedName,
    /// Raw DER of the issuer `Name`.
    pub issuer_der: Vec<u8>,
    /// thisUpdate (UNIX seconds).
    pub this_update: i64,
    /// nextUpdate (UNIX seconds), when present.
    pub next_update: Option<i64>,
    /// CRLNumber extension value, big-endian without leading zeros.
    pub crl_number: Option<Vec<u8>>,
    /// Signature algorithm OID.
    pub signature_algorithm: ObjectIdentifier,
    /// Signature bytes over `tbs_der`.
    pub signature: Vec<u8>,
    /// Raw TBSCertList DER (the signed bytes).
    pub tbs_der: Vec<u8>,
    /// Revoked entries keyed by normalized serial.
    pub entries: HashMap<Vec<u8>, RevokedEntry>,
}

impl Crl {
    /// Decodes a CRL from DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self, DecodeError> {
        let (rem, parsed) = x509_parser::parse_x509_crl(der).map_err(|e| DecodeError::CrlParse {
            details: e.to_string(),
        })?;
        if !rem.is_empty() {
            return Err(DecodeError::TrailingDerData);
        }

        let issuer = crate::cert::decode::parse_name(parsed.issuer())?;
        let this_update = parsed.last_update().timestamp();
        let next_update = parsed.next_update().map(|t| t.timestamp());
        if let Some(next) = next_update
            && this_update > next
        {
            return Err(DecodeError::InvalidValidityWindow);
        }

        let crl_number = parsed
            .crl_number()
            .map(|n| normalize_serial(&n.to_bytes_be()).to_vec());

        let mut entries = HashMap::new();
        for revoked in parsed.iter_revoked_certificates() {
            let serial = revoked.raw_serial().to_vec();
            let reason = revoked
                .reason_code()
                .and_then(|(_, code)| RevocationReason::from_u8(code.0 as u8));
            let mut invalidity_date = None;
            for ext in revoked.extensions() {
                if let ParsedExtension::InvalidityDate(time) = ext.parsed_extension() {
                    invalidity_date = Some(time.timestamp());
                }
            }
            entries.insert(
                normalize_serial(&serial).to_vec(),
                RevokedEntry {
                    serial,
                    revocation_date: revoked.revocation_date.timestamp(),
                    reason,
                    invalidity_date,
                },
            );
        }

        Ok(Crl {
            raw: der.to_vec(),
            issuer_der: parsed.issuer().as_raw().to_vec(),
            issuer,
            this_update,
            next_update,
            crl_number,
            signature_algorithm: ObjectIdentifier::new(
                parsed.signature_algorithm.algorithm.to_id_string().as_str(),
            )?,
            signature: parsed.signature_value.data.as_ref().to_vec(),
            tbs_der: parsed.tbs_cert_list.as_ref().to_vec(),
            entries,
        })
    }

    /// Decodes a CRL from a strict PEM `X509 CRL` block.
    pub fn from_pem(pem_data: &[u8]) -> Result<Self, DecodeError> {
        let (label, der) = pem::decode(pem_data).map_err(|e| DecodeError::Pem {
            details: e.to_string(),
        })?;
        if label != pem::LABEL_CRL {
            return Err(DecodeError::InvalidPemLabel {
                expected: pem::LABEL_CRL,
            });
        }
        Self::from_der(&der)
    }

    /// Decodes every `X509 CRL` block in a PEM bundle.
    pub fn from_pem_multi(pem_data: &[u8]) -> Result<Vec<Self>, DecodeError> {
        let blocks = pem::decode_all(pem_data).map_err(|e| DecodeError::Pem {
            details: e.to_string(),
        })?;
        let mut crls = Vec::new();
        for (label, der) in blocks {
            if label == pem::LABEL_CRL {
                crls.push(Self::from_der(&der)?);
            }
        }
        if crls.is_empty() {
            return Err(DecodeError::InvalidPemLabel {
                expected: pem::LABEL_CRL,
            });
        }
        Ok(crls)
    }

    /// Looks up a serial; leading zero octets are ignored on both sides.
    pub fn entry(&self, serial: &[u8]) -> Option<&RevokedEntry> {
        self.entries.get(normalize_serial(serial))
    }

    /// True when nextUpdate is present and in the past.
    pub fn is_expired(&self, now: i64) -> bool {
        self.next_update.is_some_and(|next| next < now)
    }

    /// True when the CRL should be refreshed: no nextUpdate at all, or
    /// nextUpdate within `threshold_secs` of `now`.
    pub fn expires_within(&self, now: i64, threshold_secs: i64) -> bool {
        match self.next_update {
            Some(next) => next <= now + threshold_secs,
            None => true,
        }
    }
}

/// Compares CRLNumber values (big-endian, no leading zeros); an absent
/// number sorts below any present one.
pub(crate) fn compare_crl_numbers(a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
    }
}

/// Formats a UNIX timestamp as `YYYY-MM-DD` for messages.
pub(crate) fn format_date(ts: i64) -> String {
    let days = ts.div_euclid(86_400);
    let (year, month, day) = days_to_ymd(days);
    format!("{year:04}-{month:02}-{day:02}")
}

/// Civil-from-days conversion (proleptic Gregorian).
fn days_to_ymd(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}
