// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! CRL validation against the issuing certificate and per-serial lookup.

use super::RevocationVerdict;
use super::crl::{Crl, RevocationReason, format_date};
use crate::cert::Certificate;
use crate::result::ValidationResult;
use crate::verify::{SignatureVerifier, verify_with_oid};
use std::sync::Arc;

/// Validates CRLs and answers revocation lookups against them.
pub struct CrlValidator {
    verifier: Option<Arc<dyn SignatureVerifier>>,
}

impl CrlValidator {
    /// Creates a validator; without a verifier, signature checks degrade
    /// to a warning.
    pub fn new(verifier: Option<Arc<dyn SignatureVerifier>>) -> Self {
        CrlValidator { verifier }
    }

    /// Validates `crl` against its issuing certificate at `now`.
    ///
    /// An expired CRL produces a warning, not an error: a stale list is
    /// still more useful than none, and the policy layer decides whether
    /// to escalate.
    pub fn validate(
        &self,
        crl: &Crl,
        issuer_cert: &Certificate,
        now: i64,
        result: &mut ValidationResult,
    ) {
        if crl.issuer != issuer_cert.subject {
            result.error(format!(
                "CRL issuer {} does not match certificate subject {}",
                crl.issuer, issuer_cert.subject
            ));
            return;
        }

        if crl.this_update > now {
            result.error(format!(
                "CRL is not yet valid: thisUpdate {}",
                format_date(crl.this_update)
            ));
        }
        if let Some(next) = crl.next_update
            && next < now
        {
            result.warning(format!("CRL has expired: nextUpdate {}", format_date(next)));
        }

        match &self.verifier {
            Some(verifier) => {
                match verify_with_oid(
                    verifier.as_ref(),
                    &crl.tbs_der,
                    &crl.signature,
                    &issuer_cert.public_key,
                    &crl.signature_algorithm,
                ) {
                    Ok(true) => result.success(format!("CRL signature valid for {}", crl.issuer)),
                    Ok(false) => result.error(format!("CRL signature invalid for {}", crl.issuer)),
                    Err(e) => result.error(format!("CRL signature check failed: {e}")),
                }
            }
            None => result.warning("CRL signature not verified: no verifier supplied".to_string()),
        }
    }

    /// Validates the CRL, then looks `cert` up in it.
    ///
    /// An entry with reason `RemoveFromCRL` means the certificate was
    /// previously held and has been released, so it is not revoked.
    pub fn check_revocation(
        &self,
        cert: &Certificate,
        crl: &Crl,
        issuer_cert: &Certificate,
        now: i64,
        result: &mut ValidationResult,
    ) -> RevocationVerdict {
        let mut crl_result = ValidationResult::new();
        self.validate(crl, issuer_cert, now, &mut crl_result);
        let usable = crl_result.is_valid();
        result.merge(crl_result);
        if !usable {
            return RevocationVerdict::Unknown;
        }

        match crl.entry(&cert.serial) {
            Some(entry) if entry.reason == Some(RevocationReason::RemoveFromCrl) => {
                result.success(format!(
                    "certificate {} was released from hold (RemoveFromCRL)",
                    cert.serial_hex()
                ));
                RevocationVerdict::Good
            }
            Some(entry) => {
                let reason = entry
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "Unspecified".to_string());
                result.error(format!(
                    "certificate {} revoked: reason {}, date {}",
                    cert.serial_hex(),
                    reason,
                    format_date(entry.revocation_date)
                ));
                RevocationVerdict::Revoked {
                    revoked_at: entry.revocation_date,
                    reason: entry.reason,
                }
            }
            None => {
                result.success(format!(
                    "certificate {} not listed in CRL for {}",
                    cert.serial_hex(),
                    crl.issuer
                ));
                RevocationVerdict::Good
            }
        }
    }
}
