// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RFC 5280-style validation of an assembled certification path.

use super::hostname;
use crate::cert::{ANY_EKU, ANY_POLICY, Certificate};
use crate::context::ValidationOptions;
use crate::result::ValidationResult;
use crate::revocation::RevocationChecker;
use crate::verify::{SignatureVerifier, is_self_signed, verify_with_oid};
use x509_cert::ext::pkix::KeyUsages;

/// Walks the chain leaf to root, recording every finding in `result`.
///
/// `temporal_now` is `None` when validity-time checks are disabled; `now`
/// is the reference instant used for revocation freshness either way.
pub(crate) fn validate_chain(
    chain: &[Certificate],
    anchors: &[Certificate],
    options: &ValidationOptions,
    verifier: &dyn SignatureVerifier,
    checker: Option<&RevocationChecker>,
    temporal_now: Option<i64>,
    now: i64,
    result: &mut ValidationResult,
) {
    if chain.is_empty() {
        result.error("cannot validate an empty chain".to_string());
        return;
    }
    let last_index = chain.len() - 1;
    let anchored = anchors
        .iter()
        .any(|anchor| anchor.same_identity(&chain[last_index]));

    for (i, cert) in chain.iter().enumerate() {
        check_temporal(cert, temporal_now, result);
        check_critical_extensions(cert, result);

        if i < last_index {
            // Structural re-check, independent of what the builder did.
            if cert.issuer != chain[i + 1].subject {
                result.error(format!(
                    "issuer DN of {} does not match subject DN of {}",
                    cert.subject,
                    chain[i + 1].subject
                ));
            }
            check_signature(cert, &chain[i + 1], verifier, result);
        } else if anchored {
            result.info(format!("{} is a configured trust anchor", cert.subject));
        } else if cert.is_self_issued() {
            check_signature(cert, cert, verifier, result);
        }

        if i > 0 {
            check_ca_constraints(chain, i, result);
        }

        // Revocation applies to every link that has an issuer above it.
        if i < last_index
            && options.check_revocation
            && let Some(checker) = checker
        {
            checker.check(cert, &chain[i + 1], now, result);
        }
    }

    if options.require_complete_chain && !anchored {
        let leaf = &chain[0];
        if options.allow_self_signed && chain.len() == 1 && is_self_signed(leaf, verifier) {
            result.warning(format!(
                "self-signed certificate {} accepted without a trust anchor",
                leaf.subject
            ));
        } else {
            result.error(format!(
                "chain terminates at untrusted root {}",
                chain[last_index].subject
            ));
        }
    }

    check_leaf(&chain[0], options, result);
    check_policies(chain, options, result);
}

fn check_temporal(cert: &Certificate, temporal_now: Option<i64>, result: &mut ValidationResult) {
    let Some(now) = temporal_now else {
        return;
    };
    // Both bounds are inclusive.
    if now < cert.not_before {
        result.error(format!(
            "certificate {} is not yet valid (notBefore)",
            cert.subject
        ));
    } else if now > cert.not_after {
        result.error(format!(
            "certificate {} has expired (notAfter)",
            cert.subject
        ));
    } else {
        result.success(format!("certificate {} is within its validity period", cert.subject));
    }
}

fn check_critical_extensions(cert: &Certificate, result: &mut ValidationResult) {
    for oid in &cert.extensions.unknown_critical {
        result.error(format!(
            "certificate {} carries unrecognized critical extension {}",
            cert.subject, oid
        ));
    }
}

fn check_signature(
    cert: &Certificate,
    signer: &Certificate,
    verifier: &dyn SignatureVerifier,
    result: &mut ValidationResult,
) {
    match verify_with_oid(
        verifier,
        &cert.tbs_der,
        &cert.signature,
        &signer.public_key,
        &cert.signature_algorithm,
    ) {
        Ok(true) => result.success(format!(
            "signature of {} verified with key of {}",
            cert.subject, signer.subject
        )),
        Ok(false) => result.error(format!(
            "signature of {} does not verify with key of {}",
            cert.subject, signer.subject
        )),
        Err(e) => result.error(format!(
            "cannot verify signature of {}: {e}",
            cert.subject
        )),
    }
}

fn check_ca_constraints(chain: &[Certificate], i: usize, result: &mut ValidationResult) {
    let cert = &chain[i];
    if !cert.is_ca() {
        result.error(format!(
            "certificate {} is used as an issuer but is not a CA",
            cert.subject
        ));
    }
    if let Some(ku) = &cert.extensions.key_usage
        && !ku.0.contains(KeyUsages::KeyCertSign)
    {
        result.error(format!(
            "CA certificate {} lacks keyCertSign key usage",
            cert.subject
        ));
    }
    if let Some(limit) = cert.path_len_constraint() {
        // Non-self-issued certificates strictly between this CA and the
        // leaf count against the constraint.
        let between = chain[1..i]
            .iter()
            .filter(|link| !link.is_self_issued())
            .count();
        if between > limit as usize {
            result.error(format!(
                "path length constraint of {} exceeded ({} intermediates below it)",
                cert.subject, between
            ));
        }
    }
}

fn check_leaf(leaf: &Certificate, options: &ValidationOptions, result: &mut ValidationResult) {
    if options.validate_key_usage
        && let Some(expected) = &options.expected_key_usage
    {
        match &leaf.extensions.key_usage {
            Some(ku) if (ku.0 & expected.0) == expected.0 => {
                result.success(format!("leaf {} carries the required key usage", leaf.subject));
            }
            Some(_) => result.error(format!(
                "leaf {} is missing required key usage bits",
                leaf.subject
            )),
            None => result.error(format!(
                "leaf {} has no keyUsage extension but one is required",
                leaf.subject
            )),
        }
    }

    if options.validate_extended_key_usage && !options.expected_eku.is_empty() {
        let ekus = &leaf.extensions.extended_key_usage;
        let has_any = ekus.contains(&ANY_EKU);
        for expected in &options.expected_eku {
            if has_any || ekus.contains(expected) {
                result.success(format!("leaf {} asserts EKU {}", leaf.subject, expected));
            } else {
                result.error(format!(
                    "leaf {} is missing required EKU {}",
                    leaf.subject, expected
                ));
            }
        }
    }

    if options.validate_san
        && let Some(host) = &options.expected_hostname
    {
        if hostname::verify_hostname(leaf, host) {
            result.success(format!("hostname {host} matches {}", leaf.subject));
        } else {
            result.error(format!(
                "hostname {host} does not match certificate names [{}]",
                hostname::presented_names(leaf).join(", ")
            ));
        }
    }
}

fn check_policies(chain: &[Certificate], options: &ValidationOptions, result: &mut ValidationResult) {
    if options.expected_policies.is_empty() {
        return;
    }
    let leaf = &chain[0];
    let asserted: Vec<_> = leaf.extensions.policies.iter().map(|p| p.oid).collect();
    let has_any_policy = asserted.contains(&ANY_POLICY);

    for expected in &options.expected_policies {
        let mut satisfied = has_any_policy || asserted.contains(expected);

        // Policy mappings let an issuer-domain OID stand for a different
        // OID in the subject domain further down the chain.
        if !satisfied && options.apply_policy_mappings {
            satisfied = chain.iter().any(|cert| {
                cert.extensions.policy_mappings.iter().any(|mapping| {
                    mapping.issuer_domain == *expected && asserted.contains(&mapping.subject_domain)
                })
            });
        }

        if satisfied {
            result.success(format!("certificate policy {expected} satisfied"));
        } else {
            result.error(format!(
                "required certificate policy {expected} is not asserted by {}",
                leaf.subject
            ));
        }
    }
}
