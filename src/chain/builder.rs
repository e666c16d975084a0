// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Certification path assembly from loose candidates.

use super::error::{ChainError, Result};
use crate::cert::{Certificate, normalize_serial};
use crate::verify::{SignatureVerifier, is_self_signed};
use tracing::debug;

/// Builds the certification path `[leaf, ..., root-or-anchor]`.
///
/// The chain grows from the leaf: at each step the pool of anchors and
/// candidates is searched for the cursor's issuer, skipping anything
/// already chained (cycle prevention by `(subject_dn, serial)`). Ties are
/// broken deterministically: anchors over intermediates, then longer
/// remaining validity at `now`, then lexicographic serial order.
///
/// The build succeeds when the cursor is a trust anchor or a verified
/// self-signed root; it fails with the partial chain preserved when no
/// issuer can be found, and with `MaxDepthExceeded` when growing past
/// `max_chain_length`.
pub fn build_chain(
    leaf: &Certificate,
    candidates: &[Certificate],
    anchors: &[Certificate],
    max_chain_length: usize,
    verifier: &dyn SignatureVerifier,
    now: i64,
) -> Result<Vec<Certificate>> {
    let mut chain = vec![leaf.clone()];

    loop {
        let cursor = chain.last().expect("chain starts non-empty");

        if anchors.iter().any(|anchor| anchor.same_identity(cursor)) {
            debug!(subject = %cursor.subject, depth = chain.len(), "chain reached trust anchor");
            return Ok(chain);
        }
        if cursor.is_self_issued() && is_self_signed(cursor, verifier) {
            debug!(subject = %cursor.subject, depth = chain.len(), "chain reached self-signed root");
            return Ok(chain);
        }

        if chain.len() >= max_chain_length {
            return Err(ChainError::MaxDepthExceeded {
                max: max_chain_length,
            });
        }

        let issuer_dn = cursor.issuer.clone();
        let pool = anchors
            .iter()
            .map(|cert| (cert, true))
            .chain(candidates.iter().map(|cert| (cert, false)));

        let mut matches: Vec<(&Certificate, bool)> = pool
            .filter(|(cert, _)| cert.subject == issuer_dn)
            .filter(|(cert, _)| !chain.iter().any(|link| link.same_identity(cert)))
            .collect();

        if matches.is_empty() {
            let subject = cursor.subject.to_string();
            return Err(ChainError::IncompleteChain {
                subject,
                partial: chain,
            });
        }

        matches.sort_by(|(a, a_anchor), (b, b_anchor)| {
            b_anchor
                .cmp(a_anchor)
                .then_with(|| b.remaining_validity(now).cmp(&a.remaining_validity(now)))
                .then_with(|| normalize_serial(&a.serial).cmp(normalize_serial(&b.serial)))
        });

        // Keep at most one copy of the same identity, preferring the
        // anchor flag established by the sort above.
        let (issuer, _) = matches[0];
        chain.push(issuer.clone());
    }
}
