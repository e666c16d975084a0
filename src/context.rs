// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Validation entry point: options plus the context owning all caches.

use crate::cert::Certificate;
use crate::chain::{self, ChainError, build_chain, validator};
use crate::fetch::RevocationFetcher;
use crate::result::ValidationResult;
use crate::revocation::{
    CheckStatus, CrlCache, CrlUpdater, CrlValidator, OcspClient, OcspClientConfig,
    RevocationChecker, RevocationError, RevocationPolicy, RevocationVerdict,
};
use crate::verify::SignatureVerifier;
use const_oid::ObjectIdentifier;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use x509_cert::ext::pkix::KeyUsage;

/// Certificate validity check mode.
#[derive(Clone, Copy, Debug, Default)]
pub enum ValidityCheck {
    /// Validate against current wall-clock time.
    #[default]
    Now,
    /// Validate against a specific unix timestamp.
    At(i64),
    /// Skip validity-time checks.
    Disabled,
}

impl ValidityCheck {
    pub(crate) fn timestamp(&self) -> Option<i64> {
        match self {
            ValidityCheck::Now => Some(wallclock()),
            ValidityCheck::At(ts) => Some(*ts),
            ValidityCheck::Disabled => None,
        }
    }
}

pub(crate) fn wallclock() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs() as i64
}

/// Validation policy knobs.
#[derive(Clone, Debug)]
pub struct ValidationOptions {
    /// Run full chain validation.
    pub validate_chain: bool,
    /// Check keyUsage bits against `expected_key_usage`.
    pub validate_key_usage: bool,
    /// Check EKU OIDs against `expected_eku`.
    pub validate_extended_key_usage: bool,
    /// The chain must terminate at a configured trust anchor.
    pub require_complete_chain: bool,
    /// Accept a self-signed leaf with no issuer.
    pub allow_self_signed: bool,
    /// Key usage bits the leaf must carry.
    pub expected_key_usage: Option<KeyUsage>,
    /// EKU OIDs the leaf must assert.
    pub expected_eku: Vec<ObjectIdentifier>,
    /// Gate for the revocation engine.
    pub check_revocation: bool,
    /// Enforce hostname matching when `expected_hostname` is set.
    pub validate_san: bool,
    /// Hostname the leaf must cover (SAN, or CN when SAN is absent).
    pub expected_hostname: Option<String>,
    /// Orchestration of OCSP vs CRL.
    pub revocation_policy: RevocationPolicy,
    /// Hard cap on chain depth.
    pub max_chain_length: usize,
    /// Certificate policy OIDs the leaf must satisfy.
    pub expected_policies: Vec<ObjectIdentifier>,
    /// Honor policyMappings when matching expected policies.
    pub apply_policy_mappings: bool,
    /// The instant certificates are evaluated at.
    pub evaluation_time: ValidityCheck,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            validate_chain: true,
            validate_key_usage: true,
            validate_extended_key_usage: true,
            require_complete_chain: true,
            allow_self_signed: false,
            expected_key_usage: None,
            expected_eku: Vec::new(),
            check_revocation: false,
            validate_san: true,
            expected_hostname: None,
            revocation_policy: RevocationPolicy::default(),
            max_chain_length: chain::MAX_CHAIN_LENGTH,
            expected_policies: Vec::new(),
            apply_policy_mappings: false,
            evaluation_time: ValidityCheck::default(),
        }
    }
}

/// Owns the trust anchors, the verifier port and all revocation state for
/// a series of validations. Caches are per-context; there is no global
/// state, and a context is safe to share across threads.
pub struct ValidationContext {
    options: ValidationOptions,
    anchors: Vec<Certificate>,
    verifier: Arc<dyn SignatureVerifier>,
    checker: Option<RevocationChecker>,
}

impl ValidationContext {
    /// Context without network-facing revocation support; revocation
    /// checks degrade to a warning when requested.
    pub fn new(
        options: ValidationOptions,
        anchors: Vec<Certificate>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        ValidationContext {
            options,
            anchors,
            verifier,
            checker: None,
        }
    }

    /// Context with the revocation engine wired to `fetcher`, using
    /// default OCSP client and CRL cache settings.
    pub fn with_fetcher(
        options: ValidationOptions,
        anchors: Vec<Certificate>,
        verifier: Arc<dyn SignatureVerifier>,
        fetcher: Arc<dyn RevocationFetcher>,
    ) -> Self {
        Self::with_revocation(options, anchors, verifier, fetcher, OcspClientConfig::default())
    }

    /// Context with an explicitly configured OCSP client.
    pub fn with_revocation(
        options: ValidationOptions,
        anchors: Vec<Certificate>,
        verifier: Arc<dyn SignatureVerifier>,
        fetcher: Arc<dyn RevocationFetcher>,
        ocsp_config: OcspClientConfig,
    ) -> Self {
        let ocsp = OcspClient::new(ocsp_config, Arc::clone(&fetcher), Arc::clone(&verifier));
        let updater = CrlUpdater::new(Arc::new(CrlCache::default()), fetcher);
        let crl_validator = CrlValidator::new(Some(Arc::clone(&verifier)));
        let checker =
            RevocationChecker::new(options.revocation_policy, ocsp, updater, crl_validator);
        ValidationContext {
            options,
            anchors,
            verifier,
            checker: Some(checker),
        }
    }

    /// The configured options.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// The revocation checker, when a fetcher was supplied.
    pub fn revocation_checker(&self) -> Option<&RevocationChecker> {
        self.checker.as_ref()
    }

    /// Validates `leaf` against the context's anchors, assembling a chain
    /// from `intermediates` and running chain, policy and revocation
    /// checks per the options. One call, one result; errors are recorded,
    /// never thrown.
    pub fn validate(&self, leaf: &Certificate, intermediates: &[Certificate]) -> ValidationResult {
        let mut result = ValidationResult::new();
        let temporal_now = self.options.evaluation_time.timestamp();
        let now = temporal_now.unwrap_or_else(wallclock);

        if self.options.check_revocation && self.checker.is_none() {
            result.warning(
                "revocation checking requested but no fetcher is configured; skipping".to_string(),
            );
        }

        let chain = match build_chain(
            leaf,
            intermediates,
            &self.anchors,
            self.options.max_chain_length,
            self.verifier.as_ref(),
            now,
        ) {
            Ok(chain) => chain,
            Err(e) => {
                match &e {
                    ChainError::IncompleteChain { partial, .. } => {
                        result.info(format!(
                            "partial chain of length {} assembled before failure",
                            partial.len()
                        ));
                    }
                    ChainError::MaxDepthExceeded { .. } | ChainError::CycleDetected { .. } => {}
                }
                result.error(format!("chain building failed: {e}"));
                return result;
            }
        };
        result.info(format!("assembled chain of length {}", chain.len()));

        if self.options.validate_chain {
            validator::validate_chain(
                &chain,
                &self.anchors,
                &self.options,
                self.verifier.as_ref(),
                self.checker.as_ref(),
                temporal_now,
                now,
                &mut result,
            );
        } else {
            result.info("chain validation disabled by options".to_string());
        }

        result
    }

    /// Builds the certification path without validating it.
    pub fn build_chain(
        &self,
        leaf: &Certificate,
        candidates: &[Certificate],
    ) -> chain::Result<Vec<Certificate>> {
        let now = self
            .options
            .evaluation_time
            .timestamp()
            .unwrap_or_else(wallclock);
        build_chain(
            leaf,
            candidates,
            &self.anchors,
            self.options.max_chain_length,
            self.verifier.as_ref(),
            now,
        )
    }

    /// Checks a single `(certificate, issuer)` pair under the configured
    /// revocation policy.
    pub fn check_revocation(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
    ) -> Result<RevocationVerdict, RevocationError> {
        let checker = self.checker.as_ref().ok_or(RevocationError::NotConfigured)?;
        let now = self
            .options
            .evaluation_time
            .timestamp()
            .unwrap_or_else(wallclock);
        let mut scratch = ValidationResult::new();
        let status = checker.check(cert, issuer, now, &mut scratch);
        Ok(verdict_of(&status))
    }
}

fn verdict_of(status: &CheckStatus) -> RevocationVerdict {
    for method in [status.ocsp.as_ref(), status.crl.as_ref()].into_iter().flatten() {
        if method.verdict.is_revoked() {
            return method.verdict.clone();
        }
    }
    if status.result {
        RevocationVerdict::Good
    } else {
        RevocationVerdict::Unknown
    }
}
