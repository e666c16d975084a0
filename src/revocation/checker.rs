// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Policy-driven orchestration of OCSP and CRL checks.

use super::RevocationVerdict;
use super::crl_check::CrlValidator;
use super::ocsp::OcspClient;
use super::updater::CrlUpdater;
use crate::cert::Certificate;
use crate::result::ValidationResult;
use std::sync::Mutex;
use tracing::debug;

/// How revocation is checked and how failures are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevocationPolicy {
    /// Skip revocation entirely.
    Disabled,
    /// Try OCSP then CRL; inconclusive everywhere degrades to ok.
    SoftFail,
    /// Try OCSP then CRL; inconclusive everywhere counts as revoked.
    HardFail,
    /// CRL is the only accepted method; missing distribution points fail.
    CrlOnly,
    /// OCSP is the only accepted method.
    OcspOnly,
    /// OCSP first, CRL as fallback when OCSP is inconclusive.
    #[default]
    OcspPreferred,
    /// CRL first, OCSP as fallback when CRL is inconclusive.
    CrlPreferred,
}

/// A revocation method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevocationMethod {
    Ocsp,
    Crl,
}

/// Outcome of one method attempt.
#[derive(Clone, Debug)]
pub struct MethodStatus {
    pub method: RevocationMethod,
    /// Whether the method reached a good/revoked decision.
    pub conclusive: bool,
    pub verdict: RevocationVerdict,
    /// First method-level error, when any occurred.
    pub error: Option<String>,
}

/// Structured record of the last revocation check.
#[derive(Clone, Debug)]
pub struct CheckStatus {
    /// Methods attempted, in order.
    pub methods_tried: Vec<RevocationMethod>,
    pub ocsp: Option<MethodStatus>,
    pub crl: Option<MethodStatus>,
    /// Final decision: true when the certificate is acceptable under the
    /// policy.
    pub result: bool,
}

/// Drives OCSP and CRL probes for a `(certificate, issuer)` pair under a
/// configured policy.
pub struct RevocationChecker {
    policy: RevocationPolicy,
    ocsp: OcspClient,
    updater: CrlUpdater,
    crl_validator: CrlValidator,
    last: Mutex<Option<CheckStatus>>,
}

impl RevocationChecker {
    /// Assembles a checker from its engine parts.
    pub fn new(
        policy: RevocationPolicy,
        ocsp: OcspClient,
        updater: CrlUpdater,
        crl_validator: CrlValidator,
    ) -> Self {
        RevocationChecker {
            policy,
            ocsp,
            updater,
            crl_validator,
            last: Mutex::new(None),
        }
    }

    /// The configured policy.
    pub fn policy(&self) -> RevocationPolicy {
        self.policy
    }

    /// Structured record of the most recent check, if any ran.
    pub fn last_check_status(&self) -> Option<CheckStatus> {
        self.last.lock().unwrap().clone()
    }

    /// Checks `cert` against `issuer` under the policy; messages land in
    /// `result` translated per policy (method failures only become
    /// result-level errors under `HardFail` and the `*Only` policies).
    pub fn check(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        now: i64,
        result: &mut ValidationResult,
    ) -> CheckStatus {
        debug!(serial = %cert.serial_hex(), policy = ?self.policy, "revocation check");
        let status = match self.policy {
            RevocationPolicy::Disabled => {
                result.info("revocation checking disabled by policy".to_string());
                CheckStatus {
                    methods_tried: Vec::new(),
                    ocsp: None,
                    crl: None,
                    result: true,
                }
            }
            RevocationPolicy::OcspOnly => self.only_check(cert, issuer, now, result, RevocationMethod::Ocsp),
            RevocationPolicy::CrlOnly => self.only_check(cert, issuer, now, result, RevocationMethod::Crl),
            RevocationPolicy::OcspPreferred | RevocationPolicy::SoftFail => {
                self.fallback_check(cert, issuer, now, result, RevocationMethod::Ocsp, false)
            }
            RevocationPolicy::CrlPreferred => {
                self.fallback_check(cert, issuer, now, result, RevocationMethod::Crl, false)
            }
            RevocationPolicy::HardFail => {
                self.fallback_check(cert, issuer, now, result, RevocationMethod::Ocsp, true)
            }
        };
        *self.last.lock().unwrap() = Some(status.clone());
        status
    }

    /// Single-method policies: the method's messages land verbatim and an
    /// inconclusive outcome is escalated to an error.
    fn only_check(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        now: i64,
        result: &mut ValidationResult,
        method: RevocationMethod,
    ) -> CheckStatus {
        let (verdict, mut temp) = self.run_method(method, cert, issuer, now, false);
        if !verdict.is_conclusive() && temp.is_valid() {
            temp.error(format!(
                "{} revocation check was inconclusive for {}",
                method_name(method),
                cert.serial_hex()
            ));
        }
        let status = method_status(method, &verdict, &temp);
        let ok = verdict.is_conclusive() && !verdict.is_revoked();
        result.merge(temp);
        self.assemble(method, status, None, ok)
    }

    /// Preferred/soft/hard policies: try `first`, fall back to the other
    /// method on an inconclusive outcome.
    fn fallback_check(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
        now: i64,
        result: &mut ValidationResult,
        first: RevocationMethod,
        hard: bool,
    ) -> CheckStatus {
        let second = match first {
            RevocationMethod::Ocsp => RevocationMethod::Crl,
            RevocationMethod::Crl => RevocationMethod::Ocsp,
        };

        let (first_verdict, first_temp) = self.run_method(first, cert, issuer, now, true);
        let first_status = method_status(first, &first_verdict, &first_temp);
        if first_verdict.is_conclusive() {
            let ok = !first_verdict.is_revoked();
            result.merge(first_temp);
            return self.assemble(first, first_status, None, ok);
        }
        result.merge_downgraded(first_temp);

        let (second_verdict, second_temp) = self.run_method(second, cert, issuer, now, true);
        let second_status = method_status(second, &second_verdict, &second_temp);
        if second_verdict.is_conclusive() {
            let ok = !second_verdict.is_revoked();
            result.merge(second_temp);
            return self.assemble(first, first_status, Some((second, second_status)), ok);
        }
        result.merge_downgraded(second_temp);

        let ok = if hard {
            result.error(format!(
                "revocation status of {} could not be determined; treated as revoked",
                cert.serial_hex()
            ));
            false
        } else {
            result.warning(format!(
                "revocation status of {} could not be determined",
                cert.serial_hex()
            ));
            true
        };
        self.assemble(first, first_status, Some((second, second_status)), ok)
    }

    fn run_method(
        &self,
        method: RevocationMethod,
        cert: &Certificate,
        issuer: &Certificate,
        now: i64,
        silent_crl: bool,
    ) -> (RevocationVerdict, ValidationResult) {
        let mut temp = ValidationResult::new();
        let verdict = match method {
            RevocationMethod::Ocsp => self.ocsp.check(cert, issuer, None, now, &mut temp),
            RevocationMethod::Crl => {
                match self.updater.update_from_certificate(cert, now, silent_crl, &mut temp) {
                    Ok(update) => match update.crl {
                        Some(crl) => self
                            .crl_validator
                            .check_revocation(cert, &crl, issuer, now, &mut temp),
                        None => {
                            temp.warning(format!(
                                "no CRL available for {}",
                                cert.issuer
                            ));
                            RevocationVerdict::Unknown
                        }
                    },
                    Err(e) => {
                        temp.error(format!("CRL revocation check failed: {e}"));
                        RevocationVerdict::Unknown
                    }
                }
            }
        };
        (verdict, temp)
    }

    fn assemble(
        &self,
        first: RevocationMethod,
        first_status: MethodStatus,
        second: Option<(RevocationMethod, MethodStatus)>,
        ok: bool,
    ) -> CheckStatus {
        let mut methods_tried = vec![first];
        let mut ocsp = None;
        let mut crl = None;
        match first {
            RevocationMethod::Ocsp => ocsp = Some(first_status),
            RevocationMethod::Crl => crl = Some(first_status),
        }
        if let Some((method, status)) = second {
            methods_tried.push(method);
            match method {
                RevocationMethod::Ocsp => ocsp = Some(status),
                RevocationMethod::Crl => crl = Some(status),
            }
        }
        CheckStatus {
            methods_tried,
            ocsp,
            crl,
            result: ok,
        }
    }
}

fn method_name(method: RevocationMethod) -> &'static str {
    match method {
        RevocationMethod::Ocsp => "OCSP",
        RevocationMethod::Crl => "CRL",
    }
}

fn method_status(
    method: RevocationMethod,
    verdict: &RevocationVerdict,
    temp: &ValidationResult,
) -> MethodStatus {
    MethodStatus {
        method,
        conclusive: verdict.is_conclusive(),
        verdict: verdict.clone(),
        error: temp.errors.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revocation::cache::CrlCache;
    use crate::revocation::ocsp::OcspClientConfig;
    use crate::testutil::{
        FakeFetcher, FakeVerifier, OcspResponseSpec, OcspStatusSpec, Scripted, TS_2024_04_15,
        TS_2024_05_01, TS_2024_06_01, TS_2024_07_01, crl_der, make_ca, ocsp_response_der,
        signed_cert,
    };
    use std::sync::Arc;

    const OCSP_URL: &str = "http://ocsp.example.com";
    const CRL_URL: &str = "http://crl.example.com/int.crl";

    fn fixtures() -> (Certificate, Certificate) {
        let mut leaf =
            signed_cert("example.com", "Int CA", &[0x01], TS_2024_05_01, TS_2024_07_01);
        leaf.extensions.ocsp_urls = vec![OCSP_URL.to_string()];
        leaf.extensions.crl_distribution_points = vec![CRL_URL.to_string()];
        let mut issuer =
            signed_cert("Int CA", "Root CA", &[0x10], TS_2024_05_01 - 86_400, TS_2024_07_01);
        make_ca(&mut issuer, None);
        (leaf, issuer)
    }

    fn checker(policy: RevocationPolicy, fetcher: Arc<FakeFetcher>) -> RevocationChecker {
        let verifier = Arc::new(FakeVerifier::new());
        let config = OcspClientConfig {
            use_nonce: false,
            ..Default::default()
        };
        let ocsp_verifier: Arc<dyn crate::verify::SignatureVerifier> = verifier.clone();
        RevocationChecker::new(
            policy,
            OcspClient::new(
                config,
                Arc::clone(&fetcher) as Arc<dyn crate::fetch::RevocationFetcher>,
                ocsp_verifier,
            ),
            CrlUpdater::new(Arc::new(CrlCache::default()), fetcher),
            CrlValidator::new(Some(verifier)),
        )
    }

    fn good_ocsp(leaf: &Certificate, issuer: &Certificate) -> Vec<u8> {
        ocsp_response_der(&OcspResponseSpec {
            cert: leaf,
            issuer,
            status: OcspStatusSpec::Good,
            produced_at: TS_2024_06_01,
            this_update: TS_2024_06_01 - 600,
            next_update: Some(TS_2024_06_01 + 86_400),
            nonce: None,
            signer: "Int CA",
            responder_certs: Vec::new(),
        })
    }

    fn clean_crl() -> Vec<u8> {
        crl_der("Int CA", TS_2024_05_01, Some(TS_2024_07_01), Some(5), &[])
    }

    fn revoking_crl() -> Vec<u8> {
        crl_der(
            "Int CA",
            TS_2024_05_01,
            Some(TS_2024_07_01),
            Some(5),
            &[(&[0x01], TS_2024_04_15, Some(1))],
        )
    }

    #[test]
    fn test_disabled_policy_short_circuits() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        let checker = checker(RevocationPolicy::Disabled, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(status.result);
        assert!(status.methods_tried.is_empty());
        assert!(result.is_valid());
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_ocsp_only_good() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Ok(good_ocsp(&leaf, &issuer)));
        let checker = checker(RevocationPolicy::OcspOnly, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(status.result);
        assert_eq!(status.methods_tried, vec![RevocationMethod::Ocsp]);
        assert!(status.ocsp.as_ref().unwrap().conclusive);
        assert!(status.crl.is_none());
        assert!(result.is_valid());
    }

    #[test]
    fn test_ocsp_only_unreachable_is_error() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Timeout);
        let checker = checker(RevocationPolicy::OcspOnly, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(!status.result);
        assert!(!result.is_valid());
        // CRL never consulted under OcspOnly
        assert_eq!(fetcher.calls(), vec![OCSP_URL.to_string()]);
    }

    #[test]
    fn test_crl_only_revoked() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(CRL_URL, Scripted::Ok(revoking_crl()));
        let checker = checker(RevocationPolicy::CrlOnly, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(!status.result);
        assert!(!result.is_valid());
        let message = result.errors.iter().find(|e| e.contains("revoked")).unwrap();
        assert!(message.contains("0x01"));
        assert!(message.contains("KeyCompromise"));
        assert!(message.contains("2024-04-15"));
    }

    #[test]
    fn test_crl_only_missing_distribution_points_is_hard_error() {
        let (mut leaf, issuer) = fixtures();
        leaf.extensions.crl_distribution_points.clear();
        let fetcher = Arc::new(FakeFetcher::new());
        let checker = checker(RevocationPolicy::CrlOnly, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(!status.result);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_ocsp_preferred_falls_back_to_crl() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Timeout);
        fetcher.script(CRL_URL, Scripted::Ok(clean_crl()));
        let checker = checker(RevocationPolicy::OcspPreferred, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(status.result);
        assert!(result.is_valid());
        assert_eq!(
            status.methods_tried,
            vec![RevocationMethod::Ocsp, RevocationMethod::Crl]
        );
        // The OCSP failure was downgraded to a warning
        assert!(result.warnings.iter().any(|w| w.contains("unreachable")));
        assert!(status.crl.as_ref().unwrap().conclusive);
    }

    #[test]
    fn test_ocsp_preferred_conclusive_skips_crl() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Ok(good_ocsp(&leaf, &issuer)));
        let checker = checker(RevocationPolicy::OcspPreferred, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(status.result);
        assert_eq!(status.methods_tried, vec![RevocationMethod::Ocsp]);
        assert_eq!(fetcher.calls(), vec![OCSP_URL.to_string()]);
    }

    #[test]
    fn test_crl_preferred_falls_back_to_ocsp() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(CRL_URL, Scripted::Http(404));
        fetcher.script(OCSP_URL, Scripted::Ok(good_ocsp(&leaf, &issuer)));
        let checker = checker(RevocationPolicy::CrlPreferred, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(status.result);
        assert!(result.is_valid());
        assert_eq!(
            status.methods_tried,
            vec![RevocationMethod::Crl, RevocationMethod::Ocsp]
        );
    }

    #[test]
    fn test_soft_fail_all_unreachable_is_ok_with_warnings() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Timeout);
        fetcher.script(CRL_URL, Scripted::Timeout);
        let checker = checker(RevocationPolicy::SoftFail, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(status.result);
        assert!(result.is_valid());
        assert_eq!(
            status.methods_tried,
            vec![RevocationMethod::Ocsp, RevocationMethod::Crl]
        );
        // At least one warning per failed method
        assert!(result.warnings.iter().any(|w| w.contains("OCSP")));
        assert!(result.warnings.iter().any(|w| w.contains("CRL")));
    }

    #[test]
    fn test_soft_fail_still_reports_revoked() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Timeout);
        fetcher.script(CRL_URL, Scripted::Ok(revoking_crl()));
        let checker = checker(RevocationPolicy::SoftFail, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(!status.result);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_hard_fail_all_unreachable_is_error() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Timeout);
        fetcher.script(CRL_URL, Scripted::Timeout);
        let checker = checker(RevocationPolicy::HardFail, Arc::clone(&fetcher));
        let mut result = ValidationResult::new();

        let status = checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        assert!(!status.result);
        assert!(!result.is_valid());
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.contains("treated as revoked"))
        );
    }

    #[test]
    fn test_last_check_status_recorded() {
        let (leaf, issuer) = fixtures();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.script(OCSP_URL, Scripted::Ok(good_ocsp(&leaf, &issuer)));
        let checker = checker(RevocationPolicy::OcspOnly, Arc::clone(&fetcher));
        assert!(checker.last_check_status().is_none());

        let mut result = ValidationResult::new();
        checker.check(&leaf, &issuer, TS_2024_06_01, &mut result);
        let last = checker.last_check_status().unwrap();
        assert!(last.result);
        assert_eq!(last.methods_tried, vec![RevocationMethod::Ocsp]);
    }
}
