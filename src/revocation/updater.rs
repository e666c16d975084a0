// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! CRL refresh from certificate distribution points.

use super::cache::CrlCache;
use super::crl::{Crl, compare_crl_numbers};
use super::error::{Result, RevocationError};
use crate::cert::Certificate;
use crate::fetch::RevocationFetcher;
use crate::result::ValidationResult;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a CRL refresh attempt.
#[derive(Debug)]
pub struct CrlUpdate {
    /// The CRL to use for the decision, when one exists.
    pub crl: Option<Arc<Crl>>,
    /// True when a freshly fetched CRL replaced the cached state; false
    /// when the cached (or no) CRL was kept, including refused updates.
    pub refreshed: bool,
}

/// Refreshes CRLs from certificate distribution points into a shared
/// cache, refusing CRLNumber regressions.
pub struct CrlUpdater {
    cache: Arc<CrlCache>,
    fetcher: Arc<dyn RevocationFetcher>,
    refresh_threshold_secs: i64,
    fetch_timeout: Duration,
}

impl CrlUpdater {
    /// Default refresh horizon before nextUpdate.
    pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 3600;

    /// Default per-fetch timeout handed to the fetcher policy.
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates an updater over a shared cache and fetcher.
    pub fn new(cache: Arc<CrlCache>, fetcher: Arc<dyn RevocationFetcher>) -> Self {
        CrlUpdater {
            cache,
            fetcher,
            refresh_threshold_secs: Self::DEFAULT_REFRESH_THRESHOLD_SECS,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the refresh horizon.
    pub fn with_refresh_threshold(mut self, secs: i64) -> Self {
        self.refresh_threshold_secs = secs;
        self
    }

    /// Overrides the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The timeout fetcher implementations should apply per CRL fetch.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// The shared cache this updater feeds.
    pub fn cache(&self) -> &Arc<CrlCache> {
        &self.cache
    }

    /// Obtains a current CRL for `cert`'s issuer.
    ///
    /// Walks the certificate's CRL distribution points in order once the
    /// cached CRL (if any) is inside the refresh horizon. Distribution
    /// point failures fall back to the cached CRL with a warning; with no
    /// cached CRL the call fails with `NoCrlAvailable` unless `silent`.
    pub fn update_from_certificate(
        &self,
        cert: &Certificate,
        now: i64,
        silent: bool,
        result: &mut ValidationResult,
    ) -> Result<CrlUpdate> {
        let issuer = &cert.issuer;
        let cached = self.cache.get(issuer);

        if let Some(crl) = &cached
            && !crl.expires_within(now, self.refresh_threshold_secs)
        {
            debug!(issuer = %issuer, "cached CRL still fresh");
            return Ok(CrlUpdate {
                crl: Some(Arc::clone(crl)),
                refreshed: false,
            });
        }

        let distribution_points = &cert.extensions.crl_distribution_points;
        if distribution_points.is_empty() {
            return match cached {
                Some(crl) => {
                    result.warning(format!(
                        "no CRL distribution points in {}; keeping cached CRL",
                        cert.subject
                    ));
                    Ok(CrlUpdate {
                        crl: Some(crl),
                        refreshed: false,
                    })
                }
                None if silent => Ok(CrlUpdate {
                    crl: None,
                    refreshed: false,
                }),
                None => Err(RevocationError::NoDistributionPoints {
                    subject: cert.subject.to_string(),
                }),
            };
        }

        for url in distribution_points {
            let bytes = match self.fetcher.fetch(url) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(%url, error = %e, "CRL fetch failed");
                    result.warning(format!("CRL fetch from {url} failed: {e}"));
                    continue;
                }
            };
            let fetched = match Crl::from_der(&bytes) {
                Ok(crl) => crl,
                Err(e) => {
                    warn!(%url, error = %e, "CRL decode failed");
                    result.warning(format!("CRL from {url} failed to decode: {e}"));
                    continue;
                }
            };

            if fetched.issuer != *issuer {
                result.warning(format!(
                    "CRL from {url} is issued by {} instead of {}",
                    fetched.issuer, issuer
                ));
                continue;
            }

            if let Some(current) = &cached {
                match compare_crl_numbers(
                    fetched.crl_number.as_deref(),
                    current.crl_number.as_deref(),
                ) {
                    Ordering::Less => {
                        warn!(%url, issuer = %issuer, "CRL number regression refused");
                        result.warning(format!(
                            "CRL from {url} regresses the CRL number; keeping cached CRL"
                        ));
                        continue;
                    }
                    Ordering::Equal if fetched.this_update <= current.this_update => {
                        debug!(issuer = %issuer, "fetched CRL is not newer; keeping cached");
                        return Ok(CrlUpdate {
                            crl: Some(Arc::clone(current)),
                            refreshed: false,
                        });
                    }
                    _ => {}
                }
            }

            // Concurrent puts race here; the cache re-checks monotonicity
            // under its own lock.
            if !self.cache.put(fetched) {
                if let Some(current) = self.cache.get(issuer) {
                    return Ok(CrlUpdate {
                        crl: Some(current),
                        refreshed: false,
                    });
                }
                continue;
            }
            result.info(format!("refreshed CRL for {issuer}"));
            let stored = self.cache.get(issuer);
            return Ok(CrlUpdate {
                crl: stored,
                refreshed: true,
            });
        }

        match cached {
            Some(crl) => {
                result.warning(format!(
                    "all CRL distribution points failed for {issuer}; using cached CRL"
                ));
                Ok(CrlUpdate {
                    crl: Some(crl),
                    refreshed: false,
                })
            }
            None if silent => Ok(CrlUpdate {
                crl: None,
                refreshed: false,
            }),
            None => Err(RevocationError::NoCrlAvailable {
                issuer: issuer.to_string(),
            }),
        }
    }
}
