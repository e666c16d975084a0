// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Bounded in-memory CRL cache keyed by issuer DN.

use super::crl::{Crl, compare_crl_numbers};
use crate::cert::DistinguishedName;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Bounded CRL cache, at most one CRL per issuer.
///
/// Shared by concurrent validations; every operation takes the single
/// internal lock, so readers always observe a consistent
/// `(entry, next_update)` pair and replacements preserve CRLNumber
/// monotonicity even under concurrent `put`.
pub struct CrlCache {
    inner: Mutex<Inner>,
    max_entries: usize,
}

struct Inner {
    entries: HashMap<DistinguishedName, Slot>,
    tick: u64,
}

struct Slot {
    crl: Arc<Crl>,
    last_used: u64,
}

impl CrlCache {
    /// Default bound on cached issuers.
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    /// Creates a cache holding at most `max_entries` CRLs.
    pub fn new(max_entries: usize) -> Self {
        CrlCache {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tick: 0,
            }),
            max_entries: max_entries.max(1),
        }
    }

    /// Returns the cached CRL for `issuer`, refreshing its LRU position.
    pub fn get(&self, issuer: &DistinguishedName) -> Option<Arc<Crl>> {
        let mut inner = self.inner.lock().unwrap();
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.get_mut(issuer).map(|slot| {
            slot.last_used = tick;
            Arc::clone(&slot.crl)
        })
    }

    /// Inserts `crl` under its issuer DN, replacing any previous entry.
    ///
    /// Returns false (cache unchanged) when the replacement's CRLNumber is
    /// strictly lower than the cached one. Evicts the least recently used
    /// issuer when the bound is exceeded.
    pub fn put(&self, crl: Crl) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(existing) = inner.entries.get(&crl.issuer)
            && compare_crl_numbers(crl.crl_number.as_deref(), existing.crl.crl_number.as_deref())
                == Ordering::Less
        {
            warn!(issuer = %crl.issuer, "rejecting CRL with regressed CRL number");
            return false;
        }

        let issuer = crl.issuer.clone();
        inner.entries.insert(
            issuer.clone(),
            Slot {
                crl: Arc::new(crl),
                last_used: tick,
            },
        );
        debug!(issuer = %issuer, "cached CRL");

        while inner.entries.len() > self.max_entries {
            let victim = inner
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    inner.entries.remove(&key);
                    debug!(issuer = %key, "evicted least recently used CRL");
                }
                None => break,
            }
        }
        true
    }

    /// True when there is no usable cached CRL for `issuer` within the
    /// refresh horizon: no entry, no nextUpdate, or nextUpdate at or
    /// before `now + threshold_secs`.
    pub fn is_expiring_soon(
        &self,
        issuer: &DistinguishedName,
        now: i64,
        threshold_secs: i64,
    ) -> bool {
        let inner = self.inner.lock().unwrap();
        match inner.entries.get(issuer) {
            Some(slot) => slot.crl.expires_within(now, threshold_secs),
            None => true,
        }
    }

    /// Drops entries that are expired at `now` (or carry no nextUpdate);
    /// returns how many were removed.
    pub fn remove_expired(&self, now: i64) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, slot| slot.crl.next_update.is_some_and(|next| next > now));
        before - inner.entries.len()
    }

    /// Number of cached issuers.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.lock().unwrap().entries.clear();
    }
}

impl Default for CrlCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ENTRIES)
    }
}
