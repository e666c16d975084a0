// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::cert::Certificate;
use thiserror::Error;

/// Result type used by chain-building APIs.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Error type used by chain-building APIs.
#[derive(Debug, Error)]
pub enum ChainError {
    /// No issuer could be found for the last certificate; carries the
    /// partial chain for diagnostics.
    #[error("incomplete chain: no issuer certificate found for {subject}")]
    IncompleteChain {
        subject: String,
        partial: Vec<Certificate>,
    },
    #[error("maximum chain depth {max} exceeded")]
    MaxDepthExceeded { max: usize },
    /// A candidate already present in the chain (by subject DN and
    /// serial) would be added again.
    #[error("cycle detected at {subject}")]
    CycleDetected { subject: String },
}
