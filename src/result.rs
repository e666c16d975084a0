// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Validation outcome accumulator.

/// Accumulated outcome of a validation run.
///
/// Messages are kept in four append-only lists in insertion order, so a
/// consumer can render a chronological log of what the engine checked.
/// A result is valid exactly when no error was recorded; warnings do not
/// taint validity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Failures; any entry makes the result invalid.
    pub errors: Vec<String>,
    /// Non-fatal findings (stale CRL used, revocation skipped, ...).
    pub warnings: Vec<String>,
    /// Neutral progress notes.
    pub infos: Vec<String>,
    /// Checks that passed.
    pub successes: Vec<String>,
}

impl ValidationResult {
    /// Creates an empty (valid) result.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records an error.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records a warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Records an informational message.
    pub fn info(&mut self, message: impl Into<String>) {
        self.infos.push(message.into());
    }

    /// Records a passed check.
    pub fn success(&mut self, message: impl Into<String>) {
        self.successes.push(message.into());
    }

    /// Appends all messages of `other`, list by list, preserving order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.infos.extend(other.infos);
        self.successes.extend(other.successes);
    }

    /// Appends `other` with its errors downgraded to warnings.
    ///
    /// Used by soft revocation policies where a method-level failure must
    /// not taint the overall verdict.
    pub fn merge_downgraded(&mut self, other: ValidationResult) {
        self.warnings.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.infos.extend(other.infos);
        self.successes.extend(other.successes);
    }
}
