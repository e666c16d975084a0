// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RFC 6125 hostname matching against SAN entries (CN fallback).

use crate::cert::{AltName, Certificate};

/// True when `hostname` matches the certificate's DNS names.
///
/// SAN DNS entries are authoritative; the subject CN is consulted only
/// when the certificate carries no SAN extension entries at all.
pub(crate) fn verify_hostname(cert: &Certificate, hostname: &str) -> bool {
    let hostname = hostname.to_ascii_lowercase();

    if !cert.extensions.subject_alt_names.is_empty() {
        return cert
            .extensions
            .subject_alt_names
            .iter()
            .filter_map(|name| match name {
                AltName::Dns(dns) => Some(dns.as_str()),
                _ => None,
            })
            .any(|pattern| hostname_matches(pattern, &hostname));
    }

    match cert.subject.common_name() {
        Some(cn) => hostname_matches(cn, &hostname),
        None => false,
    }
}

/// Names presented by the certificate, for diagnostics.
pub(crate) fn presented_names(cert: &Certificate) -> Vec<String> {
    let dns: Vec<String> = cert
        .extensions
        .subject_alt_names
        .iter()
        .filter_map(|name| match name {
            AltName::Dns(dns) => Some(dns.clone()),
            _ => None,
        })
        .collect();
    if !dns.is_empty() {
        return dns;
    }
    cert.subject
        .common_name()
        .map(|cn| vec![cn.to_string()])
        .unwrap_or_default()
}

/// RFC 6125 matching: case-insensitive, wildcard only as the entire
/// leftmost label, never matching across label boundaries or an entire
/// hostname.
fn hostname_matches(pattern: &str, hostname: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();

    if pattern == *hostname {
        return true;
    }

    if let Some(suffix) = pattern.strip_prefix("*.") {
        // The suffix must keep at least one dot, and the wildcard must
        // consume exactly one non-empty label.
        if !suffix.contains('.') {
            return false;
        }
        if let Some(rest) = hostname.strip_suffix(suffix)
            && rest.ends_with('.')
            && rest.len() > 1
            && !rest[..rest.len() - 1].contains('.')
            && !rest[..rest.len() - 1].is_empty()
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::AltName;
    use crate::testutil::leaf_cert;

    #[test]
    fn test_exact_match_case_insensitive() {
        assert!(hostname_matches("Example.COM", "example.com"));
        assert!(!hostname_matches("example.org", "example.com"));
    }

    #[test]
    fn test_wildcard_single_label() {
        assert!(hostname_matches("*.example.com", "www.example.com"));
        assert!(!hostname_matches("*.example.com", "example.com"));
        assert!(!hostname_matches("*.example.com", "a.b.example.com"));
        assert!(!hostname_matches("*.com", "example.com"));
    }

    #[test]
    fn test_san_is_authoritative_over_cn() {
        // CN says example.com, SAN says only example.org
        let mut cert = leaf_cert();
        cert.extensions.subject_alt_names = vec![AltName::Dns("example.org".into())];
        assert!(!verify_hostname(&cert, "example.com"));
        assert!(verify_hostname(&cert, "example.org"));
    }

    #[test]
    fn test_cn_fallback_without_san() {
        let cert = leaf_cert();
        assert!(cert.extensions.subject_alt_names.is_empty());
        assert!(verify_hostname(&cert, "example.com"));
        assert!(!verify_hostname(&cert, "other.com"));
    }

    #[test]
    fn test_non_dns_san_entries_do_not_match() {
        let mut cert = leaf_cert();
        cert.extensions.subject_alt_names = vec![AltName::Ip(vec![127, 0, 0, 1])];
        // SAN is present but has no DNS entries; CN fallback does not apply
        assert!(!verify_hostname(&cert, "example.com"));
    }

    #[test]
    fn test_presented_names() {
        let mut cert = leaf_cert();
        assert_eq!(presented_names(&cert), vec!["example.com"]);
        cert.extensions.subject_alt_names = vec![
            AltName::Dns("a.example.com".into()),
            AltName::Dns("b.example.com".into()),
        ];
        assert_eq!(presented_names(&cert), vec!["a.example.com", "b.example.com"]);
    }
}
