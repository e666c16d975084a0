// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{
    ANY_EKU, AltName, BasicConstraints, CertExtensions, Certificate, DecodeError,
    DistinguishedName, NameAttribute, NameValue, PolicyInfo, PolicyMapping, Result,
};
use crate::pem;
use crate::verify::PublicKeyInfo;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5280::{
    ID_KP_CLIENT_AUTH, ID_KP_CODE_SIGNING, ID_KP_EMAIL_PROTECTION, ID_KP_OCSP_SIGNING,
    ID_KP_SERVER_AUTH, ID_KP_TIME_STAMPING,
};
use der::Decode;
use std::collections::HashSet;
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};
use x509_parser::der_parser::asn1_rs::Tag;
use x509_parser::prelude::*;

const OID_TEXT_OCSP: &str = "1.3.6.1.5.5.7.48.1";

// Critical extensions the engine understands; anything else marked
// critical is recorded and rejected at chain-validation time.
const RECOGNIZED_CRITICAL: &[&str] = &[
    "2.5.29.19", // basicConstraints
    "2.5.29.15", // keyUsage
    "2.5.29.37", // extendedKeyUsage
    "2.5.29.17", // subjectAltName
    "2.5.29.32", // certificatePolicies
    "2.5.29.30", // nameConstraints
];

/// Decodes a certificate from DER bytes.
pub fn decode_cert_der(der: &[u8]) -> Result<Certificate> {
    let (rem, x509) =
        x509_parser::parse_x509_certificate(der).map_err(|e| DecodeError::X509Parse {
            details: e.to_string(),
        })?;
    if !rem.is_empty() {
        return Err(DecodeError::TrailingDerData);
    }
    map_certificate(&x509, der)
}

/// Decodes a certificate from a single strict PEM `CERTIFICATE` block.
pub fn decode_cert_pem(pem_data: &[u8]) -> Result<Certificate> {
    let (label, der) = pem::decode(pem_data).map_err(|e| DecodeError::Pem {
        details: e.to_string(),
    })?;
    if label != pem::LABEL_CERTIFICATE {
        return Err(DecodeError::InvalidPemLabel {
            expected: pem::LABEL_CERTIFICATE,
        });
    }
    decode_cert_der(&der)
}

/// Decodes every `CERTIFICATE` block in a PEM bundle, in order.
///
/// Blocks with other labels are skipped; an input without a single
/// certificate block is an error.
pub fn decode_cert_pem_chain(pem_data: &[u8]) -> Result<Vec<Certificate>> {
    let blocks = pem::decode_all(pem_data).map_err(|e| DecodeError::Pem {
        details: e.to_string(),
    })?;
    let mut certs = Vec::new();
    for (label, der) in blocks {
        if label == pem::LABEL_CERTIFICATE {
            certs.push(decode_cert_der(&der)?);
        }
    }
    if certs.is_empty() {
        return Err(DecodeError::InvalidPemLabel {
            expected: pem::LABEL_CERTIFICATE,
        });
    }
    Ok(certs)
}

/// Maps a parsed certificate view into the owned record, enforcing the
/// record invariants.
fn map_certificate(x509: &X509Certificate<'_>, raw: &[u8]) -> Result<Certificate> {
    let tbs = &x509.tbs_certificate;

    let serial = tbs.raw_serial().to_vec();
    validate_serial_encoding(&serial)?;

    let not_before = tbs.validity.not_before.timestamp();
    let not_after = tbs.validity.not_after.timestamp();
    if not_before > not_after {
        return Err(DecodeError::InvalidValidityWindow);
    }

    // Signature algorithm must agree between certificate and TBSCertificate.
    let outer_alg = x509.signature_algorithm.algorithm.to_id_string();
    if outer_alg != tbs.signature.algorithm.to_id_string() {
        return Err(DecodeError::SignatureAlgorithmMismatch);
    }
    let signature_algorithm = ObjectIdentifier::new(outer_alg.as_str())?;

    if x509.signature_value.unused_bits != 0 {
        return Err(DecodeError::NonCanonicalBitString {
            details: "signatureValue must have zero unused bits",
        });
    }

    let spki = &tbs.subject_pki;
    if spki.subject_public_key.unused_bits != 0 {
        return Err(DecodeError::NonCanonicalBitString {
            details: "subjectPublicKey must have zero unused bits",
        });
    }
    let public_key = PublicKeyInfo {
        algorithm: ObjectIdentifier::new(spki.algorithm.algorithm.to_id_string().as_str())?,
        subject_public_key: spki.subject_public_key.data.as_ref().to_vec(),
        spki_der: spki.raw.to_vec(),
    };

    let subject = parse_name(tbs.subject())?;
    let issuer = parse_name(tbs.issuer())?;
    let extensions = parse_extensions(x509)?;

    if let Some(bc) = &extensions.basic_constraints
        && bc.is_ca
        && subject.is_empty()
    {
        return Err(DecodeError::EmptySubjectDn);
    }

    Ok(Certificate {
        raw: raw.to_vec(),
        serial,
        subject_der: tbs.subject().as_raw().to_vec(),
        issuer_der: tbs.issuer().as_raw().to_vec(),
        subject,
        issuer,
        not_before,
        not_after,
        public_key,
        signature_algorithm,
        signature: x509.signature_value.data.as_ref().to_vec(),
        tbs_der: tbs.as_ref().to_vec(),
        extensions,
    })
}

/// Parses an X.509 name into the owned attribute form.
pub(crate) fn parse_name(name: &X509Name<'_>) -> Result<DistinguishedName> {
    let mut attrs = Vec::new();
    for attr in name.iter_attributes() {
        let oid = ObjectIdentifier::new(attr.attr_type().to_id_string().as_str())?;
        let any = attr.attr_value();
        let value = match attr.as_str() {
            Ok(s) => {
                let tag = any.tag();
                if tag == Tag::PrintableString {
                    NameValue::Printable(s.to_string())
                } else if tag == Tag::Ia5String {
                    NameValue::Ia5(s.to_string())
                } else {
                    NameValue::Utf8(s.to_string())
                }
            }
            Err(_) => NameValue::Bytes(any.data.to_vec()),
        };
        attrs.push(NameAttribute { oid, value });
    }
    Ok(DistinguishedName { attrs })
}

fn parse_extensions(x509: &X509Certificate<'_>) -> Result<CertExtensions> {
    let mut out = CertExtensions::default();
    let mut seen = HashSet::new();

    for ext in x509.tbs_certificate.extensions() {
        let oid_str = ext.oid.to_id_string();
        if !seen.insert(oid_str.clone()) {
            return Err(DecodeError::DuplicateExtension { oid: oid_str });
        }

        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => {
                if bc.path_len_constraint.is_some() && !bc.ca {
                    return Err(DecodeError::PathLenRequiresCa);
                }
                out.basic_constraints = Some(BasicConstraints {
                    is_ca: bc.ca,
                    path_len: bc.path_len_constraint,
                });
            }
            ParsedExtension::KeyUsage(ku) => {
                out.key_usage = Some(parse_key_usage_flags(ku.flags)?);
            }
            ParsedExtension::ExtendedKeyUsage(eku) => {
                out.extended_key_usage = map_extended_key_usage(eku)?;
            }
            ParsedExtension::SubjectAlternativeName(san) => {
                for general_name in &san.general_names {
                    match general_name {
                        GeneralName::DNSName(name) => {
                            out.subject_alt_names.push(AltName::Dns(name.to_string()));
                        }
                        GeneralName::IPAddress(addr) => {
                            out.subject_alt_names.push(AltName::Ip(addr.to_vec()));
                        }
                        GeneralName::RFC822Name(addr) => {
                            out.subject_alt_names.push(AltName::Email(addr.to_string()));
                        }
                        GeneralName::URI(uri) => {
                            out.subject_alt_names.push(AltName::Uri(uri.to_string()));
                        }
                        _ => {}
                    }
                }
            }
            ParsedExtension::CRLDistributionPoints(cdp) => {
                for point in cdp.points.iter() {
                    if let Some(DistributionPointName::FullName(names)) = &point.distribution_point
                    {
                        for name in names {
                            if let GeneralName::URI(uri) = name {
                                out.crl_distribution_points.push(uri.to_string());
                            }
                        }
                    }
                }
            }
            ParsedExtension::AuthorityInfoAccess(aia) => {
                for desc in &aia.accessdescs {
                    if desc.access_method.to_id_string() == OID_TEXT_OCSP
                        && let GeneralName::URI(uri) = &desc.access_location
                    {
                        out.ocsp_urls.push(uri.to_string());
                    }
                }
            }
            _ => match oid_str.as_str() {
                "2.5.29.32" => out.policies = parse_certificate_policies(ext.value)?,
                "2.5.29.33" => out.policy_mappings = parse_policy_mappings(ext.value)?,
                "2.5.29.30" => out.has_name_constraints = true,
                _ => {}
            },
        }

        if ext.critical && !RECOGNIZED_CRITICAL.contains(&oid_str.as_str()) {
            out.unknown_critical
                .push(ObjectIdentifier::new(oid_str.as_str())?);
        }
    }

    Ok(out)
}

/// Rebuilds the keyUsage bit set from the raw flag word.
fn parse_key_usage_flags(flags: u16) -> Result<KeyUsage> {
    const ALL_KNOWN_BITS: u16 = (1 << 9) - 1;
    if flags & !ALL_KNOWN_BITS != 0 {
        return Err(DecodeError::ExtensionParse {
            extension: "keyUsage",
            details: "unknown bits set".to_string(),
        });
    }
    let mut parsed = der::flagset::FlagSet::<KeyUsages>::default();
    if flags & (1 << 0) != 0 {
        parsed |= KeyUsages::DigitalSignature;
    }
    if flags & (1 << 1) != 0 {
        parsed |= KeyUsages::NonRepudiation;
    }
    if flags & (1 << 2) != 0 {
        parsed |= KeyUsages::KeyEncipherment;
    }
    if flags & (1 << 3) != 0 {
        parsed |= KeyUsages::DataEncipherment;
    }
    if flags & (1 << 4) != 0 {
        parsed |= KeyUsages::KeyAgreement;
    }
    if flags & (1 << 5) != 0 {
        parsed |= KeyUsages::KeyCertSign;
    }
    if flags & (1 << 6) != 0 {
        parsed |= KeyUsages::CRLSign;
    }
    if flags & (1 << 7) != 0 {
        parsed |= KeyUsages::EncipherOnly;
    }
    if flags & (1 << 8) != 0 {
        parsed |= KeyUsages::DecipherOnly;
    }
    Ok(KeyUsage(parsed))
}

fn map_extended_key_usage(eku: &ExtendedKeyUsage<'_>) -> Result<Vec<ObjectIdentifier>> {
    let mut oids = Vec::new();
    if eku.any {
        oids.push(ANY_EKU);
    }
    if eku.server_auth {
        oids.push(ID_KP_SERVER_AUTH);
    }
    if eku.client_auth {
        oids.push(ID_KP_CLIENT_AUTH);
    }
    if eku.code_signing {
        oids.push(ID_KP_CODE_SIGNING);
    }
    if eku.email_protection {
        oids.push(ID_KP_EMAIL_PROTECTION);
    }
    if eku.time_stamping {
        oids.push(ID_KP_TIME_STAMPING);
    }
    if eku.ocsp_signing {
        oids.push(ID_KP_OCSP_SIGNING);
    }
    for other in &eku.other {
        oids.push(ObjectIdentifier::new(other.to_id_string().as_str())?);
    }
    Ok(oids)
}

/// certificatePolicies payload, decoded with the issuance-side stack.
fn parse_certificate_policies(value: &[u8]) -> Result<Vec<PolicyInfo>> {
    let decoded = x509_cert::ext::pkix::CertificatePolicies::from_der(value).map_err(|e| {
        DecodeError::ExtensionParse {
            extension: "certificatePolicies",
            details: e.to_string(),
        }
    })?;
    Ok(decoded
        .0
        .into_iter()
        .map(|info| PolicyInfo {
            oid: info.policy_identifier,
            qualifiers: info
                .policy_qualifiers
                .unwrap_or_default()
                .into_iter()
                .map(|q| q.policy_qualifier_id.to_string())
                .collect(),
        })
        .collect())
}

#[derive(der::Sequence)]
struct PolicyMappingDer {
    issuer_domain_policy: ObjectIdentifier,
    subject_domain_policy: ObjectIdentifier,
}

fn parse_policy_mappings(value: &[u8]) -> Result<Vec<PolicyMapping>> {
    let decoded: Vec<PolicyMappingDer> =
        <Vec<PolicyMappingDer> as der::Decode>::from_der(value).map_err(|e| DecodeError::ExtensionParse {
            extension: "policyMappings",
            details: e.to_string(),
        })?;
    Ok(decoded
        .into_iter()
        .map(|m| PolicyMapping {
            issuer_domain: m.issuer_domain_policy,
            subject_domain: m.subject_domain_policy,
        })
        .collect())
}

/// Validates DER INTEGER canonicality constraints for serial numbers.
fn validate_serial_encoding(serial: &[u8]) -> Result<()> {
    if serial.is_empty() {
        return Err(DecodeError::InvalidSerial {
            details: "must not be empty",
        });
    }
    if serial[0] & 0x80 != 0 {
        return Err(DecodeError::InvalidSerial {
            details: "must be positive",
        });
    }
    if serial.len() > 1 && serial[0] == 0x00 && serial[1] & 0x80 == 0 {
        return Err(DecodeError::InvalidSerial {
            details: "non-canonical DER INTEGER encoding",
        });
    }
    Ok(())
}
