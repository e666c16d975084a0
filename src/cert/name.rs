// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{DecodeError, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, SetOfVec};
use der::{Encode, Tag};
use std::fmt;
use std::hash::{Hash, Hasher};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

/// OID for CommonName (2.5.4.3).
pub(crate) const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");

/// A DN attribute value encoding.
#[derive(Clone, Debug)]
pub enum NameValue {
    /// UTF8String value.
    Utf8(String),
    /// PrintableString value (restricted ASCII subset from RFC 5280).
    Printable(String),
    /// IA5String value (7-bit ASCII).
    Ia5(String),
    /// Raw bytes for non-text or undecodable values.
    Bytes(Vec<u8>),
}

impl NameValue {
    fn as_any(&self) -> Result<Any> {
        match self {
            NameValue::Utf8(value) => Ok(Any::new(Tag::Utf8String, value.as_bytes().to_vec())?),
            NameValue::Printable(value) => {
                Ok(Any::new(Tag::PrintableString, value.as_bytes().to_vec())?)
            }
            NameValue::Ia5(value) => Ok(Any::new(Tag::Ia5String, value.as_bytes().to_vec())?),
            NameValue::Bytes(value) => Ok(Any::new(Tag::OctetString, value.clone())?),
        }
    }

    /// RFC 4518-style normalized form used for DN comparison: textual
    /// values compare case-insensitively with outer whitespace trimmed,
    /// raw values compare byte-exact.
    fn normalized(&self) -> NormalizedValue<'_> {
        match self {
            NameValue::Utf8(s) | NameValue::Printable(s) | NameValue::Ia5(s) => {
                NormalizedValue::Text(s.trim().to_lowercase())
            }
            NameValue::Bytes(b) => NormalizedValue::Bytes(b),
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
enum NormalizedValue<'a> {
    Text(String),
    Bytes(&'a [u8]),
}

impl PartialEq for NameValue {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for NameValue {}

impl Hash for NameValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for NameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameValue::Utf8(s) | NameValue::Printable(s) | NameValue::Ia5(s) => f.write_str(s),
            NameValue::Bytes(_) => f.write_str("<binary>"),
        }
    }
}

/// A single DN attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NameAttribute {
    /// Attribute OID (for example `2.5.4.3` for CN).
    pub oid: ObjectIdentifier,
    /// Encoded attribute value.
    pub value: NameValue,
}

/// Distinguished Name represented as ordered attributes.
///
/// Equality and hashing operate on the normalized attribute sequence, so
/// two names that differ only in textual case or surrounding whitespace
/// chain together. Used as the CRL cache key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DistinguishedName {
    /// Ordered list of RDN attributes.
    pub attrs: Vec<NameAttribute>,
}

impl DistinguishedName {
    /// Creates an empty DN.
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Adds a UTF8String CN attribute.
    pub fn cn(mut self, value: impl Into<String>) -> Self {
        self.attrs.push(NameAttribute {
            oid: OID_CN,
            value: NameValue::Utf8(value.into()),
        });
        self
    }

    /// Adds an arbitrary attribute.
    pub fn push(mut self, oid: ObjectIdentifier, value: NameValue) -> Self {
        self.attrs.push(NameAttribute { oid, value });
        self
    }

    /// True when the DN carries no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Returns the first CommonName attribute value, if any.
    pub fn common_name(&self) -> Option<&str> {
        self.attrs.iter().find(|a| a.oid == OID_CN).and_then(|a| {
            match &a.value {
                NameValue::Utf8(s) | NameValue::Printable(s) | NameValue::Ia5(s) => Some(s.as_str()),
                NameValue::Bytes(_) => None,
            }
        })
    }

    pub(crate) fn to_x509_name(&self) -> Result<Name> {
        let mut rdns = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            let mut set = SetOfVec::new();
            set.insert(AttributeTypeAndValue {
                oid: attr.oid,
                value: attr.value.as_any()?,
            })
            .map_err(DecodeError::Der)?;
            rdns.push(RelativeDistinguishedName::from(set));
        }
        Ok(RdnSequence(rdns))
    }

    /// Encodes the DN as a DER `Name`, the form hashed for OCSP CertIDs.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_x509_name()?.to_der()?)
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attrs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", oid_short_name(&attr.oid), attr.value)?;
        }
        Ok(())
    }
}

fn oid_short_name(oid: &ObjectIdentifier) -> String {
    match oid.to_string().as_str() {
        "2.5.4.3" => "CN".into(),
        "2.5.4.6" => "C".into(),
        "2.5.4.7" => "L".into(),
        "2.5.4.8" => "ST".into(),
        "2.5.4.10" => "O".into(),
        "2.5.4.11" => "OU".into(),
        other => other.to_string(),
    }
}
