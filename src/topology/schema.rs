//! Schema-level parsing of topology documents.
//!
//! Covers everything that happens before the cross-field validation:
//! renaming of deprecated attributes on the raw document, the node name
//! pattern, and strict CIDR parsing.

use super::types::TopologyDefinition;
use ipnet::IpNet;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::sync::OnceLock;

/// Pattern every host, router, network, group and topology name must match
pub const VALID_NAMES_REGEX: &str = r"^[a-z]([a-z0-9A-Z-])*$";

/// Deprecated base box attributes and their current names
pub const DEPRECATED_BASE_BOX_ATTRIBUTES: &[(&str, &str)] = &[
    ("man_user", "mgmt_user"),
    ("mng_protocol", "mgmt_protocol"),
];

/// Errors raised while turning a document into a [`TopologyDefinition`]
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Deprecated attribute \"{old}\" is mutually exclusive with the new attribute \"{new}\".")]
    DeprecatedConflict { old: String, new: String },
    #[error("Invalid name \"{name}\". It does not match regex \"^[a-z]([a-z0-9A-Z-])*$\".")]
    InvalidName { name: String },
    #[error("Invalid value for Protocol: {0}")]
    InvalidProtocol(String),
    #[error("Invalid CIDR \"{cidr}\": {reason}")]
    InvalidCidr { cidr: String, reason: String },
    #[error("Invalid topology definition: {0}")]
    Document(#[from] serde_yaml::Error),
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(VALID_NAMES_REGEX).expect("Invalid name regex"))
}

/// Check a name against [`VALID_NAMES_REGEX`]
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// A name that matches [`VALID_NAMES_REGEX`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeName(String);

impl NodeName {
    /// Build a name from a literal known to match the pattern
    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = SchemaError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        if is_valid_name(&name) {
            Ok(Self(name))
        } else {
            Err(SchemaError::InvalidName { name })
        }
    }
}

impl TryFrom<&str> for NodeName {
    type Error = SchemaError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::try_from(name.to_string())
    }
}

impl From<NodeName> for String {
    fn from(name: NodeName) -> Self {
        name.0
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a CIDR, rejecting networks with host bits set (e.g. `10.0.0.1/24`)
pub fn parse_cidr(cidr: &str) -> Result<IpNet, SchemaError> {
    let network: IpNet = cidr.trim().parse().map_err(|e: ipnet::AddrParseError| {
        SchemaError::InvalidCidr {
            cidr: cidr.to_string(),
            reason: e.to_string(),
        }
    })?;
    if network.trunc() != network {
        return Err(SchemaError::InvalidCidr {
            cidr: cidr.to_string(),
            reason: "host bits set".to_string(),
        });
    }
    Ok(network)
}

pub(crate) fn deserialize_cidr<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IpNet, D::Error> {
    let cidr = String::deserialize(deserializer)?;
    parse_cidr(&cidr).map_err(serde::de::Error::custom)
}

/// Rename `old` to `new` in a mapping, keeping the key order
///
/// Fails when both attributes are present.
pub fn rename_deprecated_attribute(mapping: &mut Mapping, old: &str, new: &str) -> Result<(), SchemaError> {
    if !mapping.contains_key(old) {
        return Ok(());
    }
    if mapping.contains_key(new) {
        return Err(SchemaError::DeprecatedConflict {
            old: old.to_string(),
            new: new.to_string(),
        });
    }

    *mapping = std::mem::take(mapping)
        .into_iter()
        .map(|(key, value)| {
            if key.as_str() == Some(old) {
                (Value::String(new.to_string()), value)
            } else {
                (key, value)
            }
        })
        .collect();
    log::debug!("Renamed deprecated attribute '{}' to '{}'", old, new);
    Ok(())
}

/// Rename deprecated attributes in every base box of the raw document
///
/// Parts of the document that do not have the expected shape are left
/// untouched; the typed parse reports them.
pub fn rename_deprecated_attributes(document: &mut Value) -> Result<(), SchemaError> {
    let Some(root) = document.as_mapping_mut() else {
        return Ok(());
    };

    for section in ["hosts", "routers"] {
        let Some(Value::Sequence(nodes)) = root.get_mut(section) else {
            continue;
        };
        for node in nodes.iter_mut() {
            if let Some(Value::Mapping(base_box)) = node.get_mut("base_box") {
                for (old, new) in DEPRECATED_BASE_BOX_ATTRIBUTES {
                    rename_deprecated_attribute(base_box, old, new)?;
                }
            }
        }
    }

    Ok(())
}

/// Turn a raw document into a typed topology without cross-field validation
pub fn parse_document(mut document: Value) -> Result<TopologyDefinition, SchemaError> {
    rename_deprecated_attributes(&mut document)?;
    let topology: TopologyDefinition = serde_yaml::from_value(document)?;
    Ok(topology)
}
