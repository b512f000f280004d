//! Flavor catalog: named memory/cpu sizes of machines.

use super::error::IntegerParseError;
use crate::utils::values::{coerce_integer, display_value};
use serde_yaml::{Mapping, Value};

/// Catalog shipped with the binary
pub const BUILTIN_FLAVORS: &str = include_str!("../../resources/flavors.yml");

/// Named bundle of machine resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    pub name: String,
    /// Memory in MB
    pub memory: u64,
    pub cpus: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid flavor catalog: {0}")]
    Document(#[from] serde_yaml::Error),
    #[error("Invalid flavor catalog: {0}")]
    Shape(String),
    #[error("Flavor \"{flavor}\" is missing the attribute \"{field}\"")]
    MissingField { flavor: String, field: &'static str },
    #[error(transparent)]
    IntegerParse(#[from] IntegerParseError),
}

/// Ordered catalog of flavors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlavorCatalog {
    flavors: Vec<Flavor>,
}

impl FlavorCatalog {
    /// Load the built-in catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_FLAVORS)
    }

    /// Parse a catalog mapping flavor names to `{memory, cores}`
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let document: Value = serde_yaml::from_str(yaml)?;
        let Value::Mapping(entries) = document else {
            return Err(CatalogError::Shape("expected a mapping of flavor names".to_string()));
        };

        let mut flavors = Vec::with_capacity(entries.len());
        for (name, attributes) in &entries {
            let name = name
                .as_str()
                .ok_or_else(|| CatalogError::Shape(format!("flavor name {} is not a string", display_value(name))))?;
            let attributes = attributes
                .as_mapping()
                .ok_or_else(|| CatalogError::Shape(format!("flavor \"{}\" is not a mapping", name)))?;

            flavors.push(Flavor {
                name: name.to_string(),
                memory: integer_attribute(name, attributes, "memory")?,
                cpus: integer_attribute(name, attributes, "cores")?,
            });
        }

        log::debug!("Loaded {} flavors", flavors.len());
        Ok(Self { flavors })
    }

    /// Find a flavor by name
    pub fn resolve(&self, name: &str) -> Option<&Flavor> {
        self.flavors.iter().find(|flavor| flavor.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flavor> {
        self.flavors.iter()
    }

    pub fn len(&self) -> usize {
        self.flavors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flavors.is_empty()
    }
}

fn integer_attribute(flavor: &str, attributes: &Mapping, field: &'static str) -> Result<u64, CatalogError> {
    let value = attributes.get(field).ok_or_else(|| CatalogError::MissingField {
        flavor: flavor.to_string(),
        field,
    })?;

    coerce_integer(value).ok_or_else(|| {
        CatalogError::IntegerParse(IntegerParseError {
            owner: flavor.to_string(),
            field: field.to_string(),
            value: display_value(value),
        })
    })
}
