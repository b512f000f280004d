//! Topology definition module.
//!
//! This module contains the typed topology model, schema-level parsing,
//! cross-field validation and the name index used by the expansion engine.

pub mod types;
pub mod schema;
pub mod index;
pub mod validation;
pub mod image_naming;

// Re-export key types and functions for easier access
pub use types::{
    BaseBox, ExtraValues, Group, Host, Network, NetworkMapping, Protocol, Router, RouterMapping, TopologyDefinition,
    Wan,
};
pub use schema::{NodeName, SchemaError};
pub use index::TopologyIndex;
pub use validation::{validate, ValidationError};
pub use image_naming::{image_name_replace, image_name_strip};

/// Failure to build a valid [`TopologyDefinition`]
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
