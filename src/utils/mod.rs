//! Shared utilities: YAML value coercion and file helpers.

pub mod fs;
pub mod values;

pub use fs::{copy_dir, copy_file, remove_dir_if_exists, to_yaml_document, write_file, write_yaml};
pub use values::{coerce_flag, coerce_integer, display_value};
