//! Vagrantfile generation.
//!
//! The sandbox is first turned into a small Ruby syntax tree, which is then
//! rendered to text.

pub mod builder;
pub mod render;
pub mod types;

pub use builder::{ProvisionerOptions, ANSIBLE_GROUPS_VARIABLE, BUILTIN_GROUPS};
pub use render::ruby_string;
pub use types::{Argument, Block, Element, Literal, RubyArray, RubyHash, Vagrantfile};
