//! Rewriting of base box image names.

use super::types::{BaseBox, TopologyDefinition};

fn replace_image_prefix(base_box: &mut BaseBox, prefix: &str, replacement: &str) {
    if let Some(rest) = base_box.image.strip_prefix(prefix) {
        let image = format!("{}{}", replacement, rest);
        log::debug!("Renaming image '{}' to '{}'", base_box.image, image);
        base_box.image = image;
    }
}

/// Replace a leading `prefix` of every host and router image with `replacement`
pub fn image_name_replace(prefix: &str, replacement: &str, mut topology: TopologyDefinition) -> TopologyDefinition {
    for host in &mut topology.hosts {
        replace_image_prefix(&mut host.base_box, prefix, replacement);
    }
    for router in &mut topology.routers {
        replace_image_prefix(&mut router.base_box, prefix, replacement);
    }
    topology
}

/// Remove a leading `prefix` from every host and router image
pub fn image_name_strip(prefix: &str, topology: TopologyDefinition) -> TopologyDefinition {
    image_name_replace(prefix, "", topology)
}
