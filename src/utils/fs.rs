//! File writing helpers for the generated sandbox.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize `value` as a YAML document with explicit start and end markers
pub fn to_yaml_document<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let body = serde_yaml::to_string(value).wrap_err("Failed to serialize YAML document")?;
    let body = body.strip_prefix("---\n").unwrap_or(&body);
    Ok(format!("---\n{}...\n", body))
}

/// Write `content` to `path`, creating missing parent directories
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(path, content).wrap_err_with(|| format!("Could not create file '{}'", path.display()))
}

/// Write `value` to `path` as a YAML document
pub fn write_yaml<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_file(path, &to_yaml_document(value)?)
}

/// Copy a file, creating missing parent directories of the destination
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::copy(source, destination)
        .map(|_| ())
        .wrap_err_with(|| format!("Could not copy file '{}'", source.display()))
}

/// Copy a directory tree
pub fn copy_dir(source: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)
        .wrap_err_with(|| format!("Failed to create directory '{}'", destination.display()))?;

    let entries = fs::read_dir(source).wrap_err_with(|| format!("Could not copy directory '{}'", source.display()))?;
    for entry in entries {
        let entry = entry.wrap_err_with(|| format!("Could not read directory '{}'", source.display()))?;
        let target = destination.join(entry.file_name());
        let file_type = entry
            .file_type()
            .wrap_err_with(|| format!("Could not inspect '{}'", entry.path().display()))?;

        if file_type.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            copy_file(&entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove a directory tree if it exists
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path).wrap_err_with(|| format!("Could not remove directory '{}'", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_document_markers() {
        let mut value = BTreeMap::new();
        value.insert("ansible_port", 5986);
        assert_eq!(to_yaml_document(&value).unwrap(), "---\nansible_port: 5986\n...\n");
    }

    #[test]
    fn test_copy_and_remove_dir() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        write_file(&source.join("roles/common/main.yml"), "---\n").unwrap();
        write_file(&source.join("playbook.yml"), "---\n").unwrap();

        let destination = temp.path().join("copy");
        copy_dir(&source, &destination).unwrap();
        assert!(destination.join("roles/common/main.yml").is_file());
        assert!(destination.join("playbook.yml").is_file());

        remove_dir_if_exists(&destination).unwrap();
        assert!(!destination.exists());
        remove_dir_if_exists(&destination).unwrap();
    }
}
