//! Structured file read/write helpers.
//!
//! - JSON: `.mbox/config.json`, `.mbox/dependencies.lock`
//! - YAML: `MBox.dependencies.yml`, the registry index
//! - TOML: `.mbox/setting.toml`
//!
//! Parse failures are reported as [`MboxError::ConfigParseError`] naming the
//! file. Writes go through [`super::atomic::safe_write`].

use crate::core::MboxError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads a text file with the path in the error context.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Writes a text file atomically.
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    super::atomic::safe_write(path, content).map_err(|e| {
        e.context(MboxError::SaveFailed {
            path: path.display().to_string(),
        })
    })
}

fn parse_error(path: &Path, reason: impl ToString) -> anyhow::Error {
    MboxError::ConfigParseError {
        file: path.display().to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Reads and parses a JSON file.
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_json::from_str(&content).map_err(|e| parse_error(path, e))
}

/// Writes data as JSON to a file atomically, with a trailing newline.
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<()>
where
    T: serde::Serialize,
{
    let mut json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    json.push('\n');

    write_text_file(path, &json)
}

/// Reads and parses a TOML file.
pub fn read_toml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    toml::from_str(&content).map_err(|e| parse_error(path, e))
}

/// Reads and parses a YAML file.
pub fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_yaml::from_str(&content).map_err(|e| parse_error(path, e))
}

/// Writes data as YAML to a file atomically.
pub fn write_yaml_file<T>(path: &Path, data: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let yaml = serde_yaml::to_string(data)
        .with_context(|| format!("Failed to serialize data to YAML for: {}", path.display()))?;

    write_text_file(path, &yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        active: Vec<String>,
    }

    fn sample() -> Sample {
        Sample {
            name: "cocoapods".to_string(),
            active: vec!["Bar".to_string()],
        }
    }

    #[test]
    fn test_json_pretty_output() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.json");

        write_json_file(&path, &sample(), true).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"name\": \"cocoapods\""));
        assert!(content.ends_with('\n'));

        let loaded: Sample = read_json_file(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_yaml_write_read() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.yml");

        write_yaml_file(&path, &vec![sample()]).unwrap();
        let loaded: Vec<Sample> = read_yaml_file(&path).unwrap();
        assert_eq!(loaded, vec![sample()]);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("setting.toml");
        fs::write(&path, "[dependency_manager\n").unwrap();

        let err = read_toml_file::<toml::Table>(&path).unwrap_err();
        let mbox = err.downcast_ref::<MboxError>().unwrap();
        assert!(matches!(mbox, MboxError::ConfigParseError { file, .. } if file.ends_with("setting.toml")));
    }

    #[test]
    fn test_read_missing_file_fails_with_path() {
        let temp = tempdir().unwrap();
        let err = read_text_file(&temp.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
