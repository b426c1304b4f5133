//! Push workflow configuration.
//!
//! An optional `.git-config.json` in the working directory overrides the
//! built-in defaults. Missing keys keep their defaults and unknown keys are
//! ignored; a file that cannot be read or parsed degrades to the defaults
//! with a warning instead of aborting.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Name of the optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = ".git-config.json";

/// Settings consumed by the push workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub commit_prefix: String,
    pub commit_scope: String,
    pub commit_description: String,
    pub default_branch: String,
    pub remote_name: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            commit_prefix: "feat".to_string(),
            commit_scope: "update".to_string(),
            commit_description: "update project files".to_string(),
            default_branch: "main".to_string(),
            remote_name: "origin".to_string(),
        }
    }
}

/// Load configuration from `dir`, falling back to the defaults.
///
/// A missing file is silent; an unreadable or malformed file prints a
/// warning and still returns the defaults.
pub fn load_config(dir: &Path) -> PushConfig {
    let path = dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                eprintln!(
                    "{} could not read {}: {}",
                    "warning:".yellow(),
                    path.display(),
                    e
                );
            }
            return PushConfig::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(config) => {
            println!("loaded configuration from {CONFIG_FILE}");
            config
        }
        Err(e) => {
            eprintln!(
                "{} could not parse {}: {}",
                "warning:".yellow(),
                path.display(),
                e
            );
            eprintln!("using default configuration");
            PushConfig::default()
        }
    }
}

/// Write a sample `.git-config.json` into `dir`.
///
/// Refuses to overwrite an existing file.
///
/// # Errors
/// Returns an error if serializing or writing the file fails.
pub fn write_sample_config(dir: &Path) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        println!("{} {} already exists", "warning:".yellow(), CONFIG_FILE);
        return Ok(());
    }

    let sample = PushConfig {
        commit_scope: "content".to_string(),
        commit_description: "update project content".to_string(),
        ..PushConfig::default()
    };
    let body =
        serde_json::to_string_pretty(&sample).context("failed to serialize sample config")?;
    fs::write(&path, body + "\n").with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{} created sample configuration file: {}",
        "✔".green(),
        CONFIG_FILE
    );
    println!("edit this file to customize commit messages for your project");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_file_is_missing() {
        let td = tempdir().unwrap();
        assert_eq!(load_config(td.path()), PushConfig::default());
    }

    #[test]
    fn overlay_keeps_defaults_for_missing_keys() {
        let td = tempdir().unwrap();
        fs::write(
            td.path().join(CONFIG_FILE),
            r#"{"commit_prefix": "fix", "remote_name": "upstream"}"#,
        )
        .unwrap();

        let config = load_config(td.path());
        assert_eq!(config.commit_prefix, "fix");
        assert_eq!(config.remote_name, "upstream");
        assert_eq!(config.commit_scope, "update");
        assert_eq!(config.default_branch, "main");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let td = tempdir().unwrap();
        fs::write(
            td.path().join(CONFIG_FILE),
            r#"{"default_branch": "develop", "color": "mauve"}"#,
        )
        .unwrap();

        let config = load_config(td.path());
        assert_eq!(config.default_branch, "develop");
    }

    #[test]
    fn malformed_json_degrades_to_defaults() {
        let td = tempdir().unwrap();
        fs::write(td.path().join(CONFIG_FILE), "{not json").unwrap();
        assert_eq!(load_config(td.path()), PushConfig::default());
    }

    #[test]
    fn sample_config_is_written_once() {
        let td = tempdir().unwrap();
        write_sample_config(td.path()).unwrap();

        let written = load_config(td.path());
        assert_eq!(written.commit_scope, "content");
        assert_eq!(written.commit_description, "update project content");
        assert_eq!(written.commit_prefix, "feat");

        fs::write(td.path().join(CONFIG_FILE), r#"{"commit_prefix": "docs"}"#).unwrap();
        write_sample_config(td.path()).unwrap();
        assert_eq!(load_config(td.path()).commit_prefix, "docs");
    }
}
