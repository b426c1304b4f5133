//! Project type detection.
//!
//! Classifies a working directory by the presence of characteristic marker
//! files. Rules are evaluated in order and the first match wins; the label
//! carries the commit scope and description used by the push workflow.

use std::fs;
use std::path::Path;

/// Fixed set of project classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Web,
    Python,
    Rust,
    Java,
    Content,
    Generic,
}

impl ProjectKind {
    pub fn label(self) -> &'static str {
        match self {
            ProjectKind::Web => "web",
            ProjectKind::Python => "python",
            ProjectKind::Rust => "rust",
            ProjectKind::Java => "java",
            ProjectKind::Content => "content",
            ProjectKind::Generic => "generic",
        }
    }
}

/// Detection result plus the commit metadata derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectProfile {
    pub kind: ProjectKind,
    pub name: String,
    pub scope: String,
    pub description: String,
}

/// Classify `dir` into a [`ProjectProfile`].
///
/// A `package.json` that cannot be read or parsed does not classify the
/// directory as a web project; evaluation continues with the next rule.
pub fn detect_project(dir: &Path) -> ProjectProfile {
    if let Some(name) = package_json_name(dir) {
        return profile(ProjectKind::Web, name, "web", "update web project files");
    }

    if dir.join("requirements.txt").exists() || dir.join("pyproject.toml").exists() {
        return profile(
            ProjectKind::Python,
            basename(dir),
            "python",
            "update Python project files",
        );
    }

    if dir.join("Cargo.toml").exists() {
        return profile(
            ProjectKind::Rust,
            basename(dir),
            "rust",
            "update Rust project files",
        );
    }

    if ["pom.xml", "build.gradle", "build.gradle.kts"]
        .iter()
        .any(|f| dir.join(f).exists())
    {
        return profile(
            ProjectKind::Java,
            basename(dir),
            "java",
            "update Java project files",
        );
    }

    if dir.join("content").exists()
        || dir.join("docs").exists()
        || dir.join("data").join("insights").exists()
    {
        return profile(
            ProjectKind::Content,
            basename(dir),
            "content",
            "update content and documentation",
        );
    }

    profile(
        ProjectKind::Generic,
        basename(dir),
        "update",
        "update project files",
    )
}

fn profile(kind: ProjectKind, name: String, scope: &str, description: &str) -> ProjectProfile {
    ProjectProfile {
        kind,
        name,
        scope: scope.to_string(),
        description: description.to_string(),
    }
}

fn basename(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Read the project name out of `package.json`, if one is present and parses.
fn package_json_name(dir: &Path) -> Option<String> {
    let text = fs::read_to_string(dir.join("package.json")).ok()?;
    let pkg: serde_json::Value = serde_json::from_str(&text).ok()?;
    Some(
        pkg.get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("project")
            .to_string(),
    )
}
