//! Shape of a `settings.toml` file.
//!
//! These structs mirror the file one-to-one and hold raw strings; turning them into
//! validated settings is the evaluator's job.

use crate::repository::RepositoriesMode;
use serde::{Deserialize, Serialize};

/// Everything a settings file can declare.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsDeclaration {
    /// Root project name; defaults to the settings directory name.
    pub root_name: Option<String>,
    pub feature_previews: Vec<String>,
    pub plugin_management: PluginManagementDeclaration,
    pub dependency_resolution: DependencyResolutionDeclaration,
    /// Builds contributing dependency substitutions.
    pub include_builds: Vec<IncludedBuildDeclaration>,
    pub modules: Vec<ModuleDeclaration>,
}

/// `[plugin_management]` table.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginManagementDeclaration {
    pub repositories: Vec<RepositoryDeclaration>,
    /// Builds contributing plugins and build logic.
    pub include_builds: Vec<IncludedBuildDeclaration>,
}

/// `[dependency_resolution]` table.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DependencyResolutionDeclaration {
    pub repositories_mode: RepositoriesMode,
    pub repositories: Vec<RepositoryDeclaration>,
    pub version_catalogs: Vec<VersionCatalogDeclaration>,
}

/// A repository item: `"mavenCentral"`, `"https://jitpack.io"` or `{ name, url }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RepositoryDeclaration {
    Token(String),
    Url {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        url: String,
    },
}

/// An included build item: `"build-logic"` or `{ path, name }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IncludedBuildDeclaration {
    Path(String),
    Detailed {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl IncludedBuildDeclaration {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) | Self::Detailed { path, .. } => path,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Detailed { name, .. } => name.as_deref(),
        }
    }
}

/// A module item: `"demo"` or `{ name, dir }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ModuleDeclaration {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dir: Option<String>,
    },
}

impl ModuleDeclaration {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }

    #[must_use]
    pub fn dir(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Detailed { dir, .. } => dir.as_deref(),
        }
    }
}

/// `{ name = "libs", path = "gradle/libs.versions.toml" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionCatalogDeclaration {
    pub name: String,
    pub path: String,
}
