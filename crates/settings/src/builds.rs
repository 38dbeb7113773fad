use crate::error::{SettingsError, SettingsErrorExt};
use crate::modules::validate_name;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// File names that mark a directory as a build root, in lookup order.
pub const BUILD_DESCRIPTORS: &[&str] =
    &["settings.toml", "settings.gradle.kts", "settings.gradle", "build.gradle.kts", "build.gradle"];

/// What an included build contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildRole {
    /// Plugins and build logic, declared under plugin management.
    PluginLogic,
    /// Artifacts substituted for external dependencies.
    Library,
}

/// A build whose output is substituted into the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludedBuild {
    name: String,
    location: String,
    dir: PathBuf,
    descriptor: &'static str,
    role: BuildRole,
}

impl IncludedBuild {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location exactly as declared.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Canonical build root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Descriptor file that identified the build root.
    #[must_use]
    pub const fn descriptor(&self) -> &'static str {
        self.descriptor
    }

    #[must_use]
    pub const fn role(&self) -> BuildRole {
        self.role
    }
}

/// Included builds, in declaration order.
///
/// Only direct self-inclusion is rejected here. Transitive cycles need the included
/// builds' own settings evaluated, which the engine does when it loads the graph.
#[derive(Debug)]
pub struct IncludedBuildRegistry {
    root_dir: PathBuf,
    builds: Vec<IncludedBuild>,
}

impl IncludedBuildRegistry {
    /// # Errors
    /// Returns [`SettingsError::Io`] if `root_dir` cannot be resolved.
    pub fn new(root_dir: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let root = root_dir.as_ref();
        let root_dir = fs::canonicalize(root)
            .context(format!("Failed to resolve settings directory: {}", root.display()))?;
        Ok(Self { root_dir, builds: Vec::new() })
    }

    /// Canonical directory of the build being configured.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Registers a build located at `location` (relative to the settings directory or absolute).
    ///
    /// Including the same directory twice is a no-op returning the first registration.
    /// `reserved` is a name the build may not take (the root project name).
    ///
    /// # Errors
    /// * [`SettingsError::MalformedEntry`] for an empty location or illegal explicit name.
    /// * [`SettingsError::InvalidBuildLocation`] if the location is not a directory
    ///   holding one of [`BUILD_DESCRIPTORS`].
    /// * [`SettingsError::CyclicInclude`] if the location is the current build.
    /// * [`SettingsError::NameCollision`] if the name is taken by another build or `reserved`.
    pub fn include(
        &mut self,
        location: &str,
        name: Option<&str>,
        role: BuildRole,
        reserved: Option<&str>,
    ) -> Result<&IncludedBuild, SettingsError> {
        if location.trim().is_empty() {
            return Err(SettingsError::MalformedEntry {
                entry: location.to_owned().into(),
                context: Some("included build location cannot be empty".into()),
            });
        }

        let candidate = self.root_dir.join(location);
        let dir = fs::canonicalize(&candidate).map_err(|e| SettingsError::InvalidBuildLocation {
            entry: location.to_owned().into(),
            context: Some(format!("{}: {e}", candidate.display()).into()),
        })?;

        if !dir.is_dir() {
            return Err(SettingsError::InvalidBuildLocation {
                entry: location.to_owned().into(),
                context: Some("not a directory".into()),
            });
        }

        if dir == self.root_dir {
            return Err(SettingsError::CyclicInclude {
                entry: location.to_owned().into(),
                context: Some("a build cannot include itself".into()),
            });
        }

        if let Some(index) = self.builds.iter().position(|b| b.dir == dir) {
            let existing = &self.builds[index];
            if existing.role != role {
                return Err(SettingsError::NameCollision {
                    entry: existing.name.clone().into(),
                    context: Some(
                        format!(
                            "{} is already included as {:?}, not {role:?}",
                            dir.display(),
                            existing.role
                        )
                        .into(),
                    ),
                });
            }
            debug!(build = %location, "Included build already registered");
            return Ok(existing);
        }

        let Some(descriptor) = BUILD_DESCRIPTORS.iter().copied().find(|d| dir.join(d).is_file())
        else {
            return Err(SettingsError::InvalidBuildLocation {
                entry: location.to_owned().into(),
                context: Some(format!("no build descriptor found in {}", dir.display()).into()),
            });
        };

        let name = match name {
            Some(explicit) => {
                validate_name(explicit, "included build name")?;
                explicit.to_owned()
            },
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .filter(|n| !n.is_empty())
                .ok_or_else(|| SettingsError::InvalidBuildLocation {
                    entry: location.to_owned().into(),
                    context: Some("cannot derive a build name from the location".into()),
                })?,
        };

        if reserved == Some(name.as_str()) {
            return Err(SettingsError::NameCollision {
                entry: name.into(),
                context: Some("included build name equals the root project name".into()),
            });
        }
        if let Some(other) = self.builds.iter().find(|b| b.name == name) {
            return Err(SettingsError::NameCollision {
                entry: name.into(),
                context: Some(format!("name already used by build at {}", other.dir.display()).into()),
            });
        }

        debug!(build = %name, role = ?role, descriptor, "Included build");
        self.builds.push(IncludedBuild {
            name,
            location: location.to_owned(),
            dir,
            descriptor,
            role,
        });
        Ok(&self.builds[self.builds.len() - 1])
    }

    /// Fails if an included build already carries `name`.
    ///
    /// # Errors
    /// Returns [`SettingsError::NameCollision`].
    pub fn ensure_name_free(&self, name: &str) -> Result<(), SettingsError> {
        match self.builds.iter().find(|b| b.name == name) {
            Some(build) => Err(SettingsError::NameCollision {
                entry: name.to_owned().into(),
                context: Some(format!("an included build at {} has this name", build.dir.display()).into()),
            }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn builds(&self) -> &[IncludedBuild] {
        &self.builds
    }

    #[must_use]
    pub fn finalize(&self) -> Arc<[IncludedBuild]> {
        Arc::from(self.builds.as_slice())
    }
}
