use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Resolution context a repository list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RepositoryScope {
    /// Consulted when resolving build-tool plugins.
    Plugins,
    /// Consulted when resolving ordinary dependencies.
    Dependencies,
}

/// Repositories addressable by a bare token in `settings.toml`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum WellKnownRepository {
    MavenCentral,
    /// The user's local Maven cache. Its location is a placeholder.
    MavenLocal,
    GradlePluginPortal,
    Google,
    Jitpack,
}

impl WellKnownRepository {
    #[must_use]
    pub fn token(self) -> &'static str {
        self.into()
    }

    /// Canonical location the engine resolves this token to.
    ///
    /// Remote tokens map to `https` URLs. [`WellKnownRepository::MavenLocal`] maps to
    /// `file:~/.m2/repository/`, which is not a file URL: the engine expands `~` to
    /// the home directory of the user running the build.
    #[must_use]
    pub const fn location(self) -> &'static str {
        match self {
            Self::MavenCentral => "https://repo.maven.apache.org/maven2/",
            Self::MavenLocal => "file:~/.m2/repository/",
            Self::GradlePluginPortal => "https://plugins.gradle.org/m2/",
            Self::Google => "https://dl.google.com/dl/android/maven2/",
            Self::Jitpack => "https://jitpack.io/",
        }
    }
}

/// How repositories declared by individual modules interact with the settings-level list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RepositoriesMode {
    /// Module-level repositories win over the settings list.
    #[default]
    PreferProject,
    /// The settings list wins; module-level declarations are ignored.
    PreferSettings,
    /// Any module-level repository declaration is a build failure.
    FailOnProjectRepos,
}
