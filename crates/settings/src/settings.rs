use crate::builds::{BuildRole, IncludedBuild, IncludedBuildRegistry};
use crate::catalog::VersionCatalog;
use crate::error::SettingsError;
use crate::features::FeatureRegistry;
use crate::modules::{ModuleEntry, ModuleGraph, is_name_char};
use crate::repository::{Repositories, RepositoryEntry, RepositoryList};
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use trellis_domain::features::{FeatureFlag, FeatureSet};
use trellis_domain::repository::{RepositoriesMode, RepositoryScope};

/// Root project name used when the settings directory has no usable name.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Evaluation stages, in the only order they may be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Empty,
    FlagsSet,
    ReposSet,
    BuildsIncluded,
    ModulesSet,
    Finalized,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "EMPTY",
            Self::FlagsSet => "FLAGS_SET",
            Self::ReposSet => "REPOS_SET",
            Self::BuildsIncluded => "BUILDS_INCLUDED",
            Self::ModulesSet => "MODULES_SET",
            Self::Finalized => "FINALIZED",
        })
    }
}

/// Single-use builder for one build's settings.
///
/// Declarations must arrive stage by stage: feature previews, then repositories
/// (and catalogs), then included builds, then modules. Stages may be skipped but
/// never revisited. The first error aborts the evaluation: later mutations and
/// [`SettingsEvaluator::finalize`] fail with [`SettingsError::SettingsFrozen`].
/// A successful [`SettingsEvaluator::finalize`] freezes the evaluator and returns
/// the read-only [`Settings`].
///
/// # Example
/// ```rust
/// use trellis_settings::{SettingsEvaluator, RepositoryScope};
///
/// # let tmp = tempfile::tempdir().unwrap();
/// let mut evaluator = SettingsEvaluator::new(tmp.path())?;
/// evaluator.enable_feature("TYPESAFE_PROJECT_ACCESSORS")?;
/// evaluator.add_repository(RepositoryScope::Dependencies, "mavenCentral")?;
/// evaluator.include("demo")?;
/// evaluator.set_root_name("Minestom")?;
///
/// let settings = evaluator.finalize()?;
/// assert_eq!(settings.root_name(), "Minestom");
/// assert!(evaluator.include("late").is_err());
/// # Ok::<(), trellis_settings::SettingsError>(())
/// ```
#[derive(Debug)]
pub struct SettingsEvaluator {
    stage: Stage,
    features: FeatureRegistry,
    plugin_repositories: RepositoryList,
    dependency_repositories: RepositoryList,
    repositories_mode: RepositoriesMode,
    version_catalogs: Vec<VersionCatalog>,
    builds: IncludedBuildRegistry,
    modules: ModuleGraph,
    finalized: Option<Settings>,
    failure: Option<String>,
}

impl SettingsEvaluator {
    /// Starts an evaluation for the build rooted at `root_dir`.
    ///
    /// # Errors
    /// Returns [`SettingsError::Io`] if `root_dir` cannot be resolved.
    pub fn new(root_dir: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Ok(Self {
            stage: Stage::Empty,
            features: FeatureRegistry::new(),
            plugin_repositories: RepositoryList::new(RepositoryScope::Plugins),
            dependency_repositories: RepositoryList::new(RepositoryScope::Dependencies),
            repositories_mode: RepositoriesMode::default(),
            version_catalogs: Vec::new(),
            builds: IncludedBuildRegistry::new(root_dir)?,
            modules: ModuleGraph::new(),
            finalized: None,
            failure: None,
        })
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn features(&self) -> &FeatureRegistry {
        &self.features
    }

    #[must_use]
    pub const fn repositories(&self, scope: RepositoryScope) -> &RepositoryList {
        match scope {
            RepositoryScope::Plugins => &self.plugin_repositories,
            RepositoryScope::Dependencies => &self.dependency_repositories,
        }
    }

    #[must_use]
    pub const fn builds(&self) -> &IncludedBuildRegistry {
        &self.builds
    }

    #[must_use]
    pub const fn modules(&self) -> &ModuleGraph {
        &self.modules
    }

    /// The finalized settings, once [`SettingsEvaluator::finalize`] succeeded.
    #[must_use]
    pub const fn settings(&self) -> Option<&Settings> {
        self.finalized.as_ref()
    }

    /// The first error that aborted this evaluation, as `Kind 'entry'`.
    ///
    /// Once set, every mutation and [`SettingsEvaluator::finalize`] fail.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Enables a feature preview by name.
    ///
    /// # Errors
    /// [`SettingsError::UnknownFlag`], [`SettingsError::StageOrder`] or
    /// [`SettingsError::SettingsFrozen`].
    pub fn enable_feature(&mut self, name: &str) -> Result<FeatureFlag, SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::FlagsSet, name)?;
            let flag = this.features.enable(name)?;
            this.apply_flag(flag);
            this.stage = Stage::FlagsSet;
            Ok(flag)
        })
    }

    /// Typed variant of [`SettingsEvaluator::enable_feature`].
    ///
    /// # Errors
    /// [`SettingsError::StageOrder`] or [`SettingsError::SettingsFrozen`].
    pub fn enable(&mut self, flag: FeatureFlag) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::FlagsSet, flag.as_str())?;
            this.features.enable_flag(flag);
            this.apply_flag(flag);
            this.stage = Stage::FlagsSet;
            Ok(())
        })
    }

    /// Parses `token` and appends it to the repository list of `scope`.
    ///
    /// # Errors
    /// [`SettingsError::MalformedEntry`], [`SettingsError::StageOrder`] or
    /// [`SettingsError::SettingsFrozen`].
    pub fn add_repository(
        &mut self,
        scope: RepositoryScope,
        token: &str,
    ) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::ReposSet, token)?;
            let entry = RepositoryEntry::parse(token)?;
            this.push_repository(scope, entry);
            Ok(())
        })
    }

    /// Appends an already validated entry to the repository list of `scope`.
    ///
    /// # Errors
    /// [`SettingsError::StageOrder`] or [`SettingsError::SettingsFrozen`].
    pub fn add_repository_entry(
        &mut self,
        scope: RepositoryScope,
        entry: RepositoryEntry,
    ) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::ReposSet, entry.name())?;
            this.push_repository(scope, entry);
            Ok(())
        })
    }

    /// # Errors
    /// [`SettingsError::StageOrder`] or [`SettingsError::SettingsFrozen`].
    pub fn set_repositories_mode(&mut self, mode: RepositoriesMode) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::ReposSet, "repositories_mode")?;
            this.repositories_mode = mode;
            this.stage = Stage::ReposSet;
            Ok(())
        })
    }

    /// Declares a version catalog. Requires the `VERSION_CATALOGS` preview.
    ///
    /// # Errors
    /// * [`SettingsError::FeatureDisabled`] without the preview.
    /// * [`SettingsError::MalformedEntry`] for an invalid or repeated name or path.
    /// * [`SettingsError::StageOrder`] or [`SettingsError::SettingsFrozen`].
    pub fn add_version_catalog(&mut self, name: &str, path: &str) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::ReposSet, name)?;
            if !this.features.is_enabled(FeatureFlag::VersionCatalogs) {
                return Err(SettingsError::FeatureDisabled {
                    entry: name.to_owned().into(),
                    context: Some(
                        format!("version catalogs require the {} preview", FeatureFlag::VersionCatalogs)
                            .into(),
                    ),
                });
            }

            let catalog = VersionCatalog::new(name, path)?;
            if this.version_catalogs.iter().any(|c| c.name() == catalog.name()) {
                return Err(SettingsError::MalformedEntry {
                    entry: name.to_owned().into(),
                    context: Some("version catalog declared twice".into()),
                });
            }

            debug!(catalog = name, path, "Declared version catalog");
            this.version_catalogs.push(catalog);
            this.stage = Stage::ReposSet;
            Ok(())
        })
    }

    /// Includes the build at `location`, named after its directory.
    ///
    /// # Errors
    /// See [`SettingsEvaluator::include_build_named`].
    pub fn include_build(&mut self, location: &str, role: BuildRole) -> Result<(), SettingsError> {
        self.include_build_named(location, None, role)
    }

    /// Includes the build at `location`, optionally under an explicit name.
    ///
    /// # Errors
    /// [`SettingsError::InvalidBuildLocation`], [`SettingsError::CyclicInclude`],
    /// [`SettingsError::NameCollision`], [`SettingsError::MalformedEntry`],
    /// [`SettingsError::StageOrder`] or [`SettingsError::SettingsFrozen`].
    pub fn include_build_named(
        &mut self,
        location: &str,
        name: Option<&str>,
        role: BuildRole,
    ) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::BuildsIncluded, location)?;
            this.builds.include(location, name, role, this.modules.root_name())?;
            this.stage = Stage::BuildsIncluded;
            Ok(())
        })
    }

    /// Adds a module at its conventional directory.
    ///
    /// # Errors
    /// [`SettingsError::DuplicateModule`], [`SettingsError::NameCollision`],
    /// [`SettingsError::MalformedEntry`], [`SettingsError::StageOrder`] or
    /// [`SettingsError::SettingsFrozen`].
    pub fn include(&mut self, name: &str) -> Result<(), SettingsError> {
        self.include_at(name, None)
    }

    /// Adds a module, optionally overriding its directory.
    ///
    /// # Errors
    /// Same as [`SettingsEvaluator::include`].
    pub fn include_at(&mut self, name: &str, dir: Option<&str>) -> Result<(), SettingsError> {
        self.step(|this| {
            this.check_stage(Stage::ModulesSet, name)?;
            this.modules.include_at(name, dir)?;
            this.stage = Stage::ModulesSet;
            Ok(())
        })
    }

    /// Sets the root project name. Allowed in every stage before finalization.
    ///
    /// # Errors
    /// [`SettingsError::NameCollision`] if a module or included build already uses the
    /// name, [`SettingsError::MalformedEntry`] or [`SettingsError::SettingsFrozen`].
    pub fn set_root_name(&mut self, name: &str) -> Result<(), SettingsError> {
        self.step(|this| {
            this.ensure_mutable(name)?;
            this.builds.ensure_name_free(name)?;
            this.modules.set_root_name(name)
        })
    }

    /// Freezes the evaluator and produces the settings handed to the engine.
    ///
    /// Without an explicit root name, the settings directory name is used, with
    /// characters outside the module alphabet replaced by `-`.
    ///
    /// # Errors
    /// [`SettingsError::SettingsFrozen`] when called twice or after an earlier error
    /// aborted the evaluation; otherwise the errors of
    /// [`SettingsEvaluator::set_root_name`] for the defaulted name.
    pub fn finalize(&mut self) -> Result<Settings, SettingsError> {
        self.step(Self::freeze)
    }

    fn freeze(&mut self) -> Result<Settings, SettingsError> {
        self.ensure_mutable("finalize")?;

        if self.modules.root_name().is_none() {
            let fallback = default_root_name(self.builds.root_dir());
            debug!(root_name = %fallback, "Defaulting root project name to the settings directory");
            self.builds.ensure_name_free(&fallback)?;
            self.modules.set_root_name(&fallback)?;
        }
        let root_name = self.modules.root_name().unwrap_or_default().to_owned();

        let settings = Settings {
            inner: Arc::new(SettingsInner {
                root_name,
                root_dir: self.builds.root_dir().to_path_buf(),
                feature_previews: self.features.enabled(),
                plugin_repositories: self.plugin_repositories.finalize(),
                dependency_repositories: self.dependency_repositories.finalize(),
                repositories_mode: self.repositories_mode,
                version_catalogs: Arc::from(self.version_catalogs.as_slice()),
                included_builds: self.builds.finalize(),
                modules: self.modules.finalize(),
            }),
        };

        info!(
            root = %settings.root_name,
            modules = settings.modules.len(),
            builds = settings.included_builds.len(),
            plugin_repositories = settings.plugin_repositories.len(),
            dependency_repositories = settings.dependency_repositories.len(),
            "Settings finalized"
        );

        self.stage = Stage::Finalized;
        self.finalized = Some(settings.clone());
        Ok(settings)
    }

    /// Runs one mutation, refusing it after an earlier failure and recording the
    /// first failure it produces.
    fn step<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, SettingsError>,
    ) -> Result<T, SettingsError> {
        if let Some(failure) = &self.failure {
            return Err(SettingsError::SettingsFrozen {
                entry: failure.clone().into(),
                context: Some("evaluation was aborted by an earlier error".into()),
            });
        }

        let result = op(self);
        if let Err(err) = &result
            && self.stage != Stage::Finalized
        {
            let failure = format!("{} '{}'", err.kind(), err.entry().unwrap_or_default());
            warn!(failure = %failure, "Settings evaluation aborted");
            self.failure = Some(failure);
        }
        result
    }

    fn push_repository(&mut self, scope: RepositoryScope, entry: RepositoryEntry) {
        match scope {
            RepositoryScope::Plugins => self.plugin_repositories.add(entry),
            RepositoryScope::Dependencies => self.dependency_repositories.add(entry),
        }
        self.stage = Stage::ReposSet;
    }

    fn apply_flag(&mut self, flag: FeatureFlag) {
        if flag == FeatureFlag::TypesafeProjectAccessors {
            self.modules.enable_typesafe_accessors();
        }
    }

    fn ensure_mutable(&self, entry: &str) -> Result<(), SettingsError> {
        if self.stage == Stage::Finalized {
            return Err(SettingsError::SettingsFrozen {
                entry: entry.to_owned().into(),
                context: Some("settings were already finalized".into()),
            });
        }
        Ok(())
    }

    fn check_stage(&self, target: Stage, entry: &str) -> Result<(), SettingsError> {
        self.ensure_mutable(entry)?;
        if target < self.stage {
            return Err(SettingsError::StageOrder {
                entry: entry.to_owned().into(),
                context: Some(format!("{target} declaration after reaching {}", self.stage).into()),
            });
        }
        Ok(())
    }
}

fn default_root_name(root_dir: &Path) -> String {
    let raw = root_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let name: String = raw.chars().map(|c| if is_name_char(c) { c } else { '-' }).collect();
    let name = name.trim_matches('-');
    if name.is_empty() { DEFAULT_ROOT_NAME.to_owned() } else { name.to_owned() }
}

/// Read-only view of the finalized settings.
#[derive(Debug, Serialize)]
pub struct SettingsInner {
    pub root_name: String,
    pub root_dir: PathBuf,
    pub feature_previews: FeatureSet,
    pub plugin_repositories: Repositories,
    pub dependency_repositories: Repositories,
    pub repositories_mode: RepositoriesMode,
    pub version_catalogs: Arc<[VersionCatalog]>,
    pub included_builds: Arc<[IncludedBuild]>,
    pub modules: Arc<[ModuleEntry]>,
}

/// Finalized settings, cheap to clone and safe to share across threads.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Settings {
    inner: Arc<SettingsInner>,
}

impl Deref for Settings {
    type Target = SettingsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Settings {
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.inner.root_name
    }

    #[must_use]
    pub fn has_feature(&self, flag: FeatureFlag) -> bool {
        self.inner.feature_previews.has(flag)
    }

    #[must_use]
    pub fn repositories(&self, scope: RepositoryScope) -> &Repositories {
        match scope {
            RepositoryScope::Plugins => &self.inner.plugin_repositories,
            RepositoryScope::Dependencies => &self.inner.dependency_repositories,
        }
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.inner.modules.iter().map(ModuleEntry::name)
    }

    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleEntry> {
        self.inner.modules.iter().find(|m| m.name() == name)
    }

    /// Included builds with the given role, in declaration order.
    pub fn builds_with_role(&self, role: BuildRole) -> impl Iterator<Item = &IncludedBuild> {
        self.inner.included_builds.iter().filter(move |b| b.role() == role)
    }
}
