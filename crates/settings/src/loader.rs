use crate::builds::BuildRole;
use crate::error::{SettingsError, SettingsErrorExt};
use crate::repository::RepositoryEntry;
use crate::settings::{Settings, SettingsEvaluator};
use config::{Case, Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::{info, instrument};
use trellis_domain::declaration::{RepositoryDeclaration, SettingsDeclaration};
use trellis_domain::repository::RepositoryScope;

/// Conventional settings file name, looked up in the build root.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Prefix of environment overrides, e.g. `TRELLIS__ROOT_NAME`.
pub const ENV_PREFIX: &str = "TRELLIS";

/// Reads a settings file and layers `TRELLIS__*` environment overrides on top.
///
/// Nested tables use a double underscore: `TRELLIS__DEPENDENCY_RESOLUTION__REPOSITORIES_MODE`
/// maps to `dependency_resolution.repositories_mode`.
///
/// # Errors
/// Returns [`SettingsError::Config`] if the file is missing, is not valid TOML, or
/// does not match [`SettingsDeclaration`].
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_declaration(path: impl AsRef<Path>) -> Result<SettingsDeclaration, SettingsError> {
    let path = path.as_ref();

    let declaration = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(Case::Snake))
        .build()
        .context(format!("Failed to read {}", path.display()))?
        .try_deserialize::<SettingsDeclaration>()
        .context(format!("Failed to deserialize {}", path.display()))?;

    info!("Loaded settings declaration from {}", path.display());
    Ok(declaration)
}

/// Applies a declaration to a fresh evaluator in stage order and finalizes it.
///
/// Evaluation stops at the first failing entry.
///
/// # Errors
/// Any [`SettingsError`] raised by the evaluator.
#[instrument(skip(declaration), fields(root_dir = %root_dir.as_ref().display()))]
pub fn evaluate(
    declaration: &SettingsDeclaration,
    root_dir: impl AsRef<Path>,
) -> Result<Settings, SettingsError> {
    let mut evaluator = SettingsEvaluator::new(root_dir)?;

    for flag in &declaration.feature_previews {
        evaluator.enable_feature(flag)?;
    }

    let plugins = &declaration.plugin_management;
    let dependencies = &declaration.dependency_resolution;
    add_repositories(&mut evaluator, RepositoryScope::Plugins, &plugins.repositories)?;
    add_repositories(&mut evaluator, RepositoryScope::Dependencies, &dependencies.repositories)?;

    evaluator.set_repositories_mode(dependencies.repositories_mode)?;
    for catalog in &dependencies.version_catalogs {
        evaluator.add_version_catalog(&catalog.name, &catalog.path)?;
    }

    for build in &plugins.include_builds {
        evaluator.include_build_named(build.path(), build.name(), BuildRole::PluginLogic)?;
    }
    for build in &declaration.include_builds {
        evaluator.include_build_named(build.path(), build.name(), BuildRole::Library)?;
    }

    for module in &declaration.modules {
        evaluator.include_at(module.name(), module.dir())?;
    }

    if let Some(root_name) = &declaration.root_name {
        evaluator.set_root_name(root_name)?;
    }

    evaluator.finalize()
}

/// Loads `path` and evaluates it against the directory that contains it.
///
/// # Errors
/// Any error of [`load_declaration`] or [`evaluate`].
pub fn evaluate_file(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    let path = path.as_ref();
    let declaration = load_declaration(path)?;
    let root_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    evaluate(&declaration, root_dir)
}

fn add_repositories(
    evaluator: &mut SettingsEvaluator,
    scope: RepositoryScope,
    declarations: &[RepositoryDeclaration],
) -> Result<(), SettingsError> {
    for declaration in declarations {
        let entry = RepositoryEntry::try_from(declaration)?;
        evaluator.add_repository_entry(scope, entry)?;
    }
    Ok(())
}
