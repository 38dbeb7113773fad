use anyhow::Result;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::info;
use trellis_settings::{FeatureFlag, RepositoryScope, Settings, evaluate_file};

/// Evaluates `path` and logs a one-line summary.
///
/// # Errors
/// Returns the first [`trellis_settings::SettingsError`] raised during evaluation.
pub(crate) fn check(path: &Path) -> Result<()> {
    let settings = evaluate_file(path)?;
    info!(
        root = settings.root_name(),
        modules = settings.modules.len(),
        builds = settings.included_builds.len(),
        "Settings are valid"
    );
    println!("{}: ok", path.display());
    Ok(())
}

/// Evaluates `path` and prints the result as a table or as JSON.
///
/// # Errors
/// Returns evaluation errors, or a serialization error in JSON mode.
pub(crate) fn show(path: &Path, json: bool) -> Result<()> {
    let settings = evaluate_file(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        render_settings(&settings);
    }
    Ok(())
}

pub(crate) fn flags() {
    for flag in FeatureFlag::iter() {
        println!("{flag}");
    }
}

fn render_settings(settings: &Settings) {
    println!("\nRoot project: {}", settings.root_name());
    println!("Settings directory: {}", settings.root_dir.display());

    let previews: Vec<_> = settings.feature_previews.flags().map(FeatureFlag::as_str).collect();
    println!(
        "Feature previews: {}",
        if previews.is_empty() { "none".to_owned() } else { previews.join(", ") }
    );
    println!("Repositories mode: {}", settings.repositories_mode);

    for scope in [RepositoryScope::Plugins, RepositoryScope::Dependencies] {
        println!("\nRepositories ({scope}):\n");
        println!("{:<4} {:<22} {:<50}", "#", "Name", "Location");
        println!("{:-<76}", "");
        for (priority, repository) in settings.repositories(scope).iter().enumerate() {
            println!("{:<4} {:<22} {:<50}", priority + 1, repository.name(), repository.location());
        }
    }

    if !settings.included_builds.is_empty() {
        println!("\nIncluded builds:\n");
        println!("{:<22} {:<14} {:<40}", "Name", "Role", "Location");
        println!("{:-<76}", "");
        for build in settings.included_builds.iter() {
            println!("{:<22} {:<14} {:<40}", build.name(), format!("{:?}", build.role()), build.location());
        }
    }

    if !settings.version_catalogs.is_empty() {
        println!("\nVersion catalogs:\n");
        for catalog in settings.version_catalogs.iter() {
            println!("{:<22} {}", catalog.name(), catalog.path().display());
        }
    }

    println!("\nModules:\n");
    println!("{:<30} {:<30} {:<20}", "Path", "Directory", "Accessor");
    println!("{:-<80}", "");
    for module in settings.modules.iter() {
        println!(
            "{:<30} {:<30} {:<20}",
            module.path().project_path(),
            module.dir().display(),
            module.accessor().unwrap_or("-")
        );
    }
    println!();
}
