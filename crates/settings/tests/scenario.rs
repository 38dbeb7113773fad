use std::fs;
use std::path::Path;
use tempfile::TempDir;
use trellis_settings::*;

const MINESTOM_SETTINGS: &str = r#"
root_name = "Minestom"
feature_previews = ["TYPESAFE_PROJECT_ACCESSORS", "VERSION_CATALOGS"]
modules = ["code-generators", "jmh-benchmarks", "jcstress-tests", "demo", "testing"]

[plugin_management]
repositories = ["mavenCentral", "gradlePluginPortal", "mavenLocal"]
include_builds = ["build-logic"]

[dependency_resolution]
repositories = [{ url = "https://jitpack.io" }, "mavenCentral", "mavenLocal"]
version_catalogs = [{ name = "libs", path = "gradle/libs.versions.toml" }]
"#;

const MODULES: [&str; 5] = ["code-generators", "jmh-benchmarks", "jcstress-tests", "demo", "testing"];

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let build_logic = temp.path().join("build-logic");
    fs::create_dir(&build_logic).unwrap();
    fs::write(build_logic.join("settings.gradle.kts"), "").unwrap();
    fs::write(temp.path().join(SETTINGS_FILE), MINESTOM_SETTINGS).unwrap();
    temp
}

fn minestom(root: &Path) -> Settings {
    let mut evaluator = SettingsEvaluator::new(root).unwrap();

    evaluator.enable_feature("TYPESAFE_PROJECT_ACCESSORS").unwrap();
    evaluator.enable_feature("VERSION_CATALOGS").unwrap();

    for token in ["mavenCentral", "gradlePluginPortal", "mavenLocal"] {
        evaluator.add_repository(RepositoryScope::Plugins, token).unwrap();
    }
    for token in ["jitpack", "mavenCentral", "mavenLocal"] {
        evaluator.add_repository(RepositoryScope::Dependencies, token).unwrap();
    }
    evaluator.add_version_catalog("libs", "gradle/libs.versions.toml").unwrap();

    evaluator.include_build("build-logic", BuildRole::PluginLogic).unwrap();

    for module in MODULES {
        evaluator.include(module).unwrap();
    }
    evaluator.set_root_name("Minestom").unwrap();

    evaluator.finalize().unwrap()
}

#[test]
fn minestom_settings_evaluate() {
    let temp = workspace();
    let settings = minestom(temp.path());

    assert_eq!(settings.feature_previews.flags().count(), 2);
    assert!(settings.has_feature(FeatureFlag::TypesafeProjectAccessors));
    assert!(settings.has_feature(FeatureFlag::VersionCatalogs));

    assert_eq!(
        settings.repositories(RepositoryScope::Dependencies).names().collect::<Vec<_>>(),
        ["jitpack", "mavenCentral", "mavenLocal"]
    );
    assert_eq!(settings.included_builds.len(), 1);
    assert_eq!(settings.included_builds[0].name(), "build-logic");
    assert_eq!(settings.included_builds[0].descriptor(), "settings.gradle.kts");
    assert_eq!(settings.module_names().collect::<Vec<_>>(), MODULES);
    assert_eq!(settings.root_name(), "Minestom");
}

#[test]
fn typesafe_accessors_are_generated() {
    let temp = workspace();
    let settings = minestom(temp.path());

    let accessors: Vec<_> = settings.modules.iter().filter_map(ModuleEntry::accessor).collect();
    assert_eq!(accessors, ["codeGenerators", "jmhBenchmarks", "jcstressTests", "demo", "testing"]);
    assert_eq!(settings.module("demo").unwrap().dir(), Path::new("demo"));
}

#[test]
fn settings_file_matches_programmatic_evaluation() {
    let temp = workspace();
    let from_file = evaluate_file(temp.path().join(SETTINGS_FILE)).unwrap();
    let programmatic = minestom(temp.path());

    assert_eq!(
        serde_json::to_value(&from_file).unwrap(),
        serde_json::to_value(&programmatic).unwrap()
    );
}

#[test]
fn duplicate_module_keeps_single_entry() {
    let temp = TempDir::new().unwrap();
    let mut evaluator = SettingsEvaluator::new(temp.path()).unwrap();

    evaluator.include("demo").unwrap();
    let err = evaluator.include("demo").unwrap_err();
    assert!(matches!(err, SettingsError::DuplicateModule { .. }));
    assert_eq!(err.entry(), Some("demo"));

    assert_eq!(evaluator.modules().len(), 1);
    assert!(evaluator.modules().get("demo").is_some());
    assert_eq!(evaluator.failure(), Some("DuplicateModule 'demo'"));

    let err = evaluator.finalize().unwrap_err();
    assert!(matches!(err, SettingsError::SettingsFrozen { .. }));
    assert!(evaluator.settings().is_none());
}

#[test]
fn malformed_module_aborts_finalize() {
    let temp = TempDir::new().unwrap();
    let mut evaluator = SettingsEvaluator::new(temp.path()).unwrap();

    evaluator.include("demo").unwrap();
    let err = evaluator.include("bad name!").unwrap_err();
    assert!(matches!(err, SettingsError::MalformedEntry { .. }));

    assert!(evaluator.finalize().is_err());
    assert!(evaluator.settings().is_none());
    assert_eq!(evaluator.stage(), Stage::ModulesSet);
}

#[test]
fn root_name_collides_with_module() {
    let temp = TempDir::new().unwrap();
    let mut evaluator = SettingsEvaluator::new(temp.path()).unwrap();

    evaluator.include("demo").unwrap();
    let err = evaluator.set_root_name("demo").unwrap_err();
    assert!(matches!(err, SettingsError::NameCollision { .. }));
}

#[test]
fn handoff_json_has_every_section() {
    let temp = workspace();
    let json = serde_json::to_value(minestom(temp.path())).unwrap();

    assert_eq!(json["root_name"], "Minestom");
    assert_eq!(
        json["feature_previews"],
        serde_json::json!(["TYPESAFE_PROJECT_ACCESSORS", "VERSION_CATALOGS"])
    );
    assert_eq!(json["dependency_repositories"][0]["location"], "https://jitpack.io/");
    assert_eq!(json["plugin_repositories"][1]["name"], "gradlePluginPortal");
    assert_eq!(json["repositories_mode"], "prefer-project");
    assert_eq!(json["version_catalogs"][0]["name"], "libs");
    assert_eq!(json["included_builds"][0]["role"], "plugin_logic");
    assert_eq!(json["modules"][0]["accessor"], "codeGenerators");
}

#[test]
fn settings_are_shareable_across_threads() {
    let temp = workspace();
    let settings = minestom(temp.path());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let settings = settings.clone();
            std::thread::spawn(move || settings.module_names().count())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), MODULES.len());
    }
}
