use trellis_domain::declaration::{
    IncludedBuildDeclaration, ModuleDeclaration, RepositoryDeclaration, SettingsDeclaration,
};
use trellis_domain::repository::RepositoriesMode;
use serde_json::json;

#[test]
fn declaration_defaults_are_empty() {
    let decl = SettingsDeclaration::default();
    assert!(decl.root_name.is_none());
    assert!(decl.feature_previews.is_empty());
    assert!(decl.modules.is_empty());
    assert_eq!(decl.dependency_resolution.repositories_mode, RepositoriesMode::PreferProject);
}

#[test]
fn declaration_deserializes_mixed_item_forms() {
    let raw = json!({
        "root_name": "Minestom",
        "feature_previews": ["VERSION_CATALOGS"],
        "plugin_management": {
            "repositories": ["mavenCentral", "gradlePluginPortal"],
            "include_builds": ["build-logic"]
        },
        "dependency_resolution": {
            "repositories_mode": "fail-on-project-repos",
            "repositories": [{ "url": "https://jitpack.io" }, { "name": "corp", "url": "https://maven.corp.test/releases" }]
        },
        "include_builds": [{ "path": "../shared", "name": "shared-libs" }],
        "modules": ["demo", { "name": "tools/codegen", "dir": "codegen" }]
    });

    let decl: SettingsDeclaration = serde_json::from_value(raw).expect("declaration deserialize");

    assert_eq!(decl.root_name.as_deref(), Some("Minestom"));
    assert_eq!(decl.plugin_management.include_builds[0].path(), "build-logic");
    assert_eq!(
        decl.dependency_resolution.repositories[0],
        RepositoryDeclaration::Url { name: None, url: "https://jitpack.io".to_owned() }
    );
    assert_eq!(decl.dependency_resolution.repositories_mode, RepositoriesMode::FailOnProjectRepos);
    assert_eq!(decl.include_builds[0].name(), Some("shared-libs"));
    assert_eq!(decl.modules[0], ModuleDeclaration::Name("demo".to_owned()));
    assert_eq!(decl.modules[1].dir(), Some("codegen"));
}

#[test]
fn included_build_accessors_cover_both_forms() {
    let short = IncludedBuildDeclaration::Path("build-logic".to_owned());
    assert_eq!(short.path(), "build-logic");
    assert!(short.name().is_none());
}
