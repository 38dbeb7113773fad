use std::str::FromStr;
use strum::IntoEnumIterator;
use trellis_domain::features::{FeatureFlag, FeatureSet};
use trellis_domain::repository::WellKnownRepository;

#[test]
fn flag_names_match_engine_tokens() {
    assert_eq!(FeatureFlag::TypesafeProjectAccessors.as_str(), "TYPESAFE_PROJECT_ACCESSORS");
    assert_eq!(FeatureFlag::VersionCatalogs.to_string(), "VERSION_CATALOGS");
    assert_eq!(FeatureFlag::from_str("VERSION_CATALOGS"), Ok(FeatureFlag::VersionCatalogs));
    assert!(FeatureFlag::from_str("version_catalogs").is_err());
}

#[test]
fn feature_set_serializes_as_names() {
    let set: FeatureSet =
        [FeatureFlag::VersionCatalogs, FeatureFlag::TypesafeProjectAccessors].into_iter().collect();

    let value = serde_json::to_value(set).expect("serialize");
    assert_eq!(value, serde_json::json!(["TYPESAFE_PROJECT_ACCESSORS", "VERSION_CATALOGS"]));

    let back: FeatureSet = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, set);
}

#[test]
fn feature_set_rejects_unknown_names() {
    let err = serde_json::from_value::<FeatureSet>(serde_json::json!(["NOT_A_FLAG"]))
        .expect_err("unknown flag must fail");
    assert!(err.to_string().contains("NOT_A_FLAG"));
}

#[test]
fn well_known_tokens_are_camel_case() {
    assert_eq!(WellKnownRepository::from_str("mavenCentral"), Ok(WellKnownRepository::MavenCentral));
    assert_eq!(WellKnownRepository::GradlePluginPortal.token(), "gradlePluginPortal");
    assert_eq!(WellKnownRepository::Jitpack.token(), "jitpack");
    assert!(WellKnownRepository::Jitpack.location().starts_with("https://jitpack.io"));
}

#[test]
fn only_maven_local_is_home_relative() {
    for repository in WellKnownRepository::iter() {
        let location = repository.location();
        assert!(location.ends_with('/'), "{location}");
        if repository == WellKnownRepository::MavenLocal {
            assert_eq!(location, "file:~/.m2/repository/");
        } else {
            assert!(location.starts_with("https://"), "{location}");
        }
    }
}
