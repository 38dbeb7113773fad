//! Settings evaluation for a multi-module build.
//!
//! A build's settings are declared once, before any project is configured: which
//! feature previews are on, where plugins and dependencies are resolved from, which
//! other builds are composed in, and which modules make up the build. This crate
//! validates those declarations in a fixed order and freezes them into a [`Settings`]
//! value the build engine can share freely.
//!
//! # Lifecycle
//!
//! [`SettingsEvaluator`] walks through
//! `EMPTY -> FLAGS_SET -> REPOS_SET -> BUILDS_INCLUDED -> MODULES_SET -> FINALIZED`.
//! Stages may be skipped, never revisited. The first error aborts the evaluation.
//!
//! # Loading from a file
//!
//! ```rust
//! use std::fs;
//! use trellis_settings::{evaluate_file, FeatureFlag, SETTINGS_FILE};
//!
//! # let tmp = tempfile::tempdir().unwrap();
//! let path = tmp.path().join(SETTINGS_FILE);
//! fs::write(
//!     &path,
//!     r#"
//! root_name = "Minestom"
//! feature_previews = ["TYPESAFE_PROJECT_ACCESSORS"]
//! modules = ["demo", "testing"]
//!
//! [dependency_resolution]
//! repositories = ["mavenCentral"]
//! "#,
//! )
//! .unwrap();
//!
//! let settings = evaluate_file(&path)?;
//! assert!(settings.has_feature(FeatureFlag::TypesafeProjectAccessors));
//! assert_eq!(settings.module_names().collect::<Vec<_>>(), ["demo", "testing"]);
//! # Ok::<(), trellis_settings::SettingsError>(())
//! ```

pub mod builds;
pub mod catalog;
pub mod error;
pub mod features;
pub mod loader;
pub mod modules;
pub mod repository;
pub mod settings;

pub use builds::{BUILD_DESCRIPTORS, BuildRole, IncludedBuild, IncludedBuildRegistry};
pub use catalog::VersionCatalog;
pub use error::{SettingsError, SettingsErrorExt};
pub use features::FeatureRegistry;
pub use loader::{ENV_PREFIX, SETTINGS_FILE, evaluate, evaluate_file, load_declaration};
pub use modules::{ModuleEntry, ModuleGraph, ModulePath};
pub use repository::{Repositories, RepositoryEntry, RepositoryList};
pub use settings::{DEFAULT_ROOT_NAME, Settings, SettingsEvaluator, SettingsInner, Stage};

pub use trellis_domain as domain;
pub use trellis_domain::features::{FeatureFlag, FeatureSet};
pub use trellis_domain::repository::{RepositoriesMode, RepositoryScope, WellKnownRepository};
