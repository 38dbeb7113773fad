use crate::error::SettingsError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A named dependency-version table declared in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCatalog {
    name: String,
    path: PathBuf,
}

impl VersionCatalog {
    /// # Errors
    /// Returns [`SettingsError::MalformedEntry`] if the name does not start with an ASCII
    /// letter followed by letters or digits, or if `path` is not a relative `.toml` file.
    pub fn new(name: &str, path: &str) -> Result<Self, SettingsError> {
        let mut chars = name.chars();
        let valid_name = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric());
        if !valid_name {
            return Err(SettingsError::MalformedEntry {
                entry: name.to_owned().into(),
                context: Some("catalog names start with a letter and contain only letters and digits".into()),
            });
        }

        let file = Path::new(path);
        if path.is_empty() || file.is_absolute() || file.extension().is_none_or(|ext| ext != "toml") {
            return Err(SettingsError::MalformedEntry {
                entry: path.to_owned().into(),
                context: Some(format!("catalog '{name}' must point at a relative .toml file").into()),
            });
        }

        Ok(Self { name: name.to_owned(), path: file.to_path_buf() })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file, relative to the settings directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
