use crate::error::SettingsError;
use std::str::FromStr;
use tracing::debug;
use trellis_domain::features::{FeatureFlag, FeatureSet};

/// Feature previews enabled for one settings evaluation.
///
/// The registry only grows: there is no way to disable a flag once enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRegistry {
    enabled: FeatureSet,
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self { enabled: FeatureSet::empty() }
    }
}

impl FeatureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a feature preview by its engine name (e.g. `VERSION_CATALOGS`).
    ///
    /// Enabling an already enabled flag is a no-op.
    ///
    /// # Errors
    /// Returns [`SettingsError::UnknownFlag`] if `name` is not a recognized preview.
    pub fn enable(&mut self, name: &str) -> Result<FeatureFlag, SettingsError> {
        let flag = FeatureFlag::from_str(name).map_err(|_| SettingsError::UnknownFlag {
            entry: name.to_owned().into(),
            context: Some("not a recognized feature preview".into()),
        })?;
        self.enable_flag(flag);
        Ok(flag)
    }

    /// Returns `true` if the flag was not enabled before.
    pub fn enable_flag(&mut self, flag: FeatureFlag) -> bool {
        let fresh = !self.enabled.has(flag);
        self.enabled |= FeatureSet::from(flag);
        if fresh {
            debug!(flag = %flag, "Enabled feature preview");
        }
        fresh
    }

    #[must_use]
    pub const fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.enabled.has(flag)
    }

    #[must_use]
    pub const fn enabled(&self) -> FeatureSet {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_is_idempotent() {
        let mut registry = FeatureRegistry::new();
        registry.enable("VERSION_CATALOGS").unwrap();
        let once = registry.enabled();

        registry.enable("VERSION_CATALOGS").unwrap();
        assert_eq!(registry.enabled(), once);
        assert_eq!(registry.enabled().flags().count(), 1);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let mut registry = FeatureRegistry::new();
        let err = registry.enable("FAST_BUILDS").unwrap_err();
        assert_eq!(err.kind(), "UnknownFlag");
        assert_eq!(err.entry(), Some("FAST_BUILDS"));
        assert!(registry.enabled().is_empty());
    }

    #[test]
    fn enable_flag_reports_freshness() {
        let mut registry = FeatureRegistry::new();
        assert!(registry.enable_flag(FeatureFlag::TypesafeProjectAccessors));
        assert!(!registry.enable_flag(FeatureFlag::TypesafeProjectAccessors));
        assert!(registry.is_enabled(FeatureFlag::TypesafeProjectAccessors));
    }
}
