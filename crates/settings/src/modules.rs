use crate::error::SettingsError;
use fxhash::FxHashMap;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const SEPARATORS: [char; 3] = [':', '/', '\\'];

/// Characters allowed in module segments and the root project name.
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Checks a single name against the allowed identifier set.
pub(crate) fn validate_name(name: &str, what: &str) -> Result<(), SettingsError> {
    if name.is_empty() {
        return Err(SettingsError::MalformedEntry {
            entry: name.to_owned().into(),
            context: Some(format!("{what} cannot be empty").into()),
        });
    }
    if let Some(c) = name.chars().find(|c| !is_name_char(*c)) {
        return Err(SettingsError::MalformedEntry {
            entry: name.to_owned().into(),
            context: Some(format!("{what} contains illegal character '{c}'").into()),
        });
    }
    Ok(())
}

/// Canonical module name: segments joined by `:` without a leading separator.
///
/// `demo`, `:demo`, `tools/codegen`, `tools\codegen` and `:tools::codegen` all
/// normalize to either `demo` or `tools:codegen`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    /// # Errors
    /// Returns [`SettingsError::MalformedEntry`] if no segment remains or a segment
    /// contains characters outside letters, digits, `-` and `_`.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        let segments: Vec<&str> = raw.split(SEPARATORS).filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(SettingsError::MalformedEntry {
                entry: raw.to_owned().into(),
                context: Some("module name cannot be empty".into()),
            });
        }
        for segment in &segments {
            if let Some(c) = segment.chars().find(|c| !is_name_char(*c)) {
                return Err(SettingsError::MalformedEntry {
                    entry: raw.to_owned().into(),
                    context: Some(format!("illegal character '{c}' in segment '{segment}'").into()),
                });
            }
        }
        Ok(Self(segments.join(":")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(':')
    }

    /// Absolute project path as the engine prints it, e.g. `:tools:codegen`.
    #[must_use]
    pub fn project_path(&self) -> String {
        format!(":{}", self.0)
    }

    /// Conventional directory, relative to the settings directory.
    #[must_use]
    pub fn default_dir(&self) -> PathBuf {
        self.segments().collect()
    }

    /// Type-safe accessor, e.g. `tools:code-gen` becomes `tools.codeGen`.
    #[must_use]
    pub fn accessor(&self) -> String {
        self.segments().map(camel_case).collect::<Vec<_>>().join(".")
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModulePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ModulePath {
    type Error = SettingsError;

    fn try_from(value: &str) -> Result<Self, SettingsError> {
        Self::parse(value)
    }
}

/// One sub-project of the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    path: ModulePath,
    dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    accessor: Option<String>,
}

impl ModuleEntry {
    #[must_use]
    pub const fn path(&self) -> &ModulePath {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.path.as_str()
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Present only when type-safe project accessors are enabled.
    #[must_use]
    pub fn accessor(&self) -> Option<&str> {
        self.accessor.as_deref()
    }
}

/// Insertion-ordered set of modules plus the root project name.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: IndexMap<ModulePath, ModuleEntry>,
    accessors: FxHashMap<String, ModulePath>,
    root_name: Option<String>,
    typesafe_accessors: bool,
}

impl ModuleGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches on accessor generation and the stricter naming it requires.
    /// The evaluator's stage order guarantees no module exists yet.
    pub(crate) const fn enable_typesafe_accessors(&mut self) {
        self.typesafe_accessors = true;
    }

    /// Adds a module at its conventional directory.
    ///
    /// # Errors
    /// See [`ModuleGraph::include_at`].
    pub fn include(&mut self, name: &str) -> Result<&ModuleEntry, SettingsError> {
        self.include_at(name, None)
    }

    /// Adds a module, optionally overriding its directory.
    ///
    /// # Errors
    /// * [`SettingsError::MalformedEntry`] for an empty or illegal name or directory.
    /// * [`SettingsError::DuplicateModule`] if the normalized name (or, with type-safe
    ///   accessors, its accessor) is already taken.
    /// * [`SettingsError::NameCollision`] if the name equals the root project name.
    pub fn include_at(
        &mut self,
        name: &str,
        dir: Option<&str>,
    ) -> Result<&ModuleEntry, SettingsError> {
        let path = ModulePath::parse(name)?;

        if self.modules.contains_key(&path) {
            return Err(SettingsError::DuplicateModule {
                entry: path.to_string().into(),
                context: Some(format!("declared again as '{name}'").into()),
            });
        }

        if self.root_name.as_deref() == Some(path.as_str()) {
            return Err(SettingsError::NameCollision {
                entry: path.to_string().into(),
                context: Some("module name equals the root project name".into()),
            });
        }

        let accessor = if self.typesafe_accessors {
            if let Some(segment) =
                path.segments().find(|s| !s.starts_with(|c: char| c.is_ascii_alphabetic()))
            {
                return Err(SettingsError::MalformedEntry {
                    entry: name.to_owned().into(),
                    context: Some(
                        format!("segment '{segment}' must start with a letter for type-safe accessors")
                            .into(),
                    ),
                });
            }
            let accessor = path.accessor();
            if let Some(owner) = self.accessors.get(&accessor) {
                return Err(SettingsError::DuplicateModule {
                    entry: path.to_string().into(),
                    context: Some(format!("accessor '{accessor}' is already used by '{owner}'").into()),
                });
            }
            Some(accessor)
        } else {
            None
        };

        let dir = match dir {
            Some(dir) if dir.trim().is_empty() => {
                return Err(SettingsError::MalformedEntry {
                    entry: name.to_owned().into(),
                    context: Some("module directory cannot be empty".into()),
                });
            },
            Some(dir) => PathBuf::from(dir),
            None => path.default_dir(),
        };

        if let Some(accessor) = &accessor {
            self.accessors.insert(accessor.clone(), path.clone());
        }
        debug!(module = %path, dir = %dir.display(), "Included module");

        let entry = ModuleEntry { path: path.clone(), dir, accessor };
        Ok(self.modules.entry(path).or_insert(entry))
    }

    /// Sets the root project name.
    ///
    /// # Errors
    /// * [`SettingsError::MalformedEntry`] for an empty or illegal name.
    /// * [`SettingsError::NameCollision`] if a module already has this name.
    pub fn set_root_name(&mut self, name: &str) -> Result<(), SettingsError> {
        validate_name(name, "root project name")?;

        if self.modules.contains_key(&ModulePath(name.to_owned())) {
            return Err(SettingsError::NameCollision {
                entry: name.to_owned().into(),
                context: Some("a module with this name is already included".into()),
            });
        }

        self.root_name = Some(name.to_owned());
        Ok(())
    }

    #[must_use]
    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleEntry> {
        ModulePath::parse(name).ok().and_then(|path| self.modules.get(&path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Immutable module sequence in declaration order.
    #[must_use]
    pub fn finalize(&self) -> Arc<[ModuleEntry]> {
        self.modules.values().cloned().collect()
    }
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, part) in segment.split(['-', '_']).filter(|p| !p.is_empty()).enumerate() {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.push(first.to_ascii_lowercase());
            } else {
                out.push(first.to_ascii_uppercase());
            }
            out.extend(chars);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators() {
        for raw in ["tools/codegen", "tools\\codegen", ":tools:codegen", "tools//codegen/"] {
            assert_eq!(ModulePath::parse(raw).unwrap().as_str(), "tools:codegen", "{raw}");
        }
        let path = ModulePath::parse(":demo").unwrap();
        assert_eq!(path.as_str(), "demo");
        assert_eq!(path.project_path(), ":demo");
    }

    #[test]
    fn rejects_empty_and_illegal_names() {
        for bad in ["", ":", "//", "my module", "demo!", "tools:code.gen"] {
            let err = ModulePath::parse(bad).unwrap_err();
            assert_eq!(err.kind(), "MalformedEntry", "{bad:?} should be malformed");
        }
    }

    #[test]
    fn accessors_are_camel_cased() {
        assert_eq!(ModulePath::parse("code-generators").unwrap().accessor(), "codeGenerators");
        assert_eq!(ModulePath::parse("jcstress-tests").unwrap().accessor(), "jcstressTests");
        assert_eq!(ModulePath::parse("tools/My_Lib").unwrap().accessor(), "tools.myLib");
    }

    #[test]
    fn default_dir_follows_segments() {
        let path = ModulePath::parse("tools:codegen").unwrap();
        assert_eq!(path.default_dir(), Path::new("tools").join("codegen"));
    }

    #[test]
    fn duplicate_include_keeps_single_entry() {
        let mut graph = ModuleGraph::new();
        graph.include("demo").unwrap();
        let err = graph.include(":demo").unwrap_err();
        assert_eq!(err.kind(), "DuplicateModule");
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn root_name_and_modules_cannot_collide() {
        let mut graph = ModuleGraph::new();
        graph.include("demo").unwrap();
        assert_eq!(graph.set_root_name("demo").unwrap_err().kind(), "NameCollision");

        graph.set_root_name("Minestom").unwrap();
        assert_eq!(graph.include("Minestom").unwrap_err().kind(), "NameCollision");
        assert_eq!(graph.root_name(), Some("Minestom"));
    }

    #[test]
    fn typesafe_accessors_tighten_validation() {
        let mut graph = ModuleGraph::new();
        graph.enable_typesafe_accessors();

        graph.include("foo-bar").unwrap();
        assert_eq!(graph.include("foo_bar").unwrap_err().kind(), "DuplicateModule");
        assert_eq!(graph.include("1up").unwrap_err().kind(), "MalformedEntry");
        assert_eq!(graph.get("foo-bar").and_then(ModuleEntry::accessor), Some("fooBar"));
    }

    #[test]
    fn plain_mode_has_no_accessors() {
        let mut graph = ModuleGraph::new();
        graph.include("foo-bar").unwrap();
        graph.include("foo_bar").unwrap();
        graph.include("1up").unwrap();
        assert!(graph.iter().all(|m| m.accessor().is_none()));
    }

    #[test]
    fn directory_override_is_kept() {
        let mut graph = ModuleGraph::new();
        let entry = graph.include_at("benchmarks", Some("perf/jmh")).unwrap();
        assert_eq!(entry.dir(), Path::new("perf/jmh"));
    }
}
