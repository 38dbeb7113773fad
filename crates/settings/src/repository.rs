use crate::error::SettingsError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::net::IpAddr;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use trellis_domain::declaration::RepositoryDeclaration;
use trellis_domain::repository::{RepositoryScope, WellKnownRepository};
use url::{Host, Url};

const URL_SCHEMES: &[&str] = &["http", "https", "file"];

/// A validated artifact source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RepositoryEntry {
    WellKnown(WellKnownRepository),
    Url { name: String, url: String },
}

impl RepositoryEntry {
    /// Parses a bare token: a well-known name (`mavenCentral`) or a URL.
    ///
    /// # Errors
    /// Returns [`SettingsError::MalformedEntry`] if the token is neither.
    pub fn parse(token: &str) -> Result<Self, SettingsError> {
        if let Ok(known) = WellKnownRepository::from_str(token) {
            return Ok(Self::WellKnown(known));
        }
        if token.contains("://") {
            return Self::url(None, token);
        }
        Err(SettingsError::MalformedEntry {
            entry: token.to_owned().into(),
            context: Some("not a well-known repository or a URL".into()),
        })
    }

    /// Builds a URL entry, deriving its name from the host when none is given.
    ///
    /// # Errors
    /// Returns [`SettingsError::MalformedEntry`] for an unparsable URL, an unsupported
    /// scheme, embedded whitespace, or an invalid explicit name.
    pub fn url(name: Option<&str>, url: &str) -> Result<Self, SettingsError> {
        let malformed = |reason: String| SettingsError::MalformedEntry {
            entry: url.to_owned().into(),
            context: Some(reason.into()),
        };

        if url.is_empty() || url.chars().any(char::is_whitespace) {
            return Err(malformed("repository URL must be non-empty and contain no whitespace".into()));
        }

        let parsed = Url::parse(url).map_err(|e| malformed(format!("invalid URL: {e}")))?;
        if !URL_SCHEMES.contains(&parsed.scheme()) {
            return Err(malformed(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let derived = match parsed.host() {
            Some(Host::Domain(domain)) => name_from_host(domain),
            Some(Host::Ipv4(addr)) => name_from_addr(IpAddr::V4(addr)),
            Some(Host::Ipv6(addr)) => name_from_addr(IpAddr::V6(addr)),
            None if parsed.scheme() == "file" => parsed
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
                .unwrap_or("local")
                .to_owned(),
            None => return Err(malformed("repository URL has no host".into())),
        };

        let name = match name {
            Some(explicit) => {
                if explicit.is_empty()
                    || !explicit
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                {
                    return Err(SettingsError::MalformedEntry {
                        entry: explicit.to_owned().into(),
                        context: Some("invalid repository name".into()),
                    });
                }
                explicit.to_owned()
            },
            None => derived,
        };

        Ok(Self::Url { name, url: parsed.into() })
    }

    /// Display name: the token for well-known entries, the (derived) name otherwise.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::WellKnown(known) => known.token(),
            Self::Url { name, .. } => name,
        }
    }

    /// Location the engine will contact, normalized with a trailing slash.
    #[must_use]
    pub fn location(&self) -> Cow<'_, str> {
        match self {
            Self::WellKnown(known) => Cow::Borrowed(known.location()),
            Self::Url { url, .. } if url.ends_with('/') => Cow::Borrowed(url),
            Self::Url { url, .. } => Cow::Owned(format!("{url}/")),
        }
    }
}

impl TryFrom<&RepositoryDeclaration> for RepositoryEntry {
    type Error = SettingsError;

    fn try_from(value: &RepositoryDeclaration) -> Result<Self, SettingsError> {
        match value {
            RepositoryDeclaration::Token(token) => Self::parse(token),
            RepositoryDeclaration::Url { name, url } => Self::url(name.as_deref(), url),
        }
    }
}

impl fmt::Display for RepositoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.location())
    }
}

impl Serialize for RepositoryEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("RepositoryEntry", 2)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("location", &self.location())?;
        state.end()
    }
}

/// Ordered repositories for one resolution scope; earlier entries win.
#[derive(Debug, Clone)]
pub struct RepositoryList {
    scope: RepositoryScope,
    entries: Vec<RepositoryEntry>,
}

impl RepositoryList {
    #[must_use]
    pub const fn new(scope: RepositoryScope) -> Self {
        Self { scope, entries: Vec::new() }
    }

    /// Appends an entry. Duplicates of an already declared location are kept but logged.
    pub fn add(&mut self, entry: RepositoryEntry) {
        if let Some(existing) = self.entries.iter().find(|e| e.location() == entry.location()) {
            warn!(
                scope = %self.scope,
                repository = %entry,
                shadowed_by = existing.name(),
                "Repository location declared more than once"
            );
        }
        debug!(scope = %self.scope, priority = self.entries.len(), repository = %entry, "Added repository");
        self.entries.push(entry);
    }

    #[must_use]
    pub const fn scope(&self) -> RepositoryScope {
        self.scope
    }

    #[must_use]
    pub fn entries(&self) -> &[RepositoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Immutable snapshot handed to the engine.
    #[must_use]
    pub fn finalize(&self) -> Repositories {
        Repositories(Arc::from(self.entries.as_slice()))
    }
}

/// Finalized, shareable repository order for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Repositories(Arc<[RepositoryEntry]>);

impl Repositories {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(RepositoryEntry::name)
    }
}

impl Deref for Repositories {
    type Target = [RepositoryEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn name_from_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    let trimmed = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("repo."))
        .unwrap_or(&host);
    trimmed.split('.').next().filter(|label| !label.is_empty()).unwrap_or(trimmed).to_owned()
}

fn name_from_addr(addr: IpAddr) -> String {
    if addr.is_loopback() {
        return "localhost".to_owned();
    }
    addr.to_string()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
