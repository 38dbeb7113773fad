use bitflags::bitflags;
use serde::de::{Error as _, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Feature previews the build engine knows about.
///
/// The set is closed: a name that does not parse into one of these variants is a
/// configuration error, never a silent no-op.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureFlag {
    /// Generates `projects.<module>` accessors; module names must be valid identifiers.
    TypesafeProjectAccessors,
    /// Enables declarative version catalogs in dependency resolution.
    VersionCatalogs,
    OneLockfilePerProject,
    StableConfigurationCache,
    GroovyCompilationAvoidance,
}

impl FeatureFlag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    const fn bit(self) -> FeatureSet {
        match self {
            Self::TypesafeProjectAccessors => FeatureSet::TYPESAFE_PROJECT_ACCESSORS,
            Self::VersionCatalogs => FeatureSet::VERSION_CATALOGS,
            Self::OneLockfilePerProject => FeatureSet::ONE_LOCKFILE_PER_PROJECT,
            Self::StableConfigurationCache => FeatureSet::STABLE_CONFIGURATION_CACHE,
            Self::GroovyCompilationAvoidance => FeatureSet::GROOVY_COMPILATION_AVOIDANCE,
        }
    }
}

bitflags! {
    /// Set of enabled feature previews.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureSet: u32 {
        const TYPESAFE_PROJECT_ACCESSORS = 1 << 0;
        const VERSION_CATALOGS = 1 << 1;
        const ONE_LOCKFILE_PER_PROJECT = 1 << 2;
        const STABLE_CONFIGURATION_CACHE = 1 << 3;
        const GROOVY_COMPILATION_AVOIDANCE = 1 << 4;
    }
}

impl FeatureSet {
    #[must_use]
    pub const fn has(self, flag: FeatureFlag) -> bool {
        self.contains(flag.bit())
    }

    /// Enabled flags in declaration order of [`FeatureFlag`].
    pub fn flags(self) -> impl Iterator<Item = FeatureFlag> {
        FeatureFlag::iter().filter(move |flag| self.has(*flag))
    }
}

impl From<FeatureFlag> for FeatureSet {
    fn from(flag: FeatureFlag) -> Self {
        flag.bit()
    }
}

impl FromIterator<FeatureFlag> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = FeatureFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, flag| set | flag.bit())
    }
}

impl Serialize for FeatureSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.bits().count_ones() as usize))?;
        for flag in self.flags() {
            seq.serialize_element(flag.as_str())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagNames;

        impl<'de> Visitor<'de> for FlagNames {
            type Value = FeatureSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of feature preview names")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut set = FeatureSet::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = FeatureFlag::from_str(&name)
                        .map_err(|_| A::Error::custom(format!("unknown feature preview '{name}'")))?;
                    set |= flag.bit();
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(FlagNames)
    }
}
