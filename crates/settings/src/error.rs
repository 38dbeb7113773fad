use std::borrow::Cow;

/// Failures raised while evaluating settings.
///
/// Every variant aborts the evaluation; no partially built settings ever leave the
/// evaluator. `entry` holds the offending declaration as the user wrote it.
#[trellis_derive::trellis_error]
pub enum SettingsError {
    /// A feature preview outside the closed set known to the engine.
    #[error("Unknown feature preview{}: {entry}", format_context(.context))]
    UnknownFlag { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An included build that does not point at a build root.
    #[error("Invalid build location{}: {entry}", format_context(.context))]
    InvalidBuildLocation { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An included build that would include the current build.
    #[error("Cyclic build inclusion{}: {entry}", format_context(.context))]
    CyclicInclude { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Duplicate module{}: {entry}", format_context(.context))]
    DuplicateModule { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two different things (root project, module, included build) share a name.
    #[error("Name collision{}: {entry}", format_context(.context))]
    NameCollision { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A mutation attempted after the settings were finalized.
    #[error("Settings are frozen{}: {entry}", format_context(.context))]
    SettingsFrozen { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A syntactically invalid repository, module, build or catalog declaration.
    #[error("Malformed entry{}: {entry}", format_context(.context))]
    MalformedEntry { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A declaration that needs a feature preview which is not enabled.
    #[error("Feature preview not enabled{}: {entry}", format_context(.context))]
    FeatureDisabled { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An operation belonging to a stage the evaluator has already left.
    #[error("Out of order declaration{}: {entry}", format_context(.context))]
    StageOrder { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Settings file error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
