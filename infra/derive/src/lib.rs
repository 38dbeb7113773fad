#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the Trellis workspace.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! trellis-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring a crate's error enum.
///
/// Every Trellis crate reports failures through exactly one enum built with this
/// macro, so a caller can always print *what* failed (`kind()`) and *which input*
/// caused it (`entry()`).
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless
///   already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds
///   `.context(...)` to `Result<T, Name>` and to `Result<T, Source>` for every
///   wrapped upstream error type.
/// * **Conversions**: `From<Source>` for variants holding a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Reporting**: `kind()` returns the variant name; `entry()` returns the
///   offending input for variants that carry an `entry: Cow<'static, str>` field.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Every variant uses named fields and carries
///    `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[trellis_derive::trellis_error]
/// pub enum LoaderError {
///     #[error("Duplicate module{}: {entry}", format_context(.context))]
///     DuplicateModule { entry: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, LoaderError> {
///     std::fs::read_to_string(path).context(format!("Reading {path}"))
/// }
/// ```
#[proc_macro_attribute]
pub fn trellis_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
