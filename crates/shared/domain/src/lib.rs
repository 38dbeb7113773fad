//! # Domain Models
//!
//! Plain data describing a build's settings: the closed set of feature previews,
//! the well-known repositories, and the declaration read from `settings.toml`.
//! Keep it lean: no I/O and no validation beyond what parsing a token requires.
//! Validation lives in `trellis-settings`.

pub mod declaration;
pub mod features;
pub mod repository;
