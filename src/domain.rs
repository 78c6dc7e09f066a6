//! Domain models for questionnaire content.
//!
//! This module contains the filesystem agnostic types: questions, their
//! dependency rules, sections, the answer context and the content builder
//! that filters and navigates them.

/// Filtered, navigable views over sections.
pub mod builder;
pub use builder::{ContentBuilder, FilterError};

mod config;
pub use config::{Config, ConfigError};

/// Answer contexts and `key=value` parsing.
pub mod context;
pub use context::Context;

/// Question visibility rules.
pub mod dependency;
pub use dependency::Dependency;

mod question;
pub use question::Question;

pub(crate) mod scalar;

mod section;
pub use section::Section;
