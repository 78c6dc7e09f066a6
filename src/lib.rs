//! Questionnaire Content Loading
//!
//! Sections and questions are YAML documents stored in a directory. A
//! [`ContentLoader`] reads them once; each caller then takes its own
//! [`ContentBuilder`] and filters it against the answers given so far.

pub mod domain;
pub use domain::{
    Config, ConfigError, ContentBuilder, Context, Dependency, FilterError, Question, Section,
};

/// Filesystem storage for questionnaire content.
pub mod storage;
pub use storage::{ContentLoader, LoadError, LoadOptions};
