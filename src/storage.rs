//! Reading questionnaire content from the filesystem.

pub mod loader;
mod section_id;
mod yaml;

pub use loader::{ContentLoader, LoadOptions, question_path};
pub use section_id::section_id_from_name;
pub use yaml::{LoadError, read_yaml};
