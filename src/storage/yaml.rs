use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

/// Errors that can occur when reading a YAML content file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("content file not found: {}", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },
    /// An I/O error occurred.
    #[error("failed to read content file {}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid YAML for the expected document.
    #[error("failed to parse content file {}", path.display())]
    Yaml {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads and parses a YAML file.
///
/// A file that exists but is empty (or holds only whitespace or comments)
/// yields `T::default()`.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if there is no file at `path`, and an I/O or
/// YAML error if it cannot be read or parsed.
pub fn read_yaml<T>(path: &Path) -> Result<T, LoadError>
where
    T: DeserializeOwned + Default,
{
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    if value.is_null() {
        return Ok(T::default());
    }

    serde_yaml::from_value(value).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
