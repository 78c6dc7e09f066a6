use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a content directory.
///
/// Describes where the manifest and question files live, relative to the
/// content root, and how strictly missing files are treated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Path of the manifest listing the sections.
    ///
    /// Relative paths are resolved against the content root.
    pub manifest: PathBuf,

    /// Directory holding one definition file per question.
    ///
    /// Relative paths are resolved against the content root.
    pub questions: PathBuf,

    /// File extension of question definition files, without the dot.
    extension: String,

    /// Whether a missing manifest or question file is an error.
    ///
    /// When `false` (default): a missing file is loaded as an empty document
    /// and reported as a warning.
    /// When `true`: loading fails.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            questions: default_questions(),
            extension: default_extension(),
            strict: false,
        }
    }
}

/// Errors that can occur reading or writing a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file {}", path.display())]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this configuration.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// The configuration could not be serialized.
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the question file extension, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Sets the question file extension.
    ///
    /// A leading dot is stripped, so `".yaml"` and `"yaml"` are equivalent.
    pub fn set_extension(&mut self, extension: &str) {
        self.extension = extension.trim_start_matches('.').to_string();
    }

    /// The manifest path resolved against `root`.
    #[must_use]
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    /// The question directory resolved against `root`.
    #[must_use]
    pub fn questions_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.questions)
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("manifest.yml")
}

fn default_questions() -> PathBuf {
    PathBuf::from("questions")
}

fn default_extension() -> String {
    "yml".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_manifest")]
        manifest: PathBuf,

        #[serde(default = "default_questions")]
        questions: PathBuf,

        #[serde(default = "default_extension")]
        extension: String,

        #[serde(default)]
        strict: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                manifest,
                questions,
                extension,
                strict,
            } => {
                let mut config = Self {
                    manifest,
                    questions,
                    extension: String::new(),
                    strict,
                };
                config.set_extension(&extension);
                config
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            manifest: config.manifest,
            questions: config.questions,
            extension: config.extension,
            strict: config.strict,
        }
    }
}
