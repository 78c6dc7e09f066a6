//! A filesystem backed source of questionnaire content
//!
//! The [`ContentLoader`] reads a manifest of sections and a directory of
//! question files once, and hands out independent [`ContentBuilder`]s over
//! the result.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::Mutex,
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::instrument;

use crate::{
    domain::{
        Config, ContentBuilder, Question, Section,
        scalar::{lenient_optional_string, lenient_string},
    },
    storage::{
        section_id::section_id_from_name,
        yaml::{LoadError, read_yaml},
    },
};

/// Options controlling how content files are located and read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File extension of question files, without the dot.
    pub extension: String,
    /// Whether a missing file is an error rather than an empty document.
    pub strict: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extension: "yml".to_string(),
            strict: false,
        }
    }
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            extension: config.extension().to_string(),
            strict: config.strict,
        }
    }
}

/// A section as written in the manifest: questions are referenced by id.
#[derive(Debug, Default, Deserialize)]
struct SectionDefinition {
    #[serde(default, deserialize_with = "lenient_optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default)]
    editable: bool,
    #[serde(default)]
    questions: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Canonical content loaded from disk.
///
/// The loader is read-only once constructed, so it can be shared between
/// threads (for example behind an `Arc`). Callers wanting a filtered view ask
/// for their own builder with [`ContentLoader::get_builder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentLoader {
    sections: Vec<Section>,
    questions: BTreeMap<String, Question>,
    missing: Vec<PathBuf>,
}

impl ContentLoader {
    /// Loads the manifest at `manifest` and the questions it references from
    /// `questions_dir`, using the default [`LoadOptions`].
    ///
    /// Missing files are loaded as empty documents and reported through
    /// [`missing_files`](Self::missing_files).
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load(manifest: &Path, questions_dir: &Path) -> Result<Self, LoadError> {
        Self::with_options(manifest, questions_dir, &LoadOptions::default())
    }

    /// Loads content using paths and options from a [`Config`], resolving
    /// relative paths against `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or, in
    /// strict mode, if a file is missing.
    pub fn from_config(root: &Path, config: &Config) -> Result<Self, LoadError> {
        Self::with_options(
            &config.manifest_path(root),
            &config.questions_dir(root),
            &LoadOptions::from(config),
        )
    }

    /// Loads content with explicit options.
    ///
    /// Each referenced question file is read once, even if several sections
    /// reference it. Question files are read in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or, in
    /// strict mode, if a file is missing.
    #[instrument(level = "debug", skip(options), fields(strict = options.strict))]
    pub fn with_options(
        manifest: &Path,
        questions_dir: &Path,
        options: &LoadOptions,
    ) -> Result<Self, LoadError> {
        let missing = Mutex::new(Vec::new());

        let definitions: Vec<SectionDefinition> = read_lenient(manifest, options, &missing)?;

        let ids: BTreeSet<&str> = definitions
            .iter()
            .flat_map(|section| section.questions.iter().map(String::as_str))
            .collect();
        let ids: Vec<&str> = ids.into_iter().collect();

        let questions: BTreeMap<String, Question> = ids
            .par_iter()
            .map(|&id| {
                let path = question_path(questions_dir, id, &options.extension);
                let mut question: Question = read_lenient(&path, options, &missing)?;
                question.id = id.to_string();
                Ok((id.to_string(), question))
            })
            .collect::<Result<_, LoadError>>()?;

        let sections = definitions
            .into_iter()
            .map(|definition| populate_section(definition, &questions))
            .collect::<Vec<_>>();

        let mut missing = missing
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        missing.sort();

        tracing::info!(
            sections = sections.len(),
            questions = questions.len(),
            missing = missing.len(),
            "Loaded content from {}",
            manifest.display()
        );

        Ok(Self {
            sections,
            questions,
            missing,
        })
    }

    /// Returns a copy of the question with the given id, if it was loaded.
    ///
    /// The copy is owned by the caller; changing it does not affect the
    /// loader.
    #[must_use]
    pub fn get_question(&self, id: &str) -> Option<Question> {
        self.questions.get(id).cloned()
    }

    /// Returns a new builder over a copy of the loaded sections.
    ///
    /// Every call returns an independent builder.
    #[must_use]
    pub fn get_builder(&self) -> ContentBuilder {
        ContentBuilder::from(self.sections.as_slice())
    }

    /// The loaded sections, with questions inlined, in manifest order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All loaded questions, keyed by id.
    #[must_use]
    pub const fn questions(&self) -> &BTreeMap<String, Question> {
        &self.questions
    }

    /// Files that were absent at load time and treated as empty documents.
    #[must_use]
    pub fn missing_files(&self) -> &[PathBuf] {
        &self.missing
    }
}

/// The path of the definition file for question `id`.
#[must_use]
pub fn question_path(questions_dir: &Path, id: &str, extension: &str) -> PathBuf {
    questions_dir.join(format!("{id}.{extension}"))
}

fn read_lenient<T>(
    path: &Path,
    options: &LoadOptions,
    missing: &Mutex<Vec<PathBuf>>,
) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match read_yaml(path) {
        Ok(document) => {
            tracing::debug!("Loaded {}", path.display());
            Ok(document)
        }
        Err(LoadError::NotFound { path }) if !options.strict => {
            tracing::warn!(
                "Content file {} not found, using an empty document",
                path.display()
            );
            missing
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(path);
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

fn populate_section(
    definition: SectionDefinition,
    questions: &BTreeMap<String, Question>,
) -> Section {
    let SectionDefinition {
        id,
        name,
        editable,
        questions: references,
        extra,
    } = definition;

    let id = id.unwrap_or_else(|| section_id_from_name(&name));

    let questions = references
        .iter()
        .filter_map(|reference| questions.get(reference).cloned())
        .collect();

    Section {
        id,
        name,
        editable,
        questions,
        extra,
    }
}
