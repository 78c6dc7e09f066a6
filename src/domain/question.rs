use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::domain::{Context, Dependency, dependency::MissingKeyError, scalar::lenient_string};

/// A single content item, such as a form field.
///
/// Beyond the fields the filter engine understands, a question carries any
/// number of free-form fields which are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier of the question.
    ///
    /// When a question is loaded from disk this is always the key it was
    /// referenced by, regardless of any `id` field in the file. Any scalar is
    /// accepted as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Display label. Any scalar is accepted as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Visibility rules. All of them must hold for the question to be shown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<Dependency>,

    /// Any other fields present in the definition.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Question {
    /// Creates a question with no dependencies and no extra fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the question with an additional dependency rule.
    #[must_use]
    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.depends.push(dependency);
        self
    }

    /// Returns the question with an additional free-form field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the question is visible under `context`.
    ///
    /// A question without dependencies is always visible.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the question's dependency rules is missing
    /// a required key.
    pub fn is_visible(&self, context: &Context) -> Result<bool, MissingKeyError> {
        // every rule is evaluated so a malformed one never hides behind a failing one
        let mut visible = true;
        for dependency in &self.depends {
            visible &= dependency.is_satisfied_by(context)?;
        }
        Ok(visible)
    }
}
