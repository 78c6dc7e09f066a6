use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::domain::{Question, scalar::lenient_string};

/// A named, ordered group of questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the section.
    pub id: String,

    /// Display label. Any scalar is accepted as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Whether the section can be edited once completed.
    #[serde(default)]
    pub editable: bool,

    /// The questions in the section, in display order.
    #[serde(default)]
    pub questions: Vec<Question>,

    /// Any other fields present in the definition.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Section {
    /// Creates a non-editable section with the given questions.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            questions,
            ..Self::default()
        }
    }

    /// Returns the section with its `editable` flag set.
    #[must_use]
    pub const fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Looks up a question in this section by id.
    #[must_use]
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }
}
