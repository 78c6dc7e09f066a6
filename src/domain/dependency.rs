use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use thiserror::Error;

use crate::domain::Context;

/// A visibility rule attached to a question.
///
/// The rule holds when the context has a value for [`on`](Self::on) and that
/// value is one of the values listed in [`being`](Self::being).
///
/// Both keys are optional at parse time so that a malformed rule in a content
/// file does not prevent the rest of the document from loading. A malformed
/// rule is reported when it is evaluated (see [`Dependency::is_satisfied_by`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The context key this rule inspects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,

    /// The accepted values.
    ///
    /// A scalar in the source document is normalised to a single-element
    /// list.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "one_or_many"
    )]
    pub being: Option<Vec<Value>>,
}

/// A required key of a dependency rule was absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency rule is missing required key '{0}'")]
pub struct MissingKeyError(pub &'static str);

impl Dependency {
    /// Creates a rule that holds when `on` takes any of the given values.
    #[must_use]
    pub fn new<I, V>(on: impl Into<String>, being: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            on: Some(on.into()),
            being: Some(being.into_iter().map(Into::into).collect()),
        }
    }

    /// Evaluates the rule against a context.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule has no `on` or no `being` key.
    pub fn is_satisfied_by(&self, context: &Context) -> Result<bool, MissingKeyError> {
        let on = self.on.as_deref().ok_or(MissingKeyError("on"))?;
        let being = self.being.as_deref().ok_or(MissingKeyError("being"))?;

        Ok(context
            .get(on)
            .is_some_and(|answer| being.contains(answer)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(OneOrMany::Many(values)) => values,
        Some(OneOrMany::One(value)) => vec![value],
    };
    Ok(Some(values))
}
