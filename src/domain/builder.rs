//! Filtered, navigable views over a list of sections
//!
//! The [`ContentBuilder`] knows nothing about the filesystem. It owns its
//! sections outright, so a builder can be filtered, inspected and thrown away
//! without affecting any other builder or the loader it came from.

use thiserror::Error;
use tracing::instrument;

use crate::domain::{Context, Question, Section};

/// An owned, ordered list of sections supporting filtering and navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBuilder {
    sections: Vec<Section>,
}

/// Errors that can occur when filtering content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A dependency rule on a question is missing a required key.
    #[error("question '{question}' has a dependency rule without '{key}'")]
    MissingKey {
        /// Id of the offending question.
        question: String,
        /// The absent key (`on` or `being`).
        key: &'static str,
    },
}

impl ContentBuilder {
    /// Creates a builder that takes ownership of `sections`.
    #[must_use]
    pub const fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// The current sections, in order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Consumes the builder, returning its sections.
    #[must_use]
    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    /// The number of sections currently in view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no sections are in view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterates over the current sections in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Returns a new builder holding only the questions visible under
    /// `context`.
    ///
    /// Question order is preserved. Sections left with no questions are
    /// dropped. Filtering an already filtered builder restricts it further;
    /// a question removed by an earlier filter never comes back.
    ///
    /// # Errors
    ///
    /// Returns an error if any question carries a dependency rule that is
    /// missing its `on` or `being` key.
    #[instrument(level = "debug", skip(self), fields(sections = self.sections.len()))]
    pub fn filter(&self, context: &Context) -> Result<Self, FilterError> {
        let mut sections = Vec::with_capacity(self.sections.len());

        for section in &self.sections {
            let questions = visible_questions(&section.questions, context)?;
            if questions.is_empty() {
                tracing::trace!(
                    section = %section.id,
                    "dropping section with no visible questions"
                );
                continue;
            }

            sections.push(Section {
                id: section.id.clone(),
                name: section.name.clone(),
                editable: section.editable,
                questions,
                extra: section.extra.clone(),
            });
        }

        tracing::debug!(remaining = sections.len(), "filtered content");
        Ok(Self { sections })
    }

    /// Returns the first section with the given id.
    #[must_use]
    pub fn get_section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Returns the id of the section following `current`.
    ///
    /// With no `current`, returns the id of the first section. Returns `None`
    /// if `current` is the last section or is not in view.
    #[must_use]
    pub fn get_next_section_id(&self, current: Option<&str>) -> Option<&str> {
        next_id(self.sections.iter(), current)
    }

    /// Like [`get_next_section_id`](Self::get_next_section_id), but only
    /// editable sections are candidates.
    ///
    /// `current` itself need not be editable.
    #[must_use]
    pub fn get_next_editable_section_id(&self, current: Option<&str>) -> Option<&str> {
        let start = match current {
            None => 0,
            Some(id) => self.position(id)? + 1,
        };

        self.sections[start..]
            .iter()
            .find(|section| section.editable)
            .map(|section| section.id.as_str())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }
}

fn visible_questions(
    questions: &[Question],
    context: &Context,
) -> Result<Vec<Question>, FilterError> {
    let mut visible = Vec::with_capacity(questions.len());
    for question in questions {
        let shown = question
            .is_visible(context)
            .map_err(|e| FilterError::MissingKey {
                question: question.id.clone(),
                key: e.0,
            })?;
        if shown {
            visible.push(question.clone());
        }
    }
    Ok(visible)
}

fn next_id<'a>(
    mut sections: impl Iterator<Item = &'a Section>,
    current: Option<&str>,
) -> Option<&'a str> {
    if let Some(current) = current {
        sections.find(|section| section.id == current)?;
    }
    sections.next().map(|section| section.id.as_str())
}

impl From<&[Section]> for ContentBuilder {
    fn from(sections: &[Section]) -> Self {
        Self::new(sections.to_vec())
    }
}

impl From<Vec<Section>> for ContentBuilder {
    fn from(sections: Vec<Section>) -> Self {
        Self::new(sections)
    }
}

impl FromIterator<Section> for ContentBuilder {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ContentBuilder {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ContentBuilder {
    type Item = Section;
    type IntoIter = std::vec::IntoIter<Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;
    use crate::domain::Dependency;

    fn lot(values: &[&str]) -> Dependency {
        Dependency::new("lot", values.iter().copied())
    }

    fn question(id: &str, lots: &[&str]) -> Question {
        Question::new(id, id).depends_on(lot(lots))
    }

    fn single_section(questions: Vec<Question>) -> ContentBuilder {
        ContentBuilder::new(vec![Section::new("first_section", "First section", questions)])
    }

    fn context(lot: &str) -> Context {
        Context::new().with("lot", lot)
    }

    fn navigation_fixture() -> ContentBuilder {
        let q = || vec![question("q", &["SCS", "SaaS", "PaaS"])];
        ContentBuilder::new(vec![
            Section::new("first_section", "First section", q()),
            Section::new("second_section", "Second section", q()),
            Section::new("third_section", "Third section", q()).editable(true),
        ])
    }

    fn question_ids(builder: &ContentBuilder) -> Vec<Vec<&str>> {
        builder
            .iter()
            .map(|s| s.questions.iter().map(|q| q.id.as_str()).collect())
            .collect()
    }

    #[test]
    fn empty_builder_has_no_sections() {
        let content = ContentBuilder::new(Vec::new());
        assert!(content.is_empty());
        assert!(content.sections().is_empty());
    }

    #[test]
    fn borrowed_sections_are_copied() {
        let mut sections = vec![Section::new("a", "A", vec![Question::new("q", "Q")])];
        let content = ContentBuilder::from(sections.as_slice());

        sections[0].questions.clear();
        sections.push(Section::new("b", "B", Vec::new()));

        assert_eq!(content.len(), 1);
        assert_eq!(content.sections()[0].questions.len(), 1);
    }

    #[test]
    fn iteration_is_ordered_and_restartable() {
        let content = navigation_fixture();

        let first: Vec<_> = content.iter().map(|s| s.id.as_str()).collect();
        let second: Vec<_> = (&content).into_iter().map(|s| s.id.as_str()).collect();

        assert_eq!(first, ["first_section", "second_section", "third_section"]);
        assert_eq!(first, second);
    }

    #[test]
    fn matching_dependency_keeps_section() {
        let content = single_section(vec![question("q1", &["SCS"])])
            .filter(&context("SCS"))
            .unwrap();
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn undefined_context_key_drops_question() {
        let content = single_section(vec![question("q1", &["SCS"])])
            .filter(&Context::new())
            .unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn question_without_dependencies_survives_any_context() {
        let content = single_section(vec![Question::new("q1", "First question")]);

        assert_eq!(content.filter(&context("SaaS")).unwrap().len(), 1);
        assert_eq!(content.filter(&Context::new()).unwrap().len(), 1);
    }

    #[test]
    fn non_matching_dependency_drops_section() {
        let content = single_section(vec![question("q1", &["SCS"])])
            .filter(&context("SaaS"))
            .unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn any_listed_value_is_accepted() {
        let content = single_section(vec![question("q1", &["SCS", "SaaS", "PaaS"])]);

        for lot in ["SaaS", "PaaS", "SCS"] {
            assert_eq!(content.filter(&context(lot)).unwrap().len(), 1, "{lot}");
        }
        assert!(content.filter(&context("IaaS")).unwrap().is_empty());
    }

    #[test]
    fn section_with_a_mixture_of_dependencies_is_kept() {
        let content = single_section(vec![
            question("q1", &["SCS", "SaaS", "PaaS"]),
            question("q2", &["IaaS"]),
        ])
        .filter(&context("IaaS"))
        .unwrap();

        assert_eq!(question_ids(&content), [["q2"]]);
    }

    #[test]
    fn filtering_leaves_the_source_untouched() {
        let content = single_section(vec![
            question("q1", &["SCS", "SaaS", "PaaS"]),
            question("q2", &["IaaS"]),
        ]);

        let filtered = content.filter(&context("IaaS")).unwrap();

        assert_eq!(content.sections()[0].questions.len(), 2);
        assert_eq!(filtered.sections()[0].questions.len(), 1);
    }

    #[test]
    fn filtered_questions_are_independent_copies() {
        let content = single_section(vec![question("q1", &["SaaS"])]);
        let mut filtered = content.filter(&context("SaaS")).unwrap().into_sections();

        filtered[0].questions[0].name = "changed".to_string();
        filtered[0].questions[0].depends.clear();
        filtered[0].questions[0]
            .extra
            .insert("hint".to_string(), Value::from("new"));

        let original = &content.sections()[0].questions[0];
        assert_eq!(original.name, "q1");
        assert_eq!(original.depends.len(), 1);
        assert!(original.extra.is_empty());
    }

    #[test]
    fn filtering_is_cumulative() {
        let content = single_section(vec![
            question("q1", &["SCS", "SaaS", "PaaS"]),
            question("q2", &["SCS", "IaaS"]),
            question("q3", &["SaaS", "IaaS"]),
        ]);

        let content = content.filter(&context("SCS")).unwrap();
        assert_eq!(question_ids(&content), [["q1", "q2"]]);

        let content = content.filter(&context("IaaS")).unwrap();
        assert_eq!(question_ids(&content), [["q2"]]);

        let content = content.filter(&context("PaaS")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn filtered_questions_keep_their_order() {
        let content = single_section(vec![
            question("q1", &["SaaS"]),
            Question::new("q2", "no deps"),
            question("q3", &["IaaS"]),
            question("q4", &["SaaS", "IaaS"]),
        ]);

        let filtered = content.filter(&context("SaaS")).unwrap();
        assert_eq!(question_ids(&filtered), [["q1", "q2", "q4"]]);
    }

    #[test]
    fn section_fields_are_carried_over() {
        let mut section = Section::new("s", "S", vec![Question::new("q", "Q")]).editable(true);
        section
            .extra
            .insert("description".to_string(), Value::from("about"));
        let content = ContentBuilder::new(vec![section.clone()]);

        let filtered = content.filter(&Context::new()).unwrap();
        assert_eq!(filtered.sections(), &[section]);
    }

    #[test]
    fn malformed_rule_fails_the_filter() {
        let broken = Question::new("broken", "Broken").depends_on(Dependency {
            on: Some("lot".to_string()),
            being: None,
        });
        let content = single_section(vec![Question::new("ok", "Ok"), broken]);

        assert_eq!(
            content.filter(&context("SaaS")),
            Err(FilterError::MissingKey {
                question: "broken".to_string(),
                key: "being",
            })
        );
    }

    #[test]
    fn get_section_finds_by_exact_id() {
        let content = single_section(vec![question("q1", &["SCS", "SaaS", "PaaS"])]);

        assert_eq!(
            content.get_section("first_section").map(|s| s.id.as_str()),
            Some("first_section")
        );
        assert!(content.get_section("first").is_none());

        let content = content.filter(&context("IaaS")).unwrap();
        assert!(content.get_section("first_section").is_none());
    }

    #[test]
    fn next_section_walks_in_order() {
        let content = navigation_fixture();

        assert_eq!(content.get_next_section_id(None), Some("first_section"));
        assert_eq!(
            content.get_next_section_id(Some("first_section")),
            Some("second_section")
        );
        assert_eq!(
            content.get_next_section_id(Some("second_section")),
            Some("third_section")
        );
        assert_eq!(content.get_next_section_id(Some("third_section")), None);
        assert_eq!(content.get_next_section_id(Some("missing")), None);
    }

    #[test]
    fn next_editable_section_skips_non_editable_sections() {
        let content = navigation_fixture();

        assert_eq!(
            content.get_next_editable_section_id(None),
            Some("third_section")
        );
        assert_eq!(
            content.get_next_editable_section_id(Some("first_section")),
            Some("third_section")
        );
        assert_eq!(
            content.get_next_editable_section_id(Some("second_section")),
            Some("third_section")
        );
        assert_eq!(
            content.get_next_editable_section_id(Some("third_section")),
            None
        );
        assert_eq!(content.get_next_editable_section_id(Some("missing")), None);
    }

    #[test]
    fn navigation_only_sees_visible_sections() {
        let content = ContentBuilder::new(vec![
            Section::new("a", "A", vec![question("qa", &["SaaS"])]),
            Section::new("b", "B", vec![question("qb", &["IaaS"])]),
            Section::new("c", "C", vec![Question::new("qc", "always")]),
        ])
        .filter(&context("SaaS"))
        .unwrap();

        assert_eq!(content.get_next_section_id(Some("a")), Some("c"));
        assert_eq!(content.get_next_section_id(Some("b")), None);
    }

    #[test]
    fn empty_builder_has_no_next_section() {
        let content = ContentBuilder::default();
        assert_eq!(content.get_next_section_id(None), None);
        assert_eq!(content.get_next_editable_section_id(None), None);
    }
}
