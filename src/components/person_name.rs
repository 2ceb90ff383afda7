//! Person names, e. g. `Pr Jean-Paul Martin (PU-PH)`.
use std::{fmt, sync::Arc};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    impl_field_parse,
    record::{self, FieldTokens, Record},
    training::{FieldTag, TrainingSchema, Wrapper},
    Model, Pipeline,
};
use crate::{tagger::Tagger, types::LayoutToken, utils, Error};

labels! {
    pub enum PersonNameLabel {
        Forename => "<forename>",
        Other => "<other>",
        MiddleName => "<middlename>",
        Surname => "<surname>",
        Title => "<title>",
        Suffix => "<suffix>",
    }
}

pub static TRAINING_SCHEMA: TrainingSchema = TrainingSchema {
    fields: &[
        FieldTag::new(PersonNameLabel::Forename.as_str(), "forename"),
        FieldTag::other(),
        FieldTag::new(PersonNameLabel::MiddleName.as_str(), "middlename"),
        FieldTag::new(PersonNameLabel::Surname.as_str(), "surname"),
        FieldTag::new(PersonNameLabel::Title.as_str(), "title"),
        FieldTag::new(PersonNameLabel::Suffix.as_str(), "suffix"),
    ],
    wrapper: Some(Wrapper {
        element: "name",
        indent: false,
    }),
    multiple_per_unit: false,
};

fn strip_parentheses(value: &str) -> &str {
    let value = value.strip_prefix('(').unwrap_or(value);
    value.strip_suffix(')').unwrap_or(value)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonName {
    pub title: Option<String>,
    pub forename: Option<String>,
    pub middlename: Option<String>,
    pub surname: Option<String>,
    pub suffix: Option<String>,
    #[serde(skip)]
    pub tokens: FieldTokens,
}

impl PersonName {
    /// Sets the title without its enclosing parentheses, e. g. `(Dr)` becomes `Dr`.
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(strip_parentheses(title).to_string());
    }

    /// Sets the suffix without its enclosing parentheses.
    pub fn set_suffix(&mut self, suffix: &str) {
        self.suffix = Some(strip_parentheses(suffix).to_string());
    }

    fn field_mut(&mut self, label: PersonNameLabel) -> Option<&mut Option<String>> {
        Some(match label {
            PersonNameLabel::Forename => &mut self.forename,
            PersonNameLabel::MiddleName => &mut self.middlename,
            PersonNameLabel::Surname => &mut self.surname,
            PersonNameLabel::Title => &mut self.title,
            PersonNameLabel::Suffix => &mut self.suffix,
            PersonNameLabel::Other => return None,
        })
    }
}

impl Record for PersonName {
    fn is_not_null(&self) -> bool {
        [
            &self.title,
            &self.forename,
            &self.middlename,
            &self.surname,
            &self.suffix,
        ]
        .iter()
        .any(|x| x.is_some())
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = [
            &self.title,
            &self.forename,
            &self.middlename,
            &self.surname,
            &self.suffix,
        ]
        .iter()
        .filter_map(|x| x.as_deref())
        .filter(|x| !utils::is_blank(x))
        .join(" ");

        f.write_str(&name)
    }
}

#[derive(Debug, Clone)]
pub struct PersonNameParser {
    pipeline: Pipeline,
}

impl PersonNameParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(Model::PersonName, tagger))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        PersonNameParser { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Extracts the name of a text. Returns `None` for an empty text.
    pub fn process(&self, text: &str) -> Result<Option<PersonName>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn process_tokens(&self, tokens: &[LayoutToken]) -> Result<Option<PersonName>, Error> {
        self.pipeline
            .process_tokens(tokens, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn result_extraction(
        &self,
        labels: &str,
        tokens: &[LayoutToken],
    ) -> Result<PersonName, Error> {
        let mut name = PersonName::default();

        for cluster in self.pipeline.clusters(labels, tokens)? {
            let content = self.pipeline.cluster_content(&cluster);
            if content.is_empty() {
                continue;
            }

            let label: PersonNameLabel = match cluster.label().parse() {
                Ok(label) => label,
                Err(error) => {
                    debug!("{}", error);
                    continue;
                }
            };

            let content = match label {
                PersonNameLabel::Title | PersonNameLabel::Suffix => strip_parentheses(&content),
                _ => content.as_str(),
            };

            if let Some(field) = name.field_mut(label) {
                record::append(field, content);
                name.tokens.push(label.as_str(), cluster.tokens());
                self.pipeline.count(label.as_str());
            }
        }

        Ok(name)
    }

    pub fn training_extraction(&self, inputs: &[&str]) -> Result<Option<String>, Error> {
        self.pipeline.training(&TRAINING_SCHEMA, inputs, None)
    }

    pub fn training_extraction_anonym(
        &self,
        inputs: &[&str],
        original: &[String],
        anonymized: &[String],
    ) -> Result<Option<String>, Error> {
        let anonymizer = self.pipeline.anonymizer(original, anonymized);
        self.pipeline
            .training(&TRAINING_SCHEMA, inputs, Some(&anonymizer))
    }
}

impl_field_parse!(
    PersonNameParser,
    crate::components::Model::PersonName,
    PersonName
);
