//! Datelines, e. g. `Lyon, le 12 mars 2021`.
use std::sync::Arc;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{
    impl_field_parse,
    record::{Record, SplitAccumulator},
    training::{FieldTag, TrainingSchema, Wrapper},
    Model, Pipeline,
};
use crate::{tagger::Tagger, types::LayoutToken, utils, Error};

labels! {
    pub enum DatelineLabel {
        Place => "<place>",
        Other => "<other>",
        Date => "<date>",
        Time => "<time>",
        Note => "<note>",
    }
}

pub static TRAINING_SCHEMA: TrainingSchema = TrainingSchema {
    fields: &[
        FieldTag::new(DatelineLabel::Place.as_str(), "placeName"),
        FieldTag::other(),
        FieldTag::new(DatelineLabel::Date.as_str(), "date"),
        FieldTag::new(DatelineLabel::Time.as_str(), "time"),
        FieldTag::typed(DatelineLabel::Note.as_str(), "note", "dateline"),
    ],
    wrapper: Some(Wrapper {
        element: "dateline",
        indent: true,
    }),
    multiple_per_unit: true,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dateline {
    pub place_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub note: Option<String>,
}

impl Record for Dateline {
    fn is_not_null(&self) -> bool {
        self.place_name.is_some() || self.date.is_some() || self.time.is_some() || self.note.is_some()
    }
}

impl Dateline {
    /// Keeps the datelines which have a date and writes the separators of their dates as `/`.
    pub fn sanity_check(datelines: Vec<Dateline>) -> Vec<Dateline> {
        lazy_static! {
            static ref SEPARATOR: Regex = Regex::new(r"\s*[.\s]\s*").unwrap();
        }

        datelines
            .into_iter()
            .filter(|x| utils::is_filled(&x.date))
            .map(|mut x| {
                x.date = x
                    .date
                    .map(|date| SEPARATOR.replace_all(date.trim(), "/").to_string());
                x
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct DatelineParser {
    pipeline: Pipeline,
}

impl DatelineParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(Model::Dateline, tagger))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        DatelineParser { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Extracts the datelines of a text. Returns `None` for an empty text.
    pub fn process(&self, text: &str) -> Result<Option<Vec<Dateline>>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn process_tokens(&self, tokens: &[LayoutToken]) -> Result<Option<Vec<Dateline>>, Error> {
        self.pipeline
            .process_tokens(tokens, |labels, tokens| self.result_extraction(labels, tokens))
    }

    /// Aggregates the labeled tokens into datelines. A field seen again starts a new dateline.
    pub fn result_extraction(
        &self,
        labels: &str,
        tokens: &[LayoutToken],
    ) -> Result<Vec<Dateline>, Error> {
        let mut datelines = SplitAccumulator::<Dateline>::new();

        for cluster in self.pipeline.clusters(labels, tokens)? {
            let content = self.pipeline.cluster_content(&cluster);
            if content.is_empty() {
                continue;
            }

            let label: DatelineLabel = match cluster.label().parse() {
                Ok(label) => label,
                Err(error) => {
                    debug!("{}", error);
                    continue;
                }
            };

            match label {
                DatelineLabel::Place => datelines.set(&content, |x| &mut x.place_name),
                DatelineLabel::Date => datelines.set(&content, |x| &mut x.date),
                DatelineLabel::Time => datelines.set(&content, |x| &mut x.time),
                DatelineLabel::Note => datelines.set(&content, |x| &mut x.note),
                DatelineLabel::Other => continue,
            }
            self.pipeline.count(label.as_str());
        }

        Ok(datelines.finish())
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

impl_field_parse!(DatelineParser, crate::components::Model::Dateline, Datelines);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::{self, ReplayTagger};

    fn parser(labels: Vec<&str>) -> DatelineParser {
        DatelineParser::new(Arc::new(ReplayTagger::new(labels)))
    }

    #[test]
    fn extracts_dateline() -> Result<(), Error> {
        let parser = parser(vec![
            "I-<place>",
            "I-<other>",
            "I-<other>",
            "I-<date>",
            "<date>",
            "<date>",
        ]);

        let datelines = parser.process("Lyon, le 12 mars 2021")?.expect("text is not empty");
        assert_eq!(
            datelines,
            vec![Dateline {
                place_name: Some("Lyon".into()),
                date: Some("12 mars 2021".into()),
                time: None,
                note: None,
            }]
        );
        Ok(())
    }

    #[test]
    fn repeated_place_starts_new_dateline() -> Result<(), Error> {
        let parser = parser(vec!["I-<place>", "I-<place>"]);

        let datelines = parser.process("Lyon Paris")?.expect("text is not empty");
        assert_eq!(datelines.len(), 2);
        assert_eq!(datelines[0].place_name.as_deref(), Some("Lyon"));
        assert_eq!(datelines[0].date, None);
        assert_eq!(datelines[1].place_name.as_deref(), Some("Paris"));
        Ok(())
    }

    #[test]
    fn checks_dates() {
        let datelines = Dateline::sanity_check(vec![
            Dateline {
                place_name: Some("Lyon".into()),
                ..Dateline::default()
            },
            Dateline {
                date: Some("12.03 2021".into()),
                ..Dateline::default()
            },
        ]);

        assert_eq!(datelines.len(), 1);
        assert_eq!(datelines[0].date.as_deref(), Some("12/03/2021"));
    }

    #[test]
    fn writes_one_element_per_dateline() -> Result<(), Error> {
        // one empty line after the first dateline, as emitted by the model
        let model = |features: &str| -> Result<String, tagger::Error> {
            let labeled = tagger::with_labels(features, vec!["I-<place>", "I-<date>", "I-<place>"]);
            let mut lines: Vec<&str> = labeled.lines().collect();
            lines.insert(2, "");
            Ok(lines.join("\n"))
        };
        let parser = DatelineParser::new(Arc::new(model));

        assert_eq!(
            parser.training_extraction(&["Lyon 2021 Paris"])?.as_deref(),
            Some(
                "\t<dateline><placeName>Lyon</placeName> <date>2021</date></dateline>\n\
                 \t<dateline> <placeName>Paris</placeName></dateline>\n"
            )
        );
        Ok(())
    }
}
