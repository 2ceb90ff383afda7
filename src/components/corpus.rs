//! Reads corrected training data back into labeled token sequences.
//!
//! Training data is inline XML as written by the parsers, e. g.
//! `<address><streetNumber>3</streetNumber> <streetName>rue Garibaldi</streetName></address>`.
//! Text outside of any field element is [OTHER] content.
use log::warn;
use roxmltree::{Document, Node};
use thiserror::Error;

use super::{training::TrainingSchema, Pipeline};
use crate::{
    label::{PrefixScheme, OTHER},
    tokenizer::Tokenizer,
    types::LayoutToken,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    #[error("no <{0}> element in the training data")]
    MissingWrapper(&'static str),
}

/// One entity of the training data: all of its tokens, and the labels of the content tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledSequence {
    pub tokens: Vec<LayoutToken>,
    pub labels: Vec<String>,
}

impl LabeledSequence {
    fn push_text<F>(&mut self, tokenizer: &Tokenizer, text: &str, labels: F)
    where
        F: FnOnce(usize) -> Vec<String>,
    {
        let offset = self.tokens.last().map_or(0, |x| x.offset + x.text.len());
        let tokens = tokenizer.tokenize(text);
        let n_content = tokens.iter().filter(|x| !x.is_separator()).count();

        self.tokens.extend(tokens.into_iter().map(|mut x| {
            x.offset += offset;
            x
        }));
        self.labels.extend(labels(n_content));
    }

    /// The labeled feature vectors of this sequence, used to train the model of the pipeline.
    pub fn features(&self, pipeline: &Pipeline) -> String {
        pipeline.features(&self.tokens, Some(self.labels.as_slice()))
    }
}

struct SequenceReader<'a> {
    schema: &'a TrainingSchema,
    tokenizer: &'a Tokenizer,
    scheme: PrefixScheme,
}

impl<'a> SequenceReader<'a> {
    fn read(&self, parent: Node) -> LabeledSequence {
        let mut sequence = LabeledSequence::default();

        for child in parent.children() {
            if child.is_text() {
                let text = child.text().unwrap_or("");
                sequence.push_text(self.tokenizer, text, |n| {
                    self.scheme.label_field(OTHER, n)
                });
            } else if child.is_element() {
                let element = child.tag_name().name();
                let label = match self.schema.field_for_element(element, child.attribute("type")) {
                    Some(field) => field.label,
                    None => {
                        warn!("no field is written as <{}>, reading it as other", element);
                        OTHER
                    }
                };

                let text: String = child
                    .descendants()
                    .filter(|x| x.is_text())
                    .filter_map(|x| x.text())
                    .collect();
                sequence.push_text(self.tokenizer, &text, |n| self.scheme.label_field(label, n));
            }
        }

        sequence
    }
}

/// Reads a fragment of training data. Returns one sequence per entity element of the schema or,
/// for schemas without such an element, one sequence for the whole fragment.
pub fn read_fragment(
    schema: &TrainingSchema,
    xml: &str,
    tokenizer: &Tokenizer,
    scheme: PrefixScheme,
) -> Result<Vec<LabeledSequence>, Error> {
    let xml = format!("<corpus>{}</corpus>", xml);
    let document = Document::parse(&xml)?;
    let reader = SequenceReader {
        schema,
        tokenizer,
        scheme,
    };

    let root = document.root_element();
    match &schema.wrapper {
        Some(wrapper) => {
            let sequences: Vec<_> = root
                .descendants()
                .filter(|x| x.is_element() && x.tag_name().name() == wrapper.element)
                .map(|x| reader.read(x))
                .collect();

            if sequences.is_empty() && root.has_children() {
                return Err(Error::MissingWrapper(wrapper.element));
            }
            Ok(sequences)
        }
        None => Ok(vec![reader.read(root)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{address, dateline, organization, training::TrainingSerializer},
        tagger,
        types,
    };

    #[test]
    fn reads_fields_and_other_content() -> Result<(), Error> {
        let sequences = read_fragment(
            &address::TRAINING_SCHEMA,
            "<address><streetNumber>3</streetNumber> <streetName>rue Garibaldi</streetName>, \
             <postCode>69003</postCode> <city>Lyon</city></address>\n",
            &Tokenizer::default(),
            PrefixScheme::Inside,
        )?;

        assert_eq!(sequences.len(), 1);
        assert_eq!(types::to_text(&sequences[0].tokens), "3 rue Garibaldi, 69003 Lyon");
        assert_eq!(
            sequences[0].labels,
            vec![
                "I-<streetnumber>",
                "I-<streetname>",
                "<streetname>",
                "I-<other>",
                "I-<postcode>",
                "I-<city>"
            ]
        );
        Ok(())
    }

    #[test]
    fn reads_typed_elements() -> Result<(), Error> {
        let sequences = read_fragment(
            &organization::TRAINING_SCHEMA,
            "<orgName type=\"chu\">CHU</orgName> <orgName type=\"service\">Cardiologie</orgName> \
             <orgName type=\"unknown\">X</orgName>\n",
            &Tokenizer::default(),
            PrefixScheme::Inside,
        )?;

        assert_eq!(sequences.len(), 1);
        // an unknown type falls back to the first orgName field
        assert_eq!(sequences[0].labels, vec!["I-<chu>", "I-<service>", "I-<ghu>"]);
        Ok(())
    }

    #[test]
    fn unknown_elements_are_other() -> Result<(), Error> {
        let sequences = read_fragment(
            &address::TRAINING_SCHEMA,
            "<address><city>Lyon</city> <bogus>cedex</bogus></address>",
            &Tokenizer::default(),
            PrefixScheme::BeginInside,
        )?;

        assert_eq!(sequences[0].labels, vec!["B-<city>", "O"]);
        Ok(())
    }

    #[test]
    fn missing_wrapper_is_an_error() {
        assert!(matches!(
            read_fragment(
                &address::TRAINING_SCHEMA,
                "<city>Lyon</city>",
                &Tokenizer::default(),
                PrefixScheme::Inside
            ),
            Err(Error::MissingWrapper("address"))
        ));
        assert!(matches!(
            read_fragment(
                &address::TRAINING_SCHEMA,
                "<address>",
                &Tokenizer::default(),
                PrefixScheme::Inside
            ),
            Err(Error::Xml(_))
        ));
    }

    #[test]
    fn reads_back_serialized_units() -> Result<(), Error> {
        let tokenizer = Tokenizer::default();
        let text = "Lyon, le 12 mars 2021";
        let labels = vec!["I-<place>", "I-<other>", "<other>", "I-<date>", "<date>", "<date>"];

        let tokens = tokenizer.tokenize(text);
        let features: String = tokens
            .iter()
            .filter(|x| !x.is_separator())
            .map(|x| format!("{}\n", x.surface()))
            .collect();
        let mut xml = String::new();
        TrainingSerializer::new(&dateline::TRAINING_SCHEMA, PrefixScheme::Inside, None)
            .serialize_unit(&tagger::with_labels(&features, labels.clone()), &tokens, &mut xml);

        let sequences =
            read_fragment(&dateline::TRAINING_SCHEMA, &xml, &tokenizer, PrefixScheme::Inside)?;
        assert_eq!(sequences.len(), 1);
        assert_eq!(types::to_text(&sequences[0].tokens), text);
        assert_eq!(sequences[0].labels, labels);
        Ok(())
    }
}
