use std::{
    fmt,
    io::{BufReader, Read, Write},
    path::Path,
    str::FromStr,
    sync::Arc,
};

use enum_dispatch::enum_dispatch;
use fs_err::File;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    cluster::{Cluster, Clusteror},
    config::ParserOptions,
    counter::{Counter, NoCounter},
    features::FeatureBuilder,
    lexicon::{Gazetteer, Lexicon},
    tagger::Tagger,
    tokenizer::Tokenizer,
    types::LayoutToken,
    utils, Error,
};

pub mod address;
pub mod corpus;
pub mod dateline;
pub mod medic;
pub mod organization;
pub mod patient;
pub mod person_name;
pub mod record;
pub mod training;

use address::{Address, AddressParser};
use dateline::{Dateline, DatelineParser};
use medic::{Medic, MedicParser};
use organization::{Organization, OrganizationParser};
use patient::{Patient, PatientParser};
use person_name::{PersonName, PersonNameParser};
use training::{Anonymizer, TrainingSchema, TrainingSerializer};

/// A component which can be stored in the bincode format.
pub trait Component: Serialize + DeserializeOwned {
    fn name() -> &'static str;

    fn new<P: AsRef<Path>>(p: P) -> Result<Self, crate::Error> {
        let reader = BufReader::new(File::open(p.as_ref())?);
        Ok(Self::from_reader(reader)?)
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, crate::Error> {
        Ok(bincode::deserialize_from(reader)?)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), crate::Error> {
        Ok(bincode::serialize_into(writer, self)?)
    }
}

/// The sequence labeling models, one per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    Address,
    Dateline,
    Medic,
    Organization,
    Patient,
    PersonName,
}

impl Model {
    pub const ALL: &'static [Model] = &[
        Model::Address,
        Model::Dateline,
        Model::Medic,
        Model::Organization,
        Model::Patient,
        Model::PersonName,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Model::Address => "address",
            Model::Dateline => "dateline",
            Model::Medic => "medic",
            Model::Organization => "organization",
            Model::Patient => "patient",
            Model::PersonName => "person_name",
        }
    }

    pub fn training_schema(&self) -> &'static TrainingSchema {
        match self {
            Model::Address => &address::TRAINING_SCHEMA,
            Model::Dateline => &dateline::TRAINING_SCHEMA,
            Model::Medic => &medic::TRAINING_SCHEMA,
            Model::Organization => &organization::TRAINING_SCHEMA,
            Model::Patient => &patient::TRAINING_SCHEMA,
            Model::PersonName => &person_name::TRAINING_SCHEMA,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .iter()
            .find(|x| x.name() == name)
            .copied()
            .ok_or_else(|| format!("unknown model '{}'", name))
    }
}

/// The plumbing shared by all parsers: text is tokenized, turned into feature vectors, labeled by
/// the tagger and the labeled tokens are grouped into clusters.
#[derive(Clone)]
pub struct Pipeline {
    model: Model,
    options: ParserOptions,
    tokenizer: Tokenizer,
    tagger: Arc<dyn Tagger>,
    lexicon: Arc<dyn Lexicon>,
    counter: Arc<dyn Counter>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.model)
            .field("options", &self.options)
            .field("tokenizer", &self.tokenizer)
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline with the compiled in options of the model, an empty gazetteer
    /// and no counter.
    pub fn new(model: Model, tagger: Arc<dyn Tagger>) -> Self {
        Pipeline {
            model,
            options: ParserOptions::for_model(model.name()),
            tokenizer: Tokenizer::default(),
            tagger,
            lexicon: Arc::new(Gazetteer::default()),
            counter: Arc::new(NoCounter),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_lexicon(mut self, lexicon: Arc<dyn Lexicon>) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_counter(mut self, counter: Arc<dyn Counter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn tokenize(&self, text: &str) -> Vec<LayoutToken> {
        self.tokenizer.tokenize(text)
    }

    /// Builds the feature vectors of the tokens, with labels if they are known.
    pub fn features(&self, tokens: &[LayoutToken], labels: Option<&[String]>) -> String {
        let builder = FeatureBuilder::new(self.options.lexicon_categories.clone());
        let positions = builder.positions(self.lexicon.as_ref(), tokens);
        builder.build(tokens, &positions, labels)
    }

    /// Labels the tokens with the tagger. Returns `None` if there is no content token.
    pub fn label(&self, tokens: &[LayoutToken]) -> Result<Option<String>, Error> {
        let features = self.features(tokens, None);
        if utils::is_blank(&features) {
            return Ok(None);
        }
        Ok(Some(self.tagger.label(&features)?))
    }

    pub fn clusters<'t>(
        &self,
        labels: &str,
        tokens: &'t [LayoutToken],
    ) -> Result<Vec<Cluster<'t>>, Error> {
        Ok(Clusteror::new(self.options.prefix_scheme).cluster(labels, tokens)?)
    }

    /// The whitespace normalized text of a cluster, dehyphenized if the model asks for it.
    pub fn cluster_content(&self, cluster: &Cluster) -> String {
        let text = cluster.text();
        if self.options.dehyphenize {
            utils::normalize_space(&utils::dehyphenize(&text))
        } else {
            utils::normalize_space(&text)
        }
    }

    pub(crate) fn count(&self, label: &str) {
        self.counter.increment(label);
    }

    /// Tokenizes and labels the text, then hands label stream and tokens to `extract`.
    /// Failures are wrapped into [Error::Processing].
    pub(crate) fn process_text<T, F>(&self, text: &str, extract: F) -> Result<Option<T>, Error>
    where
        F: FnOnce(&str, &[LayoutToken]) -> Result<T, Error>,
    {
        let tokens = self.tokenize(text);
        self.process_tokens(&tokens, extract)
    }

    pub(crate) fn process_tokens<T, F>(
        &self,
        tokens: &[LayoutToken],
        extract: F,
    ) -> Result<Option<T>, Error>
    where
        F: FnOnce(&str, &[LayoutToken]) -> Result<T, Error>,
    {
        if tokens.is_empty() {
            return Ok(None);
        }

        let labels = match self.label(tokens).map_err(Error::processing)? {
            Some(labels) => labels,
            None => return Ok(None),
        };
        extract(&labels, tokens).map(Some).map_err(Error::processing)
    }

    /// Writes the training data of all input units. Returns `None` if there is no input.
    pub fn training(
        &self,
        schema: &TrainingSchema,
        inputs: &[&str],
        anonymizer: Option<&Anonymizer>,
    ) -> Result<Option<String>, Error> {
        if inputs.is_empty() {
            return Ok(None);
        }

        let serializer = TrainingSerializer::new(schema, self.options.prefix_scheme, anonymizer);
        let mut out = String::new();

        for input in inputs {
            let tokens = self.tokenize(input);
            let labels = match self.label(&tokens).map_err(Error::processing)? {
                Some(labels) => labels,
                None => {
                    debug!("skipping {} input without content", self.model);
                    continue;
                }
            };
            serializer.serialize_unit(&labels, &tokens, &mut out);
        }

        Ok(Some(out))
    }

    pub(crate) fn anonymizer<S: AsRef<str>>(&self, original: &[S], anonymized: &[S]) -> Anonymizer {
        Anonymizer::new(original, anonymized, self.options.anonymization)
    }
}

/// The result of [FieldParse::extract], one variant per model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    Address(Option<Address>),
    Datelines(Option<Vec<Dateline>>),
    Medic(Option<Medic>),
    Organizations(Option<Vec<Organization>>),
    Patients(Option<Vec<Patient>>),
    PersonName(Option<PersonName>),
}

/// Operations every field parser supports, usable without knowing the concrete parser.
#[enum_dispatch]
pub trait FieldParse {
    fn model(&self) -> Model;

    /// Extracts the records of the model from the text.
    fn extract(&self, text: &str) -> Result<Extracted, Error>;

    /// Writes the label streams of the inputs as inline XML.
    fn training_extraction(&self, inputs: &[&str]) -> Result<Option<String>, Error>;

    /// Like [FieldParse::training_extraction], but replaces `original[i]` by `anonymized[i]`.
    fn training_extraction_anonym(
        &self,
        inputs: &[&str],
        original: &[String],
        anonymized: &[String],
    ) -> Result<Option<String>, Error>;
}

/// Any of the field parsers.
#[enum_dispatch(FieldParse)]
#[derive(Debug, Clone)]
pub enum FieldParser {
    AddressParser,
    DatelineParser,
    MedicParser,
    OrganizationParser,
    PatientParser,
    PersonNameParser,
}

impl FieldParser {
    /// Creates the parser of the model from a pipeline.
    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        match pipeline.model() {
            Model::Address => AddressParser::from_pipeline(pipeline).into(),
            Model::Dateline => DatelineParser::from_pipeline(pipeline).into(),
            Model::Medic => MedicParser::from_pipeline(pipeline).into(),
            Model::Organization => OrganizationParser::from_pipeline(pipeline).into(),
            Model::Patient => PatientParser::from_pipeline(pipeline).into(),
            Model::PersonName => PersonNameParser::from_pipeline(pipeline).into(),
        }
    }

    pub fn new(model: Model, tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(model, tagger))
    }
}

/// Implements [FieldParse] for a parser which has `process`, `training_extraction`
/// and `training_extraction_anonym` methods.
macro_rules! impl_field_parse {
    ($parser:ident, $model:expr, $variant:ident) => {
        impl crate::components::FieldParse for $parser {
            fn model(&self) -> crate::components::Model {
                $model
            }

            fn extract(
                &self,
                text: &str,
            ) -> Result<crate::components::Extracted, crate::Error> {
                Ok(crate::components::Extracted::$variant(self.process(text)?))
            }

            fn training_extraction(&self, inputs: &[&str]) -> Result<Option<String>, crate::Error> {
                $parser::training_extraction(self, inputs)
            }

            fn training_extraction_anonym(
                &self,
                inputs: &[&str],
                original: &[String],
                anonymized: &[String],
            ) -> Result<Option<String>, crate::Error> {
                $parser::training_extraction_anonym(self, inputs, original, anonymized)
            }
        }
    };
}

pub(crate) use impl_field_parse;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{counter::LabelCounts, tagger::ReplayTagger};

    #[test]
    fn parses_model_names() {
        for model in Model::ALL {
            assert_eq!(model.name().parse::<Model>(), Ok(*model));
        }
        assert!("header".parse::<Model>().is_err());
    }

    #[test]
    fn wraps_failures_once() {
        let tagger = ReplayTagger::new(vec!["I-<date>"]);
        let pipeline = Pipeline::new(Model::Dateline, Arc::new(tagger));

        let error = pipeline
            .process_text("12 mars", |_, _| Ok(()))
            .expect_err("two tokens but one label");
        assert!(matches!(&error, Error::Processing(cause) if matches!(**cause, Error::Tagger(_))));
        assert!(matches!(Error::processing(error), Error::Processing(cause) if !matches!(*cause, Error::Processing(_))));
    }

    #[test]
    fn empty_input_is_not_processed() -> Result<(), Error> {
        let pipeline = Pipeline::new(Model::Dateline, Arc::new(ReplayTagger::default()));

        assert_eq!(pipeline.process_text("", |_, _| Ok(()))?, None);
        assert_eq!(pipeline.process_text(" \n ", |_, _| Ok(()))?, None);
        assert_eq!(pipeline.training(&dateline::TRAINING_SCHEMA, &[], None)?, None);
        Ok(())
    }

    #[test]
    fn counts_are_injected() -> Result<(), Error> {
        let counts = Arc::new(LabelCounts::new());
        let tagger = ReplayTagger::new(vec!["I-<date>", "<date>", "I-<place>"]);
        let parser = DatelineParser::from_pipeline(
            Pipeline::new(Model::Dateline, Arc::new(tagger)).with_counter(counts.clone()),
        );

        parser.process("12 mars Lyon")?;
        assert_eq!(counts.get("<date>"), 1);
        assert_eq!(counts.get("<place>"), 1);
        Ok(())
    }

    #[test]
    fn dispatches_to_parsers() -> Result<(), Error> {
        let tagger = ReplayTagger::new(vec!["I-<forename>", "I-<surname>"]);
        let parser = FieldParser::new(Model::PersonName, Arc::new(tagger));

        assert_eq!(parser.model(), Model::PersonName);
        match parser.extract("Jane Smith")? {
            Extracted::PersonName(Some(name)) => {
                assert_eq!(name.forename.as_deref(), Some("Jane"));
                assert_eq!(name.surname.as_deref(), Some("Smith"));
            }
            other => panic!("unexpected extraction {:?}", other),
        }
        Ok(())
    }
}
