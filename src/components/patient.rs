//! Patients a report is about.
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    impl_field_parse,
    record::{Record, SplitAccumulator},
    training::{FieldTag, TrainingSchema, Wrapper},
    Model, Pipeline,
};
use crate::{tagger::Tagger, types::LayoutToken, Error};

labels! {
    pub enum PatientLabel {
        IdNo => "<idno>",
        Other => "<other>",
        IdType => "<idtype>",
        Sex => "<sex>",
        PersName => "<persname>",
        BirthDate => "<birthdate>",
        BirthPlace => "<birthplace>",
        Age => "<age>",
        Death => "<death>",
        Address => "<address>",
        Country => "<country>",
        Settlement => "<settlement>",
        Phone => "<phone>",
        Email => "<email>",
        Note => "<note>",
    }
}

pub static TRAINING_SCHEMA: TrainingSchema = TrainingSchema {
    fields: &[
        FieldTag::new(PatientLabel::IdNo.as_str(), "idno"),
        FieldTag::other(),
        FieldTag::new(PatientLabel::IdType.as_str(), "idType"),
        FieldTag::new(PatientLabel::Sex.as_str(), "sex"),
        FieldTag::new(PatientLabel::PersName.as_str(), "persName"),
        FieldTag::new(PatientLabel::BirthDate.as_str(), "birthDate"),
        FieldTag::new(PatientLabel::BirthPlace.as_str(), "birthPlace"),
        FieldTag::new(PatientLabel::Age.as_str(), "age"),
        FieldTag::new(PatientLabel::Death.as_str(), "death"),
        FieldTag::new(PatientLabel::Address.as_str(), "address"),
        FieldTag::new(PatientLabel::Country.as_str(), "country"),
        FieldTag::new(PatientLabel::Settlement.as_str(), "settlement"),
        FieldTag::new(PatientLabel::Phone.as_str(), "phone"),
        FieldTag::new(PatientLabel::Email.as_str(), "email"),
        FieldTag::typed(PatientLabel::Note.as_str(), "note", "patient"),
    ],
    wrapper: Some(Wrapper {
        element: "patient",
        indent: true,
    }),
    multiple_per_unit: false,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Option<String>,
    pub id_type: Option<String>,
    pub pers_name: Option<String>,
    pub sex: Option<String>,
    pub date_birth: Option<String>,
    pub place_birth: Option<String>,
    pub age: Option<String>,
    pub date_death: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,
}

impl Patient {
    fn field_mut(&mut self, label: PatientLabel) -> Option<&mut Option<String>> {
        Some(match label {
            PatientLabel::IdNo => &mut self.id,
            PatientLabel::IdType => &mut self.id_type,
            PatientLabel::Sex => &mut self.sex,
            PatientLabel::PersName => &mut self.pers_name,
            PatientLabel::BirthDate => &mut self.date_birth,
            PatientLabel::BirthPlace => &mut self.place_birth,
            PatientLabel::Age => &mut self.age,
            PatientLabel::Death => &mut self.date_death,
            PatientLabel::Address => &mut self.address,
            // earlier releases stored the country into address, it goes to country now
            PatientLabel::Country => &mut self.country,
            PatientLabel::Settlement => &mut self.town,
            PatientLabel::Phone => &mut self.phone,
            PatientLabel::Email => &mut self.email,
            PatientLabel::Note => &mut self.note,
            PatientLabel::Other => return None,
        })
    }
}

impl Record for Patient {
    fn is_not_null(&self) -> bool {
        [
            &self.id,
            &self.id_type,
            &self.pers_name,
            &self.sex,
            &self.date_birth,
            &self.place_birth,
            &self.age,
            &self.date_death,
            &self.address,
            &self.country,
            &self.town,
            &self.phone,
            &self.email,
            &self.note,
        ]
        .iter()
        .any(|x| x.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct PatientParser {
    pipeline: Pipeline,
}

impl PatientParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(Model::Patient, tagger))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        PatientParser { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Extracts the patients of a text. Returns `None` for an empty text.
    pub fn process(&self, text: &str) -> Result<Option<Vec<Patient>>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn process_tokens(&self, tokens: &[LayoutToken]) -> Result<Option<Vec<Patient>>, Error> {
        self.pipeline
            .process_tokens(tokens, |labels, tokens| self.result_extraction(labels, tokens))
    }

    /// Aggregates the labeled tokens into patients. A field seen again starts a new patient.
    pub fn result_extraction(
        &self,
        labels: &str,
        tokens: &[LayoutToken],
    ) -> Result<Vec<Patient>, Error> {
        let mut patients = SplitAccumulator::<Patient>::new();

        for cluster in self.pipeline.clusters(labels, tokens)? {
            let content = self.pipeline.cluster_content(&cluster);
            if content.is_empty() {
                continue;
            }

            let label: PatientLabel = match cluster.label().parse() {
                Ok(PatientLabel::Other) => continue,
                Ok(label) => label,
                Err(error) => {
                    debug!("{}", error);
                    continue;
                }
            };

            patients.set_field(&content, |x| x.field_mut(label));
            self.pipeline.count(label.as_str());
        }

        Ok(patients.finish())
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

impl_field_parse!(PatientParser, crate::components::Model::Patient, Patients);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::ReplayTagger;

    fn parser(labels: Vec<&str>) -> PatientParser {
        PatientParser::new(Arc::new(ReplayTagger::new(labels)))
    }

    #[test]
    fn extracts_patient() -> Result<(), Error> {
        let parser = parser(vec![
            "I-<persname>",
            "<persname>",
            "I-<other>",
            "<other>",
            "I-<birthdate>",
            "<birthdate>",
            "<birthdate>",
            "<birthdate>",
            "<birthdate>",
            "I-<country>",
        ]);

        let patients = parser
            .process("Marie Dupont née le 01/02/1950 France")?
            .expect("text is not empty");

        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].pers_name.as_deref(), Some("Marie Dupont"));
        assert_eq!(patients[0].date_birth.as_deref(), Some("01/02/1950"));
        assert_eq!(patients[0].country.as_deref(), Some("France"));
        assert_eq!(patients[0].address, None);
        Ok(())
    }

    #[test]
    fn repeated_name_starts_new_patient() -> Result<(), Error> {
        let parser = parser(vec!["I-<persname>", "I-<sex>", "I-<persname>"]);

        let patients = parser.process("Marie F Paul")?.expect("text is not empty");
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].sex.as_deref(), Some("F"));
        assert_eq!(patients[1].pers_name.as_deref(), Some("Paul"));
        Ok(())
    }

    #[test]
    fn writes_exact_anonymized_training_data() -> Result<(), Error> {
        let parser = parser(vec!["I-<persname>", "<persname>", "I-<idno>"]);

        assert_eq!(
            parser
                .training_extraction_anonym(
                    &["Marie Dupont 1234"],
                    &["Dupont".to_string(), "1234".to_string()],
                    &["Durand".to_string(), "9876".to_string()]
                )?
                .as_deref(),
            Some("\t<patient><persName>Marie Durand</persName> <idno>9876</idno></patient>\n")
        );
        Ok(())
    }
}
