//! Organizations of the hospital hierarchy, e. g. `GHU Paris`, `Service de cardiologie`.
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    impl_field_parse,
    record::{self, FieldTokens, Record},
    training::{FieldTag, TrainingSchema},
    Model, Pipeline,
};
use crate::{tagger::Tagger, types::LayoutToken, Error};

labels! {
    pub enum OrganizationLabel {
        Ghu => "<ghu>",
        Other => "<other>",
        Chu => "<chu>",
        Dmu => "<dmu>",
        Pole => "<pole>",
        Site => "<site>",
        Institution => "<institution>",
        University => "<university>",
        Hospital => "<hospital>",
        Center => "<center>",
        Service => "<service>",
        Department => "<department>",
        Unit => "<unit>",
        Organization => "<organization>",
        Address => "<address>",
        Country => "<country>",
        Settlement => "<settlement>",
        Email => "<email>",
        Phone => "<phone>",
        Fax => "<fax>",
        Web => "<web>",
        Note => "<note>",
    }
}

impl OrganizationLabel {
    /// Whether the label names a kind of organization rather than a contact field.
    pub fn is_org_name(&self) -> bool {
        matches!(
            self,
            OrganizationLabel::Ghu
                | OrganizationLabel::Chu
                | OrganizationLabel::Dmu
                | OrganizationLabel::Pole
                | OrganizationLabel::Site
                | OrganizationLabel::Institution
                | OrganizationLabel::University
                | OrganizationLabel::Hospital
                | OrganizationLabel::Center
                | OrganizationLabel::Service
                | OrganizationLabel::Department
                | OrganizationLabel::Unit
                | OrganizationLabel::Organization
        )
    }
}

pub static TRAINING_SCHEMA: TrainingSchema = TrainingSchema {
    fields: &[
        FieldTag::typed(OrganizationLabel::Ghu.as_str(), "orgName", "ghu"),
        FieldTag::other(),
        FieldTag::typed(OrganizationLabel::Chu.as_str(), "orgName", "chu"),
        FieldTag::typed(OrganizationLabel::Dmu.as_str(), "orgName", "dmu"),
        FieldTag::typed(OrganizationLabel::Pole.as_str(), "orgName", "pole"),
        FieldTag::typed(OrganizationLabel::Site.as_str(), "orgName", "site"),
        FieldTag::typed(OrganizationLabel::Institution.as_str(), "orgName", "institution"),
        FieldTag::typed(OrganizationLabel::University.as_str(), "orgName", "university"),
        FieldTag::typed(OrganizationLabel::Hospital.as_str(), "orgName", "hospital"),
        FieldTag::typed(OrganizationLabel::Center.as_str(), "orgName", "center"),
        FieldTag::typed(OrganizationLabel::Service.as_str(), "orgName", "service"),
        FieldTag::typed(OrganizationLabel::Department.as_str(), "orgName", "department"),
        FieldTag::typed(OrganizationLabel::Unit.as_str(), "orgName", "unit"),
        FieldTag::typed(OrganizationLabel::Organization.as_str(), "orgName", "other"),
        FieldTag::new(OrganizationLabel::Address.as_str(), "address"),
        FieldTag::new(OrganizationLabel::Country.as_str(), "country"),
        FieldTag::new(OrganizationLabel::Settlement.as_str(), "settlement"),
        FieldTag::new(OrganizationLabel::Email.as_str(), "email"),
        FieldTag::new(OrganizationLabel::Phone.as_str(), "phone"),
        FieldTag::new(OrganizationLabel::Fax.as_str(), "fax"),
        FieldTag::typed(OrganizationLabel::Web.as_str(), "ptr", "web"),
        FieldTag::typed(OrganizationLabel::Note.as_str(), "note", "organization"),
    ],
    wrapper: None,
    multiple_per_unit: false,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub org_name: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub web: Option<String>,
    pub note: Option<String>,
    #[serde(skip)]
    pub tokens: FieldTokens,
}

impl Organization {
    fn field_mut(&mut self, label: OrganizationLabel) -> Option<&mut Option<String>> {
        Some(match label {
            OrganizationLabel::Other => return None,
            OrganizationLabel::Address => &mut self.address,
            OrganizationLabel::Country => &mut self.country,
            OrganizationLabel::Settlement => &mut self.town,
            OrganizationLabel::Email => &mut self.email,
            OrganizationLabel::Phone => &mut self.phone,
            OrganizationLabel::Fax => &mut self.fax,
            OrganizationLabel::Web => &mut self.web,
            OrganizationLabel::Note => &mut self.note,
            OrganizationLabel::Ghu
            | OrganizationLabel::Chu
            | OrganizationLabel::Dmu
            | OrganizationLabel::Pole
            | OrganizationLabel::Site
            | OrganizationLabel::Institution
            | OrganizationLabel::University
            | OrganizationLabel::Hospital
            | OrganizationLabel::Center
            | OrganizationLabel::Service
            | OrganizationLabel::Department
            | OrganizationLabel::Unit
            | OrganizationLabel::Organization => &mut self.org_name,
        })
    }
}

impl Record for Organization {
    fn is_not_null(&self) -> bool {
        [
            &self.org_name,
            &self.address,
            &self.country,
            &self.town,
            &self.phone,
            &self.fax,
            &self.email,
            &self.web,
            &self.note,
        ]
        .iter()
        .any(|x| x.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationParser {
    pipeline: Pipeline,
}

impl OrganizationParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(Model::Organization, tagger))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        OrganizationParser { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Extracts the organization of a text. Returns `None` for an empty text.
    pub fn process(&self, text: &str) -> Result<Option<Vec<Organization>>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn process_tokens(
        &self,
        tokens: &[LayoutToken],
    ) -> Result<Option<Vec<Organization>>, Error> {
        self.pipeline
            .process_tokens(tokens, |labels, tokens| self.result_extraction(labels, tokens))
    }

    /// Aggregates all labeled tokens into one organization.
    ///
    /// The returned list holds the accumulated organization once per accepted cluster, each entry
    /// in its final state. Callers relying on the list length see one entry per field occurence.
    pub fn result_extraction(
        &self,
        labels: &str,
        tokens: &[LayoutToken],
    ) -> Result<Vec<Organization>, Error> {
        let mut organization = Organization::default();
        let mut occurences = 0;

        for cluster in self.pipeline.clusters(labels, tokens)? {
            let content = self.pipeline.cluster_content(&cluster);
            if content.is_empty() {
                continue;
            }

            let label: OrganizationLabel = match cluster.label().parse() {
                Ok(label) => label,
                Err(error) => {
                    debug!("{}", error);
                    continue;
                }
            };

            if let Some(field) = organization.field_mut(label) {
                record::append(field, &content);
                organization.tokens.push(label.as_str(), cluster.tokens());
                self.pipeline.count(label.as_str());
                occurences += 1;
            }
        }

        // NOTE: entries alias one record, kept for callers counting occurences
        Ok(vec![organization; occurences])
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
    OrganizationParser,
    crate::components::Model::Organization,
    Organizations
);
