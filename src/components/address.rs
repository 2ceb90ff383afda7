//! Postal addresses.
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    impl_field_parse,
    record::{self, FieldTokens, Record},
    training::{FieldTag, TrainingSchema, Wrapper},
    Model, Pipeline,
};
use crate::{tagger::Tagger, types::LayoutToken, Error};

labels! {
    pub enum AddressLabel {
        StreetNumber => "<streetnumber>",
        Other => "<other>",
        StreetName => "<streetname>",
        BuildingNumber => "<buildingnumber>",
        BuildingName => "<buildingname>",
        City => "<city>",
        PostCode => "<postcode>",
        PoBox => "<pobox>",
        Community => "<community>",
        District => "<district>",
        DepartmentNumber => "<departmentnumber>",
        DepartmentName => "<departmentname>",
        Region => "<region>",
        Country => "<country>",
        Note => "<note>",
    }
}

pub static TRAINING_SCHEMA: TrainingSchema = TrainingSchema {
    fields: &[
        FieldTag::new(AddressLabel::StreetNumber.as_str(), "streetNumber"),
        FieldTag::other(),
        FieldTag::new(AddressLabel::StreetName.as_str(), "streetName"),
        FieldTag::new(AddressLabel::BuildingNumber.as_str(), "buildingNumber"),
        FieldTag::new(AddressLabel::BuildingName.as_str(), "buildingName"),
        FieldTag::new(AddressLabel::City.as_str(), "city"),
        FieldTag::new(AddressLabel::PostCode.as_str(), "postCode"),
        FieldTag::new(AddressLabel::PoBox.as_str(), "poBox"),
        FieldTag::new(AddressLabel::Community.as_str(), "community"),
        FieldTag::new(AddressLabel::District.as_str(), "district"),
        FieldTag::new(AddressLabel::DepartmentNumber.as_str(), "departmentNumber"),
        FieldTag::new(AddressLabel::DepartmentName.as_str(), "departmentName"),
        FieldTag::new(AddressLabel::Region.as_str(), "region"),
        FieldTag::new(AddressLabel::Country.as_str(), "country"),
        FieldTag::typed(AddressLabel::Note.as_str(), "note", "address"),
    ],
    wrapper: Some(Wrapper {
        element: "address",
        indent: false,
    }),
    multiple_per_unit: false,
};

/// A postal address. Fields seen several times hold all values separated by tabs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub building_number: Option<String>,
    pub building_name: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub po_box: Option<String>,
    pub community: Option<String>,
    pub district: Option<String>,
    pub department_number: Option<String>,
    pub department_name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub note: Option<String>,
    #[serde(skip)]
    pub tokens: FieldTokens,
}

impl Address {
    fn field_mut(&mut self, label: AddressLabel) -> Option<&mut Option<String>> {
        Some(match label {
            AddressLabel::StreetNumber => &mut self.street_number,
            AddressLabel::StreetName => &mut self.street_name,
            AddressLabel::BuildingNumber => &mut self.building_number,
            AddressLabel::BuildingName => &mut self.building_name,
            AddressLabel::City => &mut self.city,
            AddressLabel::PostCode => &mut self.post_code,
            AddressLabel::PoBox => &mut self.po_box,
            AddressLabel::Community => &mut self.community,
            AddressLabel::District => &mut self.district,
            AddressLabel::DepartmentNumber => &mut self.department_number,
            AddressLabel::DepartmentName => &mut self.department_name,
            AddressLabel::Region => &mut self.region,
            AddressLabel::Country => &mut self.country,
            AddressLabel::Note => &mut self.note,
            AddressLabel::Other => return None,
        })
    }
}

impl Record for Address {
    fn is_not_null(&self) -> bool {
        [
            &self.street_number,
            &self.street_name,
            &self.building_number,
            &self.building_name,
            &self.city,
            &self.post_code,
            &self.po_box,
            &self.community,
            &self.district,
            &self.department_number,
            &self.department_name,
            &self.region,
            &self.country,
            &self.note,
        ]
        .iter()
        .any(|x| x.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct AddressParser {
    pipeline: Pipeline,
}

impl AddressParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(Model::Address, tagger))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        AddressParser { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Extracts the address of a text. Returns `None` for an empty text.
    pub fn process(&self, text: &str) -> Result<Option<Address>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn process_tokens(&self, tokens: &[LayoutToken]) -> Result<Option<Address>, Error> {
        self.pipeline
            .process_tokens(tokens, |labels, tokens| self.result_extraction(labels, tokens))
    }

    /// Aggregates the labeled tokens into one address.
    pub fn result_extraction(&self, labels: &str, tokens: &[LayoutToken]) -> Result<Address, Error> {
        let mut address = Address::default();

        for cluster in self.pipeline.clusters(labels, tokens)? {
            let content = self.pipeline.cluster_content(&cluster);
            if content.is_empty() {
                continue;
            }

            let label: AddressLabel = match cluster.label().parse() {
                Ok(label) => label,
                Err(error) => {
                    debug!("{}", error);
                    continue;
                }
            };

            if let Some(field) = address.field_mut(label) {
                record::append(field, &content);
                address.tokens.push(label.as_str(), cluster.tokens());
                self.pipeline.count(label.as_str());
            }
        }

        Ok(address)
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

impl_field_parse!(AddressParser, crate::components::Model::Address, Address);
