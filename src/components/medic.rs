//! The medics signing or receiving a report.
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    impl_field_parse,
    record::{self, FieldTokens, Record, SplitAccumulator},
    training::{FieldTag, TrainingSchema, Wrapper},
    Model, Pipeline,
};
use crate::{cluster::Cluster, tagger::Tagger, types::LayoutToken, utils, Error};

labels! {
    pub enum MedicLabel {
        RoleName => "<rolename>",
        Other => "<other>",
        PersName => "<persname>",
        Affiliation => "<affiliation>",
        Organisation => "<organisation>",
        Institution => "<institution>",
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

pub static TRAINING_SCHEMA: TrainingSchema = TrainingSchema {
    fields: &[
        FieldTag::new(MedicLabel::RoleName.as_str(), "roleName"),
        FieldTag::other(),
        FieldTag::new(MedicLabel::PersName.as_str(), "persName"),
        FieldTag::new(MedicLabel::Affiliation.as_str(), "affiliation"),
        FieldTag::new(MedicLabel::Organisation.as_str(), "orgName"),
        FieldTag::typed(MedicLabel::Institution.as_str(), "orgName", "institution"),
        FieldTag::new(MedicLabel::Address.as_str(), "address"),
        FieldTag::new(MedicLabel::Country.as_str(), "country"),
        FieldTag::new(MedicLabel::Settlement.as_str(), "settlement"),
        FieldTag::new(MedicLabel::Email.as_str(), "email"),
        FieldTag::new(MedicLabel::Phone.as_str(), "phone"),
        FieldTag::new(MedicLabel::Fax.as_str(), "fax"),
        FieldTag::typed(MedicLabel::Web.as_str(), "ptr", "web"),
        FieldTag::typed(MedicLabel::Note.as_str(), "note", "medic"),
    ],
    wrapper: Some(Wrapper {
        element: "medic",
        indent: true,
    }),
    multiple_per_unit: true,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medic {
    pub role: Option<String>,
    pub pers_name: Option<String>,
    pub affiliation: Option<String>,
    pub organisation: Option<String>,
    pub institution: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub town: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub web: Option<String>,
    pub note: Option<String>,
    #[serde(skip)]
    pub tokens: FieldTokens,
}

impl Medic {
    fn field_mut(&mut self, label: MedicLabel) -> Option<&mut Option<String>> {
        Some(match label {
            MedicLabel::RoleName => &mut self.role,
            MedicLabel::PersName => &mut self.pers_name,
            MedicLabel::Affiliation => &mut self.affiliation,
            MedicLabel::Organisation => &mut self.organisation,
            MedicLabel::Institution => &mut self.institution,
            MedicLabel::Address => &mut self.address,
            MedicLabel::Country => &mut self.country,
            MedicLabel::Settlement => &mut self.town,
            MedicLabel::Email => &mut self.email,
            MedicLabel::Phone => &mut self.phone,
            MedicLabel::Fax => &mut self.fax,
            MedicLabel::Web => &mut self.web,
            MedicLabel::Note => &mut self.note,
            MedicLabel::Other => return None,
        })
    }

    /// First and last word of the person name.
    fn first_last_name(&self) -> Option<(String, String)> {
        let name = self.pers_name.as_deref()?;
        let words: Vec<&str> = name.split_whitespace().collect();

        match words.as_slice() {
            [] => None,
            [last] => Some((String::new(), last.to_string())),
            [first, .., last] => Some((first.to_string(), last.to_string())),
        }
    }
}

impl Record for Medic {
    fn is_not_null(&self) -> bool {
        [
            &self.role,
            &self.pers_name,
            &self.affiliation,
            &self.organisation,
            &self.institution,
            &self.address,
            &self.country,
            &self.town,
            &self.email,
            &self.phone,
            &self.fax,
            &self.web,
            &self.note,
        ]
        .iter()
        .any(|x| x.is_some())
    }
}

/// Assigns e-mail addresses found in a report to the medics of the report.
pub trait EmailAssigner {
    fn assign(&self, medics: &mut [Medic], emails: &[String]);
}

/// Assigns by similarity between the local part of an address and the names of the medics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicEmailAssigner;

impl ClassicEmailAssigner {
    fn variants(first: &str, last: &str) -> Vec<String> {
        let first = first.to_lowercase();
        let last = last.to_lowercase();
        let mut variants = vec![last.clone()];

        if let Some(initial) = first.chars().next() {
            variants.push(format!("{}.{}", first, last));
            variants.push(format!("{}{}", first, last));
            variants.push(format!("{}.{}", initial, last));
            variants.push(format!("{}{}", initial, last));
            variants.push(format!("{}.{}", last, first));
        }
        variants
    }
}

impl EmailAssigner for ClassicEmailAssigner {
    fn assign(&self, medics: &mut [Medic], emails: &[String]) {
        if medics.len() == 1 && emails.len() == 1 {
            medics[0].email = Some(emails[0].clone());
            return;
        }

        let mut winners = Vec::new();

        for email in emails {
            let local = match email.find('@') {
                Some(index) => email[..index].to_lowercase(),
                None => continue,
            };

            let mut best: Option<(usize, usize)> = None;
            for (i, medic) in medics.iter().enumerate() {
                if winners.contains(&i) {
                    continue;
                }
                let (first, last) = match medic.first_last_name() {
                    Some(names) => names,
                    None => continue,
                };

                for variant in Self::variants(&first, &last) {
                    let distance = utils::levenshtein(&local, &variant);
                    if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                        best = Some((i, distance));
                    }
                }
            }

            if let Some((i, distance)) = best {
                if distance < local.chars().count() / 2 {
                    medics[i].email = Some(email.clone());
                    winners.push(i);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MedicParser {
    pipeline: Pipeline,
}

impl MedicParser {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self::from_pipeline(Pipeline::new(Model::Medic, tagger))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        MedicParser { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Extracts one medic accumulating all fields of the text. Returns `None` for an empty text.
    pub fn process(&self, text: &str) -> Result<Option<Medic>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.result_extraction(labels, tokens))
    }

    pub fn process_tokens(&self, tokens: &[LayoutToken]) -> Result<Option<Medic>, Error> {
        self.pipeline
            .process_tokens(tokens, |labels, tokens| self.result_extraction(labels, tokens))
    }

    /// Extracts a list of medics, a field seen again starts a new medic.
    pub fn process_list(&self, text: &str) -> Result<Option<Vec<Medic>>, Error> {
        self.pipeline
            .process_text(text, |labels, tokens| self.list_extraction(labels, tokens))
    }

    fn accepted<'t>(&self, cluster: &Cluster<'t>) -> Option<(MedicLabel, String)> {
        let content = self.pipeline.cluster_content(cluster);
        if content.is_empty() {
            return None;
        }

        match cluster.label().parse::<MedicLabel>() {
            Ok(MedicLabel::Other) => None,
            Ok(label) => {
                self.pipeline.count(label.as_str());
                Some((label, content))
            }
            Err(error) => {
                debug!("{}", error);
                None
            }
        }
    }

    pub fn result_extraction(&self, labels: &str, tokens: &[LayoutToken]) -> Result<Medic, Error> {
        let mut medic = Medic::default();

        for cluster in self.pipeline.clusters(labels, tokens)? {
            if let Some((label, content)) = self.accepted(&cluster) {
                if let Some(field) = medic.field_mut(label) {
                    record::append(field, &content);
                }
                medic.tokens.push(label.as_str(), cluster.tokens());
            }
        }

        Ok(medic)
    }

    pub fn list_extraction(
        &self,
        labels: &str,
        tokens: &[LayoutToken],
    ) -> Result<Vec<Medic>, Error> {
        let mut medics = SplitAccumulator::<Medic>::new();

        for cluster in self.pipeline.clusters(labels, tokens)? {
            if let Some((label, content)) = self.accepted(&cluster) {
                medics.set_field(&content, |x| x.field_mut(label));
            }
        }

        Ok(medics.finish())
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

impl_field_parse!(MedicParser, crate::components::Model::Medic, Medic);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::{self, ReplayTagger};

    fn parser(labels: Vec<&str>) -> MedicParser {
        MedicParser::new(Arc::new(ReplayTagger::new(labels)))
    }

    fn medic(name: &str) -> Medic {
        Medic {
            pers_name: Some(name.to_string()),
            ..Medic::default()
        }
    }

    #[test]
    fn accumulates_one_medic() -> Result<(), Error> {
        let parser = parser(vec![
            "I-<rolename>",
            "I-<persname>",
            "<persname>",
            "I-<other>",
            "I-<rolename>",
        ]);

        let medic = parser.process("Dr Jean Martin , cardiologue")?.expect("text is not empty");
        assert_eq!(medic.role.as_deref(), Some("Dr\tcardiologue"));
        assert_eq!(medic.pers_name.as_deref(), Some("Jean Martin"));
        Ok(())
    }

    #[test]
    fn splits_medic_list() -> Result<(), Error> {
        let parser = parser(vec![
            "I-<persname>",
            "<persname>",
            "I-<phone>",
            "I-<persname>",
            "<persname>",
        ]);

        let medics = parser
            .process_list("Jean Martin 0472 Paul Durand")?
            .expect("text is not empty");
        assert_eq!(medics.len(), 2);
        assert_eq!(medics[0].phone.as_deref(), Some("0472"));
        assert_eq!(medics[1].pers_name.as_deref(), Some("Paul Durand"));
        assert_eq!(medics[1].phone, None);
        Ok(())
    }

    #[test]
    fn writes_medic_training_data() -> Result<(), Error> {
        let parser = parser(vec![
            "I-<persname>",
            "<persname>",
            "I-<institution>",
            "<institution>",
        ]);

        assert_eq!(
            parser
                .training_extraction(&["Jean Martin CHU Lyon", "Paul Durand HCL Lyon"])?
                .as_deref(),
            Some(
                "\t<medic><persName>Jean Martin</persName> \
                 <orgName type=\"institution\">CHU Lyon</orgName></medic>\n\
                 \t<medic><persName>Paul Durand</persName> \
                 <orgName type=\"institution\">HCL Lyon</orgName></medic>\n"
            )
        );
        Ok(())
    }

    #[test]
    fn blank_line_starts_new_medic() -> Result<(), Error> {
        let labels = ["I-<persname>", "<persname>", "I-<persname>", "<persname>"];
        let parser = MedicParser::new(Arc::new(
            move |features: &str| -> Result<String, tagger::Error> {
                let mut out = String::new();
                for (i, (line, label)) in features.lines().zip(labels.iter()).enumerate() {
                    if i == 2 {
                        out.push('\n');
                    }
                    out.push_str(&format!("{}\t{}\n", line, label));
                }
                Ok(out)
            },
        ));

        assert_eq!(
            parser.training_extraction(&["Jean Martin Paul Durand"])?.as_deref(),
            Some(
                "\t<medic><persName>Jean Martin</persName></medic>\n\
                 \t<medic> <persName>Paul Durand</persName></medic>\n"
            )
        );
        Ok(())
    }

    #[test]
    fn assigns_single_email() {
        let mut medics = vec![medic("Jean Martin")];
        ClassicEmailAssigner.assign(&mut medics, &["secretariat@chu-lyon.fr".to_string()]);
        assert_eq!(medics[0].email.as_deref(), Some("secretariat@chu-lyon.fr"));
    }

    #[test]
    fn assigns_emails_by_name() {
        let mut medics = vec![medic("Jean Martin"), medic("Paul Durand")];
        ClassicEmailAssigner.assign(
            &mut medics,
            &[
                "p.durand@chu-lyon.fr".to_string(),
                "jmartin@chu-lyon.fr".to_string(),
                "contact@chu-lyon.fr".to_string(),
            ],
        );

        assert_eq!(medics[0].email.as_deref(), Some("jmartin@chu-lyon.fr"));
        assert_eq!(medics[1].email.as_deref(), Some("p.durand@chu-lyon.fr"));
    }
}
