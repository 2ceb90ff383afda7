use std::{sync::Arc, thread};

use lazy_static::lazy_static;
use medreport::{
    cluster::Clusteror,
    components::{
        address::{AddressParser, TRAINING_SCHEMA as ADDRESS_SCHEMA},
        corpus,
        dateline::{Dateline, DatelineParser},
        medic::MedicParser,
        organization::OrganizationParser,
        patient::PatientParser,
        person_name::PersonNameParser,
        record::SplitAccumulator,
    },
    counter::LabelCounts,
    label::PrefixScheme,
    tagger::{self, ReplayTagger, Tagger},
    tokenizer::Tokenizer,
    Error, FieldParse, FieldParser, Model, Pipeline,
};
use quickcheck_macros::quickcheck;

/// A tagger giving every token the same label.
fn constant_tagger(label: &'static str) -> Arc<dyn Tagger> {
    Arc::new(move |features: &str| -> Result<String, tagger::Error> {
        Ok(tagger::with_labels(features, std::iter::repeat(label)))
    })
}

lazy_static! {
    static ref TOKENIZER: Tokenizer = Tokenizer::default();
    static ref CITY_PARSER: AddressParser = AddressParser::new(constant_tagger("<city>"));
    static ref PARSERS: Vec<FieldParser> = Model::ALL
        .iter()
        .map(|model| FieldParser::new(*model, constant_tagger("I-<other>")))
        .collect();
}

#[test]
fn can_process_empty_text() -> Result<(), Error> {
    assert_eq!(CITY_PARSER.process("")?, None);
    for parser in PARSERS.iter() {
        assert_eq!(parser.training_extraction(&[])?, None);
    }
    Ok(())
}

#[quickcheck]
fn can_process_anything(text: String) -> bool {
    CITY_PARSER.process(&text).is_ok()
        && PARSERS
            .iter()
            .all(|x| x.extract(&text).is_ok() && x.training_extraction(&[text.as_str()]).is_ok())
}

#[quickcheck]
fn clusters_cover_all_tokens(text: String, fields: Vec<bool>) -> bool {
    let tokens = TOKENIZER.tokenize(&text);
    let labels: String = tokens
        .iter()
        .filter(|x| !x.is_separator())
        .enumerate()
        .map(|(i, x)| {
            let label = match fields.get(i) {
                Some(true) => "I-<city>",
                Some(false) => "<city>",
                None => "I-<other>",
            };
            format!("{}\t{}\n", x.surface(), label)
        })
        .collect();

    if labels.is_empty() {
        return true;
    }

    match Clusteror::new(PrefixScheme::Inside).cluster(&labels, &tokens) {
        Ok(clusters) => clusters
            .iter()
            .flat_map(|x| x.tokens().iter())
            .eq(tokens.iter()),
        Err(_) => false,
    }
}

#[test]
fn extracts_address_end_to_end() -> Result<(), Error> {
    let parser = AddressParser::new(Arc::new(ReplayTagger::new(vec![
        "I-<streetnumber>",
        "I-<streetname>",
        "<streetname>",
        "<streetname>",
        "<streetname>",
        "I-<other>",
        "I-<postcode>",
        "I-<city>",
    ])));

    let address = parser
        .process("10 rue de la Paix, 75002 Paris")?
        .expect("text is not empty");
    assert_eq!(address.street_number.as_deref(), Some("10"));
    assert_eq!(address.street_name.as_deref(), Some("rue de la Paix"));
    assert_eq!(address.post_code.as_deref(), Some("75002"));
    assert_eq!(address.city.as_deref(), Some("Paris"));
    Ok(())
}

#[test]
fn short_label_stream_is_an_error() {
    let parser = AddressParser::new(Arc::new(|features: &str| -> Result<String, tagger::Error> {
        Ok(features
            .lines()
            .take(1)
            .map(|x| format!("{}\tI-<city>\n", x))
            .collect())
    }));

    assert!(matches!(parser.process("Lyon 69003"), Err(Error::Processing(_))));
}

#[test]
fn append_policy_never_splits() -> Result<(), Error> {
    let labels = vec!["I-<forename>", "I-<surname>", "I-<forename>"];

    let name = PersonNameParser::new(Arc::new(ReplayTagger::new(labels)))
        .process("Jean Martin Paul")?
        .expect("text is not empty");
    assert_eq!(name.forename.as_deref(), Some("Jean\tPaul"));

    let medic = MedicParser::new(Arc::new(ReplayTagger::new(vec![
        "I-<persname>",
        "I-<phone>",
        "I-<persname>",
    ])))
    .process("Martin 0472 Durand")?
    .expect("text is not empty");
    assert_eq!(medic.pers_name.as_deref(), Some("Martin\tDurand"));
    Ok(())
}

#[test]
fn split_policy_starts_new_records() -> Result<(), Error> {
    let datelines = DatelineParser::new(Arc::new(ReplayTagger::new(vec!["I-<place>", "I-<place>"])))
        .process("Lyon Paris")?
        .expect("text is not empty");

    assert_eq!(datelines.len(), 2);
    for dateline in &datelines {
        assert!(dateline.place_name.is_some());
        assert_eq!(dateline.date, None);
        assert_eq!(dateline.time, None);
    }

    let patients = PatientParser::new(Arc::new(ReplayTagger::new(vec![
        "I-<idno>",
        "I-<persname>",
        "I-<idno>",
    ])))
    .process("123 Dupont 456")?
    .expect("text is not empty");
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[1].id.as_deref(), Some("456"));
    Ok(())
}

#[test]
fn blank_repeat_does_not_split() {
    let mut datelines = SplitAccumulator::<Dateline>::new();
    datelines.set("Lyon", |x| &mut x.place_name);
    datelines.set(" ", |x| &mut x.date);
    datelines.set("12 mars", |x| &mut x.date);
    datelines.set("", |x| &mut x.date);
    datelines.set("14h", |x| &mut x.time);

    let datelines = datelines.finish();
    assert_eq!(datelines.len(), 1);
    assert_eq!(datelines[0].date.as_deref(), Some("12 mars"));
    assert_eq!(datelines[0].time.as_deref(), Some("14h"));
}

#[test]
fn reinserts_spaces_between_fields() -> Result<(), Error> {
    let parser = PersonNameParser::new(Arc::new(ReplayTagger::new(vec![
        "I-<title>",
        "I-<forename>",
        "I-<surname>",
    ])));

    let training = parser
        .training_extraction(&["Dr Jane Smith"])?
        .expect("input is not empty");
    assert!(training.contains("</title> <forename>Jane"));
    assert!(training.contains("Jane</forename> <surname>Smith"));
    assert_eq!(training.matches(' ').count(), 2);
    Ok(())
}

#[test]
fn closes_tags_on_label_change_only() -> Result<(), Error> {
    let parser = FieldParser::new(
        Model::Organization,
        Arc::new(ReplayTagger::new(vec![
            "I-<chu>",
            "<chu>",
            "I-<service>",
            "<service>",
        ])),
    );

    assert_eq!(
        parser.training_extraction(&["CHU Lyon Service cardiologie"])?.as_deref(),
        Some(
            "<orgName type=\"chu\">CHU Lyon</orgName> \
             <orgName type=\"service\">Service cardiologie</orgName>\n"
        )
    );
    Ok(())
}

#[test]
fn anonymizes_exact_tokens() -> Result<(), Error> {
    let parser = FieldParser::new(
        Model::PersonName,
        Arc::new(ReplayTagger::new(vec!["I-<forename>", "I-<surname>"])),
    );

    assert_eq!(
        parser
            .training_extraction_anonym(
                &["Jean Dupont"],
                &["Dupont".to_string()],
                &["XXXXX".to_string()]
            )?
            .as_deref(),
        Some("<name><forename>Jean</forename> <surname>XXXXX</surname></name>\n")
    );
    Ok(())
}

#[test]
fn corrected_training_data_gives_features() -> Result<(), Error> {
    let pipeline = Pipeline::new(Model::Address, Arc::new(ReplayTagger::default()));
    let sequences = corpus::read_fragment(
        &ADDRESS_SCHEMA,
        "<address><postCode>69003</postCode> <city>Lyon</city></address>\n\
         <address><city>Paris</city></address>\n",
        pipeline.tokenizer(),
        pipeline.options().prefix_scheme,
    )?;

    assert_eq!(sequences.len(), 2);
    let features = sequences[0].features(&pipeline);
    let lines: Vec<&str> = features.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("69003 "));
    assert!(lines[0].ends_with(" I-<postcode>"));
    assert!(lines[1].ends_with(" I-<city>"));
    Ok(())
}

#[test]
fn organizations_repeat_final_record() -> Result<(), Error> {
    let organizations = OrganizationParser::new(Arc::new(ReplayTagger::new(vec![
        "I-<hospital>",
        "I-<settlement>",
    ])))
    .process("Necker Paris")?
    .expect("text is not empty");

    assert_eq!(organizations.len(), 2);
    assert_eq!(organizations[0], organizations[1]);
    assert_eq!(organizations[0].town.as_deref(), Some("Paris"));
    Ok(())
}

#[test]
fn parsers_can_be_shared_between_threads() {
    let counts = Arc::new(LabelCounts::new());
    let parser = Arc::new(FieldParser::from_pipeline(
        Pipeline::new(Model::Address, constant_tagger("I-<city>")).with_counter(counts.clone()),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = parser.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    parser.extract("Lyon Paris").expect("constant labels always apply");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("no thread panics");
    }
    assert_eq!(counts.get("<city>"), 4 * 10 * 2);
}
