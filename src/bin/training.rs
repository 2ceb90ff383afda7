use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use medreport::{tagger::ReplayTagger, Error, FieldParse, FieldParser, Model};

#[derive(Parser)]
#[clap(version = "0.1", about = "Writes training data for one text from a known label sequence")]
struct Opts {
    text: String,
    #[clap(long, short)]
    model: Model,
    /// File with one label per content token.
    #[clap(long, short)]
    labels: String,
    /// Tab separated file of original and anonymized strings, one pair per line.
    #[clap(long)]
    anonymize: Option<String>,
}

fn read_pairs(path: &str) -> Result<(Vec<String>, Vec<String>), Error> {
    let mut original = Vec::new();
    let mut anonymized = Vec::new();

    for line in fs_err::read_to_string(path)?.lines() {
        match line.split_once('\t') {
            Some((a, b)) => {
                original.push(a.to_string());
                anonymized.push(b.to_string());
            }
            None if line.trim().is_empty() => {}
            None => warn!("skipping line without tab: {}", line),
        }
    }
    Ok((original, anonymized))
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let labels = fs_err::read_to_string(&opts.labels)?;
    let tagger = ReplayTagger::new(labels.lines().map(str::trim).filter(|x| !x.is_empty()));
    let parser = FieldParser::new(opts.model, Arc::new(tagger));

    let inputs = [opts.text.as_str()];
    let training = match &opts.anonymize {
        Some(path) => {
            let (original, anonymized) = read_pairs(path)?;
            info!("anonymizing {} strings", original.len());
            parser.training_extraction_anonym(&inputs, &original, &anonymized)?
        }
        None => parser.training_extraction(&inputs)?,
    };

    if let Some(training) = training {
        print!("{}", training);
    }
    Ok(())
}
