use std::sync::Arc;

use clap::Parser;
use log::info;
use medreport::{
    components::Component, lexicon::Gazetteer, tagger::ReplayTagger, Error, FieldParse,
    FieldParser, Model, Pipeline,
};

#[derive(Parser)]
#[clap(version = "0.1", about = "Extracts the fields of one text from a known label sequence")]
struct Opts {
    text: String,
    #[clap(long, short)]
    model: Model,
    /// File with one label per content token.
    #[clap(long, short)]
    labels: String,
    /// Gazetteer in the binary format.
    #[clap(long)]
    lexicon: Option<String>,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let labels = fs_err::read_to_string(&opts.labels)?;
    let tagger = ReplayTagger::new(labels.lines().map(str::trim).filter(|x| !x.is_empty()));

    let mut pipeline = Pipeline::new(opts.model, Arc::new(tagger));
    if let Some(path) = &opts.lexicon {
        pipeline = pipeline.with_lexicon(Arc::new(Gazetteer::new(path)?));
    }

    info!("extracting {} fields", opts.model);
    let parser = FieldParser::from_pipeline(pipeline);
    println!("{}", serde_json::to_string_pretty(&parser.extract(&opts.text)?)?);
    Ok(())
}
