use std::sync::Arc;

use clap::Parser;
use itertools::Itertools;
use log::info;
use medreport::{
    components::{corpus, Component},
    lexicon::Gazetteer,
    tagger::ReplayTagger,
    Error, Model, Pipeline,
};

#[derive(Parser)]
#[clap(version = "0.1", about = "Turns training data into labeled feature vectors")]
struct Opts {
    /// File with a fragment of training data.
    input: String,
    #[clap(long, short)]
    model: Model,
    /// Gazetteer in the binary format.
    #[clap(long)]
    lexicon: Option<String>,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    // the tagger is never called, features are built from the corrected labels
    let mut pipeline = Pipeline::new(opts.model, Arc::new(ReplayTagger::default()));
    if let Some(path) = &opts.lexicon {
        pipeline = pipeline.with_lexicon(Arc::new(Gazetteer::new(path)?));
    }

    let xml = fs_err::read_to_string(&opts.input)?;
    let sequences = corpus::read_fragment(
        opts.model.training_schema(),
        &xml,
        pipeline.tokenizer(),
        pipeline.options().prefix_scheme,
    )?;
    info!("read {} {} sequences", sequences.len(), opts.model);

    println!("{}", sequences.iter().map(|x| x.features(&pipeline)).join("\n"));
    Ok(())
}
