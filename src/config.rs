//! Per-model parser options. The defaults of every model are compiled in from `configs/`.
use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::{label::PrefixScheme, lexicon::LexiconCategory};

lazy_static! {
    static ref PARSER_CONFIGS: HashMap<String, ParserOptions> = serde_json::from_slice(
        include_bytes!(concat!(env!("OUT_DIR"), "/parser_configs.json"))
    )
    .expect("parser configs are generated by the build script and must be valid");
}

/// How identifying strings are matched when anonymizing training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymizationMode {
    /// Every original string is replaced wherever it occurs inside a token, in list order.
    Substring,
    /// A token is replaced only if it equals an original string.
    Exact,
}

impl Default for AnonymizationMode {
    fn default() -> Self {
        AnonymizationMode::Substring
    }
}

/// Options of one field parser.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParserOptions {
    pub prefix_scheme: PrefixScheme,
    /// Whether cluster content is dehyphenized before whitespace is normalized.
    pub dehyphenize: bool,
    pub anonymization: AnonymizationMode,
    /// The lexicon categories which become feature columns, in column order.
    pub lexicon_categories: Vec<LexiconCategory>,
}

impl ParserOptions {
    /// The compiled in options for the model with the given name, the defaults if there are none.
    pub fn for_model(name: &str) -> Self {
        PARSER_CONFIGS.get(name).cloned().unwrap_or_default()
    }
}
