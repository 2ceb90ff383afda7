//! Splits raw text into [LayoutToken]s. Every delimiter becomes a token of its own,
//! so the concatenation of all tokens always gives back the input text.
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::LayoutToken;

fn default_delimiters() -> String {
    " \n\r\t\u{00A0}([^%‰°•,:;?.!/)-–−‐=≈~∼<>+\"“”‘’'`$]*\u{2666}\u{2665}\u{2663}\u{2660}".into()
}

// see https://stackoverflow.com/a/40296745
fn split<F>(text: &str, split_func: F) -> Vec<(usize, &str)>
where
    F: Fn(char) -> bool,
{
    let mut result = Vec::new();
    let mut last = 0;
    for (index, matched) in text.match_indices(split_func) {
        if last != index {
            result.push((last, &text[last..index]));
        }
        result.push((index, matched));
        last = index + matched.len();
    }
    if last < text.len() {
        result.push((last, &text[last..]));
    }

    result
}

/// Options for a tokenizer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TokenizerOptions {
    /// Every char in this string is split off as a separate token.
    pub delimiters: String,
    /// Whether URLs are kept as one token instead of being split at their delimiters.
    pub keep_urls: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        TokenizerOptions {
            delimiters: default_delimiters(),
            keep_urls: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Tokenizer {
    options: TokenizerOptions,
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Tokenizer { options }
    }

    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    /// Splits the text into tokens including whitespace, newlines and punctuation.
    pub fn tokenize(&self, text: &str) -> Vec<LayoutToken> {
        lazy_static! {
            static ref URL_REGEX: Regex = Regex::new(
                r#"(?:https?://|www\.)[a-zA-Z0-9][^\s,;()<>"]*[^\s,;()<>".]"#
            )
            .unwrap();
        }

        let delimiters = &self.options.delimiters;
        let split_func = |c: char| delimiters.contains(c);

        let mut tokens = Vec::new();
        let push_split = |tokens: &mut Vec<LayoutToken>, start: usize, end: usize| {
            tokens.extend(
                split(&text[start..end], split_func)
                    .into_iter()
                    .map(|(offset, x)| LayoutToken::new(x, start + offset)),
            );
        };

        let mut prev = 0;
        if self.options.keep_urls {
            for m in URL_REGEX.find_iter(text) {
                push_split(&mut tokens, prev, m.start());
                tokens.push(LayoutToken::new(m.as_str(), m.start()));
                prev = m.end();
            }
        }
        push_split(&mut tokens, prev, text.len());

        tokens
    }
}
