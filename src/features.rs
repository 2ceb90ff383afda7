//! Turns tokens into the feature vectors consumed by the sequence labeling models.
use std::fmt::Write;

use crate::{
    lexicon::{Lexicon, LexiconCategory},
    types::{LayoutToken, OffsetPosition},
};

const N_BINS: usize = 12;

fn prefix(string: &str, n: usize) -> String {
    let chars: Vec<char> = string.chars().collect();
    chars[..n.min(chars.len())].iter().collect()
}

fn suffix(string: &str, n: usize) -> String {
    let chars: Vec<char> = string.chars().collect();
    chars[chars.len() - n.min(chars.len())..].iter().collect()
}

fn capitalisation(text: &str) -> &'static str {
    let mut chars = text.chars();
    let first_upper = chars.next().map_or(false, char::is_uppercase);

    if text.chars().all(|c| c.is_ascii_digit()) {
        "NOCAPS"
    } else if text.chars().any(char::is_alphabetic)
        && text.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
        && text.chars().count() > 1
    {
        "ALLCAP"
    } else if first_upper {
        "INITCAP"
    } else {
        "NOCAPS"
    }
}

fn digit(text: &str) -> &'static str {
    if text.chars().all(|c| c.is_ascii_digit()) {
        "ALLDIGIT"
    } else if text.chars().any(|c| c.is_ascii_digit()) {
        "CONTAINSDIGITS"
    } else {
        "NODIGIT"
    }
}

fn punct_type(text: &str) -> &'static str {
    match text {
        "(" | "[" => "OPENBRACKET",
        ")" | "]" => "ENDBRACKET",
        "." => "DOT",
        "," => "COMMA",
        "-" => "HYPHEN",
        "\"" | "'" | "`" => "QUOTE",
        _ if text.chars().all(|c| c.is_ascii_punctuation() || c == '°' || c == '•') => "PUNCT",
        _ => "NOPUNCT",
    }
}

/// Maps every char to its class (`X`, `x`, `d` or itself) and collapses repeated classes.
fn word_shape(text: &str) -> String {
    let mut shape = String::new();
    let mut last = None;

    for c in text.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };

        if last != Some(class) {
            shape.push(class);
        }
        last = Some(class);
    }
    shape
}

fn linear_scaling(n: usize, total: usize, n_bins: usize) -> usize {
    if total == 0 {
        0
    } else {
        (n * n_bins) / total
    }
}

/// Builds feature vectors with one lexicon flag column per configured category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBuilder {
    categories: Vec<LexiconCategory>,
}

impl FeatureBuilder {
    pub fn new(categories: Vec<LexiconCategory>) -> Self {
        FeatureBuilder { categories }
    }

    pub fn categories(&self) -> &[LexiconCategory] {
        &self.categories
    }

    /// Looks up the positions of every configured category in the lexicon.
    pub fn positions(
        &self,
        lexicon: &dyn Lexicon,
        tokens: &[LayoutToken],
    ) -> Vec<Vec<OffsetPosition>> {
        self.categories
            .iter()
            .map(|category| lexicon.token_positions(*category, tokens))
            .collect()
    }

    /// Writes one line per content token. `labels`, if given, holds one label per content token
    /// and fills the last column, otherwise it is `0`.
    pub fn build(
        &self,
        tokens: &[LayoutToken],
        positions: &[Vec<OffsetPosition>],
        labels: Option<&[String]>,
    ) -> String {
        let content: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, x)| !x.is_separator())
            .map(|(i, _)| i)
            .collect();

        let mut flags = vec![vec![false; tokens.len()]; self.categories.len()];
        for (category_flags, category_positions) in flags.iter_mut().zip(positions) {
            for position in category_positions {
                for flag in category_flags
                    .iter_mut()
                    .take(position.end + 1)
                    .skip(position.start)
                {
                    *flag = true;
                }
            }
        }

        let mut out = String::new();

        for (k, &n) in content.iter().enumerate() {
            let text = tokens[n].surface();
            let previous = if k == 0 { 0 } else { content[k - 1] + 1 };
            let next = content.get(k + 1).copied().unwrap_or_else(|| tokens.len());

            let line_status = if k == 0 || tokens[previous..n].iter().any(|x| x.is_newline()) {
                "LINESTART"
            } else if k + 1 == content.len() || tokens[n + 1..next].iter().any(|x| x.is_newline()) {
                "LINEEND"
            } else {
                "LINEIN"
            };

            // writing to a String can not fail
            let _ = write!(out, "{} {}", text, text.to_lowercase());
            for i in 1..=4 {
                let _ = write!(out, " {}", prefix(&text, i));
            }
            for i in 1..=4 {
                let _ = write!(out, " {}", suffix(&text, i));
            }
            let _ = write!(
                out,
                " {} {} {} {}",
                line_status,
                capitalisation(&text),
                digit(&text),
                if text.chars().count() == 1 { 1 } else { 0 }
            );
            for category_flags in &flags {
                let _ = write!(out, " {}", if category_flags[n] { 1 } else { 0 });
            }
            let _ = write!(
                out,
                " {} {} {}",
                punct_type(&text),
                word_shape(&text),
                linear_scaling(n, tokens.len(), N_BINS)
            );

            match labels.and_then(|x| x.get(k)) {
                Some(label) => {
                    let _ = writeln!(out, " {}", label);
                }
                None => {
                    let _ = writeln!(out, " 0");
                }
            }
        }

        out
    }
}
