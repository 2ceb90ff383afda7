//! Gazetteer lookups. A lexicon marks spans of tokens which belong to a known category;
//! these spans only become feature columns for the tagger.
use std::{
    collections::{HashMap, HashSet},
    io::BufRead,
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    components::Component,
    tokenizer::Tokenizer,
    types::{LayoutToken, OffsetPosition},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexiconCategory {
    Location,
    City,
    Country,
    Title,
    Suffix,
    FirstName,
    LastName,
    Email,
    Url,
}

/// Lookups of token spans by category. Implementations must be safe to share across threads.
pub trait Lexicon: Send + Sync {
    /// Returns the disjoint spans of `tokens` which match the category, in document order.
    fn token_positions(
        &self,
        category: LexiconCategory,
        tokens: &[LayoutToken],
    ) -> Vec<OffsetPosition>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PhraseSet {
    phrases: HashSet<Vec<String>>,
    max_len: usize,
}

impl PhraseSet {
    fn insert(&mut self, phrase: Vec<String>) {
        if phrase.is_empty() {
            return;
        }
        self.max_len = self.max_len.max(phrase.len());
        self.phrases.insert(phrase);
    }

    /// Longest-first matching over the content tokens.
    fn positions(&self, tokens: &[LayoutToken]) -> Vec<OffsetPosition> {
        let content: Vec<(usize, String)> = tokens
            .iter()
            .enumerate()
            .filter(|(_, x)| !x.is_separator())
            .map(|(i, x)| (i, x.surface().to_lowercase()))
            .collect();

        let mut positions = Vec::new();
        let mut i = 0;

        'outer: while i < content.len() {
            let longest = self.max_len.min(content.len() - i);

            for len in (1..=longest).rev() {
                let candidate: Vec<String> =
                    content[i..i + len].iter().map(|(_, x)| x.clone()).collect();

                if self.phrases.contains(&candidate) {
                    positions.push(OffsetPosition::new(content[i].0, content[i + len - 1].0));
                    i += len;
                    continue 'outer;
                }
            }
            i += 1;
        }

        positions
    }
}

/// In-memory gazetteer over phrase lists. Emails and URLs are recognized by pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gazetteer {
    tokenizer: Tokenizer,
    phrases: HashMap<LexiconCategory, PhraseSet>,
}

impl Component for Gazetteer {
    fn name() -> &'static str {
        "gazetteer"
    }
}

impl Gazetteer {
    pub fn new_with_tokenizer(tokenizer: Tokenizer) -> Self {
        Gazetteer {
            tokenizer,
            phrases: HashMap::new(),
        }
    }

    pub fn insert(&mut self, category: LexiconCategory, phrase: &str) {
        let phrase = self
            .tokenizer
            .tokenize(phrase)
            .into_iter()
            .filter(|x| !x.is_separator())
            .map(|x| x.surface().to_lowercase())
            .collect();

        self.phrases.entry(category).or_default().insert(phrase);
    }

    /// Adds one phrase per line. Empty lines and lines starting with `#` are ignored.
    pub fn extend_from_reader<R: BufRead>(
        &mut self,
        category: LexiconCategory,
        reader: R,
    ) -> Result<(), crate::Error> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.insert(category, line);
        }
        Ok(())
    }

    pub fn len(&self, category: LexiconCategory) -> usize {
        self.phrases.get(&category).map_or(0, |x| x.phrases.len())
    }
}

impl<'a> std::iter::FromIterator<(LexiconCategory, &'a str)> for Gazetteer {
    fn from_iter<T: IntoIterator<Item = (LexiconCategory, &'a str)>>(iter: T) -> Self {
        let mut gazetteer = Gazetteer::default();
        for (category, phrase) in iter {
            gazetteer.insert(category, phrase);
        }
        gazetteer
    }
}

impl Lexicon for Gazetteer {
    fn token_positions(
        &self,
        category: LexiconCategory,
        tokens: &[LayoutToken],
    ) -> Vec<OffsetPosition> {
        lazy_static! {
            static ref EMAIL_REGEX: Regex =
                Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").unwrap();
            static ref URL_REGEX: Regex =
                Regex::new(r"(?:https?://|www\.)[^\s]+").unwrap();
        }

        match category {
            LexiconCategory::Email => pattern_positions(&EMAIL_REGEX, tokens),
            LexiconCategory::Url => pattern_positions(&URL_REGEX, tokens),
            category => self
                .phrases
                .get(&category)
                .map_or_else(Vec::new, |x| x.positions(tokens)),
        }
    }
}

/// Matches the regex over the joined token text and maps every match back to the tokens it covers.
fn pattern_positions(regex: &Regex, tokens: &[LayoutToken]) -> Vec<OffsetPosition> {
    let mut text = String::new();
    let mut owners = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        text.push_str(&token.text);
        owners.extend(std::iter::repeat(i).take(token.text.len()));
    }

    regex
        .find_iter(&text)
        .filter(|m| m.end() > m.start())
        .map(|m| OffsetPosition::new(owners[m.start()], owners[m.end() - 1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_longest_phrase() {
        let gazetteer: Gazetteer = vec![
            (LexiconCategory::City, "Saint"),
            (LexiconCategory::City, "Saint-Etienne"),
            (LexiconCategory::City, "Paris"),
        ]
        .into_iter()
        .collect();
        let tokens = Tokenizer::default().tokenize("de Saint-Etienne à paris");

        assert_eq!(
            gazetteer.token_positions(LexiconCategory::City, &tokens),
            vec![OffsetPosition::new(2, 4), OffsetPosition::new(8, 8)]
        );
        assert!(gazetteer
            .token_positions(LexiconCategory::Title, &tokens)
            .is_empty());
    }

    #[test]
    fn finds_emails_across_tokens() {
        let tokens = Tokenizer::default().tokenize("mail: jean.dupont@chu-lyon.fr merci");
        let positions = Gazetteer::default().token_positions(LexiconCategory::Email, &tokens);

        assert_eq!(positions.len(), 1);
        assert_eq!(tokens[positions[0].start].as_str(), "jean");
        assert_eq!(tokens[positions[0].end].as_str(), "fr");
    }

    #[test]
    fn reads_phrase_lists() -> Result<(), crate::Error> {
        let mut gazetteer = Gazetteer::default();
        gazetteer.extend_from_reader(
            LexiconCategory::Title,
            "# titles\nDr\n\nPr\n".as_bytes(),
        )?;

        assert_eq!(gazetteer.len(LexiconCategory::Title), 2);
        Ok(())
    }

    #[test]
    fn can_be_serialized() -> Result<(), crate::Error> {
        let gazetteer: Gazetteer = vec![(LexiconCategory::Country, "France")]
            .into_iter()
            .collect();

        let mut buffer = Vec::new();
        gazetteer.to_writer(&mut buffer)?;
        assert_eq!(Gazetteer::from_reader(buffer.as_slice())?, gazetteer);
        Ok(())
    }
}
