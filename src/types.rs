//! Fundamental types shared by the whole crate.
use serde::{Deserialize, Serialize};

use crate::utils;

/// Position of a token on a page. Only passed through, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An atomic unit of text as produced by the [Tokenizer][crate::tokenizer::Tokenizer] or an upstream layout engine.
/// Whitespace and newlines are tokens too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutToken {
    pub text: String,
    /// Byte offset of the token in the text it was produced from.
    #[serde(default)]
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl LayoutToken {
    pub fn new<S: Into<String>>(text: S, offset: usize) -> Self {
        LayoutToken {
            text: text.into(),
            offset,
            bounding_box: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The text of this token as it appears in feature vectors and label streams:
    /// unicode normalised, with all whitespace removed.
    pub fn surface(&self) -> String {
        utils::remove_spaces(&utils::normalise_text(&self.text))
    }

    /// Whether this token carries no content, i. e. it is absent from label streams.
    pub fn is_separator(&self) -> bool {
        self.surface().is_empty()
    }

    pub fn is_newline(&self) -> bool {
        self.text.contains('\n')
    }
}

/// Concatenates the text of the given tokens.
pub fn to_text(tokens: &[LayoutToken]) -> String {
    tokens.iter().map(|x| x.text.as_str()).collect()
}

/// An inclusive span of token indices, as returned by lexicon lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetPosition {
    pub start: usize,
    pub end: usize,
}

impl OffsetPosition {
    pub fn new(start: usize, end: usize) -> Self {
        OffsetPosition { start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_have_no_surface() {
        assert!(LayoutToken::new(" ", 0).is_separator());
        assert!(LayoutToken::new("\n", 0).is_separator());
        assert!(LayoutToken::new("\u{a0}", 0).is_separator());
        assert!(!LayoutToken::new("Paris", 0).is_separator());
    }

    #[test]
    fn surface_is_normalised() {
        assert_eq!(LayoutToken::new("l’hôpital", 0).surface(), "l'hôpital");
    }
}
