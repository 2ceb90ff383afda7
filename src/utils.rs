use lazy_static::lazy_static;
use regex::Regex;
use std::{borrow::Cow, cmp::min};

/// Trims the string and collapses every run of whitespace into a single space.
pub fn normalize_space(string: &str) -> String {
    lazy_static! {
        static ref REGEX: Regex = Regex::new(r"\s+").unwrap();
    }

    REGEX.replace_all(string.trim(), " ").to_string()
}

/// Removes end-of-line hyphenation, e. g. `Montpel-\nlier` becomes `Montpellier`.
/// A hyphen is only removed if the word continues in lowercase on the next line.
pub fn dehyphenize(string: &str) -> Cow<str> {
    lazy_static! {
        static ref REGEX: Regex = Regex::new(r"(\p{L})-[ \t]*\r?\n[ \t]*(\p{Ll})").unwrap();
    }

    REGEX.replace_all(string, "$1$2")
}

/// Unifies unicode spaces, dashes and quotes to their ASCII counterparts.
pub fn normalise_text(string: &str) -> String {
    string
        .chars()
        .map(|c| match c {
            '\u{00A0}' | '\u{2000}'..='\u{200B}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
            | '\u{FEFF}' => ' ',
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE63}' | '\u{FF0D}' => '-',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
            | '\u{00BB}' => '"',
            c => c,
        })
        .collect()
}

pub fn remove_spaces(string: &str) -> String {
    string.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Escapes the characters which are not allowed verbatim in XML text.
pub fn html_encode(string: &str) -> Cow<str> {
    if !string.contains(|c| matches!(c, '&' | '<' | '>' | '"')) {
        return Cow::Borrowed(string);
    }

    let mut out = String::with_capacity(string.len() + 8);
    for c in string.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

pub fn is_blank(string: &str) -> bool {
    string.trim().is_empty()
}

/// Whether an optional record field holds non-blank content.
pub fn is_filled(field: &Option<String>) -> bool {
    field.as_deref().map_or(false, |x| !is_blank(x))
}

/// Edit distance between two strings, computed over chars with two rows of the matrix.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();

    let mut row: Vec<usize> = (0..=b.len()).collect();
    let mut next_row = vec![0; b.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        next_row[0] = i + 1;

        for j in 1..next_row.len() {
            let cost = if a_char == b[j - 1] { 0 } else { 1 };
            next_row[j] = min(min(row[j] + 1, next_row[j - 1] + 1), row[j - 1] + cost);
        }

        std::mem::swap(&mut row, &mut next_row);
    }

    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_space() {
        assert_eq!(normalize_space("  rue\u{a0} de \n la\tPaix "), "rue de la Paix");
        assert_eq!(normalize_space(" \n "), "");
    }

    #[test]
    fn dehyphenizes_line_breaks() {
        assert_eq!(dehyphenize("Montpel-\nlier"), "Montpellier");
        assert_eq!(dehyphenize("Aix-en-Provence"), "Aix-en-Provence");
        assert_eq!(dehyphenize("Saint-\nEtienne"), "Saint-\nEtienne");
    }

    #[test]
    fn normalises_text() {
        assert_eq!(normalise_text("l’unité – “cardio”"), "l'unité - \"cardio\"");
    }

    #[test]
    fn encodes_html() {
        assert_eq!(html_encode("a & b <c>"), "a &amp; b &lt;c&gt;");
        assert!(matches!(html_encode("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn computes_levenshtein() {
        assert_eq!(levenshtein("dupont", "dupont"), 0);
        assert_eq!(levenshtein("jdupont", "dupont"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
