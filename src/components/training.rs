//! Writes label streams back as inline XML over the original text, for correction by annotators.
use std::borrow::Cow;

use log::{debug, warn};

use crate::{
    config::AnonymizationMode,
    label::{PrefixScheme, OTHER},
    tagger,
    types::LayoutToken,
    utils,
};

/// The XML element a label is written as. Content labeled [OTHER] has no element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub label: &'static str,
    pub element: Option<&'static str>,
    /// Value of the `type` attribute, if any.
    pub kind: Option<&'static str>,
}

impl FieldTag {
    pub const fn other() -> Self {
        FieldTag {
            label: OTHER,
            element: None,
            kind: None,
        }
    }

    pub const fn new(label: &'static str, element: &'static str) -> Self {
        FieldTag {
            label,
            element: Some(element),
            kind: None,
        }
    }

    pub const fn typed(label: &'static str, element: &'static str, kind: &'static str) -> Self {
        FieldTag {
            label,
            element: Some(element),
            kind: Some(kind),
        }
    }

    fn write_open(&self, out: &mut String) {
        match (self.element, self.kind) {
            (Some(element), Some(kind)) => {
                out.push('<');
                out.push_str(element);
                out.push_str(" type=\"");
                out.push_str(kind);
                out.push_str("\">");
            }
            (Some(element), None) => {
                out.push('<');
                out.push_str(element);
                out.push('>');
            }
            (None, _) => {}
        }
    }

    fn write_close(&self, out: &mut String) {
        if let Some(element) = self.element {
            out.push_str("</");
            out.push_str(element);
            out.push('>');
        }
    }
}

/// The element enclosing one entity in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapper {
    pub element: &'static str,
    /// Whether the opening tag is preceded by a tab.
    pub indent: bool,
}

/// How the label stream of one model is written as XML.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSchema {
    /// Fields in priority order, the first match wins.
    pub fields: &'static [FieldTag],
    pub wrapper: Option<Wrapper>,
    /// Whether a blank line in the label stream separates two entities of one unit.
    pub multiple_per_unit: bool,
}

impl TrainingSchema {
    pub fn field(&self, label: &str) -> Option<&FieldTag> {
        self.fields.iter().find(|x| x.label == label)
    }

    /// Finds the field written as the given element. An exact `type` match is preferred.
    pub fn field_for_element(&self, element: &str, kind: Option<&str>) -> Option<&FieldTag> {
        let mut candidates = self.fields.iter().filter(|x| x.element == Some(element));

        candidates
            .clone()
            .find(|x| x.kind == kind)
            .or_else(|| candidates.next())
    }

    fn write_open_wrapper(&self, out: &mut String) {
        if let Some(wrapper) = &self.wrapper {
            if wrapper.indent {
                out.push('\t');
            }
            out.push('<');
            out.push_str(wrapper.element);
            out.push('>');
        }
    }

    fn write_close_wrapper(&self, out: &mut String) {
        if let Some(wrapper) = &self.wrapper {
            out.push_str("</");
            out.push_str(wrapper.element);
            out.push('>');
        }
        out.push('\n');
    }
}

/// Replaces identifying strings by their anonymized counterparts.
#[derive(Debug, Clone, PartialEq)]
pub struct Anonymizer {
    pairs: Vec<(String, String)>,
    mode: AnonymizationMode,
}

impl Anonymizer {
    /// Pairs `original[i]` with `anonymized[i]`. Surplus entries of the longer list are ignored.
    pub fn new<S: AsRef<str>>(original: &[S], anonymized: &[S], mode: AnonymizationMode) -> Self {
        if original.len() != anonymized.len() {
            warn!(
                "{} original strings but {} anonymized ones, ignoring the surplus",
                original.len(),
                anonymized.len()
            );
        }

        Anonymizer {
            pairs: original
                .iter()
                .zip(anonymized)
                .map(|(a, b)| (a.as_ref().to_string(), b.as_ref().to_string()))
                .collect(),
            mode,
        }
    }

    pub fn mode(&self) -> AnonymizationMode {
        self.mode
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.mode {
            AnonymizationMode::Exact => {
                let trimmed = text.trim();
                self.pairs
                    .iter()
                    .find(|(original, _)| original == trimmed)
                    .map_or(Cow::Borrowed(text), |(_, anonymized)| {
                        Cow::Owned(anonymized.clone())
                    })
            }
            AnonymizationMode::Substring => {
                let mut text = Cow::Borrowed(text);
                for (original, anonymized) in &self.pairs {
                    if !original.is_empty() && text.contains(original.as_str()) {
                        text = Cow::Owned(text.replace(original.as_str(), anonymized));
                    }
                }
                text
            }
        }
    }
}

/// Walks a label stream, which has no whitespace tokens, in lockstep with the complete token
/// sequence and writes every token with the field tags opened and closed at label transitions.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSerializer<'a> {
    schema: &'a TrainingSchema,
    scheme: PrefixScheme,
    anonymizer: Option<&'a Anonymizer>,
}

impl<'a> TrainingSerializer<'a> {
    pub fn new(
        schema: &'a TrainingSchema,
        scheme: PrefixScheme,
        anonymizer: Option<&'a Anonymizer>,
    ) -> Self {
        TrainingSerializer {
            schema,
            scheme,
            anonymizer,
        }
    }

    fn anonymize<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.anonymizer {
            Some(anonymizer) => anonymizer.apply(text),
            None => Cow::Borrowed(text),
        }
    }

    fn write_close(&self, label: &str, out: &mut String) {
        if let Some(field) = self.schema.field(self.scheme.strip(label)) {
            field.write_close(out);
        }
    }

    fn close_entity(&self, last_label: Option<&str>, out: &mut String) {
        if let Some(last_label) = last_label {
            self.write_close(last_label, out);
        }
        self.schema.write_close_wrapper(out);
    }

    /// Serializes one unit of text: `tokens` is its complete tokenization and
    /// `labels` the output of the tagger for it.
    pub fn serialize_unit(&self, labels: &str, tokens: &[LayoutToken], out: &mut String) {
        // raw label of the previous content token
        let mut last_label: Option<String> = None;
        // kept across lines without a label column
        let mut label: Option<String> = None;
        let mut start = true;
        let mut p = 0;

        for line in labels.lines() {
            let line = line.trim();

            if line.is_empty() {
                if self.schema.multiple_per_unit && !start {
                    self.close_entity(last_label.as_deref(), out);
                    last_label = None;
                    start = true;
                }
                continue;
            }

            let columns = tagger::columns(line);
            let surface = match columns.first() {
                Some(surface) => self.anonymize(surface),
                None => continue,
            };
            if columns.len() > 1 {
                label = columns.last().map(|x| x.to_string());
            }

            let mut add_space = false;
            while p < tokens.len() {
                let token = &tokens[p];
                p += 1;

                if token.text == " " || token.text == "\u{a0}" {
                    add_space = true;
                } else if self.anonymize(&token.surface()) == surface {
                    break;
                }
            }

            let current = match &label {
                Some(current) => current.clone(),
                None => continue,
            };

            if start {
                self.schema.write_open_wrapper(out);
                start = false;
            }

            let current_base = self.scheme.strip(&current);
            let last_base = last_label.as_deref().map(|x| self.scheme.strip(x));

            if let Some(last_base) = last_base {
                if last_base != current_base {
                    self.write_close(last_base, out);
                }
            }

            match self.schema.field(current_base) {
                Some(field) => {
                    if add_space {
                        out.push(' ');
                    }
                    if last_base != Some(current_base) {
                        field.write_open(out);
                    }
                    out.push_str(&utils::html_encode(&surface));
                }
                None => debug!("no training tag for label {}", current),
            }

            last_label = Some(current);
        }

        if !start {
            self.close_entity(last_label.as_deref(), out);
        }
    }
}
