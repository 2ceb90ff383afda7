//! The two policies by which clusters are aggregated into records.
use indexmap::IndexMap;

use crate::{types::LayoutToken, utils};

/// A record with optional string fields.
pub trait Record: Default {
    /// Whether at least one field is set.
    fn is_not_null(&self) -> bool;
}

/// Append policy: a repeated field keeps all its values, separated by tabs.
pub fn append(field: &mut Option<String>, value: &str) {
    match field {
        Some(old) => {
            old.push('\t');
            old.push_str(value);
        }
        None => *field = Some(value.to_string()),
    }
}

/// Split-on-repeat policy: a field which is set again with non-blank content
/// finishes the current record and starts a new one. Blank values are ignored.
#[derive(Debug, Clone, Default)]
pub struct SplitAccumulator<R> {
    current: R,
    records: Vec<R>,
}

impl<R: Record> SplitAccumulator<R> {
    pub fn new() -> Self {
        SplitAccumulator {
            current: R::default(),
            records: Vec::new(),
        }
    }

    pub fn set<F>(&mut self, value: &str, field: F)
    where
        F: Fn(&mut R) -> &mut Option<String>,
    {
        self.set_field(value, |x| Some(field(x)));
    }

    /// Like [SplitAccumulator::set] for records whose field lookup may fail,
    /// in which case nothing happens.
    pub fn set_field<F>(&mut self, value: &str, field: F)
    where
        F: Fn(&mut R) -> Option<&mut Option<String>>,
    {
        if utils::is_blank(value) {
            return;
        }

        let filled = field(&mut self.current).map_or(false, |x| utils::is_filled(x));
        if filled && self.current.is_not_null() {
            let finished = std::mem::take(&mut self.current);
            self.records.push(finished);
        }
        if let Some(slot) = field(&mut self.current) {
            *slot = Some(value.to_string());
        }
    }

    pub fn current_mut(&mut self) -> &mut R {
        &mut self.current
    }

    /// Returns all records, including the last one if it is not null.
    pub fn finish(mut self) -> Vec<R> {
        if self.current.is_not_null() {
            self.records.push(self.current);
        }
        self.records
    }
}

/// The layout tokens each field of a record was read from, in order of first occurence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTokens(IndexMap<&'static str, Vec<LayoutToken>>);

impl FieldTokens {
    pub fn push(&mut self, label: &'static str, tokens: &[LayoutToken]) {
        self.0
            .entry(label)
            .or_insert_with(Vec::new)
            .extend_from_slice(tokens);
    }

    pub fn get(&self, label: &str) -> &[LayoutToken] {
        self.0.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[LayoutToken])> {
        self.0.iter().map(|(label, tokens)| (*label, tokens.as_slice()))
    }
}
