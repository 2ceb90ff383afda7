//! The boundary to the sequence labeling models. A model is a black box which gets feature
//! vectors, one line per token, and answers with the same lines extended by a label column.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("the tagger returned {actual} labels for {expected} tokens")]
    LabelCount { expected: usize, actual: usize },
    #[error("model failure: {0}")]
    Model(String),
}

/// A sequence labeling model.
pub trait Tagger: Send + Sync {
    /// Labels the given feature vectors. The result has one line per non-empty input line:
    /// the feature columns, a tab and the label. Empty lines are kept.
    fn label(&self, features: &str) -> Result<String, Error>;
}

impl<F> Tagger for F
where
    F: Fn(&str) -> Result<String, Error> + Send + Sync,
{
    fn label(&self, features: &str) -> Result<String, Error> {
        self(features)
    }
}

/// Appends the given labels to the feature lines, in order.
/// Every call starts again from the first label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayTagger {
    labels: Vec<String>,
}

impl ReplayTagger {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(labels: I) -> Self {
        ReplayTagger {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl Tagger for ReplayTagger {
    fn label(&self, features: &str) -> Result<String, Error> {
        let expected = features.lines().filter(|x| !x.trim().is_empty()).count();
        if expected != self.labels.len() {
            return Err(Error::LabelCount {
                expected,
                actual: self.labels.len(),
            });
        }

        Ok(with_labels(features, self.labels.iter().map(String::as_str)))
    }
}

/// Appends one label per non-empty feature line.
pub fn with_labels<'a, I: IntoIterator<Item = &'a str>>(features: &str, labels: I) -> String {
    let mut labels = labels.into_iter();
    let mut out = String::with_capacity(features.len() * 2);

    for line in features.lines() {
        if !line.trim().is_empty() {
            out.push_str(line);
            if let Some(label) = labels.next() {
                out.push('\t');
                out.push_str(label);
            }
        }
        out.push('\n');
    }
    out
}

/// Splits a line of a label stream into its columns.
/// The first column is the token surface, the last one the label.
pub fn columns(line: &str) -> Vec<&str> {
    line.split(|c| c == '\t' || c == ' ')
        .filter(|x| !x.is_empty())
        .collect()
}
