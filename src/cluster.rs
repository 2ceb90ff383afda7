//! Groups a token sequence and the label stream produced for it into runs of tokens sharing one field.
use thiserror::Error;

use crate::{
    label::PrefixScheme,
    tagger,
    types::{self, LayoutToken},
};

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("label stream line {line} has no label column")]
    MissingLabel { line: usize },
    #[error("label stream expected '{expected}' but token {position} is '{found}'")]
    Desynchronized {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("label stream expected '{expected}' after the last token")]
    Exhausted { expected: String },
    #[error("label stream ended before token {position}")]
    Unlabeled { position: usize },
}

/// A maximal run of contiguous tokens labeled with the same field.
/// Separator tokens preceding a labeled token belong to its cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<'t> {
    label: String,
    tokens: &'t [LayoutToken],
}

impl<'t> Cluster<'t> {
    /// The label of this cluster with its boundary prefix stripped.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tokens(&self) -> &'t [LayoutToken] {
        self.tokens
    }

    pub fn text(&self) -> String {
        types::to_text(self.tokens)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clusteror {
    scheme: PrefixScheme,
}

impl Clusteror {
    pub fn new(scheme: PrefixScheme) -> Self {
        Clusteror { scheme }
    }

    /// Walks the label stream and the tokens in lockstep. The clusters are ordered and their
    /// token slices concatenate to `tokens`, as long as the label stream labels at least one token.
    /// Every content token needs a label, only trailing separators join the last cluster.
    pub fn cluster<'t>(
        &self,
        labels: &str,
        tokens: &'t [LayoutToken],
    ) -> Result<Vec<Cluster<'t>>, Error> {
        let mut clusters = Vec::new();
        // label and start index of the cluster being built
        let mut current: Option<(String, usize)> = None;
        let mut p = 0;

        for (i, line) in labels.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let columns = tagger::columns(line);
            let (surface, label) = match columns.as_slice() {
                [surface, .., label] => (*surface, *label),
                _ => return Err(Error::MissingLabel { line: i }),
            };

            let begin = p;
            loop {
                let token = tokens.get(p).ok_or_else(|| Error::Exhausted {
                    expected: surface.to_string(),
                })?;
                p += 1;

                if token.is_separator() {
                    continue;
                }
                if token.surface() == surface {
                    break;
                }
                return Err(Error::Desynchronized {
                    expected: surface.to_string(),
                    found: token.text.clone(),
                    position: p - 1,
                });
            }

            let base = self.scheme.strip(label);
            current = match current {
                Some((current_label, start))
                    if current_label == base && !self.scheme.is_begin(label) =>
                {
                    Some((current_label, start))
                }
                Some((current_label, start)) => {
                    clusters.push(Cluster {
                        label: current_label,
                        tokens: &tokens[start..begin],
                    });
                    Some((base.to_string(), begin))
                }
                None => Some((base.to_string(), begin)),
            };
        }

        if let Some(offset) = tokens[p..].iter().position(|x| !x.is_separator()) {
            return Err(Error::Unlabeled {
                position: p + offset,
            });
        }

        if let Some((label, start)) = current {
            clusters.push(Cluster {
                label,
                tokens: &tokens[start..],
            });
        }

        Ok(clusters)
    }
}
