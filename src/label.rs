//! Labels emitted by the sequence labeling models and the prefix schemes used to mark field boundaries.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The label of content which does not belong to any field.
pub const OTHER: &str = "<other>";

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("unknown label: {0}")]
    Unknown(String),
}

/// How a model marks the boundaries between two fields in its label stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixScheme {
    /// `I-<label>` marks the first token of a field, a plain `<label>` continues it.
    Inside,
    /// `B-<label>` marks the first token of a field, `I-<label>` continues it and `O` is other content.
    BeginInside,
}

impl Default for PrefixScheme {
    fn default() -> Self {
        PrefixScheme::Inside
    }
}

impl PrefixScheme {
    /// Strips the boundary prefix from a label.
    pub fn strip<'a>(&self, label: &'a str) -> &'a str {
        match self {
            PrefixScheme::Inside => label.strip_prefix("I-").unwrap_or(label),
            PrefixScheme::BeginInside => {
                if label == "O" {
                    OTHER
                } else {
                    label
                        .strip_prefix("B-")
                        .or_else(|| label.strip_prefix("I-"))
                        .unwrap_or(label)
                }
            }
        }
    }

    /// Whether the label marks the first token of a field.
    pub fn is_begin(&self, label: &str) -> bool {
        match self {
            PrefixScheme::Inside => label.starts_with("I-"),
            PrefixScheme::BeginInside => label.starts_with("B-"),
        }
    }

    /// Whether `label` denotes the field `base`, with or without prefix.
    pub fn matches(&self, label: &str, base: &str) -> bool {
        self.strip(label) == base
    }

    /// Labels the tokens of one field: the first one with the begin marker, the rest plain.
    pub fn label_field(&self, base: &str, n_tokens: usize) -> Vec<String> {
        (0..n_tokens)
            .map(|i| match (self, i) {
                (PrefixScheme::Inside, 0) => format!("I-{}", base),
                (PrefixScheme::Inside, _) => base.to_string(),
                (PrefixScheme::BeginInside, _) if base == OTHER => "O".to_string(),
                (PrefixScheme::BeginInside, 0) => format!("B-{}", base),
                (PrefixScheme::BeginInside, _) => format!("I-{}", base),
            })
            .collect()
    }
}

/// Declares the labels of one model as an enum, each variant carrying its label string.
macro_rules! labels {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $label:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::label::Error;

            /// Parses a label with its prefix already stripped.
            fn from_str(label: &str) -> Result<Self, Self::Err> {
                match label {
                    $($label => Ok($name::$variant),)*
                    _ => Err(crate::label::Error::Unknown(label.to_string())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
