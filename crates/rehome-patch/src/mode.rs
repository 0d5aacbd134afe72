use std::fmt::{Display, Formatter};

use serde::Deserialize;

/// How the placeholder in a file is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Plain substring replacement; the file may change length.
    Text,
    /// Length-preserving replacement within null-padded fields.
    Binary,
}

impl FileMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

impl Display for FileMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
