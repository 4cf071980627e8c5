use serde::{Deserialize, Serialize};
use std::fmt;

/// Language a post is written in, as reported by the model.
///
/// The prompt restricts the model to English or Hinglish. `Unknown` marks the
/// fallback record, and anything else the model says is kept verbatim in
/// `Other` rather than being coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    /// Plain English.
    English,
    /// Hindi written in Latin script, mixed with English.
    Hinglish,
    /// Language could not be determined.
    Unknown,
    /// Any other label the model produced.
    Other(String),
}

impl Language {
    /// Returns the label written to output files.
    pub fn as_str(&self) -> &str {
        match self {
            Self::English => "English",
            Self::Hinglish => "Hinglish",
            Self::Unknown => "Unknown",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for Language {
    fn from(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("english") {
            Self::English
        } else if trimmed.eq_ignore_ascii_case("hinglish") {
            Self::Hinglish
        } else if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
            Self::Unknown
        } else {
            Self::Other(trimmed.to_string())
        }
    }
}

impl From<String> for Language {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        match language {
            Language::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
