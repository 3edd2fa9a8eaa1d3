use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The closed vocabulary of recognized section headers. Anything outside
/// this set is treated as body text, never as a boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionTitle {
    Abstract,
    Introduction,
    Methods,
    Results,
    Conclusion,
}

impl SectionTitle {
    pub const ALL: [Self; 5] = [
        Self::Abstract,
        Self::Introduction,
        Self::Methods,
        Self::Results,
        Self::Conclusion,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Introduction => "introduction",
            Self::Methods => "methods",
            Self::Results => "results",
            Self::Conclusion => "conclusion",
        }
    }
}

impl std::fmt::Display for SectionTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionTitle {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abstract" => Ok(Self::Abstract),
            "introduction" => Ok(Self::Introduction),
            "methods" => Ok(Self::Methods),
            "results" => Ok(Self::Results),
            "conclusion" => Ok(Self::Conclusion),
            _ => Err(crate::Error::UnknownSectionTitle(s.to_string())),
        }
    }
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Abstract|Introduction|Methods|Results|Conclusion)\b")
        .expect("header vocabulary regex is valid")
});

/// Split raw page text into recognized sections.
///
/// Headers are matched case-insensitively on whole-word boundaries. A
/// section body runs from the end of its header to the start of the next
/// recognized header, or to the end of the text. Text before the first
/// header is discarded. A repeated header within the same text overwrites
/// the earlier body (last write wins for this one artifact).
///
/// Bodies are trimmed but otherwise untouched; an empty body still enters
/// the map and is excluded later by the empty-content rule.
#[must_use]
pub fn segment_sections(text: &str) -> BTreeMap<SectionTitle, String> {
    let mut sections = BTreeMap::new();

    let matches: Vec<_> = HEADER_RE.find_iter(text).collect();

    for (i, m) in matches.iter().enumerate() {
        let Ok(title) = m.as_str().parse::<SectionTitle>() else {
            continue;
        };

        let body_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
        let body = text[m.end()..body_end].trim();

        sections.insert(title, body.to_string());
    }

    sections
}
