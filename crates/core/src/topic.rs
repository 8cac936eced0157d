//! Topic filter — decides whether a query is in the real estate domain.
//!
//! The relay only talks to the Model Service for queries that pass the
//! filter. The policy sits behind the [`TopicFilter`] trait so deployments can
//! swap the keyword heuristic for something smarter without touching the relay.

use serde::{Deserialize, Serialize};

/// Keywords used when no vocabulary is configured.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "property",
    "apartment",
    "real estate",
    "investment",
    "rent",
    "location",
    "house",
    "buy",
];

/// Classifies a query as on-topic or not. Must be total over any input.
pub trait TopicFilter: Send + Sync {
    fn is_on_topic(&self, query: &str) -> bool;
}

/// How keywords are matched against the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring: "rent" matches inside "parent".
    #[default]
    Substring,
    /// Keyword words must appear as consecutive whole words.
    WholeWord,
}

/// Case-insensitive keyword matcher over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
    mode: MatchMode,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            mode,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied(), MatchMode::Substring)
    }
}

impl TopicFilter for KeywordFilter {
    fn is_on_topic(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        match self.mode {
            MatchMode::Substring => self.keywords.iter().any(|k| query.contains(k.as_str())),
            MatchMode::WholeWord => {
                let words = split_words(&query);
                self.keywords.iter().any(|k| {
                    let needle = split_words(k);
                    !needle.is_empty()
                        && words
                            .windows(needle.len())
                            .any(|window| window == needle.as_slice())
                })
            }
        }
    }
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}
