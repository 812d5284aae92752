// src/interception/policy.rs
//! Interception policy
//!
//! Classifies every outbound request URL as pass-through, synthetic-OK or
//! mock-eligible based on the configured `mockList`/`okList` substrings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Substring that marks the test target itself when no lists are configured
const LOCAL_TARGET_MARKER: &str = "localhost";

/// Outcome of classifying a request URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Forward to the live network untouched, ignore entirely
    Bypass,

    /// Answer with a canned 200 "OK", never persisted
    SyntheticOk,

    /// Serve from / record to the mock store
    Mockable,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Bypass => "bypass",
            Classification::SyntheticOk => "synthetic_ok",
            Classification::Mockable => "mockable",
        }
    }

    /// Whether requests with this classification are tracked and stored
    pub fn is_tracked(&self) -> bool {
        matches!(self, Classification::Mockable)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of URL substrings
///
/// Deserializes from a single string, a sequence of strings, or `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UrlList(Vec<String>);

impl UrlList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Simple substring containment against any entry
    pub fn matches(&self, url: &str) -> bool {
        self.0.iter().any(|entry| url.contains(entry.as_str()))
    }
}

impl<'de> Deserialize<'de> for UrlList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            None => UrlList::new(),
            Some(Repr::One(entry)) => UrlList(vec![entry]),
            Some(Repr::Many(entries)) => UrlList(entries),
        })
    }
}

impl From<&str> for UrlList {
    fn from(entry: &str) -> Self {
        UrlList(vec![entry.to_string()])
    }
}

impl From<String> for UrlList {
    fn from(entry: String) -> Self {
        UrlList(vec![entry])
    }
}

impl From<Vec<String>> for UrlList {
    fn from(entries: Vec<String>) -> Self {
        UrlList(entries)
    }
}

impl From<Vec<&str>> for UrlList {
    fn from(entries: Vec<&str>) -> Self {
        UrlList(entries.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<UrlList>> From<Option<T>> for UrlList {
    fn from(entries: Option<T>) -> Self {
        entries.map(Into::into).unwrap_or_default()
    }
}

/// Classify a URL against the mock and ok lists
///
/// Pure function; the request and response phases both call it with the same
/// session lists and therefore always agree.
pub fn classify(mock_list: &UrlList, ok_list: &UrlList, url: &str) -> Classification {
    let lists_configured = !mock_list.is_empty() || !ok_list.is_empty();

    if !lists_configured {
        return if url.contains(LOCAL_TARGET_MARKER) {
            Classification::Bypass
        } else {
            Classification::Mockable
        };
    }

    let in_mock = mock_list.matches(url);
    let in_ok = ok_list.matches(url);

    match (in_mock, in_ok) {
        (true, _) => Classification::Mockable,
        (false, true) => Classification::SyntheticOk,
        (false, false) => Classification::Bypass,
    }
}

/// Policy lists for one session, immutable once the session is active
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    pub mock_list: UrlList,
    pub ok_list: UrlList,
}

impl PolicyConfig {
    pub fn new(mock_list: impl Into<UrlList>, ok_list: impl Into<UrlList>) -> Self {
        Self {
            mock_list: mock_list.into(),
            ok_list: ok_list.into(),
        }
    }

    pub fn classify(&self, url: &str) -> Classification {
        classify(&self.mock_list, &self.ok_list, url)
    }
}
