//! Pre-graph bibliographic record

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Decode an explicit `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Author reference as returned by the search API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    #[serde(default)]
    pub author_id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

impl AuthorRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            author_id: None,
            name: Some(name.into()),
        }
    }
}

/// One fetched bibliographic item.
///
/// Title, abstract and year stay optional until the relevance filter has
/// run; afterwards all three are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Source identifier, unique per source
    #[serde(default, deserialize_with = "null_as_default")]
    pub paper_id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,

    #[serde(default)]
    pub year: Option<i32>,

    /// Missing counts as 0
    #[serde(default)]
    pub citation_count: Option<u64>,

    #[serde(default)]
    pub reference_count: Option<u64>,

    /// Ordered author list
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<AuthorRef>,

    /// May be empty
    #[serde(default)]
    pub venue: Option<String>,

    #[serde(default)]
    pub fields_of_study: Option<BTreeSet<String>>,
}

impl Record {
    /// Citation count with missing treated as 0
    pub fn citations(&self) -> u64 {
        self.citation_count.unwrap_or(0)
    }

    /// True when title, abstract and year are all present
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.abstract_text.is_some() && self.year.is_some()
    }

    /// Author names in source order, skipping unnamed entries
    pub fn author_names(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().filter_map(|a| a.name.as_deref())
    }

    /// Venue if present and non-empty
    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref().filter(|v| !v.trim().is_empty())
    }
}
