//! JSON shape of a directory import file.

use serde::{Deserialize, Serialize};

/// A whole import file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusDocument {
    #[serde(default)]
    pub categories: Vec<CategoryDoc>,
    #[serde(default)]
    pub authors: Vec<AuthorDoc>,
    #[serde(default)]
    pub entries: Vec<EntryDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDoc {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorDoc {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryDoc {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Public type slug (`gem`, `podcast`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub downloads_count: Option<i64>,
    #[serde(default)]
    pub members_count: Option<i64>,
    #[serde(default)]
    pub episodes_count: Option<i64>,
    /// Author handle.
    #[serde(default)]
    pub author: Option<String>,
    /// Category slugs.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

const fn default_published() -> bool {
    true
}

fn default_status() -> String {
    "approved".to_string()
}
