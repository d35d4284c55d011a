//! Validated article records, the input of the mapping engine.
//!
//! Records are produced by the persistence layer (out of scope here) and
//! handed over fully loaded: author and topics are embedded values, not
//! lazy references. The JSON form is what the CLI reads.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// A news article with its author, topics, and free-form metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Identity URI of the article resource.
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Language tag of the article text (`en`, `ro`, ...).
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub word_count: Option<u32>,
    /// Editorial class: Article, Editorial, Documentary, Podcast, Investigation...
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub sources: BTreeSet<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    /// When the record was first persisted.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Publisher or organization the author writes for.
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub dbpedia_uri: Option<String>,
    #[serde(default)]
    pub wikidata_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Matching DBpedia resource, if known.
    #[serde(default)]
    pub dbpedia_uri: Option<String>,
}

/// A key/value pair attached to an article, optionally naming the metadata
/// standard it comes from (DCMI, IPTC, schema.org).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    #[serde(default)]
    pub id: Option<u64>,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub standard: Option<String>,
}

impl ArticleRecord {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a record from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, RecordError> {
        let content = std::fs::read_to_string(path).map_err(|e| RecordError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| RecordError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
