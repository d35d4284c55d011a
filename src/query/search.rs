//! Faceted article search over every article graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::RdfResult;
use crate::graph::vocab::Vocabulary;

use super::ParameterizedQuery;

/// Maximum rows returned by a search.
pub const SEARCH_LIMIT: usize = 100;

/// Search filters. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Free text matched against title, description, subjects and topic labels.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub max_words: Option<u32>,
    /// Topic name matched against subjects and topic labels.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_to: Option<DateTime<Utc>>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

const SELECT: &str = "\
SELECT DISTINCT ?article ?title ?description ?language ?wordCount ?published ?genre
WHERE {
  GRAPH ?g {
    ?article a schema:NewsArticle ;
             schema:headline ?title .
    OPTIONAL { ?article schema:description ?description . }
    OPTIONAL { ?article schema:inLanguage ?language . }
    OPTIONAL { ?article schema:wordCount ?wordCount . }
    OPTIONAL { ?article schema:datePublished ?published . }
    OPTIONAL { ?article schema:genre ?genre . }
    OPTIONAL { ?article dc:subject ?subject . }
    OPTIONAL {
      ?article schema:about ?c .
      OPTIONAL { ?c skos:prefLabel ?cLabel . }
    }
  }
";

const TEXT_FILTER: &str = "  FILTER(
    CONTAINS(LCASE(STR(?title)), LCASE(?Q)) ||
    (BOUND(?description) && CONTAINS(LCASE(STR(?description)), LCASE(?Q))) ||
    (BOUND(?subject) && CONTAINS(LCASE(STR(?subject)), LCASE(?Q))) ||
    (BOUND(?cLabel) && CONTAINS(LCASE(STR(?cLabel)), LCASE(?Q)))
  )
";

const TOPIC_FILTER: &str = "  FILTER(
    (BOUND(?subject) && CONTAINS(LCASE(STR(?subject)), LCASE(?TOPIC))) ||
    (BOUND(?cLabel) && CONTAINS(LCASE(STR(?cLabel)), LCASE(?TOPIC)))
  )
";

/// Builds search queries against the configured vocabulary.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    vocab: Vocabulary,
}

impl QueryBuilder {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Build the search query for `criteria`. Every filter value is bound
    /// as a parameter.
    pub fn build_search_query(&self, criteria: &SearchCriteria) -> RdfResult<String> {
        let mut q = ParameterizedQuery::new(SELECT).with_news_prefixes(&self.vocab)?;

        if let Some(text) = non_blank(&criteria.query) {
            q = q.append(TEXT_FILTER).bind_literal("Q", text);
        }
        if let Some(topic) = non_blank(&criteria.topic) {
            q = q.append(TOPIC_FILTER).bind_literal("TOPIC", topic);
        }
        if let Some(language) = non_blank(&criteria.language) {
            q = q
                .append("  FILTER(!BOUND(?language) || ?language = ?LANG)\n")
                .bind_literal("LANG", language);
        }
        if let Some(max) = criteria.max_words {
            q = q
                .append("  FILTER(!BOUND(?wordCount) || ?wordCount <= ?MAXW)\n")
                .bind_integer("MAXW", i64::from(max));
        }
        if let Some(media_type) = non_blank(&criteria.media_type) {
            q = q
                .append("  FILTER(!BOUND(?genre) || LCASE(STR(?genre)) = LCASE(?MT))\n")
                .bind_literal("MT", media_type);
        }
        if let Some(from) = &criteria.date_from {
            q = q
                .append("  FILTER(!BOUND(?published) || ?published >= ?FROM)\n")
                .bind_date_time("FROM", from);
        }
        if let Some(to) = &criteria.date_to {
            q = q
                .append("  FILTER(!BOUND(?published) || ?published <= ?TO)\n")
                .bind_date_time("TO", to);
        }

        let q = q.append(&format!("}}\nORDER BY DESC(?published)\nLIMIT {SEARCH_LIMIT}\n"));
        Ok(q.render())
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}
