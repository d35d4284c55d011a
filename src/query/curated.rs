//! Fixed editorial queries, parameterized like the search query.

use chrono::{NaiveDate, NaiveTime};

use crate::graph::RdfResult;

use super::ParameterizedQuery;
use super::search::QueryBuilder;

/// Nationality substring used when none is given.
pub const DEFAULT_NATIONALITY: &str = "roman";

/// A curated query and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuratedQuery {
    /// Editorials on a topic published on or after a day.
    FreshEditorials { topic: String, since: NaiveDate },
    /// Articles in either of two languages, under a word count, matching a topic.
    ArticlesByLanguage {
        first_language: String,
        second_language: String,
        max_words: u32,
        topic: String,
    },
    /// Investigations and documentaries whose author nationality contains a substring.
    Investigations { nationality: String },
}

const FRESH_EDITORIALS: &str = "\
SELECT ?article ?title ?published ?description
WHERE {
  GRAPH ?g {
    ?article a schema:NewsArticle ;
             schema:headline ?title .
    OPTIONAL { ?article schema:description ?description . }
    OPTIONAL { ?article schema:datePublished ?published . }
    OPTIONAL { ?article schema:genre ?genre . }
    OPTIONAL { ?article dc:type ?dcType . }
    OPTIONAL { ?article dc:subject ?subject . }

    FILTER( (BOUND(?genre) && LCASE(STR(?genre)) = \"editorial\")
         || (BOUND(?dcType) && LCASE(STR(?dcType)) = \"editorial\") )
    FILTER( !BOUND(?subject) || CONTAINS(LCASE(STR(?subject)), LCASE(?TOPIC)) )
    FILTER( !BOUND(?published) || ?published >= ?SINCE )
  }
}
ORDER BY DESC(?published)
LIMIT 50
";

const ARTICLES_BY_LANGUAGE: &str = "\
SELECT ?article ?title ?language ?wordCount ?description
WHERE {
  GRAPH ?g {
    ?article a schema:NewsArticle ;
             schema:headline ?title ;
             schema:inLanguage ?language ;
             schema:wordCount ?wordCount .
    OPTIONAL { ?article schema:description ?description . }
    OPTIONAL { ?article dc:subject ?subject . }
    OPTIONAL {
      ?article schema:about ?c .
      OPTIONAL { ?c skos:prefLabel ?cLabel . }
    }
  }
  FILTER(?language = ?LANG1 || ?language = ?LANG2)
  FILTER(?wordCount < ?MAXW)
  FILTER(
    (BOUND(?subject) && CONTAINS(LCASE(STR(?subject)), LCASE(?TOPIC))) ||
    (BOUND(?cLabel) && CONTAINS(LCASE(STR(?cLabel)), LCASE(?TOPIC))) ||
    CONTAINS(LCASE(STR(?title)), LCASE(?TOPIC))
  )
}
ORDER BY ?wordCount
LIMIT 100
";

const INVESTIGATIONS: &str = "\
SELECT ?article ?title ?description ?author ?published ?genre
WHERE {
  GRAPH ?g {
    ?article a schema:NewsArticle ;
             schema:headline ?title ;
             schema:author ?authorNode .
    OPTIONAL { ?article schema:description ?description . }
    OPTIONAL { ?article schema:datePublished ?published . }
    OPTIONAL { ?article schema:genre ?genre . }
    ?authorNode schema:name ?author .
    OPTIONAL { ?authorNode schema:nationality ?nat . }
  }
  FILTER(BOUND(?nat) && CONTAINS(LCASE(STR(?nat)), LCASE(?NAT)))
  FILTER(BOUND(?genre) && (LCASE(STR(?genre)) = \"investigation\" || LCASE(STR(?genre)) = \"documentary\"))
}
ORDER BY DESC(?published)
LIMIT 100
";

impl QueryBuilder {
    /// Render a curated query.
    pub fn curated(&self, query: &CuratedQuery) -> RdfResult<String> {
        match query {
            CuratedQuery::FreshEditorials { topic, since } => self.fresh_editorials(topic, *since),
            CuratedQuery::ArticlesByLanguage {
                first_language,
                second_language,
                max_words,
                topic,
            } => self.articles_by_language(first_language, second_language, *max_words, topic),
            CuratedQuery::Investigations { nationality } => {
                self.investigations_by_nationality(nationality)
            }
        }
    }

    /// Editorials matching `topic`, published since midnight UTC of `since`.
    pub fn fresh_editorials(&self, topic: &str, since: NaiveDate) -> RdfResult<String> {
        let since = since.and_time(NaiveTime::MIN).and_utc();
        Ok(ParameterizedQuery::new(FRESH_EDITORIALS)
            .with_news_prefixes(self.vocab())?
            .bind_literal("TOPIC", topic)
            .bind_date_time("SINCE", &since)
            .render())
    }

    pub fn articles_by_language(
        &self,
        first_language: &str,
        second_language: &str,
        max_words: u32,
        topic: &str,
    ) -> RdfResult<String> {
        Ok(ParameterizedQuery::new(ARTICLES_BY_LANGUAGE)
            .with_news_prefixes(self.vocab())?
            .bind_literal("LANG1", first_language)
            .bind_literal("LANG2", second_language)
            .bind_integer("MAXW", i64::from(max_words))
            .bind_literal("TOPIC", topic)
            .render())
    }

    /// Investigations and documentaries by authors whose nationality contains
    /// `nationality` (case-insensitive); blank means [`DEFAULT_NATIONALITY`].
    pub fn investigations_by_nationality(&self, nationality: &str) -> RdfResult<String> {
        let nationality = match nationality.trim() {
            "" => DEFAULT_NATIONALITY,
            n => n,
        };
        Ok(ParameterizedQuery::new(INVESTIGATIONS)
            .with_news_prefixes(self.vocab())?
            .bind_literal("NAT", nationality)
            .render())
    }
}
