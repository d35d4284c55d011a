//! RDF graph model: owned triples and triple sets.
//!
//! The pipeline builds and compares graphs as plain values:
//!
//! - [`Triple`] / [`Term`] / [`Literal`]: owned, ordered, hashable RDF terms
//! - [`Graph`]: a set of triples with deterministic iteration order
//! - [`convert`]: conversion to and from `oxigraph` terms at the store boundary
//! - [`vocab`]: namespaces resolved once from configuration
//! - [`serialize`]: JSON-LD, RDF/XML and N-Triples output

pub mod convert;
pub mod serialize;
pub mod vocab;

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use oxigraph::model::vocab::xsd;

use crate::error::RdfError;

/// Result type for RDF model operations.
pub type RdfResult<T> = std::result::Result<T, RdfError>;

/// A node that can stand in subject position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    /// Absolute IRI.
    Iri(String),
    /// Blank node identifier, without the `_:` prefix.
    Blank(String),
}

impl Resource {
    pub fn iri(iri: impl Into<String>) -> Self {
        Resource::Iri(iri.into())
    }

    /// The IRI, if this is a named resource.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Resource::Iri(iri) => Some(iri),
            Resource::Blank(_) => None,
        }
    }
}

/// Kind of a literal: plain, language-tagged, or datatype-tagged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LiteralKind {
    Plain,
    Language(String),
    Typed(String),
}

/// An RDF literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub value: String,
    pub kind: LiteralKind,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Plain,
        }
    }

    pub fn language_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Language(language.into()),
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Typed(datatype.into()),
        }
    }

    /// Plain literal, tagged with `language` when one is given.
    pub fn text(value: impl Into<String>, language: Option<&str>) -> Self {
        match language {
            Some(lang) => Self::language_tagged(value, lang),
            None => Self::plain(value),
        }
    }

    /// `xsd:integer` literal.
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), xsd::INTEGER.as_str())
    }

    /// `xsd:dateTime` literal in RFC 3339 form. Sub-second digits are kept
    /// only when present.
    pub fn date_time(value: &DateTime<Utc>) -> Self {
        Self::typed(
            value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            xsd::DATE_TIME.as_str(),
        )
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::Language(lang) => Some(lang),
            _ => None,
        }
    }

    pub fn datatype(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::Typed(dt) => Some(dt),
            _ => None,
        }
    }
}

/// Object position of a triple: a resource reference or a literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Resource(Resource),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Resource(Resource::Iri(iri.into()))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Resource(r) => r.as_iri(),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            Term::Resource(_) => None,
        }
    }

    /// Lexical value: the IRI, blank node id, or literal value.
    pub fn value(&self) -> &str {
        match self {
            Term::Resource(Resource::Iri(v) | Resource::Blank(v)) => v,
            Term::Literal(l) => &l.value,
        }
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<Resource> for Term {
    fn from(resource: Resource) -> Self {
        Term::Resource(resource)
    }
}

/// A single (subject, predicate, object) statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Resource,
    /// Predicate IRI.
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Resource, predicate: impl Into<String>, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A set of triples. Duplicates collapse; iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// All objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(&'a self, subject: &'a str, predicate: &'a str) -> impl Iterator<Item = &'a Term> {
        self.triples
            .iter()
            .filter(move |t| t.subject.as_iri() == Some(subject) && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// All triples using `predicate`.
    pub fn with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Triple> {
        self.triples.iter().filter(move |t| t.predicate == predicate)
    }

    /// Copy of this graph without the triples matching `predicate`.
    pub fn without_predicate(&self, predicate: &str) -> Graph {
        self.triples
            .iter()
            .filter(|t| t.predicate != predicate)
            .cloned()
            .collect()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Resource::iri(s), p, Term::iri(o))
    }

    #[test]
    fn graph_is_a_set() {
        let mut g = Graph::new();
        assert!(g.insert(t("http://a", "http://p", "http://b")));
        assert!(!g.insert(t("http://a", "http://p", "http://b")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn literal_constructors() {
        let n = Literal::integer(1200);
        assert_eq!(n.value, "1200");
        assert_eq!(n.datatype(), Some("http://www.w3.org/2001/XMLSchema#integer"));

        let when = DateTime::parse_from_rfc3339("2024-12-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let d = Literal::date_time(&when);
        assert_eq!(d.value, "2024-12-01T09:30:00Z");
        assert_eq!(d.datatype(), Some("http://www.w3.org/2001/XMLSchema#dateTime"));

        assert_eq!(Literal::text("x", Some("en")).language(), Some("en"));
        assert_eq!(Literal::text("x", None).kind, LiteralKind::Plain);
    }

    #[test]
    fn date_time_keeps_fractional_seconds() {
        let when = DateTime::parse_from_rfc3339("2024-12-03T08:00:00.750Z")
            .unwrap()
            .with_timezone(&Utc);
        let d = Literal::date_time(&when);
        assert_eq!(d.value, "2024-12-03T08:00:00.750Z");
        let back = DateTime::parse_from_rfc3339(&d.value).unwrap().with_timezone(&Utc);
        assert_eq!(back, when);
    }

    #[test]
    fn objects_lookup() {
        let g: Graph = [
            t("http://a", "http://p", "http://b"),
            t("http://a", "http://p", "http://c"),
            t("http://x", "http://p", "http://d"),
        ]
        .into_iter()
        .collect();
        let objs: Vec<_> = g.objects("http://a", "http://p").filter_map(Term::as_iri).collect();
        assert_eq!(objs, vec!["http://b", "http://c"]);
    }
}
