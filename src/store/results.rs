//! Tabular query results and the SPARQL 1.1 JSON results format.

use std::collections::BTreeMap;

use oxigraph::model::vocab::xsd;
use serde::Deserialize;

use crate::graph::{Graph, Literal, Resource, Term};

/// Variable name used for the single binding of an ASK result.
pub const BOOLEAN_VARIABLE: &str = "result";

/// Variables of the rows a CONSTRUCT or DESCRIBE result is flattened into.
pub const TRIPLE_VARIABLES: [&str; 3] = ["s", "p", "o"];

/// Solutions of a SELECT query: the projected variables and one row of
/// bindings per solution. Unbound variables are absent from a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySolutions {
    pub variables: Vec<String>,
    pub rows: Vec<BTreeMap<String, Term>>,
}

impl QuerySolutions {
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            variables,
            rows: Vec::new(),
        }
    }

    /// An ASK answer as a one-row table.
    pub fn boolean(value: bool) -> Self {
        let mut solutions = Self::new(vec![BOOLEAN_VARIABLE.to_string()]);
        solutions.rows.push(BTreeMap::from([(
            BOOLEAN_VARIABLE.to_string(),
            Literal::typed(value.to_string(), xsd::BOOLEAN.as_str()).into(),
        )]));
        solutions
    }

    /// A CONSTRUCT/DESCRIBE answer as one `?s ?p ?o` row per triple.
    pub fn from_graph(graph: &Graph) -> Self {
        let [s, p, o] = TRIPLE_VARIABLES;
        let mut solutions = Self::new(TRIPLE_VARIABLES.iter().map(|v| v.to_string()).collect());
        for triple in graph {
            solutions.rows.push(BTreeMap::from([
                (s.to_string(), Term::from(triple.subject.clone())),
                (p.to_string(), Term::iri(triple.predicate.as_str())),
                (o.to_string(), triple.object.clone()),
            ]));
        }
        solutions
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values bound to `variable`, skipping rows where it is unbound.
    pub fn column<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a Term> {
        self.rows.iter().filter_map(move |row| row.get(variable))
    }

    /// Parse a `application/sparql-results+json` document.
    ///
    /// Bindings of unknown type are dropped rather than failing the whole
    /// document.
    pub fn from_sparql_json(body: &str) -> Result<Self, serde_json::Error> {
        let doc: SparqlJson = serde_json::from_str(body)?;
        if let Some(value) = doc.boolean {
            return Ok(Self::boolean(value));
        }
        let rows = doc
            .results
            .map(|r| r.bindings)
            .unwrap_or_default()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|(var, binding)| Some((var, binding.into_term()?)))
                    .collect()
            })
            .collect();
        Ok(Self {
            variables: doc.head.vars,
            rows,
        })
    }
}

#[derive(Deserialize)]
struct SparqlJson {
    #[serde(default)]
    head: Head,
    #[serde(default)]
    results: Option<Bindings>,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct Bindings {
    bindings: Vec<BTreeMap<String, RawBinding>>,
}

#[derive(Deserialize)]
struct RawBinding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(rename = "xml:lang", default)]
    lang: Option<String>,
    #[serde(default)]
    datatype: Option<String>,
}

impl RawBinding {
    fn into_term(self) -> Option<Term> {
        match self.kind.as_str() {
            "uri" => Some(Term::iri(self.value)),
            "bnode" => Some(Term::Resource(Resource::Blank(self.value))),
            // "typed-literal" is the pre-standard spelling some endpoints still emit.
            "literal" | "typed-literal" => Some(
                match (self.lang, self.datatype) {
                    (Some(lang), _) => Literal::language_tagged(self.value, lang),
                    (None, Some(dt)) if dt != xsd::STRING.as_str() => Literal::typed(self.value, dt),
                    (None, _) => Literal::plain(self.value),
                }
                .into(),
            ),
            other => {
                tracing::debug!(kind = other, "ignoring binding of unknown type");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_binding_kinds() {
        let body = r#"{
          "head": {"vars": ["article", "title", "wc", "b", "missing"]},
          "results": {"bindings": [
            {
              "article": {"type": "uri", "value": "http://example.org/a"},
              "title": {"type": "literal", "value": "Hola", "xml:lang": "es"},
              "wc": {"type": "typed-literal", "value": "12",
                     "datatype": "http://www.w3.org/2001/XMLSchema#integer"},
              "b": {"type": "bnode", "value": "n1"}
            },
            {
              "article": {"type": "uri", "value": "http://example.org/b"},
              "title": {"type": "literal", "value": "Plain",
                        "datatype": "http://www.w3.org/2001/XMLSchema#string"},
              "b": {"type": "triple", "value": "?"}
            }
          ]}
        }"#;
        let solutions = QuerySolutions::from_sparql_json(body).unwrap();
        assert_eq!(solutions.variables.len(), 5);
        assert_eq!(solutions.len(), 2);

        let first = &solutions.rows[0];
        assert_eq!(first["article"], Term::iri("http://example.org/a"));
        assert_eq!(first["title"], Term::from(Literal::language_tagged("Hola", "es")));
        assert_eq!(first["wc"], Term::from(Literal::integer(12)));
        assert_eq!(first["b"], Term::Resource(Resource::Blank("n1".into())));

        let second = &solutions.rows[1];
        assert_eq!(second["title"], Term::from(Literal::plain("Plain")));
        assert!(!second.contains_key("b"));
        assert_eq!(solutions.column("article").count(), 2);
        assert_eq!(solutions.column("missing").count(), 0);
    }

    #[test]
    fn ask_documents() {
        let solutions = QuerySolutions::from_sparql_json(r#"{"head": {}, "boolean": true}"#).unwrap();
        assert_eq!(solutions, QuerySolutions::boolean(true));
        assert_eq!(solutions.column(BOOLEAN_VARIABLE).next().unwrap().value(), "true");
    }

    #[test]
    fn graph_rows() {
        let graph: Graph = [crate::graph::Triple::new(
            Resource::iri("http://example.org/a"),
            "http://schema.org/name",
            Literal::plain("A"),
        )]
        .into_iter()
        .collect();
        let solutions = QuerySolutions::from_graph(&graph);
        assert_eq!(solutions.variables, vec!["s", "p", "o"]);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions.column("o").next().unwrap().value(), "A");
        assert_eq!(crate::store::graph_from_solutions(&solutions), graph);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(QuerySolutions::from_sparql_json("<html>").is_err());
        assert!(QuerySolutions::from_sparql_json(r#"{"results": {"bindings": 3}}"#).is_err());
    }
}
