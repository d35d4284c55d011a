//! SPARQL results serialization.

use std::fmt;

use oxigraph::sparql::Variable;
use oxigraph::sparql::results::{QueryResultsFormat, QueryResultsSerializer};

use crate::error::RdfError;
use crate::graph::RdfResult;
use crate::store::QuerySolutions;

/// Output format of tabular results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFormat {
    #[default]
    Json,
    Xml,
    Csv,
}

impl ResultFormat {
    /// Case-insensitive format name; absent or unknown names select JSON.
    pub fn parse(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            Some("xml") => Self::Xml,
            Some("csv") => Self::Csv,
            _ => Self::Json,
        }
    }

    fn results_format(self) -> QueryResultsFormat {
        match self {
            Self::Json => QueryResultsFormat::Json,
            Self::Xml => QueryResultsFormat::Xml,
            Self::Csv => QueryResultsFormat::Csv,
        }
    }

    pub fn media_type(self) -> &'static str {
        self.results_format().media_type()
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Csv => "csv",
        })
    }
}

/// Serialize `solutions` in the SPARQL 1.1 results format for `format`.
pub fn format_results(solutions: &QuerySolutions, format: ResultFormat) -> RdfResult<String> {
    let error = |message: String| RdfError::Serialization {
        format: format.to_string(),
        message,
    };

    let variables = solutions
        .variables
        .iter()
        .map(|name| Variable::new(name.as_str()).map_err(|e| error(format!("variable {name}: {e}"))))
        .collect::<RdfResult<Vec<_>>>()?;

    let mut writer = QueryResultsSerializer::from_format(format.results_format())
        .serialize_solutions_to_writer(Vec::new(), variables.clone())
        .map_err(|e| error(e.to_string()))?;

    for row in &solutions.rows {
        let mut bound = Vec::with_capacity(row.len());
        for variable in &variables {
            if let Some(term) = row.get(variable.as_str()) {
                bound.push((variable, term.to_oxigraph()?));
            }
        }
        writer
            .serialize(bound.iter().map(|(v, t)| (*v, t)))
            .map_err(|e| error(e.to_string()))?;
    }

    let bytes = writer.finish().map_err(|e| error(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::graph::{Literal, Term};

    fn sample() -> QuerySolutions {
        let mut solutions = QuerySolutions::new(vec!["article".into(), "title".into()]);
        solutions.rows.push(BTreeMap::from([
            ("article".to_string(), Term::iri("http://example.org/a")),
            ("title".to_string(), Term::from(Literal::language_tagged("Floods, again", "en"))),
        ]));
        solutions.rows.push(BTreeMap::from([(
            "article".to_string(),
            Term::iri("http://example.org/b"),
        )]));
        solutions
    }

    #[test]
    fn format_names() {
        assert_eq!(ResultFormat::parse(Some("CSV")), ResultFormat::Csv);
        assert_eq!(ResultFormat::parse(Some(" xml ")), ResultFormat::Xml);
        assert_eq!(ResultFormat::parse(Some("turtle")), ResultFormat::Json);
        assert_eq!(ResultFormat::parse(None), ResultFormat::Json);
    }

    #[test]
    fn empty_csv_is_header_only() {
        let empty = QuerySolutions::new(vec!["article".into(), "title".into()]);
        let csv = format_results(&empty, ResultFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), "article,title");
    }

    #[test]
    fn unknown_format_matches_json() {
        let solutions = sample();
        let json = format_results(&solutions, ResultFormat::Json).unwrap();
        let unknown = format_results(&solutions, ResultFormat::parse(Some("yaml"))).unwrap();
        assert_eq!(json, unknown);

        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["head"]["vars"][1], "title");
        let bindings = doc["results"]["bindings"].as_array().unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0]["title"]["xml:lang"], "en");
        assert!(bindings[1].get("title").is_none());
    }

    #[test]
    fn csv_and_xml_rows() {
        let csv = format_results(&sample(), ResultFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("\"Floods, again\""));

        let xml = format_results(&sample(), ResultFormat::Xml).unwrap();
        assert!(xml.contains("<uri>http://example.org/b</uri>"));
    }
}
