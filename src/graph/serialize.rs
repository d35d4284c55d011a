//! Graph serializations: JSON-LD, RDF/XML and N-Triples.
//!
//! RDF/XML and N-Triples go through the `oxigraph` serializers. JSON-LD is
//! built directly as a `serde_json` document: a `@context` with the
//! vocabulary prefixes and one node object per subject in `@graph`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use oxigraph::io::{RdfFormat, RdfSerializer};
use serde_json::{Map, Value, json};

use crate::error::RdfError;

use super::vocab::{Vocabulary, rdf_type};
use super::{Graph, LiteralKind, RdfResult, Resource, Term};

/// Export serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    JsonLd,
    RdfXml,
    NTriples,
}

impl ExportFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            Self::JsonLd => "application/ld+json",
            Self::RdfXml => "application/rdf+xml",
            Self::NTriples => "application/n-triples",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::JsonLd => "jsonld",
            Self::RdfXml => "rdfxml",
            Self::NTriples => "ntriples",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonld" | "json-ld" => Ok(Self::JsonLd),
            "rdfxml" | "rdf/xml" | "xml" => Ok(Self::RdfXml),
            "ntriples" | "n-triples" | "nt" => Ok(Self::NTriples),
            other => Err(format!("unknown export format '{other}' (jsonld, rdfxml, ntriples)")),
        }
    }
}

/// Serialize `graph` in the requested format.
pub fn serialize(graph: &Graph, format: ExportFormat, vocab: &Vocabulary) -> RdfResult<String> {
    match format {
        ExportFormat::JsonLd => to_json_ld_string(graph, vocab),
        ExportFormat::RdfXml => to_rdf_xml(graph, vocab),
        ExportFormat::NTriples => to_ntriples(graph),
    }
}

/// N-Triples, one statement per line in graph order.
pub fn to_ntriples(graph: &Graph) -> RdfResult<String> {
    write_with(RdfSerializer::from_format(RdfFormat::NTriples), graph, "N-Triples")
}

/// RDF/XML with the vocabulary prefixes declared.
pub fn to_rdf_xml(graph: &Graph, vocab: &Vocabulary) -> RdfResult<String> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::RdfXml);
    for (prefix, namespace) in vocab.prefixes() {
        serializer = serializer
            .with_prefix(prefix, namespace)
            .map_err(|e| RdfError::Serialization {
                format: "RDF/XML".into(),
                message: format!("prefix {prefix}: {e}"),
            })?;
    }
    write_with(serializer, graph, "RDF/XML")
}

fn write_with(serializer: RdfSerializer, graph: &Graph, format: &str) -> RdfResult<String> {
    let error = |message: String| RdfError::Serialization {
        format: format.to_string(),
        message,
    };
    let mut writer = serializer.for_writer(Vec::new());
    for triple in graph {
        writer
            .serialize_triple(&triple.to_oxigraph()?)
            .map_err(|e| error(e.to_string()))?;
    }
    let bytes = writer.finish().map_err(|e| error(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| error(e.to_string()))
}

/// JSON-LD document with a compacted `@context` and one node per subject.
pub fn to_json_ld(graph: &Graph, vocab: &Vocabulary) -> Value {
    let mut context = Map::new();
    for (prefix, namespace) in vocab.prefixes() {
        context.insert(prefix.to_string(), json!(namespace));
    }

    let mut nodes: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for triple in graph {
        let id = match &triple.subject {
            Resource::Iri(iri) => iri.clone(),
            Resource::Blank(b) => format!("_:{b}"),
        };
        let node = nodes.entry(id.clone()).or_insert_with(|| {
            let mut node = Map::new();
            node.insert("@id".into(), json!(id));
            node
        });

        if triple.predicate == rdf_type() {
            if let Term::Resource(Resource::Iri(class)) = &triple.object {
                push_value(node, "@type", json!(vocab.compact(class)));
                continue;
            }
        }
        push_value(node, &vocab.compact(&triple.predicate), object_value(&triple.object));
    }

    json!({
        "@context": Value::Object(context),
        "@graph": nodes.into_values().map(Value::Object).collect::<Vec<_>>(),
    })
}

/// Pretty-printed JSON-LD.
pub fn to_json_ld_string(graph: &Graph, vocab: &Vocabulary) -> RdfResult<String> {
    serde_json::to_string_pretty(&to_json_ld(graph, vocab)).map_err(|e| RdfError::Serialization {
        format: "JSON-LD".into(),
        message: e.to_string(),
    })
}

fn object_value(term: &Term) -> Value {
    match term {
        Term::Resource(Resource::Iri(iri)) => json!({ "@id": iri }),
        Term::Resource(Resource::Blank(b)) => json!({ "@id": format!("_:{b}") }),
        Term::Literal(lit) => match &lit.kind {
            LiteralKind::Plain => json!(lit.value),
            LiteralKind::Language(lang) => json!({ "@value": lit.value, "@language": lang }),
            LiteralKind::Typed(dt) => json!({ "@value": lit.value, "@type": dt }),
        },
    }
}

/// Add `value` under `key`, promoting to an array on the second value.
fn push_value(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node.get_mut(key) {
        None => {
            node.insert(key.to_string(), value);
        }
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}
