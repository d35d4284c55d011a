//! Vocabulary namespaces used by the mapping and query layers.
//!
//! Namespaces are external configuration; they are resolved once into a
//! [`Vocabulary`] and every term is built from it.

use oxigraph::model::vocab::rdf;

use crate::config::NamespaceConfig;

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// `rdf:type`.
pub fn rdf_type() -> &'static str {
    rdf::TYPE.as_str()
}

/// Resolved namespaces: base, schema.org, Dublin Core, PROV-O, SKOS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    base: String,
    schema: String,
    dc: String,
    prov: String,
    skos: String,
}

impl Vocabulary {
    pub fn from_config(config: &NamespaceConfig) -> Self {
        Self {
            base: config.base.clone(),
            schema: config.schema.clone(),
            dc: config.dc.clone(),
            prov: config.prov.clone(),
            skos: config.skos.clone(),
        }
    }

    pub fn base(&self, local: &str) -> String {
        format!("{}{local}", self.base)
    }

    pub fn schema(&self, local: &str) -> String {
        format!("{}{local}", self.schema)
    }

    pub fn dc(&self, local: &str) -> String {
        format!("{}{local}", self.dc)
    }

    pub fn prov(&self, local: &str) -> String {
        format!("{}{local}", self.prov)
    }

    pub fn skos(&self, local: &str) -> String {
        format!("{}{local}", self.skos)
    }

    /// Prefix bindings for serializers and query headers.
    pub fn prefixes(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("schema", self.schema.as_str()),
            ("dc", self.dc.as_str()),
            ("prov", self.prov.as_str()),
            ("skos", self.skos.as_str()),
            ("news", self.base.as_str()),
            ("rdf", RDF_NS),
            ("xsd", XSD_NS),
        ]
    }

    /// Shorten `iri` to `prefix:local` when a known namespace matches.
    pub fn compact(&self, iri: &str) -> String {
        self.prefixes()
            .into_iter()
            .filter_map(|(prefix, ns)| {
                let local = iri.strip_prefix(ns)?;
                let simple = !local.is_empty()
                    && local
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
                simple.then(|| (ns.len(), format!("{prefix}:{local}")))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, compacted)| compacted)
            .unwrap_or_else(|| iri.to_string())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_config(&NamespaceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_use_configured_namespaces() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.schema("headline"), "http://schema.org/headline");
        assert_eq!(vocab.dc("source"), "http://purl.org/dc/elements/1.1/source");
        assert_eq!(vocab.prov("Activity"), "http://www.w3.org/ns/prov#Activity");
        assert_eq!(vocab.skos("Concept"), "http://www.w3.org/2004/02/skos/core#Concept");
        assert_eq!(vocab.base("agent/system"), "http://example.org/news/agent/system");
    }

    #[test]
    fn compact_prefers_known_prefixes() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.compact("http://schema.org/headline"), "schema:headline");
        assert_eq!(
            vocab.compact("http://www.w3.org/2001/XMLSchema#dateTime"),
            "xsd:dateTime"
        );
        // Paths below the base namespace are left expanded.
        assert_eq!(
            vocab.compact("http://example.org/news/org/le-monde"),
            "http://example.org/news/org/le-monde"
        );
        assert_eq!(vocab.compact("https://other.example/x"), "https://other.example/x");
    }

    #[test]
    fn rdf_type_iri() {
        assert_eq!(rdf_type(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    }
}
