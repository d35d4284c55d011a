//! SPARQL query construction.
//!
//! Every caller-supplied value reaches the query text through
//! [`ParameterizedQuery`], which renders it as an escaped RDF term. Query
//! templates never splice raw strings.
//!
//! - [`search`]: the faceted article search
//! - [`curated`]: fixed editorial queries with typed parameters
//! - [`format`]: SPARQL results serialization (JSON, XML, CSV)

pub mod curated;
pub mod format;
pub mod search;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use oxigraph::model as ox;
use oxigraph::model::vocab::xsd;

use crate::graph::RdfResult;
use crate::graph::convert::named_node;
use crate::graph::vocab::Vocabulary;

/// A SPARQL template with `?NAME` placeholders and typed bindings.
///
/// A placeholder is replaced only when the whole variable token matches a
/// bound name, and never inside string literals of the template. Unbound
/// placeholders stay query variables.
#[derive(Debug, Clone, Default)]
pub struct ParameterizedQuery {
    prefixes: Vec<(String, String)>,
    template: String,
    bindings: BTreeMap<String, String>,
}

impl ParameterizedQuery {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Default::default()
        }
    }

    /// Declare `PREFIX prefix: <namespace>` in the rendered header.
    pub fn with_prefix(mut self, prefix: &str, namespace: &str) -> RdfResult<Self> {
        let namespace = named_node(namespace)?;
        self.prefixes.push((prefix.to_string(), namespace.to_string()));
        Ok(self)
    }

    /// Declare the `schema`, `dc`, `skos` and `xsd` prefixes of `vocab`.
    pub fn with_news_prefixes(mut self, vocab: &Vocabulary) -> RdfResult<Self> {
        for (prefix, namespace) in vocab.prefixes() {
            if matches!(prefix, "schema" | "dc" | "skos" | "xsd") {
                self = self.with_prefix(prefix, namespace)?;
            }
        }
        Ok(self)
    }

    /// Append more template text.
    pub fn append(mut self, text: &str) -> Self {
        self.template.push_str(text);
        self
    }

    /// Bind a plain string literal.
    pub fn bind_literal(self, name: &str, value: &str) -> Self {
        self.bind(name, ox::Literal::new_simple_literal(value).to_string())
    }

    /// Bind an `xsd:integer` literal.
    pub fn bind_integer(self, name: &str, value: i64) -> Self {
        self.bind(
            name,
            ox::Literal::new_typed_literal(value.to_string(), xsd::INTEGER).to_string(),
        )
    }

    /// Bind an `xsd:dateTime` literal.
    pub fn bind_date_time(self, name: &str, value: &DateTime<Utc>) -> Self {
        let lexical = crate::graph::Literal::date_time(value).value;
        self.bind(
            name,
            ox::Literal::new_typed_literal(lexical, xsd::DATE_TIME).to_string(),
        )
    }

    /// Bind an IRI; rejected when it is not absolute.
    pub fn bind_iri(self, name: &str, iri: &str) -> RdfResult<Self> {
        let node = named_node(iri)?;
        Ok(self.bind(name, node.to_string()))
    }

    fn bind(mut self, name: &str, term: String) -> Self {
        self.bindings.insert(name.to_string(), term);
        self
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Render the query text.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len() + 256);
        for (prefix, namespace) in &self.prefixes {
            out.push_str(&format!("PREFIX {prefix}: {namespace}\n"));
        }
        self.render_template(&mut out);
        out
    }

    fn render_template(&self, out: &mut String) {
        let mut chars = self.template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' | '\'' => {
                    out.push(c);
                    // Copy the quoted literal verbatim, honoring backslash escapes.
                    while let Some(inner) = chars.next() {
                        out.push(inner);
                        if inner == '\\' {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        } else if inner == c {
                            break;
                        }
                    }
                }
                '?' | '$' => {
                    let mut name = String::new();
                    while let Some(&next) = chars.peek() {
                        if next.is_alphanumeric() || next == '_' {
                            name.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    match self.bindings.get(&name) {
                        Some(term) => out.push_str(term),
                        None => {
                            out.push(c);
                            out.push_str(&name);
                        }
                    }
                }
                _ => out.push(c),
            }
        }
    }
}

impl std::fmt::Display for ParameterizedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
