//! Rich diagnostic error types for the news-provenance pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. `NewsError` aggregates them for callers
//! that drive the whole pipeline (the CLI, the article service).

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the pipeline.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum NewsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(#[from] RecordError),
}

pub type NewsResult<T> = std::result::Result<T, NewsError>;

// ---------------------------------------------------------------------------
// RDF errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RdfError {
    #[error("invalid IRI <{iri}>: {message}")]
    #[diagnostic(
        code(newsprov::rdf::invalid_iri),
        help(
            "IRIs must be absolute (scheme + path) and must not contain spaces, \
             angle brackets or quotes. Check the namespace configuration and the \
             URLs carried by the record."
        )
    )]
    InvalidIri { iri: String, message: String },

    #[error("invalid language tag \"{tag}\": {message}")]
    #[diagnostic(
        code(newsprov::rdf::invalid_language),
        help("Language tags follow BCP 47, e.g. `en`, `ro`, `pt-BR`.")
    )]
    InvalidLanguageTag { tag: String, message: String },

    #[error("invalid blank node identifier \"{id}\"")]
    #[diagnostic(
        code(newsprov::rdf::invalid_blank_node),
        help("Blank node identifiers must be non-empty and contain no whitespace.")
    )]
    InvalidBlankNode { id: String },

    #[error("failed to serialize as {format}: {message}")]
    #[diagnostic(
        code(newsprov::rdf::serialize),
        help("The RDF serializer rejected the graph. This usually indicates an invalid term.")
    )]
    Serialization { format: String, message: String },

    #[error("failed to parse {format}: {message}")]
    #[diagnostic(
        code(newsprov::rdf::parse),
        help("The payload returned by the store is not valid for the announced format.")
    )]
    Parse { format: String, message: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("graph store unavailable at {endpoint}: {message}")]
    #[diagnostic(
        code(newsprov::store::unavailable),
        help(
            "The triple store could not be reached or answered with an error. \
             Check that the SPARQL endpoints in `[store]` are correct and that the \
             service is running. Exports recompute the graph only when the store answers \
             with an empty graph, not when it fails."
        )
    )]
    Unavailable { endpoint: String, message: String },

    #[error("malformed SPARQL: {message}")]
    #[diagnostic(
        code(newsprov::store::query_syntax),
        help("The query or update text was rejected by the SPARQL parser. Check the syntax.")
    )]
    QuerySyntax { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rdf(#[from] RdfError),
}

// ---------------------------------------------------------------------------
// Enrichment errors
// ---------------------------------------------------------------------------

/// Failure of a single external label source.
///
/// The enrichment mediator downgrades every variant to "zero candidates";
/// these never reach callers of the pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum EnrichmentError {
    #[error("{source_name}: request timed out")]
    #[diagnostic(code(newsprov::enrich::timeout))]
    Timeout { source_name: String },

    #[error("{source_name}: request failed: {message}")]
    #[diagnostic(code(newsprov::enrich::request))]
    Request { source_name: String, message: String },

    #[error("{source_name}: malformed response: {message}")]
    #[diagnostic(code(newsprov::enrich::response))]
    Response { source_name: String, message: String },
}

pub type EnrichmentResult<T> = std::result::Result<T, EnrichmentError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(newsprov::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(newsprov::config::parse),
        help(
            "Check the TOML syntax and values. Sections: [namespaces], [store], [enrichment]; \
             enrichment.limit is between 1 and 5."
        )
    )]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error("failed to read article record: {path}")]
    #[diagnostic(code(newsprov::record::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse article record: {path}: {message}")]
    #[diagnostic(
        code(newsprov::record::parse),
        help("Records are JSON objects with at least a `uri` field; other fields use camelCase names.")
    )]
    Parse { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_wraps_rdf_error() {
        let err: StoreError = RdfError::InvalidIri {
            iri: "not an iri".into(),
            message: "no scheme".into(),
        }
        .into();
        assert!(matches!(err, StoreError::Rdf(_)));
        assert!(err.to_string().contains("not an iri"));
    }

    #[test]
    fn news_error_keeps_diagnostic_code() {
        let err: NewsError = StoreError::QuerySyntax {
            message: "unexpected token".into(),
        }
        .into();
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("newsprov::store::query_syntax"));
    }

    #[test]
    fn unavailable_help_describes_export_behavior() {
        let err = StoreError::Unavailable {
            endpoint: "http://store/data".into(),
            message: "connection refused".into(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("only when the store answers with an empty graph"), "{help}");
        assert!(!help.contains("fall back"));
    }
}
