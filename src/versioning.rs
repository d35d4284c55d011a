//! Named-graph identities for article graphs.

/// Suffix appended to an article URI to name its graph.
pub const GRAPH_VERSION_SUFFIX: &str = "/graph/v1";

/// Named graph holding the RDF of `article_uri`.
///
/// Deterministic, so re-ingesting an article replaces the same graph.
pub fn graph_uri_for(article_uri: &str) -> String {
    format!("{article_uri}{GRAPH_VERSION_SUFFIX}")
}
