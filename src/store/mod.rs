//! Named-graph storage.
//!
//! [`GraphStore`] is the contract the pipeline writes article graphs through:
//!
//! - [`HttpGraphStore`](http::HttpGraphStore): an external triple store over
//!   the SPARQL 1.1 Graph Store, Query and Update protocols
//! - [`MemoryGraphStore`](memory::MemoryGraphStore): an embedded `oxigraph`
//!   store with the same contract, for tests and offline runs
//!
//! Both speak SPARQL Update for writes when no Graph Store endpoint is
//! available; the update and query text is built by the helpers below.

pub mod http;
pub mod memory;
pub mod results;
#[cfg(test)]
pub(crate) mod test_server;

use crate::error::StoreError;
use crate::graph::convert::named_node;
use crate::graph::serialize::to_ntriples;
use crate::graph::{Graph, Term, Triple};

pub use results::QuerySolutions;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A store of named graphs.
pub trait GraphStore {
    /// Discard whatever `graph_uri` held and store exactly `graph`.
    fn replace(&self, graph_uri: &str, graph: &Graph) -> StoreResult<()>;

    /// Add the triples of `delta` to `graph_uri` (set union).
    fn merge(&self, graph_uri: &str, delta: &Graph) -> StoreResult<()>;

    /// Content of `graph_uri`; empty when the graph does not exist.
    fn fetch(&self, graph_uri: &str) -> StoreResult<Graph>;

    /// Evaluate a SPARQL query.
    fn query(&self, sparql: &str) -> StoreResult<QuerySolutions>;

    /// Execute a SPARQL update.
    fn update(&self, sparql: &str) -> StoreResult<()>;
}

impl<S: GraphStore + ?Sized> GraphStore for &S {
    fn replace(&self, graph_uri: &str, graph: &Graph) -> StoreResult<()> {
        (**self).replace(graph_uri, graph)
    }

    fn merge(&self, graph_uri: &str, delta: &Graph) -> StoreResult<()> {
        (**self).merge(graph_uri, delta)
    }

    fn fetch(&self, graph_uri: &str) -> StoreResult<Graph> {
        (**self).fetch(graph_uri)
    }

    fn query(&self, sparql: &str) -> StoreResult<QuerySolutions> {
        (**self).query(sparql)
    }

    fn update(&self, sparql: &str) -> StoreResult<()> {
        (**self).update(sparql)
    }
}

/// `DROP SILENT GRAPH` followed by `INSERT DATA` of the whole graph.
pub fn replace_update(graph_uri: &str, graph: &Graph) -> StoreResult<String> {
    let name = named_node(graph_uri)?;
    let drop = format!("DROP SILENT GRAPH {name}");
    if graph.is_empty() {
        return Ok(drop);
    }
    Ok(format!("{drop} ;\n{}", insert_update(graph_uri, graph)?))
}

/// `INSERT DATA` of `graph` into `graph_uri`.
pub fn insert_update(graph_uri: &str, graph: &Graph) -> StoreResult<String> {
    let name = named_node(graph_uri)?;
    let body = to_ntriples(graph)?;
    Ok(format!("INSERT DATA {{ GRAPH {name} {{\n{body}}} }}"))
}

/// SELECT of every triple in `graph_uri`, bound to `?s ?p ?o`.
pub fn select_graph_query(graph_uri: &str) -> StoreResult<String> {
    let name = named_node(graph_uri)?;
    Ok(format!("SELECT ?s ?p ?o WHERE {{ GRAPH {name} {{ ?s ?p ?o }} }}"))
}

/// Rebuild a graph from `?s ?p ?o` solutions. Rows with a literal subject or
/// a non-IRI predicate are skipped.
pub fn graph_from_solutions(solutions: &QuerySolutions) -> Graph {
    solutions
        .rows
        .iter()
        .filter_map(|row| {
            let Term::Resource(subject) = row.get("s")?.clone() else {
                return None;
            };
            let predicate = row.get("p")?.as_iri()?;
            Some(Triple::new(subject, predicate, row.get("o")?.clone()))
        })
        .collect()
}
