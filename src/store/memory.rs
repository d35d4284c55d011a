//! In-process graph store backed by an embedded oxigraph [`Store`].
//!
//! Writes go through SPARQL Update exactly like the HTTP fallback, so the
//! same update text is exercised without a live endpoint.

use std::collections::BTreeMap;

use oxigraph::sparql::{Query, QueryResults, Update};
use oxigraph::store::Store;

use crate::error::StoreError;
use crate::graph::{Graph, Term, Triple};

use super::{
    GraphStore, QuerySolutions, StoreResult, graph_from_solutions, insert_update, replace_update,
    select_graph_query,
};

/// Endpoint label used in errors raised by the embedded store.
const ENDPOINT: &str = "memory";

/// Embedded, non-persistent graph store.
pub struct MemoryGraphStore {
    store: Store,
}

impl MemoryGraphStore {
    pub fn new() -> StoreResult<Self> {
        let store = Store::new().map_err(|e| unavailable(format!("failed to create store: {e}")))?;
        Ok(Self { store })
    }

    /// Total number of quads across all graphs.
    pub fn len(&self) -> StoreResult<usize> {
        self.store
            .len()
            .map_err(|e| unavailable(format!("count failed: {e}")))
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl GraphStore for MemoryGraphStore {
    fn replace(&self, graph_uri: &str, graph: &Graph) -> StoreResult<()> {
        self.update(&replace_update(graph_uri, graph)?)?;
        tracing::debug!(graph = graph_uri, triples = graph.len(), "replaced graph");
        Ok(())
    }

    fn merge(&self, graph_uri: &str, delta: &Graph) -> StoreResult<()> {
        if delta.is_empty() {
            return Ok(());
        }
        self.update(&insert_update(graph_uri, delta)?)?;
        tracing::debug!(graph = graph_uri, triples = delta.len(), "merged into graph");
        Ok(())
    }

    fn fetch(&self, graph_uri: &str) -> StoreResult<Graph> {
        let solutions = self.query(&select_graph_query(graph_uri)?)?;
        Ok(graph_from_solutions(&solutions))
    }

    fn query(&self, sparql: &str) -> StoreResult<QuerySolutions> {
        let query = Query::parse(sparql, None).map_err(|e| StoreError::QuerySyntax {
            message: e.to_string(),
        })?;
        let results = self
            .store
            .query(query)
            .map_err(|e| unavailable(format!("query failed: {e}")))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let variables = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut out = QuerySolutions::new(variables);
                for solution in solutions {
                    let solution =
                        solution.map_err(|e| unavailable(format!("solution error: {e}")))?;
                    let row: BTreeMap<String, Term> = solution
                        .iter()
                        .filter_map(|(var, term)| {
                            Some((var.as_str().to_string(), Term::from_oxigraph(term)?))
                        })
                        .collect();
                    out.rows.push(row);
                }
                Ok(out)
            }
            QueryResults::Boolean(b) => Ok(QuerySolutions::boolean(b)),
            QueryResults::Graph(triples) => {
                let mut graph = Graph::new();
                for triple in triples {
                    let triple = triple.map_err(|e| unavailable(format!("triple error: {e}")))?;
                    let subject: oxigraph::model::Term = triple.subject.into();
                    if let Some(t) =
                        Triple::from_oxigraph_parts(&subject, &triple.predicate, &triple.object)
                    {
                        graph.insert(t);
                    }
                }
                Ok(QuerySolutions::from_graph(&graph))
            }
        }
    }

    fn update(&self, sparql: &str) -> StoreResult<()> {
        let update = Update::parse(sparql, None).map_err(|e| StoreError::QuerySyntax {
            message: e.to_string(),
        })?;
        self.store
            .update(update)
            .map_err(|e| unavailable(format!("update failed: {e}")))
    }
}

impl std::fmt::Debug for MemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGraphStore").finish()
    }
}

fn unavailable(message: String) -> StoreError {
    StoreError::Unavailable {
        endpoint: ENDPOINT.into(),
        message,
    }
}
