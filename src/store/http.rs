//! Graph store client for an external SPARQL 1.1 service.
//!
//! With a Graph Store Protocol endpoint configured, named graphs are written
//! with `PUT`/`POST ?graph=` and read with `GET ?graph=`, all as N-Triples.
//! Without one, writes become SPARQL Update requests and reads a SELECT over
//! the named graph. Queries are `POST application/sparql-query`, answered
//! with SPARQL JSON results or, for CONSTRUCT and DESCRIBE, N-Triples that
//! become `?s ?p ?o` rows. Updates are `POST application/sparql-update`.
//! Any response body the client cannot read counts as the store being
//! unavailable.
//!
//! Requests are blocking and are not retried.

use std::time::Duration;

use oxigraph::io::{RdfFormat, RdfParser};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::graph::serialize::to_ntriples;
use crate::graph::{Graph, Triple};

use super::{
    GraphStore, QuerySolutions, StoreResult, graph_from_solutions, insert_update, replace_update,
    select_graph_query,
};

const NTRIPLES: &str = "application/n-triples";
const SPARQL_QUERY: &str = "application/sparql-query";
const SPARQL_UPDATE: &str = "application/sparql-update";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const QUERY_ACCEPT: &str = "application/sparql-results+json, application/n-triples;q=0.9";

/// Client for a remote triple store.
pub struct HttpGraphStore {
    agent: ureq::Agent,
    query_url: String,
    update_url: String,
    graph_store_url: Option<String>,
}

impl HttpGraphStore {
    pub fn new(config: &StoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        let graph_store_url = config
            .graph_store_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        Self {
            agent,
            query_url: config.query_url.clone(),
            update_url: config.update_url.clone(),
            graph_store_url,
        }
    }

    /// Whether named graphs go through the Graph Store Protocol.
    pub fn uses_graph_store_protocol(&self) -> bool {
        self.graph_store_url.is_some()
    }

    fn put_or_post(&self, gsp: &str, method: &str, graph_uri: &str, graph: &Graph) -> StoreResult<()> {
        let body = to_ntriples(graph)?;
        self.agent
            .request(method, gsp)
            .query("graph", graph_uri)
            .set("Content-Type", NTRIPLES)
            .send_string(&body)
            .map_err(|e| classify(gsp, e, false))?;
        Ok(())
    }

    fn get_graph(&self, gsp: &str, graph_uri: &str) -> StoreResult<Graph> {
        let response = match self
            .agent
            .get(gsp)
            .query("graph", graph_uri)
            .set("Accept", NTRIPLES)
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => {
                tracing::debug!(graph = graph_uri, "graph not found, treating as empty");
                return Ok(Graph::new());
            }
            Err(e) => return Err(classify(gsp, e, false)),
        };
        let body = read_body(gsp, response)?;
        parse_ntriples(gsp, &body)
    }
}

impl GraphStore for HttpGraphStore {
    fn replace(&self, graph_uri: &str, graph: &Graph) -> StoreResult<()> {
        match &self.graph_store_url {
            Some(gsp) => self.put_or_post(gsp, "PUT", graph_uri, graph)?,
            None => self.update(&replace_update(graph_uri, graph)?)?,
        }
        tracing::info!(graph = graph_uri, triples = graph.len(), "replaced named graph");
        Ok(())
    }

    fn merge(&self, graph_uri: &str, delta: &Graph) -> StoreResult<()> {
        if delta.is_empty() {
            return Ok(());
        }
        match &self.graph_store_url {
            Some(gsp) => self.put_or_post(gsp, "POST", graph_uri, delta)?,
            None => self.update(&insert_update(graph_uri, delta)?)?,
        }
        tracing::info!(graph = graph_uri, triples = delta.len(), "merged into named graph");
        Ok(())
    }

    fn fetch(&self, graph_uri: &str) -> StoreResult<Graph> {
        match &self.graph_store_url {
            Some(gsp) => self.get_graph(gsp, graph_uri),
            None => Ok(graph_from_solutions(&self.query(&select_graph_query(graph_uri)?)?)),
        }
    }

    fn query(&self, sparql: &str) -> StoreResult<QuerySolutions> {
        let response = self
            .agent
            .post(&self.query_url)
            .set("Content-Type", SPARQL_QUERY)
            .set("Accept", QUERY_ACCEPT)
            .send_string(sparql)
            .map_err(|e| classify(&self.query_url, e, true))?;
        let graph_answer = response.content_type() == NTRIPLES;
        let body = read_body(&self.query_url, response)?;
        if graph_answer {
            return Ok(QuerySolutions::from_graph(&parse_ntriples(&self.query_url, &body)?));
        }
        QuerySolutions::from_sparql_json(&body).map_err(|e| StoreError::Unavailable {
            endpoint: self.query_url.clone(),
            message: format!("malformed SPARQL JSON results: {e}"),
        })
    }

    fn update(&self, sparql: &str) -> StoreResult<()> {
        self.agent
            .post(&self.update_url)
            .set("Content-Type", SPARQL_UPDATE)
            .send_string(sparql)
            .map_err(|e| classify(&self.update_url, e, true))?;
        Ok(())
    }
}

impl std::fmt::Debug for HttpGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGraphStore")
            .field("query_url", &self.query_url)
            .field("update_url", &self.update_url)
            .field("graph_store_url", &self.graph_store_url)
            .finish()
    }
}

/// Map a transport or HTTP failure to a store error.
///
/// A 400 from a query or update endpoint means the SPARQL text was rejected.
fn classify(endpoint: &str, error: ureq::Error, sparql_endpoint: bool) -> StoreError {
    match error {
        ureq::Error::Status(400, response) if sparql_endpoint => StoreError::QuerySyntax {
            message: response
                .into_string()
                .unwrap_or_else(|_| "rejected by endpoint".into()),
        },
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            StoreError::Unavailable {
                endpoint: endpoint.to_string(),
                message: format!("HTTP {code}: {preview}"),
            }
        }
        ureq::Error::Transport(transport) => StoreError::Unavailable {
            endpoint: endpoint.to_string(),
            message: transport.to_string(),
        },
    }
}

fn read_body(endpoint: &str, response: ureq::Response) -> StoreResult<String> {
    response.into_string().map_err(|e| StoreError::Unavailable {
        endpoint: endpoint.to_string(),
        message: format!("failed to read response body: {e}"),
    })
}

/// Graph from an N-Triples response body of `endpoint`.
fn parse_ntriples(endpoint: &str, body: &str) -> StoreResult<Graph> {
    let malformed = |message: String| StoreError::Unavailable {
        endpoint: endpoint.to_string(),
        message: format!("malformed N-Triples response: {message}"),
    };
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(RdfFormat::NTriples).for_reader(body.as_bytes()) {
        let quad = quad.map_err(|e| malformed(e.to_string()))?;
        graph.insert(Triple::try_from(&quad).map_err(|e| malformed(e.to_string()))?);
    }
    Ok(graph)
}
