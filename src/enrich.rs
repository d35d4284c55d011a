//! Best-effort linked-data enrichment.
//!
//! A keyword taken from the article title is looked up in external label
//! sources (DBpedia and Wikidata by default). Every matching resource becomes
//! a `schema:about` edge merged into the article graph. Source failures are
//! logged and count as "no candidates"; only the final store merge can fail.

use std::time::Duration;

use crate::config::{EnrichmentConfig, MAX_CANDIDATES};
use crate::error::{EnrichmentError, EnrichmentResult};
use crate::graph::convert::is_valid_iri;
use crate::graph::vocab::Vocabulary;
use crate::graph::{Graph, Resource, Term, Triple};
use crate::query::ParameterizedQuery;
use crate::record::ArticleRecord;
use crate::store::{GraphStore, QuerySolutions, StoreResult};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// An external source of resources whose label matches a keyword.
pub trait LabelSource: Send + Sync {
    /// Short name used in logs and outcomes.
    fn name(&self) -> &str;

    /// IRIs of resources whose English label contains `keyword`.
    fn find_resources(&self, keyword: &str) -> EnrichmentResult<Vec<String>>;
}

/// Label lookup against a public SPARQL endpoint.
pub struct SparqlLabelSource {
    name: String,
    endpoint: String,
    variable: String,
    query: ParameterizedQuery,
    agent: ureq::Agent,
}

impl SparqlLabelSource {
    /// DBpedia: `?resource rdfs:label ?label`. `limit` is clamped to
    /// [`MAX_CANDIDATES`].
    pub fn dbpedia(endpoint: &str, timeout: Duration, limit: usize) -> Self {
        let limit = limit.clamp(1, MAX_CANDIDATES);
        let template = format!(
            "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?resource
WHERE {{
  ?resource rdfs:label ?label .
  FILTER(LANG(?label) = \"en\")
  FILTER(CONTAINS(LCASE(STR(?label)), LCASE(?PHRASE)))
}}
LIMIT {limit}
"
        );
        Self::new("dbpedia", endpoint, "resource", template, timeout)
    }

    /// Wikidata: `?item rdfs:label ?label`, with the label service enabled.
    pub fn wikidata(endpoint: &str, timeout: Duration, limit: usize) -> Self {
        let limit = limit.clamp(1, MAX_CANDIDATES);
        let template = format!(
            "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX bd: <http://www.bigdata.com/rdf#>
SELECT ?item
WHERE {{
  ?item rdfs:label ?label .
  FILTER(LANG(?label) = \"en\")
  FILTER(CONTAINS(LCASE(STR(?label)), LCASE(?PHRASE)))
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\". }}
}}
LIMIT {limit}
"
        );
        Self::new("wikidata", endpoint, "item", template, timeout)
    }

    fn new(name: &str, endpoint: &str, variable: &str, template: String, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            variable: variable.to_string(),
            query: ParameterizedQuery::new(template),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Query text sent for `keyword`.
    pub fn query_for(&self, keyword: &str) -> String {
        self.query.clone().bind_literal("PHRASE", keyword).render()
    }

    fn request_error(&self, error: ureq::Error) -> EnrichmentError {
        match error {
            ureq::Error::Transport(t) if is_timeout(&t) => EnrichmentError::Timeout {
                source_name: self.name.clone(),
            },
            ureq::Error::Transport(t) => EnrichmentError::Request {
                source_name: self.name.clone(),
                message: t.to_string(),
            },
            ureq::Error::Status(code, _) => EnrichmentError::Request {
                source_name: self.name.clone(),
                message: format!("HTTP {code}"),
            },
        }
    }
}

impl LabelSource for SparqlLabelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_resources(&self, keyword: &str) -> EnrichmentResult<Vec<String>> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("query", &self.query_for(keyword))
            .set("Accept", SPARQL_RESULTS_JSON)
            .call()
            .map_err(|e| self.request_error(e))?;
        let body = response.into_string().map_err(|e| EnrichmentError::Response {
            source_name: self.name.clone(),
            message: e.to_string(),
        })?;
        let solutions =
            QuerySolutions::from_sparql_json(&body).map_err(|e| EnrichmentError::Response {
                source_name: self.name.clone(),
                message: e.to_string(),
            })?;
        Ok(solutions
            .column(&self.variable)
            .filter_map(Term::as_iri)
            .map(str::to_string)
            .collect())
    }
}

impl std::fmt::Debug for SparqlLabelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlLabelSource")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    let io_timeout = std::error::Error::source(transport)
        .and_then(|e| e.downcast_ref::<std::io::Error>())
        .is_some_and(|e| {
            matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        });
    io_timeout || transport.to_string().contains("timed out")
}

/// First whitespace-separated word of the trimmed title.
pub fn extract_keyword(title: Option<&str>) -> Option<&str> {
    title?.split_whitespace().next()
}

/// What an enrichment pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    pub keyword: Option<String>,
    /// Candidate count per source, in query order. Failed sources report 0.
    pub candidates: Vec<(String, usize)>,
    /// Whether a merge was sent to the store.
    pub merged: bool,
    /// Distinct `schema:about` edges in the merged delta.
    pub added: usize,
}

/// Queries label sources and merges the matches into an article graph.
pub struct EnrichmentMediator {
    sources: Vec<Box<dyn LabelSource>>,
    about: String,
}

impl EnrichmentMediator {
    pub fn new(vocab: &Vocabulary, sources: Vec<Box<dyn LabelSource>>) -> Self {
        Self {
            sources,
            about: vocab.schema("about"),
        }
    }

    /// DBpedia then Wikidata, or no sources when enrichment is disabled.
    pub fn from_config(vocab: &Vocabulary, config: &EnrichmentConfig) -> Self {
        if !config.enabled {
            return Self::new(vocab, Vec::new());
        }
        let timeout = Duration::from_secs(config.timeout_secs);
        let sources: Vec<Box<dyn LabelSource>> = vec![
            Box::new(SparqlLabelSource::dbpedia(&config.dbpedia_endpoint, timeout, config.limit)),
            Box::new(SparqlLabelSource::wikidata(&config.wikidata_endpoint, timeout, config.limit)),
        ];
        Self::new(vocab, sources)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Enrich the graph of `record` stored at `graph_uri`.
    ///
    /// Sources are queried one after the other. The merge is issued once, and
    /// only when at least one candidate was found; its error is returned.
    pub fn enrich<S: GraphStore + ?Sized>(
        &self,
        store: &S,
        record: &ArticleRecord,
        graph_uri: &str,
    ) -> StoreResult<EnrichmentOutcome> {
        let Some(keyword) = extract_keyword(record.title.as_deref()) else {
            tracing::debug!(article = %record.uri, "no title keyword, enrichment skipped");
            return Ok(EnrichmentOutcome::default());
        };
        let mut outcome = EnrichmentOutcome {
            keyword: Some(keyword.to_string()),
            ..Default::default()
        };

        let mut delta = Graph::new();
        for source in &self.sources {
            let found = match source.find_resources(keyword) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(source = source.name(), keyword, error = %e, "enrichment source failed");
                    Vec::new()
                }
            };
            let mut accepted = 0;
            for iri in found {
                if !is_valid_iri(&iri) {
                    tracing::debug!(source = source.name(), value = %iri, "candidate is not an IRI, ignored");
                    continue;
                }
                accepted += 1;
                delta.insert(Triple::new(
                    Resource::iri(&record.uri),
                    self.about.as_str(),
                    Term::iri(iri),
                ));
            }
            outcome.candidates.push((source.name().to_string(), accepted));
        }

        if delta.is_empty() {
            tracing::debug!(article = %record.uri, keyword, "no enrichment candidates");
            return Ok(outcome);
        }
        store.merge(graph_uri, &delta)?;
        outcome.merged = true;
        outcome.added = delta.len();
        tracing::info!(graph = graph_uri, keyword, added = outcome.added, "enriched article graph");
        Ok(outcome)
    }
}

impl std::fmt::Debug for EnrichmentMediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentMediator")
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::StoreError;
    use crate::store::test_server::{Reply, serve, stall};

    struct Fixed(&'static str, Vec<&'static str>);

    impl LabelSource for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn find_resources(&self, _keyword: &str) -> EnrichmentResult<Vec<String>> {
            Ok(self.1.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Failing;

    impl LabelSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn find_resources(&self, _keyword: &str) -> EnrichmentResult<Vec<String>> {
            Err(EnrichmentError::Timeout {
                source_name: "failing".into(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        merges: RefCell<Vec<(String, Graph)>>,
    }

    impl GraphStore for RecordingStore {
        fn replace(&self, _: &str, _: &Graph) -> StoreResult<()> {
            Ok(())
        }
        fn merge(&self, graph_uri: &str, delta: &Graph) -> StoreResult<()> {
            self.merges.borrow_mut().push((graph_uri.to_string(), delta.clone()));
            Ok(())
        }
        fn fetch(&self, _: &str) -> StoreResult<Graph> {
            Ok(Graph::new())
        }
        fn query(&self, _: &str) -> StoreResult<QuerySolutions> {
            Ok(QuerySolutions::default())
        }
        fn update(&self, _: &str) -> StoreResult<()> {
            Err(StoreError::QuerySyntax { message: "unused".into() })
        }
    }

    fn record(title: &str) -> ArticleRecord {
        ArticleRecord {
            title: Some(title.into()),
            ..ArticleRecord::new("http://example.org/news/article/1")
        }
    }

    #[test]
    fn keyword_is_first_word() {
        assert_eq!(extract_keyword(Some("  Flooding hits the capital")), Some("Flooding"));
        assert_eq!(extract_keyword(Some("   ")), None);
        assert_eq!(extract_keyword(None), None);
    }

    #[test]
    fn failing_source_is_swallowed() {
        let vocab = Vocabulary::default();
        let mediator = EnrichmentMediator::new(
            &vocab,
            vec![
                Box::new(Fixed("dbpedia", vec!["http://dbpedia.org/resource/Flood"])),
                Box::new(Failing),
            ],
        );
        let store = RecordingStore::default();
        let outcome = mediator
            .enrich(&store, &record("Flooding hits the capital region"), "http://g")
            .unwrap();

        assert_eq!(outcome.keyword.as_deref(), Some("Flooding"));
        assert_eq!(
            outcome.candidates,
            vec![("dbpedia".to_string(), 1), ("failing".to_string(), 0)]
        );
        assert!(outcome.merged);
        let merges = store.merges.borrow();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].1.len(), 1);
        assert_eq!(
            merges[0].1.with_predicate("http://schema.org/about").count(),
            1
        );
    }

    #[test]
    fn no_candidates_means_no_merge() {
        let vocab = Vocabulary::default();
        let mediator = EnrichmentMediator::new(
            &vocab,
            vec![Box::new(Failing), Box::new(Fixed("empty", vec!["not an iri"]))],
        );
        let store = RecordingStore::default();
        let outcome = mediator.enrich(&store, &record("Elections"), "http://g").unwrap();
        assert!(!outcome.merged);
        assert!(store.merges.borrow().is_empty());
    }

    #[test]
    fn duplicate_candidates_collapse() {
        let vocab = Vocabulary::default();
        let same = "http://dbpedia.org/resource/Flood";
        let mediator = EnrichmentMediator::new(
            &vocab,
            vec![Box::new(Fixed("a", vec![same])), Box::new(Fixed("b", vec![same]))],
        );
        let store = RecordingStore::default();
        let outcome = mediator.enrich(&store, &record("Flood"), "http://g").unwrap();
        assert_eq!(outcome.added, 1);
    }

    #[test]
    fn blank_title_skips_sources() {
        let mediator = EnrichmentMediator::new(&Vocabulary::default(), vec![Box::new(Failing)]);
        let store = RecordingStore::default();
        let outcome = mediator.enrich(&store, &record(" "), "http://g").unwrap();
        assert_eq!(outcome, EnrichmentOutcome::default());
    }

    #[test]
    fn keyword_is_bound_not_spliced() {
        let source = SparqlLabelSource::dbpedia("http://127.0.0.1:1/sparql", Duration::from_secs(1), 5);
        let text = source.query_for("x\") } DROP");
        assert!(text.contains(r#"LCASE("x\") } DROP")"#));
        assert!(text.contains("LIMIT 5"));
        assert!(oxigraph::sparql::Query::parse(&text, None).is_ok());

        let wikidata = SparqlLabelSource::wikidata("http://127.0.0.1:1/sparql", Duration::from_secs(1), 3);
        assert!(wikidata.query_for("Flood").contains("SERVICE wikibase:label"));
    }

    #[test]
    fn disabled_config_has_no_sources() {
        let vocab = Vocabulary::default();
        let mut config = EnrichmentConfig::default();
        assert_eq!(EnrichmentMediator::from_config(&vocab, &config).source_count(), 2);
        config.enabled = false;
        assert_eq!(EnrichmentMediator::from_config(&vocab, &config).source_count(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let source = SparqlLabelSource::dbpedia("http://127.0.0.1:1/sparql", Duration::from_secs(1), 500);
        assert!(source.query_for("Flood").contains("LIMIT 5"));
    }

    #[test]
    fn sparql_source_reads_resource_bindings() {
        let answer = r#"{"head": {"vars": ["resource"]}, "results": {"bindings": [
            {"resource": {"type": "uri", "value": "http://dbpedia.org/resource/Flood"}},
            {"resource": {"type": "uri", "value": "http://dbpedia.org/resource/Flood_warning"}},
            {"resource": {"type": "literal", "value": "Flood"}},
            {"other": {"type": "uri", "value": "http://dbpedia.org/resource/Unrelated"}}
        ]}}"#;
        let (base, server) = serve(vec![Reply::new(200, SPARQL_RESULTS_JSON, answer)]);
        let source = SparqlLabelSource::dbpedia(&format!("{base}/sparql"), Duration::from_secs(5), 5);
        let found = source.find_resources("Flood").unwrap();
        assert_eq!(
            found,
            vec![
                "http://dbpedia.org/resource/Flood",
                "http://dbpedia.org/resource/Flood_warning"
            ]
        );

        let seen = server.join().unwrap();
        assert_eq!(seen[0].method, "GET");
        assert!(seen[0].target.starts_with("/sparql?query="), "{}", seen[0].target);
        assert_eq!(seen[0].header("accept"), Some(SPARQL_RESULTS_JSON));
    }

    #[test]
    fn bad_answers_are_source_errors() {
        let (base, server) = serve(vec![
            Reply::new(503, "text/plain", "busy"),
            Reply::new(200, "text/html", "<html>maintenance</html>"),
        ]);
        let source = SparqlLabelSource::wikidata(&format!("{base}/sparql"), Duration::from_secs(5), 5);
        assert!(matches!(
            source.find_resources("Flood"),
            Err(EnrichmentError::Request { ref message, .. }) if message == "HTTP 503"
        ));
        assert!(matches!(
            source.find_resources("Flood"),
            Err(EnrichmentError::Response { .. })
        ));
        server.join().unwrap();
    }

    #[test]
    fn silent_source_times_out() {
        let base = stall(Duration::from_secs(5));
        let source = SparqlLabelSource::dbpedia(&format!("{base}/sparql"), Duration::from_millis(300), 5);
        assert!(matches!(
            source.find_resources("Flood"),
            Err(EnrichmentError::Timeout { ref source_name }) if source_name == "dbpedia"
        ));
    }

    #[test]
    fn unreachable_source_is_a_request_error() {
        let source = SparqlLabelSource::dbpedia("http://127.0.0.1:1/sparql", Duration::from_secs(1), 5);
        assert!(source.find_resources("Flood").is_err());
    }
}
