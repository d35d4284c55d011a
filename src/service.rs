//! Article graph service: the operations the CLI (or any front-end) drives.
//!
//! Ingest maps a record, replaces its named graph and enriches it. Export
//! reads the stored graph back, recomputing it from the record when the
//! store has nothing. Search and curated queries run through the store and
//! come back as SPARQL results documents.

use crate::config::Settings;
use crate::enrich::{EnrichmentMediator, EnrichmentOutcome};
use crate::error::NewsResult;
use crate::graph::Graph;
use crate::graph::serialize::{ExportFormat, serialize};
use crate::graph::vocab::Vocabulary;
use crate::mapping::GraphMapper;
use crate::query::curated::CuratedQuery;
use crate::query::format::{ResultFormat, format_results};
use crate::query::search::{QueryBuilder, SearchCriteria};
use crate::record::ArticleRecord;
use crate::store::{GraphStore, StoreResult};
use crate::versioning::graph_uri_for;

/// Result of ingesting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub graph_uri: String,
    pub triples: usize,
    pub enrichment: EnrichmentOutcome,
}

/// Mapping, storage, querying and enrichment of article graphs.
pub struct ArticleGraphService<S> {
    mapper: GraphMapper,
    queries: QueryBuilder,
    store: S,
    enrichment: EnrichmentMediator,
}

impl<S: GraphStore> ArticleGraphService<S> {
    pub fn new(vocab: Vocabulary, store: S, enrichment: EnrichmentMediator) -> Self {
        Self {
            mapper: GraphMapper::new(vocab.clone()),
            queries: QueryBuilder::new(vocab),
            store,
            enrichment,
        }
    }

    /// Build a service from settings, with `store` as the backend.
    pub fn from_settings(settings: &Settings, store: S) -> Self {
        let vocab = Vocabulary::from_config(&settings.namespaces);
        let enrichment = EnrichmentMediator::from_config(&vocab, &settings.enrichment);
        tracing::debug!(sources = enrichment.source_count(), "enrichment sources configured");
        Self::new(vocab, store, enrichment)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn vocab(&self) -> &Vocabulary {
        self.mapper.vocab()
    }

    pub fn map(&self, record: &ArticleRecord) -> Graph {
        self.mapper.map(record)
    }

    /// Map `record`, replace its named graph, then enrich it.
    pub fn ingest(&self, record: &ArticleRecord) -> StoreResult<IngestReport> {
        let graph = self.mapper.map(record);
        let graph_uri = graph_uri_for(&record.uri);
        self.store.replace(&graph_uri, &graph)?;
        let enrichment = self.enrichment.enrich(&self.store, record, &graph_uri)?;
        tracing::info!(
            article = %record.uri,
            graph = %graph_uri,
            triples = graph.len(),
            enriched = enrichment.added,
            "ingested article"
        );
        Ok(IngestReport {
            graph_uri,
            triples: graph.len(),
            enrichment,
        })
    }

    /// Stored graph of `record`, or a freshly mapped one if the store has none.
    pub fn article_graph(&self, record: &ArticleRecord) -> StoreResult<Graph> {
        let graph_uri = graph_uri_for(&record.uri);
        let stored = self.store.fetch(&graph_uri)?;
        if stored.is_empty() {
            tracing::debug!(graph = %graph_uri, "no stored graph, recomputing from record");
            return Ok(self.mapper.map(record));
        }
        Ok(stored)
    }

    /// Serialize the article graph.
    pub fn export(&self, record: &ArticleRecord, format: ExportFormat) -> NewsResult<String> {
        let graph = self.article_graph(record)?;
        tracing::debug!(
            article = %record.uri,
            media_type = format.media_type(),
            triples = graph.len(),
            "exporting graph"
        );
        Ok(serialize(&graph, format, self.vocab())?)
    }

    pub fn search(&self, criteria: &SearchCriteria, format: ResultFormat) -> NewsResult<String> {
        let text = self.queries.build_search_query(criteria)?;
        self.run_query(&text, format)
    }

    pub fn curated(&self, query: &CuratedQuery, format: ResultFormat) -> NewsResult<String> {
        let text = self.queries.curated(query)?;
        self.run_query(&text, format)
    }

    /// Run raw SPARQL and format the results.
    pub fn run_query(&self, sparql: &str, format: ResultFormat) -> NewsResult<String> {
        let solutions = self.store.query(sparql)?;
        tracing::debug!(rows = solutions.len(), %format, "query answered");
        Ok(format_results(&solutions, format)?)
    }

    pub fn run_update(&self, sparql: &str) -> StoreResult<()> {
        self.store.update(sparql)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for ArticleGraphService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleGraphService")
            .field("store", &self.store)
            .field("enrichment", &self.enrichment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryGraphStore;

    fn service() -> ArticleGraphService<MemoryGraphStore> {
        let vocab = Vocabulary::default();
        let enrichment = EnrichmentMediator::new(&vocab, Vec::new());
        ArticleGraphService::new(vocab, MemoryGraphStore::new().unwrap(), enrichment)
    }

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: Some("Budget vote delayed".into()),
            language: Some("en".into()),
            media_type: Some("Editorial".into()),
            ..ArticleRecord::new("http://example.org/news/article/7")
        }
    }

    #[test]
    fn ingest_stores_the_mapped_graph() {
        let svc = service();
        let rec = record();
        let report = svc.ingest(&rec).unwrap();
        assert_eq!(report.graph_uri, "http://example.org/news/article/7/graph/v1");
        assert!(!report.enrichment.merged);
        let stored = svc.store().fetch(&report.graph_uri).unwrap();
        assert_eq!(stored.len(), report.triples);
    }

    #[test]
    fn export_recomputes_when_store_is_empty() {
        let svc = service();
        let rec = record();
        let nt = svc.export(&rec, ExportFormat::NTriples).unwrap();
        assert!(nt.contains("\"Budget vote delayed\"@en"));
        assert!(svc.store().is_empty().unwrap());
    }

    #[test]
    fn export_does_not_hide_store_failures() {
        use crate::config::StoreConfig;
        use crate::error::{NewsError, StoreError};
        use crate::store::http::HttpGraphStore;

        let store = HttpGraphStore::new(&StoreConfig {
            query_url: "http://127.0.0.1:1/query".into(),
            update_url: "http://127.0.0.1:1/update".into(),
            graph_store_url: Some("http://127.0.0.1:1/data".into()),
            timeout_secs: 2,
        });
        let vocab = Vocabulary::default();
        let enrichment = EnrichmentMediator::new(&vocab, Vec::new());
        let svc = ArticleGraphService::new(vocab, store, enrichment);
        assert!(matches!(
            svc.export(&record(), ExportFormat::JsonLd),
            Err(NewsError::Store(StoreError::Unavailable { .. }))
        ));
    }

    #[test]
    fn raw_update_then_query() {
        let svc = service();
        svc.run_update(
            "INSERT DATA { GRAPH <http://g> { <http://a> <http://schema.org/name> \"A\" } }",
        )
        .unwrap();
        let csv = svc
            .run_query("SELECT ?n WHERE { GRAPH ?g { ?s <http://schema.org/name> ?n } }", ResultFormat::Csv)
            .unwrap();
        assert_eq!(csv.lines().collect::<Vec<_>>(), vec!["n", "A"]);
    }
}
