// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # news-provenance
//!
//! Turns news article records into provenance-aware RDF graphs and keeps one
//! versioned named graph per article in a SPARQL triple store.
//!
//! ## Architecture
//!
//! - **Graph model** (`graph`): owned triples, vocabularies, serializers
//! - **Mapping** (`mapping`): record → graph over schema.org, Dublin Core, PROV-O and SKOS
//! - **Versioning** (`versioning`): deterministic named-graph URIs
//! - **Store** (`store`): Graph Store Protocol / SPARQL client and an embedded store
//! - **Query** (`query`): parameterized search and curated queries, results formats
//! - **Enrichment** (`enrich`): DBpedia / Wikidata label matches merged as `schema:about`
//! - **Service** (`service`): ingest, export and search over a store
//!
//! ## Library usage
//!
//! ```no_run
//! use news_provenance::config::Settings;
//! use news_provenance::record::ArticleRecord;
//! use news_provenance::service::ArticleGraphService;
//! use news_provenance::store::memory::MemoryGraphStore;
//!
//! let settings = Settings::default();
//! let service = ArticleGraphService::from_settings(&settings, MemoryGraphStore::new().unwrap());
//! let record = ArticleRecord {
//!     title: Some("Flooding hits the capital region".into()),
//!     language: Some("en".into()),
//!     ..ArticleRecord::new("http://example.org/news/article/1")
//! };
//! let report = service.ingest(&record).unwrap();
//! println!("{} triples in <{}>", report.triples, report.graph_uri);
//! ```

pub mod config;
pub mod enrich;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod versioning;
