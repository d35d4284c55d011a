//! Pipeline configuration, persisted as TOML.
//!
//! ```toml
//! [namespaces]
//! base = "http://example.org/news/"
//!
//! [store]
//! query_url = "http://localhost:3030/news/query"
//! update_url = "http://localhost:3030/news/update"
//! graph_store_url = "http://localhost:3030/news/data"
//!
//! [enrichment]
//! enabled = true
//! ```
//!
//! Every key has a default, so an empty file (or no file) is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Upper bound on candidates taken from one enrichment source.
pub const MAX_CANDIDATES: usize = 5;

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub namespaces: NamespaceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

impl Settings {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        let settings: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        settings.enrichment.validate()?;
        Ok(settings)
    }
}

/// Vocabulary namespaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Namespace for synthesized resources (organizations, scheme, system agent).
    #[serde(default = "default_base_ns")]
    pub base: String,
    #[serde(default = "default_schema_ns")]
    pub schema: String,
    #[serde(default = "default_dc_ns")]
    pub dc: String,
    #[serde(default = "default_prov_ns")]
    pub prov: String,
    #[serde(default = "default_skos_ns")]
    pub skos: String,
}

fn default_base_ns() -> String {
    "http://example.org/news/".into()
}
fn default_schema_ns() -> String {
    "http://schema.org/".into()
}
fn default_dc_ns() -> String {
    "http://purl.org/dc/elements/1.1/".into()
}
fn default_prov_ns() -> String {
    "http://www.w3.org/ns/prov#".into()
}
fn default_skos_ns() -> String {
    "http://www.w3.org/2004/02/skos/core#".into()
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            base: default_base_ns(),
            schema: default_schema_ns(),
            dc: default_dc_ns(),
            prov: default_prov_ns(),
            skos: default_skos_ns(),
        }
    }
}

/// Triple store endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SPARQL 1.1 Query endpoint.
    #[serde(default = "default_query_url")]
    pub query_url: String,
    /// SPARQL 1.1 Update endpoint.
    #[serde(default = "default_update_url")]
    pub update_url: String,
    /// Graph Store Protocol endpoint. When empty, named graphs are written
    /// through the update endpoint and read through the query endpoint.
    #[serde(default = "default_graph_store_url")]
    pub graph_store_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_query_url() -> String {
    "http://localhost:3030/news/query".into()
}
fn default_update_url() -> String {
    "http://localhost:3030/news/update".into()
}
fn default_graph_store_url() -> Option<String> {
    Some("http://localhost:3030/news/data".into())
}
fn default_store_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_url: default_query_url(),
            update_url: default_update_url(),
            graph_store_url: default_graph_store_url(),
            timeout_secs: default_store_timeout(),
        }
    }
}

/// External linked-data sources used for enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_dbpedia_endpoint")]
    pub dbpedia_endpoint: String,
    #[serde(default = "default_wikidata_endpoint")]
    pub wikidata_endpoint: String,
    /// Per-source timeout in seconds.
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,
    /// Maximum candidates requested from each source, 1 to [`MAX_CANDIDATES`].
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl EnrichmentConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_CANDIDATES).contains(&self.limit) {
            return Err(format!(
                "enrichment.limit must be between 1 and {MAX_CANDIDATES}, got {}",
                self.limit
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_dbpedia_endpoint() -> String {
    "https://dbpedia.org/sparql".into()
}
fn default_wikidata_endpoint() -> String {
    "https://query.wikidata.org/sparql".into()
}
fn default_enrichment_timeout() -> u64 {
    10
}
fn default_limit() -> usize {
    MAX_CANDIDATES
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dbpedia_endpoint: default_dbpedia_endpoint(),
            wikidata_endpoint: default_wikidata_endpoint(),
            timeout_secs: default_enrichment_timeout(),
            limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.namespaces.schema, "http://schema.org/");
        assert_eq!(settings.enrichment.limit, 5);
        assert!(settings.enrichment.enabled);
        assert_eq!(
            settings.store.graph_store_url.as_deref(),
            Some("http://localhost:3030/news/data")
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            [namespaces]
            base = "https://news.example/"

            [store]
            query_url = "http://triples:3030/ds/query"
            timeout_secs = 5

            [enrichment]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.namespaces.base, "https://news.example/");
        assert_eq!(settings.namespaces.dc, "http://purl.org/dc/elements/1.1/");
        assert_eq!(settings.store.query_url, "http://triples:3030/ds/query");
        assert_eq!(settings.store.update_url, "http://localhost:3030/news/update");
        assert_eq!(settings.store.timeout_secs, 5);
        assert!(!settings.enrichment.enabled);
    }

    #[test]
    fn load_from_file_and_report_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[enrichment]\nlimit = 3\n").unwrap();
        assert_eq!(Settings::load(&good).unwrap().enrichment.limit, 3);

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[store\nquery_url = 1").unwrap();
        assert!(matches!(Settings::load(&bad), Err(ConfigError::Parse { .. })));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Settings::load(&missing), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn candidate_limit_is_bounded() {
        for limit in [0, 6, 100] {
            let err = Settings::from_toml(&format!("[enrichment]\nlimit = {limit}\n")).unwrap_err();
            assert!(err.contains("enrichment.limit"), "{err}");
        }
        assert_eq!(Settings::from_toml("[enrichment]\nlimit = 1\n").unwrap().enrichment.limit, 1);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("greedy.toml");
        std::fs::write(&path, "[enrichment]\nlimit = 50\n").unwrap();
        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn no_path_means_defaults() {
        let settings = Settings::load_or_default(None).unwrap();
        assert_eq!(settings.store.timeout_secs, 30);
    }
}
