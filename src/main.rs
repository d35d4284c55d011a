//! newsprov CLI: map article records to RDF and manage their named graphs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use news_provenance::config::Settings;
use news_provenance::graph::serialize::{ExportFormat, serialize};
use news_provenance::query::curated::{CuratedQuery, DEFAULT_NATIONALITY};
use news_provenance::query::format::ResultFormat;
use news_provenance::query::search::SearchCriteria;
use news_provenance::record::ArticleRecord;
use news_provenance::service::ArticleGraphService;
use news_provenance::store::GraphStore;
use news_provenance::store::http::HttpGraphStore;
use news_provenance::store::memory::MemoryGraphStore;
use news_provenance::versioning::graph_uri_for;

#[derive(Parser)]
#[command(name = "newsprov", version, about = "News article provenance graphs")]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use an in-process store instead of the configured endpoints.
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a record to RDF without touching the store.
    Map {
        /// Article record (JSON).
        file: PathBuf,
        /// jsonld, rdfxml or ntriples.
        #[arg(long, default_value = "ntriples")]
        format: ExportFormat,
    },

    /// Map, store and enrich one or more records.
    Ingest {
        /// Article records (JSON).
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Export the stored graph of a record, recomputing it if missing.
    Export {
        file: PathBuf,
        #[arg(long, default_value = "jsonld")]
        format: ExportFormat,
    },

    /// Search articles across all graphs.
    Search {
        /// Text matched against title, description and topics.
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        media_type: Option<String>,
        #[arg(long)]
        max_words: Option<u32>,
        #[arg(long)]
        topic: Option<String>,
        /// Earliest publication time (RFC 3339).
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Latest publication time (RFC 3339).
        #[arg(long)]
        to: Option<DateTime<Utc>>,
        /// json, xml or csv.
        #[arg(long)]
        format: Option<String>,
    },

    /// Run a curated query.
    Curated {
        #[command(subcommand)]
        query: CuratedCommand,
        #[arg(long, global = true)]
        format: Option<String>,
    },

    /// Run a raw SPARQL query.
    Query {
        /// Query text; read from --file when omitted.
        sparql: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        format: Option<String>,
    },

    /// Run a raw SPARQL update.
    Update {
        sparql: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print the named graph URI of an article.
    GraphUri { article_uri: String },
}

#[derive(Subcommand)]
enum CuratedCommand {
    /// Editorials on a topic published since a day.
    Editorials {
        #[arg(long)]
        topic: String,
        /// YYYY-MM-DD
        #[arg(long)]
        since: NaiveDate,
    },
    /// Articles in either of two languages under a word count.
    Languages {
        #[arg(long)]
        first: String,
        #[arg(long)]
        second: String,
        #[arg(long)]
        max_words: u32,
        #[arg(long)]
        topic: String,
    },
    /// Investigations and documentaries by author nationality.
    Investigations {
        #[arg(long, default_value = DEFAULT_NATIONALITY)]
        nationality: String,
    },
}

impl From<CuratedCommand> for CuratedQuery {
    fn from(command: CuratedCommand) -> Self {
        match command {
            CuratedCommand::Editorials { topic, since } => CuratedQuery::FreshEditorials { topic, since },
            CuratedCommand::Languages {
                first,
                second,
                max_words,
                topic,
            } => CuratedQuery::ArticlesByLanguage {
                first_language: first,
                second_language: second,
                max_words,
                topic,
            },
            CuratedCommand::Investigations { nationality } => {
                CuratedQuery::Investigations { nationality }
            }
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;

    if cli.memory {
        let store = MemoryGraphStore::new()?;
        run(ArticleGraphService::from_settings(&settings, store), cli.command)
    } else {
        let store = HttpGraphStore::new(&settings.store);
        run(ArticleGraphService::from_settings(&settings, store), cli.command)
    }
}

fn run<S: GraphStore>(service: ArticleGraphService<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Map { file, format } => {
            let record = ArticleRecord::from_json_file(&file)?;
            let graph = service.map(&record);
            println!("{}", serialize(&graph, format, service.vocab())?);
        }

        Commands::Ingest { files } => {
            for file in &files {
                let record = ArticleRecord::from_json_file(file)?;
                let report = service.ingest(&record)?;
                println!(
                    "{} -> <{}> ({} triples, {} enrichment links)",
                    file.display(),
                    report.graph_uri,
                    report.triples,
                    report.enrichment.added
                );
            }
        }

        Commands::Export { file, format } => {
            let record = ArticleRecord::from_json_file(&file)?;
            println!("{}", service.export(&record, format)?);
        }

        Commands::Search {
            query,
            language,
            media_type,
            max_words,
            topic,
            from,
            to,
            format,
        } => {
            let criteria = SearchCriteria {
                query,
                language,
                media_type,
                max_words,
                topic,
                date_from: from,
                date_to: to,
            };
            let format = ResultFormat::parse(format.as_deref());
            println!("{}", service.search(&criteria, format)?);
        }

        Commands::Curated { query, format } => {
            let format = ResultFormat::parse(format.as_deref());
            println!("{}", service.curated(&query.into(), format)?);
        }

        Commands::Query {
            sparql,
            file,
            format,
        } => {
            let text = sparql_text(sparql, file.as_deref())?;
            let format = ResultFormat::parse(format.as_deref());
            println!("{}", service.run_query(&text, format)?);
        }

        Commands::Update { sparql, file } => {
            let text = sparql_text(sparql, file.as_deref())?;
            service.run_update(&text)?;
            println!("Update applied.");
        }

        Commands::GraphUri { article_uri } => {
            println!("{}", graph_uri_for(&article_uri));
        }
    }
    Ok(())
}

/// SPARQL from the positional argument, or from `file`.
fn sparql_text(inline: Option<String>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(path).into_diagnostic(),
        (None, None) => miette::bail!("provide SPARQL text or --file"),
    }
}
