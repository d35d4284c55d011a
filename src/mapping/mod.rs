//! Record-to-graph mapping engine.
//!
//! [`GraphMapper::map`] turns a validated [`ArticleRecord`] into a [`Graph`]
//! using schema.org, Dublin Core, PROV-O and SKOS terms. Mapping is a pure
//! computation: no I/O, no failure. Absent or blank optional data never
//! produces a triple; every optional value is routed through
//! [`Emitter::emit`], which is the only place a triple is conditionally added.
//!
//! Derived resource identities are fixed suffixes of the article URI (or of
//! the base namespace), so re-mapping a record yields the same graph except
//! for the provenance end-time when the record has no creation timestamp.

pub mod media;

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::graph::convert::{is_valid_iri, is_valid_language_tag};
use crate::graph::vocab::{Vocabulary, rdf_type};
use crate::graph::{Graph, Literal, Resource, Term, Triple};
use crate::record::{ArticleRecord, Author, MetadataEntry, Topic};

use media::{MediaFamily, guess_encoding_format};

/// Label of the synthetic agent recorded as running the ingest activity.
pub const SYSTEM_AGENT_NAME: &str = "News Provenance Pipeline";

/// Label of the shared topic concept scheme.
pub const TOPIC_SCHEME_LABEL: &str = "News Topics";

static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}._~-]+").unwrap());

/// Identity suffixes appended to the article URI.
mod suffix {
    pub const THUMBNAIL: &str = "/media/thumbnail";
    pub const MEDIA: &str = "/media/";
    pub const META: &str = "/meta/";
    pub const ACTIVITY: &str = "/prov/activity/ingest/v1";
}

/// Maps article records to RDF graphs.
#[derive(Debug, Clone)]
pub struct GraphMapper {
    vocab: Vocabulary,
}

impl GraphMapper {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Map a record to its graph.
    pub fn map(&self, record: &ArticleRecord) -> Graph {
        let mut out = Emitter::default();
        let article = record.uri.as_str();
        let lang = language_tag(record.language.as_deref());
        let lang = lang.as_deref();

        self.map_article(&mut out, record, lang);
        self.map_links(&mut out, record);
        if let Some(author) = &record.author {
            self.map_author(&mut out, article, author, lang);
        }
        self.map_topics(&mut out, article, &record.topics, lang);
        self.map_thumbnail(&mut out, article, record.thumbnail_url.as_deref());
        for (index, entry) in record.metadata.iter().enumerate() {
            self.map_metadata_entry(&mut out, article, index, entry);
        }
        self.map_provenance(&mut out, record);

        tracing::debug!(article, triples = out.graph.len(), "mapped article record");
        out.graph
    }

    /// Type assertions and scalar literals of the article resource.
    fn map_article(&self, out: &mut Emitter, record: &ArticleRecord, lang: Option<&str>) {
        let v = &self.vocab;
        let article = record.uri.as_str();

        out.fact(article, rdf_type(), Term::iri(v.schema("NewsArticle")));
        out.fact(article, rdf_type(), Term::iri(v.schema("CreativeWork")));

        out.emit(article, &v.schema("headline"), text(record.title.as_deref(), lang));
        out.emit(article, &v.schema("description"), text(record.description.as_deref(), lang));
        out.emit(article, &v.schema("articleBody"), text(record.content.as_deref(), lang));
        out.emit(
            article,
            &v.schema("inLanguage"),
            plain(record.language.as_deref().map(str::trim)),
        );
        out.emit(
            article,
            &v.schema("wordCount"),
            record.word_count.map(|n| Literal::integer(i64::from(n)).into()),
        );
        out.emit(
            article,
            &v.schema("datePublished"),
            record.published_at.as_ref().map(|d| Literal::date_time(d).into()),
        );

        // Genre and dc:type carry the same value so either vocabulary can be queried.
        out.emit(article, &v.schema("genre"), plain(record.media_type.as_deref()));
        out.emit(article, &v.dc("type"), plain(record.media_type.as_deref()));
    }

    /// Original URL and source URLs as `schema:url` / `dc:source` links.
    fn map_links(&self, out: &mut Emitter, record: &ArticleRecord) {
        let v = &self.vocab;
        let article = record.uri.as_str();
        let original = record.original_url.as_deref();

        out.emit(article, &v.schema("url"), resource(original));
        out.emit(article, &v.dc("source"), resource(original));
        for source in &record.sources {
            out.emit(article, &v.dc("source"), resource(Some(source.as_str())));
        }
    }

    fn map_author(&self, out: &mut Emitter, article: &str, author: &Author, lang: Option<&str>) {
        let v = &self.vocab;
        let Some(Term::Resource(Resource::Iri(author_uri))) = resource(Some(author.uri.as_str())) else {
            tracing::debug!(article, uri = %author.uri, "author without usable URI, skipped");
            return;
        };
        let author_uri = author_uri.as_str();

        out.fact(author_uri, rdf_type(), Term::iri(v.schema("Person")));
        out.fact(author_uri, rdf_type(), Term::iri(v.prov("Agent")));
        out.emit(author_uri, &v.schema("name"), text(author.name.as_deref(), lang));
        out.emit(author_uri, &v.schema("nationality"), plain(author.nationality.as_deref()));

        if let Some(org) = self.organization_uri(author.affiliation.as_deref()) {
            out.fact(&org, rdf_type(), Term::iri(v.schema("Organization")));
            out.emit(&org, &v.schema("name"), plain(author.affiliation.as_deref().map(str::trim)));
            out.fact(article, &v.schema("publisher"), Term::iri(&org));
        }

        out.fact(article, &v.schema("author"), Term::iri(author_uri));
        out.fact(article, &v.prov("wasAttributedTo"), Term::iri(author_uri));
    }

    /// Organization identity derived from an affiliation string.
    fn organization_uri(&self, affiliation: Option<&str>) -> Option<String> {
        let slug = slugify(present(affiliation)?);
        if slug.is_empty() {
            return None;
        }
        let uri = self.vocab.base(&format!("org/{slug}"));
        is_valid_iri(&uri).then_some(uri)
    }

    /// Topic concepts in the shared scheme, linked with `schema:about`.
    fn map_topics(&self, out: &mut Emitter, article: &str, topics: &[Topic], lang: Option<&str>) {
        let v = &self.vocab;
        let scheme = v.base("scheme/topics");

        out.fact(&scheme, rdf_type(), Term::iri(v.skos("ConceptScheme")));
        out.fact(
            &scheme,
            &v.skos("prefLabel"),
            Literal::language_tagged(TOPIC_SCHEME_LABEL, "en").into(),
        );

        for topic in topics {
            let Some(Term::Resource(Resource::Iri(concept))) = resource(Some(topic.uri.as_str())) else {
                continue;
            };
            let concept = concept.as_str();

            out.fact(concept, rdf_type(), Term::iri(v.skos("Concept")));
            out.fact(concept, &v.skos("inScheme"), Term::iri(&scheme));
            if out.emit(concept, &v.skos("prefLabel"), text(topic.name.as_deref(), lang)) {
                // Plain subject literal for simple keyword queries.
                out.emit(article, &v.dc("subject"), plain(topic.name.as_deref()));
            }
            out.emit(concept, &v.skos("exactMatch"), resource(topic.dbpedia_uri.as_deref()));
            out.fact(article, &v.schema("about"), Term::iri(concept));
        }
    }

    fn map_thumbnail(&self, out: &mut Emitter, article: &str, thumbnail: Option<&str>) {
        let Some(content_url) = resource(thumbnail) else {
            return;
        };
        let media = format!("{article}{}", suffix::THUMBNAIL);
        self.media_object(out, article, &media, MediaFamily::Image, content_url);
    }

    /// A metadata entry becomes a `schema:PropertyValue`, plus a media object
    /// when its key belongs to a known media family.
    fn map_metadata_entry(
        &self,
        out: &mut Emitter,
        article: &str,
        index: usize,
        entry: &MetadataEntry,
    ) {
        let v = &self.vocab;
        let (Some(key), Some(value)) = (present(Some(entry.key.as_str())), present(entry.value.as_deref()))
        else {
            return;
        };
        let id = entry
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| format!("entry-{}", index + 1));

        if let Some(family) = MediaFamily::from_key(key) {
            if let Some(content_url) = resource(Some(value)) {
                let media = format!(
                    "{article}{}{}/{id}",
                    suffix::MEDIA,
                    key.trim().to_lowercase()
                );
                self.media_object(out, article, &media, family, content_url);
            }
        }

        let pv = format!("{article}{}{id}", suffix::META);
        out.fact(&pv, rdf_type(), Term::iri(v.schema("PropertyValue")));
        out.fact(&pv, &v.schema("propertyID"), Literal::plain(key).into());
        out.fact(&pv, &v.schema("value"), Literal::plain(value).into());
        out.emit(
            &pv,
            &v.schema("description"),
            present(entry.standard.as_deref()).map(|s| Literal::plain(format!("Standard={s}")).into()),
        );
        out.fact(article, &v.schema("additionalProperty"), Term::iri(&pv));
    }

    fn media_object(
        &self,
        out: &mut Emitter,
        article: &str,
        media: &str,
        family: MediaFamily,
        content_url: Term,
    ) {
        let v = &self.vocab;
        let format = guess_encoding_format(content_url.value());
        out.fact(media, rdf_type(), Term::iri(v.schema(family.class_name())));
        out.fact(media, &v.schema("contentUrl"), content_url);
        out.fact(media, &v.schema("encodingFormat"), Literal::plain(format).into());
        out.fact(article, &v.schema("associatedMedia"), Term::iri(media));
    }

    /// One ingest activity per mapping, run by the system agent.
    fn map_provenance(&self, out: &mut Emitter, record: &ArticleRecord) {
        let v = &self.vocab;
        let article = record.uri.as_str();
        let activity = format!("{article}{}", suffix::ACTIVITY);
        let agent = v.base("agent/system");

        out.fact(&activity, rdf_type(), Term::iri(v.prov("Activity")));
        out.fact(&agent, rdf_type(), Term::iri(v.prov("Agent")));
        out.fact(&agent, &v.schema("name"), Literal::plain(SYSTEM_AGENT_NAME).into());
        out.fact(&activity, &v.prov("wasAssociatedWith"), Term::iri(&agent));

        out.emit(&activity, &v.prov("used"), resource(record.original_url.as_deref()));
        for source in &record.sources {
            out.emit(&activity, &v.prov("used"), resource(Some(source.as_str())));
        }

        let ended = record.created_at.unwrap_or_else(Utc::now);
        out.fact(&activity, &v.prov("endedAtTime"), Literal::date_time(&ended).into());
        out.fact(article, &v.prov("wasGeneratedBy"), Term::iri(&activity));
    }
}

/// Graph under construction.
#[derive(Default)]
struct Emitter {
    graph: Graph,
}

impl Emitter {
    /// Add `(subject, predicate, object)` if `object` is present.
    ///
    /// Returns whether a triple was emitted.
    fn emit(&mut self, subject: &str, predicate: &str, object: Option<Term>) -> bool {
        match object {
            Some(object) => {
                self.graph
                    .insert(Triple::new(Resource::iri(subject), predicate, object));
                true
            }
            None => false,
        }
    }

    /// Add a triple whose object is always known.
    fn fact(&mut self, subject: &str, predicate: &str, object: Term) {
        self.emit(subject, predicate, Some(object));
    }
}

/// `Some(value)` unless the value is missing or blank.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Natural-language literal, tagged when the article language is known.
fn text(value: Option<&str>, lang: Option<&str>) -> Option<Term> {
    present(value).map(|v| Literal::text(v, lang).into())
}

fn plain(value: Option<&str>) -> Option<Term> {
    present(value).map(|v| Literal::plain(v).into())
}

/// Resource reference to a URL; values that are not absolute IRIs are dropped.
fn resource(value: Option<&str>) -> Option<Term> {
    let iri = present(value)?.trim();
    if is_valid_iri(iri) {
        Some(Term::iri(iri))
    } else {
        tracing::debug!(value = iri, "not an absolute IRI, skipped");
        None
    }
}

/// Normalized language tag for literal tagging, if the record language is usable.
fn language_tag(language: Option<&str>) -> Option<String> {
    let tag = present(language)?.trim();
    if is_valid_language_tag(tag) {
        Some(tag.to_ascii_lowercase())
    } else {
        tracing::debug!(language = tag, "invalid language tag, literals left untagged");
        None
    }
}

/// Lower-case, whitespace runs to `-`, characters unsafe in an IRI path dropped.
fn slugify(value: &str) -> String {
    let joined = value.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    NON_SLUG.replace_all(&joined, "").into_owned()
}
