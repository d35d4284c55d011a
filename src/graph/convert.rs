//! Conversion between the owned graph model and `oxigraph` terms.
//!
//! Everything that leaves the process (store payloads, serializations, bound
//! query parameters) goes through `oxigraph` so that escaping and validation
//! follow the RDF 1.1 grammar exactly.

use oxigraph::model as ox;
use oxigraph::model::vocab::xsd;

use crate::error::RdfError;

use super::{Literal, LiteralKind, RdfResult, Resource, Term, Triple};

/// Parse and validate an absolute IRI.
pub fn named_node(iri: &str) -> RdfResult<ox::NamedNode> {
    ox::NamedNode::new(iri).map_err(|e| RdfError::InvalidIri {
        iri: iri.to_string(),
        message: e.to_string(),
    })
}

/// Whether `iri` is an absolute IRI the store will accept.
pub fn is_valid_iri(iri: &str) -> bool {
    ox::NamedNode::new(iri).is_ok()
}

/// Whether `tag` is a well-formed BCP 47 language tag.
pub fn is_valid_language_tag(tag: &str) -> bool {
    ox::Literal::new_language_tagged_literal("", tag).is_ok()
}

impl Resource {
    pub fn to_oxigraph(&self) -> RdfResult<ox::NamedOrBlankNode> {
        match self {
            Resource::Iri(iri) => Ok(named_node(iri)?.into()),
            Resource::Blank(id) => ox::BlankNode::new(id)
                .map(Into::into)
                .map_err(|_| RdfError::InvalidBlankNode { id: id.clone() }),
        }
    }
}

impl Literal {
    pub fn to_oxigraph(&self) -> RdfResult<ox::Literal> {
        match &self.kind {
            LiteralKind::Plain => Ok(ox::Literal::new_simple_literal(&self.value)),
            LiteralKind::Language(tag) => {
                ox::Literal::new_language_tagged_literal(&self.value, tag).map_err(|e| {
                    RdfError::InvalidLanguageTag {
                        tag: tag.clone(),
                        message: e.to_string(),
                    }
                })
            }
            LiteralKind::Typed(datatype) => Ok(ox::Literal::new_typed_literal(
                &self.value,
                named_node(datatype)?,
            )),
        }
    }

    pub fn from_oxigraph(literal: &ox::Literal) -> Self {
        if let Some(lang) = literal.language() {
            Literal::language_tagged(literal.value(), lang)
        } else if literal.datatype() == xsd::STRING {
            Literal::plain(literal.value())
        } else {
            Literal::typed(literal.value(), literal.datatype().as_str())
        }
    }
}

impl Term {
    pub fn to_oxigraph(&self) -> RdfResult<ox::Term> {
        match self {
            Term::Resource(r) => Ok(r.to_oxigraph()?.into()),
            Term::Literal(l) => Ok(l.to_oxigraph()?.into()),
        }
    }

    /// Convert an `oxigraph` term. Returns `None` for term kinds the model
    /// does not represent (quoted triples).
    pub fn from_oxigraph(term: &ox::Term) -> Option<Self> {
        match term {
            ox::Term::NamedNode(n) => Some(Term::iri(n.as_str())),
            ox::Term::BlankNode(b) => Some(Term::Resource(Resource::Blank(b.as_str().to_string()))),
            ox::Term::Literal(l) => Some(Term::Literal(Literal::from_oxigraph(l))),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl Triple {
    pub fn to_oxigraph(&self) -> RdfResult<ox::Triple> {
        Ok(ox::Triple::new(
            self.subject.to_oxigraph()?,
            named_node(&self.predicate)?,
            self.object.to_oxigraph()?,
        ))
    }

    /// Build a triple from `oxigraph` parts, rejecting literal subjects.
    pub fn from_oxigraph_parts(
        subject: &ox::Term,
        predicate: &ox::NamedNode,
        object: &ox::Term,
    ) -> Option<Self> {
        let Term::Resource(subject) = Term::from_oxigraph(subject)? else {
            return None;
        };
        Some(Triple::new(
            subject,
            predicate.as_str(),
            Term::from_oxigraph(object)?,
        ))
    }
}

impl TryFrom<&ox::Quad> for Triple {
    type Error = RdfError;

    fn try_from(quad: &ox::Quad) -> RdfResult<Self> {
        let subject: ox::Term = quad.subject.clone().into();
        Triple::from_oxigraph_parts(&subject, &quad.predicate, &quad.object).ok_or_else(|| {
            RdfError::Parse {
                format: "RDF".into(),
                message: format!("unsupported term in quad {quad}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_roundtrip_keeps_kind() {
        for lit in [
            Literal::plain("hello"),
            Literal::language_tagged("salut", "ro"),
            Literal::integer(42),
        ] {
            let ox_lit = lit.to_oxigraph().unwrap();
            assert_eq!(Literal::from_oxigraph(&ox_lit), lit);
        }
    }

    #[test]
    fn invalid_iri_is_reported() {
        let err = named_node("not an iri").unwrap_err();
        assert!(matches!(err, RdfError::InvalidIri { .. }));
        assert!(!is_valid_iri("relative/path"));
        assert!(is_valid_iri("https://example.org/a"));
    }

    #[test]
    fn language_tag_validation() {
        assert!(is_valid_language_tag("en"));
        assert!(is_valid_language_tag("pt-BR"));
        assert!(!is_valid_language_tag("not a tag"));
    }

    #[test]
    fn triple_to_oxigraph_and_back() {
        let triple = Triple::new(
            Resource::iri("http://example.org/a"),
            "http://schema.org/headline",
            Literal::language_tagged("Title", "en"),
        );
        let ox_triple = triple.to_oxigraph().unwrap();
        let subject: ox::Term = ox_triple.subject.clone().into();
        let back =
            Triple::from_oxigraph_parts(&subject, &ox_triple.predicate, &ox_triple.object).unwrap();
        assert_eq!(back, triple);
    }
}
