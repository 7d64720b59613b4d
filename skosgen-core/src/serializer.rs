//! SKOS serializer.
//!
//! Turns a [`ConceptScheme`] into a Turtle [`Document`] and renders it with
//! the canonical writer. Every ordering comes from the model's sorted
//! collections, so equal graphs give byte-identical text.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use skosgen_turtle::{write_document, Block, Document, Term};
use skosgen_vocab::{dct, prefixes, rdf, skos, xsd};
use tracing::debug;
use url::Url;

use crate::error::SerializationError;
use crate::model::{Concept, ConceptScheme};

/// Unreserved characters (RFC 3986) stay as they are; everything else in an
/// identifier is percent-encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path of collection IRIs below the base URI.
const COLLECTIONS_PATH: &str = "collections/";

/// Renders concept schemes under one base URI.
#[derive(Debug, Clone)]
pub struct Serializer {
    base_uri: String,
}

impl Serializer {
    /// Fails when `base_uri` is not an absolute hierarchical URI ending in `/` or `#`.
    pub fn new(base_uri: &str) -> Result<Self, SerializationError> {
        let malformed = |reason: &str| SerializationError::MalformedBaseUri {
            uri: base_uri.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(base_uri).map_err(|e| malformed(&e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(malformed("not a hierarchical URI"));
        }
        if !(base_uri.ends_with('/') || base_uri.ends_with('#')) {
            return Err(malformed("must end with '/' or '#'"));
        }
        Ok(Self {
            base_uri: base_uri.to_string(),
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// The scheme node is the base URI itself.
    pub fn scheme_iri(&self) -> &str {
        &self.base_uri
    }

    pub fn concept_iri(&self, identifier: &str) -> String {
        format!("{}{}", self.base_uri, utf8_percent_encode(identifier, SEGMENT))
    }

    pub fn collection_iri(&self, tag: &str) -> String {
        format!(
            "{}{COLLECTIONS_PATH}{}",
            self.base_uri,
            utf8_percent_encode(tag, SEGMENT)
        )
    }

    /// Build the Turtle document: scheme block, concept blocks by identifier,
    /// then collection blocks by tag.
    pub fn to_document(&self, scheme: &ConceptScheme) -> Document {
        let mut doc = Document {
            base: Some(self.base_uri.clone()),
            prefixes: prefixes::GENERATED
                .iter()
                .map(|(name, ns)| (name.to_string(), ns.to_string()))
                .collect(),
            blocks: Vec::with_capacity(scheme.len() + 1),
        };

        doc.blocks.push(self.scheme_block(scheme));
        for concept in scheme.concepts.values() {
            doc.blocks.push(self.concept_block(scheme, concept));
        }
        for (tag, members) in scheme.collections() {
            let mut block = Block::new(Term::iri(self.collection_iri(tag)));
            block.push(rdf::TYPE, Term::iri(skos::COLLECTION));
            block.push(skos::PREF_LABEL, Term::lang_string(tag, &scheme.locale_tag));
            for member in members {
                block.push(skos::MEMBER, Term::iri(self.concept_iri(member)));
            }
            doc.blocks.push(block);
        }

        debug!(
            blocks = doc.blocks.len(),
            triples = doc.triple_count(),
            "concept scheme converted to document"
        );
        doc
    }

    /// Render the scheme as canonical Turtle text.
    pub fn serialize(&self, scheme: &ConceptScheme) -> String {
        write_document(&self.to_document(scheme))
    }

    fn scheme_block(&self, scheme: &ConceptScheme) -> Block {
        let lang = &scheme.locale_tag;
        let mut block = Block::new(Term::iri(self.scheme_iri()));
        block.push(rdf::TYPE, Term::iri(skos::CONCEPT_SCHEME));
        block.push(dct::TITLE, Term::lang_string(&scheme.title, lang));
        if !scheme.description.trim().is_empty() {
            block.push(dct::DESCRIPTION, Term::lang_string(&scheme.description, lang));
        }
        block.push(
            dct::CREATED,
            Term::typed(scheme.created.format("%Y-%m-%d").to_string(), xsd::DATE),
        );
        for top in scheme.top_concepts() {
            block.push(skos::HAS_TOP_CONCEPT, Term::iri(self.concept_iri(&top.identifier)));
        }
        block
    }

    fn concept_block(&self, scheme: &ConceptScheme, concept: &Concept) -> Block {
        let lang = &scheme.locale_tag;
        let mut block = Block::new(Term::iri(self.concept_iri(&concept.identifier)));

        block.push(rdf::TYPE, Term::iri(skos::CONCEPT));
        block.push(skos::PREF_LABEL, Term::lang_string(&concept.preferred_label, lang));
        for label in &concept.alternative_labels {
            block.push(skos::ALT_LABEL, Term::lang_string(label, lang));
        }
        for label in &concept.hidden_labels {
            block.push(skos::HIDDEN_LABEL, Term::lang_string(label, lang));
        }
        if let Some(text) = &concept.description {
            block.push(skos::DEFINITION, Term::lang_string(text, lang));
        }
        if let Some(text) = &concept.scope_note {
            block.push(skos::SCOPE_NOTE, Term::lang_string(text, lang));
        }
        if let Some(reference) = &concept.external_reference {
            block.push(skos::EXACT_MATCH, Term::iri(reference));
        }
        block.push(skos::IN_SCHEME, Term::iri(self.scheme_iri()));
        if concept.is_top_concept() {
            block.push(skos::TOP_CONCEPT_OF, Term::iri(self.scheme_iri()));
        }
        for parent in &concept.broader {
            block.push(skos::BROADER, Term::iri(self.concept_iri(parent)));
        }
        for child in &concept.narrower {
            block.push(skos::NARROWER, Term::iri(self.concept_iri(child)));
        }
        block
    }
}
