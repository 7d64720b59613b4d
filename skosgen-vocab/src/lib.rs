//! RDF vocabulary constants for skosgen
//!
//! This crate provides a centralized location for the vocabulary IRIs the
//! concept graph generator reads and writes.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `skos` - SKOS core vocabulary (http://www.w3.org/2004/02/skos/core#)
//! - `dct` - Dublin Core terms (http://purl.org/dc/terms/)
//! - `prefixes` - Prefix declarations emitted by the serializer

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XSD vocabulary constants
pub mod xsd {
    /// XSD namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
}

/// SKOS core vocabulary constants
pub mod skos {
    /// SKOS namespace IRI
    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";

    // Classes

    /// skos:Concept class IRI
    pub const CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";

    /// skos:ConceptScheme class IRI
    pub const CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";

    /// skos:Collection class IRI
    pub const COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#Collection";

    // Lexical labels

    /// skos:prefLabel IRI
    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";

    /// skos:altLabel IRI
    pub const ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";

    /// skos:hiddenLabel IRI
    pub const HIDDEN_LABEL: &str = "http://www.w3.org/2004/02/skos/core#hiddenLabel";

    // Documentation

    /// skos:definition IRI
    pub const DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";

    /// skos:scopeNote IRI
    pub const SCOPE_NOTE: &str = "http://www.w3.org/2004/02/skos/core#scopeNote";

    // Semantic and mapping relations

    /// skos:broader IRI
    pub const BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";

    /// skos:narrower IRI
    pub const NARROWER: &str = "http://www.w3.org/2004/02/skos/core#narrower";

    /// skos:exactMatch IRI
    pub const EXACT_MATCH: &str = "http://www.w3.org/2004/02/skos/core#exactMatch";

    // Scheme membership

    /// skos:inScheme IRI
    pub const IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";

    /// skos:hasTopConcept IRI
    pub const HAS_TOP_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#hasTopConcept";

    /// skos:topConceptOf IRI
    pub const TOP_CONCEPT_OF: &str = "http://www.w3.org/2004/02/skos/core#topConceptOf";

    /// skos:member IRI
    pub const MEMBER: &str = "http://www.w3.org/2004/02/skos/core#member";
}

/// Dublin Core terms
pub mod dct {
    /// DCT namespace IRI
    pub const NS: &str = "http://purl.org/dc/terms/";

    /// dct:title IRI
    pub const TITLE: &str = "http://purl.org/dc/terms/title";

    /// dct:description IRI
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";

    /// dct:created IRI
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
}

/// Prefix declarations written at the top of every generated document.
pub mod prefixes {
    /// `(prefix, namespace)` pairs, sorted by prefix name.
    pub const GENERATED: &[(&str, &str)] = &[
        ("dct", super::dct::NS),
        ("skos", super::skos::NS),
        ("xsd", super::xsd::NS),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_prefixes_are_sorted() {
        let names: Vec<&str> = prefixes::GENERATED.iter().map(|(p, _)| *p).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn terms_live_in_their_namespace() {
        for term in [
            skos::CONCEPT,
            skos::PREF_LABEL,
            skos::BROADER,
            skos::NARROWER,
            skos::MEMBER,
        ] {
            assert!(term.starts_with(skos::NS), "{term}");
        }
        assert!(dct::CREATED.starts_with(dct::NS));
        assert!(xsd::DATE.starts_with(xsd::NS));
        assert!(rdf::TYPE.starts_with(rdf::NS));
    }
}
