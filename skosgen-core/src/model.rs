//! Concept graph data model.
//!
//! The [`ConceptScheme`] owns every [`Concept`] in a map keyed by identifier.
//! Concepts refer to each other only by identifier, so the graph has no
//! object aliasing and no reference cycles.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

/// One classification entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Concept {
    pub identifier: String,
    pub preferred_label: String,
    pub alternative_labels: BTreeSet<String>,
    pub hidden_labels: BTreeSet<String>,
    pub description: Option<String>,
    pub scope_note: Option<String>,
    /// Absolute URI of the canonical source entry (`skos:exactMatch`)
    pub external_reference: Option<String>,
    /// Thematic collection tags
    pub collections: BTreeSet<String>,
    /// Parent identifiers
    pub broader: BTreeSet<String>,
    /// Child identifiers; derived from `broader`, never set directly
    pub narrower: BTreeSet<String>,
}

impl Concept {
    pub fn new(identifier: impl Into<String>, preferred_label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            preferred_label: preferred_label.into(),
            ..Self::default()
        }
    }

    /// A concept without parents is a top concept of its scheme.
    pub fn is_top_concept(&self) -> bool {
        self.broader.is_empty()
    }
}

/// The single root of a run's graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptScheme {
    pub title: String,
    pub description: String,
    pub created: NaiveDate,
    /// Language of every text value in the scheme
    pub locale_tag: String,
    pub concepts: BTreeMap<String, Concept>,
}

impl ConceptScheme {
    pub fn concept(&self, identifier: &str) -> Option<&Concept> {
        self.concepts.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Top concepts in identifier order.
    pub fn top_concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values().filter(|c| c.is_top_concept())
    }

    /// Collection tag -> member identifiers, both in lexicographic order.
    pub fn collections(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for concept in self.concepts.values() {
            for tag in &concept.collections {
                out.entry(tag.as_str())
                    .or_default()
                    .insert(concept.identifier.as_str());
            }
        }
        out
    }

    /// Every `(child, parent)` edge whose endpoints are not both present.
    pub fn dangling_edges(&self) -> Vec<(&str, &str)> {
        let mut dangling = Vec::new();
        for concept in self.concepts.values() {
            for other in concept.broader.iter().chain(&concept.narrower) {
                if !self.concepts.contains_key(other) {
                    dangling.push((concept.identifier.as_str(), other.as_str()));
                }
            }
        }
        dangling
    }
}

/// A `(child, parent)` row from a hierarchy source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub child: String,
    pub parent: String,
}

impl Relation {
    pub fn new(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
        }
    }
}

/// One identifier-to-tag row from a collection source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    pub identifier: String,
    pub tag: String,
}

impl CollectionRecord {
    pub fn new(identifier: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            tag: tag.into(),
        }
    }
}

/// Raw cell values of one primary-source row, before trimming and splitting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryRecord {
    pub identifier: String,
    pub preferred_label: String,
    /// Newline- or `|`-separated
    pub alternative_labels: Option<String>,
    /// Newline- or `|`-separated
    pub hidden_labels: Option<String>,
    pub description: Option<String>,
    pub scope_note: Option<String>,
    pub external_reference: Option<String>,
}

impl PrimaryRecord {
    pub fn new(identifier: impl Into<String>, preferred_label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            preferred_label: preferred_label.into(),
            ..Self::default()
        }
    }

    pub fn with_alternative_labels(mut self, cell: impl Into<String>) -> Self {
        self.alternative_labels = Some(cell.into());
        self
    }

    pub fn with_hidden_labels(mut self, cell: impl Into<String>) -> Self {
        self.hidden_labels = Some(cell.into());
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_scope_note(mut self, text: impl Into<String>) -> Self {
        self.scope_note = Some(text.into());
        self
    }

    pub fn with_external_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }
}
