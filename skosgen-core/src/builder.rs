//! Concept graph builder.
//!
//! Records can be added in any order; [`ConceptGraphBuilder::finish`] resolves
//! them in a fixed sequence:
//!
//! 1. primary and group records, already keyed by identifier (a repeated
//!    identifier replaces the earlier row)
//! 2. collection records, attached to existing concepts
//! 3. hierarchy relations, accepted only when both endpoints exist and differ
//! 4. `narrower`, computed once as the transpose of all accepted `broader` edges
//!
//! Nothing in here fails: rejected input is counted in [`BuildStats`] and the
//! graph is built from whatever is valid.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GeneratorConfig;
use crate::model::{CollectionRecord, Concept, ConceptScheme, PrimaryRecord, Relation};
use crate::stats::BuildStats;

/// Scheme metadata and value rules for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub title: String,
    pub description: String,
    pub created: NaiveDate,
    pub locale_tag: String,
    /// Prefix for external references that are not absolute URIs
    pub exact_match_base: Option<String>,
}

impl BuildOptions {
    /// Options from a configuration; `created` is used when the config has no date.
    pub fn from_config(config: &GeneratorConfig, created: NaiveDate) -> Self {
        Self {
            title: config.scheme.title.clone(),
            description: config.scheme.description.clone(),
            created: config.scheme.created.unwrap_or(created),
            locale_tag: config.locale_tag.clone(),
            exact_match_base: config.exact_match_base.clone(),
        }
    }
}

/// Accumulates records and produces one [`ConceptScheme`].
#[derive(Debug)]
pub struct ConceptGraphBuilder {
    options: BuildOptions,
    concepts: BTreeMap<String, Concept>,
    collection_records: Vec<CollectionRecord>,
    relations: Vec<Relation>,
    stats: BuildStats,
}

impl ConceptGraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            concepts: BTreeMap::new(),
            collection_records: Vec::new(),
            relations: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Counters so far. Resolution counters are only final after [`Self::finish`].
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Add one primary row. A repeated identifier replaces the earlier concept.
    pub fn add_primary_record(&mut self, record: PrimaryRecord) {
        self.stats.primary_rows += 1;
        if self.insert_concept(record, "primary") {
            self.stats.duplicate_primary_rows += 1;
        }
    }

    /// Add one concept-group row. Groups are concepts in their own right, so
    /// relations may point at them; a repeated identifier replaces the earlier
    /// concept as it does for primary rows.
    pub fn add_group_record(&mut self, record: PrimaryRecord) {
        self.stats.group_rows += 1;
        if self.insert_concept(record, "group") {
            self.stats.duplicate_group_rows += 1;
        }
    }

    /// Returns whether an existing concept was replaced.
    fn insert_concept(&mut self, record: PrimaryRecord, origin: &'static str) -> bool {
        let identifier = normalize_identifier(&record.identifier);
        if identifier.is_empty() {
            self.stats.missing_identifiers += 1;
            warn!(origin, "row without identifier skipped");
            return false;
        }

        let mut preferred_label = record.preferred_label.trim().to_string();
        if preferred_label.is_empty() {
            self.stats.empty_labels += 1;
            warn!(identifier = %identifier, "empty preferred label, using identifier");
            preferred_label = identifier.clone();
        }

        let mut concept = Concept::new(identifier.clone(), preferred_label);
        if let Some(cell) = &record.alternative_labels {
            concept.alternative_labels = split_labels(cell)
                .filter(|label| *label != concept.preferred_label)
                .map(str::to_string)
                .collect();
        }
        if let Some(cell) = &record.hidden_labels {
            concept.hidden_labels = split_labels(cell).map(str::to_string).collect();
        }
        concept.description = non_empty(record.description.as_deref());
        concept.scope_note = non_empty(record.scope_note.as_deref());
        concept.external_reference = record
            .external_reference
            .as_deref()
            .and_then(|value| self.external_reference(&identifier, value));

        let replaced = self.concepts.insert(identifier.clone(), concept).is_some();
        if replaced {
            warn!(identifier = %identifier, origin, "duplicate concept row replaces earlier one");
        }
        replaced
    }

    /// Count a primary row skipped by the row filter.
    pub fn note_filtered_row(&mut self) {
        self.stats.primary_rows += 1;
        self.stats.filtered_primary_rows += 1;
    }

    pub fn add_collection_record(&mut self, record: CollectionRecord) {
        self.stats.collection_rows += 1;
        self.collection_records.push(record);
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.stats.relation_rows += 1;
        self.relations.push(relation);
    }

    /// Resolve collections and relations, derive `narrower`, and return the graph.
    pub fn finish(mut self) -> (ConceptScheme, BuildStats) {
        self.resolve_collections();
        self.resolve_relations();
        self.derive_narrower();
        self.count_shared_external_references();

        self.stats.concepts = self.concepts.len();
        if self.concepts.is_empty() {
            warn!("graph has no concepts");
        }
        info!(
            concepts = self.stats.concepts,
            relations = self.stats.accepted_relations,
            memberships = self.stats.collection_memberships,
            "concept graph built"
        );

        let scheme = ConceptScheme {
            title: self.options.title,
            description: self.options.description,
            created: self.options.created,
            locale_tag: self.options.locale_tag,
            concepts: self.concepts,
        };
        (scheme, self.stats)
    }

    /// Absolute URIs pass through; bare values need `exact_match_base`.
    fn external_reference(&mut self, identifier: &str, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if Url::parse(value).is_ok() {
            return Some(value.to_string());
        }
        match &self.options.exact_match_base {
            Some(base) => Some(format!("{base}{value}")),
            None => {
                self.stats.invalid_external_references += 1;
                debug!(identifier, value, "external reference is not a URI, dropped");
                None
            }
        }
    }

    /// Rows with a blank tag are counted as `empty_collection_tags` whether or
    /// not their concept exists; the rest are orphans when the concept is unknown.
    fn resolve_collections(&mut self) {
        for record in std::mem::take(&mut self.collection_records) {
            let identifier = normalize_identifier(&record.identifier);
            let tag = record.tag.trim();
            if tag.is_empty() {
                self.stats.empty_collection_tags += 1;
                debug!(identifier = %identifier, "collection row without tag");
                continue;
            }
            match self.concepts.get_mut(&identifier) {
                Some(concept) => {
                    if concept.collections.insert(tag.to_string()) {
                        self.stats.collection_memberships += 1;
                    }
                }
                None => {
                    self.stats.orphan_collection_rows += 1;
                    debug!(identifier = %identifier, tag, "orphan collection row");
                }
            }
        }
    }

    fn resolve_relations(&mut self) {
        for relation in std::mem::take(&mut self.relations) {
            let child = normalize_identifier(&relation.child);
            let parent = normalize_identifier(&relation.parent);

            if child == parent {
                self.stats.self_relations += 1;
                warn!(identifier = %child, "self-referential relation rejected");
                continue;
            }
            if !self.concepts.contains_key(&parent) {
                self.stats.orphan_relations += 1;
                debug!(child = %child, parent = %parent, "relation to unknown parent");
                continue;
            }
            let Some(concept) = self.concepts.get_mut(&child) else {
                self.stats.orphan_relations += 1;
                debug!(child = %child, parent = %parent, "relation from unknown child");
                continue;
            };
            if concept.broader.insert(parent) {
                self.stats.accepted_relations += 1;
            } else {
                self.stats.duplicate_relations += 1;
            }
        }
    }

    fn derive_narrower(&mut self) {
        let edges: Vec<(String, String)> = self
            .concepts
            .values()
            .flat_map(|c| {
                c.broader
                    .iter()
                    .map(move |parent| (parent.clone(), c.identifier.clone()))
            })
            .collect();
        for concept in self.concepts.values_mut() {
            concept.narrower.clear();
        }
        for (parent, child) in edges {
            if let Some(concept) = self.concepts.get_mut(&parent) {
                concept.narrower.insert(child);
            }
        }
    }

    /// Distinct concepts claiming the same exact-match target are all kept.
    fn count_shared_external_references(&mut self) {
        let mut claims: HashMap<&str, Vec<&str>> = HashMap::new();
        for concept in self.concepts.values() {
            if let Some(reference) = &concept.external_reference {
                claims
                    .entry(reference.as_str())
                    .or_default()
                    .push(concept.identifier.as_str());
            }
        }
        let mut shared = 0;
        for (reference, identifiers) in &claims {
            if identifiers.len() > 1 {
                shared += identifiers.len() - 1;
                warn!(reference, concepts = ?identifiers, "external reference claimed by several concepts");
            }
        }
        self.stats.duplicate_external_references = shared;
    }
}

/// Trim an identifier; for an absolute `http(s)` URI keep the last path segment.
///
/// `http://data.europa.eu/esco/skill/0005c151-5b5a` becomes `0005c151-5b5a`.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(url) = Url::parse(trimmed) {
        if matches!(url.scheme(), "http" | "https") {
            if let Some(last) = url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            {
                return last.to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Labels in a multi-label cell, split on newlines and `|`, trimmed, empties dropped.
pub fn split_labels(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(['\n', '|'])
        .map(str::trim)
        .filter(|label| !label.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
