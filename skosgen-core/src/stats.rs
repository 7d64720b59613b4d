//! Run statistics.
//!
//! Counters are an explicit value owned by the builder and handed back to the
//! caller; nothing here is global.

use serde::Serialize;

/// Counters collected while building one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub primary_rows: usize,
    /// Rows read from concept-group sources
    pub group_rows: usize,
    pub concepts: usize,
    pub duplicate_primary_rows: usize,
    /// Group rows whose identifier was already taken by another concept row
    pub duplicate_group_rows: usize,
    pub filtered_primary_rows: usize,
    pub missing_identifiers: usize,
    pub empty_labels: usize,
    pub collection_rows: usize,
    pub collection_memberships: usize,
    pub orphan_collection_rows: usize,
    pub empty_collection_tags: usize,
    pub relation_rows: usize,
    pub accepted_relations: usize,
    pub orphan_relations: usize,
    pub self_relations: usize,
    pub duplicate_relations: usize,
    pub duplicate_external_references: usize,
    pub invalid_external_references: usize,
}

impl BuildStats {
    /// `(label, value)` pairs for reporting, volume counters first.
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("primary rows", self.primary_rows),
            ("group rows", self.group_rows),
            ("concepts", self.concepts),
            ("collection rows", self.collection_rows),
            ("collection memberships", self.collection_memberships),
            ("relation rows", self.relation_rows),
            ("accepted relations", self.accepted_relations),
            ("duplicate primary rows", self.duplicate_primary_rows),
            ("duplicate group rows", self.duplicate_group_rows),
            ("filtered primary rows", self.filtered_primary_rows),
            ("missing identifiers", self.missing_identifiers),
            ("empty labels", self.empty_labels),
            ("orphan collection rows", self.orphan_collection_rows),
            ("empty collection tags", self.empty_collection_tags),
            ("orphan relations", self.orphan_relations),
            ("self-referential relations", self.self_relations),
            ("duplicate relations", self.duplicate_relations),
            ("duplicate external references", self.duplicate_external_references),
            ("invalid external references", self.invalid_external_references),
        ]
    }

    /// Sum of all data-quality conditions (everything that was skipped,
    /// rejected or patched up).
    pub fn data_quality_issues(&self) -> usize {
        self.duplicate_primary_rows
            + self.duplicate_group_rows
            + self.missing_identifiers
            + self.empty_labels
            + self.orphan_collection_rows
            + self.empty_collection_tags
            + self.orphan_relations
            + self.self_relations
            + self.duplicate_relations
            + self.duplicate_external_references
            + self.invalid_external_references
    }
}

/// Role a source plays in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SourceRole {
    Primary,
    /// Concept groups that join the graph next to the primary concepts
    Group,
    /// `tag` is `None` for tables carrying the tag per row
    Collection { tag: Option<String> },
    Hierarchy,
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRole::Primary => write!(f, "primary"),
            SourceRole::Group => write!(f, "group"),
            SourceRole::Collection { tag: Some(tag) } => write!(f, "collection '{tag}'"),
            SourceRole::Collection { tag: None } => write!(f, "collection table"),
            SourceRole::Hierarchy => write!(f, "hierarchy"),
        }
    }
}

/// What happened to one input source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub role: SourceRole,
    /// Encoding that decoded the source
    pub encoding: Option<String>,
    pub rows: usize,
    /// Fatal error that dropped this source's contribution
    pub error: Option<String>,
}

impl SourceReport {
    pub fn new(name: impl Into<String>, role: SourceRole) -> Self {
        Self {
            name: name.into(),
            role,
            encoding: None,
            rows: 0,
            error: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.error.is_none()
    }
}
