//! End-to-end run: decode and read every source, build the graph, serialize
//! it, and clean the serialized text.
//!
//! Concept groups are read right after the primary source and join the same
//! graph. A failing primary source ends the run. A failing auxiliary source
//! (group, collection or hierarchy, including one the caller could not read) is
//! recorded in its [`SourceReport`] and contributes nothing, not even the rows
//! read before the failure; the run continues with the remaining sources.

use chrono::NaiveDate;
use skosgen_tabular::{decode, read_rows, EncodingCandidate, Row, TabularError};
use tracing::{info, warn};

use crate::builder::{BuildOptions, ConceptGraphBuilder};
use crate::cleaner::{CleanOutput, Cleaner};
use crate::config::GeneratorConfig;
use crate::error::PipelineError;
use crate::model::{CollectionRecord, ConceptScheme, PrimaryRecord, Relation};
use crate::serializer::Serializer;
use crate::stats::{BuildStats, SourceReport, SourceRole};

/// Raw bytes of one source and the name used in reports.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Why the caller could not read the source; it is then reported as
    /// dropped instead of decoded
    pub read_error: Option<String>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            read_error: None,
        }
    }

    /// A source whose bytes could not be obtained.
    pub fn unreadable(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            name: name.into(),
            bytes: Vec::new(),
            read_error: Some(error.to_string()),
        }
    }
}

/// A collection-membership source.
#[derive(Debug, Clone)]
pub enum CollectionSource {
    /// Every listed concept belongs to `tag`
    Tagged { tag: String, source: SourceInput },
    /// Each row names its own tag in the configured tag column
    Table(SourceInput),
}

impl CollectionSource {
    pub fn tagged(tag: impl Into<String>, source: SourceInput) -> Self {
        CollectionSource::Tagged {
            tag: tag.into(),
            source,
        }
    }

    fn input(&self) -> &SourceInput {
        match self {
            CollectionSource::Tagged { source, .. } | CollectionSource::Table(source) => source,
        }
    }

    fn role(&self) -> SourceRole {
        match self {
            CollectionSource::Tagged { tag, .. } => SourceRole::Collection {
                tag: Some(tag.clone()),
            },
            CollectionSource::Table(_) => SourceRole::Collection { tag: None },
        }
    }
}

/// Every source of one run.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub primary: SourceInput,
    /// Concept groups read with the group column contract
    pub groups: Vec<SourceInput>,
    pub collections: Vec<CollectionSource>,
    pub hierarchies: Vec<SourceInput>,
}

impl SourceSet {
    pub fn new(primary: SourceInput) -> Self {
        Self {
            primary,
            groups: Vec::new(),
            collections: Vec::new(),
            hierarchies: Vec::new(),
        }
    }

    pub fn with_group(mut self, source: SourceInput) -> Self {
        self.groups.push(source);
        self
    }

    pub fn with_collection(mut self, collection: CollectionSource) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn with_hierarchy(mut self, source: SourceInput) -> Self {
        self.hierarchies.push(source);
        self
    }
}

/// Counters and per-source outcomes; kept even when a run fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    pub stats: BuildStats,
    pub sources: Vec<SourceReport>,
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub scheme: ConceptScheme,
    /// Serializer output before cleaning
    pub raw_text: String,
    pub cleaned: CleanOutput,
    pub report: RunReport,
}

/// Runs builds under one validated configuration.
#[derive(Debug)]
pub struct Pipeline {
    config: GeneratorConfig,
    candidates: Vec<EncodingCandidate>,
    serializer: Serializer,
    cleaner: Cleaner,
    report: RunReport,
}

impl Pipeline {
    /// Validate `config` up front so that bad settings fail before any input is read.
    pub fn new(config: GeneratorConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let candidates = skosgen_tabular::resolve_candidates(&config.encoding_candidates)
            .map_err(crate::error::ConfigError::from)?;
        let serializer = Serializer::new(&config.base_uri)?;
        let cleaner = Cleaner::new(Some(config.base_uri.as_str()))?;
        Ok(Self {
            config,
            candidates,
            serializer,
            cleaner,
            report: RunReport::default(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Report of the last run, complete up to the point where it stopped.
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Build, serialize and clean. `created` dates the scheme unless the
    /// configuration sets a date.
    pub fn run(&mut self, sources: &SourceSet, created: NaiveDate) -> Result<RunOutput, PipelineError> {
        self.report = RunReport::default();
        let mut builder = ConceptGraphBuilder::new(BuildOptions::from_config(&self.config, created));

        let primary = self.read_source(&sources.primary, SourceRole::Primary, |pipeline, row| {
            pipeline.primary_record(row)
        });
        match primary {
            Ok(rows) => {
                for row in rows {
                    match row {
                        Some(record) => builder.add_primary_record(record),
                        None => builder.note_filtered_row(),
                    }
                }
            }
            Err(err) => {
                self.report.stats = builder.stats().clone();
                return Err(PipelineError::PrimarySource(err));
            }
        }

        for group in &sources.groups {
            let records = self.read_source(group, SourceRole::Group, |pipeline, row| {
                pipeline.group_record(row)
            });
            if let Ok(records) = records {
                records
                    .into_iter()
                    .for_each(|record| builder.add_group_record(record));
            }
        }

        for collection in &sources.collections {
            let records = self.read_source(collection.input(), collection.role(), |pipeline, row| {
                pipeline.collection_record(collection, row)
            });
            if let Ok(records) = records {
                records
                    .into_iter()
                    .for_each(|record| builder.add_collection_record(record));
            }
        }

        for hierarchy in &sources.hierarchies {
            let relations = self.read_source(hierarchy, SourceRole::Hierarchy, |pipeline, row| {
                let columns = &pipeline.config.columns.hierarchy;
                Relation::new(row.get_or_empty(&columns.child), row.get_or_empty(&columns.parent))
            });
            if let Ok(relations) = relations {
                relations
                    .into_iter()
                    .for_each(|relation| builder.add_relation(relation));
            }
        }

        let (scheme, stats) = builder.finish();
        self.report.stats = stats;

        let raw_text = self.serializer.serialize(&scheme);
        let cleaned = self.cleaner.clean_text(&raw_text)?;
        if !cleaned.report.is_empty() {
            warn!(
                changes = cleaned.report.len(),
                "cleaner altered freshly generated output"
            );
        }

        Ok(RunOutput {
            scheme,
            raw_text,
            cleaned,
            report: self.report.clone(),
        })
    }

    /// Decode and read one source completely, recording the outcome.
    fn read_source<T>(
        &mut self,
        input: &SourceInput,
        role: SourceRole,
        mut map: impl FnMut(&Self, &Row) -> T,
    ) -> Result<Vec<T>, TabularError> {
        let required = self.required_columns(&role);
        let mut report = SourceReport::new(&input.name, role);
        let result = self.read_rows_of(input, &required, &mut report, &mut map);

        match &result {
            Ok(rows) => info!(
                source = %input.name,
                role = %report.role,
                rows = rows.len(),
                encoding = report.encoding.as_deref().unwrap_or("-"),
                "source loaded"
            ),
            Err(err) => {
                warn!(source = %input.name, role = %report.role, error = %err, "source dropped");
                report.error = Some(err.to_string());
            }
        }
        self.report.sources.push(report);
        result
    }

    fn read_rows_of<T>(
        &self,
        input: &SourceInput,
        required: &[String],
        report: &mut SourceReport,
        map: &mut impl FnMut(&Self, &Row) -> T,
    ) -> Result<Vec<T>, TabularError> {
        if let Some(message) = &input.read_error {
            return Err(TabularError::Unreadable {
                source_name: input.name.clone(),
                message: message.clone(),
            });
        }
        let decoded = decode(&input.name, &input.bytes, &self.candidates)?;
        report.encoding = Some(decoded.encoding.to_string());

        let rows = read_rows(&input.name, &decoded.text, self.config.delimiter_byte(), required)?;
        let mut out = Vec::new();
        for row in rows {
            let row = row?;
            report.rows += 1;
            out.push(map(self, &row));
        }
        Ok(out)
    }

    fn required_columns(&self, role: &SourceRole) -> Vec<String> {
        let columns = &self.config.columns;
        match role {
            SourceRole::Primary => columns.primary.required(),
            SourceRole::Group => columns.group.required(),
            SourceRole::Collection { tag } => columns.collection.required(tag.is_none()),
            SourceRole::Hierarchy => columns.hierarchy.required(),
        }
    }

    /// `None` when the row filter rejects the row.
    fn primary_record(&self, row: &Row) -> Option<PrimaryRecord> {
        let columns = &self.config.columns.primary;
        if let Some(filter) = &columns.filter {
            if row.get_or_empty(&filter.column).trim() != filter.equals {
                return None;
            }
        }
        let optional = |column: &Option<String>| column.as_deref().map(|c| row.get_or_empty(c).to_string());
        Some(PrimaryRecord {
            identifier: row.get_or_empty(&columns.identifier).to_string(),
            preferred_label: row.get_or_empty(&columns.preferred_label).to_string(),
            alternative_labels: optional(&columns.alternative_labels),
            hidden_labels: optional(&columns.hidden_labels),
            description: optional(&columns.description),
            scope_note: optional(&columns.scope_note),
            external_reference: optional(&columns.external_reference),
        })
    }

    fn group_record(&self, row: &Row) -> PrimaryRecord {
        let columns = &self.config.columns.group;
        let optional = |column: &Option<String>| column.as_deref().map(|c| row.get_or_empty(c).to_string());
        PrimaryRecord {
            identifier: row.get_or_empty(&columns.identifier).to_string(),
            preferred_label: row.get_or_empty(&columns.preferred_label).to_string(),
            alternative_labels: optional(&columns.alternative_labels),
            description: optional(&columns.description),
            external_reference: optional(&columns.external_reference),
            ..PrimaryRecord::default()
        }
    }

    fn collection_record(&self, source: &CollectionSource, row: &Row) -> CollectionRecord {
        let columns = &self.config.columns.collection;
        let tag = match source {
            CollectionSource::Tagged { tag, .. } => tag.as_str(),
            CollectionSource::Table(_) => row.get_or_empty(&columns.tag),
        };
        CollectionRecord::new(row.get_or_empty(&columns.identifier), tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn primary() -> SourceInput {
        SourceInput::new(
            "skills.csv",
            "conceptUri,preferredLabel,altLabels,description,conceptType\n\
             http://data.europa.eu/esco/skill/A1,Kochen,Garen,,KnowledgeSkillCompetence\n\
             http://data.europa.eu/esco/skill/A2,Backen,,Brot backen,KnowledgeSkillCompetence\n\
             http://data.europa.eu/esco/skill/G1,Gruppe,,,SkillGroup\n",
        )
    }

    #[test]
    fn filter_and_auxiliary_sources() {
        let mut config = GeneratorConfig::default();
        config.columns.primary.filter = Some(crate::config::RowFilter {
            column: "conceptType".into(),
            equals: "KnowledgeSkillCompetence".into(),
        });
        let mut pipeline = Pipeline::new(config).unwrap();

        let sources = SourceSet::new(primary())
            .with_collection(CollectionSource::tagged(
                "green",
                SourceInput::new("green.csv", "conceptUri\nhttp://data.europa.eu/esco/skill/A1\n"),
            ))
            .with_hierarchy(SourceInput::new(
                "broader.csv",
                "conceptUri,broaderUri\nhttp://data.europa.eu/esco/skill/A2,http://data.europa.eu/esco/skill/A1\n",
            ));

        let out = pipeline.run(&sources, date()).unwrap();
        let stats = &out.report.stats;
        assert_eq!(stats.primary_rows, 3);
        assert_eq!(stats.filtered_primary_rows, 1);
        assert_eq!(stats.concepts, 2);
        assert_eq!(stats.collection_memberships, 1);
        assert_eq!(stats.accepted_relations, 1);
        assert!(out.scheme.concept("A2").unwrap().broader.contains("A1"));
        assert_eq!(out.report.sources.len(), 3);
        assert!(out.report.sources.iter().all(SourceReport::is_loaded));
        assert!(out.cleaned.report.is_empty());
        assert_eq!(out.cleaned.text, out.raw_text);
    }

    #[test]
    fn broken_auxiliary_source_is_skipped() {
        let mut pipeline = Pipeline::new(GeneratorConfig::default()).unwrap();
        let sources = SourceSet::new(primary()).with_hierarchy(SourceInput::new(
            "broader.csv",
            "child,parent\nA2,A1\n",
        ));

        let out = pipeline.run(&sources, date()).unwrap();
        assert_eq!(out.report.stats.relation_rows, 0);
        let hierarchy = &out.report.sources[1];
        assert_eq!(hierarchy.role, SourceRole::Hierarchy);
        assert!(hierarchy.error.as_deref().unwrap().contains("conceptUri"));
    }

    #[test]
    fn group_sources_anchor_hierarchy_edges() {
        let mut config = GeneratorConfig::default();
        config.columns.primary.filter = Some(crate::config::RowFilter {
            column: "conceptType".into(),
            equals: "KnowledgeSkillCompetence".into(),
        });
        let mut pipeline = Pipeline::new(config).unwrap();

        let sources = SourceSet::new(primary())
            .with_group(SourceInput::new(
                "skillGroups.csv",
                "conceptUri,preferredLabel,altLabels,description,code
                 http://data.europa.eu/esco/skill/S1,Kommunikation,,,S1
",
            ))
            .with_hierarchy(SourceInput::new(
                "broader.csv",
                "conceptUri,broaderUri
                 http://data.europa.eu/esco/skill/A1,http://data.europa.eu/esco/skill/S1
",
            ));

        let out = pipeline.run(&sources, date()).unwrap();
        let stats = &out.report.stats;
        assert_eq!(stats.group_rows, 1);
        assert_eq!(stats.concepts, 3);
        assert_eq!(stats.accepted_relations, 1);
        assert_eq!(stats.orphan_relations, 0);
        assert!(out.scheme.concept("A1").unwrap().broader.contains("S1"));
        assert_eq!(out.report.sources[1].role, SourceRole::Group);
        assert!(out.raw_text.contains("skos:broader <http://w3id.org/openeduhub/vocabs/escoSkills/S1>"));
    }

    #[test]
    fn unreadable_auxiliary_source_is_recorded() {
        let mut pipeline = Pipeline::new(GeneratorConfig::default()).unwrap();
        let sources = SourceSet::new(primary())
            .with_hierarchy(SourceInput::unreadable("missing.csv", "No such file or directory"));

        let out = pipeline.run(&sources, date()).unwrap();
        assert_eq!(out.report.stats.concepts, 3);
        let hierarchy = &out.report.sources[1];
        assert!(!hierarchy.is_loaded());
        assert_eq!(
            hierarchy.error.as_deref(),
            Some("missing.csv: cannot read: No such file or directory")
        );
    }

    #[test]
    fn unreadable_primary_source_fails_the_run() {
        let mut pipeline = Pipeline::new(GeneratorConfig::default()).unwrap();
        let sources = SourceSet::new(SourceInput::unreadable("skills.csv", "permission denied"));

        let err = pipeline.run(&sources, date()).unwrap_err();
        assert!(matches!(err, PipelineError::PrimarySource(TabularError::Unreadable { .. })));
        assert_eq!(pipeline.report().sources.len(), 1);
    }

    #[test]
    fn broken_primary_source_fails_the_run() {
        let mut pipeline = Pipeline::new(GeneratorConfig::default()).unwrap();
        let sources = SourceSet::new(SourceInput::new("skills.csv", "id,label\nA1,Kochen\n"));

        let err = pipeline.run(&sources, date()).unwrap_err();
        assert!(matches!(err, PipelineError::PrimarySource(TabularError::Schema { .. })));
        assert_eq!(pipeline.report().sources.len(), 1);
        assert!(!pipeline.report().sources[0].is_loaded());
    }

    #[test]
    fn invalid_base_uri_fails_before_reading() {
        let config = GeneratorConfig {
            base_uri: "http://ex.org/no-trailing-slash".into(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(PipelineError::Serialization(_))
        ));
    }
}
