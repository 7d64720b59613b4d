//! Generator configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration and a partial one only overrides what it names:
//!
//! ```toml
//! base_uri = "http://w3id.org/openeduhub/vocabs/escoSkills/"
//! locale_tag = "de"
//!
//! [scheme]
//! title = "ESCO Skills"
//! created = "2024-05-01"
//!
//! [columns.primary]
//! filter = { column = "conceptType", equals = "KnowledgeSkillCompetence" }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skosgen_tabular::resolve_candidates;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URI: &str = "http://w3id.org/openeduhub/vocabs/escoSkills/";
pub const DEFAULT_LOCALE: &str = "de";
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8-sig", "utf-8", "windows-1252", "iso-8859-1"];

/// Top-level generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Root URI; concept IRIs are `base_uri + identifier`
    pub base_uri: String,
    /// Language tag applied to every text literal
    pub locale_tag: String,
    /// Encodings tried in order on every source
    pub encoding_candidates: Vec<String>,
    pub delimiter: char,
    /// Namespace for external references given as bare identifiers
    pub exact_match_base: Option<String>,
    pub scheme: SchemeConfig,
    pub columns: ColumnContracts,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            locale_tag: DEFAULT_LOCALE.to_string(),
            encoding_candidates: DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect(),
            delimiter: ',',
            exact_match_base: None,
            scheme: SchemeConfig::default(),
            columns: ColumnContracts::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a TOML document; missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Check values the type system cannot. The base URI is checked by the
    /// serializer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = self.delimiter;
        if !d.is_ascii() || matches!(d, '"' | '\n' | '\r') {
            return Err(ConfigError::InvalidDelimiter(d));
        }

        if self.encoding_candidates.is_empty() {
            return Err(ConfigError::NoEncodings);
        }
        resolve_candidates(&self.encoding_candidates)?;

        if !is_language_tag(&self.locale_tag) {
            return Err(ConfigError::InvalidLocale(self.locale_tag.clone()));
        }

        if let Some(base) = &self.exact_match_base {
            let parsed = Url::parse(base).map_err(|e| ConfigError::InvalidExactMatchBase {
                uri: base.clone(),
                reason: e.to_string(),
            })?;
            if parsed.cannot_be_a_base() {
                return Err(ConfigError::InvalidExactMatchBase {
                    uri: base.clone(),
                    reason: "not a hierarchical URI".to_string(),
                });
            }
        }

        self.columns.validate()
    }

    /// Delimiter as the byte the CSV reader expects. Only valid after [`Self::validate`].
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(u32::from(self.delimiter)).unwrap_or(b',')
    }
}

/// `[scheme]`: metadata of the concept scheme node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemeConfig {
    pub title: String,
    pub description: String,
    /// Creation date; the caller supplies one when unset
    pub created: Option<NaiveDate>,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            title: "ESCO Skills".to_string(),
            description: "SKOS concept scheme generated from ESCO classification tables".to_string(),
            created: None,
        }
    }
}

/// `[columns.*]`: required-column contracts per source kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnContracts {
    pub primary: PrimaryColumns,
    pub group: GroupColumns,
    pub collection: CollectionColumns,
    pub hierarchy: HierarchyColumns,
}

impl ColumnContracts {
    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.primary;
        let g = &self.group;
        let named: [(&'static str, Option<&String>); 17] = [
            ("primary.identifier", Some(&p.identifier)),
            ("primary.preferred_label", Some(&p.preferred_label)),
            ("primary.alternative_labels", p.alternative_labels.as_ref()),
            ("primary.hidden_labels", p.hidden_labels.as_ref()),
            ("primary.description", p.description.as_ref()),
            ("primary.scope_note", p.scope_note.as_ref()),
            ("primary.external_reference", p.external_reference.as_ref()),
            ("primary.filter.column", p.filter.as_ref().map(|f| &f.column)),
            ("group.identifier", Some(&g.identifier)),
            ("group.preferred_label", Some(&g.preferred_label)),
            ("group.alternative_labels", g.alternative_labels.as_ref()),
            ("group.description", g.description.as_ref()),
            ("group.external_reference", g.external_reference.as_ref()),
            ("collection.identifier", Some(&self.collection.identifier)),
            ("collection.tag", Some(&self.collection.tag)),
            ("hierarchy.child", Some(&self.hierarchy.child)),
            ("hierarchy.parent", Some(&self.hierarchy.parent)),
        ];
        for (field, value) in named {
            if value.is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::EmptyColumn(field));
            }
        }
        Ok(())
    }
}

/// Columns of the primary (concept) source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimaryColumns {
    pub identifier: String,
    pub preferred_label: String,
    pub alternative_labels: Option<String>,
    pub hidden_labels: Option<String>,
    pub description: Option<String>,
    pub scope_note: Option<String>,
    pub external_reference: Option<String>,
    /// Keep only rows where `column == equals`
    pub filter: Option<RowFilter>,
}

impl Default for PrimaryColumns {
    fn default() -> Self {
        Self {
            identifier: "conceptUri".to_string(),
            preferred_label: "preferredLabel".to_string(),
            alternative_labels: Some("altLabels".to_string()),
            hidden_labels: None,
            description: Some("description".to_string()),
            scope_note: None,
            external_reference: Some("conceptUri".to_string()),
            filter: None,
        }
    }
}

impl PrimaryColumns {
    /// Every configured column, in declaration order, without repeats.
    pub fn required(&self) -> Vec<String> {
        let optional = [
            self.alternative_labels.as_ref(),
            self.hidden_labels.as_ref(),
            self.description.as_ref(),
            self.scope_note.as_ref(),
            self.external_reference.as_ref(),
            self.filter.as_ref().map(|f| &f.column),
        ];
        let mut columns = vec![self.identifier.clone(), self.preferred_label.clone()];
        for column in optional.into_iter().flatten() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }
}

/// Columns of a concept-group source (skill groups, ISCO groups).
///
/// Group rows become concepts like primary rows, so hierarchy edges that point
/// at a group resolve. There is no row filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupColumns {
    pub identifier: String,
    pub preferred_label: String,
    pub alternative_labels: Option<String>,
    pub description: Option<String>,
    pub external_reference: Option<String>,
}

impl Default for GroupColumns {
    fn default() -> Self {
        Self {
            identifier: "conceptUri".to_string(),
            preferred_label: "preferredLabel".to_string(),
            alternative_labels: Some("altLabels".to_string()),
            description: Some("description".to_string()),
            external_reference: Some("conceptUri".to_string()),
        }
    }
}

impl GroupColumns {
    pub fn required(&self) -> Vec<String> {
        let optional = [
            self.alternative_labels.as_ref(),
            self.description.as_ref(),
            self.external_reference.as_ref(),
        ];
        let mut columns = vec![self.identifier.clone(), self.preferred_label.clone()];
        for column in optional.into_iter().flatten() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowFilter {
    pub column: String,
    pub equals: String,
}

/// Columns of a collection-membership source.
///
/// `tag` is only required for tables that carry the tag per row; sources
/// registered under a fixed tag need just the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionColumns {
    pub identifier: String,
    pub tag: String,
}

impl Default for CollectionColumns {
    fn default() -> Self {
        Self {
            identifier: "conceptUri".to_string(),
            tag: "collection".to_string(),
        }
    }
}

impl CollectionColumns {
    pub fn required(&self, with_tag_column: bool) -> Vec<String> {
        let mut columns = vec![self.identifier.clone()];
        if with_tag_column && self.tag != self.identifier {
            columns.push(self.tag.clone());
        }
        columns
    }
}

/// Columns of a hierarchy (child, parent) source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HierarchyColumns {
    pub child: String,
    pub parent: String,
}

impl Default for HierarchyColumns {
    fn default() -> Self {
        Self {
            child: "conceptUri".to_string(),
            parent: "broaderUri".to_string(),
        }
    }
}

impl HierarchyColumns {
    pub fn required(&self) -> Vec<String> {
        vec![self.child.clone(), self.parent.clone()]
    }
}

/// `de`, `en-US`, `zh-Hant-TW`: alphabetic primary subtag, alphanumeric subtags.
fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.base_uri, DEFAULT_BASE_URI);
        assert_eq!(config.encoding_candidates[0], "utf-8-sig");
        config.validate().unwrap();
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            locale_tag = "en"
            delimiter = ";"

            [scheme]
            created = "2024-05-01"

            [columns.primary]
            hidden_labels = "hiddenLabels"
            filter = { column = "conceptType", equals = "KnowledgeSkillCompetence" }
            "#,
        )
        .unwrap();

        assert_eq!(config.locale_tag, "en");
        assert_eq!(config.delimiter_byte(), b';');
        assert_eq!(config.base_uri, DEFAULT_BASE_URI);
        assert_eq!(
            config.scheme.created,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(config.columns.primary.identifier, "conceptUri");
        assert_eq!(
            config.columns.primary.required(),
            vec![
                "conceptUri",
                "preferredLabel",
                "altLabels",
                "hiddenLabels",
                "description",
                "conceptType"
            ]
        );
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GeneratorConfig::from_toml_str("base_url = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = GeneratorConfig {
            delimiter: '"',
            ..GeneratorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDelimiter('"'))));

        config.delimiter = ',';
        config.encoding_candidates = vec!["utf-8".into(), "ebcdic-42".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Encoding(_))));

        config.encoding_candidates = vec![];
        assert!(matches!(config.validate(), Err(ConfigError::NoEncodings)));

        config.encoding_candidates = vec!["utf-8".into()];
        config.locale_tag = "de_DE".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLocale(_))));

        config.locale_tag = "de-DE".into();
        config.columns.hierarchy.parent = " ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyColumn("hierarchy.parent"))
        ));
    }

    #[test]
    fn collection_contract_depends_on_tag_source() {
        let cols = CollectionColumns::default();
        assert_eq!(cols.required(false), vec!["conceptUri"]);
        assert_eq!(cols.required(true), vec!["conceptUri", "collection"]);
    }

    #[test]
    fn group_contract_has_no_filter_column() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            [columns.primary]
            filter = { column = "conceptType", equals = "KnowledgeSkillCompetence" }

            [columns.group]
            description = "scopeNote"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.columns.group.required(),
            vec!["conceptUri", "preferredLabel", "altLabels", "scopeNote"]
        );

        let mut config = config;
        config.columns.group.preferred_label = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyColumn("group.preferred_label"))
        ));
    }

    #[test]
    fn language_tags() {
        assert!(is_language_tag("de"));
        assert!(is_language_tag("en-US"));
        assert!(is_language_tag("zh-Hant-TW"));
        assert!(!is_language_tag(""));
        assert!(!is_language_tag("1de"));
        assert!(!is_language_tag("de-"));
    }
}
