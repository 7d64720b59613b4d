use crate::config;
use crate::error::{CliError, CliResult};
use std::path::Path;

/// Default skosgen.toml. Every value shown is the built-in default.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# skosgen configuration
#
# Precedence (highest to lowest):
#   1. Command-line flags (--base-uri, --locale, --created)
#   2. This file
#   3. Built-in defaults

# Concept IRIs are <base_uri><identifier>; must end with '/' or '#'
base_uri = "http://w3id.org/openeduhub/vocabs/escoSkills/"

# Language tag of every label and note
locale_tag = "de"

# Tried in order on every CSV file
encoding_candidates = ["utf-8-sig", "utf-8", "windows-1252", "iso-8859-1"]

delimiter = ","

# Namespace for external references given as bare identifiers
# exact_match_base = "http://data.europa.eu/esco/skill/"

[scheme]
title = "ESCO Skills"
description = "SKOS concept scheme generated from ESCO classification tables"
# created = "2024-05-01"             # defaults to today

# ──────────────────────────────────────────────────────────────────────
# Column contracts. Every configured column must exist in the header.
# ──────────────────────────────────────────────────────────────────────

[columns.primary]
identifier = "conceptUri"
preferred_label = "preferredLabel"
alternative_labels = "altLabels"
# hidden_labels = "hiddenLabels"
description = "description"
# scope_note = "scopeNote"
external_reference = "conceptUri"
# filter = { column = "conceptType", equals = "KnowledgeSkillCompetence" }

[columns.group]                      # read by --group, never filtered
identifier = "conceptUri"
preferred_label = "preferredLabel"
alternative_labels = "altLabels"
description = "description"
external_reference = "conceptUri"

[columns.collection]
identifier = "conceptUri"
tag = "collection"                   # only read by --collection-table

[columns.hierarchy]
child = "conceptUri"
parent = "broaderUri"
"#;

pub fn run(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    config::write_output(path, DEFAULT_CONFIG_TEMPLATE)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skosgen_core::GeneratorConfig;

    #[test]
    fn template_matches_the_defaults() {
        let parsed = GeneratorConfig::from_toml_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed, GeneratorConfig::default());
    }
}
