use crate::cli::ChangelogArgs;
use crate::config;
use crate::error::{CliError, CliResult};
use crate::output;
use skosgen_core::Cleaner;
use skosgen_tabular::{decode, resolve_candidates};
use std::path::Path;

pub fn run(
    input: &Path,
    output_path: &Path,
    changelog: &ChangelogArgs,
    base_uri: Option<&str>,
    config_path: Option<&Path>,
    quiet: bool,
) -> CliResult<()> {
    let mut generator_config = config::load(config_path)?;
    if let Some(base) = base_uri {
        generator_config.base_uri = base.to_string();
    }
    generator_config.validate()?;
    let cleaner = Cleaner::new(Some(generator_config.base_uri.as_str()))?;

    // Same encoding fallback as the CSV sources, BOM included.
    let candidates = resolve_candidates(&generator_config.encoding_candidates)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let bytes = config::read_input(input)?;
    let decoded = decode(&input.display().to_string(), &bytes, &candidates)
        .map_err(|e| CliError::Input(e.to_string()))?;
    tracing::debug!(
        input = %input.display(),
        encoding = decoded.encoding,
        bom_stripped = decoded.bom_stripped,
        "decoded turtle input"
    );

    let out = cleaner.clean_text(&decoded.text)?;
    config::write_output(output_path, &out.text)?;
    if let Some(path) = &changelog.changelog {
        let log = output::format_changelog(&out.report, changelog.changelog_format)?;
        config::write_output(path, &log)?;
    }

    if !quiet {
        output::print_clean_summary(&out.report);
        println!("Wrote {}", output_path.display());
    }
    Ok(())
}
