use crate::cli::{ChangelogArgs, ConfigOverrides};
use crate::config;
use crate::error::{CliError, CliResult};
use crate::output;
use chrono::{Local, NaiveDate};
use skosgen_core::{CleanReport, CollectionSource, Pipeline, RunReport, SourceInput, SourceSet};
use std::fs;
use std::path::{Path, PathBuf};

pub struct BuildArgs<'a> {
    pub primary: &'a Path,
    pub groups: &'a [PathBuf],
    pub collections: &'a [String],
    pub collection_tables: &'a [PathBuf],
    pub hierarchies: &'a [PathBuf],
    pub output: &'a Path,
    pub cleaned: Option<&'a Path>,
    pub changelog: &'a ChangelogArgs,
    pub overrides: &'a ConfigOverrides,
    pub created: Option<NaiveDate>,
}

/// Every run ends with the source and build summary, whether it failed or not.
pub fn run(args: BuildArgs<'_>, config_path: Option<&Path>, quiet: bool) -> CliResult<()> {
    let mut report = RunReport::default();
    let result = execute(&args, config_path, &mut report);

    if !quiet {
        output::print_run_summary(&report);
        if let Ok(cleaned) = &result {
            output::print_clean_summary(cleaned);
            println!("Wrote {}", args.output.display());
            if let Some(path) = args.cleaned {
                println!("Wrote {}", path.display());
            }
        }
    }
    result.map(|_| ())
}

fn execute(
    args: &BuildArgs<'_>,
    config_path: Option<&Path>,
    report: &mut RunReport,
) -> CliResult<CleanReport> {
    let mut generator_config = config::load(config_path)?;
    config::apply_overrides(&mut generator_config, args.overrides);
    if args.created.is_some() {
        generator_config.scheme.created = args.created;
    }
    let created = generator_config
        .scheme
        .created
        .unwrap_or_else(|| Local::now().date_naive());

    let sources = collect_sources(args)?;
    let mut pipeline = Pipeline::new(generator_config)?;

    let result = pipeline.run(&sources, created);
    *report = pipeline.report().clone();
    let out = result?;

    config::write_output(args.output, &out.raw_text)?;
    if let Some(path) = args.cleaned {
        config::write_output(path, &out.cleaned.text)?;
    }
    if let Some(path) = &args.changelog.changelog {
        let log = output::format_changelog(&out.cleaned.report, args.changelog.changelog_format)?;
        config::write_output(path, &log)?;
    }
    Ok(out.cleaned.report)
}

/// Read every source file up front. A file that cannot be read is handed to
/// the pipeline as unreadable, so only the primary source can end the run.
fn collect_sources(args: &BuildArgs<'_>) -> CliResult<SourceSet> {
    let mut sources = SourceSet::new(source_input(args.primary));

    for path in args.groups {
        sources = sources.with_group(source_input(path));
    }
    for value in args.collections {
        let (tag, path) = parse_tagged(value)?;
        sources = sources.with_collection(CollectionSource::tagged(tag, source_input(&path)));
    }
    for path in args.collection_tables {
        sources = sources.with_collection(CollectionSource::Table(source_input(path)));
    }
    for path in args.hierarchies {
        sources = sources.with_hierarchy(source_input(path));
    }
    Ok(sources)
}

fn source_input(path: &Path) -> SourceInput {
    let name = path.display().to_string();
    match fs::read(path) {
        Ok(bytes) => SourceInput::new(name, bytes),
        Err(e) => SourceInput::unreadable(name, e),
    }
}

/// Split `<tag>=<csv>`.
fn parse_tagged(value: &str) -> CliResult<(&str, PathBuf)> {
    match value.split_once('=') {
        Some((tag, path)) if !tag.trim().is_empty() && !path.is_empty() => {
            Ok((tag.trim(), PathBuf::from(path)))
        }
        _ => Err(CliError::Usage(format!(
            "invalid --collection '{value}': expected <tag>=<csv>"
        ))),
    }
}
