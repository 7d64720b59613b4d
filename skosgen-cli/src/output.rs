use crate::cli::ChangelogFormat;
use crate::error::CliResult;
use colored::Colorize;
use skosgen_core::{CleanReport, RunReport};

/// Render a change log in the requested format.
pub fn format_changelog(report: &CleanReport, format: ChangelogFormat) -> CliResult<String> {
    match format {
        ChangelogFormat::Text => Ok(report.render_text()),
        ChangelogFormat::Json => {
            let mut json = report.to_json()?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Per-source outcomes and build counters.
pub fn print_run_summary(report: &RunReport) {
    println!("{}", "Sources".bold());
    for source in &report.sources {
        match &source.error {
            None => println!(
                "  {} {} ({}, {} rows, {})",
                "ok".green().bold(),
                source.name,
                source.role,
                source.rows,
                source.encoding.as_deref().unwrap_or("-"),
            ),
            Some(error) => println!(
                "  {} {} ({}): {}",
                "dropped".red().bold(),
                source.name,
                source.role,
                error
            ),
        }
    }

    let stats = &report.stats;
    println!("{}", "Build".bold());
    for (label, value) in stats.entries() {
        if value == 0 && !matches!(label, "concepts" | "primary rows") {
            continue;
        }
        println!("  {:>8}  {}", format_with_commas(value), label);
    }
    let issues = stats.data_quality_issues();
    if issues == 0 {
        println!("  {}", "no data-quality issues".green());
    } else {
        println!(
            "  {}",
            format!("{} data-quality issue(s)", format_with_commas(issues)).yellow()
        );
    }
    if stats.concepts == 0 {
        println!("  {}", "the scheme has no concepts".yellow());
    }
}

/// One-line summary of a cleaner run.
pub fn print_clean_summary(report: &CleanReport) {
    let status = if report.reconciles() {
        "reconciled".green()
    } else {
        "NOT reconciled".red().bold()
    };
    println!(
        "{} {} change(s); triples {} -> {}; blocks {} -> {}; {}",
        "Clean".bold(),
        report.len(),
        format_with_commas(report.triples_before),
        format_with_commas(report.triples_after),
        format_with_commas(report.blocks_before),
        format_with_commas(report.blocks_after),
        status
    );
}

fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
