use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skosgen",
    about = "Build SKOS concept schemes from CSV classification tables",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a skosgen.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a concept scheme from CSV sources
    Build {
        /// Primary concept table
        #[arg(long)]
        primary: PathBuf,

        /// Concept-group table (skill groups, ISCO groups); its rows become concepts
        #[arg(long = "group", value_name = "CSV")]
        groups: Vec<PathBuf>,

        /// Collection membership table for one tag, as <tag>=<csv>
        #[arg(long = "collection", value_name = "TAG=CSV")]
        collections: Vec<String>,

        /// Collection table with a tag column
        #[arg(long = "collection-table", value_name = "CSV")]
        collection_tables: Vec<PathBuf>,

        /// Hierarchy table of (child, parent) rows
        #[arg(long = "hierarchy", value_name = "CSV")]
        hierarchies: Vec<PathBuf>,

        /// Where to write the generated Turtle
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Also write the cleaned Turtle here
        #[arg(long)]
        cleaned: Option<PathBuf>,

        #[command(flatten)]
        changelog: ChangelogArgs,

        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Creation date of the scheme (defaults to the config, then today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        created: Option<NaiveDate>,
    },

    /// Normalize an existing Turtle file and log every change
    Clean {
        /// Turtle file to clean
        input: PathBuf,

        /// Where to write the cleaned Turtle
        #[arg(long, short = 'o')]
        output: PathBuf,

        #[command(flatten)]
        changelog: ChangelogArgs,

        /// Canonical base URI (defaults to the configured base_uri)
        #[arg(long)]
        base_uri: Option<String>,
    },

    /// Write a default skosgen.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Target path
        #[arg(long, default_value = "skosgen.toml")]
        path: PathBuf,
    },
}

/// Flags that override values from the config file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Base URI of generated concept IRIs
    #[arg(long)]
    pub base_uri: Option<String>,

    /// Language tag for all text values
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChangelogArgs {
    /// Write the cleaner's change log to this file
    #[arg(long)]
    pub changelog: Option<PathBuf>,

    /// Change log format
    #[arg(long, value_enum, default_value_t = ChangelogFormat::Text)]
    pub changelog_format: ChangelogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangelogFormat {
    Text,
    Json,
}
