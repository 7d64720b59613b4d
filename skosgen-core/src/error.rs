//! Error types for graph building, serialization and cleaning.
//!
//! Data-quality conditions (duplicate rows, orphan references, empty labels)
//! are not errors; they are counted in [`crate::BuildStats`].

use skosgen_tabular::TabularError;
use skosgen_turtle::TurtleError;
use thiserror::Error;

/// The configured base URI cannot prefix concept identifiers.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("malformed base URI '{uri}': {reason}")]
    MalformedBaseUri { uri: String, reason: String },
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid delimiter {0:?}: expected one ASCII character other than a quote or line break")]
    InvalidDelimiter(char),

    #[error("encoding_candidates must name at least one encoding")]
    NoEncodings,

    #[error(transparent)]
    Encoding(#[from] TabularError),

    #[error("invalid locale tag '{0}'")]
    InvalidLocale(String),

    #[error("column name for '{0}' must not be empty")]
    EmptyColumn(&'static str),

    #[error("invalid exact_match_base '{uri}': {reason}")]
    InvalidExactMatchBase { uri: String, reason: String },
}

/// Errors from the graph cleaner.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("input is not readable as Turtle: {0}")]
    Parse(#[from] TurtleError),

    #[error("invalid canonical base URI '{0}': expected an absolute http(s) URI")]
    InvalidBase(String),
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("primary source unusable: {0}")]
    PrimarySource(TabularError),

    #[error("cleaning the generated graph failed: {0}")]
    Clean(#[from] CleanError),
}
