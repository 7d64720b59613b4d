//! Concept graph generation for skosgen.
//!
//! Tabular sources go in, a SKOS concept scheme in Turtle comes out:
//!
//! - [`ConceptGraphBuilder`] merges primary, group, collection and hierarchy records
//!   into one [`ConceptScheme`] and counts every rejected record in
//!   [`BuildStats`]
//! - [`Serializer`] renders the scheme deterministically
//! - [`Cleaner`] normalizes Turtle text and logs each change
//! - [`Pipeline`] runs all of the above over raw source bytes
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use skosgen_core::{GeneratorConfig, Pipeline, SourceInput, SourceSet};
//!
//! let csv = "conceptUri,preferredLabel,altLabels,description\nA1,Kochen,,\n";
//! let sources = SourceSet::new(SourceInput::new("skills.csv", csv));
//!
//! let mut pipeline = Pipeline::new(GeneratorConfig::default()).unwrap();
//! let out = pipeline.run(&sources, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).unwrap();
//!
//! assert_eq!(out.scheme.len(), 1);
//! assert!(out.cleaned.text.contains("skos:prefLabel \"Kochen\"@de"));
//! ```

pub mod builder;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod serializer;
pub mod stats;

pub use builder::{normalize_identifier, split_labels, BuildOptions, ConceptGraphBuilder};
pub use cleaner::{Change, ChangeEntry, CleanOutput, CleanReport, Cleaner, UriCanonicalizer};
pub use config::{
    CollectionColumns, ColumnContracts, GeneratorConfig, GroupColumns, HierarchyColumns, PrimaryColumns,
    RowFilter, SchemeConfig, DEFAULT_BASE_URI, DEFAULT_ENCODINGS, DEFAULT_LOCALE,
};
pub use error::{CleanError, ConfigError, PipelineError, SerializationError};
pub use model::{CollectionRecord, Concept, ConceptScheme, PrimaryRecord, Relation};
pub use pipeline::{CollectionSource, Pipeline, RunOutput, RunReport, SourceInput, SourceSet};
pub use serializer::Serializer;
pub use stats::{BuildStats, SourceReport, SourceRole};
