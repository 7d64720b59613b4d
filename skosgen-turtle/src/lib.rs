//! Turtle reading and writing for skosgen.
//!
//! The serializer and the cleaner both go through this crate so that a
//! freshly generated document and a cleaned one share one canonical layout.
//!
//! # Example
//!
//! ```
//! use skosgen_turtle::{parse, write_document};
//!
//! let text = r#"
//!     @prefix skos: <http://www.w3.org/2004/02/skos/core#> .
//!     <http://example.org/A1> a skos:Concept ; skos:prefLabel "Kochen"@de .
//! "#;
//!
//! let parsed = parse(text).unwrap();
//! assert_eq!(parsed.document.triple_count(), 2);
//!
//! let canonical = write_document(&parsed.document);
//! assert!(canonical.contains("\n\n<http://example.org/A1> a skos:Concept ;\n"));
//! ```

pub mod error;
pub mod lex;
pub mod model;
pub mod parser;
pub mod writer;

pub use error::{Result, TurtleError};
pub use lex::LineIndex;
pub use model::{
    Block, Directive, DirectiveKind, Document, Irregularity, IrregularityKind, Item, Literal,
    ParsedDocument, Statement, Term,
};
pub use parser::{parse, parse_document};
pub use writer::{
    directive_lines, escape_iri, escape_string, write_directive, write_document, TurtleWriter,
};
