//! Tabular source input for skosgen.
//!
//! Two steps turn raw bytes into records:
//!
//! 1. [`decode`] tries an ordered list of [`EncodingCandidate`]s and returns the
//!    first clean decoding.
//! 2. [`read_rows`] checks the header against a required-column contract and
//!    iterates the data rows lazily.
//!
//! ```
//! use skosgen_tabular::{decode, read_rows, resolve_candidates};
//!
//! let candidates = resolve_candidates(&["utf-8-sig", "utf-8"]).unwrap();
//! let decoded = decode("skills.csv", b"id,label\nA1,Kochen\n", &candidates).unwrap();
//! let mut rows = read_rows("skills.csv", &decoded.text, b',', &["id", "label"]).unwrap();
//! let row = rows.next().unwrap().unwrap();
//! assert_eq!(row.get("label"), Some("Kochen"));
//! ```

pub mod encoding;
pub mod error;
pub mod reader;

pub use encoding::{decode, resolve_candidates, DecodedSource, EncodingCandidate};
pub use error::{Result, TabularError};
pub use reader::{read_rows, Row, Rows};
