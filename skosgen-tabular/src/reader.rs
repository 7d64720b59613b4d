//! Delimited-text row reader with a required-column contract.
//!
//! [`read_rows`] validates the header against the contract and returns a lazy,
//! single-pass [`Rows`] iterator. Extra columns are carried along but never
//! required; a data row too short to hold a required field is a schema error,
//! after which the iterator is exhausted.

use std::collections::HashMap;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use tracing::{debug, trace};

use crate::error::{Result, TabularError};

/// One data row with access by column name.
#[derive(Debug, Clone)]
pub struct Row {
    index: usize,
    columns: Arc<HashMap<String, usize>>,
    record: StringRecord,
}

impl Row {
    /// 1-based data row index (the header is row 0).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw field value for `column`, if the header has it and the row reaches it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
    }

    /// Field value for `column`, or `""` when absent.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Owned `column -> value` mapping of every field present in this row.
    pub fn into_map(self) -> HashMap<String, String> {
        self.columns
            .iter()
            .filter_map(|(name, &idx)| {
                self.record
                    .get(idx)
                    .map(|value| (name.clone(), value.to_string()))
            })
            .collect()
    }
}

/// Lazy iterator over the data rows of one source.
///
/// Not restartable: call [`read_rows`] again for another pass.
pub struct Rows<'a> {
    source_name: String,
    columns: Arc<HashMap<String, usize>>,
    required: Vec<(String, usize)>,
    records: StringRecordsIntoIter<&'a [u8]>,
    next_index: usize,
    done: bool,
}

impl<'a> Rows<'a> {
    /// Column names in header order.
    pub fn headers(&self) -> Vec<&str> {
        let mut named: Vec<(&str, usize)> = self
            .columns
            .iter()
            .map(|(name, &idx)| (name.as_str(), idx))
            .collect();
        named.sort_by_key(|(_, idx)| *idx);
        named.into_iter().map(|(name, _)| name).collect()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => {
                self.done = true;
                return Some(Err(TabularError::Csv {
                    source_name: self.source_name.clone(),
                    message: err.to_string(),
                }));
            }
        };

        let index = self.next_index;
        self.next_index += 1;

        if let Some((column, _)) = self
            .required
            .iter()
            .find(|(_, idx)| record.get(*idx).is_none())
        {
            self.done = true;
            return Some(Err(TabularError::Schema {
                source_name: self.source_name.clone(),
                row: index,
                column: column.clone(),
            }));
        }

        trace!(source = %self.source_name, row = index, fields = record.len(), "row");
        Some(Ok(Row {
            index,
            columns: Arc::clone(&self.columns),
            record,
        }))
    }
}

/// Open `text` as a delimited source and check its header.
///
/// Returns [`TabularError::Schema`] with row 0 when the header lacks one of
/// the `required` columns. Header names are trimmed; when a name repeats, the
/// first occurrence wins.
pub fn read_rows<'a, S: AsRef<str>>(
    source_name: &str,
    text: &'a str,
    delimiter: u8,
    required: &[S],
) -> Result<Rows<'a>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader.headers().map_err(|err| TabularError::Csv {
        source_name: source_name.to_string(),
        message: err.to_string(),
    })?;

    let mut columns = HashMap::with_capacity(header.len());
    for (idx, name) in header.iter().enumerate() {
        columns.entry(name.trim().to_string()).or_insert(idx);
    }

    let mut required_idx = Vec::with_capacity(required.len());
    for column in required {
        let column = column.as_ref();
        match columns.get(column) {
            Some(&idx) => required_idx.push((column.to_string(), idx)),
            None => {
                return Err(TabularError::Schema {
                    source_name: source_name.to_string(),
                    row: 0,
                    column: column.to_string(),
                })
            }
        }
    }

    debug!(
        source = source_name,
        columns = columns.len(),
        required = required_idx.len(),
        "header accepted"
    );

    Ok(Rows {
        source_name: source_name.to_string(),
        columns: Arc::new(columns),
        required: required_idx,
        records: reader.into_records(),
        next_index: 1,
        done: false,
    })
}
