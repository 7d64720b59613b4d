//! Change log of a cleaner run.
//!
//! Every alteration is one [`ChangeEntry`]. Entries that remove triples or
//! blocks carry a negative delta, so the counts before and after a run can be
//! checked against the log with [`CleanReport::reconciles`].

use std::fmt;

use serde::Serialize;

/// Longest before/after snippet kept in an entry, in characters.
const SNIPPET_CHARS: usize = 200;

/// One alteration made by the cleaner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    DuplicateStatementRemoved {
        subject: String,
        predicate: String,
        object: String,
        first_seen_line: usize,
    },
    BlockMerged {
        subject: String,
        into_line: usize,
    },
    EmptyBlockRemoved {
        subject: String,
    },
    StrayPunctuationRemoved {
        punctuation: String,
    },
    CommentRemoved {
        text: String,
    },
    TerminatorAdded,
    DuplicatePrefixRemoved {
        directive: String,
    },
    PrefixRebound {
        prefix: String,
        from: String,
        to: String,
    },
    DirectiveHoisted {
        directive: String,
    },
    DirectiveReformatted {
        before: String,
        after: String,
    },
    PrefixReordered {
        before: Vec<String>,
        after: Vec<String>,
    },
    BlockReformatted {
        subject: String,
        before: String,
        after: String,
    },
    WhitespaceNormalized {
        before: String,
        after: String,
    },
    UriRewritten {
        from: String,
        to: String,
    },
}

impl Change {
    /// Triples added (positive) or removed (negative) by this change.
    pub fn triple_delta(&self) -> i64 {
        match self {
            Change::DuplicateStatementRemoved { .. } => -1,
            _ => 0,
        }
    }

    /// Blocks added (positive) or removed (negative) by this change.
    pub fn block_delta(&self) -> i64 {
        match self {
            Change::BlockMerged { .. } | Change::EmptyBlockRemoved { .. } => -1,
            _ => 0,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::DuplicateStatementRemoved {
                subject,
                predicate,
                object,
                first_seen_line,
            } => write!(
                f,
                "duplicate statement removed: {subject} <{predicate}> {object} (first seen line {first_seen_line})"
            ),
            Change::BlockMerged { subject, into_line } => {
                write!(f, "block {subject} merged into block at line {into_line}")
            }
            Change::EmptyBlockRemoved { subject } => write!(f, "empty block {subject} removed"),
            Change::StrayPunctuationRemoved { punctuation } => write!(f, "{punctuation} removed"),
            Change::CommentRemoved { text } => write!(f, "comment removed: {text}"),
            Change::TerminatorAdded => write!(f, "missing '.' added"),
            Change::DuplicatePrefixRemoved { directive } => {
                write!(f, "duplicate directive removed: {directive}")
            }
            Change::PrefixRebound { prefix, from, to } => {
                write!(f, "prefix '{prefix}' rebound from <{from}> to <{to}>, last binding kept")
            }
            Change::DirectiveHoisted { directive } => {
                write!(f, "directive moved to document head: {directive}")
            }
            Change::DirectiveReformatted { before, after } => {
                write!(f, "directive reformatted: {before:?} -> {after:?}")
            }
            Change::PrefixReordered { before, after } => write!(
                f,
                "directives reordered: [{}] -> [{}]",
                before.join(", "),
                after.join(", ")
            ),
            Change::BlockReformatted {
                subject,
                before,
                after,
            } => write!(f, "block {subject} reformatted: {before:?} -> {after:?}"),
            Change::WhitespaceNormalized { before, after } => {
                write!(f, "whitespace normalized: {before:?} -> {after:?}")
            }
            Change::UriRewritten { from, to } => write!(f, "URI rewritten: <{from}> -> <{to}>"),
        }
    }
}

/// A numbered change with the source line it applies to (0 when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub seq: usize,
    pub line: usize,
    #[serde(flatten)]
    pub change: Change,
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "#{} line {}: {}", self.seq, self.line, self.change)
        } else {
            write!(f, "#{}: {}", self.seq, self.change)
        }
    }
}

/// Counts before and after a run together with every logged change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub triples_before: usize,
    pub triples_after: usize,
    pub blocks_before: usize,
    pub blocks_after: usize,
    pub entries: Vec<ChangeEntry>,
}

impl CleanReport {
    pub fn new(triples_before: usize, blocks_before: usize) -> Self {
        Self {
            triples_before,
            blocks_before,
            ..Self::default()
        }
    }

    /// Append a change; sequence numbers start at 1.
    pub fn record(&mut self, line: usize, change: Change) {
        self.entries.push(ChangeEntry {
            seq: self.entries.len() + 1,
            line,
            change,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn triple_delta(&self) -> i64 {
        self.entries.iter().map(|e| e.change.triple_delta()).sum()
    }

    pub fn block_delta(&self) -> i64 {
        self.entries.iter().map(|e| e.change.block_delta()).sum()
    }

    /// Whether the before/after counts differ by exactly what the log says.
    pub fn reconciles(&self) -> bool {
        self.triples_before as i64 + self.triple_delta() == self.triples_after as i64
            && self.blocks_before as i64 + self.block_delta() == self.blocks_after as i64
    }

    /// One line per entry followed by a summary.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out.push_str(&format!(
            "{} change(s); triples {} -> {} ({:+} logged); blocks {} -> {} ({:+} logged); {}\n",
            self.entries.len(),
            self.triples_before,
            self.triples_after,
            self.triple_delta(),
            self.blocks_before,
            self.blocks_after,
            self.block_delta(),
            if self.reconciles() {
                "reconciled"
            } else {
                "NOT reconciled"
            }
        ));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `text` cut to a bounded number of characters.
pub(crate) fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(SNIPPET_CHARS).collect();
    cut.push_str("...");
    cut
}
