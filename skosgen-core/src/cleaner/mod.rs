//! Graph cleaner.
//!
//! Normalizes a Turtle graph and logs every alteration. Passes run in a fixed
//! order, each working on the output of the previous one:
//!
//! 1. duplicate statements are removed, keyed on the canonical form of
//!    subject, predicate and object
//! 2. blocks sharing a canonical subject are merged into the first one, and
//!    blocks left without statements are dropped
//! 3. source formatting (comments, stray punctuation, directive order and
//!    layout, whitespace) is compared with canonical layout; only for text input
//! 4. IRIs spelling the canonical base differently are rewritten
//!
//! The cleaned text is always the canonical rendering of the cleaned
//! document, so cleaning cleaned output logs nothing.

mod changelog;
mod syntax;
mod uri;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use skosgen_turtle::{parse, write_document, Block, DirectiveKind, Document, Literal, ParsedDocument, Term};
use skosgen_vocab::xsd;
use tracing::{debug, info};

pub use changelog::{Change, ChangeEntry, CleanReport};
pub use uri::UriCanonicalizer;

use crate::error::CleanError;

/// Result of one cleaner run.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub document: Document,
    /// Canonical Turtle rendering of `document`
    pub text: String,
    pub report: CleanReport,
}

/// Normalizes graphs against an optional canonical base URI.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    canonicalizer: Option<UriCanonicalizer>,
}

impl Cleaner {
    /// Without a base, IRIs are compared and kept exactly as written.
    pub fn new(canonical_base: Option<&str>) -> Result<Self, CleanError> {
        Ok(Self {
            canonicalizer: canonical_base.map(UriCanonicalizer::new).transpose()?,
        })
    }

    /// Parse `text` and clean it, including source formatting fixes.
    pub fn clean_text(&self, text: &str) -> Result<CleanOutput, CleanError> {
        let parsed = parse(text)?;
        Ok(self.run(parsed.document.clone(), Some((text, &parsed))))
    }

    /// Clean an in-memory document. There is no source text, so only the
    /// duplicate, merge and URI passes apply.
    pub fn clean_document(&self, document: Document) -> CleanOutput {
        self.run(document, None)
    }

    fn run(&self, mut doc: Document, source: Option<(&str, &ParsedDocument)>) -> CleanOutput {
        let mut report = CleanReport::new(doc.triple_count(), doc.blocks.len());

        self.remove_duplicate_statements(&mut doc, &mut report);
        let survivors = self.merge_blocks(&mut doc, &mut report);

        if let Some((text, parsed)) = source {
            for finding in syntax::formatting_changes(text, parsed, &survivors) {
                report.record(finding.line, finding.change);
            }
        }

        if let Some(canonicalizer) = &self.canonicalizer {
            rewrite_uris(canonicalizer, &mut doc, source.map(|(_, p)| p), &mut report);
        }

        report.triples_after = doc.triple_count();
        report.blocks_after = doc.blocks.len();
        let text = write_document(&doc);

        info!(
            changes = report.len(),
            triples_before = report.triples_before,
            triples_after = report.triples_after,
            blocks_before = report.blocks_before,
            blocks_after = report.blocks_after,
            "graph cleaned"
        );
        CleanOutput {
            document: doc,
            text,
            report,
        }
    }

    fn remove_duplicate_statements(&self, doc: &mut Document, report: &mut CleanReport) {
        let mut first_seen: HashMap<(Term, String, Term), usize> = HashMap::new();
        for block in &mut doc.blocks {
            let subject = self.term_key(&block.subject);
            let statements = std::mem::take(&mut block.statements);
            for statement in statements {
                let key = (
                    subject.clone(),
                    self.iri_key(&statement.predicate),
                    self.term_key(&statement.object),
                );
                match first_seen.entry(key) {
                    Entry::Occupied(seen) => report.record(
                        statement.line,
                        Change::DuplicateStatementRemoved {
                            subject: block.subject.to_string(),
                            predicate: statement.predicate.clone(),
                            object: statement.object.to_string(),
                            first_seen_line: *seen.get(),
                        },
                    ),
                    Entry::Vacant(slot) => {
                        slot.insert(statement.line);
                        block.statements.push(statement);
                    }
                }
            }
        }
        debug!(removed = -report.triple_delta(), "duplicate statements removed");
    }

    /// Merge same-subject blocks into their first occurrence and drop empty
    /// blocks. Returns, per input block, whether it survived on its own.
    fn merge_blocks(&self, doc: &mut Document, report: &mut CleanReport) -> Vec<bool> {
        let blocks = std::mem::take(&mut doc.blocks);
        let mut survivors = vec![false; blocks.len()];
        let mut index: HashMap<Term, usize> = HashMap::new();
        let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());

        for (i, block) in blocks.into_iter().enumerate() {
            match index.entry(self.term_key(&block.subject)) {
                Entry::Occupied(at) => {
                    let target = &mut merged[*at.get()];
                    report.record(
                        block.line,
                        Change::BlockMerged {
                            subject: block.subject.to_string(),
                            into_line: target.line,
                        },
                    );
                    target.statements.extend(block.statements);
                }
                Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    survivors[i] = true;
                    merged.push(block);
                }
            }
        }

        merged.retain(|block| {
            if block.statements.is_empty() {
                report.record(
                    block.line,
                    Change::EmptyBlockRemoved {
                        subject: block.subject.to_string(),
                    },
                );
                false
            } else {
                true
            }
        });
        doc.blocks = merged;
        survivors
    }

    fn iri_key(&self, iri: &str) -> String {
        match &self.canonicalizer {
            Some(c) => c.apply(iri),
            None => iri.to_string(),
        }
    }

    /// Comparison form of a term: canonical IRIs, lowercase language tags,
    /// and `xsd:string` literals equal to plain ones.
    fn term_key(&self, term: &Term) -> Term {
        match term {
            Term::Iri(iri) => Term::Iri(self.iri_key(iri)),
            Term::BlankNode(_) => term.clone(),
            Term::Literal(lit) => Term::Literal(Literal {
                value: lit.value.clone(),
                language: lit.language.as_ref().map(|l| l.to_ascii_lowercase()),
                datatype: lit.datatype.clone().filter(|dt| dt != xsd::STRING),
            }),
        }
    }
}

/// Rewrite every non-canonical IRI in place, one log entry per occurrence.
fn rewrite_uris(
    canonicalizer: &UriCanonicalizer,
    doc: &mut Document,
    parsed: Option<&ParsedDocument>,
    report: &mut CleanReport,
) {
    let directive_line = |wanted: &dyn Fn(&DirectiveKind) -> bool| -> usize {
        parsed
            .and_then(|p| p.directives.iter().rev().find(|d| wanted(&d.kind)))
            .map_or(0, |d| d.line)
    };

    if let Some(base) = &mut doc.base {
        if let Some(canonical) = canonicalizer.canonicalize(base) {
            let line = directive_line(&|k| matches!(k, DirectiveKind::Base { .. }));
            report.record(line, rewritten(base, &canonical));
            *base = canonical;
        }
    }

    for (name, namespace) in doc.prefixes.iter_mut() {
        if let Some(canonical) = canonicalizer.canonicalize(namespace) {
            let line = directive_line(&|k| matches!(k, DirectiveKind::Prefix { name: n, .. } if n == name));
            report.record(line, rewritten(namespace, &canonical));
            *namespace = canonical;
        }
    }

    for block in &mut doc.blocks {
        if let Term::Iri(subject) = &mut block.subject {
            if let Some(canonical) = canonicalizer.canonicalize(subject) {
                report.record(block.line, rewritten(subject, &canonical));
                *subject = canonical;
            }
        }
        for statement in &mut block.statements {
            if let Some(canonical) = canonicalizer.canonicalize(&statement.predicate) {
                report.record(statement.line, rewritten(&statement.predicate, &canonical));
                statement.predicate = canonical;
            }
            if let Term::Iri(object) = &mut statement.object {
                if let Some(canonical) = canonicalizer.canonicalize(object) {
                    report.record(statement.line, rewritten(object, &canonical));
                    *object = canonical;
                }
            }
        }
    }
}

fn rewritten(from: &str, to: &str) -> Change {
    Change::UriRewritten {
        from: from.to_string(),
        to: to.to_string(),
    }
}
