//! Source-level formatting fixes.
//!
//! Compares the parsed source text with what the canonical writer would
//! produce for the same items and records every difference. Nothing here
//! changes the triples: the cleaned text is always rendered from the cleaned
//! document, this pass only accounts for how it differs from the input.

use std::collections::HashMap;
use std::ops::Range;

use skosgen_turtle::{
    write_directive, DirectiveKind, Irregularity, IrregularityKind, Item, LineIndex,
    ParsedDocument, TurtleWriter,
};

use super::changelog::{snippet, Change};

/// A change found at a byte offset of the source.
pub(super) struct Finding {
    pub offset: usize,
    pub line: usize,
    pub change: Change,
}

/// Formatting differences of `parsed` relative to canonical layout, in
/// source order.
///
/// `survivors[i]` tells whether block `i` is kept as a block of its own
/// (merged duplicates are accounted for by the merge pass).
pub(super) fn formatting_changes(
    text: &str,
    parsed: &ParsedDocument,
    survivors: &[bool],
) -> Vec<Finding> {
    let mut findings = Vec::new();

    irregularity_changes(text, parsed, &mut findings);
    directive_changes(text, parsed, &mut findings);
    block_changes(text, parsed, survivors, &mut findings);
    whitespace_changes(text, parsed, &mut findings);

    findings.sort_by_key(|f| f.offset);
    findings
}

fn irregularity_changes(text: &str, parsed: &ParsedDocument, out: &mut Vec<Finding>) {
    for irregularity in &parsed.irregularities {
        let change = match irregularity.kind {
            IrregularityKind::Comment => Change::CommentRemoved {
                text: snippet(text[irregularity.span.clone()].trim_end()),
            },
            IrregularityKind::MissingTerminator => Change::TerminatorAdded,
            kind => Change::StrayPunctuationRemoved {
                punctuation: kind.describe().to_string(),
            },
        };
        out.push(Finding {
            offset: irregularity.span.start,
            line: irregularity.line,
            change,
        });
    }
}

/// Source key of a directive: `@base` or the prefix name.
fn directive_key(kind: &DirectiveKind) -> &str {
    match kind {
        DirectiveKind::Base { .. } => "@base",
        DirectiveKind::Prefix { name, .. } => name,
    }
}

fn directive_value(kind: &DirectiveKind) -> &str {
    match kind {
        DirectiveKind::Base { iri } => iri,
        DirectiveKind::Prefix { namespace, .. } => namespace,
    }
}

fn directive_changes(text: &str, parsed: &ParsedDocument, out: &mut Vec<Finding>) {
    let first_block_offset = parsed
        .document
        .blocks
        .iter()
        .filter_map(|b| b.span.as_ref().map(|s| s.start))
        .min();

    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut order: Vec<(u8, &str)> = Vec::new();

    for directive in &parsed.directives {
        let key = directive_key(&directive.kind);
        let value = directive_value(&directive.kind);
        let canonical = write_directive(&directive.kind);
        let at = |change| Finding {
            offset: directive.span.start,
            line: directive.line,
            change,
        };

        if let Some(previous) = seen.insert(key, value) {
            if previous == value {
                out.push(at(Change::DuplicatePrefixRemoved {
                    directive: canonical,
                }));
            } else {
                out.push(at(Change::PrefixRebound {
                    prefix: key.to_string(),
                    from: previous.to_string(),
                    to: value.to_string(),
                }));
            }
            continue;
        }
        order.push(directive.kind.order_key());

        if first_block_offset.is_some_and(|first| directive.span.start > first) {
            out.push(at(Change::DirectiveHoisted {
                directive: canonical.clone(),
            }));
        }

        let source = cleaned_source(text, &directive.span, &parsed.irregularities);
        if source != canonical {
            out.push(at(Change::DirectiveReformatted {
                before: snippet(&source),
                after: canonical,
            }));
        }
    }

    let mut sorted = order.clone();
    sorted.sort();
    if order != sorted {
        let offset = parsed.directives.first().map_or(0, |d| d.span.start);
        let line = parsed.directives.first().map_or(0, |d| d.line);
        let names = |keys: &[(u8, &str)]| -> Vec<String> {
            keys.iter()
                .map(|(rank, name)| if *rank == 0 { "@base".to_string() } else { name.to_string() })
                .collect()
        };
        out.push(Finding {
            offset,
            line,
            change: Change::PrefixReordered {
                before: names(&order),
                after: names(&sorted),
            },
        });
    }
}

fn block_changes(text: &str, parsed: &ParsedDocument, survivors: &[bool], out: &mut Vec<Finding>) {
    let writer = TurtleWriter::new(&parsed.document.prefixes);
    for (i, block) in parsed.document.blocks.iter().enumerate() {
        if !survivors.get(i).copied().unwrap_or(true) {
            continue;
        }
        let Some(span) = &block.span else {
            continue;
        };
        let source = cleaned_source(text, span, &parsed.irregularities);
        let canonical = writer.block(block);
        if source != canonical {
            out.push(Finding {
                offset: span.start,
                line: block.line,
                change: Change::BlockReformatted {
                    subject: block.subject.to_string(),
                    before: snippet(&source),
                    after: snippet(&canonical),
                },
            });
        }
    }
}

/// Gaps between top-level items must be exactly what the writer puts there.
fn whitespace_changes(text: &str, parsed: &ParsedDocument, out: &mut Vec<Finding>) {
    let spans: Vec<(Item, Range<usize>)> = parsed
        .items
        .iter()
        .filter_map(|item| parsed.item_span(*item).map(|span| (*item, span)))
        .collect();

    let lines = LineIndex::new(text);
    let mut gaps: Vec<(Range<usize>, &str)> = Vec::with_capacity(spans.len() + 1);
    let mut cursor = 0;
    let mut previous: Option<Item> = None;
    for (item, span) in &spans {
        let expected = match (previous, item) {
            (None, _) => "",
            (Some(Item::Directive(_)), Item::Directive(_)) => "\n",
            _ => "\n\n",
        };
        gaps.push((cursor..span.start, expected));
        cursor = span.end;
        previous = Some(*item);
    }
    gaps.push((cursor..text.len(), if spans.is_empty() { "" } else { "\n" }));

    for (gap, expected) in gaps {
        let touched = parsed
            .irregularities
            .iter()
            .any(|i| !i.span.is_empty() && i.span.start < gap.end && i.span.end > gap.start);
        if touched {
            continue;
        }
        let found = &text[gap.clone()];
        if found != expected {
            out.push(Finding {
                offset: gap.start,
                line: lines.line(gap.start),
                change: Change::WhitespaceNormalized {
                    before: snippet(found),
                    after: expected.to_string(),
                },
            });
        }
    }
}

/// Source text of `span` with irregular tokens cut out and a missing
/// terminator put back.
fn cleaned_source(text: &str, span: &Range<usize>, irregularities: &[Irregularity]) -> String {
    let mut out = String::with_capacity(span.len() + 2);
    let mut cursor = span.start;
    let mut terminated = false;
    for irregularity in irregularities {
        let s = &irregularity.span;
        if s.start < span.start || s.end > span.end {
            continue;
        }
        if irregularity.kind == IrregularityKind::MissingTerminator {
            terminated |= s.start == span.end;
            continue;
        }
        out.push_str(text[cursor..s.start].trim_end());
        cursor = s.end;
    }
    out.push_str(&text[cursor..span.end]);
    let out = out.trim_end().to_string();
    if terminated {
        format!("{out} .")
    } else {
        out
    }
}
