//! Canonical Turtle writer.
//!
//! The layout is fixed so that equal documents always render to equal bytes:
//!
//! ```text
//! @base <http://example.org/> .
//! @prefix skos: <http://www.w3.org/2004/02/skos/core#> .
//!
//! <http://example.org/A1> a skos:Concept ;
//!     skos:prefLabel "Kochen"@de .
//!
//! <http://example.org/A2> a skos:Concept ;
//!     skos:prefLabel "Backen"@de .
//! ```
//!
//! Directives come first (base, then prefixes by name), then one block per
//! subject separated by a blank line. Predicates, `rdf:type` objects and
//! datatypes are compacted when a declared prefix covers them with a plain
//! local name; every other IRI is written in full.

use std::collections::BTreeMap;

use skosgen_vocab::rdf;

use crate::lex::chars::{is_iri_char, is_plain_local};
use crate::model::{Block, DirectiveKind, Document, Literal, Term};

/// Renders terms and blocks against one prefix table.
pub struct TurtleWriter<'a> {
    prefixes: &'a BTreeMap<String, String>,
}

impl<'a> TurtleWriter<'a> {
    pub fn new(prefixes: &'a BTreeMap<String, String>) -> Self {
        Self { prefixes }
    }

    /// `prefix:local` for the longest declared namespace covering `iri`.
    fn compact(&self, iri: &str) -> Option<String> {
        let mut best: Option<(&str, &str)> = None;
        for (name, namespace) in self.prefixes {
            let Some(local) = iri.strip_prefix(namespace.as_str()) else {
                continue;
            };
            if !is_plain_local(local) {
                continue;
            }
            if best.map_or(true, |(_, ns)| namespace.len() > ns.len()) {
                best = Some((name, namespace));
            }
        }
        best.map(|(name, namespace)| format!("{name}:{}", &iri[namespace.len()..]))
    }

    fn compact_or_full(&self, iri: &str) -> String {
        self.compact(iri).unwrap_or_else(|| full_iri(iri))
    }

    pub fn predicate(&self, iri: &str) -> String {
        if iri == rdf::TYPE {
            "a".to_string()
        } else {
            self.compact_or_full(iri)
        }
    }

    pub fn object(&self, predicate: &str, object: &Term) -> String {
        match object {
            Term::Iri(iri) if predicate == rdf::TYPE => self.compact_or_full(iri),
            other => self.term(other),
        }
    }

    pub fn term(&self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => full_iri(iri),
            Term::BlankNode(label) => format!("_:{label}"),
            Term::Literal(lit) => self.literal(lit),
        }
    }

    pub fn literal(&self, lit: &Literal) -> String {
        let mut out = format!("\"{}\"", escape_string(&lit.value));
        if let Some(lang) = &lit.language {
            out.push('@');
            out.push_str(lang);
        } else if let Some(datatype) = &lit.datatype {
            out.push_str("^^");
            out.push_str(&self.compact_or_full(datatype));
        }
        out
    }

    /// One block, without a trailing newline. Empty blocks render as `""`.
    pub fn block(&self, block: &Block) -> String {
        if block.statements.is_empty() {
            return String::new();
        }
        let mut out = self.term(&block.subject);
        for (i, statement) in block.statements.iter().enumerate() {
            out.push_str(if i == 0 { " " } else { " ;\n    " });
            out.push_str(&self.predicate(&statement.predicate));
            out.push(' ');
            out.push_str(&self.object(&statement.predicate, &statement.object));
        }
        out.push_str(" .");
        out
    }
}

/// Canonical form of one directive.
pub fn write_directive(kind: &DirectiveKind) -> String {
    match kind {
        DirectiveKind::Base { iri } => format!("@base {} .", full_iri(iri)),
        DirectiveKind::Prefix { name, namespace } => {
            format!("@prefix {name}: {} .", full_iri(namespace))
        }
    }
}

/// Directive lines of `doc` in canonical order.
pub fn directive_lines(doc: &Document) -> Vec<String> {
    let base = doc
        .base
        .iter()
        .map(|iri| write_directive(&DirectiveKind::Base { iri: iri.clone() }));
    let prefixes = doc.prefixes.iter().map(|(name, namespace)| {
        write_directive(&DirectiveKind::Prefix {
            name: name.clone(),
            namespace: namespace.clone(),
        })
    });
    base.chain(prefixes).collect()
}

/// Render a whole document. Blocks without statements are skipped.
pub fn write_document(doc: &Document) -> String {
    let writer = TurtleWriter::new(&doc.prefixes);
    let mut sections = Vec::with_capacity(2);

    let directives = directive_lines(doc);
    if !directives.is_empty() {
        sections.push(directives.join("\n"));
    }

    let blocks: Vec<String> = doc
        .blocks
        .iter()
        .filter(|block| !block.statements.is_empty())
        .map(|block| writer.block(block))
        .collect();
    if !blocks.is_empty() {
        sections.push(blocks.join("\n\n"));
    }

    if sections.is_empty() {
        return String::new();
    }
    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

fn full_iri(iri: &str) -> String {
    format!("<{}>", escape_iri(iri))
}

/// Escape a string for use inside `"..."`.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Escape characters not allowed inside `<...>` as `\uXXXX`.
pub fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for ch in iri.chars() {
        if is_iri_char(ch) {
            out.push(ch);
        } else {
            out.push_str(&format!("\\u{:04X}", ch as u32));
        }
    }
    out
}
