//! Block-level Turtle document model.
//!
//! A [`Document`] is what the writer renders: a base, a prefix table and a
//! list of subject blocks, each holding one [`Statement`] per triple.
//! [`ParsedDocument`] adds what only a parse of real text can provide: the
//! source position of every directive and block, and the irregularities the
//! tolerant parser stepped over.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Plain string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            language: None,
            datatype: None,
        })
    }

    pub fn lang_string(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            language: Some(language.into()),
            datatype: None,
        })
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            language: None,
            datatype: Some(datatype.into()),
        })
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// A literal value. `datatype` is `None` for plain and language-tagged strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub value: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")?;
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")?;
        }
        Ok(())
    }
}

/// One predicate/object pair of a block. `line` is 0 when not parsed from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub predicate: String,
    pub object: Term,
    pub line: usize,
}

impl Statement {
    pub fn new(predicate: impl Into<String>, object: Term) -> Self {
        Self {
            predicate: predicate.into(),
            object,
            line: 0,
        }
    }
}

/// All statements written under one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub subject: Term,
    pub statements: Vec<Statement>,
    /// 1-based line of the subject, 0 when built in memory
    pub line: usize,
    /// Byte range in the source text, from subject to terminating `.`
    pub span: Option<Range<usize>>,
}

impl Block {
    pub fn new(subject: Term) -> Self {
        Self {
            subject,
            statements: Vec::new(),
            line: 0,
            span: None,
        }
    }

    pub fn push(&mut self, predicate: impl Into<String>, object: Term) {
        self.statements.push(Statement::new(predicate, object));
    }
}

/// A Turtle document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub base: Option<String>,
    /// prefix name -> namespace
    pub prefixes: BTreeMap<String, String>,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Number of triples (one per statement).
    pub fn triple_count(&self) -> usize {
        self.blocks.iter().map(|b| b.statements.len()).sum()
    }
}

/// `@base`/`@prefix` directive as found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// SPARQL-style `PREFIX`/`BASE` without a terminating dot
    pub sparql_style: bool,
    pub line: usize,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    Base { iri: String },
    Prefix { name: String, namespace: String },
}

impl DirectiveKind {
    /// Sort key of the canonical directive order: base first, then prefixes by name.
    pub fn order_key(&self) -> (u8, &str) {
        match self {
            DirectiveKind::Base { .. } => (0, ""),
            DirectiveKind::Prefix { name, .. } => (1, name),
        }
    }
}

/// Something the tolerant parser accepted that canonical output never contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Irregularity {
    pub kind: IrregularityKind,
    pub line: usize,
    /// Byte range of the offending text; empty for a missing terminator
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrregularityKind {
    /// `.` where no statement ends
    StrayDot,
    /// `;` not followed by a predicate
    RedundantSemicolon,
    /// `,` not followed by an object
    TrailingComma,
    /// block or directive not closed by `.`
    MissingTerminator,
    Comment,
}

impl IrregularityKind {
    pub fn describe(self) -> &'static str {
        match self {
            IrregularityKind::StrayDot => "stray '.'",
            IrregularityKind::RedundantSemicolon => "redundant ';'",
            IrregularityKind::TrailingComma => "trailing ','",
            IrregularityKind::MissingTerminator => "missing '.'",
            IrregularityKind::Comment => "comment",
        }
    }
}

/// Top-level item in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    /// index into [`ParsedDocument::directives`]
    Directive(usize),
    /// index into [`Document::blocks`]
    Block(usize),
}

/// A document together with what its source text looked like.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub document: Document,
    pub directives: Vec<Directive>,
    pub irregularities: Vec<Irregularity>,
    pub items: Vec<Item>,
}

impl ParsedDocument {
    /// Byte span of a top-level item.
    pub fn item_span(&self, item: Item) -> Option<Range<usize>> {
        match item {
            Item::Directive(i) => self.directives.get(i).map(|d| d.span.clone()),
            Item::Block(i) => self.document.blocks.get(i).and_then(|b| b.span.clone()),
        }
    }
}
