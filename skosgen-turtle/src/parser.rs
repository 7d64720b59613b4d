//! Tolerant Turtle parser.
//!
//! Reads the subset of Turtle that skosgen writes (directives, subject
//! blocks with predicate and object lists, IRIs, prefixed names, labelled
//! blank nodes and literals) and records where every top-level item sits in
//! the source. Formatting slips that do not change the triples (stray dots,
//! doubled or trailing `;`, trailing `,`, a missing final `.`, comments) are
//! accepted and reported as [`Irregularity`] entries instead of failing.
//!
//! Anonymous blank-node property lists (`[ ... ]`) and collections (`( ... )`)
//! are rejected.

use std::collections::HashMap;
use std::ops::Range;

use skosgen_vocab::{rdf, xsd};
use tracing::debug;
use url::Url;

use crate::error::{Result, TurtleError};
use crate::lex::{tokenize, LineIndex, Token, TokenKind};
use crate::model::{
    Block, Directive, DirectiveKind, Document, Irregularity, IrregularityKind, Item, Literal,
    ParsedDocument, Statement, Term,
};

/// Parser state for one document.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    lines: LineIndex,
    /// Active prefix bindings; a later declaration replaces an earlier one
    prefixes: HashMap<String, String>,
    base: Option<String>,
    out: ParsedDocument,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self> {
        let lines = LineIndex::new(input);
        let mut tokens = Vec::new();
        let mut irregularities = Vec::new();

        for token in tokenize(input)? {
            if let TokenKind::Comment(_) = token.kind {
                irregularities.push(Irregularity {
                    kind: IrregularityKind::Comment,
                    line: lines.line(token.start),
                    span: token.start..token.end,
                });
            } else {
                tokens.push(token);
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            lines,
            prefixes: HashMap::new(),
            base: None,
            out: ParsedDocument {
                irregularities,
                ..ParsedDocument::default()
            },
        })
    }

    /// Parse the whole document.
    pub fn parse(mut self) -> Result<ParsedDocument> {
        while !self.current().is_eof() {
            match self.current().kind {
                TokenKind::KwPrefix | TokenKind::KwSparqlPrefix => self.parse_prefix_directive()?,
                TokenKind::KwBase | TokenKind::KwSparqlBase => self.parse_base_directive()?,
                TokenKind::Dot => self.stray(IrregularityKind::StrayDot),
                TokenKind::Semicolon => self.stray(IrregularityKind::RedundantSemicolon),
                TokenKind::Comma => self.stray(IrregularityKind::TrailingComma),
                _ => self.parse_block()?,
            }
        }

        self.out
            .irregularities
            .sort_by_key(|irregularity| irregularity.span.start);
        debug!(
            blocks = self.out.document.blocks.len(),
            directives = self.out.directives.len(),
            irregularities = self.out.irregularities.len(),
            "parsed turtle document"
        );
        Ok(self.out)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn line_of(&self, offset: usize) -> usize {
        self.lines.line(offset)
    }

    fn error_here(&self, message: impl Into<String>) -> TurtleError {
        let start = self.current().start;
        TurtleError::parse(start, self.line_of(start), message)
    }

    fn irregular(&mut self, kind: IrregularityKind, span: Range<usize>) {
        let line = self.line_of(span.start);
        self.out.irregularities.push(Irregularity { kind, line, span });
    }

    /// Skip one token that cannot start anything.
    fn stray(&mut self, kind: IrregularityKind) {
        let token = self.bump();
        self.irregular(kind, token.start..token.end);
    }

    /// Consume the `.` closing a statement and return the statement's end offset.
    ///
    /// A missing `.` is accepted when the next token starts a new statement.
    fn terminator(&mut self, last_end: usize) -> Result<usize> {
        if matches!(self.current().kind, TokenKind::Dot) {
            return Ok(self.bump().end);
        }
        if self.current().kind.starts_statement() {
            self.irregular(IrregularityKind::MissingTerminator, last_end..last_end);
            return Ok(last_end);
        }
        Err(self.error_here(format!("expected '.', found {}", self.current().kind)))
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.end)
            .unwrap_or(0)
    }

    // Directives

    fn parse_prefix_directive(&mut self) -> Result<()> {
        let keyword = self.bump();
        let sparql_style = matches!(keyword.kind, TokenKind::KwSparqlPrefix);

        let name = match &self.current().kind {
            TokenKind::PrefixedName { prefix, local } if local.is_empty() => prefix.to_string(),
            other => return Err(self.error_here(format!("expected prefix name, found {other}"))),
        };
        self.bump();

        let namespace = match &self.current().kind {
            TokenKind::Iri(iri) => {
                let iri = iri.clone();
                self.resolve_iri(&iri)?
            }
            other => {
                return Err(self.error_here(format!("expected namespace IRI, found {other}")))
            }
        };
        let iri_end = self.bump().end;

        let end = if sparql_style {
            iri_end
        } else {
            self.terminator(iri_end)?
        };

        self.prefixes.insert(name.clone(), namespace.clone());
        self.out
            .document
            .prefixes
            .insert(name.clone(), namespace.clone());
        self.push_directive(
            DirectiveKind::Prefix { name, namespace },
            sparql_style,
            keyword.start..end,
        );
        Ok(())
    }

    fn parse_base_directive(&mut self) -> Result<()> {
        let keyword = self.bump();
        let sparql_style = matches!(keyword.kind, TokenKind::KwSparqlBase);

        let iri = match &self.current().kind {
            TokenKind::Iri(iri) => {
                let iri = iri.clone();
                self.resolve_iri(&iri)?
            }
            other => return Err(self.error_here(format!("expected base IRI, found {other}"))),
        };
        let iri_end = self.bump().end;

        let end = if sparql_style {
            iri_end
        } else {
            self.terminator(iri_end)?
        };

        self.base = Some(iri.clone());
        self.out.document.base = Some(iri.clone());
        self.push_directive(DirectiveKind::Base { iri }, sparql_style, keyword.start..end);
        Ok(())
    }

    fn push_directive(&mut self, kind: DirectiveKind, sparql_style: bool, span: Range<usize>) {
        let line = self.line_of(span.start);
        self.out.items.push(Item::Directive(self.out.directives.len()));
        self.out.directives.push(Directive {
            kind,
            sparql_style,
            line,
            span,
        });
    }

    // Blocks

    fn parse_block(&mut self) -> Result<()> {
        let start = self.current().start;
        let line = self.line_of(start);
        let subject = self.parse_subject()?;
        let mut statements = Vec::new();

        loop {
            while matches!(self.current().kind, TokenKind::Semicolon) {
                self.stray(IrregularityKind::RedundantSemicolon);
            }
            if !self.at_predicate() {
                break;
            }

            let predicate = self.parse_predicate()?;
            self.parse_object_list(&predicate, &mut statements)?;

            if !matches!(self.current().kind, TokenKind::Semicolon) {
                break;
            }
            let semicolon = self.bump();
            if !self.at_predicate() && !matches!(self.current().kind, TokenKind::Semicolon) {
                self.irregular(
                    IrregularityKind::RedundantSemicolon,
                    semicolon.start..semicolon.end,
                );
                break;
            }
        }

        if statements.is_empty() {
            return Err(self.error_here(format!(
                "expected predicate, found {}",
                self.current().kind
            )));
        }

        let end = self.terminator(self.previous_end())?;

        self.out
            .items
            .push(Item::Block(self.out.document.blocks.len()));
        self.out.document.blocks.push(Block {
            subject,
            statements,
            line,
            span: Some(start..end),
        });
        Ok(())
    }

    fn at_predicate(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } | TokenKind::KwA
        )
    }

    fn parse_object_list(&mut self, predicate: &str, statements: &mut Vec<Statement>) -> Result<()> {
        loop {
            let line = self.line_of(self.current().start);
            let object = self.parse_object()?;
            statements.push(Statement {
                predicate: predicate.to_string(),
                object,
                line,
            });

            if !matches!(self.current().kind, TokenKind::Comma) {
                return Ok(());
            }
            let comma = self.bump();
            if matches!(
                self.current().kind,
                TokenKind::Semicolon | TokenKind::Dot | TokenKind::Eof
            ) {
                self.irregular(IrregularityKind::TrailingComma, comma.start..comma.end);
                return Ok(());
            }
        }
    }

    fn parse_subject(&mut self) -> Result<Term> {
        match self.current().kind.clone() {
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } => Ok(Term::Iri(self.parse_iri()?)),
            TokenKind::BlankNode(label) => {
                self.bump();
                Ok(Term::BlankNode(label.to_string()))
            }
            TokenKind::LBracket | TokenKind::LParen => Err(self.unsupported()),
            other => Err(self.error_here(format!("expected subject, found {other}"))),
        }
    }

    fn parse_predicate(&mut self) -> Result<String> {
        if matches!(self.current().kind, TokenKind::KwA) {
            self.bump();
            return Ok(rdf::TYPE.to_string());
        }
        self.parse_iri()
    }

    fn parse_object(&mut self) -> Result<Term> {
        match self.current().kind.clone() {
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } => Ok(Term::Iri(self.parse_iri()?)),
            TokenKind::BlankNode(label) => {
                self.bump();
                Ok(Term::BlankNode(label.to_string()))
            }
            TokenKind::String(value) => {
                self.bump();
                self.parse_literal_suffix(value.to_string())
            }
            TokenKind::Number { lexeme, datatype } => {
                self.bump();
                Ok(Term::typed(lexeme.to_string(), datatype))
            }
            TokenKind::Boolean(value) => {
                self.bump();
                Ok(Term::typed(value.to_string(), xsd::BOOLEAN))
            }
            TokenKind::LBracket | TokenKind::LParen => Err(self.unsupported()),
            other => Err(self.error_here(format!("expected object, found {other}"))),
        }
    }

    /// Language tag or `^^datatype` after a string.
    fn parse_literal_suffix(&mut self, value: String) -> Result<Term> {
        match self.current().kind.clone() {
            TokenKind::LangTag(lang) => {
                self.bump();
                Ok(Term::Literal(Literal {
                    value,
                    language: Some(lang.to_string()),
                    datatype: None,
                }))
            }
            TokenKind::DoubleCaret => {
                self.bump();
                let datatype = self.parse_iri()?;
                Ok(Term::typed(value, datatype))
            }
            _ => Ok(Term::string(value)),
        }
    }

    /// An `<IRI>` or prefixed name, expanded to a full IRI.
    fn parse_iri(&mut self) -> Result<String> {
        let token = self.current().clone();
        let iri = match &token.kind {
            TokenKind::Iri(iri) => self.resolve_iri(iri)?,
            TokenKind::PrefixedName { prefix, local } => match self.prefixes.get(&**prefix) {
                Some(namespace) => format!("{namespace}{local}"),
                None => {
                    return Err(TurtleError::UndefinedPrefix {
                        prefix: prefix.to_string(),
                        line: self.line_of(token.start),
                    })
                }
            },
            other => return Err(self.error_here(format!("expected IRI, found {other}"))),
        };
        self.bump();
        Ok(iri)
    }

    fn unsupported(&self) -> TurtleError {
        self.error_here("anonymous blank nodes and collections are not supported")
    }

    /// Resolve a possibly relative reference against `@base`.
    fn resolve_iri(&self, reference: &str) -> Result<String> {
        if has_scheme(reference) {
            return Ok(reference.to_string());
        }
        let base = self.base.as_deref().ok_or_else(|| {
            TurtleError::IriResolution(format!("relative IRI <{reference}> without @base"))
        })?;
        Url::parse(base)
            .and_then(|base| base.join(reference))
            .map(String::from)
            .map_err(|err| TurtleError::IriResolution(format!("<{reference}> against <{base}>: {err}")))
    }
}

fn has_scheme(reference: &str) -> bool {
    match reference.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Parse Turtle text, keeping source positions and irregularities.
pub fn parse(input: &str) -> Result<ParsedDocument> {
    Parser::new(input)?.parse()
}

/// Parse Turtle text into a plain [`Document`].
pub fn parse_document(input: &str) -> Result<Document> {
    Ok(parse(input)?.document)
}
