//! Turtle tokens.

use std::sync::Arc;

/// A token with its byte span in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Token kinds.
///
/// Comments are tokens too: the cleaner needs to know where they were.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `<...>` with escapes resolved
    Iri(Arc<str>),
    /// `prefix:local`; `local` may be empty
    PrefixedName { prefix: Arc<str>, local: Arc<str> },
    /// `_:label`
    BlankNode(Arc<str>),

    /// String literal content, escapes resolved
    String(Arc<str>),
    /// Language tag without the `@`
    LangTag(Arc<str>),
    /// Numeric literal: lexical form and its XSD datatype IRI
    Number {
        lexeme: Arc<str>,
        datatype: &'static str,
    },
    /// `true` / `false`
    Boolean(bool),

    KwPrefix,
    KwBase,
    KwSparqlPrefix,
    KwSparqlBase,
    /// `a`
    KwA,

    Dot,
    Comma,
    Semicolon,
    DoubleCaret,
    LBracket,
    RBracket,
    LParen,
    RParen,

    /// `# ...` up to the end of the line, without the `#`
    Comment(Arc<str>),

    Eof,
}

impl TokenKind {
    /// Whether this token can begin a subject or a directive.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Iri(_)
                | TokenKind::PrefixedName { .. }
                | TokenKind::BlankNode(_)
                | TokenKind::KwPrefix
                | TokenKind::KwBase
                | TokenKind::KwSparqlPrefix
                | TokenKind::KwSparqlBase
                | TokenKind::Eof
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Iri(s) => write!(f, "<{s}>"),
            TokenKind::PrefixedName { prefix, local } => write!(f, "{prefix}:{local}"),
            TokenKind::BlankNode(s) => write!(f, "_:{s}"),
            TokenKind::String(s) => write!(f, "\"{s}\""),
            TokenKind::LangTag(s) => write!(f, "@{s}"),
            TokenKind::Number { lexeme, .. } => write!(f, "{lexeme}"),
            TokenKind::Boolean(b) => write!(f, "{b}"),
            TokenKind::KwPrefix => write!(f, "@prefix"),
            TokenKind::KwBase => write!(f, "@base"),
            TokenKind::KwSparqlPrefix => write!(f, "PREFIX"),
            TokenKind::KwSparqlBase => write!(f, "BASE"),
            TokenKind::KwA => write!(f, "a"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::DoubleCaret => write!(f, "'^^'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
