//! Turtle lexer built on winnow.
//!
//! Produces the full token stream up front, comments included, and stops at
//! the first invalid token with a line/column pointer into the source.

use std::sync::Arc;

use skosgen_vocab::xsd;
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::{AsChar, Location};
use winnow::token::{any, one_of, take_till, take_while};
use winnow::{LocatingSlice, ModalResult, Parser};

use super::chars::*;
use super::token::{Token, TokenKind};
use crate::error::{Result, TurtleError};

/// Input type for the lexer; tracks byte offsets for spans.
pub type Input<'a> = LocatingSlice<&'a str>;

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Byte offset to line lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// 1-based `(line, column)`; columns count chars.
    pub fn line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let line_start = self.starts[line - 1];
        let col = text
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, col + 1)
    }
}

/// Lexer over one Turtle document.
pub struct Lexer<'a> {
    input: &'a str,
    lines: LineIndex,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            lines: LineIndex::new(input),
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut input = LocatingSlice::new(self.input);

        loop {
            let _: ModalResult<&str> = take_while(0.., is_ws).parse_next(&mut input);

            let start = input.current_token_start();
            if input.is_empty() {
                tokens.push(Token::new(TokenKind::Eof, start, start));
                break;
            }

            match next_token(&mut input) {
                Ok(kind) => {
                    let end = input.current_token_start();
                    tokens.push(Token::new(kind, start, end));
                }
                Err(_) => return Err(self.make_error(start)),
            }
        }

        Ok(tokens)
    }

    fn make_error(&self, position: usize) -> TurtleError {
        let rest = self.input.get(position..).unwrap_or("");
        let bad_char = rest.chars().next().unwrap_or('?');
        let (line, col) = self.lines.line_col(self.input, position);
        let line_content = self.input.lines().nth(line - 1).unwrap_or("");
        let pointer = " ".repeat(col.saturating_sub(1));

        let what = match bad_char {
            '"' | '\'' => "unterminated string literal".to_string(),
            '<' => "invalid or unterminated IRI".to_string(),
            c if !c.is_ascii() => format!("unexpected character U+{:04X}", c as u32),
            c => format!("unexpected character '{c}'"),
        };

        TurtleError::Lexer {
            position,
            line,
            message: format!("{what}, column {col}\n  |\n{line} | {line_content}\n  | {pointer}^"),
        }
    }
}

fn next_token(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((
        parse_comment,
        parse_double_caret,
        parse_iri_ref,
        parse_blank_node,
        parse_at_word,
        parse_default_prefix,
        parse_name_or_keyword,
        parse_string_literal,
        parse_number,
        parse_punctuation,
    ))
    .parse_next(input)
}

fn parse_comment(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    '#'.parse_next(input)?;
    let text: &str = take_till(0.., ['\n', '\r']).parse_next(input)?;
    Ok(TokenKind::Comment(Arc::from(text)))
}

fn parse_double_caret(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "^^".map(|_| TokenKind::DoubleCaret).parse_next(input)
}

// IRIs

fn parse_iri_ref(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    '<'.parse_next(input)?;
    let mut iri = String::new();
    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        iri.push_str(chunk);

        if input.starts_with('>') {
            '>'.parse_next(input)?;
            return Ok(TokenKind::Iri(Arc::from(iri)));
        }
        if input.starts_with("\\u") || input.starts_with("\\U") {
            '\\'.parse_next(input)?;
            iri.push(parse_unicode_escape(input)?);
            continue;
        }
        return backtrack();
    }
}

/// `uXXXX` or `UXXXXXXXX`, after the backslash.
fn parse_unicode_escape(input: &mut Input<'_>) -> ModalResult<char> {
    let width: usize = match one_of(['u', 'U']).parse_next(input)? {
        'u' => 4,
        _ => 8,
    };
    let hex: &str = take_while(width..=width, AsChar::is_hex_digit).parse_next(input)?;
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => Ok(c),
        None => backtrack(),
    }
}

// Names and keywords

fn parse_blank_node(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    "_:".parse_next(input)?;
    match input.chars().next() {
        Some(c) if is_pn_chars_u(c) || c.is_ascii_digit() => {}
        _ => return backtrack(),
    }
    let label = take_dotted(input, is_pn_chars)?;
    Ok(TokenKind::BlankNode(Arc::from(label)))
}

/// `@prefix`, `@base`, or a language tag.
fn parse_at_word(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    '@'.parse_next(input)?;
    let word: &str =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)?;
    Ok(match word {
        "prefix" => TokenKind::KwPrefix,
        "base" => TokenKind::KwBase,
        tag => TokenKind::LangTag(Arc::from(tag)),
    })
}

fn parse_default_prefix(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    ':'.parse_next(input)?;
    let local = opt(parse_pn_local).parse_next(input)?.unwrap_or_default();
    Ok(TokenKind::PrefixedName {
        prefix: Arc::from(""),
        local: Arc::from(local),
    })
}

fn parse_name_or_keyword(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    match input.chars().next() {
        Some(c) if is_pn_chars_base(c) => {}
        _ => return backtrack(),
    }
    let word = take_dotted(input, is_pn_chars)?;

    if input.starts_with(':') {
        ':'.parse_next(input)?;
        let local = opt(parse_pn_local).parse_next(input)?.unwrap_or_default();
        return Ok(TokenKind::PrefixedName {
            prefix: Arc::from(word),
            local: Arc::from(local),
        });
    }

    match word.as_str() {
        "a" => Ok(TokenKind::KwA),
        "true" => Ok(TokenKind::Boolean(true)),
        "false" => Ok(TokenKind::Boolean(false)),
        w if w.eq_ignore_ascii_case("PREFIX") => Ok(TokenKind::KwSparqlPrefix),
        w if w.eq_ignore_ascii_case("BASE") => Ok(TokenKind::KwSparqlBase),
        _ => backtrack(),
    }
}

/// Take a run of `pred` chars that may contain, but not end with, dots.
fn take_dotted(input: &mut Input<'_>, pred: fn(char) -> bool) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., pred).parse_next(input)?;
        out.push_str(chunk);

        let continues = input.starts_with('.')
            && input[1..].chars().next().is_some_and(pred);
        if !continues {
            break;
        }
        '.'.parse_next(input)?;
        out.push('.');
    }
    if out.is_empty() {
        return backtrack();
    }
    Ok(out)
}

/// Local part of a prefixed name, with `%XX` kept and `\` escapes resolved.
fn parse_pn_local(input: &mut Input<'_>) -> ModalResult<String> {
    match input.chars().next() {
        Some(c) if is_pn_local_start(c) || c == '%' || c == '\\' => {}
        _ => return backtrack(),
    }

    let mut local = String::new();
    loop {
        let chunk: &str =
            take_while(0.., |c: char| is_pn_chars(c) || c == ':').parse_next(input)?;
        local.push_str(chunk);

        if input.starts_with('.') {
            let next = input[1..].chars().next();
            if next.is_some_and(|c| is_pn_chars(c) || matches!(c, ':' | '%' | '\\')) {
                '.'.parse_next(input)?;
                local.push('.');
                continue;
            }
            break;
        }
        if input.starts_with('%') {
            '%'.parse_next(input)?;
            let hex: &str = take_while(2..=2, AsChar::is_hex_digit).parse_next(input)?;
            local.push('%');
            local.push_str(hex);
            continue;
        }
        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            let escaped: char = any.parse_next(input)?;
            if !"_~.-!$&'()*+,;=/?#@%".contains(escaped) {
                return backtrack();
            }
            local.push(escaped);
            continue;
        }
        break;
    }

    if local.is_empty() {
        return backtrack();
    }
    Ok(local)
}

// Literals

fn parse_string_literal(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let mut quote = match input.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return backtrack(),
    };
    let mut long_delim = if quote == '"' { "\"\"\"" } else { "'''" };

    let value = if input.starts_with(long_delim) {
        long_delim.parse_next(input)?;
        let body = string_body(input, quote, true)?;
        long_delim.parse_next(input)?;
        body
    } else {
        quote.parse_next(input)?;
        let body = string_body(input, quote, false)?;
        quote.parse_next(input)?;
        body
    };
    Ok(TokenKind::String(Arc::from(value)))
}

/// String content up to (not including) the closing delimiter.
fn string_body(input: &mut Input<'_>, quote: char, long: bool) -> ModalResult<String> {
    let mut out = String::new();
    loop {
        let chunk: &str = take_while(0.., |c: char| {
            c != quote && c != '\\' && (long || (c != '\n' && c != '\r'))
        })
        .parse_next(input)?;
        out.push_str(chunk);

        match input.chars().next() {
            Some('\\') => {
                '\\'.parse_next(input)?;
                out.push(parse_escape_char(input)?);
            }
            Some(c) if c == quote && !long => return Ok(out),
            Some(c) if c == quote => {
                let run = input.chars().take_while(|&c| c == quote).count();
                if run >= 3 {
                    // quotes right before the closing delimiter belong to the content
                    for _ in 0..run - 3 {
                        any.parse_next(input)?;
                        out.push(quote);
                    }
                    return Ok(out);
                }
                for _ in 0..run {
                    any.parse_next(input)?;
                    out.push(quote);
                }
            }
            // end of input or a line break inside a short string
            _ => return backtrack(),
        }
    }
}

fn parse_escape_char(input: &mut Input<'_>) -> ModalResult<char> {
    if input.starts_with('u') || input.starts_with('U') {
        return parse_unicode_escape(input);
    }
    match any.parse_next(input)? {
        't' => Ok('\t'),
        'b' => Ok('\x08'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        'f' => Ok('\x0C'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        '\\' => Ok('\\'),
        _ => backtrack(),
    }
}

/// Integer, decimal or double; a `.` needs a digit after it to count.
fn parse_number(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    let lexeme: &str = (
        opt(one_of(['+', '-'])),
        alt(((digit1, opt(('.', digit1))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)?;

    let datatype = if lexeme.contains(['e', 'E']) {
        xsd::DOUBLE
    } else if lexeme.contains('.') {
        xsd::DECIMAL
    } else {
        xsd::INTEGER
    };
    Ok(TokenKind::Number {
        lexeme: Arc::from(lexeme),
        datatype,
    })
}

fn parse_punctuation(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    any.verify_map(|c| match c {
        '.' => Some(TokenKind::Dot),
        ',' => Some(TokenKind::Comma),
        ';' => Some(TokenKind::Semicolon),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        _ => None,
    })
    .parse_next(input)
}

/// Tokenize a Turtle document.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}
