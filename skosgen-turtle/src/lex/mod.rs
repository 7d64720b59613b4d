//! Turtle lexer (winnow).

pub mod chars;
pub mod lexer;
pub mod token;

pub use lexer::{tokenize, LineIndex, Lexer};
pub use token::{Token, TokenKind};
