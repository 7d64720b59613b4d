//! Error types for Turtle reading

/// Error type for Turtle lexing and parsing.
///
/// Positions are byte offsets into the input; lines are 1-based.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// Invalid token
    #[error("lexer error at line {line}: {message}")]
    Lexer {
        position: usize,
        line: usize,
        message: String,
    },

    /// Unexpected token or unsupported structure
    #[error("parse error at line {line}: {message}")]
    Parse {
        position: usize,
        line: usize,
        message: String,
    },

    /// Prefixed name whose prefix was never declared
    #[error("line {line}: undefined prefix '{prefix}:'")]
    UndefinedPrefix { prefix: String, line: usize },

    /// Relative IRI that cannot be resolved
    #[error("IRI resolution error: {0}")]
    IriResolution(String),
}

/// Result type for Turtle operations
pub type Result<T> = std::result::Result<T, TurtleError>;

impl TurtleError {
    pub fn parse(position: usize, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            line,
            message: message.into(),
        }
    }

    /// 1-based line of the error, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            TurtleError::Lexer { line, .. }
            | TurtleError::Parse { line, .. }
            | TurtleError::UndefinedPrefix { line, .. } => Some(*line),
            TurtleError::IriResolution(_) => None,
        }
    }
}
