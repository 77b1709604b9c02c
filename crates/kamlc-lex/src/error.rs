//! Lexical error types.

use thiserror::Error;

/// A fatal lexical error. Every variant carries the 1-based line/column
/// of the offending construct; for unterminated regions this is where
/// the region was opened.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at {line}:{column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("unterminated raw block starting at {line}:{column}")]
    UnterminatedRawBlock { line: u32, column: u32 },

    #[error("unterminated block comment starting at {line}:{column}")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("unterminated interpolation starting at {line}:{column}")]
    UnterminatedInterpolation { line: u32, column: u32 },

    #[error("invalid escape sequence at {line}:{column}")]
    InvalidEscape { line: u32, column: u32 },

    #[error("unescaped '}}' in string literal at {line}:{column}; write '}}}}' for a literal brace")]
    UnescapedBrace { line: u32, column: u32 },

    #[error("invalid numeric literal at {line}:{column}: {reason}")]
    InvalidNumber {
        line: u32,
        column: u32,
        reason: String,
    },

    #[error("unexpected character '{ch}' at {line}:{column}")]
    UnexpectedChar { ch: char, line: u32, column: u32 },
}

impl LexError {
    /// The location the error points at.
    pub fn location(&self) -> (u32, u32) {
        match *self {
            LexError::UnterminatedString { line, column }
            | LexError::UnterminatedRawBlock { line, column }
            | LexError::UnterminatedComment { line, column }
            | LexError::UnterminatedInterpolation { line, column }
            | LexError::InvalidEscape { line, column }
            | LexError::UnescapedBrace { line, column }
            | LexError::InvalidNumber { line, column, .. }
            | LexError::UnexpectedChar { line, column, .. } => (line, column),
        }
    }
}
