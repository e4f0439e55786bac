//! Error types for markup parsing

use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of input at byte {offset}: expected {expected}")]
    UnexpectedEof { offset: usize, expected: String },

    #[error("Elements nested deeper than {limit} levels at byte {offset}")]
    NestingTooDeep { offset: usize, limit: usize },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedEof { offset, .. } => *offset,
            ParseError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}
