//! Diagnostics for the Opal frontend.
//!
//! Each phase has its own error type so callers can react per phase:
//! [`LexError`] from tokenization, [`ParseError`] from syntax analysis,
//! and [`StaticError`] from semantic checking. All carry 1-based source
//! positions where one exists.

use crate::token::Token;
use thiserror::Error;

/// Errors produced while tokenizing source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// `!` not followed by `=`.
    #[error("expecting '!=' found '{found}' at line {line}, column {column}")]
    ExpectingNotEqual {
        found: String,
        line: usize,
        column: usize,
    },

    /// `''` with no character between the quotes.
    #[error("empty character at line {line}, column {column}")]
    EmptyCharacter { line: usize, column: usize },

    /// Input ended inside a character literal.
    #[error("found end-of-file in character at line {line}, column {column}")]
    EofInCharacter { line: usize, column: usize },

    /// Newline inside a character literal.
    #[error("found end-of-line in character at line {line}, column {column}")]
    EolInCharacter { line: usize, column: usize },

    /// Character literal not closed by a single quote.
    #[error("expecting ' found '{found}' at line {line}, column {column}")]
    UnclosedCharacter {
        found: String,
        line: usize,
        column: usize,
    },

    /// Input ended inside a string literal.
    #[error("found end-of-file in string at line {line}, column {column}")]
    EofInString { line: usize, column: usize },

    /// Newline inside a string literal.
    #[error("found end-of-line in string at line {line}, column {column}")]
    EolInString { line: usize, column: usize },

    /// Number starting with `0` followed by more digits.
    #[error("leading zero in number at line {line}, column {column}")]
    LeadingZero { line: usize, column: usize },

    /// Decimal point with no digit after it.
    #[error("missing digit in '{lexeme}' at line {line}, column {column}")]
    MissingFractionDigit {
        lexeme: String,
        line: usize,
        column: usize,
    },

    /// A character that starts no token.
    #[error("unexpected character '{found}' at line {line}, column {column}")]
    UnexpectedCharacter {
        found: String,
        line: usize,
        column: usize,
    },
}

/// A syntax error: what the parser expected and the token it found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} found '{found}' at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Build an error pointing at `token`.
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            found: token.lexeme.clone(),
            line: token.line,
            column: token.column,
        }
    }
}

/// Errors produced by the semantic checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StaticError {
    /// An error tied to a source position.
    #[error("{message} near line {line}, column {column}")]
    Near {
        message: String,
        line: usize,
        column: usize,
    },

    /// A program-wide error with no single position.
    #[error("{message}")]
    Global { message: String },
}

impl StaticError {
    /// Build a positioned error pointing at `token`.
    pub fn near(message: impl Into<String>, token: &Token) -> Self {
        StaticError::Near {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    pub fn global(message: impl Into<String>) -> Self {
        StaticError::Global {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn lex_error_display_formats() {
        assert_eq!(
            LexError::LeadingZero { line: 3, column: 8 }.to_string(),
            "leading zero in number at line 3, column 8"
        );
        assert_eq!(
            LexError::MissingFractionDigit {
                lexeme: "27.".to_string(),
                line: 1,
                column: 4
            }
            .to_string(),
            "missing digit in '27.' at line 1, column 4"
        );
        assert_eq!(
            LexError::UnexpectedCharacter {
                found: "?".to_string(),
                line: 2,
                column: 1
            }
            .to_string(),
            "unexpected character '?' at line 2, column 1"
        );
    }

    #[test]
    fn parse_error_display_format() {
        let token = Token::new(TokenKind::RBrace, "}", 7, 3);
        assert_eq!(
            ParseError::new("expecting identifier", &token).to_string(),
            "expecting identifier found '}' at line 7, column 3"
        );
    }

    #[test]
    fn static_error_display_formats() {
        let token = Token::new(TokenKind::Id, "x", 5, 9);
        assert_eq!(
            StaticError::near("type mismatch", &token).to_string(),
            "type mismatch near line 5, column 9"
        );
        assert_eq!(
            StaticError::global("program missing main function").to_string(),
            "program missing main function"
        );
    }
}
