//! Lexer for Opal source text.
//!
//! Produces [`Token`]s one at a time until an end-of-stream token.
//! Comments run from `#` to the end of the line. Positions are 1-based;
//! multi-character tokens carry the position of their first character.

use crate::error::LexError;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::Chars;

/// Streaming tokenizer over source text.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

/// Tokenize an entire source string, including the final EOS token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eos;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    /// Consume one character, advancing the column counter.
    fn read(&mut self) -> Option<char> {
        self.column += 1;
        self.chars.next()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn newline(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    /// Produce the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let ch = match self.read() {
                None => {
                    return Ok(Token::new(
                        TokenKind::Eos,
                        "end-of-stream",
                        self.line,
                        self.column,
                    ))
                }
                Some(c) => c,
            };
            if ch == '\n' {
                self.newline();
                continue;
            }
            if ch.is_whitespace() {
                continue;
            }
            if ch == '#' {
                loop {
                    match self.read() {
                        None => {
                            return Ok(Token::new(
                                TokenKind::Eos,
                                "end-of-stream",
                                self.line,
                                self.column,
                            ))
                        }
                        Some('\n') => {
                            self.newline();
                            break;
                        }
                        Some(_) => {}
                    }
                }
                continue;
            }
            return self.token_starting_with(ch);
        }
    }

    fn token_starting_with(&mut self, ch: char) -> Result<Token, LexError> {
        let line = self.line;
        let column = self.column;
        match ch {
            '=' => {
                if self.peek() == Some('=') {
                    self.read();
                    Ok(Token::new(TokenKind::Equal, "==", line, column))
                } else {
                    Ok(Token::new(TokenKind::Assign, "=", line, column))
                }
            }
            '.' => Ok(Token::new(TokenKind::Dot, ".", line, column)),
            ',' => Ok(Token::new(TokenKind::Comma, ",", line, column)),
            '(' => Ok(Token::new(TokenKind::LParen, "(", line, column)),
            ')' => Ok(Token::new(TokenKind::RParen, ")", line, column)),
            '{' => Ok(Token::new(TokenKind::LBrace, "{", line, column)),
            '}' => Ok(Token::new(TokenKind::RBrace, "}", line, column)),
            ';' => Ok(Token::new(TokenKind::Semicolon, ";", line, column)),
            '[' => Ok(Token::new(TokenKind::LBracket, "[", line, column)),
            ']' => Ok(Token::new(TokenKind::RBracket, "]", line, column)),
            '+' => Ok(Token::new(TokenKind::Plus, "+", line, column)),
            '-' => Ok(Token::new(TokenKind::Minus, "-", line, column)),
            '*' => Ok(Token::new(TokenKind::Times, "*", line, column)),
            '/' => Ok(Token::new(TokenKind::Divide, "/", line, column)),
            '<' => {
                if self.peek() == Some('=') {
                    self.read();
                    Ok(Token::new(TokenKind::LessEq, "<=", line, column))
                } else {
                    Ok(Token::new(TokenKind::Less, "<", line, column))
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.read();
                    Ok(Token::new(TokenKind::GreaterEq, ">=", line, column))
                } else {
                    Ok(Token::new(TokenKind::Greater, ">", line, column))
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.read();
                    Ok(Token::new(TokenKind::NotEqual, "!=", line, column))
                } else {
                    let found = self.run_to_whitespace(ch);
                    Err(LexError::ExpectingNotEqual {
                        found,
                        line,
                        column,
                    })
                }
            }
            '\'' => self.char_literal(line, column),
            '"' => self.string_literal(line, column),
            c if c.is_ascii_digit() => self.number(c, line, column),
            c if c.is_ascii_alphabetic() => Ok(self.word(c, line, column)),
            _ => {
                let found = self.run_to_whitespace(ch);
                Err(LexError::UnexpectedCharacter {
                    found,
                    line,
                    column,
                })
            }
        }
    }

    /// Collect the offending run of characters for an error message.
    fn run_to_whitespace(&mut self, first: char) -> String {
        let mut out = String::new();
        out.push(first);
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            out.push(c);
            self.read();
        }
        out
    }

    fn char_literal(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        if self.peek() == Some('\'') {
            return Err(LexError::EmptyCharacter {
                line,
                column: column + 1,
            });
        }
        let mut lexeme = String::new();
        match self.read() {
            None => {
                return Err(LexError::EofInCharacter {
                    line,
                    column: self.column,
                })
            }
            Some('\n') => {
                return Err(LexError::EolInCharacter {
                    line,
                    column: self.column,
                })
            }
            Some('\\') => {
                // Escapes keep their source spelling; the compiler expands them.
                lexeme.push('\\');
                match self.read() {
                    None => {
                        return Err(LexError::EofInCharacter {
                            line,
                            column: self.column,
                        })
                    }
                    Some(c) => lexeme.push(c),
                }
            }
            Some(c) => lexeme.push(c),
        }
        match self.read() {
            Some('\'') => Ok(Token::new(TokenKind::CharVal, lexeme, line, column)),
            Some(other) => Err(LexError::UnclosedCharacter {
                found: other.to_string(),
                line,
                column: self.column,
            }),
            None => Err(LexError::EofInCharacter {
                line,
                column: self.column,
            }),
        }
    }

    fn string_literal(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        loop {
            match self.read() {
                Some('"') => return Ok(Token::new(TokenKind::StringVal, lexeme, line, column)),
                Some('\n') => {
                    return Err(LexError::EolInString {
                        line,
                        column: self.column,
                    })
                }
                None => {
                    return Err(LexError::EofInString {
                        line,
                        column: self.column,
                    })
                }
                Some(c) => lexeme.push(c),
            }
        }
    }

    fn number(&mut self, first: char, line: usize, column: usize) -> Result<Token, LexError> {
        if first == '0' && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(LexError::LeadingZero { line, column });
        }
        let mut lexeme = String::new();
        lexeme.push(first);
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            lexeme.push(self.read().unwrap_or_default());
        }
        if self.peek() == Some('.') {
            self.read();
            lexeme.push('.');
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError::MissingFractionDigit {
                    lexeme,
                    line,
                    column: self.column + 1,
                });
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                lexeme.push(self.read().unwrap_or_default());
            }
            Ok(Token::new(TokenKind::DoubleVal, lexeme, line, column))
        } else {
            Ok(Token::new(TokenKind::IntVal, lexeme, line, column))
        }
    }

    fn word(&mut self, first: char, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            lexeme.push(self.read().unwrap_or_default());
        }
        let kind = match lexeme.as_str() {
            "struct" => TokenKind::Struct,
            "array" => TokenKind::Array,
            "delete" => TokenKind::Delete,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "if" => TokenKind::If,
            "elseif" => TokenKind::ElseIf,
            "else" => TokenKind::Else,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "new" => TokenKind::New,
            "return" => TokenKind::Return,
            "null" => TokenKind::NullVal,
            "true" | "false" => TokenKind::BoolVal,
            "bool" => TokenKind::BoolType,
            "int" => TokenKind::IntType,
            "double" => TokenKind::DoubleType,
            "char" => TokenKind::CharType,
            "string" => TokenKind::StringType,
            "void" => TokenKind::VoidType,
            _ => TokenKind::Id,
        };
        Token::new(kind, lexeme, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_is_eos() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eos);
        assert_eq!(tokens[0].lexeme, "end-of-stream");
    }

    #[test]
    fn reserved_words_and_positions() {
        let tokens = tokenize("struct array delete").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Struct);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!(tokens[1].kind, TokenKind::Array);
        assert_eq!((tokens[1].line, tokens[1].column), (1, 8));
        assert_eq!(tokens[2].kind, TokenKind::Delete);
        assert_eq!((tokens[2].line, tokens[2].column), (1, 14));
        assert_eq!(tokens[3].kind, TokenKind::Eos);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= < > ="),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Assign,
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = tokenize("# a comment\nint # trailing\n42").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntType);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].kind, TokenKind::IntVal);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn int_and_double_literals() {
        let tokens = tokenize("42 3.14 0 0.5").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntVal);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::DoubleVal);
        assert_eq!(tokens[1].lexeme, "3.14");
        assert_eq!(tokens[2].kind, TokenKind::IntVal);
        assert_eq!(tokens[3].kind, TokenKind::DoubleVal);
    }

    #[test]
    fn leading_zero_rejected() {
        assert_eq!(
            tokenize("042"),
            Err(LexError::LeadingZero { line: 1, column: 1 })
        );
    }

    #[test]
    fn missing_fraction_digit_rejected() {
        assert_eq!(
            tokenize("27. "),
            Err(LexError::MissingFractionDigit {
                lexeme: "27.".to_string(),
                line: 1,
                column: 4
            })
        );
    }

    #[test]
    fn string_literal_strips_quotes() {
        let tokens = tokenize("\"hello world\"").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringVal);
        assert_eq!(tokens[0].lexeme, "hello world");
        assert_eq!(tokens[0].column, 1);
    }

    #[test]
    fn unterminated_string_rejected() {
        assert!(matches!(
            tokenize("\"oops"),
            Err(LexError::EofInString { .. })
        ));
        assert!(matches!(
            tokenize("\"oops\nmore\""),
            Err(LexError::EolInString { .. })
        ));
    }

    #[test]
    fn char_literals() {
        let tokens = tokenize("'a' '\\n'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::CharVal);
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[1].kind, TokenKind::CharVal);
        assert_eq!(tokens[1].lexeme, "\\n");
    }

    #[test]
    fn empty_char_rejected() {
        assert_eq!(
            tokenize("''"),
            Err(LexError::EmptyCharacter { line: 1, column: 2 })
        );
    }

    #[test]
    fn bare_bang_rejected() {
        assert_eq!(
            tokenize("!x "),
            Err(LexError::ExpectingNotEqual {
                found: "!x".to_string(),
                line: 1,
                column: 1
            })
        );
    }

    #[test]
    fn unexpected_character_rejected() {
        assert_eq!(
            tokenize("?"),
            Err(LexError::UnexpectedCharacter {
                found: "?".to_string(),
                line: 1,
                column: 1
            })
        );
    }

    #[test]
    fn identifiers_with_digits_and_underscores() {
        let tokens = tokenize("my_var2 trueish").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Id);
        assert_eq!(tokens[0].lexeme, "my_var2");
        // Prefix of a keyword is still an identifier.
        assert_eq!(tokens[1].kind, TokenKind::Id);
    }

    #[test]
    fn bool_and_null_literals() {
        assert_eq!(
            kinds("true false null"),
            vec![
                TokenKind::BoolVal,
                TokenKind::BoolVal,
                TokenKind::NullVal,
                TokenKind::Eos,
            ]
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The lexer never panics: any input either tokenizes or yields
        /// a structured error.
        #[test]
        fn tokenize_total(source in ".*") {
            let _ = tokenize(&source);
        }

        /// Nonzero digit runs always lex as a single INT_VAL.
        #[test]
        fn digit_runs_lex_as_int(n in 1u64..=u64::MAX / 2) {
            let source = n.to_string();
            let tokens = tokenize(&source).unwrap();
            prop_assert_eq!(tokens.len(), 2);
            prop_assert_eq!(tokens[0].kind, TokenKind::IntVal);
            prop_assert_eq!(&tokens[0].lexeme, &source);
        }
    }
}
