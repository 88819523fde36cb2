//! The Opal frontend: source text in, checked AST out.
//!
//! The pipeline runs in three phases. [`lexer::tokenize`] turns source
//! text into tokens, [`parser::parse`] builds the AST, and
//! [`checker::check`] validates types and annotates delete statements.
//! [`printer::print_program`] renders an AST back to formatted source.

pub mod ast;
pub mod checker;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use checker::check;
pub use error::{LexError, ParseError, StaticError};
pub use lexer::tokenize;
pub use parser::parse;
pub use printer::print_program;
pub use token::{Token, TokenKind};
