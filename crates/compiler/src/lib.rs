//! Compiles checked Opal ASTs to bytecode programs.
//!
//! The entry point is [`compile`]; it expects an AST that already
//! passed the frontend checker (delete statements annotated, all names
//! and types resolved).

pub mod codegen;
pub mod error;

pub use codegen::compile;
pub use error::CompileError;
