//! Stack-based virtual machine for Opal bytecode.
//!
//! [`Vm::new`] takes a compiled [`opal_common::Program`]; [`Vm::run`]
//! executes it from `main` against stdin/stdout, and [`Vm::run_with`]
//! against any `BufRead`/`Write` pair. Every runtime failure is a
//! [`RuntimeError`] carrying the trapping instruction's context.

mod execute;
pub mod error;
pub mod machine;

pub use error::{RuntimeError, Trap};
pub use machine::Vm;
