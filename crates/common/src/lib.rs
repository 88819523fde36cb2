//! Opal common types and instruction set.
//!
//! This crate provides the foundational data structures shared by the
//! compiler and the VM:
//!
//! - [`Opcode`]: the 41 operations of the Opal bytecode
//! - [`Instruction`]: an opcode plus at most one typed operand
//! - [`Value`]: runtime value representation for stack, slots, and heaps
//! - [`FunctionInfo`] / [`Program`]: the compiled function table
//!
//! This crate has no dependencies; errors are defined where they occur
//! (the frontend, compiler, and VM crates).

pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use instruction::{Instruction, Operand};
pub use opcode::Opcode;
pub use program::{FunctionInfo, Program};
pub use value::Value;
