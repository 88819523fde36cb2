//! Compiled program representation: a table of bytecode functions.

use crate::instruction::Instruction;

/// The bytecode for one source function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// The function's source name ("main", "fib", ...).
    pub name: String,
    /// Number of parameters; CALL transplants this many operands.
    pub param_count: usize,
    /// The instruction sequence. Execution starts at index 0.
    pub instructions: Vec<Instruction>,
}

/// A compiled program: all functions, in definition order.
///
/// Execution begins at the function named `main`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    /// Function table in order of definition.
    pub functions: Vec<FunctionInfo>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled function to the table.
    pub fn add(&mut self, function: FunctionInfo) {
        self.functions.push(function);
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Total instruction count across all functions.
    pub fn len(&self) -> usize {
        self.functions.iter().map(|f| f.instructions.len()).sum()
    }

    /// Returns true if the program contains no instructions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Program {
    /// The IR listing: one `Frame` block per function with numbered
    /// instructions.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for function in &self.functions {
            writeln!(f, "\nFrame '{}'", function.name)?;
            for (i, instr) in function.instructions.iter().enumerate() {
                writeln!(f, "  {i}: {instr}")?;
            }
        }
        Ok(())
    }
}
