//! Opcode definitions for the Opal instruction set.

/// Identifies the operation an [`crate::Instruction`] performs.
///
/// Binary operations pop their right operand first: the result is
/// `second_popped OP first_popped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Literals and variables
    /// Push the instruction's constant operand.
    Push,
    /// Discard the top of the operand stack.
    Pop,
    /// Pop a value into frame slot `operand`.
    Store,
    /// Push the value held in frame slot `operand`.
    Load,

    // Arithmetic and logic
    /// Pop two values, push their sum (int or double).
    Add,
    /// Pop two values, push (second_popped - first_popped).
    Sub,
    /// Pop two values, push their product.
    Mul,
    /// Pop two values, push (second_popped / first_popped). Zero divisor traps.
    Div,
    /// Logical AND of two bools.
    And,
    /// Logical OR of two bools.
    Or,
    /// Logical NOT of one bool.
    Not,

    // Comparison (push a bool)
    /// second_popped < first_popped (int, double, or string).
    CmpLt,
    /// second_popped <= first_popped.
    CmpLe,
    /// second_popped > first_popped.
    CmpGt,
    /// second_popped >= first_popped.
    CmpGe,
    /// Equality; null compares equal only to null.
    CmpEq,
    /// Inequality; negation of CMPEQ.
    CmpNe,

    // Branching
    /// Unconditional jump to instruction index `operand`.
    Jmp,
    /// Pop a bool; jump to `operand` when it is false. Non-bool traps.
    Jmpf,

    // Functions
    /// Call the function named by `operand`, transplanting its arguments.
    Call,
    /// Pop the return value, discard the frame, push it in the caller.
    Ret,

    // Built-ins
    /// Pop a value and write its textual form to the output handle.
    Write,
    /// Read one line from the input handle, push it without the newline.
    Read,
    /// Pop a string, push its character count.
    SLen,
    /// Pop an array id, push the array's length.
    ALen,
    /// Pop a string then an index, push the character at that index.
    GetC,
    /// Pop a double or string, push it converted to int.
    ToInt,
    /// Pop an int or string, push it converted to double.
    ToDbl,
    /// Pop an int or double, push its textual form.
    ToStr,
    /// Pop two strings, push (second_popped + first_popped).
    Concat,

    // Heap
    /// Allocate an empty struct object, push its id.
    AllocS,
    /// Pop a fill value then a size, allocate an array, push its id.
    AllocA,
    /// Pop a struct id, add the field named by `operand` (unset).
    AddF,
    /// Pop a value then a struct id, set field `operand`.
    SetF,
    /// Pop a struct id, push the value of field `operand`.
    GetF,
    /// Pop value, index, array id; set the element.
    SetI,
    /// Pop index then array id; push the element.
    GetI,
    /// Pop a struct id, remove the object from the struct heap.
    DelS,
    /// Pop an array id, remove the object from the array heap.
    DelAr,

    // Special
    /// Duplicate the top of the operand stack.
    Dup,
    /// No operation; jump landing pad.
    Nop,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 41] = [
    Opcode::Push,
    Opcode::Pop,
    Opcode::Store,
    Opcode::Load,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::CmpLt,
    Opcode::CmpLe,
    Opcode::CmpGt,
    Opcode::CmpGe,
    Opcode::CmpEq,
    Opcode::CmpNe,
    Opcode::Jmp,
    Opcode::Jmpf,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Write,
    Opcode::Read,
    Opcode::SLen,
    Opcode::ALen,
    Opcode::GetC,
    Opcode::ToInt,
    Opcode::ToDbl,
    Opcode::ToStr,
    Opcode::Concat,
    Opcode::AllocS,
    Opcode::AllocA,
    Opcode::AddF,
    Opcode::SetF,
    Opcode::GetF,
    Opcode::SetI,
    Opcode::GetI,
    Opcode::DelS,
    Opcode::DelAr,
    Opcode::Dup,
    Opcode::Nop,
];

impl Opcode {
    /// Returns the mnemonic used in IR listings and trap messages.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Store => "STORE",
            Opcode::Load => "LOAD",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::CmpLt => "CMPLT",
            Opcode::CmpLe => "CMPLE",
            Opcode::CmpGt => "CMPGT",
            Opcode::CmpGe => "CMPGE",
            Opcode::CmpEq => "CMPEQ",
            Opcode::CmpNe => "CMPNE",
            Opcode::Jmp => "JMP",
            Opcode::Jmpf => "JMPF",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Write => "WRITE",
            Opcode::Read => "READ",
            Opcode::SLen => "SLEN",
            Opcode::ALen => "ALEN",
            Opcode::GetC => "GETC",
            Opcode::ToInt => "TOINT",
            Opcode::ToDbl => "TODBL",
            Opcode::ToStr => "TOSTR",
            Opcode::Concat => "CONCAT",
            Opcode::AllocS => "ALLOCS",
            Opcode::AllocA => "ALLOCA",
            Opcode::AddF => "ADDF",
            Opcode::SetF => "SETF",
            Opcode::GetF => "GETF",
            Opcode::SetI => "SETI",
            Opcode::GetI => "GETI",
            Opcode::DelS => "DELS",
            Opcode::DelAr => "DELAR",
            Opcode::Dup => "DUP",
            Opcode::Nop => "NOP",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
