//! Instruction representation for the Opal bytecode.
//!
//! An instruction pairs an [`Opcode`] with at most one operand. The
//! compiler builds instructions through the constructor functions below
//! (one per opcode), which keep operand shapes consistent: a `STORE`
//! always carries a slot index, a `GETF` always carries a field name,
//! and so on.

use crate::opcode::Opcode;
use crate::value::Value;

/// The operand attached to an instruction, when it has one.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A slot index or jump target.
    Int(usize),
    /// A field or function name.
    Text(String),
    /// A constant pushed by PUSH.
    Value(Value),
}

/// A single bytecode instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// The operand, for opcodes that take one.
    pub operand: Option<Operand>,
}

impl Instruction {
    fn plain(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    fn with_int(opcode: Opcode, n: usize) -> Self {
        Self {
            opcode,
            operand: Some(Operand::Int(n)),
        }
    }

    fn with_text(opcode: Opcode, s: impl Into<String>) -> Self {
        Self {
            opcode,
            operand: Some(Operand::Text(s.into())),
        }
    }

    // ---- Literals and variables ----

    /// PUSH a constant value.
    pub fn push(value: Value) -> Self {
        Self {
            opcode: Opcode::Push,
            operand: Some(Operand::Value(value)),
        }
    }

    pub fn pop() -> Self {
        Self::plain(Opcode::Pop)
    }

    /// STORE the top of stack into frame slot `slot`.
    pub fn store(slot: usize) -> Self {
        Self::with_int(Opcode::Store, slot)
    }

    /// LOAD frame slot `slot` onto the stack.
    pub fn load(slot: usize) -> Self {
        Self::with_int(Opcode::Load, slot)
    }

    // ---- Arithmetic and logic ----

    pub fn add() -> Self {
        Self::plain(Opcode::Add)
    }

    pub fn sub() -> Self {
        Self::plain(Opcode::Sub)
    }

    pub fn mul() -> Self {
        Self::plain(Opcode::Mul)
    }

    pub fn div() -> Self {
        Self::plain(Opcode::Div)
    }

    pub fn and() -> Self {
        Self::plain(Opcode::And)
    }

    pub fn or() -> Self {
        Self::plain(Opcode::Or)
    }

    pub fn not() -> Self {
        Self::plain(Opcode::Not)
    }

    // ---- Comparison ----

    pub fn cmplt() -> Self {
        Self::plain(Opcode::CmpLt)
    }

    pub fn cmple() -> Self {
        Self::plain(Opcode::CmpLe)
    }

    pub fn cmpgt() -> Self {
        Self::plain(Opcode::CmpGt)
    }

    pub fn cmpge() -> Self {
        Self::plain(Opcode::CmpGe)
    }

    pub fn cmpeq() -> Self {
        Self::plain(Opcode::CmpEq)
    }

    pub fn cmpne() -> Self {
        Self::plain(Opcode::CmpNe)
    }

    // ---- Branching ----

    /// JMP to instruction index `target`.
    pub fn jmp(target: usize) -> Self {
        Self::with_int(Opcode::Jmp, target)
    }

    /// JMPF: pop a bool, jump to `target` when it is false.
    pub fn jmpf(target: usize) -> Self {
        Self::with_int(Opcode::Jmpf, target)
    }

    // ---- Functions ----

    /// CALL the function named `name`.
    pub fn call(name: impl Into<String>) -> Self {
        Self::with_text(Opcode::Call, name)
    }

    pub fn ret() -> Self {
        Self::plain(Opcode::Ret)
    }

    // ---- Built-ins ----

    pub fn write() -> Self {
        Self::plain(Opcode::Write)
    }

    pub fn read() -> Self {
        Self::plain(Opcode::Read)
    }

    pub fn slen() -> Self {
        Self::plain(Opcode::SLen)
    }

    pub fn alen() -> Self {
        Self::plain(Opcode::ALen)
    }

    pub fn getc() -> Self {
        Self::plain(Opcode::GetC)
    }

    pub fn to_int() -> Self {
        Self::plain(Opcode::ToInt)
    }

    pub fn to_dbl() -> Self {
        Self::plain(Opcode::ToDbl)
    }

    pub fn to_str() -> Self {
        Self::plain(Opcode::ToStr)
    }

    pub fn concat() -> Self {
        Self::plain(Opcode::Concat)
    }

    // ---- Heap ----

    pub fn allocs() -> Self {
        Self::plain(Opcode::AllocS)
    }

    pub fn alloca() -> Self {
        Self::plain(Opcode::AllocA)
    }

    /// ADDF: add field `field` to the struct whose id is on the stack.
    pub fn addf(field: impl Into<String>) -> Self {
        Self::with_text(Opcode::AddF, field)
    }

    /// SETF: set field `field` on a struct object.
    pub fn setf(field: impl Into<String>) -> Self {
        Self::with_text(Opcode::SetF, field)
    }

    /// GETF: read field `field` from a struct object.
    pub fn getf(field: impl Into<String>) -> Self {
        Self::with_text(Opcode::GetF, field)
    }

    pub fn seti() -> Self {
        Self::plain(Opcode::SetI)
    }

    pub fn geti() -> Self {
        Self::plain(Opcode::GetI)
    }

    pub fn dels() -> Self {
        Self::plain(Opcode::DelS)
    }

    pub fn delar() -> Self {
        Self::plain(Opcode::DelAr)
    }

    // ---- Special ----

    pub fn dup() -> Self {
        Self::plain(Opcode::Dup)
    }

    pub fn nop() -> Self {
        Self::plain(Opcode::Nop)
    }

    // ---- Operand access ----

    /// The integer operand (slot index or jump target), if present.
    pub fn operand_int(&self) -> Option<usize> {
        match self.operand {
            Some(Operand::Int(n)) => Some(n),
            _ => None,
        }
    }

    /// The text operand (field or function name), if present.
    pub fn operand_text(&self) -> Option<&str> {
        match &self.operand {
            Some(Operand::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The constant operand of a PUSH, if present.
    pub fn operand_value(&self) -> Option<&Value> {
        match &self.operand {
            Some(Operand::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Patch the jump target of a JMP/JMPF emitted with a placeholder.
    pub fn set_target(&mut self, target: usize) {
        self.operand = Some(Operand::Int(target));
    }
}

impl std::fmt::Display for Instruction {
    /// Renders as `MNEMONIC(operand)`, e.g. `PUSH(42)`, `GETF(x)`, `RET()`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.operand {
            None => write!(f, "{}()", self.opcode),
            Some(Operand::Int(n)) => write!(f, "{}({n})", self.opcode),
            Some(Operand::Text(s)) => write!(f, "{}({s})", self.opcode),
            Some(Operand::Value(v)) => write!(f, "{}({v})", self.opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_value_operand() {
        assert_eq!(Instruction::push(Value::Int(42)).to_string(), "PUSH(42)");
        assert_eq!(Instruction::push(Value::Null).to_string(), "PUSH(null)");
    }

    #[test]
    fn display_with_int_operand() {
        assert_eq!(Instruction::store(3).to_string(), "STORE(3)");
        assert_eq!(Instruction::jmpf(17).to_string(), "JMPF(17)");
    }

    #[test]
    fn display_with_text_operand() {
        assert_eq!(Instruction::getf("x").to_string(), "GETF(x)");
        assert_eq!(Instruction::call("main").to_string(), "CALL(main)");
    }

    #[test]
    fn display_without_operand() {
        assert_eq!(Instruction::ret().to_string(), "RET()");
        assert_eq!(Instruction::geti().to_string(), "GETI()");
    }

    #[test]
    fn set_target_patches_placeholder() {
        let mut instr = Instruction::jmpf(usize::MAX);
        instr.set_target(9);
        assert_eq!(instr, Instruction::jmpf(9));
        assert_eq!(instr.operand_int(), Some(9));
    }

    #[test]
    fn operand_accessors_reject_wrong_shape() {
        let push = Instruction::push(Value::Bool(true));
        assert_eq!(push.operand_int(), None);
        assert_eq!(push.operand_text(), None);
        assert_eq!(push.operand_value(), Some(&Value::Bool(true)));
    }
}
