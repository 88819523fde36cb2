//! Runtime errors.
//!
//! A [`Trap`] names the condition an instruction hit. The machine wraps
//! it into a [`RuntimeError`] with the frame name, instruction address,
//! and rendered instruction so a failure reads like
//! `array does not exist (in main at 5: GETI())`.

use thiserror::Error;

/// Conditions that stop execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Trap {
    #[error("null reference")]
    NullReference,

    #[error("division by zero")]
    DivisionByZero,

    #[error("out-of-bounds array index")]
    OutOfBoundsArrayIndex,

    #[error("out-of-bounds string index")]
    OutOfBoundsStringIndex,

    /// Struct id not in the heap (never allocated or deleted).
    #[error("struct does not exist")]
    StructDoesNotExist,

    /// Array id not in the heap (never allocated or deleted).
    #[error("array does not exist")]
    ArrayDoesNotExist,

    #[error("undefined field '{name}'")]
    UndefinedField { name: String },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("cannot convert string to int")]
    CannotConvertToInt,

    #[error("cannot convert string to double")]
    CannotConvertToDouble,

    /// JMPF on a non-bool operand.
    #[error("condition is not a bool")]
    NonBooleanCondition,

    #[error("invalid array size")]
    InvalidArraySize,

    #[error("empty operand stack")]
    EmptyOperandStack,

    #[error("empty call stack")]
    EmptyCallStack,

    #[error("missing instruction operand")]
    MissingOperand,

    #[error("invalid slot {slot}")]
    InvalidSlot { slot: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// A failed run: either a trap with its execution context or an
/// environment-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("no 'main' function")]
    MissingMain,

    #[error("i/o error: {0}")]
    Io(String),

    #[error("{kind} (in {frame} at {at}: {instr})")]
    Trap {
        kind: Trap,
        frame: String,
        at: usize,
        instr: String,
    },
}

/// Instruction-level failure before context is attached.
#[derive(Debug)]
pub(crate) enum Fault {
    Trap(Trap),
    Io(String),
}

impl From<Trap> for Fault {
    fn from(trap: Trap) -> Self {
        Fault::Trap(trap)
    }
}

impl From<std::io::Error> for Fault {
    fn from(err: std::io::Error) -> Self {
        Fault::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_display_formats() {
        assert_eq!(Trap::NullReference.to_string(), "null reference");
        assert_eq!(Trap::StructDoesNotExist.to_string(), "struct does not exist");
        assert_eq!(
            Trap::UndefinedField {
                name: "next".to_string()
            }
            .to_string(),
            "undefined field 'next'"
        );
        assert_eq!(
            Trap::NonBooleanCondition.to_string(),
            "condition is not a bool"
        );
    }

    #[test]
    fn runtime_error_carries_context() {
        let err = RuntimeError::Trap {
            kind: Trap::OutOfBoundsArrayIndex,
            frame: "main".to_string(),
            at: 4,
            instr: "GETI()".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "out-of-bounds array index (in main at 4: GETI())"
        );
    }

    #[test]
    fn missing_main_display() {
        assert_eq!(RuntimeError::MissingMain.to_string(), "no 'main' function");
    }
}
