//! The virtual machine.
//!
//! Execution starts at `main` and proceeds frame by frame: each call
//! pushes a [`Frame`] holding its own operand stack, variable slots,
//! and program counter. Structs and arrays live in two heaps keyed by
//! object ids from a shared counter; ids are never reused, so access
//! through a deleted id traps instead of aliasing a newer object.

use crate::error::{Fault, RuntimeError, Trap};
use opal_common::{Instruction, Program, Value};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

/// One entry of the call stack.
pub(crate) struct Frame {
    /// Index of the function in the program's function table.
    pub(crate) function: usize,
    pub(crate) pc: usize,
    pub(crate) stack: Vec<Value>,
    pub(crate) slots: Vec<Value>,
}

impl Frame {
    pub(crate) fn new(function: usize) -> Self {
        Self {
            function,
            pc: 0,
            stack: Vec::new(),
            slots: Vec::new(),
        }
    }
}

pub struct Vm {
    pub(crate) program: Program,
    pub(crate) call_stack: Vec<Frame>,
    pub(crate) struct_heap: HashMap<i64, HashMap<String, Value>>,
    pub(crate) array_heap: HashMap<i64, Vec<Value>>,
    pub(crate) next_object_id: i64,
}

impl Vm {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            call_stack: Vec::new(),
            struct_heap: HashMap::new(),
            array_heap: HashMap::new(),
            next_object_id: 1,
        }
    }

    /// Run the program against the process's stdin and stdout.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let stdin = io::stdin();
        self.run_with(stdin.lock(), io::stdout())
    }

    /// Run the program with explicit I/O handles. `print` writes to
    /// `output`, `input` reads lines from `input`.
    pub fn run_with<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), RuntimeError> {
        let main = self
            .program
            .functions
            .iter()
            .position(|f| f.name == "main")
            .ok_or(RuntimeError::MissingMain)?;
        self.call_stack.push(Frame::new(main));

        while let Some(frame) = self.call_stack.last() {
            let function = &self.program.functions[frame.function];
            let Some(instruction) = function.instructions.get(frame.pc) else {
                break;
            };
            let instruction = instruction.clone();
            let frame_name = function.name.clone();
            let at = frame.pc;
            if let Some(frame) = self.call_stack.last_mut() {
                frame.pc += 1;
            }
            if let Err(fault) = self.execute(&instruction, &mut input, &mut output) {
                return Err(match fault {
                    Fault::Io(message) => RuntimeError::Io(message),
                    Fault::Trap(kind) => RuntimeError::Trap {
                        kind,
                        frame: frame_name,
                        at,
                        instr: instruction.to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    pub(crate) fn frame_mut(&mut self) -> Result<&mut Frame, Trap> {
        self.call_stack.last_mut().ok_or(Trap::EmptyCallStack)
    }

    pub(crate) fn push(&mut self, value: Value) -> Result<(), Trap> {
        self.frame_mut()?.stack.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Value, Trap> {
        self.frame_mut()?.stack.pop().ok_or(Trap::EmptyOperandStack)
    }

    /// Pop with a null guard, for operations null cannot flow into.
    pub(crate) fn pop_not_null(&mut self) -> Result<Value, Trap> {
        let value = self.pop()?;
        if value.is_null() {
            return Err(Trap::NullReference);
        }
        Ok(value)
    }
}

/// Required jump or slot operand of an instruction.
pub(crate) fn operand_int(instruction: &Instruction) -> Result<usize, Trap> {
    instruction.operand_int().ok_or(Trap::MissingOperand)
}

/// Required field or function name operand of an instruction.
pub(crate) fn operand_text(instruction: &Instruction) -> Result<&str, Trap> {
    instruction.operand_text().ok_or(Trap::MissingOperand)
}

/// Required value operand of a PUSH.
pub(crate) fn operand_value(instruction: &Instruction) -> Result<&Value, Trap> {
    instruction.operand_value().ok_or(Trap::MissingOperand)
}
