//! Instruction execution.
//!
//! One `exec_*` method per instruction family, dispatched from
//! [`Vm::execute`]. Binary operations pop the right operand first, so
//! helpers receive `(left, right)` in source order. Conversions between
//! [`Value`] variants go through the `as_*` helpers, which trap with a
//! type mismatch instead of panicking on malformed bytecode.

use crate::error::{Fault, Trap};
use crate::machine::{operand_int, operand_text, operand_value, Frame, Vm};
use opal_common::{Instruction, Opcode, Value};
use std::cmp::Ordering;
use std::io::{BufRead, Write};

fn as_int(value: &Value) -> Result<i64, Trap> {
    match value {
        Value::Int(v) => Ok(*v),
        other => Err(Trap::TypeMismatch {
            expected: "int",
            found: other.type_name(),
        }),
    }
}

fn as_bool(value: &Value) -> Result<bool, Trap> {
    match value {
        Value::Bool(v) => Ok(*v),
        other => Err(Trap::TypeMismatch {
            expected: "bool",
            found: other.type_name(),
        }),
    }
}

fn as_text(value: &Value) -> Result<&str, Trap> {
    match value {
        Value::Text(v) => Ok(v),
        other => Err(Trap::TypeMismatch {
            expected: "string",
            found: other.type_name(),
        }),
    }
}

fn as_object_id(value: &Value) -> Result<i64, Trap> {
    match value {
        Value::ObjectRef(id) => Ok(*id),
        other => Err(Trap::TypeMismatch {
            expected: "object reference",
            found: other.type_name(),
        }),
    }
}

/// Runtime equality: null equals only null, numbers compare by value,
/// object references by id.
fn values_equal(left: &Value, right: &Value) -> Result<bool, Trap> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Double(a), Value::Double(b)) => Ok(a == b),
        (Value::Text(a), Value::Text(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::ObjectRef(a), Value::ObjectRef(b)) => Ok(a == b),
        (left, right) => Err(Trap::TypeMismatch {
            expected: left.type_name(),
            found: right.type_name(),
        }),
    }
}

impl Vm {
    pub(crate) fn execute<R: BufRead, W: Write>(
        &mut self,
        instruction: &Instruction,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), Fault> {
        match instruction.opcode {
            Opcode::Push => {
                let value = operand_value(instruction)?.clone();
                self.push(value)?;
            }
            Opcode::Pop => {
                self.pop()?;
            }
            Opcode::Store => self.exec_store(operand_int(instruction)?)?,
            Opcode::Load => self.exec_load(operand_int(instruction)?)?,
            Opcode::Dup => {
                let value = self.pop()?;
                self.push(value.clone())?;
                self.push(value)?;
            }
            Opcode::Nop => {}

            Opcode::Add => self.exec_arith(|a, b| a.wrapping_add(b), |a, b| a + b)?,
            Opcode::Sub => self.exec_arith(|a, b| a.wrapping_sub(b), |a, b| a - b)?,
            Opcode::Mul => self.exec_arith(|a, b| a.wrapping_mul(b), |a, b| a * b)?,
            Opcode::Div => self.exec_div()?,
            Opcode::And => self.exec_logic(|a, b| a && b)?,
            Opcode::Or => self.exec_logic(|a, b| a || b)?,
            Opcode::Not => {
                let value = self.pop_not_null()?;
                let flipped = !as_bool(&value)?;
                self.push(Value::Bool(flipped))?;
            }

            Opcode::CmpLt => self.exec_compare(Ordering::is_lt)?,
            Opcode::CmpLe => self.exec_compare(Ordering::is_le)?,
            Opcode::CmpGt => self.exec_compare(Ordering::is_gt)?,
            Opcode::CmpGe => self.exec_compare(Ordering::is_ge)?,
            Opcode::CmpEq => self.exec_equality(false)?,
            Opcode::CmpNe => self.exec_equality(true)?,

            Opcode::Jmp => {
                let target = operand_int(instruction)?;
                self.frame_mut()?.pc = target;
            }
            Opcode::Jmpf => {
                let target = operand_int(instruction)?;
                let condition = self.pop()?;
                let Value::Bool(keep_going) = condition else {
                    return Err(Trap::NonBooleanCondition.into());
                };
                if !keep_going {
                    self.frame_mut()?.pc = target;
                }
            }

            Opcode::Call => self.exec_call(operand_text(instruction)?.to_string())?,
            Opcode::Ret => self.exec_ret()?,

            Opcode::Write => {
                let value = self.pop()?;
                write!(output, "{value}")?;
            }
            Opcode::Read => {
                let mut line = String::new();
                input.read_line(&mut line)?;
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                self.push(Value::Text(line))?;
            }
            Opcode::SLen => {
                let value = self.pop_not_null()?;
                let length = as_text(&value)?.chars().count() as i64;
                self.push(Value::Int(length))?;
            }
            Opcode::ALen => {
                let value = self.pop_not_null()?;
                let id = as_object_id(&value)?;
                let array = self.array_heap.get(&id).ok_or(Trap::ArrayDoesNotExist)?;
                let length = array.len() as i64;
                self.push(Value::Int(length))?;
            }
            Opcode::GetC => self.exec_getc()?,
            Opcode::ToInt => self.exec_to_int()?,
            Opcode::ToDbl => self.exec_to_dbl()?,
            Opcode::ToStr => {
                let value = self.pop_not_null()?;
                self.push(Value::Text(value.to_string()))?;
            }
            Opcode::Concat => {
                let right = self.pop_not_null()?;
                let left = self.pop_not_null()?;
                let joined = format!("{}{}", as_text(&left)?, as_text(&right)?);
                self.push(Value::Text(joined))?;
            }

            Opcode::AllocS => {
                let id = self.next_object_id;
                self.next_object_id += 1;
                self.struct_heap.insert(id, Default::default());
                self.push(Value::ObjectRef(id))?;
            }
            Opcode::AllocA => self.exec_alloca()?,
            Opcode::AddF => {
                let name = operand_text(instruction)?.to_string();
                let value = self.pop_not_null()?;
                let id = as_object_id(&value)?;
                let fields = self
                    .struct_heap
                    .get_mut(&id)
                    .ok_or(Trap::StructDoesNotExist)?;
                fields.entry(name).or_insert(Value::Null);
            }
            Opcode::SetF => self.exec_setf(operand_text(instruction)?.to_string())?,
            Opcode::GetF => self.exec_getf(operand_text(instruction)?.to_string())?,
            Opcode::SetI => self.exec_seti()?,
            Opcode::GetI => self.exec_geti()?,
            Opcode::DelS => {
                let value = self.pop_not_null()?;
                let id = as_object_id(&value)?;
                if self.struct_heap.remove(&id).is_none() {
                    return Err(Trap::StructDoesNotExist.into());
                }
            }
            Opcode::DelAr => {
                let value = self.pop_not_null()?;
                let id = as_object_id(&value)?;
                if self.array_heap.remove(&id).is_none() {
                    return Err(Trap::ArrayDoesNotExist.into());
                }
            }
        }
        Ok(())
    }

    /// Slot writes may extend the slot vector by exactly one.
    fn exec_store(&mut self, slot: usize) -> Result<(), Trap> {
        let value = self.pop()?;
        let frame = self.frame_mut()?;
        match slot.cmp(&frame.slots.len()) {
            Ordering::Less => frame.slots[slot] = value,
            Ordering::Equal => frame.slots.push(value),
            Ordering::Greater => return Err(Trap::InvalidSlot { slot }),
        }
        Ok(())
    }

    fn exec_load(&mut self, slot: usize) -> Result<(), Trap> {
        let frame = self.frame_mut()?;
        let value = frame
            .slots
            .get(slot)
            .cloned()
            .ok_or(Trap::InvalidSlot { slot })?;
        self.push(value)
    }

    fn exec_arith(
        &mut self,
        ints: fn(i64, i64) -> i64,
        doubles: fn(f64, f64) -> f64,
    ) -> Result<(), Trap> {
        let right = self.pop_not_null()?;
        let left = self.pop_not_null()?;
        let result = match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => Value::Int(ints(*a, *b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(doubles(*a, *b)),
            _ => {
                return Err(Trap::TypeMismatch {
                    expected: left.type_name(),
                    found: right.type_name(),
                })
            }
        };
        self.push(result)
    }

    /// Division by zero traps for both ints and doubles.
    fn exec_div(&mut self) -> Result<(), Trap> {
        let right = self.pop_not_null()?;
        let left = self.pop_not_null()?;
        let result = match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => return Err(Trap::DivisionByZero),
            (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_div(*b)),
            (Value::Double(_), Value::Double(b)) if *b == 0.0 => {
                return Err(Trap::DivisionByZero)
            }
            (Value::Double(a), Value::Double(b)) => Value::Double(a / b),
            _ => {
                return Err(Trap::TypeMismatch {
                    expected: left.type_name(),
                    found: right.type_name(),
                })
            }
        };
        self.push(result)
    }

    fn exec_logic(&mut self, combine: fn(bool, bool) -> bool) -> Result<(), Trap> {
        let right = self.pop_not_null()?;
        let left = self.pop_not_null()?;
        let result = combine(as_bool(&left)?, as_bool(&right)?);
        self.push(Value::Bool(result))
    }

    fn exec_compare(&mut self, accept: fn(Ordering) -> bool) -> Result<(), Trap> {
        let right = self.pop_not_null()?;
        let left = self.pop_not_null()?;
        let ordering = match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => {
                return Err(Trap::TypeMismatch {
                    expected: left.type_name(),
                    found: right.type_name(),
                })
            }
        };
        // Incomparable doubles (NaN) compare false either way.
        let result = ordering.map(accept).unwrap_or(false);
        self.push(Value::Bool(result))
    }

    /// CMPEQ and CMPNE have no null guard: null tests are how programs
    /// probe optional values.
    fn exec_equality(&mut self, negate: bool) -> Result<(), Trap> {
        let right = self.pop()?;
        let left = self.pop()?;
        let equal = values_equal(&left, &right)?;
        self.push(Value::Bool(equal != negate))
    }

    /// Arguments move from the caller's stack to the callee's, reversed
    /// so STORE(0), STORE(1), ... recover source order.
    fn exec_call(&mut self, name: String) -> Result<(), Trap> {
        let function = self
            .program
            .functions
            .iter()
            .position(|f| f.name == name)
            .ok_or(Trap::UndefinedFunction { name })?;
        let param_count = self.program.functions[function].param_count;
        let mut callee = Frame::new(function);
        for _ in 0..param_count {
            let argument = self.pop()?;
            callee.stack.push(argument);
        }
        self.call_stack.push(callee);
        Ok(())
    }

    fn exec_ret(&mut self) -> Result<(), Trap> {
        let value = self.pop()?;
        self.call_stack.pop();
        if !self.call_stack.is_empty() {
            self.push(value)?;
        }
        Ok(())
    }

    /// `get(index, string)` evaluates left to right, so the string is
    /// on top of the stack.
    fn exec_getc(&mut self) -> Result<(), Trap> {
        let text_value = self.pop_not_null()?;
        let index_value = self.pop_not_null()?;
        let text = as_text(&text_value)?;
        let index = as_int(&index_value)?;
        if index < 0 {
            return Err(Trap::OutOfBoundsStringIndex);
        }
        let ch = text
            .chars()
            .nth(index as usize)
            .ok_or(Trap::OutOfBoundsStringIndex)?;
        self.push(Value::Text(ch.to_string()))
    }

    fn exec_to_int(&mut self) -> Result<(), Trap> {
        let value = self.pop_not_null()?;
        let converted = match &value {
            Value::Double(v) => *v as i64,
            Value::Text(v) => v.trim().parse().map_err(|_| Trap::CannotConvertToInt)?,
            other => {
                return Err(Trap::TypeMismatch {
                    expected: "double or string",
                    found: other.type_name(),
                })
            }
        };
        self.push(Value::Int(converted))
    }

    fn exec_to_dbl(&mut self) -> Result<(), Trap> {
        let value = self.pop_not_null()?;
        let converted = match &value {
            Value::Int(v) => *v as f64,
            Value::Text(v) => v.trim().parse().map_err(|_| Trap::CannotConvertToDouble)?,
            other => {
                return Err(Trap::TypeMismatch {
                    expected: "int or string",
                    found: other.type_name(),
                })
            }
        };
        self.push(Value::Double(converted))
    }

    /// Pops the fill value, then the size. A negative size traps.
    fn exec_alloca(&mut self) -> Result<(), Trap> {
        let fill = self.pop()?;
        let size_value = self.pop_not_null()?;
        let size = as_int(&size_value)?;
        if size < 0 {
            return Err(Trap::InvalidArraySize);
        }
        let id = self.next_object_id;
        self.next_object_id += 1;
        self.array_heap.insert(id, vec![fill; size as usize]);
        self.push(Value::ObjectRef(id))
    }

    /// The stored value may be null; only the object id is guarded.
    fn exec_setf(&mut self, name: String) -> Result<(), Trap> {
        let value = self.pop()?;
        let id_value = self.pop_not_null()?;
        let id = as_object_id(&id_value)?;
        let fields = self
            .struct_heap
            .get_mut(&id)
            .ok_or(Trap::StructDoesNotExist)?;
        let field = fields
            .get_mut(&name)
            .ok_or(Trap::UndefinedField { name })?;
        *field = value;
        Ok(())
    }

    fn exec_getf(&mut self, name: String) -> Result<(), Trap> {
        let id_value = self.pop_not_null()?;
        let id = as_object_id(&id_value)?;
        let fields = self.struct_heap.get(&id).ok_or(Trap::StructDoesNotExist)?;
        let value = fields
            .get(&name)
            .cloned()
            .ok_or(Trap::UndefinedField { name })?;
        self.push(value)
    }

    fn exec_seti(&mut self) -> Result<(), Trap> {
        let value = self.pop_not_null()?;
        let index_value = self.pop_not_null()?;
        let id_value = self.pop_not_null()?;
        let index = as_int(&index_value)?;
        let id = as_object_id(&id_value)?;
        let array = self
            .array_heap
            .get_mut(&id)
            .ok_or(Trap::ArrayDoesNotExist)?;
        if index < 0 || index as usize >= array.len() {
            return Err(Trap::OutOfBoundsArrayIndex);
        }
        array[index as usize] = value;
        Ok(())
    }

    fn exec_geti(&mut self) -> Result<(), Trap> {
        let index_value = self.pop_not_null()?;
        let id_value = self.pop_not_null()?;
        let index = as_int(&index_value)?;
        let id = as_object_id(&id_value)?;
        let array = self.array_heap.get(&id).ok_or(Trap::ArrayDoesNotExist)?;
        if index < 0 {
            return Err(Trap::OutOfBoundsArrayIndex);
        }
        let value = array
            .get(index as usize)
            .cloned()
            .ok_or(Trap::OutOfBoundsArrayIndex)?;
        self.push(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use opal_common::{FunctionInfo, Program};

    fn run_main(instructions: Vec<Instruction>) -> Result<String, RuntimeError> {
        let mut program = Program::new();
        program.add(FunctionInfo {
            name: "main".to_string(),
            param_count: 0,
            instructions,
        });
        let mut out = Vec::new();
        Vm::new(program).run_with(&b""[..], &mut out)?;
        Ok(String::from_utf8(out).unwrap_or_default())
    }

    fn trap_of(result: Result<String, RuntimeError>) -> Trap {
        match result.unwrap_err() {
            RuntimeError::Trap { kind, .. } => kind,
            other => panic!("expected trap, got {other:?}"),
        }
    }

    fn halt(mut instructions: Vec<Instruction>) -> Vec<Instruction> {
        instructions.push(Instruction::push(Value::Null));
        instructions.push(Instruction::ret());
        instructions
    }

    #[test]
    fn arithmetic_pops_right_operand_first() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Int(10)),
            Instruction::push(Value::Int(3)),
            Instruction::sub(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "7");
    }

    #[test]
    fn integer_division_truncates_and_guards_zero() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Int(7)),
            Instruction::push(Value::Int(2)),
            Instruction::div(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "3");
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Int(1)),
            Instruction::push(Value::Int(0)),
            Instruction::div(),
        ])));
        assert_eq!(trap, Trap::DivisionByZero);
    }

    #[test]
    fn double_division_by_zero_traps() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Double(1.0)),
            Instruction::push(Value::Double(0.0)),
            Instruction::div(),
        ])));
        assert_eq!(trap, Trap::DivisionByZero);
    }

    #[test]
    fn null_guards_on_arithmetic() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Null),
            Instruction::push(Value::Int(1)),
            Instruction::add(),
        ])));
        assert_eq!(trap, Trap::NullReference);
    }

    #[test]
    fn equality_allows_null() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Null),
            Instruction::push(Value::Null),
            Instruction::cmpeq(),
            Instruction::write(),
            Instruction::push(Value::Int(1)),
            Instruction::push(Value::Null),
            Instruction::cmpne(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "truetrue");
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Text("apple".to_string())),
            Instruction::push(Value::Text("banana".to_string())),
            Instruction::cmplt(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "true");
    }

    #[test]
    fn jmpf_requires_bool() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Int(1)),
            Instruction::jmpf(3),
        ])));
        assert_eq!(trap, Trap::NonBooleanCondition);
    }

    #[test]
    fn store_rejects_slot_gaps() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Int(1)),
            Instruction::store(5),
        ])));
        assert_eq!(trap, Trap::InvalidSlot { slot: 5 });
    }

    #[test]
    fn getc_pops_string_then_index() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Int(1)),
            Instruction::push(Value::Text("abc".to_string())),
            Instruction::getc(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "b");
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Int(3)),
            Instruction::push(Value::Text("abc".to_string())),
            Instruction::getc(),
        ])));
        assert_eq!(trap, Trap::OutOfBoundsStringIndex);
    }

    #[test]
    fn conversions() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Text("42".to_string())),
            Instruction::to_int(),
            Instruction::write(),
            Instruction::push(Value::Double(3.9)),
            Instruction::to_int(),
            Instruction::write(),
            Instruction::push(Value::Int(5)),
            Instruction::to_dbl(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "4235.0");
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Text("forty-two".to_string())),
            Instruction::to_int(),
        ])));
        assert_eq!(trap, Trap::CannotConvertToInt);
    }

    #[test]
    fn struct_lifecycle() {
        // Allocate, add a field, set it, read it back.
        let out = run_main(halt(vec![
            Instruction::allocs(),
            Instruction::dup(),
            Instruction::addf("x"),
            Instruction::dup(),
            Instruction::push(Value::Int(9)),
            Instruction::setf("x"),
            Instruction::getf("x"),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "9");
    }

    #[test]
    fn deleted_struct_access_traps() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::allocs(),
            Instruction::dup(),
            Instruction::addf("x"),
            Instruction::dup(),
            Instruction::dels(),
            Instruction::getf("x"),
        ])));
        assert_eq!(trap, Trap::StructDoesNotExist);
    }

    #[test]
    fn double_delete_traps() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::allocs(),
            Instruction::dup(),
            Instruction::dels(),
            Instruction::dels(),
        ])));
        assert_eq!(trap, Trap::StructDoesNotExist);
    }

    #[test]
    fn setf_requires_existing_field() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::allocs(),
            Instruction::push(Value::Int(1)),
            Instruction::setf("ghost"),
        ])));
        assert_eq!(
            trap,
            Trap::UndefinedField {
                name: "ghost".to_string()
            }
        );
    }

    #[test]
    fn array_lifecycle_and_bounds() {
        let out = run_main(halt(vec![
            Instruction::push(Value::Int(3)),
            Instruction::push(Value::Bool(false)),
            Instruction::alloca(),
            Instruction::dup(),
            Instruction::push(Value::Int(0)),
            Instruction::geti(),
            Instruction::write(),
            Instruction::push(Value::Int(3)),
            Instruction::geti(),
        ]));
        match out {
            Err(RuntimeError::Trap { kind, .. }) => {
                assert_eq!(kind, Trap::OutOfBoundsArrayIndex);
            }
            other => panic!("expected trap, got {other:?}"),
        }
    }

    #[test]
    fn negative_array_size_traps() {
        let trap = trap_of(run_main(halt(vec![
            Instruction::push(Value::Int(-1)),
            Instruction::push(Value::Null),
            Instruction::alloca(),
        ])));
        assert_eq!(trap, Trap::InvalidArraySize);
    }

    #[test]
    fn object_ids_are_monotonic_across_heaps() {
        // A struct then an array: ids 1 and 2; deleting neither reuses.
        let out = run_main(halt(vec![
            Instruction::allocs(),
            Instruction::write(),
            Instruction::push(Value::Int(1)),
            Instruction::push(Value::Null),
            Instruction::alloca(),
            Instruction::write(),
            Instruction::allocs(),
            Instruction::dup(),
            Instruction::dels(),
            Instruction::write(),
        ]))
        .unwrap();
        assert_eq!(out, "obj(1)obj(2)obj(3)");
    }

    #[test]
    fn call_moves_arguments_in_order() {
        let mut program = Program::new();
        program.add(FunctionInfo {
            name: "main".to_string(),
            param_count: 0,
            instructions: vec![
                Instruction::push(Value::Int(10)),
                Instruction::push(Value::Int(3)),
                Instruction::call("sub2"),
                Instruction::write(),
                Instruction::push(Value::Null),
                Instruction::ret(),
            ],
        });
        program.add(FunctionInfo {
            name: "sub2".to_string(),
            param_count: 2,
            instructions: vec![
                Instruction::store(0),
                Instruction::store(1),
                Instruction::load(0),
                Instruction::load(1),
                Instruction::sub(),
                Instruction::ret(),
            ],
        });
        let mut out = Vec::new();
        Vm::new(program).run_with(&b""[..], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7");
    }

    #[test]
    fn read_strips_line_ending() {
        let mut program = Program::new();
        program.add(FunctionInfo {
            name: "main".to_string(),
            param_count: 0,
            instructions: vec![
                Instruction::read(),
                Instruction::write(),
                Instruction::read(),
                Instruction::write(),
                Instruction::push(Value::Null),
                Instruction::ret(),
            ],
        });
        let mut out = Vec::new();
        Vm::new(program)
            .run_with(&b"first\r\nsecond"[..], &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "firstsecond");
    }
}
