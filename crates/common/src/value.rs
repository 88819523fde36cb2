//! Runtime value representation for the Opal VM.
//!
//! Values live on the operand stack, in frame slots, and inside heap
//! objects. Struct and array objects themselves are *not* values; they
//! are held in the VM's heaps and referenced by [`Value::ObjectRef`].

/// Runtime value representation.
///
/// `Null` is a first-class value: any slot, field, or array element may
/// hold it, and most opcodes trap on it (see the VM's null guards).
#[derive(Debug, Clone)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// IEEE 754 64-bit float.
    Double(f64),
    /// Immutable text. Characters are represented as one-element strings.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// The null value.
    Null,
    /// Reference to a struct or array object by heap id.
    ObjectRef(i64),
}

// Doubles compare bitwise via to_bits(), so Value is well-behaved as a
// test assertion type (NaN == NaN when the bit patterns match). The VM's
// CMPEQ opcode compares doubles numerically and handles null separately.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::ObjectRef(a), Value::ObjectRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Short name of this value's runtime type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Text(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::ObjectRef(_) => "object reference",
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    /// The textual form produced by the WRITE opcode (and TOSTR).
    ///
    /// Doubles always carry a decimal point, so `3.0` prints as `3.0`
    /// rather than `3`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Value::Text(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Null => write!(f, "null"),
            Value::ObjectRef(id) => write!(f, "obj({id})"),
        }
    }
}
