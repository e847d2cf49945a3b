use std::fmt;
use std::rc::Rc;

use crate::ast::{BlockStatement, Identifier};
use crate::interpreter::environment::Environment;
use crate::interpreter::error::RuntimeError;

/// A runtime Monkey value.
///
/// Booleans and null have exactly one canonical value each ([`Value::TRUE`],
/// [`Value::FALSE`], [`Value::NULL`]); the evaluator only ever hands out
/// those, so comparing them structurally is the same as comparing the
/// shared singletons of the reference implementation by identity.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Value {
    pub const NULL: Value = Value::Null;
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);

    pub fn from_native_bool(value: bool) -> Value {
        if value { Value::TRUE } else { Value::FALSE }
    }

    /// The delimiter-wrapped type tag used in runtime error messages.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "@null@",
            Value::Integer(_) => "@int@",
            Value::Boolean(_) => "@bool@",
            Value::String(_) => "@string@",
            Value::Function(_) => "@function@",
            Value::Builtin(_) => "@builtin@",
        }
    }

    /// Truthiness as used by `!` and `if`: null and false are falsy, every
    /// other value is truthy, including integer 0.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(value) => *value,
            _ => true,
        }
    }

    /// The user-visible string representation printed by the REPL.
    pub fn inspect(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Integer(value) => value.to_string(),
            Value::Boolean(value) => value.to_string(),
            Value::String(value) => value.to_string(),
            Value::Function(function) => {
                let params: Vec<String> =
                    function.parameters.iter().map(ToString::to_string).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), function.body)
            }
            Value::Builtin(_) => "fn(...args) { internal code }".to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(left), Value::Integer(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            (Value::Builtin(left), Value::Builtin(right)) => left.name == right.name,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

/// A user-defined function value: the literal's parameters and body plus the
/// environment that was current when the literal was evaluated. The
/// environment handle is shared, so bindings added to the defining scope
/// after the fact remain visible to the closure.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Environment,
}

pub type BuiltinFn = fn(&[Value]) -> Result<Value, RuntimeError>;

/// An entry of the process-wide builtin table.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}
