use super::error::RuntimeError;
use crate::value::{Builtin, Value};

/// The process-wide builtin table. Consulted by the evaluator when an
/// identifier misses the whole environment chain; user bindings therefore
/// shadow builtins.
pub fn lookup(name: &str) -> Option<Builtin> {
    match name {
        "len" => Some(Builtin {
            name: "len",
            func: builtin_len,
        }),
        _ => None,
    }
}

fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::WrongBuiltinArgumentCount {
            name: "len",
            expected: 1,
            got: args.len(),
        });
    }

    match &args[0] {
        Value::String(value) => Ok(Value::Integer(value.len() as i64)),
        other => Err(RuntimeError::builtin_argument_type(
            0, "len", "@string@", other,
        )),
    }
}
