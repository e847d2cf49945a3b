use monkey::Value;
use monkey::interpreter::parse_and_eval;

pub fn eval_ok(source: &str) -> Value {
    parse_and_eval(source)
        .unwrap_or_else(|error| panic!("eval of {:?} failed: {}", source, error))
        .unwrap_or_else(|| panic!("eval of {:?} produced no value", source))
}

pub fn eval_err(source: &str) -> String {
    parse_and_eval(source).expect_err("expected an error")
}

pub fn int(value: i64) -> Value {
    Value::Integer(value)
}

pub fn boolean(value: bool) -> Value {
    Value::from_native_bool(value)
}

pub fn string(value: &str) -> Value {
    Value::String(value.into())
}
