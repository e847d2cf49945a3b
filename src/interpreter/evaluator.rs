use super::builtins;
use super::control_flow::ControlFlow;
use super::environment::Environment;
use super::error::RuntimeError;
use super::parser::Parser;
use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lexer::Lexer;
use crate::value::{Function, Value};
use std::rc::Rc;

/// Unwraps an expression evaluation into a plain value. A `Return` flow
/// travelling outward is re-emitted immediately so it keeps climbing until
/// a function boundary (or the top level) unwraps it.
macro_rules! eval_value {
    ($self:ident, $expr:expr, $env:expr) => {
        match $self.eval_expression($expr, $env)? {
            ControlFlow::Value(value) => value,
            flow => return Ok(flow),
        }
    };
}

/// Recursive tree walker. Owns the session environment; each `run` call
/// evaluates a program against it, so a REPL keeps bindings across lines.
pub struct Interpreter {
    env: Environment,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Evaluates a program at the top level. A `return` reaching this far is
    /// unwrapped here, exactly once. `None` means the program ended on a
    /// statement with nothing to show (a trailing `let`, or no statements).
    pub fn run(&mut self, program: &Program) -> Result<Option<Value>, RuntimeError> {
        let env = self.env.clone();
        let mut last = None;

        for statement in &program.statements {
            match self.eval_statement(statement, &env)? {
                ControlFlow::Return(value) => return Ok(Some(value)),
                ControlFlow::Value(value) => last = Some(value),
                ControlFlow::Next => last = None,
            }
        }

        Ok(last)
    }

    fn eval_statement(
        &self,
        statement: &Statement,
        env: &Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        match statement {
            Statement::Let { name, value } => {
                let value = eval_value!(self, value, env);
                env.set(name.name.as_ref(), value);
                Ok(ControlFlow::Next)
            }
            Statement::Return { value } => {
                let value = eval_value!(self, value, env);
                Ok(ControlFlow::Return(value))
            }
            Statement::Expression { expression } => self.eval_expression(expression, env),
        }
    }

    /// Evaluates a block. Unlike `run`, a `Return` is passed on still
    /// wrapped so it can climb through enclosing blocks.
    fn eval_block(
        &self,
        block: &BlockStatement,
        env: &Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        let mut result = ControlFlow::Next;

        for statement in &block.statements {
            result = self.eval_statement(statement, env)?;
            if matches!(result, ControlFlow::Return(_)) {
                return Ok(result);
            }
        }

        Ok(result)
    }

    fn eval_expression(
        &self,
        expression: &Expression,
        env: &Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        match expression {
            Expression::IntegerLiteral(value) => Ok(ControlFlow::Value(Value::Integer(*value))),
            Expression::BooleanLiteral(value) => {
                Ok(ControlFlow::Value(Value::from_native_bool(*value)))
            }
            Expression::StringLiteral(value) => {
                Ok(ControlFlow::Value(Value::String(Rc::from(value.as_str()))))
            }
            Expression::Identifier(identifier) => {
                self.eval_identifier(identifier, env).map(ControlFlow::Value)
            }
            Expression::Prefix { operator, right } => {
                let operand = eval_value!(self, right, env);
                self.eval_prefix(*operator, operand).map(ControlFlow::Value)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = eval_value!(self, left, env);
                let right = eval_value!(self, right, env);
                self.eval_infix(*operator, left, right)
                    .map(ControlFlow::Value)
            }
            Expression::If {
                condition,
                then,
                otherwise,
            } => {
                let condition = eval_value!(self, condition, env);
                let flow = if condition.is_truthy() {
                    self.eval_block(then, env)?
                } else if let Some(otherwise) = otherwise {
                    self.eval_block(otherwise, env)?
                } else {
                    ControlFlow::Value(Value::NULL)
                };
                // A branch that bound nothing still has to produce a value
                // in expression position.
                Ok(match flow {
                    ControlFlow::Next => ControlFlow::Value(Value::NULL),
                    other => other,
                })
            }
            Expression::FunctionLiteral { parameters, body } => {
                Ok(ControlFlow::Value(Value::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: env.clone(),
                }))))
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let callee = eval_value!(self, function, env);
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(eval_value!(self, argument, env));
                }
                self.apply_function(callee, args).map(ControlFlow::Value)
            }
        }
    }

    fn eval_identifier(
        &self,
        identifier: &Identifier,
        env: &Environment,
    ) -> Result<Value, RuntimeError> {
        if let Some(value) = env.get(&identifier.name) {
            return Ok(value);
        }
        if let Some(builtin) = builtins::lookup(&identifier.name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(RuntimeError::unknown_identifier(identifier.name.as_ref()))
    }

    fn eval_prefix(&self, operator: PrefixOperator, operand: Value) -> Result<Value, RuntimeError> {
        match operator {
            PrefixOperator::Bang => Ok(Value::from_native_bool(!operand.is_truthy())),
            PrefixOperator::Dash => match operand {
                Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
                other => Err(RuntimeError::unknown_prefix_operator(operator, &other)),
            },
        }
    }

    fn eval_infix(
        &self,
        operator: InfixOperator,
        left: Value,
        right: Value,
    ) -> Result<Value, RuntimeError> {
        match (&left, &right) {
            (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(operator, *l, *r),
            (Value::String(l), Value::String(r)) => match operator {
                InfixOperator::Plus => {
                    let mut concatenated = String::with_capacity(l.len() + r.len());
                    concatenated.push_str(l);
                    concatenated.push_str(r);
                    Ok(Value::String(Rc::from(concatenated)))
                }
                _ => Err(RuntimeError::unknown_infix_operator(&left, operator, &right)),
            },
            _ if left.type_tag() != right.type_tag() => {
                Err(RuntimeError::type_mismatch(&left, operator, &right))
            }
            // Same-type operands past this point are booleans, nulls,
            // functions or builtins, where only (in)equality is defined.
            _ => match operator {
                InfixOperator::Eq => Ok(Value::from_native_bool(left == right)),
                InfixOperator::Neq => Ok(Value::from_native_bool(left != right)),
                _ => Err(RuntimeError::unknown_infix_operator(&left, operator, &right)),
            },
        }
    }

    fn apply_function(&self, callee: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                if args.len() != function.parameters.len() {
                    return Err(RuntimeError::WrongArgumentCount {
                        expected: function.parameters.len(),
                        got: args.len(),
                    });
                }

                let env = Environment::new_enclosed(&function.env);
                for (parameter, argument) in function.parameters.iter().zip(args) {
                    env.set(parameter.name.as_ref(), argument);
                }

                // The single unwrap of a `return` that escaped the body.
                match self.eval_block(&function.body, &env)? {
                    ControlFlow::Return(value) | ControlFlow::Value(value) => Ok(value),
                    ControlFlow::Next => Ok(Value::NULL),
                }
            }
            Value::Builtin(builtin) => (builtin.func)(&args),
            other => Err(RuntimeError::not_callable(&other)),
        }
    }
}

fn eval_integer_infix(operator: InfixOperator, left: i64, right: i64) -> Result<Value, RuntimeError> {
    let value = match operator {
        InfixOperator::Plus => left.wrapping_add(right),
        InfixOperator::Dash => left.wrapping_sub(right),
        InfixOperator::Asterisk => left.wrapping_mul(right),
        InfixOperator::Slash => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            left.wrapping_div(right)
        }
        InfixOperator::Lt => return Ok(Value::from_native_bool(left < right)),
        InfixOperator::Gt => return Ok(Value::from_native_bool(left > right)),
        InfixOperator::Eq => return Ok(Value::from_native_bool(left == right)),
        InfixOperator::Neq => return Ok(Value::from_native_bool(left != right)),
    };
    Ok(Value::Integer(value))
}

/// Convenience entry point used by the one-shot runner and the test
/// suites: lex, parse and evaluate a complete source text in a fresh
/// environment. Parse failures are joined into a single message; runtime
/// failures are formatted the way the REPL shows them.
pub fn parse_and_eval(source: &str) -> Result<Option<Value>, String> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        let messages: Vec<String> = parser.errors().iter().map(ToString::to_string).collect();
        return Err(messages.join("\n"));
    }

    let mut interpreter = Interpreter::new();
    interpreter
        .run(&program)
        .map_err(|error| format!("ERROR: {}", error))
}
