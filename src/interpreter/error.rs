use crate::ast::{InfixOperator, PrefixOperator};
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::fmt;

/// An error recorded by the parser. The parser accumulates these instead of
/// aborting, so a single source text yields a full report.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserError {
    UnexpectedToken { expected: TokenKind, found: Token },
    InvalidPrefixToken { found: Token },
    InvalidIntegerLiteral { literal: String },
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::UnexpectedToken { expected, found } => write!(
                f,
                "unexpected token of type \"{}\" with literal \"{}\", expected token of type \"{}\"",
                found.kind, found.literal, expected
            ),
            ParserError::InvalidPrefixToken { found } => {
                write!(f, "token \"{}\" cannot appear in prefix position", found.kind)
            }
            ParserError::InvalidIntegerLiteral { literal } => {
                write!(f, "could not parse \"{}\" as integer", literal)
            }
        }
    }
}

impl std::error::Error for ParserError {}

/// A runtime error raised during evaluation. Propagation through the
/// evaluator is by early return: the enclosing statement list, operand
/// chain or argument list stops at the first error.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },
    UnknownInfixOperator {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    TypeMismatch {
        left: &'static str,
        operator: InfixOperator,
        right: &'static str,
    },
    UnknownIdentifier {
        name: String,
    },
    NotCallable {
        actual: &'static str,
    },
    WrongArgumentCount {
        expected: usize,
        got: usize,
    },
    WrongBuiltinArgumentCount {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    BuiltinArgumentType {
        index: usize,
        name: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    DivisionByZero,
}

impl RuntimeError {
    pub fn unknown_prefix_operator(operator: PrefixOperator, operand: &Value) -> Self {
        Self::UnknownPrefixOperator {
            operator,
            operand: operand.type_tag(),
        }
    }

    pub fn unknown_infix_operator(left: &Value, operator: InfixOperator, right: &Value) -> Self {
        Self::UnknownInfixOperator {
            left: left.type_tag(),
            operator,
            right: right.type_tag(),
        }
    }

    pub fn type_mismatch(left: &Value, operator: InfixOperator, right: &Value) -> Self {
        Self::TypeMismatch {
            left: left.type_tag(),
            operator,
            right: right.type_tag(),
        }
    }

    pub fn unknown_identifier(name: impl Into<String>) -> Self {
        Self::UnknownIdentifier { name: name.into() }
    }

    pub fn not_callable(callee: &Value) -> Self {
        Self::NotCallable {
            actual: callee.type_tag(),
        }
    }

    pub fn builtin_argument_type(
        index: usize,
        name: &'static str,
        expected: &'static str,
        got: &Value,
    ) -> Self {
        Self::BuiltinArgumentType {
            index,
            name,
            expected,
            got: got.type_tag(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnknownPrefixOperator { operator, operand } => {
                write!(f, "unknown operator: {}{}", operator, operand)
            }
            RuntimeError::UnknownInfixOperator {
                left,
                operator,
                right,
            } => write!(f, "unknown operator: {} {} {}", left, operator, right),
            RuntimeError::TypeMismatch {
                left,
                operator,
                right,
            } => write!(f, "type mismatch: {} {} {}", left, operator, right),
            RuntimeError::UnknownIdentifier { name } => {
                write!(f, "unknown identifier: {}", name)
            }
            RuntimeError::NotCallable { actual } => {
                write!(f, "cannot call expression of type: {}", actual)
            }
            RuntimeError::WrongArgumentCount { expected, got } => {
                write!(f, "function expects {} arguments. got={}", expected, got)
            }
            RuntimeError::WrongBuiltinArgumentCount {
                name,
                expected,
                got,
            } => write!(
                f,
                "function \"{}\" expects {} arguments. got={}",
                name, expected, got
            ),
            RuntimeError::BuiltinArgumentType {
                index,
                name,
                expected,
                got,
            } => write!(
                f,
                "argument {} of \"{}\" must be of type {}. got={}",
                index, name, expected, got
            ),
            RuntimeError::DivisionByZero => f.write_str("division by zero"),
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_error_messages() {
        let error = ParserError::UnexpectedToken {
            expected: TokenKind::Assign,
            found: Token::new(TokenKind::Dash, "-"),
        };
        assert_eq!(
            error.to_string(),
            "unexpected token of type \"-\" with literal \"-\", expected token of type \"=\""
        );

        let error = ParserError::InvalidPrefixToken {
            found: Token::new(TokenKind::Rbracket, "]"),
        };
        assert_eq!(
            error.to_string(),
            "token \"]\" cannot appear in prefix position"
        );
    }

    #[test]
    fn test_runtime_error_messages() {
        let error =
            RuntimeError::type_mismatch(&Value::Integer(5), InfixOperator::Plus, &Value::TRUE);
        assert_eq!(error.to_string(), "type mismatch: @int@ + @bool@");

        let error = RuntimeError::unknown_prefix_operator(PrefixOperator::Dash, &Value::TRUE);
        assert_eq!(error.to_string(), "unknown operator: -@bool@");

        let error = RuntimeError::unknown_identifier("foobar");
        assert_eq!(error.to_string(), "unknown identifier: foobar");

        let error = RuntimeError::WrongArgumentCount {
            expected: 2,
            got: 1,
        };
        assert_eq!(error.to_string(), "function expects 2 arguments. got=1");

        let error = RuntimeError::WrongBuiltinArgumentCount {
            name: "len",
            expected: 1,
            got: 3,
        };
        assert_eq!(
            error.to_string(),
            "function \"len\" expects 1 arguments. got=3"
        );
    }
}
