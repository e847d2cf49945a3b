use crate::value::Value;

/// Outcome of evaluating a statement or expression.
///
/// `Return` is how an inner `return` travels through enclosing blocks and
/// expressions; it is unwrapped exactly once, at the function-call boundary
/// or at the program's top level, and never observed outside the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    /// The statement produced nothing to show (a `let` binding).
    Next,
    /// An ordinary value.
    Value(Value),
    /// A `return` travelling outward, still wrapped.
    Return(Value),
}
