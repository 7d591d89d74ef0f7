//! Error types for the expression engine.
//!
//! Two families, matching the two stages that can reject an expression:
//! [`ValidationError`] for malformed syntax (caught while tokenizing or
//! reordering), and [`EvaluationError`] for expressions that parse but
//! cannot be computed. [`ExpressionError`] wraps both so callers of
//! [`calculate`](crate::calculate) handle a single type.
//!
//! The `Display` text of each variant is what a player sees when their
//! submission is rejected, so keep the messages short and concrete.

use crate::Operator;

/// Malformed expression syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The expression contained no tokens at all.
    #[error("empty expression")]
    Empty,

    /// A character that is not a digit, `.`, parenthesis, operator, or
    /// whitespace.
    #[error("invalid character in expression: {0}")]
    InvalidCharacter(char),

    /// Two numbers with nothing between them, e.g. `1 2`.
    #[error("missing operator between numbers: {0} and {1}")]
    MissingOperator(String, String),

    /// Two binary operators back to back, e.g. `1++1` or `2*/3`.
    #[error("adjacent operators: {0}{1}")]
    AdjacentOperators(Operator, Operator),

    /// The expression starts with a binary operator such as `*`.
    #[error("expression cannot start with a binary operator: {0}")]
    LeadingOperator(Operator),

    /// The expression ends with an operator.
    #[error("expression cannot end with an operator: {0}")]
    TrailingOperator(Operator),

    /// A `)` appeared with no open `(` to close.
    #[error("mismatched parentheses: too many closing parentheses")]
    UnmatchedClosingParen,

    /// At least one `(` was never closed.
    #[error("mismatched parentheses: unclosed opening parentheses")]
    UnclosedParen,

    /// The operator-precedence pass found a parenthesis with no partner.
    #[error("mismatched parentheses")]
    MismatchedParentheses,
}

/// An expression that parsed but could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// The divisor was exactly zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An operator was reached with fewer than two values on the stack.
    #[error("insufficient operands for operator {0}")]
    InsufficientOperands(Operator),

    /// Evaluation finished with something other than a single value.
    #[error("invalid expression: {0} values left after evaluation")]
    LeftoverOperands(usize),

    /// A number literal that is not a valid float (e.g. a lone `.`).
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// A parenthesis survived the conversion to postfix form.
    #[error("unexpected parenthesis in postfix expression")]
    StrayParenthesis,
}

/// Any failure while computing an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// The expression is syntactically invalid.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The expression is well-formed but cannot be computed.
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Errors from building a [`DigitSequence`](crate::DigitSequence).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigitSequenceError {
    /// Not exactly six digits.
    #[error("expected 6 digits, got {0}")]
    WrongLength(usize),

    /// A character or value outside 1–9.
    #[error("invalid puzzle digit: {0:?}")]
    InvalidDigit(char),
}
