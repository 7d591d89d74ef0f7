//! Expression engine for Hectoclash.
//!
//! A submission is plain text such as `1+1*9*9+9+9`. Computing it goes
//! through three stages, each in its own module:
//!
//! ```text
//! text ──tokenize──▶ tokens ──to_postfix──▶ postfix ──evaluate──▶ f64
//! ```
//!
//! [`calculate`] runs the whole pipeline and [`verify`] compares the result
//! with the target of 100. The crate also owns the puzzle side of the
//! game: [`DigitSequence`], the brute-force [`Puzzle::solve`], and the
//! [`PuzzleSource`] seam the room hub draws puzzles from.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod digits;
mod error;
mod postfix;
mod puzzle;
mod token;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use digits::{DIGIT_COUNT, DigitSequence};
pub use error::{DigitSequenceError, EvaluationError, ExpressionError, ValidationError};
pub use postfix::{evaluate, to_postfix};
pub use puzzle::{FALLBACKS, MAX_ATTEMPTS, Puzzle, PuzzleSource, RandomPuzzles, generate};
pub use token::{Operator, Token, tokenize, validate};

/// The value every solution must reach.
pub const TARGET: f64 = 100.0;

/// Computes the value of an infix expression.
///
/// # Errors
/// Returns the first validation or evaluation failure; later stages are
/// not run.
pub fn calculate(expression: &str) -> Result<f64, ExpressionError> {
    let tokens = tokenize(expression)?;
    let postfix = to_postfix(&tokens)?;
    Ok(evaluate(&postfix)?)
}

/// Whether `expression` evaluates to exactly [`TARGET`].
///
/// The comparison is exact IEEE equality: `1/49*49*100` lands on
/// `99.99999999999999` and does not count.
///
/// # Errors
/// Propagates any error from [`calculate`].
pub fn verify(expression: &str) -> Result<bool, ExpressionError> {
    Ok(calculate(expression)? == TARGET)
}
