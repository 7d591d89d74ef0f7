//! Operator-precedence reordering (shunting-yard) and the postfix stack
//! machine that computes the result.

use crate::{EvaluationError, Operator, Token, ValidationError};

impl Operator {
    /// Applies the operator to two operands.
    ///
    /// # Errors
    /// Returns [`EvaluationError::DivisionByZero`] when dividing by exactly
    /// zero. Every other combination produces a float, including `NaN` or
    /// infinities from `powf`.
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvaluationError> {
        Ok(match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => {
                if rhs == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                lhs / rhs
            }
            Self::Pow => lhs.powf(rhs),
        })
    }
}

/// Reorders an infix token list into postfix order.
///
/// The operator on top of the stack is popped while it binds tighter than
/// the incoming one, or equally tight when the incoming operator groups
/// left-to-right.
///
/// # Errors
/// Returns [`ValidationError::MismatchedParentheses`] for a `)` with no
/// matching `(` or a `(` left open at the end.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, ValidationError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token.clone()),

            Token::Operator(incoming) => {
                while let Some(&Token::Operator(top)) = stack.last() {
                    let pops = top.precedence() > incoming.precedence()
                        || (top.precedence() == incoming.precedence()
                            && !incoming.is_right_associative());
                    if !pops {
                        break;
                    }
                    output.push(Token::Operator(top));
                    stack.pop();
                }
                stack.push(token.clone());
            }

            Token::LeftParen => stack.push(Token::LeftParen),

            Token::RightParen => loop {
                match stack.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(ValidationError::MismatchedParentheses),
                }
            },
        }
    }

    while let Some(token) = stack.pop() {
        if token == Token::LeftParen {
            return Err(ValidationError::MismatchedParentheses);
        }
        output.push(token);
    }

    Ok(output)
}

/// Runs a postfix token list on an `f64` stack.
///
/// # Errors
/// See [`EvaluationError`]. A well-formed input leaves exactly one value.
pub fn evaluate(postfix: &[Token]) -> Result<f64, EvaluationError> {
    let mut stack: Vec<f64> = Vec::new();

    for token in postfix {
        match token {
            Token::Number(text) => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| EvaluationError::InvalidNumber(text.clone()))?;
                stack.push(value);
            }
            Token::Operator(op) => {
                let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                    return Err(EvaluationError::InsufficientOperands(*op));
                };
                stack.push(op.apply(lhs, rhs)?);
            }
            Token::LeftParen | Token::RightParen => {
                return Err(EvaluationError::StrayParenthesis);
            }
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        rest => Err(EvaluationError::LeftoverOperands(rest.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    fn postfix_text(expr: &str) -> String {
        let tokens = tokenize(expr).unwrap();
        to_postfix(&tokens)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn num(text: &str) -> Token {
        Token::Number(text.to_string())
    }

    #[test]
    fn test_precedence_ordering() {
        assert_eq!(postfix_text("1+2*3"), "1 2 3 * +");
        assert_eq!(postfix_text("1*2+3"), "1 2 * 3 +");
    }

    #[test]
    fn test_left_associative_operators() {
        assert_eq!(postfix_text("8-3-2"), "8 3 - 2 -");
        assert_eq!(postfix_text("8/4/2"), "8 4 / 2 /");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(postfix_text("2^3^2"), "2 3 2 ^ ^");
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(postfix_text("(1+2)*3"), "1 2 + 3 *");
    }

    #[test]
    fn test_to_postfix_mismatched_parentheses() {
        // Built by hand: `tokenize` would reject these first.
        let unopened = vec![num("1"), Token::RightParen];
        assert_eq!(
            to_postfix(&unopened),
            Err(ValidationError::MismatchedParentheses)
        );

        let unclosed = vec![Token::LeftParen, num("1")];
        assert_eq!(
            to_postfix(&unclosed),
            Err(ValidationError::MismatchedParentheses)
        );
    }

    #[test]
    fn test_evaluate_simple() {
        let postfix = vec![num("3"), num("4"), Token::Operator(Operator::Mul)];
        assert_eq!(evaluate(&postfix), Ok(12.0));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        let postfix = vec![num("1"), num("0"), Token::Operator(Operator::Div)];
        assert_eq!(evaluate(&postfix), Err(EvaluationError::DivisionByZero));
    }

    #[test]
    fn test_evaluate_insufficient_operands() {
        let postfix = vec![num("1"), Token::Operator(Operator::Add)];
        assert_eq!(
            evaluate(&postfix),
            Err(EvaluationError::InsufficientOperands(Operator::Add))
        );
    }

    #[test]
    fn test_evaluate_leftover_operands() {
        assert_eq!(
            evaluate(&[num("1"), num("2")]),
            Err(EvaluationError::LeftoverOperands(2))
        );
        assert_eq!(evaluate(&[]), Err(EvaluationError::LeftoverOperands(0)));
    }

    #[test]
    fn test_evaluate_invalid_number() {
        assert_eq!(
            evaluate(&[num(".")]),
            Err(EvaluationError::InvalidNumber(".".into()))
        );
    }

    #[test]
    fn test_evaluate_stray_parenthesis() {
        assert_eq!(
            evaluate(&[Token::LeftParen]),
            Err(EvaluationError::StrayParenthesis)
        );
    }

    #[test]
    fn test_apply_power_uses_float_exponent() {
        assert_eq!(Operator::Pow.apply(4.0, 0.5), Ok(2.0));
        assert_eq!(Operator::Pow.apply(2.0, -1.0), Ok(0.5));
    }
}
