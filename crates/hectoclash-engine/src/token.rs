//! Tokenizer: turns free-form expression text into a validated token list.
//!
//! Unary signs never reach later stages. A leading `+` (at the start or
//! right after `(`) is dropped, and a unary `-` is rewritten as
//! `-1 *`, so `-(2+3)` becomes `-1 * (2+3)`. The precedence pass and the
//! evaluator only ever see binary operators.

use std::fmt;

use crate::{ExpressionError, ValidationError};

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// Maps an operator symbol to its variant.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    /// The operator's symbol as written in an expression.
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }

    /// Binding strength: `+ -` = 1, `* /` = 2, `^` = 3.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 3,
        }
    }

    /// Only `^` groups right-to-left: `2^3^2` is `2^(3^2)`.
    pub fn is_right_associative(self) -> bool {
        matches!(self, Self::Pow)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// One lexical unit of an expression.
///
/// `Number` keeps the literal text (`"12"`, `"0.5"`, `"-1"`); it is parsed
/// to a float only during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(text) => f.write_str(text),
            Self::Operator(op) => write!(f, "{op}"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
        }
    }
}

/// What the tokenizer emitted last, used to tell unary signs from binary
/// operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    LeftParen,
    Operator,
    Operand,
}

// ---------------------------------------------------------------------------
// Tokenize + validate
// ---------------------------------------------------------------------------

/// Splits `expression` into tokens and validates their arrangement.
///
/// # Errors
/// Returns [`ExpressionError::Validation`] on an invalid character or any
/// rule checked by [`validate`].
pub fn tokenize(expression: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut prev = Prev::Start;
    let mut chars = expression.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => continue,

            '0'..='9' | '.' => {
                let mut end = start + 1;
                let mut seen_dot = c == '.';
                while let Some(&(i, next)) = chars.peek() {
                    let accept = next.is_ascii_digit() || (next == '.' && !seen_dot);
                    if !accept {
                        break;
                    }
                    seen_dot |= next == '.';
                    end = i + 1;
                    chars.next();
                }
                tokens.push(Token::Number(expression[start..end].to_string()));
                prev = Prev::Operand;
            }

            '(' => {
                tokens.push(Token::LeftParen);
                prev = Prev::LeftParen;
            }

            ')' => {
                tokens.push(Token::RightParen);
                prev = Prev::Operand;
            }

            _ => {
                let op = Operator::from_char(c)
                    .ok_or(ValidationError::InvalidCharacter(c))?;
                let sign_position =
                    matches!(prev, Prev::Start | Prev::LeftParen | Prev::Operator);

                match op {
                    Operator::Sub if sign_position => {
                        tokens.push(Token::Number("-1".to_string()));
                        tokens.push(Token::Operator(Operator::Mul));
                        prev = Prev::Operator;
                    }
                    // A plus after another operator is kept and rejected by
                    // validation as an adjacent operator.
                    Operator::Add if matches!(prev, Prev::Start | Prev::LeftParen) => {}
                    _ => {
                        tokens.push(Token::Operator(op));
                        prev = Prev::Operator;
                    }
                }
            }
        }
    }

    validate(&tokens)?;
    Ok(tokens)
}

/// Checks the structural rules a token list must satisfy before it can be
/// reordered: non-empty, no adjacent numbers or operators, no leading or
/// trailing operator, and balanced parentheses.
pub fn validate(tokens: &[Token]) -> Result<(), ValidationError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(ValidationError::Empty);
    };

    for pair in tokens.windows(2) {
        match (&pair[0], &pair[1]) {
            (Token::Number(a), Token::Number(b)) => {
                return Err(ValidationError::MissingOperator(a.clone(), b.clone()));
            }
            (Token::Operator(a), Token::Operator(b)) => {
                return Err(ValidationError::AdjacentOperators(*a, *b));
            }
            _ => {}
        }
    }

    if let Token::Operator(op) = first {
        return Err(ValidationError::LeadingOperator(*op));
    }
    if let Token::Operator(op) = last {
        return Err(ValidationError::TrailingOperator(*op));
    }

    let mut balance: usize = 0;
    for token in tokens {
        match token {
            Token::LeftParen => balance += 1,
            Token::RightParen => {
                balance = balance
                    .checked_sub(1)
                    .ok_or(ValidationError::UnmatchedClosingParen)?;
            }
            _ => {}
        }
    }
    if balance > 0 {
        return Err(ValidationError::UnclosedParen);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Token {
        Token::Number(text.to_string())
    }

    fn op(c: char) -> Token {
        Token::Operator(Operator::from_char(c).unwrap())
    }

    fn validation_error(expr: &str) -> ValidationError {
        match tokenize(expr) {
            Err(ExpressionError::Validation(e)) => e,
            other => panic!("expected validation error for {expr:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_tokenize_simple_expression() {
        let tokens = tokenize("1+2*3").unwrap();
        assert_eq!(tokens, vec![num("1"), op('+'), num("2"), op('*'), num("3")]);
    }

    #[test]
    fn test_tokenize_skips_whitespace() {
        let tokens = tokenize("  12 /\t4 ").unwrap();
        assert_eq!(tokens, vec![num("12"), op('/'), num("4")]);
    }

    #[test]
    fn test_tokenize_multi_digit_and_decimal_numbers() {
        let tokens = tokenize("123.45+0.5").unwrap();
        assert_eq!(tokens, vec![num("123.45"), op('+'), num("0.5")]);
    }

    #[test]
    fn test_tokenize_second_dot_starts_new_number() {
        // "1.2.3" is "1.2" followed by ".3", which is a missing operator.
        assert_eq!(
            validation_error("1.2.3"),
            ValidationError::MissingOperator("1.2".into(), ".3".into())
        );
    }

    #[test]
    fn test_tokenize_parentheses() {
        let tokens = tokenize("(1+2)*3").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                num("1"),
                op('+'),
                num("2"),
                Token::RightParen,
                op('*'),
                num("3"),
            ]
        );
    }

    #[test]
    fn test_unary_minus_at_start_becomes_negative_one_times() {
        let tokens = tokenize("-5+1").unwrap();
        assert_eq!(tokens, vec![num("-1"), op('*'), num("5"), op('+'), num("1")]);
    }

    #[test]
    fn test_unary_minus_after_paren_and_operator() {
        let tokens = tokenize("2*(-3)").unwrap();
        assert_eq!(
            tokens,
            vec![
                num("2"),
                op('*'),
                Token::LeftParen,
                num("-1"),
                op('*'),
                num("3"),
                Token::RightParen,
            ]
        );

        let tokens = tokenize("2*-3").unwrap();
        assert_eq!(tokens, vec![num("2"), op('*'), num("-1"), op('*'), num("3")]);
    }

    #[test]
    fn test_unary_plus_is_dropped() {
        assert_eq!(tokenize("+7").unwrap(), vec![num("7")]);
        assert_eq!(
            tokenize("(+7)").unwrap(),
            vec![Token::LeftParen, num("7"), Token::RightParen]
        );
    }

    #[test]
    fn test_plus_after_operator_is_adjacent_operator() {
        assert_eq!(
            validation_error("1++1*9*9+9+9"),
            ValidationError::AdjacentOperators(Operator::Add, Operator::Add)
        );
    }

    #[test]
    fn test_adjacent_binary_operators_rejected() {
        assert_eq!(
            validation_error("2*/3"),
            ValidationError::AdjacentOperators(Operator::Mul, Operator::Div)
        );
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(validation_error("1+x"), ValidationError::InvalidCharacter('x'));
        assert_eq!(validation_error("2%3"), ValidationError::InvalidCharacter('%'));
    }

    #[test]
    fn test_empty_and_blank_expressions() {
        assert_eq!(validation_error(""), ValidationError::Empty);
        assert_eq!(validation_error("   "), ValidationError::Empty);
    }

    #[test]
    fn test_adjacent_numbers_need_operator() {
        assert_eq!(
            validation_error("1 2"),
            ValidationError::MissingOperator("1".into(), "2".into())
        );
    }

    #[test]
    fn test_leading_binary_operator() {
        assert_eq!(
            validation_error("*5"),
            ValidationError::LeadingOperator(Operator::Mul)
        );
    }

    #[test]
    fn test_trailing_operator() {
        assert_eq!(
            validation_error("5+"),
            ValidationError::TrailingOperator(Operator::Add)
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(validation_error("(1+2"), ValidationError::UnclosedParen);
        assert_eq!(validation_error("1+2)"), ValidationError::UnmatchedClosingParen);
        assert_eq!(validation_error(")1+2("), ValidationError::UnmatchedClosingParen);
    }

    #[test]
    fn test_operator_properties() {
        assert!(Operator::Pow.precedence() > Operator::Mul.precedence());
        assert!(Operator::Mul.precedence() > Operator::Sub.precedence());
        assert_eq!(Operator::Add.precedence(), Operator::Sub.precedence());
        assert!(Operator::Pow.is_right_associative());
        assert!(!Operator::Div.is_right_associative());
    }

    #[test]
    fn test_token_display() {
        let rendered: String = tokenize("(1.5+2)^3")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, "(1.5+2)^3");
    }
}
