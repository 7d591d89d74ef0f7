//! The six-digit puzzle sequence.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::DigitSequenceError;

/// Number of digits in every puzzle.
pub const DIGIT_COUNT: usize = 6;

/// Six digits, each 1–9, in the order a solution must use them.
///
/// Displays and serializes as a plain six-character string (`"119999"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DigitSequence(pub(crate) [u8; DIGIT_COUNT]);

impl DigitSequence {
    /// Builds a sequence from raw digit values.
    ///
    /// # Errors
    /// Returns [`DigitSequenceError::InvalidDigit`] for any value outside 1–9.
    pub fn new(digits: [u8; DIGIT_COUNT]) -> Result<Self, DigitSequenceError> {
        if let Some(&bad) = digits.iter().find(|d| !(1..=9).contains(*d)) {
            let shown = char::from_digit(u32::from(bad), 10).unwrap_or('?');
            return Err(DigitSequenceError::InvalidDigit(shown));
        }
        Ok(Self(digits))
    }

    /// Draws six digits uniformly from 1–9.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(std::array::from_fn(|_| rng.random_range(1..=9)))
    }

    pub fn digits(&self) -> [u8; DIGIT_COUNT] {
        self.0
    }

    /// Whether `text` uses exactly this sequence's digits, in order.
    ///
    /// Every ASCII digit in `text` must equal the next unconsumed puzzle
    /// digit; anything that is not a digit is skipped. Multi-digit numbers
    /// are fine (`"11"` consumes two puzzle digits) but a digit may not be
    /// skipped, repeated, or reordered.
    pub fn matches_submission(&self, text: &str) -> bool {
        let mut submitted = text
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0');

        for expected in self.0 {
            if submitted.next() != Some(expected) {
                return false;
            }
        }
        submitted.next().is_none()
    }
}

impl fmt::Display for DigitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.0 {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl FromStr for DigitSequence {
    type Err = DigitSequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != DIGIT_COUNT {
            return Err(DigitSequenceError::WrongLength(count));
        }

        let mut digits = [0u8; DIGIT_COUNT];
        for (slot, c) in digits.iter_mut().zip(s.chars()) {
            *slot = match c.to_digit(10) {
                Some(d @ 1..=9) => d as u8,
                _ => return Err(DigitSequenceError::InvalidDigit(c)),
            };
        }
        Ok(Self(digits))
    }
}

impl TryFrom<String> for DigitSequence {
    type Error = DigitSequenceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DigitSequence> for String {
    fn from(seq: DigitSequence) -> Self {
        seq.to_string()
    }
}
