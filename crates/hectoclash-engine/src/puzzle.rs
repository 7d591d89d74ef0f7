//! Puzzle generation: brute-force solving and random digit draws.
//!
//! [`Puzzle::solve`] enumerates every way of inserting one symbol from
//! `+ - * / ^ ( )` (or nothing) before each digit and keeps the candidates
//! that evaluate to exactly 100. That is at most 8^6 = 262 144 candidates,
//! cheap enough to run for every new room on the blocking pool.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{DIGIT_COUNT, DigitSequence, verify};

/// How many random sequences [`generate`] tries before using a fallback.
pub const MAX_ATTEMPTS: usize = 100;

/// Sequences known to have no solution under the enumeration.
const EXCLUDED: [[u8; DIGIT_COUNT]; 6] = [
    [1, 1, 2, 1, 1, 7],
    [1, 1, 5, 1, 1, 7],
    [1, 1, 7, 1, 1, 5],
    [1, 7, 8, 1, 1, 7],
    [7, 1, 1, 1, 1, 7],
    [1, 1, 1, 7, 1, 1],
];

/// Sequences with at least one solution, used when every draw failed.
pub const FALLBACKS: [DigitSequence; 5] = [
    DigitSequence([1, 1, 9, 9, 9, 9]),
    DigitSequence([9, 9, 9, 5, 4, 1]),
    DigitSequence([4, 7, 2, 3, 1, 9]),
    DigitSequence([3, 2, 7, 9, 2, 4]),
    DigitSequence([2, 3, 4, 5, 6, 8]),
];

/// What can be inserted before each digit.
const INSERTIONS: [&str; 8] = ["+", "-", "*", "/", "^", "(", ")", ""];

/// A digit sequence plus every solution the enumeration found for it.
///
/// Created once per room and never mutated. Serialized as
/// `{"problem": "119999", "solutions": [...]}` for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    #[serde(rename = "problem")]
    pub digits: DigitSequence,
    pub solutions: Vec<String>,
}

impl Puzzle {
    /// Solves `digits` by exhaustive enumeration.
    pub fn solve(digits: DigitSequence) -> Self {
        let mut solutions = Vec::new();
        let mut buf = String::with_capacity(DIGIT_COUNT * 2);
        search(&digits.digits(), 0, &mut buf, &mut solutions);
        Self { digits, solutions }
    }

    /// Builds a puzzle from a known solution list without solving.
    pub fn with_solutions(digits: DigitSequence, solutions: Vec<String>) -> Self {
        Self { digits, solutions }
    }

    pub fn is_solvable(&self) -> bool {
        !self.solutions.is_empty()
    }
}

/// Depth-first walk over insertion choices. `balance` counts open
/// parentheses and a branch that would drive it negative is cut.
fn search(digits: &[u8], balance: usize, buf: &mut String, out: &mut Vec<String>) {
    let Some((&digit, rest)) = digits.split_first() else {
        if balance == 0 && verify(buf) == Ok(true) {
            out.push(buf.clone());
        }
        return;
    };

    for insertion in INSERTIONS {
        let next_balance = match insertion {
            "(" => balance + 1,
            ")" => match balance.checked_sub(1) {
                Some(b) => b,
                None => continue,
            },
            _ => balance,
        };

        let mark = buf.len();
        buf.push_str(insertion);
        buf.push(char::from(b'0' + digit));
        search(rest, next_balance, buf, out);
        buf.truncate(mark);
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Supplies puzzles to the hub.
///
/// Called on the blocking thread pool, so implementations may do heavy
/// work. Tests pin a fixed puzzle with their own implementation.
pub trait PuzzleSource: Send + Sync + 'static {
    fn next_puzzle(&self) -> Puzzle;
}

/// Random, always-solvable puzzles from [`generate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPuzzles;

impl PuzzleSource for RandomPuzzles {
    fn next_puzzle(&self) -> Puzzle {
        generate(&mut rand::rng())
    }
}

/// Draws random sequences until one is solvable.
///
/// Skips the known-unsolvable sequences and anything the enumeration finds
/// no solution for. After [`MAX_ATTEMPTS`] misses, returns one of the
/// [`FALLBACKS`], so the result always has at least one solution.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Puzzle {
    for attempt in 1..=MAX_ATTEMPTS {
        let digits = DigitSequence::random(rng);
        if EXCLUDED.contains(&digits.digits()) {
            continue;
        }

        let puzzle = Puzzle::solve(digits);
        if puzzle.is_solvable() {
            debug!(
                %digits,
                attempt,
                solutions = puzzle.solutions.len(),
                "puzzle generated"
            );
            return puzzle;
        }
    }

    let digits = FALLBACKS[rng.random_range(0..FALLBACKS.len())];
    warn!(%digits, "no solvable sequence drawn, using fallback puzzle");
    Puzzle::solve(digits)
}
