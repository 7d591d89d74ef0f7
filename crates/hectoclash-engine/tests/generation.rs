//! Puzzle generation through the public API.

use hectoclash_engine::{
    DigitSequence, FALLBACKS, Puzzle, PuzzleSource, RandomPuzzles, generate, verify,
};

#[test]
fn test_every_fallback_is_solvable() {
    for digits in FALLBACKS {
        let puzzle = Puzzle::solve(digits);
        assert!(puzzle.is_solvable(), "fallback {digits} has no solution");
    }
}

#[test]
fn test_generated_puzzle_always_has_a_verified_solution() {
    let mut rng = rand::rng();
    let puzzle = generate(&mut rng);

    assert!(puzzle.is_solvable());
    let first = &puzzle.solutions[0];
    assert_eq!(verify(first), Ok(true));
    assert!(puzzle.digits.matches_submission(first));
}

#[test]
fn test_random_source_produces_solvable_puzzles() {
    let puzzle = RandomPuzzles.next_puzzle();
    assert!(puzzle.is_solvable());
}

#[test]
fn test_sequence_without_solution_is_not_used_as_fallback() {
    let digits: DigitSequence = "123456".parse().unwrap();
    assert!(!Puzzle::solve(digits).is_solvable());
    assert!(!FALLBACKS.contains(&digits));
}
