//! ELO ratings for finished duels.

/// Rating of a player with no recorded games.
pub const DEFAULT_RATING: i32 = 400;

/// Maximum points that change hands in one game.
pub const K_FACTOR: f64 = 32.0;

/// Probability that a player rated `rating` beats one rated `opponent`.
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(opponent - rating) / 400.0))
}

/// Ratings after `winner` beat `loser`, as `(winner, loser)`.
///
/// The winner gains what the loser gives up, rounded to whole points.
/// Neither rating drops below zero.
pub fn new_ratings(winner: i32, loser: i32) -> (i32, i32) {
    let delta = (K_FACTOR * (1.0 - expected_score(winner, loser))).round() as i32;
    ((winner + delta).max(0), (loser - delta).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratings_move_by_half_k() {
        assert_eq!(new_ratings(1200, 1200), (1216, 1184));
        assert_eq!(new_ratings(DEFAULT_RATING, DEFAULT_RATING), (416, 384));
    }

    #[test]
    fn test_upset_pays_more() {
        // 400 points apart: the underdog was expected to win ~9% of games.
        assert_eq!(new_ratings(1000, 1400), (1029, 1371));
    }

    #[test]
    fn test_expected_win_pays_less() {
        assert_eq!(new_ratings(1400, 1000), (1403, 997));
    }

    #[test]
    fn test_rating_floors_at_zero() {
        assert_eq!(new_ratings(0, 0), (16, 0));
        assert_eq!(new_ratings(20, 10), (36, 0));
    }

    #[test]
    fn test_expected_scores_sum_to_one() {
        let a = expected_score(1500, 1320);
        let b = expected_score(1320, 1500);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!(a > 0.5);
    }
}
