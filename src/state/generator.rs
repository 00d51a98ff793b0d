use rand::Rng;

use crate::planners::rl::DifficultyTier;
use crate::state::Grid;

/// Goal cells of balanced grids are raised to at least this value.
pub const GOAL_MIN_REWARD: i32 = 10;

pub struct GridGenerator;

impl GridGenerator {
    /// Every cell drawn independently and uniformly from `[min, max]`.
    ///
    /// # Panics
    ///
    /// Panics if a dimension is zero or `min > max`.
    pub fn generate_random<R: Rng + ?Sized>(
        rng: &mut R,
        rows: usize,
        cols: usize,
        min: i32,
        max: i32,
    ) -> Grid {
        assert!(min <= max, "value range is reversed: {min} > {max}");
        Grid::from_fn(rows, cols, |_, _| rng.random_range(min..=max))
    }

    /// Cells near the start and goal sample from a milder, narrower range;
    /// the centre of the grid samples the full `[min, max]` range. The start
    /// is forced non-negative and the goal to at least `GOAL_MIN_REWARD`.
    ///
    /// # Panics
    ///
    /// Panics if a dimension is zero or `min > max`.
    pub fn generate_balanced<R: Rng + ?Sized>(
        rng: &mut R,
        rows: usize,
        cols: usize,
        min: i32,
        max: i32,
        tier: DifficultyTier,
    ) -> Grid {
        assert!(min <= max, "value range is reversed: {min} > {max}");

        let last_r = rows.saturating_sub(1) as f64;
        let last_c = cols.saturating_sub(1) as f64;
        let half_diagonal = (last_r * last_r + last_c * last_c).sqrt() / 2.0;

        let grid = Grid::from_fn(rows, cols, |r, c| {
            let (r, c) = (r as f64, c as f64);
            let from_start = (r * r + c * c).sqrt();
            let from_goal = ((last_r - r).powi(2) + (last_c - c).powi(2)).sqrt();
            let factor = if half_diagonal > 0.0 {
                (from_start.min(from_goal) / half_diagonal).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let scale = 0.5 + 0.5 * factor;
            let lo = (min as f64 * scale) as i32;
            let hi = (max as f64 * scale) as i32;
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let mut value = rng.random_range(lo..=hi);

            if r == 0.0 && c == 0.0 {
                value = value.max(0);
            }
            if r == last_r && c == last_c {
                value = value.max(GOAL_MIN_REWARD);
            }
            value
        });

        let grid = grid.with_difficulty_label(tier);
        let analysis = grid.analysis();
        tracing::debug!(
            "Generated balanced {}x{} grid for {}: score {:.2}, {} negative cells",
            rows,
            cols,
            tier,
            analysis.difficulty_score,
            analysis.negative_count
        );
        grid
    }

    /// Balanced square grid using the tier's value range.
    pub fn for_tier<R: Rng + ?Sized>(rng: &mut R, tier: DifficultyTier, size: usize) -> Grid {
        let (min, max) = tier.value_range();
        Self::generate_balanced(rng, size, size, min, max, tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = GridGenerator::generate_random(&mut rng, 4, 6, -3, 3);
        assert_eq!((grid.rows(), grid.cols()), (4, 6));
        assert!(grid.analysis().min >= -3);
        assert!(grid.analysis().max <= 3);
        assert_eq!(grid.difficulty_label(), None);
    }

    #[test]
    fn test_random_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let grid = GridGenerator::generate_random(&mut rng, 2, 2, 5, 5);
        assert_eq!(grid.analysis().total, 20);
    }

    #[test]
    #[should_panic]
    fn test_reversed_range_panics() {
        let mut rng = StdRng::seed_from_u64(3);
        GridGenerator::generate_random(&mut rng, 2, 2, 5, -5);
    }

    #[test]
    fn test_balanced_start_and_goal() {
        let mut rng = StdRng::seed_from_u64(4);
        for size in 1..=8 {
            for _ in 0..20 {
                let grid = GridGenerator::generate_balanced(
                    &mut rng,
                    size,
                    size + 1,
                    -30,
                    5,
                    DifficultyTier::Master,
                );
                assert!(grid.value(0, 0) >= 0);
                assert!(grid.value(size - 1, size) >= GOAL_MIN_REWARD);
                assert_eq!(grid.difficulty_label(), Some(DifficultyTier::Master));
            }
        }
    }

    #[test]
    fn test_balanced_single_cell() {
        let mut rng = StdRng::seed_from_u64(5);
        let grid =
            GridGenerator::generate_balanced(&mut rng, 1, 1, -10, 10, DifficultyTier::Beginner);
        assert!(grid.value(0, 0) >= GOAL_MIN_REWARD);
    }

    #[test]
    fn test_balanced_corners_use_narrow_range() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..50 {
            let grid = GridGenerator::generate_balanced(
                &mut rng,
                7,
                7,
                -40,
                40,
                DifficultyTier::Expert,
            );
            // Start and goal sample from [-20, 20] before post-processing.
            assert!(grid.value(0, 0) <= 20);
            assert!(grid.value(6, 6) <= 20);
            for r in 0..7 {
                for c in 0..7 {
                    let v = grid.value(r, c);
                    assert!((-40..=40).contains(&v));
                }
            }
        }
    }

    #[test]
    fn test_for_tier_uses_tier_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = GridGenerator::for_tier(&mut rng, DifficultyTier::Beginner, 5);
        assert_eq!((grid.rows(), grid.cols()), (5, 5));
        assert!(grid.analysis().min >= -5);
        assert!(grid.analysis().max <= 15);
    }
}
