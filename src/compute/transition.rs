//! Transition engine - applies a rule synchronously over a toroidal grid.
//!
//! Every cell of a step reads only the pre-step snapshot. The new state is
//! written to a separate buffer which replaces the old grid between steps.

use crate::schema::{Encoding, Rule, living_index, pattern_index};

use super::grid::{Grid, ring, wrap};

/// Apply one synchronous step and return the new grid.
pub fn step(grid: &Grid, rule: &Rule) -> Grid {
    let mut next = Grid::blank_like(grid);
    step_into(grid, rule, &mut next);
    next
}

/// Apply one synchronous step, writing into `next`.
///
/// `next` is reshaped to match `grid` if needed, so a single scratch grid can
/// be reused across steps.
pub fn step_into(grid: &Grid, rule: &Rule, next: &mut Grid) {
    next.match_shape(grid);

    let rows = grid.rows();
    let cols = grid.cols();
    let cells = grid.cells();
    let out = next.cells_mut();

    for row in 0..rows {
        let (up, down) = wrap(row, rows);
        for col in 0..cols {
            let (left, right) = wrap(col, cols);
            let neighbourhood = ring(cells, cols, (up, row, down), (left, col, right));
            let current = cells[row * cols + col];

            let key = match rule.encoding() {
                Encoding::Living => living_index(current, neighbourhood.iter().sum()),
                Encoding::Pattern => pattern_index(current, &neighbourhood),
            };
            out[row * cols + col] = rule.next_state(key, current);
        }
    }
}

/// Apply `steps` synchronous steps. The input grid is left untouched.
pub fn run(grid: &Grid, rule: &Rule, steps: usize) -> Grid {
    let mut current = grid.clone();
    let mut next = Grid::blank_like(grid);

    for _ in 0..steps {
        step_into(&current, rule, &mut next);
        std::mem::swap(&mut current, &mut next);
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn random_grid(rows: usize, cols: usize, seed: u64) -> Grid {
        Grid::random(rows, cols, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_block_is_still_life() {
        let block = Grid::from_live_cells(6, 6, &[(2, 2), (2, 3), (3, 2), (3, 3)]).unwrap();
        let next = step(&block, &Rule::conway());
        assert_eq!(next, block);
    }

    #[test]
    fn test_block_still_life_at_minimum_size() {
        let block = Grid::from_live_cells(4, 4, &[(1, 1), (1, 2), (2, 1), (2, 2)]).unwrap();
        assert_eq!(run(&block, &Rule::conway(), 5), block);
    }

    #[test]
    fn test_blinker_oscillates() {
        let horizontal = Grid::from_live_cells(5, 5, &[(2, 1), (2, 2), (2, 3)]).unwrap();
        let vertical = Grid::from_live_cells(5, 5, &[(1, 2), (2, 2), (3, 2)]).unwrap();
        let rule = Rule::conway();

        assert_eq!(step(&horizontal, &rule), vertical);
        assert_eq!(run(&horizontal, &rule, 2), horizontal);
    }

    #[test]
    fn test_glider_wraps_around() {
        let glider =
            Grid::from_live_cells(6, 6, &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]).unwrap();
        // A glider on a 6x6 torus returns to its start after 4 * 6 steps
        let after = run(&glider, &Rule::conway(), 24);
        assert_eq!(after, glider);
    }

    #[test]
    fn test_run_leaves_input_untouched() {
        let grid = random_grid(8, 8, 1);
        let copy = grid.clone();
        let _ = run(&grid, &Rule::conway(), 10);
        assert_eq!(grid, copy);
    }

    #[test]
    fn test_zero_steps_is_identity() {
        let grid = random_grid(5, 7, 3);
        assert_eq!(run(&grid, &Rule::conway(), 0), grid);
    }

    #[test]
    fn test_pattern_fallback_keeps_state() {
        // Only the all-dead neighbourhood is defined; everything else keeps its state
        let rule = Rule::from_entries([("000000000", 1u8)]).unwrap();
        let grid = Grid::from_live_cells(5, 5, &[(0, 0)]).unwrap();
        let next = step(&grid, &rule);

        // Cells not touching (0, 0) are born
        assert_eq!(next.get(2, 2), 1);
        // Cells adjacent to the live corner have no entry and stay dead
        assert_eq!(next.get(1, 1), 0);
        assert_eq!(next.get(4, 4), 0);
        // The live corner has no entry either and stays alive
        assert_eq!(next.get(0, 0), 1);
    }

    #[test]
    fn test_pattern_rule_sees_orientation() {
        // Birth only when the single live neighbour is directly to the right
        let rule = Rule::from_entries([("000010000", 1u8)]).unwrap();
        let grid = Grid::from_live_cells(4, 4, &[(1, 2)]).unwrap();
        let next = step(&grid, &rule);
        assert_eq!(next.get(1, 1), 1);
        assert_eq!(next.get(1, 3), 0);
        assert_eq!(next.live_cells(), 2);
    }

    #[test]
    fn test_step_into_reshapes_buffer() {
        let grid = random_grid(6, 9, 11);
        let mut scratch = random_grid(3, 3, 12);
        step_into(&grid, &Rule::conway(), &mut scratch);
        assert_eq!(scratch, step(&grid, &Rule::conway()));
    }

    proptest! {
        #[test]
        fn prop_identity_rule_is_fixed_point(
            rows in 2usize..12,
            cols in 2usize..12,
            seed in any::<u64>(),
            steps in 0usize..6,
            pattern in any::<bool>(),
        ) {
            let grid = random_grid(rows, cols, seed);
            let encoding = if pattern { Encoding::Pattern } else { Encoding::Living };
            let rule = Rule::identity(encoding);
            prop_assert_eq!(run(&grid, &rule, steps), grid);
        }

        #[test]
        fn prop_run_is_deterministic(seed in any::<u64>(), steps in 0usize..8) {
            let grid = random_grid(9, 7, seed);
            let rule = Rule::conway();
            prop_assert_eq!(run(&grid, &rule, steps), run(&grid, &rule, steps));
        }

        #[test]
        fn prop_run_equals_repeated_step(seed in any::<u64>(), steps in 0usize..6) {
            let grid = random_grid(6, 6, seed);
            let rule = Rule::conway();
            let mut stepped = grid.clone();
            for _ in 0..steps {
                stepped = step(&stepped, &rule);
            }
            prop_assert_eq!(run(&grid, &rule, steps), stepped);
        }
    }
}
