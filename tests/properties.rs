use itertools::Itertools;
use life_rewind::csp::{CancelToken, SolverOptions, ValueOrder};
use life_rewind::game_of_life::{Cell, Grid};
use life_rewind::reverse::find_predecessor;
use life_rewind::{load_grid, pad, previous, previous_with, step, ReverseError, SolveError};
use proptest::prelude::*;
use std::time::Duration;

/// Every grid of side `n`, row-major bit order
fn all_grids(n: usize) -> impl Iterator<Item = Grid> {
    (0..n * n)
        .map(|_| [false, true].into_iter())
        .multi_cartesian_product()
        .map(move |bits| {
            let rows: Vec<Vec<bool>> = bits.chunks(n).map(<[bool]>::to_vec).collect();
            Grid::from_cells(rows).unwrap()
        })
}

/// Minimum border count over all predecessors, found by enumeration
fn brute_force_min_border(target: &Grid) -> Option<usize> {
    all_grids(target.size())
        .filter(|candidate| step(candidate) == *target)
        .map(|candidate| candidate.border_living_count())
        .min()
}

#[test]
fn round_trip_on_glider() {
    let glider = load_grid(&["..O..", "O.O..", ".OO..", ".....", "....."], 5).unwrap();
    let target = pad(&glider, 1);

    let predecessor = previous(&target).unwrap().expect("glider has predecessors");
    assert_eq!(predecessor.size(), target.size());
    assert_eq!(step(&predecessor), target);
}

#[test]
fn still_life_block_is_its_own_best_predecessor() {
    let block = load_grid(&["......", "......", "..OO..", "..OO..", "......", "......"], 6).unwrap();

    let solution = find_predecessor(&block, &SolverOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(solution.border_score, 0);
    assert_eq!(step(&solution.predecessor), block);
    // The block itself qualifies, so the optimum cannot be worse than it
    assert_eq!(step(&block), block);
    assert_eq!(block.border_living_count(), 0);
}

#[test]
fn infeasible_targets_yield_none() {
    let lone = load_grid(&["O"], 1).unwrap();
    assert_eq!(previous(&lone).unwrap(), None);

    let corner = load_grid(&["O.", ".."], 2).unwrap();
    assert_eq!(brute_force_min_border(&corner), None);
    assert_eq!(previous(&corner).unwrap(), None);
}

#[test]
fn border_minimum_matches_enumeration() {
    let targets = [
        load_grid(&["....", "OOO.", "....", "...."], 4).unwrap(),
        load_grid(&["....", ".OO.", ".OO.", "...."], 4).unwrap(),
        load_grid(&["O..O", "....", "....", "O..O"], 4).unwrap(),
        load_grid(&[".O.", "O.O", ".O."], 3).unwrap(),
        load_grid(&["OOO", "O.O", "OOO"], 3).unwrap(),
        load_grid(&["OO..", "OO..", "..OO", "..OO"], 4).unwrap(),
    ];

    for target in &targets {
        let expected = brute_force_min_border(target);
        let found = find_predecessor(target, &SolverOptions::default()).unwrap();

        assert_eq!(
            found.as_ref().map(|s| s.border_score),
            expected,
            "border optimum differs for\n{}",
            target
        );
        if let Some(solution) = found {
            assert_eq!(step(&solution.predecessor), *target);
        }
    }
}

#[test]
fn value_order_and_parallel_split_agree_on_optimum() {
    let target = load_grid(&["......", ".O....", "..OO..", ".OO...", "......", "......"], 6).unwrap();
    let baseline = find_predecessor(&target, &SolverOptions::default())
        .unwrap()
        .unwrap();

    let variants = [
        SolverOptions {
            value_order: ValueOrder::TrueFirst,
            ..SolverOptions::default()
        },
        SolverOptions {
            parallel_split_depth: 4,
            ..SolverOptions::default()
        },
    ];
    for options in &variants {
        let solution = find_predecessor(&target, options).unwrap().unwrap();
        assert_eq!(solution.border_score, baseline.border_score);
        assert_eq!(step(&solution.predecessor), target);
    }
}

#[test]
fn dead_grids_pad_and_reverse_to_dead_grids() {
    for n in 1..=5 {
        let dead = Grid::new(n).unwrap();
        for k in 0..3 {
            assert_eq!(pad(&dead, k), Grid::new(n + 2 * k).unwrap());
        }
        assert_eq!(previous(&dead).unwrap(), Some(dead));
    }
}

#[test]
fn neighbor_counts_by_position() {
    assert!(Grid::new(1).unwrap().neighbors(Cell::new(0, 0)).is_empty());

    for n in 2..=6 {
        let grid = Grid::new(n).unwrap();
        let last = n - 1;
        for corner in [(0, 0), (0, last), (last, 0), (last, last)] {
            assert_eq!(grid.neighbors(Cell::new(corner.0, corner.1)).len(), 3);
        }
        if n > 2 {
            assert_eq!(grid.neighbors(Cell::new(0, 1)).len(), 5);
            assert_eq!(grid.neighbors(Cell::new(1, last)).len(), 5);
            assert_eq!(grid.neighbors(Cell::new(1, 1)).len(), 8);
        }
    }
}

#[test]
fn malformed_input_is_rejected() {
    assert!(matches!(
        load_grid(&["OO", "O"], 2),
        Err(life_rewind::GridError::MalformedInput { row: 1, found: 1, .. })
    ));
    assert!(load_grid(&["O."], 2).is_err());
    // Extra characters and unknown symbols are tolerated
    let grid = load_grid(&["OxO", "#O.."], 2).unwrap();
    assert_eq!(grid.living_count(), 2);
}

#[test]
fn expired_deadline_interrupts_search() {
    let target = Grid::new(8).unwrap();
    let options = SolverOptions {
        cancel: CancelToken::new().with_timeout(Duration::ZERO),
        ..SolverOptions::default()
    };

    assert!(matches!(
        previous_with(&target, &options),
        Err(ReverseError::Solve(SolveError::Interrupted { incumbent: None }))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stepped_grids_always_reverse(bits in prop::collection::vec(any::<bool>(), 16)) {
        let rows: Vec<Vec<bool>> = bits.chunks(4).map(<[bool]>::to_vec).collect();
        let origin = Grid::from_cells(rows).unwrap();
        let target = step(&origin);

        let solution = find_predecessor(&target, &SolverOptions::default())
            .unwrap()
            .expect("a stepped grid has a predecessor");
        prop_assert_eq!(step(&solution.predecessor), target);
        prop_assert!(solution.border_score <= origin.border_living_count());
    }
}
