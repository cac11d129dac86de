use crate::domain::grid::{Field, Grid, Mark, MAX_SIDE_LENGTH};

fn grid(side_length: usize, win_run_length: usize) -> Grid<char> {
    let mut grid = Grid::new(win_run_length);
    grid.reset_and_resize(side_length);
    grid
}

#[test]
fn fresh_grid_has_no_cells() {
    let grid: Grid<char> = Grid::new(3);
    assert!(grid.is_empty());
    assert_eq!(grid.get_field(0, 0, 0), Field::OutOfBounds);
}

#[test]
fn run_length_is_raised_to_minimum() {
    let grid: Grid<char> = Grid::new(1);
    assert_eq!(grid.win_run_length(), 3);
}

#[test]
fn reset_clears_and_resizes() {
    let mut g = grid(3, 3);
    assert!(g.mark(4, 'X'));
    g.reset_and_resize(4);
    assert_eq!(g.len(), 16);
    assert_eq!(g.empty_cells(), 16);
    assert!(g.cells().iter().all(|cell| *cell == Mark::Unmarked));
}

#[test]
fn huge_sizes_are_capped() {
    let mut g: Grid<char> = Grid::new(usize::MAX);
    assert_eq!(g.win_run_length(), MAX_SIDE_LENGTH);

    g.reset_and_resize(1 << 33);
    assert_eq!(g.side_length(), MAX_SIDE_LENGTH);
    assert_eq!(g.len(), MAX_SIDE_LENGTH * MAX_SIDE_LENGTH);
    assert_eq!(g.empty_cells(), g.len());
}

#[test]
fn marked_and_out_of_bounds_cells_reject_marks() {
    let mut g = grid(3, 3);
    assert!(g.mark(0, 'X'));
    assert!(!g.mark(0, 'Y'));
    assert!(!g.mark(9, 'Y'));
    assert_eq!(g.cells()[0], Mark::Owner('X'));
    assert_eq!(g.empty_cells(), 8);
}

#[test]
fn offsets_do_not_wrap_across_rows() {
    let mut g = grid(3, 3);
    g.mark(3, 'X');
    // index 2 is the end of row 0; one step right is off the board, not index 3
    assert_eq!(g.get_field(2, 0, 1), Field::OutOfBounds);
    assert_eq!(g.get_field(0, 1, 0), Field::Owner(&'X'));
    assert_eq!(g.get_field(0, -1, 0), Field::OutOfBounds);
    assert_eq!(g.get_field(4, 1, 1), Field::Unmarked);
}

#[test]
fn detects_wins_on_all_four_axes() {
    let lines: [&[usize]; 4] = [&[0, 1, 2], &[1, 4, 7], &[0, 4, 8], &[2, 4, 6]];
    for line in lines {
        let mut g = grid(3, 3);
        for &index in line {
            g.mark(index, 'X');
        }
        for &index in line {
            assert!(g.is_winning_mark(&'X', index), "line {line:?} at {index}");
        }
    }
}

#[test]
fn foreign_marks_break_a_run() {
    let mut g = grid(3, 3);
    g.mark(0, 'X');
    g.mark(1, 'Y');
    g.mark(2, 'X');
    assert!(!g.is_winning_mark(&'X', 2));
    assert!(!g.is_winning_mark(&'Y', 1));
}

#[test]
fn long_diagonal_on_large_board() {
    let side = 12;
    let mut g = grid(side, 12);
    let diagonal: Vec<usize> = (0..side).map(|i| i * side + i).collect();
    for &index in &diagonal {
        assert!(g.mark(index, 'X'));
    }
    assert_eq!(g.get_field(diagonal[8], 0, 0), Field::Owner(&'X'));
    assert!(!g.mark(diagonal[8], 'Y'));

    g.mark(3, 'Y');
    assert!(!g.is_winning_mark(&'Y', 3));
    assert!(g.is_winning_mark(&'X', diagonal[4]));
}

#[test]
fn run_must_match_length_exactly() {
    let mut g = grid(5, 3);
    for index in [0, 1, 3, 4] {
        g.mark(index, 'X');
    }
    g.mark(2, 'X');
    assert!(!g.is_winning_mark(&'X', 2));
}

#[test]
fn full_board_is_a_draw() {
    let mut g = grid(3, 3);
    // X O X / X O O / O X X
    let owners = ['X', 'O', 'X', 'X', 'O', 'O', 'O', 'X', 'X'];
    for (index, owner) in owners.iter().enumerate() {
        assert!(!g.is_draw());
        g.mark(index, *owner);
    }
    assert!(g.is_draw());
    assert_eq!(g.empty_cells(), 0);
}

#[test]
fn unmarked_serializes_as_empty_string() {
    let mut g = grid(2, 3);
    g.mark(1, 'X');
    let json = serde_json::to_value(g.cells()).unwrap();
    assert_eq!(json, serde_json::json!(["", "X", "", ""]));
}
