//! Run scanning across rows, columns, and both diagonals

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};
use crate::symbols::{can_match, SymbolKind};

/// Minimum run length that counts as a match
pub const MIN_RUN_LENGTH: usize = 3;

/// Scan order: horizontal, vertical, diagonal down-right, diagonal down-left.
/// The order is part of the game's balance (see overlap policy below).
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A matched run: its cells, the reference symbol, and its base points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub positions: Vec<Position>,
    pub symbol: SymbolKind,
    pub points: u64,
}

/// Find every matched run in the grid.
///
/// Overlap policy: a cell belongs to at most one reported match per scan.
/// Runs are discovered in fixed direction order and first-found wins; a
/// candidate run touching any already-claimed cell is suppressed entirely.
/// A symbol completing both a horizontal and a vertical run therefore
/// scores once, not twice — intentional game balance, do not "fix".
pub fn find_matches(grid: &Grid) -> Vec<MatchGroup> {
    let size = grid.size();
    let mut visited = vec![vec![false; size]; size];
    let mut matches = Vec::new();

    for (row_delta, col_delta) in DIRECTIONS {
        for row in 0..size {
            for col in 0..size {
                let run = grow_run(grid, Position::new(row, col), row_delta, col_delta);
                if run.len() < MIN_RUN_LENGTH {
                    continue;
                }
                if run.iter().any(|p| visited[p.row][p.col]) {
                    continue;
                }
                for p in &run {
                    visited[p.row][p.col] = true;
                }
                // Reference symbol is the run's first cell; a wild-led run
                // reports as wild and carries no base points.
                let symbol = match grid.get(run[0]) {
                    Some(s) => s,
                    None => continue,
                };
                matches.push(MatchGroup {
                    points: symbol.base_points() * run.len() as u64,
                    symbol,
                    positions: run,
                });
            }
        }
    }

    matches
}

/// Grow a run from `start` while cells keep matching the first symbol
fn grow_run(grid: &Grid, start: Position, row_delta: isize, col_delta: isize) -> Vec<Position> {
    let size = grid.size() as isize;
    let first = match grid.get(start) {
        Some(s) => s,
        None => return Vec::new(),
    };

    let mut positions = Vec::new();
    let mut row = start.row as isize;
    let mut col = start.col as isize;

    while row >= 0 && row < size && col >= 0 && col < size {
        let pos = Position::new(row as usize, col as usize);
        match grid.get(pos) {
            Some(current) if can_match(first, current) => positions.push(pos),
            _ => break,
        }
        row += row_delta;
        col += col_delta;
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind::*;

    fn grid_3x3(rows: [[SymbolKind; 3]; 3]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&s| Some(s)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_horizontal_cherry_row() {
        let grid = grid_3x3([
            [Cherry, Cherry, Cherry],
            [Lemon, Bell, Orange],
            [Grape, Diamond, Wild],
        ]);
        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        let group = &matches[0];
        assert_eq!(group.symbol, Cherry);
        assert_eq!(group.points, 30);
        assert_eq!(
            group.positions,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2)
            ]
        );
    }

    #[test]
    fn test_vertical_and_diagonal_runs() {
        let vertical = grid_3x3([
            [Lemon, Cherry, Orange],
            [Lemon, Bell, Orange],
            [Lemon, Diamond, Grape],
        ]);
        let matches = find_matches(&vertical);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].symbol, Lemon);
        assert_eq!(matches[0].points, 45);

        let diagonal = grid_3x3([
            [Bell, Cherry, Orange],
            [Lemon, Bell, Orange],
            [Grape, Diamond, Bell],
        ]);
        let matches = find_matches(&diagonal);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].symbol, Bell);
    }

    #[test]
    fn test_wild_joins_a_run() {
        let grid = grid_3x3([
            [Cherry, Wild, Cherry],
            [Lemon, Bell, Orange],
            [Grape, Diamond, Grape],
        ]);
        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].symbol, Cherry);
        assert_eq!(matches[0].points, 30);
    }

    #[test]
    fn test_overlapping_cell_scores_once() {
        // (0,0) completes both the top row and the left column; the
        // horizontal scan runs first and claims it.
        let grid = grid_3x3([
            [Cherry, Cherry, Cherry],
            [Cherry, Bell, Orange],
            [Cherry, Diamond, Grape],
        ]);
        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].positions,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2)
            ]
        );
    }

    #[test]
    fn test_min_length_and_no_overlap_properties() {
        let mut generator = crate::grid::GridGenerator::seeded(99);
        for _ in 0..50 {
            let grid = generator.generate(5, 1.0, false);
            let matches = find_matches(&grid);
            let mut seen = std::collections::HashSet::new();
            for group in &matches {
                assert!(group.positions.len() >= MIN_RUN_LENGTH);
                for p in &group.positions {
                    assert!(seen.insert(*p), "cell claimed twice: {p:?}");
                }
            }
        }
    }

    #[test]
    fn test_run_of_four_is_one_group() {
        let grid = Grid::from_rows(vec![
            vec![Some(Cherry), Some(Cherry), Some(Cherry), Some(Cherry)],
            vec![Some(Lemon), Some(Bell), Some(Orange), Some(Grape)],
            vec![Some(Orange), Some(Grape), Some(Lemon), Some(Bell)],
            vec![Some(Bell), Some(Orange), Some(Grape), Some(Lemon)],
        ]);
        let matches = find_matches(&grid);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].symbol, Cherry);
        assert_eq!(matches[0].positions.len(), 4);
        assert_eq!(matches[0].points, 40);
    }
}
