//! Gravity, refill, and the cascade multiplier table
//!
//! Column compaction and cell refill are independent per column/cell, so
//! resolution has no cross-column ordering dependency.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, GridGenerator, Position};

/// Default per-depth score multiplier table
pub const DEFAULT_MULTIPLIERS: [f64; 4] = [1.0, 1.5, 2.0, 3.0];

/// Depth at which the flat cascade bonus starts
pub const FLAT_BONUS_START_DEPTH: u32 = 4;

/// Flat bonus per depth past the start
pub const FLAT_BONUS_PER_DEPTH: u64 = 500;

/// A symbol that fell during gravity, keyed by its pre-fall position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedSymbol {
    pub row: usize,
    pub col: usize,
    /// Rows fallen
    pub distance: usize,
}

/// Result of one gravity-plus-refill resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// Fully repopulated grid
    pub grid: Grid,
    /// Fall distances for presentation timing
    pub dropped: Vec<DroppedSymbol>,
    /// Cells filled with freshly drawn symbols
    pub new_symbols: Vec<Position>,
}

/// Compact each column downward, preserving relative order.
///
/// Conserves the per-column symbol multiset; empties float to the top.
pub fn apply_gravity(grid: &Grid) -> Grid {
    let size = grid.size();
    let mut compacted = Grid::empty(size);

    for col in 0..size {
        let mut target = size;
        for row in (0..size).rev() {
            if let Some(symbol) = grid.get(Position::new(row, col)) {
                target -= 1;
                compacted.set(Position::new(target, col), symbol);
            }
        }
    }

    compacted
}

/// Apply gravity, report fall distances and refill positions, then draw new
/// symbols for every emptied cell under the current boost/special modifiers.
pub fn resolve(
    grid: &Grid,
    generator: &mut GridGenerator,
    boost_multiplier: f64,
    special_only: bool,
) -> CascadeOutcome {
    let size = grid.size();
    let mut settled = apply_gravity(grid);

    // Per column: the k-th surviving symbol from the bottom lands k rows up
    // from the floor, so the fall distance is a pure row-count delta.
    let mut dropped = Vec::new();
    for col in 0..size {
        let mut landing = size;
        for row in (0..size).rev() {
            if grid.get(Position::new(row, col)).is_some() {
                landing -= 1;
                let distance = landing - row;
                if distance > 0 {
                    dropped.push(DroppedSymbol { row, col, distance });
                }
            }
        }
    }

    let new_symbols = settled.empty_positions();
    for &pos in &new_symbols {
        let symbol = generator.draw(boost_multiplier, special_only);
        settled.set(pos, symbol);
    }

    CascadeOutcome {
        grid: settled,
        dropped,
        new_symbols,
    }
}

/// Per-depth multiplier, clamped to the table's last entry
pub fn cascade_multiplier(depth: u32, table: &[f64]) -> f64 {
    let idx = depth as usize;
    if idx < table.len() {
        table[idx]
    } else {
        table.last().copied().unwrap_or(1.0)
    }
}

/// Flat bonus for deep chains: 500 per depth from depth 4 on
pub fn cascade_flat_bonus(depth: u32) -> u64 {
    if depth >= FLAT_BONUS_START_DEPTH {
        FLAT_BONUS_PER_DEPTH * u64::from(depth - (FLAT_BONUS_START_DEPTH - 1))
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::symbols::SymbolKind::{self, *};

    fn column_multiset(grid: &Grid, col: usize) -> Vec<SymbolKind> {
        let mut symbols: Vec<SymbolKind> = (0..grid.size())
            .filter_map(|row| grid.get(Position::new(row, col)))
            .collect();
        symbols.sort_by_key(|s| s.kind_name());
        symbols
    }

    #[test]
    fn test_gravity_compacts_and_conserves() {
        let grid = Grid::from_rows(vec![
            vec![Some(Cherry), None, Some(Orange)],
            vec![None, Some(Bell), None],
            vec![Some(Grape), None, None],
        ]);
        let settled = apply_gravity(&grid);

        // Column 0: Cherry above Grape, order preserved, floated down
        assert_eq!(settled.get(Position::new(1, 0)), Some(Cherry));
        assert_eq!(settled.get(Position::new(2, 0)), Some(Grape));
        assert_eq!(settled.get(Position::new(0, 0)), None);
        // Column 1: lone Bell on the floor
        assert_eq!(settled.get(Position::new(2, 1)), Some(Bell));
        // Column 2: Orange on the floor
        assert_eq!(settled.get(Position::new(2, 2)), Some(Orange));

        for col in 0..3 {
            assert_eq!(column_multiset(&grid, col), column_multiset(&settled, col));
        }
    }

    #[test]
    fn test_gravity_conservation_on_random_grids() {
        let mut generator = GridGenerator::seeded(31);
        for _ in 0..25 {
            let mut grid = generator.generate(5, 1.0, false);
            // Punch random holes
            for pos in grid.positions().collect::<Vec<_>>() {
                if generator.rng().random::<f64>() < 0.4 {
                    grid.clear(pos);
                }
            }
            let settled = apply_gravity(&grid);
            for col in 0..5 {
                assert_eq!(column_multiset(&grid, col), column_multiset(&settled, col));
            }
        }
    }

    #[test]
    fn test_resolve_reports_falls_and_refills() {
        let grid = Grid::from_rows(vec![
            vec![Some(Cherry), Some(Lemon), Some(Orange)],
            vec![None, None, None],
            vec![None, Some(Grape), Some(Bell)],
        ]);
        let mut generator = GridGenerator::seeded(8);
        let outcome = resolve(&grid, &mut generator, 1.0, false);

        assert!(outcome.grid.is_full());
        // Cherry fell two rows, Lemon and Orange one each
        assert!(outcome
            .dropped
            .contains(&DroppedSymbol { row: 0, col: 0, distance: 2 }));
        assert!(outcome
            .dropped
            .contains(&DroppedSymbol { row: 0, col: 1, distance: 1 }));
        assert!(outcome
            .dropped
            .contains(&DroppedSymbol { row: 0, col: 2, distance: 1 }));
        assert_eq!(outcome.dropped.len(), 3);
        // 4 holes were refilled
        assert_eq!(outcome.new_symbols.len(), 4);
    }

    #[test]
    fn test_resolve_always_full() {
        let mut generator = GridGenerator::seeded(77);
        for _ in 0..25 {
            let mut grid = generator.generate(4, 1.0, false);
            for pos in grid.positions().collect::<Vec<_>>() {
                if generator.rng().random::<f64>() < 0.5 {
                    grid.clear(pos);
                }
            }
            let outcome = resolve(&grid, &mut generator, 1.0, false);
            assert!(outcome.grid.is_full());
        }
    }

    #[test]
    fn test_multiplier_clamps_to_last_entry() {
        assert_eq!(cascade_multiplier(0, &DEFAULT_MULTIPLIERS), 1.0);
        assert_eq!(cascade_multiplier(1, &DEFAULT_MULTIPLIERS), 1.5);
        assert_eq!(cascade_multiplier(3, &DEFAULT_MULTIPLIERS), 3.0);
        assert_eq!(cascade_multiplier(10, &DEFAULT_MULTIPLIERS), 3.0);
        assert_eq!(cascade_multiplier(5, &[]), 1.0);
    }

    #[test]
    fn test_flat_bonus_steps() {
        assert_eq!(cascade_flat_bonus(0), 0);
        assert_eq!(cascade_flat_bonus(3), 0);
        assert_eq!(cascade_flat_bonus(4), 500);
        assert_eq!(cascade_flat_bonus(6), 1500);
    }
}
