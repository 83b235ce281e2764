//! Special-symbol effect resolution
//!
//! One pass over the matched cells expands the removal set with each
//! special's area of effect. Specials exposed by another special's blast
//! are NOT re-triggered here; the controller runs a single bounded
//! follow-up pass via [`check_chain_effects`].

use std::collections::HashSet;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};
use crate::matching::MatchGroup;
use crate::symbols::SymbolKind;

/// Bonus symbol payout range (inclusive)
pub const BONUS_RANGE: (u64, u64) = (50, 500);

/// Flat payout of a matched mega jackpot
pub const MEGA_JACKPOT_POINTS: u64 = 50_000;

/// Points per cell cleared by a chain bomb
pub const CHAIN_BOMB_POINTS_PER_CELL: u64 = 1_000;

/// Share of the leader's score paid by a reverse symbol
pub const REVERSE_SHARE: f64 = 0.20;

/// A triggered special, with its blast area, for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialEffect {
    pub kind: SymbolKind,
    pub origin: Position,
    pub affected: Vec<Position>,
}

/// Result of the primary effect pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectOutcome {
    /// Cells to remove beyond the matched runs, de-duplicated
    pub additional_removals: Vec<Position>,
    /// All effect points, including any reverse bonus
    pub bonus_points: u64,
    /// Triggered specials in processing order
    pub effects: Vec<SpecialEffect>,
    /// Portion of `bonus_points` contributed by reverse symbols
    pub reverse_bonus: u64,
}

/// Result of the bounded chain follow-up pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainOutcome {
    pub removals: Vec<Position>,
    pub points: u64,
    pub effects: Vec<SpecialEffect>,
}

/// Resolve every special symbol inside the matched cells, each at most once.
///
/// `top_score` is the current leader's score, consulted by reverse symbols.
pub fn apply_effects(
    grid: &Grid,
    matches: &[MatchGroup],
    rng: &mut StdRng,
    top_score: u64,
) -> EffectOutcome {
    let mut outcome = EffectOutcome::default();
    let mut processed: HashSet<Position> = HashSet::new();
    let mut removal_set: HashSet<Position> = HashSet::new();

    for group in matches {
        for &pos in &group.positions {
            if !processed.insert(pos) {
                continue;
            }
            let symbol = match grid.get(pos) {
                Some(s) => s,
                None => continue,
            };
            match symbol {
                SymbolKind::Bomb => {
                    let (affected, points) = bomb_effect(grid, pos);
                    push_removals(&mut outcome.additional_removals, &mut removal_set, &affected);
                    outcome.bonus_points += points;
                    outcome.effects.push(SpecialEffect {
                        kind: symbol,
                        origin: pos,
                        affected,
                    });
                }
                SymbolKind::Star => {
                    let (affected, points) = star_effect(grid, pos);
                    push_removals(&mut outcome.additional_removals, &mut removal_set, &affected);
                    outcome.bonus_points += points;
                    outcome.effects.push(SpecialEffect {
                        kind: symbol,
                        origin: pos,
                        affected,
                    });
                }
                SymbolKind::ChainBomb => {
                    let (affected, points) = chain_bomb_effect(grid);
                    push_removals(&mut outcome.additional_removals, &mut removal_set, &affected);
                    outcome.bonus_points += points;
                    outcome.effects.push(SpecialEffect {
                        kind: symbol,
                        origin: pos,
                        affected,
                    });
                }
                SymbolKind::Bonus => {
                    outcome.bonus_points += rng.random_range(BONUS_RANGE.0..=BONUS_RANGE.1);
                    outcome.effects.push(SpecialEffect {
                        kind: symbol,
                        origin: pos,
                        affected: vec![pos],
                    });
                }
                SymbolKind::MegaJackpot => {
                    outcome.bonus_points += MEGA_JACKPOT_POINTS;
                    outcome.effects.push(SpecialEffect {
                        kind: symbol,
                        origin: pos,
                        affected: vec![pos],
                    });
                }
                SymbolKind::Reverse => {
                    let bonus = (top_score as f64 * REVERSE_SHARE).floor() as u64;
                    outcome.reverse_bonus += bonus;
                    outcome.bonus_points += bonus;
                    outcome.effects.push(SpecialEffect {
                        kind: symbol,
                        origin: pos,
                        affected: vec![pos],
                    });
                }
                _ => {}
            }
        }
    }

    outcome
}

/// One bounded follow-up pass over cells removed as blast side effects.
///
/// Only bombs and stars chain; the pass never recurses into its own
/// removals, which caps total expansion at two waves per cascade step.
pub fn check_chain_effects(grid: &Grid, removed: &[Position]) -> ChainOutcome {
    let mut outcome = ChainOutcome::default();
    let mut processed: HashSet<Position> = HashSet::new();
    let mut removal_set: HashSet<Position> = HashSet::new();

    for &pos in removed {
        if !processed.insert(pos) {
            continue;
        }
        let symbol = match grid.get(pos) {
            Some(s) => s,
            None => continue,
        };
        let (affected, points) = match symbol {
            SymbolKind::Bomb => bomb_effect(grid, pos),
            SymbolKind::Star => star_effect(grid, pos),
            _ => continue,
        };
        push_removals(&mut outcome.removals, &mut removal_set, &affected);
        outcome.points += points;
        outcome.effects.push(SpecialEffect {
            kind: symbol,
            origin: pos,
            affected,
        });
    }

    outcome
}

/// 3x3 neighborhood clamped to the grid; other bombs are skipped so they
/// can chain on their own
fn bomb_effect(grid: &Grid, origin: Position) -> (Vec<Position>, u64) {
    let size = grid.size();
    let mut affected = Vec::new();
    let mut points = 0;

    let row_lo = origin.row.saturating_sub(1);
    let col_lo = origin.col.saturating_sub(1);
    for row in row_lo..=(origin.row + 1).min(size - 1) {
        for col in col_lo..=(origin.col + 1).min(size - 1) {
            let pos = Position::new(row, col);
            if pos == origin {
                continue;
            }
            if let Some(symbol) = grid.get(pos) {
                if symbol != SymbolKind::Bomb {
                    affected.push(pos);
                    points += symbol.base_points();
                }
            }
        }
    }
    affected.push(origin);

    (affected, points)
}

/// Full row and column through the cell, de-duplicated at the crossing
fn star_effect(grid: &Grid, origin: Position) -> (Vec<Position>, u64) {
    let size = grid.size();
    let mut affected = Vec::new();
    let mut points = 0;

    for col in 0..size {
        let pos = Position::new(origin.row, col);
        if pos == origin {
            continue;
        }
        if let Some(symbol) = grid.get(pos) {
            if symbol != SymbolKind::Star {
                affected.push(pos);
                points += symbol.base_points();
            }
        }
    }
    for row in 0..size {
        let pos = Position::new(row, origin.col);
        if pos == origin {
            continue;
        }
        if let Some(symbol) = grid.get(pos) {
            if symbol != SymbolKind::Star {
                affected.push(pos);
                points += symbol.base_points();
            }
        }
    }
    affected.push(origin);

    (affected, points)
}

/// Clears the whole grid at a flat rate per symbol
fn chain_bomb_effect(grid: &Grid) -> (Vec<Position>, u64) {
    let mut affected = Vec::new();
    let mut points = 0;
    for pos in grid.positions() {
        if grid.get(pos).is_some() {
            affected.push(pos);
            points += CHAIN_BOMB_POINTS_PER_CELL;
        }
    }
    (affected, points)
}

fn push_removals(
    removals: &mut Vec<Position>,
    seen: &mut HashSet<Position>,
    affected: &[Position],
) {
    for &pos in affected {
        if seen.insert(pos) {
            removals.push(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKind::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    fn grid_3x3(rows: [[SymbolKind; 3]; 3]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&s| Some(s)).collect())
                .collect(),
        )
    }

    fn match_at(grid: &Grid, positions: Vec<Position>) -> MatchGroup {
        let symbol = grid.get(positions[0]).unwrap();
        MatchGroup {
            points: symbol.base_points() * positions.len() as u64,
            symbol,
            positions,
        }
    }

    #[test]
    fn test_center_bomb_clears_whole_3x3() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Bomb, Bell],
            [Diamond, Cherry, Lemon],
        ]);
        let matches = vec![match_at(&grid, vec![Position::new(1, 1)])];
        let outcome = apply_effects(&grid, &matches, &mut rng(), 0);

        assert_eq!(outcome.additional_removals.len(), 9);
        // Sum of the other 8 cells' base values
        let expected = 10 + 15 + 20 + 25 + 30 + 50 + 10 + 15;
        assert_eq!(outcome.bonus_points, expected);
        assert_eq!(outcome.effects.len(), 1);
        assert_eq!(outcome.effects[0].kind, Bomb);
    }

    #[test]
    fn test_corner_bomb_clamps_to_bounds() {
        let grid = grid_3x3([
            [Bomb, Lemon, Orange],
            [Grape, Bell, Cherry],
            [Diamond, Cherry, Lemon],
        ]);
        let matches = vec![match_at(&grid, vec![Position::new(0, 0)])];
        let outcome = apply_effects(&grid, &matches, &mut rng(), 0);

        // 2x2 corner neighborhood: bomb + 3 neighbors
        assert_eq!(outcome.additional_removals.len(), 4);
        assert_eq!(outcome.bonus_points, 15 + 25 + 30);
    }

    #[test]
    fn test_star_clears_row_and_column_once() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Star, Bell],
            [Diamond, Cherry, Lemon],
        ]);
        let matches = vec![match_at(&grid, vec![Position::new(1, 1)])];
        let outcome = apply_effects(&grid, &matches, &mut rng(), 0);

        // Row 1 + column 1, crossing cell counted once: 5 cells total
        assert_eq!(outcome.additional_removals.len(), 5);
        assert_eq!(outcome.bonus_points, 25 + 30 + 15 + 10);
    }

    #[test]
    fn test_bonus_rolls_within_range() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Bonus, Bell],
            [Diamond, Cherry, Lemon],
        ]);
        let matches = vec![match_at(&grid, vec![Position::new(1, 1)])];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = apply_effects(&grid, &matches, &mut rng, 0);
            assert!(outcome.bonus_points >= BONUS_RANGE.0);
            assert!(outcome.bonus_points <= BONUS_RANGE.1);
            assert!(outcome.additional_removals.is_empty());
        }
    }

    #[test]
    fn test_reverse_pays_leader_share() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Reverse, Bell],
            [Diamond, Cherry, Lemon],
        ]);
        let matches = vec![match_at(&grid, vec![Position::new(1, 1)])];
        let outcome = apply_effects(&grid, &matches, &mut rng(), 123_456);
        assert_eq!(outcome.reverse_bonus, 24_691);
        assert_eq!(outcome.bonus_points, 24_691);
    }

    #[test]
    fn test_chain_bomb_clears_grid_at_flat_rate() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, ChainBomb, Bell],
            [Diamond, Cherry, Lemon],
        ]);
        let matches = vec![match_at(&grid, vec![Position::new(1, 1)])];
        let outcome = apply_effects(&grid, &matches, &mut rng(), 0);
        assert_eq!(outcome.additional_removals.len(), 9);
        assert_eq!(outcome.bonus_points, 9 * CHAIN_BOMB_POINTS_PER_CELL);
    }

    #[test]
    fn test_chain_pass_triggers_exposed_specials_once() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Bell, Star],
            [Diamond, Cherry, Lemon],
        ]);
        // The star at (1,2) was removed by someone else's blast
        let chain = check_chain_effects(&grid, &[Position::new(1, 2), Position::new(1, 2)]);
        assert_eq!(chain.effects.len(), 1);
        assert_eq!(chain.effects[0].kind, Star);
        // Row 1 + column 2: 4 cells beyond the star, plus the star
        assert_eq!(chain.removals.len(), 5);
    }

    #[test]
    fn test_chain_pass_ignores_plain_fruit() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Bell, Cherry],
            [Diamond, Cherry, Lemon],
        ]);
        let chain = check_chain_effects(&grid, &[Position::new(0, 0), Position::new(2, 2)]);
        assert!(chain.removals.is_empty());
        assert_eq!(chain.points, 0);
    }

    #[test]
    fn test_matched_special_processed_once_across_groups() {
        let grid = grid_3x3([
            [Cherry, Lemon, Orange],
            [Grape, Bomb, Bell],
            [Diamond, Cherry, Lemon],
        ]);
        let pos = Position::new(1, 1);
        let matches = vec![
            match_at(&grid, vec![pos]),
            match_at(&grid, vec![pos]),
        ];
        let outcome = apply_effects(&grid, &matches, &mut rng(), 0);
        assert_eq!(outcome.effects.len(), 1);
    }
}
