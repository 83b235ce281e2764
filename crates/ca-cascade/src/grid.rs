//! Grid model and generation with tunable special-symbol rarity

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::symbols::{SymbolKind, COMMON_SPECIALS, FRUITS};

/// Base probability of a special symbol per cell draw
pub const BASE_SPECIAL_CHANCE: f64 = 0.10;

/// Hard cap for the boosted special chance
pub const SPECIAL_CHANCE_CAP: f64 = 0.50;

/// A cell coordinate, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A square matrix of symbols; `None` marks a removed cell awaiting refill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Vec<Option<SymbolKind>>>,
}

impl Grid {
    /// An all-empty grid
    pub fn empty(size: usize) -> Self {
        Self {
            cells: vec![vec![None; size]; size],
        }
    }

    /// Build from raw rows (primarily for tests and fixtures)
    pub fn from_rows(cells: Vec<Vec<Option<SymbolKind>>>) -> Self {
        Self { cells }
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Symbol at a position, `None` if the cell is empty
    pub fn get(&self, pos: Position) -> Option<SymbolKind> {
        self.cells[pos.row][pos.col]
    }

    /// Place a symbol
    pub fn set(&mut self, pos: Position, symbol: SymbolKind) {
        self.cells[pos.row][pos.col] = Some(symbol);
    }

    /// Remove a symbol
    pub fn clear(&mut self, pos: Position) {
        self.cells[pos.row][pos.col] = None;
    }

    /// True when every cell holds a symbol
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_some()))
    }

    /// All positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let size = self.size();
        (0..size).flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
    }

    /// All positions currently empty
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions().filter(|&p| self.get(p).is_none()).collect()
    }

    /// Kind names row-major, for the renderer boundary (`""` for empties)
    pub fn kind_names(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|s| s.kind_name().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// Draws symbols and whole grids from a seedable random source
///
/// Owned by the session controller; the seed hook exists so full sessions
/// can be replayed deterministically.
pub struct GridGenerator {
    rng: StdRng,
    base_special_chance: f64,
}

impl GridGenerator {
    /// OS-entropy generator
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            base_special_chance: BASE_SPECIAL_CHANCE,
        }
    }

    /// Deterministic generator for replay and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_special_chance: BASE_SPECIAL_CHANCE,
        }
    }

    /// Re-seed in place
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Access to the RNG for sibling draws (bonus rolls, event picks)
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Produce a fully populated grid
    ///
    /// `boost_multiplier` scales the special-symbol chance (capped);
    /// `special_only` switches to the all-special distribution used during
    /// the symbol-rain event.
    pub fn generate(&mut self, size: usize, boost_multiplier: f64, special_only: bool) -> Grid {
        let mut grid = Grid::empty(size);
        for row in 0..size {
            for col in 0..size {
                let symbol = self.draw(boost_multiplier, special_only);
                grid.set(Position::new(row, col), symbol);
            }
        }
        grid
    }

    /// Draw a single symbol
    pub fn draw(&mut self, boost_multiplier: f64, special_only: bool) -> SymbolKind {
        if special_only {
            return self.draw_special_only();
        }

        let chance = (self.base_special_chance * boost_multiplier).min(SPECIAL_CHANCE_CAP);
        if self.rng.random::<f64>() < chance {
            self.draw_special_tiered()
        } else {
            FRUITS[self.rng.random_range(0..FRUITS.len())]
        }
    }

    /// Rarity tiers inside the special branch of a normal draw
    fn draw_special_tiered(&mut self) -> SymbolKind {
        let roll = self.rng.random::<f64>();
        if roll < 0.02 {
            SymbolKind::MegaJackpot
        } else if roll < 0.07 {
            SymbolKind::Reverse
        } else if roll < 0.15 {
            SymbolKind::ChainBomb
        } else {
            COMMON_SPECIALS[self.rng.random_range(0..COMMON_SPECIALS.len())]
        }
    }

    /// Fixed disjoint bands across all special kinds; no fruit can appear
    fn draw_special_only(&mut self) -> SymbolKind {
        let roll = self.rng.random::<f64>();
        if roll < 0.30 {
            SymbolKind::Wild
        } else if roll < 0.52 {
            SymbolKind::Bomb
        } else if roll < 0.74 {
            SymbolKind::Star
        } else if roll < 0.90 {
            SymbolKind::Bonus
        } else if roll < 0.96 {
            SymbolKind::ChainBomb
        } else if roll < 0.99 {
            SymbolKind::Reverse
        } else {
            SymbolKind::MegaJackpot
        }
    }
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self::new()
    }
}
