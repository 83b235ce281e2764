//! Symbol definitions — the closed alphabet of grid cell values

use serde::{Deserialize, Serialize};

/// Every symbol a grid cell can hold
///
/// Fruits carry a flat base value; specials pay 0 directly and derive their
/// value from the effect they trigger (see `effects`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    // Fruits, ascending value
    Cherry,
    Lemon,
    Orange,
    Grape,
    Bell,
    Diamond,
    // Common specials
    /// Substitutes for any symbol in a run
    Wild,
    /// Clears its 3x3 neighborhood
    Bomb,
    /// Clears its full row and column
    Star,
    /// Pays a random flat bonus
    Bonus,
    // Rare specials
    /// Instant 50,000 point payout
    MegaJackpot,
    /// Pays 20% of the current leader's score
    Reverse,
    /// Clears the entire grid
    ChainBomb,
}

/// All fruit kinds, ascending value
pub const FRUITS: [SymbolKind; 6] = [
    SymbolKind::Cherry,
    SymbolKind::Lemon,
    SymbolKind::Orange,
    SymbolKind::Grape,
    SymbolKind::Bell,
    SymbolKind::Diamond,
];

/// The common special tier
pub const COMMON_SPECIALS: [SymbolKind; 4] = [
    SymbolKind::Wild,
    SymbolKind::Bomb,
    SymbolKind::Star,
    SymbolKind::Bonus,
];

/// The rare special tier, drawn through explicit rarity bands
pub const RARE_SPECIALS: [SymbolKind; 3] = [
    SymbolKind::MegaJackpot,
    SymbolKind::Reverse,
    SymbolKind::ChainBomb,
];

impl SymbolKind {
    /// Flat point value (0 for specials; their value is contextual)
    pub fn base_points(&self) -> u64 {
        match self {
            SymbolKind::Cherry => 10,
            SymbolKind::Lemon => 15,
            SymbolKind::Orange => 20,
            SymbolKind::Grape => 25,
            SymbolKind::Bell => 30,
            SymbolKind::Diamond => 50,
            SymbolKind::Wild
            | SymbolKind::Bomb
            | SymbolKind::Star
            | SymbolKind::Bonus
            | SymbolKind::MegaJackpot
            | SymbolKind::Reverse
            | SymbolKind::ChainBomb => 0,
        }
    }

    /// Is this a special symbol (triggered side effect rather than flat value)?
    pub fn is_special(&self) -> bool {
        !FRUITS.contains(self)
    }

    /// Stable camelCase kind name as used across the renderer boundary
    pub fn kind_name(&self) -> &'static str {
        match self {
            SymbolKind::Cherry => "cherry",
            SymbolKind::Lemon => "lemon",
            SymbolKind::Orange => "orange",
            SymbolKind::Grape => "grape",
            SymbolKind::Bell => "bell",
            SymbolKind::Diamond => "diamond",
            SymbolKind::Wild => "wild",
            SymbolKind::Bomb => "bomb",
            SymbolKind::Star => "star",
            SymbolKind::Bonus => "bonus",
            SymbolKind::MegaJackpot => "megaJackpot",
            SymbolKind::Reverse => "reverse",
            SymbolKind::ChainBomb => "chainBomb",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// Can two symbols participate in the same run?
///
/// True when identical or when either side is a wild.
pub fn can_match(a: SymbolKind, b: SymbolKind) -> bool {
    a == b || a == SymbolKind::Wild || b == SymbolKind::Wild
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fruit_points_ascend() {
        let mut prev = 0;
        for fruit in FRUITS {
            assert!(fruit.base_points() > prev);
            prev = fruit.base_points();
        }
    }

    #[test]
    fn test_specials_pay_zero() {
        for kind in [
            SymbolKind::Wild,
            SymbolKind::Bomb,
            SymbolKind::Star,
            SymbolKind::Bonus,
            SymbolKind::MegaJackpot,
            SymbolKind::Reverse,
            SymbolKind::ChainBomb,
        ] {
            assert!(kind.is_special());
            assert_eq!(kind.base_points(), 0);
        }
    }

    #[test]
    fn test_wild_matches_everything() {
        for fruit in FRUITS {
            assert!(can_match(SymbolKind::Wild, fruit));
            assert!(can_match(fruit, SymbolKind::Wild));
        }
        assert!(can_match(SymbolKind::Wild, SymbolKind::Bomb));
    }

    #[test]
    fn test_distinct_fruits_do_not_match() {
        assert!(!can_match(SymbolKind::Cherry, SymbolKind::Lemon));
        assert!(can_match(SymbolKind::Cherry, SymbolKind::Cherry));
    }

    #[test]
    fn test_serde_kind_names() {
        let json = serde_json::to_string(&SymbolKind::MegaJackpot).unwrap();
        assert_eq!(json, "\"megaJackpot\"");
        assert_eq!(
            serde_json::to_string(&SymbolKind::ChainBomb).unwrap(),
            "\"chainBomb\""
        );
    }
}
