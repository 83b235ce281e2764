//! Step pricing and the underdog catch-up boost
//!
//! The boost biases cascade VALUE, never match likelihood: trailing players
//! earn more per cascade, but the grid draw still decides whether anything
//! matches (the draw reads the boost separately, for special frequency).

use crate::cascade::{cascade_flat_bonus, cascade_multiplier};

/// Upper bound of the underdog boost
pub const UNDERDOG_CAP: f64 = 4.0;

/// Matchless-spin streak at which the failure bonus kicks in
pub const FAILURE_STREAK_THRESHOLD: u32 = 3;

/// Everything beyond the raw match points that prices a cascade step
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// Per-depth multiplier table (clamped to its last entry)
    pub multiplier_table: &'a [f64],
    /// The spinning player's underdog boost, in [1.0, 4.0]
    pub underdog_boost: f64,
    /// Global multiplier from the active event (1.0 when none)
    pub event_multiplier: f64,
}

/// Price one cascade step.
///
/// `(matched + special) * depth_multiplier * boost_adjust * event + flat`
/// where the boost contributes at half weight. All factors are >= 0, so the
/// cumulative spin score is non-decreasing.
pub fn step_score(matched_points: u64, special_bonus: u64, depth: u32, ctx: &ScoreContext) -> u64 {
    let multiplier = effective_multiplier(depth, ctx);
    let raw = (matched_points + special_bonus) as f64 * multiplier;
    raw.round() as u64 + cascade_flat_bonus(depth)
}

/// The combined multiplier applied at a given depth
pub fn effective_multiplier(depth: u32, ctx: &ScoreContext) -> f64 {
    cascade_multiplier(depth, ctx.multiplier_table)
        * (1.0 + (ctx.underdog_boost - 1.0) * 0.5)
        * ctx.event_multiplier
}

/// Score-gap component: steps up as the player falls behind the leader
pub fn score_gap_bonus(score: u64, leader_score: u64) -> f64 {
    let gap = leader_score.saturating_sub(score);
    if gap >= 50_000 {
        3.0
    } else if gap >= 30_000 {
        2.0
    } else if gap >= 10_000 {
        1.5
    } else {
        1.0
    }
}

/// Failure-streak component: doubled value after three matchless spins
pub fn failure_bonus(consecutive_failures: u32) -> f64 {
    if consecutive_failures >= FAILURE_STREAK_THRESHOLD {
        2.0
    } else {
        1.0
    }
}

/// Rank component. `rank_index` is 0-based by descending score.
pub fn rank_bonus(rank_index: usize, player_count: usize) -> f64 {
    if player_count <= 1 {
        return 1.0;
    }
    if rank_index == player_count - 1 {
        1.5
    } else if (rank_index + 1) as f64 > player_count as f64 * 0.7 {
        1.2
    } else {
        1.0
    }
}

/// The blended underdog boost, always within [1.0, UNDERDOG_CAP]
pub fn underdog_boost(
    score: u64,
    leader_score: u64,
    consecutive_failures: u32,
    rank_index: usize,
    player_count: usize,
) -> f64 {
    let blended = 0.4 * score_gap_bonus(score, leader_score)
        + 0.4 * failure_bonus(consecutive_failures)
        + 0.2 * rank_bonus(rank_index, player_count);
    blended.clamp(1.0, UNDERDOG_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::DEFAULT_MULTIPLIERS;

    fn ctx(boost: f64, event: f64) -> ScoreContext<'static> {
        ScoreContext {
            multiplier_table: &DEFAULT_MULTIPLIERS,
            underdog_boost: boost,
            event_multiplier: event,
        }
    }

    #[test]
    fn test_neutral_context_uses_table_directly() {
        let ctx = ctx(1.0, 1.0);
        assert_eq!(step_score(100, 0, 0, &ctx), 100);
        assert_eq!(step_score(100, 0, 1, &ctx), 150);
        assert_eq!(step_score(100, 0, 3, &ctx), 300);
        // Clamped beyond the table
        assert_eq!(step_score(100, 0, 10, &ctx), 300 + cascade_flat_bonus(10));
    }

    #[test]
    fn test_boost_contributes_at_half_weight() {
        // boost 3.0 -> adjust 1 + (3-1)*0.5 = 2.0
        let ctx = ctx(3.0, 1.0);
        assert_eq!(step_score(100, 0, 0, &ctx), 200);
    }

    #[test]
    fn test_event_multiplier_stacks() {
        let ctx = ctx(1.0, 3.0);
        assert_eq!(step_score(100, 50, 1, &ctx), (150.0_f64 * 1.5 * 3.0).round() as u64);
    }

    #[test]
    fn test_flat_bonus_added_after_multiplier() {
        let ctx = ctx(1.0, 1.0);
        // Depth 5: table clamps to 3.0, flat bonus 1000 added unscaled
        assert_eq!(step_score(10, 0, 5, &ctx), 30 + 1000);
    }

    #[test]
    fn test_gap_bonus_thresholds() {
        assert_eq!(score_gap_bonus(0, 5_000), 1.0);
        assert_eq!(score_gap_bonus(0, 10_000), 1.5);
        assert_eq!(score_gap_bonus(0, 30_000), 2.0);
        assert_eq!(score_gap_bonus(0, 50_000), 3.0);
        // Leader never lags behind themselves
        assert_eq!(score_gap_bonus(80_000, 50_000), 1.0);
    }

    #[test]
    fn test_rank_bonus_bands() {
        // 10 players: last place, bottom 30%, everyone else
        assert_eq!(rank_bonus(9, 10), 1.5);
        assert_eq!(rank_bonus(8, 10), 1.2);
        assert_eq!(rank_bonus(7, 10), 1.2);
        assert_eq!(rank_bonus(6, 10), 1.0);
        assert_eq!(rank_bonus(0, 10), 1.0);
        assert_eq!(rank_bonus(0, 1), 1.0);
    }

    #[test]
    fn test_boost_bounds_exhaustive() {
        for leader in [0u64, 9_999, 10_000, 30_000, 50_000, 1_000_000] {
            for failures in 0..6 {
                for count in 1..8usize {
                    for rank in 0..count {
                        let boost = underdog_boost(0, leader, failures, rank, count);
                        assert!((1.0..=UNDERDOG_CAP).contains(&boost), "boost {boost} out of bounds");
                    }
                }
            }
        }
    }

    #[test]
    fn test_trailing_player_maxes_out_blend() {
        // 50k+ gap, 3+ failures, last of 5: 0.4*3 + 0.4*2 + 0.2*1.5 = 2.3
        let boost = underdog_boost(0, 60_000, 4, 4, 5);
        assert!((boost - 2.3).abs() < 1e-9);
    }
}
