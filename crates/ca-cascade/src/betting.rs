//! Optional betting overlay: bet kinds, dynamic odds, end-of-session
//! settlement blended into final scores

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::PlayerState;

/// Own-score bets win within this distance of the target
pub const SCORE_TOLERANCE: u64 = 10_000;

/// Combined-score bets win within this distance of the target
pub const TOTAL_SCORE_TOLERANCE: u64 = 50_000;

/// Score a player must reach for the jackpot bet
pub const JACKPOT_THRESHOLD: u64 = 50_000;

/// What a bet is staked on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BetKind {
    /// Own final rank, exact (1-based)
    MyRank { target: usize },
    /// Own final score within +/- 10,000
    MyScore { target: u64 },
    /// Combined final score within +/- 50,000
    TotalScore { target: u64 },
    /// Exact max combo depth across all players
    HighestCombo { target: u32 },
    /// Own score reaches 50,000+
    MegaJackpot,
}

impl BetKind {
    /// Stable camelCase name for summaries and the renderer boundary
    pub fn kind_name(&self) -> &'static str {
        match self {
            BetKind::MyRank { .. } => "myRank",
            BetKind::MyScore { .. } => "myScore",
            BetKind::TotalScore { .. } => "totalScore",
            BetKind::HighestCombo { .. } => "highestCombo",
            BetKind::MegaJackpot => "megaJackpot",
        }
    }

    fn base_odds(&self) -> f64 {
        match self {
            BetKind::MyRank { .. } => 3.0,
            BetKind::MyScore { .. } => 5.0,
            BetKind::TotalScore { .. } => 4.0,
            BetKind::HighestCombo { .. } => 6.0,
            BetKind::MegaJackpot => 8.0,
        }
    }
}

/// A placed bet with its pre-agreed odds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub player_id: String,
    pub kind: BetKind,
    pub amount: u64,
    pub odds: f64,
}

/// A bet after evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledBet {
    pub bet: Bet,
    pub won: bool,
    /// `amount * odds` when won, 0 when lost
    pub payout: u64,
}

/// Open/closed bet book for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BettingState {
    bets: Vec<Bet>,
    closed: bool,
}

impl BettingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a bet; refused once closed
    pub fn place(&mut self, bet: Bet) -> bool {
        if self.closed {
            return false;
        }
        self.bets.push(bet);
        true
    }

    /// Close the book; no further bets accepted
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }
}

/// Aggregate view of the bet book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingSummary {
    pub total_bet_amount: u64,
    pub potential_payout: u64,
    pub bets_by_type: HashMap<String, usize>,
}

/// Summarize the current book
pub fn summary(bets: &[Bet]) -> BettingSummary {
    let mut bets_by_type = HashMap::new();
    let mut total_bet_amount = 0;
    let mut potential_payout = 0;
    for bet in bets {
        total_bet_amount += bet.amount;
        potential_payout += (bet.amount as f64 * bet.odds).round() as u64;
        *bets_by_type
            .entry(bet.kind.kind_name().to_string())
            .or_insert(0) += 1;
    }
    BettingSummary {
        total_bet_amount,
        potential_payout,
        bets_by_type,
    }
}

/// Odds adjusted for the roster; one decimal place
pub fn dynamic_odds(kind: &BetKind, player_count: usize) -> f64 {
    let odds = match kind {
        BetKind::MyRank { target } => {
            // Predicting a higher placement pays more with a bigger field
            let factor = match target {
                1 => 0.8,
                2 => 0.6,
                3 => 0.4,
                _ => 0.3,
            };
            player_count as f64 * factor
        }
        _ => kind.base_odds(),
    };
    (odds * 10.0).round() / 10.0
}

/// Evaluate every bet against final player state and blend winnings and
/// losses directly into scores. Settlement happens before final ranking,
/// so bets can change placement order — intentional.
///
/// All bets are judged against a snapshot of the pre-settlement scores;
/// one bet's payout never changes how a later bet is evaluated.
///
/// An empty bet list is a no-op.
pub fn settle(bets: &[Bet], players: &mut [PlayerState]) -> Vec<SettledBet> {
    if bets.is_empty() {
        return Vec::new();
    }

    let scores: HashMap<String, u64> = players
        .iter()
        .map(|p| (p.id.clone(), p.score))
        .collect();
    let mut standings: Vec<(String, u64)> = players
        .iter()
        .map(|p| (p.id.clone(), p.score))
        .collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1));
    let total_score: u64 = players.iter().map(|p| p.score).sum();
    let highest_combo = players
        .iter()
        .map(|p| p.stats.highest_combo)
        .max()
        .unwrap_or(0);

    let mut settled = Vec::with_capacity(bets.len());
    for bet in bets {
        let won = evaluate(bet, &scores, &standings, total_score, highest_combo);
        let payout = if won {
            (bet.amount as f64 * bet.odds).round() as u64
        } else {
            0
        };
        if let Some(player) = players.iter_mut().find(|p| p.id == bet.player_id) {
            if won {
                player.score += payout;
            } else {
                player.score = player.score.saturating_sub(bet.amount);
            }
        }
        settled.push(SettledBet {
            bet: bet.clone(),
            won,
            payout,
        });
    }
    settled
}

fn evaluate(
    bet: &Bet,
    scores: &HashMap<String, u64>,
    standings: &[(String, u64)],
    total_score: u64,
    highest_combo: u32,
) -> bool {
    let bettor_score = match scores.get(&bet.player_id) {
        Some(&score) => score,
        None => return false,
    };

    match &bet.kind {
        BetKind::MyRank { target } => standings
            .iter()
            .position(|(id, _)| *id == bet.player_id)
            .map(|idx| idx + 1 == *target)
            .unwrap_or(false),
        BetKind::MyScore { target } => bettor_score.abs_diff(*target) <= SCORE_TOLERANCE,
        BetKind::TotalScore { target } => total_score.abs_diff(*target) <= TOTAL_SCORE_TOLERANCE,
        BetKind::HighestCombo { target } => highest_combo == *target,
        BetKind::MegaJackpot => bettor_score >= JACKPOT_THRESHOLD,
    }
}
