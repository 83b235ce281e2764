//! Session controller: owns all player state, resolves spins synchronously,
//! drives the countdown, schedules global events, and settles the session
//! into a terminal result record.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use ca_stage::{
    sort_by_timestamp, CellPos, FallMove, Stage, StageEvent, StagePayload, TimestampGenerator,
};

use crate::betting::{self, Bet, BetKind, BettingState, SettledBet};
use crate::cascade::{self, CascadeOutcome, DroppedSymbol};
use crate::config::{ConfigError, SessionConfig};
use crate::effects::{self, SpecialEffect};
use crate::events::{
    bottom_scorers, ActiveEvent, EventScheduler, EventType, MEGA_TIME_MIN_CASCADES,
};
use crate::grid::{Grid, GridGenerator, Position};
use crate::history::{now_ms, GameResult, ParticipantRecord, GAME_TYPE};
use crate::matching::{self, MatchGroup};
use crate::scoring::{self, ScoreContext};
use crate::symbols::SymbolKind;

/// An entrant, before any session state attaches to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, accepting bets, not yet running
    Waiting,
    /// Clock running, spins accepted
    Playing,
    /// Terminal; result record emitted
    Finished,
}

/// Per-player aggregate counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub total_spins: u32,
    pub total_cascades: u32,
    /// Deepest cascade chain reached in any single spin
    pub highest_combo: u32,
    /// How often each special symbol fired for this player
    pub special_triggers: HashMap<SymbolKind, u32>,
}

/// Everything the session tracks about one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub score: u64,
    pub grid: Grid,
    /// Live cascade depth of an in-flight spin; zero between spins
    pub cascade_level: u32,
    pub remaining_spins: u32,
    pub is_spinning: bool,
    /// Matchless spins in a row, feeds the underdog boost
    pub consecutive_failures: u32,
    pub underdog_boost: f64,
    pub stats: PlayerStats,
}

impl PlayerState {
    pub fn new(participant: &Participant, grid: Grid, max_spins: u32) -> Self {
        Self {
            id: participant.id.clone(),
            name: participant.name.clone(),
            score: 0,
            grid,
            cascade_level: 0,
            remaining_spins: max_spins,
            is_spinning: false,
            consecutive_failures: 0,
            underdog_boost: 1.0,
            stats: PlayerStats::default(),
        }
    }
}

/// One fully settled cascade step inside a spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    pub step_index: u32,
    pub matches: Vec<MatchGroup>,
    pub effects: Vec<SpecialEffect>,
    /// Every cell cleared this step: matched runs, blast areas, chains
    pub removed: Vec<Position>,
    pub dropped: Vec<DroppedSymbol>,
    pub new_symbols: Vec<Position>,
    /// Grid after gravity and refill
    pub grid_after: Grid,
    pub step_score: u64,
    pub multiplier: f64,
}

/// The complete record of one spin, from reveal to settled chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinReport {
    pub player_id: String,
    pub initial_grid: Grid,
    pub steps: Vec<CascadeStep>,
    pub total_score: u64,
    pub cascade_depth: u32,
    /// True when the initial grid held no runs at all
    pub matchless: bool,
}

impl SpinReport {
    /// Render the spin as a timestamped stage-event timeline.
    ///
    /// The simulation already settled; these events exist so a renderer can
    /// replay the spin at a human pace. Events come out timestamp-sorted.
    pub fn generate_stages(&self, timing: &mut TimestampGenerator) -> Vec<StageEvent> {
        timing.reset();
        let who = StagePayload::new().player(&self.player_id);
        let mut events = vec![
            StageEvent::with_payload(Stage::SpinStart, timing.current(), who.clone()),
            StageEvent::with_payload(
                Stage::GridReveal {
                    grid: self.initial_grid.kind_names(),
                },
                timing.reveal(),
                who.clone(),
            ),
            StageEvent::with_payload(Stage::EvaluateMatches, timing.advance(0.0), who.clone()),
        ];

        if !self.steps.is_empty() {
            events.push(StageEvent::with_payload(
                Stage::CascadeStart,
                timing.advance(0.0),
                who.clone(),
            ));
        }

        for step in &self.steps {
            for group in &step.matches {
                events.push(StageEvent::with_payload(
                    Stage::MatchHighlight {
                        positions: cells(&group.positions),
                        symbol: group.symbol.kind_name().to_string(),
                    },
                    timing.highlight(),
                    who.clone().win_amount(group.points),
                ));
            }
            for effect in &step.effects {
                events.push(StageEvent::with_payload(
                    Stage::SpecialTrigger {
                        kind: effect.kind.kind_name().to_string(),
                        origin: cell(effect.origin),
                        affected: cells(&effect.affected),
                    },
                    timing.advance(0.0),
                    who.clone(),
                ));
            }
            events.push(StageEvent::with_payload(
                Stage::SymbolsRemoved {
                    positions: cells(&step.removed),
                },
                timing.removal(),
                who.clone(),
            ));
            let max_fall = step.dropped.iter().map(|d| d.distance).max().unwrap_or(0);
            events.push(StageEvent::with_payload(
                Stage::SymbolsFall {
                    drops: step
                        .dropped
                        .iter()
                        .map(|d| FallMove {
                            row: d.row as u8,
                            col: d.col as u8,
                            distance: d.distance as u8,
                        })
                        .collect(),
                },
                timing.fall(max_fall as u8),
                who.clone(),
            ));
            events.push(StageEvent::with_payload(
                Stage::SymbolsRefill {
                    positions: cells(&step.new_symbols),
                },
                timing.refill(),
                who.clone(),
            ));
            events.push(StageEvent::with_payload(
                Stage::CascadeStep {
                    step_index: step.step_index,
                    multiplier: step.multiplier,
                },
                timing.cascade_pause(),
                who.clone().win_amount(step.step_score),
            ));
        }

        if !self.steps.is_empty() {
            events.push(StageEvent::with_payload(
                Stage::CascadeEnd {
                    total_steps: self.cascade_depth,
                    total_win: self.total_score,
                },
                timing.advance(0.0),
                who.clone().win_amount(self.total_score),
            ));
        }
        events.push(StageEvent::with_payload(
            Stage::SpinEnd,
            timing.advance(0.0),
            who,
        ));

        sort_by_timestamp(&mut events);
        events
    }
}

fn cell(pos: Position) -> CellPos {
    CellPos::new(pos.row as u8, pos.col as u8)
}

fn cells(positions: &[Position]) -> Vec<CellPos> {
    positions.iter().copied().map(cell).collect()
}

/// The multiplayer session: all players, the clock, events, and betting
pub struct SessionController {
    config: SessionConfig,
    status: SessionStatus,
    players: Vec<PlayerState>,
    remaining_time: u32,
    generator: GridGenerator,
    scheduler: EventScheduler,
    active_event: Option<ActiveEvent>,
    /// Elapsed second at which the last event fired
    last_event_time: u32,
    /// Players owed a planted mega jackpot by an active reversal chance
    reversal_targets: Vec<String>,
    betting: BettingState,
    settled_bets: Vec<SettledBet>,
    started_at_ms: u64,
    result: Option<GameResult>,
}

impl SessionController {
    pub fn new(participants: &[Participant], config: SessionConfig) -> Result<Self, ConfigError> {
        Self::build(participants, config, GridGenerator::new(), EventScheduler::new())
    }

    /// Fully deterministic session: the initial player grids, every spin,
    /// and all event rolls replay from the seed.
    pub fn seeded(
        participants: &[Participant],
        config: SessionConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::build(
            participants,
            config,
            GridGenerator::seeded(seed),
            EventScheduler::seeded(seed.wrapping_add(1)),
        )
    }

    fn build(
        participants: &[Participant],
        config: SessionConfig,
        mut generator: GridGenerator,
        scheduler: EventScheduler,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if participants.is_empty() {
            return Err(ConfigError::NoParticipants);
        }
        if config.winner_count > participants.len() {
            return Err(ConfigError::InvalidWinnerCount);
        }

        let players = participants
            .iter()
            .map(|p| {
                let grid = generator.generate(config.grid_size, 1.0, false);
                PlayerState::new(p, grid, config.max_spins_per_player)
            })
            .collect();

        Ok(Self {
            remaining_time: config.duration_secs,
            config,
            status: SessionStatus::Waiting,
            players,
            generator,
            scheduler,
            active_event: None,
            last_event_time: 0,
            reversal_targets: Vec::new(),
            betting: BettingState::new(),
            settled_bets: Vec::new(),
            started_at_ms: 0,
            result: None,
        })
    }

    /// Reseed both RNG streams in place. Grids drawn before this call are
    /// unaffected; use [`SessionController::seeded`] to replay a whole
    /// session including its initial grids.
    pub fn seed(&mut self, seed: u64) {
        self.generator.seed(seed);
        self.scheduler.seed(seed.wrapping_add(1));
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn active_event(&self) -> Option<&ActiveEvent> {
        self.active_event.as_ref()
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn settled_bets(&self) -> &[SettledBet] {
        &self.settled_bets
    }

    /// Winner ids, best first; empty until the session finishes
    pub fn winners(&self) -> Vec<String> {
        self.result
            .as_ref()
            .map(|r| r.winners.iter().map(|w| w.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Accept a bet while the session is still waiting
    pub fn place_bet(&mut self, player_id: &str, kind: BetKind, amount: u64) -> bool {
        if self.status != SessionStatus::Waiting || !self.config.betting_enabled {
            return false;
        }
        if self.player(player_id).is_none() || amount == 0 {
            return false;
        }
        let odds = betting::dynamic_odds(&kind, self.players.len());
        self.betting.place(Bet {
            player_id: player_id.to_string(),
            kind,
            amount,
            odds,
        })
    }

    /// Start the clock and close the bet book
    pub fn start(&mut self) {
        if self.status != SessionStatus::Waiting {
            return;
        }
        self.betting.close();
        self.started_at_ms = now_ms();
        self.status = SessionStatus::Playing;
        log::info!(
            "session started: {} players, {}s, grid {}x{}",
            self.players.len(),
            self.config.duration_secs,
            self.config.grid_size,
            self.config.grid_size
        );
    }

    /// Resolve one spin for a player, fully, and return its record.
    ///
    /// Returns `None` when the spin is declined: session not running,
    /// unknown player, mid-spin, or spins exhausted.
    pub fn spin(&mut self, player_id: &str) -> Option<SpinReport> {
        if self.status != SessionStatus::Playing {
            return None;
        }
        let idx = self.players.iter().position(|p| p.id == player_id)?;
        {
            let player = &self.players[idx];
            if player.is_spinning || player.remaining_spins == 0 {
                log::debug!("spin declined for {player_id}");
                return None;
            }
        }

        let top_score = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        let boost = self.players[idx].underdog_boost;
        let event = self.current_event_type();
        let special_only = event == Some(EventType::SymbolRain);
        let event_multiplier = event.map(|e| e.score_multiplier()).unwrap_or(1.0);

        self.players[idx].is_spinning = true;
        self.players[idx].remaining_spins -= 1;

        let mut grid = self
            .generator
            .generate(self.config.grid_size, boost, special_only);

        // A reversal chance owes its targets one planted jackpot each
        if event == Some(EventType::ReversalChance) {
            if let Some(pos) = self.reversal_targets.iter().position(|id| id == player_id) {
                self.reversal_targets.remove(pos);
                self.plant_jackpot(&mut grid);
            }
        }

        let initial_grid = grid.clone();
        let mut steps = Vec::new();
        let mut total_score = 0u64;
        let mut depth = 0u32;
        let mega_time = event == Some(EventType::MegaTime);

        loop {
            let mut matches = matching::find_matches(&grid);
            if matches.is_empty() && mega_time && depth < MEGA_TIME_MIN_CASCADES {
                // Mega time guarantees a minimum chain length
                self.inject_wild_run(&mut grid);
                matches = matching::find_matches(&grid);
            }
            if matches.is_empty() {
                break;
            }

            let outcome =
                effects::apply_effects(&grid, &matches, self.generator.rng(), top_score);

            let matched: HashSet<Position> = matches
                .iter()
                .flat_map(|g| g.positions.iter().copied())
                .collect();
            let chain_candidates: Vec<Position> = outcome
                .additional_removals
                .iter()
                .copied()
                .filter(|pos| !matched.contains(pos))
                .collect();
            let chain = effects::check_chain_effects(&grid, &chain_candidates);

            let mut removed: Vec<Position> = matched.iter().copied().collect();
            removed.sort_by_key(|p| (p.row, p.col));
            let mut removal_set = matched.clone();
            for &pos in outcome
                .additional_removals
                .iter()
                .chain(chain.removals.iter())
            {
                if removal_set.insert(pos) {
                    removed.push(pos);
                }
            }

            let matched_points: u64 = matches.iter().map(|g| g.points).sum();
            let special_bonus = outcome.bonus_points + chain.points;
            let ctx = ScoreContext {
                multiplier_table: &self.config.cascade_multipliers,
                underdog_boost: boost,
                event_multiplier,
            };
            let step_score = scoring::step_score(matched_points, special_bonus, depth, &ctx);
            total_score += step_score;

            let mut all_effects = outcome.effects;
            all_effects.extend(chain.effects);
            for effect in &all_effects {
                *self.players[idx]
                    .stats
                    .special_triggers
                    .entry(effect.kind)
                    .or_insert(0) += 1;
            }

            for &pos in &removed {
                grid.clear(pos);
            }
            let CascadeOutcome {
                grid: refilled,
                dropped,
                new_symbols,
            } = cascade::resolve(&grid, &mut self.generator, boost, special_only);

            steps.push(CascadeStep {
                step_index: depth,
                matches,
                effects: all_effects,
                removed,
                dropped,
                new_symbols,
                grid_after: refilled.clone(),
                step_score,
                multiplier: scoring::effective_multiplier(depth, &ctx),
            });
            grid = refilled;
            depth += 1;
            self.players[idx].cascade_level = depth;
        }

        let matchless = depth == 0;
        {
            let player = &mut self.players[idx];
            player.grid = grid;
            // The chain depth travels in the report and stats; the live
            // counter goes back to zero between spins.
            player.cascade_level = 0;
            player.is_spinning = false;
            player.stats.total_spins += 1;
            if matchless {
                player.consecutive_failures += 1;
            } else {
                player.consecutive_failures = 0;
                player.score += total_score;
                player.stats.total_cascades += depth;
                player.stats.highest_combo = player.stats.highest_combo.max(depth);
            }
        }
        self.recompute_boosts();

        if self.players.iter().all(|p| p.remaining_spins == 0) {
            self.finish();
        }

        Some(SpinReport {
            player_id: player_id.to_string(),
            initial_grid,
            steps,
            total_score,
            cascade_depth: depth,
            matchless,
        })
    }

    /// Spin every player that still has spins, in roster order
    pub fn spin_all(&mut self) -> Vec<SpinReport> {
        let ids: Vec<String> = self.players.iter().map(|p| p.id.clone()).collect();
        ids.iter().filter_map(|id| self.spin(id)).collect()
    }

    /// Advance the session clock by one second.
    ///
    /// Returns the session-level stage events this tick produced, stamped
    /// with the elapsed session time in milliseconds.
    pub fn tick(&mut self) -> Vec<StageEvent> {
        if self.status != SessionStatus::Playing {
            return Vec::new();
        }

        self.remaining_time = self.remaining_time.saturating_sub(1);
        let elapsed = self.config.duration_secs - self.remaining_time;
        let stamp = f64::from(elapsed) * 1000.0;

        let mut events = vec![StageEvent::new(
            Stage::CountdownTick {
                remaining_secs: self.remaining_time,
            },
            stamp,
        )];

        if let Some(active) = &self.active_event {
            if active.is_expired(elapsed) {
                events.push(StageEvent::new(
                    Stage::EventEnd {
                        event: active.event.kind_name().to_string(),
                    },
                    stamp,
                ));
                self.active_event = None;
                self.reversal_targets.clear();
            }
        }

        if self.active_event.is_none() && self.remaining_time > 0 {
            let scores: Vec<u64> = self.players.iter().map(|p| p.score).collect();
            if let Some(event) = self.scheduler.maybe_trigger(
                elapsed,
                &scores,
                self.last_event_time,
                self.remaining_time,
            ) {
                log::info!("event triggered at {elapsed}s: {}", event.kind_name());
                if event == EventType::ReversalChance {
                    self.reversal_targets = self.bottom_three();
                }
                self.active_event = Some(ActiveEvent::new(event, elapsed));
                self.last_event_time = elapsed;
                events.push(StageEvent::new(
                    Stage::EventStart {
                        event: event.kind_name().to_string(),
                        duration_secs: event.duration_secs(),
                    },
                    stamp,
                ));
            }
        }

        if self.remaining_time == 0 && self.players.iter().all(|p| !p.is_spinning) {
            self.finish();
            events.push(StageEvent::new(
                Stage::SessionFinished {
                    winners: self.winners(),
                },
                stamp,
            ));
        }

        events
    }

    /// Settle bets, rank players, and emit the terminal result record
    fn finish(&mut self) {
        if self.status == SessionStatus::Finished {
            return;
        }

        if self.config.betting_enabled {
            self.settled_bets = betting::settle(self.betting.bets(), &mut self.players);
        }

        let mut ranked: Vec<&PlayerState> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        let participants: Vec<ParticipantRecord> = ranked
            .iter()
            .enumerate()
            .map(|(i, p)| ParticipantRecord {
                id: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
                rank: i + 1,
            })
            .collect();
        let winners = participants
            .iter()
            .take(self.config.winner_count)
            .cloned()
            .collect();

        let ended_at_ms = now_ms();
        self.result = Some(GameResult {
            game_type: GAME_TYPE.to_string(),
            participants,
            winners,
            game_config: serde_json::to_value(&self.config)
                .unwrap_or(serde_json::Value::Null),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
        });
        self.status = SessionStatus::Finished;
        self.active_event = None;
        log::info!(
            "session finished, winners: {}",
            self.winners().join(", ")
        );
    }

    fn current_event_type(&self) -> Option<EventType> {
        self.active_event.as_ref().map(|a| a.event)
    }

    /// Ids of the bottom three scorers (fewer on a small roster)
    fn bottom_three(&self) -> Vec<String> {
        let standings: Vec<(String, u64)> = self
            .players
            .iter()
            .map(|p| (p.id.clone(), p.score))
            .collect();
        bottom_scorers(&standings, 3)
    }

    /// Overwrite a random cell with a mega jackpot
    fn plant_jackpot(&mut self, grid: &mut Grid) {
        use rand::Rng;
        let size = grid.size();
        let row = self.generator.rng().random_range(0..size);
        let col = self.generator.rng().random_range(0..size);
        grid.set(Position::new(row, col), SymbolKind::MegaJackpot);
    }

    /// Drop three wilds in a random row so the next scan is guaranteed a run
    fn inject_wild_run(&mut self, grid: &mut Grid) {
        use rand::Rng;
        let size = grid.size();
        let row = self.generator.rng().random_range(0..size);
        let start = self.generator.rng().random_range(0..=size - 3);
        for col in start..start + 3 {
            grid.set(Position::new(row, col), SymbolKind::Wild);
        }
    }

    fn recompute_boosts(&mut self) {
        let mut standings: Vec<(String, u64)> = self
            .players
            .iter()
            .map(|p| (p.id.clone(), p.score))
            .collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1));
        let leader = standings.first().map(|(_, s)| *s).unwrap_or(0);
        let count = standings.len();

        for player in &mut self.players {
            let rank_index = standings
                .iter()
                .position(|(id, _)| *id == player.id)
                .unwrap_or(0);
            player.underdog_boost = scoring::underdog_boost(
                player.score,
                leader,
                player.consecutive_failures,
                rank_index,
                count,
            );
        }
    }
}
