//! A running round: the authoritative state plus its input and cadences.
//!
//! The host drives a `Round` with `on_tick(elapsed)` and renders the
//! returned `RoundSnapshot`. Input arrives through `set_move_intent` and
//! `fire_requested`; the end of the round is announced once through the
//! listeners registered with `on_round_end`.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use crate::compute;
use crate::entities::{Bullet, Difficulty, Entity, GameEvent, Outcome, RoundState};
use crate::schedule::{Schedule, Trigger};

/// Held-direction flags are sampled at this rate regardless of difficulty.
pub const MOVEMENT_SAMPLE: Duration = Duration::from_millis(16);

/// Final result of a round, handed to `on_round_end` listeners.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundEnd {
    pub outcome: Outcome,
    pub score: u32,
    pub player_name: String,
    pub difficulty: Difficulty,
    pub ticks: u64,
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct RoundSnapshot {
    pub frame: u64,
    pub player_name: String,
    pub difficulty: Difficulty,
    pub score: u32,
    pub health: u32,
    pub outcome: Outcome,
    pub player: Entity,
    pub enemies: Vec<Entity>,
    pub bullets: Vec<Bullet>,
    /// Events since the previous snapshot.
    pub events: Vec<GameEvent>,
    /// Set once the round is over.
    pub ended: Option<RoundEnd>,
}

type RoundEndListener = Box<dyn FnMut(&RoundEnd)>;

pub struct Round {
    state: RoundState,
    schedule: Schedule,
    rng: StdRng,
    move_left: bool,
    move_right: bool,
    pending_shots: u32,
    listeners: Vec<RoundEndListener>,
    ended: Option<RoundEnd>,
}

impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round")
            .field("state", &self.state)
            .field("schedule", &self.schedule)
            .field("pending_shots", &self.pending_shots)
            .field("listeners", &self.listeners.len())
            .field("ended", &self.ended)
            .finish()
    }
}

impl Round {
    pub fn new(difficulty: Difficulty, player_name: &str) -> Self {
        Self::with_seed(difficulty, player_name, rand::thread_rng().next_u64())
    }

    /// Same seed and same inputs replay the same round.
    pub fn with_seed(difficulty: Difficulty, player_name: &str, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = compute::init_state(difficulty, player_name, &mut rng);
        debug!(
            %difficulty,
            player = player_name,
            enemies = state.enemies().len(),
            seed,
            "round created"
        );
        Self::assemble(state, rng)
    }

    /// Resume from a prepared state, e.g. a hand-placed scenario.
    pub fn from_state(state: RoundState, seed: u64) -> Self {
        Self::assemble(state, StdRng::seed_from_u64(seed))
    }

    fn assemble(state: RoundState, rng: StdRng) -> Self {
        let schedule = Schedule::new(
            MOVEMENT_SAMPLE,
            state.settings.tick_interval,
            state.settings.enemy_fire_interval,
        );
        let mut round = Self {
            state,
            schedule,
            rng,
            move_left: false,
            move_right: false,
            pending_shots: 0,
            listeners: Vec::new(),
            ended: None,
        };
        if round.state.outcome.is_terminal() {
            round.finish();
        }
        round
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome
    }

    pub fn is_over(&self) -> bool {
        self.state.outcome.is_terminal()
    }

    pub fn ended(&self) -> Option<&RoundEnd> {
        self.ended.as_ref()
    }

    /// Held-direction flags, applied on every movement sample until changed.
    pub fn set_move_intent(&mut self, left: bool, right: bool) {
        self.move_left = left;
        self.move_right = right;
    }

    /// One press of the fire button. The bullet launches at the start of the
    /// next simulation tick; presses after the round ended are ignored.
    pub fn fire_requested(&mut self) {
        if !self.is_over() {
            self.pending_shots += 1;
        }
    }

    /// Register a listener for the end of the round. It runs exactly once;
    /// if the round already ended it runs immediately.
    pub fn on_round_end<F>(&mut self, mut listener: F)
    where
        F: FnMut(&RoundEnd) + 'static,
    {
        match &self.ended {
            Some(end) => listener(end),
            None => self.listeners.push(Box::new(listener)),
        }
    }

    /// Advance the virtual clock by `elapsed` and run every trigger that fell
    /// due, oldest first. At most one second of virtual time
    /// ([`MAX_CATCH_UP`](crate::schedule::MAX_CATCH_UP)) is added per call;
    /// anything beyond that is dropped rather than replayed.
    pub fn on_tick(&mut self, elapsed: Duration) -> RoundSnapshot {
        if self.schedule.is_stopped() {
            return self.snapshot();
        }
        self.schedule.advance(elapsed);
        while let Some(trigger) = self.schedule.pop_due() {
            match trigger {
                Trigger::Movement => {
                    self.state = compute::move_player(&self.state, self.move_left, self.move_right);
                }
                Trigger::Simulation => self.run_tick(),
                Trigger::EnemyFire => {
                    self.state = compute::enemy_fire(&self.state, &mut self.rng);
                }
            }
        }
        self.snapshot()
    }

    /// Run exactly one simulation tick, ignoring the cadences.
    pub fn step(&mut self) -> RoundSnapshot {
        if !self.is_over() {
            self.run_tick();
        }
        self.snapshot()
    }

    /// Current view of the round. Hands over and clears pending events.
    pub fn snapshot(&mut self) -> RoundSnapshot {
        let state = &mut self.state;
        RoundSnapshot {
            frame: state.frame,
            player_name: state.player_name.clone(),
            difficulty: state.difficulty,
            score: state.score,
            health: state.player().hp,
            outcome: state.outcome,
            player: state.player().clone(),
            enemies: state.enemies().to_vec(),
            bullets: state.bullets.clone(),
            events: std::mem::take(&mut state.events),
            ended: self.ended.clone(),
        }
    }

    fn run_tick(&mut self) {
        for _ in 0..std::mem::take(&mut self.pending_shots) {
            self.state = compute::player_shoot(&self.state);
        }
        self.state = compute::tick(&self.state);
        if self.is_over() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.ended.is_some() {
            return;
        }
        self.schedule.stop();
        self.pending_shots = 0;

        let end = RoundEnd {
            outcome: self.state.outcome,
            score: self.state.score,
            player_name: self.state.player_name.clone(),
            difficulty: self.state.difficulty,
            ticks: self.state.frame,
        };
        info!(
            outcome = ?end.outcome,
            score = end.score,
            player = %end.player_name,
            ticks = end.ticks,
            elapsed_ms = self.schedule.now().as_millis() as u64,
            "round over"
        );
        for listener in self.listeners.iter_mut() {
            listener(&end);
        }
        self.listeners.clear();
        self.ended = Some(end);
    }
}
