//! All game entity types. Pure data plus a few accessors; the rules that
//! move this data live in `compute`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::ConfigError;

// ── Difficulty ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
    /// A single high hit-point boss instead of a wave.
    Goddamn,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Goddamn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Goddamn => "Goddamn",
        }
    }

    /// Lenient lookup used by menus: anything unrecognised plays as `Easy`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Next tier in menu order, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownDifficulty(wanted.to_string()))
    }
}

/// One fixed bundle of tuning values, applied as a whole at round start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySettings {
    /// Horizontal units per tick for the wave (or the boss).
    pub enemy_speed: f32,
    pub tick_interval: Duration,
    pub enemy_hp: u32,
    pub wave_size: usize,
    pub boss: bool,
    pub enemy_fire_interval: Duration,
    /// Chance that a normal enemy fires on each enemy-fire trigger.
    pub enemy_fire_chance: f64,
    pub player_health: u32,
}

// ── Outcome & kinds ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// A ship on the field. `hp` is health for the player and hit-points for
/// enemies.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Stable across ticks; never reused within a round.
    pub id: u32,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub hp: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    /// Direction vector; not required to be normalised.
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    pub owner: BulletOwner,
}

/// Something that happened while the round advanced, reported to the
/// presentation layer with the next snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ShotFired { owner: BulletOwner, count: usize },
    EnemyHit { id: u32, hp: u32, bonus: u32 },
    EnemyDestroyed { id: u32, kind: EntityKind, bonus: u32 },
    WaveStepped { direction: i32 },
    PlayerHit { health: u32 },
    RoundOver { outcome: Outcome },
}

// ── Round state ───────────────────────────────────────────────────────────────

/// Slot of the player in `RoundState::entities`.
pub const PLAYER_SLOT: usize = 0;

/// The entire state of one round. Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct RoundState {
    pub player_name: String,
    pub difficulty: Difficulty,
    pub settings: DifficultySettings,
    /// Player at `PLAYER_SLOT`, enemies after it in spawn order.
    pub entities: Vec<Entity>,
    pub bullets: Vec<Bullet>,
    pub score: u32,
    /// Horizontal heading of the wave or boss, `1` or `-1`.
    pub direction: i32,
    pub frame: u64,
    pub outcome: Outcome,
    pub next_id: u32,
    /// Events not yet handed to the presentation layer.
    pub events: Vec<GameEvent>,
}

impl RoundState {
    pub fn player(&self) -> &Entity {
        &self.entities[PLAYER_SLOT]
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.entities[PLAYER_SLOT]
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.entities[PLAYER_SLOT + 1..]
    }

    pub fn enemies_mut(&mut self) -> &mut [Entity] {
        &mut self.entities[PLAYER_SLOT + 1..]
    }
}
