//! Pure game-logic functions.
//!
//! Every public transition takes an immutable reference to the current
//! `RoundState` (and, where chance is involved, an RNG handle) and returns a
//! brand-new `RoundState`. Side effects are limited to the injected RNG.
//! Once a round is terminal every transition returns an unchanged copy.

use std::time::Duration;

use rand::Rng;
use tracing::trace;

use crate::entities::{
    Bullet, BulletOwner, Difficulty, DifficultySettings, Entity, EntityKind, GameEvent, Outcome,
    RoundState, PLAYER_SLOT,
};

// ── Arena & sprite geometry ──────────────────────────────────────────────────

pub const ARENA_WIDTH: f32 = 400.0;
pub const ARENA_HEIGHT: f32 = 550.0;

pub const PLAYER_SIZE: (f32, f32) = (40.0, 40.0);
pub const PLAYER_START: (f32, f32) = (180.0, 500.0);
/// Units moved per movement sample while a direction is held.
pub const PLAYER_STEP: f32 = 5.0;

pub const ENEMY_SIZE: (f32, f32) = (35.0, 35.0);
/// The wave's edge test is wider than the enemy sprite.
pub const WAVE_EDGE_EXTENT: f32 = 40.0;
pub const WAVE_STEP_DOWN: f32 = 10.0;
/// Spawn area for wave enemies (inclusive upper bounds of x and y).
pub const WAVE_SPAWN_AREA: (u32, u32) = (350, 200);

pub const BOSS_SIZE: (f32, f32) = (100.0, 60.0);
pub const BOSS_START: (f32, f32) = (150.0, 50.0);
pub const BOSS_HP: u32 = 100;
/// Horizontal components of the boss volley; vertical is always 1.
pub const BOSS_FAN: [f32; 5] = [-0.5, -0.25, 0.0, 0.25, 0.5];

pub const BULLET_SIZE: (f32, f32) = (5.0, 15.0);
const PLAYER_BULLET_SPEED: f32 = 10.0;
const ENEMY_BULLET_SPEED: f32 = 6.0;
const BOSS_BULLET_SPEED: f32 = 8.0;

// ── Difficulty tables ────────────────────────────────────────────────────────

pub fn settings(difficulty: Difficulty) -> DifficultySettings {
    match difficulty {
        Difficulty::Easy => DifficultySettings {
            enemy_speed: 1.0,
            tick_interval: Duration::from_millis(30),
            enemy_hp: 1,
            wave_size: 6,
            boss: false,
            enemy_fire_interval: Duration::from_millis(1000),
            enemy_fire_chance: 0.3,
            player_health: 3,
        },
        Difficulty::Normal => DifficultySettings {
            enemy_speed: 2.0,
            tick_interval: Duration::from_millis(30),
            enemy_hp: 2,
            wave_size: 6,
            boss: false,
            enemy_fire_interval: Duration::from_millis(800),
            enemy_fire_chance: 0.3,
            player_health: 3,
        },
        Difficulty::Hard => DifficultySettings {
            enemy_speed: 3.0,
            tick_interval: Duration::from_millis(25),
            enemy_hp: 2,
            wave_size: 6,
            boss: false,
            enemy_fire_interval: Duration::from_millis(500),
            enemy_fire_chance: 0.3,
            player_health: 3,
        },
        Difficulty::Goddamn => DifficultySettings {
            enemy_speed: 3.0,
            tick_interval: Duration::from_millis(20),
            enemy_hp: 4,
            wave_size: 1,
            boss: true,
            enemy_fire_interval: Duration::from_millis(250),
            enemy_fire_chance: 0.3,
            player_health: 2,
        },
    }
}

/// Score for destroying an enemy of the given kind.
fn destroy_bonus(kind: EntityKind) -> u32 {
    match kind {
        EntityKind::Boss => 100,
        _ => 20,
    }
}

/// Score for a hit that leaves the enemy alive.
const GRAZE_BONUS: u32 = 5;

// ── Bounding boxes ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Strict overlap; boxes that merely share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

pub fn size_of(kind: EntityKind) -> (f32, f32) {
    match kind {
        EntityKind::Player => PLAYER_SIZE,
        EntityKind::Enemy => ENEMY_SIZE,
        EntityKind::Boss => BOSS_SIZE,
    }
}

pub fn entity_bounds(entity: &Entity) -> Rect {
    let (w, h) = size_of(entity.kind);
    Rect { x: entity.x, y: entity.y, w, h }
}

pub fn bullet_bounds(bullet: &Bullet) -> Rect {
    Rect {
        x: bullet.x,
        y: bullet.y,
        w: BULLET_SIZE.0,
        h: BULLET_SIZE.1,
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// A round holding only the player, before any enemy is spawned.
pub fn bare_state(difficulty: Difficulty, player_name: &str) -> RoundState {
    let settings = settings(difficulty);
    RoundState {
        player_name: player_name.to_string(),
        difficulty,
        settings,
        entities: vec![Entity {
            id: 0,
            kind: EntityKind::Player,
            x: PLAYER_START.0,
            y: PLAYER_START.1,
            hp: settings.player_health,
        }],
        bullets: Vec::new(),
        score: 0,
        direction: 1,
        frame: 0,
        outcome: Outcome::InProgress,
        next_id: 1,
        events: Vec::new(),
    }
}

/// Append an enemy after every existing one and return its id.
pub fn spawn_enemy(state: &mut RoundState, kind: EntityKind, x: f32, y: f32, hp: u32) -> u32 {
    let id = state.next_id;
    state.next_id += 1;
    state.entities.push(Entity { id, kind, x, y, hp });
    id
}

/// Build the opening state of a round: the player plus either a randomly
/// placed wave or the boss, per the difficulty bundle.
pub fn init_state(difficulty: Difficulty, player_name: &str, rng: &mut impl Rng) -> RoundState {
    let mut state = bare_state(difficulty, player_name);
    if state.settings.boss {
        spawn_enemy(&mut state, EntityKind::Boss, BOSS_START.0, BOSS_START.1, BOSS_HP);
    } else {
        let hp = state.settings.enemy_hp;
        for _ in 0..state.settings.wave_size {
            let x = rng.gen_range(0..=WAVE_SPAWN_AREA.0) as f32;
            let y = rng.gen_range(0..=WAVE_SPAWN_AREA.1) as f32;
            spawn_enemy(&mut state, EntityKind::Enemy, x, y, hp);
        }
    }
    state
}

// ── Input-driven transitions (pure) ──────────────────────────────────────────

/// One movement sample. Both flags may be held; each applies its own step.
pub fn move_player(state: &RoundState, left: bool, right: bool) -> RoundState {
    let mut next = state.clone();
    if state.outcome.is_terminal() {
        return next;
    }
    let max_x = ARENA_WIDTH - PLAYER_SIZE.0;
    let player = next.player_mut();
    if left {
        player.x = (player.x - PLAYER_STEP).max(0.0);
    }
    if right {
        player.x = (player.x + PLAYER_STEP).min(max_x);
    }
    next
}

/// Launch one player bullet from just in front of the ship.
pub fn player_shoot(state: &RoundState) -> RoundState {
    let mut next = state.clone();
    if state.outcome.is_terminal() {
        return next;
    }
    let (x, y) = (state.player().x, state.player().y);
    next.bullets.push(Bullet {
        x: x + 17.0,
        y: y - 15.0,
        dx: 0.0,
        dy: -1.0,
        speed: PLAYER_BULLET_SPEED,
        owner: BulletOwner::Player,
    });
    next.events.push(GameEvent::ShotFired {
        owner: BulletOwner::Player,
        count: 1,
    });
    next
}

/// One enemy-fire trigger. Normal enemies each roll the fire chance for a
/// single downward bullet; a boss always fires its full fan.
pub fn enemy_fire(state: &RoundState, rng: &mut impl Rng) -> RoundState {
    let mut next = state.clone();
    if state.outcome.is_terminal() {
        return next;
    }
    let chance = state.settings.enemy_fire_chance.clamp(0.0, 1.0);
    let before = next.bullets.len();
    for enemy in state.enemies() {
        match enemy.kind {
            EntityKind::Boss => {
                for dx in BOSS_FAN {
                    next.bullets.push(Bullet {
                        x: enemy.x + 40.0,
                        y: enemy.y + 60.0,
                        dx,
                        dy: 1.0,
                        speed: BOSS_BULLET_SPEED,
                        owner: BulletOwner::Enemy,
                    });
                }
            }
            _ => {
                if rng.gen_bool(chance) {
                    next.bullets.push(Bullet {
                        x: enemy.x + 17.0,
                        y: enemy.y + 35.0,
                        dx: 0.0,
                        dy: 1.0,
                        speed: ENEMY_BULLET_SPEED,
                        owner: BulletOwner::Enemy,
                    });
                }
            }
        }
    }
    let count = next.bullets.len() - before;
    if count > 0 {
        next.events.push(GameEvent::ShotFired {
            owner: BulletOwner::Enemy,
            count,
        });
    }
    next
}

// ── Per-tick update ──────────────────────────────────────────────────────────

fn advance(mut bullet: Bullet) -> Bullet {
    bullet.x += bullet.dx * bullet.speed;
    bullet.y += bullet.dy * bullet.speed;
    bullet
}

/// Apply one hit to the enemy in `slot`, removing it when it runs out of
/// hit-points.
fn resolve_hit(state: &mut RoundState, slot: usize) {
    let enemy = &mut state.entities[slot];
    enemy.hp = enemy.hp.saturating_sub(1);
    let (id, kind, hp) = (enemy.id, enemy.kind, enemy.hp);

    if hp == 0 {
        state.entities.remove(slot);
        let bonus = destroy_bonus(kind);
        state.score += bonus;
        trace!(id, ?kind, bonus, "enemy destroyed");
        state.events.push(GameEvent::EnemyDestroyed { id, kind, bonus });
    } else {
        state.score += GRAZE_BONUS;
        trace!(id, hp, "enemy hit");
        state.events.push(GameEvent::EnemyHit {
            id,
            hp,
            bonus: GRAZE_BONUS,
        });
    }
}

/// Move the wave as one rigid formation. Returns `true` when a step down
/// brought any enemy level with the player.
fn march_wave(state: &mut RoundState) -> bool {
    let dx = state.settings.enemy_speed * state.direction as f32;
    let mut at_edge = false;
    for enemy in state.enemies_mut() {
        enemy.x += dx;
        if enemy.x <= 0.0 || enemy.x + WAVE_EDGE_EXTENT >= ARENA_WIDTH {
            at_edge = true;
        }
    }
    if !at_edge {
        return false;
    }

    state.direction = -state.direction;
    for enemy in state.enemies_mut() {
        enemy.x = enemy.x.clamp(0.0, ARENA_WIDTH - WAVE_EDGE_EXTENT);
        enemy.y += WAVE_STEP_DOWN;
    }
    state.events.push(GameEvent::WaveStepped {
        direction: state.direction,
    });

    let player_y = state.player().y;
    state
        .enemies()
        .iter()
        .any(|e| e.y + size_of(e.kind).1 >= player_y)
}

/// Reflecting bounce between the side walls; the boss never descends.
fn bounce_boss(state: &mut RoundState) {
    let dx = state.settings.enemy_speed * state.direction as f32;
    let max_x = ARENA_WIDTH - BOSS_SIZE.0;
    let mut reflect = false;
    for boss in state.enemies_mut() {
        boss.x += dx;
        if boss.x <= 0.0 {
            boss.x = 0.0;
            reflect = true;
        } else if boss.x >= max_x {
            boss.x = max_x;
            reflect = true;
        }
    }
    if reflect {
        state.direction = -state.direction;
    }
}

fn end_round(mut state: RoundState, outcome: Outcome) -> RoundState {
    state.outcome = outcome;
    state.events.push(GameEvent::RoundOver { outcome });
    state
}

/// Advance the simulation by one tick.
///
/// Order: player bullets move, player bullets resolve against enemies, the
/// formation moves, enemy bullets move and resolve against the player, then
/// the win check. Either loss condition returns at once, so a tick can
/// never both win and lose.
pub fn tick(state: &RoundState) -> RoundState {
    if state.outcome.is_terminal() {
        return state.clone();
    }
    let mut next = state.clone();
    next.frame += 1;

    let (player_bullets, enemy_bullets): (Vec<Bullet>, Vec<Bullet>) = next
        .bullets
        .drain(..)
        .partition(|b| b.owner == BulletOwner::Player);

    // ── 1. Move player bullets, dropping those past the top ──────────────────
    let player_bullets = player_bullets
        .into_iter()
        .map(advance)
        .filter(|b| b.y >= 0.0);

    // ── 2. Collision: player bullets ↔ enemies ───────────────────────────────
    for bullet in player_bullets {
        let bounds = bullet_bounds(&bullet);
        let target = next
            .entities
            .iter()
            .enumerate()
            .skip(PLAYER_SLOT + 1)
            .find(|(_, e)| e.hp > 0 && entity_bounds(e).overlaps(&bounds))
            .map(|(slot, _)| slot);
        match target {
            Some(slot) => resolve_hit(&mut next, slot),
            None => next.bullets.push(bullet),
        }
    }

    // ── 3. Move the formation ────────────────────────────────────────────────
    let boss_round = next.enemies().iter().any(|e| e.kind == EntityKind::Boss);
    if boss_round {
        bounce_boss(&mut next);
    } else if march_wave(&mut next) {
        next.bullets.extend(enemy_bullets);
        return end_round(next, Outcome::Lost);
    }

    // ── 4. Move enemy bullets & collide with the player ──────────────────────
    let mut enemy_bullets = enemy_bullets.into_iter();
    while let Some(bullet) = enemy_bullets.next() {
        let bullet = advance(bullet);
        if bullet.y > ARENA_HEIGHT {
            continue;
        }
        if !bullet_bounds(&bullet).overlaps(&entity_bounds(next.player())) {
            next.bullets.push(bullet);
            continue;
        }

        let player = next.player_mut();
        player.hp = player.hp.saturating_sub(1);
        let health = player.hp;
        trace!(health, "player hit");
        next.events.push(GameEvent::PlayerHit { health });
        if health == 0 {
            next.bullets.extend(enemy_bullets);
            return end_round(next, Outcome::Lost);
        }
    }

    // ── 5. Win check ─────────────────────────────────────────────────────────
    if next.enemies().is_empty() {
        return end_round(next, Outcome::Won);
    }
    next
}
