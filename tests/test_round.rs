use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use space_invader::compute::{bare_state, spawn_enemy};
use space_invader::entities::*;
use space_invader::round::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Easy round with one enemy far from the player and nothing in flight.
fn quiet_round() -> Round {
    let mut s = bare_state(Difficulty::Easy, "Tester");
    spawn_enemy(&mut s, EntityKind::Enemy, 100.0, 100.0, 1);
    s.settings.enemy_fire_chance = 0.0;
    Round::from_state(s, 7)
}

/// Round whose only enemy dies on the next simulation tick.
fn doomed_enemy_round() -> Round {
    let mut s = bare_state(Difficulty::Easy, "Tester");
    spawn_enemy(&mut s, EntityKind::Enemy, 100.0, 100.0, 1);
    s.bullets.push(Bullet {
        x: 115.0,
        y: 120.0,
        dx: 0.0,
        dy: -1.0,
        speed: 10.0,
        owner: BulletOwner::Player,
    });
    Round::from_state(s, 7)
}

fn recorder(round: &mut Round) -> Rc<RefCell<Vec<RoundEnd>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    round.on_round_end(move |end| sink.borrow_mut().push(end.clone()));
    seen
}

// ── creation ──────────────────────────────────────────────────────────────────

#[test]
fn new_round_uses_difficulty_bundle() {
    let mut round = Round::with_seed(Difficulty::Normal, "Ada", 1);
    let snap = round.snapshot();
    assert_eq!(snap.player_name, "Ada");
    assert_eq!(snap.difficulty, Difficulty::Normal);
    assert_eq!(snap.health, 3);
    assert_eq!(snap.enemies.len(), 6);
    assert!(snap.enemies.iter().all(|e| e.hp == 2));
    assert_eq!(snap.outcome, Outcome::InProgress);
    assert!(snap.ended.is_none());
}

#[test]
fn same_seed_replays_same_round() {
    let mut a = Round::with_seed(Difficulty::Hard, "Ada", 99);
    let mut b = Round::with_seed(Difficulty::Hard, "Ada", 99);
    for i in 0..200 {
        if i % 10 == 0 {
            a.fire_requested();
            b.fire_requested();
        }
        let sa = a.on_tick(ms(16));
        let sb = b.on_tick(ms(16));
        assert_eq!(sa.enemies, sb.enemies);
        assert_eq!(sa.bullets, sb.bullets);
        assert_eq!(sa.score, sb.score);
    }
}

// ── cadences ──────────────────────────────────────────────────────────────────

#[test]
fn movement_sampled_every_sixteen_ms() {
    let mut round = quiet_round();
    round.set_move_intent(true, false);
    assert_eq!(round.on_tick(ms(15)).player.x, 180.0);
    assert_eq!(round.on_tick(ms(1)).player.x, 175.0);
    assert_eq!(round.on_tick(ms(32)).player.x, 165.0);
    round.set_move_intent(false, false);
    assert_eq!(round.on_tick(ms(160)).player.x, 165.0);
}

#[test]
fn simulation_ticks_on_difficulty_interval() {
    let mut round = quiet_round();
    assert_eq!(round.on_tick(ms(29)).frame, 0);
    assert_eq!(round.on_tick(ms(1)).frame, 1);
    assert_eq!(round.on_tick(ms(300)).frame, 11);
}

#[test]
fn boss_volley_on_fire_interval() {
    let mut round = Round::with_seed(Difficulty::Goddamn, "Ada", 3);
    let snap = round.on_tick(ms(249));
    assert!(snap.bullets.is_empty());
    let snap = round.on_tick(ms(1));
    assert_eq!(snap.bullets.len(), 5);
    assert!(snap
        .events
        .contains(&GameEvent::ShotFired { owner: BulletOwner::Enemy, count: 5 }));
}

#[test]
fn long_stall_catches_up_at_most_one_second() {
    let mut round = quiet_round();
    assert_eq!(round.on_tick(Duration::from_secs(3600)).frame, 33);
}

#[test]
fn huge_elapsed_after_a_tick_does_not_overflow() {
    let mut round = Round::with_seed(Difficulty::Easy, "T", 1);
    round.on_tick(ms(10));
    let snap = round.on_tick(Duration::MAX);
    assert_eq!(snap.frame, 33); // (10 + 1000) / 30
    let snap = round.on_tick(Duration::MAX);
    assert!(snap.frame >= 33);
}

// ── fire input ────────────────────────────────────────────────────────────────

#[test]
fn one_press_one_bullet() {
    let mut round = quiet_round();
    round.fire_requested();
    round.step();
    let snap = round.step();
    assert_eq!(snap.bullets.len(), 1);
    assert_eq!(snap.bullets[0].owner, BulletOwner::Player);
}

#[test]
fn each_press_spawns_its_own_bullet() {
    let mut round = quiet_round();
    round.fire_requested();
    round.fire_requested();
    let snap = round.step();
    assert_eq!(snap.bullets.len(), 2);
}

#[test]
fn shot_launches_from_position_at_next_tick() {
    let mut round = quiet_round();
    round.fire_requested();
    round.set_move_intent(false, true);
    let snap = round.on_tick(ms(30)); // one movement sample at 16, tick at 30
    assert_eq!(snap.player.x, 185.0);
    // launched at y 485 and moved once
    assert_eq!((snap.bullets[0].x, snap.bullets[0].y), (202.0, 475.0));
}

// ── round end ─────────────────────────────────────────────────────────────────

#[test]
fn last_kill_wins_and_notifies_once() {
    let mut round = doomed_enemy_round();
    let seen = recorder(&mut round);

    let snap = round.step();
    assert_eq!(snap.outcome, Outcome::Won);
    assert_eq!(snap.score, 20);
    let end = snap.ended.expect("round should have ended");
    assert_eq!(end.outcome, Outcome::Won);
    assert_eq!(end.score, 20);
    assert_eq!(end.player_name, "Tester");
    assert_eq!(end.ticks, 1);

    round.step();
    round.on_tick(ms(5000));
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0], end);
}

#[test]
fn late_listener_hears_result_immediately() {
    let mut round = doomed_enemy_round();
    round.step();
    let seen = recorder(&mut round);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].outcome, Outcome::Won);
}

#[test]
fn zero_health_loses_and_notifies() {
    let mut s = bare_state(Difficulty::Easy, "Tester");
    spawn_enemy(&mut s, EntityKind::Enemy, 100.0, 100.0, 1);
    s.player_mut().hp = 1;
    s.bullets.push(Bullet {
        x: 197.0,
        y: 480.0,
        dx: 0.0,
        dy: 1.0,
        speed: 6.0,
        owner: BulletOwner::Enemy,
    });
    let mut round = Round::from_state(s, 1);
    let seen = recorder(&mut round);

    let snap = round.on_tick(ms(30));
    assert_eq!(snap.outcome, Outcome::Lost);
    assert_eq!(snap.health, 0);
    assert_eq!(snap.enemies.len(), 1);
    assert_eq!(seen.borrow()[0].outcome, Outcome::Lost);
}

#[test]
fn terminal_round_ignores_ticks_and_input() {
    let mut round = doomed_enemy_round();
    let first = round.step();
    assert!(round.is_over());

    round.set_move_intent(true, false);
    round.fire_requested();
    let later = round.on_tick(ms(10_000));
    assert_eq!(later.frame, first.frame);
    assert_eq!(later.score, first.score);
    assert_eq!(later.health, first.health);
    assert_eq!(later.player, first.player);
    assert_eq!(later.bullets, first.bullets);
    assert!(later.events.is_empty());

    let stepped = round.step();
    assert_eq!(stepped.frame, first.frame);
}

#[test]
fn events_are_handed_over_once() {
    let mut round = doomed_enemy_round();
    let snap = round.step();
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::EnemyDestroyed { bonus: 20, .. })));
    assert!(snap.events.contains(&GameEvent::RoundOver { outcome: Outcome::Won }));
    assert!(round.snapshot().events.is_empty());
}

// ── properties over a whole round ─────────────────────────────────────────────

#[test]
fn score_and_health_monotonic_across_play() {
    for difficulty in Difficulty::ALL {
        let mut round = Round::with_seed(difficulty, "Ada", 2024);
        let mut last = round.snapshot();
        for i in 0..3000u32 {
            if i % 5 == 0 {
                round.fire_requested();
            }
            round.set_move_intent(i % 300 < 150, i % 300 >= 150);
            let snap = round.on_tick(ms(16));
            assert!(snap.score >= last.score);
            assert!(snap.health <= last.health);
            assert!(snap.player.x >= 0.0 && snap.player.x <= 360.0);
            if last.outcome.is_terminal() {
                assert_eq!(snap.frame, last.frame);
                assert_eq!(snap.score, last.score);
            }
            last = snap;
        }
    }
}
