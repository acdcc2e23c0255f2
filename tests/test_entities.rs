use space_invader::compute::bare_state;
use space_invader::config::ConfigError;
use space_invader::entities::*;

fn bullets_of(s: &RoundState, owner: BulletOwner) -> impl Iterator<Item = &Bullet> {
    s.bullets.iter().filter(move |b| b.owner == owner)
}

#[test]
fn entity_clone_and_eq() {
    assert_eq!(EntityKind::Enemy, EntityKind::Enemy);
    assert_ne!(EntityKind::Enemy, EntityKind::Boss);
    assert_eq!(BulletOwner::Player, BulletOwner::Player);
    assert_ne!(BulletOwner::Player, BulletOwner::Enemy);
    assert_ne!(Outcome::Won, Outcome::Lost);

    let e = Entity { id: 3, kind: EntityKind::Boss, x: 1.0, y: 2.0, hp: 100 };
    assert_eq!(e.clone(), e);
}

#[test]
fn outcome_terminal_states() {
    assert!(!Outcome::InProgress.is_terminal());
    assert!(Outcome::Won.is_terminal());
    assert!(Outcome::Lost.is_terminal());
}

#[test]
fn difficulty_parses_case_insensitively() {
    assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
    assert_eq!(" NORMAL ".parse::<Difficulty>().unwrap(), Difficulty::Normal);
    assert_eq!("Goddamn".parse::<Difficulty>().unwrap(), Difficulty::Goddamn);
    assert!(matches!(
        "Impossible".parse::<Difficulty>(),
        Err(ConfigError::UnknownDifficulty(_))
    ));
}

#[test]
fn difficulty_from_name_falls_back_to_easy() {
    assert_eq!(Difficulty::from_name("Hard"), Difficulty::Hard);
    assert_eq!(Difficulty::from_name("Impossible"), Difficulty::Easy);
    assert_eq!(Difficulty::from_name(""), Difficulty::Easy);
}

#[test]
fn difficulty_cycles_in_menu_order() {
    assert_eq!(Difficulty::Easy.next(), Difficulty::Normal);
    assert_eq!(Difficulty::Goddamn.next(), Difficulty::Easy);
    assert_eq!(Difficulty::Easy.previous(), Difficulty::Goddamn);
    for d in Difficulty::ALL {
        assert_eq!(d.next().previous(), d);
        assert_eq!(d.to_string(), d.name());
    }
}

#[test]
fn round_state_accessors_split_player_from_enemies() {
    let mut s = bare_state(Difficulty::Easy, "Tester");
    assert_eq!(s.player().kind, EntityKind::Player);
    assert!(s.enemies().is_empty());

    s.entities.push(Entity { id: 1, kind: EntityKind::Enemy, x: 0.0, y: 0.0, hp: 1 });
    assert_eq!(s.enemies().len(), 1);
    s.enemies_mut()[0].hp = 4;
    assert_eq!(s.entities[1].hp, 4);
    s.player_mut().hp = 1;
    assert_eq!(s.entities[PLAYER_SLOT].hp, 1);
}

#[test]
fn round_state_clone_is_independent() {
    let original = bare_state(Difficulty::Normal, "Tester");
    let mut cloned = original.clone();

    cloned.player_mut().x = 99.0;
    cloned.score = 999;
    cloned.bullets.push(Bullet {
        x: 1.0,
        y: 1.0,
        dx: 0.0,
        dy: 1.0,
        speed: 6.0,
        owner: BulletOwner::Enemy,
    });

    assert_eq!(original.player().x, 180.0);
    assert_eq!(original.score, 0);
    assert!(original.bullets.is_empty());
    assert_eq!(bullets_of(&cloned, BulletOwner::Enemy).count(), 1);
    assert_eq!(bullets_of(&cloned, BulletOwner::Player).count(), 0);
}
