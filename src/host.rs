//! Host-level controller: owns at most one menu or one round at a time.
//!
//! Starting a round consumes the menu; when the round reaches a terminal
//! outcome it is dropped and a fresh menu carrying the result takes its
//! place.

use std::time::Duration;

use tracing::info;

use crate::entities::Difficulty;
use crate::round::{Round, RoundEnd, RoundSnapshot};

pub const DEFAULT_PLAYER_NAME: &str = "Player";
const MAX_NAME_LEN: usize = 16;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Menu {
    pub player_name: String,
    pub difficulty: Difficulty,
    /// Result of the round that just finished, if any.
    pub last_result: Option<RoundEnd>,
}

impl Menu {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Name the round will be played under; blank input plays as "Player".
    pub fn resolved_name(&self) -> String {
        match self.player_name.trim() {
            "" => DEFAULT_PLAYER_NAME.to_string(),
            name => name.to_string(),
        }
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() && self.player_name.chars().count() < MAX_NAME_LEN {
            self.player_name.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.player_name.pop();
    }

    pub fn select_next(&mut self) {
        self.difficulty = self.difficulty.next();
    }

    pub fn select_previous(&mut self) {
        self.difficulty = self.difficulty.previous();
    }
}

#[derive(Debug)]
pub enum Screen {
    Menu(Menu),
    Round(Round),
}

#[derive(Debug)]
pub struct Host {
    screen: Screen,
    seed: Option<u64>,
    rounds_started: u64,
}

impl Host {
    /// `seed` makes every round reproducible; each round still gets its own
    /// stream derived from it.
    pub fn new(menu: Menu, seed: Option<u64>) -> Self {
        Self {
            screen: Screen::Menu(menu),
            seed,
            rounds_started: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn menu_mut(&mut self) -> Option<&mut Menu> {
        match &mut self.screen {
            Screen::Menu(menu) => Some(menu),
            Screen::Round(_) => None,
        }
    }

    pub fn round_mut(&mut self) -> Option<&mut Round> {
        match &mut self.screen {
            Screen::Round(round) => Some(round),
            Screen::Menu(_) => None,
        }
    }

    /// Leave the menu for a new round. Returns `false` if a round is
    /// already running.
    pub fn start_round(&mut self) -> bool {
        let Screen::Menu(menu) = &self.screen else {
            return false;
        };
        let name = menu.resolved_name();
        let difficulty = menu.difficulty;

        let round = match self.seed {
            Some(seed) => Round::with_seed(difficulty, &name, seed.wrapping_add(self.rounds_started)),
            None => Round::new(difficulty, &name),
        };
        self.rounds_started += 1;
        info!(%difficulty, player = %name, "starting round");
        self.screen = Screen::Round(round);
        true
    }

    /// Tick the active round. The snapshot of the final tick is still
    /// returned after the host has switched back to the menu.
    pub fn update(&mut self, elapsed: Duration) -> Option<RoundSnapshot> {
        let round = self.round_mut()?;
        let snapshot = round.on_tick(elapsed);
        if let Some(end) = &snapshot.ended {
            self.return_to_menu(Some(end.clone()));
        }
        Some(snapshot)
    }

    /// Drop the active round, if any, without waiting for its outcome.
    pub fn abandon_round(&mut self) {
        if matches!(self.screen, Screen::Round(_)) {
            info!("round abandoned");
            self.return_to_menu(None);
        }
    }

    fn return_to_menu(&mut self, result: Option<RoundEnd>) {
        let menu = match &self.screen {
            Screen::Round(round) => Menu {
                player_name: round.state().player_name.clone(),
                difficulty: round.state().difficulty,
                last_result: result,
            },
            Screen::Menu(menu) => menu.clone(),
        };
        self.screen = Screen::Menu(menu);
    }
}
