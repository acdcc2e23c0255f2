//! The three periodic triggers of a round, tracked on a virtual clock.
//!
//! A round does not own real timers. The host reports elapsed time and the
//! schedule hands back every trigger that fell due, oldest first, so all
//! three cadences run on one thread through one update function.

use std::time::Duration;

/// Most virtual time a single `advance` may add. A host that stalls for
/// longer (suspend, debugger) resumes where it left off instead of replaying
/// every missed trigger.
pub const MAX_CATCH_UP: Duration = Duration::from_secs(1);

/// Declaration order breaks ties between triggers due at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Trigger {
    /// Sample the held-direction flags.
    Movement,
    /// Run one simulation tick.
    Simulation,
    EnemyFire,
}

#[derive(Clone, Debug)]
struct Cadence {
    trigger: Trigger,
    period: Duration,
    next_due: Duration,
}

#[derive(Clone, Debug)]
pub struct Schedule {
    now: Duration,
    cadences: [Cadence; 3],
    stopped: bool,
}

impl Schedule {
    /// Each cadence first fires one full period after the round starts.
    pub fn new(movement: Duration, simulation: Duration, enemy_fire: Duration) -> Self {
        let cadence = |trigger, period: Duration| {
            let period = period.max(Duration::from_millis(1));
            Cadence {
                trigger,
                period,
                next_due: period,
            }
        };
        Self {
            now: Duration::ZERO,
            cadences: [
                cadence(Trigger::Movement, movement),
                cadence(Trigger::Simulation, simulation),
                cadence(Trigger::EnemyFire, enemy_fire),
            ],
            stopped: false,
        }
    }

    /// Move the clock forward by `elapsed`, capped at [`MAX_CATCH_UP`].
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.stopped {
            self.now = self.now.saturating_add(elapsed.min(MAX_CATCH_UP));
        }
    }

    /// Pop the earliest trigger that is due by now, if any.
    pub fn pop_due(&mut self) -> Option<Trigger> {
        if self.stopped {
            return None;
        }
        let now = self.now;
        let cadence = self
            .cadences
            .iter_mut()
            .filter(|c| c.next_due <= now)
            .min_by_key(|c| (c.next_due, c.trigger))?;
        cadence.next_due = cadence.next_due.saturating_add(cadence.period);
        Some(cadence.trigger)
    }

    /// Stop every cadence at once. Nothing fires afterwards.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}
