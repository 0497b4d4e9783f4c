use crate::workout::ExerciseId;
use std::time::{Duration, SystemTime};

/// A running countdown is never shortened below this much remaining time.
pub const MIN_REST_SECS: f64 = 15.0;

/// The live countdown state, kept as absolute instants; remaining time is
/// `deadline - now`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveRest {
    pub exercise_id: ExerciseId,
    pub started_at: SystemTime,
    pub deadline: SystemTime,
    pub configured_secs: f64,
}

impl ActiveRest {
    pub fn remaining_secs(&self, now: SystemTime) -> f64 {
        self.deadline
            .duration_since(now)
            .unwrap_or_default()
            .as_secs_f64()
    }

    fn elapsed_secs(&self, now: SystemTime) -> f64 {
        now.duration_since(self.started_at)
            .unwrap_or_default()
            .as_secs_f64()
            .min(self.configured_secs)
    }
}

/// What a tick observed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RestTick {
    Idle,
    Running { remaining_secs: f64 },
    /// Deadline reached: the timer went back to Idle and the full configured
    /// duration counts as rest.
    Expired {
        exercise_id: ExerciseId,
        rested_secs: f64,
    },
}

/// Per-exercise rest countdown: Idle -> Running -> (Idle | Expired).
/// Only one countdown is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RestTimer {
    active: Option<ActiveRest>,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveRest> {
        self.active.as_ref()
    }

    pub fn remaining_secs(&self, now: SystemTime) -> Option<f64> {
        self.active.as_ref().map(|rest| rest.remaining_secs(now))
    }

    /// Start a countdown for `exercise_id`. If one is already running its
    /// partial elapsed rest is returned so the caller can bank it before
    /// the replacement takes over.
    pub fn start(
        &mut self,
        configured_secs: u32,
        exercise_id: ExerciseId,
        now: SystemTime,
    ) -> Option<f64> {
        let banked = self.active.take().map(|prev| prev.elapsed_secs(now));
        let configured = configured_secs as f64;
        self.active = Some(ActiveRest {
            exercise_id,
            started_at: now,
            deadline: now + Duration::from_secs_f64(configured),
            configured_secs: configured,
        });
        banked
    }

    /// Rehydrate a countdown from a snapshot. The next tick expires it
    /// immediately if the deadline already passed while suspended.
    pub fn resume(&mut self, active: ActiveRest) {
        self.active = Some(active);
    }

    /// Recompute remaining time against the deadline; a tick at or past
    /// the deadline expires the countdown.
    pub fn on_tick(&mut self, now: SystemTime) -> RestTick {
        let Some(rest) = self.active else {
            return RestTick::Idle;
        };
        if now >= rest.deadline {
            self.active = None;
            RestTick::Expired {
                exercise_id: rest.exercise_id,
                rested_secs: rest.configured_secs,
            }
        } else {
            RestTick::Running {
                remaining_secs: rest.remaining_secs(now),
            }
        }
    }

    /// Extend or shorten the countdown by shifting the deadline. A shrink
    /// never leaves less than MIN_REST_SECS remaining, so a running
    /// countdown can't be adjusted to zero or into the past. The configured
    /// duration follows the deadline (it stays `deadline - started_at`, the
    /// amount banked on expiry). Returns the new configured duration.
    pub fn adjust(&mut self, delta_secs: i64, now: SystemTime) -> Option<f64> {
        let rest = self.active.as_mut()?;
        let delta = delta_secs as f64;
        let shifted = if delta >= 0.0 {
            rest.deadline + Duration::from_secs_f64(delta)
        } else {
            rest.deadline - Duration::from_secs_f64(-delta)
        };
        let floor = now + Duration::from_secs_f64(MIN_REST_SECS);
        rest.deadline = if shifted < floor { floor } else { shifted };
        rest.configured_secs = rest
            .deadline
            .duration_since(rest.started_at)
            .unwrap_or_default()
            .as_secs_f64();
        Some(rest.configured_secs)
    }

    /// Cancel the countdown, returning the rest time actually elapsed so
    /// far (capped at the configured duration).
    pub fn skip(&mut self, now: SystemTime) -> Option<(ExerciseId, f64)> {
        self.active
            .take()
            .map(|rest| (rest.exercise_id, rest.elapsed_secs(now)))
    }

    /// Cancel without banking anything (session discard).
    pub fn cancel(&mut self) {
        self.active = None;
    }
}
