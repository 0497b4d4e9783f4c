use crate::catalog::{BodyPart, CatalogEntry, CatalogSource};
use crate::clock::SessionClock;
use crate::progress::ProgressTracker;
use crate::rest::{RestTick, RestTimer};
use crate::workout::{ExerciseId, ExercisesManager, RemoveSet, SetId, Workout};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Immutable summary produced when a session is finished, handed to the
/// result sink for persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub workout_id: String,
    pub workout_name: String,
    pub started_at: SystemTime,
    pub total_elapsed_secs: f64,
    pub total_rest_secs: f64,
    pub exercises: Vec<ExerciseResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResult {
    pub name: String,
    pub body_part: BodyPart,
    pub completed_set_count: usize,
    pub sets: Vec<SetResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetResult {
    pub reps: u32,
    pub weight: f64,
}

impl SessionResult {
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    pub fn completed_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.completed_set_count).sum()
    }
}

#[derive(Debug)]
pub struct SaveError(pub String);

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to save session: {}", self.0)
    }
}

impl std::error::Error for SaveError {}

/// External "save the finished session" collaborator. Failure leaves the
/// in-memory session intact so the user can retry or discard.
pub trait ResultSink {
    fn save(&mut self, result: &SessionResult) -> Result<(), SaveError>;
}

/// Non-fatal, user-facing messages emitted by commands. The UI drains these
/// after each command and renders them as transient notices.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    ExerciseAdded(String),
    ExerciseRemoved(String),
    LastSetKept,
    NoExercises,
    RestAdjusted { configured_secs: u32 },
    RestFinished,
    Saved,
    SaveFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ExerciseAdded(name) => write!(f, "Added {name}"),
            Notice::ExerciseRemoved(name) => write!(f, "Removed {name}"),
            Notice::LastSetKept => write!(f, "An exercise keeps at least one set"),
            Notice::NoExercises => write!(f, "No exercises in this session"),
            Notice::RestAdjusted { configured_secs } => {
                write!(f, "Rest set to {configured_secs}s")
            }
            Notice::RestFinished => write!(f, "Rest over, next set"),
            Notice::Saved => write!(f, "Session saved"),
            Notice::SaveFailed(err) => write!(f, "Save failed: {err}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Active,
    Ended,
}

/// The session façade. Every public command runs synchronously against the
/// in-memory state and leaves the cursor/completion invariants satisfied
/// before returning; clock and rest ticks arrive as commands like any user
/// action.
pub struct Session {
    workout_id: String,
    workout_name: String,
    clock: SessionClock,
    exercises: ExercisesManager,
    progress: ProgressTracker,
    rest: RestTimer,
    total_rest_secs: f64,
    phase: Phase,
    notices: Vec<Notice>,
    rest_remaining_secs: Option<f64>,
    default_rest_secs: u32,
    catalog: Box<dyn CatalogSource>,
    sink: Box<dyn ResultSink>,
}

impl Session {
    pub fn start(
        workout: &Workout,
        default_rest_secs: u32,
        catalog: Box<dyn CatalogSource>,
        sink: Box<dyn ResultSink>,
    ) -> Self {
        Self {
            workout_id: workout.id.clone(),
            workout_name: workout.name.clone(),
            clock: SessionClock::start_now(),
            exercises: ExercisesManager::from_workout(workout, default_rest_secs),
            progress: ProgressTracker::new(),
            rest: RestTimer::new(),
            total_rest_secs: 0.0,
            phase: Phase::Active,
            notices: Vec::new(),
            rest_remaining_secs: None,
            default_rest_secs,
            catalog,
            sink,
        }
    }

    // --- ticks ---------------------------------------------------------

    /// Periodic tick: recompute the session clock and the rest countdown.
    /// Expiry of the countdown is the only place an automatic cursor
    /// advance happens without direct user action.
    pub fn on_tick(&mut self, now: SystemTime) {
        if self.phase == Phase::Ended {
            return;
        }
        self.clock.on_tick(now);
        match self.rest.on_tick(now) {
            RestTick::Expired { rested_secs, .. } => {
                self.total_rest_secs += rested_secs;
                self.rest_remaining_secs = None;
                self.progress.advance_to_next_set(&self.exercises);
                self.notices.push(Notice::RestFinished);
            }
            RestTick::Running { remaining_secs } => {
                self.rest_remaining_secs = Some(remaining_secs);
            }
            RestTick::Idle => {
                self.rest_remaining_secs = None;
            }
        }
    }

    // --- completion and navigation -------------------------------------

    /// Flip completion of a specific (exercise, set) pair. Completing the
    /// pair under the cursor starts that exercise's rest countdown.
    pub fn toggle_completion(&mut self, exercise_id: ExerciseId, set_id: SetId, now: SystemTime) {
        if self.phase == Phase::Ended {
            return;
        }
        let exercise = self
            .exercises
            .get(exercise_id)
            .expect("command referenced an exercise that does not exist");
        assert!(
            exercise.sets.iter().any(|s| s.id == set_id),
            "command referenced a set that does not exist"
        );
        let rest_secs = exercise.rest_secs;

        let now_completed = self.progress.toggle_completion(exercise_id, set_id);
        let at_cursor = self.progress.current_ids(&self.exercises) == Some((exercise_id, set_id));
        if now_completed && at_cursor {
            if let Some(banked) = self.rest.start(rest_secs, exercise_id, now) {
                self.total_rest_secs += banked;
            }
            self.rest_remaining_secs = self.rest.remaining_secs(now);
        }
    }

    /// Toggle the set under the cursor.
    pub fn toggle_current(&mut self, now: SystemTime) {
        if self.phase == Phase::Ended {
            return;
        }
        match self.progress.current_ids(&self.exercises) {
            Some((eid, sid)) => self.toggle_completion(eid, sid, now),
            None => self.notices.push(Notice::NoExercises),
        }
    }

    pub fn advance_to_next_set(&mut self) {
        self.navigate(|p, m| p.advance_to_next_set(m));
    }

    pub fn advance_to_previous_set(&mut self) {
        self.navigate(|p, m| p.advance_to_previous_set(m));
    }

    pub fn advance_to_next_exercise(&mut self) {
        self.navigate(|p, m| p.advance_to_next_exercise(m));
    }

    pub fn advance_to_previous_exercise(&mut self) {
        self.navigate(|p, m| p.advance_to_previous_exercise(m));
    }

    fn navigate(&mut self, op: impl FnOnce(&mut ProgressTracker, &ExercisesManager) -> bool) {
        if self.phase == Phase::Ended {
            return;
        }
        if self.exercises.is_empty() {
            self.notices.push(Notice::NoExercises);
            return;
        }
        op(&mut self.progress, &self.exercises);
    }

    // --- list mutation --------------------------------------------------

    /// Append an exercise picked from the catalog.
    pub fn add_exercise_from_catalog(&mut self, entry: &CatalogEntry) {
        if self.phase == Phase::Ended {
            return;
        }
        let rest = entry.default_rest_secs.unwrap_or(self.default_rest_secs);
        if self
            .exercises
            .append(
                &entry.name,
                entry.body_part,
                Some(entry.key.clone()),
                rest,
            )
            .is_some()
        {
            self.notices.push(Notice::ExerciseAdded(entry.name.clone()));
            self.progress.renormalize(&self.exercises);
        }
    }

    /// Append a free-form exercise. A blank name is ignored silently.
    pub fn add_exercise(&mut self, name: &str, body_part: BodyPart) {
        if self.phase == Phase::Ended {
            return;
        }
        if let Some(id) = self
            .exercises
            .append(name, body_part, None, self.default_rest_secs)
        {
            let name = self.exercises.get(id).map(|e| e.name.clone()).unwrap_or_default();
            self.notices.push(Notice::ExerciseAdded(name));
            self.progress.renormalize(&self.exercises);
        }
    }

    /// Remove an exercise; its completion records go with it and the cursor
    /// is renormalized against the shrunk list.
    pub fn remove_exercise(&mut self, exercise_id: ExerciseId) {
        if self.phase == Phase::Ended {
            return;
        }
        if let Some(removed) = self.exercises.remove(exercise_id) {
            self.progress.forget_exercise(&removed);
            self.progress.renormalize(&self.exercises);
            self.notices.push(Notice::ExerciseRemoved(removed.name));
            if self.exercises.is_empty() {
                self.notices.push(Notice::NoExercises);
            }
        }
    }

    pub fn add_set(&mut self, exercise_id: ExerciseId) {
        if self.phase == Phase::Ended {
            return;
        }
        self.exercises.add_set(exercise_id);
        self.progress.renormalize(&self.exercises);
    }

    /// Remove a set unless it is the exercise's last one, which is kept and
    /// reported as a warning.
    pub fn remove_set(&mut self, exercise_id: ExerciseId, set_id: SetId) {
        if self.phase == Phase::Ended {
            return;
        }
        match self.exercises.remove_set(exercise_id, set_id) {
            RemoveSet::Removed => {
                self.progress.forget_set(exercise_id, set_id);
                self.progress.renormalize(&self.exercises);
            }
            RemoveSet::LastSet => self.notices.push(Notice::LastSetKept),
            RemoveSet::NotFound => {}
        }
    }

    /// In-place reps/weight edit; completion state is untouched.
    pub fn update_set(&mut self, exercise_id: ExerciseId, set_id: SetId, reps: u32, weight: f64) {
        if self.phase == Phase::Ended {
            return;
        }
        self.exercises.update_set(exercise_id, set_id, reps, weight);
    }

    // --- rest timer -----------------------------------------------------

    /// Extend or shorten the running countdown.
    pub fn adjust_rest(&mut self, delta_secs: i64, now: SystemTime) {
        if self.phase == Phase::Ended {
            return;
        }
        if let Some(configured) = self.rest.adjust(delta_secs, now) {
            self.rest_remaining_secs = self.rest.remaining_secs(now);
            self.notices.push(Notice::RestAdjusted {
                configured_secs: configured.round() as u32,
            });
        }
    }

    /// Cancel the countdown, banking the rest actually taken, and advance.
    pub fn skip_rest(&mut self, now: SystemTime) {
        if self.phase == Phase::Ended {
            return;
        }
        if let Some((_, rested)) = self.rest.skip(now) {
            self.total_rest_secs += rested;
            self.rest_remaining_secs = None;
            self.progress.advance_to_next_set(&self.exercises);
        }
    }

    // --- lifecycle ------------------------------------------------------

    /// Freeze the current state into a result and hand it to the sink.
    /// On success the session ends and further commands are no-ops; a
    /// second finish is itself a no-op. On failure nothing is mutated, so
    /// the user can retry or discard.
    pub fn finish(&mut self, now: SystemTime) -> Result<(), SaveError> {
        if self.phase == Phase::Ended {
            return Ok(());
        }
        let result = self.build_result(now);
        match self.sink.save(&result) {
            Ok(()) => {
                self.phase = Phase::Ended;
                self.rest.cancel();
                self.rest_remaining_secs = None;
                self.notices.push(Notice::Saved);
                Ok(())
            }
            Err(err) => {
                self.notices.push(Notice::SaveFailed(err.0.clone()));
                Err(err)
            }
        }
    }

    /// Drop the session with no side effects.
    pub fn discard(&mut self) {
        self.rest.cancel();
        self.rest_remaining_secs = None;
        self.phase = Phase::Ended;
    }

    fn build_result(&self, now: SystemTime) -> SessionResult {
        let elapsed = now
            .duration_since(self.clock.started_at())
            .unwrap_or_default()
            .as_secs_f64();
        // rest taken so far in a still-running countdown counts too
        let pending_rest = self
            .rest
            .active()
            .map(|rest| {
                now.duration_since(rest.started_at)
                    .unwrap_or_default()
                    .as_secs_f64()
                    .min(rest.configured_secs)
            })
            .unwrap_or(0.0);

        SessionResult {
            workout_id: self.workout_id.clone(),
            workout_name: self.workout_name.clone(),
            started_at: self.clock.started_at(),
            total_elapsed_secs: elapsed,
            total_rest_secs: self.total_rest_secs + pending_rest,
            exercises: self
                .exercises
                .entries()
                .iter()
                .map(|e| ExerciseResult {
                    name: e.name.clone(),
                    body_part: e.body_part,
                    completed_set_count: self.progress.completed_count_for(e),
                    sets: e
                        .sets
                        .iter()
                        .map(|s| SetResult {
                            reps: s.reps,
                            weight: s.weight,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    // --- catalog --------------------------------------------------------

    pub fn search_catalog(&self, query: &str, body_part: Option<BodyPart>) -> Vec<CatalogEntry> {
        self.catalog.search(query, body_part)
    }

    // --- read-only view -------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn workout_name(&self) -> &str {
        &self.workout_name
    }

    pub fn exercises(&self) -> &ExercisesManager {
        &self.exercises
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn rest_timer(&self) -> &RestTimer {
        &self.rest
    }

    pub fn started_at(&self) -> SystemTime {
        self.clock.started_at()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    pub fn total_rest_secs(&self) -> f64 {
        self.total_rest_secs
    }

    /// Display value refreshed by the latest tick; None while idle.
    pub fn rest_remaining_secs(&self) -> Option<f64> {
        self.rest_remaining_secs
    }

    pub fn no_exercises(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Completed sets over total sets, in [0, 1].
    pub fn completion_ratio(&self) -> f64 {
        crate::util::completion_ratio(self.progress.completed_total(), self.exercises.total_sets())
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- snapshot plumbing (field access for snapshot.rs) ---------------

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn rebuild(
        workout_id: String,
        workout_name: String,
        clock: SessionClock,
        exercises: ExercisesManager,
        progress: ProgressTracker,
        rest: RestTimer,
        total_rest_secs: f64,
        default_rest_secs: u32,
        catalog: Box<dyn CatalogSource>,
        sink: Box<dyn ResultSink>,
    ) -> Self {
        let mut session = Self {
            workout_id,
            workout_name,
            clock,
            exercises,
            progress,
            rest,
            total_rest_secs,
            phase: Phase::Active,
            notices: Vec::new(),
            rest_remaining_secs: None,
            default_rest_secs,
            catalog,
            sink,
        };
        session.progress.renormalize(&session.exercises);
        session
    }

    pub(crate) fn default_rest_secs(&self) -> u32 {
        self.default_rest_secs
    }
}
